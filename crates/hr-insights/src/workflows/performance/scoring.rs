use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{read_document, ConfigError};

/// Single observed measurement, e.g. `largest_contentful_paint = 1.2 s`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
    pub unit: String,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// Which side of a threshold counts as a breach.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BandDirection {
    #[default]
    HigherIsWorse,
    LowerIsWorse,
}

impl BandDirection {
    pub fn breaches(&self, value: f64, threshold: f64) -> bool {
        match self {
            BandDirection::HigherIsWorse => value > threshold,
            BandDirection::LowerIsWorse => value < threshold,
        }
    }

    /// `true` when `a` is a strictly worse threshold than `b`.
    fn worse_than(&self, a: f64, b: f64) -> bool {
        match self {
            BandDirection::HigherIsWorse => a > b,
            BandDirection::LowerIsWorse => a < b,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandStep {
    pub threshold: f64,
    pub deduction: f64,
}

/// Deduction table for one metric, steps ordered worst to best.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    #[serde(default)]
    pub direction: BandDirection,
    pub steps: Vec<BandStep>,
}

impl ScoreBand {
    pub fn higher_is_worse(steps: &[(f64, f64)]) -> Self {
        Self::from_pairs(BandDirection::HigherIsWorse, steps)
    }

    pub fn lower_is_worse(steps: &[(f64, f64)]) -> Self {
        Self::from_pairs(BandDirection::LowerIsWorse, steps)
    }

    fn from_pairs(direction: BandDirection, steps: &[(f64, f64)]) -> Self {
        Self {
            direction,
            steps: steps
                .iter()
                .map(|&(threshold, deduction)| BandStep {
                    threshold,
                    deduction,
                })
                .collect(),
        }
    }

    pub fn validate(&self, metric: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidBand {
            metric: metric.to_string(),
            reason,
        };

        for step in &self.steps {
            if !step.threshold.is_finite() || !step.deduction.is_finite() {
                return Err(invalid("thresholds and deductions must be finite".to_string()));
            }
            if step.deduction < 0.0 {
                return Err(invalid(format!(
                    "deduction {} at threshold {} is negative",
                    step.deduction, step.threshold
                )));
            }
        }

        for pair in self.steps.windows(2) {
            let (worse, better) = (pair[0], pair[1]);
            if !self.direction.worse_than(worse.threshold, better.threshold) {
                return Err(invalid(format!(
                    "threshold {} must be worse than the following threshold {}",
                    worse.threshold, better.threshold
                )));
            }
            if worse.deduction < better.deduction {
                return Err(invalid(format!(
                    "deduction {} at threshold {} is smaller than the milder step's {}",
                    worse.deduction, worse.threshold, better.deduction
                )));
            }
        }

        Ok(())
    }

    /// Deduction of the first (worst) step the value crosses.
    pub fn deduction_for(&self, value: f64) -> f64 {
        self.steps
            .iter()
            .find(|step| self.direction.breaches(value, step.threshold))
            .map(|step| step.deduction)
            .unwrap_or(0.0)
    }
}

/// Band table keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBands {
    bands: BTreeMap<String, ScoreBand>,
}

impl ScoreBands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_band(mut self, metric: impl Into<String>, band: ScoreBand) -> Self {
        self.bands.insert(metric.into(), band);
        self
    }

    pub fn get(&self, metric: &str) -> Option<&ScoreBand> {
        self.bands.get(metric)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&read_document(path)?)
    }

    /// Validation errors of every malformed band.
    pub fn invalid_bands(&self) -> Vec<ConfigError> {
        self.bands
            .iter()
            .filter_map(|(metric, band)| band.validate(metric).err())
            .collect()
    }

    /// Default deduction tables for the web vitals of the HR portal and the
    /// operational metrics reported by each module.
    pub fn standard() -> Self {
        Self::new()
            .with_band(
                "largest_contentful_paint",
                ScoreBand::higher_is_worse(&[(4.0, 30.0), (2.5, 15.0)]),
            )
            .with_band(
                "first_input_delay",
                ScoreBand::higher_is_worse(&[(300.0, 25.0), (100.0, 10.0)]),
            )
            .with_band(
                "cumulative_layout_shift",
                ScoreBand::higher_is_worse(&[(0.25, 20.0), (0.1, 10.0)]),
            )
            .with_band(
                "time_to_first_byte",
                ScoreBand::higher_is_worse(&[(1800.0, 20.0), (800.0, 10.0)]),
            )
            .with_band(
                "error_rate",
                ScoreBand::higher_is_worse(&[(5.0, 25.0), (1.0, 10.0)]),
            )
            .with_band(
                "approval_turnaround_hours",
                ScoreBand::higher_is_worse(&[(72.0, 20.0), (48.0, 10.0)]),
            )
            .with_band(
                "policy_adherence",
                ScoreBand::lower_is_worse(&[(80.0, 30.0), (90.0, 15.0), (95.0, 5.0)]),
            )
            .with_band(
                "audit_trail_completeness",
                ScoreBand::lower_is_worse(&[(90.0, 25.0), (95.0, 10.0)]),
            )
            .with_band(
                "retention_compliance",
                ScoreBand::lower_is_worse(&[(90.0, 25.0), (95.0, 10.0)]),
            )
            .with_band(
                "data_completeness",
                ScoreBand::lower_is_worse(&[(85.0, 20.0), (95.0, 8.0)]),
            )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub name: String,
    pub contribution: f64,
}

/// Bounded 0-100 score with the per-metric contributions that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub value: f64,
    pub components: Vec<ScoreContribution>,
    /// Metrics skipped because their band was malformed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unscored: Vec<String>,
}

pub const MAX_SCORE: f64 = 100.0;

/// Start at 100 and subtract the band deduction of every sample.
///
/// Samples without a band are informational and deduct nothing; a malformed
/// band leaves its metric unscored instead of failing the whole score.
pub fn score(samples: &[MetricSample], bands: &ScoreBands) -> CompositeScore {
    let mut total = MAX_SCORE;
    let mut components = Vec::new();
    let mut unscored: Vec<String> = Vec::new();

    for sample in samples {
        let Some(band) = bands.get(&sample.name) else {
            continue;
        };

        if let Err(err) = band.validate(&sample.name) {
            if !unscored.contains(&sample.name) {
                warn!(metric = %sample.name, error = %err, "metric left unscored");
                unscored.push(sample.name.clone());
            }
            continue;
        }

        if !sample.value.is_finite() {
            if !unscored.contains(&sample.name) {
                warn!(metric = %sample.name, value = sample.value, "non-finite sample left unscored");
                unscored.push(sample.name.clone());
            }
            continue;
        }

        let deduction = band.deduction_for(sample.value);
        total -= deduction;
        components.push(ScoreContribution {
            name: sample.name.clone(),
            contribution: 0.0 - deduction,
        });
    }

    CompositeScore {
        value: total.clamp(0.0, MAX_SCORE),
        components,
        unscored,
    }
}
