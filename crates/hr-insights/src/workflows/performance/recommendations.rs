use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::scoring::{BandDirection, CompositeScore, MetricSample};
use crate::config::{read_document, ConfigError};

const IMPACT_WEIGHT: f64 = 50.0;
const EFFORT_WEIGHT: f64 = 30.0;
const CATEGORY_WEIGHT: f64 = 20.0;

/// Composite scores at or above this are considered healthy; minor breaches
/// on a healthy module are downgraded to `low`.
pub const HEALTHY_SCORE: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationCategory {
    Critical,
    Important,
    Moderate,
    Low,
}

impl RecommendationCategory {
    pub fn weight(&self) -> f64 {
        match self {
            RecommendationCategory::Critical => 1.0,
            RecommendationCategory::Important => 0.75,
            RecommendationCategory::Moderate => 0.5,
            RecommendationCategory::Low => 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Impact {
    High,
    Medium,
    Low,
}

impl Impact {
    pub fn value(&self) -> f64 {
        match self {
            Impact::High => 1.0,
            Impact::Medium => 0.6,
            Impact::Low => 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effort {
    Low,
    Medium,
    High,
}

impl Effort {
    /// Cheaper fixes rank higher.
    pub fn inverse(&self) -> f64 {
        match self {
            Effort::Low => 1.0,
            Effort::Medium => 0.6,
            Effort::High => 0.3,
        }
    }
}

/// `50 * impact + 30 * inverse effort + 20 * category`, in `0..=100`.
pub fn priority_score(impact: Impact, effort: Effort, category: RecommendationCategory) -> f64 {
    IMPACT_WEIGHT * impact.value()
        + EFFORT_WEIGHT * effort.inverse()
        + CATEGORY_WEIGHT * category.weight()
}

/// Limit beyond which a metric earns a recommendation. Usually stricter than
/// the scoring band for the same metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendThreshold {
    pub limit: f64,
    #[serde(default)]
    pub direction: BandDirection,
    /// Relative excess over `limit` that counts as a major breach.
    #[serde(default = "default_major_excess")]
    pub major_excess: f64,
}

fn default_major_excess() -> f64 {
    0.5
}

impl RecommendThreshold {
    pub fn higher_is_worse(limit: f64) -> Self {
        Self {
            limit,
            direction: BandDirection::HigherIsWorse,
            major_excess: default_major_excess(),
        }
    }

    pub fn lower_is_worse(limit: f64) -> Self {
        Self {
            limit,
            direction: BandDirection::LowerIsWorse,
            major_excess: default_major_excess(),
        }
    }

    pub fn validate(&self, metric: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidThreshold {
            metric: metric.to_string(),
            reason: reason.to_string(),
        };
        if !self.limit.is_finite() || self.limit == 0.0 {
            return Err(invalid("limit must be finite and non-zero"));
        }
        if !self.major_excess.is_finite() || self.major_excess <= 0.0 {
            return Err(invalid("majorExcess must be a positive number"));
        }
        Ok(())
    }

    /// Relative excess beyond the limit, `None` when the value is within it.
    pub fn excess(&self, value: f64) -> Option<f64> {
        if !value.is_finite() || !self.direction.breaches(value, self.limit) {
            return None;
        }
        Some((value - self.limit).abs() / self.limit.abs())
    }

    fn category(&self, excess: f64) -> RecommendationCategory {
        if excess >= self.major_excess {
            RecommendationCategory::Critical
        } else if excess >= self.major_excess / 2.0 {
            RecommendationCategory::Important
        } else {
            RecommendationCategory::Moderate
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecommendThresholds {
    thresholds: BTreeMap<String, RecommendThreshold>,
}

impl RecommendThresholds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, metric: impl Into<String>, threshold: RecommendThreshold) -> Self {
        self.thresholds.insert(metric.into(), threshold);
        self
    }

    pub fn get(&self, metric: &str) -> Option<&RecommendThreshold> {
        self.thresholds.get(metric)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&read_document(path)?)
    }

    pub fn invalid_thresholds(&self) -> Vec<ConfigError> {
        self.thresholds
            .iter()
            .filter_map(|(metric, threshold)| threshold.validate(metric).err())
            .collect()
    }

    pub fn standard() -> Self {
        Self::new()
            .with_threshold(
                "largest_contentful_paint",
                RecommendThreshold::higher_is_worse(2.0),
            )
            .with_threshold("first_input_delay", RecommendThreshold::higher_is_worse(80.0))
            .with_threshold(
                "cumulative_layout_shift",
                RecommendThreshold::higher_is_worse(0.08),
            )
            .with_threshold("time_to_first_byte", RecommendThreshold::higher_is_worse(600.0))
            .with_threshold("error_rate", RecommendThreshold::higher_is_worse(0.5))
            .with_threshold(
                "approval_turnaround_hours",
                RecommendThreshold::higher_is_worse(36.0),
            )
            .with_threshold("policy_adherence", RecommendThreshold::lower_is_worse(97.0))
            .with_threshold(
                "audit_trail_completeness",
                RecommendThreshold::lower_is_worse(98.0),
            )
            .with_threshold(
                "retention_compliance",
                RecommendThreshold::lower_is_worse(98.0),
            )
            .with_threshold("data_completeness", RecommendThreshold::lower_is_worse(97.0))
    }
}

/// Static remediation advice for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remediation {
    pub title: String,
    pub action: String,
    pub impact: Impact,
    pub effort: Effort,
    pub auto_fixable: bool,
}

impl Remediation {
    fn new(title: &str, action: &str, impact: Impact, effort: Effort, auto_fixable: bool) -> Self {
        Self {
            title: title.to_string(),
            action: action.to_string(),
            impact,
            effort,
            auto_fixable,
        }
    }

    fn generic(metric: &str) -> Self {
        Self {
            title: format!("Investigate {}", metric.replace('_', " ")),
            action: format!("Review recent changes affecting {metric} and restore it within target"),
            impact: Impact::Medium,
            effort: Effort::Medium,
            auto_fixable: false,
        }
    }
}

/// Lookup of remediation advice keyed by metric name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemediationCatalog {
    entries: BTreeMap<String, Remediation>,
}

impl RemediationCatalog {
    pub fn with_entry(mut self, metric: impl Into<String>, remediation: Remediation) -> Self {
        self.entries.insert(metric.into(), remediation);
        self
    }

    pub fn lookup(&self, metric: &str) -> Remediation {
        self.entries
            .get(metric)
            .cloned()
            .unwrap_or_else(|| Remediation::generic(metric))
    }

    pub fn standard() -> Self {
        Self::default()
            .with_entry(
                "largest_contentful_paint",
                Remediation::new(
                    "Speed up dashboard rendering",
                    "Lazy-load employee photos and defer below-the-fold widgets",
                    Impact::High,
                    Effort::Medium,
                    false,
                ),
            )
            .with_entry(
                "first_input_delay",
                Remediation::new(
                    "Reduce main-thread blocking",
                    "Split large form bundles and move validation off the input handler",
                    Impact::Medium,
                    Effort::Medium,
                    false,
                ),
            )
            .with_entry(
                "cumulative_layout_shift",
                Remediation::new(
                    "Stabilize page layout",
                    "Reserve space for tables and charts before their data arrives",
                    Impact::Medium,
                    Effort::Low,
                    true,
                ),
            )
            .with_entry(
                "time_to_first_byte",
                Remediation::new(
                    "Cache backend responses",
                    "Enable response caching for read-heavy record listings",
                    Impact::High,
                    Effort::Low,
                    true,
                ),
            )
            .with_entry(
                "error_rate",
                Remediation::new(
                    "Fix failing requests",
                    "Triage the most frequent request errors and add retries for transient ones",
                    Impact::High,
                    Effort::Medium,
                    false,
                ),
            )
            .with_entry(
                "approval_turnaround_hours",
                Remediation::new(
                    "Shorten approval turnaround",
                    "Send reminder escalations to approvers after 24 hours",
                    Impact::Medium,
                    Effort::Low,
                    true,
                ),
            )
            .with_entry(
                "policy_adherence",
                Remediation::new(
                    "Improve policy adherence",
                    "Assign refresher training to teams below target",
                    Impact::High,
                    Effort::High,
                    false,
                ),
            )
            .with_entry(
                "audit_trail_completeness",
                Remediation::new(
                    "Close audit trail gaps",
                    "Enable audit logging on every record mutation path",
                    Impact::High,
                    Effort::Medium,
                    true,
                ),
            )
            .with_entry(
                "retention_compliance",
                Remediation::new(
                    "Apply retention schedule",
                    "Archive or purge records past their retention date",
                    Impact::High,
                    Effort::Low,
                    true,
                ),
            )
            .with_entry(
                "data_completeness",
                Remediation::new(
                    "Complete employee records",
                    "Request missing fields from record owners through the self-service portal",
                    Impact::Medium,
                    Effort::Medium,
                    false,
                ),
            )
    }
}

/// Actionable, ranked suggestion produced when a metric breaches its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    pub title: String,
    pub action: String,
    pub category: RecommendationCategory,
    pub impact: Impact,
    pub effort: Effort,
    pub priority_score: f64,
    pub metrics_affected: Vec<String>,
    pub auto_fixable: bool,
}

impl Recommendation {
    /// Attribute the recommendation to a report module.
    pub fn for_module(mut self, module: &str) -> Self {
        self.id = format!("rec-{module}-{}", self.metrics_affected.join("+"));
        self.module = Some(module.to_string());
        self
    }

    fn sort_key(&self) -> (&[String], Option<&str>) {
        (&self.metrics_affected, self.module.as_deref())
    }
}

/// Order by priority score descending, ties broken by metric then module name.
pub fn rank(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(|a, b| {
        b.priority_score
            .partial_cmp(&a.priority_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.sort_key().cmp(&b.sort_key()))
    });
}

/// Thresholds plus remediation lookup used to turn breaches into advice.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: RecommendThresholds,
    catalog: RemediationCatalog,
}

impl RecommendationEngine {
    pub fn new(thresholds: RecommendThresholds, catalog: RemediationCatalog) -> Self {
        Self {
            thresholds,
            catalog,
        }
    }

    pub fn standard() -> Self {
        Self::new(RecommendThresholds::standard(), RemediationCatalog::standard())
    }

    pub fn thresholds(&self) -> &RecommendThresholds {
        &self.thresholds
    }

    pub fn generate(&self, score: &CompositeScore, samples: &[MetricSample]) -> Vec<Recommendation> {
        // Worst excess per metric; repeated samples yield one recommendation.
        let mut breaches: BTreeMap<&str, (f64, &RecommendThreshold)> = BTreeMap::new();
        for sample in samples {
            let Some(threshold) = self.thresholds.get(&sample.name) else {
                continue;
            };
            if let Err(err) = threshold.validate(&sample.name) {
                warn!(metric = %sample.name, error = %err, "recommendation threshold ignored");
                continue;
            }
            let Some(excess) = threshold.excess(sample.value) else {
                continue;
            };
            let entry = breaches
                .entry(sample.name.as_str())
                .or_insert((excess, threshold));
            if excess > entry.0 {
                entry.0 = excess;
            }
        }

        let mut recommendations: Vec<Recommendation> = breaches
            .into_iter()
            .map(|(metric, (excess, threshold))| {
                let mut category = threshold.category(excess);
                if category == RecommendationCategory::Moderate && score.value >= HEALTHY_SCORE {
                    category = RecommendationCategory::Low;
                }
                let remediation = self.catalog.lookup(metric);
                Recommendation {
                    id: format!("rec-{metric}"),
                    module: None,
                    title: remediation.title,
                    action: remediation.action,
                    category,
                    impact: remediation.impact,
                    effort: remediation.effort,
                    priority_score: priority_score(remediation.impact, remediation.effort, category),
                    metrics_affected: vec![metric.to_string()],
                    auto_fixable: remediation.auto_fixable,
                }
            })
            .collect();

        rank(&mut recommendations);
        recommendations
    }
}

/// Generate recommendations with the standard remediation catalog.
pub fn generate(
    score: &CompositeScore,
    samples: &[MetricSample],
    thresholds: &RecommendThresholds,
) -> Vec<Recommendation> {
    RecommendationEngine::new(thresholds.clone(), RemediationCatalog::standard())
        .generate(score, samples)
}
