use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use futures::future::join_all;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use super::source::{FetchError, ModuleDataSource, ModuleSnapshot, SnapshotWindow};
use super::views::{ExcludedModule, ExclusionKind, ModuleScore, Overview, Report, TrendPoint};
use super::window::ReportWindow;
use crate::config::{ConfigError, EngineConfig};
use crate::workflows::performance::{
    assess, factors_from_signals, rank, score, CompositeScore, Recommendation,
    RecommendationEngine, RecommendThresholds, RemediationCatalog, RiskFactor, ScoreBands,
};

pub const MODULE_WEIGHT_RANGE: RangeInclusive<u8> = 1..=10;

#[derive(Debug)]
struct ScoredModule {
    name: String,
    weight: u8,
    snapshot: ModuleSnapshot,
    score: CompositeScore,
}

/// Outcome of one fetch-and-score pass at a single snapshot date.
#[derive(Debug, Default)]
struct Collection {
    modules: Vec<ScoredModule>,
    excluded: Vec<ExcludedModule>,
}

impl Collection {
    fn overview(&self) -> Option<Overview> {
        if self.modules.is_empty() {
            return None;
        }

        let total_weight: f64 = self
            .modules
            .iter()
            .map(|module| f64::from(module.weight))
            .sum();
        let weighted: f64 = self
            .modules
            .iter()
            .map(|module| f64::from(module.weight) * module.score.value)
            .sum();

        Some(Overview {
            composite_score: weighted / total_weight,
            per_module: self
                .modules
                .iter()
                .map(|module| ModuleScore {
                    name: module.name.clone(),
                    weight: module.weight,
                    score: module.score.value,
                })
                .collect(),
        })
    }

    fn risk_factors(&self) -> Vec<RiskFactor> {
        self.modules
            .iter()
            .filter_map(|module| {
                module
                    .snapshot
                    .compliance
                    .as_ref()
                    .map(|signals| factors_from_signals(&module.name, signals))
            })
            .flatten()
            .collect()
    }
}

/// Concurrent fetch, per-module scoring and cross-module consolidation.
#[derive(Debug, Clone)]
pub struct ReportAggregator {
    bands: ScoreBands,
    recommendations: RecommendationEngine,
    fetch_timeout: Duration,
    deadline: Duration,
}

impl Default for ReportAggregator {
    fn default() -> Self {
        Self::new(ScoreBands::standard(), RecommendationEngine::standard())
    }
}

impl ReportAggregator {
    pub fn new(bands: ScoreBands, recommendations: RecommendationEngine) -> Self {
        let defaults = EngineConfig::default();
        Self {
            bands,
            recommendations,
            fetch_timeout: defaults.fetch_timeout,
            deadline: defaults.report_deadline,
        }
    }

    /// Build from engine settings, loading the band table document when one
    /// is configured. Malformed individual bands or thresholds are logged and
    /// later leave their metric unscored.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let bands = match &config.score_bands_path {
            Some(path) => ScoreBands::load(path)?,
            None => ScoreBands::standard(),
        };
        let thresholds = RecommendThresholds::standard();

        for err in bands
            .invalid_bands()
            .into_iter()
            .chain(thresholds.invalid_thresholds())
        {
            warn!(error = %err, "engine configuration entry ignored");
        }

        Ok(Self::new(
            bands,
            RecommendationEngine::new(thresholds, RemediationCatalog::standard()),
        )
        .with_timeouts(config.fetch_timeout, config.report_deadline))
    }

    pub fn with_timeouts(mut self, fetch_timeout: Duration, deadline: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self.deadline = deadline;
        self
    }

    pub fn bands(&self) -> &ScoreBands {
        &self.bands
    }

    /// Score every module as of the window end and trace the weighted
    /// composite over each window point. Failing sources are excluded, never
    /// fatal.
    pub async fn build_report(
        &self,
        sources: &[Arc<dyn ModuleDataSource>],
        window: &ReportWindow,
    ) -> Report {
        let deadline = Instant::now() + self.deadline;
        let headline = self.collect(sources, window.end(), deadline).await;

        let mut trends = Vec::new();
        for point in window.points() {
            let composite_score = if point == window.end() {
                headline.overview().map(|overview| overview.composite_score)
            } else {
                self.collect(sources, point, deadline)
                    .await
                    .overview()
                    .map(|overview| overview.composite_score)
            };
            trends.push(TrendPoint {
                timestamp: point,
                composite_score,
            });
        }

        let mut recommendations: Vec<Recommendation> = headline
            .modules
            .iter()
            .flat_map(|module| {
                self.recommendations
                    .generate(&module.score, &module.snapshot.metrics)
                    .into_iter()
                    .map(|recommendation| recommendation.for_module(&module.name))
            })
            .collect();
        rank(&mut recommendations);

        let risk_assessment = assess(&headline.risk_factors());
        let overview = headline.overview();

        info!(
            as_of = %window.end(),
            scored = headline.modules.len(),
            excluded = headline.excluded.len(),
            trend_points = trends.len(),
            composite = ?overview.as_ref().map(|overview| overview.composite_score),
            risk = risk_assessment.band.label(),
            "report built"
        );

        Report {
            overview,
            recommendations,
            risk_assessment,
            trends,
            excluded: headline.excluded,
        }
    }

    async fn collect(
        &self,
        sources: &[Arc<dyn ModuleDataSource>],
        as_of: NaiveDate,
        deadline: Instant,
    ) -> Collection {
        let window = SnapshotWindow { as_of };
        let mut collection = Collection::default();

        let mut fetchable = Vec::new();
        for source in sources {
            let weight = source.weight();
            if MODULE_WEIGHT_RANGE.contains(&weight) {
                fetchable.push(source);
                continue;
            }
            let err = ConfigError::InvalidWeight {
                module: source.name().to_string(),
                weight,
            };
            warn!(module = source.name(), %as_of, error = %err, "module excluded from report");
            collection.excluded.push(ExcludedModule {
                module: source.name().to_string(),
                kind: ExclusionKind::Config,
                message: err.to_string(),
            });
        }

        let results = join_all(
            fetchable
                .iter()
                .map(|source| self.fetch(source.as_ref(), &window, deadline)),
        )
        .await;

        for (source, result) in fetchable.into_iter().zip(results) {
            match result {
                Ok(snapshot) => {
                    let module_score = score(&snapshot.metrics, &self.bands);
                    debug!(
                        module = source.name(),
                        %as_of,
                        records = snapshot.record_count,
                        score = module_score.value,
                        "module scored"
                    );
                    collection.modules.push(ScoredModule {
                        name: source.name().to_string(),
                        weight: source.weight(),
                        snapshot,
                        score: module_score,
                    });
                }
                Err(err) => {
                    warn!(module = source.name(), %as_of, error = %err, "module excluded from report");
                    collection.excluded.push(ExcludedModule {
                        module: source.name().to_string(),
                        kind: exclusion_kind(&err),
                        message: err.to_string(),
                    });
                }
            }
        }

        collection
    }

    async fn fetch(
        &self,
        source: &dyn ModuleDataSource,
        window: &SnapshotWindow,
        deadline: Instant,
    ) -> Result<ModuleSnapshot, FetchError> {
        let started = Instant::now();
        let budget = (started + self.fetch_timeout).min(deadline);

        let snapshot = timeout_at(budget, source.fetch_snapshot(window))
            .await
            .map_err(|_| FetchError::Timeout(budget.saturating_duration_since(started)))??;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

fn exclusion_kind(err: &FetchError) -> ExclusionKind {
    match err {
        FetchError::Unavailable(_) => ExclusionKind::Unavailable,
        FetchError::Timeout(_) => ExclusionKind::Timeout,
        FetchError::Malformed(_) => ExclusionKind::Malformed,
    }
}
