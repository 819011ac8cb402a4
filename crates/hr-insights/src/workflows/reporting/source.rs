use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::workflows::performance::{ComplianceSignals, MetricSample};

/// Point in time a module is asked to report on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotWindow {
    pub as_of: NaiveDate,
}

/// Metrics and compliance signals one HR module reports for a snapshot date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSnapshot {
    pub record_count: u64,
    #[serde(default)]
    pub metrics: Vec<MetricSample>,
    #[serde(default)]
    pub compliance: Option<ComplianceSignals>,
}

impl ModuleSnapshot {
    /// Reject snapshots the scoring pipeline cannot interpret.
    pub fn validate(&self) -> Result<(), FetchError> {
        if let Some(sample) = self.metrics.iter().find(|sample| sample.name.trim().is_empty()) {
            return Err(FetchError::Malformed(format!(
                "metric with value {} has no name",
                sample.value
            )));
        }

        if let Some(signals) = &self.compliance {
            let rates = [
                ("policyAdherence", signals.policy_adherence),
                ("auditTrailCompleteness", signals.audit_trail_completeness),
                ("retentionCompliance", signals.retention_compliance),
            ];
            for (field, rate) in rates {
                if !(0.0..=100.0).contains(&rate) {
                    return Err(FetchError::Malformed(format!(
                        "{field} {rate} is not a percentage"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("module data unavailable: {0}")]
    Unavailable(String),
    #[error("module did not respond within {0:?}")]
    Timeout(Duration),
    #[error("malformed module snapshot: {0}")]
    Malformed(String),
}

/// Per-module adapter supplying snapshots to the report aggregator.
#[async_trait]
pub trait ModuleDataSource: Send + Sync {
    fn name(&self) -> &str;

    /// Relative importance in the overview, valid range `1..=10`.
    fn weight(&self) -> u8;

    async fn fetch_snapshot(&self, window: &SnapshotWindow) -> Result<ModuleSnapshot, FetchError>;
}

/// Source answering every window with the same prepared outcome, optionally
/// after a simulated delay.
#[derive(Debug, Clone)]
pub struct StaticModuleSource {
    name: String,
    weight: u8,
    outcome: Result<ModuleSnapshot, FetchError>,
    latency: Option<Duration>,
}

impl StaticModuleSource {
    pub fn new(name: impl Into<String>, weight: u8, snapshot: ModuleSnapshot) -> Self {
        Self {
            name: name.into(),
            weight,
            outcome: Ok(snapshot),
            latency: None,
        }
    }

    pub fn failing(name: impl Into<String>, weight: u8, error: FetchError) -> Self {
        Self {
            name: name.into(),
            weight,
            outcome: Err(error),
            latency: None,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }
}

#[async_trait]
impl ModuleDataSource for StaticModuleSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> u8 {
        self.weight
    }

    async fn fetch_snapshot(&self, _window: &SnapshotWindow) -> Result<ModuleSnapshot, FetchError> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.outcome.clone()
    }
}
