use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::workflows::performance::{ComplianceSignals, MetricSample};
use crate::workflows::reporting::{
    FetchError, ModuleDataSource, ModuleSnapshot, SnapshotWindow, StaticModuleSource,
};

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn snapshot(metrics: &[(&str, f64)]) -> ModuleSnapshot {
    ModuleSnapshot {
        record_count: 120,
        metrics: metrics
            .iter()
            .map(|&(name, value)| MetricSample::new(name, value, ""))
            .collect(),
        compliance: None,
    }
}

pub(super) fn healthy_signals() -> ComplianceSignals {
    ComplianceSignals {
        policy_adherence: 98.0,
        audit_trail_completeness: 99.0,
        retention_compliance: 99.0,
        unresolved_critical_violations: 0,
    }
}

pub(super) fn source(name: &str, weight: u8, snapshot: ModuleSnapshot) -> Arc<dyn ModuleDataSource> {
    Arc::new(StaticModuleSource::new(name, weight, snapshot))
}

pub(super) fn failing(name: &str, weight: u8, error: FetchError) -> Arc<dyn ModuleDataSource> {
    Arc::new(StaticModuleSource::failing(name, weight, error))
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Source with a distinct snapshot per date; other dates are unavailable.
pub(super) struct DatedSource {
    pub name: &'static str,
    pub weight: u8,
    pub snapshots: BTreeMap<NaiveDate, ModuleSnapshot>,
}

#[async_trait]
impl ModuleDataSource for DatedSource {
    fn name(&self) -> &str {
        self.name
    }

    fn weight(&self) -> u8 {
        self.weight
    }

    async fn fetch_snapshot(&self, window: &SnapshotWindow) -> Result<ModuleSnapshot, FetchError> {
        self.snapshots
            .get(&window.as_of)
            .cloned()
            .ok_or_else(|| FetchError::Unavailable(format!("no snapshot for {}", window.as_of)))
    }
}
