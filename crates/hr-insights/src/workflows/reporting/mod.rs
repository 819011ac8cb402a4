//! Cross-module reporting: concurrent snapshot collection from every HR
//! module, consolidated into scores, recommendations, risk and trends.

mod aggregator;
pub mod source;
pub mod views;
mod window;

#[cfg(test)]
mod tests;

pub use aggregator::{ReportAggregator, MODULE_WEIGHT_RANGE};
pub use source::{FetchError, ModuleDataSource, ModuleSnapshot, SnapshotWindow, StaticModuleSource};
pub use views::{ExcludedModule, ExclusionKind, ModuleScore, Overview, Report, TrendPoint};
pub use window::{ReportWindow, MAX_TREND_POINTS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    #[error("invalid report window: {0}")]
    InvalidWindow(String),
}
