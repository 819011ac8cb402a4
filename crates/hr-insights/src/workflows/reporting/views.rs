use chrono::NaiveDate;
use serde::Serialize;

use crate::workflows::performance::{Recommendation, RiskAssessment};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleScore {
    pub name: String,
    pub weight: u8,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub composite_score: f64,
    pub per_module: Vec<ModuleScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub timestamp: NaiveDate,
    pub composite_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionKind {
    Unavailable,
    Timeout,
    Malformed,
    Config,
}

impl ExclusionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExclusionKind::Unavailable => "unavailable",
            ExclusionKind::Timeout => "timeout",
            ExclusionKind::Malformed => "malformed",
            ExclusionKind::Config => "config",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedModule {
    pub module: String,
    pub kind: ExclusionKind,
    pub message: String,
}

/// Consolidated analytics for the HR administration modules as of the end
/// of the report window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// `None` when no module could be scored.
    pub overview: Option<Overview>,
    pub recommendations: Vec<Recommendation>,
    pub risk_assessment: RiskAssessment,
    pub trends: Vec<TrendPoint>,
    pub excluded: Vec<ExcludedModule>,
}

impl Report {
    pub fn composite_score(&self) -> Option<f64> {
        self.overview.as_ref().map(|overview| overview.composite_score)
    }

    pub fn module_score(&self, name: &str) -> Option<&ModuleScore> {
        self.overview
            .as_ref()?
            .per_module
            .iter()
            .find(|module| module.name == name)
    }
}
