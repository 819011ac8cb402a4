//! Performance and compliance analytics: band-based metric scoring, weighted
//! risk assessment and ranked remediation advice.

pub mod recommendations;
pub mod risk;
pub mod scoring;

#[cfg(test)]
mod tests;

pub use recommendations::{
    generate, priority_score, rank, Effort, Impact, Recommendation, RecommendationCategory,
    RecommendationEngine, RecommendThreshold, RecommendThresholds, Remediation,
    RemediationCatalog,
};
pub use risk::{
    assess, factors_from_signals, ComplianceSignals, RiskAssessment, RiskBand, RiskFactor,
    RiskFactorKind,
};
pub use scoring::{
    score, BandDirection, BandStep, CompositeScore, MetricSample, ScoreBand, ScoreBands,
    ScoreContribution, MAX_SCORE,
};
