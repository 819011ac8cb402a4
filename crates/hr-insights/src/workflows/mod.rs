pub mod eligibility;
pub mod performance;
pub mod reporting;
