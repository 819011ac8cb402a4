//! Scoring, risk-assessment and rule-based recommendation engine behind the
//! HR administration eligibility manager, performance optimization and
//! cross-module reporting features.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
