//! Eligibility manager: requirement rules applied to a request's runtime
//! context at submission time.

mod config;
pub mod context;
pub mod domain;
mod evaluator;
pub mod rules;

#[cfg(test)]
mod tests;

pub use config::{EligibilityConfig, RuleDiagnostic};
pub use context::{ContextValue, EvaluationContext};
pub use domain::{
    EligibilityCriteriaSet, EligibilityDecision, EvaluationType, OverallEligibility, Requirement,
    RequirementPriority, RequirementVerdict, Satisfaction,
};
pub use evaluator::{evaluate, CompiledCriteriaSet, EligibilityError, EligibilityEvaluator};
pub use rules::{ParseError, Rule, RuleError};
