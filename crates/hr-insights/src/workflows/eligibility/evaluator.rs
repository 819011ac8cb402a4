use std::collections::HashMap;

use tracing::debug;

use super::config::EligibilityConfig;
use super::context::EvaluationContext;
use super::domain::{
    EligibilityCriteriaSet, EligibilityDecision, EvaluationType, OverallEligibility, Requirement,
    RequirementPriority, RequirementVerdict, Satisfaction,
};
use super::rules::{ParseError, Rule};

#[derive(Debug, thiserror::Error)]
pub enum EligibilityError {
    #[error("no eligibility criteria configured for request type '{0}'")]
    UnknownRequestType(String),
}

#[derive(Debug, Clone)]
struct CompiledRequirement {
    requirement: Requirement,
    rule: Option<Result<Rule, ParseError>>,
}

/// A criteria set whose rules have been parsed once up front.
#[derive(Debug, Clone)]
pub struct CompiledCriteriaSet {
    request_type: String,
    config_version: u64,
    requirements: Vec<CompiledRequirement>,
}

impl CompiledCriteriaSet {
    pub fn compile(set: &EligibilityCriteriaSet, config_version: u64) -> Self {
        let requirements = set
            .requirements
            .iter()
            .map(|requirement| CompiledRequirement {
                requirement: requirement.clone(),
                rule: requirement.rule.as_deref().map(Rule::parse),
            })
            .collect();

        Self {
            request_type: set.request_type.clone(),
            config_version,
            requirements,
        }
    }

    pub fn evaluate(&self, context: &EvaluationContext) -> EligibilityDecision {
        let verdicts: Vec<RequirementVerdict> = self
            .requirements
            .iter()
            .filter(|compiled| compiled.requirement.active)
            .map(|compiled| compiled.verdict(context))
            .collect();

        let blocking_failures: Vec<RequirementVerdict> = verdicts
            .iter()
            .filter(|verdict| {
                verdict.priority == RequirementPriority::High
                    && verdict.satisfied == Satisfaction::Unsatisfied
            })
            .cloned()
            .collect();

        let warnings = verdicts
            .iter()
            .filter(|verdict| {
                verdict.priority == RequirementPriority::Medium
                    && verdict.satisfied == Satisfaction::Unsatisfied
            })
            .cloned()
            .collect();

        let pending: Vec<RequirementVerdict> = verdicts
            .iter()
            .filter(|verdict| verdict.satisfied == Satisfaction::Unknown)
            .cloned()
            .collect();

        let overall = if !blocking_failures.is_empty() {
            OverallEligibility::Ineligible
        } else if pending
            .iter()
            .any(|verdict| verdict.priority == RequirementPriority::High)
        {
            OverallEligibility::PendingApproval
        } else {
            OverallEligibility::Eligible
        };

        debug!(
            request_type = %self.request_type,
            config_version = self.config_version,
            overall = overall.label(),
            evaluated = verdicts.len(),
            "eligibility evaluated"
        );

        EligibilityDecision {
            request_type: self.request_type.clone(),
            config_version: self.config_version,
            overall,
            blocking_failures,
            warnings,
            pending,
            verdicts,
        }
    }
}

impl CompiledRequirement {
    fn verdict(&self, context: &EvaluationContext) -> RequirementVerdict {
        let requirement = &self.requirement;
        let (satisfied, reason) = match requirement.evaluation_type {
            EvaluationType::Automatic => match &self.rule {
                Some(Ok(rule)) => match rule.evaluate(context) {
                    Ok(true) => (Satisfaction::Satisfied, format!("rule `{rule}` holds")),
                    Ok(false) => (Satisfaction::Unsatisfied, format!("rule `{rule}` not met")),
                    Err(err) => (Satisfaction::Unsatisfied, err.to_string()),
                },
                Some(Err(err)) => (Satisfaction::Unsatisfied, err.to_string()),
                None => (
                    Satisfaction::Unsatisfied,
                    "automatic requirement has no rule".to_string(),
                ),
            },
            EvaluationType::ManualApproval | EvaluationType::Custom => (
                Satisfaction::Unknown,
                format!("awaiting {}", requirement.evaluation_type.label()),
            ),
        };

        RequirementVerdict {
            requirement_id: requirement.id.clone(),
            priority: requirement.priority,
            satisfied,
            reason,
        }
    }
}

/// Apply a criteria set to a request context without a surrounding
/// configuration; the decision reports configuration version 0.
pub fn evaluate(set: &EligibilityCriteriaSet, context: &EvaluationContext) -> EligibilityDecision {
    CompiledCriteriaSet::compile(set, 0).evaluate(context)
}

/// Evaluator holding every criteria set of one configuration version, compiled.
#[derive(Debug, Clone)]
pub struct EligibilityEvaluator {
    config: EligibilityConfig,
    compiled: HashMap<String, CompiledCriteriaSet>,
}

impl EligibilityEvaluator {
    pub fn new(config: EligibilityConfig) -> Self {
        let compiled = config
            .sets()
            .iter()
            .map(|set| {
                (
                    set.request_type.clone(),
                    CompiledCriteriaSet::compile(set, config.version()),
                )
            })
            .collect();

        Self { config, compiled }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    pub fn evaluate(
        &self,
        request_type: &str,
        context: &EvaluationContext,
    ) -> Result<EligibilityDecision, EligibilityError> {
        let compiled = self
            .compiled
            .get(request_type)
            .ok_or_else(|| EligibilityError::UnknownRequestType(request_type.to_string()))?;
        Ok(compiled.evaluate(context))
    }
}
