use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;

use super::domain::{EligibilityCriteriaSet, EvaluationType};
use super::rules::{ParseError, Rule};
use crate::config::{read_document, ConfigError};

/// Immutable, versioned collection of criteria sets.
///
/// Edits return a new configuration with the version incremented, so every
/// decision can name the exact configuration it was evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibilityConfig {
    version: u64,
    sets: Vec<EligibilityCriteriaSet>,
}

/// Automatic requirement whose rule does not parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDiagnostic {
    pub request_type: String,
    pub requirement_id: String,
    pub rule: String,
    pub offset: usize,
    pub message: String,
}

impl EligibilityConfig {
    pub fn new(sets: Vec<EligibilityCriteriaSet>) -> Result<Self, ConfigError> {
        Self::with_version(1, sets)
    }

    pub fn with_version(
        version: u64,
        sets: Vec<EligibilityCriteriaSet>,
    ) -> Result<Self, ConfigError> {
        let mut request_types = HashSet::new();
        for set in &sets {
            if !request_types.insert(set.request_type.as_str()) {
                return Err(ConfigError::DuplicateRequestType(set.request_type.clone()));
            }

            let mut ids = HashSet::new();
            for requirement in &set.requirements {
                if !ids.insert(requirement.id.as_str()) {
                    return Err(ConfigError::DuplicateRequirementId {
                        request_type: set.request_type.clone(),
                        requirement_id: requirement.id.clone(),
                    });
                }
            }
        }

        Ok(Self { version, sets })
    }

    /// Parse the JSON array of criteria sets read and written by the admin UI.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let sets: Vec<EligibilityCriteriaSet> = serde_json::from_str(raw)?;
        Self::new(sets)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&read_document(path)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(&self.sets)?)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn sets(&self) -> &[EligibilityCriteriaSet] {
        &self.sets
    }

    pub fn criteria_set(&self, request_type: &str) -> Option<&EligibilityCriteriaSet> {
        self.sets.iter().find(|set| set.request_type == request_type)
    }

    /// Toggle a requirement without deleting it.
    pub fn with_requirement_active(
        &self,
        request_type: &str,
        requirement_id: &str,
        active: bool,
    ) -> Option<Self> {
        let mut sets = self.sets.clone();
        let requirement = sets
            .iter_mut()
            .find(|set| set.request_type == request_type)?
            .requirements
            .iter_mut()
            .find(|requirement| requirement.id == requirement_id)?;
        requirement.active = active;

        Some(Self {
            version: self.version + 1,
            sets,
        })
    }

    /// Insert or replace the criteria set for `set.request_type`.
    pub fn with_criteria_set(&self, set: EligibilityCriteriaSet) -> Result<Self, ConfigError> {
        let mut sets = self.sets.clone();
        match sets
            .iter_mut()
            .find(|existing| existing.request_type == set.request_type)
        {
            Some(existing) => *existing = set,
            None => sets.push(set),
        }
        Self::with_version(self.version + 1, sets)
    }

    pub fn rule_diagnostics(&self) -> Vec<RuleDiagnostic> {
        let mut diagnostics = Vec::new();
        for set in &self.sets {
            for requirement in &set.requirements {
                if requirement.evaluation_type != EvaluationType::Automatic {
                    continue;
                }
                let Some(rule) = requirement.rule.as_deref() else {
                    diagnostics.push(RuleDiagnostic {
                        request_type: set.request_type.clone(),
                        requirement_id: requirement.id.clone(),
                        rule: String::new(),
                        offset: 0,
                        message: "automatic requirement has no rule".to_string(),
                    });
                    continue;
                };
                if let Err(ParseError { offset, message }) = Rule::parse(rule) {
                    diagnostics.push(RuleDiagnostic {
                        request_type: set.request_type.clone(),
                        requirement_id: requirement.id.clone(),
                        rule: rule.to_string(),
                        offset,
                        message,
                    });
                }
            }
        }
        diagnostics
    }
}
