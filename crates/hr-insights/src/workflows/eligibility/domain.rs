use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// How a requirement is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvaluationType {
    Automatic,
    ManualApproval,
    Custom,
}

impl EvaluationType {
    pub fn label(&self) -> &'static str {
        match self {
            EvaluationType::Automatic => "automatic",
            EvaluationType::ManualApproval => "manual approval",
            EvaluationType::Custom => "custom review",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementPriority {
    High,
    Medium,
    Low,
}

/// One gate within an eligibility criteria set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub evaluation_type: EvaluationType,
    pub rule: Option<String>,
    pub priority: RequirementPriority,
    pub active: bool,
}

/// Ordered requirements gating one request type (e.g. "leave", "equipment").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriteriaSet {
    pub request_type: String,
    pub requirements: Vec<Requirement>,
}

impl EligibilityCriteriaSet {
    pub fn requirement(&self, id: &str) -> Option<&Requirement> {
        self.requirements
            .iter()
            .find(|requirement| requirement.id == id)
    }

    pub fn active_requirements(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements
            .iter()
            .filter(|requirement| requirement.active)
    }
}

/// Tri-state outcome of a single requirement, serialized as `true`, `false`
/// or `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfaction {
    Satisfied,
    Unsatisfied,
    /// Awaiting a human decision from the approval workflow.
    Unknown,
}

impl Satisfaction {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::Satisfied
        } else {
            Self::Unsatisfied
        }
    }
}

impl Serialize for Satisfaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Satisfaction::Satisfied => serializer.serialize_bool(true),
            Satisfaction::Unsatisfied => serializer.serialize_bool(false),
            Satisfaction::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for Satisfaction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(value) => Ok(Satisfaction::from_bool(value)),
            Raw::Marker(marker) if marker == "unknown" => Ok(Satisfaction::Unknown),
            Raw::Marker(other) => Err(serde::de::Error::custom(format!(
                "expected true, false or \"unknown\", found \"{other}\""
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementVerdict {
    pub requirement_id: String,
    pub priority: RequirementPriority,
    pub satisfied: Satisfaction,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverallEligibility {
    Eligible,
    Ineligible,
    PendingApproval,
}

impl OverallEligibility {
    pub fn label(&self) -> &'static str {
        match self {
            OverallEligibility::Eligible => "eligible",
            OverallEligibility::Ineligible => "ineligible",
            OverallEligibility::PendingApproval => "pending approval",
        }
    }
}

/// Result of applying a criteria set to one request context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityDecision {
    pub request_type: String,
    pub config_version: u64,
    pub overall: OverallEligibility,
    pub blocking_failures: Vec<RequirementVerdict>,
    pub warnings: Vec<RequirementVerdict>,
    /// Verdicts routed to the approval workflow.
    pub pending: Vec<RequirementVerdict>,
    pub verdicts: Vec<RequirementVerdict>,
}

impl EligibilityDecision {
    pub fn summary(&self) -> String {
        match self.overall {
            OverallEligibility::Eligible if self.warnings.is_empty() => {
                "request is eligible".to_string()
            }
            OverallEligibility::Eligible => format!(
                "request is eligible with {} warning(s): {}",
                self.warnings.len(),
                reasons(&self.warnings)
            ),
            OverallEligibility::Ineligible => {
                format!("request is ineligible: {}", reasons(&self.blocking_failures))
            }
            OverallEligibility::PendingApproval => format!(
                "request awaits approval: {}",
                reasons(
                    &self
                        .pending
                        .iter()
                        .filter(|verdict| verdict.priority == RequirementPriority::High)
                        .cloned()
                        .collect::<Vec<_>>()
                )
            ),
        }
    }
}

fn reasons(verdicts: &[RequirementVerdict]) -> String {
    verdicts
        .iter()
        .map(|verdict| format!("{} ({})", verdict.requirement_id, verdict.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
