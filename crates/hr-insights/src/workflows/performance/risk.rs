use serde::{Deserialize, Serialize};

pub const MEDIUM_RISK_CUTOFF: f64 = 15.0;
pub const HIGH_RISK_CUTOFF: f64 = 30.0;
pub const CRITICAL_RISK_CUTOFF: f64 = 50.0;

/// Compliance rates below this percentage are first-class risk triggers.
pub const COMPLIANCE_FLOOR_PCT: f64 = 95.0;
pub const POLICY_ADHERENCE_FLOOR_PCT: f64 = 90.0;

const CRITICAL_VIOLATION_WEIGHT: f64 = 15.0;
const CRITICAL_VIOLATION_CAP: f64 = 45.0;
const COMPLIANCE_GAP_BASE_WEIGHT: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskBand {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskBand {
    /// `low < 15 <= medium < 30 <= high < 50 <= critical`
    pub fn from_score(score: f64) -> Self {
        if score >= CRITICAL_RISK_CUTOFF {
            RiskBand::Critical
        } else if score >= HIGH_RISK_CUTOFF {
            RiskBand::High
        } else if score >= MEDIUM_RISK_CUTOFF {
            RiskBand::Medium
        } else {
            RiskBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Medium => "medium",
            RiskBand::High => "high",
            RiskBand::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskFactorKind {
    CriticalPolicyViolations,
    AuditTrailGap,
    RetentionGap,
    PolicyAdherenceGap,
    Other,
}

impl RiskFactorKind {
    /// Weight a factor must exceed before it is reported individually.
    pub fn reporting_threshold(&self) -> f64 {
        match self {
            RiskFactorKind::CriticalPolicyViolations => 0.0,
            RiskFactorKind::AuditTrailGap | RiskFactorKind::RetentionGap => 5.0,
            RiskFactorKind::PolicyAdherenceGap => 2.5,
            RiskFactorKind::Other => 5.0,
        }
    }

    pub fn mitigation(&self) -> &'static str {
        match self {
            RiskFactorKind::CriticalPolicyViolations => {
                "Assign an owner to every open critical violation and track it to closure"
            }
            RiskFactorKind::AuditTrailGap => {
                "Backfill missing audit entries and enforce audit logging on every record change"
            }
            RiskFactorKind::RetentionGap => {
                "Run the retention schedule and purge or archive records past their retention date"
            }
            RiskFactorKind::PolicyAdherenceGap => {
                "Schedule policy refresher training for teams below the adherence target"
            }
            RiskFactorKind::Other => "Review the flagged area with the compliance coordinator",
        }
    }
}

/// Weighted contributor to a composite risk score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub kind: RiskFactorKind,
    pub description: String,
    pub weight: f64,
}

/// Normalized compliance sub-scores reported by a module snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceSignals {
    pub policy_adherence: f64,
    pub audit_trail_completeness: f64,
    pub retention_compliance: f64,
    pub unresolved_critical_violations: u32,
}

/// Derive weighted risk factors for one module from its compliance signals.
pub fn factors_from_signals(module: &str, signals: &ComplianceSignals) -> Vec<RiskFactor> {
    let mut factors = Vec::new();

    if signals.unresolved_critical_violations > 0 {
        let count = signals.unresolved_critical_violations;
        factors.push(RiskFactor {
            kind: RiskFactorKind::CriticalPolicyViolations,
            description: format!("{module}: {count} unresolved critical policy violation(s)"),
            weight: (CRITICAL_VIOLATION_WEIGHT * count as f64).min(CRITICAL_VIOLATION_CAP),
        });
    }

    if signals.audit_trail_completeness < COMPLIANCE_FLOOR_PCT {
        factors.push(RiskFactor {
            kind: RiskFactorKind::AuditTrailGap,
            description: format!(
                "{module}: audit trail {:.1}% complete (target {COMPLIANCE_FLOOR_PCT}%)",
                signals.audit_trail_completeness
            ),
            weight: COMPLIANCE_GAP_BASE_WEIGHT
                + (COMPLIANCE_FLOOR_PCT - signals.audit_trail_completeness),
        });
    }

    if signals.retention_compliance < COMPLIANCE_FLOOR_PCT {
        factors.push(RiskFactor {
            kind: RiskFactorKind::RetentionGap,
            description: format!(
                "{module}: retention compliance at {:.1}% (target {COMPLIANCE_FLOOR_PCT}%)",
                signals.retention_compliance
            ),
            weight: COMPLIANCE_GAP_BASE_WEIGHT
                + (COMPLIANCE_FLOOR_PCT - signals.retention_compliance),
        });
    }

    if signals.policy_adherence < POLICY_ADHERENCE_FLOOR_PCT {
        factors.push(RiskFactor {
            kind: RiskFactorKind::PolicyAdherenceGap,
            description: format!(
                "{module}: policy adherence at {:.1}% (target {POLICY_ADHERENCE_FLOOR_PCT}%)",
                signals.policy_adherence
            ),
            weight: (POLICY_ADHERENCE_FLOOR_PCT - signals.policy_adherence) / 2.0,
        });
    }

    factors
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub band: RiskBand,
    pub score: f64,
    #[serde(rename = "factors")]
    pub risk_factors: Vec<String>,
    pub mitigations: Vec<String>,
}

/// Sum factor weights into a band; each factor above its kind's threshold
/// contributes one description and exactly one mitigation.
pub fn assess(factors: &[RiskFactor]) -> RiskAssessment {
    let score = factors
        .iter()
        .fold(0.0, |total, factor| total + factor.weight.max(0.0));

    let (risk_factors, mitigations) = factors
        .iter()
        .filter(|factor| factor.weight > factor.kind.reporting_threshold())
        .map(|factor| {
            (
                factor.description.clone(),
                factor.kind.mitigation().to_string(),
            )
        })
        .unzip();

    RiskAssessment {
        band: RiskBand::from_score(score),
        score,
        risk_factors,
        mitigations,
    }
}
