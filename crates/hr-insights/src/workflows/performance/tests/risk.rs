use super::common::*;
use crate::workflows::performance::{
    assess, factors_from_signals, ComplianceSignals, RiskBand, RiskFactor, RiskFactorKind,
};

fn healthy() -> ComplianceSignals {
    ComplianceSignals {
        policy_adherence: 98.0,
        audit_trail_completeness: 99.0,
        retention_compliance: 97.0,
        unresolved_critical_violations: 0,
    }
}

fn factor(kind: RiskFactorKind, weight: f64) -> RiskFactor {
    RiskFactor {
        kind,
        description: format!("{kind:?} at {weight}"),
        weight,
    }
}

#[test]
fn no_factors_is_low_risk() {
    let assessment = assess(&[]);

    assert_eq!(assessment.band, RiskBand::Low);
    assert_eq!(assessment.score, 0.0);
    assert!(assessment.risk_factors.is_empty());
    assert!(assessment.mitigations.is_empty());
}

#[test]
fn band_cutoffs() {
    assert_eq!(RiskBand::from_score(14.9), RiskBand::Low);
    assert_eq!(RiskBand::from_score(15.0), RiskBand::Medium);
    assert_eq!(RiskBand::from_score(29.9), RiskBand::Medium);
    assert_eq!(RiskBand::from_score(30.0), RiskBand::High);
    assert_eq!(RiskBand::from_score(50.0), RiskBand::Critical);
    assert!(RiskBand::Low < RiskBand::Medium);
    assert!(RiskBand::High < RiskBand::Critical);
}

#[test]
fn healthy_signals_produce_no_factors() {
    assert!(factors_from_signals("leave", &healthy()).is_empty());
}

#[test]
fn compliance_gaps_become_weighted_factors() {
    let signals = ComplianceSignals {
        policy_adherence: 85.0,
        audit_trail_completeness: 92.0,
        unresolved_critical_violations: 2,
        ..healthy()
    };

    let factors = factors_from_signals("leave", &signals);
    let kinds: Vec<RiskFactorKind> = factors.iter().map(|factor| factor.kind).collect();

    assert_eq!(
        kinds,
        vec![
            RiskFactorKind::CriticalPolicyViolations,
            RiskFactorKind::AuditTrailGap,
            RiskFactorKind::PolicyAdherenceGap,
        ]
    );
    assert_close(factors[0].weight, 30.0);
    assert_close(factors[1].weight, 13.0);
    assert_close(factors[2].weight, 2.5);
    assert!(factors.iter().all(|factor| factor.description.starts_with("leave: ")));

    let assessment = assess(&factors);

    assert_close(assessment.score, 45.5);
    assert_eq!(assessment.band, RiskBand::High);
    // adherence gap sits exactly on its reporting threshold
    assert_eq!(assessment.risk_factors.len(), 2);
    assert_eq!(assessment.mitigations.len(), 2);
}

#[test]
fn critical_violation_weight_is_capped() {
    let signals = ComplianceSignals {
        unresolved_critical_violations: 9,
        audit_trail_completeness: 80.0,
        ..healthy()
    };

    let factors = factors_from_signals("payroll", &signals);
    let assessment = assess(&factors);

    assert_close(factors[0].weight, 45.0);
    assert_close(assessment.score, 70.0);
    assert_eq!(assessment.band, RiskBand::Critical);
}

#[test]
fn each_reported_factor_has_exactly_one_mitigation() {
    let factors = [
        factor(RiskFactorKind::RetentionGap, 12.0),
        factor(RiskFactorKind::Other, 3.0),
        factor(RiskFactorKind::CriticalPolicyViolations, 15.0),
        factor(RiskFactorKind::PolicyAdherenceGap, 4.0),
    ];

    let assessment = assess(&factors);

    let reported: Vec<&RiskFactor> = factors
        .iter()
        .filter(|factor| factor.kind != RiskFactorKind::Other)
        .collect();
    assert_eq!(assessment.risk_factors.len(), reported.len());
    assert_eq!(assessment.mitigations.len(), reported.len());
    for (index, factor) in reported.iter().enumerate() {
        assert_eq!(assessment.risk_factors[index], factor.description);
        assert_eq!(assessment.mitigations[index], factor.kind.mitigation());
    }
    assert_close(assessment.score, 34.0);
    assert_eq!(assessment.band, RiskBand::High);
}

#[test]
fn negative_weights_do_not_lower_risk() {
    let assessment = assess(&[
        factor(RiskFactorKind::AuditTrailGap, 20.0),
        factor(RiskFactorKind::Other, -50.0),
    ]);

    assert_close(assessment.score, 20.0);
    assert_eq!(assessment.band, RiskBand::Medium);
}

#[test]
fn assessment_serializes_factors_key() {
    let assessment = assess(&[factor(RiskFactorKind::RetentionGap, 16.0)]);

    let json = serde_json::to_value(&assessment).expect("serializable");

    assert_eq!(json["band"], "medium");
    assert_eq!(json["factors"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["mitigations"].as_array().map(Vec::len), Some(1));
}
