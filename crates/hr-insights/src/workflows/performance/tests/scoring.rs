use super::common::*;
use crate::config::ConfigError;
use crate::workflows::performance::{score, BandDirection, ScoreBand, ScoreBands, MAX_SCORE};

#[test]
fn no_samples_scores_full_marks() {
    let composite = score(&[], &ScoreBands::standard());

    assert_eq!(composite.value, MAX_SCORE);
    assert!(composite.components.is_empty());
    assert!(composite.unscored.is_empty());
}

#[test]
fn deducts_first_step_crossed() {
    let bands = ScoreBands::standard();

    assert_eq!(score(&[sample("largest_contentful_paint", 2.5)], &bands).value, 100.0);
    assert_eq!(score(&[sample("largest_contentful_paint", 3.0)], &bands).value, 85.0);
    assert_eq!(score(&[sample("largest_contentful_paint", 5.0)], &bands).value, 70.0);
}

#[test]
fn lower_is_worse_bands_deduct_below_threshold() {
    let bands = ScoreBands::standard();

    let composite = score(&[sample("policy_adherence", 85.0)], &bands);

    assert_eq!(composite.value, 85.0);
    assert_eq!(composite.components.len(), 1);
    assert_eq!(composite.components[0].name, "policy_adherence");
    assert_eq!(composite.components[0].contribution, -15.0);
    assert_eq!(score(&[sample("policy_adherence", 99.0)], &bands).value, 100.0);
}

#[test]
fn worsening_a_metric_never_raises_the_score() {
    let bands = ScoreBands::standard();
    let values = [0.5, 1.0, 2.5, 2.6, 3.9, 4.0, 4.1, 10.0];

    let scores: Vec<f64> = values
        .iter()
        .map(|&value| score(&[sample("largest_contentful_paint", value)], &bands).value)
        .collect();

    assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]), "{scores:?}");
}

#[test]
fn total_is_clamped_at_zero() {
    let samples = [
        sample("largest_contentful_paint", 5.0),
        sample("first_input_delay", 400.0),
        sample("cumulative_layout_shift", 0.3),
        sample("time_to_first_byte", 2000.0),
        sample("error_rate", 6.0),
    ];

    let composite = score(&samples, &ScoreBands::standard());

    assert_eq!(composite.value, 0.0);
    assert_eq!(composite.components.len(), 5);
}

#[test]
fn unbanded_samples_are_informational() {
    let composite = score(&[sample("headcount", 412.0)], &ScoreBands::standard());

    assert_eq!(composite.value, 100.0);
    assert!(composite.components.is_empty());
    assert!(composite.unscored.is_empty());
}

#[test]
fn malformed_band_leaves_metric_unscored() {
    let bands = ScoreBands::standard().with_band(
        "onboarding_days",
        ScoreBand::higher_is_worse(&[(30.0, 5.0), (14.0, 20.0)]),
    );
    let samples = [
        sample("onboarding_days", 45.0),
        sample("onboarding_days", 50.0),
        sample("largest_contentful_paint", 3.0),
    ];

    let composite = score(&samples, &bands);

    assert_eq!(composite.value, 85.0);
    assert_eq!(composite.unscored, vec!["onboarding_days".to_string()]);
    assert_eq!(bands.invalid_bands().len(), 1);
}

#[test]
fn non_finite_samples_are_unscored() {
    let composite = score(&[sample("error_rate", f64::NAN)], &ScoreBands::standard());

    assert_eq!(composite.value, 100.0);
    assert_eq!(composite.unscored, vec!["error_rate".to_string()]);
}

#[test]
fn band_validation_rejects_disordered_steps() {
    let unordered = ScoreBand::lower_is_worse(&[(95.0, 5.0), (80.0, 30.0)]);
    let negative = ScoreBand::higher_is_worse(&[(10.0, -1.0)]);
    let infinite = ScoreBand::higher_is_worse(&[(f64::INFINITY, 1.0)]);

    for band in [unordered, negative, infinite] {
        let err = band.validate("metric").expect_err("band must be rejected");
        assert!(matches!(err, ConfigError::InvalidBand { ref metric, .. } if metric == "metric"));
    }
}

#[test]
fn standard_bands_are_valid() {
    assert!(ScoreBands::standard().invalid_bands().is_empty());
}

#[test]
fn band_document_defaults_to_higher_is_worse() {
    let raw = r#"{
        "sick_days": { "steps": [ { "threshold": 10.0, "deduction": 12.0 } ] },
        "training_hours": {
            "direction": "lower-is-worse",
            "steps": [ { "threshold": 4.0, "deduction": 6.0 } ]
        }
    }"#;

    let bands = ScoreBands::from_json(raw).expect("valid document");

    assert_eq!(
        bands.get("sick_days").map(|band| band.direction),
        Some(BandDirection::HigherIsWorse)
    );
    assert_eq!(
        bands.get("training_hours").map(|band| band.direction),
        Some(BandDirection::LowerIsWorse)
    );
    let composite = score(
        &[sample("sick_days", 11.0), sample("training_hours", 2.0)],
        &bands,
    );
    assert_eq!(composite.value, 82.0);
}

#[test]
fn unparseable_band_document_is_fatal() {
    let err = ScoreBands::from_json("{ not json").expect_err("must fail");

    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn scoring_is_deterministic() {
    let samples = [
        sample("time_to_first_byte", 900.0),
        sample("retention_compliance", 92.0),
    ];
    let bands = ScoreBands::standard();

    assert_eq!(score(&samples, &bands), score(&samples, &bands));
    assert_close(score(&samples, &bands).value, 80.0);
}
