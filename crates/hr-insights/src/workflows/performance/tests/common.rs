use crate::workflows::performance::{CompositeScore, MetricSample};

pub(super) fn sample(name: &str, value: f64) -> MetricSample {
    MetricSample::new(name, value, "")
}

pub(super) fn composite(value: f64) -> CompositeScore {
    CompositeScore {
        value,
        components: Vec::new(),
        unscored: Vec::new(),
    }
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
