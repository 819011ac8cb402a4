use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use hr_insights::config::{ConfigError, EngineConfig};
use hr_insights::workflows::eligibility::{
    EligibilityConfig, EligibilityCriteriaSet, EligibilityEvaluator, EvaluationType, Requirement,
    RequirementPriority,
};
use hr_insights::workflows::performance::{BandDirection, ComplianceSignals, MetricSample};
use hr_insights::workflows::reporting::{
    FetchError, ModuleDataSource, ModuleSnapshot, ReportAggregator, SnapshotWindow,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Eligibility evaluator, report aggregator and the module sources they read.
pub(crate) struct EngineState {
    pub(crate) evaluator: EligibilityEvaluator,
    pub(crate) aggregator: ReportAggregator,
    pub(crate) sources: Vec<Arc<dyn ModuleDataSource>>,
}

impl EngineState {
    pub(crate) fn load(config: &EngineConfig) -> Result<Self, ConfigError> {
        let eligibility = match &config.eligibility_config_path {
            Some(path) => EligibilityConfig::load(path)?,
            None => default_eligibility_config()?,
        };
        for diagnostic in eligibility.rule_diagnostics() {
            info!(
                request_type = %diagnostic.request_type,
                requirement = %diagnostic.requirement_id,
                offset = diagnostic.offset,
                message = %diagnostic.message,
                "eligibility rule will fail closed"
            );
        }

        Ok(Self {
            evaluator: EligibilityEvaluator::new(eligibility),
            aggregator: ReportAggregator::from_config(config)?,
            sources: in_memory_module_sources(),
        })
    }
}

fn requirement(
    id: &str,
    name: &str,
    evaluation_type: EvaluationType,
    rule: Option<&str>,
    priority: RequirementPriority,
) -> Requirement {
    Requirement {
        id: id.to_string(),
        name: name.to_string(),
        description: name.to_string(),
        evaluation_type,
        rule: rule.map(str::to_string),
        priority,
        active: true,
    }
}

pub(crate) fn default_eligibility_config() -> Result<EligibilityConfig, ConfigError> {
    use EvaluationType::{Automatic, ManualApproval};
    use RequirementPriority::{High, Low, Medium};

    EligibilityConfig::new(vec![
        EligibilityCriteriaSet {
            request_type: "leave".to_string(),
            requirements: vec![
                requirement(
                    "probation-complete",
                    "Probation period completed",
                    Automatic,
                    Some("employmentDuration >= 90"),
                    High,
                ),
                requirement(
                    "sufficient-balance",
                    "Enough leave balance",
                    Automatic,
                    Some("leaveBalance >= requestedDays"),
                    High,
                ),
                requirement(
                    "notice-period",
                    "Two weeks notice or emergency",
                    Automatic,
                    Some("noticeDays >= 14 || emergency == true"),
                    Medium,
                ),
                requirement(
                    "team-coverage",
                    "Team coverage maintained",
                    Automatic,
                    Some("teamOnLeave < 3"),
                    Low,
                ),
            ],
        },
        EligibilityCriteriaSet {
            request_type: "expense".to_string(),
            requirements: vec![
                requirement(
                    "within-limit",
                    "Amount within policy limit",
                    Automatic,
                    Some("amount <= 2500 || category == 'travel' && amount <= 5000"),
                    High,
                ),
                requirement(
                    "receipt-attached",
                    "Receipt attached",
                    Automatic,
                    Some("receiptAttached == true"),
                    Medium,
                ),
                requirement(
                    "manager-approval",
                    "Line manager approval",
                    ManualApproval,
                    None,
                    High,
                ),
            ],
        },
        EligibilityCriteriaSet {
            request_type: "remote-work".to_string(),
            requirements: vec![
                requirement(
                    "active-employee",
                    "Employee is active",
                    Automatic,
                    Some("status == 'active'"),
                    High,
                ),
                requirement(
                    "performance-standing",
                    "Good performance standing",
                    Automatic,
                    Some("lastReviewRating >= 3"),
                    Medium,
                ),
            ],
        },
    ])
}

#[derive(Debug, Clone, Copy)]
struct BaselineMetric {
    name: &'static str,
    value: f64,
    unit: &'static str,
    direction: BandDirection,
}

fn higher(name: &'static str, value: f64, unit: &'static str) -> BaselineMetric {
    BaselineMetric {
        name,
        value,
        unit,
        direction: BandDirection::HigherIsWorse,
    }
}

fn lower(name: &'static str, value: f64, unit: &'static str) -> BaselineMetric {
    BaselineMetric {
        name,
        value,
        unit,
        direction: BandDirection::LowerIsWorse,
    }
}

/// Module source backed by a fixed baseline that drifts with the snapshot
/// date, so trend series have some movement.
#[derive(Debug, Clone)]
pub(crate) struct InMemoryModuleSource {
    name: &'static str,
    weight: u8,
    record_count: u64,
    baseline: Vec<BaselineMetric>,
    compliance: Option<ComplianceSignals>,
}

impl InMemoryModuleSource {
    fn snapshot(&self, as_of: NaiveDate) -> ModuleSnapshot {
        // 0..=6 percent worse depending on the weekday
        let drift = f64::from(as_of.weekday().num_days_from_monday()) / 100.0;
        let metrics = self
            .baseline
            .iter()
            .map(|metric| {
                let value = match metric.direction {
                    BandDirection::HigherIsWorse => metric.value * (1.0 + drift),
                    BandDirection::LowerIsWorse => (metric.value * (1.0 - drift)).max(0.0),
                };
                MetricSample::new(metric.name, value, metric.unit)
            })
            .collect();

        ModuleSnapshot {
            record_count: self.record_count,
            metrics,
            compliance: self.compliance,
        }
    }
}

#[async_trait]
impl ModuleDataSource for InMemoryModuleSource {
    fn name(&self) -> &str {
        self.name
    }

    fn weight(&self) -> u8 {
        self.weight
    }

    async fn fetch_snapshot(&self, window: &SnapshotWindow) -> Result<ModuleSnapshot, FetchError> {
        Ok(self.snapshot(window.as_of))
    }
}

pub(crate) fn in_memory_module_sources() -> Vec<Arc<dyn ModuleDataSource>> {
    vec![
        Arc::new(InMemoryModuleSource {
            name: "leave",
            weight: 5,
            record_count: 1_240,
            baseline: vec![
                higher("largest_contentful_paint", 2.2, "s"),
                higher("approval_turnaround_hours", 30.0, "h"),
                lower("policy_adherence", 96.0, "%"),
            ],
            compliance: Some(ComplianceSignals {
                policy_adherence: 96.0,
                audit_trail_completeness: 98.5,
                retention_compliance: 97.0,
                unresolved_critical_violations: 0,
            }),
        }),
        Arc::new(InMemoryModuleSource {
            name: "payroll",
            weight: 4,
            record_count: 860,
            baseline: vec![
                higher("time_to_first_byte", 650.0, "ms"),
                higher("error_rate", 0.4, "%"),
                lower("data_completeness", 93.0, "%"),
            ],
            compliance: Some(ComplianceSignals {
                policy_adherence: 92.0,
                audit_trail_completeness: 93.0,
                retention_compliance: 96.0,
                unresolved_critical_violations: 1,
            }),
        }),
        Arc::new(InMemoryModuleSource {
            name: "recruiting",
            weight: 3,
            record_count: 310,
            baseline: vec![
                higher("first_input_delay", 90.0, "ms"),
                higher("cumulative_layout_shift", 0.06, ""),
            ],
            compliance: None,
        }),
        Arc::new(InMemoryModuleSource {
            name: "records",
            weight: 2,
            record_count: 5_400,
            baseline: vec![
                lower("audit_trail_completeness", 97.0, "%"),
                lower("retention_compliance", 94.0, "%"),
            ],
            compliance: Some(ComplianceSignals {
                policy_adherence: 97.0,
                audit_trail_completeness: 97.0,
                retention_compliance: 94.0,
                unresolved_critical_violations: 0,
            }),
        }),
    ]
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_eligibility_rules_all_parse() {
        let config = default_eligibility_config().expect("valid defaults");

        assert!(config.rule_diagnostics().is_empty());
        assert!(config.criteria_set("leave").is_some());
    }

    #[test]
    fn in_memory_sources_have_valid_weights_and_snapshots() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).expect("valid date");
        let sunday = NaiveDate::from_ymd_opt(2024, 3, 10).expect("valid date");

        for source in in_memory_module_sources() {
            assert!((1..=10).contains(&source.weight()), "{}", source.name());
        }

        let payroll = InMemoryModuleSource {
            name: "payroll",
            weight: 4,
            record_count: 1,
            baseline: vec![higher("error_rate", 1.0, "%"), lower("data_completeness", 90.0, "%")],
            compliance: None,
        };
        let early = payroll.snapshot(monday);
        let late = payroll.snapshot(sunday);
        assert!(early.validate().is_ok());
        assert!(late.metrics[0].value > early.metrics[0].value);
        assert!(late.metrics[1].value < early.metrics[1].value);
    }

    #[test]
    fn parse_date_reports_bad_input() {
        assert!(parse_date("2024-02-30").is_err());
        assert_eq!(
            parse_date(" 2024-02-29 "),
            Ok(NaiveDate::from_ymd_opt(2024, 2, 29).expect("valid date"))
        );
    }
}
