use crate::infra::{parse_date, EngineState};
use crate::routes::DEFAULT_STEP_DAYS;
use chrono::{Local, NaiveDate};
use clap::Args;
use hr_insights::config::{read_document, AppConfig, ConfigError};
use hr_insights::error::AppError;
use hr_insights::workflows::eligibility::{EligibilityDecision, EvaluationContext};
use hr_insights::workflows::reporting::{Report, ReportWindow};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct EligibilityArgs {
    /// Request type to evaluate, e.g. `leave`
    #[arg(long)]
    pub(crate) request_type: String,
    /// JSON file holding the request context object
    #[arg(long)]
    pub(crate) context: PathBuf,
    /// Print the full decision as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// First trend date (YYYY-MM-DD). Defaults to `end` minus four weeks.
    #[arg(long, value_parser = parse_date)]
    pub(crate) start: Option<NaiveDate>,
    /// Report date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) end: Option<NaiveDate>,
    /// Days between trend points
    #[arg(long, default_value_t = DEFAULT_STEP_DAYS)]
    pub(crate) step_days: u32,
    /// Print the full report as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_eligibility(args: EligibilityArgs) -> Result<(), AppError> {
    let EligibilityArgs {
        request_type,
        context,
        json,
    } = args;

    let config = AppConfig::load()?;
    let engine = EngineState::load(&config.engine)?;
    let context: EvaluationContext =
        serde_json::from_str(&read_document(&context)?).map_err(ConfigError::from)?;

    let decision = engine.evaluator.evaluate(&request_type, &context)?;
    if json {
        print_json(&decision)?;
    } else {
        render_decision(&decision);
    }

    Ok(())
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        start,
        end,
        step_days,
        json,
    } = args;

    let end = end.unwrap_or_else(|| Local::now().date_naive());
    let start = start.unwrap_or_else(|| end - chrono::Duration::days(28));
    let window = ReportWindow::new(start, end, step_days)?;

    let config = AppConfig::load()?;
    let engine = EngineState::load(&config.engine)?;
    let report = engine.aggregator.build_report(&engine.sources, &window).await;

    if json {
        print_json(&report)?;
    } else {
        render_report(&report, &window);
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(ConfigError::from)?;
    println!("{rendered}");
    Ok(())
}

fn render_decision(decision: &EligibilityDecision) {
    println!(
        "Eligibility for '{}' (configuration v{})",
        decision.request_type, decision.config_version
    );
    println!("- {}", decision.summary());
    for verdict in &decision.verdicts {
        println!(
            "  [{:?}] {} ({:?}): {}",
            verdict.satisfied, verdict.requirement_id, verdict.priority, verdict.reason
        );
    }
}

fn render_report(report: &Report, window: &ReportWindow) {
    println!(
        "HR insights report for {} (trend {} to {}, every {} day(s))",
        window.end(),
        window.start(),
        window.end(),
        window.step_days()
    );

    match &report.overview {
        Some(overview) => {
            println!("- Composite score: {:.1}", overview.composite_score);
            for module in &overview.per_module {
                println!(
                    "  {} (weight {}): {:.1}",
                    module.name, module.weight, module.score
                );
            }
        }
        None => println!("- Composite score: unavailable (no module could be scored)"),
    }

    let risk = &report.risk_assessment;
    println!("- Risk: {} ({:.1})", risk.band.label(), risk.score);
    for (factor, mitigation) in risk.risk_factors.iter().zip(&risk.mitigations) {
        println!("  {factor}\n    -> {mitigation}");
    }

    if report.recommendations.is_empty() {
        println!("- Recommendations: none");
    } else {
        println!("- Recommendations:");
        for recommendation in &report.recommendations {
            println!(
                "  {:>5.1} [{:?}] {}: {}",
                recommendation.priority_score,
                recommendation.category,
                recommendation.title,
                recommendation.action
            );
        }
    }

    println!("- Trend:");
    for point in &report.trends {
        match point.composite_score {
            Some(score) => println!("  {}: {:.1}", point.timestamp, score),
            None => println!("  {}: n/a", point.timestamp),
        }
    }

    for excluded in &report.excluded {
        println!(
            "- Excluded {} ({}): {}",
            excluded.module,
            excluded.kind.label(),
            excluded.message
        );
    }
}
