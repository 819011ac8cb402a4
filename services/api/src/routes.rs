use crate::infra::{deserialize_date, AppState, EngineState};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDate;
use hr_insights::error::AppError;
use hr_insights::workflows::eligibility::{
    EligibilityCriteriaSet, EligibilityDecision, EvaluationContext, RuleDiagnostic,
};
use hr_insights::workflows::reporting::{Report, ReportWindow};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub(crate) const DEFAULT_STEP_DAYS: u32 = 7;

#[derive(Debug, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) start: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) end: NaiveDate,
    #[serde(default)]
    pub(crate) step_days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CriteriaResponse {
    pub(crate) config_version: u64,
    pub(crate) criteria: Vec<EligibilityCriteriaSet>,
    pub(crate) rule_diagnostics: Vec<RuleDiagnostic>,
}

pub(crate) fn engine_router(engine: Arc<EngineState>) -> Router {
    Router::new()
        .route("/eligibility/criteria", get(criteria_endpoint))
        .route("/eligibility/:request_type", post(eligibility_endpoint))
        .route("/reports", get(report_endpoint))
        .with_state(engine)
}

pub(crate) fn with_engine_routes(engine: Arc<EngineState>) -> Router {
    engine_router(engine)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn eligibility_endpoint(
    State(engine): State<Arc<EngineState>>,
    Path(request_type): Path<String>,
    Json(context): Json<EvaluationContext>,
) -> Result<Json<EligibilityDecision>, AppError> {
    let decision = engine.evaluator.evaluate(&request_type, &context)?;
    Ok(Json(decision))
}

pub(crate) async fn criteria_endpoint(
    State(engine): State<Arc<EngineState>>,
) -> Json<CriteriaResponse> {
    let config = engine.evaluator.config();
    Json(CriteriaResponse {
        config_version: config.version(),
        criteria: config.sets().to_vec(),
        rule_diagnostics: config.rule_diagnostics(),
    })
}

pub(crate) async fn report_endpoint(
    State(engine): State<Arc<EngineState>>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Report>, AppError> {
    let window = ReportWindow::new(
        query.start,
        query.end,
        query.step_days.unwrap_or(DEFAULT_STEP_DAYS),
    )?;
    let report = engine
        .aggregator
        .build_report(&engine.sources, &window)
        .await;
    Ok(Json(report))
}
