use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;

use super::domain::{RubricItem, RubricSource};
use super::evaluation::{condition_label, ScoringConfig};
use super::service::RubricService;
use super::session::{SessionInput, SessionReport};

#[derive(Debug, Serialize)]
pub struct RubricView<'a> {
    pub source: &'a RubricSource,
    pub items: &'a [RubricItem],
    pub max_points: i64,
    pub scoring: &'a ScoringConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_total: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub verdict: &'static str,
    pub team_condition: &'static str,
    pub body_condition: &'static str,
    pub global_condition: &'static str,
    pub report: SessionReport,
}

impl From<SessionReport> for EvaluationResponse {
    fn from(report: SessionReport) -> Self {
        let verdict = report.result.verdict().label();
        let team_condition = condition_label(report.result.team.meets_minimum);
        let body_condition = condition_label(report.result.body.meets_minimum);
        let global_condition = condition_label(report.result.global_ok);
        Self {
            verdict,
            team_condition,
            body_condition,
            global_condition,
            report,
        }
    }
}

/// Router exposing the rubric definition and the stateless evaluation endpoint.
pub fn rubric_router(service: Arc<RubricService>) -> Router {
    Router::new()
        .route("/api/v1/rubric", get(definition_handler))
        .route("/api/v1/rubric/evaluate", post(evaluate_handler))
        .with_state(service)
}

pub(crate) async fn definition_handler(State(service): State<Arc<RubricService>>) -> Response {
    let config = service.config();
    let view = RubricView {
        source: service.rubric().source(),
        items: service.rubric().items(),
        max_points: service.rubric().max_points(),
        scoring: config,
        max_total: config.max_total(),
    };
    (StatusCode::OK, Json(view)).into_response()
}

pub(crate) async fn evaluate_handler(
    State(service): State<Arc<RubricService>>,
    payload: Result<Json<SessionInput>, JsonRejection>,
) -> Response {
    // Body errors keep axum's status code but share the resolution error shape.
    let input = match payload {
        Ok(Json(input)) => input,
        Err(rejection) => return error_response(rejection.status(), rejection.body_text()),
    };

    match service.evaluate(&input) {
        Ok(report) => (StatusCode::OK, Json(EvaluationResponse::from(report))).into_response(),
        Err(error) => error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
