use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::warn;

use super::domain::{ApplicantRecord, ScoringResult};
use super::engine::ScoringError;
use super::service::{CreditScoringService, PredictionError};

/// Largest batch accepted by the batch endpoint.
pub const MAX_BATCH_SIZE: usize = 100;

/// Router builder exposing the prediction endpoints.
pub fn prediction_router(service: Arc<CreditScoringService>) -> Router {
    Router::new()
        .route("/predict", post(predict_handler))
        .route("/api/v1/credit/predict", post(predict_handler))
        .route("/api/v1/credit/predict/batch", post(batch_handler))
        .with_state(service)
}

pub(crate) async fn predict_handler(
    State(service): State<Arc<CreditScoringService>>,
    payload: Result<axum::Json<ApplicantRecord>, JsonRejection>,
) -> Response {
    let axum::Json(record) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };

    match service.predict(&record) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(err) => prediction_error_response(&err),
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchEntry {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<ScoringResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<serde_json::Value>,
}

pub(crate) async fn batch_handler(
    State(service): State<Arc<CreditScoringService>>,
    payload: Result<axum::Json<Vec<ApplicantRecord>>, JsonRejection>,
) -> Response {
    let axum::Json(records) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };

    if records.len() > MAX_BATCH_SIZE {
        let payload = json!({
            "error": format!(
                "batch of {} records exceeds the limit of {MAX_BATCH_SIZE}",
                records.len()
            ),
        });
        return (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response();
    }

    let outcomes = match service.predict_offline(&records) {
        Ok(outcomes) => outcomes,
        Err(err) => return scoring_error_response(&err),
    };

    let entries: Vec<BatchEntry> = outcomes
        .into_iter()
        .enumerate()
        .map(|(index, outcome)| match outcome {
            Ok(result) => BatchEntry {
                index,
                result: Some(result),
                error: None,
            },
            Err(err) => BatchEntry {
                index,
                result: None,
                error: Some(prediction_error_body(&err)),
            },
        })
        .collect();

    (StatusCode::OK, axum::Json(entries)).into_response()
}

/// Status code the serving boundary reports for a failed prediction.
pub fn prediction_status(err: &PredictionError) -> StatusCode {
    match err {
        PredictionError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionError::Scoring(err) => scoring_status(err),
    }
}

fn scoring_status(err: &ScoringError) -> StatusCode {
    match err {
        ScoringError::ModelUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        ScoringError::FeatureSchema(_) | ScoringError::InvalidProbability(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn prediction_error_body(err: &PredictionError) -> serde_json::Value {
    match err {
        PredictionError::Validation(validation) => json!({
            "error": "applicant record failed validation",
            "violations": validation.violations(),
        }),
        PredictionError::Scoring(err) => json!({ "error": err.to_string() }),
    }
}

fn prediction_error_response(err: &PredictionError) -> Response {
    let status = prediction_status(err);
    if status.is_server_error() {
        warn!(error = %err, "prediction failed");
    }
    (status, axum::Json(prediction_error_body(err))).into_response()
}

/// Bodies that are not JSON, or whose fields have the wrong type, get the same error
/// shape as rule violations. No field-level violations can be listed for them.
fn rejection_response(rejection: &JsonRejection) -> Response {
    let payload = json!({
        "error": "request body is not a valid applicant record",
        "detail": rejection.body_text(),
        "violations": [],
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

fn scoring_error_response(err: &ScoringError) -> Response {
    warn!(error = %err, "batch prediction failed");
    let payload = json!({ "error": err.to_string() });
    (scoring_status(err), axum::Json(payload)).into_response()
}
