use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use credit_risk::scoring::{prediction_router, CreditScoringService, EngineState};
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_prediction_routes(service: Arc<CreditScoringService>) -> axum::Router {
    prediction_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let model = state.engine.state();
    match model {
        EngineState::Ready => (
            StatusCode::OK,
            Json(json!({ "status": "ready", "model": model.label() })),
        ),
        EngineState::Unloaded => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing", "model": model.label() })),
        ),
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
