use crate::error::ErrorBody;
use crate::services::get_metrics;
use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "prediction-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready when the predictor program can be found.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if state.predictor.is_ready().await {
        StatusCode::OK
    } else {
        tracing::warn!(
            program = %state.config.predictor.command,
            "Predictor program not found, reporting not ready"
        );
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        get_metrics(),
    )
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            success: false,
            error: "Not found".to_string(),
        }),
    )
}
