use crate::error::PredictError;
use crate::models::{PredictionRequest, PredictionResult};
use crate::services::metrics::{record_outcome, record_predictor_duration};
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, Extension, Json};
use service_core::middleware::RequestId;
use std::time::Instant;

/// `POST /api/predict`
///
/// Relays the body to the predictor and returns its JSON object unchanged.
/// The body is parsed regardless of `Content-Type`.
pub async fn predict(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Bytes,
) -> Result<Json<PredictionResult>, PredictError> {
    let request_id = request_id
        .map(|Extension(id)| id.0)
        .unwrap_or_else(|| "-".to_string());

    let outcome = run_prediction(&state, &request_id, &body).await;

    match &outcome {
        Ok(_) => record_outcome("success"),
        Err(e) => record_outcome(e.outcome()),
    }

    outcome.map(Json)
}

async fn run_prediction(
    state: &AppState,
    request_id: &str,
    body: &[u8],
) -> Result<PredictionResult, PredictError> {
    tracing::info!(
        request_id = %request_id,
        body_size = body.len(),
        "Prediction request received"
    );

    let request = PredictionRequest::from_slice(body).map_err(|e| {
        tracing::error!(
            request_id = %request_id,
            error = %e,
            "Request body is not valid JSON"
        );
        PredictError::Internal
    })?;

    request.validate().map_err(|e| {
        tracing::warn!(request_id = %request_id, "Prediction request missing required fields");
        e
    })?;

    let _permit = state.admission.acquire().await?;

    let start = Instant::now();
    let result = state.predictor.predict(&request).await;
    record_predictor_duration(start.elapsed());

    let result = result.map_err(|e| {
        tracing::error!(
            request_id = %request_id,
            error = %e,
            duration_ms = start.elapsed().as_millis(),
            "Prediction failed"
        );
        PredictError::from(e)
    })?;

    tracing::info!(
        request_id = %request_id,
        duration_ms = start.elapsed().as_millis(),
        "Prediction succeeded"
    );

    Ok(result)
}
