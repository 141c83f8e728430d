//! Caller-facing errors of the prediction endpoint.
//!
//! Every variant renders as `{ "success": false, "error": <message> }`. The
//! messages are fixed strings; diagnostic detail is logged where the error is
//! raised and never reaches the response body.

use crate::services::predictor::PredictorError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Error executing Python script")]
    Execution,

    #[error("Error parsing prediction results")]
    OutputParse,

    #[error("Internal server error")]
    Internal,

    #[error("Prediction service busy")]
    Busy { retry_after_secs: u64 },

    #[error("Prediction timed out")]
    Timeout,
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::MissingFields => StatusCode::BAD_REQUEST,
            PredictError::Execution | PredictError::OutputParse | PredictError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            PredictError::Busy { .. } => StatusCode::SERVICE_UNAVAILABLE,
            PredictError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Label used for the `predictions_total` outcome dimension.
    pub fn outcome(&self) -> &'static str {
        match self {
            PredictError::MissingFields => "missing_fields",
            PredictError::Execution => "execution_error",
            PredictError::OutputParse => "parse_error",
            PredictError::Internal => "bad_request_body",
            PredictError::Busy { .. } => "busy",
            PredictError::Timeout => "timeout",
        }
    }
}

impl From<PredictorError> for PredictError {
    fn from(err: PredictorError) -> Self {
        match err {
            PredictorError::Spawn(_) | PredictorError::NonZeroExit { .. } => {
                PredictError::Execution
            }
            PredictorError::Parse(_) => PredictError::OutputParse,
            PredictorError::Timeout(_) => PredictError::Timeout,
            PredictorError::Io(_) => PredictError::Internal,
        }
    }
}

/// Body of every failed response.
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = match self {
            PredictError::Busy { retry_after_secs } => Some(retry_after_secs),
            _ => None,
        };

        let mut res = (
            status,
            Json(ErrorBody {
                success: false,
                error: self.to_string(),
            }),
        )
            .into_response();

        if let Some(retry) = retry_after {
            res.headers_mut().insert(header::RETRY_AFTER, retry.into());
        }

        res
    }
}
