//! Predictor abstraction and the subprocess implementation.
//!
//! The HTTP layer only sees the [`Predictor`] trait, so handlers can be tested
//! against in-process fakes while production runs [`ProcessPredictor`].

mod output;
mod process;

pub use output::{extract_json, ParseError};
pub use process::ProcessPredictor;

use crate::models::{PredictionRequest, PredictionResult};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Error type for predictor invocations.
#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("Failed to start predictor: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("Predictor exited with status {code:?}")]
    NonZeroExit { code: Option<i32> },

    #[error("Predictor output could not be parsed: {0}")]
    Parse(#[from] ParseError),

    #[error("Predictor did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Predictor I/O error: {0}")]
    Io(#[source] std::io::Error),
}

/// Something that turns a prediction request into a prediction result.
#[async_trait]
pub trait Predictor: Send + Sync {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError>;

    /// Whether the predictor can currently be invoked at all.
    async fn is_ready(&self) -> bool;
}
