mod prediction;

pub use prediction::{PredictionRequest, PredictionResult, REQUIRED_FIELDS};
