pub mod admission;
pub mod metrics;
pub mod predictor;

pub use admission::{AdmissionControl, AdmissionPermit};
pub use metrics::{get_metrics, init_metrics};
pub use predictor::{Predictor, PredictorError, ProcessPredictor};
