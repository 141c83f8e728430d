pub mod health;
pub mod predict;

pub use health::{health_check, metrics_endpoint, not_found, readiness_check};
pub use predict::predict;
