use service_core::config::{self as core_config, get_env, parse_env};
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PREDICTOR_COMMAND: &str = "python3";
const DEFAULT_PREDICTOR_ARGS: &str = "predictor/main.py";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONCURRENT: usize = 4;
const DEFAULT_QUEUE_WAIT_MS: u64 = 5_000;
const DEFAULT_MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub common: core_config::Config,
    pub predictor: PredictorConfig,
    pub max_body_bytes: usize,
    pub otlp_endpoint: Option<String>,
}

/// How to launch the external predictor and how much of it to run at once.
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Relative script paths in `args` resolve against this directory.
    pub working_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    pub max_concurrent: usize,
    pub queue_wait_ms: u64,
}

impl PredictorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn queue_wait(&self) -> Duration {
        Duration::from_millis(self.queue_wait_ms)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.command.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PREDICTOR_COMMAND must not be empty"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PREDICTOR_TIMEOUT_SECS must be greater than zero"
            )));
        }
        if self.max_concurrent == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PREDICTOR_MAX_CONCURRENT must be greater than zero"
            )));
        }
        Ok(())
    }
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            command: DEFAULT_PREDICTOR_COMMAND.to_string(),
            args: split_args(DEFAULT_PREDICTOR_ARGS),
            working_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            queue_wait_ms: DEFAULT_QUEUE_WAIT_MS,
        }
    }
}

impl GatewayConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common = core_config::Config::load()?;
        let is_prod = core_config::is_production();

        let predictor = PredictorConfig {
            command: get_env("PREDICTOR_COMMAND", Some(DEFAULT_PREDICTOR_COMMAND), is_prod)?,
            args: split_args(&get_env(
                "PREDICTOR_ARGS",
                Some(DEFAULT_PREDICTOR_ARGS),
                is_prod,
            )?),
            working_dir: env::var("PREDICTOR_WORKING_DIR")
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            timeout_secs: env_or("PREDICTOR_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
            max_concurrent: env_or("PREDICTOR_MAX_CONCURRENT", DEFAULT_MAX_CONCURRENT)?,
            queue_wait_ms: env_or("PREDICTOR_QUEUE_WAIT_MS", DEFAULT_QUEUE_WAIT_MS)?,
        };
        predictor.validate()?;

        Ok(GatewayConfig {
            common,
            predictor,
            max_body_bytes: env_or("GATEWAY_MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT")
                .ok()
                .filter(|endpoint| !endpoint.trim().is_empty()),
        })
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            common: core_config::Config::default(),
            predictor: PredictorConfig::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            otlp_endpoint: None,
        }
    }
}

/// Tuning knobs with a safe default keep it even in production.
fn env_or<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => parse_env(key, &raw),
        Err(_) => Ok(default),
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}
