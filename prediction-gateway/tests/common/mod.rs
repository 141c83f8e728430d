#![allow(dead_code)]

use async_trait::async_trait;
use prediction_gateway::config::{GatewayConfig, PredictorConfig};
use prediction_gateway::models::{PredictionRequest, PredictionResult};
use prediction_gateway::services::{Predictor, PredictorError};
use prediction_gateway::startup::{build_router, AppState, Application};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the gateway on a random port with a `sh -c <script>` predictor.
    pub async fn spawn_with_script(script: &str) -> Self {
        Self::spawn(sh_config(script)).await
    }

    pub async fn spawn(config: GatewayConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp { address, port }
    }

    pub async fn post_predict(&self, body: &Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/api/predict", self.address))
            .json(body)
            .timeout(Duration::from_secs(20))
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Config with port 0 and a shell script as the predictor.
pub fn sh_config(script: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.common.port = 0;
    config.predictor = PredictorConfig {
        command: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        timeout_secs: 10,
        max_concurrent: 8,
        queue_wait_ms: 10_000,
        ..PredictorConfig::default()
    };
    config
}

type Responder = dyn Fn(&PredictionRequest) -> Result<PredictionResult, PredictorError> + Send + Sync;

/// In-process predictor that counts invocations.
pub struct FakePredictor {
    calls: AtomicUsize,
    delay: Duration,
    respond: Box<Responder>,
}

impl FakePredictor {
    pub fn new<F>(respond: F) -> Arc<Self>
    where
        F: Fn(&PredictionRequest) -> Result<PredictionResult, PredictorError>
            + Send
            + Sync
            + 'static,
    {
        Self::with_delay(Duration::ZERO, respond)
    }

    pub fn with_delay<F>(delay: Duration, respond: F) -> Arc<Self>
    where
        F: Fn(&PredictionRequest) -> Result<PredictionResult, PredictorError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
            respond: Box::new(respond),
        })
    }

    /// Always answers with `value`, which must be a JSON object.
    pub fn returning(value: Value) -> Arc<Self> {
        Self::new(move |_| Ok(result_of(value.clone())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Predictor for FakePredictor {
    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResult, PredictorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        (self.respond)(request)
    }

    async fn is_ready(&self) -> bool {
        true
    }
}

pub fn result_of(value: Value) -> PredictionResult {
    match value {
        Value::Object(fields) => PredictionResult::new(fields),
        other => panic!("predictor result must be an object, got {}", other),
    }
}

/// Router wired to `predictor`, for `tower::ServiceExt::oneshot` tests.
pub fn router_with(config: GatewayConfig, predictor: Arc<dyn Predictor>) -> axum::Router {
    build_router(AppState::new(config, predictor))
}
