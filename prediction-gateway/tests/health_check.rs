mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use common::{router_with, sh_config, FakePredictor, TestApp};
use prediction_gateway::config::GatewayConfig;
use prediction_gateway::services::init_metrics;
use reqwest::Client;
use serde_json::json;
use tower::util::ServiceExt;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn(sh_config("true")).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "prediction-gateway");
}

#[tokio::test]
async fn readiness_follows_predictor_availability() {
    let ready = TestApp::spawn(sh_config("true")).await;

    let mut config = sh_config("true");
    config.predictor.command = "no-such-predictor-binary".to_string();
    let not_ready = TestApp::spawn(config).await;

    let client = Client::new();

    let response = client
        .get(format!("{}/ready", ready.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/ready", not_ready.address))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn metrics_endpoint_returns_prometheus_format() {
    init_metrics();
    let predictor = FakePredictor::returning(json!({ "success": true }));
    let app = router_with(GatewayConfig::default(), predictor);

    let predict = Request::builder()
        .method("POST")
        .uri("/api/predict")
        .body(Body::from(
            json!({ "investment_amount": 100, "risk_tolerance": "1" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(predict).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .expect("Missing content-type header")
        .to_str()
        .expect("Invalid content-type")
        .to_string();
    assert!(content_type.starts_with("text/plain"));

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8_lossy(&body);
    assert!(
        body.contains("predictions_total"),
        "Unexpected metrics output: {}",
        body
    );
}

#[tokio::test]
async fn unknown_routes_are_not_prediction_outcomes() {
    init_metrics();
    let predictor = FakePredictor::returning(json!({ "success": true }));
    let app = router_with(GatewayConfig::default(), predictor.clone());

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body, json!({ "success": false, "error": "Not found" }));

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let metrics = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let metrics = String::from_utf8_lossy(&metrics);

    assert!(!metrics.contains("outcome=\"not_found\""));
    assert_eq!(predictor.calls(), 0);
}
