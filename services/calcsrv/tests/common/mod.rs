//! Common test utilities and helpers

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use calcsrv::{create_routes, AppState, CalcSrvConfig};
use serde_json::{json, Value};
use tower::util::ServiceExt;

/// Configuration with rate limiting off, so tests never trip it
pub fn test_config() -> CalcSrvConfig {
    let mut config = CalcSrvConfig::default();
    config.rate_limit.enabled = false;
    config
}

/// Build a router plus the state behind it
pub fn create_test_app(config: CalcSrvConfig) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config));
    (create_routes(Arc::clone(&state)), state)
}

pub fn create_test_router() -> Router {
    create_test_app(test_config()).0
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

/// Helper to make JSON requests
pub async fn json_request(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(json) => Body::from(serde_json::to_string(&json).unwrap()),
        None => Body::empty(),
    };
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .unwrap();

    let response = send(app, request).await;
    let status = response.status();
    (status, body_json(response).await)
}

pub async fn calculate(app: &Router, expression: &str) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/calculate",
        Some(json!({ "expression": expression })),
    )
    .await
}

pub async fn scientific(app: &Router, function: &str, value: f64) -> (StatusCode, Value) {
    json_request(
        app,
        "POST",
        "/scientific",
        Some(json!({ "function": function, "value": value })),
    )
    .await
}
