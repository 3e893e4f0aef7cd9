//! Index page, health, metrics and fallback handlers

#![allow(clippy::disallowed_methods)] // json! macro used in utoipa examples

use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse, Json},
};
use common::{AppError, HealthStatus, ServiceStatus, SuccessResponse, SystemMetrics};
use serde_json::json;

use crate::app_state::AppState;
use crate::dto::MetricsResponse;
use crate::error::{ApiError, MSG_NOT_FOUND};

const INDEX_HTML: &str = include_str!("../../static/index.html");
const CALCULATOR_CSS: &str = include_str!("../../static/calculator.css");
const CALCULATOR_JS: &str = include_str!("../../static/calculator.js");

/// Service name reported by `/health`
pub const SERVICE_NAME: &str = "calculator";

/// Calculator page
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Page stylesheet
pub async fn stylesheet() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], CALCULATOR_CSS)
}

/// Page script
pub async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        CALCULATOR_JS,
    )
}

/// Health check endpoint
///
/// @route GET /health
/// @output Json<SuccessResponse<HealthStatus>>
/// @side-effects None (read-only operation)
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = serde_json::Value,
            example = json!({"success": true, "data": {"status": "healthy", "service": "calculator", "version": "1.0.0", "uptime_seconds": 42, "timestamp": "2025-01-01T00:00:00Z"}})
        )
    ),
    tag = "calculator"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<SuccessResponse<HealthStatus>> {
    Json(SuccessResponse::new(HealthStatus {
        status: ServiceStatus::Healthy,
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime().as_secs(),
        timestamp: chrono::Utc::now(),
    }))
}

/// Request, cache and process metrics
///
/// @route GET /metrics
/// @output Json<SuccessResponse<MetricsResponse>>
/// @side-effects None (read-only operation)
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "Current service metrics", body = serde_json::Value,
            example = json!({"success": true, "data": {"uptime": 12.5, "requests_total": 10, "errors_total": 2, "cache_entries": 3, "cache_hits": 4, "cache_misses": 3, "rate_limited_total": 0}})
        )
    ),
    tag = "calculator"
)]
pub async fn metrics(State(state): State<Arc<AppState>>) -> Json<SuccessResponse<MetricsResponse>> {
    Json(SuccessResponse::new(MetricsResponse {
        uptime: state.uptime().as_secs_f64(),
        requests_total: state.metrics.requests_total(),
        errors_total: state.metrics.errors_total(),
        cache_entries: state.cache.len().await,
        cache_hits: state.cache.hits(),
        cache_misses: state.cache.misses(),
        rate_limited_total: state.rate_limited_total(),
        system: SystemMetrics::collect(),
    }))
}

/// Fallback for unknown routes
pub async fn not_found() -> ApiError {
    AppError::not_found(MSG_NOT_FOUND).into()
}
