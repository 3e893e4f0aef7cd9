//! API Route Configuration
//!
//! Central route definition for the calculator service

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

#[cfg(feature = "swagger-ui")]
use utoipa::OpenApi;

use crate::api::calculate_handlers::calculate;
use crate::api::health_handlers::{health, index, metrics, not_found, script, stylesheet};
use crate::api::scientific_handlers::scientific;
use crate::app_state::AppState;
use crate::middleware::{
    body_limit_layer, payload_too_large_envelope, security_headers, track_requests,
};
use crate::rate_limit::rate_limit;

// OpenAPI documentation - only compiled when swagger-ui feature is enabled
#[cfg(feature = "swagger-ui")]
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::calculate_handlers::calculate,
        crate::api::scientific_handlers::scientific,
        crate::api::health_handlers::health,
        crate::api::health_handlers::metrics
    ),
    components(
        schemas(
            crate::dto::CalculateRequest,
            crate::dto::CalculateResponse,
            crate::dto::ScientificRequest,
            crate::dto::ScientificResponse,
            crate::dto::MetricsResponse,
            common::HealthStatus,
            common::ServiceStatus,
            common::SystemMetrics,
            common::ErrorResponse,
            common::ErrorInfo
        )
    ),
    tags(
        (name = "calculator", description = "Safe arithmetic and scientific calculator API")
    )
)]
pub struct CalcsrvApiDoc;

/// Create all routes for the calculator service
///
/// Only the calculation endpoints are rate limited. Layers, innermost first:
/// body limit, 413 envelope, request accounting, security headers.
pub fn create_routes(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.config.server.max_body_bytes;

    let calculation_routes = Router::new()
        .route("/calculate", post(calculate))
        .route("/scientific", post(scientific))
        .route_layer(from_fn_with_state(Arc::clone(&state), rate_limit));

    Router::new()
        .route("/", get(index))
        .route("/static/calculator.css", get(stylesheet))
        .route("/static/calculator.js", get(script))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(calculation_routes)
        .fallback(not_found)
        .layer(body_limit_layer(max_body_bytes))
        .layer(from_fn(payload_too_large_envelope))
        .layer(from_fn_with_state(Arc::clone(&state), track_requests))
        .layer(from_fn(security_headers))
        .with_state(state)
}
