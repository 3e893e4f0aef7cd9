//! Request and response bodies for the calculator API

use common::SystemMetrics;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::extract::JsonBody;

// === Requests ===

/// Arithmetic expression to evaluate
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CalculateRequest {
    /// Accepts `×` and `÷` as well as `*` and `/`
    #[schema(example = "2 + 3 * 4")]
    pub expression: String,
}

impl JsonBody for CalculateRequest {
    const REQUIRED_FIELDS: &'static [&'static str] = &["expression"];
}

/// Single-argument scientific function call
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ScientificRequest {
    #[schema(example = "sqrt")]
    pub function: String,
    #[schema(example = 16.0)]
    pub value: f64,
}

impl JsonBody for ScientificRequest {
    const REQUIRED_FIELDS: &'static [&'static str] = &["function", "value"];
}

// === Responses ===

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CalculateResponse {
    /// Expression after display-symbol normalisation
    pub expression: String,
    pub result: String,
    /// Whether the result came from the cache
    pub cached: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ScientificResponse {
    pub function: String,
    pub value: f64,
    pub result: String,
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MetricsResponse {
    /// Seconds since startup
    pub uptime: f64,
    pub requests_total: u64,
    pub errors_total: u64,
    pub cache_entries: usize,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub rate_limited_total: u64,
    pub system: SystemMetrics,
}
