//! Arithmetic expression endpoint

#![allow(clippy::disallowed_methods)] // json! macro used in utoipa examples

use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::SuccessResponse;
use safe_calc::{format_expression_result, normalize_display_symbols};
use serde_json::json;
use tracing::debug;

use crate::api::extract::ValidatedJson;
use crate::app_state::AppState;
use crate::cache::expression_key;
use crate::dto::{CalculateRequest, CalculateResponse};
use crate::error::ApiError;

/// Evaluate an arithmetic expression
///
/// @route POST /calculate
/// @input Json<CalculateRequest> - expression text
/// @output Json<SuccessResponse<CalculateResponse>> - rendered result
/// @side-effects Caches successful results
#[utoipa::path(
    post,
    path = "/calculate",
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Expression evaluated", body = serde_json::Value,
            example = json!({"success": true, "data": {"expression": "2 + 3 * 4", "result": "14", "cached": false}})
        ),
        (status = 400, description = "Invalid expression", body = serde_json::Value,
            example = json!({"success": false, "error": {"code": 400, "message": "Division by zero"}})
        ),
        (status = 429, description = "Rate limit exceeded")
    ),
    tag = "calculator"
)]
pub async fn calculate(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CalculateRequest>,
) -> Result<Json<SuccessResponse<CalculateResponse>>, ApiError> {
    let expression = normalize_display_symbols(&request.expression);

    let key = expression_key(&expression);
    if let Some(result) = state.cache.get(&key).await {
        return Ok(Json(SuccessResponse::new(CalculateResponse {
            expression,
            result,
            cached: true,
        })));
    }

    let value = safe_calc::evaluate(&expression).inspect_err(|e| {
        debug!(code = e.code(), "Expression rejected: {}", e);
    })?;
    let result = format_expression_result(value);
    state.cache.set(&key, &result).await;

    Ok(Json(SuccessResponse::new(CalculateResponse {
        expression,
        result,
        cached: false,
    })))
}
