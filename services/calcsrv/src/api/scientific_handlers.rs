//! Scientific function endpoint

#![allow(clippy::disallowed_methods)] // json! macro used in utoipa examples

use std::sync::Arc;

use axum::{extract::State, response::Json};
use common::SuccessResponse;
use safe_calc::{format_scientific_result, validate_input, ScientificFunction};
use serde_json::json;

use crate::api::extract::ValidatedJson;
use crate::app_state::AppState;
use crate::cache::scientific_key;
use crate::dto::{ScientificRequest, ScientificResponse};
use crate::error::{ApiError, MSG_EMPTY_FUNCTION};

/// Apply a single-argument scientific function
///
/// Trigonometric functions take degrees. `factorial` accepts whole numbers
/// from 0 to 170 and returns the exact integer.
///
/// @route POST /scientific
/// @input Json<ScientificRequest> - function name and value
/// @output Json<SuccessResponse<ScientificResponse>> - rendered result
/// @side-effects Caches successful results
#[utoipa::path(
    post,
    path = "/scientific",
    request_body = ScientificRequest,
    responses(
        (status = 200, description = "Function applied", body = serde_json::Value,
            example = json!({"success": true, "data": {"function": "sqrt", "value": 16.0, "result": "4.0", "cached": false}})
        ),
        (status = 400, description = "Invalid function or value", body = serde_json::Value,
            example = json!({"success": false, "error": {"code": 400, "message": "Square root of negative number"}})
        ),
        (status = 429, description = "Rate limit exceeded")
    ),
    tag = "calculator"
)]
pub async fn scientific(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ScientificRequest>,
) -> Result<Json<SuccessResponse<ScientificResponse>>, ApiError> {
    if request.function.is_empty() {
        return Err(ApiError::bad_request(MSG_EMPTY_FUNCTION));
    }

    let function: ScientificFunction = request.function.parse()?;
    validate_input(request.value)?;

    let key = scientific_key(function.name(), request.value);
    if let Some(result) = state.cache.get(&key).await {
        return Ok(Json(SuccessResponse::new(ScientificResponse {
            function: request.function,
            value: request.value,
            result,
            cached: true,
        })));
    }

    let result = format_scientific_result(&function.apply(request.value)?);
    state.cache.set(&key, &result).await;

    Ok(Json(SuccessResponse::new(ScientificResponse {
        function: request.function,
        value: request.value,
        result,
        cached: false,
    })))
}
