//! JSON body extractor with the calculator's request checks
//!
//! Checks run in a fixed order: content type, body read, JSON syntax,
//! non-empty object, required fields, then typed deserialization. Each
//! failure becomes a 400 envelope, except an over-limit body (413).

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use common::AppError;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, MSG_BODY_TOO_LARGE, MSG_CONTENT_TYPE, MSG_INVALID_JSON};

/// Request body that names its required top-level fields
pub trait JsonBody: DeserializeOwned {
    const REQUIRED_FIELDS: &'static [&'static str];
}

/// Extracts `T` from a JSON request body
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: JsonBody,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Err(ApiError::bad_request(MSG_CONTENT_TYPE));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::from(AppError::payload_too_large(MSG_BODY_TOO_LARGE))
            } else {
                ApiError::from(
                    AppError::bad_request(MSG_INVALID_JSON).with_details(rejection.body_text()),
                )
            }
        })?;

        parse_body(&bytes).map(ValidatedJson)
    }
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("application/json"))
}

/// Run the body checks on raw bytes
pub fn parse_body<T: JsonBody>(bytes: &[u8]) -> Result<T, ApiError> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| {
        ApiError::from(AppError::bad_request(MSG_INVALID_JSON).with_details(e.to_string()))
    })?;

    let object = match value.as_object() {
        Some(object) if !object.is_empty() => object,
        _ => return Err(ApiError::bad_request(MSG_INVALID_JSON)),
    };

    if let Some(field) = T::REQUIRED_FIELDS
        .iter()
        .find(|field| !object.contains_key(**field))
    {
        return Err(AppError::missing_field(field).into());
    }

    serde_json::from_value(value).map_err(|e| {
        ApiError::from(AppError::bad_request(MSG_INVALID_JSON).with_details(e.to_string()))
    })
}
