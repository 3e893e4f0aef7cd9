//! Error handling for the calculator service
//!
//! [`CalcSrvError`] covers startup and configuration. [`ApiError`] is what
//! handlers return: every domain error is mapped onto the shared `AppError`
//! envelope with a fixed client-facing message.

use axum::response::{IntoResponse, Response};
use common::AppError;
use safe_calc::{EvalError, ScientificError, ValidationError};
use thiserror::Error;

/// Service startup errors
#[derive(Debug, Error)]
pub enum CalcSrvError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    #[error("Logging error: {0}")]
    Logging(#[from] common::LoggingError),
}

pub type Result<T> = std::result::Result<T, CalcSrvError>;

impl From<figment::Error> for CalcSrvError {
    fn from(err: figment::Error) -> Self {
        CalcSrvError::Config(err.to_string())
    }
}

pub const MSG_INVALID_EXPRESSION: &str = "Invalid expression";
pub const MSG_EMPTY_EXPRESSION: &str = "Expression cannot be empty";
pub const MSG_EXPRESSION_TOO_LONG: &str = "Expression too long (max 1000 characters)";
pub const MSG_INVALID_JSON: &str = "Invalid JSON data";
pub const MSG_CONTENT_TYPE: &str = "Content-Type must be application/json";
pub const MSG_EMPTY_FUNCTION: &str = "Function name cannot be empty";
pub const MSG_NOT_FOUND: &str = "Endpoint not found";
pub const MSG_RATE_LIMITED: &str = "Rate limit exceeded. Please try again later.";
pub const MSG_BODY_TOO_LARGE: &str = "Request body too large";

/// Handler error, rendered through the shared error envelope
#[derive(Debug, Clone)]
pub struct ApiError(pub AppError);

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(AppError::bad_request(message))
    }

    pub fn message(&self) -> &str {
        &self.0.error.message
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<EvalError> for ApiError {
    fn from(err: EvalError) -> Self {
        let app = match err {
            EvalError::Validation(ValidationError::EmptyExpression) => {
                AppError::bad_request(MSG_EMPTY_EXPRESSION)
            },
            EvalError::Validation(ValidationError::TooLong) => {
                AppError::bad_request(MSG_EXPRESSION_TOO_LONG)
            },
            EvalError::DivisionByZero => AppError::bad_request("Division by zero"),
            EvalError::ResultIsInfinity => AppError::bad_request("Infinity"),
            EvalError::ResultIsNotANumber => AppError::bad_request("Not a number"),
            other => AppError::bad_request(MSG_INVALID_EXPRESSION).with_details(other.to_string()),
        };
        Self(app)
    }
}

impl From<ScientificError> for ApiError {
    fn from(err: ScientificError) -> Self {
        Self(AppError::bad_request(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}
