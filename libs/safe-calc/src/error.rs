//! Error types for safe-calc
//!
//! Every stage of the pipeline has its own classification. [`EvalError`] is the
//! single error surfaced by [`crate::evaluate`] and wraps the earlier stages.

use thiserror::Error;

/// Structural rejections found by the character-level validator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Empty expression")]
    EmptyExpression,

    #[error("Expression too long")]
    TooLong,

    #[error("Invalid characters in expression")]
    InvalidCharacter,

    #[error("Unbalanced parentheses")]
    UnbalancedParentheses,

    #[error("Consecutive operators not allowed")]
    ConsecutiveOperators,

    #[error("Invalid operator placement")]
    InvalidOperatorPlacement,
}

impl ValidationError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyExpression => "EMPTY_EXPRESSION",
            Self::TooLong => "TOO_LONG",
            Self::InvalidCharacter => "INVALID_CHARACTER",
            Self::UnbalancedParentheses => "UNBALANCED_PARENTHESES",
            Self::ConsecutiveOperators => "CONSECUTIVE_OPERATORS",
            Self::InvalidOperatorPlacement => "INVALID_OPERATOR_PLACEMENT",
        }
    }
}

/// Tokenizer rejections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("No valid tokens found")]
    NoValidTokens,

    /// Carries the offending lexeme
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

impl TokenError {
    pub fn invalid(lexeme: impl Into<String>) -> Self {
        Self::InvalidToken(lexeme.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NoValidTokens => "NO_VALID_TOKENS",
            Self::InvalidToken(_) => "INVALID_TOKEN",
        }
    }
}

/// Evaluation errors
///
/// None of these are retryable: the same input always yields the same
/// classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("Malformed expression")]
    MalformedExpression,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Result is infinity")]
    ResultIsInfinity,

    #[error("Result is not a number")]
    ResultIsNotANumber,
}

impl EvalError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::Token(e) => e.code(),
            Self::MalformedExpression => "MALFORMED_EXPRESSION",
            Self::DivisionByZero => "DIVISION_BY_ZERO",
            Self::ResultIsInfinity => "RESULT_IS_INFINITY",
            Self::ResultIsNotANumber => "RESULT_IS_NOT_A_NUMBER",
        }
    }
}

/// Scientific function errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScientificError {
    #[error("Unknown function")]
    UnknownFunction,

    #[error("Value must be a number")]
    ValueNotFinite,

    #[error("Value too large")]
    ValueTooLarge,

    #[error("Square root of negative number")]
    SqrtOfNegative,

    #[error("Logarithm of non-positive number")]
    LogOfNonPositive,

    #[error("Natural log of non-positive number")]
    LnOfNonPositive,

    #[error("Invalid factorial input")]
    InvalidFactorialInput,

    #[error("Infinity")]
    ResultIsInfinity,

    #[error("Not a number")]
    ResultIsNotANumber,
}

impl ScientificError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownFunction => "UNKNOWN_FUNCTION",
            Self::ValueNotFinite => "VALUE_NOT_FINITE",
            Self::ValueTooLarge => "VALUE_TOO_LARGE",
            Self::SqrtOfNegative => "SQRT_OF_NEGATIVE",
            Self::LogOfNonPositive => "LOG_OF_NON_POSITIVE",
            Self::LnOfNonPositive => "LN_OF_NON_POSITIVE",
            Self::InvalidFactorialInput => "INVALID_FACTORIAL_INPUT",
            Self::ResultIsInfinity => "RESULT_IS_INFINITY",
            Self::ResultIsNotANumber => "RESULT_IS_NOT_A_NUMBER",
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
