//! Evaluation entry points

use tracing::trace;

use crate::error::Result;
use crate::postfix::{evaluate_postfix, to_postfix};
use crate::token::Token;
use crate::tokenizer::tokenize;
use crate::validator::validate;

/// Validate, tokenize and convert an expression to postfix order
pub fn compile(expression: &str) -> Result<Vec<Token>> {
    validate(expression)?;
    let tokens = tokenize(expression.trim())?;
    to_postfix(tokens)
}

/// Evaluate an arithmetic expression
///
/// Deterministic: the same input always yields the same value or the same
/// error classification.
pub fn evaluate(expression: &str) -> Result<f64> {
    let postfix = compile(expression)?;
    let value = evaluate_postfix(&postfix)?;
    trace!(expression, value, "evaluated");
    Ok(value)
}
