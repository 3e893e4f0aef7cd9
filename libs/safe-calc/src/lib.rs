//! safe-calc - Injection-proof arithmetic evaluation
//!
//! Evaluates untrusted arithmetic text without ever handing it to a general
//! purpose interpreter. Input goes through a fixed pipeline:
//!
//! 1. **validator**: character set, length, parenthesis balance, operator runs
//! 2. **tokenizer**: numbers, the four operators and parentheses
//! 3. **postfix**: shunting-yard reordering, then stack evaluation
//!
//! # Example
//!
//! ```rust
//! use safe_calc::{evaluate, EvalError};
//!
//! assert_eq!(evaluate("2+3*4").unwrap(), 14.0);
//! assert_eq!(evaluate("(2+3)*4").unwrap(), 20.0);
//! assert_eq!(evaluate("-5+3").unwrap(), -2.0);
//! assert_eq!(evaluate("10/0"), Err(EvalError::DivisionByZero));
//! ```
//!
//! # Scientific functions
//!
//! | Function | Domain | Result |
//! |----------|--------|--------|
//! | `sin` `cos` `tan` | degrees | float |
//! | `log` | `x > 0` | base-10 log |
//! | `ln` | `x > 0` | natural log |
//! | `sqrt` | `x >= 0` | float |
//! | `pow` | any | `x²` |
//! | `factorial` | integer `0..=170` | exact integer |
//! | `abs` `negate` | any | float |

pub mod error;
pub mod evaluator;
pub mod format;
pub mod postfix;
pub mod scientific;
pub mod token;
pub mod tokenizer;
pub mod validator;

// Re-exports for convenience
pub use error::{EvalError, Result, ScientificError, TokenError, ValidationError};
pub use evaluator::{compile, evaluate};
pub use format::{
    format_expression_result, format_scientific_result, normalize_display_symbols,
    round_to_precision,
};
pub use scientific::{validate_input, ScientificFunction, ScientificValue};
pub use token::{Operator, Token};
pub use validator::MAX_EXPRESSION_LEN;
