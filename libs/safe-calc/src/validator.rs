//! Character-level validation
//!
//! Runs before tokenization and short-circuits on the first failed check, in
//! this order: empty, length, character set, parenthesis balance,
//! consecutive operators, operator placement.

use crate::error::ValidationError;
use crate::token::Operator;

/// Maximum expression length in characters (after trimming)
pub const MAX_EXPRESSION_LEN: usize = 1000;

fn is_allowed(c: char) -> bool {
    matches!(c, '0'..='9' | '.' | 'e' | 'E' | '+' | '-' | '*' | '/' | '(' | ')' | ' ')
}

/// Whether `op` may open an expression. Only `-` may (a signed leading operand).
///
/// This is the single placement rule; the token-sequence check in the
/// tokenizer goes through it as well.
pub fn may_lead(op: Operator) -> bool {
    op == Operator::Sub
}

/// Whether `op` may close an expression. No operator may.
pub fn may_trail(_op: Operator) -> bool {
    false
}

/// Validate a raw expression
pub fn validate(expression: &str) -> Result<(), ValidationError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(ValidationError::EmptyExpression);
    }

    if expression.chars().count() > MAX_EXPRESSION_LEN {
        return Err(ValidationError::TooLong);
    }

    if !expression.chars().all(is_allowed) {
        return Err(ValidationError::InvalidCharacter);
    }

    if !balanced_parentheses(expression) {
        return Err(ValidationError::UnbalancedParentheses);
    }

    if has_consecutive_operators(expression) {
        return Err(ValidationError::ConsecutiveOperators);
    }

    check_placement(expression)
}

fn balanced_parentheses(expression: &str) -> bool {
    let mut depth: usize = 0;
    for c in expression.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
            },
            _ => {},
        }
    }
    depth == 0
}

/// Flat scan over the raw text; spaces break a run.
fn has_consecutive_operators(expression: &str) -> bool {
    expression
        .as_bytes()
        .windows(2)
        .any(|pair| is_operator_byte(pair[0]) && is_operator_byte(pair[1]))
}

fn is_operator_byte(b: u8) -> bool {
    matches!(b, b'+' | b'-' | b'*' | b'/')
}

fn check_placement(expression: &str) -> Result<(), ValidationError> {
    let leading = expression.chars().next().and_then(Operator::from_char);
    let trailing = expression.chars().last().and_then(Operator::from_char);

    if leading.is_some_and(|op| !may_lead(op)) || trailing.is_some_and(|op| !may_trail(op)) {
        return Err(ValidationError::InvalidOperatorPlacement);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_expressions() {
        assert_eq!(validate("2+3*4"), Ok(()));
        assert_eq!(validate(" (2 + 3) * 4 "), Ok(()));
        assert_eq!(validate("-5+3"), Ok(()));
        assert_eq!(validate("1.5e3/2E-2"), Ok(()));
    }

    #[test]
    fn test_empty() {
        assert_eq!(validate(""), Err(ValidationError::EmptyExpression));
        assert_eq!(validate("   "), Err(ValidationError::EmptyExpression));
    }

    #[test]
    fn test_length_limit_applies_after_trim() {
        let at_limit = "1".repeat(MAX_EXPRESSION_LEN);
        assert_eq!(validate(&format!("  {}  ", at_limit)), Ok(()));

        let over = "1".repeat(MAX_EXPRESSION_LEN + 1);
        assert_eq!(validate(&over), Err(ValidationError::TooLong));
    }

    #[test]
    fn test_invalid_characters() {
        assert_eq!(
            validate("2+3;DROP TABLE"),
            Err(ValidationError::InvalidCharacter)
        );
        assert_eq!(validate("2^3"), Err(ValidationError::InvalidCharacter));
        assert_eq!(validate("2\t+3"), Err(ValidationError::InvalidCharacter));
        assert_eq!(validate("3×4"), Err(ValidationError::InvalidCharacter));
    }

    #[test]
    fn test_unbalanced_parentheses() {
        assert_eq!(
            validate("((1+2)"),
            Err(ValidationError::UnbalancedParentheses)
        );
        assert_eq!(
            validate(")1+2("),
            Err(ValidationError::UnbalancedParentheses)
        );
    }

    #[test]
    fn test_consecutive_operators() {
        assert_eq!(
            validate("2++3"),
            Err(ValidationError::ConsecutiveOperators)
        );
        assert_eq!(
            validate("2*-3"),
            Err(ValidationError::ConsecutiveOperators)
        );
        // A space breaks the raw run; later stages reject this one
        assert_eq!(validate("2+ +3"), Ok(()));
    }

    #[test]
    fn test_operator_placement() {
        assert_eq!(
            validate("+5"),
            Err(ValidationError::InvalidOperatorPlacement)
        );
        assert_eq!(
            validate("*5"),
            Err(ValidationError::InvalidOperatorPlacement)
        );
        assert_eq!(
            validate("5-"),
            Err(ValidationError::InvalidOperatorPlacement)
        );
        assert_eq!(validate("-5"), Ok(()));
    }

    #[test]
    fn test_check_order_short_circuits() {
        // Invalid character wins over unbalanced parentheses
        assert_eq!(validate("(a"), Err(ValidationError::InvalidCharacter));
        // Balance is checked before operator runs
        assert_eq!(
            validate("(2++3"),
            Err(ValidationError::UnbalancedParentheses)
        );
    }
}
