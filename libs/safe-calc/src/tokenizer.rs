//! Tokenizer
//!
//! Splits a validated expression into numbers, operators and parentheses,
//! then checks the token sequence:
//! - only `-` may be the first token, and no operator may be the last
//! - every number lexeme has the shape `\d+\.?\d*([eE][+-]?\d+)?` and parses
//!   to a finite float
//!
//! A leading `-` is then folded into the first operand: `-5` becomes one
//! number token, `-(…)` becomes `0 - (…)`.

use std::iter::Peekable;
use std::str::CharIndices;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::TokenError;
use crate::token::{Operator, Token};
use crate::validator::{may_lead, may_trail};

const NUMBER_PATTERN: &str = r"^\d+\.?\d*(?:[eE][+-]?\d+)?$";

/// Compiled lazily; if compilation ever failed no lexeme would be accepted.
fn number_shape() -> Option<&'static Regex> {
    static SHAPE: OnceLock<Option<Regex>> = OnceLock::new();
    SHAPE
        .get_or_init(|| Regex::new(NUMBER_PATTERN).ok())
        .as_ref()
}

/// Whether `lexeme` is a well-formed, finite number
pub fn is_number_lexeme(lexeme: &str) -> bool {
    number_shape().is_some_and(|re| re.is_match(lexeme))
        && lexeme.parse::<f64>().is_ok_and(f64::is_finite)
}

/// Tokenize an expression that already passed [`crate::validator::validate`]
pub fn tokenize(expression: &str) -> Result<Vec<Token>, TokenError> {
    let compact: String = expression.chars().filter(|c| *c != ' ').collect();

    let mut tokens = scan(&compact)?;
    if tokens.is_empty() {
        return Err(TokenError::NoValidTokens);
    }

    check_sequence(&tokens)?;
    fold_leading_sign(&mut tokens);
    Ok(tokens)
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E')
}

fn scan(text: &str) -> Result<Vec<Token>, TokenError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if is_number_char(c) {
            let end = number_run_end(&mut chars, start);
            tokens.push(Token::number(&text[start..end]));
            continue;
        }

        chars.next();
        let token = match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            _ => match Operator::from_char(c) {
                Some(op) => Token::Operator(op),
                None => return Err(TokenError::invalid(c.to_string())),
            },
        };
        tokens.push(token);
    }

    Ok(tokens)
}

/// Consume the longest number-like run starting at `start` and return its end
/// offset. A sign is part of the run only directly after an exponent marker.
fn number_run_end(chars: &mut Peekable<CharIndices<'_>>, start: usize) -> usize {
    let mut end = start;
    let mut prev: Option<char> = None;

    while let Some(&(offset, c)) = chars.peek() {
        let exponent_sign = matches!(c, '+' | '-') && matches!(prev, Some('e' | 'E'));
        if !is_number_char(c) && !exponent_sign {
            break;
        }
        end = offset + c.len_utf8();
        prev = Some(c);
        chars.next();
    }

    end
}

fn check_sequence(tokens: &[Token]) -> Result<(), TokenError> {
    if let Some(first) = tokens.first() {
        if first.as_operator().is_some_and(|op| !may_lead(op)) {
            return Err(TokenError::invalid(first.to_string()));
        }
    }
    if let Some(last) = tokens.last() {
        if last.as_operator().is_some_and(|op| !may_trail(op)) {
            return Err(TokenError::invalid(last.to_string()));
        }
    }

    for token in tokens {
        if let Token::Number(lexeme) = token {
            if !is_number_lexeme(lexeme) {
                return Err(TokenError::invalid(lexeme.as_str()));
            }
        }
    }

    Ok(())
}

fn fold_leading_sign(tokens: &mut Vec<Token>) {
    if tokens.first() != Some(&Token::Operator(Operator::Sub)) {
        return;
    }

    match tokens.get(1) {
        Some(Token::Number(lexeme)) => {
            let signed = Token::number(format!("-{}", lexeme));
            tokens.remove(0);
            tokens[0] = signed;
        },
        _ => tokens.insert(0, Token::number("0")),
    }
}
