//! Shunting-yard conversion and postfix evaluation

use crate::error::{EvalError, Result};
use crate::token::Token;

/// Reorder infix tokens into postfix (RPN) order
///
/// Pure reordering, no arithmetic. Operators of equal precedence pop each
/// other (`>=`), which makes them left-associative. Parenthesis mismatches
/// should have been rejected by validation; if one reaches this point it is
/// reported as [`EvalError::MalformedExpression`].
pub fn to_postfix(tokens: Vec<Token>) -> Result<Vec<Token>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(_) => output.push(token),
            Token::LeftParen => stack.push(token),
            Token::RightParen => loop {
                match stack.pop() {
                    Some(Token::LeftParen) => break,
                    Some(op) => output.push(op),
                    None => return Err(EvalError::MalformedExpression),
                }
            },
            Token::Operator(op) => {
                while let Some(&Token::Operator(top)) = stack.last() {
                    if top.precedence() < op.precedence() {
                        break;
                    }
                    stack.pop();
                    output.push(Token::Operator(top));
                }
                stack.push(token);
            },
        }
    }

    while let Some(token) = stack.pop() {
        if token == Token::LeftParen {
            return Err(EvalError::MalformedExpression);
        }
        output.push(token);
    }

    Ok(output)
}

/// Evaluate a postfix sequence
///
/// Each operator pops `b` then `a` and pushes `a OP b`. Exactly one value must
/// remain at the end.
pub fn evaluate_postfix(postfix: &[Token]) -> Result<f64> {
    let mut stack: Vec<f64> = Vec::with_capacity(postfix.len());

    for token in postfix {
        match token {
            Token::Number(lexeme) => {
                let value: f64 = lexeme
                    .parse()
                    .map_err(|_| EvalError::MalformedExpression)?;
                stack.push(value);
            },
            Token::Operator(op) => {
                let (Some(b), Some(a)) = (stack.pop(), stack.pop()) else {
                    return Err(EvalError::MalformedExpression);
                };
                stack.push(op.apply(a, b)?);
            },
            Token::LeftParen | Token::RightParen => {
                return Err(EvalError::MalformedExpression);
            },
        }
    }

    let &[value] = stack.as_slice() else {
        return Err(EvalError::MalformedExpression);
    };
    classify(value)
}

fn classify(value: f64) -> Result<f64> {
    if value.is_infinite() {
        return Err(EvalError::ResultIsInfinity);
    }
    if value.is_nan() {
        return Err(EvalError::ResultIsNotANumber);
    }
    Ok(value)
}
