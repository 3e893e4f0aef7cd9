//! Scientific function table
//!
//! A flat dispatch over single-argument functions, each with its own domain
//! check. Trigonometric functions take degrees.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use num_traits::One;
use tracing::debug;

use crate::error::ScientificError;

/// Largest integer accepted by `factorial` (171! overflows an f64)
pub const MAX_FACTORIAL_INPUT: f64 = 170.0;

/// Largest accepted input magnitude
pub const MAX_INPUT_MAGNITUDE: f64 = 1e10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScientificFunction {
    Sin,
    Cos,
    Tan,
    Log,
    Ln,
    Sqrt,
    Pow,
    Factorial,
    Abs,
    Negate,
}

/// Function output
///
/// `factorial` is exact; everything else is a float.
#[derive(Debug, Clone, PartialEq)]
pub enum ScientificValue {
    Float(f64),
    Integer(BigUint),
}

impl ScientificFunction {
    pub const ALL: [Self; 10] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Log,
        Self::Ln,
        Self::Sqrt,
        Self::Pow,
        Self::Factorial,
        Self::Abs,
        Self::Negate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Log => "log",
            Self::Ln => "ln",
            Self::Sqrt => "sqrt",
            Self::Pow => "pow",
            Self::Factorial => "factorial",
            Self::Abs => "abs",
            Self::Negate => "negate",
        }
    }

    /// Apply the function to `value`
    pub fn apply(self, value: f64) -> Result<ScientificValue, ScientificError> {
        if !value.is_finite() {
            return Err(ScientificError::ValueNotFinite);
        }

        let result = match self {
            Self::Sin => value.to_radians().sin(),
            Self::Cos => value.to_radians().cos(),
            Self::Tan => value.to_radians().tan(),
            Self::Log => {
                if value <= 0.0 {
                    return Err(ScientificError::LogOfNonPositive);
                }
                value.log10()
            },
            Self::Ln => {
                if value <= 0.0 {
                    return Err(ScientificError::LnOfNonPositive);
                }
                value.ln()
            },
            Self::Sqrt => {
                if value < 0.0 {
                    return Err(ScientificError::SqrtOfNegative);
                }
                value.sqrt()
            },
            Self::Pow => value * value,
            Self::Factorial => {
                if value < 0.0 || value.fract() != 0.0 || value > MAX_FACTORIAL_INPUT {
                    return Err(ScientificError::InvalidFactorialInput);
                }
                return Ok(ScientificValue::Integer(factorial(value as u32)));
            },
            Self::Abs => value.abs(),
            Self::Negate => -value,
        };

        debug!(function = self.name(), value, result, "scientific");

        if result.is_infinite() {
            return Err(ScientificError::ResultIsInfinity);
        }
        if result.is_nan() {
            return Err(ScientificError::ResultIsNotANumber);
        }
        Ok(ScientificValue::Float(result))
    }
}

impl FromStr for ScientificFunction {
    type Err = ScientificError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == name)
            .ok_or(ScientificError::UnknownFunction)
    }
}

impl fmt::Display for ScientificFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reject inputs outside the accepted magnitude
pub fn validate_input(value: f64) -> Result<(), ScientificError> {
    if !value.is_finite() {
        return Err(ScientificError::ValueNotFinite);
    }
    if value.abs() > MAX_INPUT_MAGNITUDE {
        return Err(ScientificError::ValueTooLarge);
    }
    Ok(())
}

/// Exact `n!`
pub fn factorial(n: u32) -> BigUint {
    (2..=n).fold(BigUint::one(), |acc, k| acc * k)
}
