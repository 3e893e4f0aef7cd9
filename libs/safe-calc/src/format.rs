//! Result rounding and text rendering

use crate::scientific::ScientificValue;

/// Fractional digits kept in every rendered result
pub const RESULT_PRECISION: usize = 10;

/// Round to `digits` fractional digits through decimal formatting
pub fn round_to_precision(value: f64, digits: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", digits, value).parse().unwrap_or(value)
}

/// Text form of an arithmetic result
///
/// Whole numbers render without a fractional part (`"5"`), everything else
/// uses the shortest round-trip text (`"0.5"`).
pub fn format_expression_result(value: f64) -> String {
    let rounded = round_to_precision(value, RESULT_PRECISION);
    if rounded == 0.0 {
        return "0".to_string();
    }
    if rounded.is_finite() && rounded.fract() == 0.0 {
        return format!("{:.0}", rounded);
    }
    float_text(rounded)
}

/// Text form of a scientific result
///
/// Floats keep their float text (`"4.0"`); exact integers print in full.
pub fn format_scientific_result(value: &ScientificValue) -> String {
    match value {
        ScientificValue::Float(v) => float_text(round_to_precision(*v, RESULT_PRECISION)),
        ScientificValue::Integer(n) => n.to_string(),
    }
}

/// Map display operator symbols onto the ASCII operators the evaluator accepts
pub fn normalize_display_symbols(text: &str) -> String {
    text.replace('×', "*").replace('÷', "/")
}

/// Shortest round-trip text. Magnitudes of `1e16` and up, or below `1e-5`,
/// use exponent form without a `+` or padding: `1e16`, `1.5e-7`.
fn float_text(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    ryu::Buffer::new().format_finite(value).to_string()
}
