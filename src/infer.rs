// src/infer.rs
//! Type inference at the serialization boundary.
//!
//! The first few table columns are identifiers and labels and always go out
//! as text. From `numeric_from` on, a value that reads as a finite decimal is
//! written as a number (an integer when it has no fractional part). Anything
//! else stays text; that fallback is the normal case, not an error.

use crate::cell::CellValue;

pub fn infer_cell(value: &str, column: usize, numeric_from: usize) -> CellValue {
    if column < numeric_from {
        return CellValue::Text(s!(value));
    }
    match parse_decimal(value) {
        Some(n) if is_whole(n) => CellValue::Integer(n as i64),
        Some(n) => CellValue::Real(n),
        None => CellValue::Text(s!(value)),
    }
}

fn parse_decimal(value: &str) -> Option<f64> {
    // f64's parser also takes "inf" and "NaN"; neither is a decimal.
    if value.is_empty() || !value.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_whole(n: f64) -> bool {
    n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64
}
