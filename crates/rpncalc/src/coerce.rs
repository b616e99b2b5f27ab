//! Numeric coercion of stack cells.
//!
//! Text parses as a float; it stays a float when it contains a decimal
//! point or its magnitude is below one, otherwise it is truncated to an
//! integer. Numbers pass through and anything else is rejected.

use rpncalc_script::Value;

use crate::error::CoercionError;

/// Largest magnitude that still truncates into an `i64`.
const INT_LIMIT: f64 = 9.2e18;

pub fn coerce(value: &Value) -> Result<Value, CoercionError> {
    match value {
        Value::Int(_) | Value::Float(_) => Ok(value.clone()),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Str(text) => coerce_text(text).ok_or_else(|| CoercionError::new(value.repr())),
        other => Err(CoercionError::new(other.repr())),
    }
}

/// Parse numeric text, or `None` when it is not a finite number.
pub fn coerce_text(text: &str) -> Option<Value> {
    let text = text.trim();
    let parsed: f64 = text.parse().ok()?;
    if !parsed.is_finite() {
        return None;
    }
    if text.contains('.') || parsed.abs() < 1.0 || parsed.abs() >= INT_LIMIT {
        return Some(Value::Float(parsed));
    }
    Some(Value::Int(parsed.trunc() as i64))
}

/// Whether a cell reads as a number.
pub fn is_numeric(value: &Value) -> bool {
    coerce(value).is_ok()
}
