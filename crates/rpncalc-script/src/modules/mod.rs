//! Importable modules.
//!
//! `import` statements resolve module names here. Each loader builds a fresh
//! [`Module`]; the namespace caches the result so repeated imports share one
//! instance (and, for `random`, one generator).

pub mod math;
pub mod numpy;
pub mod random;

use crate::callable::Args;
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};

/// Names `load` can resolve.
pub const AVAILABLE: &[&str] = &["math", "numpy", "random"];

/// Build the module named `name`, if it exists.
pub fn load(name: &str) -> Option<Module> {
    match name {
        "math" => Some(math::module()),
        "numpy" => Some(numpy::module()),
        "random" => Some(random::module()),
        _ => None,
    }
}

// ============================================================================
// Argument helpers shared by the module implementations
// ============================================================================

/// Positional argument `index`, or a type error naming the function.
pub(crate) fn arg<'a>(args: &'a Args, index: usize, func: &str) -> EvalResult<&'a Value> {
    args.get(index).ok_or_else(|| {
        EvalError::type_error(format!("{}() missing required argument {}", func, index + 1))
    })
}

/// A real-number argument.
pub(crate) fn real(args: &Args, index: usize, func: &str) -> EvalResult<f64> {
    let value = arg(args, index, func)?;
    value.as_f64().ok_or_else(|| {
        EvalError::type_error(format!(
            "{}() must be real number, not {}",
            func,
            value.type_name()
        ))
    })
}

/// An exact integer argument; floats are rejected.
pub(crate) fn integer(args: &Args, index: usize, func: &str) -> EvalResult<i64> {
    let value = arg(args, index, func)?;
    value.as_i64().ok_or_else(|| {
        EvalError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

/// An iterable argument, flattened to its items.
pub(crate) fn items(args: &Args, index: usize, func: &str) -> EvalResult<Vec<Value>> {
    let value = arg(args, index, func)?;
    value.iter_items().ok_or_else(|| {
        EvalError::type_error(format!("'{}' object is not iterable", value.type_name()))
    })
}

/// Every item of an iterable argument as a float.
pub(crate) fn reals(args: &Args, index: usize, func: &str) -> EvalResult<Vec<f64>> {
    items(args, index, func)?
        .iter()
        .map(|v| {
            v.as_f64().ok_or_else(|| {
                EvalError::type_error(format!(
                    "{}() must be real number, not {}",
                    func,
                    v.type_name()
                ))
            })
        })
        .collect()
}

/// Convert an integral float to an `Int`, degrading to `Float` past `i64`.
pub(crate) fn float_to_int(f: f64) -> EvalResult<Value> {
    if f.is_nan() {
        return Err(EvalError::value_error("cannot convert float NaN to integer"));
    }
    if f.is_infinite() {
        return Err(EvalError::Overflow(
            "cannot convert float infinity to integer".into(),
        ));
    }
    let t = f.trunc();
    if t.abs() < 9.2e18 {
        Ok(Value::Int(t as i64))
    } else {
        Ok(Value::Float(t))
    }
}
