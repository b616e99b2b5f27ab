//! Operator semantics.
//!
//! Integer arithmetic is exact in `i64` and falls back to floats when a
//! result overflows. Arrays broadcast against scalars and against arrays of
//! the same length.

use std::cmp::Ordering;

use crate::array::Array;
use crate::ast::{BinOp, CmpOp, UnaryOp};
use crate::builtins::bounded_len;
use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// Apply a binary operator: `left op right`.
pub fn binary(op: BinOp, left: &Value, right: &Value) -> EvalResult<Value> {
    if matches!(left, Value::Array(_)) || matches!(right, Value::Array(_)) {
        return array_binary(op, left, right);
    }

    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return int_binary(op, a, b);
    }
    if left.is_number() && right.is_number() {
        let (a, b) = (num(left), num(right));
        return float_binary(op, a, b);
    }

    match (op, left, right) {
        (BinOp::Add, Value::Str(a), Value::Str(b)) => Ok(Value::str(format!("{}{}", a, b))),
        (BinOp::Add, Value::List(a), Value::List(b)) => {
            Ok(Value::list(a.iter().chain(b.iter()).cloned().collect::<Vec<_>>()))
        }
        (BinOp::Add, Value::Tuple(a), Value::Tuple(b)) => {
            Ok(Value::tuple(a.iter().chain(b.iter()).cloned().collect::<Vec<_>>()))
        }
        (BinOp::Mul, Value::Str(s), n) | (BinOp::Mul, n, Value::Str(s)) if n.as_i64().is_some() => {
            let count = n.as_i64().unwrap_or(0).max(0) as u128;
            if s.is_empty() {
                return Ok(Value::str(""));
            }
            let len = bounded_len((s.len() as u128).checked_mul(count), "repeated string")?;
            Ok(Value::str(s.repeat(len / s.len())))
        }
        (BinOp::Mul, Value::List(items), n) | (BinOp::Mul, n, Value::List(items))
            if n.as_i64().is_some() =>
        {
            let count = n.as_i64().unwrap_or(0).max(0) as u128;
            if items.is_empty() {
                return Ok(Value::list(Vec::new()));
            }
            let len = bounded_len((items.len() as u128).checked_mul(count), "repeated list")?;
            let mut out = Vec::with_capacity(len);
            for _ in 0..len / items.len() {
                out.extend(items.iter().cloned());
            }
            Ok(Value::list(out))
        }
        _ => Err(EvalError::type_error(format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ))),
    }
}

fn num(v: &Value) -> f64 {
    v.as_f64().unwrap_or(f64::NAN)
}

fn int_binary(op: BinOp, a: i64, b: i64) -> EvalResult<Value> {
    let exact = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => {
            if b == 0 {
                return Err(EvalError::ZeroDivision);
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinOp::FloorDiv => {
            if b == 0 {
                return Err(EvalError::ZeroDivision);
            }
            a.checked_div_euclid(b).map(|_| floor_div(a, b))
        }
        BinOp::Mod => {
            if b == 0 {
                return Err(EvalError::ZeroDivision);
            }
            if b == -1 {
                return Ok(Value::Int(0));
            }
            a.checked_rem(b).map(|r| if r != 0 && (r < 0) != (b < 0) { r + b } else { r })
        }
        BinOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(EvalError::ZeroDivision);
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            u32::try_from(b).ok().and_then(|e| a.checked_pow(e))
        }
    };
    match exact {
        Some(n) => Ok(Value::Int(n)),
        None => float_binary(op, a as f64, b as f64),
    }
}

fn floor_div(a: i64, b: i64) -> i64 {
    let q = a / b;
    if (a % b != 0) && ((a < 0) != (b < 0)) { q - 1 } else { q }
}

fn float_binary(op: BinOp, a: f64, b: f64) -> EvalResult<Value> {
    let result = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div => {
            if b == 0.0 {
                return Err(EvalError::ZeroDivision);
            }
            a / b
        }
        BinOp::FloorDiv => {
            if b == 0.0 {
                return Err(EvalError::ZeroDivision);
            }
            (a / b).floor()
        }
        BinOp::Mod => {
            if b == 0.0 {
                return Err(EvalError::ZeroDivision);
            }
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) { r + b } else { r }
        }
        BinOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(EvalError::ZeroDivision);
            }
            if a < 0.0 && b.fract() != 0.0 {
                return Err(EvalError::value_error(
                    "negative number cannot be raised to a fractional power",
                ));
            }
            let r = a.powf(b);
            if r.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(EvalError::Overflow("numerical result out of range".into()));
            }
            r
        }
    };
    Ok(Value::Float(result))
}

/// Broadcast operand: an array, or a scalar repeated to fit.
enum Operand {
    Array(Array),
    Scalar(Value),
}

fn operand(value: &Value) -> EvalResult<Operand> {
    match value {
        Value::Array(a) => Ok(Operand::Array((**a).clone())),
        Value::List(items) | Value::Tuple(items) => Ok(Operand::Array(Array::infer(items)?)),
        v if v.is_number() => Ok(Operand::Scalar(v.clone())),
        other => Err(EvalError::type_error(format!(
            "unsupported operand type for array arithmetic: '{}'",
            other.type_name()
        ))),
    }
}

fn array_binary(op: BinOp, left: &Value, right: &Value) -> EvalResult<Value> {
    let (l, r) = (operand(left)?, operand(right)?);
    let len = match (&l, &r) {
        (Operand::Array(a), Operand::Array(b)) => {
            if a.len() != b.len() {
                return Err(EvalError::value_error(format!(
                    "operands could not be broadcast together with shapes ({},) ({},)",
                    a.len(),
                    b.len()
                )));
            }
            a.len()
        }
        (Operand::Array(a), _) | (_, Operand::Array(a)) => a.len(),
        _ => 0,
    };
    let element = |side: &Operand, i: usize| -> EvalResult<Value> {
        match side {
            Operand::Array(a) => a
                .get(i as i64)
                .ok_or(EvalError::Index(i as i64)),
            Operand::Scalar(v) => Ok(v.clone()),
        }
    };
    let mut out = Vec::with_capacity(len);
    for i in 0..len {
        let (a, b) = (element(&l, i)?, element(&r, i)?);
        if !a.is_number() || !b.is_number() {
            return Err(EvalError::type_error(format!(
                "ufunc '{}' not supported for the input types",
                op.symbol()
            )));
        }
        // Elementwise division by zero follows IEEE rules instead of raising.
        let value = match binary(op, &a, &b) {
            Err(EvalError::ZeroDivision) => float_ieee(op, num(&a), num(&b)),
            other => other?,
        };
        out.push(value);
    }
    Ok(Value::array(Array::infer(&out)?))
}

fn float_ieee(op: BinOp, a: f64, b: f64) -> Value {
    Value::Float(match op {
        BinOp::FloorDiv => (a / b).floor(),
        BinOp::Mod => f64::NAN,
        BinOp::Pow => a.powf(b),
        _ => a / b,
    })
}

/// Apply a unary operator.
pub fn unary(op: UnaryOp, value: &Value) -> EvalResult<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Pos => match value {
            Value::Bool(b) => Ok(Value::Int(*b as i64)),
            v if v.is_number() => Ok(v.clone()),
            Value::Array(_) => Ok(value.clone()),
            other => Err(EvalError::type_error(format!(
                "bad operand type for unary +: '{}'",
                other.type_name()
            ))),
        },
        UnaryOp::Neg => match value {
            Value::Int(n) => Ok(n
                .checked_neg()
                .map(Value::Int)
                .unwrap_or(Value::Float(-(*n as f64)))),
            Value::Bool(b) => Ok(Value::Int(-(*b as i64))),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Array(_) => binary(BinOp::Mul, value, &Value::Int(-1)),
            other => Err(EvalError::type_error(format!(
                "bad operand type for unary -: '{}'",
                other.type_name()
            ))),
        },
    }
}

/// Absolute value of a number or array.
pub fn abs(value: &Value) -> EvalResult<Value> {
    match value {
        Value::Int(n) => Ok(n
            .checked_abs()
            .map(Value::Int)
            .unwrap_or(Value::Float((*n as f64).abs()))),
        Value::Bool(b) => Ok(Value::Int(*b as i64)),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        Value::Array(a) => match &**a {
            Array::Int(xs) => Ok(Value::array(Array::Int(
                xs.iter().map(|n| n.wrapping_abs()).collect(),
            ))),
            other => Ok(Value::array(other.map_f64(f64::abs)?)),
        },
        other => Err(EvalError::type_error(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
    }
}

/// Order two values, if they are comparable.
pub fn ordering(left: &Value, right: &Value) -> EvalResult<Ordering> {
    match (left, right) {
        (a, b) if a.is_number() && b.is_number() => {
            if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
                return Ok(x.cmp(&y));
            }
            num(a)
                .partial_cmp(&num(b))
                .ok_or_else(|| EvalError::value_error("cannot order nan"))
        }
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if x != y {
                    return ordering(x, y);
                }
            }
            Ok(a.len().cmp(&b.len()))
        }
        _ => Err(EvalError::type_error(format!(
            "'<' not supported between instances of '{}' and '{}'",
            left.type_name(),
            right.type_name()
        ))),
    }
}

/// Membership test: `needle in haystack`.
pub fn contains(haystack: &Value, needle: &Value) -> EvalResult<bool> {
    match haystack {
        Value::Str(s) => match needle {
            Value::Str(n) => Ok(s.contains(&**n)),
            other => Err(EvalError::type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::Dict(entries) => Ok(entries.iter().any(|(k, _)| k == needle)),
        other => match other.iter_items() {
            Some(items) => Ok(items.contains(needle)),
            None => Err(EvalError::type_error(format!(
                "argument of type '{}' is not iterable",
                other.type_name()
            ))),
        },
    }
}

/// Evaluate one comparison link.
pub fn compare(op: CmpOp, left: &Value, right: &Value) -> EvalResult<bool> {
    match op {
        CmpOp::Eq => Ok(left == right),
        CmpOp::NotEq => Ok(left != right),
        CmpOp::Lt => Ok(ordering(left, right)? == Ordering::Less),
        CmpOp::Le => Ok(ordering(left, right)? != Ordering::Greater),
        CmpOp::Gt => Ok(ordering(left, right)? == Ordering::Greater),
        CmpOp::Ge => Ok(ordering(left, right)? != Ordering::Less),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|b| !b),
    }
}
