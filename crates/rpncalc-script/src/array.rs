//! Homogeneous numeric arrays.
//!
//! An `Array` is the `ndarray` cell type: one-dimensional and of a single
//! element type. Arithmetic broadcasts between arrays and scalars.

use std::fmt;

use crate::error::{EvalError, EvalResult};
use crate::value::{Value, format_float};

/// Element type of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DType {
    Int,
    Float,
    Text,
}

impl DType {
    pub fn name(self) -> &'static str {
        match self {
            DType::Int => "int",
            DType::Float => "float",
            DType::Text => "str",
        }
    }
}

/// A one-dimensional homogeneous array.
#[derive(Clone, Debug, PartialEq)]
pub enum Array {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl Array {
    pub fn len(&self) -> usize {
        match self {
            Array::Int(v) => v.len(),
            Array::Float(v) => v.len(),
            Array::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            Array::Int(_) => DType::Int,
            Array::Float(_) => DType::Float,
            Array::Text(_) => DType::Text,
        }
    }

    /// Element at `index`; negative indices count from the end.
    pub fn get(&self, index: i64) -> Option<Value> {
        let len = self.len() as i64;
        let i = if index < 0 { index + len } else { index };
        if i < 0 || i >= len {
            return None;
        }
        let i = i as usize;
        Some(match self {
            Array::Int(v) => Value::Int(v[i]),
            Array::Float(v) => Value::Float(v[i]),
            Array::Text(v) => Value::str(v[i].as_str()),
        })
    }

    /// Elements as cell values.
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Array::Int(v) => v.iter().map(|n| Value::Int(*n)).collect(),
            Array::Float(v) => v.iter().map(|f| Value::Float(*f)).collect(),
            Array::Text(v) => v.iter().map(|s| Value::str(s.as_str())).collect(),
        }
    }

    /// Elements as floats; text arrays are rejected.
    pub fn to_f64(&self) -> EvalResult<Vec<f64>> {
        match self {
            Array::Int(v) => Ok(v.iter().map(|n| *n as f64).collect()),
            Array::Float(v) => Ok(v.clone()),
            Array::Text(_) => Err(EvalError::type_error(
                "ufunc not supported for input type str",
            )),
        }
    }

    /// Build an array of the requested element type, converting each value.
    ///
    /// Conversions are strict: floats become ints only when integral, text
    /// becomes a number only when it parses, and containers or opaque values
    /// never convert.
    pub fn from_values(values: &[Value], dtype: DType) -> EvalResult<Array> {
        match dtype {
            DType::Int => values
                .iter()
                .map(to_int_element)
                .collect::<EvalResult<Vec<_>>>()
                .map(Array::Int),
            DType::Float => values
                .iter()
                .map(to_float_element)
                .collect::<EvalResult<Vec<_>>>()
                .map(Array::Float),
            DType::Text => values
                .iter()
                .map(to_text_element)
                .collect::<EvalResult<Vec<_>>>()
                .map(Array::Text),
        }
    }

    /// Build an array choosing the narrowest element type that fits every value.
    pub fn infer(values: &[Value]) -> EvalResult<Array> {
        if values.iter().all(|v| matches!(v, Value::Int(_) | Value::Bool(_))) {
            return Array::from_values(values, DType::Int);
        }
        if values.iter().all(Value::is_number) {
            return Array::from_values(values, DType::Float);
        }
        if values.iter().all(Value::is_str) {
            return Array::from_values(values, DType::Text);
        }
        Err(EvalError::value_error(
            "setting an array element with a sequence of mixed types",
        ))
    }

    /// Apply a float function to every element, producing a float array.
    pub fn map_f64(&self, f: impl Fn(f64) -> f64) -> EvalResult<Array> {
        Ok(Array::Float(self.to_f64()?.into_iter().map(f).collect()))
    }

    /// Sum of the elements; integer sums that overflow fall back to floats.
    pub fn sum(&self) -> EvalResult<Value> {
        match self {
            Array::Int(v) => {
                let mut total: i64 = 0;
                for n in v {
                    match total.checked_add(*n) {
                        Some(t) => total = t,
                        None => return Ok(Value::Float(v.iter().map(|n| *n as f64).sum())),
                    }
                }
                Ok(Value::Int(total))
            }
            Array::Float(v) => Ok(Value::Float(v.iter().sum())),
            Array::Text(_) => Err(EvalError::type_error(
                "cannot perform reduce with flexible type",
            )),
        }
    }
}

fn to_int_element(value: &Value) -> EvalResult<i64> {
    match value {
        Value::Int(n) => Ok(*n),
        Value::Bool(b) => Ok(*b as i64),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 9.2e18 => Ok(*f as i64),
        Value::Str(s) => s.trim().parse::<i64>().map_err(|_| {
            EvalError::value_error(format!("invalid literal for int() with base 10: '{}'", s))
        }),
        other => Err(EvalError::type_error(format!(
            "cannot convert {} '{}' to int",
            other.type_name(),
            other
        ))),
    }
}

fn to_float_element(value: &Value) -> EvalResult<f64> {
    match value {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| EvalError::value_error(format!("could not convert string to float: '{}'", s))),
        other => other.as_f64().ok_or_else(|| {
            EvalError::type_error(format!(
                "cannot convert {} '{}' to float",
                other.type_name(),
                other
            ))
        }),
    }
}

fn to_text_element(value: &Value) -> EvalResult<String> {
    match value {
        Value::Str(s) => Ok(s.to_string()),
        Value::Int(_) | Value::Float(_) | Value::Bool(_) | Value::None => Ok(value.to_string()),
        other => Err(EvalError::type_error(format!(
            "cannot store {} in a text array",
            other.type_name()
        ))),
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = match self {
            Array::Int(v) => v.iter().map(|n| n.to_string()).collect(),
            Array::Float(v) => v.iter().map(|x| format_float(*x)).collect(),
            Array::Text(v) => v.iter().map(|s| format!("'{}'", s)).collect(),
        };
        write!(f, "[{}]", parts.join(" "))
    }
}
