//! Number formatting for the stack display.
//!
//! Both formatters only change how floats look. Integers, text and other
//! cells print as the evaluator prints them; sequences are formatted
//! element by element.

use rpncalc::{Array, Formatter, Value};
use rpncalc_script::format_float;

/// Magnitudes below this show as zero in engineering notation.
const ENGINEERING_ZERO: f64 = 1e-24;

/// Fixed-point floats with a set number of decimals.
#[derive(Clone, Copy, Debug)]
pub struct FixedFormatter {
    pub precision: usize,
}

impl Formatter for FixedFormatter {
    fn format(&self, value: &Value) -> String {
        format_cell(value, &|x| fixed(x, self.precision))
    }
}

/// Floats as `mantissa E exponent` with the exponent a multiple of three.
#[derive(Clone, Copy, Debug)]
pub struct EngineeringFormatter {
    pub precision: usize,
}

impl Formatter for EngineeringFormatter {
    fn format(&self, value: &Value) -> String {
        format_cell(value, &|x| engineering(x, self.precision))
    }
}

pub fn fixed(x: f64, precision: usize) -> String {
    if !x.is_finite() {
        return format_float(x);
    }
    format!("{:.*}", precision, x)
}

pub fn engineering(x: f64, precision: usize) -> String {
    if !x.is_finite() {
        return format_float(x);
    }
    if x.abs() < ENGINEERING_ZERO {
        return "0".to_string();
    }
    let mut exponent = (x.abs().log10().floor() as i32).div_euclid(3) * 3;
    let mut mantissa = format!("{:.*}", precision, x / 10f64.powi(exponent));
    // Rounding can carry into the next group: 999.9996 -> 1000.000
    if mantissa.parse::<f64>().is_ok_and(|m| m.abs() >= 1000.0) {
        exponent += 3;
        mantissa = format!("{:.*}", precision, x / 10f64.powi(exponent));
    }
    format!("{}E{}", mantissa, exponent)
}

fn format_cell(value: &Value, float: &dyn Fn(f64) -> String) -> String {
    match value {
        Value::Float(x) => float(*x),
        Value::List(items) => format!("[{}]", format_items(items, float)),
        Value::Tuple(items) if items.len() == 1 => format!("({},)", format_items(items, float)),
        Value::Tuple(items) => format!("({})", format_items(items, float)),
        Value::Set(items) if items.is_empty() => "set()".to_string(),
        Value::Set(items) => format!("{{{}}}", format_items(items, float)),
        Value::Array(a) => match &**a {
            Array::Float(xs) => {
                let parts: Vec<String> = xs.iter().map(|x| float(*x)).collect();
                format!("[{}]", parts.join(" "))
            }
            other => other.to_string(),
        },
        other => other.to_string(),
    }
}

fn format_items(items: &[Value], float: &dyn Fn(f64) -> String) -> String {
    let parts: Vec<String> = items
        .iter()
        .map(|item| match item {
            Value::Str(_) => item.repr(),
            other => format_cell(other, float),
        })
        .collect();
    parts.join(", ")
}
