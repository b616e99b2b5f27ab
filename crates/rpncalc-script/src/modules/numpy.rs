//! A small `numpy` module over [`Array`].
//!
//! Element-wise functions accept scalars, arrays, and plain sequences (which
//! are converted with [`Array::infer`]).

use std::cmp::Ordering;

use crate::array::{Array, DType};
use crate::builtins::{MAX_ITEMS, bounded_len};
use crate::callable::{Args, Arity, native};
use crate::error::{EvalError, EvalResult};
use crate::ops;
use crate::value::{Module, Value};

use super::{arg, integer, real};

/// View a value as an array, converting plain sequences.
pub fn to_array(value: &Value) -> EvalResult<Array> {
    match value {
        Value::Array(a) => Ok((**a).clone()),
        Value::List(items) | Value::Tuple(items) | Value::Set(items) => Array::infer(items),
        other => Err(EvalError::type_error(format!(
            "expected an array or sequence, not {}",
            other.type_name()
        ))),
    }
}

fn elementwise(module: &mut Module, name: &'static str, f: fn(f64) -> f64) {
    module.insert(
        name,
        native(name, Arity::Exact(1), move |args| {
            let x = arg(args, 0, name)?;
            if x.is_number() {
                return Ok(Value::Float(f(real(args, 0, name)?)));
            }
            Ok(Value::array(to_array(x)?.map_f64(f)?))
        }),
    );
}

fn reduction(module: &mut Module, name: &'static str, f: fn(&Array) -> EvalResult<Value>) {
    module.insert(
        name,
        native(name, Arity::Exact(1), move |args| {
            let x = arg(args, 0, name)?;
            if x.is_number() {
                return f(&Array::infer(std::slice::from_ref(x))?);
            }
            f(&to_array(x)?)
        }),
    );
}

fn extreme(a: &Array, want: Ordering, name: &str) -> EvalResult<Value> {
    let mut values = a.to_values().into_iter();
    let mut best = values.next().ok_or_else(|| {
        EvalError::value_error(format!(
            "zero-size array to reduction operation {} which has no identity",
            name
        ))
    })?;
    for v in values {
        if ops::ordering(&v, &best)? == want {
            best = v;
        }
    }
    Ok(best)
}

fn mean(a: &Array) -> EvalResult<Value> {
    let xs = a.to_f64()?;
    if xs.is_empty() {
        return Ok(Value::Float(f64::NAN));
    }
    Ok(Value::Float(xs.iter().sum::<f64>() / xs.len() as f64))
}

fn std_dev(a: &Array) -> EvalResult<Value> {
    let xs = a.to_f64()?;
    if xs.is_empty() {
        return Ok(Value::Float(f64::NAN));
    }
    let n = xs.len() as f64;
    let m = xs.iter().sum::<f64>() / n;
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / n;
    Ok(Value::Float(var.sqrt()))
}

fn cumsum(a: &Array) -> EvalResult<Array> {
    if let Array::Int(v) = a {
        let mut out = Vec::with_capacity(v.len());
        let mut total: i64 = 0;
        let mut exact = true;
        for n in v {
            match total.checked_add(*n) {
                Some(t) => {
                    total = t;
                    out.push(t);
                }
                None => {
                    exact = false;
                    break;
                }
            }
        }
        if exact {
            return Ok(Array::Int(out));
        }
    }
    let mut total = 0.0;
    Ok(Array::Float(
        a.to_f64()?
            .into_iter()
            .map(|x| {
                total += x;
                total
            })
            .collect(),
    ))
}

fn parse_dtype(value: &Value) -> EvalResult<DType> {
    match value.as_str() {
        Some("int") | Some("int64") => Ok(DType::Int),
        Some("float") | Some("float64") => Ok(DType::Float),
        Some("str") => Ok(DType::Text),
        _ => Err(EvalError::type_error(format!("data type {} not understood", value.repr()))),
    }
}

fn filled(args: &Args, name: &str, fill: f64) -> EvalResult<Value> {
    let n = integer(args, 0, name)?;
    if n < 0 {
        return Err(EvalError::value_error("negative dimensions are not allowed"));
    }
    let n = bounded_len(Some(n as u128), &format!("{}()", name))?;
    Ok(Value::array(Array::Float(vec![fill; n])))
}

fn arange(args: &Args) -> EvalResult<Value> {
    let (start, stop) = match args.len() {
        1 => (Value::Int(0), arg(args, 0, "arange")?.clone()),
        _ => (arg(args, 0, "arange")?.clone(), arg(args, 1, "arange")?.clone()),
    };
    let step = args.get(2).cloned().unwrap_or(Value::Int(1));
    if let (Some(a), Some(b), Some(s)) = (start.as_i64(), stop.as_i64(), step.as_i64()) {
        if s == 0 {
            return Err(EvalError::ZeroDivision);
        }
        let span = (b as i128 - a as i128) / s as i128;
        bounded_len(Some(span.max(0) as u128), "arange()")?;
        let mut out = Vec::new();
        let mut i = a;
        while (s > 0 && i < b) || (s < 0 && i > b) {
            out.push(i);
            i = match i.checked_add(s) {
                Some(next) => next,
                None => break,
            };
        }
        return Ok(Value::array(Array::Int(out)));
    }
    let a = start.as_f64().ok_or_else(|| EvalError::type_error("arange() bounds must be numbers"))?;
    let b = stop.as_f64().ok_or_else(|| EvalError::type_error("arange() bounds must be numbers"))?;
    let s = step.as_f64().ok_or_else(|| EvalError::type_error("arange() step must be a number"))?;
    if s == 0.0 {
        return Err(EvalError::ZeroDivision);
    }
    let count = ((b - a) / s).ceil().max(0.0);
    if count.is_nan() || count > MAX_ITEMS as f64 {
        return Err(EvalError::Overflow("arange() is too large".into()));
    }
    let count = count as usize;
    Ok(Value::array(Array::Float(
        (0..count).map(|i| a + i as f64 * s).collect(),
    )))
}

fn linspace(args: &Args) -> EvalResult<Value> {
    let start = real(args, 0, "linspace")?;
    let stop = real(args, 1, "linspace")?;
    let num = match args.arg(2, "num") {
        Some(v) => v
            .as_i64()
            .ok_or_else(|| EvalError::type_error("linspace() num must be an integer"))?,
        None => 50,
    };
    if num < 0 {
        return Err(EvalError::value_error(format!(
            "number of samples, {}, must be non-negative",
            num
        )));
    }
    bounded_len(Some(num as u128), "linspace()")?;
    let values = match num {
        0 => Vec::new(),
        1 => vec![start],
        n => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    };
    Ok(Value::array(Array::Float(values)))
}

pub fn module() -> Module {
    let mut m = Module::new("numpy");

    m.insert("pi", Value::Float(std::f64::consts::PI));
    m.insert("e", Value::Float(std::f64::consts::E));

    m.insert(
        "array",
        native("array", Arity::Range(1, 2), |args| {
            let source = arg(args, 0, "array")?;
            let dtype = args.arg(1, "dtype").map(parse_dtype).transpose()?;
            match (source, dtype) {
                (Value::Array(a), None) => Ok(Value::Array(a.clone())),
                (_, Some(dtype)) => {
                    let items = source.iter_items().ok_or_else(|| {
                        EvalError::type_error("array() expects a sequence")
                    })?;
                    Ok(Value::array(Array::from_values(&items, dtype)?))
                }
                (_, None) => {
                    let items = source.iter_items().ok_or_else(|| {
                        EvalError::type_error("array() expects a sequence")
                    })?;
                    Ok(Value::array(Array::infer(&items)?))
                }
            }
        }),
    );
    m.insert("arange", native("arange", Arity::Range(1, 3), arange));
    m.insert("linspace", native("linspace", Arity::Range(2, 3), linspace));
    m.insert("zeros", native("zeros", Arity::Exact(1), |args| filled(args, "zeros", 0.0)));
    m.insert("ones", native("ones", Arity::Exact(1), |args| filled(args, "ones", 1.0)));

    reduction(&mut m, "sum", Array::sum);
    reduction(&mut m, "mean", mean);
    reduction(&mut m, "std", std_dev);
    reduction(&mut m, "min", |a| extreme(a, Ordering::Less, "minimum"));
    reduction(&mut m, "max", |a| extreme(a, Ordering::Greater, "maximum"));

    m.insert(
        "cumsum",
        native("cumsum", Arity::Exact(1), |args| {
            let x = arg(args, 0, "cumsum")?;
            let a = match x {
                v if v.is_number() => Array::infer(std::slice::from_ref(v))?,
                v => to_array(v)?,
            };
            Ok(Value::array(cumsum(&a)?))
        }),
    );
    m.insert(
        "abs",
        native("abs", Arity::Exact(1), |args| match arg(args, 0, "abs")? {
            v if v.is_number() => ops::abs(v),
            v => ops::abs(&Value::array(to_array(v)?)),
        }),
    );

    elementwise(&mut m, "sqrt", f64::sqrt);
    elementwise(&mut m, "sin", f64::sin);
    elementwise(&mut m, "cos", f64::cos);
    elementwise(&mut m, "tan", f64::tan);
    elementwise(&mut m, "exp", f64::exp);
    elementwise(&mut m, "log", f64::ln);
    elementwise(&mut m, "log10", f64::log10);

    m
}
