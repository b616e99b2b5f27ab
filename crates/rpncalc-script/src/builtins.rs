//! Built-in functions.
//!
//! These are bound into every namespace created with
//! [`Namespace::with_builtins`], after the `math` members, so a built-in
//! with the same name as a `math` function (`pow`) wins.

use std::cell::RefCell;
use std::cmp::Ordering;

use crate::array::Array;
use crate::ast::BinOp;
use crate::callable::{Args, Arity, native};
use crate::error::{EvalError, EvalResult};
use crate::modules::{arg, float_to_int, integer, items, reals};
use crate::namespace::{Namespace, Origin};
use crate::ops;
use crate::plot::PlotContainer;
use crate::value::Value;

/// Largest sequence any constructor or repetition will materialize.
pub(crate) const MAX_ITEMS: usize = 10_000_000;

/// Check a requested output length against [`MAX_ITEMS`].
pub(crate) fn bounded_len(len: Option<u128>, what: &str) -> EvalResult<usize> {
    match len {
        Some(n) if n <= MAX_ITEMS as u128 => Ok(n as usize),
        _ => Err(EvalError::Overflow(format!("{} is too large", what))),
    }
}

/// Bind every built-in into `ns`.
pub fn install(ns: &mut Namespace) {
    let mut bind = |name: &str, arity: Arity, f: fn(&Args) -> EvalResult<Value>| {
        ns.bind(name, native(name, arity, f), Origin::Builtin);
    };

    bind("abs", Arity::Exact(1), |args| ops::abs(arg(args, 0, "abs")?));
    bind("len", Arity::Exact(1), len);
    bind("sum", Arity::Range(1, 2), sum);
    bind("min", Arity::AtLeast(1), |args| extreme(args, "min", Ordering::Less));
    bind("max", Arity::AtLeast(1), |args| extreme(args, "max", Ordering::Greater));
    bind("round", Arity::Range(1, 2), round);
    bind("int", Arity::Range(0, 1), int);
    bind("float", Arity::Range(0, 1), float);
    bind("str", Arity::Range(0, 1), |args| {
        Ok(Value::str(args.get(0).map(Value::to_string).unwrap_or_default()))
    });
    bind("bool", Arity::Range(0, 1), |args| {
        Ok(Value::Bool(args.get(0).is_some_and(Value::is_truthy)))
    });
    bind("list", Arity::Range(0, 1), |args| Ok(Value::list(optional_items(args, "list")?)));
    bind("tuple", Arity::Range(0, 1), |args| Ok(Value::tuple(optional_items(args, "tuple")?)));
    bind("set", Arity::Range(0, 1), |args| Ok(Value::set(optional_items(args, "set")?)));
    bind("dict", Arity::Range(0, 1), dict);
    bind("range", Arity::Range(1, 3), range);
    bind("sorted", Arity::Exact(1), sorted);
    bind("reversed", Arity::Exact(1), |args| {
        let mut values = items(args, 0, "reversed")?;
        values.reverse();
        Ok(Value::list(values))
    });
    bind("pow", Arity::Range(2, 3), pow);
    bind("divmod", Arity::Exact(2), |args| {
        let a = arg(args, 0, "divmod")?;
        let b = arg(args, 1, "divmod")?;
        Ok(Value::tuple(vec![
            ops::binary(BinOp::FloorDiv, a, b)?,
            ops::binary(BinOp::Mod, a, b)?,
        ]))
    });
    bind("all", Arity::Exact(1), |args| {
        Ok(Value::Bool(items(args, 0, "all")?.iter().all(Value::is_truthy)))
    });
    bind("any", Arity::Exact(1), |args| {
        Ok(Value::Bool(items(args, 0, "any")?.iter().any(Value::is_truthy)))
    });
    bind("type", Arity::Exact(1), |args| {
        Ok(Value::str(format!("<class '{}'>", arg(args, 0, "type")?.type_name())))
    });
    bind("plot", Arity::Exact(1), plot);
    bind("xyplot", Arity::Exact(2), xyplot);
}

fn optional_items(args: &Args, func: &str) -> EvalResult<Vec<Value>> {
    match args.get(0) {
        Some(_) => items(args, 0, func),
        None => Ok(Vec::new()),
    }
}

fn len(args: &Args) -> EvalResult<Value> {
    let n = match arg(args, 0, "len")? {
        Value::Str(s) => s.chars().count(),
        Value::List(v) | Value::Tuple(v) | Value::Set(v) => v.len(),
        Value::Dict(entries) => entries.len(),
        Value::Array(a) => a.len(),
        other => {
            return Err(EvalError::type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )));
        }
    };
    Ok(Value::Int(n as i64))
}

fn sum(args: &Args) -> EvalResult<Value> {
    if let Some(Value::Array(a)) = args.get(0)
        && args.len() == 1
    {
        return a.sum();
    }
    let mut total = args.arg(1, "start").cloned().unwrap_or(Value::Int(0));
    if total.is_str() {
        return Err(EvalError::type_error(
            "sum() can't sum strings [use ''.join(seq) instead]",
        ));
    }
    for item in items(args, 0, "sum")? {
        total = ops::binary(BinOp::Add, &total, &item)?;
    }
    Ok(total)
}

fn extreme(args: &Args, func: &str, want: Ordering) -> EvalResult<Value> {
    let candidates = if args.len() == 1 {
        items(args, 0, func)?
    } else {
        args.positional.to_vec()
    };
    let mut iter = candidates.into_iter();
    let mut best = iter
        .next()
        .ok_or_else(|| EvalError::value_error(format!("{}() arg is an empty sequence", func)))?;
    for v in iter {
        if ops::ordering(&v, &best)? == want {
            best = v;
        }
    }
    Ok(best)
}

fn round(args: &Args) -> EvalResult<Value> {
    let x = arg(args, 0, "round")?;
    let digits = match args.arg(1, "ndigits") {
        None | Some(Value::None) => None,
        Some(_) => Some(integer(args, 1, "round")?),
    };
    match (x, digits) {
        (Value::Int(_) | Value::Bool(_), _) => Ok(Value::Int(x.as_i64().unwrap_or_default())),
        (Value::Float(f), None) => float_to_int(f.round_ties_even()),
        (Value::Float(f), Some(n)) => {
            let scale = 10f64.powi(n.clamp(-308, 308) as i32);
            let scaled = f * scale;
            if !scaled.is_finite() {
                return Ok(Value::Float(*f));
            }
            Ok(Value::Float(scaled.round_ties_even() / scale))
        }
        (other, _) => Err(EvalError::type_error(format!(
            "type {} doesn't define __round__ method",
            other.type_name()
        ))),
    }
}

fn int(args: &Args) -> EvalResult<Value> {
    match args.get(0) {
        None => Ok(Value::Int(0)),
        Some(Value::Int(n)) => Ok(Value::Int(*n)),
        Some(Value::Bool(b)) => Ok(Value::Int(*b as i64)),
        Some(Value::Float(f)) => float_to_int(*f),
        Some(Value::Str(s)) => s
            .trim()
            .replace('_', "")
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| {
                EvalError::value_error(format!("invalid literal for int() with base 10: '{}'", s))
            }),
        Some(other) => Err(EvalError::type_error(format!(
            "int() argument must be a string or a number, not '{}'",
            other.type_name()
        ))),
    }
}

fn float(args: &Args) -> EvalResult<Value> {
    match args.get(0) {
        None => Ok(Value::Float(0.0)),
        Some(Value::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| EvalError::value_error(format!("could not convert string to float: '{}'", s))),
        Some(other) => other.as_f64().map(Value::Float).ok_or_else(|| {
            EvalError::type_error(format!(
                "float() argument must be a string or a number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

fn dict(args: &Args) -> EvalResult<Value> {
    let mut entries = Vec::new();
    match args.get(0) {
        None => {}
        Some(Value::Dict(existing)) => entries.extend(existing.iter().cloned()),
        Some(_) => {
            for pair in items(args, 0, "dict")? {
                match pair.iter_items() {
                    Some(kv) if kv.len() == 2 && !pair.is_str() => {
                        entries.push((kv[0].clone(), kv[1].clone()));
                    }
                    _ => {
                        return Err(EvalError::value_error(
                            "dictionary update sequence element has wrong length",
                        ));
                    }
                }
            }
        }
    }
    for (k, v) in &args.keywords {
        entries.push((Value::str(k.as_str()), v.clone()));
    }
    Ok(Value::dict(entries))
}

fn range(args: &Args) -> EvalResult<Value> {
    let (start, stop) = match args.len() {
        1 => (0, integer(args, 0, "range")?),
        _ => (integer(args, 0, "range")?, integer(args, 1, "range")?),
    };
    let step = match args.get(2) {
        Some(_) => integer(args, 2, "range")?,
        None => 1,
    };
    if step == 0 {
        return Err(EvalError::value_error("range() arg 3 must not be zero"));
    }
    let span = (stop as i128 - start as i128) / step as i128;
    bounded_len(Some(span.max(0) as u128), "range()")?;
    let mut out = Vec::new();
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        out.push(Value::Int(i));
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Value::list(out))
}

fn sorted(args: &Args) -> EvalResult<Value> {
    let mut values = items(args, 0, "sorted")?;
    let failure = RefCell::new(None);
    values.sort_by(|a, b| {
        ops::ordering(a, b).unwrap_or_else(|e| {
            failure.borrow_mut().get_or_insert(e);
            Ordering::Equal
        })
    });
    if let Some(err) = failure.into_inner() {
        return Err(err);
    }
    if args.keyword("reverse").is_some_and(Value::is_truthy) {
        values.reverse();
    }
    Ok(Value::list(values))
}

fn pow(args: &Args) -> EvalResult<Value> {
    let base = arg(args, 0, "pow")?;
    let exp = arg(args, 1, "pow")?;
    if args.get(2).is_none() {
        return ops::binary(BinOp::Pow, base, exp);
    }
    let (b, e, m) = (
        integer(args, 0, "pow")?,
        integer(args, 1, "pow")?,
        integer(args, 2, "pow")?,
    );
    if m == 0 {
        return Err(EvalError::value_error("pow() 3rd argument cannot be 0"));
    }
    if e < 0 {
        return Err(EvalError::value_error(
            "pow() 2nd argument cannot be negative when 3rd argument specified",
        ));
    }
    let m = m as i128;
    let (mut result, mut b, mut e) = (1i128, (b as i128).rem_euclid(m), e);
    while e > 0 {
        if e & 1 == 1 {
            result = (result * b).rem_euclid(m);
        }
        b = (b * b).rem_euclid(m);
        e >>= 1;
    }
    // Python's result takes the sign of the modulus.
    if m < 0 && result > 0 {
        result += m;
    }
    Ok(Value::Int(result as i64))
}

// ============================================================================
// Plot containers
// ============================================================================

fn style(mut plot: PlotContainer, args: &Args) -> EvalResult<PlotContainer> {
    for (key, value) in &args.keywords {
        let text = || value.to_string();
        let number = || {
            value.as_f64().ok_or_else(|| {
                EvalError::type_error(format!("plot option '{}' must be a number", key))
            })
        };
        match key.as_str() {
            "name" | "label" => plot.name = text(),
            "color" => plot.color = Some(text()),
            "line_style" | "linestyle" => plot.line_style = text(),
            "marker" => plot.marker = Some(text()),
            "linewidth" => plot.linewidth = number()?,
            "markersize" => plot.markersize = number()?,
            "alpha" => plot.alpha = number()?,
            "grid" => plot.grid = value.is_truthy(),
            "xlabel" => plot.xlabel = Some(text()),
            "ylabel" => plot.ylabel = Some(text()),
            other => {
                return Err(EvalError::type_error(format!(
                    "plot() got an unexpected keyword argument '{}'",
                    other
                )));
            }
        }
    }
    Ok(plot)
}

fn series(args: &Args, index: usize, func: &str) -> EvalResult<Vec<f64>> {
    match arg(args, index, func)? {
        Value::Array(a) => match &**a {
            Array::Text(_) => Err(EvalError::type_error("cannot plot a text array")),
            other => other.to_f64(),
        },
        _ => reals(args, index, func),
    }
}

fn plot(args: &Args) -> EvalResult<Value> {
    let data = series(args, 0, "plot")?;
    style(PlotContainer::new("plot", data), args).map(Value::plot)
}

fn xyplot(args: &Args) -> EvalResult<Value> {
    let x = series(args, 0, "xyplot")?;
    let y = series(args, 1, "xyplot")?;
    if x.len() != y.len() {
        return Err(EvalError::value_error(format!(
            "x and y must have the same length, got {} and {}",
            x.len(),
            y.len()
        )));
    }
    style(PlotContainer::new("xyplot", y).with_x(x), args).map(Value::plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::{Evaluator, ScriptEvaluator};

    fn eval(src: &str) -> EvalResult<Value> {
        let mut ns = Namespace::with_builtins();
        ScriptEvaluator.evaluate(src, &mut ns)
    }

    #[test]
    fn aggregates() {
        assert_eq!(eval("sum([1, 2, 3])").unwrap(), Value::int(6));
        assert_eq!(eval("sum([1, 2], 10)").unwrap(), Value::int(13));
        assert_eq!(eval("max(3, 9, 4)").unwrap(), Value::int(9));
        assert_eq!(eval("min([3, 9, 4])").unwrap(), Value::int(3));
        assert!(eval("max([])").is_err());
        assert_eq!(eval("len('abc')").unwrap(), Value::int(3));
    }

    #[test]
    fn conversions() {
        assert_eq!(eval("int('42')").unwrap(), Value::int(42));
        assert_eq!(eval("int(3.99)").unwrap(), Value::int(3));
        assert_eq!(eval("float('2.5')").unwrap(), Value::float(2.5));
        assert_eq!(eval("str(12)").unwrap(), Value::str("12"));
        assert_eq!(eval("round(2.5)").unwrap(), Value::int(2));
        assert_eq!(eval("round(3.14159, 2)").unwrap(), Value::float(3.14));
        assert!(eval("int('x')").is_err());
    }

    #[test]
    fn sequences() {
        assert_eq!(
            eval("range(1, 7, 2)").unwrap(),
            Value::list(vec![Value::int(1), Value::int(3), Value::int(5)])
        );
        assert_eq!(
            eval("sorted([3, 1, 2], reverse=True)").unwrap(),
            Value::list(vec![Value::int(3), Value::int(2), Value::int(1)])
        );
        assert!(eval("sorted([1, 'a'])").is_err());
        assert_eq!(eval("dict(a=1)['a']").unwrap(), Value::int(1));
        assert_eq!(eval("divmod(7, 2)").unwrap(), Value::tuple(vec![Value::int(3), Value::int(1)]));
    }

    #[test]
    fn pow_with_modulus() {
        assert_eq!(eval("pow(2, 10)").unwrap(), Value::int(1024));
        assert_eq!(eval("pow(3, 4, 5)").unwrap(), Value::int(1));
    }

    #[test]
    fn plot_containers() {
        let v = eval("xyplot([1, 2], [3, 4], name='line', color='red')").unwrap();
        let Value::Plot(p) = v else {
            panic!("expected a plot container");
        };
        assert_eq!(p.name, "line");
        assert_eq!(p.color.as_deref(), Some("red"));
        assert_eq!(p.points(), vec![(1.0, 3.0), (2.0, 4.0)]);
        assert!(eval("plot(['a'])").is_err());
        assert!(eval("plot([1], bogus=1)").is_err());
    }
}
