//! The `math` module.
//!
//! Function names are partitioned by how the calculator feeds them from the
//! stack: one cell, two cells, or one iterable cell. `log` is handled by the
//! `ln` button rather than a generated one.

use crate::ast::BinOp;
use crate::callable::{Args, Arity, native};
use crate::error::{EvalError, EvalResult};
use crate::ops;
use crate::value::{Module, Value};

use super::{float_to_int, integer, items, real, reals};

/// Functions taking one numeric argument.
pub const ONE_ARG: &[&str] = &[
    "acos", "acosh", "asin", "asinh", "atan", "atanh", "cbrt", "ceil", "cos", "cosh", "degrees",
    "erf", "erfc", "exp", "exp2", "expm1", "fabs", "factorial", "floor", "frexp", "gamma",
    "isfinite", "isinf", "isnan", "isqrt", "lgamma", "log10", "log1p", "log2", "modf", "radians",
    "sin", "sinh", "sqrt", "tan", "tanh", "trunc", "ulp",
];

/// Functions taking two numeric arguments.
pub const TWO_ARG: &[&str] = &[
    "atan2", "comb", "copysign", "fmod", "gcd", "hypot", "isclose", "lcm", "ldexp", "nextafter",
    "perm", "pow", "remainder",
];

/// Functions taking a single iterable.
pub const ITERABLE: &[&str] = &["dist", "fsum", "prod"];

pub const CONSTANTS: &[&str] = &["e", "inf", "nan", "pi", "tau"];

/// Functions reached through a dedicated button.
pub const WRAPPED: &[&str] = &["log"];

/// What an infinite result from a finite input means.
#[derive(Clone, Copy)]
enum Pole {
    /// The input overflowed (`exp(1000)`).
    Range,
    /// The input sits on a singularity (`log(0)`).
    Domain,
}

/// Wrap `f` with the module's error conventions.
fn checked(x: f64, y: f64, pole: Pole) -> EvalResult<f64> {
    if y.is_nan() && !x.is_nan() {
        return Err(EvalError::domain());
    }
    if y.is_infinite() && x.is_finite() {
        return Err(match pole {
            Pole::Range => EvalError::range(),
            Pole::Domain => EvalError::domain(),
        });
    }
    Ok(y)
}

fn unary(module: &mut Module, name: &'static str, pole: Pole, f: fn(f64) -> f64) {
    module.insert(
        name,
        native(name, Arity::Exact(1), move |args| {
            let x = real(args, 0, name)?;
            checked(x, f(x), pole).map(Value::Float)
        }),
    );
}

fn binary(module: &mut Module, name: &'static str, f: fn(f64, f64) -> f64) {
    module.insert(
        name,
        native(name, Arity::Exact(2), move |args| {
            let x = real(args, 0, name)?;
            let y = real(args, 1, name)?;
            let r = f(x, y);
            if r.is_nan() && !x.is_nan() && !y.is_nan() {
                return Err(EvalError::domain());
            }
            if r.is_infinite() && x.is_finite() && y.is_finite() {
                return Err(EvalError::range());
            }
            Ok(Value::Float(r))
        }),
    );
}

/// Rounding functions keep ints and turn floats into ints.
fn rounding(module: &mut Module, name: &'static str, f: fn(f64) -> f64) {
    module.insert(
        name,
        native(name, Arity::Exact(1), move |args| match super::arg(args, 0, name)? {
            Value::Int(n) => Ok(Value::Int(*n)),
            Value::Bool(b) => Ok(Value::Int(*b as i64)),
            _ => float_to_int(f(real(args, 0, name)?)),
        }),
    );
}

fn predicate(module: &mut Module, name: &'static str, f: fn(f64) -> bool) {
    module.insert(
        name,
        native(name, Arity::Exact(1), move |args| {
            Ok(Value::Bool(f(real(args, 0, name)?)))
        }),
    );
}

pub fn module() -> Module {
    let mut m = Module::new("math");

    m.insert("pi", Value::Float(std::f64::consts::PI));
    m.insert("e", Value::Float(std::f64::consts::E));
    m.insert("tau", Value::Float(std::f64::consts::TAU));
    m.insert("inf", Value::Float(f64::INFINITY));
    m.insert("nan", Value::Float(f64::NAN));

    // ========================================================================
    // One argument
    // ========================================================================

    unary(&mut m, "acos", Pole::Range, f64::acos);
    unary(&mut m, "acosh", Pole::Range, f64::acosh);
    unary(&mut m, "asin", Pole::Range, f64::asin);
    unary(&mut m, "asinh", Pole::Range, f64::asinh);
    unary(&mut m, "atan", Pole::Range, f64::atan);
    unary(&mut m, "atanh", Pole::Domain, f64::atanh);
    unary(&mut m, "cbrt", Pole::Range, libm::cbrt);
    unary(&mut m, "cos", Pole::Range, f64::cos);
    unary(&mut m, "cosh", Pole::Range, f64::cosh);
    unary(&mut m, "degrees", Pole::Range, f64::to_degrees);
    unary(&mut m, "erf", Pole::Range, libm::erf);
    unary(&mut m, "erfc", Pole::Range, libm::erfc);
    unary(&mut m, "exp", Pole::Range, f64::exp);
    unary(&mut m, "exp2", Pole::Range, libm::exp2);
    unary(&mut m, "expm1", Pole::Range, libm::expm1);
    unary(&mut m, "fabs", Pole::Range, f64::abs);
    unary(&mut m, "gamma", Pole::Domain, gamma);
    unary(&mut m, "lgamma", Pole::Domain, lgamma);
    unary(&mut m, "log10", Pole::Domain, f64::log10);
    unary(&mut m, "log1p", Pole::Domain, libm::log1p);
    unary(&mut m, "log2", Pole::Domain, f64::log2);
    unary(&mut m, "radians", Pole::Range, f64::to_radians);
    unary(&mut m, "sin", Pole::Range, f64::sin);
    unary(&mut m, "sinh", Pole::Range, f64::sinh);
    unary(&mut m, "sqrt", Pole::Range, f64::sqrt);
    unary(&mut m, "tan", Pole::Range, f64::tan);
    unary(&mut m, "tanh", Pole::Range, f64::tanh);
    unary(&mut m, "ulp", Pole::Range, ulp);

    rounding(&mut m, "ceil", f64::ceil);
    rounding(&mut m, "floor", f64::floor);
    rounding(&mut m, "trunc", f64::trunc);

    predicate(&mut m, "isfinite", f64::is_finite);
    predicate(&mut m, "isinf", f64::is_infinite);
    predicate(&mut m, "isnan", f64::is_nan);

    m.insert(
        "factorial",
        native("factorial", Arity::Exact(1), |args| {
            factorial(integer(args, 0, "factorial")?)
        }),
    );
    m.insert(
        "isqrt",
        native("isqrt", Arity::Exact(1), |args| {
            let n = integer(args, 0, "isqrt")?;
            if n < 0 {
                return Err(EvalError::value_error(
                    "isqrt() argument must be nonnegative",
                ));
            }
            Ok(Value::Int(isqrt(n)))
        }),
    );
    m.insert(
        "frexp",
        native("frexp", Arity::Exact(1), |args| {
            let (mantissa, exponent) = libm::frexp(real(args, 0, "frexp")?);
            Ok(Value::tuple(vec![
                Value::Float(mantissa),
                Value::Int(exponent as i64),
            ]))
        }),
    );
    m.insert(
        "modf",
        native("modf", Arity::Exact(1), |args| {
            let x = real(args, 0, "modf")?;
            let whole = x.trunc();
            let frac = if x.is_infinite() { 0.0f64.copysign(x) } else { x - whole };
            Ok(Value::tuple(vec![Value::Float(frac), Value::Float(whole)]))
        }),
    );

    // ========================================================================
    // Two arguments
    // ========================================================================

    binary(&mut m, "atan2", f64::atan2);
    binary(&mut m, "copysign", f64::copysign);
    binary(&mut m, "fmod", libm::fmod);
    binary(&mut m, "hypot", f64::hypot);
    binary(&mut m, "nextafter", libm::nextafter);
    binary(&mut m, "remainder", libm::remainder);

    m.insert(
        "pow",
        native("pow", Arity::Exact(2), |args| {
            let x = real(args, 0, "pow")?;
            let y = real(args, 1, "pow")?;
            if x == 0.0 && y < 0.0 {
                return Err(EvalError::domain());
            }
            let r = x.powf(y);
            if r.is_infinite() && x.is_finite() && y.is_finite() {
                return Err(EvalError::range());
            }
            checked(x, r, Pole::Range).map(Value::Float)
        }),
    );
    m.insert(
        "ldexp",
        native("ldexp", Arity::Exact(2), |args| {
            let x = real(args, 0, "ldexp")?;
            let exp = integer(args, 1, "ldexp")?.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
            checked(x, libm::ldexp(x, exp), Pole::Range).map(Value::Float)
        }),
    );
    m.insert(
        "gcd",
        native("gcd", Arity::AtLeast(0), |args| {
            let mut acc: i64 = 0;
            for i in 0..args.len() {
                acc = gcd(acc, integer(args, i, "gcd")?)?;
            }
            Ok(Value::Int(acc))
        }),
    );
    m.insert(
        "lcm",
        native("lcm", Arity::AtLeast(0), |args| {
            let mut acc: i64 = 1;
            for i in 0..args.len() {
                let n = integer(args, i, "lcm")?;
                if n == 0 || acc == 0 {
                    acc = 0;
                    continue;
                }
                let g = gcd(acc, n)?;
                acc = (acc / g)
                    .checked_mul(n)
                    .and_then(i64::checked_abs)
                    .ok_or_else(|| EvalError::Overflow("integer overflow in lcm()".into()))?;
            }
            Ok(Value::Int(acc))
        }),
    );
    m.insert(
        "comb",
        native("comb", Arity::Exact(2), |args| {
            let (n, k) = non_negative_pair(args, "comb")?;
            combinatoric(n, k, true)
        }),
    );
    m.insert(
        "perm",
        native("perm", Arity::Range(1, 2), |args| {
            let n = integer(args, 0, "perm")?;
            if args.len() == 1 {
                return factorial(n);
            }
            let (n, k) = non_negative_pair(args, "perm")?;
            combinatoric(n, k, false)
        }),
    );
    m.insert(
        "isclose",
        native("isclose", Arity::Exact(2), |args| {
            let a = real(args, 0, "isclose")?;
            let b = real(args, 1, "isclose")?;
            let rel_tol = match args.keyword("rel_tol") {
                Some(v) => v.as_f64().ok_or_else(|| EvalError::type_error("rel_tol must be a real number"))?,
                None => 1e-9,
            };
            let abs_tol = match args.keyword("abs_tol") {
                Some(v) => v.as_f64().ok_or_else(|| EvalError::type_error("abs_tol must be a real number"))?,
                None => 0.0,
            };
            if rel_tol < 0.0 || abs_tol < 0.0 {
                return Err(EvalError::value_error("tolerances must be non-negative"));
            }
            if a == b {
                return Ok(Value::Bool(true));
            }
            if a.is_infinite() || b.is_infinite() {
                return Ok(Value::Bool(false));
            }
            let diff = (a - b).abs();
            let close = diff <= (rel_tol * b.abs()).max(rel_tol * a.abs()).max(abs_tol);
            Ok(Value::Bool(close))
        }),
    );

    m.insert(
        "log",
        native("log", Arity::Range(1, 2), |args| {
            let x = real(args, 0, "log")?;
            if x <= 0.0 {
                return Err(EvalError::domain());
            }
            match args.get(1) {
                None => Ok(Value::Float(x.ln())),
                Some(_) => {
                    let base = real(args, 1, "log")?;
                    if base <= 0.0 {
                        return Err(EvalError::domain());
                    }
                    let denom = base.ln();
                    if denom == 0.0 {
                        return Err(EvalError::ZeroDivision);
                    }
                    Ok(Value::Float(x.ln() / denom))
                }
            }
        }),
    );

    // ========================================================================
    // Iterables
    // ========================================================================

    m.insert(
        "fsum",
        native("fsum", Arity::Exact(1), |args| {
            Ok(Value::Float(fsum(&reals(args, 0, "fsum")?)))
        }),
    );
    m.insert(
        "prod",
        native("prod", Arity::Exact(1), |args| {
            let mut acc = args.keyword("start").cloned().unwrap_or(Value::Int(1));
            for item in items(args, 0, "prod")? {
                acc = ops::binary(BinOp::Mul, &acc, &item)?;
            }
            Ok(acc)
        }),
    );
    m.insert(
        "dist",
        native("dist", Arity::Exact(2), |args| {
            let p = reals(args, 0, "dist")?;
            let q = reals(args, 1, "dist")?;
            if p.len() != q.len() {
                return Err(EvalError::value_error(
                    "both points must have the same number of dimensions",
                ));
            }
            let squares: Vec<f64> = p.iter().zip(&q).map(|(a, b)| (a - b) * (a - b)).collect();
            Ok(Value::Float(fsum(&squares).sqrt()))
        }),
    );

    m
}

// ============================================================================
// Numeric kernels
// ============================================================================

fn gamma(x: f64) -> f64 {
    if x <= 0.0 && x.fract() == 0.0 {
        return f64::NAN;
    }
    libm::tgamma(x)
}

fn lgamma(x: f64) -> f64 {
    if x <= 0.0 && x.fract() == 0.0 {
        return f64::INFINITY;
    }
    libm::lgamma(x)
}

fn ulp(x: f64) -> f64 {
    if x.is_nan() || x.is_infinite() {
        return x.abs();
    }
    let x = x.abs();
    if x == f64::MAX {
        return x - libm::nextafter(x, 0.0);
    }
    libm::nextafter(x, f64::INFINITY) - x
}

fn gcd(a: i64, b: i64) -> EvalResult<i64> {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    i64::try_from(a).map_err(|_| EvalError::Overflow("integer overflow in gcd()".into()))
}

fn isqrt(n: i64) -> i64 {
    let mut r = (n as f64).sqrt() as i64;
    while r.checked_mul(r).is_none_or(|sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

/// Factorial, exact while it fits in `i64` and a float beyond that.
pub fn factorial(n: i64) -> EvalResult<Value> {
    if n < 0 {
        return Err(EvalError::value_error(
            "factorial() not defined for negative values",
        ));
    }
    let mut acc: i64 = 1;
    for k in 2..=n {
        match acc.checked_mul(k) {
            Some(next) => acc = next,
            None => {
                let mut f = acc as f64;
                for j in k..=n {
                    f *= j as f64;
                    if f.is_infinite() {
                        return Err(EvalError::Overflow(
                            "factorial() result too large".into(),
                        ));
                    }
                }
                return Ok(Value::Float(f));
            }
        }
    }
    Ok(Value::Int(acc))
}

fn non_negative_pair(args: &Args, func: &str) -> EvalResult<(i64, i64)> {
    let n = integer(args, 0, func)?;
    let k = integer(args, 1, func)?;
    if n < 0 || k < 0 {
        return Err(EvalError::value_error(format!(
            "{}() arguments must be non-negative integers",
            func
        )));
    }
    Ok((n, k))
}

/// `comb(n, k)` when `choose`, else `perm(n, k)`.
fn combinatoric(n: i64, k: i64, choose: bool) -> EvalResult<Value> {
    if k > n {
        return Ok(Value::Int(0));
    }
    let k = if choose { k.min(n - k) } else { k };
    let mut exact: Option<i128> = Some(1);
    let mut approx = 1.0f64;
    for i in 0..k {
        let factor = (n - i) as i128;
        exact = exact.and_then(|acc| acc.checked_mul(factor)).map(|acc| {
            if choose { acc / (i as i128 + 1) } else { acc }
        });
        approx *= factor as f64;
        if choose {
            approx /= (i + 1) as f64;
        }
        if exact.is_none() && approx.is_infinite() {
            break;
        }
    }
    match exact.and_then(|v| i64::try_from(v).ok()) {
        Some(v) => Ok(Value::Int(v)),
        None if approx.is_finite() => Ok(Value::Float(approx.round())),
        None => Err(EvalError::Overflow("integer result too large".into())),
    }
}

/// Compensated summation.
fn fsum(values: &[f64]) -> f64 {
    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespace::Namespace;

    fn call(name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let m = module();
        let f = m.get(name).and_then(Value::as_callable).unwrap().clone();
        f.call(Args::positional(args), &mut Namespace::new())
    }

    #[test]
    fn partition_covers_every_function() {
        let m = module();
        for name in m.names() {
            let buckets = [ONE_ARG, TWO_ARG, ITERABLE, CONSTANTS, WRAPPED]
                .iter()
                .filter(|b| b.contains(&name))
                .count();
            assert_eq!(buckets, 1, "{} is not in exactly one bucket", name);
        }
    }

    #[test]
    fn domain_and_range_errors() {
        assert_eq!(call("sqrt", vec![Value::int(-1)]), Err(EvalError::domain()));
        assert_eq!(call("log10", vec![Value::int(0)]), Err(EvalError::domain()));
        assert_eq!(call("exp", vec![Value::int(1000)]), Err(EvalError::range()));
        assert_eq!(call("gamma", vec![Value::int(0)]), Err(EvalError::domain()));
        assert!(call("sin", vec![Value::str("x")]).is_err());
    }

    #[test]
    fn integer_functions() {
        assert_eq!(call("factorial", vec![Value::int(5)]).unwrap(), Value::int(120));
        assert!(matches!(call("factorial", vec![Value::int(25)]).unwrap(), Value::Float(_)));
        assert!(call("factorial", vec![Value::float(5.0)]).is_err());
        assert_eq!(call("comb", vec![Value::int(5), Value::int(2)]).unwrap(), Value::int(10));
        assert_eq!(call("perm", vec![Value::int(5), Value::int(2)]).unwrap(), Value::int(20));
        assert_eq!(call("comb", vec![Value::int(2), Value::int(5)]).unwrap(), Value::int(0));
        assert_eq!(call("gcd", vec![Value::int(12), Value::int(18)]).unwrap(), Value::int(6));
        assert_eq!(call("lcm", vec![Value::int(4), Value::int(6)]).unwrap(), Value::int(12));
        assert_eq!(call("lcm", vec![Value::int(-4), Value::int(6)]).unwrap(), Value::int(12));
        assert_eq!(call("isqrt", vec![Value::int(17)]).unwrap(), Value::int(4));
    }

    #[test]
    fn gcd_and_lcm_at_the_integer_limit() {
        let min = Value::int(i64::MIN);
        let overflow = |r: EvalResult<Value>| matches!(r, Err(EvalError::Overflow(_)));
        assert!(overflow(call("lcm", vec![min.clone(), Value::int(1)])));
        assert!(overflow(call("gcd", vec![min.clone(), Value::int(0)])));
        assert_eq!(call("gcd", vec![min, Value::int(6)]).unwrap(), Value::int(2));
    }

    #[test]
    fn rounding_returns_ints() {
        assert_eq!(call("floor", vec![Value::float(-1.5)]).unwrap(), Value::int(-2));
        assert_eq!(call("ceil", vec![Value::float(1.2)]).unwrap(), Value::int(2));
        assert_eq!(call("trunc", vec![Value::int(7)]).unwrap(), Value::int(7));
    }

    #[test]
    fn iterable_functions() {
        let xs = Value::list(vec![Value::float(0.1); 10]);
        let total = call("fsum", vec![xs]).unwrap();
        assert!(matches!(total, Value::Float(f) if (f - 1.0).abs() < 1e-15));
        let ys = Value::tuple(vec![Value::int(2), Value::int(3), Value::int(4)]);
        assert_eq!(call("prod", vec![ys]).unwrap(), Value::int(24));
        let p = Value::list(vec![Value::int(0), Value::int(0)]);
        let q = Value::list(vec![Value::int(3), Value::int(4)]);
        assert_eq!(call("dist", vec![p, q]).unwrap(), Value::float(5.0));
    }

    #[test]
    fn log_with_base() {
        let v = call("log", vec![Value::int(8), Value::int(2)]).unwrap();
        assert!(matches!(v, Value::Float(f) if (f - 3.0).abs() < 1e-12));
        assert!(call("log", vec![Value::int(-1)]).is_err());
    }
}
