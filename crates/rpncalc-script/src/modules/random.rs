//! The `random` module.
//!
//! All functions of one loaded module share a single seeded generator, so
//! `random.seed(n)` makes the following draws reproducible.

use std::sync::{Arc, Mutex};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::callable::{Arity, native};
use crate::error::{EvalError, EvalResult};
use crate::value::{Module, Value};

use super::{integer, items, real};

type SharedRng = Arc<Mutex<StdRng>>;

fn with_rng<T>(rng: &SharedRng, f: impl FnOnce(&mut StdRng) -> T) -> EvalResult<T> {
    let mut guard = rng
        .lock()
        .map_err(|_| EvalError::value_error("random generator is unavailable"))?;
    Ok(f(&mut guard))
}

/// Derive a 64-bit seed from a seed value.
fn seed_of(value: &Value) -> EvalResult<Option<u64>> {
    match value {
        Value::None => Ok(None),
        Value::Int(n) => Ok(Some(*n as u64)),
        Value::Bool(b) => Ok(Some(*b as u64)),
        Value::Float(f) => Ok(Some(f.to_bits())),
        Value::Str(s) => {
            // FNV-1a
            let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
            for byte in s.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(0x0100_0000_01b3);
            }
            Ok(Some(hash))
        }
        other => Err(EvalError::type_error(format!(
            "the only supported seed types are: None, int, float, str, not {}",
            other.type_name()
        ))),
    }
}

pub fn module() -> Module {
    let rng: SharedRng = Arc::new(Mutex::new(StdRng::from_entropy()));
    let mut m = Module::new("random");

    let shared = rng.clone();
    m.insert(
        "seed",
        native("seed", Arity::Range(0, 1), move |args| {
            let seed = match args.get(0) {
                Some(v) => seed_of(v)?,
                None => None,
            };
            let fresh = match seed {
                Some(s) => StdRng::seed_from_u64(s),
                None => StdRng::from_entropy(),
            };
            with_rng(&shared, |r| *r = fresh)?;
            Ok(Value::None)
        }),
    );

    let shared = rng.clone();
    m.insert(
        "random",
        native("random", Arity::Exact(0), move |_| {
            with_rng(&shared, |r| Value::Float(r.gen_range(0.0..1.0)))
        }),
    );

    let shared = rng.clone();
    m.insert(
        "randint",
        native("randint", Arity::Exact(2), move |args| {
            let a = integer(args, 0, "randint")?;
            let b = integer(args, 1, "randint")?;
            if a > b {
                return Err(EvalError::value_error(format!(
                    "empty range for randint({}, {})",
                    a, b
                )));
            }
            with_rng(&shared, |r| Value::Int(r.gen_range(a..=b)))
        }),
    );

    let shared = rng.clone();
    m.insert(
        "uniform",
        native("uniform", Arity::Exact(2), move |args| {
            let a = real(args, 0, "uniform")?;
            let b = real(args, 1, "uniform")?;
            let unit: f64 = with_rng(&shared, |r| r.gen_range(0.0..1.0))?;
            Ok(Value::Float(a + (b - a) * unit))
        }),
    );

    let shared = rng;
    m.insert(
        "choice",
        native("choice", Arity::Exact(1), move |args| {
            let pool = items(args, 0, "choice")?;
            if pool.is_empty() {
                return Err(EvalError::value_error("cannot choose from an empty sequence"));
            }
            let index = with_rng(&shared, |r| r.gen_range(0..pool.len()))?;
            Ok(pool[index].clone())
        }),
    );

    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::Args;
    use crate::namespace::Namespace;

    fn call(m: &Module, name: &str, args: Vec<Value>) -> EvalResult<Value> {
        let f = m.get(name).and_then(Value::as_callable).unwrap().clone();
        f.call(Args::positional(args), &mut Namespace::new())
    }

    #[test]
    fn seeding_is_reproducible() {
        let m = module();
        call(&m, "seed", vec![Value::int(4321)]).unwrap();
        let first = call(&m, "randint", vec![Value::int(5), Value::int(5_000_000_000)]).unwrap();
        call(&m, "seed", vec![Value::int(4321)]).unwrap();
        let second = call(&m, "randint", vec![Value::int(5), Value::int(5_000_000_000)]).unwrap();
        assert_eq!(first, second);
        assert!(matches!(first, Value::Int(n) if (5..=5_000_000_000).contains(&n)));
    }

    #[test]
    fn ranges_are_respected() {
        let m = module();
        for _ in 0..50 {
            let v = call(&m, "uniform", vec![Value::int(2), Value::int(3)]).unwrap();
            assert!(matches!(v, Value::Float(f) if (2.0..=3.0).contains(&f)));
        }
        assert!(call(&m, "randint", vec![Value::int(3), Value::int(2)]).is_err());
        assert!(call(&m, "choice", vec![Value::list(Vec::<Value>::new())]).is_err());
        let pick = call(&m, "choice", vec![Value::str("a")]).unwrap();
        assert_eq!(pick, Value::str("a"));
    }
}
