//! Callable values.
//!
//! Both built-in natives and functions defined in script text implement
//! [`Callable`]. The calculator uses `required_positional_arity` to decide
//! how many stack cells to pull when a bare function name is committed.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{EvalError, EvalResult};
use crate::namespace::Namespace;
use crate::value::Value;

/// Arguments for a call: positional values plus `name=value` keywords.
#[derive(Clone, Debug, Default)]
pub struct Args {
    pub positional: SmallVec<[Value; 4]>,
    pub keywords: Vec<(String, Value)>,
}

impl Args {
    /// Positional-only arguments.
    pub fn positional(values: impl IntoIterator<Item = Value>) -> Self {
        Self {
            positional: values.into_iter().collect(),
            keywords: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Look up a keyword argument.
    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.keywords
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Positional argument `index`, or the keyword `name` if not given positionally.
    pub fn arg(&self, index: usize, name: &str) -> Option<&Value> {
        self.positional.get(index).or_else(|| self.keyword(name))
    }
}

/// The number of positional arguments a native accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    /// Required plus optional positional arguments.
    Range(usize, usize),
    /// Variadic; cannot be introspected.
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Arity::Exact(k) => n == k,
            Arity::Range(lo, hi) => (lo..=hi).contains(&n),
            Arity::AtLeast(lo) => n >= lo,
        }
    }

    /// Count of required positional parameters, if introspectable.
    pub fn required(self) -> Option<usize> {
        match self {
            Arity::Exact(k) | Arity::Range(k, _) => Some(k),
            Arity::AtLeast(_) => None,
        }
    }

    fn describe(self) -> String {
        match self {
            Arity::Exact(k) => k.to_string(),
            Arity::Range(lo, hi) => format!("from {} to {}", lo, hi),
            Arity::AtLeast(lo) => format!("at least {}", lo),
        }
    }
}

/// A value that can be called from script text or by the calculator.
pub trait Callable: fmt::Debug + Send + Sync {
    /// Name used in messages.
    fn name(&self) -> &str;

    /// Number of positional parameters without defaults, or `None` when the
    /// signature cannot be introspected.
    fn required_positional_arity(&self) -> Option<usize>;

    /// Invoke with the given arguments against a namespace.
    fn call(&self, args: Args, namespace: &mut Namespace) -> EvalResult<Value>;
}

type NativeFn = dyn Fn(&Args) -> EvalResult<Value> + Send + Sync;

/// A built-in function implemented in Rust.
pub struct NativeFunction {
    name: String,
    arity: Arity,
    func: Box<NativeFn>,
}

impl NativeFunction {
    pub fn new(
        name: impl Into<String>,
        arity: Arity,
        func: impl Fn(&Args) -> EvalResult<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            arity,
            func: Box::new(func),
        }
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Wrap as a cell value.
    pub fn into_value(self) -> Value {
        Value::Function(Arc::new(self))
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<built-in function {}>", self.name)
    }
}

impl Callable for NativeFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_positional_arity(&self) -> Option<usize> {
        self.arity.required()
    }

    fn call(&self, args: Args, _namespace: &mut Namespace) -> EvalResult<Value> {
        if !self.arity.accepts(args.len()) {
            return Err(EvalError::Arity {
                name: self.name.clone(),
                expected: self.arity.describe(),
                given: args.len(),
            });
        }
        (self.func)(&args)
    }
}

/// Shorthand for building a native function value.
pub fn native(
    name: &str,
    arity: Arity,
    func: impl Fn(&Args) -> EvalResult<Value> + Send + Sync + 'static,
) -> Value {
    NativeFunction::new(name, arity, func).into_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_introspection() {
        assert_eq!(Arity::Exact(2).required(), Some(2));
        assert_eq!(Arity::Range(1, 2).required(), Some(1));
        assert_eq!(Arity::AtLeast(1).required(), None);
        assert!(Arity::Range(1, 2).accepts(2));
        assert!(!Arity::Exact(1).accepts(0));
    }

    #[test]
    fn native_checks_arity() {
        let double = NativeFunction::new("double", Arity::Exact(1), |args| match args.get(0) {
            Some(Value::Int(n)) => Ok(Value::Int(n * 2)),
            _ => Err(EvalError::type_error("expected int")),
        });
        let mut ns = Namespace::new();
        assert_eq!(
            double.call(Args::positional([Value::int(4)]), &mut ns).unwrap(),
            Value::int(8)
        );
        let err = double.call(Args::default(), &mut ns).unwrap_err();
        assert!(matches!(err, EvalError::Arity { given: 0, .. }));
    }

    #[test]
    fn keyword_lookup() {
        let args = Args {
            positional: SmallVec::from_vec(vec![Value::int(1)]),
            keywords: vec![("num".into(), Value::int(5))],
        };
        assert_eq!(args.arg(0, "start"), Some(&Value::int(1)));
        assert_eq!(args.arg(1, "num"), Some(&Value::int(5)));
        assert_eq!(args.arg(2, "missing"), None);
    }
}
