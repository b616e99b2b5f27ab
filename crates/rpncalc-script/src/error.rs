//! Errors raised while parsing or evaluating script text.

use thiserror::Error;

/// An error produced by the embedded evaluator.
///
/// The variants follow the exception families a calculator user expects to
/// see when an expression is rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("invalid syntax: {0}")]
    Syntax(String),

    #[error("name '{0}' is not defined")]
    Name(String),

    #[error("{0}")]
    Type(String),

    #[error("{0}")]
    Value(String),

    #[error("division by zero")]
    ZeroDivision,

    #[error("'{owner}' object has no attribute '{attr}'")]
    Attribute { owner: String, attr: String },

    #[error("no module named '{0}'")]
    Import(String),

    #[error("{name}() takes {expected} positional arguments but {given} were given")]
    Arity {
        name: String,
        expected: String,
        given: usize,
    },

    #[error("index {0} out of range")]
    Index(i64),

    #[error("key {0} not found")]
    Key(String),

    #[error("{0}")]
    Overflow(String),
}

impl EvalError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        EvalError::Syntax(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        EvalError::Type(msg.into())
    }

    pub fn value_error(msg: impl Into<String>) -> Self {
        EvalError::Value(msg.into())
    }

    /// The `math domain error` raised by real-valued functions.
    pub fn domain() -> Self {
        EvalError::Value("math domain error".into())
    }

    /// The `math range error` raised when a finite input overflows.
    pub fn range() -> Self {
        EvalError::Overflow("math range error".into())
    }
}

/// Result alias used throughout the evaluator.
pub type EvalResult<T> = Result<T, EvalError>;
