//! Error types for the calculator engine.

use std::path::PathBuf;

use rpncalc_script::EvalError;
use thiserror::Error;

/// Error type for stack store operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StackError {
    /// Tried to read or pop from an empty stack.
    Underflow,
    /// Position past the end of the stack.
    InvalidIndex(usize),
}

impl std::fmt::Display for StackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackError::Underflow => write!(f, "stack underflow"),
            StackError::InvalidIndex(i) => write!(f, "invalid stack index: {}", i),
        }
    }
}

impl std::error::Error for StackError {}

/// A cell that cannot be read as a number.
#[derive(Clone, Debug, PartialEq, Error)]
#[error("cannot convert {value} to a number")]
pub struct CoercionError {
    pub value: String,
}

impl CoercionError {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

/// Everything a calculator operation can fail with.
///
/// `submit` and `commit` never return these; they restore the stack and
/// turn the error into the status message.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("'{op}' needs {needed} value(s) on the stack, found {available}")]
    InsufficientOperands {
        op: String,
        needed: usize,
        available: usize,
    },

    #[error(transparent)]
    Coercion(#[from] CoercionError),

    #[error("{context}: {source}")]
    Evaluation {
        context: String,
        #[source]
        source: EvalError,
    },

    #[error("'{0}' does not name an action, function, or imported symbol")]
    Resolution(String),

    #[error("'{0}' is a built-in or imported name and cannot be assigned")]
    ReservedName(String),

    #[error("{0}")]
    Structural(String),

    #[error("no history to undo")]
    NoHistory,

    #[error(transparent)]
    Stack(#[from] StackError),

    #[error("could not define function from '{text}': {reason}")]
    Definition { text: String, reason: String },
}

impl EngineError {
    pub fn operands(op: impl Into<String>, needed: usize, available: usize) -> Self {
        EngineError::InsufficientOperands {
            op: op.into(),
            needed,
            available,
        }
    }

    pub fn evaluation(context: impl Into<String>, source: EvalError) -> Self {
        EngineError::Evaluation {
            context: context.into(),
            source,
        }
    }
}

/// Errors that can occur when loading an engine configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid value for '{field}' in {path}: {reason}")]
    Invalid {
        path: PathBuf,
        field: &'static str,
        reason: String,
    },
}
