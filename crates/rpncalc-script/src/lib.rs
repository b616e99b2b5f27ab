//! The embedded evaluator behind the rpncalc engine.
//!
//! This crate provides:
//! - `value` - Cell values shared by the stack and the namespace
//! - `namespace` - The single origin-tagged name table
//! - `callable` - The callable capability and native functions
//! - `evaluator` - The `Evaluator` capability and the default script evaluator
//! - `lexer`, `parser`, `ast`, `interp` - The script language itself
//! - `builtins`, `modules` - Built-in functions and importable modules

pub mod array;
pub mod ast;
pub mod builtins;
pub mod callable;
pub mod error;
pub mod evaluator;
pub mod interp;
pub mod lexer;
pub mod modules;
pub mod namespace;
pub mod ops;
pub mod parser;
pub mod plot;
pub mod value;

pub use array::{Array, DType};
pub use callable::{Args, Arity, Callable, NativeFunction, native};
pub use error::{EvalError, EvalResult};
pub use evaluator::{Evaluator, ScriptEvaluator};
pub use interp::UserFunction;
pub use lexer::is_identifier;
pub use namespace::{Binding, Namespace, Origin};
pub use parser::{parse_expression, parse_program};
pub use plot::PlotContainer;
pub use value::{Module, Value, format_float};
