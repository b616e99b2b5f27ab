//! The evaluation capability the calculator depends on.

use crate::error::EvalResult;
use crate::interp::Interpreter;
use crate::namespace::Namespace;
use crate::parser::{parse_expression, parse_program};
use crate::value::Value;

/// Evaluates expression text and executes statement text over a namespace.
///
/// The calculator only talks to this trait, so any backend that can
/// produce [`Value`]s from text can drive it.
pub trait Evaluator: Send + Sync {
    /// Evaluate `source` as a single expression.
    fn evaluate(&self, source: &str, namespace: &mut Namespace) -> EvalResult<Value>;

    /// Execute `source` as one or more statements.
    fn execute(&self, source: &str, namespace: &mut Namespace) -> EvalResult<()>;
}

/// The built-in evaluator: parses script text and walks the tree.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptEvaluator;

impl ScriptEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for ScriptEvaluator {
    fn evaluate(&self, source: &str, namespace: &mut Namespace) -> EvalResult<Value> {
        let expr = parse_expression(source)?;
        log::trace!("evaluate: {:?}", expr);
        Interpreter::new(namespace).eval(&expr)
    }

    fn execute(&self, source: &str, namespace: &mut Namespace) -> EvalResult<()> {
        let program = parse_program(source)?;
        log::trace!("execute: {} statement(s)", program.len());
        Interpreter::new(namespace).run(&program)
    }
}
