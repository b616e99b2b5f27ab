//! The calculator engine.
//!
//! An [`Engine`] owns the stack, its undo history, the namespace manager
//! and the operation registry. Front-ends drive it with [`Engine::submit`]
//! and [`Engine::commit`] and read back the stack, the status message and
//! the last-operation marker.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rpncalc_script::{Args, Callable, EvalResult, Evaluator, Module, PlotContainer, ScriptEvaluator, Value};
use rpncalc_script::modules::math;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::history::History;
use crate::names::NamespaceManager;
use crate::plot::{LogPlotSink, PlotRequest, PlotSink};
use crate::registry::{self, Registry};
use crate::stack::Stack;

/// What the engine did most recently.
///
/// Entry and commit both branch on this, so it is part of the engine's
/// observable state rather than a display detail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LastOp {
    Enter,
    Assignment,
    Recall,
    UserEntry,
    Function,
    Eval,
    Exec,
    Error,
}

impl LastOp {
    pub fn name(self) -> &'static str {
        match self {
            LastOp::Enter => "enter",
            LastOp::Assignment => "assignment",
            LastOp::Recall => "recall",
            LastOp::UserEntry => "user_entry",
            LastOp::Function => "function",
            LastOp::Eval => "eval",
            LastOp::Exec => "exec",
            LastOp::Error => "error",
        }
    }
}

impl fmt::Display for LastOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub struct Engine {
    pub(crate) stack: Stack,
    pub(crate) history: History,
    pub(crate) names: NamespaceManager,
    pub(crate) registry: Registry,
    pub(crate) evaluator: Box<dyn Evaluator>,
    /// Private `math` instance backing the function buttons.
    pub(crate) math: Module,
    pub(crate) plot_sink: Box<dyn PlotSink>,
    pub(crate) last_op: Option<LastOp>,
    pub(crate) message: Option<String>,
    pub(crate) invert_lists: bool,
    pub(crate) undo_discard: usize,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// An engine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_evaluator(config, Box::new(ScriptEvaluator::new()))
    }

    /// An engine over a custom evaluation backend.
    pub fn with_evaluator(config: EngineConfig, evaluator: Box<dyn Evaluator>) -> Self {
        let math = math::module();
        for name in registry::unclassified(&math) {
            log::error!("math function '{}' is not in exactly one argument group", name);
        }

        let mut engine = Self {
            stack: Stack::new(),
            history: History::new(config.history_capacity),
            names: NamespaceManager::new(),
            registry: Registry::standard(),
            evaluator,
            math,
            plot_sink: Box::new(LogPlotSink),
            last_op: None,
            message: None,
            invert_lists: config.invert_lists,
            undo_discard: config.undo_discard,
        };

        for statement in &config.startup {
            engine.submit(statement.as_str());
            engine.commit();
            if engine.last_op == Some(LastOp::Error) {
                log::warn!(
                    "startup statement '{}' failed: {}",
                    statement,
                    engine.message.as_deref().unwrap_or("unknown error")
                );
            }
        }
        engine.history.clear();
        engine.last_op = None;
        engine.message = None;
        engine
    }

    pub fn set_plot_sink(&mut self, sink: Box<dyn PlotSink>) {
        self.plot_sink = sink;
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Stack cells, top first.
    pub fn stack(&self) -> Vec<Value> {
        self.stack.to_top_first()
    }

    /// The cell at a position (0 = X).
    pub fn read(&self, position: usize) -> Option<Value> {
        self.stack.peek(position).ok().cloned()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The status message from the last call, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn last_operation(&self) -> Option<LastOp> {
        self.last_op
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Button names in registration order.
    pub fn buttons(&self) -> Vec<&'static str> {
        self.registry.names().to_vec()
    }

    /// Every name the evaluator can currently see.
    pub fn evaluation_names(&self) -> Vec<String> {
        self.names.namespace().names()
    }

    /// User function names mapped to their source text.
    pub fn user_functions(&self) -> BTreeMap<String, String> {
        self.names.functions().clone()
    }

    pub fn export_locals(&self) -> BTreeMap<String, Value> {
        self.names.export_locals()
    }

    pub fn invert_lists(&self) -> bool {
        self.invert_lists
    }

    pub fn namespace(&self) -> &NamespaceManager {
        &self.names
    }

    // ========================================================================
    // Direct operations
    // ========================================================================

    pub fn set_invert_lists(&mut self, invert: bool) {
        self.invert_lists = invert;
    }

    /// Restore the stack to an earlier snapshot after dropping
    /// `consume_trailing` recent ones.
    pub fn undo(&mut self, consume_trailing: usize) -> Result<(), EngineError> {
        self.message = None;
        let result = self.restore_previous(consume_trailing);
        self.settle(result)
    }

    pub fn clear_stack(&mut self) {
        self.message = None;
        self.snapshot();
        self.stack.clear();
        self.note("Stack cleared".to_string());
    }

    /// Remove the cell at a position (0 = X).
    pub fn clear_level(&mut self, position: usize) -> Result<Value, EngineError> {
        self.message = None;
        let result = self.remove_level(position);
        self.settle(result)
    }

    pub fn delete_local(&mut self, name: &str) -> Result<Value, EngineError> {
        self.message = None;
        self.snapshot();
        let result = self.names.delete(name);
        if result.is_ok() {
            self.note(format!("Deleted variable '{}'", name));
        }
        self.settle(result)
    }

    /// Remove every user variable, returning their names.
    pub fn clear_all_variables(&mut self) -> Vec<String> {
        self.message = None;
        self.snapshot();
        let removed = self.names.clear_all();
        self.note(format!("Cleared {} variable(s)", removed.len()));
        removed
    }

    /// Bind user variables, skipping reserved names.
    pub fn load_locals(&mut self, locals: BTreeMap<String, Value>, clear_first: bool) {
        self.message = None;
        let skipped = self.names.load_locals(locals, clear_first);
        if !skipped.is_empty() {
            self.warn(format!("Skipped reserved name(s): {}", skipped.join(", ")));
        }
    }

    /// Define a user function from `def name(...)` source.
    pub fn define_function(&mut self, source: &str) -> Result<String, EngineError> {
        self.message = None;
        let result = self.names.define_function(self.evaluator.as_ref(), source);
        if let Ok(name) = &result {
            self.note(format!("Defined function '{}'", name));
        }
        self.settle(result)
    }

    /// Remove one user function, or all when `name` is `None`.
    pub fn remove_user_function(&mut self, name: Option<&str>) -> Vec<String> {
        self.message = None;
        let removed = self.names.remove_function(name);
        if removed.is_empty() {
            self.warn(format!("No user function named '{}'", name.unwrap_or("*")));
        } else {
            self.note(format!("Removed function(s): {}", removed.join(", ")));
        }
        removed
    }

    /// Hand named plot containers to the plot sink.
    pub fn show_plots(&mut self, plots: Vec<(String, PlotContainer)>) -> Result<(), EngineError> {
        self.message = None;
        let count = plots.len();
        let result = self
            .plot_sink
            .show(PlotRequest::Named(plots))
            .map_err(EngineError::Structural);
        if result.is_ok() {
            self.note(format!("Plotted {} series", count));
        }
        self.settle(result)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    pub(crate) fn snapshot(&mut self) {
        self.history.record(&self.stack);
        log::trace!("snapshot #{}: {:?}", self.history.len(), self.stack.as_slice());
    }

    pub(crate) fn restore_previous(&mut self, discard: usize) -> Result<(), EngineError> {
        let dropped = self.history.discard(discard);
        let previous = self.history.pop().ok_or(EngineError::NoHistory)?;
        self.stack = previous;
        log::debug!("undo: dropped {} snapshot(s), depth now {}", dropped, self.stack.len());
        self.note("Undo".to_string());
        Ok(())
    }

    pub(crate) fn remove_level(&mut self, position: usize) -> Result<Value, EngineError> {
        if position >= self.stack.len() {
            return Err(EngineError::Structural(format!(
                "no stack level {} to clear (depth {})",
                position,
                self.stack.len()
            )));
        }
        self.snapshot();
        Ok(self.stack.remove(position)?)
    }

    /// Record a status message.
    pub(crate) fn note(&mut self, message: String) {
        log::info!("{}", message);
        self.message = Some(message);
    }

    pub(crate) fn warn(&mut self, message: String) {
        log::warn!("{}", message);
        self.message = Some(format!("Warning: {}", message));
    }

    pub(crate) fn report(&mut self, err: &EngineError) {
        log::error!("{}", err);
        self.message = Some(format!("Error: {}", err));
    }

    /// Report an error result and pass it through.
    pub(crate) fn settle<T>(&mut self, result: Result<T, EngineError>) -> Result<T, EngineError> {
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    pub(crate) fn eval_text(&mut self, text: &str) -> EvalResult<Value> {
        self.evaluator.evaluate(text, self.names.namespace_mut())
    }

    pub(crate) fn exec_text(&mut self, text: &str) -> EvalResult<()> {
        self.evaluator.execute(text, self.names.namespace_mut())
    }

    /// Call with positional arguments, naming the callable on failure.
    pub(crate) fn apply(
        &mut self,
        callable: &Arc<dyn Callable>,
        args: Vec<Value>,
    ) -> Result<Value, EngineError> {
        callable
            .call(Args::positional(args), self.names.namespace_mut())
            .map_err(|e| EngineError::evaluation(format!("{} failed", callable.name()), e))
    }

    pub(crate) fn math_fn(&self, name: &str) -> Result<Arc<dyn Callable>, EngineError> {
        self.math
            .get(name)
            .and_then(Value::as_callable)
            .cloned()
            .ok_or_else(|| EngineError::Resolution(format!("math.{}", name)))
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("stack", &self.stack)
            .field("history", &self.history.len())
            .field("last_op", &self.last_op)
            .field("message", &self.message)
            .finish()
    }
}
