//! The commit protocol run by `enter`.
//!
//! Stages, first match wins:
//! 1. recall a user variable named by X
//! 2. `name = value` assignment
//! 3. numeric X: duplicate it into Y
//! 4. X names a button, user function or imported callable: call it
//! 5. evaluate X as an expression; a callable result is applied to Y
//! 6. execute X as statements, or track it as an import

use rpncalc_script::{EvalError, Value};

use crate::coerce::{coerce, coerce_text};
use crate::engine::{Engine, LastOp};
use crate::error::EngineError;
use crate::names::{ImportOutcome, is_identifier};

/// Result of calling X by name.
enum Called {
    Done,
    /// Nothing took the name; it is back on the stack. Carries the first
    /// failure seen along the way.
    Unresolved(Option<EngineError>),
}

/// Split `name = rhs`, ignoring comparisons and keyword arguments.
pub fn split_assignment(text: &str) -> Option<(&str, &str)> {
    let (lhs, rhs) = text.split_once('=')?;
    if rhs.starts_with('=') {
        return None;
    }
    let name = lhs.trim();
    is_identifier(name).then_some((name, rhs.trim()))
}

impl Engine {
    /// Commit X.
    ///
    /// Never fails: problems are reported through [`Engine::message`] and
    /// leave the stack as it was.
    pub fn commit(&mut self) {
        self.message = None;
        if let Err(err) = self.enter() {
            self.report(&err);
        }
    }

    pub(crate) fn enter(&mut self) -> Result<(), EngineError> {
        self.snapshot();
        if self.stack.is_empty() {
            return Ok(());
        }
        if self.recall_top() {
            return Ok(());
        }

        if self.last_op != Some(LastOp::Assignment)
            && let Ok(Value::Str(text)) = self.stack.top()
            && let Some((name, rhs)) = split_assignment(text)
        {
            let (text, name, rhs) = (text.to_string(), name.to_string(), rhs.to_string());
            return self.assign_top(text, name, rhs);
        }

        let x = self.stack.pop()?;
        match coerce(&x) {
            Ok(number) => {
                self.stack.push(number);
                return self.duplicate_x();
            }
            Err(_) => self.stack.push(x),
        }

        let mut failure = None;
        let label = self.stack.top()?.to_string();
        if self.registry.contains(&label) || self.names.is_known_callable(&label) {
            match self.call_by_name(&label)? {
                Called::Done => return Ok(()),
                Called::Unresolved(err) => failure = err,
            }
        }

        self.evaluate_top(failure)
    }

    fn recall_top(&mut self) -> bool {
        let Ok(Value::Str(text)) = self.stack.top() else {
            return false;
        };
        let name = text.trim().to_string();
        let Some(value) = self.names.recall(&name).cloned() else {
            return false;
        };
        self.stack.replace_top(value.clone());
        self.last_op = Some(LastOp::Recall);
        self.note(format!("Recall: {} = {}", name, value.repr()));
        true
    }

    fn assign_top(&mut self, text: String, name: String, rhs: String) -> Result<(), EngineError> {
        self.stack.pop()?;
        let mut consumed = None;
        let value = if !rhs.is_empty() {
            coerce_text(&rhs).unwrap_or_else(|| Value::str(rhs))
        } else if let Ok(y) = self.stack.pop() {
            consumed = Some(y.clone());
            y
        } else {
            Value::None
        };

        if let Err(err) = self.names.assign(&name, value.clone()) {
            if let Some(y) = consumed {
                self.stack.push(y);
            }
            self.stack.push(Value::str(text));
            self.last_op = Some(LastOp::Error);
            return Err(err);
        }
        self.stack.push(value.clone());
        self.last_op = Some(LastOp::Assignment);
        self.note(format!("Assignment: {} = {}", name, value.repr()));
        Ok(())
    }

    /// Copy X into Y, or press X if it names a button.
    pub(crate) fn duplicate_x(&mut self) -> Result<(), EngineError> {
        self.snapshot();
        let x = self.stack.top()?.clone();
        let label = x.to_string();
        if self.registry.contains(&label) {
            self.stack.pop()?;
            self.submit(Value::str(label));
            return Ok(());
        }
        self.stack.push(x);
        self.last_op = Some(LastOp::Enter);
        Ok(())
    }

    fn call_by_name(&mut self, name: &str) -> Result<Called, EngineError> {
        let cell = self.stack.pop()?;
        let mut failure = None;

        if let Some(action) = self.registry.find(name) {
            match self.perform(action) {
                Ok(()) => return Ok(Called::Done),
                Err(err) => {
                    log::debug!("button '{}' failed: {}", name, err);
                    failure = Some(err);
                }
            }
        }

        let target = match self.names.user_function(name) {
            Some(f) => Some((f, name.to_string())),
            None => self.names.library_member(name).map(|r| (r.callable, r.source)),
        };
        if let Some((callable, source)) = target {
            match callable.required_positional_arity() {
                Some(needed) if needed > self.stack.len() => {
                    let available = self.stack.len();
                    self.stack.push(cell);
                    return Err(EngineError::operands(source, needed, available));
                }
                Some(needed) => {
                    let mut args = Vec::with_capacity(needed);
                    for _ in 0..needed {
                        args.push(self.stack.pop()?);
                    }
                    match self.apply(&callable, args.clone()) {
                        Ok(result) => {
                            self.stack.push(result.clone());
                            self.last_op = Some(LastOp::Function);
                            self.note(format!("{} -> {}", source, result.repr()));
                            return Ok(Called::Done);
                        }
                        Err(err) => {
                            for arg in args.into_iter().rev() {
                                self.stack.push(arg);
                            }
                            failure.get_or_insert(err);
                        }
                    }
                }
                None => log::debug!("'{}' has no fixed signature; not pulling arguments", source),
            }
        }

        self.stack.push(cell);
        Ok(Called::Unresolved(failure))
    }

    fn evaluate_top(&mut self, failure: Option<EngineError>) -> Result<(), EngineError> {
        let cell = self.stack.pop()?;
        if !cell.is_str() {
            return self.push_evaluated(cell);
        }
        let text = cell.to_string();

        match self.eval_text(&text) {
            Ok(result) => self.push_evaluated(result),
            Err(eval_err) if !text.contains("import") => match self.exec_text(&text) {
                Ok(()) => {
                    self.last_op = Some(LastOp::Exec);
                    self.note(format!("Executed: {}", text.trim()));
                    Ok(())
                }
                Err(exec_err) => {
                    self.stack.push(cell);
                    self.last_op = Some(LastOp::Error);
                    let source = match eval_err {
                        EvalError::Syntax(_) => exec_err,
                        other => other,
                    };
                    Err(failure.unwrap_or_else(|| {
                        EngineError::evaluation(format!("could not evaluate '{}'", text.trim()), source)
                    }))
                }
            },
            Err(_) => self.import_top(cell, &text),
        }
    }

    /// Push an evaluation result, applying it to Y first when callable.
    fn push_evaluated(&mut self, result: Value) -> Result<(), EngineError> {
        let mut pushed = result.clone();
        if let Value::Function(f) = &result
            && let Ok(y) = self.stack.pop()
        {
            match self.apply(f, vec![y.clone()]) {
                Ok(applied) => pushed = applied,
                Err(err) => {
                    self.stack.push(y);
                    self.report(&err);
                }
            }
        }
        log::debug!("eval -> {}", pushed.repr());
        self.stack.push(pushed);
        self.last_op = Some(LastOp::Eval);
        Ok(())
    }

    fn import_top(&mut self, cell: Value, text: &str) -> Result<(), EngineError> {
        match self.names.import(self.evaluator.as_ref(), text) {
            Ok(outcome) => {
                self.last_op = Some(LastOp::Exec);
                match outcome {
                    ImportOutcome::Library(name) => self.note(format!("Imported library '{}'", name)),
                    ImportOutcome::Symbol(name) => self.note(format!("Imported '{}'", name)),
                    ImportOutcome::AlreadyBound(name) => {
                        self.warn(format!("'{}' is already defined; nothing imported", name))
                    }
                    ImportOutcome::Executed => self.note(format!("Executed: {}", text.trim())),
                }
                Ok(())
            }
            Err(err) => {
                self.stack.push(cell);
                self.last_op = Some(LastOp::Error);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_split() {
        assert_eq!(split_assignment("a=5"), Some(("a", "5")));
        assert_eq!(split_assignment(" rate = 0.07 "), Some(("rate", "0.07")));
        assert_eq!(split_assignment("b="), Some(("b", "")));
        assert_eq!(split_assignment("1==1"), None);
        assert_eq!(split_assignment("a == b"), None);
        assert_eq!(split_assignment("x <= 3"), None);
        assert_eq!(split_assignment("f(x=1)"), None);
        assert_eq!(split_assignment("x += 1"), None);
    }
}
