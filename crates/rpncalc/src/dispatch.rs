//! Button actions: arithmetic, math functions and stack manipulation.
//!
//! Every action either completes or leaves the stack exactly as it found
//! it and returns the error.

use std::sync::Arc;

use rpncalc_script::ast::{BinOp, UnaryOp};
use rpncalc_script::{Array, Callable, Value, ops};

use crate::coerce::coerce;
use crate::engine::{Engine, LastOp};
use crate::error::EngineError;
use crate::plot;
use crate::registry::Action;

impl Engine {
    pub(crate) fn perform(&mut self, action: Action) -> Result<(), EngineError> {
        match action {
            Action::Binary(op) => self.binary(op),
            Action::StackFunction(name) => self.stack_function(name),
            Action::Square => self.numeric_unary("x^2", |_, x| {
                ops::binary(BinOp::Pow, &x, &Value::Int(2))
                    .map_err(|e| EngineError::evaluation("x^2 failed", e))
            }),
            Action::PowerXY => self.numeric_binary("x^y", |_, y, x| {
                ops::binary(BinOp::Pow, &y, &x).map_err(|e| EngineError::evaluation("x^y failed", e))
            }),
            Action::ExpX => self.math_unary("e^x", "exp"),
            Action::Ln => self.math_unary("ln", "log"),
            Action::Ncr => self.math_binary("ncr", "comb"),
            Action::Npr => self.math_binary("npr", "perm"),
            Action::Negate => self.numeric_unary("negate", |_, x| {
                ops::unary(UnaryOp::Neg, &x).map_err(|e| EngineError::evaluation("negate failed", e))
            }),
            Action::Reciprocal => self.numeric_unary("1/x", |_, x| {
                ops::binary(BinOp::Div, &Value::Int(1), &x)
                    .map_err(|e| EngineError::evaluation("1/x failed", e))
            }),
            Action::Constant(text) => {
                self.snapshot();
                self.stack.push(Value::str(text));
                Ok(())
            }
            Action::Swap => {
                self.need("swap", 2)?;
                self.snapshot();
                Ok(self.stack.swap()?)
            }
            Action::Drop | Action::Clear => self.remove_level(0).map(|_| ()),
            Action::Dup => {
                let x = self.stack.top().map_err(|_| EngineError::operands("dup", 1, 0))?.clone();
                self.snapshot();
                self.stack.push(x);
                Ok(())
            }
            Action::RollUp => {
                self.snapshot();
                self.stack.roll_up();
                Ok(())
            }
            Action::RollDown => {
                self.snapshot();
                self.stack.roll_down();
                Ok(())
            }
            Action::IterableToStack => self.iterable_to_stack(),
            Action::StackToList => self.stack_to_list(),
            Action::StackToArray => self.stack_to_array(),
            Action::Enter => self.enter(),
            Action::Delete => self.delete(),
            Action::Undo => self.restore_previous(self.undo_discard),
            Action::ShowPlot => self.show_plot(),
            Action::OneArg(name) => self.one_arg(name),
            Action::TwoArg(name) => self.math_binary(name, name),
            Action::Iterable(name) => self.iterable(name),
        }
    }

    pub(crate) fn need(&self, op: &str, count: usize) -> Result<(), EngineError> {
        if self.stack.len() < count {
            return Err(EngineError::operands(op, count, self.stack.len()));
        }
        Ok(())
    }

    // ========================================================================
    // Arithmetic
    // ========================================================================

    /// Evaluate a text operand, twice if the first result is text again.
    fn operand(&mut self, cell: &Value) -> Result<Value, EngineError> {
        let mut value = cell.clone();
        for _ in 0..2 {
            let Value::Str(text) = &value else { break };
            let text = text.to_string();
            value = self
                .eval_text(&text)
                .map_err(|e| EngineError::evaluation(format!("could not evaluate '{}'", text), e))?;
        }
        Ok(value)
    }

    fn binary(&mut self, op: BinOp) -> Result<(), EngineError> {
        let symbol = op.symbol();
        self.snapshot();
        if self.stack.len() == 1
            && let Ok(Value::Str(text)) = self.stack.top()
        {
            let composed = format!("{}{}", text, symbol);
            self.stack.replace_top(Value::str(composed));
            return Ok(());
        }
        self.need(symbol, 2)?;

        let x = self.stack.pop()?;
        let y = self.stack.pop()?;
        let operands = self
            .operand(&x)
            .and_then(|xv| self.operand(&y).map(|yv| (yv, xv)));
        let (yv, xv) = match operands {
            Ok(pair) => pair,
            Err(_) if x.is_str() => {
                // X is an unfinished expression; keep composing it.
                self.stack.push(y);
                self.stack.push(Value::str(format!("{}{}", x, symbol)));
                return Ok(());
            }
            Err(err) => {
                self.stack.push(y);
                self.stack.push(x);
                return Err(err);
            }
        };

        let result = if op == BinOp::Div && xv.is_number() && xv.as_f64() == Some(0.0) {
            Ok(Value::Float(f64::INFINITY))
        } else {
            ops::binary(op, &yv, &xv)
        };
        match result {
            Ok(value) => {
                log::debug!("{} {} {} = {}", yv.repr(), symbol, xv.repr(), value.repr());
                self.stack.push(value);
                Ok(())
            }
            Err(e) => {
                self.stack.push(y);
                self.stack.push(x);
                Err(EngineError::evaluation(format!("'{}' failed", symbol), e))
            }
        }
    }

    /// Pop X, coerce it, compute, and push the result; restore X on failure.
    fn numeric_unary(
        &mut self,
        label: &str,
        compute: impl FnOnce(&mut Self, Value) -> Result<Value, EngineError>,
    ) -> Result<(), EngineError> {
        self.need(label, 1)?;
        self.snapshot();
        let x = self.stack.pop()?;
        let result = match coerce(&x) {
            Ok(number) => compute(self, number),
            Err(err) => Err(err.into()),
        };
        self.finish(result, vec![x])
    }

    /// Pop X and Y, coerce both, compute from (Y, X); restore both on failure.
    fn numeric_binary(
        &mut self,
        label: &str,
        compute: impl FnOnce(&mut Self, Value, Value) -> Result<Value, EngineError>,
    ) -> Result<(), EngineError> {
        self.need(label, 2)?;
        self.snapshot();
        let x = self.stack.pop()?;
        let y = self.stack.pop()?;
        let result = match (coerce(&y), coerce(&x)) {
            (Ok(yn), Ok(xn)) => compute(self, yn, xn),
            (Err(err), _) | (_, Err(err)) => Err(err.into()),
        };
        self.finish(result, vec![x, y])
    }

    /// Push a result, or put the consumed cells (X first) back.
    fn finish(&mut self, result: Result<Value, EngineError>, consumed: Vec<Value>) -> Result<(), EngineError> {
        match result {
            Ok(value) => {
                self.stack.push(value);
                Ok(())
            }
            Err(err) => {
                for cell in consumed.into_iter().rev() {
                    self.stack.push(cell);
                }
                Err(err)
            }
        }
    }

    fn math_unary(&mut self, label: &str, name: &str) -> Result<(), EngineError> {
        let f = self.math_fn(name)?;
        self.numeric_unary(label, |engine, x| engine.apply(&f, vec![x]))
    }

    fn math_binary(&mut self, label: &str, name: &str) -> Result<(), EngineError> {
        let f = self.math_fn(name)?;
        self.numeric_binary(label, |engine, y, x| engine.apply(&f, vec![y, x]))
    }

    // ========================================================================
    // Math function groups
    // ========================================================================

    /// A one-argument function on X, mapped over sequences and arrays.
    fn one_arg(&mut self, name: &str) -> Result<(), EngineError> {
        let f = self.math_fn(name)?;
        self.need(name, 1)?;
        self.snapshot();
        let x = self.stack.pop()?;
        let result = match coerce(&x) {
            Ok(number) => self.apply(&f, vec![number]),
            Err(err) => match &x {
                Value::List(items) => self.map_items(&f, items).map(Value::list),
                Value::Tuple(items) => self.map_items(&f, items).map(Value::tuple),
                Value::Set(items) => self.map_items(&f, items).map(Value::set),
                Value::Array(a) => self.map_items(&f, &a.to_values()).and_then(|values| {
                    Array::infer(&values)
                        .map(Value::array)
                        .map_err(|e| EngineError::evaluation(format!("{} failed", name), e))
                }),
                _ => Err(err.into()),
            },
        };
        self.finish(result, vec![x])
    }

    fn map_items(&mut self, f: &Arc<dyn Callable>, items: &[Value]) -> Result<Vec<Value>, EngineError> {
        items.iter().map(|item| self.apply(f, vec![item.clone()])).collect()
    }

    /// A function of one iterable cell. Only text X is coerced.
    fn iterable(&mut self, name: &str) -> Result<(), EngineError> {
        let f = self.math_fn(name)?;
        self.need(name, 1)?;
        self.snapshot();
        let x = self.stack.pop()?;
        let result = match &x {
            Value::Str(_) => coerce(&x).map_err(EngineError::from),
            other => Ok(other.clone()),
        }
        .and_then(|arg| self.apply(&f, vec![arg]));
        self.finish(result, vec![x])
    }

    /// A named function of X, retried as f(X, Y) when X alone fails.
    fn stack_function(&mut self, name: &str) -> Result<(), EngineError> {
        let f = self.math_fn(name)?;
        self.need(name, 1)?;
        self.snapshot();
        let x = self.stack.pop()?;
        let result = match coerce(&x) {
            Err(_) => self.apply(&f, vec![x.clone()]),
            Ok(xn) => match self.apply(&f, vec![xn.clone()]) {
                Ok(value) => Ok(value),
                Err(first) => match self.stack.pop() {
                    Err(_) => Err(first),
                    Ok(y) => {
                        let retried = coerce(&y)
                            .map_err(EngineError::from)
                            .and_then(|yn| self.apply(&f, vec![xn, yn]));
                        if retried.is_err() {
                            self.stack.push(y);
                        }
                        retried
                    }
                },
            },
        };
        self.finish(result, vec![x])?;
        self.last_op = Some(LastOp::Function);
        Ok(())
    }

    // ========================================================================
    // Editing and plotting
    // ========================================================================

    /// Drop the copy `enter` made, or strip the last character of text X.
    fn delete(&mut self) -> Result<(), EngineError> {
        let result = if self.last_op == Some(LastOp::Enter) {
            self.need("delete", 1).map(|()| {
                self.snapshot();
                let _ = self.stack.pop();
            })
        } else {
            match self.stack.top() {
                Ok(Value::Str(text)) => {
                    let mut text = text.to_string();
                    text.pop();
                    self.stack.replace_top(Value::str(text));
                    Ok(())
                }
                Ok(other) => Err(EngineError::Structural(format!(
                    "cannot delete a character from a {}",
                    other.type_name()
                ))),
                Err(_) => Err(EngineError::operands("delete", 1, 0)),
            }
        };
        self.last_op = None;
        result
    }

    fn show_plot(&mut self) -> Result<(), EngineError> {
        let x = self.stack.top().map_err(|_| EngineError::operands("show_plot", 1, 0))?;
        let request = plot::request_for(x)?;
        self.plot_sink.show(request).map_err(EngineError::Structural)?;
        self.note("Plot shown".to_string());
        Ok(())
    }
}
