//! Entry disambiguation: deciding what a submitted token means.
//!
//! The same text can be a button press, the start of a new cell, or more
//! characters for the expression being composed at X. Which one depends on
//! the top cell and on the last operation.

use rpncalc_script::Value;

use crate::engine::{Engine, LastOp};
use crate::registry::Action;

/// Cells that a new token never edits: numbers and sequences.
pub fn is_stackable(value: &Value) -> bool {
    matches!(
        value,
        Value::Int(_)
            | Value::Float(_)
            | Value::Bool(_)
            | Value::List(_)
            | Value::Tuple(_)
            | Value::Set(_)
            | Value::Array(_)
    )
}

/// Whether text opens a bracket, brace or parenthesis it has not closed.
pub fn has_open_bracket(text: &str) -> bool {
    let mut depth = 0i32;
    for c in text.chars() {
        match c {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            _ => {}
        }
    }
    depth > 0
}

impl Engine {
    /// Accept one token of user input.
    ///
    /// Never fails: problems are reported through [`Engine::message`] and
    /// leave the stack as it was.
    pub fn submit(&mut self, input: impl Into<Value>) {
        self.message = None;
        let input = input.into();
        let text = match &input {
            Value::Str(s) => s.to_string(),
            _ => {
                self.snapshot();
                self.stack.push(input);
                self.last_op = Some(LastOp::UserEntry);
                return;
            }
        };
        log::trace!("submit {:?} (last: {:?})", text, self.last_op);
        let action = self.registry.find(&text);

        if self.stack.top().is_ok_and(is_stackable) {
            if let Some(action) = action {
                self.press(&text, action);
                return;
            }
            let duplicate = self.last_op == Some(LastOp::Enter)
                && matches!((self.stack.peek(0), self.stack.peek(1)), (Ok(x), Ok(y)) if x == y);
            if duplicate {
                // Typing over the copy that enter left in X.
                self.stack.replace_top(input);
            } else {
                self.snapshot();
                self.stack.push(input);
            }
            self.last_op = Some(LastOp::UserEntry);
            return;
        }

        let probe = match self.stack.top() {
            Ok(top) => top.to_string(),
            Err(_) => text.clone(),
        };
        if !has_open_bracket(&probe)
            && let Some(action) = action
        {
            self.press(&text, action);
            return;
        }

        match self.last_op {
            Some(LastOp::Enter | LastOp::Assignment | LastOp::Recall) => {
                self.snapshot();
                self.stack.replace_top(input);
            }
            _ => match self.stack.top() {
                Ok(Value::Str(current)) => {
                    let joined = format!("{}{}", current, text);
                    self.stack.replace_top(Value::str(joined));
                }
                _ => {
                    self.snapshot();
                    self.stack.push(input);
                }
            },
        }
        self.last_op = Some(LastOp::UserEntry);
    }

    fn press(&mut self, name: &str, action: Action) {
        log::debug!("button '{}' -> {:?}", name, action);
        if let Err(err) = self.perform(action) {
            self.report(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn engine() -> Engine {
        Engine::with_config(EngineConfig::bare())
    }

    #[test]
    fn first_token_starts_a_cell() {
        let mut engine = engine();
        engine.submit("12");
        assert_eq!(engine.stack(), vec![Value::str("12")]);
        assert_eq!(engine.last_operation(), Some(LastOp::UserEntry));
    }

    #[test]
    fn text_concatenates_onto_text() {
        let mut engine = engine();
        engine.submit("1");
        engine.submit("2");
        engine.submit(".5");
        assert_eq!(engine.stack(), vec![Value::str("12.5")]);
    }

    #[test]
    fn text_over_a_number_starts_a_new_cell() {
        let mut engine = engine();
        engine.submit(Value::Int(4));
        engine.submit("abc");
        assert_eq!(engine.stack(), vec![Value::str("abc"), Value::Int(4)]);
    }

    #[test]
    fn non_text_pushes_directly() {
        let mut engine = engine();
        engine.submit("x");
        engine.submit(Value::Int(9));
        assert_eq!(engine.stack(), vec![Value::Int(9), Value::str("x")]);
        assert_eq!(engine.history_len(), 2);
    }

    #[test]
    fn brackets_suppress_buttons() {
        let mut engine = engine();
        engine.submit("(1");
        engine.submit("+");
        engine.submit("2)");
        assert_eq!(engine.stack(), vec![Value::str("(1+2)")]);
        engine.submit("enter");
        assert_eq!(engine.stack(), vec![Value::Int(3)]);
    }

    #[test]
    fn open_brackets() {
        assert!(has_open_bracket("(1"));
        assert!(has_open_bracket("[1, (2)"));
        assert!(!has_open_bracket("sin(1)"));
        assert!(!has_open_bracket("abc"));
    }

    #[test]
    fn buttons_fire_over_numbers() {
        let mut engine = engine();
        engine.submit(Value::Int(2));
        engine.submit(Value::Int(3));
        engine.submit("*");
        assert_eq!(engine.stack(), vec![Value::Int(6)]);
    }

    #[test]
    fn e_is_always_text() {
        let mut engine = engine();
        engine.submit(Value::Int(2));
        engine.submit("e");
        assert_eq!(engine.stack(), vec![Value::str("e"), Value::Int(2)]);
    }

    #[test]
    fn stackable_cells() {
        assert!(is_stackable(&Value::Int(1)));
        assert!(is_stackable(&Value::list(vec![Value::Int(1)])));
        assert!(!is_stackable(&Value::str("1")));
        assert!(!is_stackable(&Value::None));
    }
}
