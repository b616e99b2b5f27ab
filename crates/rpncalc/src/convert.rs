//! Moving cells between the stack and single list or array cells.
//!
//! With `invert_lists` on, a list built from the stack ends with X and a
//! list spread onto the stack leaves its last element in X, so the two
//! conversions undo each other.

use rpncalc_script::{Array, DType, Value};

use crate::coerce::coerce;
use crate::engine::Engine;
use crate::error::EngineError;

impl Engine {
    /// Spread an iterable X onto the stack; anything else is duplicated.
    pub(crate) fn iterable_to_stack(&mut self) -> Result<(), EngineError> {
        self.need("iterable_to_stack", 1)?;
        self.snapshot();
        let x = self.stack.top()?.clone();
        let Some(mut items) = x.iter_items() else {
            self.warn(format!("{} is not iterable; duplicating it", x.repr()));
            return self.duplicate_x();
        };
        self.stack.pop()?;
        if !self.invert_lists {
            items.reverse();
        }
        let count = items.len();
        for item in items {
            self.stack.push(item);
        }
        log::debug!("spread {} item(s) onto the stack", count);
        Ok(())
    }

    /// Replace the whole stack with one list cell.
    pub(crate) fn stack_to_list(&mut self) -> Result<(), EngineError> {
        self.need("stack_to_list", 1)?;
        self.snapshot();
        if let Ok(number) = coerce(self.stack.top()?) {
            self.stack.replace_top(number);
        }
        let mut cells = self.stack.to_top_first();
        if self.invert_lists {
            cells.reverse();
        }
        self.stack.clear();
        self.stack.push(Value::list(cells));
        Ok(())
    }

    /// Replace the whole stack with one array cell.
    ///
    /// The element type is taken from X when X reads as a number (or is
    /// plain text), then int, float and text are tried in turn.
    pub(crate) fn stack_to_array(&mut self) -> Result<(), EngineError> {
        self.need("stack_to_array", 1)?;
        let top = self.stack.top()?;
        let preferred = match coerce(top) {
            Ok(Value::Int(_)) => Some(DType::Int),
            Ok(_) => Some(DType::Float),
            Err(_) if top.is_str() => Some(DType::Text),
            Err(_) => None,
        };
        let mut cells = self.stack.to_top_first();
        if self.invert_lists {
            cells.reverse();
        }

        let order = preferred
            .into_iter()
            .chain([DType::Int, DType::Float, DType::Text]);
        for dtype in order {
            if let Ok(array) = Array::from_values(&cells, dtype) {
                self.snapshot();
                self.stack.clear();
                self.stack.push(Value::array(array));
                return Ok(());
            }
        }
        let kinds: Vec<&str> = cells.iter().map(Value::type_name).collect();
        Err(EngineError::Structural(format!(
            "cannot build an array from {}",
            kinds.join(", ")
        )))
    }
}
