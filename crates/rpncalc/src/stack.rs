//! The calculator stack store.
//!
//! Cells are stored bottom to top; every public position counts from the
//! top, so position 0 is X and position 1 is Y.

use rpncalc_script::Value;

use crate::error::StackError;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stack {
    items: Vec<Value>,
}

impl Stack {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a stack from cells listed top first.
    pub fn from_top_first(cells: impl IntoIterator<Item = Value>) -> Self {
        let mut items: Vec<Value> = cells.into_iter().collect();
        items.reverse();
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Push onto the top.
    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    /// Pop the top cell.
    pub fn pop(&mut self) -> Result<Value, StackError> {
        self.items.pop().ok_or(StackError::Underflow)
    }

    /// Peek at the top cell.
    pub fn top(&self) -> Result<&Value, StackError> {
        self.items.last().ok_or(StackError::Underflow)
    }

    /// Get the cell at a position (0 = top).
    pub fn peek(&self, position: usize) -> Result<&Value, StackError> {
        if position >= self.items.len() {
            return Err(StackError::InvalidIndex(position));
        }
        Ok(&self.items[self.items.len() - 1 - position])
    }

    /// Place a value at a position.
    ///
    /// With `shift_up` the cells at and above `position` move up; without
    /// it the cell at `position` is overwritten. Either way a position one
    /// past the bottom appends at the bottom.
    pub fn put(&mut self, value: Value, position: usize, shift_up: bool) -> Result<(), StackError> {
        let len = self.items.len();
        if position > len {
            return Err(StackError::InvalidIndex(position));
        }
        if position == len {
            self.items.insert(0, value);
        } else if shift_up {
            self.items.insert(len - position, value);
        } else {
            self.items[len - 1 - position] = value;
        }
        Ok(())
    }

    /// Overwrite the top cell, or push onto an empty stack.
    pub fn replace_top(&mut self, value: Value) {
        match self.items.last_mut() {
            Some(top) => *top = value,
            None => self.items.push(value),
        }
    }

    /// Remove the cell at a position (0 = top).
    pub fn remove(&mut self, position: usize) -> Result<Value, StackError> {
        let len = self.items.len();
        if position >= len {
            return Err(StackError::InvalidIndex(position));
        }
        Ok(self.items.remove(len - 1 - position))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Swap X and Y.
    pub fn swap(&mut self) -> Result<(), StackError> {
        let len = self.items.len();
        if len < 2 {
            return Err(StackError::Underflow);
        }
        self.items.swap(len - 1, len - 2);
        Ok(())
    }

    /// Move the bottom cell to the top.
    pub fn roll_up(&mut self) {
        if self.items.len() > 1 {
            self.items.rotate_left(1);
        }
    }

    /// Move the top cell to the bottom.
    pub fn roll_down(&mut self) {
        if self.items.len() > 1 {
            self.items.rotate_right(1);
        }
    }

    /// Cells from top to bottom.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter().rev()
    }

    /// A copy of the cells, top first.
    pub fn to_top_first(&self) -> Vec<Value> {
        self.iter().cloned().collect()
    }

    /// Cells bottom to top.
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(stack: &Stack) -> Vec<i64> {
        stack.iter().map(|v| v.as_i64().unwrap()).collect()
    }

    fn stack_of(top_first: &[i64]) -> Stack {
        Stack::from_top_first(top_first.iter().map(|n| Value::Int(*n)))
    }

    #[test]
    fn positions_count_from_top() {
        let mut stack = Stack::new();
        stack.push(Value::Int(1));
        stack.push(Value::Int(2));
        assert_eq!(stack.peek(0).unwrap(), &Value::Int(2));
        assert_eq!(stack.peek(1).unwrap(), &Value::Int(1));
        assert_eq!(stack.peek(2), Err(StackError::InvalidIndex(2)));
        assert_eq!(stack.pop().unwrap(), Value::Int(2));
        assert_eq!(stack.pop().unwrap(), Value::Int(1));
        assert_eq!(stack.pop(), Err(StackError::Underflow));
    }

    #[test]
    fn put_shift_and_overwrite() {
        let mut stack = stack_of(&[3, 2, 1]);
        stack.put(Value::Int(9), 1, true).unwrap();
        assert_eq!(ints(&stack), vec![3, 9, 2, 1]);
        stack.put(Value::Int(8), 0, false).unwrap();
        assert_eq!(ints(&stack), vec![8, 9, 2, 1]);
        stack.put(Value::Int(0), 4, true).unwrap();
        assert_eq!(ints(&stack), vec![8, 9, 2, 1, 0]);
        assert_eq!(stack.put(Value::Int(5), 7, true), Err(StackError::InvalidIndex(7)));
    }

    #[test]
    fn put_on_empty_stack_appends() {
        let mut stack = Stack::new();
        stack.put(Value::Int(1), 0, false).unwrap();
        assert_eq!(ints(&stack), vec![1]);
    }

    #[test]
    fn remove_and_swap() {
        let mut stack = stack_of(&[3, 2, 1]);
        assert_eq!(stack.remove(1).unwrap(), Value::Int(2));
        assert_eq!(ints(&stack), vec![3, 1]);
        stack.swap().unwrap();
        assert_eq!(ints(&stack), vec![1, 3]);
        assert_eq!(stack.remove(5), Err(StackError::InvalidIndex(5)));
        let mut single = stack_of(&[1]);
        assert_eq!(single.swap(), Err(StackError::Underflow));
    }

    #[test]
    fn rolls() {
        let mut stack = stack_of(&[3, 2, 1]);
        stack.roll_up();
        assert_eq!(ints(&stack), vec![1, 3, 2]);
        stack.roll_down();
        assert_eq!(ints(&stack), vec![3, 2, 1]);
        stack.roll_down();
        assert_eq!(ints(&stack), vec![2, 1, 3]);
    }
}
