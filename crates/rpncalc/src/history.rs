//! Bounded undo history of stack snapshots.

use std::collections::VecDeque;

use crate::stack::Stack;

/// Snapshots of the stack, oldest first, never more than `capacity`.
#[derive(Clone, Debug)]
pub struct History {
    snapshots: VecDeque<Stack>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::with_capacity(capacity.min(256)),
            capacity: capacity.max(1),
        }
    }

    /// Record a full copy of the stack, evicting the oldest when full.
    pub fn record(&mut self, stack: &Stack) {
        while self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(stack.clone());
    }

    /// Take the most recent snapshot.
    pub fn pop(&mut self) -> Option<Stack> {
        self.snapshots.pop_back()
    }

    /// Drop up to `count` recent snapshots, returning how many were dropped.
    pub fn discard(&mut self, count: usize) -> usize {
        let n = count.min(self.snapshots.len());
        self.snapshots.truncate(self.snapshots.len() - n);
        n
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
