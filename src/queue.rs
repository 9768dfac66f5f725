//! Event queue abstraction for interior mutability.
//!
//! Flag updates arrive from browser callbacks that cannot borrow the game
//! mutably. They are pushed here and drained once per frame.

use std::cell::RefCell;
use std::collections::VecDeque;

/// A single-threaded event queue that can be written to from callbacks.
#[derive(Debug)]
pub struct EventQueue<T> {
    inner: RefCell<VecDeque<T>>,
}

impl<T> EventQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(VecDeque::new()),
        }
    }

    pub fn push(&self, event: T) {
        self.inner.borrow_mut().push_back(event);
    }

    /// Drain all events in arrival order.
    pub fn drain(&self) -> Vec<T> {
        self.inner.borrow_mut().drain(..).collect()
    }

    /// Drop everything but the newest event and return it.
    pub fn latest(&self) -> Option<T> {
        let mut inner = self.inner.borrow_mut();
        let last = inner.pop_back();
        inner.clear();
        last
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().is_empty()
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_discards_older_events() {
        let queue = EventQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.latest(), Some(3));
        assert!(queue.is_empty());
        assert_eq!(queue.latest(), None);
    }

    #[test]
    fn test_drain_keeps_order() {
        let queue = EventQueue::new();
        queue.push("a");
        queue.push("b");
        assert_eq!(queue.drain(), vec!["a", "b"]);
        assert!(queue.drain().is_empty());
    }
}
