use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::{Error, Event, Result};

/// Pending events. Stores events in a priority queue, and always yields the one with the
/// smallest `(time, priority, sequence)` key first.
#[derive(Debug, Default)]
pub struct EventHeap {
    events: BinaryHeap<Reverse<Event>>,
}

impl EventHeap {
    /// Constructs an empty heap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `event` to the heap.
    pub fn insert(&mut self, event: Event) {
        self.events.push(Reverse(event));
    }

    /// Returns, and removes from the heap, the next event to be processed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyHeap`] if there are no events left.
    pub fn extract_min(&mut self) -> Result<Event> {
        self.events
            .pop()
            .map(|Reverse(event)| event)
            .ok_or(Error::EmptyHeap)
    }

    /// Returns the next event to be processed without removing it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyHeap`] if there are no events left.
    pub fn peek_min(&self) -> Result<&Event> {
        self.events
            .peek()
            .map(|Reverse(event)| event)
            .ok_or(Error::EmptyHeap)
    }

    /// Returns the number of events in the heap.
    #[must_use]
    pub fn size(&self) -> usize {
        self.events.len()
    }

    /// Answers whether the heap is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drops all pending events without running them.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}
