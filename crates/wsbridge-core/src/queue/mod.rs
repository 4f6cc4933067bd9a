//! Event queue
//!
//! Unbounded multi-producer FIFO. Producers append under a short
//! `parking_lot::Mutex` critical section; consumers take the whole buffer in
//! one swap, so concurrent drains never see the same element twice.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe FIFO drained in batches
pub struct EventQueue<T> {
    /// Buffered items, oldest first
    items: Mutex<Vec<T>>,
    /// Number of items ever pushed
    pushed: AtomicU64,
}

impl<T> EventQueue<T> {
    /// Create an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            pushed: AtomicU64::new(0),
        }
    }

    /// Append an item to the tail
    pub fn push(&self, item: T) {
        self.items.lock().push(item);
        self.pushed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take every queued item in arrival order, leaving the queue empty
    pub fn drain_all(&self) -> Vec<T> {
        std::mem::take(&mut *self.items.lock())
    }

    /// Number of items currently queued
    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    /// Check if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Total number of items pushed since creation
    pub fn total_pushed(&self) -> u64 {
        self.pushed.load(Ordering::Relaxed)
    }
}

impl<T> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventQueue")
            .field("len", &self.len())
            .field("total_pushed", &self.total_pushed())
            .finish()
    }
}
