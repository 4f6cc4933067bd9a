//! Listener registry
//!
//! Maps listener IDs to observers using `DashMap` for concurrent access.
//! A dispatch pass works on a snapshot of the map, so no shard lock is held
//! while listener code runs and listeners may subscribe or unsubscribe from
//! inside their own callback.

use super::{DispatchReport, FaultKind, ListenerFault};
use crate::error::ListenerResult;
use crate::events::BridgeEvent;
use crate::traits::{EventListener, FnListener};
use dashmap::DashMap;
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle identifying one registration.
///
/// Unique per `subscribe` call and never reused, even after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Create a listener ID from a raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[must_use]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Concurrent set of event listeners
pub struct ListenerRegistry {
    /// Registered listeners by ID
    listeners: DashMap<ListenerId, Arc<dyn EventListener>>,

    /// Next ID to hand out
    next_id: AtomicU64,
}

impl ListenerRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener
    pub fn subscribe<L: EventListener + 'static>(&self, listener: L) -> ListenerId {
        self.subscribe_arc(Arc::new(listener))
    }

    /// Register a shared listener
    ///
    /// The same `Arc` may be registered more than once; each registration gets
    /// its own ID and is invoked separately.
    pub fn subscribe_arc(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));

        tracing::debug!(
            listener_id = %id,
            listener = listener.name(),
            "Listener subscribed"
        );

        self.listeners.insert(id, listener);
        id
    }

    /// Register a closure as a listener
    pub fn subscribe_fn<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&BridgeEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.subscribe(FnListener::new("closure", callback))
    }

    /// Remove a listener
    ///
    /// Returns `false` if the ID was not registered. Once this returns, the
    /// listener is not part of any dispatch pass that starts afterwards.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        match self.listeners.remove(&id) {
            Some((_, listener)) => {
                tracing::debug!(
                    listener_id = %id,
                    listener = listener.name(),
                    "Listener unsubscribed"
                );
                true
            }
            None => false,
        }
    }

    /// Check if an ID is registered
    pub fn contains(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Check if no listener is registered
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Remove every listener
    pub fn clear(&self) {
        self.listeners.clear();
    }

    /// Copy out the current set so that no map lock is held during a pass
    fn snapshot(&self) -> Vec<(ListenerId, Arc<dyn EventListener>)> {
        self.listeners
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }

    /// Invoke every registered listener once with the event.
    ///
    /// Listener order is unspecified. A listener that returns an error or
    /// panics is recorded in the report and the pass continues.
    pub fn dispatch(&self, event: &BridgeEvent) -> DispatchReport {
        let kind = event.kind();
        let mut report = DispatchReport::new(kind);

        for (id, listener) in self.snapshot() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener.on_event(event)));

            let (fault_kind, message) = match outcome {
                Ok(Ok(())) => {
                    report.record_success();
                    continue;
                }
                Ok(Err(err)) => (FaultKind::Error, err.to_string()),
                Err(payload) => (FaultKind::Panic, panic_message(payload.as_ref())),
            };

            tracing::warn!(
                listener_id = %id,
                listener = listener.name(),
                event_kind = %kind,
                fault = %fault_kind,
                error = %message,
                "Listener failed"
            );

            report.record_fault(ListenerFault {
                listener_id: id,
                listener_name: listener.name().to_string(),
                event_kind: kind,
                kind: fault_kind,
                message,
            });
        }

        report
    }
}

/// Extract a readable message from a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl Default for ListenerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
