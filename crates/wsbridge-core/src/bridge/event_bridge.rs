//! Event bridge
//!
//! Transport threads call the `TransportCallbacks` entry points, which only
//! build an event and push it onto the queue. Listeners run when the
//! application calls `poll_and_dispatch`, on the application's own thread.

use crate::client::{ClientRef, HandshakeInfo};
use crate::error::{ListenerResult, TransportError};
use crate::events::BridgeEvent;
use crate::listener::{DispatchReport, ListenerId, ListenerRegistry, PollReport};
use crate::queue::EventQueue;
use crate::traits::{EventListener, TransportCallbacks};
use bytes::Bytes;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters describing bridge activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    /// Events accepted from the transport (or pushed directly)
    pub events_received: u64,
    /// Events that went through a dispatch pass
    pub events_dispatched: u64,
    /// Listener faults recorded across all passes
    pub listener_faults: u64,
    /// Calls to `poll_and_dispatch`
    pub polls: u64,
    /// Events waiting for the next poll
    pub pending: usize,
    /// Registered listeners
    pub listeners: usize,
}

/// Bridge between a multi-threaded transport and a single consumer context
pub struct EventBridge {
    /// Events waiting for dispatch
    queue: EventQueue<BridgeEvent>,
    /// Registered observers
    listeners: ListenerRegistry,
    /// Events dispatched so far
    dispatched: AtomicU64,
    /// Listener faults so far
    faults: AtomicU64,
    /// Poll calls so far
    polls: AtomicU64,
}

impl EventBridge {
    /// Create a new bridge
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: EventQueue::new(),
            listeners: ListenerRegistry::new(),
            dispatched: AtomicU64::new(0),
            faults: AtomicU64::new(0),
            polls: AtomicU64::new(0),
        }
    }

    /// Create a new bridge wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    // =========================================================================
    // Listener registration
    // =========================================================================

    /// Register a listener
    pub fn subscribe<L: EventListener + 'static>(&self, listener: L) -> ListenerId {
        self.listeners.subscribe(listener)
    }

    /// Register a shared listener
    pub fn subscribe_arc(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        self.listeners.subscribe_arc(listener)
    }

    /// Register a closure as a listener
    pub fn subscribe_fn<F>(&self, callback: F) -> ListenerId
    where
        F: Fn(&BridgeEvent) -> ListenerResult + Send + Sync + 'static,
    {
        self.listeners.subscribe_fn(callback)
    }

    /// Remove a listener. Safe to call from inside a listener callback.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Get the listener registry
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    // =========================================================================
    // Queueing and dispatch
    // =========================================================================

    /// Queue an event for the next poll
    pub fn push_event(&self, event: BridgeEvent) {
        tracing::trace!(event_kind = %event.kind(), "Event queued");
        self.queue.push(event);
    }

    /// Dispatch one event to every listener right away, bypassing the queue.
    ///
    /// Runs listeners on the calling thread.
    pub fn dispatch_event(&self, event: &BridgeEvent) -> DispatchReport {
        let report = self.listeners.dispatch(event);

        self.dispatched.fetch_add(1, Ordering::Relaxed);
        if report.has_faults() {
            self.faults
                .fetch_add(report.faults().len() as u64, Ordering::Relaxed);
        }

        report
    }

    /// Drain the queue and dispatch every event in arrival order.
    ///
    /// Each event goes to all listeners before the next event is dispatched.
    /// Listeners run synchronously on the calling thread, so a listener that
    /// blocks stalls the whole poll.
    pub fn poll_and_dispatch(&self) -> PollReport {
        self.polls.fetch_add(1, Ordering::Relaxed);

        let events = self.queue.drain_all();
        let mut poll = PollReport::default();

        for event in &events {
            poll.absorb(self.dispatch_event(event));
        }

        if !poll.is_empty() {
            tracing::debug!(
                events = poll.events(),
                deliveries = poll.deliveries(),
                faults = poll.faults().len(),
                "Poll dispatched events"
            );
        }

        poll
    }

    /// Number of events waiting for the next poll
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Snapshot of the bridge counters
    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            events_received: self.queue.total_pushed(),
            events_dispatched: self.dispatched.load(Ordering::Relaxed),
            listener_faults: self.faults.load(Ordering::Relaxed),
            polls: self.polls.load(Ordering::Relaxed),
            pending: self.queue.len(),
            listeners: self.listeners.len(),
        }
    }
}

impl TransportCallbacks for EventBridge {
    fn on_start(&self) {
        self.push_event(BridgeEvent::Start);
    }

    fn on_stop(&self, code: u16, reason: String, was_remote: bool) {
        self.push_event(BridgeEvent::Stop {
            code,
            reason,
            was_remote,
        });
    }

    fn on_open(&self, client: ClientRef, handshake: HandshakeInfo) {
        self.push_event(BridgeEvent::Connect { client, handshake });
    }

    fn on_close(&self, client: ClientRef, code: u16, reason: String, was_remote: bool) {
        self.push_event(BridgeEvent::Disconnect {
            client,
            code,
            reason,
            was_remote,
        });
    }

    fn on_text_message(&self, client: ClientRef, text: String) {
        self.push_event(BridgeEvent::StringMessage { client, text });
    }

    fn on_binary_message(&self, client: ClientRef, bytes: Bytes) {
        self.push_event(BridgeEvent::BinaryMessage { client, bytes });
    }

    fn on_fault(&self, client: Option<ClientRef>, error: TransportError) {
        self.push_event(BridgeEvent::Error { client, error });
    }
}

impl Default for EventBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBridge")
            .field("queue", &self.queue)
            .field("listeners", &self.listeners)
            .finish()
    }
}
