//! Dispatch reports
//!
//! Listener faults are contained at the dispatch boundary and handed back to
//! the application through these reports.

use super::ListenerId;
use crate::events::EventKind;
use serde::Serialize;
use std::fmt;

/// How a listener failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    /// The listener returned an error
    Error,
    /// The listener panicked
    Panic,
}

impl FaultKind {
    /// Get the string representation of the fault kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Panic => "panic",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One listener failure during one dispatch pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListenerFault {
    pub listener_id: ListenerId,
    pub listener_name: String,
    pub event_kind: EventKind,
    pub kind: FaultKind,
    pub message: String,
}

impl fmt::Display for ListenerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listener {} ({}) {} on {}: {}",
            self.listener_id, self.listener_name, self.kind, self.event_kind, self.message
        )
    }
}

/// Outcome of dispatching one event to every listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    event_kind: EventKind,
    invoked: usize,
    faults: Vec<ListenerFault>,
}

impl DispatchReport {
    pub(crate) fn new(event_kind: EventKind) -> Self {
        Self {
            event_kind,
            invoked: 0,
            faults: Vec::new(),
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.invoked += 1;
    }

    pub(crate) fn record_fault(&mut self, fault: ListenerFault) {
        self.invoked += 1;
        self.faults.push(fault);
    }

    /// Kind of the dispatched event
    pub fn event_kind(&self) -> EventKind {
        self.event_kind
    }

    /// Number of listeners invoked, including those that failed
    pub fn invoked(&self) -> usize {
        self.invoked
    }

    /// Number of listeners that handled the event without failing
    pub fn succeeded(&self) -> usize {
        self.invoked - self.faults.len()
    }

    /// Listener failures
    pub fn faults(&self) -> &[ListenerFault] {
        &self.faults
    }

    /// Check if any listener failed
    pub fn has_faults(&self) -> bool {
        !self.faults.is_empty()
    }
}

/// Outcome of one `poll_and_dispatch` call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PollReport {
    events: usize,
    deliveries: usize,
    faults: Vec<ListenerFault>,
}

impl PollReport {
    pub(crate) fn absorb(&mut self, report: DispatchReport) {
        self.events += 1;
        self.deliveries += report.invoked;
        self.faults.extend(report.faults);
    }

    /// Number of events drained and dispatched
    pub fn events(&self) -> usize {
        self.events
    }

    /// Total listener invocations across all events
    pub fn deliveries(&self) -> usize {
        self.deliveries
    }

    /// Listener failures across all events, in dispatch order
    pub fn faults(&self) -> &[ListenerFault] {
        &self.faults
    }

    /// Check if any listener failed
    pub fn has_faults(&self) -> bool {
        !self.faults.is_empty()
    }

    /// Check if the poll found nothing to dispatch
    pub fn is_empty(&self) -> bool {
        self.events == 0
    }
}
