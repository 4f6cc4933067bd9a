//! Event kinds
//!
//! Stable names for every event variant, used in logs and reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discriminant of a [`BridgeEvent`](crate::BridgeEvent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Transport started listening
    #[serde(rename = "start")]
    Start,
    /// Transport stopped
    #[serde(rename = "stop")]
    Stop,
    /// Client connected
    #[serde(rename = "connect")]
    Connect,
    /// Client disconnected
    #[serde(rename = "disconnect")]
    Disconnect,
    /// Text frame received
    #[serde(rename = "message-string")]
    StringMessage,
    /// Binary frame received
    #[serde(rename = "message-buffer")]
    BinaryMessage,
    /// Transport fault
    #[serde(rename = "exception")]
    Error,
}

impl EventKind {
    /// Every kind, in lifecycle order
    pub const ALL: [Self; 7] = [
        Self::Start,
        Self::Stop,
        Self::Connect,
        Self::Disconnect,
        Self::StringMessage,
        Self::BinaryMessage,
        Self::Error,
    ];

    /// Get the string representation of the event kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::StringMessage => "message-string",
            Self::BinaryMessage => "message-buffer",
            Self::Error => "exception",
        }
    }

    /// Parse an event kind from a string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Whether this kind concerns a single client connection
    #[must_use]
    pub const fn is_client_scoped(self) -> bool {
        matches!(
            self,
            Self::Connect | Self::Disconnect | Self::StringMessage | Self::BinaryMessage
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<EventKind> for String {
    fn from(kind: EventKind) -> Self {
        kind.as_str().to_string()
    }
}
