//! Bridge errors - faults reported by transports, listeners and client handles

use crate::client::ClientId;
use thiserror::Error;

/// A fault reported by the transport layer.
///
/// Carried by [`BridgeEvent::Error`](crate::BridgeEvent::Error). Cloneable so the
/// event stays an immutable value that any number of listeners can read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    // =========================================================================
    // Socket Errors
    // =========================================================================
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Handshake failed: {0}")]
    Handshake(String),

    #[error("Send failed: {0}")]
    Send(String),

    // =========================================================================
    // Anything else the transport wants to surface
    // =========================================================================
    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Get an error code string for logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::Protocol(_) => "PROTOCOL_ERROR",
            Self::Handshake(_) => "HANDSHAKE_ERROR",
            Self::Send(_) => "SEND_ERROR",
            Self::Other(_) => "TRANSPORT_ERROR",
        }
    }

    /// The message without the kind prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Io(msg)
            | Self::Protocol(msg)
            | Self::Handshake(msg)
            | Self::Send(msg)
            | Self::Other(msg) => msg,
        }
    }

    /// Build an `Io` fault from a `std::io::Error`
    pub fn io(err: &std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Error returned by a fallible event listener.
///
/// The dispatcher never propagates it; it is recorded as a listener fault
/// and delivery continues with the remaining listeners.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ListenerError {
    message: String,
}

impl ListenerError {
    /// Create a listener error with a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ListenerError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

impl From<&str> for ListenerError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<ClientError> for ListenerError {
    fn from(err: ClientError) -> Self {
        Self::new(err.to_string())
    }
}

/// Result type for listener callbacks
pub type ListenerResult = Result<(), ListenerError>;

/// Errors from talking back to a client through its handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The connection no longer exists
    #[error("Client {0} is gone")]
    Gone(ClientId),

    /// The connection is closing or closed
    #[error("Client {0} is closed")]
    Closed(ClientId),

    /// The outgoing buffer is full
    #[error("Outgoing buffer full for client {0}")]
    Full(ClientId),
}

impl ClientError {
    /// Get an error code string for logs and reports
    pub fn code(&self) -> &'static str {
        match self {
            Self::Gone(_) => "CLIENT_GONE",
            Self::Closed(_) => "CLIENT_CLOSED",
            Self::Full(_) => "CLIENT_BUFFER_FULL",
        }
    }
}
