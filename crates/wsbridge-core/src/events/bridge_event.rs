//! Bridge event values

use super::EventKind;
use crate::client::{ClientRef, HandshakeInfo};
use crate::error::TransportError;
use bytes::Bytes;
use std::fmt;

/// One transport occurrence.
///
/// Each variant carries only the fields its kind needs. Events are built once
/// by the bridge and never mutated afterwards, so listeners read them without
/// synchronization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    /// The transport started accepting connections
    Start,

    /// The transport stopped
    Stop {
        code: u16,
        reason: String,
        was_remote: bool,
    },

    /// A client finished the opening handshake
    Connect {
        client: ClientRef,
        handshake: HandshakeInfo,
    },

    /// A client connection closed
    Disconnect {
        client: ClientRef,
        code: u16,
        reason: String,
        was_remote: bool,
    },

    /// A client sent a text message
    StringMessage { client: ClientRef, text: String },

    /// A client sent a binary message
    BinaryMessage { client: ClientRef, bytes: Bytes },

    /// The transport reported a fault, optionally tied to one client
    Error {
        client: Option<ClientRef>,
        error: TransportError,
    },
}

impl BridgeEvent {
    /// Get the event kind
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Start => EventKind::Start,
            Self::Stop { .. } => EventKind::Stop,
            Self::Connect { .. } => EventKind::Connect,
            Self::Disconnect { .. } => EventKind::Disconnect,
            Self::StringMessage { .. } => EventKind::StringMessage,
            Self::BinaryMessage { .. } => EventKind::BinaryMessage,
            Self::Error { .. } => EventKind::Error,
        }
    }

    /// The client involved, for kinds that have one
    pub fn client(&self) -> Option<&ClientRef> {
        match self {
            Self::Connect { client, .. }
            | Self::Disconnect { client, .. }
            | Self::StringMessage { client, .. }
            | Self::BinaryMessage { client, .. } => Some(client),
            Self::Error { client, .. } => client.as_ref(),
            Self::Start | Self::Stop { .. } => None,
        }
    }

    /// Handshake data of a `Connect` event
    pub fn handshake(&self) -> Option<&HandshakeInfo> {
        match self {
            Self::Connect { handshake, .. } => Some(handshake),
            _ => None,
        }
    }

    /// Text of a `StringMessage` event
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::StringMessage { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Payload of a `BinaryMessage` event
    pub fn bytes(&self) -> Option<&Bytes> {
        match self {
            Self::BinaryMessage { bytes, .. } => Some(bytes),
            _ => None,
        }
    }

    /// Close code of a `Stop` or `Disconnect` event
    pub fn close_code(&self) -> Option<u16> {
        match self {
            Self::Stop { code, .. } | Self::Disconnect { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Close reason of a `Stop` or `Disconnect` event
    pub fn close_reason(&self) -> Option<&str> {
        match self {
            Self::Stop { reason, .. } | Self::Disconnect { reason, .. } => Some(reason),
            _ => None,
        }
    }

    /// Whether the remote side initiated a `Stop` or `Disconnect`
    pub fn was_remote(&self) -> Option<bool> {
        match self {
            Self::Stop { was_remote, .. } | Self::Disconnect { was_remote, .. } => {
                Some(*was_remote)
            }
            _ => None,
        }
    }

    /// Fault carried by an `Error` event
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Error { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl fmt::Display for BridgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Stop {
                code,
                reason,
                was_remote,
            } => write!(f, "stop code={code} reason={reason:?} remote={was_remote}"),
            Self::Connect { client, handshake } => {
                write!(f, "connect {client} resource={}", handshake.resource())
            }
            Self::Disconnect {
                client,
                code,
                reason,
                was_remote,
            } => write!(
                f,
                "disconnect {client} code={code} reason={reason:?} remote={was_remote}"
            ),
            Self::StringMessage { client, text } => {
                write!(f, "message-string {client} len={}", text.len())
            }
            Self::BinaryMessage { client, bytes } => {
                write!(f, "message-buffer {client} len={}", bytes.len())
            }
            Self::Error {
                client: Some(client),
                error,
            } => write!(f, "exception {client}: {error}"),
            Self::Error {
                client: None,
                error,
            } => write!(f, "exception: {error}"),
        }
    }
}
