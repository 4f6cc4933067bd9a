//! Connection handle owned by the transport

use crate::client::ClientId;
use crate::error::ClientError;
use bytes::Bytes;
use std::net::SocketAddr;

/// A live transport connection that listeners can talk back to.
///
/// Implementations must not block: they are called from listener code on the
/// application's consumer thread.
pub trait ClientHandle: Send + Sync {
    /// Transport-assigned connection ID
    fn id(&self) -> ClientId;

    /// Queue a text frame for the client
    fn send_text(&self, text: String) -> Result<(), ClientError>;

    /// Queue a binary frame for the client
    fn send_binary(&self, bytes: Bytes) -> Result<(), ClientError>;

    /// Start closing the connection with a close code and reason
    fn close(&self, code: u16, reason: String) -> Result<(), ClientError>;

    /// Whether the connection is still open
    fn is_open(&self) -> bool;

    /// Peer address, when known
    fn remote_addr(&self) -> Option<SocketAddr> {
        None
    }
}
