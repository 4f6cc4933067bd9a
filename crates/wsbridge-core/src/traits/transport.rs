//! Raw transport callbacks
//!
//! The contract between a transport and the bridge. A transport holds an
//! `Arc<dyn TransportCallbacks>` and calls these from whichever threads its
//! I/O runs on, concurrently and in any interleaving.

use crate::client::{ClientRef, HandshakeInfo};
use crate::error::TransportError;
use bytes::Bytes;

/// Entry points a transport invokes for every lifecycle occurrence
pub trait TransportCallbacks: Send + Sync {
    /// The transport started accepting connections
    fn on_start(&self);

    /// The transport stopped
    fn on_stop(&self, code: u16, reason: String, was_remote: bool);

    /// A client completed the opening handshake
    fn on_open(&self, client: ClientRef, handshake: HandshakeInfo);

    /// A client connection closed
    fn on_close(&self, client: ClientRef, code: u16, reason: String, was_remote: bool);

    /// A client sent a text message
    fn on_text_message(&self, client: ClientRef, text: String);

    /// A client sent a binary message
    fn on_binary_message(&self, client: ClientRef, bytes: Bytes);

    /// The transport hit a fault, optionally tied to one client
    fn on_fault(&self, client: Option<ClientRef>, error: TransportError);
}
