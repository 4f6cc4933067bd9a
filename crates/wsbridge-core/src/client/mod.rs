//! Client references
//!
//! Opaque, non-owning handles to transport connections, and the handshake
//! data captured when a connection opens.

mod client_ref;
mod handshake;

pub use client_ref::{ClientId, ClientRef};
pub use handshake::HandshakeInfo;
