//! Traits at the seams of the bridge
//!
//! The transport implements `ClientHandle` and drives `TransportCallbacks`;
//! the application implements `EventListener`.

mod client_handle;
mod listener;
mod transport;

pub use client_handle::ClientHandle;
pub use listener::{EventListener, FnListener};
pub use transport::TransportCallbacks;
