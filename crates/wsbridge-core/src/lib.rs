//! # wsbridge-core
//!
//! Event taxonomy, event queue, listener registry and the transport bridge.
//! This crate has no dependency on a concrete transport or async runtime.

pub mod bridge;
pub mod client;
pub mod error;
pub mod events;
pub mod listener;
pub mod queue;
pub mod traits;

// Re-export commonly used types at crate root
pub use bridge::{BridgeStats, EventBridge};
pub use client::{ClientId, ClientRef, HandshakeInfo};
pub use error::{ClientError, ListenerError, ListenerResult, TransportError};
pub use events::{BridgeEvent, CloseCode, EventKind};
pub use listener::{
    DispatchReport, FaultKind, ListenerFault, ListenerId, ListenerRegistry, PollReport,
};
pub use queue::EventQueue;
pub use traits::{ClientHandle, EventListener, FnListener, TransportCallbacks};
