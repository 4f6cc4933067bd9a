//! Error types for the bridge core

mod bridge_error;

pub use bridge_error::{ClientError, ListenerError, ListenerResult, TransportError};
