//! Connection management
//!
//! Owns WebSocket connections and exposes them to listeners as client handles.

mod connection;
mod manager;

pub use connection::{Connection, ConnectionState};
pub use manager::ConnectionManager;
