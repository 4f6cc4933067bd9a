//! Transport bridge
//!
//! Turns raw transport callbacks into queued events and dispatches them when
//! the application polls.

mod event_bridge;

pub use event_bridge::{BridgeStats, EventBridge};
