//! Bridge events
//!
//! Immutable values describing one transport occurrence each.

mod bridge_event;
mod close_code;
mod event_kind;

pub use bridge_event::BridgeEvent;
pub use close_code::CloseCode;
pub use event_kind::EventKind;
