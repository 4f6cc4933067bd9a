//! Listener registry and dispatch
//!
//! Holds the registered observers and runs dispatch passes over them.

mod registry;
mod report;

pub use registry::{ListenerId, ListenerRegistry};
pub use report::{DispatchReport, FaultKind, ListenerFault, PollReport};
