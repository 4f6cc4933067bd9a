//! Integration test utilities for the bridge
//!
//! This crate provides helpers for running end-to-end tests against a real
//! WebSocket gateway feeding an event bridge.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
