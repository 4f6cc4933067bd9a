//! # wsbridge-gateway
//!
//! WebSocket transport that feeds an event bridge.

pub mod connection;
pub mod listeners;
pub mod server;

pub use server::{create_app, create_router, GatewayServer, GatewayState, HealthResponse};
