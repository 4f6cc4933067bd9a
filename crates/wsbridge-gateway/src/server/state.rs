//! Gateway state
//!
//! Application state for the gateway server.

use crate::connection::ConnectionManager;
use std::sync::Arc;
use wsbridge_common::AppConfig;
use wsbridge_core::TransportCallbacks;

/// Gateway application state
///
/// Holds all shared dependencies for the gateway server.
#[derive(Clone)]
pub struct GatewayState {
    /// Receiver of every transport occurrence
    callbacks: Arc<dyn TransportCallbacks>,
    /// Connection manager for WebSocket connections
    connection_manager: Arc<ConnectionManager>,
    /// Application configuration
    config: Arc<AppConfig>,
}

impl GatewayState {
    /// Create a new gateway state
    pub fn new(
        callbacks: Arc<dyn TransportCallbacks>,
        connection_manager: Arc<ConnectionManager>,
        config: AppConfig,
    ) -> Self {
        Self {
            callbacks,
            connection_manager,
            config: Arc::new(config),
        }
    }

    /// Get the transport callbacks
    pub fn callbacks(&self) -> &dyn TransportCallbacks {
        self.callbacks.as_ref()
    }

    /// Get the connection manager
    pub fn connection_manager(&self) -> &Arc<ConnectionManager> {
        &self.connection_manager
    }

    /// Get the application configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayState")
            .field("connection_manager", &self.connection_manager)
            .field("config", &"AppConfig")
            .finish()
    }
}
