//! Gateway server setup
//!
//! Provides the WebSocket server, its routes and its lifecycle callbacks.

mod handler;
mod state;

pub use handler::gateway_handler;
pub use state::GatewayState;

use crate::connection::ConnectionManager;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use wsbridge_common::{AppConfig, AppError, AppResult};
use wsbridge_core::{CloseCode, TransportCallbacks, TransportError};

/// Reason reported with the stop event after a graceful shutdown
const SHUTDOWN_REASON: &str = "server shutdown";

/// How long aborted connections get to report their close
const ABORT_GRACE: Duration = Duration::from_millis(500);

/// Health check response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub connections: usize,
}

/// Create the gateway router
pub fn create_router(path: &str) -> Router<GatewayState> {
    Router::new()
        .route(path, get(gateway_handler))
        .route("/health", get(health_check))
}

/// Health check endpoint
async fn health_check(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        connections: state.connection_manager().connection_count(),
    })
}

/// Build the complete application
pub fn create_app(state: GatewayState) -> Router {
    create_router(&state.config().gateway.path)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A bound WebSocket server that reports to a set of transport callbacks
pub struct GatewayServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: GatewayState,
    callbacks: Arc<dyn TransportCallbacks>,
}

impl GatewayServer {
    /// Bind the configured address
    ///
    /// Port 0 binds an ephemeral port; see [`GatewayServer::local_addr`].
    pub async fn bind(config: AppConfig, callbacks: Arc<dyn TransportCallbacks>) -> AppResult<Self> {
        let address = config.gateway.address();

        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| AppError::bind(&address, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AppError::bind(&address, e))?;

        let state = GatewayState::new(
            Arc::clone(&callbacks),
            ConnectionManager::new_shared(),
            config,
        );

        Ok(Self {
            listener,
            local_addr,
            state,
            callbacks,
        })
    }

    /// Address the server is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Connection manager of this server
    pub fn connection_manager(&self) -> Arc<ConnectionManager> {
        Arc::clone(self.state.connection_manager())
    }

    /// Serve until `shutdown` resolves, then close every connection
    ///
    /// Reports `on_start` before accepting and `on_stop` once serving ended.
    pub async fn run<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Self {
            listener,
            local_addr,
            state,
            callbacks,
        } = self;

        let path = state.config().gateway.path.clone();
        let shutdown_timeout = state.config().gateway.shutdown_timeout();
        let manager = Arc::clone(state.connection_manager());

        tracing::info!("Gateway listening on ws://{}{}", local_addr, path);
        callbacks.on_start();

        let app = create_app(state);
        let result = axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await;

        // Upgraded sockets outlive the HTTP server; close them explicitly
        manager.close_all(CloseCode::GoingAway.as_u16(), SHUTDOWN_REASON);
        if !manager.wait_until_empty(shutdown_timeout).await {
            // Peers that never answered still get their disconnect before the stop
            manager.abort_all();
            manager.wait_until_empty(ABORT_GRACE).await;
        }

        match result {
            Ok(()) => {
                tracing::info!("Gateway stopped");
                callbacks.on_stop(
                    CloseCode::GoingAway.as_u16(),
                    SHUTDOWN_REASON.to_string(),
                    false,
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Gateway server failed");
                callbacks.on_fault(None, TransportError::io(&e));
                callbacks.on_stop(CloseCode::InternalError.as_u16(), e.to_string(), false);
                Err(AppError::server(e))
            }
        }
    }
}

impl std::fmt::Debug for GatewayServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayServer")
            .field("local_addr", &self.local_addr)
            .field("state", &self.state)
            .finish()
    }
}
