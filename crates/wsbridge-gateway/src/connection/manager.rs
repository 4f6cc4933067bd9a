//! Connection manager
//!
//! Owns every active WebSocket connection using DashMap for thread-safe access.
//! Client references handed to listeners only hold weak pointers, so removing
//! a connection here is what ends its lifetime.

use super::Connection;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use wsbridge_core::{ClientHandle, ClientId, ClientRef};

/// How often `wait_until_empty` re-checks the connection count
const DRAIN_CHECK_INTERVAL: Duration = Duration::from_millis(10);

/// Manages all active WebSocket connections
pub struct ConnectionManager {
    /// Active connections by client ID
    connections: DashMap<ClientId, Arc<Connection>>,

    /// Next client ID to assign
    next_id: AtomicU64,
}

impl ConnectionManager {
    /// Create a new connection manager
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Create a new connection manager wrapped in Arc
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Register a new connection under a fresh client ID
    pub fn add_connection(
        &self,
        sender: mpsc::Sender<Message>,
        remote_addr: Option<SocketAddr>,
    ) -> Arc<Connection> {
        let id = ClientId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let connection = Connection::new(id, sender, remote_addr);
        self.connections.insert(id, Arc::clone(&connection));

        tracing::debug!(client_id = %id, remote_addr = ?remote_addr, "Connection added");

        connection
    }

    /// Remove a connection
    pub fn remove_connection(&self, id: ClientId) -> Option<Arc<Connection>> {
        let removed = self.connections.remove(&id).map(|(_, connection)| connection);

        if let Some(connection) = &removed {
            connection.mark_closed();
            tracing::debug!(client_id = %id, "Connection removed");
        }

        removed
    }

    /// Get a connection by client ID
    pub fn get_connection(&self, id: ClientId) -> Option<Arc<Connection>> {
        self.connections.get(&id).map(|r| Arc::clone(r.value()))
    }

    /// Get a client reference for a connection
    pub fn client_ref(&self, id: ClientId) -> Option<ClientRef> {
        self.get_connection(id).map(|connection| ClientRef::new(&connection))
    }

    /// Send a text frame to every open connection
    ///
    /// Returns how many connections accepted the frame.
    pub fn broadcast_text(&self, text: &str) -> usize {
        let sent = self
            .snapshot()
            .iter()
            .filter(|conn| conn.send_text(text.to_string()).is_ok())
            .count();

        tracing::debug!(sent = sent, "Text broadcast to all connections");

        sent
    }

    /// Queue a close frame on every open connection
    ///
    /// Returns how many connections accepted the close.
    pub fn close_all(&self, code: u16, reason: &str) -> usize {
        let mut closed = 0;

        for conn in self.snapshot() {
            match conn.close(code, reason.to_string()) {
                Ok(()) => closed += 1,
                Err(e) => tracing::debug!(
                    client_id = %conn.id(),
                    error = %e,
                    "Could not queue close frame"
                ),
            }
        }

        if closed > 0 {
            tracing::info!(count = closed, close_code = code, "Closing all connections");
        }

        closed
    }

    /// Tear down every connection without waiting for its close handshake
    pub fn abort_all(&self) {
        for conn in self.snapshot() {
            conn.abort();
        }
    }

    /// Wait until every connection has been removed, or the timeout elapses
    ///
    /// Returns `true` if no connection is left.
    pub async fn wait_until_empty(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;

        while !self.connections.is_empty() {
            if Instant::now() >= deadline {
                tracing::warn!(
                    remaining = self.connections.len(),
                    "Connections still open after timeout"
                );
                return false;
            }
            tokio::time::sleep(DRAIN_CHECK_INTERVAL).await;
        }

        true
    }

    /// Get the total number of active connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Get all client IDs
    pub fn client_ids(&self) -> Vec<ClientId> {
        self.connections.iter().map(|r| *r.key()).collect()
    }

    /// Check if a client exists
    pub fn has_client(&self, id: ClientId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Copy out the connections so no shard lock is held while sending
    fn snapshot(&self) -> Vec<Arc<Connection>> {
        self.connections
            .iter()
            .map(|r| Arc::clone(r.value()))
            .collect()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ConnectionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connections", &self.connections.len())
            .finish()
    }
}
