//! Individual WebSocket connection
//!
//! Represents a single WebSocket connection and its state. Listeners reach it
//! through a `ClientRef`; every send goes through a bounded channel drained by
//! the connection's writer task, so a listener never waits on the network.

use axum::extract::ws::{CloseFrame, Message};
use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Notify;
use wsbridge_core::{ClientError, ClientHandle, ClientId};

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    /// Handshake done, frames flow both ways
    Open,
    /// The server queued a close frame and waits for the peer
    Closing,
    /// The socket is gone
    Closed,
}

/// A single WebSocket connection
pub struct Connection {
    /// Gateway-assigned ID
    id: ClientId,

    /// Current connection state
    state: RwLock<ConnectionState>,

    /// Channel to send frames to the WebSocket
    sender: mpsc::Sender<Message>,

    /// Close code and reason queued by the server, if it initiated the close
    local_close: Mutex<Option<(u16, String)>>,

    /// Peer address
    remote_addr: Option<SocketAddr>,

    /// Frames accepted for sending
    frames_sent: AtomicU64,

    /// Wakes the socket task when the server gives up on the close handshake
    abort: Notify,
}

impl Connection {
    /// Create a new connection
    pub fn new(
        id: ClientId,
        sender: mpsc::Sender<Message>,
        remote_addr: Option<SocketAddr>,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            state: RwLock::new(ConnectionState::Open),
            sender,
            local_close: Mutex::new(None),
            remote_addr,
            frames_sent: AtomicU64::new(0),
            abort: Notify::new(),
        })
    }

    /// Get the current state
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Mark the socket as gone
    pub fn mark_closed(&self) {
        *self.state.write() = ConnectionState::Closed;
    }

    /// Close code and reason the server sent, if the server initiated the close
    pub fn local_close(&self) -> Option<(u16, String)> {
        self.local_close.lock().clone()
    }

    /// Number of frames accepted for sending
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    /// Stop waiting for the peer and tear the socket down
    ///
    /// A permit is stored if the socket task is not waiting yet.
    pub fn abort(&self) {
        self.abort.notify_one();
    }

    /// Resolves once [`Connection::abort`] was called
    pub async fn aborted(&self) {
        self.abort.notified().await;
    }

    /// Queue a frame without waiting
    fn enqueue(&self, message: Message) -> Result<(), ClientError> {
        if self.state() != ConnectionState::Open {
            return Err(ClientError::Closed(self.id));
        }

        self.push(message)
    }

    fn push(&self, message: Message) -> Result<(), ClientError> {
        match self.sender.try_send(message) {
            Ok(()) => {
                self.frames_sent.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                tracing::warn!(client_id = %self.id, "Outgoing buffer full, frame rejected");
                Err(ClientError::Full(self.id))
            }
            Err(TrySendError::Closed(_)) => Err(ClientError::Closed(self.id)),
        }
    }
}

impl ClientHandle for Connection {
    fn id(&self) -> ClientId {
        self.id
    }

    fn send_text(&self, text: String) -> Result<(), ClientError> {
        self.enqueue(Message::Text(text))
    }

    fn send_binary(&self, bytes: Bytes) -> Result<(), ClientError> {
        self.enqueue(Message::Binary(bytes.to_vec()))
    }

    fn close(&self, code: u16, reason: String) -> Result<(), ClientError> {
        let mut state = self.state.write();
        if *state != ConnectionState::Open {
            return Err(ClientError::Closed(self.id));
        }

        // Recorded before the frame is queued: the peer may answer it at once
        let frame = CloseFrame {
            code,
            reason: reason.clone().into(),
        };
        *self.local_close.lock() = Some((code, reason));
        *state = ConnectionState::Closing;

        if let Err(e) = self.push(Message::Close(Some(frame))) {
            *self.local_close.lock() = None;
            *state = ConnectionState::Open;
            return Err(e);
        }

        tracing::debug!(client_id = %self.id, close_code = code, "Close queued");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open && !self.sender.is_closed()
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("remote_addr", &self.remote_addr)
            .field("frames_sent", &self.frames_sent())
            .finish()
    }
}
