//! WebSocket handler
//!
//! Upgrades HTTP requests and turns socket activity into transport callbacks.
//! Every connection reports exactly one `on_open` and exactly one `on_close`.

use crate::connection::Connection;
use crate::server::GatewayState;
use axum::{
    extract::{
        ws::{CloseFrame, Message, WebSocket},
        ConnectInfo, State, WebSocketUpgrade,
    },
    http::{HeaderMap, Uri},
    response::IntoResponse,
};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use wsbridge_core::{ClientHandle, ClientRef, CloseCode, HandshakeInfo, TransportError};

/// How long to wait for the peer to answer a close frame the server sent
const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// How a connection ended
#[derive(Debug, Clone, PartialEq, Eq)]
enum CloseOutcome {
    /// The peer sent the first close frame
    Remote { code: u16, reason: String },
    /// The server sent the first close frame
    Local { code: u16, reason: String },
    /// The socket went away without a close handshake
    Abnormal,
}

impl CloseOutcome {
    fn local((code, reason): (u16, String)) -> Self {
        Self::Local { code, reason }
    }

    /// Outcome once the peer's close frame arrives
    fn from_peer_frame(local: Option<(u16, String)>, frame: Option<CloseFrame<'static>>) -> Self {
        if let Some(local) = local {
            // Answer to our own close frame
            return Self::local(local);
        }

        match frame {
            Some(frame) => Self::Remote {
                code: frame.code,
                reason: frame.reason.into_owned(),
            },
            None => Self::Remote {
                code: CloseCode::NoStatus.as_u16(),
                reason: String::new(),
            },
        }
    }

    /// Close code, reason and whether the remote side initiated the close
    fn into_parts(self) -> (u16, String, bool) {
        match self {
            Self::Remote { code, reason } => (code, reason, true),
            Self::Local { code, reason } => (code, reason, false),
            Self::Abnormal => (CloseCode::Abnormal.as_u16(), String::new(), true),
        }
    }
}

/// WebSocket gateway handler
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    uri: Uri,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let remote_addr = connect_info.map(|ConnectInfo(addr)| addr);
    let handshake = handshake_info(&uri, &headers, remote_addr);

    let fault_state = state.clone();
    ws.on_failed_upgrade(move |err: axum::Error| {
        tracing::warn!(error = %err, "WebSocket upgrade failed");
        fault_state
            .callbacks()
            .on_fault(None, TransportError::Handshake(err.to_string()));
    })
    .on_upgrade(move |socket| handle_socket(state, socket, handshake, remote_addr))
}

/// Capture what the opening handshake told us
fn handshake_info(uri: &Uri, headers: &HeaderMap, remote_addr: Option<SocketAddr>) -> HandshakeInfo {
    let resource = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());

    let mut handshake = headers
        .iter()
        .filter_map(|(name, value)| value.to_str().ok().map(|value| (name.as_str(), value)))
        .fold(HandshakeInfo::new(resource), |hs, (name, value)| {
            hs.with_header(name, value)
        });

    if let Some(addr) = remote_addr {
        handshake = handshake.with_remote_addr(addr);
    }

    handshake
}

/// Handle an upgraded WebSocket connection
async fn handle_socket(
    state: GatewayState,
    socket: WebSocket,
    handshake: HandshakeInfo,
    remote_addr: Option<SocketAddr>,
) {
    // Create message channel for outgoing frames
    let (tx, mut rx) = mpsc::channel::<Message>(state.config().bridge.outgoing_buffer);

    // Register connection
    let connection = state.connection_manager().add_connection(tx, remote_addr);
    let client_id = connection.id();
    let client = ClientRef::new(&connection);

    tracing::info!(
        client_id = %client_id,
        resource = handshake.resource(),
        "WebSocket connection established"
    );

    state.callbacks().on_open(client.clone(), handshake);

    // Split the WebSocket
    let (mut ws_sink, mut ws_stream) = socket.split();

    // Spawn task to receive frames from the WebSocket
    let state_recv = state.clone();
    let client_recv = client.clone();
    let connection_recv = Arc::clone(&connection);
    let mut recv_task = tokio::spawn(async move {
        let mut peer_closed = None;

        // Keep reading after a close frame so the close reply gets flushed
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    state_recv
                        .callbacks()
                        .on_text_message(client_recv.clone(), text);
                }
                Ok(Message::Binary(data)) => {
                    state_recv
                        .callbacks()
                        .on_binary_message(client_recv.clone(), Bytes::from(data));
                }
                Ok(Message::Ping(_)) => {
                    tracing::trace!(client_id = %client_id, "Ping received");
                    // Pong is handled automatically by axum
                }
                Ok(Message::Pong(_)) => {
                    tracing::trace!(client_id = %client_id, "Pong received");
                }
                Ok(Message::Close(frame)) => {
                    tracing::debug!(client_id = %client_id, frame = ?frame, "Close frame received");
                    peer_closed = Some(CloseOutcome::from_peer_frame(
                        connection_recv.local_close(),
                        frame,
                    ));
                }
                Err(e) => {
                    if peer_closed.is_some() {
                        break;
                    }
                    tracing::warn!(client_id = %client_id, error = %e, "WebSocket error");
                    state_recv.callbacks().on_fault(
                        Some(client_recv.clone()),
                        TransportError::Protocol(e.to_string()),
                    );
                    return CloseOutcome::Abnormal;
                }
            }
        }

        peer_closed.unwrap_or(CloseOutcome::Abnormal)
    });

    // Spawn task to send queued frames to the WebSocket
    let state_send = state.clone();
    let client_send = client.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));

            if let Err(e) = ws_sink.send(msg).await {
                tracing::warn!(client_id = %client_id, error = %e, "Failed to send frame");
                state_send
                    .callbacks()
                    .on_fault(Some(client_send), TransportError::Send(e.to_string()));
                return;
            }

            if closing {
                return;
            }
        }
    });

    // Wait for either side to finish
    let outcome = tokio::select! {
        result = &mut recv_task => {
            send_task.abort();
            result.unwrap_or(CloseOutcome::Abnormal)
        }
        _ = &mut send_task => {
            // Our close frame is out or the socket broke; let the reader finish
            tokio::select! {
                result = &mut recv_task => result.unwrap_or(CloseOutcome::Abnormal),
                () = tokio::time::sleep(CLOSE_HANDSHAKE_TIMEOUT) => {
                    tracing::debug!(client_id = %client_id, "Close handshake timed out");
                    recv_task.abort();
                    closing_outcome(&connection)
                }
                () = connection.aborted() => {
                    tracing::debug!(client_id = %client_id, "Close handshake abandoned");
                    recv_task.abort();
                    closing_outcome(&connection)
                }
            }
        }
        () = connection.aborted() => {
            tracing::debug!(client_id = %client_id, "Connection aborted");
            recv_task.abort();
            send_task.abort();
            closing_outcome(&connection)
        }
    };

    let (code, reason, was_remote) = outcome.into_parts();

    tracing::info!(
        client_id = %client_id,
        close_code = code,
        was_remote = was_remote,
        "WebSocket connection closed"
    );

    // Report before removal: an empty manager means every close is queued
    state.callbacks().on_close(client, code, reason, was_remote);

    state.connection_manager().remove_connection(client_id);
}

/// Outcome for a connection the reader gave up on
fn closing_outcome(connection: &Connection) -> CloseOutcome {
    connection
        .local_close()
        .map_or(CloseOutcome::Abnormal, CloseOutcome::local)
}
