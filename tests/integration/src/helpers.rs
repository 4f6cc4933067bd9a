//! Test helpers for integration tests
//!
//! Provides a gateway bound to an ephemeral port, a recorder that captures
//! dispatched events, and WebSocket client utilities.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures_util::StreamExt;
use parking_lot::Mutex;
use reqwest::{Client, Response, StatusCode};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use wsbridge_common::{AppConfig, AppResult};
use wsbridge_core::{BridgeEvent, ClientId, ClientRef, EventBridge, EventKind, PollReport};
use wsbridge_gateway::GatewayServer;

/// WebSocket client connected to a test gateway
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How often `poll_until` polls the bridge
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Default time limit for waiting on events
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Listener that keeps a copy of every event it is given
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<BridgeEvent>>>,
}

impl EventRecorder {
    /// Subscribe a new recorder to the bridge
    pub fn attach(bridge: &EventBridge) -> Self {
        let recorder = Self::default();
        let sink = Arc::clone(&recorder.events);
        bridge.subscribe_fn(move |event| {
            sink.lock().push(event.clone());
            Ok(())
        });
        recorder
    }

    /// Everything recorded so far, in dispatch order
    pub fn events(&self) -> Vec<BridgeEvent> {
        self.events.lock().clone()
    }

    /// Kinds of everything recorded so far
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events.lock().iter().map(BridgeEvent::kind).collect()
    }
}

/// Test gateway instance that manages lifecycle
pub struct TestGateway {
    pub addr: SocketAddr,
    pub bridge: Arc<EventBridge>,
    pub recorder: EventRecorder,
    pub http: Client,
    path: String,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<AppResult<()>>>,
}

impl TestGateway {
    /// Start a new test gateway
    pub async fn start() -> Result<Self> {
        Self::start_with_config(test_config()?).await
    }

    /// Start a test gateway with custom config
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let path = config.gateway.path.clone();

        let bridge = EventBridge::new_shared();
        let recorder = EventRecorder::attach(&bridge);

        let server = GatewayServer::bind(config, bridge.clone()).await?;
        let addr = server.local_addr();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run(async move {
            let _ = shutdown_rx.await;
        }));

        let http = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            bridge,
            recorder,
            http,
            path,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// WebSocket URL of the gateway route
    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, self.path)
    }

    /// Base URL for plain HTTP requests
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Open a WebSocket connection to the gateway route
    pub async fn connect(&self) -> Result<WsClient> {
        self.connect_to(&self.ws_url()).await
    }

    /// Open a WebSocket connection to an arbitrary URL
    pub async fn connect_to(&self, url: &str) -> Result<WsClient> {
        let (client, _response) = connect_async(url).await?;
        Ok(client)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.http.get(&url).send().await?)
    }

    /// Run one poll on the bridge
    pub fn poll(&self) -> PollReport {
        self.bridge.poll_and_dispatch()
    }

    /// Poll the bridge until the recorded events satisfy `done`
    pub async fn poll_until<F>(&self, done: F) -> Result<Vec<BridgeEvent>>
    where
        F: Fn(&[BridgeEvent]) -> bool,
    {
        let started = Instant::now();

        loop {
            self.bridge.poll_and_dispatch();

            let events = self.recorder.events();
            if done(&events) {
                return Ok(events);
            }

            if started.elapsed() > EVENT_TIMEOUT {
                anyhow::bail!("Timed out waiting for events, got {:?}", self.recorder.kinds());
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Poll until the given number of events of one kind have been dispatched
    pub async fn wait_for(&self, kind: EventKind, count: usize) -> Result<Vec<BridgeEvent>> {
        self.poll_until(|events| count_kind(events, kind) >= count)
            .await
    }

    /// Stop the gateway and return every event recorded, including the final ones
    pub async fn shutdown(mut self) -> Result<Vec<BridgeEvent>> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.await??;
        }

        self.bridge.poll_and_dispatch();
        Ok(self.recorder.events())
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Create a test configuration on an ephemeral loopback port
pub fn test_config() -> Result<AppConfig> {
    let config = AppConfig::from_lookup(|key| match key {
        "GATEWAY_PORT" => Some("0".to_string()),
        "GATEWAY_SHUTDOWN_TIMEOUT_MS" => Some("2000".to_string()),
        _ => None,
    })
    .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    Ok(config)
}

/// Count events of one kind
pub fn count_kind(events: &[BridgeEvent], kind: EventKind) -> usize {
    events.iter().filter(|event| event.kind() == kind).count()
}

/// Events that belong to one client, in dispatch order
pub fn events_for(events: &[BridgeEvent], client: ClientId) -> Vec<BridgeEvent> {
    events
        .iter()
        .filter(|event| event.client().map(ClientRef::id) == Some(client))
        .cloned()
        .collect()
}

/// Client ID carried by the first `Connect` event after `skip` connects
pub fn connected_client(events: &[BridgeEvent], skip: usize) -> Option<ClientId> {
    events
        .iter()
        .filter(|event| event.kind() == EventKind::Connect)
        .nth(skip)
        .and_then(BridgeEvent::client)
        .map(ClientRef::id)
}

/// Read the next data frame from the client, skipping control frames
pub async fn next_data_frame(client: &mut WsClient) -> Result<Message> {
    let read = async {
        while let Some(msg) = client.next().await {
            match msg {
                Ok(Message::Ping(_) | Message::Pong(_)) => {}
                Ok(other) => return Ok(other),
                Err(e) => return Err(anyhow::Error::from(e)),
            }
        }
        Err(anyhow::anyhow!("Connection ended without a frame"))
    };

    tokio::time::timeout(EVENT_TIMEOUT, read)
        .await
        .map_err(|_| anyhow::anyhow!("Timed out waiting for a frame"))?
}

/// Read until the server ends the connection, answering its close frame
pub async fn drain_until_closed(client: &mut WsClient) {
    let drain = async {
        while let Some(msg) = client.next().await {
            if msg.is_err() {
                break;
            }
        }
    };
    let _ = tokio::time::timeout(EVENT_TIMEOUT, drain).await;
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<Response> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }
    Ok(response)
}
