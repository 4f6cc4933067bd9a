//! Gateway Integration Tests
//!
//! Run a real WebSocket gateway on an ephemeral port, drive it with a
//! WebSocket client and check what the bridge dispatches.
//!
//! Run with: cargo test -p integration-tests --test gateway_tests

use futures_util::SinkExt;
use integration_tests::{
    assert_status, connected_client, count_kind, drain_until_closed, events_for,
    next_data_frame, test_config, ClosingListener, FaultyListener, TestGateway,
};
use std::time::{Duration, Instant};
use reqwest::StatusCode;
use tokio_tungstenite::tungstenite::protocol::{frame::coding::CloseCode, CloseFrame};
use tokio_tungstenite::tungstenite::Message;
use wsbridge_core::{BridgeEvent, EventKind};
use wsbridge_gateway::listeners::EchoListener;

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_start_and_stop_events() {
    let gateway = TestGateway::start().await.unwrap();
    gateway.wait_for(EventKind::Start, 1).await.unwrap();

    let events = gateway.shutdown().await.unwrap();

    assert_eq!(events.first(), Some(&BridgeEvent::Start));
    assert_eq!(
        events.last(),
        Some(&BridgeEvent::Stop {
            code: 1001,
            reason: "server shutdown".to_string(),
            was_remote: false,
        })
    );
}

#[tokio::test]
async fn test_health_check() {
    let gateway = TestGateway::start().await.unwrap();

    let response = gateway.get("/health").await.unwrap();
    let body: serde_json::Value = assert_status(response, StatusCode::OK)
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["connections"], 0);

    let _client = gateway.connect().await.unwrap();
    gateway.wait_for(EventKind::Connect, 1).await.unwrap();

    let body: serde_json::Value = gateway.get("/health").await.unwrap().json().await.unwrap();
    assert_eq!(body["connections"], 1);
}

#[tokio::test]
async fn test_plain_http_on_ws_path_is_rejected() {
    let gateway = TestGateway::start().await.unwrap();

    let response = gateway.get("/ws").await.unwrap();
    assert!(response.status().is_client_error());

    gateway.poll();
    assert_eq!(gateway.recorder.kinds(), vec![EventKind::Start]);
}

// ============================================================================
// Client Event Tests
// ============================================================================

#[tokio::test]
async fn test_client_session_event_order() {
    let gateway = TestGateway::start().await.unwrap();
    let url = format!("{}?room=lobby", gateway.ws_url());
    let mut client = gateway.connect_to(&url).await.unwrap();

    client.send(Message::Text("hi".to_string())).await.unwrap();
    client.send(Message::Binary(vec![1, 2, 3])).await.unwrap();
    client
        .close(Some(CloseFrame {
            code: CloseCode::Normal,
            reason: "bye".into(),
        }))
        .await
        .unwrap();
    drain_until_closed(&mut client).await;

    let events = gateway.wait_for(EventKind::Disconnect, 1).await.unwrap();
    let id = connected_client(&events, 0).unwrap();
    let session = events_for(&events, id);

    let kinds: Vec<EventKind> = session.iter().map(BridgeEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Connect,
            EventKind::StringMessage,
            EventKind::BinaryMessage,
            EventKind::Disconnect,
        ]
    );

    let handshake = session[0].handshake().unwrap();
    assert_eq!(handshake.path(), "/ws");
    assert_eq!(handshake.query(), Some("room=lobby"));
    assert!(handshake.has_header("sec-websocket-key"));
    assert!(handshake.remote_addr().is_some());

    assert_eq!(session[1].text(), Some("hi"));
    assert_eq!(session[2].bytes().map(|b| b.to_vec()), Some(vec![1, 2, 3]));

    assert_eq!(session[3].close_code(), Some(1000));
    assert_eq!(session[3].close_reason(), Some("bye"));
    assert_eq!(session[3].was_remote(), Some(true));
}

#[tokio::test]
async fn test_abrupt_disconnect_reports_abnormal_close() {
    let gateway = TestGateway::start().await.unwrap();
    let client = gateway.connect().await.unwrap();
    gateway.wait_for(EventKind::Connect, 1).await.unwrap();

    drop(client);

    let events = gateway.wait_for(EventKind::Disconnect, 1).await.unwrap();
    let disconnect = events
        .iter()
        .find(|event| event.kind() == EventKind::Disconnect)
        .unwrap();

    assert_eq!(disconnect.close_code(), Some(1006));
    assert_eq!(disconnect.was_remote(), Some(true));
}

#[tokio::test]
async fn test_per_client_order_with_concurrent_clients() {
    const CLIENTS: usize = 3;
    const MESSAGES: usize = 50;

    let gateway = TestGateway::start().await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..CLIENTS {
        let mut client = gateway.connect().await.unwrap();
        tasks.push(tokio::spawn(async move {
            for seq in 0..MESSAGES {
                client.send(Message::Text(seq.to_string())).await.unwrap();
            }
            client.close(None).await.unwrap();
            drain_until_closed(&mut client).await;
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let events = gateway
        .wait_for(EventKind::Disconnect, CLIENTS)
        .await
        .unwrap();
    assert_eq!(count_kind(&events, EventKind::StringMessage), CLIENTS * MESSAGES);

    for nth in 0..CLIENTS {
        let id = connected_client(&events, nth).unwrap();
        let texts: Vec<usize> = events_for(&events, id)
            .iter()
            .filter_map(BridgeEvent::text)
            .map(|text| text.parse().unwrap())
            .collect();
        assert_eq!(texts, (0..MESSAGES).collect::<Vec<_>>());
    }
}

// ============================================================================
// Listener Reply Tests
// ============================================================================

#[tokio::test]
async fn test_listener_reply_reaches_client() {
    let gateway = TestGateway::start().await.unwrap();
    gateway.bridge.subscribe(EchoListener);

    let mut client = gateway.connect().await.unwrap();
    client.send(Message::Text("echo me".to_string())).await.unwrap();
    client.send(Message::Binary(vec![7, 7])).await.unwrap();

    gateway
        .wait_for(EventKind::BinaryMessage, 1)
        .await
        .unwrap();

    assert_eq!(
        next_data_frame(&mut client).await.unwrap(),
        Message::Text("echo me".to_string())
    );
    assert_eq!(
        next_data_frame(&mut client).await.unwrap(),
        Message::Binary(vec![7, 7])
    );
}

#[tokio::test]
async fn test_listener_initiated_close() {
    let gateway = TestGateway::start().await.unwrap();
    gateway
        .bridge
        .subscribe(ClosingListener::new("quit", 4000, "requested"));

    let mut client = gateway.connect().await.unwrap();
    client.send(Message::Text("quit".to_string())).await.unwrap();
    gateway.wait_for(EventKind::StringMessage, 1).await.unwrap();

    match next_data_frame(&mut client).await.unwrap() {
        Message::Close(Some(frame)) => {
            assert_eq!(u16::from(frame.code), 4000);
            assert_eq!(frame.reason, "requested");
        }
        other => panic!("expected close frame, got {other:?}"),
    }
    drain_until_closed(&mut client).await;

    let events = gateway.wait_for(EventKind::Disconnect, 1).await.unwrap();
    let disconnect = events
        .iter()
        .find(|event| event.kind() == EventKind::Disconnect)
        .unwrap();

    assert_eq!(disconnect.close_code(), Some(4000));
    assert_eq!(disconnect.close_reason(), Some("requested"));
    assert_eq!(disconnect.was_remote(), Some(false));
}

#[tokio::test]
async fn test_faulty_listener_does_not_stop_delivery() {
    let gateway = TestGateway::start().await.unwrap();
    gateway.bridge.subscribe(FaultyListener);

    let mut client = gateway.connect().await.unwrap();
    client.send(Message::Text("boom".to_string())).await.unwrap();
    client.send(Message::Binary(vec![0])).await.unwrap();
    client.close(None).await.unwrap();
    drain_until_closed(&mut client).await;

    let events = gateway.wait_for(EventKind::Disconnect, 1).await.unwrap();

    assert_eq!(count_kind(&events, EventKind::StringMessage), 1);
    assert_eq!(count_kind(&events, EventKind::BinaryMessage), 1);
    assert_eq!(gateway.bridge.stats().listener_faults, 2);
}

// ============================================================================
// Shutdown Tests
// ============================================================================

#[tokio::test]
async fn test_shutdown_closes_open_clients() {
    let gateway = TestGateway::start().await.unwrap();
    let mut client = gateway.connect().await.unwrap();
    gateway.wait_for(EventKind::Connect, 1).await.unwrap();

    let reader = tokio::spawn(async move {
        let frame = next_data_frame(&mut client).await;
        drain_until_closed(&mut client).await;
        frame
    });

    let events = gateway.shutdown().await.unwrap();

    match reader.await.unwrap().unwrap() {
        Message::Close(Some(frame)) => assert_eq!(frame.code, CloseCode::Away),
        other => panic!("expected close frame, got {other:?}"),
    }

    let kinds: Vec<EventKind> = events.iter().map(BridgeEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Start,
            EventKind::Connect,
            EventKind::Disconnect,
            EventKind::Stop,
        ]
    );

    let disconnect = &events[2];
    assert_eq!(disconnect.close_code(), Some(1001));
    assert_eq!(disconnect.was_remote(), Some(false));
}

#[tokio::test]
async fn test_shutdown_reports_unanswered_close_before_stop() {
    let mut config = test_config().unwrap();
    config.gateway.shutdown_timeout_ms = 200;
    let gateway = TestGateway::start_with_config(config).await.unwrap();

    // Never read from, so the server's close frame is never answered
    let _silent = gateway.connect().await.unwrap();
    gateway.wait_for(EventKind::Connect, 1).await.unwrap();

    let started = Instant::now();
    let events = gateway.shutdown().await.unwrap();
    assert!(started.elapsed() < Duration::from_secs(3));

    let kinds: Vec<EventKind> = events.iter().map(BridgeEvent::kind).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Start,
            EventKind::Connect,
            EventKind::Disconnect,
            EventKind::Stop,
        ]
    );

    let disconnect = &events[2];
    assert_eq!(disconnect.close_code(), Some(1001));
    assert_eq!(disconnect.close_reason(), Some("server shutdown"));
    assert_eq!(disconnect.was_remote(), Some(false));
}
