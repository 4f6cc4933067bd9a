//! Echo listener

use wsbridge_core::{BridgeEvent, EventListener, ListenerResult};

/// Sends every text and binary message back to the client that sent it
#[derive(Debug, Default, Clone, Copy)]
pub struct EchoListener;

impl EventListener for EchoListener {
    fn on_event(&self, event: &BridgeEvent) -> ListenerResult {
        match event {
            BridgeEvent::StringMessage { client, text } => client.send_text(text.as_str())?,
            BridgeEvent::BinaryMessage { client, bytes } => client.send_binary(bytes.clone())?,
            _ => {}
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "echo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionManager;
    use axum::extract::ws::Message;
    use bytes::Bytes;
    use tokio::sync::mpsc;
    use wsbridge_core::{ClientId, ClientRef};

    #[tokio::test]
    async fn test_echoes_text_and_binary() {
        let manager = ConnectionManager::new();
        let (tx, mut rx) = mpsc::channel(10);
        let conn = manager.add_connection(tx, None);
        let client = ClientRef::new(&conn);

        EchoListener
            .on_event(&BridgeEvent::StringMessage {
                client: client.clone(),
                text: "ping".to_string(),
            })
            .unwrap();
        EchoListener
            .on_event(&BridgeEvent::BinaryMessage {
                client,
                bytes: Bytes::from_static(&[9, 9]),
            })
            .unwrap();

        assert!(matches!(rx.recv().await, Some(Message::Text(t)) if t == "ping"));
        assert!(matches!(rx.recv().await, Some(Message::Binary(b)) if b == vec![9, 9]));
    }

    #[test]
    fn test_echo_to_gone_client_is_listener_error() {
        let err = EchoListener
            .on_event(&BridgeEvent::StringMessage {
                client: ClientRef::detached(5),
                text: "lost".to_string(),
            })
            .unwrap_err();

        assert_eq!(err.message(), format!("Client {} is gone", ClientId::new(5)));
    }

    #[test]
    fn test_ignores_lifecycle_events() {
        assert!(EchoListener.on_event(&BridgeEvent::Start).is_ok());
    }
}
