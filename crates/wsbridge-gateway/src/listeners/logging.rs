//! Logging listener

use wsbridge_core::{BridgeEvent, EventListener, ListenerResult};

/// Logs every event it sees
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingListener;

impl EventListener for LoggingListener {
    fn on_event(&self, event: &BridgeEvent) -> ListenerResult {
        match event {
            BridgeEvent::Error { error, .. } => {
                tracing::warn!(event_kind = %event.kind(), code = error.code(), "{event}");
            }
            BridgeEvent::StringMessage { .. } | BridgeEvent::BinaryMessage { .. } => {
                tracing::debug!(event_kind = %event.kind(), "{event}");
            }
            _ => {
                tracing::info!(event_kind = %event.kind(), "{event}");
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "logging"
    }
}
