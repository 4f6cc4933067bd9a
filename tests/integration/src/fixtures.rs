//! Test fixtures
//!
//! Listeners with scripted behavior for end-to-end tests.

use wsbridge_core::{BridgeEvent, EventListener, ListenerError, ListenerResult};

/// Closes the sending client when it receives a given text message
pub struct ClosingListener {
    pub trigger: &'static str,
    pub code: u16,
    pub reason: &'static str,
}

impl ClosingListener {
    pub fn new(trigger: &'static str, code: u16, reason: &'static str) -> Self {
        Self {
            trigger,
            code,
            reason,
        }
    }
}

impl EventListener for ClosingListener {
    fn on_event(&self, event: &BridgeEvent) -> ListenerResult {
        if let BridgeEvent::StringMessage { client, text } = event {
            if text == self.trigger {
                client.close(self.code, self.reason)?;
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "closing"
    }
}

/// Panics on every text message and rejects every binary message
pub struct FaultyListener;

impl EventListener for FaultyListener {
    fn on_event(&self, event: &BridgeEvent) -> ListenerResult {
        match event {
            BridgeEvent::StringMessage { text, .. } => panic!("cannot handle {text:?}"),
            BridgeEvent::BinaryMessage { .. } => Err(ListenerError::new("binary not accepted")),
            _ => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "faulty"
    }
}
