//! Event listener trait

use crate::error::ListenerResult;
use crate::events::BridgeEvent;
use std::sync::Arc;

/// Observer of bridge events.
///
/// Called on the thread that runs the dispatch pass. Returning an error, or
/// panicking, is recorded as a listener fault and does not stop delivery to
/// other listeners.
pub trait EventListener: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &BridgeEvent) -> ListenerResult;

    /// Name used in logs and fault reports
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<L: EventListener + ?Sized> EventListener for Arc<L> {
    fn on_event(&self, event: &BridgeEvent) -> ListenerResult {
        (**self).on_event(event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<L: EventListener + ?Sized> EventListener for Box<L> {
    fn on_event(&self, event: &BridgeEvent) -> ListenerResult {
        (**self).on_event(event)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Adapter that turns a closure into an [`EventListener`]
pub struct FnListener<F> {
    name: String,
    callback: F,
}

impl<F> FnListener<F>
where
    F: Fn(&BridgeEvent) -> ListenerResult + Send + Sync,
{
    /// Wrap a closure under the given name
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback,
        }
    }
}

impl<F> EventListener for FnListener<F>
where
    F: Fn(&BridgeEvent) -> ListenerResult + Send + Sync,
{
    fn on_event(&self, event: &BridgeEvent) -> ListenerResult {
        (self.callback)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> std::fmt::Debug for FnListener<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnListener").field("name", &self.name).finish()
    }
}
