//! Client reference
//!
//! A `ClientRef` names one transport connection. The connection itself is
//! owned by the transport; the reference only holds a `Weak` back-pointer,
//! so it never keeps a closed connection alive.

use crate::error::ClientError;
use crate::traits::ClientHandle;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

/// Transport-assigned connection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(u64);

impl ClientId {
    /// Create a client ID from a raw value
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw value
    #[must_use]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ClientId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Opaque reference to a single transport connection.
///
/// Equality and hashing use the [`ClientId`] only. The bridge never looks
/// behind the reference; listeners may use it to reply while the connection
/// still exists.
#[derive(Clone)]
pub struct ClientRef {
    id: ClientId,
    handle: Option<Weak<dyn ClientHandle>>,
}

impl ClientRef {
    /// Create a reference to a live connection handle
    pub fn new<H: ClientHandle + 'static>(handle: &Arc<H>) -> Self {
        let weak: Weak<dyn ClientHandle> = Arc::downgrade(handle) as Weak<dyn ClientHandle>;
        Self {
            id: handle.id(),
            handle: Some(weak),
        }
    }

    /// Create a reference with no connection behind it
    ///
    /// Useful for transports that cannot reply, and for tests.
    #[must_use]
    pub fn detached(id: u64) -> Self {
        Self {
            id: ClientId(id),
            handle: None,
        }
    }

    /// Get the client ID
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Get the live connection handle, if the connection still exists
    pub fn upgrade(&self) -> Option<Arc<dyn ClientHandle>> {
        self.handle.as_ref().and_then(Weak::upgrade)
    }

    /// Check whether the connection still exists and is open
    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some_and(|handle| handle.is_open())
    }

    /// Send a text frame to the client
    pub fn send_text(&self, text: impl Into<String>) -> Result<(), ClientError> {
        self.live()?.send_text(text.into())
    }

    /// Send a binary frame to the client
    pub fn send_binary(&self, bytes: impl Into<Bytes>) -> Result<(), ClientError> {
        self.live()?.send_binary(bytes.into())
    }

    /// Ask the transport to close the connection
    pub fn close(&self, code: u16, reason: impl Into<String>) -> Result<(), ClientError> {
        self.live()?.close(code, reason.into())
    }

    fn live(&self) -> Result<Arc<dyn ClientHandle>, ClientError> {
        self.upgrade().ok_or(ClientError::Gone(self.id))
    }
}

impl PartialEq for ClientRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ClientRef {}

impl Hash for ClientRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientRef")
            .field("id", &self.id)
            .field(
                "attached",
                &self.handle.as_ref().is_some_and(|weak| weak.strong_count() > 0),
            )
            .finish()
    }
}

impl fmt::Display for ClientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client#{}", self.id)
    }
}
