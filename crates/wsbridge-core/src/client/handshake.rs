//! Opening handshake data

use serde::Serialize;
use std::net::SocketAddr;

/// What the transport learned while opening a connection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandshakeInfo {
    /// Request target (path and query)
    resource: String,
    /// Request headers in arrival order
    headers: Vec<(String, String)>,
    /// Peer address, when the transport knows it
    #[serde(skip_serializing_if = "Option::is_none")]
    remote_addr: Option<SocketAddr>,
}

impl HandshakeInfo {
    /// Create handshake info for a resource descriptor such as `/ws?room=1`
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            headers: Vec::new(),
            remote_addr: None,
        }
    }

    /// Add a request header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the peer address
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// The full resource descriptor
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// The path part of the resource descriptor
    pub fn path(&self) -> &str {
        self.resource
            .split_once('?')
            .map_or(self.resource.as_str(), |(path, _)| path)
    }

    /// The query part of the resource descriptor, without the `?`
    pub fn query(&self) -> Option<&str> {
        self.resource.split_once('?').map(|(_, query)| query)
    }

    /// All request headers
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value with the given name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Check whether a header is present (case-insensitive)
    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// The peer address
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }
}
