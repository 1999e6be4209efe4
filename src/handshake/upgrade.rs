//! Host-facing types: the parsed request and the upgrade capability
//!
//! The handshake code only ever sees these two types, never a concrete HTTP server.

use std::future::Future;
use std::io;

use tokio::io::{AsyncRead, AsyncWrite};

/// A parsed HTTP request head, read-only from the handshake's point of view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingRequest {
    /// Request method as sent by the client
    pub method: String,
    /// Request target
    pub path: String,
    /// Header fields in arrival order
    headers: Vec<(String, String)>,
}

impl IncomingRequest {
    /// Create a request with no headers
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header (builder style). Values are stored trimmed.
    pub fn with_header(mut self, name: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.push_header(name, value);
        self
    }

    /// Add a header. Values are stored trimmed.
    pub fn push_header(&mut self, name: impl Into<String>, value: impl AsRef<str>) {
        self.headers
            .push((name.into(), value.as_ref().trim().to_string()));
    }

    /// First value of a header, looked up case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether a comma-separated header carries `token` (case-insensitive)
    pub fn header_has_token(&self, name: &str, token: &str) -> bool {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .flat_map(|(_, v)| v.split(','))
            .any(|t| t.trim().eq_ignore_ascii_case(token))
    }
}

/// Upgrade capability offered by the HTTP host for a single request
///
/// `upgrade` consumes the capability, so a request can be upgraded at most once.
pub trait HttpUpgrade {
    /// Raw duplex stream handed out after the upgrade
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// The request this capability belongs to
    fn request(&self) -> &IncomingRequest;

    /// Whether the host is able to switch protocols for this request at all
    fn is_upgradable(&self) -> bool;

    /// Set a header on the pending `101 Switching Protocols` response
    fn set_response_header(&mut self, name: &'static str, value: String);

    /// Send the switching-protocols response and hand over the raw stream
    fn upgrade(self) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}
