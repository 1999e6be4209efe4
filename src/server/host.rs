//! Minimal HTTP/1.1 host
//!
//! Reads one request head, exposes it through the [`HttpUpgrade`] capability and either
//! switches protocols or answers with an empty default response.

use std::future::Future;
use std::io;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::handshake::{HttpUpgrade, IncomingRequest, CONNECTION, CONNECTION_UPGRADE, UPGRADE};

/// Maximum number of header fields accepted in a request head
pub const MAX_HEADERS: usize = 64;

/// Default limit for the size of a request head
pub const DEFAULT_MAX_REQUEST_HEAD: usize = 8 * 1024;

/// Errors that can occur while reading a request
#[derive(Debug, Error)]
pub enum HostError {
    #[error("Failed to read request: {0}")]
    Io(#[from] io::Error),

    #[error("Request head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("Malformed request head: {0}")]
    Malformed(#[from] httparse::Error),

    #[error("Connection closed before the request head was complete")]
    Incomplete,
}

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// One HTTP connection whose request head has been read
pub struct HostConnection<S> {
    request: IncomingRequest,
    reader: BufReader<S>,
    response_headers: Vec<(&'static str, String)>,
}

impl<S> HostConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Read and parse a request head from `stream`.
    ///
    /// Any bytes the client sent after the head stay buffered and are returned first by
    /// the upgraded stream.
    pub async fn read_request(stream: S, max_head: usize) -> HostResult<Self> {
        let mut reader = BufReader::new(stream);
        let mut head = Vec::new();

        loop {
            let before = head.len();
            // One byte past the limit is enough to know the head is too large
            let remaining = max_head.saturating_add(1).saturating_sub(before) as u64;
            let read = (&mut reader)
                .take(remaining)
                .read_until(b'\n', &mut head)
                .await?;
            if read == 0 {
                return Err(HostError::Incomplete);
            }
            if head.len() > max_head {
                return Err(HostError::HeadTooLarge(max_head));
            }

            let line = &head[before..];
            let blank = line == b"\r\n" || line == b"\n";
            // httparse skips empty lines ahead of the request line
            if blank && head[..before].iter().any(|b| !b.is_ascii_whitespace()) {
                break;
            }
        }

        let request = parse_head(&head)?;
        Ok(Self {
            request,
            reader,
            response_headers: Vec::new(),
        })
    }

    /// Answer a request the handshake did not take over.
    ///
    /// Writes an empty `200 OK` and closes the connection.
    pub async fn respond_default(mut self) -> io::Result<()> {
        let stream = self.reader.get_mut();
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
            .await?;
        stream.shutdown().await
    }
}

impl<S> HttpUpgrade for HostConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    type Stream = BufReader<S>;

    fn request(&self) -> &IncomingRequest {
        &self.request
    }

    fn is_upgradable(&self) -> bool {
        self.request.header(UPGRADE).is_some()
            && self
                .request
                .header_has_token(CONNECTION, CONNECTION_UPGRADE)
    }

    fn set_response_header(&mut self, name: &'static str, value: String) {
        self.response_headers.push((name, value));
    }

    fn upgrade(self) -> impl Future<Output = io::Result<BufReader<S>>> + Send {
        async move {
            let mut response = String::from("HTTP/1.1 101 Switching Protocols\r\n");
            for (name, value) in &self.response_headers {
                response.push_str(name);
                response.push_str(": ");
                response.push_str(value);
                response.push_str("\r\n");
            }
            response.push_str("\r\n");

            let mut reader = self.reader;
            reader.get_mut().write_all(response.as_bytes()).await?;
            reader.get_mut().flush().await?;
            Ok(reader)
        }
    }
}

fn parse_head(head: &[u8]) -> HostResult<IncomingRequest> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut parsed = httparse::Request::new(&mut headers);

    match parsed.parse(head)? {
        httparse::Status::Complete(_) => {}
        httparse::Status::Partial => return Err(HostError::Incomplete),
    }

    let mut request = IncomingRequest::new(
        parsed.method.unwrap_or_default(),
        parsed.path.unwrap_or_default(),
    );
    for header in parsed.headers.iter() {
        request.push_header(header.name, String::from_utf8_lossy(header.value));
    }
    Ok(request)
}
