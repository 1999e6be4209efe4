//! Post-handshake control frame loop
//!
//! Owns the upgraded stream for the rest of the connection. Answers every ping with an
//! empty pong until the peer closes the stream.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use super::protocol::{Frame, ProtocolError, MAX_FRAME_LEN};

/// Default size of the per-connection read buffer
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Errors that end a connection
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    #[error("No data received for {0:?}")]
    IdleTimeout(Duration),
}

/// Settings for one loop instance
#[derive(Debug, Clone, Copy)]
pub struct LoopConfig {
    /// Read buffer size in bytes
    pub read_buffer_size: usize,
    /// End the connection when a read waits this long. `None` waits forever.
    pub idle_timeout: Option<Duration>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            idle_timeout: None,
        }
    }
}

/// How a loop ended when the peer closed the connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopSummary {
    /// Number of pongs written
    pub pings_answered: u64,
}

/// Ping/pong loop over an upgraded stream
pub struct ControlFrameLoop<S> {
    stream: S,
    buffer: Vec<u8>,
    filled: usize,
    idle_timeout: Option<Duration>,
    summary: LoopSummary,
}

impl<S> ControlFrameLoop<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a loop that takes ownership of `stream`
    pub fn new(stream: S, config: LoopConfig) -> Self {
        Self {
            stream,
            buffer: vec![0; config.read_buffer_size.max(MAX_FRAME_LEN)],
            filled: 0,
            idle_timeout: config.idle_timeout,
            summary: LoopSummary::default(),
        }
    }

    /// Run until the peer closes the stream.
    ///
    /// A zero-byte read is a normal close and yields the summary. Frames other than empty
    /// pings, I/O failures and idle timeouts end the loop with an error. The stream is
    /// dropped, and so closed, on every exit path.
    pub async fn run(mut self) -> Result<LoopSummary, ConnectionError> {
        loop {
            while let Some((frame, used)) = Frame::decode(&self.buffer[..self.filled])? {
                info!("Ping received");
                debug!("Frame {:?} ({} bytes)", frame, used);

                self.buffer.copy_within(used..self.filled, 0);
                self.filled -= used;

                self.stream.write_all(&Frame::PONG).await?;
                self.stream.flush().await?;
                self.summary.pings_answered += 1;
            }

            if self.read_more().await? == 0 {
                if self.filled > 0 {
                    debug!("Discarding {} bytes of a partial frame", self.filled);
                }
                info!("Connection aborted by peer");
                return Ok(self.summary);
            }
        }
    }

    async fn read_more(&mut self) -> Result<usize, ConnectionError> {
        let read = self.stream.read(&mut self.buffer[self.filled..]);
        let count = match self.idle_timeout {
            Some(limit) => tokio::time::timeout(limit, read)
                .await
                .map_err(|_| ConnectionError::IdleTimeout(limit))??,
            None => read.await?,
        };
        self.filled += count;
        Ok(count)
    }
}
