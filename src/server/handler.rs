//! Per-connection flow
//!
//! request head -> upgradable? -> validate -> 101 + upgrade -> control frame loop

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use super::host::{HostConnection, DEFAULT_MAX_REQUEST_HEAD};
use crate::frame::{ConnectionError, ControlFrameLoop, LoopConfig, LoopSummary, ProtocolError};
use crate::handshake::{respond, validate, HandshakeDecision, HttpUpgrade, RejectReason};

/// Settings applied to every accepted connection
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    /// Largest accepted request head, in bytes
    pub max_request_head: usize,
    /// Settings for the post-upgrade loop
    pub loop_config: LoopConfig,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            max_request_head: DEFAULT_MAX_REQUEST_HEAD,
            loop_config: LoopConfig::default(),
        }
    }
}

/// How a connection ended without a transport failure
#[derive(Debug, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Ordinary HTTP request, answered with the default response
    NotUpgraded,
    /// Upgrade request that failed validation
    Rejected(RejectReason),
    /// Peer closed the websocket
    Closed(LoopSummary),
    /// Peer sent a frame outside the supported subset
    ProtocolViolation(ProtocolError),
    /// Peer went quiet for longer than the idle timeout
    IdleTimeout,
}

/// Serve one connection to completion
pub async fn handle_connection<S>(
    stream: S,
    settings: ConnectionSettings,
) -> anyhow::Result<ConnectionOutcome>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let conn = HostConnection::read_request(stream, settings.max_request_head).await?;
    debug!("{} {}", conn.request().method, conn.request().path);

    if !conn.is_upgradable() {
        conn.respond_default().await?;
        return Ok(ConnectionOutcome::NotUpgraded);
    }

    let accepted = match validate(conn.request()) {
        HandshakeDecision::Accepted(accepted) => accepted,
        HandshakeDecision::Rejected(reason) => {
            debug!("Handshake rejected: {}", reason.as_str());
            conn.respond_default().await?;
            return Ok(ConnectionOutcome::Rejected(reason));
        }
    };

    let stream = respond(accepted, conn).await?;
    info!("WebSocket handshake complete");

    match ControlFrameLoop::new(stream, settings.loop_config).run().await {
        Ok(summary) => {
            debug!("Answered {} pings", summary.pings_answered);
            Ok(ConnectionOutcome::Closed(summary))
        }
        Err(ConnectionError::Protocol(e)) => {
            warn!("Closing connection: {}", e);
            Ok(ConnectionOutcome::ProtocolViolation(e))
        }
        Err(ConnectionError::IdleTimeout(limit)) => {
            info!("Closing idle connection after {:?}", limit);
            Ok(ConnectionOutcome::IdleTimeout)
        }
        Err(e @ ConnectionError::Transport(_)) => Err(e.into()),
    }
}
