//! WebSocket server implementation
//!
//! Listens on a configurable address and serves every accepted TCP connection on its
//! own task.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use super::handler::{handle_connection, ConnectionOutcome, ConnectionSettings};

/// Configuration for the WebSocket server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind: String,
    /// Port to listen on
    pub port: u16,
    /// Settings applied to each connection
    pub connection: ConnectionSettings,
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(bind: String, port: u16) -> Self {
        Self {
            bind,
            port,
            connection: ConnectionSettings::default(),
        }
    }

    /// Set the idle timeout for upgraded connections
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connection.loop_config.idle_timeout = timeout;
        self
    }

    /// Set the per-connection read buffer size
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.connection.loop_config.read_buffer_size = size;
        self
    }

    /// Set the request head size limit
    pub fn with_max_request_head(mut self, size: usize) -> Self {
        self.connection.max_request_head = size;
        self
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// WebSocket server answering pings on upgraded connections
pub struct WebSocketServer {
    config: ServerConfig,
    shutdown_tx: broadcast::Sender<()>,
}

impl WebSocketServer {
    /// Create a new WebSocket server
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            config,
            shutdown_tx,
        }
    }

    /// Trigger server shutdown
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self) -> anyhow::Result<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("WebSocket server listening on ws://{}", addr);
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until shutdown
    ///
    /// Open connections are dropped, closing their streams, when the shutdown signal
    /// arrives.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                // Accept new connections
                result = listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let settings = self.config.connection;
                            let shutdown_rx = self.shutdown_tx.subscribe();
                            let span = info_span!("connection", id = %Uuid::new_v4(), peer = %peer_addr);

                            tokio::spawn(
                                serve_connection(stream, peer_addr, settings, shutdown_rx)
                                    .instrument(span),
                            );
                        }
                        Err(e) => {
                            error!("Failed to accept connection: {}", e);
                        }
                    }
                }
                // Handle shutdown signal
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received, stopping server");
                    break;
                }
            }
        }

        Ok(())
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    settings: ConnectionSettings,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!("New connection from {}", peer_addr);

    tokio::select! {
        result = handle_connection(stream, settings) => {
            match result {
                Ok(ConnectionOutcome::Closed(summary)) => {
                    info!("Connection from {} closed after {} pings", peer_addr, summary.pings_answered);
                }
                Ok(outcome) => {
                    info!("Connection from {} finished: {:?}", peer_addr, outcome);
                }
                Err(e) => {
                    error!("Connection error from {}: {}", peer_addr, e);
                }
            }
        }
        _ = shutdown_rx.recv() => {
            info!("Shutdown signal received, closing connection to {}", peer_addr);
        }
    }
}
