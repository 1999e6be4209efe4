//! Pong Gate
//!
//! Accepts RFC 6455 opening handshakes and answers WebSocket pings with pongs.

mod config;
mod frame;
mod handshake;
mod server;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use config::FileConfig;
use server::{ServerConfig, WebSocketServer};

const DEFAULT_PORT: u16 = 9000;
const DEFAULT_BIND: &str = "127.0.0.1";

/// Pong Gate
///
/// WebSocket handshake responder that answers pings
#[derive(Parser, Debug)]
#[command(name = "pong-gate")]
#[command(version, about, long_about = None)]
struct Args {
    /// Port to listen on [default: 9000]
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Bind address [default: 127.0.0.1]
    #[arg(long)]
    bind: Option<String>,

    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Close websocket connections idle for this many seconds
    #[arg(long)]
    idle_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Pong Gate v{}", env!("CARGO_PKG_VERSION"));

    let file = match &args.config {
        Some(path) => {
            info!("Loading config from {}", path.display());
            FileConfig::load(path)?
        }
        None => FileConfig::default(),
    };

    let config = build_config(&args, &file);
    if let Some(timeout) = config.connection.loop_config.idle_timeout {
        info!("Idle timeout set to {:?}", timeout);
    }

    // Create and start the WebSocket server
    let server = Arc::new(WebSocketServer::new(config));
    let server_handle = Arc::clone(&server);

    // Spawn shutdown signal handler
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Initiating graceful shutdown...");
        server_handle.shutdown();
    });

    // Run the server
    server.run().await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Merge command line flags over the config file over built-in defaults
fn build_config(args: &Args, file: &FileConfig) -> ServerConfig {
    let section = &file.server;

    let bind = args
        .bind
        .clone()
        .or_else(|| section.bind.clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let port = args.port.or(section.port).unwrap_or(DEFAULT_PORT);
    let idle_timeout = args
        .idle_timeout
        .or(section.idle_timeout_secs)
        .map(Duration::from_secs);

    let mut config = ServerConfig::new(bind, port).with_idle_timeout(idle_timeout);
    if let Some(size) = section.read_buffer_size {
        config = config.with_read_buffer_size(size);
    }
    if let Some(size) = section.max_request_head {
        config = config.with_max_request_head(size);
    }
    config
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["pong-gate"]);
        let config = build_config(&args, &FileConfig::default());
        assert_eq!(config.socket_addr(), "127.0.0.1:9000");
        assert_eq!(config.connection.loop_config.idle_timeout, None);
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig::parse(
            "[server]\nbind = \"0.0.0.0\"\nport = 7000\nidle_timeout_secs = 10\nread_buffer_size = 2048\n",
        )
        .unwrap();

        let args = Args::parse_from(["pong-gate", "--port", "7001"]);
        let config = build_config(&args, &file);
        assert_eq!(config.socket_addr(), "0.0.0.0:7001");
        assert_eq!(
            config.connection.loop_config.idle_timeout,
            Some(Duration::from_secs(10))
        );
        assert_eq!(config.connection.loop_config.read_buffer_size, 2048);

        let args = Args::parse_from(["pong-gate", "--idle-timeout", "3"]);
        let config = build_config(&args, &file);
        assert_eq!(
            config.connection.loop_config.idle_timeout,
            Some(Duration::from_secs(3))
        );
    }
}
