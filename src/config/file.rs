//! Server configuration file
//!
//! Optional TOML file with a `[server]` table. Every key may be omitted.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during config operations
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// `[server]` table
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Address to bind to
    pub bind: Option<String>,
    /// Port to listen on
    pub port: Option<u16>,
    /// Largest accepted request head, in bytes
    pub max_request_head: Option<usize>,
    /// Per-connection read buffer, in bytes
    pub read_buffer_size: Option<usize>,
    /// Close connections that send nothing for this many seconds
    pub idle_timeout_secs: Option<u64>,
}

/// Contents of a config file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
}

impl FileConfig {
    /// Load configuration from `path`. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig = toml::from_str(content)?;
        Ok(config)
    }
}
