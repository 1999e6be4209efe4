//! Header names and fixed values used by the opening handshake

pub const CONNECTION: &str = "Connection";
pub const CONNECTION_UPGRADE: &str = "Upgrade";
pub const HOST: &str = "Host";
pub const SEC_WEBSOCKET_ACCEPT: &str = "Sec-WebSocket-Accept";
pub const SEC_WEBSOCKET_EXTENSIONS: &str = "Sec-WebSocket-Extensions";
pub const SEC_WEBSOCKET_KEY: &str = "Sec-WebSocket-Key";
pub const SEC_WEBSOCKET_PROTOCOL: &str = "Sec-WebSocket-Protocol";
pub const SEC_WEBSOCKET_VERSION: &str = "Sec-WebSocket-Version";
pub const UPGRADE: &str = "Upgrade";
pub const UPGRADE_WEBSOCKET: &str = "websocket";

/// The only protocol version this server speaks
pub const SUPPORTED_VERSION: &str = "13";

/// Decoded length of a well-formed `Sec-WebSocket-Key`
pub const KEY_LENGTH: usize = 16;
