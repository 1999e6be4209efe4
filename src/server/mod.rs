//! WebSocket server module
//!
//! Accepts TCP connections, plays the HTTP host for the opening handshake and hands
//! upgraded streams to the control frame loop.

mod handler;
mod host;
mod websocket;

#[allow(unused_imports)]
pub use handler::*;
#[allow(unused_imports)]
pub use host::*;
pub use websocket::*;
