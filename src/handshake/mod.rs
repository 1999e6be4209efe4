//! WebSocket opening handshake
//!
//! Validates upgrade requests, derives the accept key and drives the host upgrade.

mod accept;
#[allow(dead_code)]
mod headers;
mod responder;
#[allow(dead_code)]
mod upgrade;
#[allow(dead_code)]
mod validator;

#[allow(unused_imports)]
pub use accept::*;
#[allow(unused_imports)]
pub use headers::*;
pub use responder::*;
pub use upgrade::*;
pub use validator::*;
