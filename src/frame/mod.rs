//! WebSocket frames after the upgrade
//!
//! A deliberately small subset: ping in, pong out.

mod control;
#[allow(dead_code)]
mod protocol;

pub use control::*;
pub use protocol::*;
