//! `Sec-WebSocket-Accept` derivation
//!
//! base64(SHA-1(key + GUID)) as described in RFC 6455 section 4.2.2.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use sha1::{Digest, Sha1};

/// GUID appended to the client key before hashing
pub const WS_GUID: &str = "258EAFA5-E914-47DA-95CA-C5AB0DC85B11";

/// Compute the accept value for a raw `Sec-WebSocket-Key` header value.
///
/// The key is hashed as given. It is never decoded here, so this is total over any
/// string, including keys the validator would reject.
pub fn derive_accept_key(key: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(key.as_bytes());
    hasher.update(WS_GUID.as_bytes());
    BASE64.encode(hasher.finalize())
}
