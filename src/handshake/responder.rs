//! Switching-protocols response

use std::io;

use tracing::debug;

use super::headers::{CONNECTION, CONNECTION_UPGRADE, SEC_WEBSOCKET_ACCEPT, UPGRADE, UPGRADE_WEBSOCKET};
use super::upgrade::HttpUpgrade;
use super::validator::AcceptedHandshake;

/// Set the handshake response headers and perform the host upgrade.
///
/// Resolves once the host has written the `101` response, yielding the raw stream.
/// No subprotocol or extension headers are ever sent.
pub async fn respond<U: HttpUpgrade>(
    accepted: AcceptedHandshake,
    mut upgrade: U,
) -> io::Result<U::Stream> {
    upgrade.set_response_header(CONNECTION, CONNECTION_UPGRADE.to_string());
    upgrade.set_response_header(UPGRADE, UPGRADE_WEBSOCKET.to_string());
    upgrade.set_response_header(SEC_WEBSOCKET_ACCEPT, accepted.accept_key().to_string());

    debug!("Upgrading connection to websocket");
    upgrade.upgrade().await
}
