//! Opening handshake validation
//!
//! Decides whether a request is an acceptable RFC 6455 upgrade. Only the method and the
//! `Upgrade`, `Sec-WebSocket-Version` and `Sec-WebSocket-Key` headers are inspected.
//! `Host`, `Origin`, subprotocols and extensions are ignored.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

use super::accept::derive_accept_key;
use super::headers::{
    KEY_LENGTH, SEC_WEBSOCKET_KEY, SEC_WEBSOCKET_VERSION, SUPPORTED_VERSION, UPGRADE,
    UPGRADE_WEBSOCKET,
};
use super::upgrade::IncomingRequest;

/// Standard alphabet with padding, lenient about non-zero trailing bits
const KEY_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Why a request was not upgraded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Method was not GET
    MethodNotGet,
    /// `Upgrade` header missing or not `websocket`
    UpgradeTokenMismatch,
    /// `Sec-WebSocket-Version` missing or not exactly `13`
    UnsupportedVersion,
    /// `Sec-WebSocket-Key` missing, blank, not base64, or not 16 bytes
    InvalidKey,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MethodNotGet => "method is not GET",
            RejectReason::UpgradeTokenMismatch => "upgrade token is not websocket",
            RejectReason::UnsupportedVersion => "unsupported websocket version",
            RejectReason::InvalidKey => "invalid websocket key",
        }
    }
}

/// A validated handshake, carrying the derived accept key.
///
/// Only [`validate`] can build one, so the responder can never be handed a request that
/// failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedHandshake {
    accept_key: String,
}

impl AcceptedHandshake {
    /// Value for the `Sec-WebSocket-Accept` response header
    pub fn accept_key(&self) -> &str {
        &self.accept_key
    }
}

/// Outcome of validating one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandshakeDecision {
    Accepted(AcceptedHandshake),
    Rejected(RejectReason),
}

impl HandshakeDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, HandshakeDecision::Accepted(_))
    }
}

/// Validate a request. Pure; a malformed request is a `Rejected` value, never an error.
pub fn validate(request: &IncomingRequest) -> HandshakeDecision {
    if !request.method.eq_ignore_ascii_case("GET") {
        return HandshakeDecision::Rejected(RejectReason::MethodNotGet);
    }

    let upgrade_ok = request
        .header(UPGRADE)
        .is_some_and(|v| v.eq_ignore_ascii_case(UPGRADE_WEBSOCKET));
    if !upgrade_ok {
        return HandshakeDecision::Rejected(RejectReason::UpgradeTokenMismatch);
    }

    // Exact string match: "013" or "13.0" are not version 13
    if request.header(SEC_WEBSOCKET_VERSION) != Some(SUPPORTED_VERSION) {
        return HandshakeDecision::Rejected(RejectReason::UnsupportedVersion);
    }

    match request.header(SEC_WEBSOCKET_KEY) {
        Some(key) if is_key_valid(key) => HandshakeDecision::Accepted(AcceptedHandshake {
            accept_key: derive_accept_key(key),
        }),
        _ => HandshakeDecision::Rejected(RejectReason::InvalidKey),
    }
}

fn is_key_valid(key: &str) -> bool {
    if key.trim().is_empty() {
        return false;
    }
    // Embedded whitespace is not part of the key
    let compact: String = key.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    KEY_ENGINE
        .decode(compact)
        .map(|raw| raw.len() == KEY_LENGTH)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD as BASE64;

    const SAMPLE_KEY: &str = "dGhlIHNhbXBsZSBub25jZQ==";

    fn handshake_request() -> IncomingRequest {
        IncomingRequest::new("GET", "/chat")
            .with_header("Host", "server.example.com")
            .with_header("Upgrade", "websocket")
            .with_header("Connection", "Upgrade")
            .with_header("Sec-WebSocket-Key", SAMPLE_KEY)
            .with_header("Sec-WebSocket-Version", "13")
    }

    fn with_replaced(name: &str, value: Option<&str>) -> IncomingRequest {
        let base = handshake_request();
        let mut request = IncomingRequest::new(base.method.clone(), base.path.clone());
        for header in ["Host", "Upgrade", "Connection", "Sec-WebSocket-Key", "Sec-WebSocket-Version"] {
            if header.eq_ignore_ascii_case(name) {
                if let Some(v) = value {
                    request.push_header(header, v);
                }
            } else if let Some(v) = base.header(header) {
                request.push_header(header, v);
            }
        }
        request
    }

    #[test]
    fn test_accepts_rfc_sample() {
        match validate(&handshake_request()) {
            HandshakeDecision::Accepted(accepted) => {
                assert_eq!(accepted.accept_key(), "s3pPLMBiTxaQ9kYGzzhZRbK+xOo=");
            }
            other => panic!("Expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let mut request = handshake_request();
        request.method = "get".to_string();
        assert!(validate(&request).is_accepted());
    }

    #[test]
    fn test_rejects_non_get_methods() {
        for method in ["POST", "PUT", "HEAD", "DELETE", "OPTIONS", "CONNECT", ""] {
            let mut request = handshake_request();
            request.method = method.to_string();
            assert_eq!(
                validate(&request),
                HandshakeDecision::Rejected(RejectReason::MethodNotGet),
                "method {:?}",
                method
            );
        }
    }

    #[test]
    fn test_upgrade_header_token() {
        assert!(validate(&with_replaced("Upgrade", Some("WebSocket"))).is_accepted());
        assert_eq!(
            validate(&with_replaced("Upgrade", Some("h2c"))),
            HandshakeDecision::Rejected(RejectReason::UpgradeTokenMismatch)
        );
        assert_eq!(
            validate(&with_replaced("Upgrade", None)),
            HandshakeDecision::Rejected(RejectReason::UpgradeTokenMismatch)
        );
    }

    #[test]
    fn test_connection_header_not_inspected() {
        assert!(validate(&with_replaced("Connection", None)).is_accepted());
        assert!(validate(&with_replaced("Host", None)).is_accepted());
    }

    #[test]
    fn test_version_must_be_exactly_13() {
        assert!(validate(&with_replaced("Sec-WebSocket-Version", Some("13"))).is_accepted());
        for version in [Some("8"), Some("14"), Some(""), Some("013"), None] {
            assert_eq!(
                validate(&with_replaced("Sec-WebSocket-Version", version)),
                HandshakeDecision::Rejected(RejectReason::UnsupportedVersion),
                "version {:?}",
                version
            );
        }
    }

    #[test]
    fn test_key_length_must_be_16_bytes() {
        let fifteen = BASE64.encode([7u8; 15]);
        let seventeen = BASE64.encode([7u8; 17]);
        let sixteen = BASE64.encode([7u8; 16]);

        assert!(validate(&with_replaced("Sec-WebSocket-Key", Some(&sixteen))).is_accepted());
        for key in [fifteen, seventeen] {
            assert_eq!(
                validate(&with_replaced("Sec-WebSocket-Key", Some(&key))),
                HandshakeDecision::Rejected(RejectReason::InvalidKey)
            );
        }
    }

    #[test]
    fn test_key_decoding_is_lenient() {
        // Non-zero trailing bits in the last symbol
        let trailing = "dGhlIHNhbXBsZSBub25jZR==";
        match validate(&with_replaced("Sec-WebSocket-Key", Some(trailing))) {
            HandshakeDecision::Accepted(accepted) => {
                assert_eq!(accepted.accept_key(), derive_accept_key(trailing));
            }
            other => panic!("Expected acceptance, got {:?}", other),
        }

        let spaced = "dGhlIHNhbXBs ZSBub25jZQ==";
        match validate(&with_replaced("Sec-WebSocket-Key", Some(spaced))) {
            HandshakeDecision::Accepted(accepted) => {
                assert_eq!(accepted.accept_key(), derive_accept_key(spaced));
            }
            other => panic!("Expected acceptance, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_keys() {
        for key in [Some("not base64 at all!"), Some("   "), Some(""), None] {
            assert_eq!(
                validate(&with_replaced("Sec-WebSocket-Key", key)),
                HandshakeDecision::Rejected(RejectReason::InvalidKey),
                "key {:?}",
                key
            );
        }
    }
}
