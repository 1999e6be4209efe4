//! Control frame wire format
//!
//! Only the subset this server speaks: unfragmented ping frames without payload, masked
//! or unmasked, and the matching empty pong.

use thiserror::Error;

const FIN_BIT: u8 = 0b1000_0000;
const RSV_BITS: u8 = 0b0111_0000;
const OPCODE_MASK: u8 = 0b0000_1111;
const MASK_BIT: u8 = 0b1000_0000;
const LENGTH_MASK: u8 = 0b0111_1111;
const MASKING_KEY_LEN: usize = 4;

/// Largest frame the decoder accepts: two header bytes plus a masking key
pub const MAX_FRAME_LEN: usize = 2 + MASKING_KEY_LEN;

// ============================================================================
// Error Types
// ============================================================================

/// A received frame falls outside the supported subset
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unsupported opcode 0x{0:X}")]
    UnsupportedOpcode(u8),

    #[error("Control frame carries a {0} byte payload, only empty pings are supported")]
    UnexpectedPayload(u8),

    #[error("Fragmented control frame")]
    Fragmented,

    #[error("Reserved bits set: 0b{0:03b}")]
    ReservedBits(u8),
}

/// Result type for frame decoding
pub type ProtocolResult<T> = Result<T, ProtocolError>;

// ============================================================================
// Frames
// ============================================================================

/// Frame opcodes, RFC 6455 section 5.2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Ping = 0x9,
    Pong = 0xA,
}

/// A decoded control frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub opcode: Opcode,
    /// Whether the peer masked the frame (clients must, RFC 6455 section 5.3)
    pub masked: bool,
}

impl Frame {
    /// The only frame this server sends: FIN set, opcode pong, no payload
    pub const PONG: [u8; 2] = [FIN_BIT | Opcode::Pong as u8, 0x00];

    /// Decode one frame from the front of `buf`.
    ///
    /// Returns `Ok(None)` when more bytes are needed, otherwise the frame and the
    /// number of bytes it occupied.
    pub fn decode(buf: &[u8]) -> ProtocolResult<Option<(Frame, usize)>> {
        let [first, second, ..] = *buf else {
            return Ok(None);
        };

        let opcode = first & OPCODE_MASK;
        if opcode != Opcode::Ping as u8 {
            return Err(ProtocolError::UnsupportedOpcode(opcode));
        }
        if first & RSV_BITS != 0 {
            return Err(ProtocolError::ReservedBits((first & RSV_BITS) >> 4));
        }
        if first & FIN_BIT == 0 {
            return Err(ProtocolError::Fragmented);
        }

        let length = second & LENGTH_MASK;
        if length != 0 {
            return Err(ProtocolError::UnexpectedPayload(length));
        }

        let masked = second & MASK_BIT != 0;
        let frame_len = if masked { MAX_FRAME_LEN } else { 2 };
        if buf.len() < frame_len {
            return Ok(None);
        }

        Ok(Some((
            Frame {
                opcode: Opcode::Ping,
                masked,
            },
            frame_len,
        )))
    }
}
