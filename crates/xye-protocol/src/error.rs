//! Protocol error types.

use thiserror::Error;

/// Errors that can occur when working with the XYE protocol types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Maximum frame length is too small to hold a start byte and one more byte.
    #[error("invalid maximum frame length: {0} (must be at least 2)")]
    InvalidMaxLength(usize),

    /// Packet is too short to contain a header and at least one frame byte.
    #[error("packet too short: expected at least {expected} bytes, got {actual}")]
    PacketTooShort {
        /// Expected minimum length.
        expected: usize,
        /// Actual length received.
        actual: usize,
    },

    /// Packet does not start with the `HVAC_shark` tag.
    #[error("bad packet magic")]
    BadMagic,

    /// Reserved header byte is not zero.
    #[error("reserved header byte is 0x{0:02X}, expected 0x00")]
    NonZeroReserved(u8),
}

/// Result type alias for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
