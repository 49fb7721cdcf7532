//! Wire protocol error types.

use thiserror::Error;

use crate::value::ValueTag;

/// Result type for wire protocol operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors that can occur while encoding or decoding wire traffic.
#[derive(Debug, Error)]
pub enum WireError {
    /// Invalid magic bytes in the frame header.
    #[error("invalid magic: expected 0x5354524d, got 0x{0:08x}")]
    InvalidMagic(u32),

    /// Unsupported protocol version.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u16),

    /// Payload exceeds the maximum frame size.
    #[error("frame payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: u32, max: u32 },

    /// Frame checksum mismatch.
    #[error("frame checksum mismatch: expected 0x{expected:08x}, got 0x{actual:08x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    /// A tagged value payload that does not decode under its tag.
    #[error("malformed {tag:?} payload: {reason}")]
    MalformedValue { tag: ValueTag, reason: String },

    /// A map key with a tag that cannot key a result mapping.
    #[error("{tag:?} value cannot be used as a result map key")]
    InvalidMapKey { tag: ValueTag },

    /// Message serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Message deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl WireError {
    pub(crate) fn malformed(tag: ValueTag, reason: impl Into<String>) -> Self {
        WireError::MalformedValue {
            tag,
            reason: reason.into(),
        }
    }
}

impl From<bincode::Error> for WireError {
    fn from(e: bincode::Error) -> Self {
        WireError::Deserialization(e.to_string())
    }
}
