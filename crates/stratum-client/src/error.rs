//! Driver error types.

use thiserror::Error;
use stratum_wire::{ErrorCode, ErrorResponse, WireError};

/// Result type for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

/// Errors that can occur during driver operations.
///
/// `Resolution`, `MissingArgument`, and `TimeParse` are caller defects,
/// raised before anything touches the network. The rest surface transport
/// and server failures unchanged; the driver never retries.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The call's arguments match no operation variant, more than one, or
    /// supply the same role twice.
    #[error("cannot resolve `{method}` call: {detail}")]
    Resolution {
        method: &'static str,
        detail: String,
    },

    /// A required role was not supplied positionally or by name.
    #[error("missing required argument `{role}` for `{method}`")]
    MissingArgument {
        method: &'static str,
        role: &'static str,
    },

    /// A textual time expression that could not be parsed.
    #[error("unrecognized time expression `{0}`")]
    TimeParse(String),

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    Security(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(#[from] std::io::Error),

    /// Wire protocol error.
    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    /// Server declared an error for the request.
    #[error("server error ({code:?}): {message}")]
    Server { code: ErrorCode, message: String },

    /// Response ID mismatch.
    #[error("response ID {received} does not match request ID {expected}")]
    ResponseMismatch { expected: u64, received: u64 },

    /// Unexpected response type.
    #[error("unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: String,
    },

    /// Handshake failed.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),
}

impl DriverError {
    pub(crate) fn resolution(method: &'static str, detail: impl Into<String>) -> Self {
        Self::Resolution {
            method,
            detail: detail.into(),
        }
    }

    pub(crate) fn server(error: ErrorResponse) -> Self {
        Self::Server {
            code: error.code,
            message: error.message,
        }
    }
}
