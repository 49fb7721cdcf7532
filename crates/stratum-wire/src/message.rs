//! Request and response message types for the wire protocol.
//!
//! Messages are serialized with bincode and carried inside a frame. Each
//! request names either a session-lifecycle action (handshake, login,
//! logout) or a remote operation invocation with its ordered parameters.

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use stratum_types::{SessionToken, TransactionId};

use crate::error::WireResult;
use crate::frame;
use crate::value::WireValue;

/// Unique identifier for a request, used to match responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Creates a new request ID.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

// ============================================================================
// Parameters
// ============================================================================

/// One position in an operation's ordered parameter list.
///
/// The final three positions of every invocation are always
/// `Credential`, `Transaction`, and `Environment`, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireParam {
    /// A single tagged value.
    Value(WireValue),
    /// A collection of tagged values.
    List(Vec<WireValue>),
    /// The session credential.
    Credential(SessionToken),
    /// The active transaction, absent in autocommit mode.
    Transaction(Option<TransactionId>),
    /// The target environment name.
    Environment(String),
}

/// A structured operation result in wire form.
///
/// Maps are ordered pair lists on the wire; the native side rebuilds them
/// into keyed maps whose equality does not depend on pair order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireData {
    /// A single tagged value.
    Value(WireValue),
    /// An ordered list of nested results.
    List(Vec<WireData>),
    /// A mapping from tagged key to nested result.
    Map(Vec<(WireValue, WireData)>),
}

// ============================================================================
// Request Types
// ============================================================================

/// A client request to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Unique request identifier.
    pub id: RequestId,
    /// The request payload.
    pub payload: RequestPayload,
}

impl Request {
    /// Creates a new request.
    pub fn new(id: RequestId, payload: RequestPayload) -> Self {
        Self { id, payload }
    }

    /// Encodes the request into a complete frame.
    pub fn to_frame_bytes(&self) -> WireResult<Bytes> {
        encode_message(self)
    }

    /// Decodes a request from a frame payload.
    pub fn from_frame_payload(payload: &[u8]) -> WireResult<Self> {
        Ok(bincode::deserialize(payload)?)
    }
}

/// Request payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RequestPayload {
    /// Handshake to agree on a protocol version.
    Handshake(HandshakeRequest),
    /// Authenticate and obtain a session credential.
    Login(LoginRequest),
    /// Invoke a remote operation.
    Invoke(InvokeRequest),
    /// End the session.
    Logout(LogoutRequest),
}

/// Handshake request sent before anything else on a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeRequest {
    /// Client protocol version.
    pub client_version: u16,
}

/// Login request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Username to authenticate as.
    pub username: String,
    /// Password for the username.
    pub password: String,
    /// Target environment; empty selects the server default.
    pub environment: String,
}

/// Remote operation invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeRequest {
    /// Wire operation identifier.
    pub op: String,
    /// Ordered parameter list.
    pub params: Vec<WireParam>,
}

/// Logout request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoutRequest {
    /// The credential being surrendered.
    pub token: SessionToken,
    /// Environment the credential was issued for.
    pub environment: String,
}

// ============================================================================
// Response Types
// ============================================================================

/// A server response to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Identifier of the request this responds to.
    pub id: RequestId,
    /// The response payload.
    pub payload: ResponsePayload,
}

impl Response {
    /// Creates a new response.
    pub fn new(id: RequestId, payload: ResponsePayload) -> Self {
        Self { id, payload }
    }

    /// Encodes the response into a complete frame.
    pub fn to_frame_bytes(&self) -> WireResult<Bytes> {
        encode_message(self)
    }

    /// Decodes a response from a frame payload.
    pub fn from_frame_payload(payload: &[u8]) -> WireResult<Self> {
        Ok(bincode::deserialize(payload)?)
    }
}

/// Response payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponsePayload {
    /// Handshake accepted.
    Handshake(HandshakeResponse),
    /// Login succeeded.
    Login(LoginResponse),
    /// Invocation result.
    Invoke(InvokeResponse),
    /// Session ended.
    Logout(LogoutResponse),
    /// The request failed.
    Error(ErrorResponse),
}

/// Handshake response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeResponse {
    /// Server protocol version.
    pub server_version: u16,
}

/// Login response carrying the session credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Credential for subsequent calls.
    pub token: SessionToken,
}

/// Invocation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    /// The operation's structured result.
    pub result: WireData,
}

/// Logout response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoutResponse {}

/// Error categories a server may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    /// Authentication rejected.
    InvalidCredentials,
    /// Authenticated but not authorized.
    PermissionDenied,
    /// The wire operation identifier is not recognized.
    UnknownOperation,
    /// A parameter failed server-side validation.
    InvalidParameter,
    /// The staged transaction conflicted and was discarded.
    TransactionConflict,
    /// Internal server failure.
    InternalError,
}

/// Error response with a remote-declared message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error category.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
}

fn encode_message<T: Serialize>(message: &T) -> WireResult<Bytes> {
    let body = bincode::serialize(message)
        .map_err(|e| crate::error::WireError::Serialization(e.to_string()))?;
    let mut buf = BytesMut::new();
    frame::encode_frame(&body, &mut buf);
    Ok(buf.freeze())
}
