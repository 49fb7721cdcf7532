//! # stratum-wire: Binary wire protocol for Stratum
//!
//! This crate defines the wire representation exchanged between a Stratum
//! client and server: framing, the request/response envelope, type-tagged
//! values, and the transcoding between native and wire forms.
//!
//! ## Frame Format
//!
//! ```text
//! ┌─────────┬─────────┬──────────┬──────────┬──────────────────┐
//! │ Magic   │ Version │ Length   │ Checksum │     Payload      │
//! │ (4 B)   │ (2 B)   │ (4 B)    │ (4 B)    │     (var)        │
//! └─────────┴─────────┴──────────┴──────────┴──────────────────┘
//! ```
//!
//! - **Magic**: `0x5354524D` ("STRM")
//! - **Version**: Protocol version (currently 1)
//! - **Length**: Payload length in bytes (max 8 MiB)
//! - **Checksum**: CRC32 of payload
//! - **Payload**: Bincode-encoded message
//!
//! ## Values
//!
//! A [`WireValue`] is a discriminant tag plus a canonical byte payload.
//! [`WireValue::encode`] and [`WireValue::decode`] round-trip losslessly in
//! both directions over the supported native set. Structured results
//! ([`WireData`]) nest values, lists, and keyed maps; [`transcode`] walks
//! them recursively.

mod error;
mod frame;
mod message;
pub mod transcode;
mod value;

pub use error::{WireError, WireResult};
pub use frame::{
    FRAME_HEADER_SIZE, MAGIC, MAX_PAYLOAD_SIZE, PROTOCOL_VERSION, decode_frame, encode_frame,
};
pub use message::{
    ErrorCode, ErrorResponse, HandshakeRequest, HandshakeResponse, InvokeRequest, InvokeResponse,
    LoginRequest, LoginResponse, LogoutRequest, LogoutResponse, Request, RequestId,
    RequestPayload, Response, ResponsePayload, WireData, WireParam,
};
pub use value::{ValueTag, WireValue};
