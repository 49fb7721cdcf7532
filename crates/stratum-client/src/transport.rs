//! Remote service transport.
//!
//! The driver talks to the service through the [`Transport`] trait: login,
//! operation invocation, logout. [`TcpTransport`] is the production
//! implementation, speaking the framed binary protocol over a blocking TCP
//! socket. Failures surface unchanged; no retry or backoff happens here.

use std::fmt;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use bytes::BytesMut;
use stratum_types::SessionToken;
use stratum_wire::{
    HandshakeRequest, InvokeRequest, LoginRequest, LogoutRequest, PROTOCOL_VERSION, Request,
    RequestId, RequestPayload, Response, ResponsePayload, WireData, WireParam, decode_frame,
};

use crate::client::ClientConfig;
use crate::error::{DriverError, DriverResult};

/// The session and invocation surface the driver consumes.
pub trait Transport {
    /// Authenticates and returns the session credential.
    fn login(
        &mut self,
        username: &str,
        password: &str,
        environment: &str,
    ) -> DriverResult<SessionToken>;

    /// Invokes a remote operation with its ordered parameter list.
    fn invoke(&mut self, op: &str, params: Vec<WireParam>) -> DriverResult<WireData>;

    /// Surrenders the credential and ends the session.
    fn logout(&mut self, token: &SessionToken, environment: &str) -> DriverResult<()>;
}

/// Blocking TCP transport speaking the Stratum wire protocol.
pub struct TcpTransport {
    stream: TcpStream,
    next_request_id: u64,
    read_buf: BytesMut,
    buffer_cap: usize,
}

impl TcpTransport {
    /// Connects and performs the protocol-version handshake.
    pub fn connect(addr: impl ToSocketAddrs, config: &ClientConfig) -> DriverResult<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        let mut transport = Self {
            stream,
            next_request_id: 1,
            read_buf: BytesMut::with_capacity(config.read_buffer_size),
            buffer_cap: config.read_buffer_size,
        };
        transport.handshake()?;
        Ok(transport)
    }

    fn handshake(&mut self) -> DriverResult<()> {
        let response = self.call(RequestPayload::Handshake(HandshakeRequest {
            client_version: PROTOCOL_VERSION,
        }))?;

        match response.payload {
            ResponsePayload::Handshake(h) => {
                if h.server_version != PROTOCOL_VERSION {
                    return Err(DriverError::HandshakeFailed(format!(
                        "protocol version mismatch: client {}, server {}",
                        PROTOCOL_VERSION, h.server_version
                    )));
                }
                Ok(())
            }
            ResponsePayload::Error(e) => Err(DriverError::HandshakeFailed(e.message)),
            other => Err(DriverError::UnexpectedResponse {
                expected: "Handshake",
                actual: format!("{other:?}"),
            }),
        }
    }

    /// Sends a request and waits for its response.
    fn call(&mut self, payload: RequestPayload) -> DriverResult<Response> {
        let request_id = RequestId::new(self.next_request_id);
        self.next_request_id += 1;

        let request = Request::new(request_id, payload);
        let wire_bytes = request.to_frame_bytes()?;
        self.stream.write_all(&wire_bytes)?;
        self.stream.flush()?;

        let response = self.read_response()?;
        if response.id.0 != request_id.0 {
            return Err(DriverError::ResponseMismatch {
                expected: request_id.0,
                received: response.id.0,
            });
        }
        Ok(response)
    }

    fn read_response(&mut self) -> DriverResult<Response> {
        loop {
            if let Some(payload) = decode_frame(&mut self.read_buf)? {
                return Ok(Response::from_frame_payload(&payload)?);
            }

            // Need more data.
            let mut chunk = [0u8; 4096];
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                return Err(DriverError::Connection(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "server closed connection",
                )));
            }
            self.read_buf.extend_from_slice(&chunk[..n]);

            if self.read_buf.len() > self.buffer_cap * 2 {
                return Err(DriverError::Connection(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "response exceeds buffer limit",
                )));
            }
        }
    }
}

impl Transport for TcpTransport {
    fn login(
        &mut self,
        username: &str,
        password: &str,
        environment: &str,
    ) -> DriverResult<SessionToken> {
        let response = self.call(RequestPayload::Login(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
            environment: environment.to_string(),
        }))?;

        match response.payload {
            ResponsePayload::Login(r) => Ok(r.token),
            ResponsePayload::Error(e) => Err(DriverError::Security(e.message)),
            other => Err(DriverError::UnexpectedResponse {
                expected: "Login",
                actual: format!("{other:?}"),
            }),
        }
    }

    fn invoke(&mut self, op: &str, params: Vec<WireParam>) -> DriverResult<WireData> {
        let response = self.call(RequestPayload::Invoke(InvokeRequest {
            op: op.to_string(),
            params,
        }))?;

        match response.payload {
            ResponsePayload::Invoke(r) => Ok(r.result),
            ResponsePayload::Error(e) => Err(DriverError::server(e)),
            other => Err(DriverError::UnexpectedResponse {
                expected: "Invoke",
                actual: format!("{other:?}"),
            }),
        }
    }

    fn logout(&mut self, token: &SessionToken, environment: &str) -> DriverResult<()> {
        let response = self.call(RequestPayload::Logout(LogoutRequest {
            token: token.clone(),
            environment: environment.to_string(),
        }))?;

        match response.payload {
            ResponsePayload::Logout(_) => Ok(()),
            ResponsePayload::Error(e) => Err(DriverError::server(e)),
            other => Err(DriverError::UnexpectedResponse {
                expected: "Logout",
                actual: format!("{other:?}"),
            }),
        }
    }
}

impl fmt::Debug for TcpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TcpTransport")
            .field("next_request_id", &self.next_request_id)
            .finish_non_exhaustive()
    }
}
