//! The caller-facing driver.

use std::time::Duration;

use tracing::{debug, info};

use stratum_types::{Data, SessionToken, TransactionId};
use stratum_wire::{WireData, WireParam, transcode};

use crate::args::CallArgs;
use crate::error::{DriverError, DriverResult};
use crate::registry::Method;
use crate::resolver;
use crate::transport::{TcpTransport, Transport};

/// Default server port.
pub const DEFAULT_PORT: u16 = 7117;

/// Configuration for a client connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Username to authenticate as.
    pub username: String,
    /// Password for the username.
    pub password: String,
    /// Target environment; empty selects the server default.
    pub environment: String,
    /// Read timeout.
    pub read_timeout: Option<Duration>,
    /// Write timeout.
    pub write_timeout: Option<Duration>,
    /// Buffer size for reads.
    pub read_buffer_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            username: "admin".to_string(),
            password: "admin".to_string(),
            environment: String::new(),
            read_timeout: Some(Duration::from_secs(30)),
            write_timeout: Some(Duration::from_secs(30)),
            read_buffer_size: 64 * 1024,
        }
    }
}

impl ClientConfig {
    /// Sets the server host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the server port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the login credentials.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Sets the target environment.
    #[must_use]
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Sets the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Sets the write timeout.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Sets the read buffer size.
    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }
}

/// Session state carried on every call.
///
/// The transaction identifier is present only between a successful
/// `stage` and the commit or abort that ends it; the environment never
/// changes after connect.
#[derive(Debug)]
pub(crate) struct SessionContext {
    pub(crate) credential: SessionToken,
    pub(crate) transaction: Option<TransactionId>,
    pub(crate) environment: String,
}

/// Driver for a Stratum server.
///
/// One client is one logical session against one endpoint. The client is
/// not internally synchronized: concurrent users should either serialize
/// access or hold one client each.
///
/// # Example
///
/// ```ignore
/// use stratum_client::{CallArgs, Client, ClientConfig};
///
/// let mut client = Client::connect(ClientConfig::default())?;
///
/// // Add a value to a new record and read it back.
/// let record = client.add(CallArgs::new().with("name").with("jane"))?;
/// let record = record.as_integer().unwrap();
/// let name = client.get(CallArgs::new().with("name").with(record))?;
///
/// // Stage, inspect, commit.
/// client.stage()?;
/// client.set(CallArgs::new().with("name").with("janet").with(record))?;
/// client.commit()?;
/// ```
pub struct Client<T: Transport = TcpTransport> {
    pub(crate) transport: T,
    pub(crate) session: SessionContext,
}

impl Client<TcpTransport> {
    /// Connects to a Stratum server, performs the handshake, and logs in.
    pub fn connect(config: ClientConfig) -> DriverResult<Self> {
        let transport = TcpTransport::connect((config.host.as_str(), config.port), &config)?;
        info!(host = %config.host, port = config.port, "connected to stratum server");
        Self::with_transport(transport, &config)
    }
}

impl<T: Transport> Client<T> {
    /// Builds a client over an already-established transport.
    ///
    /// This is the seam for alternative transports; `connect` is the
    /// common path.
    pub fn with_transport(mut transport: T, config: &ClientConfig) -> DriverResult<Self> {
        let credential =
            transport.login(&config.username, &config.password, &config.environment)?;
        info!(
            username = %config.username,
            environment = %config.environment,
            "session established"
        );
        Ok(Self {
            transport,
            session: SessionContext {
                credential,
                transaction: None,
                environment: config.environment.clone(),
            },
        })
    }

    /// The environment this session is bound to.
    pub fn environment(&self) -> &str {
        &self.session.environment
    }

    /// Whether a staged transaction is in progress.
    pub fn in_transaction(&self) -> bool {
        self.session.transaction.is_some()
    }

    /// Add a value to a field if it is not already present.
    ///
    /// Shapes: `(key, value)` adds to a new record and returns its id;
    /// `(key, value, record)` returns whether the value was added;
    /// `(key, value, records)` returns a map from record to that flag.
    pub fn add(&mut self, args: impl Into<CallArgs>) -> DriverResult<Data> {
        self.dispatch(Method::Add, args.into())
    }

    /// Read current or historical values.
    ///
    /// Shapes combine one key or many, one record or many, an optional
    /// criteria expression, and an optional timestamp.
    pub fn get(&mut self, args: impl Into<CallArgs>) -> DriverResult<Data> {
        self.dispatch(Method::Get, args.into())
    }

    /// Atomically replace the values of a field.
    pub fn set(&mut self, args: impl Into<CallArgs>) -> DriverResult<Data> {
        self.dispatch(Method::Set, args.into())
    }

    /// Enumerate the indexed values of one or more keys, optionally at a
    /// historical instant.
    pub fn browse(&mut self, args: impl Into<CallArgs>) -> DriverResult<Data> {
        self.dispatch(Method::Browse, args.into())
    }

    /// Describe changes to a record, or to a field in a record, optionally
    /// bounded by start and end instants.
    pub fn audit(&mut self, args: impl Into<CallArgs>) -> DriverResult<Data> {
        self.dispatch(Method::Audit, args.into())
    }

    /// The server's current clock, or the instant a phrase describes.
    pub fn time(&mut self, args: impl Into<CallArgs>) -> DriverResult<Data> {
        self.dispatch(Method::Time, args.into())
    }

    /// Start a staged transaction.
    ///
    /// Subsequent operations accumulate server-side until `commit` or
    /// `abort`. On failure the session stays in autocommit.
    pub fn stage(&mut self) -> DriverResult<()> {
        let params = vec![
            WireParam::Credential(self.session.credential.clone()),
            WireParam::Environment(self.session.environment.clone()),
        ];
        let raw = self.transport.invoke("stage", params)?;
        let id = expect_integer(raw)?;
        let transaction = TransactionId::new(u64::try_from(id).map_err(|_| {
            DriverError::UnexpectedResponse {
                expected: "transaction id",
                actual: format!("{id}"),
            }
        })?);
        self.session.transaction = Some(transaction);
        debug!(transaction = %transaction, "transaction staged");
        Ok(())
    }

    /// Commit the staged transaction.
    ///
    /// Returns whether the server accepted the staged changes; either way
    /// the session returns to autocommit. On a transport failure the
    /// transaction identifier is retained so the caller can retry or
    /// abort.
    pub fn commit(&mut self) -> DriverResult<bool> {
        let Some(transaction) = self.session.transaction else {
            return Ok(false);
        };
        let params = vec![
            WireParam::Credential(self.session.credential.clone()),
            WireParam::Transaction(Some(transaction)),
            WireParam::Environment(self.session.environment.clone()),
        ];
        let raw = self.transport.invoke("commit", params)?;
        self.session.transaction = None;
        let accepted = expect_boolean(raw)?;
        debug!(transaction = %transaction, accepted, "transaction committed");
        Ok(accepted)
    }

    /// Abort the staged transaction and discard its changes.
    ///
    /// No-op when the session is already in autocommit.
    pub fn abort(&mut self) -> DriverResult<()> {
        if let Some(transaction) = self.session.transaction.take() {
            let params = vec![
                WireParam::Credential(self.session.credential.clone()),
                WireParam::Transaction(Some(transaction)),
                WireParam::Environment(self.session.environment.clone()),
            ];
            self.transport.invoke("abort", params)?;
            debug!(transaction = %transaction, "transaction aborted");
        }
        Ok(())
    }

    /// End the session.
    pub fn logout(mut self) -> DriverResult<()> {
        self.transport
            .logout(&self.session.credential, &self.session.environment)?;
        info!("logged out");
        Ok(())
    }

    fn dispatch(&mut self, method: Method, args: CallArgs) -> DriverResult<Data> {
        let (op, mut params) = resolver::resolve(method, args)?;
        params.push(WireParam::Credential(self.session.credential.clone()));
        params.push(WireParam::Transaction(self.session.transaction));
        params.push(WireParam::Environment(self.session.environment.clone()));

        debug!(method = method.name(), op, "dispatching remote operation");
        let raw = self.transport.invoke(op, params)?;
        Ok(transcode::decode_data(raw)?)
    }
}

fn expect_integer(raw: WireData) -> DriverResult<i64> {
    let data = transcode::decode_data(raw)?;
    data.as_integer()
        .ok_or_else(|| DriverError::UnexpectedResponse {
            expected: "integer result",
            actual: format!("{data:?}"),
        })
}

fn expect_boolean(raw: WireData) -> DriverResult<bool> {
    let data = transcode::decode_data(raw)?;
    data.as_boolean()
        .ok_or_else(|| DriverError::UnexpectedResponse {
            expected: "boolean result",
            actual: format!("{data:?}"),
        })
}
