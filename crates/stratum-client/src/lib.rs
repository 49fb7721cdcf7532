//! # stratum-client: RPC client driver for Stratum
//!
//! This crate lets application code perform data operations against a
//! remote Stratum server over the binary wire protocol defined in
//! `stratum-wire`, without caring that one logical operation has many
//! acceptable call shapes.
//!
//! Each logical method (`add`, `get`, `set`, `browse`, `audit`, `time`)
//! accepts positional arguments, named arguments under any registered
//! alias spelling, or a mix where the named bundle trails the positional
//! values. The driver inspects the arguments, picks the one remote
//! operation they describe, converts values to their wire form, and
//! appends the session credential, active transaction, and environment to
//! every dispatch.
//!
//! ## Usage
//!
//! ```ignore
//! use stratum_client::{CallArgs, Client, ClientConfig};
//!
//! let mut client = Client::connect(
//!     ClientConfig::default()
//!         .with_host("db.internal")
//!         .with_credentials("app", "secret")
//!         .with_environment("production"),
//! )?;
//!
//! // One key, one record.
//! let name = client.get(CallArgs::new().with("name").with(42))?;
//!
//! // Many keys, many records, spelled by name.
//! let rows = client.get(
//!     CallArgs::new()
//!         .named("keys", vec!["name", "age"])
//!         .named("records", vec![42, 43]),
//! )?;
//!
//! // Historical read with a human time phrase.
//! let then = client.browse(
//!     CallArgs::new().with("age").named("ts", "3 days ago"),
//! )?;
//!
//! // Transactions.
//! client.stage()?;
//! client.set(CallArgs::new().with("age").with(30).with(42))?;
//! if !client.commit()? {
//!     // staged changes were rejected
//! }
//! ```

mod alias;
mod args;
mod client;
mod error;
mod registry;
mod resolver;
mod time;
mod transport;

pub use alias::Role;
pub use args::{Argument, CallArgs, NamedArgs};
pub use client::{Client, ClientConfig, DEFAULT_PORT};
pub use error::{DriverError, DriverResult};
pub use registry::{Arity, Method, Variant};
pub use time::parse_phrase;
pub use transport::{TcpTransport, Transport};

// Re-export useful types from dependencies
pub use stratum_types::{Data, DataKey, SessionToken, Timestamp, TransactionId, Value};
pub use stratum_wire::{WireData, WireParam, WireValue};

#[cfg(test)]
mod tests;
