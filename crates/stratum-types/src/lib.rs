//! # stratum-types: Core types for the Stratum driver
//!
//! This crate contains the native-side types shared across the Stratum
//! client:
//! - Session identifiers ([`SessionToken`], [`TransactionId`])
//! - Instants ([`Timestamp`], microseconds since the Unix epoch)
//! - The native tagged value ([`Value`])
//! - Nested result structures ([`Data`], [`DataKey`])
//!
//! Everything here is plain data: no I/O, no wire encoding. The wire-side
//! counterparts live in `stratum-wire`.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Session identifiers
// ============================================================================

/// Opaque credential returned by a successful login.
///
/// Identifies and authorizes the session on every subsequent call. Lives for
/// the lifetime of the client that obtained it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier for a server-side transaction.
///
/// Present only while the session is in a staged transaction; absent in
/// autocommit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(u64);

impl TransactionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TransactionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<TransactionId> for u64 {
    fn from(id: TransactionId) -> Self {
        id.0
    }
}

// ============================================================================
// Timestamp - Copy (8-byte instant)
// ============================================================================

/// An absolute instant, in microseconds since the Unix epoch.
///
/// Signed so that pre-epoch instants coming back from the service remain
/// representable.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    pub const fn as_micros(&self) -> i64 {
        self.0
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(micros: i64) -> Self {
        Self(micros)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

// ============================================================================
// Native values
// ============================================================================

/// A native tagged value.
///
/// This is the type application code reads and writes. Each variant has a
/// canonical wire form; the conversion lives in `stratum-wire`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    /// Boolean value.
    Boolean(bool),
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit floating point.
    Float(f64),
    /// Arbitrary-precision decimal for numbers wider than 64 bits.
    Decimal(BigDecimal),
    /// UTF-8 text.
    Text(String),
    /// Link to another record.
    Link(i64),
    /// Absolute instant (microseconds since epoch).
    Timestamp(Timestamp),
}

impl Value {
    /// Builds a link value pointing at `record`.
    pub fn link(record: i64) -> Self {
        Value::Link(record)
    }

    /// Returns true if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as a bool, if it is a `Boolean`.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Integer`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as an f64, if it is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a decimal, if it is a `Decimal`.
    pub fn as_decimal(&self) -> Option<&BigDecimal> {
        match self {
            Value::Decimal(d) => Some(d),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is `Text`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the linked record, if it is a `Link`.
    pub fn as_link(&self) -> Option<i64> {
        match self {
            Value::Link(record) => Some(*record),
            _ => None,
        }
    }

    /// Returns the value as a `Timestamp`, if it is one.
    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Link(record) => write!(f, "@{record}"),
            Value::Timestamp(ts) => write!(f, "{ts}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<Timestamp> for Value {
    fn from(ts: Timestamp) -> Self {
        Value::Timestamp(ts)
    }
}

// ============================================================================
// Nested result structures
// ============================================================================

/// Key of an entry in a structured result.
///
/// Results come back keyed by field name, by record, or by instant (audit
/// trails). Keys are totally ordered so that maps compare independently of
/// the order entries arrived in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DataKey {
    /// A record identifier.
    Record(i64),
    /// A field name.
    Key(String),
    /// An instant, as in audit trails.
    Timestamp(Timestamp),
}

impl Display for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKey::Record(record) => write!(f, "{record}"),
            DataKey::Key(key) => write!(f, "{key}"),
            DataKey::Timestamp(ts) => write!(f, "{ts}"),
        }
    }
}

impl From<i64> for DataKey {
    fn from(record: i64) -> Self {
        DataKey::Record(record)
    }
}

impl From<&str> for DataKey {
    fn from(key: &str) -> Self {
        DataKey::Key(key.to_string())
    }
}

impl From<Timestamp> for DataKey {
    fn from(ts: Timestamp) -> Self {
        DataKey::Timestamp(ts)
    }
}

/// A structured result returned by a remote operation.
///
/// Either a single value, a list, or a map from [`DataKey`] to nested data.
/// Maps are `BTreeMap`s, so two results with the same entries are equal no
/// matter how the entries were ordered on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Data {
    /// A single value.
    Value(Value),
    /// An ordered list.
    List(Vec<Data>),
    /// A keyed mapping.
    Map(BTreeMap<DataKey, Data>),
}

impl Data {
    /// Returns the inner value, if this is a single value.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Data::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the inner list, if this is a list.
    pub fn as_list(&self) -> Option<&[Data]> {
        match self {
            Data::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the inner map, if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<DataKey, Data>> {
        match self {
            Data::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Returns the scalar boolean, if this wraps one.
    pub fn as_boolean(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_boolean)
    }

    /// Returns the scalar integer, if this wraps one.
    pub fn as_integer(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_integer)
    }
}

impl From<Value> for Data {
    fn from(v: Value) -> Self {
        Data::Value(v)
    }
}
