//! Type-tagged wire values.
//!
//! Values cross the wire as a discriminant tag plus a canonical byte
//! payload. Fixed-width payloads are big-endian; text and decimals are
//! UTF-8. Because every native value has exactly one canonical encoding,
//! transcoding round-trips losslessly in both directions.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use stratum_types::{Timestamp, Value};

use crate::error::{WireError, WireResult};

/// Discriminant of a wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueTag {
    /// Absent value; empty payload.
    Null,
    /// One byte, 0 or 1.
    Boolean,
    /// 8 bytes, big-endian i64.
    Integer,
    /// 8 bytes, big-endian IEEE-754 bit pattern.
    Float,
    /// UTF-8 of the canonical decimal string.
    Decimal,
    /// UTF-8 text.
    Text,
    /// 8 bytes, big-endian record identifier.
    Link,
    /// 8 bytes, big-endian microseconds since epoch.
    Timestamp,
}

/// A type-tagged value in wire form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireValue {
    tag: ValueTag,
    data: Bytes,
}

impl WireValue {
    #[cfg(test)]
    pub(crate) fn from_parts(tag: ValueTag, data: Bytes) -> Self {
        Self { tag, data }
    }

    /// Returns the discriminant tag.
    pub fn tag(&self) -> ValueTag {
        self.tag
    }

    /// Returns the raw payload bytes.
    pub fn payload(&self) -> &Bytes {
        &self.data
    }

    /// Encodes a native value into its canonical wire form.
    pub fn encode(value: &Value) -> WireValue {
        let (tag, data) = match value {
            Value::Null => (ValueTag::Null, Bytes::new()),
            Value::Boolean(b) => (ValueTag::Boolean, Bytes::copy_from_slice(&[u8::from(*b)])),
            Value::Integer(v) => (ValueTag::Integer, Bytes::copy_from_slice(&v.to_be_bytes())),
            Value::Float(v) => (
                ValueTag::Float,
                Bytes::copy_from_slice(&v.to_bits().to_be_bytes()),
            ),
            // normalized() strips trailing zeros so that equal decimals
            // share one encoding.
            Value::Decimal(d) => (
                ValueTag::Decimal,
                Bytes::from(d.normalized().to_string().into_bytes()),
            ),
            Value::Text(s) => (ValueTag::Text, Bytes::copy_from_slice(s.as_bytes())),
            Value::Link(record) => (ValueTag::Link, Bytes::copy_from_slice(&record.to_be_bytes())),
            Value::Timestamp(ts) => (
                ValueTag::Timestamp,
                Bytes::copy_from_slice(&ts.as_micros().to_be_bytes()),
            ),
        };
        WireValue { tag, data }
    }

    /// Decodes this wire value back into its native form.
    pub fn decode(&self) -> WireResult<Value> {
        match self.tag {
            ValueTag::Null => {
                if self.data.is_empty() {
                    Ok(Value::Null)
                } else {
                    Err(WireError::malformed(self.tag, "payload must be empty"))
                }
            }
            ValueTag::Boolean => match self.data.as_ref() {
                [0] => Ok(Value::Boolean(false)),
                [1] => Ok(Value::Boolean(true)),
                _ => Err(WireError::malformed(self.tag, "payload must be one byte, 0 or 1")),
            },
            ValueTag::Integer => self.fixed8().map(|b| Value::Integer(i64::from_be_bytes(b))),
            ValueTag::Float => self
                .fixed8()
                .map(|b| Value::Float(f64::from_bits(u64::from_be_bytes(b)))),
            ValueTag::Decimal => {
                let text = self.utf8()?;
                let decimal = BigDecimal::from_str(text)
                    .map_err(|e| WireError::malformed(self.tag, e.to_string()))?;
                Ok(Value::Decimal(decimal))
            }
            ValueTag::Text => self.utf8().map(|s| Value::Text(s.to_string())),
            ValueTag::Link => self.fixed8().map(|b| Value::Link(i64::from_be_bytes(b))),
            ValueTag::Timestamp => self
                .fixed8()
                .map(|b| Value::Timestamp(Timestamp::from_micros(i64::from_be_bytes(b)))),
        }
    }

    fn fixed8(&self) -> WireResult<[u8; 8]> {
        <[u8; 8]>::try_from(self.data.as_ref())
            .map_err(|_| WireError::malformed(self.tag, format!("payload must be 8 bytes, got {}", self.data.len())))
    }

    fn utf8(&self) -> WireResult<&str> {
        std::str::from_utf8(&self.data)
            .map_err(|e| WireError::malformed(self.tag, e.to_string()))
    }
}

impl From<&Value> for WireValue {
    fn from(value: &Value) -> Self {
        WireValue::encode(value)
    }
}
