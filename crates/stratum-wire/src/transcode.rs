//! Conversion between native result structures and their wire form.
//!
//! Containers are transcoded recursively, element-wise. Wire maps are
//! ordered pair lists; decoding folds them into a `BTreeMap`, so the order
//! pairs arrive in never affects what the caller observes.

use std::collections::BTreeMap;

use stratum_types::{Data, DataKey, Value};

use crate::error::{WireError, WireResult};
use crate::message::WireData;
use crate::value::WireValue;

/// Decodes a wire result into its native form.
pub fn decode_data(wire: WireData) -> WireResult<Data> {
    match wire {
        WireData::Value(v) => Ok(Data::Value(v.decode()?)),
        WireData::List(items) => {
            let mut decoded = Vec::with_capacity(items.len());
            for item in items {
                decoded.push(decode_data(item)?);
            }
            Ok(Data::List(decoded))
        }
        WireData::Map(pairs) => {
            let mut map = BTreeMap::new();
            for (key, nested) in pairs {
                map.insert(decode_key(&key)?, decode_data(nested)?);
            }
            Ok(Data::Map(map))
        }
    }
}

/// Encodes a native result into its wire form.
///
/// Map entries are emitted in key order, so equal maps produce equal wire
/// forms.
pub fn encode_data(data: &Data) -> WireData {
    match data {
        Data::Value(v) => WireData::Value(WireValue::encode(v)),
        Data::List(items) => WireData::List(items.iter().map(encode_data).collect()),
        Data::Map(entries) => WireData::Map(
            entries
                .iter()
                .map(|(key, nested)| (encode_key(key), encode_data(nested)))
                .collect(),
        ),
    }
}

fn decode_key(key: &WireValue) -> WireResult<DataKey> {
    match key.decode()? {
        Value::Integer(record) => Ok(DataKey::Record(record)),
        Value::Link(record) => Ok(DataKey::Record(record)),
        Value::Text(name) => Ok(DataKey::Key(name)),
        Value::Timestamp(ts) => Ok(DataKey::Timestamp(ts)),
        _ => Err(WireError::InvalidMapKey { tag: key.tag() }),
    }
}

fn encode_key(key: &DataKey) -> WireValue {
    match key {
        DataKey::Record(record) => WireValue::encode(&Value::Integer(*record)),
        DataKey::Key(name) => WireValue::encode(&Value::Text(name.clone())),
        DataKey::Timestamp(ts) => WireValue::encode(&Value::Timestamp(*ts)),
    }
}
