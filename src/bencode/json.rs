use serde_json::{json, Value};

use super::error::BencodeError;
use super::BValue;
use crate::bencode::bvalue::Dictionary;

/// Key used to carry byte strings that are not valid UTF-8 through JSON.
pub const BYTES_HEX_KEY: &str = "_bytes_hex";

/// Convert a `BValue` into JSON (using Serde JSON `Value`).
///
/// - `Integer(i)` => JSON number
/// - `ByteString(bytes)` => string if UTF-8, otherwise `{"_bytes_hex": "<hex>"}`
/// - `List(...)` => JSON array
/// - `Dict(...)` => JSON object, in stored order; keys are converted lossily
///
/// A real dict whose only key is `_bytes_hex` and whose value is a hex string
/// renders the same as a non-UTF-8 byte string, so [`json_to_bvalue`] reads it
/// back as bytes.
pub fn bvalue_to_json(bv: &BValue) -> Value {
    match bv {
        BValue::Integer(i) => json!(i),
        BValue::ByteString(bytes) => match std::str::from_utf8(bytes) {
            Ok(utf8_str) => Value::String(utf8_str.to_string()),
            Err(_) => json!({ BYTES_HEX_KEY: hex::encode(bytes) }),
        },
        BValue::List(items) => Value::Array(items.iter().map(bvalue_to_json).collect()),
        BValue::Dict(dict) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in dict.iter() {
                json_map.insert(String::from_utf8_lossy(k).into_owned(), bvalue_to_json(v));
            }
            Value::Object(json_map)
        }
    }
}

/// The inverse of [`bvalue_to_json`].
///
/// JSON has types bencode cannot carry; those are refused before anything is
/// built.
pub fn json_to_bvalue(value: &Value) -> Result<BValue, BencodeError> {
    match value {
        Value::Null => Err(BencodeError::UnsupportedValueType("null")),
        Value::Bool(_) => Err(BencodeError::UnsupportedValueType("boolean")),
        Value::Number(n) => n
            .as_i64()
            .map(BValue::Integer)
            .ok_or(BencodeError::UnsupportedValueType("non-integer or out of range number")),
        Value::String(s) => Ok(BValue::string(s)),
        Value::Array(items) => items
            .iter()
            .map(json_to_bvalue)
            .collect::<Result<Vec<_>, _>>()
            .map(BValue::List),
        Value::Object(map) => {
            if let (1, Some(Value::String(hex_str))) = (map.len(), map.get(BYTES_HEX_KEY)) {
                return Ok(BValue::bytes(hex::decode(hex_str)?));
            }
            let mut dict = Dictionary::with_capacity(map.len());
            for (k, v) in map {
                dict.insert(k.clone().into_bytes(), json_to_bvalue(v)?);
            }
            Ok(BValue::Dict(dict))
        }
    }
}
