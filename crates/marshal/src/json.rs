//! JSON export for decoded values.
//!
//! ```
//! use marshal::{Document, json::to_json};
//!
//! // [1, :two, 3.5]
//! let data = [4, 8, b'[', 8, b'i', 6, b':', 8, b't', b'w', b'o', b'f', 8, b'3', b'.', b'5'];
//! let doc = Document::from_bytes(&data).unwrap();
//!
//! assert_eq!(to_json(&doc).unwrap(), r#"[1,"two",3.5]"#);
//! ```
//!
//! # Value to JSON Mapping
//!
//! | Value     | JSON                                         |
//! |-----------|----------------------------------------------|
//! | `Nil`     | null                                         |
//! | `Boolean` | true/false                                   |
//! | `Integer` | integer                                      |
//! | `Float`   | number (NaN and Infinity are rejected)       |
//! | `String`  | string, or `b64:` + base64 if not UTF-8      |
//! | `Symbol`  | string                                       |
//! | `Array`   | array                                        |
//! | `Map`     | object; keys are stringified scalars          |
//!
//! Object keys keep the order of the map's entries in the stream. Keys that
//! repeat once stringified keep the first position and the last value.

use base64::Engine;
use serde_json::Value as JsonValue;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::value::{Str, Value};

/// Convert a document's top-level value to a JSON string.
///
/// # Errors
///
/// Returns the decode error if the document is invalid.
/// Returns `Error::NonFiniteFloat` if a float is NaN or Infinity.
/// Returns `Error::UnsupportedKey` for an array or map used as a map key.
/// Returns `Error::JsonSerialize` if JSON serialization fails.
pub fn to_json(doc: &Document) -> Result<String> {
    let json_value = value_to_json(doc.root()?)?;
    serde_json::to_string(&json_value).map_err(|e| Error::JsonSerialize(e.to_string()))
}

/// Convert a value to a `serde_json` value.
///
/// # Errors
///
/// As for [`to_json`], minus the decode error.
pub fn value_to_json(value: &Value) -> Result<JsonValue> {
    match value {
        Value::Nil => Ok(JsonValue::Null),

        Value::Boolean(b) => Ok(JsonValue::Bool(*b)),

        Value::Integer(n) => Ok(JsonValue::Number((*n).into())),

        Value::Float(f) => {
            let num = serde_json::Number::from_f64(*f).ok_or(Error::NonFiniteFloat(*f))?;
            Ok(JsonValue::Number(num))
        }

        Value::String(s) => Ok(JsonValue::String(str_to_json(s))),

        Value::Symbol(name) => Ok(JsonValue::String(name.clone())),

        Value::Array(items) => items
            .iter()
            .map(value_to_json)
            .collect::<Result<Vec<_>>>()
            .map(JsonValue::Array),

        Value::Map(entries) => {
            let mut obj = serde_json::Map::with_capacity(entries.len());
            for (key, value) in entries {
                obj.insert(key_to_json(key)?, value_to_json(value)?);
            }
            Ok(JsonValue::Object(obj))
        }
    }
}

fn str_to_json(s: &Str) -> String {
    match s.to_str() {
        Ok(text) => text.to_string(),
        Err(_) => {
            let encoded = base64::engine::general_purpose::STANDARD.encode(s.as_bytes());
            format!("b64:{encoded}")
        }
    }
}

fn key_to_json(key: &Value) -> Result<String> {
    match key {
        Value::String(s) => Ok(str_to_json(s)),
        Value::Symbol(name) => Ok(name.clone()),
        Value::Nil | Value::Boolean(_) | Value::Integer(_) | Value::Float(_) => {
            Ok(value_to_json(key)?.to_string())
        }
        Value::Array(_) | Value::Map(_) => Err(Error::UnsupportedKey { found: key.kind() }),
    }
}
