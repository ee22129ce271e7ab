//! Decoded values.
//!
//! A [`Value`] owns its data; nothing borrows from the input buffer, so values
//! can be kept after the [`Document`](crate::Document) they came from is
//! dropped.
//!
//! ```
//! use marshal::{Document, Value};
//!
//! // {foo: "bar"}
//! let data = [
//!     4, 8, b'{', 6, b':', 8, b'f', b'o', b'o', b'I', b'"', 8, b'b', b'a', b'r', 6, b':', 6,
//!     b'E', b'T',
//! ];
//! let doc = Document::from_bytes(&data).unwrap();
//! let value = doc.root().unwrap();
//!
//! assert_eq!(value.get("foo").unwrap().as_str().unwrap(), "bar");
//! ```

use crate::error::{Error, Result};

/// Coarse classification of a value, as reported by `value_type()`.
///
/// Symbols classify as [`ValueType::String`]; both read through the string
/// accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueType {
    /// The document could not be decoded.
    Unknown = 0,
    Nil = 1,
    Boolean = 2,
    Integer = 3,
    Float = 4,
    String = 5,
    Array = 6,
    Map = 7,
}

impl ValueType {
    /// Get the type name as a string.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Unknown => "unknown",
            ValueType::Nil => "nil",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::Float => "float",
            ValueType::String => "string",
            ValueType::Array => "array",
            ValueType::Map => "map",
        }
    }
}

/// Text encoding attached to a string by its instance variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoding {
    /// `E` set to true.
    Utf8,
    /// `E` set to false.
    UsAscii,
    /// `encoding` set to a name, e.g. `"Shift_JIS"`.
    Named(String),
}

impl Encoding {
    /// Canonical encoding name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::UsAscii => "US-ASCII",
            Encoding::Named(name) => name,
        }
    }
}

/// String payload: raw bytes plus the encoding, when one was recorded.
///
/// A string without an encoding is binary data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Str {
    bytes: Vec<u8>,
    encoding: Option<Encoding>,
}

impl Str {
    #[must_use]
    pub fn new(bytes: Vec<u8>, encoding: Option<Encoding>) -> Self {
        Self { bytes, encoding }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[inline]
    #[must_use]
    pub fn encoding(&self) -> Option<&Encoding> {
        self.encoding.as_ref()
    }

    /// View the bytes as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` if the bytes are not valid UTF-8.
    pub fn to_str(&self) -> Result<&str> {
        std::str::from_utf8(&self.bytes).map_err(|_| Error::InvalidUtf8)
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub(crate) fn set_encoding(&mut self, encoding: Encoding) {
        self.encoding = Some(encoding);
    }
}

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(Str),
    /// Symbol name.
    Symbol(String),
    Array(Vec<Value>),
    /// Key/value pairs in stream order. Keys may be any value.
    Map(Vec<(Value, Value)>),
}

impl Value {
    /// Classify this value. Symbols report [`ValueType::String`].
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Nil => ValueType::Nil,
            Value::Boolean(_) => ValueType::Boolean,
            Value::Integer(_) => ValueType::Integer,
            Value::Float(_) => ValueType::Float,
            Value::String(_) | Value::Symbol(_) => ValueType::String,
            Value::Array(_) => ValueType::Array,
            Value::Map(_) => ValueType::Map,
        }
    }

    /// Exact variant name, distinguishing symbols from strings.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Symbol(_) => "symbol",
            other => other.value_type().name(),
        }
    }

    fn mismatch(&self, expected: ValueType) -> Error {
        Error::TypeMismatch {
            expected: expected.name(),
            found: self.kind(),
        }
    }

    #[inline]
    #[must_use]
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` unless this is a boolean.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.mismatch(ValueType::Boolean)),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` unless this is an integer.
    pub fn as_integer(&self) -> Result<i64> {
        match self {
            Value::Integer(n) => Ok(*n),
            other => Err(other.mismatch(ValueType::Integer)),
        }
    }

    /// Integers are not promoted.
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` unless this is a float.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(other.mismatch(ValueType::Float)),
        }
    }

    /// Raw bytes of a string or symbol.
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` unless this is a string or symbol.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::String(s) => Ok(s.as_bytes()),
            Value::Symbol(name) => Ok(name.as_bytes()),
            other => Err(other.mismatch(ValueType::String)),
        }
    }

    /// Text of a string or symbol.
    ///
    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` unless this is a string or symbol, and
    /// `Error::InvalidUtf8` for strings holding non-UTF-8 bytes.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::String(s) => s.to_str(),
            Value::Symbol(name) => Ok(name),
            other => Err(other.mismatch(ValueType::String)),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` unless this is an array.
    pub fn as_array(&self) -> Result<&[Value]> {
        match self {
            Value::Array(items) => Ok(items),
            other => Err(other.mismatch(ValueType::Array)),
        }
    }

    /// # Errors
    ///
    /// Returns `Error::TypeMismatch` unless this is a map.
    pub fn as_map(&self) -> Result<&[(Value, Value)]> {
        match self {
            Value::Map(entries) => Ok(entries),
            other => Err(other.mismatch(ValueType::Map)),
        }
    }

    /// Look up a map entry by string or symbol key.
    ///
    /// Returns the first matching entry, or `None` if this is not a map.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        let Value::Map(entries) = self else {
            return None;
        };
        entries
            .iter()
            .find(|(k, _)| k.as_bytes().is_ok_and(|b| b == key.as_bytes()))
            .map(|(_, v)| v)
    }

    /// Get an array element.
    #[must_use]
    pub fn index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Number of elements (array) or entries (map).
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    /// Whether an array or map has no elements. `None` for scalars.
    #[must_use]
    pub fn is_empty(&self) -> Option<bool> {
        self.len().map(|n| n == 0)
    }
}
