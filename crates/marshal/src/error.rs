//! Error types for marshal decoding.

use thiserror::Error;

/// Error type for marshal operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    // Input errors
    /// Fewer bytes remain than the current decode step requires.
    #[error("truncated input: needed {needed} byte(s) at offset {offset}")]
    TruncatedInput { offset: usize, needed: usize },
    /// Tag byte does not name a supported type.
    #[error("unknown type tag {tag:#04x} at offset {offset}")]
    UnknownType { tag: u8, offset: usize },
    /// Length or count prefix is negative.
    #[error("invalid length {length} at offset {offset}")]
    InvalidLength { length: i64, offset: usize },
    /// Float payload is not a decimal literal.
    #[error("malformed float {text:?} at offset {offset}")]
    MalformedFloat { text: String, offset: usize },
    /// Symbol link points past the symbols seen so far.
    #[error("symbol link {index} at offset {offset} is out of range")]
    InvalidSymbolLink { index: i64, offset: usize },
    /// Instance variable name is not a symbol.
    #[error("instance variable name at offset {offset} is not a symbol")]
    InvalidAttributeName { offset: usize },
    /// Big integer does not fit in an i64.
    #[error("integer at offset {offset} does not fit in 64 bits")]
    IntegerOverflow { offset: usize },
    /// Nesting exceeded the configured limit.
    #[error("nesting depth exceeds limit of {limit}")]
    MaxDepthExceeded { limit: usize },
    /// Symbol name or string contents are not valid UTF-8.
    #[error("invalid UTF-8")]
    InvalidUtf8,

    // Accessor errors
    /// Accessor called on a value of another type.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    // JSON errors
    /// f64 is NaN or Infinity (not representable in JSON).
    #[error("cannot encode non-finite float {0} as JSON")]
    NonFiniteFloat(f64),
    /// Map key has no JSON object key representation.
    #[error("cannot use {found} as a JSON object key")]
    UnsupportedKey { found: &'static str },
    /// Failed to serialize to JSON.
    #[error("JSON serialize error: {0}")]
    JsonSerialize(String),
}

/// Result type alias for marshal operations.
pub type Result<T> = std::result::Result<T, Error>;
