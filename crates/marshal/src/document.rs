//! Marshalled document.
//!
//! A document is a 2-byte version header followed by exactly one value.
//! The header is read when the document is created; the value is decoded on
//! first access and the outcome, success or error, is kept for later calls.

use std::borrow::Cow;
use std::sync::OnceLock;

use crate::decode::Decoder;
use crate::error::{Error, Result};
use crate::options::DecodeOptions;
use crate::value::{Value, ValueType};

/// Format version written by current encoders.
pub const MAJOR_VERSION: u8 = 4;
pub const MINOR_VERSION: u8 = 8;

const HEADER_LEN: usize = 2;

#[derive(Debug)]
pub struct Document<'a> {
    buffer: Cow<'a, [u8]>,
    major: u8,
    minor: u8,
    options: DecodeOptions,
    /// Decoded root and the offset just past it.
    decoded: OnceLock<Result<(Value, usize)>>,
}

impl<'a> Document<'a> {
    /// Read the header of a borrowed buffer.
    ///
    /// # Errors
    ///
    /// Returns `Error::TruncatedInput` if the buffer is shorter than the header.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        Self::with_options(Cow::Borrowed(bytes), DecodeOptions::default())
    }

    /// Read the header with custom decode options.
    ///
    /// # Errors
    ///
    /// Returns `Error::TruncatedInput` if the buffer is shorter than the header.
    pub fn with_options(buffer: Cow<'a, [u8]>, options: DecodeOptions) -> Result<Self> {
        let [major, minor] = *buffer
            .first_chunk::<HEADER_LEN>()
            .ok_or_else(|| Error::TruncatedInput {
                offset: buffer.len(),
                needed: HEADER_LEN - buffer.len(),
            })?;

        // Unrecognized versions are decoded anyway; later revisions may not
        // be readable.
        if major != MAJOR_VERSION || minor > MINOR_VERSION {
            tracing::warn!(
                major,
                minor,
                "unsupported format version {major}.{minor}, expected {MAJOR_VERSION}.{MINOR_VERSION}"
            );
        }

        Ok(Self {
            buffer,
            major,
            minor,
            options,
            decoded: OnceLock::new(),
        })
    }

    #[inline]
    #[must_use]
    pub fn major_version(&self) -> u8 {
        self.major
    }

    #[inline]
    #[must_use]
    pub fn minor_version(&self) -> u8 {
        self.minor
    }

    /// Get the underlying buffer.
    #[must_use]
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    fn decode(&self) -> Result<(Value, usize)> {
        let mut decoder = Decoder::with_options(&self.buffer, HEADER_LEN, self.options);
        let value = decoder.read_value()?;
        let end = decoder.position();

        tracing::debug!(
            kind = value.kind(),
            len = end,
            trailing = self.buffer.len() - end,
            "decoded document"
        );
        Ok((value, end))
    }

    fn decoded(&self) -> &Result<(Value, usize)> {
        self.decoded.get_or_init(|| self.decode())
    }

    /// Get the top-level value, decoding it on first call.
    ///
    /// # Errors
    ///
    /// Returns the decode error. Repeated calls return the same error.
    pub fn root(&self) -> Result<&Value> {
        match self.decoded() {
            Ok((value, _)) => Ok(value),
            Err(e) => Err(e.clone()),
        }
    }

    /// Consume the document, returning the owned top-level value.
    ///
    /// # Errors
    ///
    /// Returns the decode error.
    pub fn into_root(mut self) -> Result<Value> {
        let decoded = match self.decoded.take() {
            Some(decoded) => decoded,
            None => self.decode(),
        };
        decoded.map(|(value, _)| value)
    }

    /// Offset just past the top-level value. Bytes after it are ignored.
    #[must_use]
    pub fn decoded_len(&self) -> Option<usize> {
        self.decoded().as_ref().ok().map(|(_, end)| *end)
    }

    /// Classify the top-level value; `ValueType::Unknown` if it failed to
    /// decode.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.root().map_or(ValueType::Unknown, Value::value_type)
    }

    /// # Errors
    ///
    /// Returns the decode error, or `Error::TypeMismatch` unless the value
    /// is a boolean.
    pub fn as_bool(&self) -> Result<bool> {
        self.root()?.as_bool()
    }

    /// # Errors
    ///
    /// Returns the decode error, or `Error::TypeMismatch` unless the value
    /// is an integer.
    pub fn as_integer(&self) -> Result<i64> {
        self.root()?.as_integer()
    }

    /// # Errors
    ///
    /// Returns the decode error, or `Error::TypeMismatch` unless the value
    /// is a float.
    pub fn as_float(&self) -> Result<f64> {
        self.root()?.as_float()
    }

    /// # Errors
    ///
    /// Returns the decode error, or `Error::TypeMismatch` unless the value
    /// is a string or symbol.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        self.root()?.as_bytes()
    }

    /// # Errors
    ///
    /// Returns the decode error, `Error::TypeMismatch` unless the value is a
    /// string or symbol, or `Error::InvalidUtf8`.
    pub fn as_str(&self) -> Result<&str> {
        self.root()?.as_str()
    }

    /// # Errors
    ///
    /// Returns the decode error, or `Error::TypeMismatch` unless the value
    /// is an array.
    pub fn as_array(&self) -> Result<&[Value]> {
        self.root()?.as_array()
    }

    /// # Errors
    ///
    /// Returns the decode error, or `Error::TypeMismatch` unless the value
    /// is a map.
    pub fn as_map(&self) -> Result<&[(Value, Value)]> {
        self.root()?.as_map()
    }
}

impl Document<'static> {
    /// Read the header of an owned buffer.
    ///
    /// # Errors
    ///
    /// Returns `Error::TruncatedInput` if the buffer is shorter than the header.
    pub fn from_vec(bytes: Vec<u8>) -> Result<Self> {
        Self::with_options(Cow::Owned(bytes), DecodeOptions::default())
    }
}

/// Decode a complete document into its top-level value.
///
/// # Errors
///
/// Returns the header or decode error.
pub fn load(bytes: &[u8]) -> Result<Value> {
    Document::from_bytes(bytes)?.into_root()
}
