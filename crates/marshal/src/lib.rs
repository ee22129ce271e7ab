//! Decoder for the version 4.8 object marshalling format.
//!
//! A marshalled document is a 2-byte version header followed by one
//! tag-prefixed value. Decoding produces an owned [`Value`] tree:
//!
//! ```
//! use marshal::{Document, ValueType};
//!
//! // 'Hello, world' with a UTF-8 encoding marker
//! let data = b"\x04\x08I\"\x11Hello, world\x06:\x06ET";
//! let doc = Document::from_bytes(data).unwrap();
//!
//! assert_eq!(doc.value_type(), ValueType::String);
//! assert_eq!(doc.as_str().unwrap(), "Hello, world");
//! ```
//!
//! Supported: nil, booleans, integers (including big integers that fit in
//! an `i64`), floats, strings with their encoding, symbols and symbol links,
//! arrays, and maps. Objects, classes, modules, structs, regexps, object
//! links and custom dump formats are reported as `Error::UnknownType`.

pub mod decode;
pub mod document;
pub mod error;
pub mod json;
pub mod options;
pub mod tag;
pub mod value;
pub mod varint;

pub use decode::{Decoder, decode_value};
pub use document::{Document, load};
pub use error::{Error, Result};
pub use options::DecodeOptions;
pub use tag::Tag;
pub use value::{Encoding, Str, Value, ValueType};
