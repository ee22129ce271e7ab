//! Type tag bytes.
//!
//! Every encoded value starts with a 1-byte tag naming its type. Only the
//! tags below are decoded; object graphs, class references and user-defined
//! dump hooks are rejected as unknown.

/// Supported value tags, keyed by their byte in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Tag {
    Nil = b'0',
    True = b'T',
    False = b'F',
    /// VarInt-encoded integer.
    Integer = b'i',
    /// Sign byte, word count, little-endian magnitude.
    BigInteger = b'l',
    /// Length-prefixed ASCII float text.
    Float = b'f',
    /// Length-prefixed raw bytes.
    String = b'"',
    /// Length-prefixed symbol name, added to the symbol table.
    Symbol = b':',
    /// Index of an earlier symbol.
    SymbolLink = b';',
    Array = b'[',
    Map = b'{',
    /// Map followed by a default value.
    MapWithDefault = b'}',
    /// Value followed by named attributes.
    InstanceVariables = b'I',
}

impl Tag {
    /// Parse a tag byte. Returns `None` for unsupported tags.
    #[inline]
    #[must_use]
    pub const fn from_byte(b: u8) -> Option<Self> {
        Some(match b {
            b'0' => Tag::Nil,
            b'T' => Tag::True,
            b'F' => Tag::False,
            b'i' => Tag::Integer,
            b'l' => Tag::BigInteger,
            b'f' => Tag::Float,
            b'"' => Tag::String,
            b':' => Tag::Symbol,
            b';' => Tag::SymbolLink,
            b'[' => Tag::Array,
            b'{' => Tag::Map,
            b'}' => Tag::MapWithDefault,
            b'I' => Tag::InstanceVariables,
            _ => return None,
        })
    }

    /// Get the raw tag byte.
    #[inline]
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Get the tag name (for log messages).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Tag::Nil => "nil",
            Tag::True => "true",
            Tag::False => "false",
            Tag::Integer => "integer",
            Tag::BigInteger => "big integer",
            Tag::Float => "float",
            Tag::String => "string",
            Tag::Symbol => "symbol",
            Tag::SymbolLink => "symbol link",
            Tag::Array => "array",
            Tag::Map => "map",
            Tag::MapWithDefault => "map with default",
            Tag::InstanceVariables => "instance variables",
        }
    }

    /// Whether the tag opens a nested value (counts toward the depth limit).
    #[inline]
    #[must_use]
    pub fn is_nested(self) -> bool {
        matches!(
            self,
            Tag::Array | Tag::Map | Tag::MapWithDefault | Tag::InstanceVariables
        )
    }
}
