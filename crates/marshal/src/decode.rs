//! Tag-dispatched value decoder.
//!
//! A [`Decoder`] walks the buffer left to right, one tag at a time, recursing
//! into arrays, maps and instance-variable wrappers. Every read is bounds
//! checked; running out of input is reported as `Error::TruncatedInput`.
//!
//! Symbols are recorded in order of first appearance so later `;` links can
//! refer back to them by index. The table lives on the decoder and is
//! discarded with it.

use crate::error::{Error, Result};
use crate::options::DecodeOptions;
use crate::tag::Tag;
use crate::value::{Encoding, Str, Value};
use crate::varint::{self, read_bytes};

/// Decode one value at `offset` with default options.
///
/// Returns the value and the offset just past it.
///
/// # Errors
///
/// Returns the first error encountered; no partial value is produced.
pub fn decode_value(buf: &[u8], offset: usize) -> Result<(Value, usize)> {
    let mut decoder = Decoder::new(buf, offset);
    let value = decoder.read_value()?;
    Ok((value, decoder.position()))
}

/// Cursor over an encoded value stream.
#[derive(Debug)]
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    /// Symbols seen so far, indexed by `;` links.
    symbols: Vec<String>,
    depth: usize,
    options: DecodeOptions,
}

impl<'a> Decoder<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8], offset: usize) -> Self {
        Self::with_options(buf, offset, DecodeOptions::default())
    }

    #[must_use]
    pub fn with_options(buf: &'a [u8], offset: usize, options: DecodeOptions) -> Self {
        Self {
            buf,
            pos: offset,
            symbols: Vec::new(),
            depth: 0,
            options,
        }
    }

    /// Offset of the next unread byte.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Symbols recorded so far, in link-index order.
    #[must_use]
    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn read_byte(&mut self) -> Result<u8> {
        let b = read_bytes(self.buf, self.pos, 1)?[0];
        self.pos += 1;
        Ok(b)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let buf = self.buf;
        let bytes = read_bytes(buf, self.pos, n)?;
        self.pos += n;
        Ok(bytes)
    }

    fn read_varint(&mut self) -> Result<i64> {
        let (value, next) = varint::decode(self.buf, self.pos)?;
        self.pos = next;
        Ok(value)
    }

    fn read_length(&mut self) -> Result<usize> {
        let (length, next) = varint::decode_length(self.buf, self.pos)?;
        self.pos = next;
        Ok(length)
    }

    fn read_length_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.read_length()?;
        self.take(len)
    }

    /// Decode the value starting at the current position.
    ///
    /// # Errors
    ///
    /// - `Error::TruncatedInput` if the input ends early
    /// - `Error::UnknownType` for an unsupported tag byte
    /// - `Error::InvalidLength` for a negative length or count
    /// - `Error::MalformedFloat` for an unparseable float payload
    /// - `Error::InvalidSymbolLink` for a link to an unseen symbol
    /// - `Error::InvalidAttributeName` for a non-symbol attribute name
    /// - `Error::IntegerOverflow` for a big integer outside `i64`
    /// - `Error::MaxDepthExceeded` when nesting passes the configured limit
    /// - `Error::InvalidUtf8` for a symbol name that is not UTF-8
    pub fn read_value(&mut self) -> Result<Value> {
        let offset = self.pos;
        let byte = self.read_byte()?;
        let tag = Tag::from_byte(byte).ok_or(Error::UnknownType { tag: byte, offset })?;
        tracing::trace!(offset, tag = tag.name(), "decoding value");

        if !tag.is_nested() {
            return self.read_tagged(tag, offset);
        }

        if self.depth >= self.options.max_depth {
            return Err(Error::MaxDepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let value = self.read_tagged(tag, offset);
        self.depth -= 1;
        value
    }

    fn read_tagged(&mut self, tag: Tag, offset: usize) -> Result<Value> {
        match tag {
            Tag::Nil => Ok(Value::Nil),
            Tag::True => Ok(Value::Boolean(true)),
            Tag::False => Ok(Value::Boolean(false)),
            Tag::Integer => Ok(Value::Integer(self.read_varint()?)),
            Tag::BigInteger => Ok(Value::Integer(self.read_big_integer(offset)?)),
            Tag::Float => Ok(Value::Float(self.read_float(offset)?)),
            Tag::String => {
                let bytes = self.read_length_prefixed()?;
                Ok(Value::String(Str::new(bytes.to_vec(), None)))
            }
            Tag::Symbol => Ok(Value::Symbol(self.read_symbol()?)),
            Tag::SymbolLink => Ok(Value::Symbol(self.read_symbol_link(offset)?)),
            Tag::Array => Ok(Value::Array(self.read_array()?)),
            Tag::Map => Ok(Value::Map(self.read_map_entries()?)),
            Tag::MapWithDefault => {
                let entries = self.read_map_entries()?;
                let default = self.read_value()?;
                tracing::trace!(offset, default = default.kind(), "skipping map default");
                Ok(Value::Map(entries))
            }
            Tag::InstanceVariables => self.read_instance_variables(),
        }
    }

    // --- Scalars ---

    fn read_big_integer(&mut self, offset: usize) -> Result<i64> {
        let overflow = || Error::IntegerOverflow { offset };

        let sign = self.read_byte()?;
        let words = self.read_length()?;
        let bytes = self.take(words.checked_mul(2).ok_or_else(overflow)?)?;

        let mut magnitude = 0u64;
        for (i, &b) in bytes.iter().enumerate() {
            if b == 0 {
                continue;
            }
            if i >= 8 {
                return Err(overflow());
            }
            magnitude |= u64::from(b) << (8 * i);
        }

        // Any sign byte other than '+' means negative.
        if sign == b'+' {
            i64::try_from(magnitude).map_err(|_| overflow())
        } else {
            0i64.checked_sub_unsigned(magnitude).ok_or_else(overflow)
        }
    }

    fn read_float(&mut self, offset: usize) -> Result<f64> {
        let raw = self.read_length_prefixed()?;
        // Older writers append mantissa bytes after a NUL.
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());

        std::str::from_utf8(&raw[..end])
            .ok()
            .and_then(|text| text.parse::<f64>().ok())
            .ok_or_else(|| Error::MalformedFloat {
                text: String::from_utf8_lossy(raw).into_owned(),
                offset,
            })
    }

    fn read_symbol(&mut self) -> Result<String> {
        let raw = self.read_length_prefixed()?;
        let name = std::str::from_utf8(raw)
            .map_err(|_| Error::InvalidUtf8)?
            .to_owned();
        self.symbols.push(name.clone());
        Ok(name)
    }

    fn read_symbol_link(&mut self, offset: usize) -> Result<String> {
        let index = self.read_varint()?;
        usize::try_from(index)
            .ok()
            .and_then(|i| self.symbols.get(i))
            .cloned()
            .ok_or(Error::InvalidSymbolLink { index, offset })
    }

    // --- Containers ---

    fn read_array(&mut self) -> Result<Vec<Value>> {
        let count = self.read_length()?;
        // Each element takes at least one byte.
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(self.read_value()?);
        }
        Ok(items)
    }

    fn read_map_entries(&mut self) -> Result<Vec<(Value, Value)>> {
        let count = self.read_length()?;
        let mut entries = Vec::with_capacity(count.min(self.remaining() / 2));
        for _ in 0..count {
            let key = self.read_value()?;
            let value = self.read_value()?;
            entries.push((key, value));
        }
        Ok(entries)
    }

    // --- Instance variables ---

    fn read_instance_variables(&mut self) -> Result<Value> {
        let mut value = self.read_value()?;
        let count = self.read_length()?;

        for _ in 0..count {
            let name_offset = self.pos;
            let Value::Symbol(name) = self.read_value()? else {
                return Err(Error::InvalidAttributeName {
                    offset: name_offset,
                });
            };
            let attr = self.read_value()?;

            match (&mut value, name.as_str(), attr) {
                (Value::String(s), "E", Value::Boolean(utf8)) => {
                    s.set_encoding(if utf8 { Encoding::Utf8 } else { Encoding::UsAscii });
                }
                (Value::String(s), "encoding", Value::String(enc)) => {
                    let enc = String::from_utf8_lossy(enc.as_bytes()).into_owned();
                    s.set_encoding(Encoding::Named(enc));
                }
                (_, name, attr) => {
                    tracing::trace!(name, kind = attr.kind(), "discarding instance variable");
                }
            }
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(buf: &[u8]) -> Result<Value> {
        decode_value(buf, 0).map(|(value, _)| value)
    }

    fn utf8(s: &str) -> Value {
        Value::String(Str::new(s.as_bytes().to_vec(), Some(Encoding::Utf8)))
    }

    #[test]
    fn test_scalars() {
        assert_eq!(decode(b"0"), Ok(Value::Nil));
        assert_eq!(decode(b"T"), Ok(Value::Boolean(true)));
        assert_eq!(decode(b"F"), Ok(Value::Boolean(false)));
        assert_eq!(decode(b"i\x03\x40\xe2\x01"), Ok(Value::Integer(123_456)));
        assert_eq!(decode(b"i\xfd\xc0\x1d\xfe"), Ok(Value::Integer(-123_456)));
    }

    #[test]
    fn test_end_offset() {
        assert_eq!(decode_value(b"i\x06TRAILING", 0), Ok((Value::Integer(1), 2)));
        assert_eq!(decode_value(b"xx0", 2), Ok((Value::Nil, 3)));
    }

    #[test]
    fn test_floats() {
        assert_eq!(decode(b"f\x0c1.25e30"), Ok(Value::Float(1.25e30)));
        assert_eq!(decode(b"f\x0b-0.125"), Ok(Value::Float(-0.125)));
        assert_eq!(decode(b"f\x060"), Ok(Value::Float(0.0)));
        assert_eq!(decode(b"f\x08inf"), Ok(Value::Float(f64::INFINITY)));
        assert_eq!(decode(b"f\x09-inf"), Ok(Value::Float(f64::NEG_INFINITY)));

        let Ok(Value::Float(nan)) = decode(b"f\x08nan") else {
            panic!("expected float");
        };
        assert!(nan.is_nan());
    }

    #[test]
    fn test_float_ignores_bytes_after_nul() {
        assert_eq!(decode(b"f\x0a1.1\x00\xff"), Ok(Value::Float(1.1)));
    }

    #[test]
    fn test_malformed_float() {
        assert_eq!(
            decode(b"f\x08abc"),
            Err(Error::MalformedFloat {
                text: "abc".to_string(),
                offset: 0
            })
        );
        assert!(matches!(
            decode(b"f\x00"),
            Err(Error::MalformedFloat { .. })
        ));
        assert!(matches!(
            decode(b"f\x06\xff"),
            Err(Error::MalformedFloat { .. })
        ));
    }

    #[test]
    fn test_binary_string_has_no_encoding() {
        assert_eq!(
            decode(b"\"\x08\xff\xfe\x00"),
            Ok(Value::String(Str::new(vec![0xFF, 0xFE, 0x00], None)))
        );
    }

    #[test]
    fn test_string_encodings() {
        assert_eq!(decode(b"I\"\x08abc\x06:\x06ET"), Ok(utf8("abc")));
        assert_eq!(
            decode(b"I\"\x08abc\x06:\x06EF"),
            Ok(Value::String(Str::new(b"abc".to_vec(), Some(Encoding::UsAscii))))
        );
        assert_eq!(
            decode(b"I\"\x07\x82\xa0\x06:\x0dencoding\"\x0eShift_JIS"),
            Ok(Value::String(Str::new(
                vec![0x82, 0xA0],
                Some(Encoding::Named("Shift_JIS".to_string()))
            )))
        );
    }

    #[test]
    fn test_unrelated_attributes_are_discarded() {
        // [1] with @foo = nil
        assert_eq!(
            decode(b"I[\x06i\x06\x06:\x09@foo0"),
            Ok(Value::Array(vec![Value::Integer(1)]))
        );
    }

    #[test]
    fn test_attribute_name_must_be_symbol() {
        assert_eq!(
            decode(b"I\"\x08abc\x06i\x06T"),
            Err(Error::InvalidAttributeName { offset: 7 })
        );
    }

    #[test]
    fn test_symbol_links() {
        // ["foo", "bar"]: the second encoding marker links to :E
        let data = b"[\x07I\"\x08foo\x06:\x06ETI\"\x08bar\x06;\x00T";
        let mut decoder = Decoder::new(data, 0);
        assert_eq!(
            decoder.read_value(),
            Ok(Value::Array(vec![utf8("foo"), utf8("bar")]))
        );
        assert_eq!(decoder.symbols(), ["E".to_string()]);
        assert_eq!(decoder.position(), data.len());

        // [:a, :b, :a]
        assert_eq!(
            decode(b"[\x08:\x06a:\x06b;\x00"),
            Ok(Value::Array(vec![
                Value::Symbol("a".to_string()),
                Value::Symbol("b".to_string()),
                Value::Symbol("a".to_string()),
            ]))
        );

        // [:a, :b, :b, :a]: index 1 is the single-byte form 0x06
        assert_eq!(
            decode(b"[\x09:\x06a:\x06b;\x06;\x00"),
            Ok(Value::Array(vec![
                Value::Symbol("a".to_string()),
                Value::Symbol("b".to_string()),
                Value::Symbol("b".to_string()),
                Value::Symbol("a".to_string()),
            ]))
        );
    }

    #[test]
    fn test_symbol_link_out_of_range() {
        assert_eq!(
            decode(b";\x00"),
            Err(Error::InvalidSymbolLink {
                index: 0,
                offset: 0
            })
        );
        assert_eq!(
            decode(b"[\x07:\x06a;\xfa"),
            Err(Error::InvalidSymbolLink {
                index: -1,
                offset: 5
            })
        );
    }

    #[test]
    fn test_symbol_must_be_utf8() {
        assert_eq!(decode(b":\x06\xff"), Err(Error::InvalidUtf8));
    }

    #[test]
    fn test_big_integers() {
        // 2**62 and -(2**62)
        assert_eq!(
            decode(b"l+\x09\x00\x00\x00\x00\x00\x00\x00\x40"),
            Ok(Value::Integer(1 << 62))
        );
        assert_eq!(
            decode(b"l-\x09\x00\x00\x00\x00\x00\x00\x00\x40"),
            Ok(Value::Integer(-(1 << 62)))
        );
        // i64::MIN fits; its magnitude negated does not
        assert_eq!(
            decode(b"l-\x09\x00\x00\x00\x00\x00\x00\x00\x80"),
            Ok(Value::Integer(i64::MIN))
        );
        assert_eq!(
            decode(b"l+\x09\x00\x00\x00\x00\x00\x00\x00\x80"),
            Err(Error::IntegerOverflow { offset: 0 })
        );
        // 2**64
        assert_eq!(
            decode(b"l+\x0a\x00\x00\x00\x00\x00\x00\x00\x00\x01\x00"),
            Err(Error::IntegerOverflow { offset: 0 })
        );
        // high zero words are fine
        assert_eq!(
            decode(b"l+\x0b\x01\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00"),
            Ok(Value::Integer(1))
        );
    }

    #[test]
    fn test_containers() {
        assert_eq!(decode(b"[\x00"), Ok(Value::Array(vec![])));
        assert_eq!(decode(b"{\x00"), Ok(Value::Map(vec![])));
        assert_eq!(
            decode(b"{\x07i\x06Ti\x070"),
            Ok(Value::Map(vec![
                (Value::Integer(1), Value::Boolean(true)),
                (Value::Integer(2), Value::Nil),
            ]))
        );
    }

    #[test]
    fn test_map_default_is_skipped() {
        // Hash.new(0) with {a: 1}
        assert_eq!(
            decode(b"}\x06:\x06ai\x06i\x00"),
            Ok(Value::Map(vec![(
                Value::Symbol("a".to_string()),
                Value::Integer(1)
            )]))
        );
        assert!(matches!(
            decode(b"}\x00"),
            Err(Error::TruncatedInput { offset: 2, .. })
        ));
    }

    #[test]
    fn test_unknown_tag() {
        assert_eq!(
            decode(b"o:\x08Foo\x00"),
            Err(Error::UnknownType {
                tag: b'o',
                offset: 0
            })
        );
        assert_eq!(
            decode(b"[\x07i\x06@\x00"),
            Err(Error::UnknownType {
                tag: b'@',
                offset: 4
            })
        );
    }

    #[test]
    fn test_truncated_input() {
        let cases: [&[u8]; 8] = [
            b"",
            b"i",
            b"i\x03\x40\xe2",
            b"\"\x0aab",
            b":",
            b"[\x07i\x06",
            b"{\x06i\x06",
            b"I\"\x08abc",
        ];
        for data in cases {
            assert!(
                matches!(decode(data), Err(Error::TruncatedInput { .. })),
                "{data:?}"
            );
        }
    }

    #[test]
    fn test_every_prefix_fails_cleanly() {
        let data = b"{\x07:\x06aI\"\x08foo\x06:\x06ET:\x06b[\x07f\x081.5l+\x06\x01\x00";
        assert!(decode(data).is_ok());
        for end in 0..data.len() {
            assert!(decode(&data[..end]).is_err(), "prefix of length {end}");
        }
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        assert_eq!(
            decode(b"[\x04\xff\xff\xff\x7f"),
            Err(Error::TruncatedInput {
                offset: 6,
                needed: 1
            })
        );
    }

    #[test]
    fn test_negative_lengths() {
        assert_eq!(
            decode(b"\"\xfa"),
            Err(Error::InvalidLength {
                length: -1,
                offset: 1
            })
        );
        assert!(matches!(
            decode(b"[\xfa"),
            Err(Error::InvalidLength { length: -1, .. })
        ));
        assert!(matches!(
            decode(b"{\xff\x84"),
            Err(Error::InvalidLength { length: -124, .. })
        ));
    }

    #[test]
    fn test_max_depth() {
        let nested = b"[\x06[\x06[\x00";
        let options = DecodeOptions::default().with_max_depth(2);
        assert_eq!(
            Decoder::with_options(nested, 0, options).read_value(),
            Err(Error::MaxDepthExceeded { limit: 2 })
        );

        let options = DecodeOptions::default().with_max_depth(3);
        let mut decoder = Decoder::with_options(nested, 0, options);
        assert!(decoder.read_value().is_ok());

        // Depth resets after siblings
        let siblings = b"[\x07[\x06[\x00[\x06[\x00";
        let mut decoder = Decoder::with_options(siblings, 0, options);
        assert!(decoder.read_value().is_ok());
    }

    #[test]
    fn test_default_depth_stops_deep_nesting() {
        let mut data = Vec::new();
        for _ in 0..100_000 {
            data.extend_from_slice(b"[\x06");
        }
        data.extend_from_slice(b"[\x00");
        assert_eq!(
            decode(&data),
            Err(Error::MaxDepthExceeded {
                limit: crate::options::DEFAULT_MAX_DEPTH
            })
        );
    }
}
