//! Variable-width signed integers.
//!
//! The lead byte, read as an `i8`, selects the form:
//!
//! | lead          | meaning                                            |
//! |---------------|----------------------------------------------------|
//! | `0`           | zero                                               |
//! | `5..=127`     | `lead - 5` (1 to 122)                              |
//! | `-128..=-5`   | `lead + 5` (-123 to -1)                            |
//! | `1..=4`       | next `lead` bytes, little-endian, unsigned         |
//! | `-4..=-1`     | next `-lead` bytes, little-endian, minus `256^n`   |
//!
//! The same encoding prefixes every string, symbol, array and map length.

use crate::error::{Error, Result};

/// Borrow `n` bytes starting at `offset`.
pub(crate) fn read_bytes(buf: &[u8], offset: usize, n: usize) -> Result<&[u8]> {
    offset
        .checked_add(n)
        .and_then(|end| buf.get(offset..end))
        .ok_or(Error::TruncatedInput { offset, needed: n })
}

/// Read up to 8 bytes as a little-endian unsigned integer.
fn read_uint_le(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Decode a VarInt at `offset`.
///
/// Returns the value and the offset just past it.
///
/// # Errors
///
/// Returns `Error::TruncatedInput` if the lead byte or its payload is missing.
pub fn decode(buf: &[u8], offset: usize) -> Result<(i64, usize)> {
    let lead = read_bytes(buf, offset, 1)?[0] as i8;
    let start = offset + 1;

    match lead {
        0 => Ok((0, start)),
        1..=4 => {
            let n = lead as usize;
            let magnitude = read_uint_le(read_bytes(buf, start, n)?);
            Ok((magnitude as i64, start + n))
        }
        -4..=-1 => {
            let n = lead.unsigned_abs() as usize;
            let magnitude = read_uint_le(read_bytes(buf, start, n)?);
            Ok((magnitude as i64 - (1i64 << (8 * n)), start + n))
        }
        5..=i8::MAX => Ok((i64::from(lead) - 5, start)),
        i8::MIN..=-5 => Ok((i64::from(lead) + 5, start)),
    }
}

/// Decode a VarInt used as a length or count.
///
/// # Errors
///
/// Returns `Error::InvalidLength` if the decoded value is negative, and
/// `Error::TruncatedInput` as for [`decode`].
pub fn decode_length(buf: &[u8], offset: usize) -> Result<(usize, usize)> {
    let (length, next) = decode(buf, offset)?;
    let length = usize::try_from(length).map_err(|_| Error::InvalidLength { length, offset })?;
    Ok((length, next))
}

/// Encode a value in its shortest VarInt form.
#[must_use]
pub fn encode(value: i32) -> Vec<u8> {
    match value {
        0 => vec![0],
        1..=122 => vec![(value + 5) as u8],
        -123..=-1 => vec![(value - 5) as u8],
        _ => {
            let bytes = value.to_le_bytes();
            let fill = if value < 0 { 0xFF } else { 0x00 };
            let n = bytes.len() - bytes.iter().rev().take_while(|&&b| b == fill).count();
            let lead = if value < 0 { -(n as i8) } else { n as i8 };

            let mut out = Vec::with_capacity(n + 1);
            out.push(lead as u8);
            out.extend_from_slice(&bytes[..n]);
            out
        }
    }
}
