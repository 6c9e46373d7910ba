//! Unsigned LEB128 integers used for every variable-length header field.

use crate::error::{Error, Result};

/// Longest valid encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as LEB128: seven bits per byte, low group first, `0x80`
/// marks a continuation.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Encoded length of `value` in bytes.
pub fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Decode a varint starting at `*pos`, advancing `*pos` past it.
///
/// Rejects truncated input, values that overflow 64 bits and overlong
/// encodings (a trailing zero group), so every value has exactly one
/// accepted encoding.
pub fn read_varint(input: &[u8], pos: &mut usize) -> Result<u64> {
    let mut value = 0u64;
    let mut shift = 0u32;
    loop {
        let byte = *input
            .get(*pos)
            .ok_or(Error::CorruptFrame("truncated varint"))?;
        *pos += 1;
        let group = u64::from(byte & 0x7F);
        if shift == 63 && group > 1 {
            return Err(Error::CorruptFrame("varint overflow"));
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            if byte == 0 && shift > 0 {
                return Err(Error::CorruptFrame("overlong varint"));
            }
            return Ok(value);
        }
        shift += 7;
        if shift > 63 {
            return Err(Error::CorruptFrame("varint overflow"));
        }
    }
}
