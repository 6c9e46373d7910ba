//! Bounds-checked cursor over byte-aligned header fields.

use super::varint::read_varint;
use crate::error::{Error, Result};

/// Sequential reader over a borrowed slice. Every accessor fails with
/// `CorruptFrame` instead of panicking when the input is too short.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteReader { data, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let b = *self
            .data
            .get(self.pos)
            .ok_or(Error::CorruptFrame("unexpected end of input"))?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_varint(&mut self) -> Result<u64> {
        read_varint(self.data, &mut self.pos)
    }

    /// Read a varint that must fit in `usize` and not exceed `limit`.
    pub fn read_length(&mut self, limit: usize) -> Result<usize> {
        let v = self.read_varint()?;
        if v > limit as u64 {
            return Err(Error::CorruptFrame("length field out of range"));
        }
        Ok(v as usize)
    }

    /// Borrow the next `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::CorruptFrame("unexpected end of input"));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Everything that is left, without consuming it.
    pub fn peek_rest(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Borrow everything that is left.
    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }
}

/// Write a little-endian `u32` at the end of `out`.
#[inline]
pub fn push_u32_le(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
