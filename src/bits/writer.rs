//! LSB-first bit packer.

use super::low_mask;

/// Largest number of bits accepted by a single [`BitWriter::write_bits`] call.
pub const MAX_WRITE_BITS: u32 = 56;

/// Accumulates variable-width values into a byte vector, least significant
/// bit first.
///
/// Bits written earlier occupy lower positions of the stream, so a
/// [`BitReader`](super::BitReader) returns values in write order and a
/// [`BackwardBitReader`](super::BackwardBitReader) returns them in reverse.
#[derive(Debug, Default)]
pub struct BitWriter {
    buf: Vec<u8>,
    acc: u64,
    nbits: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bytes: usize) -> Self {
        BitWriter {
            buf: Vec::with_capacity(bytes),
            acc: 0,
            nbits: 0,
        }
    }

    /// Append the low `n` bits of `value`.
    #[inline]
    pub fn write_bits(&mut self, value: u64, n: u32) {
        debug_assert!(n <= MAX_WRITE_BITS);
        if n == 0 {
            return;
        }
        self.acc |= (value & low_mask(n)) << self.nbits;
        self.nbits += n;
        while self.nbits >= 8 {
            self.buf.push(self.acc as u8);
            self.acc >>= 8;
            self.nbits -= 8;
        }
    }

    /// Total number of bits written so far.
    #[inline]
    pub fn bit_len(&self) -> usize {
        self.buf.len() * 8 + self.nbits as usize
    }

    /// Flush the partial byte (zero padded) and return the stream.
    pub fn finish(mut self) -> Vec<u8> {
        if self.nbits > 0 {
            self.buf.push(self.acc as u8);
        }
        self.buf
    }

    /// Close a stream meant for [`BackwardBitReader`](super::BackwardBitReader):
    /// a single `1` marker bit follows the payload so the reader can locate
    /// the last meaningful bit.
    pub fn finish_with_marker(mut self) -> Vec<u8> {
        self.write_bits(1, 1);
        self.finish()
    }
}
