//! Forward and backward bit readers over borrowed byte slices.

use super::low_mask;
use crate::error::{Error, Result};

/// Largest number of bits a single read or peek may request.
pub const MAX_READ_BITS: u32 = 56;

/// Load `n` bits starting at absolute bit position `pos`, treating bytes past
/// the end of `data` as zero.
#[inline]
fn load_bits(data: &[u8], pos: usize, n: u32) -> u64 {
    debug_assert!(n <= MAX_READ_BITS);
    if n == 0 {
        return 0;
    }
    let byte = pos / 8;
    let shift = (pos % 8) as u32;
    let mut word = [0u8; 8];
    if byte < data.len() {
        let end = (byte + 8).min(data.len());
        word[..end - byte].copy_from_slice(&data[byte..end]);
    }
    (u64::from_le_bytes(word) >> shift) & low_mask(n)
}

// ─────────────────────────────────────────────────────────────────────────────
// Forward reader
// ─────────────────────────────────────────────────────────────────────────────

/// Reads values in the order a [`BitWriter`](super::BitWriter) wrote them.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data, pos: 0 }
    }

    /// Look at the next `n` bits without consuming them. Bits beyond the end
    /// of the stream read as zero.
    #[inline]
    pub fn peek_bits(&self, n: u32) -> u64 {
        load_bits(self.data, self.pos, n)
    }

    /// Advance by `n` bits; fails if that runs past the end of the stream.
    #[inline]
    pub fn consume(&mut self, n: u32) -> Result<()> {
        let next = self.pos + n as usize;
        if next > self.data.len() * 8 {
            return Err(Error::CorruptFrame("bitstream overrun"));
        }
        self.pos = next;
        Ok(())
    }

    #[inline]
    pub fn read_bits(&mut self, n: u32) -> Result<u64> {
        let v = self.peek_bits(n);
        self.consume(n)?;
        Ok(v)
    }

    /// Bits consumed so far.
    pub fn bit_position(&self) -> usize {
        self.pos
    }

    /// Bytes touched so far (partial trailing byte counts as consumed).
    pub fn bytes_consumed(&self) -> usize {
        self.pos.div_ceil(8)
    }

    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.pos
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backward reader
// ─────────────────────────────────────────────────────────────────────────────

/// Reads a stream closed with
/// [`BitWriter::finish_with_marker`](super::BitWriter::finish_with_marker)
/// from its last value back to its first.
#[derive(Debug, Clone)]
pub struct BackwardBitReader<'a> {
    data: &'a [u8],
    /// Number of payload bits not yet read; the next value ends here.
    pos: usize,
}

impl<'a> BackwardBitReader<'a> {
    /// Locate the end marker in the final byte.
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let last = *data
            .last()
            .ok_or(Error::CorruptFrame("empty backward bitstream"))?;
        if last == 0 {
            return Err(Error::CorruptFrame("bitstream end marker missing"));
        }
        let marker = 7 - last.leading_zeros() as usize;
        Ok(BackwardBitReader {
            data,
            pos: (data.len() - 1) * 8 + marker,
        })
    }

    /// Read the `n` bits written immediately before the current position.
    #[inline]
    pub fn read_bits(&mut self, n: u32) -> Result<u64> {
        let n_us = n as usize;
        if n_us > self.pos {
            return Err(Error::CorruptFrame("bitstream underrun"));
        }
        self.pos -= n_us;
        Ok(load_bits(self.data, self.pos, n))
    }

    pub fn bits_remaining(&self) -> usize {
        self.pos
    }

    /// `true` once every payload bit has been read.
    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitWriter;

    #[test]
    fn forward_reads_in_write_order() {
        let mut w = BitWriter::new();
        let values = [(5u64, 3u32), (0, 1), (1023, 10), (0xABCDE, 20), (1, 1)];
        for &(v, n) in &values {
            w.write_bits(v, n);
        }
        let bytes = w.finish();
        let mut r = BitReader::new(&bytes);
        for &(v, n) in &values {
            assert_eq!(r.read_bits(n).unwrap(), v);
        }
        assert_eq!(r.bit_position(), 35);
        assert_eq!(r.bytes_consumed(), 5);
    }

    #[test]
    fn forward_peek_zero_fills_past_end() {
        let bytes = [0xFFu8];
        let r = BitReader::new(&bytes);
        assert_eq!(r.peek_bits(12), 0x0FF);
    }

    #[test]
    fn forward_overrun_is_error() {
        let bytes = [0x01u8];
        let mut r = BitReader::new(&bytes);
        assert!(r.read_bits(8).is_ok());
        assert_eq!(r.read_bits(1), Err(Error::CorruptFrame("bitstream overrun")));
    }

    #[test]
    fn backward_reads_in_reverse_order() {
        let mut w = BitWriter::new();
        let values = [(3u64, 2u32), (0x1FF, 9), (0, 4), (0x7FFF_FFFF, 31)];
        for &(v, n) in &values {
            w.write_bits(v, n);
        }
        let bytes = w.finish_with_marker();
        let mut r = BackwardBitReader::new(&bytes).unwrap();
        for &(v, n) in values.iter().rev() {
            assert_eq!(r.read_bits(n).unwrap(), v);
        }
        assert!(r.is_empty());
        assert!(r.read_bits(1).is_err());
    }

    #[test]
    fn backward_rejects_missing_marker() {
        assert!(BackwardBitReader::new(&[]).is_err());
        assert!(BackwardBitReader::new(&[0x12, 0x00]).is_err());
    }

    #[test]
    fn backward_marker_only_stream_is_empty() {
        let r = BackwardBitReader::new(&[0x01]).unwrap();
        assert!(r.is_empty());
    }
}
