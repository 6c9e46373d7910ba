//! Bit- and byte-level I/O primitives.
//!
//! - [`BitWriter`] packs variable-width codes LSB-first into bytes.
//! - [`BitReader`] reads such a stream front to back (Huffman literals,
//!   table descriptions).
//! - [`BackwardBitReader`] reads a marker-terminated stream back to front
//!   (interleaved FSE sequence streams).
//! - [`ByteReader`] plus the varint helpers handle the byte-aligned parts of
//!   the frame and block headers.

pub mod bytes;
pub mod reader;
pub mod varint;
pub mod writer;

pub use bytes::ByteReader;
pub use reader::{BackwardBitReader, BitReader};
pub use varint::{read_varint, varint_len, write_varint, MAX_VARINT_LEN};
pub use writer::BitWriter;

/// Low `n` bits set (`n < 64`).
#[inline(always)]
pub(crate) fn low_mask(n: u32) -> u64 {
    debug_assert!(n < 64);
    (1u64 << n) - 1
}

/// Index of the highest set bit of a non-zero value (`floor(log2(v))`).
#[inline(always)]
pub fn highbit32(v: u32) -> u32 {
    debug_assert!(v != 0);
    31 - v.leading_zeros()
}
