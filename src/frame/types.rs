//! Frame format constants and the parsed frame header.
//!
//! ```text
//! MAGIC (4 bytes LE) | FLAGS (1 byte) | [ContentSize varint] | Block... | [Checksum 4 bytes LE]
//!
//! FLAGS: bit0 = content size present
//!        bit1 = checksum present
//!        bits2-4 = window log - 17
//!        bits5-7 = reserved, zero
//! ```

use crate::bits::MAX_VARINT_LEN;
use crate::config::WINDOW_LOG_MIN;
use crate::window::Window;

// ─────────────────────────────────────────────────────────────────────────────
// Frame format constants
// ─────────────────────────────────────────────────────────────────────────────

/// Frame magic number, stored little-endian (`A8 B5 2F FD`).
pub const MAGIC: u32 = 0xFD2F_B5A8;

pub const MAGIC_LEN: usize = 4;

/// Size of the trailing content checksum.
pub const CHECKSUM_LEN: usize = 4;

/// Smallest possible header: magic plus flags.
pub const MIN_HEADER_LEN: usize = MAGIC_LEN + 1;

/// Largest possible header: magic, flags and a ten-byte content size.
pub const MAX_HEADER_LEN: usize = MIN_HEADER_LEN + MAX_VARINT_LEN;

pub const FLAG_CONTENT_SIZE: u8 = 0x01;
pub const FLAG_CHECKSUM: u8 = 0x02;
pub const FLAG_WINDOW_SHIFT: u8 = 2;
pub const FLAG_WINDOW_MASK: u8 = 0x1C;
pub const FLAG_RESERVED_MASK: u8 = 0xE0;

// ─────────────────────────────────────────────────────────────────────────────
// FrameInfo
// ─────────────────────────────────────────────────────────────────────────────

/// Everything the frame header declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameInfo {
    /// log2 of the window the decoder must keep addressable (17..=24).
    pub window_log: u8,
    /// Exact decompressed size, when the encoder recorded it.
    pub content_size: Option<u64>,
    /// Whether a content checksum follows the last block.
    pub has_checksum: bool,
    /// Bytes occupied by the header.
    pub header_len: usize,
}

impl FrameInfo {
    #[inline]
    pub fn window(&self) -> Window {
        Window::from_log(self.window_log)
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window().size()
    }

    /// FLAGS byte for this header.
    pub fn flags(&self) -> u8 {
        let mut flags = (self.window_log - WINDOW_LOG_MIN) << FLAG_WINDOW_SHIFT;
        if self.content_size.is_some() {
            flags |= FLAG_CONTENT_SIZE;
        }
        if self.has_checksum {
            flags |= FLAG_CHECKSUM;
        }
        flags
    }
}
