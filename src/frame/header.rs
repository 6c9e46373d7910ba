//! Frame header serialization and compress-bound functions.

use super::types::{
    FrameInfo, CHECKSUM_LEN, FLAG_CHECKSUM, FLAG_CONTENT_SIZE, FLAG_RESERVED_MASK, FLAG_WINDOW_MASK,
    FLAG_WINDOW_SHIFT, MAGIC, MAX_HEADER_LEN,
};
use crate::bits::{bytes::push_u32_le, varint_len, write_varint, ByteReader};
use crate::config::{MAX_BLOCK_SIZE, WINDOW_LOG_MAX, WINDOW_LOG_MIN};
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Header I/O
// ─────────────────────────────────────────────────────────────────────────────

/// Append the header described by `info` to `out`. `info.header_len` is
/// ignored.
pub fn write_header(info: &FrameInfo, out: &mut Vec<u8>) {
    debug_assert!((WINDOW_LOG_MIN..=WINDOW_LOG_MAX).contains(&info.window_log));
    push_u32_le(out, MAGIC);
    out.push(info.flags());
    if let Some(size) = info.content_size {
        write_varint(out, size);
    }
}

/// Bytes [`write_header`] produces for `info`.
pub fn header_len(info: &FrameInfo) -> usize {
    5 + info.content_size.map_or(0, varint_len)
}

/// Parse and validate the header at the start of `input`.
pub fn parse_header(input: &[u8]) -> Result<FrameInfo> {
    let mut r = ByteReader::new(input);
    let magic = r
        .read_u32_le()
        .map_err(|_| Error::CorruptFrame("input shorter than a frame header"))?;
    if magic != MAGIC {
        return Err(Error::CorruptFrame("bad magic number"));
    }
    let flags = r.read_u8()?;
    if flags & FLAG_RESERVED_MASK != 0 {
        return Err(Error::CorruptFrame("reserved frame flag bits set"));
    }
    let window_log = WINDOW_LOG_MIN + ((flags & FLAG_WINDOW_MASK) >> FLAG_WINDOW_SHIFT);
    let content_size = if flags & FLAG_CONTENT_SIZE != 0 {
        Some(r.read_varint()?)
    } else {
        None
    };
    Ok(FrameInfo {
        window_log,
        content_size,
        has_checksum: flags & FLAG_CHECKSUM != 0,
        header_len: r.position(),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Compress-bound functions
// ─────────────────────────────────────────────────────────────────────────────

/// Worst-case frame size for `len` bytes split into `block_size` blocks,
/// with every optional field present.
///
/// Each block costs at most its raw size plus a one-byte type and a varint
/// length; the encoder falls back to Raw whenever a block would grow.
pub fn compress_bound_with(len: usize, block_size: usize) -> usize {
    let block_size = block_size.clamp(1, MAX_BLOCK_SIZE);
    let blocks = len.div_ceil(block_size).max(1);
    let block_overhead = 1 + varint_len(block_size as u64);
    MAX_HEADER_LEN + CHECKSUM_LEN + len + blocks * block_overhead
}

/// Worst-case frame size for `len` bytes of input at the default block size.
///
/// Output buffers are allocated once at this size.
pub fn compress_bound(len: usize) -> usize {
    compress_bound_with(len, MAX_BLOCK_SIZE)
}
