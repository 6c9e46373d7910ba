//! `zframe` compresses a byte buffer into one self-describing frame and
//! back.
//!
//! ```
//! let data = b"hello hello hello hello hello hello".repeat(100);
//! let frame = zframe::compress(&data, 3).unwrap();
//! assert!(frame.len() < data.len());
//! assert_eq!(zframe::decompress(&frame).unwrap(), data);
//! ```

pub mod bits;
pub mod block;
pub mod config;
pub mod entropy;
pub mod error;
pub mod frame;
pub mod level;
pub mod matcher;
pub mod parallel;
pub mod window;
pub mod xxhash;

pub use config::{CompressOptions, DEFAULT_LEVEL};
pub use error::{Error, Result};
pub use frame::FrameInfo;
pub use level::{MAX_LEVEL, MIN_LEVEL};

// ── Version constants ─────────────────────────────────────────────────────────
pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version string.
pub fn version_string() -> &'static str {
    VERSION_STRING
}

// ── One-shot API ──────────────────────────────────────────────────────────────

/// Compress `input` at `level` with default options.
///
/// Levels outside [`MIN_LEVEL`]`..=`[`MAX_LEVEL`] are clamped; `0` selects
/// [`DEFAULT_LEVEL`]. Fails with [`Error::EmptyInput`] on an empty slice.
pub fn compress(input: &[u8], level: i32) -> Result<Vec<u8>> {
    frame::compress_frame(input, &CompressOptions::with_level(level))
}

/// Compress `input` with explicit [`CompressOptions`]: level, checksum,
/// content size, block size and worker count.
pub fn compress_with(input: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    frame::compress_frame(input, options)
}

/// Decompress one frame. The whole of `input` must be that frame.
///
/// The output is allocated up front from the block headers, and a few bytes
/// of RLE block can declare a full 128 KiB run. Callers handling untrusted
/// input should check [`decompressed_size`] against their own limit first.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>> {
    frame::decompress_frame(input)
}

/// Largest frame [`compress`] can produce for `len` bytes of input.
pub fn compress_bound(len: usize) -> usize {
    frame::compress_bound(len)
}

/// Parse and validate the frame header only.
pub fn frame_info(input: &[u8]) -> Result<FrameInfo> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }
    frame::parse_header(input)
}

/// Exact size [`decompress`] would return, computed from block headers
/// without decoding.
pub fn decompressed_size(input: &[u8]) -> Result<usize> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }
    frame::decompressed_size(input)
}
