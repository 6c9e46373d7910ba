//! Error taxonomy shared by the compressor and the decompressor.
//!
//! Every failure is returned to the caller as an [`Error`] value; no code path
//! in the codec panics on malformed input. Corruption and size mismatches are
//! deterministic for a given input, so nothing here is retried internally.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors returned by [`compress`](crate::compress) and
/// [`decompress`](crate::decompress).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller passed a zero-length input.
    #[error("empty input")]
    EmptyInput,

    /// The compressed bytes are malformed or truncated.
    #[error("corrupt frame: {0}")]
    CorruptFrame(&'static str),

    /// The content checksum stored in the frame does not match the decoded bytes.
    #[error("checksum mismatch: frame says 0x{expected:08x}, content hashes to 0x{actual:08x}")]
    ChecksumFailed { expected: u32, actual: u32 },

    /// The declared content size disagrees with the number of decoded bytes.
    #[error("size mismatch: frame declares {declared} bytes, decoded {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    /// Internal invariant violated while compressing.
    #[error("compression failed: {0}")]
    CompressionFailed(String),

    /// Internal invariant violated while decompressing.
    #[error("decompression failed: {0}")]
    DecompressionFailed(String),
}

impl Error {
    /// Stable snake_case name of the variant.
    pub fn category(&self) -> &'static str {
        match self {
            Error::EmptyInput => "empty_input",
            Error::CorruptFrame(_) => "corrupt_frame",
            Error::ChecksumFailed { .. } => "checksum_failed",
            Error::SizeMismatch { .. } => "size_mismatch",
            Error::CompressionFailed(_) => "compression_failed",
            Error::DecompressionFailed(_) => "decompression_failed",
        }
    }

    /// `true` for errors caused by the bytes handed to the decoder rather
    /// than by a defect in the codec.
    pub fn is_data_error(&self) -> bool {
        matches!(
            self,
            Error::CorruptFrame(_) | Error::ChecksumFailed { .. } | Error::SizeMismatch { .. }
        )
    }
}
