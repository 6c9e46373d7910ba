// config.rs - Compile-time constants and per-call compression options.
//
// There is no runtime configuration source: no environment variables, no
// files. Callers tune a single call through `CompressOptions`.

use crate::level::{self, LevelParams};

// Default compression level, used for level 0 and by `CompressOptions::default()`.
pub const DEFAULT_LEVEL: i32 = 3;

// Largest block payload the encoder produces and the decoder accepts for Raw
// blocks and regenerated content.
pub const MAX_BLOCK_SIZE: usize = 128 * 1024;

// Compressed payloads may carry a few bytes of headers beyond the raw size
// before the encoder falls back to Raw; the decoder allows this much slack.
pub const BLOCK_PAYLOAD_SLACK: usize = 64;

// Shortest match a sequence may describe (smallest match-length baseline).
pub const MIN_MATCH: u32 = 3;

// Window log range encodable in the frame FLAGS byte (3 bits, offset 17).
pub const WINDOW_LOG_MIN: u8 = 17;
pub const WINDOW_LOG_MAX: u8 = 24;

// Frames with fewer blocks than this are always encoded on the calling thread.
pub const PARALLEL_MIN_BLOCKS: usize = 8;

// Bytes of already-finalized input a parallel worker indexes before its
// block. Bounds per-worker table memory.
pub const PARALLEL_PREFIX_MAX: usize = 1 << 20;

// Upper bound on worker threads selectable through `CompressOptions::workers`.
pub const MAX_WORKERS: usize = 256;

/// Options for a single [`compress_with`](crate::compress_with) call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressOptions {
    /// Compression level; clamped to `-7..=22`, 0 means [`DEFAULT_LEVEL`].
    pub level: i32,
    /// Append the content checksum.
    pub checksum: bool,
    /// Store the content size in the frame header.
    pub content_size: bool,
    /// Block size override, clamped to `1..=MAX_BLOCK_SIZE`. `None` takes
    /// the level's block size.
    pub block_size: Option<usize>,
    /// Worker threads for block encoding. 0 = one per logical CPU, 1 =
    /// always sequential.
    pub workers: usize,
}

impl Default for CompressOptions {
    fn default() -> Self {
        CompressOptions {
            level: DEFAULT_LEVEL,
            checksum: true,
            content_size: true,
            block_size: None,
            workers: 1,
        }
    }
}

impl CompressOptions {
    pub fn with_level(level: i32) -> Self {
        CompressOptions { level, ..Self::default() }
    }

    /// Level parameters with the block-size override applied.
    pub fn level_params(&self) -> LevelParams {
        let mut params = level::params_for(self.level);
        if let Some(bs) = self.block_size {
            params.block_size = bs.clamp(1, MAX_BLOCK_SIZE);
        }
        params
    }

    /// Effective worker count.
    pub fn resolved_workers(&self) -> usize {
        let n = if self.workers == 0 { num_cpus::get() } else { self.workers };
        n.clamp(1, MAX_WORKERS)
    }
}
