//! Sliding window over already-finalized bytes.
//!
//! Both directions keep the whole content in one buffer (the input slice
//! when compressing, the output vector when decompressing), so the window
//! is a view: it only decides how far back from a position a match may
//! reach.

use std::ops::Range;

use crate::config::{WINDOW_LOG_MAX, WINDOW_LOG_MIN};
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    size: usize,
}

impl Window {
    pub fn new(size: usize) -> Self {
        Window { size: size.max(1) }
    }

    /// Window of `2^log` bytes, `log` clamped to the frame's supported range.
    pub fn from_log(log: u8) -> Self {
        Window::new(1usize << log.clamp(WINDOW_LOG_MIN, WINDOW_LOG_MAX))
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Lowest position a match at `pos` may reference.
    #[inline]
    pub fn floor(&self, pos: usize) -> usize {
        pos.saturating_sub(self.size)
    }

    /// History before `pos` worth indexing, at most `cap` bytes.
    pub fn prefix(&self, pos: usize, cap: usize) -> Range<usize> {
        pos.saturating_sub(self.size.min(cap))..pos
    }

    /// Check that a match `offset` back from a cursor with `produced` bytes
    /// behind it stays inside both the produced data and the window.
    #[inline]
    pub fn check_offset(&self, offset: usize, produced: usize) -> Result<()> {
        if offset == 0 || offset > produced || offset > self.size {
            return Err(Error::CorruptFrame("match offset out of range"));
        }
        Ok(())
    }
}

/// Smallest window log, within the supported range, that covers `len`
/// bytes of content.
pub fn window_log_for(len: u64, max_log: u8) -> u8 {
    let mut log = WINDOW_LOG_MIN;
    while log < max_log.min(WINDOW_LOG_MAX) && (1u64 << log) < len {
        log += 1;
    }
    log
}
