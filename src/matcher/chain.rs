//! Hash-head and hash-chain index over input positions.
//!
//! `head[h]` holds the most recent position whose prefix hashes to `h`;
//! `chain[p & chain_mask]` holds the position inserted before `p` with the
//! same hash. Entries store `position - base + 1` so that zero means empty.
//! When positions grow past [`REBASE_THRESHOLD`] the stored values are
//! shifted down and anything that falls out of the window is dropped.

use super::common_prefix;
use crate::level::LevelParams;

/// Knuth multiplicative hash constant.
const PRIME32: u32 = 2_654_435_761;

/// Relative positions beyond this trigger a rebase of stored entries.
const REBASE_THRESHOLD: usize = 1 << 31;

/// A candidate back-reference at some position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Match {
    pub offset: usize,
    pub len: usize,
}

#[derive(Debug, Clone)]
pub struct MatchFinder {
    head: Vec<u32>,
    chain: Vec<u32>,
    chain_mask: usize,
    hash_log: u8,
    min_match: usize,
    search_depth: u32,
    target_length: usize,
    window_size: usize,
    /// Absolute position of relative position 0.
    base: usize,
    /// Lowest absolute position that was ever indexed; nothing before it is
    /// visible.
    low_limit: usize,
    /// Next absolute position to insert.
    next_to_update: usize,
}

impl MatchFinder {
    /// Allocate tables sized by `params`. Indexing starts at `start`.
    pub fn new(params: &LevelParams, start: usize) -> Self {
        let chain_len = if params.strategy.uses_chain() {
            1usize << params.chain_log
        } else {
            0
        };
        MatchFinder {
            head: vec![0; 1 << params.hash_log],
            chain: vec![0; chain_len],
            chain_mask: chain_len.wrapping_sub(1),
            hash_log: params.hash_log,
            min_match: params.min_match as usize,
            search_depth: params.search_depth.max(1),
            target_length: if params.target_length == 0 {
                usize::MAX
            } else {
                params.target_length as usize
            },
            window_size: params.window_size(),
            base: start,
            low_limit: start,
            next_to_update: start,
        }
    }

    #[inline]
    pub fn min_match(&self) -> usize {
        self.min_match
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Lowest position a match starting at `pos` may reference.
    #[inline]
    pub fn lowest_valid(&self, pos: usize) -> usize {
        pos.saturating_sub(self.window_size).max(self.low_limit)
    }

    #[inline]
    fn hash(&self, src: &[u8], pos: usize) -> usize {
        let v = if self.min_match >= 4 {
            u32::from_le_bytes([src[pos], src[pos + 1], src[pos + 2], src[pos + 3]])
        } else {
            (u32::from(src[pos]) | u32::from(src[pos + 1]) << 8 | u32::from(src[pos + 2]) << 16) << 8
        };
        (v.wrapping_mul(PRIME32) >> (32 - u32::from(self.hash_log))) as usize
    }

    #[inline]
    fn encode_pos(&self, pos: usize) -> u32 {
        (pos - self.base + 1) as u32
    }

    #[inline]
    fn decode_pos(&self, entry: u32) -> Option<usize> {
        (entry != 0).then(|| self.base + entry as usize - 1)
    }

    /// Shift stored entries down so relative positions stay within `u32`.
    fn rebase(&mut self, pos: usize) {
        let keep_from = pos.saturating_sub(self.window_size).max(self.base);
        let shift = (keep_from - self.base) as u32;
        for e in self.head.iter_mut().chain(self.chain.iter_mut()) {
            *e = e.saturating_sub(shift);
        }
        self.base = keep_from;
        self.low_limit = self.low_limit.max(keep_from);
        tracing::trace!(base = self.base, "match finder rebased");
    }

    /// Index every position in `[next_to_update, target)` whose hashed
    /// prefix lies before `end`.
    pub fn insert_up_to(&mut self, src: &[u8], target: usize, end: usize) {
        if target.saturating_sub(self.base) >= REBASE_THRESHOLD {
            self.rebase(target);
        }
        let last = end.saturating_sub(self.min_match.max(4) - 1).min(target);
        let mut pos = self.next_to_update;
        while pos < last {
            let h = self.hash(src, pos);
            if !self.chain.is_empty() {
                self.chain[pos & self.chain_mask] = self.head[h];
            }
            self.head[h] = self.encode_pos(pos);
            pos += 1;
        }
        self.next_to_update = self.next_to_update.max(last);
    }

    /// Best match at `pos` whose length stays within `end`.
    ///
    /// Candidates are probed from most to least recent and only a strictly
    /// longer match replaces the current best, so among equal lengths the
    /// smallest offset wins.
    pub fn find_best(&mut self, src: &[u8], pos: usize, end: usize) -> Option<Match> {
        if pos + self.min_match.max(4) > end {
            return None;
        }
        self.insert_up_to(src, pos, end);
        let lowest = self.lowest_valid(pos);
        let h = self.hash(src, pos);
        let mut candidate = self.decode_pos(self.head[h]);
        let max_len = end - pos;

        let mut best: Option<Match> = None;
        let mut best_len = self.min_match - 1;
        let mut depth = self.search_depth;
        while let Some(cand) = candidate {
            if cand < lowest || cand >= pos || depth == 0 {
                break;
            }
            depth -= 1;
            if src[cand + best_len] == src[pos + best_len] {
                let len = common_prefix(src, cand, pos, end);
                if len > best_len {
                    best_len = len;
                    best = Some(Match { offset: pos - cand, len });
                    if len >= self.target_length || len == max_len {
                        break;
                    }
                }
            }
            if self.chain.is_empty() || pos - cand > self.chain_mask {
                break;
            }
            let next = self.decode_pos(self.chain[cand & self.chain_mask]);
            candidate = next.filter(|&n| n < cand);
        }
        best
    }

    /// Single-probe lookup for the fast parser: return the most recent
    /// position with the same hash (if inside the window) and make `pos` the
    /// new head.
    pub fn probe_and_insert(&mut self, src: &[u8], pos: usize) -> Option<usize> {
        if pos.saturating_sub(self.base) >= REBASE_THRESHOLD {
            self.rebase(pos);
        }
        let h = self.hash(src, pos);
        let prev = self.decode_pos(self.head[h]);
        self.head[h] = self.encode_pos(pos);
        prev.filter(|&p| p >= self.lowest_valid(pos) && p < pos)
    }

    /// Index one position for the fast parser (no lookup).
    pub fn insert_one(&mut self, src: &[u8], pos: usize) {
        let h = self.hash(src, pos);
        self.head[h] = self.encode_pos(pos);
    }
}
