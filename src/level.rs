//! Compression level policy.
//!
//! A level is an integer in `MIN_LEVEL..=MAX_LEVEL` that selects match-finder
//! effort and entropy aggressiveness. Levels outside the range are clamped,
//! never rejected; `0` selects [`DEFAULT_LEVEL`].
//!
//! Negative levels reuse the level-0 row of the table below with a growing
//! acceleration (how fast the fast parser skips over unmatched input) and
//! raw literals.

use crate::config::{DEFAULT_LEVEL, MAX_BLOCK_SIZE};
use crate::window::window_log_for;

pub const MIN_LEVEL: i32 = -7;
pub const MAX_LEVEL: i32 = 22;

/// Smallest hash/chain table log the source-size adjustment goes down to.
const MIN_TABLE_LOG: u8 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Strategy
// ─────────────────────────────────────────────────────────────────────────────

/// How the parser turns match candidates into sequences.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Strategy {
    /// Single-candidate hash table, accelerated skipping over misses.
    Fast,
    /// Hash chain; take the best match at the current position.
    Greedy,
    /// Hash chain; also try one position ahead before committing.
    Lazy,
    /// Hash chain; try up to two positions ahead.
    Lazy2,
}

impl Strategy {
    /// `true` if the strategy keeps a chain table.
    pub fn uses_chain(self) -> bool {
        !matches!(self, Strategy::Fast)
    }

    /// Positions looked ahead before committing to a match.
    pub fn lookahead(self) -> u32 {
        match self {
            Strategy::Fast | Strategy::Greedy => 0,
            Strategy::Lazy => 1,
            Strategy::Lazy2 => 2,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Everything a level decides.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LevelParams {
    /// log2 of the largest back-reference distance.
    pub window_log: u8,
    /// log2 of the number of hash-head slots.
    pub hash_log: u8,
    /// log2 of the chain table size (0 for [`Strategy::Fast`]).
    pub chain_log: u8,
    /// Maximum number of chain candidates probed per position.
    pub search_depth: u32,
    /// Stop searching once a match this long is found (0 = never stop early).
    pub target_length: u32,
    /// Shortest match the parser emits; also the hashed prefix length.
    pub min_match: u32,
    pub strategy: Strategy,
    /// Skip-ahead factor for the fast parser (1 = probe every position).
    pub acceleration: u32,
    /// Huffman-code literals (otherwise literals are stored raw or RLE).
    pub huffman_literals: bool,
    /// Upper bound on FSE table logs for the sequence streams.
    pub fse_max_log: u8,
    pub block_size: usize,
}

struct Row {
    window_log: u8,
    hash_log: u8,
    chain_log: u8,
    search_log: u8,
    min_match: u8,
    target_length: u32,
    strategy: Strategy,
}

macro_rules! row {
    ($w:expr, $h:expr, $c:expr, $s:expr, $mm:expr, $tl:expr, $st:ident) => {
        Row {
            window_log: $w,
            hash_log: $h,
            chain_log: $c,
            search_log: $s,
            min_match: $mm,
            target_length: $tl,
            strategy: Strategy::$st,
        }
    };
}

/// Level → parameter table. Index is the level; row 0 is the base for
/// negative levels.
///
/// Columns: window log, hash log, chain log, log2(search depth), min match,
/// target length, strategy.
static LEVEL_TABLE: [Row; (MAX_LEVEL + 1) as usize] = [
    row!(19, 13,  0,  0, 4,   0, Fast),   /* base for negative levels */
    row!(19, 14,  0,  0, 4,   0, Fast),   /*  1 */
    row!(20, 16,  0,  0, 4,   0, Fast),   /*  2 */
    row!(21, 17, 16,  1, 4,   0, Greedy), /*  3 */
    row!(21, 18, 18,  2, 4,   0, Greedy), /*  4 */
    row!(21, 18, 19,  3, 4,   8, Lazy),   /*  5 */
    row!(21, 19, 19,  3, 4,  16, Lazy),   /*  6 */
    row!(21, 19, 20,  4, 4,  16, Lazy),   /*  7 */
    row!(21, 19, 20,  4, 4,  24, Lazy2),  /*  8 */
    row!(22, 20, 21,  4, 4,  32, Lazy2),  /*  9 */
    row!(22, 20, 21,  5, 4,  32, Lazy2),  /* 10 */
    row!(22, 21, 22,  6, 4,  48, Lazy2),  /* 11 */
    row!(22, 21, 22,  6, 4,  64, Lazy2),  /* 12 */
    row!(22, 21, 22,  7, 4,  64, Lazy2),  /* 13 */
    row!(22, 21, 22,  7, 3,  96, Lazy2),  /* 14 */
    row!(22, 22, 22,  8, 3, 128, Lazy2),  /* 15 */
    row!(22, 22, 22,  8, 3, 192, Lazy2),  /* 16 */
    row!(23, 22, 23,  9, 3, 192, Lazy2),  /* 17 */
    row!(23, 22, 23,  9, 3, 256, Lazy2),  /* 18 */
    row!(23, 22, 23, 10, 3, 256, Lazy2),  /* 19 */
    row!(24, 22, 23, 10, 3, 384, Lazy2),  /* 20 */
    row!(24, 22, 23, 11, 3, 512, Lazy2),  /* 21 */
    row!(24, 22, 23, 12, 3, 999, Lazy2),  /* 22 */
];

/// Clamp a caller-supplied level into the supported range.
#[inline]
pub fn clamp_level(level: i32) -> i32 {
    if level == 0 {
        return DEFAULT_LEVEL;
    }
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Parameters for `level` (clamped first).
pub fn params_for(level: i32) -> LevelParams {
    let level = clamp_level(level);
    let row = &LEVEL_TABLE[level.max(0) as usize];
    let acceleration = if level < 0 { (1 - level) as u32 } else { 1 };
    LevelParams {
        window_log: row.window_log,
        hash_log: row.hash_log,
        chain_log: row.chain_log,
        search_depth: 1 << row.search_log,
        target_length: row.target_length,
        min_match: u32::from(row.min_match),
        strategy: row.strategy,
        acceleration,
        huffman_literals: level > 0,
        fse_max_log: match level {
            i32::MIN..=0 => 6,
            1..=4 => 8,
            _ => 9,
        },
        block_size: MAX_BLOCK_SIZE,
    }
}

/// `ceil(log2(v))` for `v >= 1`.
#[inline]
fn ceil_log2(v: u64) -> u8 {
    if v <= 1 {
        0
    } else {
        (64 - (v - 1).leading_zeros()) as u8
    }
}

impl LevelParams {
    /// Shrink the window and tables so they are no larger than `src_len`
    /// needs. Never grows anything.
    pub fn adjusted_for(mut self, src_len: u64) -> Self {
        let src_log = ceil_log2(src_len.max(1));
        self.window_log = window_log_for(src_len, self.window_log);
        let table_cap = src_log.max(MIN_TABLE_LOG);
        self.hash_log = self.hash_log.min(table_cap + 1);
        if self.strategy.uses_chain() {
            self.chain_log = self.chain_log.min(table_cap);
        }
        self
    }

    /// Largest back-reference distance.
    #[inline]
    pub fn window_size(&self) -> usize {
        1usize << self.window_log
    }
}
