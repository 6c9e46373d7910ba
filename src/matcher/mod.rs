//! Match finding and parsing.
//!
//! A [`MatchFinder`] indexes input positions by a hash of their first
//! `min_match` bytes and keeps a chain of older positions with the same hash.
//! The parsers in [`parse`] walk one block with it and produce a
//! [`ParsedBlock`]: the literal bytes plus the `(literal run, offset, match
//! length)` sequences that reference earlier input.
//!
//! Positions are absolute indices into the caller's input slice. The slice
//! may start before the block (already-finalized bytes the block may refer
//! back to), and bytes after the block are never read.

pub mod chain;
pub mod parse;

pub use chain::{Match, MatchFinder};
pub use parse::parse_block;

/// One back-reference preceded by a run of literals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sequence {
    /// Literal bytes copied before the match.
    pub lit_len: u32,
    /// Distance back from the current output position (>= 1).
    pub offset: u32,
    /// Bytes copied from `offset` back; may exceed `offset` (overlap).
    pub match_len: u32,
}

/// Parser output for one block. Literals that follow the last sequence stay
/// at the end of `literals`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedBlock {
    pub literals: Vec<u8>,
    pub sequences: Vec<Sequence>,
}

impl ParsedBlock {
    pub fn with_capacity(block_len: usize) -> Self {
        ParsedBlock {
            literals: Vec::with_capacity(block_len),
            sequences: Vec::with_capacity(block_len / 8),
        }
    }

    /// Bytes this block regenerates.
    pub fn regenerated_len(&self) -> usize {
        self.literals.len()
            + self
                .sequences
                .iter()
                .map(|s| s.match_len as usize)
                .sum::<usize>()
    }

    /// Record `src[anchor..start]` as literals followed by a match.
    #[inline]
    pub(crate) fn push(&mut self, src: &[u8], anchor: usize, start: usize, offset: usize, len: usize) {
        self.literals.extend_from_slice(&src[anchor..start]);
        self.sequences.push(Sequence {
            lit_len: (start - anchor) as u32,
            offset: offset as u32,
            match_len: len as u32,
        });
    }

    /// Replay the sequences; the inverse of parsing. `history` holds the
    /// bytes before the block.
    pub fn replay(&self, history: &[u8]) -> Option<Vec<u8>> {
        let mut out = history.to_vec();
        let mut lit = 0usize;
        for s in &self.sequences {
            let ll = s.lit_len as usize;
            out.extend_from_slice(self.literals.get(lit..lit + ll)?);
            lit += ll;
            let from = out.len().checked_sub(s.offset as usize)?;
            for i in 0..s.match_len as usize {
                let b = out[from + i];
                out.push(b);
            }
        }
        out.extend_from_slice(self.literals.get(lit..)?);
        Some(out.split_off(history.len()))
    }
}

/// Length of the common prefix of `src[a..]` and `src[b..]` with `a < b`,
/// not reading at or beyond `limit`.
#[inline]
pub fn common_prefix(src: &[u8], a: usize, b: usize, limit: usize) -> usize {
    debug_assert!(a < b && b <= limit && limit <= src.len());
    let max = limit - b;
    let mut len = 0usize;
    while len + 8 <= max {
        let x = read_u64(src, a + len) ^ read_u64(src, b + len);
        if x != 0 {
            return len + (x.trailing_zeros() / 8) as usize;
        }
        len += 8;
    }
    while len < max && src[a + len] == src[b + len] {
        len += 1;
    }
    len
}

#[inline(always)]
fn read_u64(src: &[u8], pos: usize) -> u64 {
    let mut w = [0u8; 8];
    w.copy_from_slice(&src[pos..pos + 8]);
    u64::from_le_bytes(w)
}
