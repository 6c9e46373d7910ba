//! Entropy coders used by compressed blocks.
//!
//! [`fse`] codes the sequence streams (literal-length, offset and
//! match-length codes); [`huffman`] codes literal bytes. Both are usable on
//! their own through `encode`/`decode` pairs.

pub mod fse;
pub mod huffman;

pub use fse::{FseTable, NormalizedCounts};
pub use huffman::HuffmanTable;

/// Byte histogram: entry `s` counts occurrences of `s`. The vector is
/// trimmed to the largest symbol present (empty for empty input).
pub fn histogram(symbols: &[u8]) -> Vec<u32> {
    let mut counts = [0u32; 256];
    for &s in symbols {
        counts[s as usize] += 1;
    }
    let len = counts.iter().rposition(|&c| c > 0).map_or(0, |m| m + 1);
    counts[..len].to_vec()
}

/// `Some(s)` if every element equals `s`.
pub fn single_symbol(symbols: &[u8]) -> Option<u8> {
    let (&first, rest) = symbols.split_first()?;
    rest.iter().all(|&s| s == first).then_some(first)
}
