//! Block parsers: turn one block of input into literals and sequences.
//!
//! - [`Strategy::Fast`] probes a single hash-table candidate per position and
//!   skips ahead faster the longer it goes without a match.
//! - [`Strategy::Greedy`] takes the best chain match at each position.
//! - [`Strategy::Lazy`] / [`Strategy::Lazy2`] look one or two positions
//!   ahead and defer when a later match is worth more.
//!
//! Every emitted match is extended backwards over matching literals, is at
//! least `min_match` long, and ends at or before the block end.

use std::ops::Range;

use super::{common_prefix, Match, MatchFinder, ParsedBlock};
use crate::bits::highbit32;
use crate::level::{LevelParams, Strategy};

/// Misses before the fast parser's step grows by one.
const SKIP_TRIGGER: u32 = 6;

/// Misses before the chain parsers start skipping (`step = gap >> 8 + 1`).
const SEARCH_STRENGTH: u32 = 8;

/// Parse `src[block]`. Bytes of `src` before `block.start` are history the
/// block may reference if `mf` has indexed them.
pub fn parse_block(
    mf: &mut MatchFinder,
    src: &[u8],
    block: Range<usize>,
    params: &LevelParams,
) -> ParsedBlock {
    let mut out = ParsedBlock::with_capacity(block.len());
    match params.strategy {
        Strategy::Fast => parse_fast(mf, src, block.clone(), params.acceleration, &mut out),
        Strategy::Greedy | Strategy::Lazy | Strategy::Lazy2 => {
            parse_lazy(mf, src, block.clone(), params.strategy.lookahead(), &mut out)
        }
    }
    tracing::trace!(
        block_len = block.len(),
        sequences = out.sequences.len(),
        literals = out.literals.len(),
        "block parsed"
    );
    out
}

/// Extend a match starting at `start` backwards while the preceding bytes
/// agree and stay above `anchor` and `lowest`.
#[inline]
fn catch_up(src: &[u8], anchor: usize, lowest: usize, mut start: usize, offset: usize, mut len: usize) -> (usize, usize) {
    while start > anchor && start - offset > lowest && src[start - 1] == src[start - 1 - offset] {
        start -= 1;
        len += 1;
    }
    (start, len)
}

fn parse_fast(mf: &mut MatchFinder, src: &[u8], block: Range<usize>, acceleration: u32, out: &mut ParsedBlock) {
    let end = block.end;
    let min_match = mf.min_match();
    let hash_reach = min_match.max(4);
    let mut anchor = block.start;
    let mut ip = block.start;
    let mut search_nb = acceleration << SKIP_TRIGGER;

    while ip + hash_reach <= end {
        let candidate = mf
            .probe_and_insert(src, ip)
            .filter(|&c| src[c..c + min_match] == src[ip..ip + min_match]);
        let Some(cand) = candidate else {
            ip += (search_nb >> SKIP_TRIGGER) as usize;
            search_nb += 1;
            continue;
        };

        let offset = ip - cand;
        let len = min_match + common_prefix(src, cand + min_match, ip + min_match, end);
        let (start, len) = catch_up(src, anchor, mf.lowest_valid(ip), ip, offset, len);
        out.push(src, anchor, start, offset, len);

        ip = start + len;
        anchor = ip;
        search_nb = acceleration << SKIP_TRIGGER;
        // Keep the table warm inside long matches.
        if ip >= 2 && ip - 2 > start && ip - 2 + hash_reach <= end {
            mf.insert_one(src, ip - 2);
        }
    }
    out.literals.extend_from_slice(&src[anchor..end]);
}

/// Value of a match: four points per byte minus the offset's bit cost.
#[inline]
fn gain(m: &Match) -> i64 {
    (m.len as i64) * 4 - i64::from(highbit32(m.offset as u32 + 1))
}

fn parse_lazy(mf: &mut MatchFinder, src: &[u8], block: Range<usize>, lookahead: u32, out: &mut ParsedBlock) {
    let end = block.end;
    let min_match = mf.min_match();
    let mut anchor = block.start;
    let mut ip = block.start;

    while ip < end {
        let Some(mut best) = mf.find_best(src, ip, end) else {
            if ip + min_match.max(4) > end {
                break;
            }
            ip += ((ip - anchor) >> SEARCH_STRENGTH) + 1;
            continue;
        };
        let mut start = ip;

        // Defer while a later position offers a better match.
        let mut cur = ip;
        'defer: while lookahead > 0 {
            for step in 1..=lookahead {
                let next = cur + step as usize;
                if next + min_match.max(4) > end {
                    break 'defer;
                }
                // Each step of delay costs one literal.
                let bias = if step == 1 { 4 } else { 7 };
                if let Some(m) = mf.find_best(src, next, end) {
                    if gain(&m) > gain(&best) + bias {
                        best = m;
                        start = next;
                        cur = next;
                        continue 'defer;
                    }
                }
            }
            break;
        }

        let (start, len) = catch_up(src, anchor, mf.lowest_valid(start), start, best.offset, best.len);
        out.push(src, anchor, start, best.offset, len);
        ip = start + len;
        anchor = ip;
    }
    out.literals.extend_from_slice(&src[anchor..end]);
}
