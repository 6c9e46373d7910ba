//! Block decoder.
//!
//! Decoded bytes are appended to a single output buffer holding everything
//! the frame has produced so far; match offsets reach back into it, bounded
//! by the frame's [`Window`].

use super::literals::decode_literals;
use super::sequences::decode_sequences;
use super::types::{BlockHeader, BlockType, EntropyState};
use crate::bits::ByteReader;
use crate::config::MAX_BLOCK_SIZE;
use crate::error::{Error, Result};
use crate::matcher::Sequence;
use crate::window::Window;

/// Decode one block payload onto the end of `out`.
pub fn decode_block(
    header: &BlockHeader,
    payload: &[u8],
    out: &mut Vec<u8>,
    window: Window,
    state: &mut EntropyState,
) -> Result<()> {
    match header.block_type {
        BlockType::Raw => {
            if payload.len() > MAX_BLOCK_SIZE {
                return Err(Error::CorruptFrame("raw block larger than the block size limit"));
            }
            out.extend_from_slice(payload);
            Ok(())
        }
        BlockType::Rle => {
            let (run, byte) = read_rle(payload)?;
            out.resize(out.len() + run, byte);
            Ok(())
        }
        BlockType::Compressed => decode_compressed(payload, out, window, state),
    }
}

/// Parse an RLE payload into `(run, byte)`.
pub fn read_rle(payload: &[u8]) -> Result<(usize, u8)> {
    let mut r = ByteReader::new(payload);
    let run = r.read_length(MAX_BLOCK_SIZE)?;
    let byte = r.read_u8()?;
    if !r.is_empty() {
        return Err(Error::CorruptFrame("trailing bytes in RLE block"));
    }
    Ok((run, byte))
}

/// Number of bytes a block regenerates, read without decoding it.
pub fn regenerated_len(header: &BlockHeader, payload: &[u8]) -> Result<usize> {
    match header.block_type {
        BlockType::Raw => {
            if payload.len() > MAX_BLOCK_SIZE {
                return Err(Error::CorruptFrame("raw block larger than the block size limit"));
            }
            Ok(payload.len())
        }
        BlockType::Rle => read_rle(payload).map(|(run, _)| run),
        BlockType::Compressed => ByteReader::new(payload).read_length(MAX_BLOCK_SIZE),
    }
}

fn decode_compressed(
    payload: &[u8],
    out: &mut Vec<u8>,
    window: Window,
    state: &mut EntropyState,
) -> Result<()> {
    let mut r = ByteReader::new(payload);
    let regen = r.read_length(MAX_BLOCK_SIZE)?;
    let literals = decode_literals(&mut r, &mut state.huffman)?;
    let sequences = decode_sequences(&mut r, state)?;
    execute_sequences(&literals, &sequences, regen, out, window)
}

/// Rebuild a block from its literals and sequences. Fails unless exactly
/// `regen` bytes come out and every literal is used.
pub fn execute_sequences(
    literals: &[u8],
    sequences: &[Sequence],
    regen: usize,
    out: &mut Vec<u8>,
    window: Window,
) -> Result<()> {
    let start = out.len();
    let limit = start + regen;
    let mut lit = 0usize;

    for s in sequences {
        let ll = s.lit_len as usize;
        let ml = s.match_len as usize;
        let offset = s.offset as usize;

        let run = literals
            .get(lit..lit + ll)
            .ok_or(Error::CorruptFrame("literal run past the end of the literals"))?;
        if out.len() + ll + ml > limit {
            return Err(Error::CorruptFrame("block regenerates more than declared"));
        }
        out.extend_from_slice(run);
        lit += ll;

        window.check_offset(offset, out.len())?;
        copy_match(out, offset, ml);
    }

    let tail = &literals[lit..];
    if out.len() + tail.len() != limit {
        return Err(Error::CorruptFrame("block regenerated size mismatch"));
    }
    out.extend_from_slice(tail);
    Ok(())
}

/// Append `len` bytes copied from `offset` back. Source and destination may
/// overlap, in which case the last `offset` bytes repeat.
#[inline]
fn copy_match(out: &mut Vec<u8>, offset: usize, len: usize) {
    let from = out.len() - offset;
    let mut remaining = len;
    while remaining > 0 {
        // out[from..] has period `offset`; copy whole periods at a time.
        let avail = (out.len() - from) / offset * offset;
        let n = remaining.min(avail);
        out.extend_from_within(from..from + n);
        remaining -= n;
    }
}
