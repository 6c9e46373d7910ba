//! Block encoder: picks the cheapest of Raw, RLE and Compressed for one
//! block of input.

use std::ops::Range;

use super::literals::encode_literals;
use super::sequences::encode_sequences;
use super::types::{BlockType, EncodedBlock, EntropyState};
use crate::bits::write_varint;
use crate::entropy::single_symbol;
use crate::error::{Error, Result};
use crate::level::LevelParams;
use crate::matcher::{parse_block, MatchFinder};

/// Encode `src[block]`.
///
/// `mf` must have indexed whatever history before `block.start` the block is
/// allowed to reference; it is advanced over the block either way so the
/// next block can refer back into this one. `state` is replaced only when
/// the result is a Compressed block.
pub fn encode_block(
    mf: &mut MatchFinder,
    src: &[u8],
    block: Range<usize>,
    params: &LevelParams,
    state: &mut EntropyState,
    allow_repeat: bool,
) -> Result<EncodedBlock> {
    let content = &src[block.clone()];
    let len = content.len();

    if len > 1 {
        if let Some(b) = single_symbol(content) {
            // Keep the finder in step with the input even though no matches
            // are needed here.
            mf.insert_up_to(src, block.end, block.end);
            let mut payload = Vec::with_capacity(6);
            write_varint(&mut payload, len as u64);
            payload.push(b);
            return Ok(finish(BlockType::Rle, payload, len));
        }
    }

    let parsed = parse_block(mf, src, block, params);
    if parsed.regenerated_len() != len {
        return Err(Error::CompressionFailed(format!(
            "parser covered {} of {} bytes",
            parsed.regenerated_len(),
            len
        )));
    }

    let mut next = state.clone();
    let mut payload = Vec::with_capacity(len / 2 + 16);
    write_varint(&mut payload, len as u64);
    encode_literals(
        &parsed.literals,
        params.huffman_literals,
        allow_repeat,
        &mut next.huffman,
        &mut payload,
    )?;
    encode_sequences(&parsed.sequences, params.fse_max_log, allow_repeat, &mut next, &mut payload)?;

    if payload.len() < len {
        *state = next;
        return Ok(finish(BlockType::Compressed, payload, len));
    }
    Ok(finish(BlockType::Raw, content.to_vec(), len))
}

fn finish(block_type: BlockType, payload: Vec<u8>, content_len: usize) -> EncodedBlock {
    tracing::trace!(
        block_type = block_type.name(),
        content_len,
        payload_len = payload.len(),
        "block encoded"
    );
    EncodedBlock {
        block_type,
        payload,
        content_len,
    }
}
