//! One-shot frame compression.
//!
//! The input is cut into blocks of the level's block size. Small frames, or
//! frames compressed with a single worker, run one [`MatchFinder`] across
//! the whole input and carry entropy tables from block to block. Larger
//! frames with several workers hand blocks to a [`BlockPool`]; every block
//! is then encoded on its own against a bounded prefix of earlier input.

use std::ops::Range;

use super::header::{compress_bound_with, write_header};
use super::types::FrameInfo;
use crate::bits::bytes::push_u32_le;
use crate::block::{encode_block, EncodedBlock, EntropyState};
use crate::config::{CompressOptions, PARALLEL_MIN_BLOCKS};
use crate::error::{Error, Result};
use crate::level::{clamp_level, LevelParams};
use crate::matcher::MatchFinder;
use crate::parallel::BlockPool;
use crate::xxhash::content_checksum;

/// Compress `input` into a single frame.
pub fn compress_frame(input: &[u8], options: &CompressOptions) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }

    let params = options.level_params().adjusted_for(input.len() as u64);
    let blocks = split_blocks(input.len(), params.block_size);
    let workers = options.resolved_workers().min(blocks.len());
    let parallel = workers > 1 && blocks.len() >= PARALLEL_MIN_BLOCKS;

    tracing::debug!(
        level = clamp_level(options.level),
        input_len = input.len(),
        blocks = blocks.len(),
        window_log = params.window_log,
        parallel,
        workers,
        "compressing frame"
    );

    let info = FrameInfo {
        window_log: params.window_log,
        content_size: options.content_size.then_some(input.len() as u64),
        has_checksum: options.checksum,
        header_len: 0,
    };

    let bound = compress_bound_with(input.len(), params.block_size);
    let mut out = Vec::new();
    out.try_reserve_exact(bound)
        .map_err(|e| Error::CompressionFailed(format!("cannot allocate {bound} bytes: {e}")))?;
    write_header(&info, &mut out);

    if parallel {
        let pool = BlockPool::new(workers)?;
        let encoded = pool.encode_blocks(input, &blocks, &params)?;
        tracing::debug!(workers = pool.workers(), blocks = encoded.len(), "parallel blocks encoded");
        write_blocks(&encoded, &mut out);
    } else {
        encode_sequential(input, &blocks, &params, &mut out)?;
    }

    if options.checksum {
        push_u32_le(&mut out, content_checksum(input));
    }

    if out.len() > bound {
        return Err(Error::CompressionFailed(format!(
            "frame of {} bytes exceeds bound {bound}",
            out.len()
        )));
    }
    tracing::debug!(output_len = out.len(), "frame compressed");
    Ok(out)
}

/// Cut `len` bytes into consecutive ranges of `block_size` (the last may be
/// shorter).
pub fn split_blocks(len: usize, block_size: usize) -> Vec<Range<usize>> {
    let block_size = block_size.max(1);
    (0..len)
        .step_by(block_size)
        .map(|start| start..(start + block_size).min(len))
        .collect()
}

fn encode_sequential(
    input: &[u8],
    blocks: &[Range<usize>],
    params: &LevelParams,
    out: &mut Vec<u8>,
) -> Result<()> {
    let mut mf = MatchFinder::new(params, 0);
    let mut state = EntropyState::default();
    for (i, block) in blocks.iter().enumerate() {
        let encoded = encode_block(&mut mf, input, block.clone(), params, &mut state, true)?;
        encoded.write(i + 1 == blocks.len(), out);
    }
    Ok(())
}

fn write_blocks(encoded: &[EncodedBlock], out: &mut Vec<u8>) {
    for (i, block) in encoded.iter().enumerate() {
        block.write(i + 1 == encoded.len(), out);
    }
}
