//! Parallel block encoding.
//!
//! Blocks are encoded on a fixed-size [`rayon`] pool. Each job indexes a
//! bounded slice of the read-only input that precedes its block, encodes the
//! block without inheriting entropy tables, and sends `(index, result)` back
//! over a [`crossbeam_channel`]. Results are dropped into slots indexed by
//! block number, so completion order never affects the frame layout.

use std::ops::Range;

use crossbeam_channel::unbounded;

use crate::block::{encode_block, EncodedBlock, EntropyState};
use crate::config::PARALLEL_PREFIX_MAX;
use crate::error::{Error, Result};
use crate::level::LevelParams;
use crate::matcher::MatchFinder;
use crate::window::Window;

/// Worker pool for one frame.
pub struct BlockPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl BlockPool {
    /// Build a pool with `workers` threads (at least one).
    pub fn new(workers: usize) -> Result<Self> {
        let workers = workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("zframe-block-{i}"))
            .build()
            .map_err(|e| Error::CompressionFailed(format!("thread pool: {e}")))?;
        Ok(BlockPool { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Encode every range in `blocks` (which must be ordered and
    /// non-overlapping sub-ranges of `src`). The returned vector is in
    /// block order.
    pub fn encode_blocks(
        &self,
        src: &[u8],
        blocks: &[Range<usize>],
        params: &LevelParams,
    ) -> Result<Vec<EncodedBlock>> {
        let (tx, rx) = unbounded::<(usize, Result<EncodedBlock>)>();

        self.pool.scope(|s| {
            for (index, block) in blocks.iter().cloned().enumerate() {
                let tx = tx.clone();
                s.spawn(move |_| {
                    let result = encode_independent(src, block, params);
                    // The receiver outlives the scope.
                    let _ = tx.send((index, result));
                });
            }
        });
        drop(tx);

        let mut slots: Vec<Option<EncodedBlock>> = vec![None; blocks.len()];
        for (index, result) in rx.iter() {
            slots[index] = Some(result?);
        }
        slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.ok_or_else(|| Error::CompressionFailed(format!("block {i} produced no result")))
            })
            .collect()
    }
}

/// Encode `src[block]` with a fresh match finder that has indexed at most
/// [`PARALLEL_PREFIX_MAX`] bytes of history before the block.
pub fn encode_independent(src: &[u8], block: Range<usize>, params: &LevelParams) -> Result<EncodedBlock> {
    let prefix = Window::new(params.window_size()).prefix(block.start, PARALLEL_PREFIX_MAX);
    let local = params.adjusted_for((block.end - prefix.start) as u64);
    let mut mf = MatchFinder::new(&local, prefix.start);
    mf.insert_up_to(src, block.start, block.end);
    let mut state = EntropyState::default();
    encode_block(&mut mf, src, block, &local, &mut state, false)
}
