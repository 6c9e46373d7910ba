//! Content checksum: the low 32 bits of XXH64 (seed 0) over the whole
//! decoded content, provided by the `xxhash-rust` crate.

pub use xxhash_rust::xxh64::Xxh64 as Xxh64State;

/// Seed used for frame content checksums.
pub const CHECKSUM_SEED: u64 = 0;

/// One-shot XXH64.
///
/// # Parity vectors
/// * `xxh64_oneshot(b"", 0)` == `0xEF46DB3751D8E999`
#[inline]
pub fn xxh64_oneshot(data: &[u8], seed: u64) -> u64 {
    xxhash_rust::xxh64::xxh64(data, seed)
}

/// Frame content checksum of `data`.
#[inline]
pub fn content_checksum(data: &[u8]) -> u32 {
    xxh64_oneshot(data, CHECKSUM_SEED) as u32
}
