//! E2E Test Suite 05: Property-Based Checks
//!
//! - arbitrary content round-trips at arbitrary levels and block sizes
//! - frames never exceed `compress_bound`
//! - a flipped bit yields an error or the original content, never a panic
//!   or different content
//! - out-of-range levels clamp

extern crate zframe;

use proptest::prelude::*;
use zframe::{
    compress, compress_bound, compress_with, decompress, decompressed_size, CompressOptions,
    MAX_LEVEL, MIN_LEVEL,
};

/// Content with a mix of runs, copies and noise.
fn content() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![
        prop::collection::vec(any::<u8>(), 1..4096),
        prop::collection::vec(0u8..4, 1..8192),
        (prop::collection::vec(any::<u8>(), 1..64), 1usize..200).prop_map(|(unit, n)| unit.repeat(n)),
        (any::<u8>(), 1usize..20_000).prop_map(|(b, n)| vec![b; n]),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_round_trip(data in content(), level in MIN_LEVEL..=MAX_LEVEL) {
        let frame = compress(&data, level).unwrap();
        prop_assert!(frame.len() <= compress_bound(data.len()));
        prop_assert_eq!(decompressed_size(&frame).unwrap(), data.len());
        prop_assert_eq!(decompress(&frame).unwrap(), data);
    }

    #[test]
    fn prop_round_trip_small_blocks(
        data in content(),
        block_size in 1usize..3000,
        checksum in any::<bool>(),
        content_size in any::<bool>(),
    ) {
        let opts = CompressOptions {
            block_size: Some(block_size),
            checksum,
            content_size,
            ..CompressOptions::default()
        };
        let frame = compress_with(&data, &opts).unwrap();
        prop_assert_eq!(decompress(&frame).unwrap(), data);
    }

    #[test]
    fn prop_bit_flip_never_yields_wrong_content(
        data in content(),
        pick in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut frame = compress(&data, 3).unwrap();
        let at = pick.index(frame.len());
        frame[at] ^= 1 << bit;
        match decompress(&frame) {
            Ok(out) => {
                prop_assert_eq!(out, data);
            }
            Err(e) => {
                prop_assert!(e.is_data_error(), "unexpected error kind: {}", e);
            }
        }
    }

    #[test]
    fn prop_levels_clamp(data in content(), excess in 1i32..10_000) {
        prop_assert_eq!(compress(&data, MAX_LEVEL + excess).unwrap(), compress(&data, MAX_LEVEL).unwrap());
        prop_assert_eq!(compress(&data, MIN_LEVEL - excess).unwrap(), compress(&data, MIN_LEVEL).unwrap());
    }

    #[test]
    fn prop_repetition_shrinks(unit in prop::collection::vec(any::<u8>(), 1..32), level in MIN_LEVEL..=MAX_LEVEL) {
        let data = unit.repeat(4096 / unit.len() + 64);
        let frame = compress(&data, level).unwrap();
        prop_assert!(frame.len() < data.len() / 4, "{} -> {}", data.len(), frame.len());
    }

    #[test]
    fn prop_arbitrary_bytes_do_not_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let _ = decompress(&bytes);
        let _ = decompressed_size(&bytes);
    }
}
