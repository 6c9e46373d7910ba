//! E2E Test Suite 03: Compression Levels
//!
//! - every level from MIN_LEVEL to MAX_LEVEL round-trips
//! - out-of-range levels behave exactly like the nearest bound
//! - level 0 behaves like the default level
//! - higher effort does not lose ratio on redundant text

extern crate zframe;

use zframe::{compress, decompress, DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL};

fn corpus() -> Vec<u8> {
    let words = [
        "compression", "entropy", "window", "literal", "sequence", "offset", "block", "frame",
        "huffman", "table", "state", "symbol",
    ];
    let mut v = Vec::new();
    let mut x = 1u32;
    for _ in 0..30_000 {
        x = x.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        v.extend_from_slice(words[(x >> 28) as usize % words.len()].as_bytes());
        v.push(if x & 0x100 != 0 { b' ' } else { b'\n' });
    }
    v
}

#[test]
fn test_every_level_round_trips() {
    let data = corpus();
    for level in MIN_LEVEL..=MAX_LEVEL {
        let frame = compress(&data, level).unwrap();
        assert!(frame.len() < data.len(), "level {level} did not compress");
        assert_eq!(decompress(&frame).unwrap(), data, "level {level}");
    }
}

#[test]
fn test_levels_clamp() {
    let data = corpus();
    assert_eq!(compress(&data, 999).unwrap(), compress(&data, MAX_LEVEL).unwrap());
    assert_eq!(compress(&data, -999).unwrap(), compress(&data, MIN_LEVEL).unwrap());
    assert_eq!(compress(&data, i32::MAX).unwrap(), compress(&data, MAX_LEVEL).unwrap());
    assert_eq!(compress(&data, i32::MIN).unwrap(), compress(&data, MIN_LEVEL).unwrap());
    assert_eq!(compress(&data, 0).unwrap(), compress(&data, DEFAULT_LEVEL).unwrap());
}

#[test]
fn test_repeated_byte_shrinks_at_every_level() {
    let data = vec![b'z'; 10_000];
    for level in MIN_LEVEL..=MAX_LEVEL {
        let frame = compress(&data, level).unwrap();
        assert!(frame.len() < data.len(), "level {level}");
        assert_eq!(decompress(&frame).unwrap(), data);
    }
}

#[test]
fn test_effort_buys_ratio() {
    let data = corpus();
    let fastest = compress(&data, MIN_LEVEL).unwrap().len();
    let default = compress(&data, DEFAULT_LEVEL).unwrap().len();
    let strongest = compress(&data, 19).unwrap().len();
    assert!(default < fastest, "default {default} vs fastest {fastest}");
    assert!(strongest <= default + default / 50, "strongest {strongest} vs default {default}");
}

#[test]
fn test_output_is_deterministic() {
    let data = corpus();
    for level in [MIN_LEVEL, 1, 3, 12, MAX_LEVEL] {
        assert_eq!(compress(&data, level).unwrap(), compress(&data, level).unwrap());
    }
}
