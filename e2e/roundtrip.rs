//! E2E Test Suite 01: One-Shot Round Trip
//!
//! Validates `compress` / `decompress` over the content shapes a general
//! purpose compressor meets in practice:
//! - text, structured records, binary tables
//! - degenerate content (single byte, one repeated byte, random bytes)
//! - inputs straddling block boundaries
//! - matches far back in a large window

extern crate zframe;

use zframe::{compress, compress_with, decompress, CompressOptions};

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn xorshift(seed: u64, len: usize) -> Vec<u8> {
    let mut x = seed | 1;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 7;
            x ^= x << 17;
            (x >> 24) as u8
        })
        .collect()
}

fn records(n: usize) -> Vec<u8> {
    let mut v = Vec::new();
    for i in 0..n {
        v.extend_from_slice(
            format!("{{\"user\":{},\"name\":\"user{}\",\"active\":{}}}\n", i, i % 37, i % 2 == 0).as_bytes(),
        );
    }
    v
}

fn assert_round_trip(data: &[u8], level: i32) -> Vec<u8> {
    let frame = compress(data, level).unwrap_or_else(|e| panic!("compress level {level}: {e}"));
    let out = decompress(&frame).unwrap_or_else(|e| panic!("decompress level {level}: {e}"));
    assert_eq!(out.len(), data.len(), "level {level}");
    assert!(out == data, "content differs at level {level}");
    frame
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: typical content
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_text_round_trip_and_ratio() {
    let data = b"The quick brown fox jumps over the lazy dog. ".repeat(200);
    let frame = assert_round_trip(&data, 3);
    assert!(frame.len() * 10 < data.len(), "ratio too low: {} -> {}", data.len(), frame.len());
}

#[test]
fn test_records_round_trip() {
    let data = records(10_000);
    let frame = assert_round_trip(&data, 3);
    assert!(frame.len() * 3 < data.len());
}

#[test]
fn test_binary_table_round_trip() {
    let data: Vec<u8> = (0..200_000u32).flat_map(|i| (i * i).to_le_bytes()).collect();
    assert_round_trip(&data, 5);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: degenerate content
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_single_byte() {
    for b in [0u8, 0x41, 0xFF] {
        assert_round_trip(&[b], 3);
    }
}

#[test]
fn test_ten_a_at_level_three() {
    let frame = assert_round_trip(b"AAAAAAAAAA", 3);
    // header 6 + RLE block 4 + checksum 4
    assert_eq!(frame.len(), 14);
    assert!(frame.len() - 10 < 10);
}

#[test]
fn test_random_bytes_do_not_expand_much() {
    let data = xorshift(42, 300_000);
    let frame = assert_round_trip(&data, 3);
    assert!(frame.len() <= data.len() + 64);
}

#[test]
fn test_all_byte_values() {
    let data: Vec<u8> = (0..=255u8).cycle().take(65_536).collect();
    assert_round_trip(&data, 3);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: block boundaries
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sizes_around_block_size() {
    let base = records(8_000);
    for len in [131_071usize, 131_072, 131_073, 262_144, 262_145] {
        let data: Vec<u8> = base.iter().copied().cycle().take(len).collect();
        assert_round_trip(&data, 3);
    }
}

#[test]
fn test_small_block_size_option() {
    let data = records(2_000);
    for bs in [1usize, 7, 1_000, 65_536] {
        let opts = CompressOptions { block_size: Some(bs), ..CompressOptions::default() };
        let frame = compress_with(&data, &opts).unwrap();
        assert_eq!(decompress(&frame).unwrap(), data, "block size {bs}");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: large window
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_repeat_beyond_small_window_is_nearly_free() {
    // 100 KB of noise, then its first 50 KB again at offset 100 000.
    let prefix = xorshift(7, 100_000);
    let mut data = prefix.clone();
    data.extend_from_slice(&prefix[..50_000]);
    let frame = assert_round_trip(&data, 3);
    // Only the noise is paid for: about two thirds of the raw size, and
    // roughly half of what storing the input twice would cost.
    assert!(frame.len() < 100_000 + 1_000, "frame {} bytes", frame.len());
    assert!(frame.len() > 99_000);
}

#[test]
fn test_two_megabyte_distance() {
    let chunk = xorshift(99, 64 * 1024);
    let mut data = chunk.clone();
    data.extend(xorshift(100, 2_000_000));
    data.extend_from_slice(&chunk);
    let frame = assert_round_trip(&data, 9);
    // The trailing chunk is a single long match (window 4 MiB at level 9).
    assert!(frame.len() < data.len() - 60_000);
}
