//! E2E Test Suite 02: Error Handling
//!
//! Every malformed input must produce an `Error` value of the right kind:
//! - empty input on both sides
//! - wrong magic, reserved bits, truncation, trailing bytes
//! - checksum and declared-size disagreements

extern crate zframe;

use zframe::{compress, compress_with, decompress, CompressOptions, Error};

fn sample() -> Vec<u8> {
    b"error handling sample, error handling sample. ".repeat(500)
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: empty input
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_input_rejected_both_ways() {
    for level in [-7, 0, 3, 22, 999] {
        assert_eq!(compress(&[], level), Err(Error::EmptyInput));
    }
    assert_eq!(decompress(&[]), Err(Error::EmptyInput));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: structural corruption
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_not_a_frame() {
    let err = decompress(b"plain text, not compressed").unwrap_err();
    assert_eq!(err, Error::CorruptFrame("bad magic number"));
    assert_eq!(err.category(), "corrupt_frame");
}

#[test]
fn test_short_inputs() {
    for len in 1..5 {
        assert!(matches!(decompress(&vec![0xA8; len]), Err(Error::CorruptFrame(_))));
    }
}

#[test]
fn test_reserved_block_type() {
    let mut frame = compress(b"xy", 3).unwrap();
    // header: magic(4) flags(1) size(1), then the block type byte
    assert_eq!(frame[6], 0b001);
    frame[6] = 0b111;
    assert_eq!(decompress(&frame), Err(Error::CorruptFrame("reserved block type")));
}

#[test]
fn test_missing_last_block() {
    let mut frame = compress(b"xy", 3).unwrap();
    frame[6] &= !1;
    assert!(matches!(decompress(&frame), Err(Error::CorruptFrame(_))));
}

#[test]
fn test_truncated_frame() {
    let frame = compress(&sample(), 3).unwrap();
    assert!(matches!(decompress(&frame[..frame.len() - 5]), Err(Error::CorruptFrame(_))));
}

#[test]
fn test_trailing_bytes() {
    let mut frame = compress(&sample(), 3).unwrap();
    frame.push(0);
    assert!(matches!(decompress(&frame), Err(Error::CorruptFrame(_))));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: integrity
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_checksum_mismatch() {
    let data = sample();
    let opts = CompressOptions { level: 1, ..CompressOptions::default() };
    let mut frame = compress_with(&data, &opts).unwrap();
    let n = frame.len();
    frame[n - 2] ^= 0x10;
    match decompress(&frame) {
        Err(Error::ChecksumFailed { expected, actual }) => assert_ne!(expected, actual),
        other => panic!("expected checksum failure, got {other:?}"),
    }
}

#[test]
fn test_raw_content_flip_caught_by_checksum() {
    let data = vec![0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
    let mut frame = compress(&data, 3).unwrap();
    // Twelve distinct bytes stay Raw: header 6, block header 2, then content.
    assert_eq!(frame[6], 0b001);
    frame[8 + 3] ^= 0x01;
    assert!(matches!(decompress(&frame), Err(Error::ChecksumFailed { .. })));
}

#[test]
fn test_declared_size_mismatch() {
    let data = vec![0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
    let mut frame = compress(&data, 3).unwrap();
    assert_eq!(frame[5], 12);
    frame[5] = 13;
    assert_eq!(decompress(&frame), Err(Error::SizeMismatch { declared: 13, actual: 12 }));
}
