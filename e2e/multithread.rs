//! E2E Test Suite 04: Multi-Threaded Compression
//!
//! - frames encoded on a worker pool decode to the original content
//! - output does not depend on the number of workers (above one)
//! - inputs below the block-count threshold stay sequential
//! - independent calls from many threads do not interfere

extern crate zframe;

use std::sync::Arc;
use std::thread;

use zframe::{compress, compress_with, decompress, CompressOptions};

fn log_lines(n: usize) -> Vec<u8> {
    let levels = ["INFO", "WARN", "DEBUG", "ERROR"];
    let mut v = Vec::new();
    for i in 0..n {
        v.extend_from_slice(
            format!(
                "2024-01-{:02}T{:02}:{:02}:00Z {} worker={} request handled in {}ms\n",
                1 + i % 28,
                i % 24,
                i % 60,
                levels[i % 4],
                i % 13,
                (i * 37) % 1000
            )
            .as_bytes(),
        );
    }
    v
}

fn opts(workers: usize, level: i32) -> CompressOptions {
    CompressOptions { level, workers, ..CompressOptions::default() }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: parallel frames round-trip
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_parallel_round_trip() {
    let data = log_lines(40_000);
    assert!(data.len() > 8 * 128 * 1024);
    for level in [-3, 1, 3, 9] {
        let frame = compress_with(&data, &opts(4, level)).unwrap();
        assert_eq!(decompress(&frame).unwrap(), data, "level {level}");
        assert!(frame.len() < data.len() / 2);
    }
}

#[test]
fn test_worker_count_independent_output() {
    let data = log_lines(40_000);
    let two = compress_with(&data, &opts(2, 3)).unwrap();
    let three = compress_with(&data, &opts(3, 3)).unwrap();
    let eight = compress_with(&data, &opts(8, 3)).unwrap();
    assert_eq!(two, three);
    assert_eq!(two, eight);
}

#[test]
fn test_automatic_worker_count() {
    let data = log_lines(40_000);
    let frame = compress_with(&data, &opts(0, 3)).unwrap();
    assert_eq!(decompress(&frame).unwrap(), data);
}

#[test]
fn test_small_input_stays_sequential() {
    // Fewer than eight blocks: the worker count must not matter.
    let data = log_lines(5_000);
    let one = compress_with(&data, &opts(1, 3)).unwrap();
    let many = compress_with(&data, &opts(8, 3)).unwrap();
    assert_eq!(one, many);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: concurrent independent calls
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_concurrent_calls_are_isolated() {
    let inputs: Arc<Vec<Vec<u8>>> = Arc::new((0..8).map(|i| log_lines(2_000 + i * 500)).collect());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let inputs = Arc::clone(&inputs);
            thread::spawn(move || {
                let data = &inputs[i];
                for _ in 0..3 {
                    let frame = compress(data, (i as i32) * 2 - 3).unwrap();
                    assert_eq!(&decompress(&frame).unwrap(), data);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}
