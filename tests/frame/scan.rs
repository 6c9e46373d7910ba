// Integration tests for src/frame/decompress.rs: the dry-run scan and the
// exact-size query.

use zframe::frame::scan_frame;
use zframe::{compress_with, decompress, decompressed_size, CompressOptions, Error};

fn lines(n: usize) -> Vec<u8> {
    let mut v = Vec::new();
    for i in 0..n {
        v.extend_from_slice(format!("line {i:06} of the scan corpus\n").as_bytes());
    }
    v
}

#[test]
fn scan_counts_blocks_and_bytes() {
    let data = lines(20_000);
    let opts = CompressOptions { block_size: Some(32 * 1024), ..CompressOptions::default() };
    let frame = compress_with(&data, &opts).unwrap();
    let scan = scan_frame(&frame).unwrap();
    assert_eq!(scan.blocks, data.len().div_ceil(32 * 1024));
    assert_eq!(scan.content_len, data.len() as u64);
    assert_eq!(scan.frame_len, frame.len());
}

#[test]
fn size_query_works_without_declared_size() {
    let data = lines(3_000);
    let opts = CompressOptions { content_size: false, ..CompressOptions::default() };
    let frame = compress_with(&data, &opts).unwrap();
    assert_eq!(decompressed_size(&frame).unwrap(), data.len());
    assert_eq!(decompress(&frame).unwrap(), data);
}

#[test]
fn block_size_override_is_clamped() {
    let data = lines(10_000);
    for requested in [0usize, 1 << 30] {
        let opts = CompressOptions { block_size: Some(requested), ..CompressOptions::default() };
        let frame = compress_with(&data[..5_000], &opts).unwrap();
        assert_eq!(decompress(&frame).unwrap(), &data[..5_000]);
    }
}

#[test]
fn empty_input_is_an_error() {
    assert_eq!(decompressed_size(&[]), Err(Error::EmptyInput));
}
