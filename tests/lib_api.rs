// Integration tests for the crate-root API in src/lib.rs.

use zframe::{
    compress, compress_bound, compress_with, decompress, decompressed_size, frame_info, version_string,
    CompressOptions, Error, FrameInfo, DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL,
};

#[test]
fn version_is_semver() {
    let v = version_string();
    assert_eq!(v.split('.').count(), 3);
    assert!(v.split('.').all(|p| p.parse::<u32>().is_ok()));
}

#[test]
fn level_constants() {
    assert_eq!(MIN_LEVEL, -7);
    assert_eq!(MAX_LEVEL, 22);
    assert_eq!(DEFAULT_LEVEL, 3);
}

#[test]
fn compress_and_compress_with_agree() {
    let data = b"agreeable data, agreeable data, agreeable data".repeat(40);
    for level in [-3, 0, 3, 11] {
        let a = compress(&data, level).unwrap();
        let b = compress_with(&data, &CompressOptions::with_level(level)).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn size_queries_agree_with_decompress() {
    let data: Vec<u8> = (0..50_000u32).map(|i| ((i / 3) % 91) as u8).collect();
    let frame = compress(&data, 4).unwrap();
    assert!(frame.len() <= compress_bound(data.len()));
    let info: FrameInfo = frame_info(&frame).unwrap();
    assert_eq!(info.content_size, Some(data.len() as u64));
    assert_eq!(decompressed_size(&frame).unwrap(), data.len());
    assert_eq!(decompress(&frame).unwrap(), data);
}

#[test]
fn size_query_exposes_rle_expansion_before_decoding() {
    // Header without size or checksum, then one last RLE block of 128 KiB.
    let mut frame = Vec::new();
    let info = FrameInfo { window_log: 17, content_size: None, has_checksum: false, header_len: 0 };
    zframe::frame::write_header(&info, &mut frame);
    frame.extend_from_slice(&[0b011, 4, 0x80, 0x80, 0x08, 0x5A]);
    assert!(frame.len() < 16);

    let size = decompressed_size(&frame).unwrap();
    assert_eq!(size, 128 * 1024);
    let out = decompress(&frame).unwrap();
    assert_eq!(out.len(), size);
    assert!(out.iter().all(|&b| b == 0x5A));
}

#[test]
fn error_categories_are_stable() {
    assert_eq!(Error::EmptyInput.category(), "empty_input");
    assert_eq!(Error::CorruptFrame("x").category(), "corrupt_frame");
    assert_eq!(Error::ChecksumFailed { expected: 1, actual: 2 }.category(), "checksum_failed");
    assert_eq!(Error::SizeMismatch { declared: 1, actual: 2 }.category(), "size_mismatch");
    assert!(Error::CorruptFrame("x").is_data_error());
    assert!(!Error::EmptyInput.is_data_error());
    assert_eq!(
        Error::ChecksumFailed { expected: 0xAB, actual: 0xCD }.to_string(),
        "checksum mismatch: frame says 0x000000ab, content hashes to 0x000000cd"
    );
}
