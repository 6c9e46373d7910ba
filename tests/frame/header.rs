// Integration tests for src/frame/header.rs and src/frame/types.rs.
//
// Covers header layout on the wire, header parsing through the public
// `frame_info` entry point, and the compress bound.

use zframe::frame::{parse_header, write_header, FrameInfo, MAGIC, MAX_HEADER_LEN};
use zframe::{compress, compress_bound, compress_with, frame_info, CompressOptions, Error};

// ─────────────────────────────────────────────────────────────────────────────
// Layout
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn frame_starts_with_magic() {
    let frame = compress(b"magic magic magic magic", 1).unwrap();
    assert_eq!(&frame[..4], &MAGIC.to_le_bytes());
    assert_eq!(&frame[..4], &[0xA8, 0xB5, 0x2F, 0xFD]);
}

#[test]
fn flags_byte_encodes_options() {
    let data = vec![7u8; 100];
    let frame = compress(&data, 3).unwrap();
    // content size and checksum, window log 17
    assert_eq!(frame[4], 0b0000_0011);

    let opts = CompressOptions { checksum: false, ..CompressOptions::default() };
    let frame = compress_with(&data, &opts).unwrap();
    assert_eq!(frame[4], 0b0000_0001);

    let opts = CompressOptions { content_size: false, checksum: false, ..CompressOptions::default() };
    let frame = compress_with(&data, &opts).unwrap();
    assert_eq!(frame[4], 0);
}

#[test]
fn frame_info_reports_header_fields() {
    let data: Vec<u8> = (0..300_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let frame = compress(&data, 5).unwrap();
    let info = frame_info(&frame).unwrap();
    assert_eq!(info.content_size, Some(300_000));
    assert!(info.has_checksum);
    assert_eq!(info.window_log, 19);
    assert_eq!(info.window_size(), 1 << 19);
    assert_eq!(info.header_len, 4 + 1 + 3);
}

#[test]
fn header_round_trip_for_every_window_log() {
    for window_log in 17..=24u8 {
        let info = FrameInfo { window_log, content_size: Some(u64::MAX), has_checksum: true, header_len: 0 };
        let mut out = Vec::new();
        write_header(&info, &mut out);
        assert_eq!(out.len(), MAX_HEADER_LEN);
        let parsed = parse_header(&out).unwrap();
        assert_eq!(parsed, FrameInfo { header_len: MAX_HEADER_LEN, ..info });
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rejection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn wrong_magic_rejected() {
    let mut frame = compress(b"some bytes to frame", 3).unwrap();
    frame[0] ^= 1;
    assert_eq!(frame_info(&frame), Err(Error::CorruptFrame("bad magic number")));
    assert!(matches!(zframe::decompress(&frame), Err(Error::CorruptFrame(_))));
}

#[test]
fn reserved_flag_bits_rejected() {
    let mut frame = compress(b"some bytes to frame", 3).unwrap();
    for bit in 5..8 {
        let mut f = frame.clone();
        f[4] |= 1 << bit;
        assert!(frame_info(&f).is_err(), "bit {bit}");
    }
    frame.truncate(3);
    assert!(frame_info(&frame).is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// Bound
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn bound_holds_for_incompressible_input() {
    let mut x = 88172645463325252u64;
    for len in [1usize, 2, 100, 131_072, 131_073, 400_000] {
        let data: Vec<u8> = (0..len)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                x as u8
            })
            .collect();
        for level in [-7, 1, 3, 19] {
            let frame = compress(&data, level).unwrap();
            assert!(frame.len() <= compress_bound(len), "len {len} level {level}");
        }
    }
}

#[test]
fn bound_is_monotonic() {
    let mut prev = 0;
    for len in (0..1_000_000).step_by(9_973) {
        let b = compress_bound(len);
        assert!(b >= prev);
        assert!(b >= len);
        prev = b;
    }
}
