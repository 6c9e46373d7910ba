//! One-shot frame decompression.
//!
//! Decoding runs in two passes. [`scan_frame`] walks the block headers
//! without decoding anything, validates the frame structure and sums the
//! regenerated sizes; the output buffer is then allocated once at that size
//! and the blocks are decoded in order into it.

use super::header::parse_header;
use super::types::{FrameInfo, CHECKSUM_LEN};
use crate::bits::ByteReader;
use crate::block::{decode_block, regenerated_len, BlockHeader, EntropyState};
use crate::error::{Error, Result};
use crate::xxhash::content_checksum;

/// Result of a dry-run pass over a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameScan {
    pub info: FrameInfo,
    /// Sum of the regenerated sizes of all blocks.
    pub content_len: u64,
    pub blocks: usize,
    /// Total frame length, checksum included.
    pub frame_len: usize,
}

/// Walk every block header of the frame at the start of `input`.
///
/// Fails if the frame is truncated, a header is malformed, or anything
/// follows the frame.
pub fn scan_frame(input: &[u8]) -> Result<FrameScan> {
    let info = parse_header(input)?;
    let mut r = ByteReader::new(input);
    r.take(info.header_len)?;

    let mut content_len = 0u64;
    let mut blocks = 0usize;
    loop {
        let header = BlockHeader::read(&mut r)?;
        let payload = r.take(header.payload_len)?;
        content_len += regenerated_len(&header, payload)? as u64;
        blocks += 1;
        if header.last {
            break;
        }
    }
    if info.has_checksum {
        r.take(CHECKSUM_LEN)?;
    }
    if !r.is_empty() {
        return Err(Error::CorruptFrame("trailing bytes after frame"));
    }
    Ok(FrameScan { info, content_len, blocks, frame_len: r.position() })
}

/// Exact decompressed size of the frame, from its block headers.
pub fn decompressed_size(input: &[u8]) -> Result<usize> {
    let scan = scan_frame(input)?;
    check_declared_size(&scan)?;
    usize::try_from(scan.content_len)
        .map_err(|_| Error::DecompressionFailed("content does not fit in memory".into()))
}

/// Decompress the single frame in `input`.
pub fn decompress_frame(input: &[u8]) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(Error::EmptyInput);
    }
    decode(input).inspect_err(|e| {
        tracing::debug!(category = e.category(), error = %e, "frame rejected");
    })
}

fn check_declared_size(scan: &FrameScan) -> Result<()> {
    match scan.info.content_size {
        Some(declared) if declared != scan.content_len => Err(Error::SizeMismatch {
            declared,
            actual: scan.content_len,
        }),
        _ => Ok(()),
    }
}

fn decode(input: &[u8]) -> Result<Vec<u8>> {
    let scan = scan_frame(input)?;
    check_declared_size(&scan)?;
    let info = scan.info;
    tracing::debug!(
        window_log = info.window_log,
        blocks = scan.blocks,
        content_len = scan.content_len,
        "decompressing frame"
    );

    let capacity = usize::try_from(scan.content_len)
        .map_err(|_| Error::DecompressionFailed("content does not fit in memory".into()))?;
    let mut out = Vec::new();
    out.try_reserve_exact(capacity)
        .map_err(|e| Error::DecompressionFailed(format!("cannot allocate {capacity} bytes: {e}")))?;

    let window = info.window();
    let mut state = EntropyState::default();
    let mut r = ByteReader::new(input);
    r.take(info.header_len)?;
    loop {
        let header = BlockHeader::read(&mut r)?;
        let payload = r.take(header.payload_len)?;
        decode_block(&header, payload, &mut out, window, &mut state)?;
        tracing::trace!(
            block_type = header.block_type.name(),
            payload_len = header.payload_len,
            produced = out.len(),
            "block decoded"
        );
        if header.last {
            break;
        }
    }

    if out.len() != capacity {
        return Err(Error::CorruptFrame("blocks regenerated a different size than scanned"));
    }
    if info.has_checksum {
        let expected = r.read_u32_le()?;
        let actual = content_checksum(&out);
        if expected != actual {
            return Err(Error::ChecksumFailed { expected, actual });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompressOptions;
    use crate::frame::compress::compress_frame;
    use crate::frame::header::write_header;

    fn sample() -> Vec<u8> {
        let mut v = Vec::new();
        for i in 0..5000u32 {
            v.extend_from_slice(format!("{} bottles of beer on the wall\n", i % 100).as_bytes());
        }
        v
    }

    fn empty_frame(content_size: Option<u64>) -> Vec<u8> {
        let mut out = Vec::new();
        let info = FrameInfo { window_log: 17, content_size, has_checksum: false, header_len: 0 };
        write_header(&info, &mut out);
        out.extend_from_slice(&[0b001, 0]);
        out
    }

    #[test]
    fn scan_matches_content() {
        let data = sample();
        let opts = CompressOptions { block_size: Some(16 * 1024), ..CompressOptions::default() };
        let frame = compress_frame(&data, &opts).unwrap();
        let scan = scan_frame(&frame).unwrap();
        assert_eq!(scan.content_len, data.len() as u64);
        assert_eq!(scan.blocks, data.len().div_ceil(16 * 1024));
        assert_eq!(scan.frame_len, frame.len());
        assert_eq!(decompressed_size(&frame).unwrap(), data.len());
        assert_eq!(decompress_frame(&frame).unwrap(), data);
    }

    #[test]
    fn empty_content_frame_decodes_to_nothing() {
        assert_eq!(decompress_frame(&empty_frame(Some(0))).unwrap(), Vec::<u8>::new());
        assert_eq!(decompress_frame(&empty_frame(None)).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn declared_size_must_match() {
        assert_eq!(
            decompress_frame(&empty_frame(Some(3))),
            Err(Error::SizeMismatch { declared: 3, actual: 0 })
        );
        assert!(decompressed_size(&empty_frame(Some(3))).is_err());
    }

    #[test]
    fn checksum_mismatch_detected() {
        let mut frame = compress_frame(&sample(), &CompressOptions::default()).unwrap();
        let n = frame.len();
        frame[n - 1] ^= 0x40;
        assert!(matches!(decompress_frame(&frame), Err(Error::ChecksumFailed { .. })));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut frame = compress_frame(&sample(), &CompressOptions::default()).unwrap();
        frame.push(0);
        assert_eq!(decompress_frame(&frame), Err(Error::CorruptFrame("trailing bytes after frame")));
    }

    #[test]
    fn truncation_rejected() {
        let frame = compress_frame(&sample(), &CompressOptions::default()).unwrap();
        for cut in [1, 5, 7, frame.len() / 2, frame.len() - 1] {
            assert!(decompress_frame(&frame[..cut]).is_err(), "cut at {cut}");
        }
    }

    #[test]
    fn empty_input_rejected() {
        assert_eq!(decompress_frame(&[]), Err(Error::EmptyInput));
    }
}
