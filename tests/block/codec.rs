// Integration tests for src/block/encode.rs and src/block/decode.rs.
//
// Blocks are encoded one after another with a shared match finder and
// entropy state, then decoded in order against a single output buffer,
// the way the frame layer drives them.

use zframe::block::{decode_block, encode_block, BlockHeader, BlockType, EncodedBlock, EntropyState};
use zframe::level::params_for;
use zframe::matcher::MatchFinder;
use zframe::window::Window;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn encode_all(src: &[u8], level: i32, block_size: usize) -> Vec<EncodedBlock> {
    let params = params_for(level).adjusted_for(src.len() as u64);
    let mut mf = MatchFinder::new(&params, 0);
    let mut state = EntropyState::default();
    (0..src.len())
        .step_by(block_size)
        .map(|s| {
            let e = (s + block_size).min(src.len());
            encode_block(&mut mf, src, s..e, &params, &mut state, true).unwrap()
        })
        .collect()
}

fn decode_all(blocks: &[EncodedBlock], window: Window) -> Vec<u8> {
    let mut out = Vec::new();
    let mut state = EntropyState::default();
    for (i, b) in blocks.iter().enumerate() {
        let header = BlockHeader {
            block_type: b.block_type,
            last: i + 1 == blocks.len(),
            payload_len: b.payload.len(),
        };
        decode_block(&header, &b.payload, &mut out, window, &mut state).unwrap();
    }
    out
}

fn mixed() -> Vec<u8> {
    let mut v = Vec::new();
    let mut x = 0x0123_4567_89AB_CDEFu64;
    for i in 0..200usize {
        match i % 4 {
            0 => v.extend_from_slice(&vec![b'='; 700]),
            1 => v.extend_from_slice(format!("record {i} payload payload payload\n").as_bytes()),
            2 => v.extend((0..300).map(|_| {
                x ^= x << 13;
                x ^= x >> 7;
                x ^= x << 17;
                x as u8
            })),
            _ => v.extend_from_slice(b"the same sentence appears many times in this corpus. "),
        }
    }
    v
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn mixed_content_round_trips_at_several_levels() {
    let src = mixed();
    for level in [-5, 1, 3, 9, 19] {
        let blocks = encode_all(&src, level, 8 * 1024);
        let window = Window::new(params_for(level).adjusted_for(src.len() as u64).window_size());
        assert_eq!(decode_all(&blocks, window), src, "level {level}");
    }
}

#[test]
fn block_types_follow_content() {
    let mut src = vec![b'x'; 4096];
    let mut x = 7u32;
    src.extend((0..4096).map(|_| {
        x = x.wrapping_mul(747_796_405).wrapping_add(2_891_336_453);
        (x >> 24) as u8
    }));
    src.extend_from_slice(&b"abcdefgh".repeat(512));

    let blocks = encode_all(&src, 3, 4096);
    let kinds: Vec<BlockType> = blocks.iter().map(|b| b.block_type).collect();
    assert_eq!(kinds, [BlockType::Rle, BlockType::Raw, BlockType::Compressed]);
    assert_eq!(decode_all(&blocks, Window::from_log(17)), src);
}

#[test]
fn later_blocks_match_into_earlier_ones() {
    let first = mixed();
    let mut src = first.clone();
    src.extend_from_slice(&first[..16 * 1024]);
    let blocks = encode_all(&src, 5, first.len());
    assert_eq!(blocks.len(), 2);
    assert!(blocks[1].payload.len() < 512, "second block {} bytes", blocks[1].payload.len());
    assert_eq!(decode_all(&blocks, Window::from_log(20)), src);
}

#[test]
fn content_lengths_sum_to_input() {
    let src = mixed();
    let blocks = encode_all(&src, 3, 5_000);
    assert_eq!(blocks.iter().map(|b| b.content_len).sum::<usize>(), src.len());
    for b in &blocks {
        assert!(b.framed_len() <= 1 + 3 + b.content_len);
    }
}

#[test]
fn entropy_state_stays_in_step() {
    let src = b"It is a truth universally acknowledged, that a single man in possession of a good fortune "
        .iter()
        .cycle()
        .enumerate()
        .map(|(i, &b)| if i % 53 == 0 { b'#' } else { b })
        .take(60_000)
        .collect::<Vec<u8>>();
    let params = params_for(7).adjusted_for(src.len() as u64);
    let mut mf = MatchFinder::new(&params, 0);
    let mut enc = EntropyState::default();
    let mut dec = EntropyState::default();
    let mut out = Vec::new();
    for start in (0..src.len()).step_by(2_000) {
        let end = (start + 2_000).min(src.len());
        let b = encode_block(&mut mf, &src, start..end, &params, &mut enc, true).unwrap();
        let header = BlockHeader { block_type: b.block_type, last: end == src.len(), payload_len: b.payload.len() };
        decode_block(&header, &b.payload, &mut out, Window::new(params.window_size()), &mut dec).unwrap();
        assert_eq!(enc, dec, "block at {start}");
    }
    assert_eq!(out, src);
}
