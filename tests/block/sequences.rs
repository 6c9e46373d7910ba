// Integration tests for src/block/sequences.rs: sequence code tables and the
// sequences section on its own.

use zframe::bits::ByteReader;
use zframe::block::sequences::{decode_sequences, encode_sequences, ll_code, ml_code, of_code};
use zframe::block::EntropyState;
use zframe::matcher::Sequence;

fn seqs(n: u32) -> Vec<Sequence> {
    (0..n)
        .map(|i| Sequence {
            lit_len: (i * 37) % 300,
            offset: 1 + (i * 7919) % 100_000,
            match_len: 3 + (i * 13) % 1_000,
        })
        .collect()
}

#[test]
fn codes_are_monotonic() {
    let mut prev = 0;
    for v in 0..70_000u32 {
        let c = ll_code(v);
        assert!(c >= prev);
        prev = c;
    }
    assert_eq!(ll_code(0), 0);
    assert_eq!(ll_code(15), 15);
    assert_eq!(ml_code(3), 0);
    assert_eq!(ml_code(34), 31);
    assert_eq!(of_code(1), 0);
    assert_eq!(of_code(1 << 20), 20);
}

#[test]
fn section_round_trips() {
    for n in [1u32, 2, 17, 1_000] {
        let input = seqs(n);
        let mut enc = EntropyState::default();
        let mut out = Vec::new();
        encode_sequences(&input, 9, true, &mut enc, &mut out).unwrap();

        let mut dec = EntropyState::default();
        let mut r = ByteReader::new(&out);
        assert_eq!(decode_sequences(&mut r, &mut dec).unwrap(), input, "n = {n}");
        assert!(r.is_empty());
        assert_eq!(enc, dec);
    }
}

#[test]
fn empty_section_is_one_byte() {
    let mut out = Vec::new();
    encode_sequences(&[], 9, true, &mut EntropyState::default(), &mut out).unwrap();
    assert_eq!(out, [0]);
    assert!(decode_sequences(&mut ByteReader::new(&out), &mut EntropyState::default())
        .unwrap()
        .is_empty());
}

#[test]
fn reserved_mode_bits_rejected() {
    let mut out = Vec::new();
    encode_sequences(&seqs(10), 9, true, &mut EntropyState::default(), &mut out).unwrap();
    out[1] |= 0x40;
    assert!(decode_sequences(&mut ByteReader::new(&out), &mut EntropyState::default()).is_err());
}

#[test]
fn invalid_sequences_refused_by_encoder() {
    let bad = [Sequence { lit_len: 0, offset: 0, match_len: 5 }];
    assert!(encode_sequences(&bad, 9, true, &mut EntropyState::default(), &mut Vec::new()).is_err());
    let short = [Sequence { lit_len: 0, offset: 4, match_len: 2 }];
    assert!(encode_sequences(&short, 9, true, &mut EntropyState::default(), &mut Vec::new()).is_err());
}
