// Integration tests for src/entropy/huffman.rs: canonical Huffman tables
// and literal streams.

use zframe::bits::ByteReader;
use zframe::entropy::histogram;
use zframe::entropy::huffman::{self, HuffmanTable, HUF_MAX_BITS};

fn prose() -> Vec<u8> {
    b"Whan that Aprille with his shoures soote the droghte of March hath perced to the roote, \
      and bathed every veyne in swich licour of which vertu engendred is the flour"
        .repeat(30)
}

#[test]
fn prose_round_trips_and_shrinks() {
    let data = prose();
    let table = HuffmanTable::from_frequencies(&histogram(&data)).unwrap();
    let stream = huffman::encode(&data, &table).unwrap();
    assert!(stream.len() < data.len() * 3 / 4);
    assert_eq!(huffman::decode(&stream, &table, data.len()).unwrap(), data);
}

#[test]
fn code_lengths_are_limited() {
    // Fibonacci frequencies would need codes far longer than the limit.
    let mut freqs = vec![0u32; 40];
    let (mut a, mut b) = (1u32, 1u32);
    for f in freqs.iter_mut() {
        *f = a;
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    let table = HuffmanTable::from_frequencies(&freqs).unwrap();
    assert!(table.max_bits() <= HUF_MAX_BITS);
    assert!(table.lengths().iter().all(|&l| l >= 1 && l <= HUF_MAX_BITS));

    let symbols: Vec<u8> = (0..40u8).cycle().take(400).collect();
    let stream = huffman::encode(&symbols, &table).unwrap();
    assert_eq!(huffman::decode(&stream, &table, symbols.len()).unwrap(), symbols);
}

#[test]
fn single_symbol_has_empty_stream() {
    let data = vec![b'k'; 300];
    let table = HuffmanTable::from_frequencies(&histogram(&data)).unwrap();
    assert!(huffman::encode(&data, &table).unwrap().is_empty());
    assert_eq!(huffman::decode(&[], &table, 300).unwrap(), data);
}

#[test]
fn description_round_trips() {
    let table = HuffmanTable::from_frequencies(&histogram(&prose())).unwrap();
    let mut out = Vec::new();
    table.describe(&mut out);
    assert_eq!(out.len(), table.description_len());
    let mut r = ByteReader::new(&out);
    assert_eq!(HuffmanTable::parse(&mut r).unwrap(), table);
    assert!(r.is_empty());
}

#[test]
fn symbols_outside_the_table_are_rejected() {
    let table = HuffmanTable::from_frequencies(&histogram(b"aaaabbbc")).unwrap();
    assert!(!table.can_encode(b'z'));
    assert!(huffman::encode(b"abz", &table).is_err());
}

#[test]
fn truncated_stream_rejected() {
    let data = prose();
    let table = HuffmanTable::from_frequencies(&histogram(&data)).unwrap();
    let stream = huffman::encode(&data, &table).unwrap();
    assert!(huffman::decode(&stream[..stream.len() / 2], &table, data.len()).is_err());
}
