// Integration tests for src/entropy/fse.rs: FSE tables and streams.
//
// Exercises the public surface only:
//   - table construction from frequencies and from normalized counts
//   - table description write / parse
//   - stream encode / decode and rejection of damaged streams

use zframe::bits::{BitReader, BitWriter};
use zframe::entropy::fse::{self, FseTable, FSE_MAX_TABLE_LOG, FSE_MIN_TABLE_LOG};
use zframe::entropy::histogram;

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Geometric-ish distribution over 20 symbols.
fn skewed(len: usize) -> Vec<u8> {
    let mut x = 0x1234_5678u32;
    (0..len)
        .map(|_| {
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            (x.trailing_zeros() % 20) as u8
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Streams
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn skewed_stream_round_trips_and_shrinks() {
    let data = skewed(20_000);
    let table = FseTable::from_frequencies(&histogram(&data), 11).unwrap();
    let stream = fse::encode(&data, &table).unwrap();
    assert!(stream.len() < data.len() / 3, "stream {} bytes", stream.len());
    assert_eq!(fse::decode(&stream, &table, data.len()).unwrap(), data);
}

#[test]
fn every_table_log_round_trips() {
    let data = skewed(3_000);
    let freqs = histogram(&data);
    for log in FSE_MIN_TABLE_LOG..=FSE_MAX_TABLE_LOG {
        let table = FseTable::from_frequencies(&freqs, log).unwrap();
        // Never fewer states than the alphabet needs.
        assert!(table.table_log() >= log.min(6));
        let stream = fse::encode(&data, &table).unwrap();
        assert_eq!(fse::decode(&stream, &table, data.len()).unwrap(), data, "log {log}");
    }
}

#[test]
fn tables_are_deterministic() {
    let freqs = histogram(&skewed(5_000));
    let a = FseTable::from_frequencies(&freqs, 9).unwrap();
    let b = FseTable::from_frequencies(&freqs, 9).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.description(), b.description());
}

#[test]
fn stopping_early_leaves_trailing_bits() {
    let data = skewed(1_000);
    let table = FseTable::from_frequencies(&histogram(&data), 9).unwrap();
    let stream = fse::encode(&data, &table).unwrap();
    assert!(fse::decode(&stream, &table, data.len() / 2).is_err());
}

#[test]
fn zero_marker_byte_rejected() {
    let data = skewed(1_000);
    let table = FseTable::from_frequencies(&histogram(&data), 9).unwrap();
    let mut stream = fse::encode(&data, &table).unwrap();
    *stream.last_mut().unwrap() = 0;
    assert!(fse::decode(&stream, &table, data.len()).is_err());
}

// ─────────────────────────────────────────────────────────────────────────────
// Descriptions
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn description_parses_back_to_same_table() {
    let table = FseTable::from_frequencies(&histogram(&skewed(8_000)), 9).unwrap();
    let mut w = BitWriter::new();
    table.describe(&mut w);
    let bytes = w.finish();
    assert_eq!(bytes, table.description());

    let mut r = BitReader::new(&bytes);
    let parsed = FseTable::parse(&mut r, 9, 255).unwrap();
    assert_eq!(parsed, table);
    assert_eq!(r.bytes_consumed(), bytes.len());
}

#[test]
fn truncated_description_rejected() {
    let table = FseTable::from_frequencies(&histogram(&skewed(8_000)), 9).unwrap();
    let bytes = table.description();
    let mut r = BitReader::new(&bytes[..bytes.len() / 2]);
    assert!(FseTable::parse(&mut r, 9, 255).is_err());
}

#[test]
fn counts_must_fill_the_table() {
    // 2^5 = 32 states; these sum to 31.
    assert!(FseTable::from_normalized(&[16, 8, 7], 5).is_err());
    assert!(FseTable::from_normalized(&[16, 8, 8], 5).is_ok());
}
