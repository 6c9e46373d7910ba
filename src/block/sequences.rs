//! Sequences section of a Compressed block.
//!
//! Each sequence is split into three codes (literal length, offset, match
//! length) plus extra bits. Codes are FSE-coded in three interleaved streams
//! sharing one backward bitstream.
//!
//! ```text
//! varint(nb_sequences)
//! if nb_sequences > 0:
//!   modes (1 byte: bits0-1 LL, bits2-3 OF, bits4-5 ML, bits6-7 zero)
//!   per stream in LL, OF, ML order:
//!     Predefined -> nothing
//!     Rle        -> the symbol byte
//!     Fse        -> table description (bit-packed, byte aligned)
//!     Repeat     -> nothing
//!   bitstream (rest of the payload, ends with a 1 marker bit)
//! ```

use std::sync::OnceLock;

use crate::bits::{highbit32, write_varint, BackwardBitReader, BitReader, BitWriter, ByteReader};
use crate::config::{MAX_BLOCK_SIZE, MIN_MATCH};
use crate::entropy::fse::{FseDecoder, FseEncoder, FseTable};
use crate::entropy::{histogram, single_symbol};
use crate::error::{Error, Result};
use crate::matcher::Sequence;

use super::types::{EntropyState, StreamTable};

// ─────────────────────────────────────────────────────────────────────────────
// Code tables
// ─────────────────────────────────────────────────────────────────────────────

pub const LL_MAX_SYMBOL: usize = 35;
pub const ML_MAX_SYMBOL: usize = 52;
pub const OF_MAX_SYMBOL: usize = 31;

pub const LL_MAX_LOG: u8 = 9;
pub const ML_MAX_LOG: u8 = 9;
pub const OF_MAX_LOG: u8 = 8;

#[rustfmt::skip]
const LL_BASE: [u32; LL_MAX_SYMBOL + 1] = [
    0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
    16, 18, 20, 22, 24, 28, 32, 40, 48, 64, 128, 256, 512, 1024, 2048, 4096,
    8192, 16384, 32768, 65536,
];

#[rustfmt::skip]
const LL_BITS: [u8; LL_MAX_SYMBOL + 1] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    1, 1, 1, 1, 2, 2, 3, 3, 4, 6, 7, 8, 9, 10, 11, 12,
    13, 14, 15, 16,
];

#[rustfmt::skip]
const ML_BASE: [u32; ML_MAX_SYMBOL + 1] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18,
    19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34,
    35, 37, 39, 41, 43, 47, 51, 59, 67, 83, 99, 131, 259, 515, 1027, 2051,
    4099, 8195, 16387, 32771, 65539,
];

#[rustfmt::skip]
const ML_BITS: [u8; ML_MAX_SYMBOL + 1] = [
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    1, 1, 1, 1, 2, 2, 3, 3, 4, 4, 5, 7, 8, 9, 10, 11,
    12, 13, 14, 15, 16,
];

/// Code for a value looked up in a baseline table.
#[inline]
fn code_for(base: &[u32], value: u32) -> u8 {
    (base.partition_point(|&b| b <= value) - 1) as u8
}

#[inline]
pub fn ll_code(lit_len: u32) -> u8 {
    if lit_len < 16 {
        lit_len as u8
    } else {
        code_for(&LL_BASE, lit_len)
    }
}

#[inline]
pub fn ml_code(match_len: u32) -> u8 {
    if match_len < 35 {
        (match_len - MIN_MATCH) as u8
    } else {
        code_for(&ML_BASE, match_len)
    }
}

#[inline]
pub fn of_code(offset: u32) -> u8 {
    highbit32(offset) as u8
}

// ─────────────────────────────────────────────────────────────────────────────
// Predefined distributions
// ─────────────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
const LL_DEFAULT_NORM: [i16; LL_MAX_SYMBOL + 1] = [
    4, 3, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 2, 1, 1, 1,
    2, 2, 2, 2, 2, 2, 2, 2, 2, 3, 2, 1, 1, 1, 1, 1,
    -1, -1, -1, -1,
];
const LL_DEFAULT_LOG: u8 = 6;

#[rustfmt::skip]
const ML_DEFAULT_NORM: [i16; ML_MAX_SYMBOL + 1] = [
    1, 4, 3, 2, 2, 2, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, -1, -1,
    -1, -1, -1, -1, -1,
];
const ML_DEFAULT_LOG: u8 = 6;

#[rustfmt::skip]
const OF_DEFAULT_NORM: [i16; 29] = [
    1, 1, 1, 1, 1, 1, 2, 2, 2, 1, 1, 1, 1, 1, 1, 1,
    1, 1, 1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1,
];
const OF_DEFAULT_LOG: u8 = 5;

struct Predefined {
    ll: FseTable,
    of: FseTable,
    ml: FseTable,
}

static PREDEFINED: OnceLock<Result<Predefined>> = OnceLock::new();

/// Predefined tables, built on first use from any thread.
fn predefined() -> Result<&'static Predefined> {
    PREDEFINED
        .get_or_init(|| {
            Ok(Predefined {
                ll: FseTable::from_normalized(&LL_DEFAULT_NORM, LL_DEFAULT_LOG)?,
                of: FseTable::from_normalized(&OF_DEFAULT_NORM, OF_DEFAULT_LOG)?,
                ml: FseTable::from_normalized(&ML_DEFAULT_NORM, ML_DEFAULT_LOG)?,
            })
        })
        .as_ref()
        .map_err(Clone::clone)
}

// ─────────────────────────────────────────────────────────────────────────────
// Stream modes
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum SymbolMode {
    Predefined = 0,
    Rle = 1,
    Fse = 2,
    Repeat = 3,
}

impl SymbolMode {
    fn from_bits(bits: u8) -> Self {
        match bits & 3 {
            0 => SymbolMode::Predefined,
            1 => SymbolMode::Rle,
            2 => SymbolMode::Fse,
            _ => SymbolMode::Repeat,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Stream {
    LiteralLengths,
    Offsets,
    MatchLengths,
}

impl Stream {
    fn max_symbol(self) -> usize {
        match self {
            Stream::LiteralLengths => LL_MAX_SYMBOL,
            Stream::Offsets => OF_MAX_SYMBOL,
            Stream::MatchLengths => ML_MAX_SYMBOL,
        }
    }

    fn max_log(self) -> u8 {
        match self {
            Stream::LiteralLengths => LL_MAX_LOG,
            Stream::Offsets => OF_MAX_LOG,
            Stream::MatchLengths => ML_MAX_LOG,
        }
    }

    fn predefined(self) -> Result<&'static FseTable> {
        let p = predefined()?;
        Ok(match self {
            Stream::LiteralLengths => &p.ll,
            Stream::Offsets => &p.of,
            Stream::MatchLengths => &p.ml,
        })
    }

    fn current(self, state: &EntropyState) -> Option<&StreamTable> {
        match self {
            Stream::LiteralLengths => state.literal_lengths.as_ref(),
            Stream::Offsets => state.offsets.as_ref(),
            Stream::MatchLengths => state.match_lengths.as_ref(),
        }
    }

    fn slot(self, state: &mut EntropyState) -> &mut Option<StreamTable> {
        match self {
            Stream::LiteralLengths => &mut state.literal_lengths,
            Stream::Offsets => &mut state.offsets,
            Stream::MatchLengths => &mut state.match_lengths,
        }
    }
}

/// Choice made for one stream while encoding.
struct Choice {
    mode: SymbolMode,
    table: StreamTable,
    /// Description bytes (FSE) or the symbol (RLE) written after the modes.
    header: Vec<u8>,
}

impl Choice {
    fn fse(&self) -> Option<&FseTable> {
        match &self.table {
            StreamTable::Fse(t) => Some(t),
            StreamTable::Rle(_) => None,
        }
    }
}

/// Pick the cheapest way to code `codes`.
fn choose(
    stream: Stream,
    codes: &[u8],
    fse_max_log: u8,
    previous: Option<&StreamTable>,
) -> Result<Choice> {
    if let Some(s) = single_symbol(codes) {
        return Ok(Choice { mode: SymbolMode::Rle, table: StreamTable::Rle(s), header: vec![s] });
    }

    let freqs = histogram(codes);
    let predefined = stream.predefined()?;
    let mut best_mode = SymbolMode::Predefined;
    let mut best_cost = predefined.estimate_bits(&freqs).unwrap_or(u64::MAX);

    if let Some(StreamTable::Fse(prev)) = previous {
        if let Some(cost) = prev.estimate_bits(&freqs) {
            if cost < best_cost {
                best_mode = SymbolMode::Repeat;
                best_cost = cost;
            }
        }
    }

    let fresh = FseTable::from_frequencies(&freqs, fse_max_log.min(stream.max_log()))?;
    let description = fresh.description();
    if let Some(cost) = fresh.estimate_bits(&freqs) {
        if cost + description.len() as u64 * 8 < best_cost {
            return Ok(Choice { mode: SymbolMode::Fse, table: StreamTable::Fse(fresh), header: description });
        }
    }

    let table = match (best_mode, previous) {
        (SymbolMode::Repeat, Some(prev)) => prev.clone(),
        _ => StreamTable::Fse(predefined.clone()),
    };
    Ok(Choice { mode: best_mode, table, header: Vec::new() })
}

// ─────────────────────────────────────────────────────────────────────────────
// Encoder
// ─────────────────────────────────────────────────────────────────────────────

/// Append the sequences section for `seqs` to `out`.
///
/// `state` supplies the previous block's tables for repeat mode (when
/// `allow_repeat`) and receives the tables this section uses.
pub fn encode_sequences(
    seqs: &[Sequence],
    fse_max_log: u8,
    allow_repeat: bool,
    state: &mut EntropyState,
    out: &mut Vec<u8>,
) -> Result<()> {
    write_varint(out, seqs.len() as u64);
    let Some(last) = seqs.last() else {
        return Ok(());
    };

    let mut ll = Vec::with_capacity(seqs.len());
    let mut of = Vec::with_capacity(seqs.len());
    let mut ml = Vec::with_capacity(seqs.len());
    for s in seqs {
        if s.offset == 0 || s.match_len < MIN_MATCH {
            return Err(Error::CompressionFailed(format!("invalid sequence {s:?}")));
        }
        ll.push(ll_code(s.lit_len));
        of.push(of_code(s.offset));
        ml.push(ml_code(s.match_len));
    }

    let prev = |slot: &Option<StreamTable>| if allow_repeat { slot.clone() } else { None };
    let ll_choice = choose(Stream::LiteralLengths, &ll, fse_max_log, prev(&state.literal_lengths).as_ref())?;
    let of_choice = choose(Stream::Offsets, &of, fse_max_log, prev(&state.offsets).as_ref())?;
    let ml_choice = choose(Stream::MatchLengths, &ml, fse_max_log, prev(&state.match_lengths).as_ref())?;

    out.push(ll_choice.mode as u8 | (of_choice.mode as u8) << 2 | (ml_choice.mode as u8) << 4);
    for c in [&ll_choice, &of_choice, &ml_choice] {
        out.extend_from_slice(&c.header);
    }

    let mut w = BitWriter::with_capacity(seqs.len() * 4 + 8);
    let n = seqs.len();
    let mut ll_enc = ll_choice.fse().map(|t| FseEncoder::new(t, ll[n - 1]));
    let mut of_enc = of_choice.fse().map(|t| FseEncoder::new(t, of[n - 1]));
    let mut ml_enc = ml_choice.fse().map(|t| FseEncoder::new(t, ml[n - 1]));

    write_extras(&mut w, last, ll[n - 1], ml[n - 1], of[n - 1]);
    for i in (0..n - 1).rev() {
        if let Some(e) = of_enc.as_mut() {
            e.encode(&mut w, of[i]);
        }
        if let Some(e) = ml_enc.as_mut() {
            e.encode(&mut w, ml[i]);
        }
        if let Some(e) = ll_enc.as_mut() {
            e.encode(&mut w, ll[i]);
        }
        write_extras(&mut w, &seqs[i], ll[i], ml[i], of[i]);
    }
    if let Some(e) = ml_enc {
        e.flush(&mut w);
    }
    if let Some(e) = of_enc {
        e.flush(&mut w);
    }
    if let Some(e) = ll_enc {
        e.flush(&mut w);
    }
    out.extend_from_slice(&w.finish_with_marker());

    state.literal_lengths = Some(ll_choice.table);
    state.offsets = Some(of_choice.table);
    state.match_lengths = Some(ml_choice.table);
    Ok(())
}

#[inline]
fn write_extras(w: &mut BitWriter, s: &Sequence, ll: u8, ml: u8, of: u8) {
    w.write_bits(u64::from(s.lit_len - LL_BASE[ll as usize]), u32::from(LL_BITS[ll as usize]));
    w.write_bits(u64::from(s.match_len - ML_BASE[ml as usize]), u32::from(ML_BITS[ml as usize]));
    w.write_bits(u64::from(s.offset) - (1u64 << of), u32::from(of));
}

// ─────────────────────────────────────────────────────────────────────────────
// Decoder
// ─────────────────────────────────────────────────────────────────────────────

/// Source of symbols for one stream while decoding.
enum SymbolSource<'t> {
    Rle(u8),
    Fse(FseDecoder<'t>),
}

impl SymbolSource<'_> {
    #[inline]
    fn symbol(&self) -> u8 {
        match self {
            SymbolSource::Rle(s) => *s,
            SymbolSource::Fse(d) => d.symbol(),
        }
    }

    #[inline]
    fn update(&mut self, r: &mut BackwardBitReader<'_>) -> Result<()> {
        match self {
            SymbolSource::Rle(_) => Ok(()),
            SymbolSource::Fse(d) => d.update(r),
        }
    }
}

/// Read the table for one stream from the section header.
fn read_table(
    stream: Stream,
    mode: SymbolMode,
    r: &mut ByteReader<'_>,
    state: &EntropyState,
) -> Result<StreamTable> {
    match mode {
        SymbolMode::Predefined => Ok(StreamTable::Fse(stream.predefined()?.clone())),
        SymbolMode::Rle => {
            let s = r.read_u8()?;
            if s as usize > stream.max_symbol() {
                return Err(Error::CorruptFrame("RLE sequence code out of range"));
            }
            Ok(StreamTable::Rle(s))
        }
        SymbolMode::Fse => {
            let mut br = BitReader::new(r.peek_rest());
            let table = FseTable::parse(&mut br, stream.max_log(), stream.max_symbol())?;
            r.take(br.bytes_consumed())?;
            Ok(StreamTable::Fse(table))
        }
        SymbolMode::Repeat => {
            stream
                .current(state)
                .cloned()
                .ok_or(Error::CorruptFrame("sequence repeat without a previous table"))
        }
    }
}

/// Read a sequences section; the bitstream runs to the end of `r`.
pub fn decode_sequences(r: &mut ByteReader<'_>, state: &mut EntropyState) -> Result<Vec<Sequence>> {
    // Every sequence regenerates at least three bytes.
    let n = r.read_length(MAX_BLOCK_SIZE / 3)?;
    if n == 0 {
        return Ok(Vec::new());
    }
    let modes = r.read_u8()?;
    if modes & 0xC0 != 0 {
        return Err(Error::CorruptFrame("reserved sequence mode bits set"));
    }
    let ll_table = read_table(Stream::LiteralLengths, SymbolMode::from_bits(modes), r, state)?;
    let of_table = read_table(Stream::Offsets, SymbolMode::from_bits(modes >> 2), r, state)?;
    let ml_table = read_table(Stream::MatchLengths, SymbolMode::from_bits(modes >> 4), r, state)?;

    let stream = r.rest();
    let mut br = BackwardBitReader::new(stream)?;
    let mut ll_src = source(&ll_table, &mut br)?;
    let mut of_src = source(&of_table, &mut br)?;
    let mut ml_src = source(&ml_table, &mut br)?;

    let mut seqs = Vec::with_capacity(n);
    for i in 0..n {
        let ll = ll_src.symbol() as usize;
        let of = of_src.symbol() as u32;
        let ml = ml_src.symbol() as usize;
        if ll > LL_MAX_SYMBOL || ml > ML_MAX_SYMBOL || of as usize > OF_MAX_SYMBOL {
            return Err(Error::CorruptFrame("sequence code out of range"));
        }
        let offset = (1u64 << of) + br.read_bits(of)?;
        let match_len = u64::from(ML_BASE[ml]) + br.read_bits(u32::from(ML_BITS[ml]))?;
        let lit_len = u64::from(LL_BASE[ll]) + br.read_bits(u32::from(LL_BITS[ll]))?;
        seqs.push(Sequence {
            lit_len: lit_len as u32,
            offset: offset as u32,
            match_len: match_len as u32,
        });
        if i + 1 < n {
            ll_src.update(&mut br)?;
            ml_src.update(&mut br)?;
            of_src.update(&mut br)?;
        }
    }
    if !br.is_empty() {
        return Err(Error::CorruptFrame("trailing bits in sequence stream"));
    }

    for (stream, table) in [
        (Stream::LiteralLengths, ll_table),
        (Stream::Offsets, of_table),
        (Stream::MatchLengths, ml_table),
    ] {
        *stream.slot(state) = Some(table);
    }
    Ok(seqs)
}

fn source<'t>(table: &'t StreamTable, br: &mut BackwardBitReader<'_>) -> Result<SymbolSource<'t>> {
    Ok(match table {
        StreamTable::Rle(s) => SymbolSource::Rle(*s),
        StreamTable::Fse(t) => SymbolSource::Fse(FseDecoder::new(t, br)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(lit_len: u32, offset: u32, match_len: u32) -> Sequence {
        Sequence { lit_len, offset, match_len }
    }

    fn roundtrip(seqs: &[Sequence], state_in: &EntropyState, allow_repeat: bool) -> (Vec<u8>, EntropyState) {
        let mut enc_state = state_in.clone();
        let mut out = Vec::new();
        encode_sequences(seqs, 9, allow_repeat, &mut enc_state, &mut out).unwrap();
        let mut dec_state = state_in.clone();
        let mut r = ByteReader::new(&out);
        assert_eq!(decode_sequences(&mut r, &mut dec_state).unwrap(), seqs);
        assert!(r.is_empty());
        assert_eq!(enc_state, dec_state);
        (out, enc_state)
    }

    fn varied(n: u32) -> Vec<Sequence> {
        (0..n)
            .map(|i| seq(i % 20, 1 + (i * 7919) % 100_000, 3 + (i * 13) % 300))
            .collect()
    }

    #[test]
    fn code_tables_cover_ranges() {
        assert_eq!(ll_code(0), 0);
        assert_eq!(ll_code(15), 15);
        assert_eq!(ll_code(16), 16);
        assert_eq!(ll_code(17), 16);
        assert_eq!(ll_code(18), 17);
        assert_eq!(ll_code(65536), 35);
        assert_eq!(ll_code(131_071), 35);
        assert_eq!(ml_code(3), 0);
        assert_eq!(ml_code(34), 31);
        assert_eq!(ml_code(35), 32);
        assert_eq!(ml_code(131_074), 52);
        assert_eq!(of_code(1), 0);
        assert_eq!(of_code(2), 1);
        assert_eq!(of_code(3), 1);
        assert_eq!(of_code(1 << 24), 24);
    }

    #[test]
    fn code_extra_bits_reach_next_base() {
        for code in 0..LL_MAX_SYMBOL {
            assert_eq!(LL_BASE[code] + (1 << LL_BITS[code]), LL_BASE[code + 1], "ll {code}");
        }
        for code in 0..ML_MAX_SYMBOL {
            assert_eq!(ML_BASE[code] + (1 << ML_BITS[code]), ML_BASE[code + 1], "ml {code}");
        }
    }

    #[test]
    fn predefined_tables_build() {
        let p = predefined().unwrap();
        assert_eq!(p.ll.table_log(), 6);
        assert_eq!(p.ml.table_log(), 6);
        assert_eq!(p.of.table_log(), 5);
    }

    #[test]
    fn empty_section() {
        let (out, state) = roundtrip(&[], &EntropyState::default(), true);
        assert_eq!(out, [0]);
        assert_eq!(state, EntropyState::default());
    }

    #[test]
    fn single_sequence() {
        let (_, state) = roundtrip(&[seq(5, 1, 10)], &EntropyState::default(), true);
        assert_eq!(state.offsets, Some(StreamTable::Rle(0)));
    }

    #[test]
    fn many_sequences_use_fse() {
        let seqs = varied(2000);
        let (out, state) = roundtrip(&seqs, &EntropyState::default(), true);
        assert_eq!(SymbolMode::from_bits(out[2] >> 2), SymbolMode::Fse);
        assert!(matches!(state.offsets, Some(StreamTable::Fse(_))));
    }

    #[test]
    fn few_sequences_use_predefined_or_rle() {
        let seqs = [seq(1, 10, 4), seq(2, 20, 5), seq(0, 300, 3)];
        let (out, _) = roundtrip(&seqs, &EntropyState::default(), true);
        let modes = out[1];
        for shift in [0, 2, 4] {
            assert_ne!(SymbolMode::from_bits(modes >> shift), SymbolMode::Fse);
        }
    }

    #[test]
    fn extreme_values() {
        let seqs = [seq(131_000, 1 << 24, 131_074), seq(0, 1, 3), seq(65_535, 123_456, 65_539)];
        roundtrip(&seqs, &EntropyState::default(), true);
    }

    #[test]
    fn repeat_mode_reuses_tables() {
        let seqs = varied(2000);
        let (_, state) = roundtrip(&seqs, &EntropyState::default(), true);
        let (out, _) = roundtrip(&seqs[..600], &state, true);
        let modes = out[2];
        assert!([0, 2, 4]
            .iter()
            .any(|&s| SymbolMode::from_bits(modes >> s) == SymbolMode::Repeat));
    }

    #[test]
    fn repeat_disallowed() {
        let seqs = varied(2000);
        let (_, state) = roundtrip(&seqs, &EntropyState::default(), true);
        let (out, _) = roundtrip(&seqs[..600], &state, false);
        let modes = out[2];
        for shift in [0, 2, 4] {
            assert_ne!(SymbolMode::from_bits(modes >> shift), SymbolMode::Repeat);
        }
    }

    #[test]
    fn repeat_without_previous_is_corrupt() {
        let section = [1u8, 0b11, 0x01];
        assert_eq!(
            decode_sequences(&mut ByteReader::new(&section), &mut EntropyState::default()),
            Err(Error::CorruptFrame("sequence repeat without a previous table"))
        );
    }

    #[test]
    fn truncated_bitstream_is_corrupt() {
        let seqs = varied(500);
        let mut out = Vec::new();
        encode_sequences(&seqs, 9, true, &mut EntropyState::default(), &mut out).unwrap();
        out.truncate(out.len() - 10);
        out.push(0x80);
        assert!(decode_sequences(&mut ByteReader::new(&out), &mut EntropyState::default()).is_err());
    }

    #[test]
    fn invalid_sequence_rejected_by_encoder() {
        let mut out = Vec::new();
        let err = encode_sequences(&[seq(0, 0, 5)], 9, true, &mut EntropyState::default(), &mut out);
        assert!(matches!(err, Err(Error::CompressionFailed(_))));
    }
}
