//! Finite State Entropy (tANS) tables and streams.
//!
//! A table is built from a *normalized* distribution: per-symbol counts that
//! sum to `1 << table_log`. A count of `-1` marks a "less than one" symbol
//! that still gets a single state at the top of the table; only the
//! predefined sequence distributions use it.
//!
//! Encoding walks the symbols back to front and produces a marker-terminated
//! stream; decoding reads that stream from its end and yields the symbols
//! front to back.
//!
//! | Item                      | Role                                         |
//! |---------------------------|----------------------------------------------|
//! | [`normalize`]             | raw histogram → normalized counts            |
//! | [`FseTable`]              | encode + decode tables for one distribution  |
//! | [`FseTable::describe`]    | compact table description writer            |
//! | [`FseTable::parse`]       | table description reader                     |
//! | [`FseEncoder`]/[`FseDecoder`] | per-stream state machines                |
//! | [`encode`] / [`decode`]   | single-stream convenience API                |

use crate::bits::{highbit32, BackwardBitReader, BitReader, BitWriter};
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Limits
// ─────────────────────────────────────────────────────────────────────────────

pub const FSE_MIN_TABLE_LOG: u8 = 5;
pub const FSE_MAX_TABLE_LOG: u8 = 12;
/// Largest symbol value a table can describe.
pub const FSE_MAX_SYMBOL: usize = 255;

// ─────────────────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// Normalized distribution: `counts` sum to `1 << table_log`, with `-1`
/// entries counting as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCounts {
    pub counts: Vec<i16>,
    pub table_log: u8,
}

/// Pick a table log for `total` samples over symbols `0..=max_symbol`.
///
/// Small inputs get small tables (a big table cannot pay for its own
/// description), but the table always has more states than symbols.
pub fn optimal_table_log(max_log: u8, total: u32, max_symbol: usize) -> u8 {
    let max_bits_src = if total > 1 {
        highbit32(total - 1).saturating_sub(2)
    } else {
        0
    };
    let min_bits_src = highbit32(total.max(1)) + 1;
    let min_bits_symbols = highbit32((max_symbol as u32).max(1)) + 2;
    let min_bits = min_bits_src.min(min_bits_symbols);

    let mut log = u32::from(max_log);
    if max_bits_src < log {
        log = max_bits_src;
    }
    if min_bits > log {
        log = min_bits;
    }
    log.clamp(u32::from(FSE_MIN_TABLE_LOG), u32::from(FSE_MAX_TABLE_LOG)) as u8
}

/// Scale a histogram to a power-of-two total.
///
/// Every present symbol keeps at least one state. Rounding surplus goes to
/// the most frequent symbol; deficits are taken from the largest counts
/// first. The result depends only on `freqs` and `max_log`.
pub fn normalize(freqs: &[u32], max_log: u8) -> Result<NormalizedCounts> {
    let total: u64 = freqs.iter().map(|&f| u64::from(f)).sum();
    let max_symbol = freqs
        .iter()
        .rposition(|&f| f > 0)
        .ok_or_else(|| Error::CompressionFailed("cannot normalize an empty histogram".into()))?;
    if max_symbol > FSE_MAX_SYMBOL {
        return Err(Error::CompressionFailed("symbol out of FSE range".into()));
    }
    let total32 = u32::try_from(total)
        .map_err(|_| Error::CompressionFailed("histogram total too large".into()))?;

    let table_log = optimal_table_log(max_log, total32, max_symbol);
    let size = 1i64 << table_log;
    let mut counts = vec![0i16; max_symbol + 1];

    let present: Vec<usize> = (0..=max_symbol).filter(|&s| freqs[s] > 0).collect();
    if present.len() == 1 {
        counts[present[0]] = size as i16;
        return Ok(NormalizedCounts { counts, table_log });
    }

    let mut distributed = 0i64;
    for &s in &present {
        let scaled = ((u64::from(freqs[s]) * size as u64 + total / 2) / total).max(1) as i64;
        counts[s] = scaled as i16;
        distributed += scaled;
    }

    // Largest raw frequency first, lowest symbol on ties.
    let mut order = present;
    order.sort_by(|&a, &b| freqs[b].cmp(&freqs[a]).then(a.cmp(&b)));

    let mut diff = size - distributed;
    if diff > 0 {
        counts[order[0]] += diff as i16;
    }
    while diff < 0 {
        // Take from the current largest counts, one state each pass.
        let mut by_count = order.clone();
        by_count.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));
        let mut progressed = false;
        for &s in &by_count {
            if diff == 0 {
                break;
            }
            if counts[s] > 1 {
                counts[s] -= 1;
                diff += 1;
                progressed = true;
            }
        }
        if !progressed {
            return Err(Error::CompressionFailed("FSE normalization did not converge".into()));
        }
    }

    Ok(NormalizedCounts { counts, table_log })
}

// ─────────────────────────────────────────────────────────────────────────────
// Table
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DecodeEntry {
    symbol: u8,
    nb_bits: u8,
    new_state: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct SymbolTransform {
    delta_nb_bits: u32,
    delta_find_state: i32,
}

/// Encode and decode tables derived from one normalized distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FseTable {
    table_log: u8,
    counts: Vec<i16>,
    decode: Vec<DecodeEntry>,
    state_table: Vec<u16>,
    symbol_tt: Vec<SymbolTransform>,
}

impl FseTable {
    /// Convenience: normalize `freqs` (capped at `max_log`) and build.
    pub fn from_frequencies(freqs: &[u32], max_log: u8) -> Result<Self> {
        let norm = normalize(freqs, max_log)?;
        Self::from_normalized(&norm.counts, norm.table_log)
    }

    /// Build from normalized counts. Fails with `CorruptFrame` when the
    /// counts do not describe a complete table, because descriptions read
    /// from a frame end up here.
    pub fn from_normalized(counts: &[i16], table_log: u8) -> Result<Self> {
        if !(FSE_MIN_TABLE_LOG..=FSE_MAX_TABLE_LOG).contains(&table_log)
            || counts.is_empty()
            || counts.len() > FSE_MAX_SYMBOL + 1
        {
            return Err(Error::CorruptFrame("invalid FSE table shape"));
        }
        let size = 1usize << table_log;
        let mut sum = 0i64;
        for &c in counts {
            if c < -1 {
                return Err(Error::CorruptFrame("invalid FSE count"));
            }
            sum += if c == -1 { 1 } else { i64::from(c) };
        }
        if sum != size as i64 {
            return Err(Error::CorruptFrame("FSE counts do not fill the table"));
        }

        // Spread symbols over the state space; "less than one" symbols take
        // the highest states.
        let mut table_symbol = vec![0u8; size];
        let mut high = size as isize - 1;
        for (s, &c) in counts.iter().enumerate() {
            if c == -1 {
                table_symbol[high as usize] = s as u8;
                high -= 1;
            }
        }
        let mask = size - 1;
        let step = (size >> 1) + (size >> 3) + 3;
        let mut pos = 0usize;
        for (s, &c) in counts.iter().enumerate() {
            for _ in 0..c.max(0) {
                table_symbol[pos] = s as u8;
                pos = (pos + step) & mask;
                while pos as isize > high {
                    pos = (pos + step) & mask;
                }
            }
        }
        if pos != 0 {
            return Err(Error::CorruptFrame("FSE spread did not close"));
        }

        // Decode side.
        let mut symbol_next: Vec<u32> = counts
            .iter()
            .map(|&c| if c == -1 { 1 } else { c as u32 })
            .collect();
        let mut decode = Vec::with_capacity(size);
        for &s in &table_symbol {
            let next = symbol_next[s as usize];
            symbol_next[s as usize] += 1;
            let nb_bits = u32::from(table_log) - highbit32(next);
            decode.push(DecodeEntry {
                symbol: s,
                nb_bits: nb_bits as u8,
                new_state: ((next << nb_bits) as usize - size) as u16,
            });
        }

        // Encode side.
        let mut cumul = vec![0usize; counts.len() + 1];
        for (s, &c) in counts.iter().enumerate() {
            cumul[s + 1] = cumul[s] + if c == -1 { 1 } else { c as usize };
        }
        let mut state_table = vec![0u16; size];
        for (u, &s) in table_symbol.iter().enumerate() {
            let slot = &mut cumul[s as usize];
            state_table[*slot] = (size + u) as u16;
            *slot += 1;
        }

        let log = u32::from(table_log);
        let mut total = 0i32;
        let symbol_tt = counts
            .iter()
            .map(|&c| match c {
                0 => SymbolTransform {
                    delta_nb_bits: ((log + 1) << 16) - size as u32,
                    delta_find_state: 0,
                },
                -1 | 1 => {
                    let tt = SymbolTransform {
                        delta_nb_bits: (log << 16) - size as u32,
                        delta_find_state: total - 1,
                    };
                    total += 1;
                    tt
                }
                _ => {
                    let c32 = c as u32;
                    let max_bits_out = log - highbit32(c32 - 1);
                    let min_state_plus = c32 << max_bits_out;
                    let tt = SymbolTransform {
                        delta_nb_bits: (max_bits_out << 16) - min_state_plus,
                        delta_find_state: total - c as i32,
                    };
                    total += c as i32;
                    tt
                }
            })
            .collect();

        Ok(FseTable {
            table_log,
            counts: counts.to_vec(),
            decode,
            state_table,
            symbol_tt,
        })
    }

    #[inline]
    pub fn table_log(&self) -> u8 {
        self.table_log
    }

    pub fn counts(&self) -> &[i16] {
        &self.counts
    }

    pub fn max_symbol(&self) -> usize {
        self.counts.len() - 1
    }

    /// `true` if `symbol` has at least one state.
    #[inline]
    pub fn can_encode(&self, symbol: u8) -> bool {
        self.counts.get(symbol as usize).is_some_and(|&c| c != 0)
    }

    /// Approximate cost in bits of coding `freqs` with this table, or `None`
    /// if some present symbol has no state.
    pub fn estimate_bits(&self, freqs: &[u32]) -> Option<u64> {
        let size = (1u64 << self.table_log) as f64;
        let mut bits = 0f64;
        for (s, &f) in freqs.iter().enumerate() {
            if f == 0 {
                continue;
            }
            let c = *self.counts.get(s)?;
            if c == 0 {
                return None;
            }
            let p = if c == -1 { 1.0 } else { f64::from(c) };
            bits += f64::from(f) * (size / p).log2();
        }
        Some(bits.ceil() as u64 + u64::from(self.table_log))
    }

    // ── Description ─────────────────────────────────────────────────────────

    /// Write the table description: 4-bit `table_log - 5`, 8-bit max symbol,
    /// then each `count + 1` in just enough bits for what is left of the
    /// table.
    pub fn describe(&self, w: &mut BitWriter) {
        w.write_bits(u64::from(self.table_log - FSE_MIN_TABLE_LOG), 4);
        w.write_bits(self.max_symbol() as u64, 8);
        let mut remaining = 1i32 << self.table_log;
        for &c in &self.counts {
            let nb = bit_width((remaining + 1) as u32);
            w.write_bits((i32::from(c) + 1) as u64, nb);
            remaining -= if c == -1 { 1 } else { i32::from(c) };
        }
    }

    /// Serialized description as bytes.
    pub fn description(&self) -> Vec<u8> {
        let mut w = BitWriter::new();
        self.describe(&mut w);
        w.finish()
    }

    /// Read a description written by [`describe`](Self::describe).
    pub fn parse(r: &mut BitReader<'_>, max_log: u8, max_symbol: usize) -> Result<Self> {
        let table_log = r.read_bits(4)? as u8 + FSE_MIN_TABLE_LOG;
        if table_log > max_log {
            return Err(Error::CorruptFrame("FSE table log too large"));
        }
        let ms = r.read_bits(8)? as usize;
        if ms > max_symbol {
            return Err(Error::CorruptFrame("FSE max symbol out of range"));
        }
        let mut remaining = 1i32 << table_log;
        let mut counts = Vec::with_capacity(ms + 1);
        for _ in 0..=ms {
            let nb = bit_width((remaining + 1) as u32);
            let v = r.read_bits(nb)? as i32;
            if v > remaining + 1 {
                return Err(Error::CorruptFrame("FSE count exceeds table"));
            }
            let c = v - 1;
            remaining -= if c == -1 { 1 } else { c };
            if remaining < 0 {
                return Err(Error::CorruptFrame("FSE count exceeds table"));
            }
            counts.push(c as i16);
        }
        if remaining != 0 {
            return Err(Error::CorruptFrame("FSE counts do not fill the table"));
        }
        Self::from_normalized(&counts, table_log)
    }
}

/// Number of bits needed to write values up to `v`.
#[inline]
fn bit_width(v: u32) -> u32 {
    32 - v.leading_zeros()
}

// ─────────────────────────────────────────────────────────────────────────────
// State machines
// ─────────────────────────────────────────────────────────────────────────────

/// Encoder state for one stream. Symbols must be fed in reverse order.
#[derive(Debug)]
pub struct FseEncoder<'t> {
    table: &'t FseTable,
    value: u32,
}

impl<'t> FseEncoder<'t> {
    /// Start from the last symbol of the stream; writes nothing.
    pub fn new(table: &'t FseTable, symbol: u8) -> Self {
        let tt = table.symbol_tt[symbol as usize];
        let nb_bits_out = (tt.delta_nb_bits + (1 << 15)) >> 16;
        let value = (nb_bits_out << 16).wrapping_sub(tt.delta_nb_bits);
        let idx = ((value >> nb_bits_out) as i32 + tt.delta_find_state) as usize;
        FseEncoder {
            table,
            value: u32::from(table.state_table[idx]),
        }
    }

    #[inline]
    pub fn encode(&mut self, w: &mut BitWriter, symbol: u8) {
        let tt = self.table.symbol_tt[symbol as usize];
        let nb_bits_out = (self.value + tt.delta_nb_bits) >> 16;
        w.write_bits(u64::from(self.value), nb_bits_out);
        let idx = ((self.value >> nb_bits_out) as i32 + tt.delta_find_state) as usize;
        self.value = u32::from(self.table.state_table[idx]);
    }

    /// Emit the final state; the decoder reads it first.
    pub fn flush(self, w: &mut BitWriter) {
        w.write_bits(u64::from(self.value), u32::from(self.table.table_log));
    }
}

/// Decoder state for one stream.
#[derive(Debug)]
pub struct FseDecoder<'t> {
    table: &'t FseTable,
    state: usize,
}

impl<'t> FseDecoder<'t> {
    pub fn new(table: &'t FseTable, r: &mut BackwardBitReader<'_>) -> Result<Self> {
        let state = r.read_bits(u32::from(table.table_log))? as usize;
        Ok(FseDecoder { table, state })
    }

    #[inline]
    pub fn symbol(&self) -> u8 {
        self.table.decode[self.state].symbol
    }

    #[inline]
    pub fn update(&mut self, r: &mut BackwardBitReader<'_>) -> Result<()> {
        let e = self.table.decode[self.state];
        let low = r.read_bits(u32::from(e.nb_bits))? as usize;
        self.state = usize::from(e.new_state) + low;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Single-stream API
// ─────────────────────────────────────────────────────────────────────────────

/// Encode `symbols` with `table` into a standalone stream.
pub fn encode(symbols: &[u8], table: &FseTable) -> Result<Vec<u8>> {
    let Some((&last, rest)) = symbols.split_last() else {
        return Ok(Vec::new());
    };
    if let Some(&bad) = symbols.iter().find(|&&s| !table.can_encode(s)) {
        return Err(Error::CompressionFailed(format!(
            "symbol {bad} has no state in FSE table"
        )));
    }
    let mut w = BitWriter::with_capacity(symbols.len() / 2 + 8);
    let mut enc = FseEncoder::new(table, last);
    for &s in rest.iter().rev() {
        enc.encode(&mut w, s);
    }
    enc.flush(&mut w);
    Ok(w.finish_with_marker())
}

/// Decode exactly `count` symbols from a stream made by [`encode`].
pub fn decode(stream: &[u8], table: &FseTable, count: usize) -> Result<Vec<u8>> {
    if count == 0 {
        return if stream.is_empty() {
            Ok(Vec::new())
        } else {
            Err(Error::CorruptFrame("unexpected FSE payload"))
        };
    }
    let mut r = BackwardBitReader::new(stream)?;
    let mut dec = FseDecoder::new(table, &mut r)?;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        out.push(dec.symbol());
        if i + 1 < count {
            dec.update(&mut r)?;
        }
    }
    if !r.is_empty() {
        return Err(Error::CorruptFrame("trailing bits in FSE stream"));
    }
    Ok(out)
}
