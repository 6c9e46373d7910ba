//! Canonical Huffman coding for literal bytes.
//!
//! Code lengths are limited to [`HUF_MAX_BITS`]. Codes are assigned
//! canonically (shorter codes first, then by symbol value) and stored
//! bit-reversed so they can be appended to an LSB-first [`BitWriter`] and
//! decoded with a single table lookup of `max_bits` bits.
//!
//! An alphabet with exactly one symbol uses zero-bit codes: the stream is
//! empty and the decoder repeats the symbol `count` times.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::bits::{BitReader, BitWriter, ByteReader};
use crate::error::{Error, Result};

/// Longest code length the encoder produces and the decoder accepts.
pub const HUF_MAX_BITS: u8 = 11;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct DecodeEntry {
    symbol: u8,
    /// Code length; zero marks a bit pattern no code starts with.
    len: u8,
}

/// Code lengths plus the derived encode codes and decode lookup table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTable {
    lengths: Vec<u8>,
    codes: Vec<u16>,
    max_bits: u8,
    decode: Vec<DecodeEntry>,
}

impl HuffmanTable {
    /// Build an optimal length-limited code for `freqs`.
    pub fn from_frequencies(freqs: &[u32]) -> Result<Self> {
        if freqs.len() > 256 {
            return Err(Error::CompressionFailed("Huffman alphabet larger than a byte".into()));
        }
        let present: Vec<usize> = (0..freqs.len()).filter(|&s| freqs[s] > 0).collect();
        let max_symbol = *present
            .last()
            .ok_or_else(|| Error::CompressionFailed("cannot build Huffman code for no symbols".into()))?;
        let mut lengths = vec![0u8; max_symbol + 1];
        if present.len() > 1 {
            let raw = tree_depths(freqs, &present);
            for (&s, &d) in present.iter().zip(&raw) {
                lengths[s] = d.min(u32::from(u8::MAX)) as u8;
            }
            limit_lengths(&mut lengths, freqs, &present, HUF_MAX_BITS);
        }
        Self::from_lengths(lengths)
    }

    /// Build from explicit code lengths. All zero means the single symbol
    /// `lengths.len() - 1`.
    pub fn from_lengths(lengths: Vec<u8>) -> Result<Self> {
        if lengths.is_empty() || lengths.len() > 256 {
            return Err(Error::CorruptFrame("invalid Huffman alphabet size"));
        }
        let max_bits = lengths.iter().copied().max().unwrap_or(0);
        if max_bits > HUF_MAX_BITS {
            return Err(Error::CorruptFrame("Huffman code length too large"));
        }
        if max_bits == 0 {
            return Ok(HuffmanTable {
                codes: vec![0; lengths.len()],
                lengths,
                max_bits: 0,
                decode: Vec::new(),
            });
        }

        let mut kraft = 0u32;
        let mut bl_count = [0u32; HUF_MAX_BITS as usize + 1];
        for &l in &lengths {
            if l > 0 {
                bl_count[l as usize] += 1;
                kraft += 1 << (max_bits - l);
            }
        }
        if kraft > 1 << max_bits {
            return Err(Error::CorruptFrame("oversubscribed Huffman code"));
        }

        let mut next_code = [0u32; HUF_MAX_BITS as usize + 1];
        let mut code = 0u32;
        for bits in 1..=max_bits as usize {
            code = (code + bl_count[bits - 1]) << 1;
            next_code[bits] = code;
        }

        let mut codes = vec![0u16; lengths.len()];
        let size = 1usize << max_bits;
        let mut decode = vec![DecodeEntry::default(); size];
        for (s, &l) in lengths.iter().enumerate() {
            if l == 0 {
                continue;
            }
            let c = next_code[l as usize];
            next_code[l as usize] += 1;
            let rev = reverse_bits(c, l);
            codes[s] = rev as u16;
            let entry = DecodeEntry { symbol: s as u8, len: l };
            for idx in (rev as usize..size).step_by(1 << l) {
                decode[idx] = entry;
            }
        }

        Ok(HuffmanTable { lengths, codes, max_bits, decode })
    }

    pub fn max_bits(&self) -> u8 {
        self.max_bits
    }

    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    pub fn max_symbol(&self) -> usize {
        self.lengths.len() - 1
    }

    fn single(&self) -> Option<u8> {
        (self.max_bits == 0).then_some(self.max_symbol() as u8)
    }

    #[inline]
    pub fn can_encode(&self, symbol: u8) -> bool {
        match self.single() {
            Some(s) => s == symbol,
            None => self.lengths.get(symbol as usize).is_some_and(|&l| l > 0),
        }
    }

    /// Exact payload size in bits for `freqs`, or `None` if some present
    /// symbol has no code.
    pub fn encoded_bits(&self, freqs: &[u32]) -> Option<u64> {
        let mut bits = 0u64;
        for (s, &f) in freqs.iter().enumerate() {
            if f == 0 {
                continue;
            }
            if !self.can_encode(s as u8) {
                return None;
            }
            bits += u64::from(f) * u64::from(self.lengths[s]);
        }
        Some(bits)
    }

    // ── Description ─────────────────────────────────────────────────────────

    /// Size in bytes of [`describe`](Self::describe)'s output.
    pub fn description_len(&self) -> usize {
        1 + self.lengths.len().div_ceil(2)
    }

    /// Max symbol byte, then one 4-bit length per symbol, low nibble first.
    pub fn describe(&self, out: &mut Vec<u8>) {
        out.push(self.max_symbol() as u8);
        for pair in self.lengths.chunks(2) {
            let hi = pair.get(1).copied().unwrap_or(0);
            out.push(pair[0] | (hi << 4));
        }
    }

    pub fn parse(r: &mut ByteReader<'_>) -> Result<Self> {
        let max_symbol = r.read_u8()? as usize;
        let packed = r.take((max_symbol + 1).div_ceil(2))?;
        let mut lengths = Vec::with_capacity(max_symbol + 1);
        for &b in packed {
            lengths.push(b & 0x0F);
            lengths.push(b >> 4);
        }
        if lengths.len() > max_symbol + 1 && lengths.pop() != Some(0) {
            return Err(Error::CorruptFrame("Huffman description padding not zero"));
        }
        Self::from_lengths(lengths)
    }
}

/// Depth of each present symbol in a Huffman tree over `freqs`.
///
/// Ties are broken by node id so the tree is reproducible.
fn tree_depths(freqs: &[u32], present: &[usize]) -> Vec<u32> {
    let n = present.len();
    let mut parent = vec![usize::MAX; 2 * n - 1];
    let mut heap: BinaryHeap<Reverse<(u64, usize)>> = present
        .iter()
        .enumerate()
        .map(|(i, &s)| Reverse((u64::from(freqs[s]), i)))
        .collect();
    let mut next = n;
    while heap.len() > 1 {
        let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) else {
            break;
        };
        parent[a] = next;
        parent[b] = next;
        heap.push(Reverse((wa + wb, next)));
        next += 1;
    }
    (0..n)
        .map(|i| {
            let mut depth = 0;
            let mut node = i;
            while parent[node] != usize::MAX {
                node = parent[node];
                depth += 1;
            }
            depth
        })
        .collect()
}

/// Clamp lengths to `max` and restore the Kraft inequality by lengthening
/// the rarest codes, then spend any slack on the most frequent ones.
fn limit_lengths(lengths: &mut [u8], freqs: &[u32], present: &[usize], max: u8) {
    let cap = 1u32 << max;
    let mut order = present.to_vec();
    order.sort_by(|&a, &b| freqs[a].cmp(&freqs[b]).then(a.cmp(&b)));

    let mut over = false;
    for &s in present {
        if lengths[s] > max {
            lengths[s] = max;
            over = true;
        }
    }
    if !over {
        return;
    }

    let mut kraft: u32 = present.iter().map(|&s| 1u32 << (max - lengths[s])).sum();
    while kraft > cap {
        for &s in &order {
            if kraft <= cap {
                break;
            }
            if lengths[s] < max {
                kraft -= 1 << (max - lengths[s] - 1);
                lengths[s] += 1;
            }
        }
    }

    loop {
        let mut changed = false;
        for &s in order.iter().rev() {
            let l = lengths[s];
            if l > 1 && kraft + (1 << (max - l)) <= cap {
                kraft += 1 << (max - l);
                lengths[s] = l - 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
}

#[inline]
fn reverse_bits(code: u32, len: u8) -> u32 {
    code.reverse_bits() >> (32 - u32::from(len))
}

/// Huffman-code `symbols` with `table`.
pub fn encode(symbols: &[u8], table: &HuffmanTable) -> Result<Vec<u8>> {
    if let Some(&bad) = symbols.iter().find(|&&s| !table.can_encode(s)) {
        return Err(Error::CompressionFailed(format!(
            "symbol {bad} has no Huffman code"
        )));
    }
    if table.single().is_some() {
        return Ok(Vec::new());
    }
    let mut w = BitWriter::with_capacity(symbols.len());
    for &s in symbols {
        let i = s as usize;
        w.write_bits(u64::from(table.codes[i]), u32::from(table.lengths[i]));
    }
    Ok(w.finish())
}

/// Decode exactly `count` symbols. The stream must be fully used and its
/// padding bits zero.
pub fn decode(stream: &[u8], table: &HuffmanTable, count: usize) -> Result<Vec<u8>> {
    if let Some(s) = table.single() {
        if !stream.is_empty() {
            return Err(Error::CorruptFrame("unexpected Huffman payload"));
        }
        return Ok(vec![s; count]);
    }
    // Every symbol costs at least one bit.
    if count > stream.len().saturating_mul(8) {
        return Err(Error::CorruptFrame("Huffman stream too short"));
    }
    let mut r = BitReader::new(stream);
    let mut out = Vec::with_capacity(count);
    let peek = u32::from(table.max_bits);
    for _ in 0..count {
        let e = table.decode[r.peek_bits(peek) as usize];
        if e.len == 0 {
            return Err(Error::CorruptFrame("invalid Huffman code"));
        }
        r.consume(u32::from(e.len))?;
        out.push(e.symbol);
    }
    let left = r.bits_remaining();
    if left >= 8 || r.peek_bits(left as u32) != 0 {
        return Err(Error::CorruptFrame("trailing data in Huffman stream"));
    }
    Ok(out)
}
