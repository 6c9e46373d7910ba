//! Literals section of a Compressed block.
//!
//! ```text
//! mode (1 byte) | varint(literal_count) | body
//!
//! mode 0  Raw            body = literal bytes
//! mode 1  RLE            body = one byte
//! mode 2  Huffman        body = table description | varint(stream_len) | stream
//! mode 3  Huffman repeat body = varint(stream_len) | stream   (previous table)
//! ```

use crate::bits::{varint_len, write_varint, ByteReader};
use crate::config::MAX_BLOCK_SIZE;
use crate::entropy::{histogram, huffman, single_symbol, HuffmanTable};
use crate::error::{Error, Result};

/// Below this many literals Huffman coding is not attempted.
pub const HUF_MIN_LITERALS: usize = 32;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum LiteralsMode {
    Raw = 0,
    Rle = 1,
    Huffman = 2,
    HuffmanRepeat = 3,
}

impl LiteralsMode {
    fn from_byte(b: u8) -> Result<Self> {
        match b {
            0 => Ok(LiteralsMode::Raw),
            1 => Ok(LiteralsMode::Rle),
            2 => Ok(LiteralsMode::Huffman),
            3 => Ok(LiteralsMode::HuffmanRepeat),
            _ => Err(Error::CorruptFrame("unknown literals mode")),
        }
    }
}

/// Append the literals section for `literals` to `out` and return the
/// mode used.
///
/// `state` is the Huffman table of the previous Compressed block; it is
/// replaced when a new table is written. `allow_repeat` is false for blocks
/// encoded independently of their predecessors.
pub fn encode_literals(
    literals: &[u8],
    use_huffman: bool,
    allow_repeat: bool,
    state: &mut Option<HuffmanTable>,
    out: &mut Vec<u8>,
) -> Result<LiteralsMode> {
    let count = literals.len();

    if count >= 2 {
        if let Some(b) = single_symbol(literals) {
            out.push(LiteralsMode::Rle as u8);
            write_varint(out, count as u64);
            out.push(b);
            return Ok(LiteralsMode::Rle);
        }
    }

    if use_huffman && count >= HUF_MIN_LITERALS {
        let freqs = histogram(literals);
        let fresh = HuffmanTable::from_frequencies(&freqs)?;
        let fresh_bytes = fresh
            .encoded_bits(&freqs)
            .map(|bits| {
                let stream = bits.div_ceil(8) as usize;
                fresh.description_len() + varint_len(stream as u64) + stream
            })
            .unwrap_or(usize::MAX);
        let repeat_bytes = state
            .as_ref()
            .filter(|_| allow_repeat)
            .and_then(|t| t.encoded_bits(&freqs))
            .map(|bits| {
                let stream = bits.div_ceil(8) as usize;
                varint_len(stream as u64) + stream
            })
            .unwrap_or(usize::MAX);

        if repeat_bytes < count && repeat_bytes <= fresh_bytes {
            if let Some(table) = state.as_ref() {
                let stream = huffman::encode(literals, table)?;
                out.push(LiteralsMode::HuffmanRepeat as u8);
                write_varint(out, count as u64);
                write_varint(out, stream.len() as u64);
                out.extend_from_slice(&stream);
                return Ok(LiteralsMode::HuffmanRepeat);
            }
        }
        if fresh_bytes < count {
            let stream = huffman::encode(literals, &fresh)?;
            out.push(LiteralsMode::Huffman as u8);
            write_varint(out, count as u64);
            fresh.describe(out);
            write_varint(out, stream.len() as u64);
            out.extend_from_slice(&stream);
            *state = Some(fresh);
            return Ok(LiteralsMode::Huffman);
        }
    }

    out.push(LiteralsMode::Raw as u8);
    write_varint(out, count as u64);
    out.extend_from_slice(literals);
    Ok(LiteralsMode::Raw)
}

/// Read a literals section. Updates `state` when the section carries a new
/// Huffman table.
pub fn decode_literals(r: &mut ByteReader<'_>, state: &mut Option<HuffmanTable>) -> Result<Vec<u8>> {
    let mode = LiteralsMode::from_byte(r.read_u8()?)?;
    let count = r.read_length(MAX_BLOCK_SIZE)?;
    match mode {
        LiteralsMode::Raw => Ok(r.take(count)?.to_vec()),
        LiteralsMode::Rle => Ok(vec![r.read_u8()?; count]),
        LiteralsMode::Huffman => {
            let table = HuffmanTable::parse(r)?;
            let out = read_huffman_stream(r, &table, count)?;
            *state = Some(table);
            Ok(out)
        }
        LiteralsMode::HuffmanRepeat => {
            let table = state
                .as_ref()
                .ok_or(Error::CorruptFrame("literals repeat without a previous table"))?;
            read_huffman_stream(r, table, count)
        }
    }
}

fn read_huffman_stream(r: &mut ByteReader<'_>, table: &HuffmanTable, count: usize) -> Result<Vec<u8>> {
    let len = r.read_length(r.remaining())?;
    huffman::decode(r.take(len)?, table, count)
}
