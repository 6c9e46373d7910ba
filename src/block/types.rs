//! Block header layout and shared block-level types.
//!
//! ```text
//! TypeAndLast (1 byte) | PayloadLength (varint) | Payload
//!
//! TypeAndLast: bit0 = last block, bits1-2 = BlockType, bits3-7 = 0
//! ```

use crate::bits::{write_varint, ByteReader};
use crate::config::{BLOCK_PAYLOAD_SLACK, MAX_BLOCK_SIZE};
use crate::entropy::{FseTable, HuffmanTable};
use crate::error::{Error, Result};

/// Largest payload length the decoder accepts for any block type.
pub const MAX_PAYLOAD_LEN: usize = MAX_BLOCK_SIZE + BLOCK_PAYLOAD_SLACK;

/// Largest header a block can have (type byte plus a varint for
/// [`MAX_PAYLOAD_LEN`]).
pub const MAX_BLOCK_HEADER_LEN: usize = 4;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum BlockType {
    /// Payload is the content, stored verbatim.
    Raw = 0,
    /// Payload is `varint(run) | byte`: one byte repeated `run` times.
    Rle = 1,
    /// Payload is a literals section and a sequences section.
    Compressed = 2,
}

impl BlockType {
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            0 => Ok(BlockType::Raw),
            1 => Ok(BlockType::Rle),
            2 => Ok(BlockType::Compressed),
            _ => Err(Error::CorruptFrame("reserved block type")),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Raw => "raw",
            BlockType::Rle => "rle",
            BlockType::Compressed => "compressed",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockHeader {
    pub block_type: BlockType,
    pub last: bool,
    pub payload_len: usize,
}

impl BlockHeader {
    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(u8::from(self.last) | (self.block_type as u8) << 1);
        write_varint(out, self.payload_len as u64);
    }

    pub fn read(r: &mut ByteReader<'_>) -> Result<Self> {
        let b = r.read_u8()?;
        if b & 0xF8 != 0 {
            return Err(Error::CorruptFrame("reserved block header bits set"));
        }
        let block_type = BlockType::from_bits((b >> 1) & 0x03)?;
        let payload_len = r.read_length(MAX_PAYLOAD_LEN)?;
        Ok(BlockHeader {
            block_type,
            last: b & 1 != 0,
            payload_len,
        })
    }
}

/// Table a sequence stream was coded with, kept for "repeat" mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamTable {
    /// Every symbol was the same.
    Rle(u8),
    Fse(FseTable),
}

/// Tables carried from one Compressed block to the next.
///
/// Both sides update it only when a Compressed block is emitted or decoded;
/// Raw and RLE blocks leave it untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EntropyState {
    pub huffman: Option<HuffmanTable>,
    pub literal_lengths: Option<StreamTable>,
    pub offsets: Option<StreamTable>,
    pub match_lengths: Option<StreamTable>,
}

/// One encoded block, ready to be framed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedBlock {
    pub block_type: BlockType,
    pub payload: Vec<u8>,
    /// Bytes of content this block regenerates.
    pub content_len: usize,
}

impl EncodedBlock {
    /// Header plus payload size once framed.
    pub fn framed_len(&self) -> usize {
        1 + crate::bits::varint_len(self.payload.len() as u64) + self.payload.len()
    }

    pub fn write(&self, last: bool, out: &mut Vec<u8>) {
        BlockHeader {
            block_type: self.block_type,
            last,
            payload_len: self.payload.len(),
        }
        .write(out);
        out.extend_from_slice(&self.payload);
    }
}
