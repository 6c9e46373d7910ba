//! Block layer: one block of content in, one framed block out, and back.
//!
//! A Compressed block carries a literals section followed by a sequences
//! section. Entropy tables may be inherited from the previous Compressed
//! block of the same frame through [`EntropyState`].

pub mod decode;
pub mod encode;
pub mod literals;
pub mod sequences;
pub mod types;

pub use decode::{decode_block, regenerated_len};
pub use encode::encode_block;
pub use types::{BlockHeader, BlockType, EncodedBlock, EntropyState, MAX_BLOCK_HEADER_LEN, MAX_PAYLOAD_LEN};
