//! Frame format: header, ordered blocks, optional content checksum.

pub mod compress;
pub mod decompress;
pub mod header;
pub mod types;

pub use compress::{compress_frame, split_blocks};
pub use decompress::{decompress_frame, decompressed_size, scan_frame, FrameScan};
pub use header::{compress_bound, compress_bound_with, parse_header, write_header};
pub use types::{FrameInfo, MAGIC, MAX_HEADER_LEN};
