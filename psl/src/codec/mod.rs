//! Image data encoding.
//!
//! Raw pixels pass through up to four stages before they reach the output:
//! color indexing, bit packing, compression and a binary-to-text transport.
//! Each stage works on whole byte buffers. The only stateful stage is LZW,
//! whose bit buffer lives in an [`lzw::LzwEncoder`] created per stream.

pub mod ascii85;
pub mod bitpack;
pub mod colormap;
pub mod deflate;
pub mod hex;
pub mod lzw;
pub mod rle;
pub(crate) mod stream;
