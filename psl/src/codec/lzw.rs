//! LZW compression with 9 to 12 bit codes.

use rustc_hash::{FxBuildHasher, FxHashMap};

const CLEAR: u16 = 256;
const EOD: u16 = 257;
/// When the next free code reaches this, the table is cleared.
const TABLE_LIMIT: u16 = 4095;
/// See [`super::rle`].
const GRACE: usize = 512;

/// An LZW encoder producing the code stream understood by the PostScript
/// `LZWDecode` filter, with early change.
///
/// The partially filled output byte is a field of the encoder, so separate
/// encoders never share state.
#[derive(Debug, Default)]
pub struct LzwEncoder {
    out: Vec<u8>,
    bit_buffer: u32,
    bit_count: u32,
    depth: u32,
}

impl LzwEncoder {
    /// Create a new encoder.
    pub fn new() -> Self {
        Self::default()
    }

    fn put(&mut self, code: u16) {
        self.bit_buffer |= (code as u32) << (32 - self.depth - self.bit_count);
        self.bit_count += self.depth;

        while self.bit_count >= 8 {
            self.out.push((self.bit_buffer >> 24) as u8);
            self.bit_buffer <<= 8;
            self.bit_count -= 8;
        }

        if code == EOD {
            self.out.push((self.bit_buffer >> 24) as u8);
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
    }

    /// Compress `input`. Returns `None` when the result would be larger than
    /// the input.
    pub fn encode(&mut self, input: &[u8]) -> Option<Vec<u8>> {
        let (&first, _) = input.split_first()?;

        self.out = Vec::with_capacity(input.len().max(GRACE) + 8);
        self.bit_buffer = 0;
        self.bit_count = 0;
        self.depth = 9;

        // Code of each (prefix, byte) string in the table.
        let mut codes: FxHashMap<(u16, u8), u16> =
            FxHashMap::with_capacity_and_hasher(TABLE_LIMIT as usize, FxBuildHasher);
        let mut table = TABLE_LIMIT;
        let mut limit = 0u16;
        let mut prefix = first as u16;
        let mut read = 1;

        while read < input.len() && (self.out.len() < read || self.out.len() < GRACE) {
            if table >= TABLE_LIMIT {
                self.put(CLEAR);
                codes.clear();
                table = EOD + 1;
                limit = CLEAR * 2;
                self.depth = 9;
            }

            let ext = input[read];
            read += 1;

            match codes.get(&(prefix, ext)) {
                Some(&code) => prefix = code,
                None => {
                    codes.insert((prefix, ext), table);
                    table += 1;
                    self.put(prefix);
                    prefix = ext as u16;

                    if table == limit {
                        limit <<= 1;
                        self.depth += 1;
                    }
                }
            }
        }

        self.put(prefix);
        self.put(EOD);

        let out = core::mem::take(&mut self.out);

        if read < input.len() || out.len() > input.len() {
            ldebug!("LZW inflated {} to {} bytes, no compression done", read, out.len());
            return None;
        }

        ldebug!("LZW compressed {} to {} bytes", input.len(), out.len());

        Some(out)
    }
}
