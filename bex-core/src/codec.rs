//! LH5 decompression seam.
//!
//! The codec itself is external: Phoenix compresses most modules with the
//! same LZHUF "-lh5-" scheme LHA archives use, and the `delharc` crate's raw
//! stream decoder handles it. The trait keeps the extractor testable with a
//! stub codec.

use std::io;

use delharc::decode::{Decoder, Lh5Decoder};

/// Decoder for LH5-compressed module payloads.
pub trait Lh5Codec {
    /// Decode `packed` into `output`, filling it completely. `output` is
    /// allocated by the caller to the header's expected expanded length.
    fn decode(&self, packed: &[u8], output: &mut [u8]) -> io::Result<()>;
}

/// Production codec backed by `delharc`'s raw LH5 stream decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelharcLh5;

impl Lh5Codec for DelharcLh5 {
    fn decode(&self, packed: &[u8], output: &mut [u8]) -> io::Result<()> {
        let mut decoder = Lh5Decoder::new(packed);
        Ok(decoder.fill_buffer(output)?)
    }
}
