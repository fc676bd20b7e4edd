use std::io::{Read, Write};

use anyhow::Context;
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use mvc_core::codec::Compressor;
use mvc_core::format::COMPRESSOR_DEFLATE;

/// Deflate compressor producing one zlib stream per payload.
pub struct DeflateCompressor {
    level: Compression,
}

impl Default for DeflateCompressor {
    fn default() -> Self {
        Self {
            level: Compression::default(),
        }
    }
}

impl DeflateCompressor {
    /// Levels outside `0..=9` fall back to the zlib default (6).
    pub fn new(level: i32) -> Self {
        let level = match level {
            0..=9 => Compression::new(level as u32),
            _ => Compression::default(),
        };
        Self { level }
    }
}

impl Compressor for DeflateCompressor {
    fn id(&self) -> u16 {
        COMPRESSOR_DEFLATE
    }

    fn name(&self) -> &'static str {
        "deflate"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut enc = ZlibEncoder::new(Vec::with_capacity(raw.len() / 2), self.level);
        enc.write_all(raw).context("deflate encode")?;
        let compressed = enc.finish().context("deflate finish")?;
        Ok(compressed)
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        let mut dec = ZlibDecoder::new(compressed);
        let mut raw = Vec::new();
        dec.read_to_end(&mut raw).context("deflate decode")?;
        Ok(raw)
    }
}
