use mvc_core::codec::Compressor;
use mvc_core::format::COMPRESSOR_ZSTD;

/// Zstandard compressor.
///
/// Scaled max-min offsets are small integers stored as doubles, so their high
/// bytes repeat heavily and zstd does well on them.
pub struct ZstdCompressor {
    /// Compression level (1 = fast / larger, 22 = slow / smallest).
    pub level: i32,
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self { level: 3 }
    }
}

impl ZstdCompressor {
    pub fn new(level: i32) -> Self {
        Self { level }
    }
}

impl Compressor for ZstdCompressor {
    fn id(&self) -> u16 {
        COMPRESSOR_ZSTD
    }

    fn name(&self) -> &'static str {
        "zstd"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        let compressed = zstd::bulk::compress(raw, self.level)?;
        Ok(compressed)
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        // The frame header carries the content size, so no capacity hint is needed.
        let raw = zstd::decode_all(compressed)?;
        Ok(raw)
    }
}
