use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use mvc_core::codec::Compressor;
use mvc_core::format::COMPRESSOR_LZ4;

/// LZ4 block compressor.
///
/// The raw length is prepended to each block, so decompression allocates the
/// output exactly once. Fastest decode of the bundled compressors; best for
/// hot chunks that are evicted and re-read often.
pub struct Lz4Compressor;

impl Compressor for Lz4Compressor {
    fn id(&self) -> u16 {
        COMPRESSOR_LZ4
    }

    fn name(&self) -> &'static str {
        "lz4"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(compress_prepend_size(raw))
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        let raw = decompress_size_prepended(compressed)
            .map_err(|e| anyhow::anyhow!("lz4 decompress error: {}", e))?;
        Ok(raw)
    }
}
