use mvc_core::codec::Compressor;
use mvc_core::format::COMPRESSOR_PASSTHROUGH;

/// No-op compressor: payloads are the raw little-endian element bytes.
///
/// Useful for checking a codec's value transform independently of any
/// compression algorithm.
pub struct PassThroughCompressor;

impl Compressor for PassThroughCompressor {
    fn id(&self) -> u16 {
        COMPRESSOR_PASSTHROUGH
    }

    fn name(&self) -> &'static str {
        "passthrough"
    }

    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(raw.to_vec())
    }

    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
        Ok(compressed.to_vec())
    }
}
