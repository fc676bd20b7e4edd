mod deflate_compressor;
mod lz4_compressor;
mod passthrough;
mod zstd_compressor;

pub use deflate_compressor::DeflateCompressor;
pub use lz4_compressor::Lz4Compressor;
pub use passthrough::PassThroughCompressor;
pub use zstd_compressor::ZstdCompressor;

use mvc_core::format::{
    COMPRESSOR_DEFLATE, COMPRESSOR_LZ4, COMPRESSOR_PASSTHROUGH, COMPRESSOR_ZSTD,
};
use mvc_core::Compressor;
use std::sync::Arc;

/// Resolve a compressor from its numeric id, with default settings.
pub fn compressor_by_id(id: u16) -> anyhow::Result<Arc<dyn Compressor>> {
    match id {
        COMPRESSOR_PASSTHROUGH => Ok(Arc::new(PassThroughCompressor)),
        COMPRESSOR_ZSTD => Ok(Arc::new(ZstdCompressor::default())),
        COMPRESSOR_LZ4 => Ok(Arc::new(Lz4Compressor)),
        COMPRESSOR_DEFLATE => Ok(Arc::new(DeflateCompressor::default())),
        _ => anyhow::bail!(
            "unknown compressor id {}; supported: 0 (passthrough), 1 (zstd), 2 (lz4), 3 (deflate)",
            id
        ),
    }
}
