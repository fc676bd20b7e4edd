pub mod codec;
pub mod compression;
pub mod error;
pub mod format;
pub mod reader;
pub mod store;
pub mod writer;

pub use codec::{compress_values, decompress_values, Compressor};
pub use compression::{
    scale_values, DoubleCodec, LongCodec, MaxMinScaledCodec, ValueCompression,
};
pub use error::{MeasureError, Result};
pub use format::{ChunkMeta, CompressionKind, MeasureDataType, MeasureValue};
pub use reader::MeasureReader;
pub use store::MeasureStore;
pub use writer::{ColumnStats, EncodedChunk, MeasureWriter};
pub use rust_decimal::Decimal;
