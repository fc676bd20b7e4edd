//! The value-compression family.
//!
//! Every variant transforms measure values differently before and after the
//! generic byte compressor runs, but all of them expose the same operation set.
//! [`ValueCompression`] is the closed set of variants the column reader
//! dispatches over without knowing which one backs a given chunk. Choosing the
//! variant for a column is the caller's concern.

mod double;
mod long;
mod max_min_scaled;

pub use double::DoubleCodec;
pub use long::LongCodec;
pub use max_min_scaled::{scale_values, MaxMinScaledCodec};

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::codec::Compressor;
use crate::error::{MeasureError, Result};
use crate::format::{ChunkMeta, CompressionKind};

pub(crate) fn unsupported(kind: CompressionKind, operation: &'static str) -> MeasureError {
    MeasureError::Unsupported {
        operation,
        variant: kind.name(),
    }
}

/// One measure chunk's codec, whichever variant it is.
pub enum ValueCompression {
    Double(DoubleCodec),
    DoubleMaxMinScaled(MaxMinScaledCodec),
    Long(LongCodec),
}

impl ValueCompression {
    /// Fresh, empty codec of the given variant.
    pub fn new(kind: CompressionKind, compressor: Arc<dyn Compressor>) -> Self {
        match kind {
            CompressionKind::Double => ValueCompression::Double(DoubleCodec::new(compressor)),
            CompressionKind::DoubleMaxMinScaled => {
                ValueCompression::DoubleMaxMinScaled(MaxMinScaledCodec::new(compressor))
            }
            CompressionKind::Long => ValueCompression::Long(LongCodec::new(compressor)),
        }
    }

    pub fn kind(&self) -> CompressionKind {
        match self {
            ValueCompression::Double(_) => CompressionKind::Double,
            ValueCompression::DoubleMaxMinScaled(_) => CompressionKind::DoubleMaxMinScaled,
            ValueCompression::Long(_) => CompressionKind::Long,
        }
    }

    pub fn compress(&self) -> Result<Vec<u8>> {
        match self {
            ValueCompression::Double(c) => c.compress(),
            ValueCompression::DoubleMaxMinScaled(c) => c.compress(),
            ValueCompression::Long(c) => c.compress(),
        }
    }

    pub fn set_value_in_bytes(&mut self, raw: &[u8]) -> Result<()> {
        match self {
            ValueCompression::Double(c) => c.set_value_in_bytes(raw),
            ValueCompression::DoubleMaxMinScaled(c) => c.set_value_in_bytes(raw),
            ValueCompression::Long(c) => c.set_value_in_bytes(raw),
        }
    }

    /// Decode `compressed[offset..offset + length]`.
    ///
    /// `meta.kind` must name this variant.
    pub fn decompress(
        &mut self,
        compressed: &[u8],
        offset: usize,
        length: usize,
        meta: &ChunkMeta,
    ) -> Result<()> {
        if meta.kind != self.kind() {
            return Err(MeasureError::InvalidMetadata(format!(
                "chunk was encoded as {} but is being decoded as {}",
                meta.kind.name(),
                self.kind().name()
            )));
        }
        match self {
            ValueCompression::Double(c) => c.decompress(compressed, offset, length, meta),
            ValueCompression::DoubleMaxMinScaled(c) => {
                c.decompress(compressed, offset, length, meta)
            }
            ValueCompression::Long(c) => c.decompress(compressed, offset, length, meta),
        }
    }

    pub fn get_double_value(&self, index: usize) -> Result<f64> {
        match self {
            ValueCompression::Double(c) => Ok(c.get_double_value(index)),
            ValueCompression::DoubleMaxMinScaled(c) => Ok(c.get_double_value(index)),
            ValueCompression::Long(c) => Ok(c.get_double_value(index)),
        }
    }

    pub fn get_long_value(&self, index: usize) -> Result<i64> {
        match self {
            ValueCompression::Double(c) => c.get_long_value(index),
            ValueCompression::DoubleMaxMinScaled(c) => c.get_long_value(index),
            ValueCompression::Long(c) => Ok(c.get_long_value(index)),
        }
    }

    pub fn get_big_decimal_value(&self, index: usize) -> Result<Decimal> {
        match self {
            ValueCompression::Double(c) => c.get_big_decimal_value(index),
            ValueCompression::DoubleMaxMinScaled(c) => c.get_big_decimal_value(index),
            ValueCompression::Long(c) => Ok(c.get_big_decimal_value(index)),
        }
    }

    /// Rows in the decoded store.
    pub fn row_count(&self) -> usize {
        match self {
            ValueCompression::Double(c) => c.row_count(),
            ValueCompression::DoubleMaxMinScaled(c) => c.row_count(),
            ValueCompression::Long(c) => c.row_count(),
        }
    }

    pub fn free_memory(&mut self) {
        match self {
            ValueCompression::Double(c) => c.free_memory(),
            ValueCompression::DoubleMaxMinScaled(c) => c.free_memory(),
            ValueCompression::Long(c) => c.free_memory(),
        }
    }
}
