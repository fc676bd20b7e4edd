use std::sync::Arc;

use tracing::{debug, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::codec::Compressor;
use crate::compression::{scale_values, unsupported, DoubleCodec, MaxMinScaledCodec};
use crate::error::{MeasureError, Result};
use crate::format::{division_factor, ChunkMeta, CompressionKind, VALUE_WIDTH};

/// Running statistics gathered while a column is written.
#[derive(Debug, Clone, Copy)]
pub struct ColumnStats {
    pub row_count: usize,
    /// Largest value seen; `NEG_INFINITY` while empty. NaN is ignored.
    pub max: f64,
    /// Smallest value seen; `INFINITY` while empty. NaN is ignored.
    pub min: f64,
}

impl Default for ColumnStats {
    fn default() -> Self {
        Self {
            row_count: 0,
            max: f64::NEG_INFINITY,
            min: f64::INFINITY,
        }
    }
}

impl ColumnStats {
    pub fn update(&mut self, value: f64) {
        self.row_count += 1;
        self.max = self.max.max(value);
        self.min = self.min.min(value);
    }

    /// Maximum recorded in chunk metadata. An empty column reports `0.0`.
    pub fn max_value(&self) -> f64 {
        if self.row_count == 0 {
            0.0
        } else {
            self.max
        }
    }
}

/// A compressed chunk plus the metadata required to read it back.
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    pub payload: Vec<u8>,
    pub meta: ChunkMeta,
    /// [`Compressor::id`] of the compressor that produced `payload`.
    pub compressor_id: u16,
    /// xxhash3-64 of `payload`.
    pub checksum: u64,
}

impl EncodedChunk {
    /// Wrap a compressed payload, computing its checksum.
    pub fn new(payload: Vec<u8>, meta: ChunkMeta, compressor_id: u16) -> Self {
        let checksum = xxh3_64(&payload);
        Self {
            payload,
            meta,
            compressor_id,
            checksum,
        }
    }

    /// Check the payload against the stored checksum.
    pub fn verify(&self) -> Result<()> {
        let actual = xxh3_64(&self.payload);
        if actual != self.checksum {
            warn!(
                expected = self.checksum,
                actual, "measure chunk checksum mismatch"
            );
            return Err(MeasureError::ChecksumMismatch {
                expected: self.checksum,
                actual,
            });
        }
        Ok(())
    }

    /// Size of the uncompressed element array in bytes.
    pub fn raw_size(&self) -> u64 {
        (self.meta.row_count as u64).saturating_mul(VALUE_WIDTH as u64)
    }

    pub fn compressed_size(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Compression ratio (raw / compressed).
    pub fn ratio(&self) -> f64 {
        let compressed = self.compressed_size();
        if compressed == 0 {
            return 1.0;
        }
        self.raw_size() as f64 / compressed as f64
    }
}

/// Accumulates one double measure column and seals it into an [`EncodedChunk`].
///
/// # Write contract
/// Call [`write`](Self::write) or [`extend`](Self::extend) any number of times,
/// then [`finish`](Self::finish). The writer keeps the column maximum while
/// values arrive; for [`CompressionKind::DoubleMaxMinScaled`] it applies
/// [`scale_values`] at `finish` and hands the scaled offsets to the codec.
pub struct MeasureWriter {
    compressor: Arc<dyn Compressor>,
    kind: CompressionKind,
    decimal_places: i32,
    pending: Vec<f64>,
    stats: ColumnStats,
}

impl MeasureWriter {
    /// Start a double column encoded with `kind`.
    ///
    /// Only double variants are accepted. `decimal_places` is validated here
    /// so that a bad declaration fails before any values are buffered.
    pub fn create(
        compressor: Arc<dyn Compressor>,
        kind: CompressionKind,
        decimal_places: i32,
    ) -> Result<Self> {
        if kind == CompressionKind::Long {
            return Err(unsupported(kind, "double column writer"));
        }
        division_factor(decimal_places)?;
        Ok(Self {
            compressor,
            kind,
            decimal_places,
            pending: Vec::new(),
            stats: ColumnStats::default(),
        })
    }

    pub fn write(&mut self, value: f64) {
        self.pending.push(value);
        self.stats.update(value);
    }

    pub fn extend(&mut self, values: &[f64]) {
        self.pending.reserve(values.len());
        for &v in values {
            self.write(v);
        }
    }

    pub fn stats(&self) -> &ColumnStats {
        &self.stats
    }

    /// Transform and compress the buffered values.
    pub fn finish(self) -> Result<EncodedChunk> {
        let MeasureWriter {
            compressor,
            kind,
            decimal_places,
            pending,
            stats,
        } = self;

        let max_value = stats.max_value();
        let row_count = pending.len();
        let compressor_id = compressor.id();

        let payload = match kind {
            CompressionKind::DoubleMaxMinScaled => {
                let mut codec = MaxMinScaledCodec::new(compressor);
                codec.set_values(scale_values(&pending, max_value, decimal_places)?);
                codec.compress()?
            }
            _ => {
                let mut codec = DoubleCodec::new(compressor);
                codec.set_values(pending);
                codec.compress()?
            }
        };

        let chunk = EncodedChunk::new(
            payload,
            ChunkMeta::new(kind, max_value, decimal_places, row_count),
            compressor_id,
        );
        debug!(
            kind = kind.name(),
            kind_id = kind.id(),
            compressor_id,
            rows = row_count,
            max_value,
            min_value = stats.min,
            compressed_bytes = chunk.payload.len(),
            "sealed measure chunk"
        );
        Ok(chunk)
    }
}
