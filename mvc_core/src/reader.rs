use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::trace;

use crate::codec::Compressor;
use crate::compression::ValueCompression;
use crate::error::{MeasureError, Result};
use crate::format::CompressionKind;
use crate::writer::EncodedChunk;

/// Random-access reader over one decoded measure chunk.
///
/// # Open sequence
/// 1. Check that the supplied compressor is the one recorded in the chunk.
/// 2. Verify the payload checksum.
/// 3. Build the variant named by `meta.kind` and decompress the whole payload
///    into its store.
///
/// Unlike the codecs underneath, the reader guards every access: an index past
/// the end or a read after [`free_memory`](Self::free_memory) is returned as an
/// error instead of panicking.
pub struct MeasureReader {
    codec: ValueCompression,
    freed: bool,
}

impl MeasureReader {
    /// Decode `chunk` with `compressor`, which must be the one that produced it.
    pub fn open(chunk: &EncodedChunk, compressor: Arc<dyn Compressor>) -> Result<Self> {
        if compressor.id() != chunk.compressor_id {
            return Err(MeasureError::InvalidMetadata(format!(
                "chunk was written by compressor id {}, got {} (id {})",
                chunk.compressor_id,
                compressor.name(),
                compressor.id()
            )));
        }
        chunk.verify()?;
        let mut codec = ValueCompression::new(chunk.meta.kind, compressor);
        codec.decompress(&chunk.payload, 0, chunk.payload.len(), &chunk.meta)?;
        Ok(Self {
            codec,
            freed: false,
        })
    }

    pub fn kind(&self) -> CompressionKind {
        self.codec.kind()
    }

    /// Total number of rows in the chunk.
    #[inline]
    pub fn row_count(&self) -> usize {
        self.codec.row_count()
    }

    fn check(&self, index: usize) -> Result<()> {
        if self.freed {
            return Err(MeasureError::Released);
        }
        if index >= self.row_count() {
            return Err(MeasureError::RowOutOfRange {
                index,
                row_count: self.row_count(),
            });
        }
        Ok(())
    }

    pub fn get_double(&self, index: usize) -> Result<f64> {
        self.check(index)?;
        self.codec.get_double_value(index)
    }

    pub fn get_long(&self, index: usize) -> Result<i64> {
        self.check(index)?;
        self.codec.get_long_value(index)
    }

    pub fn get_big_decimal(&self, index: usize) -> Result<Decimal> {
        self.check(index)?;
        self.codec.get_big_decimal_value(index)
    }

    /// Return up to `len` doubles starting at row `start`.
    ///
    /// The range is clamped to the end of the chunk; a `start` at or beyond the
    /// end is an error unless `len` is zero.
    pub fn read_range(&self, start: usize, len: usize) -> Result<Vec<f64>> {
        if len == 0 {
            return Ok(Vec::new());
        }
        self.check(start)?;

        let end = start.saturating_add(len).min(self.row_count());
        (start..end)
            .map(|i| self.codec.get_double_value(i))
            .collect()
    }

    /// Release the decoded values. Later reads fail with
    /// [`MeasureError::Released`].
    pub fn free_memory(&mut self) {
        if !self.freed {
            trace!(rows = self.row_count(), "freeing measure reader");
        }
        self.codec.free_memory();
        self.freed = true;
    }

    pub fn is_freed(&self) -> bool {
        self.freed
    }
}
