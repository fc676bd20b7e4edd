use std::sync::Arc;

use rust_decimal::Decimal;

use crate::codec::{compress_values, decompress_values, Compressor};
use crate::compression::unsupported;
use crate::error::Result;
use crate::format::{values_from_bytes, ChunkMeta, CompressionKind};
use crate::store::MeasureStore;

const KIND: CompressionKind = CompressionKind::Double;

/// Double measure codec with no value transform.
pub struct DoubleCodec {
    compressor: Arc<dyn Compressor>,
    values: Vec<f64>,
    store: MeasureStore<f64>,
}

impl DoubleCodec {
    pub fn new(compressor: Arc<dyn Compressor>) -> Self {
        Self {
            compressor,
            values: Vec::new(),
            store: MeasureStore::default(),
        }
    }

    pub fn set_values(&mut self, values: Vec<f64>) {
        self.values = values;
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn compress(&self) -> Result<Vec<u8>> {
        compress_values(self.compressor.as_ref(), &self.values)
    }

    pub fn set_value_in_bytes(&mut self, raw: &[u8]) -> Result<()> {
        self.values = values_from_bytes(raw)?;
        Ok(())
    }

    /// `max_value` and `decimal_places` are not used by this variant.
    pub fn decompress(
        &mut self,
        compressed: &[u8],
        offset: usize,
        length: usize,
        meta: &ChunkMeta,
    ) -> Result<()> {
        let data = decompress_values::<f64>(
            self.compressor.as_ref(),
            compressed,
            offset,
            length,
            meta.row_count,
        )?;
        let mut store = MeasureStore::<f64>::with_rows(meta.row_count);
        store.put_data(data)?;
        self.store = store;
        Ok(())
    }

    #[inline]
    pub fn get_double_value(&self, index: usize) -> f64 {
        self.store.get(index)
    }

    pub fn get_long_value(&self, _index: usize) -> Result<i64> {
        Err(unsupported(KIND, "long value"))
    }

    pub fn get_big_decimal_value(&self, _index: usize) -> Result<Decimal> {
        Err(unsupported(KIND, "big decimal value"))
    }

    pub fn free_memory(&mut self) {
        self.store.free_memory();
    }

    pub fn row_count(&self) -> usize {
        self.store.len()
    }
}
