use std::sync::Arc;

use rust_decimal::Decimal;

use crate::codec::{compress_values, decompress_values, Compressor};
use crate::error::Result;
use crate::format::{values_from_bytes, ChunkMeta};
use crate::store::MeasureStore;

/// Integer measure codec with no value transform.
///
/// Every getter is defined: doubles are widened and big decimals are exact.
pub struct LongCodec {
    compressor: Arc<dyn Compressor>,
    values: Vec<i64>,
    store: MeasureStore<i64>,
}

impl LongCodec {
    pub fn new(compressor: Arc<dyn Compressor>) -> Self {
        Self {
            compressor,
            values: Vec::new(),
            store: MeasureStore::default(),
        }
    }

    pub fn set_values(&mut self, values: Vec<i64>) {
        self.values = values;
    }

    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn compress(&self) -> Result<Vec<u8>> {
        compress_values(self.compressor.as_ref(), &self.values)
    }

    pub fn set_value_in_bytes(&mut self, raw: &[u8]) -> Result<()> {
        self.values = values_from_bytes(raw)?;
        Ok(())
    }

    pub fn decompress(
        &mut self,
        compressed: &[u8],
        offset: usize,
        length: usize,
        meta: &ChunkMeta,
    ) -> Result<()> {
        let data = decompress_values::<i64>(
            self.compressor.as_ref(),
            compressed,
            offset,
            length,
            meta.row_count,
        )?;
        let mut store = MeasureStore::<i64>::with_rows(meta.row_count);
        store.put_data(data)?;
        self.store = store;
        Ok(())
    }

    #[inline]
    pub fn get_long_value(&self, index: usize) -> i64 {
        self.store.get(index)
    }

    pub fn get_double_value(&self, index: usize) -> f64 {
        self.store.get(index) as f64
    }

    pub fn get_big_decimal_value(&self, index: usize) -> Decimal {
        Decimal::from(self.store.get(index))
    }

    pub fn free_memory(&mut self) {
        self.store.free_memory();
    }

    pub fn row_count(&self) -> usize {
        self.store.len()
    }
}
