use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;

use crate::codec::{compress_values, decompress_values, Compressor};
use crate::compression::unsupported;
use crate::error::{MeasureError, Result};
use crate::format::{division_factor, values_from_bytes, ChunkMeta, CompressionKind};
use crate::store::MeasureStore;

const KIND: CompressionKind = CompressionKind::DoubleMaxMinScaled;

/// Forward transform of the max-min scaled variant.
///
/// Each value becomes `round((max_value - v) * 10^decimal_places)`. This runs
/// upstream of [`MaxMinScaledCodec::compress`], which compresses whatever it
/// is given; [`MaxMinScaledCodec::get_double_value`] applies the inverse.
pub fn scale_values(values: &[f64], max_value: f64, decimal_places: i32) -> Result<Vec<f64>> {
    let factor = division_factor(decimal_places)?;
    if !max_value.is_finite() {
        return Err(MeasureError::InvalidData(format!(
            "column maximum {} is not finite",
            max_value
        )));
    }
    values
        .iter()
        .enumerate()
        .map(|(row, &v)| {
            if !v.is_finite() {
                return Err(MeasureError::InvalidData(format!(
                    "row {} holds non-finite value {}",
                    row, v
                )));
            }
            let scaled = ((max_value - v) * factor).round();
            if !scaled.is_finite() {
                return Err(MeasureError::InvalidData(format!(
                    "row {}: offset of {} from maximum {} overflows at {} decimal places",
                    row, v, max_value, decimal_places
                )));
            }
            Ok(scaled)
        })
        .collect()
}

/// Exact decimal for the shortest representation that round-trips to `x`.
///
/// `None` when `x` is not finite or does not fit the decimal type.
fn shortest_decimal(x: f64) -> Option<Decimal> {
    if !x.is_finite() {
        return None;
    }
    Decimal::from_str(&x.to_string()).ok()
}

/// Nearest f64 to `value`, parsed from its exact decimal digits.
fn decimal_to_f64(value: Decimal) -> Option<f64> {
    value.to_string().parse().ok()
}

/// Double measure codec storing offsets from the column maximum, scaled by
/// `10^decimal_places`.
///
/// Write path: [`set_values`](Self::set_values) with already scaled offsets
/// (see [`scale_values`]), then [`compress`](Self::compress).
///
/// Read path: [`decompress`](Self::decompress) into a fresh instance, any
/// number of [`get_double_value`](Self::get_double_value) calls, then
/// [`free_memory`](Self::free_memory).
pub struct MaxMinScaledCodec {
    compressor: Arc<dyn Compressor>,
    values: Vec<f64>,
    store: MeasureStore<f64>,
    max_value: f64,
    /// `max_value` as a decimal, `None` when it is outside the decimal range.
    max_decimal: Option<Decimal>,
    division_factor: f64,
}

impl MaxMinScaledCodec {
    pub fn new(compressor: Arc<dyn Compressor>) -> Self {
        Self {
            compressor,
            values: Vec::new(),
            store: MeasureStore::default(),
            max_value: 0.0,
            max_decimal: Some(Decimal::ZERO),
            division_factor: 1.0,
        }
    }

    pub fn set_values(&mut self, values: Vec<f64>) {
        self.values = values;
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Compress the stored offsets with the generic compressor.
    pub fn compress(&self) -> Result<Vec<u8>> {
        compress_values(self.compressor.as_ref(), &self.values)
    }

    /// Take uncompressed little-endian doubles as the write-path values.
    pub fn set_value_in_bytes(&mut self, raw: &[u8]) -> Result<()> {
        self.values = values_from_bytes(raw)?;
        Ok(())
    }

    /// Decompress `compressed[offset..offset + length]` into a new store and
    /// record the metadata needed by [`get_double_value`](Self::get_double_value).
    pub fn decompress(
        &mut self,
        compressed: &[u8],
        offset: usize,
        length: usize,
        meta: &ChunkMeta,
    ) -> Result<()> {
        // Reject bad metadata before paying for decompression.
        meta.division_factor()?;
        let data = decompress_values::<f64>(
            self.compressor.as_ref(),
            compressed,
            offset,
            length,
            meta.row_count,
        )?;
        self.set_decoded(data, meta)
    }

    /// Populate the store from already decompressed offsets.
    pub fn set_decoded(&mut self, data: Vec<f64>, meta: &ChunkMeta) -> Result<()> {
        let factor = meta.division_factor()?;
        let mut store = MeasureStore::<f64>::with_rows(meta.row_count);
        store.put_data(data)?;

        self.store = store;
        self.max_value = meta.max_value;
        self.max_decimal = shortest_decimal(meta.max_value);
        self.division_factor = factor;

        if self.max_decimal.is_none() {
            debug!(
                max_value = meta.max_value,
                "column maximum outside decimal range, reads use f64 subtraction"
            );
        }
        debug!(
            rows = meta.row_count,
            max_value = meta.max_value,
            decimal_places = meta.decimal_places,
            "decoded max-min scaled chunk"
        );
        Ok(())
    }

    /// Original value at `index`: `max_value - stored / division_factor`.
    ///
    /// Both operands are taken at their shortest decimal form and subtracted
    /// exactly, so no binary rounding error beyond the declared decimal places
    /// is introduced. The result is the f64 nearest to the exact difference.
    ///
    /// # Panics
    /// If `index` is out of range or the store has been freed.
    pub fn get_double_value(&self, index: usize) -> f64 {
        let diff = self.store.get(index) / self.division_factor;
        self.max_decimal
            .zip(shortest_decimal(diff))
            .and_then(|(max, diff)| max.checked_sub(diff))
            .and_then(decimal_to_f64)
            .unwrap_or(self.max_value - diff)
    }

    pub fn get_long_value(&self, _index: usize) -> Result<i64> {
        Err(unsupported(KIND, "long value"))
    }

    pub fn get_big_decimal_value(&self, _index: usize) -> Result<Decimal> {
        Err(unsupported(KIND, "big decimal value"))
    }

    /// Release the decoded store.
    pub fn free_memory(&mut self) {
        self.store.free_memory();
    }

    /// Rows in the decoded store.
    pub fn row_count(&self) -> usize {
        self.store.len()
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn division_factor(&self) -> f64 {
        self.division_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::values_to_bytes;

    struct Identity;

    impl Compressor for Identity {
        fn id(&self) -> u16 {
            0
        }

        fn name(&self) -> &'static str {
            "identity"
        }

        fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>> {
            Ok(raw.to_vec())
        }

        fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>> {
            Ok(compressed.to_vec())
        }
    }

    fn meta(max_value: f64, decimal_places: i32, row_count: usize) -> ChunkMeta {
        ChunkMeta::new(KIND, max_value, decimal_places, row_count)
    }

    #[test]
    fn test_scale_values_example() {
        let scaled = scale_values(&[1.0, 2.5, 3.25], 3.25, 2).unwrap();
        assert_eq!(scaled, vec![225.0, 75.0, 0.0]);
    }

    #[test]
    fn test_scale_values_rejects_non_finite() {
        assert!(scale_values(&[1.0, f64::NAN], 3.0, 1).is_err());
        assert!(scale_values(&[1.0], f64::INFINITY, 1).is_err());
        assert!(scale_values(&[1.0], 3.0, -2).is_err());
    }

    #[test]
    fn test_inverse_uses_decimal_subtraction() {
        let mut codec = MaxMinScaledCodec::new(Arc::new(Identity));
        codec.set_decoded(vec![1.0], &meta(0.3, 1, 1)).unwrap();
        // 0.3 - 0.1 in f64 is 0.19999999999999998
        assert_eq!(codec.get_double_value(0), 0.2);
    }

    #[test]
    fn test_scale_values_rejects_overflowing_offset() {
        let err = scale_values(&[-1e308, 1e308], 1e308, 0).unwrap_err();
        assert!(matches!(err, MeasureError::InvalidData(_)), "got {err}");

        let err = scale_values(&[1e10, 2e10], 2e10, 300).unwrap_err();
        assert!(matches!(err, MeasureError::InvalidData(_)), "got {err}");
    }

    #[test]
    fn test_inverse_uses_shortest_decimal_operands() {
        let mut codec = MaxMinScaledCodec::new(Arc::new(Identity));
        codec
            .set_decoded(vec![608_939_741.0], &meta(4259937.98, 2, 1))
            .unwrap();
        assert_eq!(codec.get_double_value(0), -1829459.43);
    }

    #[test]
    fn test_inverse_falls_back_outside_decimal_range() {
        let mut codec = MaxMinScaledCodec::new(Arc::new(Identity));
        codec.set_decoded(vec![0.0, 1.0], &meta(1e300, 0, 2)).unwrap();
        assert_eq!(codec.get_double_value(0), 1e300);
        assert_eq!(codec.get_double_value(1), 1e300 - 1.0);
    }

    #[test]
    fn test_decompress_from_slice_range() {
        let mut payload = vec![0xAA; 4];
        payload.extend(values_to_bytes(&[225.0f64, 75.0, 0.0]));

        let mut codec = MaxMinScaledCodec::new(Arc::new(Identity));
        codec
            .decompress(&payload, 4, payload.len() - 4, &meta(3.25, 2, 3))
            .unwrap();
        assert_eq!(codec.row_count(), 3);
        assert_eq!(codec.get_double_value(0), 1.0);
        assert_eq!(codec.get_double_value(1), 2.5);
        assert_eq!(codec.get_double_value(2), 3.25);
    }

    #[test]
    fn test_decompress_range_out_of_bounds() {
        let payload = values_to_bytes(&[1.0f64]);
        let mut codec = MaxMinScaledCodec::new(Arc::new(Identity));
        let err = codec.decompress(&payload, 4, 8, &meta(1.0, 0, 1)).unwrap_err();
        assert!(err.is_corruption());
    }

    #[test]
    fn test_set_value_in_bytes_bypass() {
        let mut codec = MaxMinScaledCodec::new(Arc::new(Identity));
        codec
            .set_value_in_bytes(&values_to_bytes(&[3.0f64, 4.5]))
            .unwrap();
        assert_eq!(codec.values(), &[3.0, 4.5]);
        assert!(codec.set_value_in_bytes(&[1, 2, 3]).is_err());
    }
}
