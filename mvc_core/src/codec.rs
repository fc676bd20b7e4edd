use tracing::debug;

use crate::error::{MeasureError, Result};
use crate::format::{values_from_bytes, values_to_bytes, MeasureValue, VALUE_WIDTH};

/// Generic byte compression capability.
///
/// Each `Compressor` implementation:
/// - Is identified by a stable numeric `id()`.
/// - Is stateless per call: `compress` and `decompress` never depend on earlier
///   calls, so one instance may be shared across chunks and threads.
/// - Knows nothing about the values it carries. Measure codecs serialize their
///   elements to bytes before handing them over.
pub trait Compressor: Send + Sync {
    /// Stable compressor ID.
    fn id(&self) -> u16;

    /// Human-readable compressor name for CLI display and logs.
    fn name(&self) -> &'static str;

    /// Compress one independent buffer.
    fn compress(&self, raw: &[u8]) -> anyhow::Result<Vec<u8>>;

    /// Decompress a buffer produced by [`Compressor::compress`].
    fn decompress(&self, compressed: &[u8]) -> anyhow::Result<Vec<u8>>;
}

/// Serialize `values` and compress them with `compressor`.
pub fn compress_values<T: MeasureValue>(
    compressor: &dyn Compressor,
    values: &[T],
) -> Result<Vec<u8>> {
    let raw = values_to_bytes(values);
    let compressed = compressor
        .compress(&raw)
        .map_err(|cause| MeasureError::Compressor {
            compressor: compressor.name(),
            cause,
        })?;
    debug!(
        compressor = compressor.name(),
        data_type = ?T::DATA_TYPE,
        rows = values.len(),
        raw_bytes = raw.len(),
        compressed_bytes = compressed.len(),
        "compressed measure values"
    );
    Ok(compressed)
}

/// Decompress `compressed[offset..offset + length]` into exactly `row_count`
/// elements.
///
/// A range outside the buffer or an element count different from `row_count`
/// is reported as invalid metadata; the result is never truncated or padded.
pub fn decompress_values<T: MeasureValue>(
    compressor: &dyn Compressor,
    compressed: &[u8],
    offset: usize,
    length: usize,
    row_count: usize,
) -> Result<Vec<T>> {
    let end = offset
        .checked_add(length)
        .filter(|&end| end <= compressed.len())
        .ok_or_else(|| {
            MeasureError::InvalidMetadata(format!(
                "payload range {}+{} is outside the {}-byte buffer",
                offset,
                length,
                compressed.len()
            ))
        })?;

    let raw = compressor
        .decompress(&compressed[offset..end])
        .map_err(|cause| MeasureError::Compressor {
            compressor: compressor.name(),
            cause,
        })?;

    if row_count.checked_mul(VALUE_WIDTH) != Some(raw.len()) {
        return Err(MeasureError::InvalidMetadata(format!(
            "row count {} does not match decompressed length of {} bytes",
            row_count,
            raw.len()
        )));
    }

    debug!(
        compressor = compressor.name(),
        rows = row_count,
        compressed_bytes = length,
        "decompressed measure values"
    );
    values_from_bytes(&raw)
}
