use crate::error::{MeasureError, Result};

/// Width in bytes of every serialized measure element.
pub const VALUE_WIDTH: usize = 8;

// ── Compressor IDs ─────────────────────────────────────────────────────────

pub const COMPRESSOR_PASSTHROUGH: u16 = 0;
pub const COMPRESSOR_ZSTD: u16 = 1;
pub const COMPRESSOR_LZ4: u16 = 2;
pub const COMPRESSOR_DEFLATE: u16 = 3;

// ── Element types ──────────────────────────────────────────────────────────

/// Physical type of the elements a measure chunk stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureDataType {
    Double,
    Long,
}

/// An element that can live in a [`MeasureStore`](crate::store::MeasureStore)
/// and be handed to a compressor.
///
/// Elements are serialized as `VALUE_WIDTH` little-endian bytes, both for the
/// compressor input and for the uncompressed bypass path.
pub trait MeasureValue: Copy + Send + Sync + 'static {
    const DATA_TYPE: MeasureDataType;

    fn write_le(self, out: &mut Vec<u8>);

    fn read_le(bytes: [u8; VALUE_WIDTH]) -> Self;
}

impl MeasureValue for f64 {
    const DATA_TYPE: MeasureDataType = MeasureDataType::Double;

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn read_le(bytes: [u8; VALUE_WIDTH]) -> Self {
        f64::from_le_bytes(bytes)
    }
}

impl MeasureValue for i64 {
    const DATA_TYPE: MeasureDataType = MeasureDataType::Long;

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    #[inline]
    fn read_le(bytes: [u8; VALUE_WIDTH]) -> Self {
        i64::from_le_bytes(bytes)
    }
}

/// Serialize `values` into their little-endian byte layout.
pub fn values_to_bytes<T: MeasureValue>(values: &[T]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * VALUE_WIDTH);
    for &v in values {
        v.write_le(&mut out);
    }
    out
}

/// Reinterpret a little-endian byte buffer as measure elements.
///
/// Fails if `bytes` is not a whole number of elements.
pub fn values_from_bytes<T: MeasureValue>(bytes: &[u8]) -> Result<Vec<T>> {
    if bytes.len() % VALUE_WIDTH != 0 {
        return Err(MeasureError::InvalidData(format!(
            "{} bytes is not a multiple of the {}-byte element width",
            bytes.len(),
            VALUE_WIDTH
        )));
    }
    Ok(bytes
        .chunks_exact(VALUE_WIDTH)
        .map(|chunk| {
            let mut buf = [0u8; VALUE_WIDTH];
            buf.copy_from_slice(chunk);
            T::read_le(buf)
        })
        .collect())
}

// ── Compression variants ───────────────────────────────────────────────────

/// Identifies which member of the value-compression family encoded a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionKind {
    /// Doubles stored as-is.
    Double,
    /// Doubles stored as `round((max - v) * 10^decimal_places)`.
    DoubleMaxMinScaled,
    /// 64-bit integers stored as-is.
    Long,
}

impl CompressionKind {
    /// Stable numeric id for this variant.
    pub fn id(self) -> u8 {
        match self {
            CompressionKind::Double => 0,
            CompressionKind::DoubleMaxMinScaled => 1,
            CompressionKind::Long => 2,
        }
    }

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(CompressionKind::Double),
            1 => Ok(CompressionKind::DoubleMaxMinScaled),
            2 => Ok(CompressionKind::Long),
            other => Err(MeasureError::InvalidMetadata(format!(
                "unknown compression kind id {}",
                other
            ))),
        }
    }

    /// Human-readable variant name, used in errors and logs.
    pub fn name(self) -> &'static str {
        match self {
            CompressionKind::Double => "double",
            CompressionKind::DoubleMaxMinScaled => "double max-min scaled",
            CompressionKind::Long => "long",
        }
    }

    pub fn data_type(self) -> MeasureDataType {
        match self {
            CompressionKind::Double | CompressionKind::DoubleMaxMinScaled => {
                MeasureDataType::Double
            }
            CompressionKind::Long => MeasureDataType::Long,
        }
    }
}

// ── Chunk metadata ─────────────────────────────────────────────────────────

/// Side-channel metadata needed to invert a chunk's transform on read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkMeta {
    pub kind: CompressionKind,
    /// Column maximum. Only meaningful for max-min variants.
    pub max_value: f64,
    /// Declared digits after the decimal point. Negative values are rejected
    /// on decode.
    pub decimal_places: i32,
    pub row_count: usize,
}

impl ChunkMeta {
    pub fn new(
        kind: CompressionKind,
        max_value: f64,
        decimal_places: i32,
        row_count: usize,
    ) -> Self {
        Self {
            kind,
            max_value,
            decimal_places,
            row_count,
        }
    }

    /// `10^decimal_places`, validated to be finite and positive.
    pub fn division_factor(&self) -> Result<f64> {
        division_factor(self.decimal_places)
    }
}

/// `10^decimal_places`, rejecting negative exponents and factors that
/// overflow `f64`.
pub fn division_factor(decimal_places: i32) -> Result<f64> {
    if decimal_places < 0 {
        return Err(MeasureError::InvalidMetadata(format!(
            "decimal places must be >= 0, got {}",
            decimal_places
        )));
    }
    let factor = 10f64.powi(decimal_places);
    if !factor.is_finite() {
        return Err(MeasureError::InvalidMetadata(format!(
            "decimal places {} overflows the division factor",
            decimal_places
        )));
    }
    Ok(factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_layout_is_little_endian() {
        let bytes = values_to_bytes(&[1.0f64]);
        assert_eq!(bytes, 1.0f64.to_le_bytes().to_vec());

        let longs: Vec<i64> = values_from_bytes(&values_to_bytes(&[-7i64, 42])).unwrap();
        assert_eq!(longs, vec![-7, 42]);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let err = values_from_bytes::<f64>(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, MeasureError::InvalidData(_)));
    }

    #[test]
    fn test_division_factor_bounds() {
        assert_eq!(division_factor(0).unwrap(), 1.0);
        assert_eq!(division_factor(2).unwrap(), 100.0);
        assert!(division_factor(-1).unwrap_err().is_corruption());
        assert!(division_factor(400).is_err());
    }

    #[test]
    fn test_kind_ids_are_stable() {
        for kind in [
            CompressionKind::Double,
            CompressionKind::DoubleMaxMinScaled,
            CompressionKind::Long,
        ] {
            assert_eq!(CompressionKind::from_id(kind.id()).unwrap(), kind);
        }
        assert!(CompressionKind::from_id(9).is_err());
        assert_eq!(CompressionKind::Long.data_type(), MeasureDataType::Long);
    }
}
