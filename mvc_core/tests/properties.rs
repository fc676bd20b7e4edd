use std::sync::Arc;

use mvc_compressors::{PassThroughCompressor, ZstdCompressor};
use mvc_core::{scale_values, ChunkMeta, CompressionKind, Compressor, MaxMinScaledCodec};
use proptest::prelude::*;

fn decode(
    compressor: Arc<dyn Compressor>,
    values: &[f64],
    max_value: f64,
    decimal_places: i32,
) -> MaxMinScaledCodec {
    let mut writer = MaxMinScaledCodec::new(compressor.clone());
    writer.set_values(scale_values(values, max_value, decimal_places).unwrap());
    let payload = writer.compress().unwrap();

    let meta = ChunkMeta::new(
        CompressionKind::DoubleMaxMinScaled,
        max_value,
        decimal_places,
        values.len(),
    );
    let mut reader = MaxMinScaledCodec::new(compressor);
    reader.decompress(&payload, 0, payload.len(), &meta).unwrap();
    reader
}

/// Nearest f64 to `units * 10^-decimal_places`, via a correctly rounded parse.
fn from_units(units: i64, decimal_places: i32) -> f64 {
    format!("{}e-{}", units, decimal_places).parse().unwrap()
}

proptest! {
    #[test]
    fn prop_roundtrip_within_declared_precision(
        values in prop::collection::vec(-1.0e6f64..1.0e6, 0..200),
        headroom in 0.0f64..100.0,
        decimal_places in 0i32..=6,
    ) {
        let max_value = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max).max(0.0) + headroom;
        let codec = decode(Arc::new(ZstdCompressor::default()), &values, max_value, decimal_places);

        let tolerance = 10f64.powi(-decimal_places) + 1e-9;
        prop_assert_eq!(codec.row_count(), values.len());
        for (i, &v) in values.iter().enumerate() {
            let got = codec.get_double_value(i);
            prop_assert!((got - v).abs() <= tolerance, "row {}: {} vs {}", i, got, v);
        }
    }

    #[test]
    fn prop_reads_are_idempotent(
        values in prop::collection::vec(-1.0e4f64..1.0e4, 1..100),
        decimal_places in 0i32..=4,
    ) {
        let max_value = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let codec = decode(Arc::new(PassThroughCompressor), &values, max_value, decimal_places);
        for i in 0..values.len() {
            prop_assert_eq!(codec.get_double_value(i).to_bits(), codec.get_double_value(i).to_bits());
        }
    }

    #[test]
    fn prop_inverse_matches_exact_decimal_difference(
        max_units in 0i64..1_000_000_000_000,
        stored in 0i64..1_000_000_000_000,
        decimal_places in 0i32..=8,
    ) {
        // Both operands have at most 13 significant digits, so their shortest
        // representations are exactly `units / 10^dp`.
        let max_value = from_units(max_units, decimal_places);
        let meta = ChunkMeta::new(CompressionKind::DoubleMaxMinScaled, max_value, decimal_places, 1);
        let mut codec = MaxMinScaledCodec::new(Arc::new(PassThroughCompressor));
        codec.set_decoded(vec![stored as f64], &meta).unwrap();

        let want = from_units(max_units - stored, decimal_places);
        prop_assert_eq!(codec.get_double_value(0), want);
    }
}
