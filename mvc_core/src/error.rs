//! Error types for measure value compression.

use thiserror::Error;

/// Result type alias for measure codec operations.
pub type Result<T> = std::result::Result<T, MeasureError>;

/// Errors raised while encoding or decoding a measure chunk.
#[derive(Error, Debug)]
pub enum MeasureError {
    /// The operation is not defined for this compression variant.
    #[error("{operation} is not defined for {variant}")]
    Unsupported {
        operation: &'static str,
        variant: &'static str,
    },

    /// Chunk metadata is inconsistent with the payload it describes.
    #[error("invalid metadata: {0}")]
    InvalidMetadata(String),

    /// Input values or raw bytes cannot be interpreted.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Row index past the end of a chunk.
    #[error("row {index} out of range (total {row_count})")]
    RowOutOfRange { index: usize, row_count: usize },

    /// The chunk's decoded memory was released before the read.
    #[error("chunk memory has been released")]
    Released,

    /// Payload checksum mismatch.
    #[error("checksum mismatch: expected {expected:016x}, got {actual:016x}")]
    ChecksumMismatch { expected: u64, actual: u64 },

    /// The underlying byte compressor failed.
    #[error("{compressor} compressor failed: {cause:#}")]
    Compressor {
        compressor: &'static str,
        cause: anyhow::Error,
    },
}

impl MeasureError {
    /// True when the caller selected the wrong variant for the operation.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, MeasureError::Unsupported { .. })
    }

    /// True when the chunk itself is damaged and should not be read further.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            MeasureError::InvalidMetadata(_) | MeasureError::ChecksumMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let unsupported = MeasureError::Unsupported {
            operation: "long value",
            variant: "double max-min scaled",
        };
        assert!(unsupported.is_unsupported());
        assert!(!unsupported.is_corruption());
        assert_eq!(
            unsupported.to_string(),
            "long value is not defined for double max-min scaled"
        );

        let mismatch = MeasureError::ChecksumMismatch {
            expected: 1,
            actual: 2,
        };
        assert!(mismatch.is_corruption());
        assert!(MeasureError::InvalidMetadata("rows".into()).is_corruption());
        assert!(!MeasureError::InvalidData("bytes".into()).is_corruption());
    }

    #[test]
    fn test_compressor_error_message_includes_cause() {
        let err = MeasureError::Compressor {
            compressor: "zstd",
            cause: anyhow::anyhow!("frame truncated"),
        };
        assert_eq!(err.to_string(), "zstd compressor failed: frame truncated");
    }
}
