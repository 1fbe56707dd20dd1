//! Error types for bboxparse.

use thiserror::Error;

/// Result alias for bboxparse operations.
pub type BBoxParseResult<T> = std::result::Result<T, BBoxParseError>;

/// Errors raised when caller-supplied tensors or configuration break the
/// decoding contract.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum BBoxParseError {
    /// Network input dimensions must be non-zero.
    #[error("invalid network dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    /// The prediction buffer is shorter than `cells * (5 + classes)`.
    #[error("prediction buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// One threshold per class is required.
    #[error("expected {expected} class thresholds, got {got}")]
    ThresholdCountMismatch { expected: usize, got: usize },
    /// A threshold is non-finite or outside `[0, 1]`.
    #[error("invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f32 },
    /// The configuration is otherwise unusable.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}
