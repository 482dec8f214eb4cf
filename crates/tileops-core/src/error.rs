//! Error types for tileops-core
//!
//! Provides a unified error type for tile construction, accessor creation
//! and configuration validation. Each variant captures enough context for
//! diagnostics without exposing internal layout details.

use crate::rect::Rect;
use crate::sample::DataType;
use thiserror::Error;

/// tileops core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid tile dimensions
    #[error("invalid tile dimensions: {width}x{height}")]
    InvalidDimension { width: i32, height: i32 },

    /// Sample type not supported by the operation
    #[error("unsupported data type: {0}")]
    UnsupportedDataType(DataType),

    /// Sample types of two tiles (or a tile and an operator) differ
    #[error("incompatible data types: expected {expected}, got {actual}")]
    IncompatibleDataTypes {
        expected: DataType,
        actual: DataType,
    },

    /// Band counts differ
    #[error("band count mismatch: expected {expected}, got {actual}")]
    BandMismatch { expected: usize, actual: usize },

    /// Band index out of range
    #[error("band index out of bounds: {band} >= {num_bands}")]
    BandOutOfBounds { band: usize, num_bands: usize },

    /// Sample buffer too small for the declared layout
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// A tile does not cover the rectangle an operation needs
    #[error("rectangle {required:?} is not covered by tile bounds {available:?}")]
    NotCovered { required: Rect, available: Rect },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
