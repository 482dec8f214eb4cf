//! Failures reported by the regression harness

use thiserror::Error;

/// A failed comparison, or a test tile that couldn't be built
#[derive(Debug, Error)]
pub enum TestError {
    /// Building a test tile failed
    #[error("core error: {0}")]
    Core(#[from] tileops_core::Error),

    /// Two values differ by more than the allowed delta
    #[error("#{index}: expected {expected}, got {actual} (delta {delta})")]
    ValueMismatch {
        index: usize,
        expected: f64,
        actual: f64,
        delta: f64,
    },

    /// Two rasters differ in shape or in a sample
    #[error("#{index}: rasters differ, {detail}")]
    RasterMismatch { index: usize, detail: String },
}

/// Result of building test tiles
pub type TestResult<T> = Result<T, TestError>;
