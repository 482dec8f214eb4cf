//! Error types for tileops-transform

use thiserror::Error;

/// Errors that can occur while configuring or running a resampler
#[derive(Debug, Error)]
pub enum TransformError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tileops_core::Error),

    /// Invalid transformation parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Singular matrix (non-invertible)
    #[error("singular transformation matrix")]
    SingularMatrix,
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;
