//! Error types for tileops-blend

use thiserror::Error;

/// Errors that can occur in compositing and mosaicking
#[derive(Debug, Error)]
pub enum BlendError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tileops_core::Error),

    /// Invalid operator parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Number of per-call sources differs from the configured count
    #[error("expected {expected} sources, got {actual}")]
    SourceCountMismatch { expected: usize, actual: usize },

    /// A source configured with an alpha channel was given no alpha tile
    #[error("source {source_index} is weighted by alpha but no alpha tile was supplied")]
    MissingAlpha { source_index: usize },
}

/// Result type for blend operations
pub type BlendResult<T> = Result<T, BlendError>;
