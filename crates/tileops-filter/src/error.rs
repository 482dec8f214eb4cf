//! Error types for tileops-filter

use thiserror::Error;

/// Errors that can occur while building or running a filter
#[derive(Debug, Error)]
pub enum FilterError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tileops_core::Error),

    /// Invalid kernel
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Dedicated worker pool could not be built
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A worker's footprint left the source tile
    #[error("row {y}, band {band}: footprint {footprint:?} outside source {available:?}")]
    Footprint {
        /// Destination row
        y: i32,
        /// Band
        band: usize,
        /// Source rectangle the row reads
        footprint: tileops_core::Rect,
        /// Source tile bounds
        available: tileops_core::Rect,
    },
}

/// Result type for filter operations
pub type FilterResult<T> = Result<T, FilterError>;
