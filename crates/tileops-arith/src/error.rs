//! Error types for tileops-arith

use thiserror::Error;

/// Errors that can occur in arithmetic operators
#[derive(Debug, Error)]
pub enum ArithError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] tileops_core::Error),

    /// Band layout that can't be split into complex pairs
    #[error("invalid band layout: {0}")]
    InvalidBands(String),
}

/// Result type for arithmetic operations
pub type ArithResult<T> = Result<T, ArithError>;
