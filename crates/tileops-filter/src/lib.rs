//! tileops-filter - Separable filtering for tileops
//!
//! This crate provides:
//!
//! - **Kernels**: quadrant-symmetric half-kernels with odd or even parity,
//!   box and Gaussian constructors, and kernel convolution
//! - **Subsampling**: integer decimation through a separable antialias
//!   kernel, parallelized over rows and bands with rayon

mod error;
pub mod kernel;
pub mod subsample;

pub use error::{FilterError, FilterResult};
pub use kernel::{Parity, SymmetricKernel, convolve_symmetric_kernels};
pub use subsample::{FilteredSubsample, SubsampleOptions};
