//! tileops-transform - Affine resampling kernels
//!
//! This crate provides the geometric resampler of the tileops pipeline:
//!
//! - [`AffineTransform`] - six-coefficient affine matrix with inverse and
//!   composition
//! - [`DyadicAffine`] / [`AffineWalker`] - exact integer walk of mapped
//!   source positions along a destination scanline, with scanline clipping
//! - [`AffineResampler`] - the tile operator: nearest neighbor, bilinear,
//!   bicubic and bicubic-2 reconstruction with optional background fill

pub mod affine;
mod error;
pub mod interpolate;
pub mod resample;
pub mod walker;

pub use affine::AffineTransform;
pub use error::{TransformError, TransformResult};
pub use interpolate::{bilinear, catmull_rom, cubic_weights};
pub use resample::{AffineResampler, ResampleOptions};
pub use walker::{AffineWalker, AxisStep, DyadicAffine, MAX_FRACTION_BITS, WalkPosition};
