//! tileops - Tile-based raster operator kernels
//!
//! Each operator fills one destination tile from source tiles that a
//! scheduler has already fetched. Operators are built once from an options
//! struct, validated at construction and shared across tiles.
//!
//! # Overview
//!
//! - Affine resampling with nearest, bilinear and bicubic reconstruction
//! - Complex multiplication and division of band pairs
//! - Alpha compositing and N-source mosaicking
//! - Filtered integer subsampling, parallel over rows and bands
//!
//! # Example
//!
//! ```
//! use tileops::{DataType, Raster, Rect};
//! use tileops::transform::{AffineResampler, AffineTransform, ResampleOptions};
//!
//! let mut src = Raster::new(Rect::new(0, 0, 4, 4), 1, DataType::Byte).unwrap();
//! src.fill(&[42.0]).unwrap();
//!
//! let op = AffineResampler::new(
//!     AffineTransform::translation(1.0, 0.0),
//!     DataType::Byte,
//!     1,
//!     ResampleOptions::default(),
//! )
//! .unwrap();
//! let rect = Rect::new(1, 0, 4, 4);
//! let mut dst = Raster::new(rect, 1, DataType::Byte).unwrap();
//! op.compute_rect(&src, &mut dst, &rect).unwrap();
//! assert_eq!(dst.get_sample(2, 1, 0), Some(42.0));
//! ```

// Re-export core types (tiles, samples, rectangles)
pub use tileops_core::*;

// Re-export operator crates as modules to avoid name conflicts
pub use tileops_arith as arith;
pub use tileops_blend as blend;
pub use tileops_filter as filter;
pub use tileops_transform as transform;
