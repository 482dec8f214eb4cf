//! tileops-core - Tile and sample data structures
//!
//! This crate provides the data model shared by every tileops kernel:
//!
//! - [`DataType`] / [`Sample`] - the six storage types and their
//!   rounding and saturation rules
//! - [`Raster`] - a rectangular tile with a flat typed buffer
//! - [`TileAccessor`] / [`TileAccessorMut`] - typed views with pixel
//!   stride, scanline stride and band offsets
//! - [`Rect`] - integer rectangles
//! - [`Background`] - per-band fill values pre-converted to a data type
//! - [`Interpolation`] - reconstruction filter kinds and their padding
//! - [`RegionOfInterest`] / [`RoiMask`] - pixel predicates
//!
//! Kernels are generic over [`Sample`] and picked at runtime from the
//! destination's [`DataType`] with [`dispatch_sample_type!`].

pub mod background;
pub mod error;
pub mod interp;
pub mod raster;
pub mod rect;
pub mod roi;
pub mod sample;

pub use background::Background;
pub use error::{Error, Result};
pub use interp::{Interpolation, Padding};
pub use raster::{ColorModel, Raster, SampleBuffer, SampleLayout, TileAccessor, TileAccessorMut};
pub use rect::Rect;
pub use roi::{RegionOfInterest, RoiMask};
pub use sample::{DataType, Sample};
