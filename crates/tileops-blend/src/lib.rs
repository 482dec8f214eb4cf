//! tileops-blend - Compositing and mosaicking kernels
//!
//! - [`AlphaCompositor`] - "over" compositing of two sources with one or
//!   two alpha channels, straight or premultiplied, with or without a
//!   destination alpha band
//! - [`Mosaic`] - combination of N sources weighted by alpha, region of
//!   interest or threshold, in overlay or blend mode

pub mod composite;
mod error;
pub mod mosaic;

pub use composite::{AlphaCompositor, CompositeOptions, DestAlpha};
pub use error::{BlendError, BlendResult};
pub use mosaic::{Mosaic, MosaicInput, MosaicOptions, MosaicType, WeightPolicy};
