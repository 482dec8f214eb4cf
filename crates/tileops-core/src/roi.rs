//! Regions of interest
//!
//! A region of interest is a predicate over image coordinates. Mosaicking
//! uses it as a binary per-source weight.

use crate::error::{Error, Result};
use crate::raster::Raster;
use crate::rect::Rect;
use std::fmt;

/// Predicate selecting a subset of image pixels
pub trait RegionOfInterest: fmt::Debug + Send + Sync {
    /// True if pixel `(x, y)` is inside the region.
    fn contains(&self, x: i32, y: i32) -> bool;

    /// Bounding rectangle of the region.
    fn bounds(&self) -> Rect;
}

impl RegionOfInterest for Rect {
    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        self.contains_point(x, y)
    }

    fn bounds(&self) -> Rect {
        *self
    }
}

/// Region described by a single-band mask tile
///
/// A pixel is inside when its mask sample is greater than zero. Pixels
/// outside the mask tile are outside the region.
#[derive(Debug, Clone)]
pub struct RoiMask {
    mask: Raster,
}

impl RoiMask {
    /// Wrap a single-band mask tile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BandMismatch`] if the mask has more than one band.
    pub fn new(mask: Raster) -> Result<Self> {
        if mask.num_bands() != 1 {
            return Err(Error::BandMismatch {
                expected: 1,
                actual: mask.num_bands(),
            });
        }
        Ok(Self { mask })
    }

    /// The mask tile.
    pub fn mask(&self) -> &Raster {
        &self.mask
    }
}

impl RegionOfInterest for RoiMask {
    fn contains(&self, x: i32, y: i32) -> bool {
        self.mask.get_sample(x, y, 0).is_some_and(|v| v > 0.0)
    }

    fn bounds(&self) -> Rect {
        self.mask.bounds()
    }
}
