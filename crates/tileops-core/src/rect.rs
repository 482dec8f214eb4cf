//! Rect - integer rectangles in image coordinates
//!
//! Tiles, destination regions and ROI bounds are all `Rect`s. Coordinates
//! follow raster convention: `x` grows to the right, `y` grows down, and
//! the right/bottom edges are exclusive.

use crate::error::{Error, Result};

/// A rectangle region
///
/// A small `Copy` type. A rectangle with zero width or height is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left x coordinate
    pub x: i32,
    /// Top y coordinate
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

impl Rect {
    /// Create a rectangle without validation.
    ///
    /// Negative extents are treated as empty by every query.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle, rejecting negative extents.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is negative.
    pub fn try_new(x: i32, y: i32, width: i32, height: i32) -> Result<Self> {
        if width < 0 || height < 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        Ok(Self::new(x, y, width, height))
    }

    /// Create a rectangle spanning `[x1, x2) x [y1, y2)`.
    pub fn from_bounds(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(x1, y1, (x2 - x1).max(0), (y2 - y1).max(0))
    }

    /// Right x coordinate (exclusive)
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom y coordinate (exclusive)
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Number of pixels covered.
    #[inline]
    pub fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// True when the rectangle covers no pixel.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a pixel is inside the rectangle
    #[inline]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Check if this rectangle fully contains another.
    ///
    /// An empty rectangle is contained by anything.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.is_empty()
            || (other.x >= self.x
                && other.y >= self.y
                && other.right() <= self.right()
                && other.bottom() <= self.bottom())
    }

    /// Check if two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Intersection, or `None` when the rectangles do not overlap.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        if !self.overlaps(other) {
            return None;
        }
        Some(Rect::from_bounds(
            self.x.max(other.x),
            self.y.max(other.y),
            self.right().min(other.right()),
            self.bottom().min(other.bottom()),
        ))
    }

    /// Smallest rectangle containing both. Empty inputs are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Rect::from_bounds(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Grow by the given margins on each side.
    pub fn expand(&self, left: i32, right: i32, top: i32, bottom: i32) -> Rect {
        Rect::from_bounds(
            self.x - left,
            self.y - top,
            self.right() + right,
            self.bottom() + bottom,
        )
    }

    /// Shift by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}
