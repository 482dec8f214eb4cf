//! Typed sample accessors
//!
//! An accessor is the per-call view a kernel works through: a flat typed
//! slice plus pixel stride, scanline stride and band offsets. Inner loops
//! usually compute a start offset with [`TileAccessor::pixel_offset`] and
//! then advance it by the strides themselves.
//!
//! Coordinates are absolute image coordinates. Indexing outside the tile is
//! a caller error and panics on the slice bound check.

use super::SampleLayout;
use crate::rect::Rect;
use crate::sample::Sample;

/// Read-only typed view over a tile
#[derive(Debug, Clone, Copy)]
pub struct TileAccessor<'a, T: Sample> {
    samples: &'a [T],
    bounds: Rect,
    pixel_stride: usize,
    scanline_stride: usize,
    band_offsets: &'a [usize],
}

impl<'a, T: Sample> TileAccessor<'a, T> {
    pub(super) fn new(samples: &'a [T], bounds: Rect, layout: &'a SampleLayout) -> Self {
        Self {
            samples,
            bounds,
            pixel_stride: layout.pixel_stride(),
            scanline_stride: layout.scanline_stride(),
            band_offsets: layout.band_offsets(),
        }
    }

    /// The whole flat sample buffer.
    #[inline]
    pub fn samples(&self) -> &'a [T] {
        self.samples
    }

    /// Tile bounds.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Distance between horizontally adjacent pixels.
    #[inline]
    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    /// Distance between vertically adjacent pixels.
    #[inline]
    pub fn scanline_stride(&self) -> usize {
        self.scanline_stride
    }

    /// Offset of `band` within a pixel.
    #[inline]
    pub fn band_offset(&self, band: usize) -> usize {
        self.band_offsets[band]
    }

    /// All band offsets.
    #[inline]
    pub fn band_offsets(&self) -> &'a [usize] {
        self.band_offsets
    }

    /// Number of bands.
    #[inline]
    pub fn num_bands(&self) -> usize {
        self.band_offsets.len()
    }

    /// Offset of pixel `(x, y)` excluding the band offset.
    #[inline]
    pub fn pixel_offset(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.bounds.contains_point(x, y), "({x}, {y}) outside {:?}", self.bounds);
        (y - self.bounds.y) as usize * self.scanline_stride
            + (x - self.bounds.x) as usize * self.pixel_stride
    }

    /// Sample at `(x, y, band)`.
    #[inline]
    pub fn get(&self, x: i32, y: i32, band: usize) -> T {
        self.samples[self.pixel_offset(x, y) + self.band_offsets[band]]
    }
}

/// Mutable typed view over a tile
#[derive(Debug)]
pub struct TileAccessorMut<'a, T: Sample> {
    samples: &'a mut [T],
    bounds: Rect,
    pixel_stride: usize,
    scanline_stride: usize,
    band_offsets: &'a [usize],
}

impl<'a, T: Sample> TileAccessorMut<'a, T> {
    pub(super) fn new(samples: &'a mut [T], bounds: Rect, layout: &'a SampleLayout) -> Self {
        Self {
            samples,
            bounds,
            pixel_stride: layout.pixel_stride(),
            scanline_stride: layout.scanline_stride(),
            band_offsets: layout.band_offsets(),
        }
    }

    /// The whole flat sample buffer.
    #[inline]
    pub fn samples_mut(&mut self) -> &mut [T] {
        &mut *self.samples
    }

    /// Tile bounds.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Distance between horizontally adjacent pixels.
    #[inline]
    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    /// Distance between vertically adjacent pixels.
    #[inline]
    pub fn scanline_stride(&self) -> usize {
        self.scanline_stride
    }

    /// Offset of `band` within a pixel.
    #[inline]
    pub fn band_offset(&self, band: usize) -> usize {
        self.band_offsets[band]
    }

    /// All band offsets.
    #[inline]
    pub fn band_offsets(&self) -> &'a [usize] {
        self.band_offsets
    }

    /// Number of bands.
    #[inline]
    pub fn num_bands(&self) -> usize {
        self.band_offsets.len()
    }

    /// Offset of pixel `(x, y)` excluding the band offset.
    #[inline]
    pub fn pixel_offset(&self, x: i32, y: i32) -> usize {
        debug_assert!(self.bounds.contains_point(x, y), "({x}, {y}) outside {:?}", self.bounds);
        (y - self.bounds.y) as usize * self.scanline_stride
            + (x - self.bounds.x) as usize * self.pixel_stride
    }

    /// Sample at `(x, y, band)`.
    #[inline]
    pub fn get(&self, x: i32, y: i32, band: usize) -> T {
        self.samples[self.pixel_offset(x, y) + self.band_offsets[band]]
    }

    /// Store `value` at `(x, y, band)`.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, band: usize, value: T) {
        let index = self.pixel_offset(x, y) + self.band_offsets[band];
        self.samples[index] = value;
    }

    /// Store one value per band at pixel `(x, y)`.
    #[inline]
    pub fn set_pixel(&mut self, x: i32, y: i32, values: &[T]) {
        let base = self.pixel_offset(x, y);
        for (band, &value) in values.iter().enumerate() {
            self.samples[base + self.band_offsets[band]] = value;
        }
    }

    /// Store `values` at every pixel of `[x0, x1)` on row `y`.
    pub fn fill_span(&mut self, x0: i32, x1: i32, y: i32, values: &[T]) {
        for x in x0..x1 {
            self.set_pixel(x, y, values);
        }
    }
}
