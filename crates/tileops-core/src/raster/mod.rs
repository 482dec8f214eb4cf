//! Raster - a rectangular tile of typed samples
//!
//! A `Raster` owns one flat sample buffer and describes how samples are
//! addressed inside it:
//!
//! ```text
//! index(x, y, band) = (y - origin_y) * scanline_stride
//!                   + (x - origin_x) * pixel_stride
//!                   + band_offsets[band]
//! ```
//!
//! Coordinates passed to accessors are absolute image coordinates, so a
//! tile at origin `(64, 128)` is addressed with `x` in `64..64+width`.
//!
//! # Layouts
//!
//! - [`SampleLayout::interleaved`]: pixel-interleaved (`RGBRGB...`), the
//!   default for [`Raster::new`].
//! - [`SampleLayout::banded`]: band-sequential planes in one buffer.
//!
//! Any other layout can be described directly as long as every addressed
//! index lies inside the buffer; [`Raster::with_layout`] checks that once.

mod access;

pub use access::{TileAccessor, TileAccessorMut};

use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::sample::{DataType, Sample};

/// Flat sample storage tagged with its data type
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    /// Unsigned 8-bit samples
    Byte(Vec<u8>),
    /// Unsigned 16-bit samples
    UShort(Vec<u16>),
    /// Signed 16-bit samples
    Short(Vec<i16>),
    /// Signed 32-bit samples
    Int(Vec<i32>),
    /// 32-bit float samples
    Float(Vec<f32>),
    /// 64-bit float samples
    Double(Vec<f64>),
}

impl SampleBuffer {
    /// Allocate a zero-filled buffer.
    pub fn zeros(data_type: DataType, len: usize) -> Self {
        match data_type {
            DataType::Byte => SampleBuffer::Byte(vec![0; len]),
            DataType::UShort => SampleBuffer::UShort(vec![0; len]),
            DataType::Short => SampleBuffer::Short(vec![0; len]),
            DataType::Int => SampleBuffer::Int(vec![0; len]),
            DataType::Float => SampleBuffer::Float(vec![0.0; len]),
            DataType::Double => SampleBuffer::Double(vec![0.0; len]),
        }
    }

    /// Data type of the stored samples.
    pub fn data_type(&self) -> DataType {
        match self {
            SampleBuffer::Byte(_) => DataType::Byte,
            SampleBuffer::UShort(_) => DataType::UShort,
            SampleBuffer::Short(_) => DataType::Short,
            SampleBuffer::Int(_) => DataType::Int,
            SampleBuffer::Float(_) => DataType::Float,
            SampleBuffer::Double(_) => DataType::Double,
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        match self {
            SampleBuffer::Byte(v) => v.len(),
            SampleBuffer::UShort(v) => v.len(),
            SampleBuffer::Short(v) => v.len(),
            SampleBuffer::Int(v) => v.len(),
            SampleBuffer::Float(v) => v.len(),
            SampleBuffer::Double(v) => v.len(),
        }
    }

    /// True if the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_f64(&self, index: usize) -> Option<f64> {
        match self {
            SampleBuffer::Byte(v) => v.get(index).map(|&s| s.to_f64()),
            SampleBuffer::UShort(v) => v.get(index).map(|&s| s.to_f64()),
            SampleBuffer::Short(v) => v.get(index).map(|&s| s.to_f64()),
            SampleBuffer::Int(v) => v.get(index).map(|&s| s.to_f64()),
            SampleBuffer::Float(v) => v.get(index).map(|&s| s.to_f64()),
            SampleBuffer::Double(v) => v.get(index).copied(),
        }
    }

    fn set_f64(&mut self, index: usize, value: f64) -> bool {
        fn put<T: Sample>(v: &mut [T], index: usize, value: f64) -> bool {
            match v.get_mut(index) {
                Some(slot) => {
                    *slot = T::from_f64_round(value);
                    true
                }
                None => false,
            }
        }
        match self {
            SampleBuffer::Byte(v) => put(v, index, value),
            SampleBuffer::UShort(v) => put(v, index, value),
            SampleBuffer::Short(v) => put(v, index, value),
            SampleBuffer::Int(v) => put(v, index, value),
            SampleBuffer::Float(v) => put(v, index, value),
            SampleBuffer::Double(v) => put(v, index, value),
        }
    }
}

/// How sample indices are derived from pixel coordinates and band
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLayout {
    pixel_stride: usize,
    scanline_stride: usize,
    band_offsets: Vec<usize>,
}

impl SampleLayout {
    /// Describe an arbitrary layout.
    pub fn new(pixel_stride: usize, scanline_stride: usize, band_offsets: Vec<usize>) -> Self {
        Self {
            pixel_stride,
            scanline_stride,
            band_offsets,
        }
    }

    /// Pixel-interleaved layout with no row padding.
    pub fn interleaved(width: usize, num_bands: usize) -> Self {
        Self {
            pixel_stride: num_bands,
            scanline_stride: width * num_bands,
            band_offsets: (0..num_bands).collect(),
        }
    }

    /// Band-sequential layout: one `width * height` plane per band.
    pub fn banded(width: usize, height: usize, num_bands: usize) -> Self {
        let plane = width * height;
        Self {
            pixel_stride: 1,
            scanline_stride: width,
            band_offsets: (0..num_bands).map(|b| b * plane).collect(),
        }
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

    /// Per-band offsets.
    #[inline]
    pub fn band_offsets(&self) -> &[usize] {
        &self.band_offsets
    }

    /// Number of bands described.
    #[inline]
    pub fn num_bands(&self) -> usize {
        self.band_offsets.len()
    }

    /// Minimum buffer length needed to address a `width x height` tile.
    pub fn required_len(&self, width: usize, height: usize) -> usize {
        if width == 0 || height == 0 {
            return 0;
        }
        let max_band = self.band_offsets.iter().copied().max().unwrap_or(0);
        (height - 1) * self.scanline_stride + (width - 1) * self.pixel_stride + max_band + 1
    }
}

/// How sample values are interpreted by a color model
///
/// Only the distinction that changes kernel behavior is modeled: indexed
/// samples are palette indices and must never be interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorModel {
    /// Samples are color or data values
    #[default]
    Direct,
    /// Samples are indices into a palette
    Indexed,
}

/// A rectangular tile of typed samples
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    bounds: Rect,
    layout: SampleLayout,
    color_model: ColorModel,
    data: SampleBuffer,
}

impl Raster {
    /// Create a zero-filled pixel-interleaved tile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] for negative extents and
    /// [`Error::InvalidParameter`] when `num_bands` is zero.
    pub fn new(bounds: Rect, num_bands: usize, data_type: DataType) -> Result<Self> {
        check_geometry(bounds, num_bands)?;
        let layout = SampleLayout::interleaved(bounds.width as usize, num_bands);
        let len = layout.required_len(bounds.width as usize, bounds.height as usize);
        Ok(Self {
            bounds,
            layout,
            color_model: ColorModel::Direct,
            data: SampleBuffer::zeros(data_type, len),
        })
    }

    /// Create a pixel-interleaved tile from typed samples.
    ///
    /// # Errors
    ///
    /// Returns an error if `samples.len()` differs from
    /// `width * height * num_bands`.
    pub fn from_samples<T: Sample>(bounds: Rect, num_bands: usize, samples: Vec<T>) -> Result<Self> {
        check_geometry(bounds, num_bands)?;
        let layout = SampleLayout::interleaved(bounds.width as usize, num_bands);
        let expected = layout.required_len(bounds.width as usize, bounds.height as usize);
        if samples.len() != expected {
            return Err(Error::InvalidParameter(format!(
                "sample count {} doesn't match {}x{}x{} = {}",
                samples.len(),
                bounds.width,
                bounds.height,
                num_bands,
                expected
            )));
        }
        Ok(Self {
            bounds,
            layout,
            color_model: ColorModel::Direct,
            data: T::into_buffer(samples),
        })
    }

    /// Create a tile over an existing buffer with an explicit layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the layout addresses samples
    /// past the end of `data`.
    pub fn with_layout(bounds: Rect, layout: SampleLayout, data: SampleBuffer) -> Result<Self> {
        check_geometry(bounds, layout.num_bands())?;
        let needed = layout.required_len(bounds.width as usize, bounds.height as usize);
        if needed > data.len() {
            return Err(Error::IndexOutOfBounds {
                index: needed - 1,
                len: data.len(),
            });
        }
        Ok(Self {
            bounds,
            layout,
            color_model: ColorModel::Direct,
            data,
        })
    }

    /// Tag this tile with a color model.
    pub fn with_color_model(mut self, color_model: ColorModel) -> Self {
        self.color_model = color_model;
        self
    }

    /// Tile bounds in image coordinates.
    #[inline]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Left edge.
    #[inline]
    pub fn x(&self) -> i32 {
        self.bounds.x
    }

    /// Top edge.
    #[inline]
    pub fn y(&self) -> i32 {
        self.bounds.y
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height
    }

    /// Number of bands.
    #[inline]
    pub fn num_bands(&self) -> usize {
        self.layout.num_bands()
    }

    /// Sample storage type.
    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    /// Sample addressing.
    #[inline]
    pub fn layout(&self) -> &SampleLayout {
        &self.layout
    }

    /// Color model tag.
    #[inline]
    pub fn color_model(&self) -> ColorModel {
        self.color_model
    }

    /// Underlying buffer.
    pub fn buffer(&self) -> &SampleBuffer {
        &self.data
    }

    /// Typed read accessor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleDataTypes`] if `T` is not this tile's
    /// data type.
    pub fn accessor<T: Sample>(&self) -> Result<TileAccessor<'_, T>> {
        let data_type = self.data_type();
        let samples = T::slice(&self.data).ok_or(Error::IncompatibleDataTypes {
            expected: T::DATA_TYPE,
            actual: data_type,
        })?;
        Ok(TileAccessor::new(samples, self.bounds, &self.layout))
    }

    /// Typed write accessor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleDataTypes`] if `T` is not this tile's
    /// data type.
    pub fn accessor_mut<T: Sample>(&mut self) -> Result<TileAccessorMut<'_, T>> {
        let data_type = self.data.data_type();
        let samples = T::slice_mut(&mut self.data).ok_or(Error::IncompatibleDataTypes {
            expected: T::DATA_TYPE,
            actual: data_type,
        })?;
        Ok(TileAccessorMut::new(samples, self.bounds, &self.layout))
    }

    fn index(&self, x: i32, y: i32, band: usize) -> Option<usize> {
        if !self.bounds.contains_point(x, y) || band >= self.num_bands() {
            return None;
        }
        let dx = (x - self.bounds.x) as usize;
        let dy = (y - self.bounds.y) as usize;
        Some(
            dy * self.layout.scanline_stride
                + dx * self.layout.pixel_stride
                + self.layout.band_offsets[band],
        )
    }

    /// Read one sample as `f64`.
    ///
    /// Returns `None` outside the tile or for an invalid band.
    pub fn get_sample(&self, x: i32, y: i32, band: usize) -> Option<f64> {
        self.index(x, y, band).and_then(|i| self.data.get_f64(i))
    }

    /// Write one sample, converting with half-up rounding and saturation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] outside the tile.
    pub fn set_sample(&mut self, x: i32, y: i32, band: usize, value: f64) -> Result<()> {
        let len = self.data.len();
        let index = self.index(x, y, band).ok_or(Error::IndexOutOfBounds {
            index: usize::MAX,
            len,
        })?;
        if self.data.set_f64(index, value) {
            Ok(())
        } else {
            Err(Error::IndexOutOfBounds { index, len })
        }
    }

    /// Set every pixel to `values` (one per band).
    ///
    /// # Errors
    ///
    /// Returns [`Error::BandMismatch`] if `values.len()` differs from the
    /// band count.
    pub fn fill(&mut self, values: &[f64]) -> Result<()> {
        if values.len() != self.num_bands() {
            return Err(Error::BandMismatch {
                expected: self.num_bands(),
                actual: values.len(),
            });
        }
        let bounds = self.bounds;
        for y in bounds.y..bounds.bottom() {
            for x in bounds.x..bounds.right() {
                for (band, &value) in values.iter().enumerate() {
                    self.set_sample(x, y, band, value)?;
                }
            }
        }
        Ok(())
    }

    /// Check that this tile has the given data type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleDataTypes`] on mismatch.
    pub fn expect_data_type(&self, expected: DataType) -> Result<()> {
        if self.data_type() != expected {
            return Err(Error::IncompatibleDataTypes {
                expected,
                actual: self.data_type(),
            });
        }
        Ok(())
    }

    /// Check that this tile has the given band count.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BandMismatch`] on mismatch.
    pub fn expect_bands(&self, expected: usize) -> Result<()> {
        if self.num_bands() != expected {
            return Err(Error::BandMismatch {
                expected,
                actual: self.num_bands(),
            });
        }
        Ok(())
    }

    /// Check that this tile covers `required`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCovered`] otherwise.
    pub fn expect_covers(&self, required: &Rect) -> Result<()> {
        if !self.bounds.contains_rect(required) {
            return Err(Error::NotCovered {
                required: *required,
                available: self.bounds,
            });
        }
        Ok(())
    }
}

fn check_geometry(bounds: Rect, num_bands: usize) -> Result<()> {
    if bounds.width < 0 || bounds.height < 0 {
        return Err(Error::InvalidDimension {
            width: bounds.width,
            height: bounds.height,
        });
    }
    if num_bands == 0 {
        return Err(Error::InvalidParameter(
            "a tile needs at least one band".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_interleaved() {
        let r = Raster::new(Rect::new(10, 20, 3, 2), 3, DataType::UShort).unwrap();
        assert_eq!(r.num_bands(), 3);
        assert_eq!(r.layout().pixel_stride(), 3);
        assert_eq!(r.layout().scanline_stride(), 9);
        assert_eq!(r.buffer().len(), 18);
        assert_eq!(r.get_sample(10, 20, 2), Some(0.0));
        assert_eq!(r.get_sample(9, 20, 0), None);
    }

    #[test]
    fn test_set_sample_rounds_and_clamps() {
        let mut r = Raster::new(Rect::new(0, 0, 2, 2), 1, DataType::Byte).unwrap();
        r.set_sample(1, 1, 0, 300.0).unwrap();
        r.set_sample(0, 1, 0, 7.5).unwrap();
        assert_eq!(r.get_sample(1, 1, 0), Some(255.0));
        assert_eq!(r.get_sample(0, 1, 0), Some(8.0));
        assert!(r.set_sample(2, 0, 0, 1.0).is_err());
    }

    #[test]
    fn test_banded_layout_addresses_planes() {
        let layout = SampleLayout::banded(2, 2, 2);
        let data = SampleBuffer::Short(vec![1, 2, 3, 4, 5, 6, 7, 8]);
        let r = Raster::with_layout(Rect::new(0, 0, 2, 2), layout, data).unwrap();
        assert_eq!(r.get_sample(1, 0, 0), Some(2.0));
        assert_eq!(r.get_sample(1, 1, 1), Some(8.0));
    }

    #[test]
    fn test_with_layout_rejects_short_buffer() {
        let layout = SampleLayout::interleaved(4, 2);
        let data = SampleBuffer::Byte(vec![0; 15]);
        assert!(Raster::with_layout(Rect::new(0, 0, 4, 2), layout, data).is_err());
    }

    #[test]
    fn test_accessor_type_mismatch() {
        let r = Raster::new(Rect::new(0, 0, 1, 1), 1, DataType::Float).unwrap();
        assert!(r.accessor::<f32>().is_ok());
        assert!(r.accessor::<u8>().is_err());
    }

    #[test]
    fn test_fill() {
        let mut r = Raster::new(Rect::new(0, 0, 2, 1), 2, DataType::Int).unwrap();
        r.fill(&[-5.0, 9.0]).unwrap();
        assert_eq!(r.get_sample(1, 0, 0), Some(-5.0));
        assert_eq!(r.get_sample(1, 0, 1), Some(9.0));
        assert!(r.fill(&[1.0]).is_err());
    }

    #[test]
    fn test_expect_covers() {
        let r = Raster::new(Rect::new(0, 0, 4, 4), 1, DataType::Byte).unwrap();
        assert!(r.expect_covers(&Rect::new(1, 1, 3, 3)).is_ok());
        assert!(r.expect_covers(&Rect::new(1, 1, 4, 3)).is_err());
    }
}
