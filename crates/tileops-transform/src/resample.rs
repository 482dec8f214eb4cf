//! Affine resampling of tiles
//!
//! Every destination pixel center `(x + 0.5, y + 0.5)` is mapped backwards
//! through the inverse transform and reconstructed from the source tile.
//!
//! Each scanline is walked with an [`AffineWalker`] over the exact
//! [`DyadicAffine`] form of the inverse, so a pixel's source position
//! doesn't depend on where its tile starts. The scanline is clipped first:
//! only the contiguous run of pixels whose footprint lies inside the source
//! is computed, the rest is background (or left untouched).
//!
//! - Nearest neighbor floors the mapped center.
//! - Bilinear and the bicubic kinds floor the mapped center less half a
//!   pixel; bicubic requires the whole 4x4 neighborhood inside the source.
//!
//! Indexed (palette) sources are always copied nearest neighbor so palette
//! indices are never blended.
//!
//! # Example
//!
//! ```
//! use tileops_core::{DataType, Interpolation, Raster, Rect};
//! use tileops_transform::{AffineResampler, AffineTransform, ResampleOptions};
//!
//! let src = Raster::new(Rect::new(0, 0, 16, 16), 1, DataType::Byte).unwrap();
//! let options = ResampleOptions::default()
//!     .with_interpolation(Interpolation::Bicubic)
//!     .with_background(&[255.0]);
//! let op = AffineResampler::new(AffineTransform::scale(2.0, 2.0), DataType::Byte, 1, options)
//!     .unwrap();
//!
//! let bounds = op.dest_bounds(&src.bounds());
//! let mut dst = Raster::new(bounds, 1, DataType::Byte).unwrap();
//! op.compute_rect(&src, &mut dst, &bounds).unwrap();
//! ```

use crate::affine::AffineTransform;
use crate::interpolate::{CubicTaps, bilinear};
use crate::walker::{AffineWalker, DyadicAffine, WalkPosition};
use crate::{TransformError, TransformResult};
use tileops_core::{
    Background, ColorModel, DataType, Interpolation, Raster, Rect, Sample, TileAccessor,
    TileAccessorMut, dispatch_sample_type,
};

/// Options for [`AffineResampler`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResampleOptions {
    /// Reconstruction filter
    pub interpolation: Interpolation,
    /// Fill values for pixels mapped outside the source (`None` leaves
    /// such pixels untouched)
    pub background: Option<Vec<f64>>,
}

impl ResampleOptions {
    /// Set the reconstruction filter
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Fill unmapped pixels with `values` (one per band; a shorter list is
    /// extended with its first value)
    pub fn with_background(mut self, values: &[f64]) -> Self {
        self.background = Some(values.to_vec());
        self
    }
}

/// Affine resampling operator
///
/// Immutable after construction and safe to share between threads
/// computing different destination tiles.
#[derive(Debug, Clone)]
pub struct AffineResampler {
    transform: AffineTransform,
    inverse: AffineTransform,
    walk: DyadicAffine,
    interpolation: Interpolation,
    data_type: DataType,
    num_bands: usize,
    background: Option<Background>,
}

impl AffineResampler {
    /// Create a resampler for the forward (source to destination)
    /// `transform`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::SingularMatrix`] when `transform` cannot be
    /// inverted, [`TransformError::InvalidParameters`] for non-finite
    /// coefficients or an inverse with a coefficient of magnitude `2^30` or
    /// more, and a core error for an invalid background.
    pub fn new(
        transform: AffineTransform,
        data_type: DataType,
        num_bands: usize,
        options: ResampleOptions,
    ) -> TransformResult<Self> {
        if transform.coeffs().iter().any(|c| !c.is_finite()) {
            return Err(TransformError::InvalidParameters(format!(
                "transform coefficients must be finite: {:?}",
                transform.coeffs()
            )));
        }
        if num_bands == 0 {
            return Err(TransformError::InvalidParameters(
                "resampler needs at least one band".to_string(),
            ));
        }
        let inverse = transform.inverse()?;
        let walk = DyadicAffine::new(&inverse)?;
        let background = options
            .background
            .as_deref()
            .map(|values| Background::new(values, num_bands, data_type))
            .transpose()?;

        tracing::debug!(
            %data_type,
            num_bands,
            interpolation = %options.interpolation,
            background = ?background.as_ref().map(Background::values),
            coeffs = ?transform.coeffs(),
            fraction_bits = walk.bits(),
            "affine resampler configured"
        );

        Ok(Self {
            transform,
            inverse,
            walk,
            interpolation: options.interpolation,
            data_type,
            num_bands,
            background,
        })
    }

    /// Forward transform
    pub fn transform(&self) -> &AffineTransform {
        &self.transform
    }

    /// Destination-to-source transform
    pub fn inverse(&self) -> &AffineTransform {
        &self.inverse
    }

    /// Configured reconstruction filter
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Background, if configured
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Source rectangle read when computing `dest_rect`, including the
    /// interpolation padding.
    pub fn source_rect_for(&self, dest_rect: &Rect) -> Rect {
        if dest_rect.is_empty() {
            return Rect::new(dest_rect.x, dest_rect.y, 0, 0);
        }
        let (min_x, min_y, max_x, max_y) = self.inverse.transform_bounds(dest_rect);
        let shift = if self.interpolation.is_nearest() { 0.0 } else { 0.5 };
        let pad = self.interpolation.padding();
        // one guard pixel absorbs rounding of the floating-point corners
        Rect::from_bounds(
            (min_x - shift).floor() as i32 - pad.left - 1,
            (min_y - shift).floor() as i32 - pad.top - 1,
            (max_x - shift).floor() as i32 + pad.right + 2,
            (max_y - shift).floor() as i32 + pad.bottom + 2,
        )
    }

    /// Destination pixels whose centers map inside `source_bounds`.
    pub fn dest_bounds(&self, source_bounds: &Rect) -> Rect {
        if source_bounds.is_empty() {
            return Rect::new(source_bounds.x, source_bounds.y, 0, 0);
        }
        let (min_x, min_y, max_x, max_y) = self.transform.transform_bounds(source_bounds);
        Rect::from_bounds(
            (min_x - 0.5).ceil() as i32,
            (min_y - 0.5).ceil() as i32,
            (max_x - 0.5).floor() as i32 + 1,
            (max_y - 0.5).floor() as i32 + 1,
        )
    }

    /// Compute `rect` of `dst` from `src`.
    ///
    /// Only pixels inside `rect` are written. Source pixels outside the
    /// source tile are never read; destination pixels whose footprint falls
    /// outside it receive the background, or keep their value when no
    /// background is configured.
    ///
    /// # Errors
    ///
    /// Returns a core error when either tile's data type or band count
    /// differs from the operator's, or when `dst` doesn't cover `rect`.
    pub fn compute_rect(&self, src: &Raster, dst: &mut Raster, rect: &Rect) -> TransformResult<()> {
        src.expect_data_type(self.data_type)?;
        dst.expect_data_type(self.data_type)?;
        src.expect_bands(self.num_bands)?;
        dst.expect_bands(self.num_bands)?;
        dst.expect_covers(rect)?;
        if rect.is_empty() {
            return Ok(());
        }

        let indexed = src.color_model() == ColorModel::Indexed;
        let interpolation = if indexed && !self.interpolation.is_nearest() {
            tracing::debug!(
                requested = %self.interpolation,
                "indexed source, resampling nearest neighbor"
            );
            Interpolation::Nearest
        } else {
            self.interpolation
        };
        tracing::trace!(?rect, source = ?src.bounds(), %interpolation, "affine compute_rect");

        dispatch_sample_type!(self.data_type, T => {
            self.compute_typed::<T>(src, dst, rect, interpolation)
        })
    }

    fn compute_typed<T: Sample>(
        &self,
        src: &Raster,
        dst: &mut Raster,
        rect: &Rect,
        interpolation: Interpolation,
    ) -> TransformResult<()> {
        let background: Option<Vec<T>> = self.background.as_ref().map(Background::samples::<T>);
        let background = background.as_deref();
        let src = src.accessor::<T>()?;
        let mut dst = dst.accessor_mut::<T>()?;

        match interpolation {
            Interpolation::Nearest => nearest(&self.walk, &src, &mut dst, rect, background),
            Interpolation::Bilinear => linear(&self.walk, &src, &mut dst, rect, background),
            Interpolation::Bicubic | Interpolation::Bicubic2 => {
                cubic(&self.walk, interpolation, &src, &mut dst, rect, background)
            }
        }
        Ok(())
    }
}

/// Source rectangle in which the base position of a kernel with the given
/// padding keeps its whole footprint inside `source`.
fn clip_rect(source: Rect, interpolation: Interpolation) -> Rect {
    let pad = interpolation.padding();
    source.expand(-pad.left, -pad.right, -pad.top, -pad.bottom)
}

/// Walk one destination row: fill the background outside the clipped run
/// and call `pixel` for every column inside it.
#[allow(clippy::too_many_arguments)]
fn walk_row<T: Sample, F>(
    inverse: &DyadicAffine,
    clip: &Rect,
    shift: f64,
    dst: &mut TileAccessorMut<'_, T>,
    rect: &Rect,
    y: i32,
    background: Option<&[T]>,
    mut pixel: F,
) where
    F: FnMut(&mut TileAccessorMut<'_, T>, i32, WalkPosition),
{
    let mut walker = AffineWalker::new(inverse, rect.x, y, shift);
    let run = walker.clip_scanline(clip, rect.x, rect.right());

    if let Some(bg) = background {
        dst.fill_span(rect.x, run.start, y, bg);
    }
    if !run.is_empty() {
        walker.skip(run.start - rect.x);
        for x in run.clone() {
            pixel(dst, x, walker.position());
            walker.step();
        }
    }
    if let Some(bg) = background {
        dst.fill_span(run.end, rect.right(), y, bg);
    }
}

fn nearest<T: Sample>(
    inverse: &DyadicAffine,
    src: &TileAccessor<'_, T>,
    dst: &mut TileAccessorMut<'_, T>,
    rect: &Rect,
    background: Option<&[T]>,
) {
    let clip = clip_rect(src.bounds(), Interpolation::Nearest);
    let samples = src.samples();
    let src_bands = src.band_offsets();
    let dst_bands = dst.band_offsets();

    for y in rect.y..rect.bottom() {
        walk_row(inverse, &clip, 0.0, dst, rect, y, background, |dst, x, p| {
            let s = src.pixel_offset(p.x, p.y);
            let d = dst.pixel_offset(x, y);
            let out = dst.samples_mut();
            for (&sb, &db) in src_bands.iter().zip(dst_bands) {
                out[d + db] = samples[s + sb];
            }
        });
    }
}

fn linear<T: Sample>(
    inverse: &DyadicAffine,
    src: &TileAccessor<'_, T>,
    dst: &mut TileAccessorMut<'_, T>,
    rect: &Rect,
    background: Option<&[T]>,
) {
    let clip = clip_rect(src.bounds(), Interpolation::Bilinear);
    let samples = src.samples();
    let ps = src.pixel_stride();
    let ss = src.scanline_stride();
    let src_bands = src.band_offsets();
    let dst_bands = dst.band_offsets();

    for y in rect.y..rect.bottom() {
        walk_row(inverse, &clip, 0.5, dst, rect, y, background, |dst, x, p| {
            let s = src.pixel_offset(p.x, p.y);
            let d = dst.pixel_offset(x, y);
            let (fx, fy) = (p.fx(), p.fy());
            let out = dst.samples_mut();
            for (&sb, &db) in src_bands.iter().zip(dst_bands) {
                let i = s + sb;
                let value = bilinear(
                    samples[i].to_f64(),
                    samples[i + ps].to_f64(),
                    samples[i + ss].to_f64(),
                    samples[i + ss + ps].to_f64(),
                    fx,
                    fy,
                );
                out[d + db] = T::from_f64_interp(value);
            }
        });
    }
}

fn cubic<T: Sample>(
    inverse: &DyadicAffine,
    kind: Interpolation,
    src: &TileAccessor<'_, T>,
    dst: &mut TileAccessorMut<'_, T>,
    rect: &Rect,
    background: Option<&[T]>,
) {
    // base positions in [x1 + 1, x2 - 2) keep the 4x4 neighborhood inside
    let clip = clip_rect(src.bounds(), kind);
    let samples = src.samples();
    let ps = src.pixel_stride();
    let ss = src.scanline_stride();
    let src_bands = src.band_offsets();
    let dst_bands = dst.band_offsets();

    for y in rect.y..rect.bottom() {
        walk_row(inverse, &clip, 0.5, dst, rect, y, background, |dst, x, p| {
            let hx = CubicTaps::new(kind, p.fx());
            let vy = CubicTaps::new(kind, p.fy());
            let top_left = src.pixel_offset(p.x - 1, p.y - 1);
            let d = dst.pixel_offset(x, y);
            let out = dst.samples_mut();

            for (&sb, &db) in src_bands.iter().zip(dst_bands) {
                let mut rows = [0.0; 4];
                for (r, row) in rows.iter_mut().enumerate() {
                    let i = top_left + r * ss + sb;
                    *row = hx.apply([
                        samples[i].to_f64(),
                        samples[i + ps].to_f64(),
                        samples[i + 2 * ps].to_f64(),
                        samples[i + 3 * ps].to_f64(),
                    ]);
                }
                out[d + db] = T::from_f64_interp(vy.apply(rows));
            }
        });
    }
}
