//! Filtered integer subsampling
//!
//! Destination pixel `(xd, yd)` is the separable weighted sum of a source
//! neighborhood around `(xd * scale_x + scale_x / 2, yd * scale_y + scale_y / 2)`.
//! For an even-parity axis kernel the center sits between that sample and
//! its left (upper) neighbor.
//!
//! The per-axis kernel is the antialias kernel, convolved with the
//! interpolation's half-sample kernel when the axis scale is even (and the
//! interpolation isn't nearest). Taps are summed four at a time using the
//! kernel's quadrant symmetry, plus the center row and column for odd
//! kernels.
//!
//! Each (destination row, band) pair is computed independently on a rayon
//! pool; rows are written to the destination after all of them succeed.

use crate::kernel::{Parity, SymmetricKernel, convolve_symmetric_kernels};
use crate::{FilterError, FilterResult};
use rayon::prelude::*;
use std::sync::Arc;
use tileops_core::{
    DataType, Interpolation, Raster, Rect, Sample, TileAccessor, dispatch_sample_type,
};

/// Options for [`FilteredSubsample`]
#[derive(Debug, Clone)]
pub struct SubsampleOptions {
    /// Horizontal decimation factor
    pub scale_x: u32,
    /// Vertical decimation factor
    pub scale_y: u32,
    /// Interpolation used to place even-scale samples
    pub interpolation: Interpolation,
    /// Horizontal antialias kernel (odd parity)
    pub h_kernel: SymmetricKernel,
    /// Vertical antialias kernel (odd parity)
    pub v_kernel: SymmetricKernel,
    /// Worker count of a dedicated pool; `None` uses the global pool
    pub threads: Option<usize>,
}

impl Default for SubsampleOptions {
    fn default() -> Self {
        Self {
            scale_x: 2,
            scale_y: 2,
            interpolation: Interpolation::Bilinear,
            h_kernel: SymmetricKernel::default(),
            v_kernel: SymmetricKernel::default(),
            threads: None,
        }
    }
}

impl SubsampleOptions {
    /// Set the decimation factors
    pub fn with_scale(mut self, scale_x: u32, scale_y: u32) -> Self {
        self.scale_x = scale_x;
        self.scale_y = scale_y;
        self
    }

    /// Set the interpolation
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Set the antialias kernels
    pub fn with_kernels(mut self, h_kernel: SymmetricKernel, v_kernel: SymmetricKernel) -> Self {
        self.h_kernel = h_kernel;
        self.v_kernel = v_kernel;
        self
    }

    /// Run on a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
}

/// Resolved kernel geometry along one axis
#[derive(Debug, Clone)]
struct Axis {
    scale: i32,
    kernel: SymmetricKernel,
    /// `(weight, low offset, high offset)` of each symmetric tap pair
    pairs: Vec<(f64, i32, i32)>,
    center_weight: Option<f64>,
}

impl Axis {
    fn resolve(
        scale: u32,
        antialias: &SymmetricKernel,
        interpolation: Interpolation,
    ) -> FilterResult<Self> {
        let scale = i32::try_from(scale)
            .ok()
            .filter(|&s| s > 0)
            .ok_or_else(|| FilterError::InvalidParameters(format!("invalid scale {scale}")))?;
        if antialias.parity() != Parity::Odd {
            return Err(FilterError::InvalidKernel(
                "antialias kernels must have odd parity".to_string(),
            ));
        }
        let kernel = match SymmetricKernel::resample_half(interpolation) {
            Some(half) if scale % 2 == 0 => convolve_symmetric_kernels(antialias, &half),
            _ => antialias.clone(),
        };

        let values = kernel.values();
        let (pairs, center_weight) = match kernel.parity() {
            Parity::Odd => (
                (1..values.len())
                    .map(|i| (values[i], -(i as i32), i as i32))
                    .collect(),
                Some(values[0]),
            ),
            Parity::Even => (
                (0..values.len())
                    .map(|i| (values[i], -1 - i as i32, i as i32))
                    .collect(),
                None,
            ),
        };
        Ok(Self {
            scale,
            kernel,
            pairs,
            center_weight,
        })
    }

    #[inline]
    fn center_of(&self, d: i32) -> i32 {
        d * self.scale + self.scale / 2
    }

    /// Taps left of the center
    fn lead(&self) -> i32 {
        (self.kernel.len() - self.kernel.parity().center_taps()) as i32
    }

    /// Taps right of the center
    fn trail(&self) -> i32 {
        self.kernel.len() as i32 - 1
    }

    /// Source span `[lo, hi)` read by destinations `[d0, d1)`
    fn footprint(&self, d0: i32, d1: i32) -> (i32, i32) {
        (self.center_of(d0) - self.lead(), self.center_of(d1 - 1) + self.trail() + 1)
    }

    /// Destinations `[d0, d1)` whose footprint fits in source `[s0, s1)`
    fn dest_range(&self, s0: i32, s1: i32) -> (i32, i32) {
        let half = self.scale / 2;
        let first = ceil_div(s0 + self.lead() - half, self.scale);
        let last = (s1 - 1 - self.trail() - half).div_euclid(self.scale);
        (first, (last + 1).max(first))
    }
}

fn ceil_div(a: i32, b: i32) -> i32 {
    -(-a).div_euclid(b)
}

/// Filtered subsampling operator
#[derive(Debug, Clone)]
pub struct FilteredSubsample {
    data_type: DataType,
    num_bands: usize,
    h: Axis,
    v: Axis,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl FilteredSubsample {
    /// Create a subsampler.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidParameters`] for a zero scale, band
    /// count or thread count, [`FilterError::InvalidKernel`] for an
    /// antialias kernel of even parity, and [`FilterError::ThreadPool`] if a
    /// dedicated pool can't be started.
    pub fn new(
        data_type: DataType,
        num_bands: usize,
        options: SubsampleOptions,
    ) -> FilterResult<Self> {
        if num_bands == 0 {
            return Err(FilterError::InvalidParameters(
                "subsampling needs at least one band".to_string(),
            ));
        }
        let h = Axis::resolve(options.scale_x, &options.h_kernel, options.interpolation)?;
        let v = Axis::resolve(options.scale_y, &options.v_kernel, options.interpolation)?;
        let pool = match options.threads {
            Some(0) => {
                return Err(FilterError::InvalidParameters(
                    "thread count must be positive".to_string(),
                ));
            }
            Some(n) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new().num_threads(n).build()?,
            )),
            None => None,
        };

        tracing::debug!(
            %data_type,
            num_bands,
            scale_x = h.scale,
            scale_y = v.scale,
            interpolation = %options.interpolation,
            h_support = h.kernel.support(),
            v_support = v.kernel.support(),
            h_parity = ?h.kernel.parity(),
            v_parity = ?v.kernel.parity(),
            threads = ?options.threads,
            "filtered subsample configured"
        );

        Ok(Self {
            data_type,
            num_bands,
            h,
            v,
            pool,
        })
    }

    /// Resolved horizontal kernel
    pub fn h_kernel(&self) -> &SymmetricKernel {
        &self.h.kernel
    }

    /// Resolved vertical kernel
    pub fn v_kernel(&self) -> &SymmetricKernel {
        &self.v.kernel
    }

    /// Source rectangle read when computing `dest_rect`.
    pub fn source_rect_for(&self, dest_rect: &Rect) -> Rect {
        let (x0, x1) = self.h.footprint(dest_rect.x, dest_rect.right());
        let (y0, y1) = self.v.footprint(dest_rect.y, dest_rect.bottom());
        Rect::from_bounds(x0, y0, x1, y1)
    }

    /// Destination pixels computable from a source with `source_bounds`.
    pub fn dest_bounds(&self, source_bounds: &Rect) -> Rect {
        let (x0, x1) = self.h.dest_range(source_bounds.x, source_bounds.right());
        let (y0, y1) = self.v.dest_range(source_bounds.y, source_bounds.bottom());
        Rect::from_bounds(x0, y0, x1, y1)
    }

    /// Compute `rect` of `dst` from `src`.
    ///
    /// # Errors
    ///
    /// Returns a core error for a tile of the wrong data type or band count,
    /// a source that doesn't cover [`source_rect_for`](Self::source_rect_for),
    /// or a destination that doesn't cover `rect`. If any row fails, `dst`
    /// is left unchanged.
    pub fn compute_rect(&self, src: &Raster, dst: &mut Raster, rect: &Rect) -> FilterResult<()> {
        src.expect_data_type(self.data_type)?;
        src.expect_bands(self.num_bands)?;
        dst.expect_data_type(self.data_type)?;
        dst.expect_bands(self.num_bands)?;
        dst.expect_covers(rect)?;
        if rect.is_empty() {
            return Ok(());
        }
        src.expect_covers(&self.source_rect_for(rect))?;
        tracing::trace!(?rect, "filtered subsample compute_rect");

        dispatch_sample_type!(self.data_type, T => {
            let source = src.accessor::<T>()?;
            let rows = self.install(|| self.filter_rows(&source, rect))?;
            let mut out = dst.accessor_mut::<T>()?;
            for (i, row) in rows.iter().enumerate() {
                let y = rect.y + (i / self.num_bands) as i32;
                let band = i % self.num_bands;
                for (x, &value) in (rect.x..).zip(row) {
                    out.set(x, y, band, value);
                }
            }
        });
        Ok(())
    }

    fn install<R: Send>(&self, job: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(job),
            None => job(),
        }
    }

    fn filter_rows<T: Sample>(
        &self,
        src: &TileAccessor<'_, T>,
        rect: &Rect,
    ) -> FilterResult<Vec<Vec<T>>> {
        let bands = self.num_bands;
        (0..rect.height as usize * bands)
            .into_par_iter()
            .map(|i| self.filter_row(src, rect, rect.y + (i / bands) as i32, i % bands))
            .collect()
    }

    fn filter_row<T: Sample>(
        &self,
        src: &TileAccessor<'_, T>,
        rect: &Rect,
        y: i32,
        band: usize,
    ) -> FilterResult<Vec<T>> {
        let (x0, x1) = self.h.footprint(rect.x, rect.right());
        let (y0, y1) = self.v.footprint(y, y + 1);
        let footprint = Rect::from_bounds(x0, y0, x1, y1);
        if !src.bounds().contains_rect(&footprint) {
            return Err(FilterError::Footprint {
                y,
                band,
                footprint,
                available: src.bounds(),
            });
        }
        let cy = self.v.center_of(y);
        Ok((rect.x..rect.right())
            .map(|x| T::from_f64_clamp(self.filter_pixel(src, band, self.h.center_of(x), cy)))
            .collect())
    }

    #[inline]
    fn filter_pixel<T: Sample>(
        &self,
        src: &TileAccessor<'_, T>,
        band: usize,
        cx: i32,
        cy: i32,
    ) -> f64 {
        let s = |x: i32, y: i32| src.get(x, y, band).to_f64();
        let mut sum = 0.0;
        for &(wv, vlo, vhi) in &self.v.pairs {
            let (ylo, yhi) = (cy + vlo, cy + vhi);
            for &(wh, hlo, hhi) in &self.h.pairs {
                let (xlo, xhi) = (cx + hlo, cx + hhi);
                sum += wv * wh * (s(xlo, ylo) + s(xhi, ylo) + s(xlo, yhi) + s(xhi, yhi));
            }
            if let Some(wc) = self.h.center_weight {
                sum += wv * wc * (s(cx, ylo) + s(cx, yhi));
            }
        }
        if let Some(vc) = self.v.center_weight {
            for &(wh, hlo, hhi) in &self.h.pairs {
                sum += vc * wh * (s(cx + hlo, cy) + s(cx + hhi, cy));
            }
            if let Some(hc) = self.h.center_weight {
                sum += vc * hc * s(cx, cy);
            }
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster_from(bounds: Rect, values: &[f64], data_type: DataType) -> Raster {
        let mut r = Raster::new(bounds, 1, data_type).unwrap();
        let mut it = values.iter();
        for y in bounds.y..bounds.bottom() {
            for x in bounds.x..bounds.right() {
                r.set_sample(x, y, 0, *it.next().unwrap()).unwrap();
            }
        }
        r
    }

    #[test]
    fn test_kernel_resolution() {
        let op = FilteredSubsample::new(DataType::Byte, 1, SubsampleOptions::default()).unwrap();
        assert_eq!(op.h_kernel().parity(), Parity::Even);
        assert_eq!(op.h_kernel().values(), &[0.5]);

        let options = SubsampleOptions::default().with_scale(3, 2);
        let op = FilteredSubsample::new(DataType::Byte, 1, options).unwrap();
        assert_eq!(op.h_kernel().parity(), Parity::Odd);
        assert_eq!(op.v_kernel().parity(), Parity::Even);

        let options = SubsampleOptions::default().with_interpolation(Interpolation::Nearest);
        let op = FilteredSubsample::new(DataType::Byte, 1, options).unwrap();
        assert_eq!(op.h_kernel(), &SymmetricKernel::default());
    }

    #[test]
    fn test_rejects_bad_options() {
        let zero = SubsampleOptions::default().with_scale(0, 2);
        assert!(FilteredSubsample::new(DataType::Byte, 1, zero).is_err());
        let even = SymmetricKernel::new(&[0.5], Parity::Even).unwrap();
        let bad = SubsampleOptions::default().with_kernels(even, SymmetricKernel::default());
        assert!(FilteredSubsample::new(DataType::Byte, 1, bad).is_err());
        let threads = SubsampleOptions::default().with_threads(0);
        assert!(FilteredSubsample::new(DataType::Byte, 1, threads).is_err());
    }

    #[test]
    fn test_geometry() {
        let op = FilteredSubsample::new(DataType::Byte, 1, SubsampleOptions::default()).unwrap();
        // even kernel [0.5]: destination 0 reads source 0..2
        assert_eq!(op.source_rect_for(&Rect::new(0, 0, 3, 1)), Rect::new(0, 0, 6, 2));
        assert_eq!(op.dest_bounds(&Rect::new(0, 0, 7, 4)), Rect::new(0, 0, 3, 2));

        let options = SubsampleOptions::default()
            .with_scale(3, 3)
            .with_kernels(SymmetricKernel::box_filter(2).unwrap(), SymmetricKernel::box_filter(2).unwrap());
        let op = FilteredSubsample::new(DataType::Byte, 1, options).unwrap();
        // center 3d + 1, taps 3d .. 3d + 2
        assert_eq!(op.source_rect_for(&Rect::new(1, 2, 1, 1)), Rect::new(3, 6, 3, 3));
        assert_eq!(op.dest_bounds(&Rect::new(0, 0, 9, 8)), Rect::new(0, 0, 3, 2));
    }

    #[test]
    fn test_two_by_two_mean() {
        let bounds = Rect::new(0, 0, 4, 2);
        let src = raster_from(bounds, &[1.0, 2.0, 10.0, 20.0, 3.0, 4.0, 30.0, 41.0], DataType::Short);
        let op = FilteredSubsample::new(DataType::Short, 1, SubsampleOptions::default()).unwrap();
        let rect = Rect::new(0, 0, 2, 1);
        let mut dst = Raster::new(rect, 1, DataType::Short).unwrap();
        op.compute_rect(&src, &mut dst, &rect).unwrap();
        // 2.5 -> 3, 25.25 -> 25
        assert_eq!(dst.get_sample(0, 0, 0), Some(3.0));
        assert_eq!(dst.get_sample(1, 0, 0), Some(25.0));
    }

    #[test]
    fn test_float_is_not_rounded() {
        let bounds = Rect::new(0, 0, 2, 2);
        let src = raster_from(bounds, &[0.0, 1.0, 1.0, 1.0], DataType::Float);
        let op = FilteredSubsample::new(DataType::Float, 1, SubsampleOptions::default()).unwrap();
        let rect = Rect::new(0, 0, 1, 1);
        let mut dst = Raster::new(rect, 1, DataType::Float).unwrap();
        op.compute_rect(&src, &mut dst, &rect).unwrap();
        assert_eq!(dst.get_sample(0, 0, 0), Some(0.75));
    }

    #[test]
    fn test_short_source_is_error() {
        let src = Raster::new(Rect::new(0, 0, 3, 2), 1, DataType::Byte).unwrap();
        let op = FilteredSubsample::new(DataType::Byte, 1, SubsampleOptions::default()).unwrap();
        let rect = Rect::new(0, 0, 2, 1);
        let mut dst = Raster::new(rect, 1, DataType::Byte).unwrap();
        assert!(op.compute_rect(&src, &mut dst, &rect).is_err());
    }

    #[test]
    fn test_dedicated_pool() {
        let bounds = Rect::new(0, 0, 8, 8);
        let values: Vec<f64> = (0..64).map(f64::from).collect();
        let src = raster_from(bounds, &values, DataType::Int);
        let rect = Rect::new(0, 0, 4, 4);

        let shared = FilteredSubsample::new(DataType::Int, 1, SubsampleOptions::default()).unwrap();
        let own = FilteredSubsample::new(DataType::Int, 1, SubsampleOptions::default().with_threads(2))
            .unwrap();
        let mut a = Raster::new(rect, 1, DataType::Int).unwrap();
        let mut b = Raster::new(rect, 1, DataType::Int).unwrap();
        shared.compute_rect(&src, &mut a, &rect).unwrap();
        own.compute_rect(&src, &mut b, &rect).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(a.get_sample(x, y, 0), b.get_sample(x, y, 0));
            }
        }
    }
}
