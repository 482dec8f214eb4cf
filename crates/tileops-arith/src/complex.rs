//! Complex multiplication and division
//!
//! Bands are taken two at a time as `(real, imaginary)` pairs. For source
//! pair `(a, b)` and `(c, d)`:
//!
//! ```text
//! multiply:  re = a*c - b*d            im = a*d + b*c
//! divide:    re = (a*c + b*d) / den    im = (b*c - a*d) / den,  den = c*c + d*d
//! ```
//!
//! A source with exactly two bands is one complex value per pixel and is
//! paired with every destination pair; otherwise it supplies its own pair
//! for each destination pair. Which source band feeds which pair is fixed
//! once in an index table when the operator is built.
//!
//! Arithmetic is done in `f64`. Integral destinations round half up and
//! saturate to the type range. A zero denominator also zeroes both
//! numerators, so division by `0 + 0i` is `NaN`: integral destinations
//! store 0, floating destinations keep the `NaN`.

use crate::{ArithError, ArithResult};
use tileops_core::{
    DataType, Raster, Rect, Sample, TileAccessor, TileAccessorMut, dispatch_sample_type,
};

/// Complex operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComplexOp {
    /// `source1 * source2`
    #[default]
    Multiply,
    /// `source1 / source2`
    Divide,
}

/// Band indices of one complex pair in each source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PairIndex {
    re1: usize,
    im1: usize,
    re2: usize,
    im2: usize,
}

/// Complex arithmetic operator
#[derive(Debug, Clone)]
pub struct ComplexArithmetic {
    op: ComplexOp,
    data_type: DataType,
    source_bands: [usize; 2],
    pairs: Vec<PairIndex>,
}

impl ComplexArithmetic {
    /// Create an operator for sources with the given band counts.
    ///
    /// The destination band count is the count of the source that isn't a
    /// single shared pair, or the smaller count when both sources supply
    /// their own pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ArithError::InvalidBands`] if either count is zero or odd.
    pub fn new(
        op: ComplexOp,
        data_type: DataType,
        source1_bands: usize,
        source2_bands: usize,
    ) -> ArithResult<Self> {
        for (i, bands) in [source1_bands, source2_bands].into_iter().enumerate() {
            if bands == 0 || bands % 2 != 0 {
                return Err(ArithError::InvalidBands(format!(
                    "source {} has {} bands; complex data needs a positive even count",
                    i + 1,
                    bands
                )));
            }
        }

        let num_bands = match (source1_bands, source2_bands) {
            (2, n) | (n, 2) => n,
            (n1, n2) => n1.min(n2),
        };
        let pair_bands = |bands: usize, k: usize| {
            if bands == 2 { (0, 1) } else { (2 * k, 2 * k + 1) }
        };
        let pairs = (0..num_bands / 2)
            .map(|k| {
                let (re1, im1) = pair_bands(source1_bands, k);
                let (re2, im2) = pair_bands(source2_bands, k);
                PairIndex { re1, im1, re2, im2 }
            })
            .collect();

        tracing::debug!(
            ?op,
            %data_type,
            source1_bands,
            source2_bands,
            num_bands,
            "complex arithmetic configured"
        );

        Ok(Self {
            op,
            data_type,
            source_bands: [source1_bands, source2_bands],
            pairs,
        })
    }

    /// The operation
    pub fn op(&self) -> ComplexOp {
        self.op
    }

    /// Destination band count
    pub fn num_bands(&self) -> usize {
        self.pairs.len() * 2
    }

    /// Compute `rect` of `dst` from the two sources.
    ///
    /// # Errors
    ///
    /// Returns a core error when a tile's data type or band count doesn't
    /// match the operator, or a tile doesn't cover `rect`.
    pub fn compute_rect(
        &self,
        source1: &Raster,
        source2: &Raster,
        dst: &mut Raster,
        rect: &Rect,
    ) -> ArithResult<()> {
        for (src, &bands) in [source1, source2].into_iter().zip(&self.source_bands) {
            src.expect_data_type(self.data_type)?;
            src.expect_bands(bands)?;
            src.expect_covers(rect)?;
        }
        dst.expect_data_type(self.data_type)?;
        dst.expect_bands(self.num_bands())?;
        dst.expect_covers(rect)?;
        if rect.is_empty() {
            return Ok(());
        }
        tracing::trace!(?rect, op = ?self.op, "complex compute_rect");

        dispatch_sample_type!(self.data_type, T => {
            let s1 = source1.accessor::<T>()?;
            let s2 = source2.accessor::<T>()?;
            let mut out = dst.accessor_mut::<T>()?;
            match self.op {
                ComplexOp::Multiply => self.apply(&s1, &s2, &mut out, rect, multiply),
                ComplexOp::Divide => self.apply(&s1, &s2, &mut out, rect, divide),
            }
        });
        Ok(())
    }

    fn apply<T: Sample>(
        &self,
        s1: &TileAccessor<'_, T>,
        s2: &TileAccessor<'_, T>,
        dst: &mut TileAccessorMut<'_, T>,
        rect: &Rect,
        f: fn(f64, f64, f64, f64) -> (f64, f64),
    ) {
        let (d1, d2) = (s1.samples(), s2.samples());
        let dst_bands = dst.band_offsets();

        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let p1 = s1.pixel_offset(x, y);
                let p2 = s2.pixel_offset(x, y);
                let pd = dst.pixel_offset(x, y);
                let out = dst.samples_mut();
                for (k, pair) in self.pairs.iter().enumerate() {
                    let a = d1[p1 + s1.band_offset(pair.re1)].to_f64();
                    let b = d1[p1 + s1.band_offset(pair.im1)].to_f64();
                    let c = d2[p2 + s2.band_offset(pair.re2)].to_f64();
                    let d = d2[p2 + s2.band_offset(pair.im2)].to_f64();
                    let (re, im) = f(a, b, c, d);
                    out[pd + dst_bands[2 * k]] = T::from_f64_round(re);
                    out[pd + dst_bands[2 * k + 1]] = T::from_f64_round(im);
                }
            }
        }
    }
}

#[inline]
fn multiply(a: f64, b: f64, c: f64, d: f64) -> (f64, f64) {
    (a * c - b * d, a * d + b * c)
}

#[inline]
fn divide(a: f64, b: f64, c: f64, d: f64) -> (f64, f64) {
    let den = c * c + d * d;
    ((a * c + b * d) / den, (b * c - a * d) / den)
}
