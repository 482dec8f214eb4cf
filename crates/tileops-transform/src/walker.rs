//! Exact incremental walk along a destination scanline
//!
//! Every `f64` coefficient is a dyadic rational, so the inverse transform
//! is held as integer numerators over one shared power-of-two denominator
//! ([`DyadicAffine`]). A mapped pixel center is then an exact integer
//! numerator over `one = 2^(bits + 1)` (the extra bit holds the half-pixel
//! center), and stepping one destination pixel to the right adds a fixed
//! numerator `delta` per axis, split Bresenham style:
//!
//! ```text
//! inc      = floor(delta / one)
//! inc1     = inc + 1
//! ifrac_d  = delta - inc * one
//! ifrac_d1 = one - ifrac_d
//! ```
//!
//! A step adds `inc` and `ifrac_d`, carrying into `inc1` when the fraction
//! overflows. Nothing is rounded after construction: the position reached
//! at a destination column is the same whether the walk started at that
//! column or far to its left, and the same integers drive the scanline
//! clipping in [`AffineWalker::clip_scanline`].

use crate::affine::AffineTransform;
use crate::{TransformError, TransformResult};
use std::ops::Range;
use tileops_core::Rect;

/// Largest power-of-two denominator exponent used for the coefficients.
///
/// Coefficients needing a finer grid are rounded to the nearest multiple
/// of `2^-MAX_FRACTION_BITS`.
pub const MAX_FRACTION_BITS: u32 = 60;

/// Coefficients must stay below this magnitude for the walk to be exact
/// in `i128`.
const MAX_COEFF: f64 = (1u64 << 30) as f64;

/// Affine map with integer coefficients over a shared `2^bits` denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DyadicAffine {
    num: [i128; 6],
    bits: u32,
}

impl DyadicAffine {
    /// Convert `transform` exactly, using the smallest denominator that
    /// represents every coefficient.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidParameters`] for a non-finite
    /// coefficient or one of magnitude `2^30` or more.
    pub fn new(transform: &AffineTransform) -> TransformResult<Self> {
        let coeffs = *transform.coeffs();
        if let Some(c) = coeffs.iter().find(|c| !(c.abs() < MAX_COEFF)) {
            return Err(TransformError::InvalidParameters(format!(
                "coefficient {c} is outside the exact walk range (|c| < 2^30)"
            )));
        }
        let grid = |bits: u32| 2f64.powi(bits as i32);
        let bits = (0..=MAX_FRACTION_BITS)
            .find(|&bits| coeffs.iter().all(|c| (c * grid(bits)).fract() == 0.0))
            .unwrap_or(MAX_FRACTION_BITS);
        let scale = grid(bits);
        Ok(Self {
            num: coeffs.map(|c| (c * scale).round() as i128),
            bits,
        })
    }

    /// Exponent of the coefficient denominator
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Numerators over `2^(bits + 1)` of the source position of the pixel
    /// center `(x + 0.5, y + 0.5)`, less `shift` on both axes.
    fn locate(&self, x: i32, y: i32, shift: f64) -> (i128, i128) {
        let [m00, m01, m02, m10, m11, m12] = self.num;
        let (cx, cy) = (2 * x as i128 + 1, 2 * y as i128 + 1);
        // 0.0 and 0.5 are exact on the grid
        let shift = (shift * 2f64.powi(self.bits as i32 + 1)).round() as i128;
        (
            m00 * cx + m01 * cy + 2 * m02 - shift,
            m10 * cx + m11 * cy + 2 * m12 - shift,
        )
    }
}

/// Per-axis increment of the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisStep {
    /// Integer part of the per-pixel delta
    pub inc: i64,
    /// `inc + 1`, taken when the fraction carries
    pub inc1: i64,
    /// Fractional part of the delta in `1 / one` units
    pub ifrac_d: i128,
    /// `one - ifrac_d`
    pub ifrac_d1: i128,
    one: i128,
}

impl AxisStep {
    fn new(delta: i128, one: i128) -> Self {
        let inc = delta.div_euclid(one);
        let ifrac_d = delta.rem_euclid(one);
        Self {
            inc: inc as i64,
            inc1: inc as i64 + 1,
            ifrac_d,
            ifrac_d1: one - ifrac_d,
            one,
        }
    }

    /// Numerator distance covered by one step.
    #[inline]
    pub fn delta(&self) -> i128 {
        self.inc as i128 * self.one + self.ifrac_d
    }

    #[inline]
    fn advance(&self, axis: &mut Axis) {
        if axis.frac < self.ifrac_d1 {
            axis.pos += self.inc;
            axis.frac += self.ifrac_d;
        } else {
            axis.pos += self.inc1;
            axis.frac -= self.ifrac_d1;
        }
    }

    fn advance_by(&self, n: i64, axis: &mut Axis) {
        let total = axis.frac + n as i128 * self.ifrac_d;
        axis.pos += n * self.inc + total.div_euclid(self.one) as i64;
        axis.frac = total.rem_euclid(self.one);
    }

    /// Steps `k` (relative to the start) whose integer position stays in
    /// `[lo, hi]`.
    ///
    /// Returns `None` for an empty set, `Some((None, None))` when every step
    /// qualifies.
    fn admissible(&self, axis: &Axis, lo: i32, hi: i32) -> Option<(Option<i64>, Option<i64>)> {
        let delta = self.delta();
        if delta == 0 {
            return if axis.pos < lo as i64 || axis.pos > hi as i64 {
                None
            } else {
                Some((None, None))
            };
        }
        // start + k*delta must lie in [lo*one, (hi+1)*one - 1]
        let start = axis.numerator(self.one);
        let low = lo as i128 * self.one - start;
        let high = (hi as i128 + 1) * self.one - 1 - start;
        let (k_lo, k_hi) = if delta > 0 {
            (ceil_div(low, delta), floor_div(high, delta))
        } else {
            (ceil_div(high, delta), floor_div(low, delta))
        };
        Some((Some(clamp_steps(k_lo)), Some(clamp_steps(k_hi))))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Axis {
    pos: i64,
    frac: i128,
}

impl Axis {
    fn from_numerator(n: i128, one: i128) -> Self {
        Self {
            pos: n.div_euclid(one) as i64,
            frac: n.rem_euclid(one),
        }
    }

    fn numerator(&self, one: i128) -> i128 {
        self.pos as i128 * one + self.frac
    }
}

/// Integer position and fractional remainder of the walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkPosition {
    /// Source column
    pub x: i32,
    /// Source row
    pub y: i32,
    /// Fraction of `x` in `1 / 2^frac_bits` units
    pub frac_x: i128,
    /// Fraction of `y` in `1 / 2^frac_bits` units
    pub frac_y: i128,
    /// Exponent of the fraction denominator
    pub frac_bits: u32,
}

impl WalkPosition {
    /// Fraction of `x` as `f64` in `[0, 1)`.
    #[inline]
    pub fn fx(&self) -> f64 {
        self.frac_x as f64 * 2f64.powi(-(self.frac_bits as i32))
    }

    /// Fraction of `y` as `f64` in `[0, 1)`.
    #[inline]
    pub fn fy(&self) -> f64 {
        self.frac_y as f64 * 2f64.powi(-(self.frac_bits as i32))
    }
}

/// Bresenham-like walk of mapped source positions along one scanline
#[derive(Debug, Clone)]
pub struct AffineWalker {
    step_x: AxisStep,
    step_y: AxisStep,
    x: Axis,
    y: Axis,
    frac_bits: u32,
}

impl AffineWalker {
    /// Start a walk at destination pixel `(dst_x, dst_y)`.
    ///
    /// `inverse` maps destination to source coordinates. The pixel center
    /// `(dst_x + 0.5, dst_y + 0.5)` is mapped and `shift` is subtracted
    /// from both source coordinates before flooring (`0.0` for nearest
    /// neighbor, `0.5` for kernels centered between samples).
    pub fn new(inverse: &DyadicAffine, dst_x: i32, dst_y: i32, shift: f64) -> Self {
        let frac_bits = inverse.bits + 1;
        let one = 1i128 << frac_bits;
        let (nx, ny) = inverse.locate(dst_x, dst_y, shift);
        Self {
            step_x: AxisStep::new(2 * inverse.num[0], one),
            step_y: AxisStep::new(2 * inverse.num[3], one),
            x: Axis::from_numerator(nx, one),
            y: Axis::from_numerator(ny, one),
            frac_bits,
        }
    }

    /// Horizontal increment per destination pixel.
    pub fn step_x(&self) -> AxisStep {
        self.step_x
    }

    /// Vertical increment per destination pixel.
    pub fn step_y(&self) -> AxisStep {
        self.step_y
    }

    /// Current position. Coordinates beyond the `i32` range saturate.
    #[inline]
    pub fn position(&self) -> WalkPosition {
        WalkPosition {
            x: saturate(self.x.pos),
            y: saturate(self.y.pos),
            frac_x: self.x.frac,
            frac_y: self.y.frac,
            frac_bits: self.frac_bits,
        }
    }

    /// Advance one destination pixel and return the new position.
    #[inline]
    pub fn step(&mut self) -> WalkPosition {
        self.step_x.advance(&mut self.x);
        self.step_y.advance(&mut self.y);
        self.position()
    }

    /// Advance `n` destination pixels at once.
    ///
    /// Equivalent to calling [`AffineWalker::step`] `n` times.
    pub fn skip(&mut self, n: i32) -> WalkPosition {
        if n > 0 {
            self.step_x.advance_by(n as i64, &mut self.x);
            self.step_y.advance_by(n as i64, &mut self.y);
        }
        self.position()
    }

    /// Destination columns of the scanline `[dst_min_x, dst_max_x)` whose
    /// walk positions land inside `clip` (inclusive integer source bounds).
    ///
    /// The walker must be positioned at `dst_min_x`. The result is a
    /// contiguous range, possibly empty, inside `[dst_min_x, dst_max_x)`.
    pub fn clip_scanline(&self, clip: &Rect, dst_min_x: i32, dst_max_x: i32) -> Range<i32> {
        let empty = dst_min_x..dst_min_x;
        if clip.is_empty() || dst_max_x <= dst_min_x {
            return empty;
        }
        let x_range = self.step_x.admissible(&self.x, clip.x, clip.right() - 1);
        let y_range = self.step_y.admissible(&self.y, clip.y, clip.bottom() - 1);
        let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (x_range, y_range) else {
            return empty;
        };

        let count = (dst_max_x - dst_min_x) as i64;
        let k_min = [x_lo, y_lo].into_iter().flatten().fold(0, i64::max);
        let k_max = [x_hi, y_hi].into_iter().flatten().fold(count - 1, i64::min);
        if k_min > k_max {
            return empty;
        }
        (dst_min_x + k_min as i32)..(dst_min_x + k_max as i32 + 1)
    }
}

#[inline]
fn saturate(v: i64) -> i32 {
    v.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

fn clamp_steps(k: i128) -> i64 {
    k.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

#[inline]
fn floor_div(a: i128, b: i128) -> i128 {
    let q = a / b;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q - 1
    } else {
        q
    }
}

#[inline]
fn ceil_div(a: i128, b: i128) -> i128 {
    -floor_div(-a, b)
}
