//! One-dimensional reconstruction filters
//!
//! Two-dimensional interpolation is separable: four horizontal passes over
//! the rows of a 4x4 neighborhood, then one vertical pass over the four
//! intermediate values.

use tileops_core::Interpolation;

/// Cubic between `s0` and `s1` at fraction `f`
///
/// `s_` and `s2` are the outer neighbors. A linear blend of `s0` and `s1`
/// corrected by a quadratic term:
/// ```text
/// q = s0 - ((s1 + s_) + ((s2 + s0) - (s1 + s_)) * f) / 2
/// result = s0 + (s1 - s0) * f + q * f * (1 - f)
/// ```
/// Returns `s0` exactly at `f = 0` and preserves constants.
#[inline]
pub fn catmull_rom(s_: f64, s0: f64, s1: f64, s2: f64, f: f64) -> f64 {
    let outer = s1 + s_;
    let q = s0 - (outer + ((s2 + s0) - outer) * f) / 2.0;
    s0 + (s1 - s0) * f + q * f * (1.0 - f)
}

/// Cubic convolution weights for taps at offsets `-1, 0, 1, 2`
///
/// `a` is the kernel parameter: `-0.5` gives Catmull-Rom, `-1.0` the
/// sharper variant.
pub fn cubic_weights(f: f64, a: f64) -> [f64; 4] {
    let near = |t: f64| ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0;
    let far = |t: f64| ((a * t - 5.0 * a) * t + 8.0 * a) * t - 4.0 * a;
    [far(1.0 + f), near(f), near(1.0 - f), far(2.0 - f)]
}

/// Linear interpolation of a 2x2 neighborhood
#[inline]
pub fn bilinear(s00: f64, s01: f64, s10: f64, s11: f64, fx: f64, fy: f64) -> f64 {
    let top = s00 + (s01 - s00) * fx;
    let bottom = s10 + (s11 - s10) * fx;
    top + (bottom - top) * fy
}

/// Per-pixel cubic filter state for one fractional offset
#[derive(Debug, Clone, Copy)]
pub(crate) enum CubicTaps {
    CatmullRom(f64),
    Weighted([f64; 4]),
}

impl CubicTaps {
    pub(crate) fn new(kind: Interpolation, f: f64) -> Self {
        match kind {
            Interpolation::Bicubic2 => CubicTaps::Weighted(cubic_weights(f, -1.0)),
            _ => CubicTaps::CatmullRom(f),
        }
    }

    #[inline]
    pub(crate) fn apply(&self, s: [f64; 4]) -> f64 {
        match *self {
            CubicTaps::CatmullRom(f) => catmull_rom(s[0], s[1], s[2], s[3], f),
            CubicTaps::Weighted(w) => w[0] * s[0] + w[1] * s[1] + w[2] * s[2] + w[3] * s[3],
        }
    }
}
