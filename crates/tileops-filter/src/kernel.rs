//! Quadrant-symmetric separable kernels
//!
//! A kernel is stored as its right half `k[0..n]` plus a parity:
//!
//! ```text
//! odd:   k[n-1] .. k[1] k[0] k[1] .. k[n-1]        support 2n - 1
//! even:  k[n-1] .. k[1] k[0] k[0] k[1] .. k[n-1]   support 2n
//! ```
//!
//! An odd kernel has a center tap; an even kernel is centered between two
//! samples.

use crate::{FilterError, FilterResult};
use tileops_core::Interpolation;

/// Whether a symmetric kernel has a center tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parity {
    /// Center tap counted once
    #[default]
    Odd,
    /// Symmetric pairs only
    Even,
}

impl Parity {
    /// 1 for odd, 0 for even
    #[inline]
    pub fn center_taps(self) -> usize {
        match self {
            Parity::Odd => 1,
            Parity::Even => 0,
        }
    }
}

/// Half of a symmetric one-dimensional kernel
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetricKernel {
    values: Vec<f64>,
    parity: Parity,
}

impl Default for SymmetricKernel {
    /// The single-tap identity kernel `[1.0]`
    fn default() -> Self {
        Self {
            values: vec![1.0],
            parity: Parity::Odd,
        }
    }
}

impl SymmetricKernel {
    /// Create a kernel from its half values.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernel`] if `values` is empty or holds
    /// a non-finite value.
    pub fn new(values: &[f64], parity: Parity) -> FilterResult<Self> {
        if values.is_empty() {
            return Err(FilterError::InvalidKernel(
                "half-kernel must have at least one value".to_string(),
            ));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(FilterError::InvalidKernel(format!(
                "half-kernel value {v} is not finite"
            )));
        }
        Ok(Self {
            values: values.to_vec(),
            parity,
        })
    }

    /// Odd averaging kernel over `2 * half_len - 1` samples.
    pub fn box_filter(half_len: usize) -> FilterResult<Self> {
        if half_len == 0 {
            return Err(FilterError::InvalidKernel(
                "box half-length must be positive".to_string(),
            ));
        }
        let weight = 1.0 / (2 * half_len - 1) as f64;
        Self::new(&vec![weight; half_len], Parity::Odd)
    }

    /// Odd Gaussian kernel with `half_len` taps per side, normalized to a
    /// sum of 1.
    pub fn gaussian(half_len: usize, sigma: f64) -> FilterResult<Self> {
        if half_len == 0 || !(sigma.is_finite() && sigma > 0.0) {
            return Err(FilterError::InvalidKernel(format!(
                "gaussian needs a positive half-length and sigma, got {half_len} and {sigma}"
            )));
        }
        let values: Vec<f64> = (0..half_len)
            .map(|i| {
                let d = i as f64;
                (-(d * d) / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let mut kernel = Self::new(&values, Parity::Odd)?;
        kernel.normalize()?;
        Ok(kernel)
    }

    /// Half-kernel that interpolates midway between two samples, used when
    /// decimating by an even factor.
    ///
    /// Nearest-neighbor has no such kernel.
    pub fn resample_half(interpolation: Interpolation) -> Option<Self> {
        let values = match interpolation {
            Interpolation::Nearest => return None,
            Interpolation::Bilinear => vec![0.5],
            Interpolation::Bicubic => vec![9.0 / 16.0, -1.0 / 16.0],
            Interpolation::Bicubic2 => vec![5.0 / 8.0, -1.0 / 8.0],
        };
        Some(Self {
            values,
            parity: Parity::Even,
        })
    }

    /// Half values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of half values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if there are no half values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parity
    pub fn parity(&self) -> Parity {
        self.parity
    }

    /// Number of taps of the full kernel
    pub fn support(&self) -> usize {
        2 * self.values.len() - self.parity.center_taps()
    }

    /// Sum of the full kernel
    pub fn sum(&self) -> f64 {
        let all: f64 = self.values.iter().sum();
        match self.parity {
            Parity::Odd => 2.0 * all - self.values[0],
            Parity::Even => 2.0 * all,
        }
    }

    /// Scale the values so the full kernel sums to 1.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidKernel`] when the sum is zero.
    pub fn normalize(&mut self) -> FilterResult<()> {
        let sum = self.sum();
        if sum == 0.0 || !sum.is_finite() {
            return Err(FilterError::InvalidKernel(format!(
                "cannot normalize a kernel summing to {sum}"
            )));
        }
        for v in &mut self.values {
            *v /= sum;
        }
        Ok(())
    }

    /// Materialize the full kernel, left to right.
    pub fn to_full(&self) -> Vec<f64> {
        let skip = self.parity.center_taps();
        self.values
            .iter()
            .skip(skip)
            .rev()
            .chain(self.values.iter())
            .copied()
            .collect()
    }

    /// Half of a symmetric full kernel.
    fn from_full(full: &[f64]) -> Self {
        let n = full.len();
        let parity = if n % 2 == 1 { Parity::Odd } else { Parity::Even };
        Self {
            values: full[n / 2..].to_vec(),
            parity,
        }
    }
}

/// Convolve two symmetric kernels.
///
/// The result is symmetric too; it is odd when both inputs have the same
/// parity and even otherwise.
pub fn convolve_symmetric_kernels(a: &SymmetricKernel, b: &SymmetricKernel) -> SymmetricKernel {
    let fa = a.to_full();
    let fb = b.to_full();
    let mut full = vec![0.0; fa.len() + fb.len() - 1];
    for (i, &va) in fa.iter().enumerate() {
        for (j, &vb) in fb.iter().enumerate() {
            full[i + j] += va * vb;
        }
    }
    SymmetricKernel::from_full(&full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_and_sum() {
        let k = SymmetricKernel::new(&[0.5, 0.25], Parity::Odd).unwrap();
        assert_eq!(k.support(), 3);
        assert_eq!(k.sum(), 1.0);
        assert_eq!(k.to_full(), vec![0.25, 0.5, 0.25]);

        let k = SymmetricKernel::new(&[0.375, 0.125], Parity::Even).unwrap();
        assert_eq!(k.support(), 4);
        assert_eq!(k.sum(), 1.0);
        assert_eq!(k.to_full(), vec![0.125, 0.375, 0.375, 0.125]);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(SymmetricKernel::new(&[], Parity::Odd).is_err());
        assert!(SymmetricKernel::new(&[f64::NAN], Parity::Odd).is_err());
        assert!(SymmetricKernel::box_filter(0).is_err());
        assert!(SymmetricKernel::gaussian(3, 0.0).is_err());
    }

    #[test]
    fn test_normalize() {
        let mut k = SymmetricKernel::new(&[2.0, 1.0], Parity::Even).unwrap();
        k.normalize().unwrap();
        assert_eq!(k.values(), &[1.0 / 3.0, 1.0 / 6.0]);
        let mut zero = SymmetricKernel::new(&[0.0], Parity::Odd).unwrap();
        assert!(zero.normalize().is_err());
    }

    #[test]
    fn test_box_and_gaussian() {
        let b = SymmetricKernel::box_filter(2).unwrap();
        assert_eq!(b.support(), 3);
        assert!((b.sum() - 1.0).abs() < 1e-12);

        let g = SymmetricKernel::gaussian(4, 1.5).unwrap();
        assert!((g.sum() - 1.0).abs() < 1e-12);
        assert!(g.values().windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_convolve_odd_even() {
        // [1] * [0.5, 0.5] = [0.5, 0.5]
        let id = SymmetricKernel::default();
        let half = SymmetricKernel::resample_half(Interpolation::Bilinear).unwrap();
        let k = convolve_symmetric_kernels(&id, &half);
        assert_eq!(k.parity(), Parity::Even);
        assert_eq!(k.values(), &[0.5]);

        // [0.25, 0.5, 0.25] * [0.5, 0.5] = [0.125, 0.375, 0.375, 0.125]
        let tri = SymmetricKernel::new(&[0.5, 0.25], Parity::Odd).unwrap();
        let k = convolve_symmetric_kernels(&tri, &half);
        assert_eq!(k.parity(), Parity::Even);
        assert_eq!(k.values(), &[0.375, 0.125]);
    }

    #[test]
    fn test_convolve_even_even_is_odd() {
        let half = SymmetricKernel::resample_half(Interpolation::Bilinear).unwrap();
        let k = convolve_symmetric_kernels(&half, &half);
        assert_eq!(k.parity(), Parity::Odd);
        assert_eq!(k.values(), &[0.5, 0.25]);
    }

    #[test]
    fn test_resample_halves_sum_to_one() {
        for interp in [Interpolation::Bilinear, Interpolation::Bicubic, Interpolation::Bicubic2] {
            let k = SymmetricKernel::resample_half(interp).unwrap();
            assert_eq!(k.sum(), 1.0);
        }
        assert!(SymmetricKernel::resample_half(Interpolation::Nearest).is_none());
    }
}
