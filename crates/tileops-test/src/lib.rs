//! tileops-test - Regression test framework for tileops
//!
//! This crate provides a small regression harness modeled on classic
//! image-library `*_reg` programs, plus builders for synthetic test tiles
//! (there is no image I/O in the workspace).
//!
//! # Usage
//!
//! ```ignore
//! use tileops_test::{RegParams, ramp};
//!
//! let mut rp = RegParams::new("affine");
//! rp.compare_values(255.0, value, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: set to "display" to print every comparison

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use tileops_core::{DataType, Raster, Rect, dispatch_sample_type};

/// Build a pixel-interleaved tile whose samples are `f(x, y, band)`.
///
/// Values are converted with half-up rounding and saturation.
pub fn from_fn<F>(bounds: Rect, num_bands: usize, data_type: DataType, f: F) -> TestResult<Raster>
where
    F: Fn(i32, i32, usize) -> f64,
{
    let mut samples = Vec::with_capacity(bounds.area().max(0) as usize * num_bands);
    for y in bounds.y..bounds.bottom() {
        for x in bounds.x..bounds.right() {
            for band in 0..num_bands {
                samples.push(f(x, y, band));
            }
        }
    }
    let raster = dispatch_sample_type!(data_type, T => {
        let typed: Vec<T> = samples
            .iter()
            .map(|&v| <T as tileops_core::Sample>::from_f64_round(v))
            .collect();
        Raster::from_samples(bounds, num_bands, typed)?
    });
    Ok(raster)
}

/// Tile with every sample equal to `value`.
pub fn constant(bounds: Rect, num_bands: usize, data_type: DataType, value: f64) -> TestResult<Raster> {
    from_fn(bounds, num_bands, data_type, |_, _, _| value)
}

/// Tile whose sample is `x + width * y + band`, relative to the origin.
pub fn ramp(bounds: Rect, num_bands: usize, data_type: DataType) -> TestResult<Raster> {
    let w = bounds.width as f64;
    from_fn(bounds, num_bands, data_type, |x, y, band| {
        (x - bounds.x) as f64 + w * (y - bounds.y) as f64 + band as f64
    })
}

/// Checkerboard of single pixels alternating between `low` and `high`.
pub fn checkerboard(
    bounds: Rect,
    num_bands: usize,
    data_type: DataType,
    low: f64,
    high: f64,
) -> TestResult<Raster> {
    from_fn(bounds, num_bands, data_type, |x, y, _| {
        if (x + y).rem_euclid(2) == 0 { low } else { high }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp() {
        let r = ramp(Rect::new(10, 10, 3, 2), 2, DataType::Short).unwrap();
        assert_eq!(r.get_sample(10, 10, 0), Some(0.0));
        assert_eq!(r.get_sample(12, 11, 1), Some(6.0));
    }

    #[test]
    fn test_checkerboard() {
        let r = checkerboard(Rect::new(0, 0, 2, 2), 1, DataType::Byte, 0.0, 200.0).unwrap();
        assert_eq!(r.get_sample(0, 0, 0), Some(0.0));
        assert_eq!(r.get_sample(1, 0, 0), Some(200.0));
        assert_eq!(r.get_sample(1, 1, 0), Some(0.0));
    }
}
