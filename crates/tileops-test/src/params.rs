//! Comparison state of one regression run

use crate::error::TestError;
use tileops_core::Raster;

/// How much a regression run prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Print failures and the final verdict
    #[default]
    Compare,
    /// Also print every comparison as it happens
    Display,
}

impl RegTestMode {
    /// Read `REGTEST_MODE`; only `display` (any case) selects
    /// [`RegTestMode::Display`].
    pub fn from_env() -> Self {
        let value = std::env::var("REGTEST_MODE").unwrap_or_default();
        if value.eq_ignore_ascii_case("display") {
            Self::Display
        } else {
            Self::Compare
        }
    }
}

/// State of one `*_reg` run
///
/// Comparisons are numbered from 1 in the order they are made. A failed
/// comparison is reported immediately and recorded; the run keeps going so
/// one test reports every mismatch, and [`RegParams::cleanup`] gives the
/// verdict.
pub struct RegParams {
    /// Run name, printed as `<name>_reg`
    pub test_name: String,
    index: usize,
    /// Verbosity
    pub mode: RegTestMode,
    failures: Vec<TestError>,
}

impl RegParams {
    /// Start a run called `test_name`, taking the mode from the
    /// environment.
    pub fn new(test_name: &str) -> Self {
        let mode = RegTestMode::from_env();
        let title = format!("{test_name}_reg");
        eprintln!("\n{:/^48}", format!("   {title}   "));
        eprintln!("mode: {mode:?}");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            failures: Vec::new(),
        }
    }

    /// Number of the most recent comparison
    pub fn index(&self) -> usize {
        self.index
    }

    /// True in [`RegTestMode::Display`]
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    /// Check `|expected - actual| <= delta`. Two NaNs match.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        if self.display() {
            eprintln!("  #{}: {expected} vs {actual} (delta {delta})", self.index);
        }
        if samples_match(expected, actual, delta) {
            return true;
        }
        self.record(TestError::ValueMismatch {
            index: self.index,
            expected,
            actual,
            delta,
        })
    }

    /// Check two rasters for equal bounds, band count and data type, and
    /// samples that agree within `delta`. Only the first differing sample
    /// is reported.
    pub fn compare_rasters(&mut self, expected: &Raster, actual: &Raster, delta: f64) -> bool {
        self.index += 1;
        if self.display() {
            eprintln!("  #{}: raster {:?} (delta {delta})", self.index, expected.bounds());
        }

        let shape = |r: &Raster| (r.bounds(), r.num_bands(), r.data_type());
        if shape(expected) != shape(actual) {
            let detail = format!("shape {:?} vs {:?}", shape(expected), shape(actual));
            return self.record(TestError::RasterMismatch {
                index: self.index,
                detail,
            });
        }

        let bounds = expected.bounds();
        let first_diff = (bounds.y..bounds.bottom())
            .flat_map(|y| (bounds.x..bounds.right()).map(move |x| (x, y)))
            .flat_map(|(x, y)| (0..expected.num_bands()).map(move |band| (x, y, band)))
            .find_map(|(x, y, band)| {
                let e = expected.get_sample(x, y, band).unwrap_or(f64::NAN);
                let a = actual.get_sample(x, y, band).unwrap_or(f64::NAN);
                (!samples_match(e, a, delta)).then(|| format!("({x}, {y}) band {band}: {e} vs {a}"))
            });
        match first_diff {
            None => true,
            Some(detail) => self.record(TestError::RasterMismatch {
                index: self.index,
                detail,
            }),
        }
    }

    fn record(&mut self, failure: TestError) -> bool {
        eprintln!("{}_reg: {failure}", self.test_name);
        self.failures.push(failure);
        false
    }

    /// Finish the run, print the verdict and every recorded failure.
    ///
    /// Returns `true` when nothing failed.
    pub fn cleanup(self) -> bool {
        let passed = self.failures.is_empty();
        let verdict = if passed { "SUCCESS" } else { "FAILURE" };
        eprintln!("{verdict}: {}_reg ({} comparisons)", self.test_name, self.index);
        for failure in &self.failures {
            eprintln!("  {failure}");
        }
        passed
    }

    /// True while no comparison has failed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures recorded so far
    pub fn failures(&self) -> &[TestError] {
        &self.failures
    }
}

fn samples_match(expected: f64, actual: f64, delta: f64) -> bool {
    (expected - actual).abs() <= delta || (expected.is_nan() && actual.is_nan())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tileops_core::{DataType, Rect};

    #[test]
    fn test_values_exact_and_tolerant() {
        let mut rp = RegParams::new("values");
        assert!(rp.compare_values(42.0, 42.0, 0.0));
        assert!(rp.compare_values(-3.0, -3.25, 0.5));
        assert!(rp.compare_values(f64::NAN, f64::NAN, 0.0));
        assert!(rp.is_success());
        assert_eq!(rp.index(), 3);
    }

    #[test]
    fn test_value_mismatch_is_recorded() {
        let mut rp = RegParams::new("mismatch");
        assert!(!rp.compare_values(1.0, 2.0, 0.5));
        assert!(!rp.compare_values(f64::NAN, 0.0, 1.0));
        assert_eq!(rp.failures().len(), 2);
        assert!(matches!(rp.failures()[0], TestError::ValueMismatch { index: 1, .. }));
        assert!(!rp.cleanup());
    }

    #[test]
    fn test_compare_rasters() {
        let mut rp = RegParams::new("rasters");
        let a = Raster::new(Rect::new(0, 0, 2, 2), 1, DataType::Byte).unwrap();
        let mut b = a.clone();
        assert!(rp.compare_rasters(&a, &b, 0.0));
        b.set_sample(1, 1, 0, 3.0).unwrap();
        assert!(!rp.compare_rasters(&a, &b, 0.0));
        assert!(rp.compare_rasters(&a, &b, 3.0));
        let c = Raster::new(Rect::new(0, 0, 2, 2), 2, DataType::Byte).unwrap();
        assert!(!rp.compare_rasters(&a, &c, 255.0));
        assert_eq!(rp.index(), 4);
        assert_eq!(rp.failures().len(), 2);
    }
}
