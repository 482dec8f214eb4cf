//! Interpolation kinds
//!
//! The kind selects both the reconstruction filter used by the resampler
//! and the resample half-kernel used by the filtered subsampler. It also
//! fixes how many extra source pixels a kernel reads around the base
//! position, see [`Interpolation::padding`].

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Reconstruction filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interpolation {
    /// Nearest neighbor, no taps
    #[default]
    Nearest,
    /// 2x2 linear
    Bilinear,
    /// 4x4 cubic convolution with `a = -0.5` (Catmull-Rom)
    Bicubic,
    /// 4x4 cubic convolution with `a = -1.0`
    Bicubic2,
}

/// Extra source pixels needed on each side of the base position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Interpolation {
    /// Parse a kind by name.
    ///
    /// Accepts `nearest`, `bilinear`, `bicubic` and `bicubic2`
    /// (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for any other name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "nearest" => Ok(Interpolation::Nearest),
            "bilinear" => Ok(Interpolation::Bilinear),
            "bicubic" => Ok(Interpolation::Bicubic),
            "bicubic2" | "bicubic_2" => Ok(Interpolation::Bicubic2),
            other => Err(Error::InvalidParameter(format!(
                "unrecognized interpolation kind: {other}"
            ))),
        }
    }

    /// Canonical name.
    pub fn name(self) -> &'static str {
        match self {
            Interpolation::Nearest => "nearest",
            Interpolation::Bilinear => "bilinear",
            Interpolation::Bicubic => "bicubic",
            Interpolation::Bicubic2 => "bicubic2",
        }
    }

    /// Kernel width in pixels along one axis.
    pub fn width(self) -> i32 {
        match self {
            Interpolation::Nearest => 1,
            Interpolation::Bilinear => 2,
            Interpolation::Bicubic | Interpolation::Bicubic2 => 4,
        }
    }

    /// Source pixels read left/right/above/below the base pixel.
    pub fn padding(self) -> Padding {
        match self {
            Interpolation::Nearest => Padding::default(),
            Interpolation::Bilinear => Padding {
                left: 0,
                right: 1,
                top: 0,
                bottom: 1,
            },
            Interpolation::Bicubic | Interpolation::Bicubic2 => Padding {
                left: 1,
                right: 2,
                top: 1,
                bottom: 2,
            },
        }
    }

    /// True for [`Interpolation::Nearest`].
    pub fn is_nearest(self) -> bool {
        self == Interpolation::Nearest
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Interpolation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Interpolation::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(Interpolation::from_name("Bicubic").unwrap(), Interpolation::Bicubic);
        assert_eq!("nearest".parse::<Interpolation>().unwrap(), Interpolation::Nearest);
        assert!(Interpolation::from_name("lanczos").is_err());
    }

    #[test]
    fn test_padding() {
        assert_eq!(Interpolation::Nearest.padding(), Padding::default());
        let p = Interpolation::Bicubic2.padding();
        assert_eq!((p.left, p.right, p.top, p.bottom), (1, 2, 1, 2));
        assert_eq!(Interpolation::Bilinear.width(), 2);
    }
}
