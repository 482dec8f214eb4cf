//! Affine transformation matrix
//!
//! An affine transformation is stored as six coefficients:
//! ```text
//! | m00  m01  m02 |
//! | m10  m11  m12 |
//! |  0    0    1  |
//! ```
//!
//! The transformation equations are:
//! ```text
//! x' = m00*x + m01*y + m02
//! y' = m10*x + m11*y + m12
//! ```
//!
//! The resampler is configured with the forward (source to destination)
//! transform and walks destination pixels through its inverse.

use crate::{TransformError, TransformResult};
use tileops_core::Rect;

/// 2D affine transformation (6 coefficients, `f64`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AffineTransform {
    /// Coefficients `[m00, m01, m02, m10, m11, m12]`
    coeffs: [f64; 6],
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineTransform {
    /// Create the identity transformation
    pub fn identity() -> Self {
        Self::from_coeffs([1.0, 0.0, 0.0, 0.0, 1.0, 0.0])
    }

    /// Create from raw coefficients `[m00, m01, m02, m10, m11, m12]`
    pub fn from_coeffs(coeffs: [f64; 6]) -> Self {
        Self { coeffs }
    }

    /// Get the raw coefficients
    pub fn coeffs(&self) -> &[f64; 6] {
        &self.coeffs
    }

    /// Create a translation
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self::from_coeffs([1.0, 0.0, tx, 0.0, 1.0, ty])
    }

    /// Create a scaling about the origin
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self::from_coeffs([sx, 0.0, 0.0, 0.0, sy, 0.0])
    }

    /// Create a rotation by `angle` radians about `(center_x, center_y)`
    ///
    /// Positive angles rotate clockwise on screen (y axis points down).
    pub fn rotation(center_x: f64, center_y: f64, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_coeffs([
            cos,
            -sin,
            center_x - cos * center_x + sin * center_y,
            sin,
            cos,
            center_y - sin * center_x - cos * center_y,
        ])
    }

    /// Determinant of the linear part
    pub fn determinant(&self) -> f64 {
        let [m00, m01, _, m10, m11, _] = self.coeffs;
        m00 * m11 - m01 * m10
    }

    /// True if this is exactly the identity
    pub fn is_identity(&self) -> bool {
        self.coeffs == Self::identity().coeffs
    }

    /// Compute the inverse transformation
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::SingularMatrix`] when the determinant is
    /// zero or not finite.
    pub fn inverse(&self) -> TransformResult<Self> {
        let [m00, m01, m02, m10, m11, m12] = self.coeffs;
        let det = self.determinant();
        if !det.is_finite() || det.abs() < f64::MIN_POSITIVE {
            return Err(TransformError::SingularMatrix);
        }
        Ok(Self::from_coeffs([
            m11 / det,
            -m01 / det,
            (m01 * m12 - m11 * m02) / det,
            -m10 / det,
            m00 / det,
            (m10 * m02 - m00 * m12) / det,
        ]))
    }

    /// Compose two transformations (`self * other`)
    ///
    /// The result applies `other` first, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        let [a00, a01, a02, a10, a11, a12] = self.coeffs;
        let [b00, b01, b02, b10, b11, b12] = other.coeffs;
        Self::from_coeffs([
            a00 * b00 + a01 * b10,
            a00 * b01 + a01 * b11,
            a00 * b02 + a01 * b12 + a02,
            a10 * b00 + a11 * b10,
            a10 * b01 + a11 * b11,
            a10 * b02 + a11 * b12 + a12,
        ])
    }

    /// Transform a point through this matrix
    #[inline]
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        let [m00, m01, m02, m10, m11, m12] = self.coeffs;
        (m00 * x + m01 * y + m02, m10 * x + m11 * y + m12)
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of the four corners of
    /// `rect` after transformation
    pub fn transform_bounds(&self, rect: &Rect) -> (f64, f64, f64, f64) {
        let x0 = rect.x as f64;
        let y0 = rect.y as f64;
        let x1 = rect.right() as f64;
        let y1 = rect.bottom() as f64;
        let corners = [
            self.transform_point(x0, y0),
            self.transform_point(x1, y0),
            self.transform_point(x0, y1),
            self.transform_point(x1, y1),
        ];
        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }
}
