//! tileops-arith - Pixelwise arithmetic kernels
//!
//! Currently provides complex multiplication and division of two tiles
//! whose bands hold interleaved (real, imaginary) pairs, see
//! [`ComplexArithmetic`].

pub mod complex;
mod error;

pub use complex::{ComplexArithmetic, ComplexOp};
pub use error::{ArithError, ArithResult};
