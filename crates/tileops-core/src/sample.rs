//! Sample types and per-type numeric conversion rules
//!
//! Every kernel in this workspace is written once as a generic function over
//! [`Sample`] and instantiated for the six supported storage types:
//!
//! | [`DataType`] | Rust type | range |
//! |---|---|---|
//! | `Byte` | `u8` | `0..=255` |
//! | `UShort` | `u16` | `0..=65535` |
//! | `Short` | `i16` | `-32768..=32767` |
//! | `Int` | `i32` | `i32::MIN..=i32::MAX` |
//! | `Float` | `f32` | IEEE single |
//! | `Double` | `f64` | IEEE double |
//!
//! Computation happens in `f64`. Converting back to storage goes through one
//! of three rules, chosen by the kernel:
//!
//! - [`Sample::from_f64_round`]: round half up, saturate (integral);
//!   plain IEEE conversion (floating).
//! - [`Sample::from_f64_interp`]: the resampling rule. Unsigned types round
//!   half up, signed types round half away from zero; both saturate.
//!   Floating types convert without clamping.
//! - [`Sample::from_f64_clamp`]: integral as `from_f64_round`; floating
//!   types are clamped to their finite range instead of overflowing.
//!
//! `NaN` converts to zero for integral types.

use crate::raster::SampleBuffer;
use std::fmt;

/// Storage type of the samples in a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Unsigned 8-bit
    Byte,
    /// Unsigned 16-bit
    UShort,
    /// Signed 16-bit
    Short,
    /// Signed 32-bit
    Int,
    /// 32-bit IEEE float
    Float,
    /// 64-bit IEEE float
    Double,
}

impl DataType {
    /// All supported data types, narrowest first.
    pub const ALL: [DataType; 6] = [
        DataType::Byte,
        DataType::UShort,
        DataType::Short,
        DataType::Int,
        DataType::Float,
        DataType::Double,
    ];

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Byte => "byte",
            DataType::UShort => "ushort",
            DataType::Short => "short",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Double => "double",
        }
    }

    /// Size of one sample in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DataType::Byte => 1,
            DataType::UShort | DataType::Short => 2,
            DataType::Int | DataType::Float => 4,
            DataType::Double => 8,
        }
    }

    /// True for the four integer types.
    pub fn is_integral(self) -> bool {
        !matches!(self, DataType::Float | DataType::Double)
    }

    /// Smallest representable value (`-MAX` for floating types).
    pub fn min_value(self) -> f64 {
        match self {
            DataType::Byte => u8::MIN as f64,
            DataType::UShort => u16::MIN as f64,
            DataType::Short => i16::MIN as f64,
            DataType::Int => i32::MIN as f64,
            DataType::Float => -(f32::MAX as f64),
            DataType::Double => -f64::MAX,
        }
    }

    /// Largest representable value.
    pub fn max_value(self) -> f64 {
        match self {
            DataType::Byte => u8::MAX as f64,
            DataType::UShort => u16::MAX as f64,
            DataType::Short => i16::MAX as f64,
            DataType::Int => i32::MAX as f64,
            DataType::Float => f32::MAX as f64,
            DataType::Double => f64::MAX,
        }
    }

    /// Value that represents an opaque alpha sample.
    ///
    /// Integral alphas span `0..=max`; floating alphas are normalized to
    /// `0.0..=1.0`.
    pub fn full_scale(self) -> f64 {
        if self.is_integral() {
            self.max_value()
        } else {
            1.0
        }
    }

    /// Convert `value` into this type's range with half-up rounding.
    ///
    /// Floating types return the value unchanged. Used to pre-clamp
    /// construction-time constants such as backgrounds and thresholds.
    pub fn round_and_clamp(self, value: f64) -> f64 {
        if self.is_integral() {
            clamp_integral((value + 0.5).floor(), self.min_value(), self.max_value())
        } else {
            value
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
fn clamp_integral(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(min, max)
    }
}

/// A storage sample type.
///
/// Implemented for `u8`, `u16`, `i16`, `i32`, `f32` and `f64`.
pub trait Sample: Copy + PartialEq + PartialOrd + Default + fmt::Debug + Send + Sync + 'static {
    /// Runtime tag of this type.
    const DATA_TYPE: DataType;

    /// Widen to `f64` without loss.
    fn to_f64(self) -> f64;

    /// Round half up and saturate (integral); IEEE conversion (floating).
    fn from_f64_round(value: f64) -> Self;

    /// Resampling conversion: unsigned half-up, signed half-away-from-zero,
    /// floating unclamped.
    fn from_f64_interp(value: f64) -> Self;

    /// Integral as [`Sample::from_f64_round`]; floating clamped to the
    /// finite range.
    fn from_f64_clamp(value: f64) -> Self;

    /// Borrow a typed slice if `buffer` holds this type.
    fn slice(buffer: &SampleBuffer) -> Option<&[Self]>;

    /// Mutably borrow a typed slice if `buffer` holds this type.
    fn slice_mut(buffer: &mut SampleBuffer) -> Option<&mut [Self]>;

    /// Wrap a vector of this type into a [`SampleBuffer`].
    fn into_buffer(samples: Vec<Self>) -> SampleBuffer;

    /// Value of an opaque alpha sample, see [`DataType::full_scale`].
    #[inline]
    fn full_scale() -> f64 {
        Self::DATA_TYPE.full_scale()
    }

    /// True when this is an integer type.
    #[inline]
    fn is_integral() -> bool {
        Self::DATA_TYPE.is_integral()
    }
}

macro_rules! integral_sample {
    ($t:ty, $variant:ident, $interp:expr) => {
        impl Sample for $t {
            const DATA_TYPE: DataType = DataType::$variant;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64_round(value: f64) -> Self {
                clamp_integral((value + 0.5).floor(), <$t>::MIN as f64, <$t>::MAX as f64) as $t
            }

            #[inline]
            fn from_f64_interp(value: f64) -> Self {
                let rounded: fn(f64) -> f64 = $interp;
                clamp_integral(rounded(value), <$t>::MIN as f64, <$t>::MAX as f64) as $t
            }

            #[inline]
            fn from_f64_clamp(value: f64) -> Self {
                Self::from_f64_round(value)
            }

            fn slice(buffer: &SampleBuffer) -> Option<&[Self]> {
                match buffer {
                    SampleBuffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn slice_mut(buffer: &mut SampleBuffer) -> Option<&mut [Self]> {
                match buffer {
                    SampleBuffer::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn into_buffer(samples: Vec<Self>) -> SampleBuffer {
                SampleBuffer::$variant(samples)
            }
        }
    };
}

// unsigned: half up; signed: f64::round is half away from zero
integral_sample!(u8, Byte, |v| (v + 0.5).floor());
integral_sample!(u16, UShort, |v| (v + 0.5).floor());
integral_sample!(i16, Short, f64::round);
integral_sample!(i32, Int, f64::round);

impl Sample for f32 {
    const DATA_TYPE: DataType = DataType::Float;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn from_f64_round(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn from_f64_interp(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn from_f64_clamp(value: f64) -> Self {
        if value.is_nan() {
            f32::NAN
        } else {
            value.clamp(-(f32::MAX as f64), f32::MAX as f64) as f32
        }
    }

    fn slice(buffer: &SampleBuffer) -> Option<&[Self]> {
        match buffer {
            SampleBuffer::Float(v) => Some(v),
            _ => None,
        }
    }

    fn slice_mut(buffer: &mut SampleBuffer) -> Option<&mut [Self]> {
        match buffer {
            SampleBuffer::Float(v) => Some(v),
            _ => None,
        }
    }

    fn into_buffer(samples: Vec<Self>) -> SampleBuffer {
        SampleBuffer::Float(samples)
    }
}

impl Sample for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64_round(value: f64) -> Self {
        value
    }

    #[inline]
    fn from_f64_interp(value: f64) -> Self {
        value
    }

    #[inline]
    fn from_f64_clamp(value: f64) -> Self {
        value
    }

    fn slice(buffer: &SampleBuffer) -> Option<&[Self]> {
        match buffer {
            SampleBuffer::Double(v) => Some(v),
            _ => None,
        }
    }

    fn slice_mut(buffer: &mut SampleBuffer) -> Option<&mut [Self]> {
        match buffer {
            SampleBuffer::Double(v) => Some(v),
            _ => None,
        }
    }

    fn into_buffer(samples: Vec<Self>) -> SampleBuffer {
        SampleBuffer::Double(samples)
    }
}

/// Call a generic function instantiated for the Rust type of `$dt`.
///
/// ```
/// use tileops_core::{DataType, Sample, dispatch_sample_type};
///
/// fn width_of<T: Sample>() -> usize {
///     std::mem::size_of::<T>()
/// }
///
/// let n = dispatch_sample_type!(DataType::UShort, T => width_of::<T>());
/// assert_eq!(n, 2);
/// ```
#[macro_export]
macro_rules! dispatch_sample_type {
    ($dt:expr, $T:ident => $body:expr) => {
        match $dt {
            $crate::DataType::Byte => {
                type $T = u8;
                $body
            }
            $crate::DataType::UShort => {
                type $T = u16;
                $body
            }
            $crate::DataType::Short => {
                type $T = i16;
                $body
            }
            $crate::DataType::Int => {
                type $T = i32;
                $body
            }
            $crate::DataType::Float => {
                type $T = f32;
                $body
            }
            $crate::DataType::Double => {
                type $T = f64;
                $body
            }
        }
    };
}
