//! Background values
//!
//! A background supplies one value per destination band for pixels that
//! receive no contribution from any source. Values for integral data types
//! are rounded half up and clamped to the destination range once, when the
//! operator is constructed, so the inner loops store them verbatim.

use crate::error::{Error, Result};
use crate::sample::{DataType, Sample};

/// Per-band fill values already converted to a destination data type
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    data_type: DataType,
    values: Vec<f64>,
}

impl Background {
    /// Build a background for `num_bands` bands of `data_type`.
    ///
    /// If fewer values than bands are given, the first value is repeated
    /// for the remaining bands.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] if `values` is empty or
    /// `num_bands` is zero.
    pub fn new(values: &[f64], num_bands: usize, data_type: DataType) -> Result<Self> {
        let Some(&first) = values.first() else {
            return Err(Error::InvalidParameter(
                "background needs at least one value".to_string(),
            ));
        };
        if num_bands == 0 {
            return Err(Error::InvalidParameter(
                "background needs at least one band".to_string(),
            ));
        }

        let values: Vec<f64> = (0..num_bands)
            .map(|b| {
                let raw = values.get(b).copied().unwrap_or(first);
                let converted = data_type.round_and_clamp(raw);
                if converted != raw {
                    tracing::debug!(band = b, raw, converted, %data_type, "background value clamped");
                }
                converted
            })
            .collect();

        Ok(Self { data_type, values })
    }

    /// All-zero background.
    pub fn zeros(num_bands: usize, data_type: DataType) -> Self {
        Self {
            data_type,
            values: vec![0.0; num_bands.max(1)],
        }
    }

    /// Destination data type the values were converted for.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Number of bands.
    pub fn num_bands(&self) -> usize {
        self.values.len()
    }

    /// Converted value of `band`.
    pub fn value(&self, band: usize) -> f64 {
        self.values[band]
    }

    /// All converted values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values as typed samples, ready to store.
    pub fn samples<T: Sample>(&self) -> Vec<T> {
        self.values.iter().map(|&v| T::from_f64_round(v)).collect()
    }
}
