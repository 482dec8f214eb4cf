//! Alpha compositing ("over")
//!
//! Source 1 is placed over source 2. With alphas `a1`, `a2` normalized to
//! `[0, 1]` (integral alphas are divided by the type maximum, floating
//! alphas are used as is):
//!
//! ```text
//! straight:       c = s1*a1 + s2*a2*(1 - a1)
//! premultiplied:  c = s1 + s2*(1 - a1)
//! ```
//!
//! A missing source-2 alpha means source 2 is opaque (`a2 = 1`).
//!
//! When the destination carries an alpha band it receives
//! `a = a1 + a2*(1 - a1)` (opaque when source 2 is opaque) scaled back to the
//! type range, and straight colors are divided by `a`, with `0/0 = 0`.
//! Premultiplied colors are stored undivided.

use crate::{BlendError, BlendResult};
use tileops_core::{
    DataType, Raster, Rect, Sample, TileAccessor, TileAccessorMut, dispatch_sample_type,
};

/// Where the destination alpha band goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DestAlpha {
    /// Destination has color bands only
    #[default]
    None,
    /// Alpha is band 0, colors follow
    First,
    /// Colors first, alpha is the last band
    Last,
}

/// Options for [`AlphaCompositor`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompositeOptions {
    /// Source colors are premultiplied by their alpha
    pub premultiplied: bool,
    /// Destination alpha placement
    pub dest_alpha: DestAlpha,
}

impl CompositeOptions {
    /// Treat source colors as premultiplied
    pub fn with_premultiplied(mut self, premultiplied: bool) -> Self {
        self.premultiplied = premultiplied;
        self
    }

    /// Write a destination alpha band at `placement`
    pub fn with_dest_alpha(mut self, placement: DestAlpha) -> Self {
        self.dest_alpha = placement;
        self
    }
}

/// Alpha compositing operator
#[derive(Debug, Clone)]
pub struct AlphaCompositor {
    data_type: DataType,
    color_bands: usize,
    options: CompositeOptions,
    alpha_offset: Option<usize>,
    color_offset: usize,
}

impl AlphaCompositor {
    /// Create a compositor for sources with `color_bands` bands.
    ///
    /// # Errors
    ///
    /// Returns [`BlendError::InvalidParameters`] when `color_bands` is 0.
    pub fn new(
        data_type: DataType,
        color_bands: usize,
        options: CompositeOptions,
    ) -> BlendResult<Self> {
        if color_bands == 0 {
            return Err(BlendError::InvalidParameters(
                "compositing needs at least one color band".to_string(),
            ));
        }
        let (alpha_offset, color_offset) = match options.dest_alpha {
            DestAlpha::None => (None, 0),
            DestAlpha::First => (Some(0), 1),
            DestAlpha::Last => (Some(color_bands), 0),
        };

        tracing::debug!(
            %data_type,
            color_bands,
            premultiplied = options.premultiplied,
            dest_alpha = ?options.dest_alpha,
            "alpha compositor configured"
        );

        Ok(Self {
            data_type,
            color_bands,
            options,
            alpha_offset,
            color_offset,
        })
    }

    /// Options in effect
    pub fn options(&self) -> &CompositeOptions {
        &self.options
    }

    /// Destination band count (colors plus the optional alpha band)
    pub fn num_dest_bands(&self) -> usize {
        self.color_bands + usize::from(self.alpha_offset.is_some())
    }

    /// Composite `source1` (weighted by `alpha1`) over `source2` into
    /// `rect` of `dst`.
    ///
    /// `alpha2` is source 2's alpha; `None` makes source 2 opaque.
    ///
    /// # Errors
    ///
    /// Returns a core error if a tile has the wrong data type or band count
    /// (alphas must be single-band) or doesn't cover `rect`.
    pub fn compute_rect(
        &self,
        source1: &Raster,
        alpha1: &Raster,
        source2: &Raster,
        alpha2: Option<&Raster>,
        dst: &mut Raster,
        rect: &Rect,
    ) -> BlendResult<()> {
        for (tile, bands) in [
            (Some(source1), self.color_bands),
            (Some(source2), self.color_bands),
            (Some(alpha1), 1),
            (alpha2, 1),
        ] {
            if let Some(tile) = tile {
                tile.expect_data_type(self.data_type)?;
                tile.expect_bands(bands)?;
                tile.expect_covers(rect)?;
            }
        }
        dst.expect_data_type(self.data_type)?;
        dst.expect_bands(self.num_dest_bands())?;
        dst.expect_covers(rect)?;
        if rect.is_empty() {
            return Ok(());
        }
        tracing::trace!(?rect, opaque_source2 = alpha2.is_none(), "composite compute_rect");

        dispatch_sample_type!(self.data_type, T => {
            let alpha2 = match alpha2 {
                Some(a) => Some(a.accessor::<T>()?),
                None => None,
            };
            self.composite(
                &source1.accessor::<T>()?,
                &alpha1.accessor::<T>()?,
                &source2.accessor::<T>()?,
                alpha2.as_ref(),
                &mut dst.accessor_mut::<T>()?,
                rect,
            );
        });
        Ok(())
    }

    fn composite<T: Sample>(
        &self,
        s1: &TileAccessor<'_, T>,
        a1: &TileAccessor<'_, T>,
        s2: &TileAccessor<'_, T>,
        a2: Option<&TileAccessor<'_, T>>,
        dst: &mut TileAccessorMut<'_, T>,
        rect: &Rect,
    ) {
        let scale = T::full_scale();
        let premultiplied = self.options.premultiplied;
        let dst_bands = dst.band_offsets();

        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                let alpha1 = a1.get(x, y, 0).to_f64() / scale;
                let alpha2 = a2.map_or(1.0, |a| a.get(x, y, 0).to_f64() / scale);
                let under = 1.0 - alpha1;
                // destination coverage; exactly 1 over an opaque source 2
                let coverage = if a2.is_some() { alpha1 + alpha2 * under } else { 1.0 };

                let p1 = s1.pixel_offset(x, y);
                let p2 = s2.pixel_offset(x, y);
                let pd = dst.pixel_offset(x, y);
                let out = dst.samples_mut();

                for band in 0..self.color_bands {
                    let c1 = s1.samples()[p1 + s1.band_offset(band)].to_f64();
                    let c2 = s2.samples()[p2 + s2.band_offset(band)].to_f64();
                    let value = if premultiplied {
                        c1 + c2 * under
                    } else {
                        let mixed = c1 * alpha1 + c2 * alpha2 * under;
                        if self.alpha_offset.is_none() {
                            mixed
                        } else if coverage == 0.0 {
                            0.0
                        } else {
                            mixed / coverage
                        }
                    };
                    out[pd + dst_bands[self.color_offset + band]] = T::from_f64_round(value);
                }
                if let Some(alpha_band) = self.alpha_offset {
                    out[pd + dst_bands[alpha_band]] = T::from_f64_round(coverage * scale);
                }
            }
        }
    }
}
