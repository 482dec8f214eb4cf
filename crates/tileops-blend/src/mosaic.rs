//! Mosaicking of N sources
//!
//! Each source is weighted per pixel by exactly one policy, fixed when the
//! operator is built:
//!
//! 1. **alpha** when the source is declared with an alpha channel
//! 2. **ROI** when it has a region of interest
//! 3. **threshold** otherwise: a band counts when its sample is at least the
//!    source's threshold for that band
//!
//! In [`MosaicType::Overlay`] mode, sources are visited in order and the
//! first with a non-zero weight supplies the destination sample verbatim.
//! In [`MosaicType::Blend`] mode, samples are averaged with their weights.
//! Pixels without any contribution get the background.
//!
//! Alpha weights are binary (any non-zero alpha is weight 1) unless the
//! mode is blend and every source has an alpha channel; then the weight is
//! the normalized alpha.
//!
//! A source tile may be absent for a given destination tile; it then
//! contributes nothing and its alpha and ROI are not consulted. Pixels
//! outside a present source tile contribute nothing either.

use crate::{BlendError, BlendResult};
use std::sync::Arc;
use tileops_core::{
    Background, DataType, Raster, Rect, RegionOfInterest, Sample, TileAccessor, TileAccessorMut,
    dispatch_sample_type,
};

/// How sources are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MosaicType {
    /// First source with a non-zero weight wins
    #[default]
    Overlay,
    /// Weighted average of all sources
    Blend,
}

/// Weight policy resolved for one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightPolicy {
    /// Weighted by an alpha tile
    Alpha,
    /// Weighted by a region of interest
    Roi,
    /// Weighted by per-band thresholds
    Threshold,
}

/// Options for [`Mosaic`]
///
/// Per-source vectors may be shorter than the number of sources; missing
/// entries mean "no alpha", "no ROI" and "repeat the first threshold list".
#[derive(Debug, Clone, Default)]
pub struct MosaicOptions {
    /// Combination mode
    pub mosaic_type: MosaicType,
    /// Sources that supply an alpha tile
    pub source_alpha: Vec<bool>,
    /// Regions of interest per source
    pub source_roi: Vec<Option<Arc<dyn RegionOfInterest>>>,
    /// Thresholds per source and band (default `[[1.0]]`)
    pub thresholds: Vec<Vec<f64>>,
    /// Background per band (default `[0.0]`)
    pub background: Vec<f64>,
}

impl MosaicOptions {
    /// Set the combination mode
    pub fn with_type(mut self, mosaic_type: MosaicType) -> Self {
        self.mosaic_type = mosaic_type;
        self
    }

    /// Declare which sources supply alpha tiles
    pub fn with_alpha(mut self, source_alpha: &[bool]) -> Self {
        self.source_alpha = source_alpha.to_vec();
        self
    }

    /// Attach a region of interest to `source`
    pub fn with_roi(mut self, source: usize, roi: Arc<dyn RegionOfInterest>) -> Self {
        if self.source_roi.len() <= source {
            self.source_roi.resize(source + 1, None);
        }
        self.source_roi[source] = Some(roi);
        self
    }

    /// Set per-source, per-band thresholds
    pub fn with_thresholds(mut self, thresholds: Vec<Vec<f64>>) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the background
    pub fn with_background(mut self, values: &[f64]) -> Self {
        self.background = values.to_vec();
        self
    }
}

/// Tiles of one source for one destination tile
#[derive(Debug, Clone, Copy, Default)]
pub struct MosaicInput<'a> {
    /// Source samples; `None` when the source doesn't reach this tile
    pub source: Option<&'a Raster>,
    /// Alpha samples, required for alpha-weighted sources
    pub alpha: Option<&'a Raster>,
}

impl<'a> MosaicInput<'a> {
    /// Source without alpha
    pub fn new(source: &'a Raster) -> Self {
        Self {
            source: Some(source),
            alpha: None,
        }
    }

    /// Source with alpha
    pub fn with_alpha(source: &'a Raster, alpha: &'a Raster) -> Self {
        Self {
            source: Some(source),
            alpha: Some(alpha),
        }
    }

    /// Source absent from this tile
    pub fn absent() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
struct SourceWeight {
    policy: WeightPolicy,
    roi: Option<Arc<dyn RegionOfInterest>>,
    thresholds: Vec<f64>,
}

/// Mosaic operator
#[derive(Debug, Clone)]
pub struct Mosaic {
    mosaic_type: MosaicType,
    data_type: DataType,
    num_bands: usize,
    weights: Vec<SourceWeight>,
    background: Background,
    alpha_bitmask: bool,
}

impl Mosaic {
    /// Create a mosaic of `num_sources` sources with `num_bands` bands.
    ///
    /// # Errors
    ///
    /// Returns [`BlendError::InvalidParameters`] for zero sources or bands,
    /// per-source vectors longer than the source count, or an empty
    /// threshold list.
    pub fn new(
        num_sources: usize,
        data_type: DataType,
        num_bands: usize,
        options: MosaicOptions,
    ) -> BlendResult<Self> {
        if num_sources == 0 || num_bands == 0 {
            return Err(BlendError::InvalidParameters(format!(
                "mosaic needs sources and bands, got {num_sources} sources of {num_bands} bands"
            )));
        }
        let too_long = [
            ("alpha", options.source_alpha.len()),
            ("roi", options.source_roi.len()),
            ("threshold", options.thresholds.len()),
        ]
        .into_iter()
        .find(|&(_, len)| len > num_sources);
        if let Some((what, len)) = too_long {
            return Err(BlendError::InvalidParameters(format!(
                "{len} {what} entries for {num_sources} sources"
            )));
        }
        if options.thresholds.iter().any(Vec::is_empty) {
            return Err(BlendError::InvalidParameters(
                "threshold lists need at least one value".to_string(),
            ));
        }

        let default_thresholds = vec![1.0];
        let first_thresholds = options.thresholds.first().unwrap_or(&default_thresholds);
        let weights: Vec<SourceWeight> = (0..num_sources)
            .map(|i| {
                let has_alpha = options.source_alpha.get(i).copied().unwrap_or(false);
                let roi = options.source_roi.get(i).cloned().flatten();
                let policy = if has_alpha {
                    WeightPolicy::Alpha
                } else if roi.is_some() {
                    WeightPolicy::Roi
                } else {
                    WeightPolicy::Threshold
                };
                let list = options.thresholds.get(i).unwrap_or(first_thresholds);
                let thresholds = (0..num_bands)
                    .map(|b| data_type.round_and_clamp(list.get(b).copied().unwrap_or(list[0])))
                    .collect();
                SourceWeight {
                    policy,
                    roi,
                    thresholds,
                }
            })
            .collect();

        let background = if options.background.is_empty() {
            Background::zeros(num_bands, data_type)
        } else {
            Background::new(&options.background, num_bands, data_type)?
        };

        let all_alpha = weights.iter().all(|w| w.policy == WeightPolicy::Alpha);
        let alpha_bitmask = !(options.mosaic_type == MosaicType::Blend && all_alpha);

        tracing::debug!(
            mosaic_type = ?options.mosaic_type,
            %data_type,
            num_sources,
            num_bands,
            policies = ?weights.iter().map(|w| w.policy).collect::<Vec<_>>(),
            alpha_bitmask,
            background = ?background.values(),
            "mosaic configured"
        );

        Ok(Self {
            mosaic_type: options.mosaic_type,
            data_type,
            num_bands,
            weights,
            background,
            alpha_bitmask,
        })
    }

    /// Combination mode
    pub fn mosaic_type(&self) -> MosaicType {
        self.mosaic_type
    }

    /// Number of sources
    pub fn num_sources(&self) -> usize {
        self.weights.len()
    }

    /// Resolved weight policy of `source`
    pub fn policy(&self, source: usize) -> Option<WeightPolicy> {
        self.weights.get(source).map(|w| w.policy)
    }

    /// True when alpha weights are treated as on/off
    pub fn is_alpha_bitmask(&self) -> bool {
        self.alpha_bitmask
    }

    /// Background in effect
    pub fn background(&self) -> &Background {
        &self.background
    }

    /// Bounds of the mosaic: the union of all source bounds.
    pub fn dest_bounds(source_bounds: &[Rect]) -> Rect {
        source_bounds
            .iter()
            .fold(Rect::default(), |acc, r| acc.union(r))
    }

    /// Compute `rect` of `dst` from one input per source.
    ///
    /// # Errors
    ///
    /// Returns [`BlendError::SourceCountMismatch`] if `inputs` has the
    /// wrong length, [`BlendError::MissingAlpha`] if an alpha-weighted
    /// source is present without its alpha tile, and a core error for tiles
    /// of the wrong data type or band count.
    pub fn compute_rect(
        &self,
        inputs: &[MosaicInput<'_>],
        dst: &mut Raster,
        rect: &Rect,
    ) -> BlendResult<()> {
        if inputs.len() != self.weights.len() {
            return Err(BlendError::SourceCountMismatch {
                expected: self.weights.len(),
                actual: inputs.len(),
            });
        }
        for (i, (input, weight)) in inputs.iter().zip(&self.weights).enumerate() {
            let Some(source) = input.source else {
                continue;
            };
            source.expect_data_type(self.data_type)?;
            source.expect_bands(self.num_bands)?;
            if weight.policy == WeightPolicy::Alpha {
                let alpha = input.alpha.ok_or(BlendError::MissingAlpha { source_index: i })?;
                alpha.expect_data_type(self.data_type)?;
                alpha.expect_bands(1)?;
            }
        }
        dst.expect_data_type(self.data_type)?;
        dst.expect_bands(self.num_bands)?;
        dst.expect_covers(rect)?;
        if rect.is_empty() {
            return Ok(());
        }
        tracing::trace!(
            ?rect,
            present = inputs.iter().filter(|i| i.source.is_some()).count(),
            "mosaic compute_rect"
        );

        dispatch_sample_type!(self.data_type, T => {
            let mut views = Vec::with_capacity(inputs.len());
            for (input, weight) in inputs.iter().zip(&self.weights) {
                let Some(source) = input.source else {
                    continue;
                };
                let alpha = match (weight.policy, input.alpha) {
                    (WeightPolicy::Alpha, Some(a)) => Some(a.accessor::<T>()?),
                    _ => None,
                };
                views.push(SourceView {
                    samples: source.accessor::<T>()?,
                    alpha,
                    weight,
                    alpha_bitmask: self.alpha_bitmask,
                });
            }
            let background = self.background.samples::<T>();
            let mut out = dst.accessor_mut::<T>()?;
            match self.mosaic_type {
                MosaicType::Overlay => overlay(&views, &mut out, rect, &background),
                MosaicType::Blend => blend(&views, &mut out, rect, &background),
            }
        });
        Ok(())
    }
}

/// One present source during a tile computation
struct SourceView<'a, T: Sample> {
    samples: TileAccessor<'a, T>,
    alpha: Option<TileAccessor<'a, T>>,
    weight: &'a SourceWeight,
    alpha_bitmask: bool,
}

impl<T: Sample> SourceView<'_, T> {
    /// Weight of band `band` at `(x, y)`, in `[0, 1]`.
    #[inline]
    fn weight(&self, x: i32, y: i32, band: usize, sample: T) -> f64 {
        match self.weight.policy {
            WeightPolicy::Alpha => {
                let Some(alpha) = self.alpha.as_ref().filter(|a| a.bounds().contains_point(x, y))
                else {
                    return 0.0;
                };
                let a = alpha.get(x, y, 0).to_f64();
                if self.alpha_bitmask {
                    if a != 0.0 { 1.0 } else { 0.0 }
                } else {
                    a / T::full_scale()
                }
            }
            WeightPolicy::Roi => match &self.weight.roi {
                Some(roi) if roi.contains(x, y) => 1.0,
                _ => 0.0,
            },
            WeightPolicy::Threshold => {
                if sample.to_f64() >= self.weight.thresholds[band] {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

fn overlay<T: Sample>(
    views: &[SourceView<'_, T>],
    dst: &mut TileAccessorMut<'_, T>,
    rect: &Rect,
    background: &[T],
) {
    let dst_bands = dst.band_offsets();
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let pd = dst.pixel_offset(x, y);
            let out = dst.samples_mut();
            for (band, &db) in dst_bands.iter().enumerate() {
                let value = views
                    .iter()
                    .filter(|v| v.samples.bounds().contains_point(x, y))
                    .map(|v| (v, v.samples.get(x, y, band)))
                    .find(|&(v, sample)| v.weight(x, y, band, sample) > 0.0)
                    .map_or(background[band], |(_, sample)| sample);
                out[pd + db] = value;
            }
        }
    }
}

fn blend<T: Sample>(
    views: &[SourceView<'_, T>],
    dst: &mut TileAccessorMut<'_, T>,
    rect: &Rect,
    background: &[T],
) {
    let dst_bands = dst.band_offsets();
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            let pd = dst.pixel_offset(x, y);
            let out = dst.samples_mut();
            for (band, &db) in dst_bands.iter().enumerate() {
                let mut numerator = 0.0;
                let mut denominator = 0.0;
                for view in views {
                    if !view.samples.bounds().contains_point(x, y) {
                        continue;
                    }
                    let sample = view.samples.get(x, y, band);
                    let w = view.weight(x, y, band, sample);
                    numerator += w * sample.to_f64();
                    denominator += w;
                }
                out[pd + db] = if denominator == 0.0 {
                    background[band]
                } else {
                    T::from_f64_round(numerator / denominator)
                };
            }
        }
    }
}
