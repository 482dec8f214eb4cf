//! Affine resampling regression test
//!
//! Checks the resampler against properties that hold for every data type:
//!   1. Identity + nearest neighbor reproduces the source
//!   2. Bicubic at integer-aligned positions reproduces the source
//!   3. A constant 4x4 RGB tile stays constant under bicubic identity,
//!      with the sentinel background on the border
//!   4. Clipped translation writes background exactly where the source
//!      doesn't reach
//!   5. Tiled computation equals whole-image computation, sample for
//!      sample, for every interpolation kind

use tileops_core::{DataType, Interpolation, Raster, Rect};
use tileops_test::{RegParams, constant, from_fn, ramp};
use tileops_transform::{AffineResampler, AffineTransform, ResampleOptions};

fn resample(
    src: &Raster,
    transform: AffineTransform,
    interpolation: Interpolation,
    background: Option<&[f64]>,
    dst_bounds: Rect,
) -> Raster {
    let mut options = ResampleOptions::default().with_interpolation(interpolation);
    if let Some(bg) = background {
        options = options.with_background(bg);
    }
    let op = AffineResampler::new(transform, src.data_type(), src.num_bands(), options).unwrap();
    let mut dst = Raster::new(dst_bounds, src.num_bands(), src.data_type()).unwrap();
    op.compute_rect(src, &mut dst, &dst_bounds).unwrap();
    dst
}

#[test]
fn affine_reg() {
    let mut rp = RegParams::new("affine");

    // --- 1. identity + nearest, every data type ---
    for data_type in DataType::ALL {
        let src = ramp(Rect::new(3, -2, 9, 7), 2, data_type).unwrap();
        let dst = resample(
            &src,
            AffineTransform::identity(),
            Interpolation::Nearest,
            None,
            src.bounds(),
        );
        rp.compare_rasters(&src, &dst, 0.0);
    }

    // --- 2. bicubic at integer-aligned mapping ---
    let src = from_fn(Rect::new(0, 0, 10, 8), 1, DataType::UShort, |x, y, _| {
        ((x * 7919 + y * 104729) % 65536) as f64
    })
    .unwrap();
    for interpolation in [
        Interpolation::Bicubic,
        Interpolation::Bicubic2,
        Interpolation::Bilinear,
    ] {
        let dst = resample(
            &src,
            AffineTransform::translation(-2.0, 1.0),
            interpolation,
            None,
            Rect::new(0, 0, 6, 6),
        );
        // dst (x, y) maps to src (x + 2, y - 1)
        for (x, y) in [(0, 2), (3, 3), (5, 5), (4, 2)] {
            rp.compare_values(
                src.get_sample(x + 2, y - 1, 0).unwrap(),
                dst.get_sample(x, y, 0).unwrap(),
                0.0,
            );
        }
    }

    // --- 3. constant 100, 4x4 3-band byte, bicubic identity ---
    let src = constant(Rect::new(0, 0, 4, 4), 3, DataType::Byte, 100.0).unwrap();
    let dst = resample(
        &src,
        AffineTransform::identity(),
        Interpolation::Bicubic,
        Some(&[0.0]),
        src.bounds(),
    );
    for y in 0..4 {
        for x in 0..4 {
            // only base 1 fits the 4x4 neighborhood in a 4-wide source
            let interior = x == 1 && y == 1;
            let expected = if interior { 100.0 } else { 0.0 };
            for band in 0..3 {
                rp.compare_values(expected, dst.get_sample(x, y, band).unwrap(), 0.0);
            }
        }
    }
    let src = constant(Rect::new(0, 0, 12, 12), 3, DataType::Byte, 100.0).unwrap();
    let dst = resample(
        &src,
        AffineTransform::rotation(6.0, 6.0, 0.1),
        Interpolation::Bicubic,
        Some(&[0.0]),
        src.bounds(),
    );
    rp.compare_values(100.0, dst.get_sample(6, 6, 1).unwrap(), 0.0);
    rp.compare_values(0.0, dst.get_sample(0, 0, 1).unwrap(), 0.0);

    // --- 4. translation with background ---
    let src = ramp(Rect::new(0, 0, 5, 5), 1, DataType::Short).unwrap();
    let dst = resample(
        &src,
        AffineTransform::translation(3.0, 0.0),
        Interpolation::Nearest,
        Some(&[-1.0]),
        Rect::new(0, 0, 10, 5),
    );
    for x in 0..10 {
        let expected = if (3..8).contains(&x) {
            src.get_sample(x - 3, 2, 0).unwrap()
        } else {
            -1.0
        };
        rp.compare_values(expected, dst.get_sample(x, 2, 0).unwrap(), 0.0);
    }

    // --- 5. tiles agree with a single pass ---
    let src = ramp(Rect::new(0, 0, 32, 32), 3, DataType::Float).unwrap();
    let transform = AffineTransform::rotation(16.0, 16.0, 0.35)
        .compose(&AffineTransform::scale(1.3, 0.8));
    let kinds = [
        Interpolation::Nearest,
        Interpolation::Bilinear,
        Interpolation::Bicubic,
        Interpolation::Bicubic2,
    ];
    for interpolation in kinds {
        let options = ResampleOptions::default()
            .with_interpolation(interpolation)
            .with_background(&[-5.0]);
        let op = AffineResampler::new(transform, DataType::Float, 3, options).unwrap();
        let bounds = op.dest_bounds(&src.bounds());

        let mut whole = Raster::new(bounds, 3, DataType::Float).unwrap();
        op.compute_rect(&src, &mut whole, &bounds).unwrap();

        let mut tiled = Raster::new(bounds, 3, DataType::Float).unwrap();
        for ty in (bounds.y..bounds.bottom()).step_by(8) {
            for tx in (bounds.x..bounds.right()).step_by(8) {
                let tile = Rect::new(tx, ty, 8, 8).intersect(&bounds).unwrap();
                op.compute_rect(&src, &mut tiled, &tile).unwrap();
            }
        }
        rp.compare_rasters(&whole, &tiled, 0.0);
    }

    assert!(rp.cleanup(), "affine regression test failed");
}
