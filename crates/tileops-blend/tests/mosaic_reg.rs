//! Mosaic regression test
//!
//!   1. a single fully-weighted source is copied; no contribution gives
//!      the background
//!   2. overlay order: earlier sources win where they overlap
//!   3. region-of-interest weighting with a rectangle and a mask
//!   4. blending with normalized alpha versus bitmask alpha
//!   5. sources whose tile is absent or doesn't reach a pixel are skipped

use std::sync::Arc;
use tileops_blend::{Mosaic, MosaicInput, MosaicOptions, MosaicType, WeightPolicy};
use tileops_core::{DataType, Raster, Rect, RoiMask};
use tileops_test::{RegParams, constant, from_fn, ramp};

fn run(m: &Mosaic, inputs: &[MosaicInput<'_>], bounds: Rect, bands: usize, dt: DataType) -> Raster {
    let mut dst = Raster::new(bounds, bands, dt).unwrap();
    m.compute_rect(inputs, &mut dst, &bounds).unwrap();
    dst
}

#[test]
fn mosaic_reg() {
    let mut rp = RegParams::new("mosaic");
    let bounds = Rect::new(0, 0, 10, 8);

    // --- 1. single source and background ---
    for data_type in [DataType::Byte, DataType::Short, DataType::Double] {
        let src = from_fn(bounds, 2, data_type, |x, y, b| (1 + x + y * 10) as f64 + b as f64)
            .unwrap();
        let m = Mosaic::new(1, data_type, 2, MosaicOptions::default()).unwrap();
        let out = run(&m, &[MosaicInput::new(&src)], bounds, 2, data_type);
        rp.compare_rasters(&src, &out, 0.0);

        let dark = constant(bounds, 2, data_type, 0.0).unwrap();
        let m = Mosaic::new(
            1,
            data_type,
            2,
            MosaicOptions::default().with_background(&[12.0, 34.0]),
        )
        .unwrap();
        let out = run(&m, &[MosaicInput::new(&dark)], bounds, 2, data_type);
        let expected = from_fn(bounds, 2, data_type, |_, _, b| [12.0, 34.0][b]).unwrap();
        rp.compare_rasters(&expected, &out, 0.0);
    }

    // --- 2. overlay order ---
    let left = constant(Rect::new(0, 0, 6, 8), 1, DataType::Byte, 100.0).unwrap();
    let right = constant(Rect::new(4, 0, 6, 8), 1, DataType::Byte, 200.0).unwrap();
    let m = Mosaic::new(2, DataType::Byte, 1, MosaicOptions::default()).unwrap();
    let out = run(
        &m,
        &[MosaicInput::new(&left), MosaicInput::new(&right)],
        bounds,
        1,
        DataType::Byte,
    );
    rp.compare_values(100.0, out.get_sample(1, 3, 0).unwrap(), 0.0);
    rp.compare_values(100.0, out.get_sample(5, 3, 0).unwrap(), 0.0);
    rp.compare_values(200.0, out.get_sample(8, 3, 0).unwrap(), 0.0);
    let out = run(
        &m,
        &[MosaicInput::new(&right), MosaicInput::new(&left)],
        bounds,
        1,
        DataType::Byte,
    );
    rp.compare_values(200.0, out.get_sample(5, 3, 0).unwrap(), 0.0);

    // --- 3. region of interest ---
    let a = constant(bounds, 1, DataType::UShort, 1000.0).unwrap();
    let b = constant(bounds, 1, DataType::UShort, 2000.0).unwrap();
    let mask = from_fn(bounds, 1, DataType::Byte, |x, _, _| if x >= 7 { 1.0 } else { 0.0 })
        .unwrap();
    let options = MosaicOptions::default()
        .with_roi(0, Arc::new(Rect::new(0, 0, 3, 8)))
        .with_roi(1, Arc::new(RoiMask::new(mask).unwrap()))
        .with_background(&[5.0]);
    let m = Mosaic::new(2, DataType::UShort, 1, options).unwrap();
    rp.compare_values(1.0, f64::from(m.policy(1) == Some(WeightPolicy::Roi)), 0.0);
    let out = run(
        &m,
        &[MosaicInput::new(&a), MosaicInput::new(&b)],
        bounds,
        1,
        DataType::UShort,
    );
    rp.compare_values(1000.0, out.get_sample(2, 0, 0).unwrap(), 0.0);
    rp.compare_values(5.0, out.get_sample(5, 0, 0).unwrap(), 0.0);
    rp.compare_values(2000.0, out.get_sample(9, 7, 0).unwrap(), 0.0);

    // --- 4. alpha blending ---
    let a = constant(bounds, 1, DataType::Byte, 0.0).unwrap();
    let b = constant(bounds, 1, DataType::Byte, 200.0).unwrap();
    let alpha_a = constant(bounds, 1, DataType::Byte, 255.0).unwrap();
    let alpha_b = constant(bounds, 1, DataType::Byte, 51.0).unwrap();
    let inputs = [
        MosaicInput::with_alpha(&a, &alpha_a),
        MosaicInput::with_alpha(&b, &alpha_b),
    ];
    let options = MosaicOptions::default()
        .with_type(MosaicType::Blend)
        .with_alpha(&[true, true]);
    let normalized = Mosaic::new(2, DataType::Byte, 1, options).unwrap();
    // weights 1 and 0.2: 200 * 0.2 / 1.2
    let out = run(&normalized, &inputs, bounds, 1, DataType::Byte);
    rp.compare_values(33.0, out.get_sample(4, 4, 0).unwrap(), 0.0);

    // a third, threshold-weighted source turns alpha into a bitmask
    let c = constant(bounds, 1, DataType::Byte, 50.0).unwrap();
    let options = MosaicOptions::default()
        .with_type(MosaicType::Blend)
        .with_alpha(&[true, true]);
    let bitmask = Mosaic::new(3, DataType::Byte, 1, options).unwrap();
    let out = run(
        &bitmask,
        &[inputs[0], inputs[1], MosaicInput::new(&c)],
        bounds,
        1,
        DataType::Byte,
    );
    // (0 + 200 + 50) / 3
    rp.compare_values(83.0, out.get_sample(4, 4, 0).unwrap(), 0.0);

    // --- 5. absent and partial sources ---
    let small = ramp(Rect::new(2, 2, 3, 3), 1, DataType::Int).unwrap();
    let m = Mosaic::new(
        2,
        DataType::Int,
        1,
        MosaicOptions::default()
            .with_thresholds(vec![vec![0.0]])
            .with_background(&[-7.0]),
    )
    .unwrap();
    let out = run(
        &m,
        &[MosaicInput::absent(), MosaicInput::new(&small)],
        bounds,
        1,
        DataType::Int,
    );
    rp.compare_values(4.0, out.get_sample(3, 3, 0).unwrap(), 0.0);
    rp.compare_values(-7.0, out.get_sample(0, 0, 0).unwrap(), 0.0);
    rp.compare_values(-7.0, out.get_sample(9, 7, 0).unwrap(), 0.0);
    let union = Mosaic::dest_bounds(&[Rect::new(0, 0, 6, 8), Rect::new(4, 0, 6, 8)]);
    rp.compare_values(10.0, union.width as f64, 0.0);

    assert!(rp.cleanup(), "mosaic regression test failed");
}
