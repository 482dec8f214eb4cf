//! Alpha compositing regression test
//!
//!   1. opaque source 1 replaces source 2, transparent source 1 keeps it
//!   2. straight and premultiplied inputs agree once premultiplied
//!   3. the destination alpha band carries the combined coverage
//!   4. tiles offset from the origin composite only the requested rect

use tileops_blend::{AlphaCompositor, CompositeOptions, DestAlpha};
use tileops_core::{DataType, Raster, Rect};
use tileops_test::{RegParams, constant, from_fn, ramp};

fn composite(
    op: &AlphaCompositor,
    s1: &Raster,
    a1: &Raster,
    s2: &Raster,
    a2: Option<&Raster>,
    rect: Rect,
) -> Raster {
    let mut dst = Raster::new(rect, op.num_dest_bands(), s1.data_type()).unwrap();
    op.compute_rect(s1, a1, s2, a2, &mut dst, &rect).unwrap();
    dst
}

#[test]
fn composite_reg() {
    let mut rp = RegParams::new("composite");
    let bounds = Rect::new(0, 0, 8, 6);

    // --- 1. opaque and transparent source 1 ---
    for data_type in [DataType::Byte, DataType::UShort, DataType::Float] {
        let op = AlphaCompositor::new(data_type, 3, CompositeOptions::default()).unwrap();
        let s1 = ramp(bounds, 3, data_type).unwrap();
        let s2 = constant(bounds, 3, data_type, 7.0).unwrap();
        let opaque = constant(bounds, 1, data_type, data_type.full_scale()).unwrap();
        let clear = constant(bounds, 1, data_type, 0.0).unwrap();

        let out = composite(&op, &s1, &opaque, &s2, None, bounds);
        rp.compare_rasters(&s1, &out, 0.0);
        let out = composite(&op, &s1, &clear, &s2, None, bounds);
        rp.compare_rasters(&s2, &out, 0.0);
    }

    // --- 2. straight vs premultiplied ---
    let data_type = DataType::Double;
    let a1 = from_fn(bounds, 1, data_type, |x, y, _| (x + y) as f64 / 12.0).unwrap();
    let s1 = ramp(bounds, 2, data_type).unwrap();
    let s2 = constant(bounds, 2, data_type, 40.0).unwrap();
    let pre1 = from_fn(bounds, 2, data_type, |x, y, b| {
        s1.get_sample(x, y, b).unwrap() * a1.get_sample(x, y, 0).unwrap()
    })
    .unwrap();
    let straight = AlphaCompositor::new(data_type, 2, CompositeOptions::default()).unwrap();
    let premultiplied = AlphaCompositor::new(
        data_type,
        2,
        CompositeOptions::default().with_premultiplied(true),
    )
    .unwrap();
    let out_straight = composite(&straight, &s1, &a1, &s2, None, bounds);
    let out_pre = composite(&premultiplied, &pre1, &a1, &s2, None, bounds);
    rp.compare_rasters(&out_straight, &out_pre, 1e-9);

    // --- 3. destination alpha ---
    let a2 = constant(bounds, 1, data_type, 0.5).unwrap();
    let op = AlphaCompositor::new(
        data_type,
        2,
        CompositeOptions::default().with_dest_alpha(DestAlpha::Last),
    )
    .unwrap();
    let out = composite(&op, &s1, &a1, &s2, Some(&a2), bounds);
    for (x, y) in [(0, 0), (3, 2), (7, 5)] {
        let alpha1 = (x + y) as f64 / 12.0;
        let coverage = alpha1 + 0.5 * (1.0 - alpha1);
        rp.compare_values(coverage, out.get_sample(x, y, 2).unwrap(), 1e-12);
        let expected = (s1.get_sample(x, y, 0).unwrap() * alpha1 + 40.0 * 0.5 * (1.0 - alpha1))
            / coverage;
        rp.compare_values(expected, out.get_sample(x, y, 0).unwrap(), 1e-9);
    }

    // --- 4. sub-rect of offset tiles ---
    let tile = Rect::new(100, 50, 8, 8);
    let rect = Rect::new(102, 53, 3, 2);
    let op = AlphaCompositor::new(DataType::Short, 1, CompositeOptions::default()).unwrap();
    let s1 = constant(tile, 1, DataType::Short, -20.0).unwrap();
    let s2 = constant(tile, 1, DataType::Short, 30.0).unwrap();
    let half = constant(tile, 1, DataType::Short, 16384.0).unwrap();
    let out = composite(&op, &s1, &half, &s2, None, rect);
    // -20 * 0.5 + 30 * 0.5, a1 = 16384 / 32767
    let alpha1: f64 = 16384.0 / 32767.0;
    let expected = (-20.0 * alpha1 + 30.0 * (1.0 - alpha1) + 0.5).floor();
    rp.compare_values(expected, out.get_sample(103, 54, 0).unwrap(), 0.0);
    rp.compare_values(expected, out.get_sample(102, 53, 0).unwrap(), 0.0);
    assert_eq!(out.get_sample(101, 53, 0), None);

    assert!(rp.cleanup(), "composite regression test failed");
}
