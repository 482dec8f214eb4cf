//! Complex arithmetic regression test
//!
//!   1. divide(multiply(a, b), b) recovers a for floating types
//!   2. the same round trip is exact for integral types when the product
//!      fits the type
//!   3. a shared two-band source applies to every destination pair

use tileops_arith::{ComplexArithmetic, ComplexOp};
use tileops_core::{DataType, Raster, Rect};
use tileops_test::{RegParams, from_fn};

fn apply(op: ComplexOp, a: &Raster, b: &Raster) -> Raster {
    let k = ComplexArithmetic::new(op, a.data_type(), a.num_bands(), b.num_bands()).unwrap();
    let mut dst = Raster::new(a.bounds(), k.num_bands(), a.data_type()).unwrap();
    k.compute_rect(a, b, &mut dst, &a.bounds()).unwrap();
    dst
}

#[test]
fn complex_reg() {
    let mut rp = RegParams::new("complex");
    let bounds = Rect::new(4, 4, 6, 5);

    // --- 1. floating round trip ---
    for data_type in [DataType::Float, DataType::Double] {
        let a = from_fn(bounds, 4, data_type, |x, y, b| {
            (x as f64 * 0.75 - y as f64 * 1.5 + b as f64).sin() * 10.0
        })
        .unwrap();
        let b = from_fn(bounds, 4, data_type, |x, y, band| {
            // keep the divisor away from zero
            2.0 + ((x * 3 + y + band as i32) % 5) as f64 * 0.5
        })
        .unwrap();
        let product = apply(ComplexOp::Multiply, &a, &b);
        let back = apply(ComplexOp::Divide, &product, &b);
        let tolerance = if data_type == DataType::Float { 1e-4 } else { 1e-12 };
        rp.compare_rasters(&a, &back, tolerance);
    }

    // --- 2. integral round trip ---
    for data_type in [DataType::Short, DataType::Int] {
        let a = from_fn(bounds, 2, data_type, |x, y, b| ((x - 7) * (b as i32 + 1) + y) as f64).unwrap();
        let b = from_fn(bounds, 2, data_type, |x, y, band| (1 + (x + y + band as i32) % 3) as f64)
            .unwrap();
        let product = apply(ComplexOp::Multiply, &a, &b);
        let back = apply(ComplexOp::Divide, &product, &b);
        rp.compare_rasters(&a, &back, 0.0);
    }

    // --- 3. shared pair ---
    let shared = from_fn(bounds, 2, DataType::Double, |_, _, b| if b == 0 { 0.0 } else { 1.0 }).unwrap();
    let many = from_fn(bounds, 6, DataType::Double, |x, _, b| (x as usize + b) as f64).unwrap();
    let rotated = apply(ComplexOp::Multiply, &shared, &many);
    rp.compare_values(6.0, rotated.num_bands() as f64, 0.0);
    for pair in 0..3 {
        // i * (re + im i) = -im + re i
        let re = many.get_sample(5, 5, 2 * pair).unwrap();
        let im = many.get_sample(5, 5, 2 * pair + 1).unwrap();
        rp.compare_values(-im, rotated.get_sample(5, 5, 2 * pair).unwrap(), 0.0);
        rp.compare_values(re, rotated.get_sample(5, 5, 2 * pair + 1).unwrap(), 0.0);
    }

    assert!(rp.cleanup(), "complex regression test failed");
}
