//! Benchmarks for display preparation - normalization, colorizing and PNG encoding.
//!
//! Run with: cargo bench --package raster-display --bench display_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ndarray::Array2;
use overlay_common::GeoBounds;
use rand::Rng;
use raster_display::{colorize, normalize_bands, png, to_uint8, ColorRamp};

/// NDVI-like band with noise, values roughly in [-0.2, 0.9].
fn generate_ndvi_band(size: usize) -> Array2<f32> {
    let mut rng = rand::thread_rng();
    Array2::from_shape_fn((size, size), |(row, col)| {
        let t = (row + col) as f32 / (2 * size) as f32;
        -0.2 + t * 1.1 + rng.gen_range(-0.05..0.05)
    })
}

fn bench_to_uint8(c: &mut Criterion) {
    let mut group = c.benchmark_group("to_uint8");

    for size in [256, 512, 1024] {
        let band = generate_ndvi_band(size);
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &band, |b, band| {
            b.iter(|| to_uint8(black_box(band)))
        });
    }

    group.finish();
}

fn bench_colorize(c: &mut Criterion) {
    let mut group = c.benchmark_group("colorize");
    let bounds = GeoBounds::new(0.0, 0.0, 1.0, 1.0);

    for size in [256, 1024] {
        let image = normalize_bands(&[generate_ndvi_band(size)], bounds).unwrap();
        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &image, |b, image| {
            b.iter(|| colorize(black_box(image), ColorRamp::RedGreen, 0.7))
        });
    }

    group.finish();
}

fn bench_png(c: &mut Criterion) {
    let mut group = c.benchmark_group("png");
    let size = 512;
    let image = normalize_bands(&[generate_ndvi_band(size)], GeoBounds::new(0.0, 0.0, 1.0, 1.0)).unwrap();
    let rgba = colorize(&image, ColorRamp::RedGreen, 0.7);

    group.bench_function("auto_512", |b| {
        b.iter(|| png::create_png_auto(black_box(&rgba), size, size))
    });
    group.bench_function("rgba_512", |b| {
        b.iter(|| png::create_png(black_box(&rgba), size, size))
    });

    group.finish();
}

criterion_group!(benches, bench_to_uint8, bench_colorize, bench_png);
criterion_main!(benches);
