//! Rendering benchmarks.
//!
//! Per-frame corner rendering dominates animation wall time; these track it
//! across dimension counts, plus the full sequencing loop.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use cornerreel::prelude::*;
use cornerreel::render::CornerRenderer;

fn spread_tensor(iterations: usize, walkers: usize, dims: usize) -> SampleTensor {
    let len = iterations * walkers * dims;
    let data: Vec<f64> = (0..len).map(|i| (i as f64 * 0.618_034).sin() * 3.0).collect();
    match SampleTensor::from_vec(iterations, walkers, dims, data) {
        Ok(t) => t,
        Err(e) => panic!("bench tensor must be valid: {e}"),
    }
}

fn bench_single_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group.sample_size(30);

    for dims in [2usize, 3, 5] {
        let tensor = spread_tensor(10, 32, dims);
        let config = CornerConfig::builder().size(480, 480).build();

        group.bench_with_input(BenchmarkId::new("corner_480px", dims), &dims, |b, _| {
            let mut renderer = match CornerRenderer::new(&tensor, &config) {
                Ok(r) => r,
                Err(e) => panic!("renderer setup failed: {e}"),
            };
            let slice = tensor.visible(9, config.policy);
            b.iter(|| {
                let raster = renderer.render(slice);
                black_box(raster.ok());
            });
        });
    }

    group.finish();
}

fn bench_sequence(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence");
    group.sample_size(10);

    let tensor = spread_tensor(30, 32, 2);
    let config = CornerConfig::builder().size(320, 320).build();

    group.bench_function("corner_30_frames", |b| {
        b.iter(|| {
            let animation = corner(&tensor, &config);
            black_box(animation.map(|a| a.len()).ok());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_single_frame, bench_sequence);
criterion_main!(benches);
