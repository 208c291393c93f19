//! Benchmarks for the post-session reduction and overlay rendering

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gaze_tracking::{
    config::Config,
    heatmap::HeatmapGrid,
    pipeline::reduce,
    render::{OverlayRenderer, RenderMode},
    types::{CalibrationDomain, GazePoint, ImageBounds, Viewport},
};

fn random_samples(num_samples: usize) -> Vec<GazePoint> {
    (0..num_samples)
        .map(|i| {
            GazePoint::new(
                rand::random::<f64>() * 1000.0,
                rand::random::<f64>() * 1000.0,
                i as i64 * 33,
                rand::random::<f64>(),
            )
        })
        .collect()
}

fn benchmark_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    let config = Config::default();
    let domain = CalibrationDomain {
        min_x: 0.0,
        max_x: 1000.0,
        min_y: 0.0,
        max_y: 1000.0,
    };
    let viewport = Viewport::new(1920.0, 1080.0);
    let bounds = ImageBounds::new(0.0, 0.0, 1920.0, 1080.0, 3840.0, 2160.0);

    for size in [300, 3_000] {
        let raw = random_samples(size);
        group.bench_with_input(BenchmarkId::new("session", size), &raw, |b, raw| {
            b.iter(|| black_box(reduce(black_box(raw), Some(domain), viewport, &bounds, 10_000, &config)));
        });
    }

    group.finish();
}

fn benchmark_heatmap_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("heatmap_grid");
    let bounds = ImageBounds::new(0.0, 0.0, 1000.0, 1000.0, 1000.0, 1000.0);
    let points = random_samples(3_000);

    for grid in [10, 50, 100] {
        group.bench_with_input(BenchmarkId::new("from_points", grid), &grid, |b, &grid| {
            b.iter(|| black_box(HeatmapGrid::from_points(black_box(&points), &bounds, grid)));
        });
    }

    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(20);
    let bounds = ImageBounds::new(0.0, 0.0, 800.0, 600.0, 1000.0, 1000.0);
    let points = random_samples(500);

    for mode in [RenderMode::Heatmap, RenderMode::ScanPath] {
        let mut renderer = OverlayRenderer::default();
        group.bench_function(mode.as_str(), |b| {
            b.iter(|| {
                renderer.clear();
                black_box(renderer.render(mode, black_box(&points), &[], &bounds))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_reduce, benchmark_heatmap_grid, benchmark_render);
criterion_main!(benches);
