//! Benchmarks for fixation detection

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gaze_tracking::{fixation::FixationDetector, types::GazePoint};

/// Dwells of ~300 ms separated by saccades, sampled at 30 Hz with jitter
fn generate_gaze_sequence(num_samples: usize) -> Vec<GazePoint> {
    let mut centre = (400.0, 300.0);
    (0..num_samples)
        .map(|i| {
            if i % 10 == 0 {
                centre = (rand::random::<f64>() * 1920.0, rand::random::<f64>() * 1080.0);
            }
            let x = centre.0 + 10.0 * (rand::random::<f64>() - 0.5);
            let y = centre.1 + 10.0 * (rand::random::<f64>() - 0.5);
            GazePoint::new(x, y, i as i64 * 33, 0.9)
        })
        .collect()
}

fn benchmark_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixation_detection");
    let detector = FixationDetector::default();

    for size in [100, 1_000, 10_000] {
        let points = generate_gaze_sequence(size);
        group.bench_with_input(BenchmarkId::new("detect", size), &points, |b, points| {
            b.iter(|| black_box(detector.detect(black_box(points))));
        });
    }

    group.finish();
}

fn benchmark_thresholds(c: &mut Criterion) {
    let mut group = c.benchmark_group("fixation_thresholds");
    let points = generate_gaze_sequence(1_000);

    let detectors = vec![
        ("tight_25px", FixationDetector::new(25.0, 100, 3)),
        ("default_50px", FixationDetector::default()),
        ("loose_150px", FixationDetector::new(150.0, 100, 3)),
    ];

    for (name, detector) in detectors {
        group.bench_with_input(BenchmarkId::new("detect_1000", name), &points, |b, points| {
            b.iter(|| black_box(detector.detect(black_box(points))));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_detection, benchmark_thresholds);
criterion_main!(benches);
