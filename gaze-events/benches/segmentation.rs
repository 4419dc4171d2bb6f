//! Criterion benchmarks for the segmentation hot paths
//!
//! Covers: island finding, saccade detection on one run, and the full
//! saccade labeling pass over several sessions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gaze_events::analysis::{find_islands, SaccadeDetector, SmoothingKernel};
use gaze_events::geometry::VisualAngle;
use gaze_events::pipeline::extract_saccades_with_labels;
use gaze_events::session::{GazeTrace, RunBoundary, SessionMetadata, SessionRecord};

const RATE: f64 = 1000.0;

/// Fixation plateaus joined by 20-sample ramps, in pixels.
fn synthetic_trace(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut x = Vec::with_capacity(n);
    let mut level = 300.0;
    for i in 0..n {
        let phase = i % 300;
        if phase >= 280 {
            level += 10.0;
        }
        x.push(level + ((i * 7919) % 5) as f64 * 0.1);
    }
    let y = x.iter().map(|v| v * 0.5).collect();
    (x, y)
}

fn make_session(name: &str, n: usize) -> SessionRecord {
    let (x, y) = synthetic_trace(n);
    let trace = GazeTrace::from_xy(x, y, RATE).unwrap();
    let duration = n as f64 / RATE;
    let runs = RunBoundary::from_pairs(&[(0.0, duration / 2.0), (duration / 2.0, duration)]).unwrap();
    let meta = SessionMetadata::new(name).with_runs(runs).with_category(Some(0));
    SessionRecord::new(trace, meta)
}

// ---------------------------------------------------------------------------
// Island finding
// ---------------------------------------------------------------------------

fn bench_find_islands(c: &mut Criterion) {
    let mut group = c.benchmark_group("find_islands");

    for count in [1_000usize, 10_000, 100_000] {
        let mask: Vec<bool> = (0..count).map(|i| i % 300 >= 280).collect();
        group.bench_with_input(BenchmarkId::from_parameter(count), &mask, |b, mask| {
            b.iter(|| {
                let islands = find_islands(black_box(mask), 5);
                black_box(islands)
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Saccade detection
// ---------------------------------------------------------------------------

fn bench_detect_saccades(c: &mut Criterion) {
    let mut group = c.benchmark_group("detect_saccades");
    let detector = SaccadeDetector::default();
    let va = VisualAngle::default();

    for count in [1_000usize, 10_000, 100_000] {
        let (x, y) = synthetic_trace(count);
        let x_deg = va.pixels_to_degrees(&x);
        let y_deg = va.pixels_to_degrees(&y);
        group.bench_with_input(
            BenchmarkId::from_parameter(count),
            &(x_deg, y_deg),
            |b, (x, y)| {
                b.iter(|| {
                    let intervals = detector.detect(black_box(x), black_box(y), RATE);
                    black_box(intervals)
                });
            },
        );
    }

    group.finish();
}

fn bench_identity_vs_moving_average(c: &mut Criterion) {
    let (x, y) = synthetic_trace(50_000);
    let identity = SaccadeDetector::new((0.01, 1.0), 2, SmoothingKernel::Identity);
    let smoothed = SaccadeDetector::new((0.01, 1.0), 2, SmoothingKernel::MovingAverage { window: 11 });

    c.bench_function("velocity_norm_identity", |b| {
        b.iter(|| black_box(identity.velocity_norm(black_box(&x), black_box(&y), RATE)))
    });
    c.bench_function("velocity_norm_moving_average", |b| {
        b.iter(|| black_box(smoothed.velocity_norm(black_box(&x), black_box(&y), RATE)))
    });
}

// ---------------------------------------------------------------------------
// Labeling pass
// ---------------------------------------------------------------------------

fn bench_labeling_pass(c: &mut Criterion) {
    let sessions: Vec<SessionRecord> = (0..8)
        .map(|i| make_session(&format!("session_{:02}", i), 60_000))
        .collect();
    let detector = SaccadeDetector::default();
    let va = VisualAngle::default();

    let mut group = c.benchmark_group("extract_saccades_with_labels");
    for parallel in [false, true] {
        group.bench_with_input(
            BenchmarkId::from_parameter(if parallel { "parallel" } else { "serial" }),
            &parallel,
            |b, &parallel| {
                b.iter(|| {
                    let out = extract_saccades_with_labels(black_box(&sessions), &detector, &va, parallel);
                    black_box(out)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_find_islands,
    bench_detect_saccades,
    bench_identity_vs_moving_average,
    bench_labeling_pass,
);
criterion_main!(benches);
