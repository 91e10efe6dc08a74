use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use model::point::Point;
use reduction::reduce;

/// A wobbly trace with GPS-like spacing (a few metres per step).
fn gps_trace(len: usize) -> Vec<Point> {
    (0..len)
        .map(|i| {
            let t = i as f64;
            Point::new(
                10.1228 + t * 0.00003 + (t * 0.05).sin() * 0.0004,
                54.3233 + t * 0.00002 + (t * 0.013).cos() * 0.0006,
            )
        })
        .collect()
}

/// A strictly convex curve: nothing can be dropped at tolerance 0.
fn convex_curve(len: usize) -> Vec<Point> {
    (0..len)
        .map(|i| {
            let x = i as f64;
            Point::new(x, x * x)
        })
        .collect()
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    for len in [1_000, 10_000, 100_000] {
        let trace = gps_trace(len);
        group.bench_with_input(BenchmarkId::new("gps_trace", len), &trace, |b, trace| {
            b.iter(|| reduce(black_box(trace), black_box(0.0001)))
        });

        let curve = convex_curve(len);
        group.bench_with_input(BenchmarkId::new("convex_curve", len), &curve, |b, curve| {
            b.iter(|| reduce(black_box(curve), black_box(0.0)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reduce);
criterion_main!(benches);
