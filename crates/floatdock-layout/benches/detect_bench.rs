//! Benchmarks for dock zone detection and dock tree commits.
//!
//! Run with: cargo bench -p floatdock-layout

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use floatdock_layout::{DockPosition, Rect, WindowId, WindowOptions, WindowStore, detect, detect_any};
use std::hint::black_box;

/// Lay `n` 300x200 windows out on a loose grid.
fn grid_candidates(n: u64) -> Vec<(WindowId, Rect)> {
    (1..=n)
        .filter_map(|raw| {
            let col = (raw % 8) as f64;
            let row = (raw / 8) as f64;
            WindowId::new(raw).map(|id| (id, Rect::new(col * 320.0, row * 220.0, 300.0, 200.0)))
        })
        .collect()
}

fn bench_detect_single(c: &mut Criterion) {
    let mut group = c.benchmark_group("dock/detect");
    let target = Rect::new(520.0, 100.0, 400.0, 300.0);
    let cases = [
        ("left_hit", Rect::new(325.0, 100.0, 400.0, 300.0)),
        ("interior_miss", Rect::new(520.0, 100.0, 400.0, 300.0)),
        ("disjoint", Rect::new(0.0, 0.0, 100.0, 100.0)),
    ];
    for (name, drag) in cases {
        group.bench_function(name, |b| {
            b.iter(|| black_box(detect(black_box(drag), target, 50.0)))
        });
    }
    group.finish();
}

fn bench_detect_any(c: &mut Criterion) {
    let mut group = c.benchmark_group("dock/detect_any");
    // Near the last candidate's right edge so the scan visits most windows.
    let drag = Rect::new(2_100.0, 1_000.0, 300.0, 200.0);
    for n in [4u64, 16, 64] {
        let candidates = grid_candidates(n);
        group.bench_with_input(BenchmarkId::new("windows", n), &candidates, |b, candidates| {
            b.iter(|| black_box(detect_any(drag, candidates.iter().copied(), 50.0)))
        });
    }
    group.finish();
}

fn bench_dock_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("dock/commit");
    for n in [4usize, 16, 64] {
        group.bench_with_input(BenchmarkId::new("chain", n), &n, |b, &n| {
            b.iter_batched(
                || {
                    let mut store = WindowStore::default();
                    let ids: Vec<_> = (0..n)
                        .map(|i| {
                            store.create(
                                "bench",
                                WindowOptions::at(Rect::new(i as f64 * 10.0, 0.0, 800.0, 600.0)),
                            )
                        })
                        .collect();
                    (store, ids)
                },
                |(mut store, ids)| {
                    for pair in ids.windows(2) {
                        store.dock(pair[1], pair[0], DockPosition::Right);
                    }
                    black_box(store.dock_tree().len())
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_detect_single, bench_detect_any, bench_dock_commit);
criterion_main!(benches);
