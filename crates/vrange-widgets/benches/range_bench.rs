//! Benchmarks for visible-range computation and height feedback.
//!
//! Run with: `cargo bench --package vrange-widgets --bench range_bench`
//!
//! # What is measured
//!
//! | Group              | Operation                                   | Expected cost |
//! |--------------------|---------------------------------------------|---------------|
//! | range/fixed        | `compute_visible_range`, fixed heights      | O(1)          |
//! | range/linear       | same, measured heights, linear scan         | O(n)          |
//! | range/fenwick      | same, measured heights, Fenwick tree        | O(log n)      |
//! | measure/linear     | `set_measured` + `total_extent`             | O(n)          |
//! | measure/fenwick    | `set_measured` + `total_extent`             | O(log n)      |
//! | render/window      | full render of an 18-item window            | O(window)     |
//!
//! The linear model exists as a correctness baseline; the gap between the
//! `linear` and `fenwick` rows at 100K items is the reason the Fenwick index
//! is the default.
//!
//! # Criterion Output
//!
//! Results are written to `target/criterion/` with per-iteration timings and
//! comparison to previous runs.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use vrange_core::{ItemExtent, VirtualizerConfig};
use vrange_widgets::{
    HeightCache, ItemHeight, VariableHeightsFenwick, Viewport, VirtualizedRangeRenderer,
    VirtualizedState, compute_visible_range,
};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

// ============================================================================
// Height model setup
// ============================================================================

/// Pseudo-random heights in `20..120`, stable across runs.
fn heights(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 20.0 + ((i as u64).wrapping_mul(2_654_435_761) % 100) as f64)
        .collect()
}

fn estimate() -> ItemExtent {
    ItemExtent::estimate(50.0).unwrap()
}

fn linear_model(values: &[f64]) -> ItemHeight {
    let mut model = ItemHeight::Measured(HeightCache::new(estimate()));
    for (idx, &h) in values.iter().enumerate() {
        model.set_measured(idx, h, values.len());
    }
    model
}

fn fenwick_model(values: &[f64]) -> ItemHeight {
    ItemHeight::MeasuredFenwick(VariableHeightsFenwick::from_heights(values, estimate()))
}

/// Scroll positions spread across the list, including the far end.
fn scroll_points(total: f64) -> [f64; 4] {
    [0.0, total * 0.25, total * 0.5, total * 0.95]
}

// ============================================================================
// Range computation
// ============================================================================

fn bench_range(c: &mut Criterion) {
    let mut group = c.benchmark_group("range");

    for n in SIZES {
        let fixed = ItemHeight::Fixed(ItemExtent::fixed(50.0).unwrap());
        let values = heights(n);
        let linear = linear_model(&values);
        let fenwick = fenwick_model(&values);

        for (name, model) in [("fixed", &fixed), ("linear", &linear), ("fenwick", &fenwick)] {
            let points = scroll_points(model.total_extent(n));
            group.bench_with_input(BenchmarkId::new(name, n), &n, |b, &n| {
                b.iter(|| {
                    for scroll in points {
                        black_box(compute_visible_range(
                            n,
                            black_box(model),
                            5,
                            Viewport::new(scroll, 400.0),
                        ));
                    }
                });
            });
        }
    }

    group.finish();
}

// ============================================================================
// Measurement feedback
// ============================================================================

fn bench_measure(c: &mut Criterion) {
    let mut group = c.benchmark_group("measure");

    for n in SIZES {
        let values = heights(n);
        let mut linear = linear_model(&values);
        let mut fenwick = fenwick_model(&values);

        group.bench_with_input(BenchmarkId::new("linear", n), &n, |b, &n| {
            let mut idx = 0;
            b.iter(|| {
                idx = (idx + 7_919) % n;
                linear.set_measured(idx, 64.0, n);
                black_box(linear.total_extent(n))
            });
        });

        group.bench_with_input(BenchmarkId::new("fenwick", n), &n, |b, &n| {
            let mut idx = 0;
            b.iter(|| {
                idx = (idx + 7_919) % n;
                fenwick.set_measured(idx, 64.0, n);
                black_box(fenwick.total_extent(n))
            });
        });
    }

    group.finish();
}

// ============================================================================
// Full render pass
// ============================================================================

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");

    let items: Vec<String> = (0..100_000).map(|i| format!("Row {i}")).collect();
    let renderer = VirtualizedRangeRenderer::new(&items, |item: &String, _| item.len());
    let config = VirtualizerConfig::fixed(50.0, 400.0).with_overscan(5);
    let mut state = VirtualizedState::new(&config).unwrap();

    group.bench_function("window", |b| {
        let mut scroll = 0.0;
        b.iter(|| {
            scroll = (scroll + 137.0) % 4_000_000.0;
            state.on_scroll(scroll);
            black_box(renderer.render(&mut state))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_range, bench_measure, bench_render);
criterion_main!(benches);
