//! Criterion benchmarks for TrialBench hot paths.
//!
//! Benchmarks:
//! 1. Reference bar engine over a full slice, per catalog strategy
//! 2. Signal precompute (the SMA / rolling-extreme families)
//! 3. Sub-seed derivation (run once per trial)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use trialbench_core::domain::Bar;
use trialbench_core::engine::{BacktestEngine, BarEngine, RunLimits, SimulationContext};
use trialbench_core::rng::{RngHierarchy, RngStream};
use trialbench_core::signals::Signal;
use trialbench_core::strategy::catalog;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            Bar::new(base_date + chrono::Duration::days(i as i64), close)
        })
        .collect()
}

// ── 1. Engine ────────────────────────────────────────────────────────

fn bench_engine(c: &mut Criterion) {
    let bars = make_bars(1_000);
    let engine = BarEngine::new();
    let mut group = c.benchmark_group("bar_engine");

    for desc in catalog() {
        group.bench_with_input(BenchmarkId::from_parameter(desc.name()), &desc, |b, desc| {
            b.iter(|| {
                let mut ctx = SimulationContext::from_descriptor(desc, 42, 100_000.0);
                engine
                    .run(&mut ctx, black_box(&bars), &RunLimits::none())
                    .unwrap()
            })
        });
    }
    group.finish();
}

// ── 2. Signals ───────────────────────────────────────────────────────

fn bench_signals(c: &mut Criterion) {
    let closes: Vec<f64> = make_bars(2_500).iter().map(|b| b.close).collect();
    let signals = [
        Signal::close_vs_sma(60, 0.05),
        Signal::mean_reversion(30, 90),
        Signal::prev_peak(90, 0.9, 1.1),
    ];
    let mut group = c.benchmark_group("signals");
    let mut rng = RngHierarchy::new(0).rng_for(RngStream::Strategy, "bench", "T", 0);

    for signal in signals {
        group.bench_function(signal.name(), |b| {
            b.iter(|| signal.compute(black_box(&closes), &mut rng))
        });
    }
    group.finish();
}

// ── 3. Seeds ─────────────────────────────────────────────────────────

fn bench_sub_seed(c: &mut Criterion) {
    let hierarchy = RngHierarchy::new(42);
    c.bench_function("sub_seed", |b| {
        b.iter(|| {
            hierarchy.sub_seed(
                RngStream::Sampler,
                black_box("mean_reversion_nodrop"),
                black_box("SPY"),
                black_box(1234),
            )
        })
    });
}

criterion_group!(benches, bench_engine, bench_signals, bench_sub_seed);
criterion_main!(benches);
