//! Look-ahead contamination tests for indicators and deterministic signals.
//!
//! Invariant: no value at bar t may depend on closes from bar t+1 or later.
//!
//! Method: compute on a truncated series (bars 0..150) and the full series
//! (bars 0..300). Bars 0..150 must be identical between both runs.

use rand::rngs::StdRng;
use rand::SeedableRng;
use trialbench_core::indicators::{Highest, Indicator, Lowest, Sma};
use trialbench_core::signals::Signal;

/// Deterministic pseudo-random walk using a simple LCG.
fn make_closes(n: usize) -> Vec<f64> {
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            let seed = (i as u64).wrapping_mul(6364136223846793005).wrapping_add(1);
            let change = ((seed % 200) as f64 - 100.0) * 0.05;
            price = (price + change).max(10.0);
            price
        })
        .collect()
}

fn same_prefix(a: &[f64], b: &[f64], name: &str) {
    for (t, (x, y)) in a.iter().zip(b).enumerate() {
        let equal = (x.is_nan() && y.is_nan()) || (x - y).abs() < 1e-10;
        assert!(equal, "{name}: bar {t} differs ({x} vs {y})");
    }
}

#[test]
fn indicators_have_no_lookahead() {
    let full = make_closes(300);
    let truncated = &full[..150];
    let indicators: Vec<Box<dyn Indicator>> = vec![
        Box::new(Sma::new(15)),
        Box::new(Sma::new(90)),
        Box::new(Highest::new(90)),
        Box::new(Lowest::new(90)),
    ];

    for ind in &indicators {
        same_prefix(&ind.compute(truncated), &ind.compute(&full), ind.name());
    }
}

#[test]
fn signals_have_no_lookahead() {
    let full = make_closes(300);
    let truncated = &full[..150];
    let signals = [
        Signal::close_vs_sma(15, 0.05),
        Signal::close_vs_sma(60, 0.05),
        Signal::mean_reversion(5, 30),
        Signal::mean_reversion(30, 90),
        Signal::prev_peak(90, 0.9, 1.1),
    ];
    let mut rng = StdRng::seed_from_u64(0);

    for signal in signals {
        let a = signal.compute(truncated, &mut rng);
        let b = signal.compute(&full, &mut rng);
        assert_eq!(a[..], b[..150], "{}", signal.name());
    }
}

#[test]
fn random_signal_prefix_matches_under_same_seed() {
    let full = make_closes(300);
    let signal = Signal::random(0.1);
    let a = signal.compute(&full[..150], &mut StdRng::seed_from_u64(5));
    let b = signal.compute(&full, &mut StdRng::seed_from_u64(5));
    assert_eq!(a[..], b[..150]);
}
