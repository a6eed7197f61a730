//! Indicator implementations the catalog signals are built from.
//!
//! Indicators are pure functions: close history in, numeric series of the same
//! length out. They are precomputed once per trial before the bar loop.
//! The first `lookback()` values are `f64::NAN` (warmup).

pub mod extremes;
pub mod sma;

pub use extremes::{Highest, Lowest};
pub use sma::Sma;

/// Trait for close-price indicators.
///
/// # Look-ahead contamination guard
/// No value at bar t may depend on closes from bar t+1 or later.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "highest_90").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator over the whole close series.
    fn compute(&self, closes: &[f64]) -> Vec<f64>;
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
