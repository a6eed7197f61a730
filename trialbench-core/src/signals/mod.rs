//! Signal generation: per-bar votes in {-1, 0, +1}.
//!
//! Signals are portfolio-agnostic: each one is a pure function of the close
//! history up to and including the current bar (plus an explicit RNG for the
//! stochastic variant). They never see position state; turning votes into
//! buy/close actions is the job of `crate::position`.
//!
//! The set of signals is closed. Strategies compose them by pairing variants
//! (entry, exit) rather than wiring arbitrary objects together.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::indicators::{Highest, Indicator, Lowest, Sma};

/// Per-bar signal vote: +1 long / entry, -1 exit, 0 no opinion.
pub type SignalValue = i8;

pub const LONG: SignalValue = 1;
pub const NEUTRAL: SignalValue = 0;
pub const EXIT: SignalValue = -1;

/// Closed set of signal variants used by the strategy catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Always votes long. Drives buy-and-hold.
    AlwaysLong,

    /// Close relative to its own SMA.
    ///
    /// `close / sma < 1 - gap` → +1 (stretched down), `> 1 + gap` → -1.
    CloseVsSma { window: usize, gap: f64 },

    /// Short SMA against long SMA.
    ///
    /// short < long → +1, short > long → -1, equal → 0.
    MeanReversion {
        window_small: usize,
        window_large: usize,
    },

    /// Position of the close inside its rolling high/low range.
    ///
    /// `close / highest > max_threshold` → -1 (near the previous peak);
    /// otherwise `close / lowest < min_threshold` → +1 (near the trough).
    PrevPeak {
        window: usize,
        max_threshold: f64,
        min_threshold: f64,
    },

    /// Coin flips: `u < prob` → +1, else a second draw `u < prob` → -1.
    Random { prob: f64 },
}

impl Signal {
    pub fn close_vs_sma(window: usize, gap: f64) -> Self {
        Self::CloseVsSma { window, gap }
    }

    pub fn mean_reversion(window_small: usize, window_large: usize) -> Self {
        Self::MeanReversion {
            window_small,
            window_large,
        }
    }

    pub fn prev_peak(window: usize, max_threshold: f64, min_threshold: f64) -> Self {
        Self::PrevPeak {
            window,
            max_threshold,
            min_threshold,
        }
    }

    pub fn random(prob: f64) -> Self {
        Self::Random { prob }
    }

    /// Human-readable name for logs and reports.
    pub fn name(&self) -> String {
        match self {
            Self::AlwaysLong => "always_long".to_string(),
            Self::CloseVsSma { window, gap } => format!("close_vs_sma_{window}_{gap}"),
            Self::MeanReversion {
                window_small,
                window_large,
            } => format!("mean_reversion_{window_small}_{window_large}"),
            Self::PrevPeak {
                window,
                max_threshold,
                min_threshold,
            } => format!("prev_peak_{window}_{max_threshold}_{min_threshold}"),
            Self::Random { prob } => format!("random_{prob}"),
        }
    }

    /// Index of the first bar with a full indicator window.
    pub fn warmup_bars(&self) -> usize {
        match self {
            Self::AlwaysLong | Self::Random { .. } => 0,
            Self::CloseVsSma { window, .. } | Self::PrevPeak { window, .. } => {
                window.saturating_sub(1)
            }
            Self::MeanReversion {
                window_small,
                window_large,
            } => (*window_small).max(*window_large).saturating_sub(1),
        }
    }

    /// Whether `compute` draws from the RNG.
    pub fn is_stochastic(&self) -> bool {
        matches!(self, Self::Random { .. })
    }

    /// Compute the vote for every bar of `closes`.
    ///
    /// Bars inside the warmup vote 0. The RNG is only consumed by
    /// `Signal::Random`, one or two draws per bar, in bar order.
    pub fn compute<R: Rng + ?Sized>(&self, closes: &[f64], rng: &mut R) -> Vec<SignalValue> {
        match *self {
            Self::AlwaysLong => vec![LONG; closes.len()],
            Self::CloseVsSma { window, gap } => close_vs_sma(closes, window, gap),
            Self::MeanReversion {
                window_small,
                window_large,
            } => mean_reversion(closes, window_small, window_large),
            Self::PrevPeak {
                window,
                max_threshold,
                min_threshold,
            } => prev_peak(closes, window, max_threshold, min_threshold),
            Self::Random { prob } => closes
                .iter()
                .map(|_| {
                    if rng.gen::<f64>() < prob {
                        LONG
                    } else if rng.gen::<f64>() < prob {
                        EXIT
                    } else {
                        NEUTRAL
                    }
                })
                .collect(),
        }
    }
}

fn close_vs_sma(closes: &[f64], window: usize, gap: f64) -> Vec<SignalValue> {
    let sma = Sma::new(window.max(1)).compute(closes);
    closes
        .iter()
        .zip(&sma)
        .map(|(&close, &avg)| {
            if avg.is_nan() || avg == 0.0 {
                return NEUTRAL;
            }
            let share = close / avg;
            if share < 1.0 - gap {
                LONG
            } else if share > 1.0 + gap {
                EXIT
            } else {
                NEUTRAL
            }
        })
        .collect()
}

fn mean_reversion(closes: &[f64], window_small: usize, window_large: usize) -> Vec<SignalValue> {
    let small = Sma::new(window_small.max(1)).compute(closes);
    let large = Sma::new(window_large.max(1)).compute(closes);
    small
        .iter()
        .zip(&large)
        .map(|(&s, &l)| {
            if s < l {
                LONG
            } else if s > l {
                EXIT
            } else {
                // Equal or NaN (warmup)
                NEUTRAL
            }
        })
        .collect()
}

fn prev_peak(
    closes: &[f64],
    window: usize,
    max_threshold: f64,
    min_threshold: f64,
) -> Vec<SignalValue> {
    let highest = Highest::new(window.max(1)).compute(closes);
    let lowest = Lowest::new(window.max(1)).compute(closes);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let (hi, lo) = (highest[i], lowest[i]);
            if hi.is_nan() || lo.is_nan() {
                return NEUTRAL;
            }
            if close / hi > max_threshold {
                EXIT
            } else if close / lo < min_threshold {
                LONG
            } else {
                NEUTRAL
            }
        })
        .collect()
}
