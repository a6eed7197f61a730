//! Drawdown analyzer: running peak-to-trough tracking of marked equity.

use serde::{Deserialize, Serialize};

/// Tracks the maximum observed peak-to-trough decline of an equity series.
///
/// Drawdown is reported as a positive fraction of the running peak:
/// a fall from 110k to 90k is `0.1818…`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawdownAnalyzer {
    peak: Option<f64>,
    current: f64,
    max: f64,
}

impl DrawdownAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next marked equity value.
    pub fn update(&mut self, equity: f64) {
        let peak = match self.peak {
            Some(p) if p >= equity => p,
            _ => {
                self.peak = Some(equity);
                equity
            }
        };
        self.current = if peak > 0.0 {
            (peak - equity) / peak
        } else {
            0.0
        };
        if self.current > self.max {
            self.max = self.current;
        }
    }

    /// Largest drawdown seen so far.
    pub fn max_drawdown(&self) -> f64 {
        self.max
    }

    /// Drawdown of the latest equity value from the running peak.
    pub fn current_drawdown(&self) -> f64 {
        self.current
    }

    pub fn peak(&self) -> Option<f64> {
        self.peak
    }
}

/// Max drawdown of a complete equity curve.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let mut analyzer = DrawdownAnalyzer::new();
    for &eq in equity_curve {
        analyzer.update(eq);
    }
    analyzer.max_drawdown()
}
