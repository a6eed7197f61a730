//! Percent-of-cash sizer.

use serde::{Deserialize, Serialize};

use super::Sizer;

/// Invests a fixed percentage of available cash on every buy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentSizer {
    percent: f64,
}

impl PercentSizer {
    /// # Panics
    /// If `percent` is not in `(0, 100]`.
    pub fn new(percent: f64) -> Self {
        assert!(
            percent > 0.0 && percent <= 100.0,
            "percent must be in (0, 100], got {percent}"
        );
        Self { percent }
    }

    /// 100% of cash: the sizing every trial runs with.
    pub fn full() -> Self {
        Self { percent: 100.0 }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }
}

impl Default for PercentSizer {
    fn default() -> Self {
        Self::full()
    }
}

impl Sizer for PercentSizer {
    fn size(&self, cash: f64, price: f64) -> f64 {
        if cash <= 0.0 || price <= 0.0 {
            return 0.0;
        }
        cash * (self.percent / 100.0) / price
    }

    fn name(&self) -> &str {
        "percent"
    }
}
