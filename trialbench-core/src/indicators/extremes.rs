//! Rolling highest / lowest close over a lookback window.
//!
//! - Highest: max(close[t-period+1..=t])
//! - Lowest:  min(close[t-period+1..=t])
//!
//! The window includes the current bar. Lookback: period - 1.

use super::Indicator;

#[derive(Debug, Clone)]
pub struct Highest {
    period: usize,
    name: String,
}

#[derive(Debug, Clone)]
pub struct Lowest {
    period: usize,
    name: String,
}

impl Highest {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Highest period must be >= 1");
        Self {
            period,
            name: format!("highest_{period}"),
        }
    }
}

impl Lowest {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "Lowest period must be >= 1");
        Self {
            period,
            name: format!("lowest_{period}"),
        }
    }
}

fn rolling(closes: &[f64], period: usize, pick: fn(f64, f64) -> f64) -> Vec<f64> {
    let n = closes.len();
    let mut result = vec![f64::NAN; n];
    if n < period {
        return result;
    }
    for i in (period - 1)..n {
        let window = &closes[(i + 1 - period)..=i];
        result[i] = window[1..].iter().fold(window[0], |acc, &c| pick(acc, c));
    }
    result
}

impl Indicator for Highest {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        rolling(closes, self.period, f64::max)
    }
}

impl Indicator for Lowest {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, closes: &[f64]) -> Vec<f64> {
        rolling(closes, self.period, f64::min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn highest_includes_current_bar() {
        let result = Highest::new(3).compute(&[1.0, 5.0, 2.0, 3.0, 9.0, 1.0]);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_eq!(&result[2..], &[5.0, 5.0, 9.0, 9.0]);
    }

    #[test]
    fn lowest_rolls_off_old_values() {
        let result = Lowest::new(3).compute(&[1.0, 5.0, 2.0, 3.0, 9.0, 1.0]);
        assert_eq!(&result[2..], &[1.0, 2.0, 2.0, 1.0]);
    }

    #[test]
    fn period_one_is_identity() {
        let closes = [4.0, 2.0, 8.0];
        assert_eq!(Highest::new(1).compute(&closes), closes.to_vec());
        assert_eq!(Lowest::new(1).compute(&closes), closes.to_vec());
    }
}
