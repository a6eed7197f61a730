//! Interval sampler: draws the random sub-range each trial runs on.
//!
//! For a series of `days` records:
//! - `interval_len` is uniform in `[min_interval, days - end_buffer)`
//! - `start_day` is uniform in `[0, days - interval_len)`
//!
//! The slice is every record dated within the *calendar* window
//! `[first_date + start_day, first_date + start_day + interval_len]`
//! (both ends inclusive). Offsets are counted in records but applied as
//! calendar days, so on trading-day data the slice holds fewer records than
//! `interval_len`.

use chrono::{Duration, NaiveDate};
use rand::Rng;
use serde::Serialize;
use thiserror::Error;
use trialbench_core::domain::{Bar, PriceSeries};

use crate::config::SamplingConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    #[error("series has {days} records, sampling needs at least {required}")]
    SeriesTooShort { days: usize, required: usize },
}

/// Window offsets drawn for one trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowBounds {
    pub start_day: usize,
    pub interval_len: usize,
}

/// A drawn window and the records it selects.
#[derive(Debug, Clone)]
pub struct SampledWindow<'a> {
    pub bounds: WindowBounds,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub bars: &'a [Bar],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalSampler {
    min_interval: usize,
    end_buffer: usize,
}

impl IntervalSampler {
    pub fn new(min_interval: usize, end_buffer: usize) -> Self {
        Self {
            min_interval,
            end_buffer,
        }
    }

    pub fn from_config(config: &SamplingConfig) -> Self {
        Self::new(config.min_interval_days, config.end_buffer_days)
    }

    /// Smallest series length that can be sampled.
    pub fn required_days(&self) -> usize {
        self.min_interval
            .saturating_add(self.end_buffer)
            .saturating_add(1)
    }

    /// Draw window offsets for a series of `days` records.
    ///
    /// Fails without touching `rng` when the series is too short.
    pub fn draw<R: Rng + ?Sized>(&self, days: usize, rng: &mut R) -> Result<WindowBounds, SamplingError> {
        let required = self.required_days();
        if days < required {
            return Err(SamplingError::SeriesTooShort { days, required });
        }
        let interval_len = rng.gen_range(self.min_interval..days - self.end_buffer);
        let start_day = rng.gen_range(0..days - interval_len);
        Ok(WindowBounds {
            start_day,
            interval_len,
        })
    }

    /// Draw a window over `series` and slice it.
    pub fn sample<'a, R: Rng + ?Sized>(
        &self,
        series: &'a PriceSeries,
        rng: &mut R,
    ) -> Result<SampledWindow<'a>, SamplingError> {
        let bounds = self.draw(series.len(), rng)?;
        let start_date = series.first_date() + Duration::days(bounds.start_day as i64);
        let end_date = start_date + Duration::days(bounds.interval_len as i64);
        Ok(SampledWindow {
            bounds,
            start_date,
            end_date,
            bars: series.between(start_date, end_date),
        })
    }
}

impl Default for IntervalSampler {
    fn default() -> Self {
        Self::from_config(&SamplingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn daily_series(n: usize) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        PriceSeries::from_closes(
            "D",
            (0..n).map(|i| (start + Duration::days(i as i64), 100.0 + i as f64)),
        )
        .unwrap()
    }

    #[test]
    fn required_days_default() {
        assert_eq!(IntervalSampler::default().required_days(), 181);
    }

    #[test]
    fn too_short_fails_before_drawing() {
        let sampler = IntervalSampler::default();
        let mut rng = StdRng::seed_from_u64(1);
        let mut untouched = StdRng::seed_from_u64(1);

        assert_eq!(
            sampler.draw(180, &mut rng),
            Err(SamplingError::SeriesTooShort {
                days: 180,
                required: 181
            })
        );
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn smallest_valid_series_has_one_window() {
        let sampler = IntervalSampler::default();
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..50 {
            let b = sampler.draw(181, &mut rng).unwrap();
            assert_eq!(b.interval_len, 150);
            assert!(b.start_day < 31);
        }
    }

    #[test]
    fn daily_data_slice_spans_interval_inclusive() {
        let series = daily_series(400);
        let sampler = IntervalSampler::default();
        let mut rng = StdRng::seed_from_u64(3);
        let w = sampler.sample(&series, &mut rng).unwrap();

        assert_eq!(w.bars.len(), w.bounds.interval_len + 1);
        assert_eq!(w.bars[0].date, w.start_date);
        assert_eq!(w.bars[w.bars.len() - 1].date, w.end_date);
    }

    #[test]
    fn trading_day_data_slice_is_shorter_than_interval() {
        // Weekdays only: 5 records per 7 calendar days.
        let mut date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap();
        let mut rows = Vec::new();
        while rows.len() < 1000 {
            use chrono::Datelike;
            if date.weekday().number_from_monday() <= 5 {
                rows.push((date, 50.0));
            }
            date += Duration::days(1);
        }
        let series = PriceSeries::from_closes("W", rows).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let w = IntervalSampler::default().sample(&series, &mut rng).unwrap();
        assert!(w.bars.len() < w.bounds.interval_len);
        assert!(w.bars.iter().all(|b| b.date >= w.start_date && b.date <= w.end_date));
    }

    #[test]
    fn same_seed_same_window() {
        let series = daily_series(1000);
        let s = IntervalSampler::default();
        let a = s.sample(&series, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = s.sample(&series, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a.bounds, b.bounds);
    }
}
