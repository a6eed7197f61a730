//! Bar and PriceSeries: the market data units the harness samples from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One dated price record for a single ticker.
///
/// Only `close` drives signals and the reference engine. The remaining OHLCV
/// fields are carried through from loaders when present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub volume: Option<f64>,
}

impl Bar {
    /// Close-only bar.
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self {
            date,
            close,
            open: None,
            high: None,
            low: None,
            volume: None,
        }
    }

    /// A close that can be traded at: finite and strictly positive.
    pub fn has_valid_close(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Errors raised when building a `PriceSeries`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series '{ticker}' is empty")]
    Empty { ticker: String },

    #[error("price series '{ticker}': date {date} at index {index} does not follow the previous date")]
    NonIncreasingDate {
        ticker: String,
        index: usize,
        date: NaiveDate,
    },
}

/// Ordered, immutable price history for one ticker.
///
/// Invariant: dates are strictly increasing (hence unique). Enforced at
/// construction; there is no way to mutate the bars afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { ticker });
        }
        if let Some(index) = bars
            .windows(2)
            .position(|w| w[1].date <= w[0].date)
            .map(|i| i + 1)
        {
            let date = bars[index].date;
            return Err(SeriesError::NonIncreasingDate {
                ticker,
                index,
                date,
            });
        }
        Ok(Self { ticker, bars })
    }

    /// Build from `(date, close)` pairs.
    pub fn from_closes(
        ticker: impl Into<String>,
        points: impl IntoIterator<Item = (NaiveDate, f64)>,
    ) -> Result<Self, SeriesError> {
        let bars = points
            .into_iter()
            .map(|(date, close)| Bar::new(date, close))
            .collect();
        Self::new(ticker, bars)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Number of records. The sampler treats this as the series length in "days".
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    /// Every bar whose date lies in `[start, end]` (both inclusive).
    ///
    /// Dates are sorted, so the matching bars form one contiguous slice.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> &[Bar] {
        if end < start {
            return &[];
        }
        let lo = self.bars.partition_point(|b| b.date < start);
        let hi = self.bars.partition_point(|b| b.date <= end);
        &self.bars[lo..hi]
    }
}
