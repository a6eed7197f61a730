//! Trial results, the results table and per-strategy summaries.

use serde::{Deserialize, Serialize};

use crate::orchestrator::TrialFailure;

/// Outcome of one successful trial.
///
/// The table contract is `(strategy, ticker, value, dropdown)`; the remaining
/// fields are diagnostics and never exported as table columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub strategy: String,
    pub ticker: String,
    /// Terminal equity / initial cash.
    pub value_ratio: f64,
    /// Positive peak-to-trough fraction.
    pub max_drawdown: f64,
    pub trial: usize,
    pub start_day: usize,
    pub interval_len: usize,
    /// Records in the sampled slice.
    pub bars: usize,
}

/// One row per successful trial, in task order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    rows: Vec<TrialResult>,
}

impl ResultsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: TrialResult) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TrialResult] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrialResult> {
        self.rows.iter()
    }

    pub fn for_strategy<'a>(&'a self, strategy: &'a str) -> impl Iterator<Item = &'a TrialResult> {
        self.rows.iter().filter(move |r| r.strategy == strategy)
    }

    pub fn for_ticker<'a>(&'a self, ticker: &'a str) -> impl Iterator<Item = &'a TrialResult> {
        self.rows.iter().filter(move |r| r.ticker == ticker)
    }

    /// Per-strategy summaries, in order of each strategy's first row.
    pub fn summaries(&self) -> Vec<StrategySummary> {
        let mut order: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !order.contains(&row.strategy.as_str()) {
                order.push(&row.strategy);
            }
        }
        order
            .into_iter()
            .map(|name| StrategySummary::from_rows(name, self.for_strategy(name)))
            .collect()
    }
}

impl FromIterator<TrialResult> for ResultsTable {
    fn from_iter<I: IntoIterator<Item = TrialResult>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultsTable {
    type Item = &'a TrialResult;
    type IntoIter = std::slice::Iter<'a, TrialResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Aggregate view of one strategy's trials across all tickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub strategy: String,
    pub trials: usize,
    pub mean_value: f64,
    /// Sample standard deviation; 0.0 for a single trial.
    pub std_value: f64,
    pub mean_drawdown: f64,
    pub worst_drawdown: f64,
}

impl StrategySummary {
    pub fn from_rows<'a>(strategy: &str, rows: impl IntoIterator<Item = &'a TrialResult>) -> Self {
        let (values, drawdowns): (Vec<f64>, Vec<f64>) = rows
            .into_iter()
            .map(|r| (r.value_ratio, r.max_drawdown))
            .unzip();
        let n = values.len();
        let mean = |xs: &[f64]| {
            if xs.is_empty() {
                0.0
            } else {
                xs.iter().sum::<f64>() / xs.len() as f64
            }
        };
        let mean_value = mean(&values);
        let std_value = if n < 2 {
            0.0
        } else {
            let var = values
                .iter()
                .map(|v| (v - mean_value).powi(2))
                .sum::<f64>()
                / (n - 1) as f64;
            var.sqrt()
        };
        Self {
            strategy: strategy.to_string(),
            trials: n,
            mean_value,
            std_value,
            mean_drawdown: mean(&drawdowns),
            worst_drawdown: drawdowns.iter().copied().fold(0.0, f64::max),
        }
    }
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub table: ResultsTable,
    pub succeeded: usize,
    pub failures: Vec<TrialFailure>,
    /// Tasks never started because the run was cancelled.
    pub skipped: usize,
    pub total_tasks: usize,
    pub elapsed_secs: f64,
}

impl RunReport {
    pub fn was_cancelled(&self) -> bool {
        self.skipped > 0
    }

    pub fn summaries(&self) -> Vec<StrategySummary> {
        self.table.summaries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(strategy: &str, ticker: &str, value: f64, dd: f64) -> TrialResult {
        TrialResult {
            strategy: strategy.into(),
            ticker: ticker.into(),
            value_ratio: value,
            max_drawdown: dd,
            trial: 0,
            start_day: 0,
            interval_len: 150,
            bars: 100,
        }
    }

    #[test]
    fn summaries_per_strategy() {
        let table: ResultsTable = vec![
            row("a", "X", 1.0, 0.1),
            row("b", "X", 2.0, 0.0),
            row("a", "Y", 3.0, 0.3),
        ]
        .into_iter()
        .collect();

        let s = table.summaries();
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].strategy, "a");
        assert_eq!(s[0].trials, 2);
        assert!((s[0].mean_value - 2.0).abs() < 1e-12);
        assert!((s[0].std_value - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((s[0].mean_drawdown - 0.2).abs() < 1e-12);
        assert!((s[0].worst_drawdown - 0.3).abs() < 1e-12);

        assert_eq!(s[1].strategy, "b");
        assert_eq!(s[1].std_value, 0.0);
    }

    #[test]
    fn filters() {
        let table: ResultsTable = vec![
            row("a", "X", 1.0, 0.1),
            row("b", "X", 2.0, 0.0),
            row("a", "Y", 3.0, 0.3),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.for_strategy("a").count(), 2);
        assert_eq!(table.for_ticker("X").count(), 2);
        assert_eq!(table.for_ticker("Z").count(), 0);
    }

    #[test]
    fn duplicate_rows_are_kept() {
        let mut table = ResultsTable::new();
        table.push(row("a", "X", 1.0, 0.0));
        table.push(row("a", "X", 1.0, 0.0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn empty_summary() {
        let s = StrategySummary::from_rows("none", std::iter::empty());
        assert_eq!(s.trials, 0);
        assert_eq!(s.mean_value, 0.0);
    }
}
