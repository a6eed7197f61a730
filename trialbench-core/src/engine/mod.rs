//! Backtesting engine: the opaque collaborator a trial hands its slice to.
//!
//! The harness only depends on the [`BacktestEngine`] contract:
//! given a [`SimulationContext`] and a price slice, run the strategy and
//! report terminal equity plus max drawdown. [`BarEngine`] is the reference
//! implementation: one pass per slice, fills at the close, no costs.
//!
//! Per bar, from warm-up onwards:
//! 1. Feed price and precomputed signal votes to the position machine
//! 2. Apply the resulting action at the close (buy with sized cash / liquidate)
//! 3. Mark-to-market and feed the drawdown analyzer

pub mod bar_engine;
pub mod context;
pub mod drawdown;

pub use bar_engine::BarEngine;
pub use context::SimulationContext;
pub use drawdown::{max_drawdown, DrawdownAnalyzer};

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// Failure of a single engine run. Never retried by the harness.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("price slice is empty")]
    EmptySlice,

    #[error("invalid close price {price} at bar {index}")]
    InvalidPrice { index: usize, price: f64 },

    #[error("deadline exceeded at bar {bar}")]
    DeadlineExceeded { bar: usize },
}

/// Resource limits for one engine run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunLimits {
    /// Checked cooperatively once per bar.
    pub deadline: Option<Instant>,
}

impl RunLimits {
    /// No limits.
    pub fn none() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

/// What a successful run reports back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineOutcome {
    pub initial_cash: f64,
    pub terminal_equity: f64,
    /// Positive peak-to-trough fraction.
    pub max_drawdown: f64,
    /// Bars in the slice.
    pub bars: usize,
    /// Completed buy/close round trips plus any position still open at the end.
    pub trades: usize,
}

impl EngineOutcome {
    /// Terminal equity over initial cash.
    pub fn value_ratio(&self) -> f64 {
        self.terminal_equity / self.initial_cash
    }
}

/// Runs one strategy over one price slice.
pub trait BacktestEngine: Send + Sync {
    fn name(&self) -> &str;

    fn run(
        &self,
        context: &mut SimulationContext,
        bars: &[Bar],
        limits: &RunLimits,
    ) -> Result<EngineOutcome, EngineError>;
}
