//! Reference bar engine: close-price fills, no costs, fractional shares.

use tracing::trace;

use crate::domain::{Action, Bar};
use crate::position::BarInput;
use crate::sizers::Sizer;

use super::{BacktestEngine, EngineError, EngineOutcome, RunLimits, SimulationContext};

/// Single-instrument, long-only engine.
///
/// Signal votes are precomputed over the whole slice (each signal only
/// looks at closes up to the bar it votes on), then bars are walked once.
/// Bars before the strategy's warm-up only mark equity.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarEngine;

impl BarEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Cash and share holdings during a run.
#[derive(Debug, Clone, Copy)]
struct Book {
    cash: f64,
    shares: f64,
}

impl Book {
    fn equity(&self, price: f64) -> f64 {
        self.cash + self.shares * price
    }
}

impl BacktestEngine for BarEngine {
    fn name(&self) -> &str {
        "bar"
    }

    fn run(
        &self,
        context: &mut SimulationContext,
        bars: &[Bar],
        limits: &RunLimits,
    ) -> Result<EngineOutcome, EngineError> {
        if bars.is_empty() {
            return Err(EngineError::EmptySlice);
        }
        if let Some((index, bar)) = bars.iter().enumerate().find(|(_, b)| !b.has_valid_close()) {
            return Err(EngineError::InvalidPrice {
                index,
                price: bar.close,
            });
        }

        let initial_cash = context.initial_cash();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let (strategy, sizer, drawdown) = context.parts_mut();
        let warmup = strategy.warmup_bars();
        let (entry, exit) = strategy.votes(&closes);

        let mut book = Book {
            cash: initial_cash,
            shares: 0.0,
        };
        let mut trades = 0usize;

        for (t, &price) in closes.iter().enumerate() {
            if limits.expired() {
                return Err(EngineError::DeadlineExceeded { bar: t });
            }

            if t >= warmup {
                match strategy.on_bar(BarInput::new(price, entry[t], exit[t])) {
                    Some(Action::Buy) => {
                        let qty = sizer.size(book.cash, price);
                        book.shares += qty;
                        book.cash = (book.cash - qty * price).max(0.0);
                        trades += 1;
                        trace!(bar = t, price, qty, "buy");
                    }
                    Some(Action::Close) => {
                        book.cash += book.shares * price;
                        book.shares = 0.0;
                        trace!(bar = t, price, cash = book.cash, "close");
                    }
                    None => {}
                }
            }

            drawdown.update(book.equity(price));
        }

        let last = closes[closes.len() - 1];
        Ok(EngineOutcome {
            initial_cash,
            terminal_equity: book.equity(last),
            max_drawdown: drawdown.max_drawdown(),
            bars: bars.len(),
            trades,
        })
    }
}
