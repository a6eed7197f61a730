//! Per-trial simulation context.

use crate::sizers::PercentSizer;
use crate::strategy::{StrategyDescriptor, StrategyInstance};

use super::drawdown::DrawdownAnalyzer;

/// Everything one trial's engine run mutates: the strategy instance, the
/// starting cash, the sizer and the attached drawdown analyzer.
///
/// Built fresh for every trial and dropped when the trial ends.
#[derive(Debug)]
pub struct SimulationContext {
    strategy: StrategyInstance,
    initial_cash: f64,
    sizer: PercentSizer,
    drawdown: DrawdownAnalyzer,
}

impl SimulationContext {
    pub fn new(strategy: StrategyInstance, initial_cash: f64) -> Self {
        Self {
            strategy,
            initial_cash,
            sizer: PercentSizer::full(),
            drawdown: DrawdownAnalyzer::new(),
        }
    }

    /// Instantiate `descriptor` with `seed` and wrap it in a fresh context.
    pub fn from_descriptor(descriptor: &StrategyDescriptor, seed: u64, initial_cash: f64) -> Self {
        Self::new(descriptor.instantiate(seed), initial_cash)
    }

    pub fn set_cash(&mut self, cash: f64) {
        self.initial_cash = cash;
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn strategy(&self) -> &StrategyInstance {
        &self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut StrategyInstance {
        &mut self.strategy
    }

    pub fn sizer(&self) -> &PercentSizer {
        &self.sizer
    }

    pub fn drawdown(&self) -> &DrawdownAnalyzer {
        &self.drawdown
    }

    pub fn drawdown_mut(&mut self) -> &mut DrawdownAnalyzer {
        &mut self.drawdown
    }

    /// Split borrow for the engine loop.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (&mut StrategyInstance, &PercentSizer, &mut DrawdownAnalyzer) {
        (&mut self.strategy, &self.sizer, &mut self.drawdown)
    }
}
