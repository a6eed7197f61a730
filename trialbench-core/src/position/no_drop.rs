//! No-drop guarded state machine.
//!
//! Flat → Long when the entry vote is positive; the bar price is recorded as
//! `buy_price`. Long → Flat only when the exit vote is negative AND the price
//! is strictly above `buy_price`. An exit vote at or below the entry price is
//! ignored and the position stays open.

use super::{BarInput, PositionLogic};
use crate::domain::{Action, PositionState};

#[derive(Debug, Clone, Default)]
pub struct NoDropMachine {
    state: PositionState,
    buy_price: Option<f64>,
}

impl NoDropMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Price recorded at the most recent buy.
    pub fn buy_price(&self) -> Option<f64> {
        self.buy_price
    }
}

impl PositionLogic for NoDropMachine {
    fn name(&self) -> &str {
        "no_drop"
    }

    fn state(&self) -> PositionState {
        self.state
    }

    fn on_bar(&mut self, bar: BarInput) -> Option<Action> {
        match self.state {
            PositionState::Flat => {
                if bar.entry > 0 {
                    self.state = PositionState::Long;
                    self.buy_price = Some(bar.price);
                    return Some(Action::Buy);
                }
                None
            }
            PositionState::Long => {
                let above_entry = self.buy_price.is_some_and(|bp| bar.price > bp);
                if bar.exit < 0 && above_entry {
                    self.state = PositionState::Flat;
                    return Some(Action::Close);
                }
                None
            }
        }
    }
}
