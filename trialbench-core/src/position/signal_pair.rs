//! Stateless signal composition.
//!
//! Buys when flat and the entry vote is positive; closes when long and the
//! exit vote is negative. No price memory.

use super::{BarInput, PositionLogic};
use crate::domain::{Action, PositionState};

#[derive(Debug, Clone, Default)]
pub struct SignalPairMachine {
    state: PositionState,
}

impl SignalPairMachine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PositionLogic for SignalPairMachine {
    fn name(&self) -> &str {
        "signal_pair"
    }

    fn state(&self) -> PositionState {
        self.state
    }

    fn on_bar(&mut self, bar: BarInput) -> Option<Action> {
        match self.state {
            PositionState::Flat if bar.entry > 0 => {
                self.state = PositionState::Long;
                Some(Action::Buy)
            }
            PositionState::Long if bar.exit < 0 => {
                self.state = PositionState::Flat;
                Some(Action::Close)
            }
            _ => None,
        }
    }
}
