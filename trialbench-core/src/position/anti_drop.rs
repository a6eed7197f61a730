//! AntiDrop state machine.
//!
//! - First evaluated bar: buy unconditionally (`initial_buy` is set once).
//! - Flat: re-enter when the price exceeds the last `sell_price` OR the
//!   long-window "up" vote (`BarInput::entry`) is positive. One buy even if
//!   both hold.
//! - Long: close whenever the short-window "down" vote (`BarInput::exit`) is
//!   negative, recording `sell_price`. No price guard unless `exit_guard` is
//!   enabled, in which case the no-drop rule also applies here.

use super::{BarInput, PositionLogic};
use crate::domain::{Action, PositionState};

#[derive(Debug, Clone, Default)]
pub struct AntiDropMachine {
    state: PositionState,
    initial_buy: bool,
    buy_price: Option<f64>,
    sell_price: Option<f64>,
    exit_guard: bool,
}

impl AntiDropMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the no-drop guard to exits as well (off by default).
    pub fn with_exit_guard(mut self, exit_guard: bool) -> Self {
        self.exit_guard = exit_guard;
        self
    }

    pub fn initial_buy(&self) -> bool {
        self.initial_buy
    }

    pub fn buy_price(&self) -> Option<f64> {
        self.buy_price
    }

    /// Price recorded at the most recent close.
    pub fn sell_price(&self) -> Option<f64> {
        self.sell_price
    }

    fn buy(&mut self, price: f64) -> Option<Action> {
        self.state = PositionState::Long;
        self.buy_price = Some(price);
        Some(Action::Buy)
    }
}

impl PositionLogic for AntiDropMachine {
    fn name(&self) -> &str {
        "anti_drop"
    }

    fn state(&self) -> PositionState {
        self.state
    }

    fn on_bar(&mut self, bar: BarInput) -> Option<Action> {
        if !self.initial_buy {
            self.initial_buy = true;
            return self.buy(bar.price);
        }

        match self.state {
            PositionState::Flat => {
                let above_last_sale = self.sell_price.is_some_and(|sp| bar.price > sp);
                if above_last_sale || bar.entry > 0 {
                    return self.buy(bar.price);
                }
                None
            }
            PositionState::Long => {
                let guard_ok =
                    !self.exit_guard || self.buy_price.is_some_and(|bp| bar.price > bp);
                if bar.exit < 0 && guard_ok {
                    self.state = PositionState::Flat;
                    self.sell_price = Some(bar.price);
                    return Some(Action::Close);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_bar_always_buys() {
        let mut m = AntiDropMachine::new();
        assert!(!m.initial_buy());
        // Votes that would otherwise mean "exit" are irrelevant on the first bar.
        assert_eq!(m.on_bar(BarInput::new(50.0, -1, -1)), Some(Action::Buy));
        assert!(m.initial_buy());
        assert_eq!(m.state(), PositionState::Long);
    }

    #[test]
    fn exit_has_no_price_guard_by_default() {
        let mut m = AntiDropMachine::new();
        m.on_bar(BarInput::new(100.0, 0, 0));
        assert_eq!(m.on_bar(BarInput::new(60.0, 0, -1)), Some(Action::Close));
        assert_eq!(m.sell_price(), Some(60.0));
    }

    #[test]
    fn exit_guard_blocks_losing_exit_when_enabled() {
        let mut m = AntiDropMachine::new().with_exit_guard(true);
        m.on_bar(BarInput::new(100.0, 0, 0));
        assert_eq!(m.on_bar(BarInput::new(60.0, 0, -1)), None);
        assert_eq!(m.on_bar(BarInput::new(110.0, 0, -1)), Some(Action::Close));
    }

    #[test]
    fn re_enters_when_price_exceeds_last_sale() {
        let mut m = AntiDropMachine::new();
        m.on_bar(BarInput::new(100.0, 0, 0));
        m.on_bar(BarInput::new(90.0, 0, -1));
        assert_eq!(m.on_bar(BarInput::new(90.0, 0, 0)), None);
        assert_eq!(m.on_bar(BarInput::new(90.5, 0, 0)), Some(Action::Buy));
    }

    #[test]
    fn re_enters_on_up_vote_below_last_sale() {
        let mut m = AntiDropMachine::new();
        m.on_bar(BarInput::new(100.0, 0, 0));
        m.on_bar(BarInput::new(90.0, 0, -1));
        assert_eq!(m.on_bar(BarInput::new(70.0, 1, 0)), Some(Action::Buy));
    }

    #[test]
    fn initial_buy_happens_exactly_once() {
        let mut m = AntiDropMachine::new();
        let mut buys_while_unflagged = 0;
        for i in 0..20 {
            let was_initial = m.initial_buy();
            let action = m.on_bar(BarInput::new(100.0 - i as f64, 0, -1));
            if !was_initial && action == Some(Action::Buy) {
                buys_while_unflagged += 1;
            }
        }
        assert_eq!(buys_while_unflagged, 1);
    }
}
