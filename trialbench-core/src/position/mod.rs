//! Position logic: turns per-bar signal votes into buy/close actions.
//!
//! Three machines, all long-only over `PositionState::{Flat, Long}`:
//! - `SignalPairMachine`: stateless composition. Entry vote > 0 buys, exit vote < 0 closes.
//! - `NoDropMachine`: like the pair, but never closes at or below the recorded buy price.
//! - `AntiDropMachine`: unconditional first buy, price/vote re-entry, unguarded exit.
//!
//! Each machine is owned by exactly one running strategy instance. The
//! current state selects the single branch evaluated on a bar, so a bar can
//! never both close and re-open a position.

pub mod anti_drop;
pub mod no_drop;
pub mod signal_pair;

pub use anti_drop::AntiDropMachine;
pub use no_drop::NoDropMachine;
pub use signal_pair::SignalPairMachine;

use crate::domain::{Action, PositionState};
use crate::signals::SignalValue;

/// Everything a machine sees on one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarInput {
    /// Price the action would execute at (the bar close).
    pub price: f64,
    /// Entry vote (AntiDrop: the re-entry "up" vote).
    pub entry: SignalValue,
    /// Exit vote (AntiDrop: the "down" vote).
    pub exit: SignalValue,
}

impl BarInput {
    pub fn new(price: f64, entry: SignalValue, exit: SignalValue) -> Self {
        Self { price, entry, exit }
    }
}

/// Per-bar position transition logic.
pub trait PositionLogic: Send {
    /// Machine name (for logging).
    fn name(&self) -> &str;

    fn state(&self) -> PositionState;

    /// Evaluate one bar, updating internal state.
    ///
    /// Returns the action the engine must execute, if any. A `Buy` is only
    /// ever returned from `Flat`, a `Close` only from `Long`.
    fn on_bar(&mut self, bar: BarInput) -> Option<Action>;
}
