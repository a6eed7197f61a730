//! Strategy descriptors: named factories for per-trial strategy instances.
//!
//! A `StrategyDescriptor` is plain data: a name, a position-logic kind and the
//! signals wired into it. `instantiate` is the factory: every call builds a new
//! `StrategyInstance` with its own state machine and its own RNG, so no state
//! can leak between trials.

pub mod catalog;

pub use catalog::{catalog, find, CATALOG_NAMES};

use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::domain::{Action, PositionState};
use crate::position::{
    AntiDropMachine, BarInput, NoDropMachine, PositionLogic, SignalPairMachine,
};
use crate::signals::{Signal, SignalValue};

/// Which position machine a strategy runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrategyKind {
    /// Entry/exit votes drive the engine directly.
    SignalPair,
    /// Entry/exit votes with the no-drop exit guard.
    NoDrop,
    /// Initial buy, price/vote re-entry, down-vote exit.
    AntiDrop {
        #[serde(default)]
        exit_guard: bool,
    },
}

/// Named, parameterless description of a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyDescriptor {
    name: String,
    kind: StrategyKind,
    entry: Signal,
    #[serde(default)]
    exit: Option<Signal>,
}

impl StrategyDescriptor {
    /// Stateless entry/exit composition. Without an exit signal, a negative
    /// entry vote closes the position.
    pub fn signal_pair(name: impl Into<String>, entry: Signal, exit: Option<Signal>) -> Self {
        Self {
            name: name.into(),
            kind: StrategyKind::SignalPair,
            entry,
            exit,
        }
    }

    /// No-drop guarded composition.
    pub fn no_drop(name: impl Into<String>, entry: Signal, exit: Signal) -> Self {
        Self {
            name: name.into(),
            kind: StrategyKind::NoDrop,
            entry,
            exit: Some(exit),
        }
    }

    /// AntiDrop: `down` drives exits while long, `up` triggers re-entry while flat.
    pub fn anti_drop(name: impl Into<String>, down: Signal, up: Signal) -> Self {
        Self {
            name: name.into(),
            kind: StrategyKind::AntiDrop { exit_guard: false },
            entry: up,
            exit: Some(down),
        }
    }

    /// Enable or disable the AntiDrop exit guard. No effect on other kinds.
    pub fn with_exit_guard(mut self, exit_guard: bool) -> Self {
        if let StrategyKind::AntiDrop { .. } = self.kind {
            self.kind = StrategyKind::AntiDrop { exit_guard };
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn entry(&self) -> &Signal {
        &self.entry
    }

    pub fn exit(&self) -> Option<&Signal> {
        self.exit.as_ref()
    }

    /// Whether any wired signal consumes randomness.
    pub fn is_stochastic(&self) -> bool {
        self.entry.is_stochastic() || self.exit.is_some_and(|s| s.is_stochastic())
    }

    /// Build a fresh, independent instance. `seed` feeds stochastic signals.
    pub fn instantiate(&self, seed: u64) -> StrategyInstance {
        let logic: Box<dyn PositionLogic> = match self.kind {
            StrategyKind::SignalPair => Box::new(SignalPairMachine::new()),
            StrategyKind::NoDrop => Box::new(NoDropMachine::new()),
            StrategyKind::AntiDrop { exit_guard } => {
                Box::new(AntiDropMachine::new().with_exit_guard(exit_guard))
            }
        };
        StrategyInstance {
            name: self.name.clone(),
            entry: self.entry,
            exit: self.exit,
            logic,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

/// One strategy, live inside one trial.
///
/// Owns its position machine and RNG exclusively. Never cloned, never reused.
pub struct StrategyInstance {
    name: String,
    entry: Signal,
    exit: Option<Signal>,
    logic: Box<dyn PositionLogic>,
    rng: StdRng,
}

impl StrategyInstance {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Index of the first bar the position logic is evaluated on.
    pub fn warmup_bars(&self) -> usize {
        let exit = self.exit.map_or(0, |s| s.warmup_bars());
        self.entry.warmup_bars().max(exit)
    }

    pub fn state(&self) -> PositionState {
        self.logic.state()
    }

    /// Precompute entry and exit votes for the whole slice.
    ///
    /// Entry is computed before exit, so stochastic signals draw in a fixed
    /// order. Without an exit signal the entry votes double as exit votes.
    pub fn votes(&mut self, closes: &[f64]) -> (Vec<SignalValue>, Vec<SignalValue>) {
        let entry = self.entry.compute(closes, &mut self.rng);
        let exit = match self.exit {
            Some(signal) => signal.compute(closes, &mut self.rng),
            None => entry.clone(),
        };
        (entry, exit)
    }

    /// Advance the position machine by one bar.
    pub fn on_bar(&mut self, bar: BarInput) -> Option<Action> {
        self.logic.on_bar(bar)
    }
}

impl fmt::Debug for StrategyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyInstance")
            .field("name", &self.name)
            .field("entry", &self.entry)
            .field("exit", &self.exit)
            .field("logic", &self.logic.name())
            .field("state", &self.logic.state())
            .finish()
    }
}
