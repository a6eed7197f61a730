use serde::{Deserialize, Serialize};

/// Whether a running strategy currently holds its position.
///
/// Long-only: there is no short state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositionState {
    #[default]
    Flat,
    Long,
}

/// Order the position logic asks the engine to execute on the current bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Open a long position sized by the engine's sizer.
    Buy,
    /// Liquidate the whole position.
    Close,
}
