//! Domain types for TrialBench

pub mod bar;
pub mod position;

pub use bar::{Bar, PriceSeries, SeriesError};
pub use position::{Action, PositionState};
