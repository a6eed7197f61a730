//! TrialBench Core: domain types, signals, position machines, strategies, engine.
//!
//! This crate contains everything a single trial needs:
//! - Domain types (bars, validated price series, position state)
//! - Indicators and the closed set of per-bar signals
//! - Position state machines (signal pair, no-drop, anti-drop)
//! - Strategy descriptors and the built-in catalog
//! - The engine contract plus the reference bar engine
//! - The deterministic RNG hierarchy that seeds each trial

pub mod domain;
pub mod engine;
pub mod indicators;
pub mod position;
pub mod rng;
pub mod signals;
pub mod sizers;
pub mod strategy;
