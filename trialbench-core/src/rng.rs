//! Deterministic RNG hierarchy.
//!
//! A master seed generates deterministic sub-seeds for each
//! `(stream, strategy, ticker, trial)` tuple. Sub-seeds are derived via BLAKE3
//! hashing, independently of thread scheduling order, so a run produces the
//! same trials regardless of worker count.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Independent random streams consumed by a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RngStream {
    /// Draws the sampled window (interval length, start day).
    Sampler,
    /// Feeds stochastic signals inside the strategy instance.
    Strategy,
}

impl RngStream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sampler => "sampler",
            Self::Strategy => "strategy",
        }
    }
}

/// Deterministic RNG hierarchy.
///
/// Because derivation is hash-based (not order-dependent), the same master
/// seed produces identical sub-seeds regardless of the order in which trials
/// are processed.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for one stream of one trial.
    pub fn sub_seed(&self, stream: RngStream, strategy: &str, ticker: &str, trial: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(strategy.as_bytes());
        hasher.update(&[0]);
        hasher.update(ticker.as_bytes());
        hasher.update(&[0]);
        hasher.update(&trial.to_le_bytes());
        let hash = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(head)
    }

    /// Create a seeded StdRng for one stream of one trial.
    pub fn rng_for(&self, stream: RngStream, strategy: &str, ticker: &str, trial: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, strategy, ticker, trial))
    }
}
