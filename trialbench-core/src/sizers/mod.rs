//! Position Sizers: determine trade quantity
//!
//! Sizers translate available cash into a share quantity at the fill price.
//! They are signal-agnostic: the position logic decides *whether* to buy,
//! the sizer decides *how much*.

pub mod percent;

pub use percent::PercentSizer;

/// Position sizing logic.
pub trait Sizer: Send + Sync {
    /// Quantity (fractional shares) to buy with `cash` at `price`.
    ///
    /// Returns 0.0 for non-positive cash or price.
    fn size(&self, cash: f64, price: f64) -> f64;

    /// Sizer name for logging.
    fn name(&self) -> &str;
}
