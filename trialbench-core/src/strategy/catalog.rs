//! Built-in strategy catalog.
//!
//! | name | kind | entry | exit |
//! |---|---|---|---|
//! | buy_and_hold | pair | AlwaysLong | (entry) |
//! | close_vs_sma | pair | CloseVsSma(15, .05) | CloseVsSma(60, .05) |
//! | mean_reversion | pair | MeanReversion(30, 90) | same |
//! | prev_peak | pair | PrevPeak(90, .9, 1.1) | same |
//! | random | pair | Random(.1) | Random(.1) |
//! | prev_peak_nodrop | no-drop | PrevPeak | PrevPeak |
//! | close_vs_sma_nodrop | no-drop | CloseVsSma(15, .05) | CloseVsSma(15, .05) |
//! | mean_reversion_nodrop | no-drop | MeanReversion(30, 90) | same |
//! | anti_drop | anti-drop | up: MeanReversion(30, 90) | down: MeanReversion(5, 30) |

use super::StrategyDescriptor;
use crate::signals::Signal;

/// Names of every catalog strategy, in catalog order.
pub const CATALOG_NAMES: [&str; 9] = [
    "buy_and_hold",
    "close_vs_sma",
    "mean_reversion",
    "prev_peak",
    "random",
    "prev_peak_nodrop",
    "close_vs_sma_nodrop",
    "mean_reversion_nodrop",
    "anti_drop",
];

fn prev_peak() -> Signal {
    Signal::prev_peak(90, 0.9, 1.1)
}

fn mean_reversion() -> Signal {
    Signal::mean_reversion(30, 90)
}

/// Every built-in strategy.
pub fn catalog() -> Vec<StrategyDescriptor> {
    CATALOG_NAMES.iter().filter_map(|name| find(name)).collect()
}

/// Look up a catalog strategy by name.
pub fn find(name: &str) -> Option<StrategyDescriptor> {
    let desc = match name {
        "buy_and_hold" => StrategyDescriptor::signal_pair(name, Signal::AlwaysLong, None),
        "close_vs_sma" => StrategyDescriptor::signal_pair(
            name,
            Signal::close_vs_sma(15, 0.05),
            Some(Signal::close_vs_sma(60, 0.05)),
        ),
        "mean_reversion" => {
            StrategyDescriptor::signal_pair(name, mean_reversion(), Some(mean_reversion()))
        }
        "prev_peak" => StrategyDescriptor::signal_pair(name, prev_peak(), Some(prev_peak())),
        "random" => StrategyDescriptor::signal_pair(
            name,
            Signal::random(0.1),
            Some(Signal::random(0.1)),
        ),
        "prev_peak_nodrop" => StrategyDescriptor::no_drop(name, prev_peak(), prev_peak()),
        "close_vs_sma_nodrop" => StrategyDescriptor::no_drop(
            name,
            Signal::close_vs_sma(15, 0.05),
            Signal::close_vs_sma(15, 0.05),
        ),
        "mean_reversion_nodrop" => {
            StrategyDescriptor::no_drop(name, mean_reversion(), mean_reversion())
        }
        "anti_drop" => StrategyDescriptor::anti_drop(
            name,
            Signal::mean_reversion(5, 30),
            Signal::mean_reversion(30, 90),
        ),
        _ => return None,
    };
    Some(desc)
}
