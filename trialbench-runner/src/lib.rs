//! TrialBench Runner: randomized trial sampling and parallel strategy evaluation.
//!
//! This crate builds on `trialbench-core` to provide:
//! - Trial configuration (TOML, validated)
//! - The interval sampler that draws each trial's sub-range
//! - The orchestrator that fans {strategy × ticker} × N trials out to a rayon pool
//! - The results table, per-strategy summaries and the run report
//! - CSV / JSON export
//! - Price-series loading from CSV files, plus synthetic series

pub mod config;
pub mod data_loader;
pub mod export;
pub mod orchestrator;
pub mod results;
pub mod sampler;

pub use config::{ConfigError, SamplingConfig, TrialConfig, MAX_TRIAL_TIMEOUT_SECS};
pub use data_loader::{
    flat_series, load_series_csv, load_series_dir, read_series, synthetic_series, LoadError,
};
pub use export::{
    export_report_json, export_table_csv, format_summary, import_table_csv, save_report_json,
    save_table_csv, TableRow,
};
pub use orchestrator::{
    evaluate_catalog, evaluate_strategies, ProgressFn, RunError, TrialError, TrialFailure,
    TrialProgress,
};
pub use results::{ResultsTable, RunReport, StrategySummary, TrialResult};
pub use sampler::{IntervalSampler, SampledWindow, SamplingError, WindowBounds};
