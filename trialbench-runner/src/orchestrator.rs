//! Trial orchestrator: fans {strategy × ticker} × N trials out to a worker pool.
//!
//! Every trial is an independent task: sample a window, build a fresh
//! strategy context, run the engine, package the result. Tasks share only
//! read-only inputs (descriptors, series, engine, config), so the pool needs
//! no locks. Per-trial randomness is derived from the master seed, which
//! makes the table identical for any worker count.

use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Serialize, Serializer};
use thiserror::Error;
use tracing::{debug, info, warn};
use trialbench_core::domain::PriceSeries;
use trialbench_core::engine::{BacktestEngine, EngineError, RunLimits, SimulationContext};
use trialbench_core::rng::{RngHierarchy, RngStream};
use trialbench_core::strategy::StrategyDescriptor;

use crate::config::{ConfigError, TrialConfig};
use crate::results::{ResultsTable, RunReport, TrialResult};
use crate::sampler::{IntervalSampler, SamplingError};

/// Errors that abort a whole run before any trial starts.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a single trial produced no row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrialError {
    #[error("sampling failed: {0}")]
    Sampling(#[from] SamplingError),

    #[error("engine failed: {0}")]
    Engine(#[from] EngineError),

    #[error("trial exceeded its time budget after {elapsed_ms} ms")]
    Timeout { elapsed_ms: u64 },

    #[error("engine panicked: {0}")]
    Panicked(String),
}

/// A trial that was excluded from the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialFailure {
    pub strategy: String,
    pub ticker: String,
    pub trial: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: TrialError,
}

fn serialize_display<S: Serializer>(error: &TrialError, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(error)
}

/// Progress snapshot passed to the optional callback after each finished trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialProgress {
    pub completed: usize,
    pub failed: usize,
    pub total: usize,
}

impl TrialProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Progress callback shared by all workers.
pub type ProgressFn<'a> = &'a (dyn Fn(&TrialProgress) + Sync);

/// One unit of work.
#[derive(Debug, Clone, Copy)]
struct TrialTask<'a> {
    descriptor: &'a StrategyDescriptor,
    ticker: &'a str,
    series: &'a PriceSeries,
    trial: usize,
}

enum TaskOutcome {
    Done(TrialResult),
    Failed(TrialFailure),
    Skipped,
}

/// Read-only state every worker needs.
struct TrialRunner<'a> {
    engine: &'a dyn BacktestEngine,
    sampler: IntervalSampler,
    rng: RngHierarchy,
    initial_cash: f64,
    timeout: Option<Duration>,
}

impl TrialRunner<'_> {
    fn run(&self, task: &TrialTask<'_>) -> Result<TrialResult, TrialError> {
        let started = Instant::now();
        let name = task.descriptor.name();
        let trial = task.trial as u64;

        let mut sampler_rng = self.rng.rng_for(RngStream::Sampler, name, task.ticker, trial);
        let window = self.sampler.sample(task.series, &mut sampler_rng)?;

        let seed = self.rng.sub_seed(RngStream::Strategy, name, task.ticker, trial);
        let mut context = SimulationContext::from_descriptor(task.descriptor, seed, self.initial_cash);
        let limits = RunLimits {
            deadline: self.timeout.and_then(|t| started.checked_add(t)),
        };

        let timed_out = || TrialError::Timeout {
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.engine.run(&mut context, window.bars, &limits)
        }))
        .map_err(|payload| TrialError::Panicked(panic_message(payload.as_ref())))?;

        let outcome = match outcome {
            Err(EngineError::DeadlineExceeded { .. }) => return Err(timed_out()),
            other => other?,
        };
        if self.timeout.is_some_and(|t| started.elapsed() > t) {
            return Err(timed_out());
        }

        debug!(
            strategy = name,
            ticker = task.ticker,
            trial = task.trial,
            start_day = window.bounds.start_day,
            interval_len = window.bounds.interval_len,
            bars = outcome.bars,
            value = outcome.value_ratio(),
            drawdown = outcome.max_drawdown,
            "trial complete"
        );

        Ok(TrialResult {
            strategy: name.to_string(),
            ticker: task.ticker.to_string(),
            value_ratio: outcome.value_ratio(),
            max_drawdown: outcome.max_drawdown,
            trial: task.trial,
            start_day: window.bounds.start_day,
            interval_len: window.bounds.interval_len,
            bars: outcome.bars,
        })
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Run `config.trials` trials of every strategy on every series.
///
/// # Arguments
/// - `config`: trial count, pool width, cash, sampling bounds, seed, timeout.
/// - `engine`: shared engine used by every trial.
/// - `strategies`: descriptors with unique names.
/// - `data`: ticker → series. Iterated in key order, so task order is stable.
/// - `progress`: optional callback, invoked from worker threads after each trial.
/// - `cancel`: optional flag; once set, tasks not yet started are skipped.
///
/// Failed trials never abort the run: they are left out of the table and
/// listed in `RunReport::failures`.
pub fn evaluate_strategies(
    config: &TrialConfig,
    engine: &dyn BacktestEngine,
    strategies: &[StrategyDescriptor],
    data: &BTreeMap<String, PriceSeries>,
    progress: Option<ProgressFn<'_>>,
    cancel: Option<&AtomicBool>,
) -> Result<RunReport, RunError> {
    config.validate()?;
    if strategies.is_empty() {
        return Err(ConfigError::NoStrategies.into());
    }
    for (i, desc) in strategies.iter().enumerate() {
        if strategies[..i].iter().any(|d| d.name() == desc.name()) {
            return Err(ConfigError::DuplicateStrategy(desc.name().to_string()).into());
        }
    }
    if data.is_empty() {
        return Err(ConfigError::NoTickers.into());
    }

    let tasks: Vec<TrialTask<'_>> = strategies
        .iter()
        .flat_map(move |descriptor| {
            data.iter().flat_map(move |(ticker, series)| {
                (0..config.trials).map(move |trial| TrialTask {
                    descriptor,
                    ticker: ticker.as_str(),
                    series,
                    trial,
                })
            })
        })
        .collect();
    let total = tasks.len();

    info!(
        strategies = strategies.len(),
        tickers = data.len(),
        trials = config.trials,
        workers = config.workers,
        total,
        engine = engine.name(),
        seed = config.master_seed,
        "starting evaluation"
    );

    let runner = TrialRunner {
        engine,
        sampler: IntervalSampler::from_config(&config.sampling),
        rng: RngHierarchy::new(config.master_seed),
        initial_cash: config.initial_cash,
        timeout: config.timeout(),
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .build()?;

    let start_time = Instant::now();
    let completed = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);

    let outcomes: Vec<TaskOutcome> = pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                if cancel.is_some_and(|f| f.load(Ordering::Relaxed)) {
                    return TaskOutcome::Skipped;
                }

                let outcome = match runner.run(task) {
                    Ok(result) => TaskOutcome::Done(result),
                    Err(error) => {
                        warn!(
                            strategy = task.descriptor.name(),
                            ticker = task.ticker,
                            trial = task.trial,
                            %error,
                            "trial failed"
                        );
                        failed.fetch_add(1, Ordering::Relaxed);
                        TaskOutcome::Failed(TrialFailure {
                            strategy: task.descriptor.name().to_string(),
                            ticker: task.ticker.to_string(),
                            trial: task.trial,
                            error,
                        })
                    }
                };

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(cb) = progress {
                    cb(&TrialProgress {
                        completed: done,
                        failed: failed.load(Ordering::Relaxed),
                        total,
                    });
                }
                outcome
            })
            .collect()
    });

    let mut report = RunReport {
        total_tasks: total,
        ..Default::default()
    };
    let mut table = ResultsTable::new();
    for outcome in outcomes {
        match outcome {
            TaskOutcome::Done(result) => table.push(result),
            TaskOutcome::Failed(failure) => report.failures.push(failure),
            TaskOutcome::Skipped => report.skipped += 1,
        }
    }
    report.succeeded = table.len();
    report.table = table;
    report.elapsed_secs = start_time.elapsed().as_secs_f64();

    if report.was_cancelled() {
        warn!(skipped = report.skipped, "evaluation cancelled");
    }
    info!(
        succeeded = report.succeeded,
        failed = report.failures.len(),
        skipped = report.skipped,
        elapsed_secs = report.elapsed_secs,
        "evaluation finished"
    );

    Ok(report)
}

/// Resolve the configured catalog strategies and evaluate them.
pub fn evaluate_catalog(
    config: &TrialConfig,
    engine: &dyn BacktestEngine,
    data: &BTreeMap<String, PriceSeries>,
    progress: Option<ProgressFn<'_>>,
    cancel: Option<&AtomicBool>,
) -> Result<RunReport, RunError> {
    let strategies = config.resolve_strategies()?;
    evaluate_strategies(config, engine, &strategies, data, progress, cancel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_extracts_strings() {
        let s: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(s.as_ref()), "boom");
        let s: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(s.as_ref()), "bang");
        let s: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(s.as_ref()), "non-string panic payload");
    }

    #[test]
    fn progress_fraction() {
        let p = TrialProgress {
            completed: 3,
            failed: 0,
            total: 12,
        };
        assert!((p.fraction() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn failure_serializes_error_as_text() {
        let f = TrialFailure {
            strategy: "s".into(),
            ticker: "T".into(),
            trial: 2,
            error: TrialError::Timeout { elapsed_ms: 15 },
        };
        let json = serde_json::to_value(&f).unwrap();
        assert_eq!(json["error"], "trial exceeded its time budget after 15 ms");
        assert_eq!(json["trial"], 2);
    }
}
