//! TrialBench CLI: randomized trial evaluation of the strategy catalog.
//!
//! Commands:
//! - `run`: sample N random windows per (strategy, ticker), evaluate in parallel,
//!   print a per-strategy summary and optionally write CSV / JSON artifacts
//! - `strategies`: list the built-in strategy catalog

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;
use tracing_subscriber::EnvFilter;
use trialbench_core::domain::PriceSeries;
use trialbench_core::engine::BarEngine;
use trialbench_core::strategy::{catalog, StrategyKind};
use trialbench_runner::{
    evaluate_catalog, format_summary, load_series_dir, save_report_json, save_table_csv,
    synthetic_series, TrialConfig, TrialProgress,
};

#[derive(Parser)]
#[command(
    name = "trialbench",
    about = "TrialBench CLI: randomized sub-interval strategy evaluation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run randomized trials of every configured strategy on every ticker.
    Run {
        /// Directory of `<TICKER>.csv` files with `date` and `close` columns.
        #[arg(long, conflicts_with = "synthetic", required_unless_present = "synthetic")]
        data_dir: Option<PathBuf>,

        /// Generate deterministic synthetic series for these tickers instead.
        #[arg(long, num_args = 1..)]
        synthetic: Vec<String>,

        /// Records per synthetic series.
        #[arg(long, default_value_t = 2500)]
        synthetic_len: usize,

        /// Path to a TOML config file. CLI flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Trials per (strategy, ticker).
        #[arg(long)]
        trials: Option<usize>,

        /// Worker pool width.
        #[arg(long)]
        workers: Option<usize>,

        /// Master seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Comma-separated catalog names. Defaults to the whole catalog.
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<String>,

        /// Per-trial time budget in seconds.
        #[arg(long)]
        timeout: Option<f64>,

        /// Write the four-column results table here.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Write the full JSON run report here.
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// List the built-in strategy catalog.
    Strategies,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trialbench=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data_dir,
            synthetic,
            synthetic_len,
            config,
            trials,
            workers,
            seed,
            strategies,
            timeout,
            output,
            json,
        } => {
            let mut cfg = match config {
                Some(path) => TrialConfig::from_file(&path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => TrialConfig::default(),
            };
            if let Some(n) = trials {
                cfg.trials = n;
            }
            if let Some(w) = workers {
                cfg.workers = w;
            }
            if let Some(s) = seed {
                cfg.master_seed = s;
            }
            if !strategies.is_empty() {
                cfg.strategies = strategies;
            }
            if timeout.is_some() {
                cfg.trial_timeout_secs = timeout;
            }
            cfg.validate()?;

            let data = load_data(data_dir.as_deref(), &synthetic, synthetic_len)?;
            run_trials(&cfg, &data, output.as_deref(), json.as_deref())
        }
        Commands::Strategies => {
            list_strategies();
            Ok(())
        }
    }
}

fn load_data(
    data_dir: Option<&Path>,
    synthetic: &[String],
    synthetic_len: usize,
) -> Result<BTreeMap<String, PriceSeries>> {
    if let Some(dir) = data_dir {
        return load_series_dir(dir).with_context(|| format!("loading {}", dir.display()));
    }
    if synthetic.is_empty() {
        bail!("either --data-dir or --synthetic is required");
    }

    let start = NaiveDate::from_ymd_opt(2010, 1, 4).context("invalid synthetic start date")?;
    let mut data = BTreeMap::new();
    for ticker in synthetic {
        let series = synthetic_series(ticker, start, synthetic_len)
            .with_context(|| format!("generating synthetic series for {ticker}"))?;
        data.insert(ticker.clone(), series);
    }
    info!(tickers = data.len(), len = synthetic_len, "generated synthetic data");
    Ok(data)
}

fn run_trials(
    cfg: &TrialConfig,
    data: &BTreeMap<String, PriceSeries>,
    output: Option<&Path>,
    json: Option<&Path>,
) -> Result<()> {
    // Log every 10% of completed trials.
    let last_decile = AtomicUsize::new(0);
    let progress = |p: &TrialProgress| {
        let decile = (p.fraction() * 10.0) as usize;
        if last_decile.fetch_max(decile, Ordering::Relaxed) < decile {
            info!(
                completed = p.completed,
                total = p.total,
                failed = p.failed,
                "progress {}%",
                decile * 10
            );
        }
    };

    let report = evaluate_catalog(cfg, &BarEngine::new(), data, Some(&progress), None)?;

    println!();
    print!("{}", format_summary(&report.summaries()));
    println!();
    println!(
        "{} trials succeeded, {} failed, {} skipped in {:.2}s",
        report.succeeded,
        report.failures.len(),
        report.skipped,
        report.elapsed_secs
    );
    for failure in report.failures.iter().take(10) {
        println!(
            "  failed: {} / {} #{}: {}",
            failure.strategy, failure.ticker, failure.trial, failure.error
        );
    }
    if report.failures.len() > 10 {
        println!("  ... and {} more", report.failures.len() - 10);
    }

    if let Some(path) = output {
        save_table_csv(&report.table, path)?;
        println!("Results table saved to: {}", path.display());
    }
    if let Some(path) = json {
        save_report_json(&report, path)?;
        println!("Run report saved to: {}", path.display());
    }
    Ok(())
}

fn list_strategies() {
    println!("{:<24} {:<12} {:<28} {:<28}", "Name", "Kind", "Entry", "Exit");
    println!("{}", "-".repeat(92));
    for desc in catalog() {
        let kind = match desc.kind() {
            StrategyKind::SignalPair => "pair",
            StrategyKind::NoDrop => "no-drop",
            StrategyKind::AntiDrop { .. } => "anti-drop",
        };
        let exit = desc
            .exit()
            .map(|s| s.name())
            .unwrap_or_else(|| "(entry)".to_string());
        println!(
            "{:<24} {:<12} {:<28} {:<28}",
            desc.name(),
            kind,
            desc.entry().name(),
            exit
        );
    }
}
