//! Price-series loading for the runner.
//!
//! Sources:
//! 1. A single CSV file with `date` (YYYY-MM-DD) and `close` columns; `open`,
//!    `high`, `low` and `volume` are picked up when present (empty cells read
//!    as missing, unparseable ones are an error). Header matching is
//!    case-insensitive.
//! 2. A directory of such files, one ticker per file, named after the file stem.
//! 3. Synthetic series (deterministic random walk seeded from the ticker) for
//!    demos and tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{debug, info};
use trialbench_core::domain::{Bar, PriceSeries, SeriesError};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{path}: missing required column '{column}'")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{path}: row {row}: invalid {column} '{value}'")]
    InvalidField {
        path: PathBuf,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("no CSV files found in {0}")]
    NoCsvFiles(PathBuf),

    #[error("invalid series: {0}")]
    Series(#[from] SeriesError),
}

/// Column positions resolved from the header row.
struct Columns {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, path: &Path) -> Result<Self, LoadError> {
        let names: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| names.iter().position(|h| h == name);
        let required = |name: &'static str| {
            find(name).ok_or_else(|| LoadError::MissingColumn {
                path: path.to_path_buf(),
                column: name,
            })
        };
        Ok(Self {
            date: required("date")?,
            close: required("close")?,
            open: find("open"),
            high: find("high"),
            low: find("low"),
            volume: find("volume"),
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Timestamped exports ("2020-01-02 00:00:00") keep the date part.
    let date_part = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Read one ticker's series from any CSV reader. `path` is only used in errors.
pub fn read_series<R: std::io::Read>(
    reader: R,
    ticker: &str,
    path: &Path,
) -> Result<PriceSeries, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let cols = Columns::resolve(rdr.headers().map_err(csv_err)?, path)?;

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(csv_err)?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let invalid = |column: &'static str, value: &str| LoadError::InvalidField {
            path: path.to_path_buf(),
            row,
            column,
            value: value.to_string(),
        };
        let optional =
            |idx: Option<usize>, column: &'static str| -> Result<Option<f64>, LoadError> {
                match idx.map(field) {
                    None | Some("") => Ok(None),
                    Some(raw) => raw.parse().map(Some).map_err(|_| invalid(column, raw)),
                }
            };

        let raw_date = field(cols.date);
        let date = parse_date(raw_date).ok_or_else(|| invalid("date", raw_date))?;
        let raw_close = field(cols.close);
        let close: f64 = raw_close
            .parse()
            .map_err(|_| invalid("close", raw_close))?;

        bars.push(Bar {
            date,
            close,
            open: optional(cols.open, "open")?,
            high: optional(cols.high, "high")?,
            low: optional(cols.low, "low")?,
            volume: optional(cols.volume, "volume")?,
        });
    }

    Ok(PriceSeries::new(ticker, bars)?)
}

/// Load one ticker's series from a CSV file.
pub fn load_series_csv(path: &Path, ticker: &str) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let series = read_series(file, ticker, path)?;
    debug!(ticker, path = %path.display(), bars = series.len(), "loaded series");
    Ok(series)
}

/// Load every `*.csv` file in `dir`, keyed by file stem.
pub fn load_series_dir(dir: &Path) -> Result<BTreeMap<String, PriceSeries>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(io_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<_, _>>()
        .map_err(io_err)?;
    paths.retain(|p| {
        p.is_file()
            && p.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    });
    paths.sort();

    let mut out = BTreeMap::new();
    for path in paths {
        let Some(ticker) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let series = load_series_csv(&path, ticker)?;
        out.insert(ticker.to_string(), series);
    }
    if out.is_empty() {
        return Err(LoadError::NoCsvFiles(dir.to_path_buf()));
    }
    info!(dir = %dir.display(), tickers = out.len(), "loaded price data");
    Ok(out)
}

/// Deterministic weekday-only random walk of `len` records starting at `start`.
///
/// The RNG is seeded from the ticker, so the same ticker always yields the
/// same series.
pub fn synthetic_series(ticker: &str, start: NaiveDate, len: usize) -> Result<PriceSeries, SeriesError> {
    let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::with_capacity(len);
    let mut price = 100.0_f64;
    let mut current = start;

    while bars.len() < len {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        bars.push(Bar {
            date: current,
            close,
            open: Some(open),
            high: Some(open.max(close) * (1.0 + rng.gen_range(0.0..0.01))),
            low: Some(open.min(close) * (1.0 - rng.gen_range(0.0..0.01))),
            volume: Some(rng.gen_range(500_000.0..5_000_000.0_f64).round()),
        });

        price = close;
        current += Duration::days(1);
    }

    PriceSeries::new(ticker, bars)
}

/// Constant-price series of `len` consecutive calendar days.
pub fn flat_series(ticker: &str, start: NaiveDate, len: usize, price: f64) -> Result<PriceSeries, SeriesError> {
    PriceSeries::from_closes(
        ticker,
        (0..len).map(|i| (start + Duration::days(i as i64), price)),
    )
}
