//! Serializable trial configuration.
//!
//! Loaded from TOML; every field has a default so a config file only needs
//! the values it changes:
//!
//! ```toml
//! trials = 200
//! workers = 8
//! master_seed = 7
//! strategies = ["buy_and_hold", "anti_drop"]
//!
//! [sampling]
//! min_interval_days = 120
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use trialbench_core::strategy::{self, StrategyDescriptor};

/// Fatal configuration problems, detected before any trial runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("trials must be greater than zero")]
    ZeroTrials,

    #[error("workers must be greater than zero")]
    ZeroWorkers,

    #[error("initial_cash must be finite and positive, got {0}")]
    InvalidCash(f64),

    #[error("invalid sampling bounds: {0}")]
    InvalidSampling(String),

    #[error("trial_timeout_secs must be positive and at most 604800 (one week), got {0}")]
    InvalidTimeout(f64),

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("strategy '{0}' is listed more than once")]
    DuplicateStrategy(String),

    #[error("no strategies to evaluate")]
    NoStrategies,

    #[error("no price series to evaluate")]
    NoTickers,

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bounds for the random sub-interval drawn per trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Smallest interval length, in days.
    pub min_interval_days: usize,
    /// Days at the end of the series the interval length must stay clear of.
    pub end_buffer_days: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            min_interval_days: 150,
            end_buffer_days: 30,
        }
    }
}

/// Longest accepted per-trial timeout (one week).
pub const MAX_TRIAL_TIMEOUT_SECS: f64 = 7.0 * 24.0 * 3600.0;

/// Everything needed to reproduce an evaluation run, apart from the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Trials per (strategy, ticker) pair.
    pub trials: usize,
    /// Worker pool width.
    pub workers: usize,
    pub initial_cash: f64,
    pub sampling: SamplingConfig,
    /// Root of the per-trial seed hierarchy.
    pub master_seed: u64,
    /// Per-trial wall-clock budget. `None` = unlimited.
    pub trial_timeout_secs: Option<f64>,
    /// Catalog names to evaluate. Empty = whole catalog.
    pub strategies: Vec<String>,
    /// Apply the no-drop guard to AntiDrop exits too.
    pub anti_drop_exit_guard: bool,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            trials: 100,
            workers: 4,
            initial_cash: 100_000.0,
            sampling: SamplingConfig::default(),
            master_seed: 42,
            trial_timeout_secs: None,
            strategies: Vec::new(),
            anti_drop_exit_guard: false,
        }
    }
}

impl TrialConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trials == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if self.workers == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(ConfigError::InvalidCash(self.initial_cash));
        }
        if self.sampling.min_interval_days == 0 {
            return Err(ConfigError::InvalidSampling(
                "min_interval_days must be greater than zero".into(),
            ));
        }
        if self
            .sampling
            .min_interval_days
            .checked_add(self.sampling.end_buffer_days)
            .is_none()
        {
            return Err(ConfigError::InvalidSampling(
                "min_interval_days + end_buffer_days overflows".into(),
            ));
        }
        if let Some(secs) = self.trial_timeout_secs {
            if !secs.is_finite() || secs <= 0.0 || secs > MAX_TRIAL_TIMEOUT_SECS {
                return Err(ConfigError::InvalidTimeout(secs));
            }
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.trial_timeout_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Catalog descriptors named by `strategies` (all of them when empty),
    /// in the listed order.
    pub fn resolve_strategies(&self) -> Result<Vec<StrategyDescriptor>, ConfigError> {
        let descriptors = if self.strategies.is_empty() {
            strategy::catalog()
        } else {
            let mut out: Vec<StrategyDescriptor> = Vec::with_capacity(self.strategies.len());
            for name in &self.strategies {
                if out.iter().any(|d| d.name() == name) {
                    return Err(ConfigError::DuplicateStrategy(name.clone()));
                }
                let desc = strategy::find(name)
                    .ok_or_else(|| ConfigError::UnknownStrategy(name.clone()))?;
                out.push(desc);
            }
            out
        };
        Ok(descriptors
            .into_iter()
            .map(|d| d.with_exit_guard(self.anti_drop_exit_guard))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trialbench_core::strategy::{StrategyKind, CATALOG_NAMES};

    #[test]
    fn defaults() {
        let c = TrialConfig::default();
        assert_eq!(c.initial_cash, 100_000.0);
        assert_eq!(c.sampling.min_interval_days, 150);
        assert_eq!(c.sampling.end_buffer_days, 30);
        assert_eq!(c.master_seed, 42);
        assert!(c.trial_timeout_secs.is_none());
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let c = TrialConfig::from_toml_str(
            r#"
            trials = 7
            [sampling]
            end_buffer_days = 10
            "#,
        )
        .unwrap();
        assert_eq!(c.trials, 7);
        assert_eq!(c.workers, 4);
        assert_eq!(c.sampling.min_interval_days, 150);
        assert_eq!(c.sampling.end_buffer_days, 10);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(TrialConfig::from_toml_str("").unwrap(), TrialConfig::default());
    }

    #[test]
    fn rejects_zero_trials_and_workers() {
        assert!(matches!(
            TrialConfig::from_toml_str("trials = 0"),
            Err(ConfigError::ZeroTrials)
        ));
        assert!(matches!(
            TrialConfig::from_toml_str("workers = 0"),
            Err(ConfigError::ZeroWorkers)
        ));
    }

    #[test]
    fn rejects_bad_cash_and_timeout() {
        assert!(matches!(
            TrialConfig::from_toml_str("initial_cash = -5.0"),
            Err(ConfigError::InvalidCash(_))
        ));
        assert!(matches!(
            TrialConfig::from_toml_str("trial_timeout_secs = 0.0"),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn rejects_timeouts_past_the_maximum() {
        for secs in [1e30, 1.5e19, MAX_TRIAL_TIMEOUT_SECS + 1.0] {
            let c = TrialConfig {
                trial_timeout_secs: Some(secs),
                ..Default::default()
            };
            assert!(
                matches!(c.validate(), Err(ConfigError::InvalidTimeout(v)) if v == secs),
                "{secs} accepted"
            );
        }

        let c = TrialConfig {
            trial_timeout_secs: Some(MAX_TRIAL_TIMEOUT_SECS),
            ..Default::default()
        };
        assert!(c.validate().is_ok());
        assert_eq!(c.timeout(), Some(Duration::from_secs(7 * 24 * 3600)));
    }

    #[test]
    fn rejects_zero_min_interval() {
        let mut c = TrialConfig::default();
        c.sampling.min_interval_days = 0;
        assert!(matches!(c.validate(), Err(ConfigError::InvalidSampling(_))));
    }

    #[test]
    fn parse_error_surfaces() {
        assert!(matches!(
            TrialConfig::from_toml_str("trials = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn timeout_duration() {
        let c = TrialConfig {
            trial_timeout_secs: Some(1.5),
            ..Default::default()
        };
        assert_eq!(c.timeout(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn empty_strategy_list_resolves_to_catalog() {
        let names: Vec<String> = TrialConfig::default()
            .resolve_strategies()
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, CATALOG_NAMES);
    }

    #[test]
    fn resolve_keeps_listed_order() {
        let c = TrialConfig {
            strategies: vec!["random".into(), "buy_and_hold".into()],
            ..Default::default()
        };
        let names: Vec<_> = c
            .resolve_strategies()
            .unwrap()
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, ["random", "buy_and_hold"]);
    }

    #[test]
    fn resolve_rejects_unknown_and_duplicate() {
        let unknown = TrialConfig {
            strategies: vec!["martingale".into()],
            ..Default::default()
        };
        assert!(matches!(
            unknown.resolve_strategies(),
            Err(ConfigError::UnknownStrategy(n)) if n == "martingale"
        ));

        let dup = TrialConfig {
            strategies: vec!["random".into(), "random".into()],
            ..Default::default()
        };
        assert!(matches!(
            dup.resolve_strategies(),
            Err(ConfigError::DuplicateStrategy(n)) if n == "random"
        ));
    }

    #[test]
    fn exit_guard_flag_reaches_anti_drop() {
        let c = TrialConfig {
            strategies: vec!["anti_drop".into()],
            anti_drop_exit_guard: true,
            ..Default::default()
        };
        let resolved = c.resolve_strategies().unwrap();
        assert_eq!(resolved[0].kind(), StrategyKind::AntiDrop { exit_guard: true });
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = TrialConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
