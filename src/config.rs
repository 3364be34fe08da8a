//! Runtime configuration, read from the environment (and `.env`).

use crate::history::DEFAULT_HISTORY_LIMIT;
use std::path::PathBuf;
use tracing::warn;

pub const HOME_ENV: &str = "SQL_PRACTICE_HOME";
pub const HISTORY_LIMIT_ENV: &str = "SQL_PRACTICE_HISTORY_LIMIT";
pub const DATASET_ENV: &str = "SQL_PRACTICE_DATASET";

pub const DEFAULT_HOME: &str = ".sql-practice";
pub const DEFAULT_DATASET: &str = "employees";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PracticeConfig {
    /// Directory holding the progress store
    pub home: PathBuf,
    /// Maximum number of remembered queries
    pub history_limit: usize,
    /// Dataset loaded when a session starts
    pub default_dataset: String,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            home: PathBuf::from(DEFAULT_HOME),
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_dataset: DEFAULT_DATASET.to_string(),
        }
    }
}

impl PracticeConfig {
    /// Build from process environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(home) = lookup(HOME_ENV).filter(|v| !v.trim().is_empty()) {
            config.home = PathBuf::from(home);
        }

        if let Some(raw) = lookup(HISTORY_LIMIT_ENV) {
            match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => config.history_limit = limit,
                _ => warn!("Ignoring invalid {}={:?}", HISTORY_LIMIT_ENV, raw),
            }
        }

        if let Some(dataset) = lookup(DATASET_ENV).filter(|v| !v.trim().is_empty()) {
            config.default_dataset = dataset.trim().to_string();
        }

        config
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = home.into();
        self
    }
}
