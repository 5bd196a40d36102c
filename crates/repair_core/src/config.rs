//! Runtime configuration for repair-shop processes.
//!
//! # Responsibility
//! - Resolve database and logging settings from environment variables.
//!
//! # Invariants
//! - Blank variables are treated as unset.
//! - Logging stays disabled unless a log directory is configured.

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "REPAIR_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "REPAIR_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "REPAIR_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "repair_shop.sqlite3";

/// Resolved process settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    pub log_level: String,
    /// `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl RepairConfig {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        Self {
            db_path: read(DB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)),
            log_level: read(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string()),
            log_dir: read(LOG_DIR_ENV).map(PathBuf::from),
        }
    }
}
