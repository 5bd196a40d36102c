//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the repair store.
//! - Bring the `repairs` schema up to the version this binary ships.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Repositories must not read/write repair rows before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or migrating the repair database.
#[derive(Debug)]
pub enum DbError {
    /// Connection-level SQLite failure outside any migration step.
    Sqlite(rusqlite::Error),
    /// The file was written by a newer build of the repair store.
    SchemaTooNew { found: u32, supported: u32 },
    /// A schema step failed; the whole upgrade was rolled back.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "repair database error: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "repair database schema version {found} is newer than supported {supported}"
            ),
            Self::Migration { version, source } => {
                write!(f, "repair schema migration {version} failed: {source}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) | Self::Migration { source: err, .. } => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
