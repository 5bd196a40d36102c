//! Schema steps for the repair database.
//!
//! Steps are SQL files applied in ascending `version` order inside a single
//! transaction; `PRAGMA user_version` records the last step applied.

use crate::db::{DbError, DbResult};
use log::{error, info};
use rusqlite::{Connection, Transaction};

#[derive(Debug, Clone, Copy)]
struct SchemaStep {
    version: u32,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    sql: include_str!("0001_repairs.sql"),
}];

/// Returns the schema version this build of the repair store expects.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Upgrades the repair schema on `conn` to [`latest_version`].
///
/// # Errors
/// - `SchemaTooNew` when the file carries a version above [`latest_version`].
/// - `Migration` when a step fails; nothing from this call is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = current_user_version(conn)?;
    let supported = latest_version();

    if found > supported {
        return Err(DbError::SchemaTooNew { found, supported });
    }
    if found == supported {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in SCHEMA_STEPS.iter().filter(|step| step.version > found) {
        if let Err(source) = apply_step(&tx, step) {
            error!(
                "event=db_migrate module=db status=error version={} from={found}",
                step.version
            );
            return Err(DbError::Migration {
                version: step.version,
                source,
            });
        }
        info!(
            "event=db_migrate module=db status=ok version={} from={found}",
            step.version
        );
    }
    tx.commit()?;

    Ok(())
}

fn apply_step(tx: &Transaction<'_>, step: &SchemaStep) -> rusqlite::Result<()> {
    tx.execute_batch(step.sql)?;
    tx.pragma_update(None, "user_version", step.version)
}

/// Reads the schema version recorded in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
