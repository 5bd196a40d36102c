//! Repair store contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the record-store operations consumed by `RepairService`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Repair::validate()` before SQL mutations.
//! - Inserts never accept a caller-provided id; the store assigns it.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - List order is `id ASC`, which is insertion order.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::repair::{PhoneNumber, Repair, RepairId, RepairValidationError};
use log::{debug, info};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const REPAIR_SELECT_SQL: &str = "SELECT
    id,
    name,
    title,
    brand,
    issue,
    phone_number
FROM repairs";

const REPAIR_COLUMNS: [&str; 6] = ["id", "name", "title", "brand", "issue", "phone_number"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors raised by record-store implementations.
#[derive(Debug)]
pub enum RepoError {
    Validation(RepairValidationError),
    Db(DbError),
    /// No row with this id.
    NotFound(RepairId),
    /// Storage-level uniqueness guard on `phone_number` fired.
    DuplicatePhoneNumber(PhoneNumber),
    /// Insert received a repair that already carries an id.
    AlreadyPersisted(RepairId),
    /// Update received a repair without an id.
    MissingId,
    /// Two seeded records carry the same id.
    DuplicateId(RepairId),
    /// The id counter reached `RepairId::MAX`.
    IdSpaceExhausted,
    /// In-memory store lock was poisoned by a panicking writer.
    Poisoned,
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "repair not found: {id}"),
            Self::DuplicatePhoneNumber(_) => write!(f, "phone number already stored"),
            Self::AlreadyPersisted(id) => {
                write!(f, "repair already has id {id}; insert expects a new record")
            }
            Self::MissingId => write!(f, "repair update requires an id"),
            Self::DuplicateId(id) => write!(f, "repair id {id} is already taken"),
            Self::IdSpaceExhausted => write!(f, "no repair ids left to assign"),
            Self::Poisoned => write!(f, "repair store lock poisoned"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table missing: {table}"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column missing: {table}.{column}")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted repair data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepairValidationError> for RepoError {
    fn from(value: RepairValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Record-store contract consumed by the repair service.
pub trait RepairRepository {
    /// Returns every repair in store order.
    fn list_repairs(&self) -> RepoResult<Vec<Repair>>;
    fn get_repair(&self, id: RepairId) -> RepoResult<Option<Repair>>;
    fn exists_repair_with_id(&self, id: RepairId) -> RepoResult<bool>;
    fn exists_repair_with_phone_number(&self, phone_number: PhoneNumber) -> RepoResult<bool>;
    /// Persists a new repair and returns the id the store assigned.
    fn insert_repair(&self, repair: &Repair) -> RepoResult<RepairId>;
    /// Overwrites every business field of the repair with `repair.id`.
    fn update_repair(&self, repair: &Repair) -> RepoResult<()>;
    fn delete_repair(&self, id: RepairId) -> RepoResult<()>;
}

impl<R: RepairRepository + ?Sized> RepairRepository for &R {
    fn list_repairs(&self) -> RepoResult<Vec<Repair>> {
        (**self).list_repairs()
    }

    fn get_repair(&self, id: RepairId) -> RepoResult<Option<Repair>> {
        (**self).get_repair(id)
    }

    fn exists_repair_with_id(&self, id: RepairId) -> RepoResult<bool> {
        (**self).exists_repair_with_id(id)
    }

    fn exists_repair_with_phone_number(&self, phone_number: PhoneNumber) -> RepoResult<bool> {
        (**self).exists_repair_with_phone_number(phone_number)
    }

    fn insert_repair(&self, repair: &Repair) -> RepoResult<RepairId> {
        (**self).insert_repair(repair)
    }

    fn update_repair(&self, repair: &Repair) -> RepoResult<()> {
        (**self).update_repair(repair)
    }

    fn delete_repair(&self, id: RepairId) -> RepoResult<()> {
        (**self).delete_repair(id)
    }
}

/// SQLite-backed repair store.
pub struct SqliteRepairRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRepairRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` on schema drift.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RepairRepository for SqliteRepairRepository<'_> {
    fn list_repairs(&self) -> RepoResult<Vec<Repair>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPAIR_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut repairs = Vec::new();

        while let Some(row) = rows.next()? {
            repairs.push(parse_repair_row(row)?);
        }

        debug!(
            "event=repair_list module=repo status=ok count={}",
            repairs.len()
        );
        Ok(repairs)
    }

    fn get_repair(&self, id: RepairId) -> RepoResult<Option<Repair>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REPAIR_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_repair_row(row)?));
        }

        Ok(None)
    }

    fn exists_repair_with_id(&self, id: RepairId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM repairs WHERE id = ?1);",
            [id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn exists_repair_with_phone_number(&self, phone_number: PhoneNumber) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM repairs WHERE phone_number = ?1);",
            [phone_number],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn insert_repair(&self, repair: &Repair) -> RepoResult<RepairId> {
        if let Some(id) = repair.id {
            return Err(RepoError::AlreadyPersisted(id));
        }
        repair.validate()?;

        self.conn
            .execute(
                "INSERT INTO repairs (name, title, brand, issue, phone_number)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    repair.name.as_str(),
                    repair.title.as_str(),
                    repair.brand.as_str(),
                    repair.issue.as_str(),
                    repair.phone_number,
                ],
            )
            .map_err(|err| map_unique_violation(err, repair.phone_number))?;

        let id = self.conn.last_insert_rowid();
        info!("event=repair_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn update_repair(&self, repair: &Repair) -> RepoResult<()> {
        let id = repair.id.ok_or(RepoError::MissingId)?;
        repair.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE repairs
                 SET
                    name = ?1,
                    title = ?2,
                    brand = ?3,
                    issue = ?4,
                    phone_number = ?5,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?6;",
                params![
                    repair.name.as_str(),
                    repair.title.as_str(),
                    repair.brand.as_str(),
                    repair.issue.as_str(),
                    repair.phone_number,
                    id,
                ],
            )
            .map_err(|err| map_unique_violation(err, repair.phone_number))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=repair_update module=repo status=ok id={id}");
        Ok(())
    }

    fn delete_repair(&self, id: RepairId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM repairs WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        info!("event=repair_delete module=repo status=ok id={id}");
        Ok(())
    }
}

fn parse_repair_row(row: &Row<'_>) -> RepoResult<Repair> {
    let id: RepairId = row.get("id")?;
    let repair = Repair::with_id(
        id,
        row.get::<_, String>("name")?,
        row.get::<_, String>("title")?,
        row.get::<_, String>("brand")?,
        row.get::<_, String>("issue")?,
        row.get::<_, PhoneNumber>("phone_number")?,
    );
    repair
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("repairs row {id}: {err}")))?;
    Ok(repair)
}

fn map_unique_violation(err: rusqlite::Error, phone_number: PhoneNumber) -> RepoError {
    if let rusqlite::Error::SqliteFailure(failure, _) = &err {
        if failure.code == ErrorCode::ConstraintViolation
            && failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        {
            return RepoError::DuplicatePhoneNumber(phone_number);
        }
    }
    err.into()
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "repairs")? {
        return Err(RepoError::MissingRequiredTable("repairs"));
    }

    for column in REPAIR_COLUMNS {
        if !table_has_column(conn, "repairs", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "repairs",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let name: Option<String> = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(name.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
    for name in names {
        if name? == column {
            return Ok(true);
        }
    }
    Ok(false)
}
