//! Project store bootstrap.
//!
//! # Responsibility
//! - Open the SQLite file (or an in-memory store) backing the project desk.
//! - Bring the project/version/body schema up to date before any repository
//!   sees the connection.
//!
//! # Invariants
//! - Schema revision lives in `PRAGMA user_version`.
//! - A failed migration leaves the file at its previous revision and reports
//!   which script broke.
//! - Connections enforce foreign keys, so project deletes cascade.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// A schema script failed and its transaction was rolled back.
    Migration {
        version: u32,
        name: &'static str,
        source: rusqlite::Error,
    },
    /// The store was written by a newer ProjDesk build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Script label as `NNNN_name`, when the failure came from a migration.
    pub fn migration_label(&self) -> Option<String> {
        match self {
            Self::Migration { version, name, .. } => Some(format!("{version:04}_{name}")),
            _ => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "project store error: {err}"),
            Self::Migration {
                version,
                name,
                source,
            } => write!(f, "project schema step {version:04}_{name} failed: {source}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "project store is at schema revision {found}, this build reads up to {supported}"
            ),
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
