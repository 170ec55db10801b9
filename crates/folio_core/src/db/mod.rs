//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the relational backend.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No portfolio or settings data is read or written before migrations
//!   succeed.

use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    #[error("database schema version {actual_version} does not match expected {expected_version}")]
    SchemaMismatch {
        expected_version: u32,
        actual_version: u32,
    },
}
