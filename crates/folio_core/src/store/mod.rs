//! Persistence backend contract and its two implementations.
//!
//! # Responsibility
//! - Define the uniform CRUD contract repositories are written against.
//! - Provide a relational (SQLite) and a local-document (JSON files) backend.
//! - Select one backend at startup from configuration.
//!
//! # Invariants
//! - `select_all` returns items ascending by `(order, id)`.
//! - `insert` appends: the new item gets `max(order) + 1`, or 0 when empty.
//! - `write_positions` reports failure as one aggregate error; implementations
//!   that cannot apply it atomically say which ids failed.
//! - Call sites never branch on the concrete backend kind.

use crate::config::BackendConfig;
use crate::db::DbError;
use crate::model::portfolio::{ItemId, NewPortfolioItem, PortfolioItem};
use crate::model::settings::{HeroSettings, SiteSettings, StoredHeroSettings, StoredSiteSettings};
use log::info;
use std::path::PathBuf;
use thiserror::Error;

mod json_file;
mod sqlite;

pub use json_file::{JsonFileBackend, DEFAULT_MAX_COLLECTION_BYTES};
pub use sqlite::SqliteBackend;

pub type StoreResult<T> = Result<T, StoreError>;

/// Backend-level failure: rejected writes, unreadable data, transport errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("failed to access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode or decode `{collection}`: {source}")]
    Serialization {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error(
        "storage capacity exceeded for `{collection}`: {required} bytes needed, limit is {limit}"
    )]
    CapacityExceeded {
        collection: &'static str,
        required: u64,
        limit: u64,
    },
    #[error("record {id} not found in `{collection}`")]
    MissingRecord { collection: &'static str, id: ItemId },
    #[error("{} of {attempted} position writes failed (ids: {failed:?})", .failed.len())]
    PartialWrite {
        attempted: usize,
        failed: Vec<ItemId>,
    },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Collection name used in errors and logs for portfolio items.
pub const PORTFOLIO_COLLECTION: &str = "portfolio";
/// Collection name used in errors and logs for the site settings row.
pub const SITE_SETTINGS_COLLECTION: &str = "site_settings";
/// Collection name used in errors and logs for the hero settings row.
pub const HERO_SETTINGS_COLLECTION: &str = "hero_settings";

/// Record store for portfolio items.
pub trait ItemStore {
    /// Loads every item, ascending by `(order, id)`.
    fn select_all(&self) -> StoreResult<Vec<PortfolioItem>>;
    /// Loads one item by id.
    fn select_one(&self, id: ItemId) -> StoreResult<Option<PortfolioItem>>;
    /// Persists a new item, assigning its id and appending it at the end.
    fn insert(&self, item: &NewPortfolioItem) -> StoreResult<PortfolioItem>;
    /// Replaces every field of an existing item except its id.
    fn update(&self, item: &PortfolioItem) -> StoreResult<()>;
    /// Rewrites only the `order` field of one item.
    fn update_order(&self, id: ItemId, order: i64) -> StoreResult<()>;
    /// Deletes one item.
    fn delete(&self, id: ItemId) -> StoreResult<()>;
    /// Deletes every item matching `predicate`; returns how many were removed.
    fn delete_where(&self, predicate: &dyn Fn(&PortfolioItem) -> bool) -> StoreResult<usize>;

    /// Deletes every item unconditionally.
    fn delete_all(&self) -> StoreResult<usize> {
        self.delete_where(&|_| true)
    }

    /// Rewrites the `order` field of many items.
    ///
    /// The default issues one `update_order` per entry and keeps going after
    /// a failure, so a partial failure leaves earlier writes applied. The
    /// aggregate result is `Ok` only when every write succeeded.
    fn write_positions(&self, positions: &[(ItemId, i64)]) -> StoreResult<()> {
        let mut failed = Vec::new();
        for &(id, order) in positions {
            if let Err(err) = self.update_order(id, order) {
                log::error!(
                    "event=write_position module=store status=error item_id={id} order={order} error={err}"
                );
                failed.push(id);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(StoreError::PartialWrite {
                attempted: positions.len(),
                failed,
            })
        }
    }
}

/// Store for the singleton settings rows.
pub trait SettingsStore {
    fn load_site_settings(&self) -> StoreResult<Option<StoredSiteSettings>>;
    fn save_site_settings(&self, settings: &SiteSettings) -> StoreResult<()>;
    fn load_hero_settings(&self) -> StoreResult<Option<StoredHeroSettings>>;
    fn save_hero_settings(&self, settings: &HeroSettings) -> StoreResult<()>;
}

/// Full persistence capability: items plus settings rows.
pub trait Backend: ItemStore + SettingsStore {}

impl<T: ItemStore + SettingsStore + ?Sized> Backend for T {}

impl<T: ItemStore + ?Sized> ItemStore for &T {
    fn select_all(&self) -> StoreResult<Vec<PortfolioItem>> {
        (**self).select_all()
    }
    fn select_one(&self, id: ItemId) -> StoreResult<Option<PortfolioItem>> {
        (**self).select_one(id)
    }
    fn insert(&self, item: &NewPortfolioItem) -> StoreResult<PortfolioItem> {
        (**self).insert(item)
    }
    fn update(&self, item: &PortfolioItem) -> StoreResult<()> {
        (**self).update(item)
    }
    fn update_order(&self, id: ItemId, order: i64) -> StoreResult<()> {
        (**self).update_order(id, order)
    }
    fn delete(&self, id: ItemId) -> StoreResult<()> {
        (**self).delete(id)
    }
    fn delete_where(&self, predicate: &dyn Fn(&PortfolioItem) -> bool) -> StoreResult<usize> {
        (**self).delete_where(predicate)
    }
    fn delete_all(&self) -> StoreResult<usize> {
        (**self).delete_all()
    }
    fn write_positions(&self, positions: &[(ItemId, i64)]) -> StoreResult<()> {
        (**self).write_positions(positions)
    }
}

impl<T: ItemStore + ?Sized> ItemStore for Box<T> {
    fn select_all(&self) -> StoreResult<Vec<PortfolioItem>> {
        (**self).select_all()
    }
    fn select_one(&self, id: ItemId) -> StoreResult<Option<PortfolioItem>> {
        (**self).select_one(id)
    }
    fn insert(&self, item: &NewPortfolioItem) -> StoreResult<PortfolioItem> {
        (**self).insert(item)
    }
    fn update(&self, item: &PortfolioItem) -> StoreResult<()> {
        (**self).update(item)
    }
    fn update_order(&self, id: ItemId, order: i64) -> StoreResult<()> {
        (**self).update_order(id, order)
    }
    fn delete(&self, id: ItemId) -> StoreResult<()> {
        (**self).delete(id)
    }
    fn delete_where(&self, predicate: &dyn Fn(&PortfolioItem) -> bool) -> StoreResult<usize> {
        (**self).delete_where(predicate)
    }
    fn delete_all(&self) -> StoreResult<usize> {
        (**self).delete_all()
    }
    fn write_positions(&self, positions: &[(ItemId, i64)]) -> StoreResult<()> {
        (**self).write_positions(positions)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for &T {
    fn load_site_settings(&self) -> StoreResult<Option<StoredSiteSettings>> {
        (**self).load_site_settings()
    }
    fn save_site_settings(&self, settings: &SiteSettings) -> StoreResult<()> {
        (**self).save_site_settings(settings)
    }
    fn load_hero_settings(&self) -> StoreResult<Option<StoredHeroSettings>> {
        (**self).load_hero_settings()
    }
    fn save_hero_settings(&self, settings: &HeroSettings) -> StoreResult<()> {
        (**self).save_hero_settings(settings)
    }
}

impl<T: SettingsStore + ?Sized> SettingsStore for Box<T> {
    fn load_site_settings(&self) -> StoreResult<Option<StoredSiteSettings>> {
        (**self).load_site_settings()
    }
    fn save_site_settings(&self, settings: &SiteSettings) -> StoreResult<()> {
        (**self).save_site_settings(settings)
    }
    fn load_hero_settings(&self) -> StoreResult<Option<StoredHeroSettings>> {
        (**self).load_hero_settings()
    }
    fn save_hero_settings(&self, settings: &HeroSettings) -> StoreResult<()> {
        (**self).save_hero_settings(settings)
    }
}

/// Opens the backend selected by configuration.
///
/// This is the only place that knows which implementation is in use.
pub fn open_backend(config: &BackendConfig) -> StoreResult<Box<dyn Backend>> {
    match config {
        BackendConfig::Sqlite { path } => {
            info!(
                "event=backend_open module=store kind=sqlite path={}",
                path.display()
            );
            Ok(Box::new(SqliteBackend::open(path)?))
        }
        BackendConfig::JsonFile { dir, max_bytes } => {
            info!(
                "event=backend_open module=store kind=json_file dir={} max_bytes={max_bytes}",
                dir.display()
            );
            Ok(Box::new(JsonFileBackend::open(dir, *max_bytes)?))
        }
    }
}
