//! Local document backend: one JSON file per collection.
//!
//! # Responsibility
//! - Persist items and settings rows as whole JSON documents in a directory.
//! - Enforce a per-collection byte capacity on writes.
//!
//! # Invariants
//! - Every operation reads, deserializes, mutates, reserializes and rewrites
//!   the whole collection. Operations are not atomic across processes: two
//!   writers racing on the same directory can silently drop each other's
//!   changes.
//! - Within one operation the rewrite is all-or-nothing (temp file + rename).
//! - Ids come from the wall clock in milliseconds and are bumped past the
//!   current maximum, so they stay unique and strictly increasing.

use super::{
    ItemStore, SettingsStore, StoreError, StoreResult, HERO_SETTINGS_COLLECTION,
    PORTFOLIO_COLLECTION, SITE_SETTINGS_COLLECTION,
};
use crate::model::portfolio::{ItemId, NewPortfolioItem, PortfolioItem};
use crate::model::settings::{HeroSettings, SiteSettings, StoredHeroSettings, StoredSiteSettings};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Default per-collection capacity, matching typical browser storage quotas.
pub const DEFAULT_MAX_COLLECTION_BYTES: u64 = 5 * 1024 * 1024;

const PORTFOLIO_FILE: &str = "portfolio.json";
const SITE_SETTINGS_FILE: &str = "site_settings.json";
const HERO_SETTINGS_FILE: &str = "hero_settings.json";

/// JSON-document store rooted at one directory.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
    max_bytes: u64,
}

impl JsonFileBackend {
    /// Opens (creating if needed) a store directory.
    pub fn open(dir: impl Into<PathBuf>, max_bytes: u64) -> StoreResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, max_bytes })
    }

    fn read_items(&self) -> StoreResult<Vec<PortfolioItem>> {
        let mut items: Vec<PortfolioItem> = self
            .read_document(PORTFOLIO_FILE, PORTFOLIO_COLLECTION)?
            .unwrap_or_default();
        items.sort_by_key(|item| (item.order, item.id));
        Ok(items)
    }

    fn write_items(&self, items: &[PortfolioItem]) -> StoreResult<()> {
        self.write_document(PORTFOLIO_FILE, PORTFOLIO_COLLECTION, items)
    }

    fn read_document<T: DeserializeOwned>(
        &self,
        file: &str,
        collection: &'static str,
    ) -> StoreResult<Option<T>> {
        let path = self.dir.join(file);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let value = serde_json::from_slice(&bytes)
            .map_err(|source| StoreError::Serialization { collection, source })?;
        Ok(Some(value))
    }

    fn write_document<T: Serialize + ?Sized>(
        &self,
        file: &str,
        collection: &'static str,
        value: &T,
    ) -> StoreResult<()> {
        let bytes = serde_json::to_vec(value)
            .map_err(|source| StoreError::Serialization { collection, source })?;
        let required = bytes.len() as u64;
        if required > self.max_bytes {
            warn!(
                "event=collection_write module=store kind=json_file status=rejected collection={collection} required={required} limit={}",
                self.max_bytes
            );
            return Err(StoreError::CapacityExceeded {
                collection,
                required,
                limit: self.max_bytes,
            });
        }

        let path = self.dir.join(file);
        let temp_path = self.dir.join(format!("{file}.tmp"));
        fs::write(&temp_path, &bytes).map_err(|source| StoreError::Io {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &path).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        debug!(
            "event=collection_write module=store kind=json_file status=ok collection={collection} bytes={required}"
        );
        Ok(())
    }
}

impl ItemStore for JsonFileBackend {
    fn select_all(&self) -> StoreResult<Vec<PortfolioItem>> {
        self.read_items()
    }

    fn select_one(&self, id: ItemId) -> StoreResult<Option<PortfolioItem>> {
        Ok(self.read_items()?.into_iter().find(|item| item.id == id))
    }

    fn insert(&self, item: &NewPortfolioItem) -> StoreResult<PortfolioItem> {
        let mut items = self.read_items()?;
        let order = items
            .iter()
            .map(|existing| existing.order)
            .max()
            .map_or(0, |max| max + 1);
        let id = next_id(&items);
        let created = item.clone().into_item(id, order);
        items.push(created.clone());
        self.write_items(&items)?;
        Ok(created)
    }

    fn update(&self, item: &PortfolioItem) -> StoreResult<()> {
        let mut items = self.read_items()?;
        let slot = items
            .iter_mut()
            .find(|existing| existing.id == item.id)
            .ok_or_else(|| missing(item.id))?;
        *slot = item.clone();
        self.write_items(&items)
    }

    fn update_order(&self, id: ItemId, order: i64) -> StoreResult<()> {
        self.write_positions(&[(id, order)])
    }

    fn delete(&self, id: ItemId) -> StoreResult<()> {
        let mut items = self.read_items()?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(missing(id));
        }
        self.write_items(&items)
    }

    fn delete_where(&self, predicate: &dyn Fn(&PortfolioItem) -> bool) -> StoreResult<usize> {
        let mut items = self.read_items()?;
        let before = items.len();
        items.retain(|item| !predicate(item));
        let removed = before - items.len();
        self.write_items(&items)?;
        Ok(removed)
    }

    /// Applies every position to one in-memory copy and rewrites the
    /// collection once; an unknown id aborts before anything is written.
    fn write_positions(&self, positions: &[(ItemId, i64)]) -> StoreResult<()> {
        let mut items = self.read_items()?;
        for &(id, order) in positions {
            let item = items
                .iter_mut()
                .find(|item| item.id == id)
                .ok_or_else(|| missing(id))?;
            item.order = order;
        }
        self.write_items(&items)
    }
}

impl SettingsStore for JsonFileBackend {
    fn load_site_settings(&self) -> StoreResult<Option<StoredSiteSettings>> {
        self.read_document(SITE_SETTINGS_FILE, SITE_SETTINGS_COLLECTION)
    }

    fn save_site_settings(&self, settings: &SiteSettings) -> StoreResult<()> {
        self.write_document(SITE_SETTINGS_FILE, SITE_SETTINGS_COLLECTION, settings)
    }

    fn load_hero_settings(&self) -> StoreResult<Option<StoredHeroSettings>> {
        self.read_document(HERO_SETTINGS_FILE, HERO_SETTINGS_COLLECTION)
    }

    fn save_hero_settings(&self, settings: &HeroSettings) -> StoreResult<()> {
        self.write_document(HERO_SETTINGS_FILE, HERO_SETTINGS_COLLECTION, settings)
    }
}

fn next_id(items: &[PortfolioItem]) -> ItemId {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as i64);
    let after_max = items.iter().map(|item| item.id).max().map_or(1, |max| max + 1);
    now_ms.max(after_max)
}

fn missing(id: ItemId) -> StoreError {
    StoreError::MissingRecord {
        collection: PORTFOLIO_COLLECTION,
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::{next_id, JsonFileBackend};
    use crate::model::portfolio::PortfolioDraft;
    use crate::store::{ItemStore, StoreError};

    #[test]
    fn ids_stay_strictly_increasing_past_clock() {
        let mut draft = PortfolioDraft::titled("Future");
        draft.image = Some("x.png".to_string());
        let item = draft.into_new_item().unwrap().into_item(i64::MAX - 10, 0);
        assert_eq!(next_id(&[item]), i64::MAX - 9);
    }

    #[test]
    fn oversized_collection_write_is_rejected_and_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileBackend::open(dir.path(), 64).unwrap();

        let mut draft = PortfolioDraft::titled("A title long enough to blow the tiny quota");
        draft.image = Some("cover.png".to_string());
        let err = store
            .insert(&draft.into_new_item().unwrap())
            .unwrap_err();

        assert!(matches!(err, StoreError::CapacityExceeded { limit: 64, .. }));
        assert!(store.select_all().unwrap().is_empty());
    }
}
