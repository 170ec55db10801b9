//! Portfolio repository: typed item operations over an [`ItemStore`].
//!
//! # Responsibility
//! - Validate payloads before any backend call.
//! - Translate backend failures into `RepoError` outcomes.
//! - Turn a desired display sequence into persisted `order` values.
//!
//! # Invariants
//! - `list` never fails; a backend error degrades to an empty list.
//! - Every write surfaces failure to the caller. Nothing is retried.
//! - After a successful `reorder`, `order` values equal positions `0..n`
//!   across the whole collection.

use crate::model::portfolio::{ItemId, ItemValidationError, NewPortfolioItem, PortfolioItem};
use crate::service::ordering::renumber;
use crate::store::{ItemStore, StoreError};
use log::{error, info, warn};
use std::collections::HashSet;
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Outcome taxonomy shared by every repository.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] ItemValidationError),
    #[error("portfolio item not found: {0}")]
    NotFound(ItemId),
    #[error("no project published under slug `{0}`")]
    SlugNotFound(String),
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::MissingRecord { id, .. } => Self::NotFound(id),
            other => Self::Storage(other),
        }
    }
}

impl RepoError {
    /// Whether this is a lookup miss rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::SlugNotFound(_))
    }
}

/// Stateless translator between callers and the item backend.
pub struct PortfolioRepository<S: ItemStore> {
    store: S,
}

impl<S: ItemStore> PortfolioRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying backend handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every item ascending by `order`; empty when the backend fails.
    pub fn list(&self) -> Vec<PortfolioItem> {
        match self.try_list() {
            Ok(items) => items,
            Err(err) => {
                warn!("event=portfolio_list module=repo status=degraded error={err}");
                Vec::new()
            }
        }
    }

    /// Every item ascending by `order`, propagating backend failure.
    pub fn try_list(&self) -> RepoResult<Vec<PortfolioItem>> {
        let mut items = self.store.select_all()?;
        items.sort_by_key(|item| (item.order, item.id));
        Ok(items)
    }

    /// Loads one item by id.
    pub fn get(&self, id: ItemId) -> RepoResult<PortfolioItem> {
        self.store.select_one(id)?.ok_or(RepoError::NotFound(id))
    }

    /// Resolves a slug by scanning [`Self::list`]; the first match in display
    /// order wins when slugs collide.
    pub fn find_by_slug(&self, slug: &str) -> RepoResult<PortfolioItem> {
        self.list()
            .into_iter()
            .find(|item| item.slug == slug)
            .ok_or_else(|| RepoError::SlugNotFound(slug.to_string()))
    }

    /// Appends a validated item; the backend assigns `id` and `order`.
    pub fn create(&self, item: &NewPortfolioItem) -> RepoResult<PortfolioItem> {
        item.validate()?;
        let created = self.store.insert(item).map_err(|err| {
            error!("event=portfolio_create module=repo status=error error={err}");
            RepoError::from(err)
        })?;
        info!(
            "event=portfolio_create module=repo status=ok item_id={} order={}",
            created.id, created.order
        );
        Ok(created)
    }

    /// Replaces every field except `id`. Applying the same item twice is a
    /// no-op the second time.
    pub fn update(&self, item: &PortfolioItem) -> RepoResult<()> {
        item.validate()?;
        self.store.update(item)?;
        info!(
            "event=portfolio_update module=repo status=ok item_id={}",
            item.id
        );
        Ok(())
    }

    pub fn delete(&self, id: ItemId) -> RepoResult<()> {
        self.store.delete(id)?;
        info!("event=portfolio_delete module=repo status=ok item_id={id}");
        Ok(())
    }

    /// Persists `items` as the new display sequence.
    ///
    /// # Contract
    /// - `items` must name every stored item exactly once. Duplicates, unknown
    ///   ids and left-out items are rejected before any write.
    /// - Each item's `order` becomes its position in `items`.
    /// - Returns the items with their new `order` values.
    /// - Failure is one aggregate error; whether earlier writes stay applied
    ///   depends on the backend (see [`ItemStore::write_positions`]).
    pub fn reorder(&self, items: &[PortfolioItem]) -> RepoResult<Vec<PortfolioItem>> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in items {
            if !seen.insert(item.id) {
                return Err(ItemValidationError::DuplicateId(item.id).into());
            }
        }

        let stored: HashSet<ItemId> = self
            .store
            .select_all()?
            .iter()
            .map(|item| item.id)
            .collect();
        if let Some(unknown) = items.iter().find(|item| !stored.contains(&item.id)) {
            return Err(RepoError::NotFound(unknown.id));
        }
        let mut left_out: Vec<ItemId> = stored.difference(&seen).copied().collect();
        if !left_out.is_empty() {
            left_out.sort_unstable();
            warn!(
                "event=portfolio_reorder module=repo status=rejected left_out={}",
                left_out.len()
            );
            return Err(ItemValidationError::IncompleteSequence(left_out).into());
        }

        let mut renumbered = items.to_vec();
        renumber(&mut renumbered);
        let positions: Vec<(ItemId, i64)> = renumbered
            .iter()
            .map(|item| (item.id, item.order))
            .collect();

        if let Err(err) = self.store.write_positions(&positions) {
            error!(
                "event=portfolio_reorder module=repo status=error count={} error={err}",
                positions.len()
            );
            return Err(err.into());
        }
        info!(
            "event=portfolio_reorder module=repo status=ok count={}",
            positions.len()
        );
        Ok(renumbered)
    }

    /// Deletes every item; returns how many were removed.
    pub fn clear_all(&self) -> RepoResult<usize> {
        let removed = self.store.delete_all()?;
        warn!("event=portfolio_clear module=repo status=ok removed={removed}");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::{PortfolioRepository, RepoError};
    use crate::model::portfolio::{ItemValidationError, PortfolioDraft};
    use crate::store::{ItemStore, SqliteBackend, StoreError};

    fn draft(title: &str) -> PortfolioDraft {
        let mut draft = PortfolioDraft::titled(title);
        draft.image = Some(format!("{title}.png"));
        draft
    }

    #[test]
    fn missing_record_maps_to_not_found() {
        let err = RepoError::from(StoreError::MissingRecord {
            collection: "portfolio",
            id: 42,
        });
        assert!(matches!(err, RepoError::NotFound(42)));
        assert!(err.is_not_found());
    }

    #[test]
    fn reorder_rejects_duplicates_before_writing() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let repo = PortfolioRepository::new(&backend);
        let a = repo.create(&draft("a").into_new_item().unwrap()).unwrap();
        let b = repo.create(&draft("b").into_new_item().unwrap()).unwrap();

        let err = repo
            .reorder(&[b.clone(), a.clone(), b.clone()])
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ItemValidationError::DuplicateId(id)) if id == b.id
        ));

        let orders: Vec<i64> = backend
            .select_all()
            .unwrap()
            .iter()
            .map(|item| item.order)
            .collect();
        assert_eq!(orders, vec![0, 1]);
    }

    #[test]
    fn reorder_rejects_sequence_that_leaves_items_out() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let repo = PortfolioRepository::new(&backend);
        let created: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|title| repo.create(&draft(title).into_new_item().unwrap()).unwrap())
            .collect();

        let err = repo
            .reorder(&[created[3].clone(), created[2].clone()])
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ItemValidationError::IncompleteSequence(ref ids))
                if *ids == vec![created[0].id, created[1].id]
        ));

        let orders: Vec<i64> = repo.list().iter().map(|item| item.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }

    #[test]
    fn update_with_blank_title_is_rejected() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let repo = PortfolioRepository::new(&backend);
        let mut item = repo.create(&draft("poster").into_new_item().unwrap()).unwrap();
        item.title = "  ".to_string();

        assert!(matches!(
            repo.update(&item),
            Err(RepoError::Validation(ItemValidationError::MissingTitle))
        ));
    }
}
