//! Admin editing workflows.
//!
//! # Responsibility
//! - Hold the admin's transient copy of the portfolio and settings.
//! - Drive repository writes and reconcile the local copy with their results.
//!
//! # Invariants
//! - The local list only changes after the matching write succeeded, except
//!   for a failed reorder, which reloads from the backend.
//! - Section settings have no save step; each change is persisted at once.

use crate::model::portfolio::{ItemId, PortfolioDraft, PortfolioItem};
use crate::model::settings::SiteSettings;
use crate::repo::{PortfolioRepository, RepoError, RepoResult, SettingsRepository};
use crate::service::ordering::{move_by_id, OrderingError};
use crate::store::{ItemStore, SettingsStore};
use log::{info, warn};
use thiserror::Error;

/// Errors from editor operations that combine ordering with persistence.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Ordering(#[from] OrderingError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Portfolio management screen state.
pub struct PortfolioEditor<S: ItemStore> {
    repo: PortfolioRepository<S>,
    items: Vec<PortfolioItem>,
}

impl<S: ItemStore> PortfolioEditor<S> {
    /// Creates an editor with an empty local copy; call [`Self::load`] next.
    pub fn new(repo: PortfolioRepository<S>) -> Self {
        Self {
            repo,
            items: Vec::new(),
        }
    }

    /// Re-fetches the full list from the repository.
    pub fn load(&mut self) -> &[PortfolioItem] {
        self.items = self.repo.list();
        &self.items
    }

    /// Local copy in display order.
    pub fn items(&self) -> &[PortfolioItem] {
        &self.items
    }

    pub fn featured(&self) -> Vec<&PortfolioItem> {
        self.items.iter().filter(|item| item.is_featured).collect()
    }

    pub fn grid(&self) -> Vec<&PortfolioItem> {
        self.items.iter().filter(|item| !item.is_featured).collect()
    }

    /// Validates and creates a project, then re-fetches the list.
    pub fn create(&mut self, draft: PortfolioDraft) -> RepoResult<PortfolioItem> {
        let new_item = draft.into_new_item()?;
        let created = self.repo.create(&new_item)?;
        self.load();
        Ok(created)
    }

    /// Saves an edited item and patches it into the local copy.
    ///
    /// An empty or legacy cover image is replaced by the video thumbnail
    /// first. Returns the item as persisted.
    pub fn save_edit(&mut self, mut item: PortfolioItem) -> RepoResult<PortfolioItem> {
        if item.refresh_video_thumbnail() {
            info!(
                "event=thumbnail_refresh module=editor status=ok item_id={}",
                item.id
            );
        }
        self.repo.update(&item)?;
        if let Some(slot) = self.items.iter_mut().find(|local| local.id == item.id) {
            *slot = item.clone();
        }
        Ok(item)
    }

    pub fn delete(&mut self, id: ItemId) -> RepoResult<()> {
        self.repo.delete(id)?;
        self.items.retain(|item| item.id != id);
        Ok(())
    }

    /// Drops `moved` onto `target` and persists the resulting sequence.
    ///
    /// Returns `false` when nothing moved. On a failed write the local copy
    /// is reloaded so it reflects whatever the backend kept.
    pub fn drag(&mut self, moved: ItemId, target: ItemId) -> Result<bool, EditorError> {
        let Some(reordered) = move_by_id(&self.items, moved, target)? else {
            return Ok(false);
        };

        match self.repo.reorder(&reordered) {
            Ok(renumbered) => {
                self.items = renumbered;
                Ok(true)
            }
            Err(err) => {
                warn!(
                    "event=drag_persist module=editor status=error moved={moved} target={target} error={err}"
                );
                self.load();
                Err(err.into())
            }
        }
    }

    /// Deletes every project. Confirmation is the caller's job.
    pub fn clear_all(&mut self) -> RepoResult<usize> {
        let removed = self.repo.clear_all()?;
        self.items.clear();
        Ok(removed)
    }
}

/// Section display toggles and titles, persisted on every change.
pub struct SectionSettingsEditor<S: SettingsStore> {
    repo: SettingsRepository<S>,
    settings: SiteSettings,
}

impl<S: SettingsStore> SectionSettingsEditor<S> {
    /// Loads current settings from the repository.
    pub fn load(repo: SettingsRepository<S>) -> Self {
        let settings = repo.get();
        Self { repo, settings }
    }

    pub fn settings(&self) -> &SiteSettings {
        &self.settings
    }

    /// Applies `change` and persists the full row immediately. The local
    /// copy is left untouched when the write fails.
    pub fn apply(&mut self, change: impl FnOnce(&mut SiteSettings)) -> RepoResult<&SiteSettings> {
        let mut next = self.settings.clone();
        change(&mut next);
        self.repo.update(&next)?;
        self.settings = next;
        Ok(&self.settings)
    }

    pub fn toggle_featured(&mut self) -> RepoResult<&SiteSettings> {
        self.apply(|settings| settings.show_featured = !settings.show_featured)
    }

    pub fn toggle_visual(&mut self) -> RepoResult<&SiteSettings> {
        self.apply(|settings| settings.show_visual = !settings.show_visual)
    }

    pub fn set_featured_title(&mut self, title: impl Into<String>) -> RepoResult<&SiteSettings> {
        let title = title.into();
        self.apply(move |settings| settings.featured_title = title)
    }

    pub fn set_visual_title(&mut self, title: impl Into<String>) -> RepoResult<&SiteSettings> {
        let title = title.into();
        self.apply(move |settings| settings.visual_title = title)
    }
}
