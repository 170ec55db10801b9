//! Core data access and ordering for the Folio portfolio site.
//! This crate is the single source of truth for portfolio invariants.

pub mod config;
pub mod db;
pub mod derive;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod upload;

pub use config::{BackendConfig, ConfigError, ConfigLoader, FolioConfig};
pub use derive::{slug_from_title, youtube_thumbnail, youtube_video_id};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::portfolio::{
    Category, ItemEdits, ItemId, ItemValidationError, NewPortfolioItem, PortfolioDraft,
    PortfolioItem,
};
pub use model::settings::{HeroSettings, SiteSettings};
pub use repo::{HeroRepository, PortfolioRepository, RepoError, RepoResult, SettingsRepository};
pub use service::editor::{EditorError, PortfolioEditor, SectionSettingsEditor};
pub use service::gallery::{
    find_public_project, CategoryFilter, GallerySection, GalleryView, PortfolioStats,
};
pub use service::ordering::{move_by_id, move_index, renumber, OrderingError};
pub use store::{open_backend, Backend, ItemStore, SettingsStore, StoreError, StoreResult};
pub use upload::{DataUriUploader, DirectoryUploader, ImageUploader, UploadError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
