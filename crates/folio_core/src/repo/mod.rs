//! Repository layer: typed, stateless translators over a persistence backend.
//!
//! # Responsibility
//! - Expose use-case shaped operations for portfolio items and settings rows.
//! - Keep backend details (SQL, JSON documents) out of consumers.
//!
//! # Invariants
//! - Repositories hold no authoritative state; the backend owns every record.
//! - Validation runs before any backend call.
//! - Reads degrade to empty/default results; writes surface failure.

pub mod portfolio_repo;
pub mod settings_repo;

pub use portfolio_repo::{PortfolioRepository, RepoError, RepoResult};
pub use settings_repo::{HeroRepository, SettingsRepository};
