//! Domain model for portfolio projects and site configuration.
//!
//! # Responsibility
//! - Define the persisted project record, its draft and creation payloads.
//! - Define the singleton settings rows and their defaults.
//!
//! # Invariants
//! - Every project is identified by a backend-assigned `ItemId`.
//! - Repositories hold no authoritative copy of any of these types.

pub mod portfolio;
pub mod settings;
