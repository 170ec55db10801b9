//! Consumer-side use cases built on the repositories.
//!
//! # Responsibility
//! - Admin editing flows and the public portfolio views.
//! - Keep callers (CLI, future UI layers) decoupled from storage details.

pub mod editor;
pub mod gallery;
pub mod ordering;
