//! Pure derivations over user-entered item fields.
//!
//! # Responsibility
//! - Derive the public slug from a project title.
//! - Extract YouTube video identifiers and build thumbnail URLs.
//!
//! # Invariants
//! - No function in this module performs I/O or fails loudly; malformed input
//!   yields `None` rather than an error.
//! - Slugs are derived once at creation time and never recomputed on rename.

use once_cell::sync::Lazy;
use regex::Regex;

const YOUTUBE_ID_LEN: usize = 11;

static YOUTUBE_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*(?:youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=|shorts/)([^#&?/]*).*")
        .expect("valid youtube url regex")
});

/// Derives the public slug for a title.
///
/// Lowercases the title and replaces every space with a hyphen. Other
/// characters are kept as-is and repeated spaces produce repeated hyphens.
pub fn slug_from_title(title: &str) -> String {
    title.to_lowercase().replace(' ', "-")
}

/// Extracts the 11-character YouTube video identifier from a URL.
///
/// Recognizes `watch?v=`, `&v=`, `youtu.be/`, `embed/`, `shorts/`, `v/` and
/// `u/<x>/` shapes. Returns `None` for anything else.
pub fn youtube_video_id(url: &str) -> Option<String> {
    let captures = YOUTUBE_URL_RE.captures(url)?;
    let id = captures.get(1)?.as_str();
    if id.chars().count() == YOUTUBE_ID_LEN {
        Some(id.to_string())
    } else {
        None
    }
}

/// Builds the `hqdefault` thumbnail URL for a YouTube link.
pub fn youtube_thumbnail(url: &str) -> Option<String> {
    youtube_video_id(url).map(|id| format!("https://img.youtube.com/vi/{id}/hqdefault.jpg"))
}
