//! Portfolio item domain model.
//!
//! # Responsibility
//! - Define the persisted project record and its creation payloads.
//! - Validate drafts before they are promoted to persisted entities.
//!
//! # Invariants
//! - `order` is one value space shared by featured and grid items.
//! - `slug` is fixed when the item is created; renames do not touch it.
//! - A new item always has a non-blank title and an image or a video link.

use crate::derive::{slug_from_title, youtube_thumbnail};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Stable identifier assigned by the persistence backend at creation.
pub type ItemId = i64;

/// Marker found in legacy thumbnails that YouTube does not serve for every
/// video; such images are replaced on edit.
const LEGACY_THUMBNAIL_MARKER: &str = "maxresdefault";

/// Fixed set of project categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    #[serde(rename = "Graphic Design")]
    GraphicDesign,
    #[serde(rename = "Videography/Editing")]
    VideographyEditing,
    #[serde(rename = "Motion Graphics")]
    MotionGraphics,
    #[serde(rename = "Photography")]
    Photography,
    #[serde(rename = "Social Media")]
    SocialMedia,
    #[serde(rename = "Website")]
    Website,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 6] = [
        Category::GraphicDesign,
        Category::VideographyEditing,
        Category::MotionGraphics,
        Category::Photography,
        Category::SocialMedia,
        Category::Website,
    ];

    /// Human-readable label, also used as the persisted value.
    pub fn label(self) -> &'static str {
        match self {
            Category::GraphicDesign => "Graphic Design",
            Category::VideographyEditing => "Videography/Editing",
            Category::MotionGraphics => "Motion Graphics",
            Category::Photography => "Photography",
            Category::SocialMedia => "Social Media",
            Category::Website => "Website",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ItemValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ItemValidationError::UnknownCategory(value.to_string()))
    }
}

/// Validation failures caught before any backend call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemValidationError {
    #[error("title is required")]
    MissingTitle,
    #[error("an image or a video link is required")]
    MissingMedia,
    #[error("item {0} appears more than once in the reorder sequence")]
    DuplicateId(ItemId),
    #[error("reorder sequence leaves out stored items {0:?}")]
    IncompleteSequence(Vec<ItemId>),
    #[error("unknown category `{0}`")]
    UnknownCategory(String),
}

/// Persisted portfolio project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: ItemId,
    pub title: String,
    pub category: Category,
    /// URL or embedded data reference of the cover image.
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub description: String,
    /// Display position; ascending means earlier.
    pub order: i64,
    #[serde(default)]
    pub is_featured: bool,
    /// Hidden items are visible to the admin only.
    #[serde(default)]
    pub is_hidden: bool,
    pub slug: String,
    #[serde(default)]
    pub tools: Vec<String>,
    /// Gallery images, in display order.
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_attribute: Option<String>,
}

impl PortfolioItem {
    /// Validates fields that every persisted item must satisfy.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::MissingTitle);
        }
        Ok(())
    }

    /// Replaces an empty or legacy cover image with the thumbnail of the
    /// item's YouTube link.
    ///
    /// Returns whether the image changed.
    pub fn refresh_video_thumbnail(&mut self) -> bool {
        let Some(thumbnail) = self.video_url.as_deref().and_then(youtube_thumbnail) else {
            return false;
        };
        if self.image.is_empty() || self.image.contains(LEGACY_THUMBNAIL_MARKER) {
            self.image = thumbnail;
            return true;
        }
        false
    }
}

/// Validated creation payload: a portfolio item before the backend assigns
/// `id` and `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPortfolioItem {
    pub title: String,
    pub category: Category,
    pub image: String,
    pub description: String,
    pub is_featured: bool,
    pub is_hidden: bool,
    pub slug: String,
    pub tools: Vec<String>,
    pub images: Vec<String>,
    pub video_url: Option<String>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub alt_text: Option<String>,
    pub title_attribute: Option<String>,
}

impl NewPortfolioItem {
    /// Checks creation requirements: non-blank title, and an image unless a
    /// video link is present.
    pub fn validate(&self) -> Result<(), ItemValidationError> {
        if self.title.trim().is_empty() {
            return Err(ItemValidationError::MissingTitle);
        }
        if self.image.is_empty() && self.video_url.is_none() {
            return Err(ItemValidationError::MissingMedia);
        }
        Ok(())
    }

    /// Attaches backend-assigned identity and position.
    pub fn into_item(self, id: ItemId, order: i64) -> PortfolioItem {
        PortfolioItem {
            id,
            title: self.title,
            category: self.category,
            image: self.image,
            description: self.description,
            order,
            is_featured: self.is_featured,
            is_hidden: self.is_hidden,
            slug: self.slug,
            tools: self.tools,
            images: self.images,
            video_url: self.video_url,
            seo_title: self.seo_title,
            seo_description: self.seo_description,
            alt_text: self.alt_text,
            title_attribute: self.title_attribute,
        }
    }
}

/// Admin "new project" form state. Every field may still be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PortfolioDraft {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub tools: Vec<String>,
    pub images: Vec<String>,
    pub video_url: Option<String>,
    pub is_featured: bool,
    pub is_hidden: bool,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub alt_text: Option<String>,
    pub title_attribute: Option<String>,
}

impl PortfolioDraft {
    /// Creates a draft with only a title set.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Validates the draft and promotes it to a creation payload.
    ///
    /// # Contract
    /// - Blank `video_url` counts as absent.
    /// - The slug is derived from the title exactly once, here.
    /// - Without an explicit image the YouTube thumbnail is used; a non-YouTube
    ///   video leaves the image empty.
    pub fn into_new_item(self) -> Result<NewPortfolioItem, ItemValidationError> {
        let title = self
            .title
            .filter(|title| !title.trim().is_empty())
            .ok_or(ItemValidationError::MissingTitle)?;
        let video_url = non_blank(self.video_url);
        let image = non_blank(self.image);
        if image.is_none() && video_url.is_none() {
            return Err(ItemValidationError::MissingMedia);
        }

        let image = match image {
            Some(image) => image,
            None => video_url
                .as_deref()
                .and_then(youtube_thumbnail)
                .unwrap_or_default(),
        };

        let item = NewPortfolioItem {
            slug: slug_from_title(&title),
            title,
            category: self.category.unwrap_or_default(),
            image,
            description: self.description.unwrap_or_default(),
            is_featured: self.is_featured,
            is_hidden: self.is_hidden,
            tools: self.tools,
            images: self.images,
            video_url,
            seo_title: non_blank(self.seo_title),
            seo_description: non_blank(self.seo_description),
            alt_text: non_blank(self.alt_text),
            title_attribute: non_blank(self.title_attribute),
        };
        item.validate()?;
        Ok(item)
    }
}

/// Field changes for an existing item. `None` leaves a field untouched.
///
/// For the optional text fields, `Some` with a blank value clears the field.
/// `id`, `order` and `slug` cannot be edited here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemEdits {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub image: Option<String>,
    pub description: Option<String>,
    pub tools: Option<Vec<String>>,
    pub images: Option<Vec<String>>,
    pub video_url: Option<String>,
    pub is_featured: Option<bool>,
    pub is_hidden: Option<bool>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub alt_text: Option<String>,
    pub title_attribute: Option<String>,
}

impl ItemEdits {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Writes every present change onto `item`.
    pub fn apply_to(self, item: &mut PortfolioItem) {
        if let Some(title) = self.title {
            item.title = title;
        }
        if let Some(category) = self.category {
            item.category = category;
        }
        if let Some(image) = self.image {
            item.image = image;
        }
        if let Some(description) = self.description {
            item.description = description;
        }
        if let Some(tools) = self.tools {
            item.tools = tools;
        }
        if let Some(images) = self.images {
            item.images = images;
        }
        if let Some(featured) = self.is_featured {
            item.is_featured = featured;
        }
        if let Some(hidden) = self.is_hidden {
            item.is_hidden = hidden;
        }
        replace_optional(&mut item.video_url, self.video_url);
        replace_optional(&mut item.seo_title, self.seo_title);
        replace_optional(&mut item.seo_description, self.seo_description);
        replace_optional(&mut item.alt_text, self.alt_text);
        replace_optional(&mut item.title_attribute, self.title_attribute);
    }
}

fn replace_optional(field: &mut Option<String>, edit: Option<String>) {
    if let Some(value) = edit {
        *field = non_blank(Some(value));
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{Category, ItemEdits, ItemValidationError, PortfolioDraft};

    #[test]
    fn category_parses_labels_case_insensitively() {
        assert_eq!(
            "videography/editing".parse::<Category>().unwrap(),
            Category::VideographyEditing
        );
        assert_eq!(" Website ".parse::<Category>().unwrap(), Category::Website);
        assert!(matches!(
            "Pottery".parse::<Category>(),
            Err(ItemValidationError::UnknownCategory(value)) if value == "Pottery"
        ));
    }

    #[test]
    fn category_serializes_with_label() {
        let json = serde_json::to_string(&Category::SocialMedia).unwrap();
        assert_eq!(json, "\"Social Media\"");
    }

    #[test]
    fn draft_without_title_is_rejected() {
        let mut draft = PortfolioDraft::titled("   ");
        draft.image = Some("cover.png".to_string());
        assert_eq!(draft.into_new_item(), Err(ItemValidationError::MissingTitle));
    }

    #[test]
    fn draft_without_media_is_rejected() {
        let mut draft = PortfolioDraft::titled("Poster");
        draft.video_url = Some("  ".to_string());
        assert_eq!(draft.into_new_item(), Err(ItemValidationError::MissingMedia));
    }

    #[test]
    fn draft_promotion_fills_defaults_and_slug() {
        let mut draft = PortfolioDraft::titled("Modern Brand Identity");
        draft.image = Some("cover.png".to_string());
        let item = draft.into_new_item().unwrap();

        assert_eq!(item.slug, "modern-brand-identity");
        assert_eq!(item.category, Category::GraphicDesign);
        assert_eq!(item.description, "");
        assert!(item.tools.is_empty());
        assert!(item.video_url.is_none());
    }

    #[test]
    fn draft_with_youtube_video_derives_cover_image() {
        let mut draft = PortfolioDraft::titled("Showreel");
        draft.video_url = Some("https://youtu.be/dQw4w9WgXcQ".to_string());
        let item = draft.into_new_item().unwrap();
        assert_eq!(
            item.image,
            "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
        );
    }

    #[test]
    fn draft_with_other_video_keeps_empty_cover() {
        let mut draft = PortfolioDraft::titled("Clip");
        draft.video_url = Some("https://example.com/video.mp4".to_string());
        let item = draft.into_new_item().unwrap();
        assert_eq!(item.image, "");
        assert_eq!(
            item.video_url.as_deref(),
            Some("https://example.com/video.mp4")
        );
    }

    #[test]
    fn refresh_replaces_legacy_thumbnail_only() {
        let mut draft = PortfolioDraft::titled("Reel");
        draft.image = Some("https://img.youtube.com/vi/old/maxresdefault.jpg".to_string());
        draft.video_url = Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string());
        let mut item = draft.into_new_item().unwrap().into_item(1, 0);

        assert!(item.refresh_video_thumbnail());
        assert_eq!(
            item.image,
            "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"
        );

        item.image = "custom.png".to_string();
        assert!(!item.refresh_video_thumbnail());
        assert_eq!(item.image, "custom.png");
    }

    #[test]
    fn edits_touch_only_present_fields() {
        let mut draft = PortfolioDraft::titled("Poster Series");
        draft.image = Some("poster.png".to_string());
        draft.tools = vec!["Photoshop".to_string()];
        draft.seo_title = Some("Posters".to_string());
        draft.alt_text = Some("Three posters".to_string());
        let mut item = draft.into_new_item().unwrap().into_item(4, 2);
        let untouched = item.clone();

        ItemEdits::default().apply_to(&mut item);
        assert_eq!(item, untouched);

        let edits = ItemEdits {
            title: Some("Poster Series II".to_string()),
            tools: Some(vec!["Illustrator".to_string(), "InDesign".to_string()]),
            images: Some(vec!["a.png".to_string(), "b.png".to_string()]),
            seo_description: Some("Gig posters".to_string()),
            alt_text: Some("  ".to_string()),
            title_attribute: Some("Open the series".to_string()),
            is_hidden: Some(true),
            ..ItemEdits::default()
        };
        assert!(!edits.is_empty());
        edits.apply_to(&mut item);

        assert_eq!(item.title, "Poster Series II");
        assert_eq!(item.tools, vec!["Illustrator", "InDesign"]);
        assert_eq!(item.images, vec!["a.png", "b.png"]);
        assert_eq!(item.seo_title.as_deref(), Some("Posters"));
        assert_eq!(item.seo_description.as_deref(), Some("Gig posters"));
        assert_eq!(item.alt_text, None);
        assert_eq!(item.title_attribute.as_deref(), Some("Open the series"));
        assert!(item.is_hidden);
        assert_eq!((item.id, item.order, item.slug.as_str()), (4, 2, "poster-series"));
    }
}
