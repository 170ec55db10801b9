//! Public portfolio views.
//!
//! # Responsibility
//! - Turn the ordered item list into what visitors see: visible items only,
//!   optionally narrowed to one category, split into featured and grid.
//! - Resolve public project pages by slug.
//! - Summarize the collection for the admin dashboard.
//!
//! # Invariants
//! - Hidden items never reach a public view.
//! - Sections keep the list's `order`; featured and grid share it.

use crate::model::portfolio::{Category, ItemId, ItemValidationError, PortfolioItem};
use crate::model::settings::SiteSettings;
use crate::repo::{PortfolioRepository, RepoError, RepoResult};
use crate::store::ItemStore;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const ALL_LABEL: &str = "All";

/// Category tab selected by the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(self, item: &PortfolioItem) -> bool {
        match self {
            Self::All => true,
            Self::Only(category) => item.category == category,
        }
    }

    /// Tabs in display order, `All` first.
    pub fn tabs() -> Vec<CategoryFilter> {
        std::iter::once(Self::All)
            .chain(Category::ALL.into_iter().map(Self::Only))
            .collect()
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(ALL_LABEL),
            Self::Only(category) => Display::fmt(category, f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ItemValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case(ALL_LABEL) {
            return Ok(Self::All);
        }
        value.parse().map(Self::Only)
    }
}

/// One titled block of the public page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GallerySection {
    pub title: String,
    pub items: Vec<PortfolioItem>,
}

/// Public portfolio page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryView {
    /// Featured block; `None` when disabled or empty.
    pub featured: Option<GallerySection>,
    /// Grid block; `None` when disabled or empty.
    pub grid: Option<GallerySection>,
    /// Every item matching the filter, featured and grid, in display order.
    /// Lightbox navigation walks this sequence.
    visible: Vec<PortfolioItem>,
}

impl GalleryView {
    pub fn build(items: &[PortfolioItem], settings: &SiteSettings, filter: CategoryFilter) -> Self {
        let visible: Vec<PortfolioItem> = items
            .iter()
            .filter(|item| !item.is_hidden && filter.matches(item))
            .cloned()
            .collect();

        let (featured, grid): (Vec<PortfolioItem>, Vec<PortfolioItem>) =
            visible.iter().cloned().partition(|item| item.is_featured);

        Self {
            featured: section(settings.show_featured, &settings.featured_title, featured),
            grid: section(settings.show_visual, &settings.visual_title, grid),
            visible,
        }
    }

    pub fn visible(&self) -> &[PortfolioItem] {
        &self.visible
    }

    /// Item after `id`, wrapping to the first. `None` if `id` is not visible.
    pub fn next_after(&self, id: ItemId) -> Option<&PortfolioItem> {
        let index = self.index_of(id)?;
        self.visible.get((index + 1) % self.visible.len())
    }

    /// Item before `id`, wrapping to the last. `None` if `id` is not visible.
    pub fn previous_before(&self, id: ItemId) -> Option<&PortfolioItem> {
        let index = self.index_of(id)?;
        let len = self.visible.len();
        self.visible.get((index + len - 1) % len)
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.visible.iter().position(|item| item.id == id)
    }
}

fn section(enabled: bool, title: &str, items: Vec<PortfolioItem>) -> Option<GallerySection> {
    (enabled && !items.is_empty()).then(|| GallerySection {
        title: title.to_string(),
        items,
    })
}

/// Resolves a public project page. Hidden projects are reported as missing.
pub fn find_public_project<S: ItemStore>(
    repo: &PortfolioRepository<S>,
    slug: &str,
) -> RepoResult<PortfolioItem> {
    let item = repo.find_by_slug(slug)?;
    if item.is_hidden {
        return Err(RepoError::SlugNotFound(slug.to_string()));
    }
    Ok(item)
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PortfolioStats {
    pub total: usize,
    pub featured: usize,
    pub hidden: usize,
}

impl PortfolioStats {
    pub fn from_items(items: &[PortfolioItem]) -> Self {
        Self {
            total: items.len(),
            featured: items.iter().filter(|item| item.is_featured).count(),
            hidden: items.iter().filter(|item| item.is_hidden).count(),
        }
    }
}
