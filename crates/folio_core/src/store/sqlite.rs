//! Relational backend over SQLite.
//!
//! # Responsibility
//! - Map portfolio items and settings rows to typed SQLite columns.
//! - Keep multi-step writes (append, bulk reorder) inside one transaction.
//!
//! # Invariants
//! - Item listing is deterministic: `sort_order ASC, id ASC`.
//! - Read paths reject malformed rows instead of masking them.
//! - `created_at`/`updated_at` are backend-managed and never leave this file.

use super::{
    ItemStore, SettingsStore, StoreError, StoreResult, PORTFOLIO_COLLECTION,
    SITE_SETTINGS_COLLECTION,
};
use crate::db::migrations::{current_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::portfolio::{Category, ItemId, NewPortfolioItem, PortfolioItem};
use crate::model::settings::{HeroSettings, SiteSettings, StoredHeroSettings, StoredSiteSettings};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::path::Path;

const ITEM_SELECT_SQL: &str = "SELECT
    id,
    title,
    category,
    image,
    description,
    sort_order,
    is_featured,
    is_hidden,
    slug,
    tools,
    images,
    video_url,
    seo_title,
    seo_description,
    alt_text,
    title_attribute
FROM portfolio_items";

/// SQLite-backed store for items and settings rows.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a migrated in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(&conn)?;
        if actual_version != expected_version {
            return Err(DbError::SchemaMismatch {
                expected_version,
                actual_version,
            }
            .into());
        }
        Ok(Self { conn })
    }

    /// Underlying connection, for maintenance and diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ItemStore for SqliteBackend {
    fn select_all(&self) -> StoreResult<Vec<PortfolioItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} ORDER BY sort_order ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn select_one(&self, id: ItemId) -> StoreResult<Option<PortfolioItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }
        Ok(None)
    }

    fn insert(&self, item: &NewPortfolioItem) -> StoreResult<PortfolioItem> {
        let tools = encode_list(&item.tools)?;
        let images = encode_list(&item.images)?;

        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let order: i64 = tx.query_row(
            "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM portfolio_items;",
            [],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO portfolio_items (
                title,
                category,
                image,
                description,
                sort_order,
                is_featured,
                is_hidden,
                slug,
                tools,
                images,
                video_url,
                seo_title,
                seo_description,
                alt_text,
                title_attribute
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15);",
            params![
                item.title.as_str(),
                item.category.label(),
                item.image.as_str(),
                item.description.as_str(),
                order,
                bool_to_int(item.is_featured),
                bool_to_int(item.is_hidden),
                item.slug.as_str(),
                tools,
                images,
                item.video_url.as_deref(),
                item.seo_title.as_deref(),
                item.seo_description.as_deref(),
                item.alt_text.as_deref(),
                item.title_attribute.as_deref(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        debug!("event=item_insert module=store kind=sqlite item_id={id} order={order}");
        Ok(item.clone().into_item(id, order))
    }

    fn update(&self, item: &PortfolioItem) -> StoreResult<()> {
        let changed = self.conn.execute(
            "UPDATE portfolio_items
             SET
                title = ?1,
                category = ?2,
                image = ?3,
                description = ?4,
                sort_order = ?5,
                is_featured = ?6,
                is_hidden = ?7,
                slug = ?8,
                tools = ?9,
                images = ?10,
                video_url = ?11,
                seo_title = ?12,
                seo_description = ?13,
                alt_text = ?14,
                title_attribute = ?15,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?16;",
            params![
                item.title.as_str(),
                item.category.label(),
                item.image.as_str(),
                item.description.as_str(),
                item.order,
                bool_to_int(item.is_featured),
                bool_to_int(item.is_hidden),
                item.slug.as_str(),
                encode_list(&item.tools)?,
                encode_list(&item.images)?,
                item.video_url.as_deref(),
                item.seo_title.as_deref(),
                item.seo_description.as_deref(),
                item.alt_text.as_deref(),
                item.title_attribute.as_deref(),
                item.id,
            ],
        )?;

        if changed == 0 {
            return Err(missing(item.id));
        }
        Ok(())
    }

    fn update_order(&self, id: ItemId, order: i64) -> StoreResult<()> {
        write_order(&self.conn, id, order)
    }

    fn delete(&self, id: ItemId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM portfolio_items WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(missing(id));
        }
        Ok(())
    }

    fn delete_where(&self, predicate: &dyn Fn(&PortfolioItem) -> bool) -> StoreResult<usize> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let doomed: Vec<ItemId> = self
            .select_all()?
            .into_iter()
            .filter(|item| predicate(item))
            .map(|item| item.id)
            .collect();
        for id in &doomed {
            tx.execute("DELETE FROM portfolio_items WHERE id = ?1;", [id])?;
        }
        tx.commit()?;
        Ok(doomed.len())
    }

    fn delete_all(&self) -> StoreResult<usize> {
        let removed = self.conn.execute("DELETE FROM portfolio_items;", [])?;
        Ok(removed)
    }

    /// Applies every position inside one IMMEDIATE transaction: either all
    /// orders change or none do.
    fn write_positions(&self, positions: &[(ItemId, i64)]) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        for &(id, order) in positions {
            write_order(&tx, id, order)?;
        }
        tx.commit()?;
        Ok(())
    }
}

impl SettingsStore for SqliteBackend {
    fn load_site_settings(&self) -> StoreResult<Option<StoredSiteSettings>> {
        let stored = self
            .conn
            .query_row(
                "SELECT
                    featured_title,
                    visual_title,
                    show_featured,
                    show_visual,
                    seo_title,
                    meta_description,
                    og_title,
                    og_description,
                    og_image,
                    show_local_seo,
                    local_seo_content_en,
                    local_seo_content_ml
                 FROM site_settings
                 WHERE id = 1;",
                [],
                |row| {
                    Ok((
                        StoredSiteSettings {
                            featured_title: row.get("featured_title")?,
                            visual_title: row.get("visual_title")?,
                            show_featured: None,
                            show_visual: None,
                            seo_title: row.get("seo_title")?,
                            meta_description: row.get("meta_description")?,
                            og_title: row.get("og_title")?,
                            og_description: row.get("og_description")?,
                            og_image: row.get("og_image")?,
                            show_local_seo: None,
                            local_seo_content_en: row.get("local_seo_content_en")?,
                            local_seo_content_ml: row.get("local_seo_content_ml")?,
                        },
                        row.get::<_, Option<i64>>("show_featured")?,
                        row.get::<_, Option<i64>>("show_visual")?,
                        row.get::<_, Option<i64>>("show_local_seo")?,
                    ))
                },
            )
            .optional()?;

        let Some((mut settings, show_featured, show_visual, show_local_seo)) = stored else {
            return Ok(None);
        };
        settings.show_featured = parse_optional_flag(show_featured, "site_settings.show_featured")?;
        settings.show_visual = parse_optional_flag(show_visual, "site_settings.show_visual")?;
        settings.show_local_seo =
            parse_optional_flag(show_local_seo, "site_settings.show_local_seo")?;
        Ok(Some(settings))
    }

    fn save_site_settings(&self, settings: &SiteSettings) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO site_settings (
                id,
                featured_title,
                visual_title,
                show_featured,
                show_visual,
                seo_title,
                meta_description,
                og_title,
                og_description,
                og_image,
                show_local_seo,
                local_seo_content_en,
                local_seo_content_ml
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            ON CONFLICT(id) DO UPDATE SET
                featured_title = excluded.featured_title,
                visual_title = excluded.visual_title,
                show_featured = excluded.show_featured,
                show_visual = excluded.show_visual,
                seo_title = excluded.seo_title,
                meta_description = excluded.meta_description,
                og_title = excluded.og_title,
                og_description = excluded.og_description,
                og_image = excluded.og_image,
                show_local_seo = excluded.show_local_seo,
                local_seo_content_en = excluded.local_seo_content_en,
                local_seo_content_ml = excluded.local_seo_content_ml,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                settings.featured_title.as_str(),
                settings.visual_title.as_str(),
                bool_to_int(settings.show_featured),
                bool_to_int(settings.show_visual),
                settings.seo_title.as_str(),
                settings.meta_description.as_str(),
                settings.og_title.as_str(),
                settings.og_description.as_str(),
                settings.og_image.as_str(),
                bool_to_int(settings.show_local_seo),
                settings.local_seo_content_en.as_str(),
                settings.local_seo_content_ml.as_str(),
            ],
        )?;
        debug!("event=settings_save module=store kind=sqlite collection={SITE_SETTINGS_COLLECTION}");
        Ok(())
    }

    fn load_hero_settings(&self) -> StoreResult<Option<StoredHeroSettings>> {
        let stored = self
            .conn
            .query_row(
                "SELECT text_color, background_image FROM hero_settings WHERE id = 1;",
                [],
                |row| {
                    Ok(StoredHeroSettings {
                        text_color: row.get("text_color")?,
                        background_image: row.get("background_image")?,
                    })
                },
            )
            .optional()?;
        Ok(stored)
    }

    fn save_hero_settings(&self, settings: &HeroSettings) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO hero_settings (id, text_color, background_image)
             VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET
                text_color = excluded.text_color,
                background_image = excluded.background_image,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![
                settings.text_color.as_str(),
                settings.background_image.as_deref()
            ],
        )?;
        Ok(())
    }
}

fn write_order(conn: &Connection, id: ItemId, order: i64) -> StoreResult<()> {
    let changed = conn.execute(
        "UPDATE portfolio_items
         SET sort_order = ?2,
             updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1;",
        params![id, order],
    )?;
    if changed == 0 {
        return Err(missing(id));
    }
    Ok(())
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<PortfolioItem> {
    let category_text: String = row.get("category")?;
    let category = category_text.parse::<Category>().map_err(|_| {
        StoreError::InvalidData(format!(
            "invalid category `{category_text}` in portfolio_items.category"
        ))
    })?;

    Ok(PortfolioItem {
        id: row.get("id")?,
        title: row.get("title")?,
        category,
        image: row.get("image")?,
        description: row.get("description")?,
        order: row.get("sort_order")?,
        is_featured: parse_flag(row.get("is_featured")?, "portfolio_items.is_featured")?,
        is_hidden: parse_flag(row.get("is_hidden")?, "portfolio_items.is_hidden")?,
        slug: row.get("slug")?,
        tools: decode_list(&row.get::<_, String>("tools")?, "portfolio_items.tools")?,
        images: decode_list(&row.get::<_, String>("images")?, "portfolio_items.images")?,
        video_url: row.get("video_url")?,
        seo_title: row.get("seo_title")?,
        seo_description: row.get("seo_description")?,
        alt_text: row.get("alt_text")?,
        title_attribute: row.get("title_attribute")?,
    })
}

fn encode_list(values: &[String]) -> StoreResult<String> {
    serde_json::to_string(values).map_err(|source| StoreError::Serialization {
        collection: PORTFOLIO_COLLECTION,
        source,
    })
}

fn decode_list(text: &str, column: &'static str) -> StoreResult<Vec<String>> {
    serde_json::from_str(text).map_err(|err| {
        StoreError::InvalidData(format!("invalid JSON list in {column}: {err}"))
    })
}

fn parse_flag(value: i64, column: &'static str) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StoreError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn parse_optional_flag(value: Option<i64>, column: &'static str) -> StoreResult<Option<bool>> {
    value.map(|value| parse_flag(value, column)).transpose()
}

fn missing(id: ItemId) -> StoreError {
    StoreError::MissingRecord {
        collection: PORTFOLIO_COLLECTION,
        id,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
