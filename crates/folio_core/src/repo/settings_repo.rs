//! Singleton settings repositories.
//!
//! Reads never fail: a missing row or a backend error yields defaults, and a
//! partial row has defaults merged under its absent fields. Writes replace
//! the whole row.

use super::portfolio_repo::RepoResult;
use crate::model::settings::{HeroSettings, SiteSettings};
use crate::store::SettingsStore;
use log::{info, warn};

/// Site sections and SEO metadata.
pub struct SettingsRepository<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> SettingsRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get(&self) -> SiteSettings {
        match self.store.load_site_settings() {
            Ok(Some(stored)) => stored.merge_onto_defaults(),
            Ok(None) => SiteSettings::default(),
            Err(err) => {
                warn!("event=settings_get module=repo row=site status=degraded error={err}");
                SiteSettings::default()
            }
        }
    }

    pub fn update(&self, settings: &SiteSettings) -> RepoResult<()> {
        self.store.save_site_settings(settings)?;
        info!("event=settings_update module=repo row=site status=ok");
        Ok(())
    }
}

/// Hero section appearance.
pub struct HeroRepository<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> HeroRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn get(&self) -> HeroSettings {
        match self.store.load_hero_settings() {
            Ok(Some(stored)) => stored.merge_onto_defaults(),
            Ok(None) => HeroSettings::default(),
            Err(err) => {
                warn!("event=settings_get module=repo row=hero status=degraded error={err}");
                HeroSettings::default()
            }
        }
    }

    pub fn update(&self, settings: &HeroSettings) -> RepoResult<()> {
        self.store.save_hero_settings(settings)?;
        info!("event=settings_update module=repo row=hero status=ok");
        Ok(())
    }
}
