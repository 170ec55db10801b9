//! Singleton settings rows: site sections/SEO and hero appearance.
//!
//! # Invariants
//! - Stored rows may miss any field; reads merge defaults under them.
//! - A present stored field always wins over its default.

use serde::{Deserialize, Serialize};

const DEFAULT_HERO_TEXT_COLOR: &str = "#0f172a";

/// Site-wide section toggles and SEO metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub featured_title: String,
    pub visual_title: String,
    pub show_featured: bool,
    pub show_visual: bool,
    pub seo_title: String,
    pub meta_description: String,
    pub og_title: String,
    pub og_description: String,
    pub og_image: String,
    #[serde(rename = "showLocalSEO")]
    pub show_local_seo: bool,
    #[serde(rename = "localSEOContentEn")]
    pub local_seo_content_en: String,
    #[serde(rename = "localSEOContentMl")]
    pub local_seo_content_ml: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            featured_title: "Selected Projects".to_string(),
            visual_title: "Visual Works".to_string(),
            show_featured: true,
            show_visual: true,
            seo_title: "Nalimudheen".to_string(),
            meta_description: "Professional Graphic Designer, Photographer and Videographer in Kerala specializing in branding, videography/editing, motion graphics and institutional media coordination.".to_string(),
            og_title: "Nalimudheen - Portfolio".to_string(),
            og_description: "Digital portfolio of Nalimudheen, a visual storyteller based in Kerala.".to_string(),
            og_image: String::new(),
            show_local_seo: true,
            local_seo_content_en: "I provide professional graphic design, photography, videography, branding, and social media management services for educational institutions and businesses across Kerala.".to_string(),
            local_seo_content_ml: "കേരളത്തിൽ വിദ്യാഭ്യാസ സ്ഥാപനങ്ങൾക്കും ബിസിനസുകൾക്കും വേണ്ടിയുള്ള ഗ്രാഫിക് ഡിസൈൻ, ഫോട്ടോഗ്രഫി, വീഡിയോ ഗ്രാഫി, ബ്രാൻഡിംഗ്, സോഷ്യൽ മീഡിയ മാനേജ്മെന്റ് സേവനങ്ങൾ ഞാൻ നൽകുന്നു.".to_string(),
        }
    }
}

/// Site settings row as found in storage, with every column optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredSiteSettings {
    pub featured_title: Option<String>,
    pub visual_title: Option<String>,
    pub show_featured: Option<bool>,
    pub show_visual: Option<bool>,
    pub seo_title: Option<String>,
    pub meta_description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    #[serde(rename = "showLocalSEO")]
    pub show_local_seo: Option<bool>,
    #[serde(rename = "localSEOContentEn")]
    pub local_seo_content_en: Option<String>,
    #[serde(rename = "localSEOContentMl")]
    pub local_seo_content_ml: Option<String>,
}

impl StoredSiteSettings {
    /// Fills every absent field from [`SiteSettings::default`].
    pub fn merge_onto_defaults(self) -> SiteSettings {
        let defaults = SiteSettings::default();
        SiteSettings {
            featured_title: self.featured_title.unwrap_or(defaults.featured_title),
            visual_title: self.visual_title.unwrap_or(defaults.visual_title),
            show_featured: self.show_featured.unwrap_or(defaults.show_featured),
            show_visual: self.show_visual.unwrap_or(defaults.show_visual),
            seo_title: self.seo_title.unwrap_or(defaults.seo_title),
            meta_description: self.meta_description.unwrap_or(defaults.meta_description),
            og_title: self.og_title.unwrap_or(defaults.og_title),
            og_description: self.og_description.unwrap_or(defaults.og_description),
            og_image: self.og_image.unwrap_or(defaults.og_image),
            show_local_seo: self.show_local_seo.unwrap_or(defaults.show_local_seo),
            local_seo_content_en: self
                .local_seo_content_en
                .unwrap_or(defaults.local_seo_content_en),
            local_seo_content_ml: self
                .local_seo_content_ml
                .unwrap_or(defaults.local_seo_content_ml),
        }
    }
}

impl From<&SiteSettings> for StoredSiteSettings {
    fn from(value: &SiteSettings) -> Self {
        Self {
            featured_title: Some(value.featured_title.clone()),
            visual_title: Some(value.visual_title.clone()),
            show_featured: Some(value.show_featured),
            show_visual: Some(value.show_visual),
            seo_title: Some(value.seo_title.clone()),
            meta_description: Some(value.meta_description.clone()),
            og_title: Some(value.og_title.clone()),
            og_description: Some(value.og_description.clone()),
            og_image: Some(value.og_image.clone()),
            show_local_seo: Some(value.show_local_seo),
            local_seo_content_en: Some(value.local_seo_content_en.clone()),
            local_seo_content_ml: Some(value.local_seo_content_ml.clone()),
        }
    }
}

/// Hero section appearance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSettings {
    /// CSS color of the hero headline.
    pub text_color: String,
    pub background_image: Option<String>,
}

impl Default for HeroSettings {
    fn default() -> Self {
        Self {
            text_color: DEFAULT_HERO_TEXT_COLOR.to_string(),
            background_image: None,
        }
    }
}

/// Hero settings row as found in storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredHeroSettings {
    pub text_color: Option<String>,
    pub background_image: Option<String>,
}

impl StoredHeroSettings {
    /// Fills absent fields from [`HeroSettings::default`].
    pub fn merge_onto_defaults(self) -> HeroSettings {
        let defaults = HeroSettings::default();
        HeroSettings {
            text_color: self.text_color.unwrap_or(defaults.text_color),
            background_image: self.background_image.or(defaults.background_image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HeroSettings, SiteSettings, StoredHeroSettings, StoredSiteSettings};

    #[test]
    fn partial_row_keeps_present_fields() {
        let stored: StoredSiteSettings = serde_json::from_str(r#"{"showFeatured": false}"#).unwrap();
        let merged = stored.merge_onto_defaults();

        let expected = SiteSettings {
            show_featured: false,
            ..SiteSettings::default()
        };
        assert_eq!(merged, expected);
    }

    #[test]
    fn null_fields_fall_back_to_defaults() {
        let stored: StoredSiteSettings = serde_json::from_str(
            r#"{"featuredTitle": null, "ogImage": "og.png", "showLocalSEO": false, "id": 1}"#,
        )
        .unwrap();
        let merged = stored.merge_onto_defaults();

        assert_eq!(merged.featured_title, SiteSettings::default().featured_title);
        assert_eq!(merged.og_image, "og.png");
        assert!(!merged.show_local_seo);
    }

    #[test]
    fn present_empty_string_is_not_overwritten() {
        let stored = StoredSiteSettings {
            seo_title: Some(String::new()),
            ..StoredSiteSettings::default()
        };
        assert_eq!(stored.merge_onto_defaults().seo_title, "");
    }

    #[test]
    fn full_settings_round_trip_through_stored_row() {
        let settings = SiteSettings {
            visual_title: "Stills".to_string(),
            show_visual: false,
            ..SiteSettings::default()
        };
        let stored = StoredSiteSettings::from(&settings);
        assert_eq!(stored.merge_onto_defaults(), settings);
    }

    #[test]
    fn hero_defaults_apply_to_empty_row() {
        let merged = StoredHeroSettings::default().merge_onto_defaults();
        assert_eq!(merged, HeroSettings::default());
        assert_eq!(merged.text_color, "#0f172a");
        assert!(merged.background_image.is_none());
    }
}
