use folio_core::model::settings::{HeroSettings, SiteSettings};
use folio_core::service::editor::SectionSettingsEditor;
use folio_core::store::{JsonFileBackend, SqliteBackend, DEFAULT_MAX_COLLECTION_BYTES};
use folio_core::{HeroRepository, SettingsRepository};

#[test]
fn empty_store_yields_defaults() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    assert_eq!(SettingsRepository::new(&backend).get(), SiteSettings::default());
    assert_eq!(HeroRepository::new(&backend).get(), HeroSettings::default());
    assert_eq!(HeroRepository::new(&backend).get().text_color, "#0f172a");
}

#[test]
fn partial_sqlite_row_merges_defaults_under_present_fields() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    backend
        .connection()
        .execute(
            "INSERT INTO site_settings (id, show_featured) VALUES (1, 0);",
            [],
        )
        .unwrap();

    let settings = SettingsRepository::new(&backend).get();
    assert_eq!(
        settings,
        SiteSettings {
            show_featured: false,
            ..SiteSettings::default()
        }
    );
}

#[test]
fn partial_json_document_merges_defaults_under_present_fields() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("site_settings.json"),
        r#"{"showFeatured": false}"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("hero_settings.json"),
        r#"{"backgroundImage": "hero.jpg"}"#,
    )
    .unwrap();
    let backend = JsonFileBackend::open(dir.path(), DEFAULT_MAX_COLLECTION_BYTES).unwrap();

    let settings = SettingsRepository::new(&backend).get();
    assert!(!settings.show_featured);
    assert_eq!(
        settings,
        SiteSettings {
            show_featured: false,
            ..SiteSettings::default()
        }
    );

    let hero = HeroRepository::new(&backend).get();
    assert_eq!(hero.text_color, "#0f172a");
    assert_eq!(hero.background_image.as_deref(), Some("hero.jpg"));
}

#[test]
fn unreadable_settings_degrade_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("site_settings.json"), "{not json").unwrap();
    let backend = JsonFileBackend::open(dir.path(), DEFAULT_MAX_COLLECTION_BYTES).unwrap();

    assert_eq!(SettingsRepository::new(&backend).get(), SiteSettings::default());
}

#[test]
fn update_replaces_whole_rows() {
    let dir = tempfile::tempdir().unwrap();
    let json = JsonFileBackend::open(dir.path(), DEFAULT_MAX_COLLECTION_BYTES).unwrap();
    let sqlite = SqliteBackend::open_in_memory().unwrap();

    let site = SiteSettings {
        featured_title: "Highlights".to_string(),
        show_visual: false,
        og_image: "og.png".to_string(),
        ..SiteSettings::default()
    };
    let hero = HeroSettings {
        text_color: "#ffffff".to_string(),
        background_image: Some("data:image/png;base64,aGk=".to_string()),
    };

    SettingsRepository::new(&json).update(&site).unwrap();
    SettingsRepository::new(&sqlite).update(&site).unwrap();
    HeroRepository::new(&json).update(&hero).unwrap();
    HeroRepository::new(&sqlite).update(&hero).unwrap();

    assert_eq!(SettingsRepository::new(&json).get(), site);
    assert_eq!(SettingsRepository::new(&sqlite).get(), site);
    assert_eq!(HeroRepository::new(&json).get(), hero);
    assert_eq!(HeroRepository::new(&sqlite).get(), hero);

    let cleared = HeroSettings {
        background_image: None,
        ..hero
    };
    HeroRepository::new(&sqlite).update(&cleared).unwrap();
    assert_eq!(HeroRepository::new(&sqlite).get(), cleared);
}

#[test]
fn section_editor_persists_each_change_immediately() {
    let backend = SqliteBackend::open_in_memory().unwrap();
    let mut editor = SectionSettingsEditor::load(SettingsRepository::new(&backend));

    editor.toggle_featured().unwrap();
    assert!(!SettingsRepository::new(&backend).get().show_featured);

    editor.set_visual_title("Everything Else").unwrap();
    let stored = SettingsRepository::new(&backend).get();
    assert_eq!(stored.visual_title, "Everything Else");
    assert!(!stored.show_featured);
    assert_eq!(editor.settings(), &stored);
}
