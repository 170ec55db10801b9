//! `folio` admin command line.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the configured backend.
//! - Map each subcommand onto one repository or service operation.
//!
//! # Invariants
//! - Call sites never branch on the backend kind; `open_backend` decides.
//! - Destructive bulk deletion requires an explicit `--yes`.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use folio_core::config::FolioConfig;
use folio_core::{
    find_public_project, init_logging, open_backend, Backend, Category, CategoryFilter,
    ConfigLoader, DataUriUploader, DirectoryUploader, GalleryView, HeroRepository, ImageUploader,
    ItemEdits, ItemId, PortfolioDraft, PortfolioEditor, PortfolioRepository, PortfolioStats,
    SectionSettingsEditor, SettingsRepository,
};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "folio", version, about = "Portfolio content administration")]
struct Cli {
    /// Path to a TOML config file (defaults to `folio.toml` when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Env file loaded before reading `FOLIO_*` variables
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every project in display order, hidden ones included
    List,
    /// Print one project as JSON
    Show {
        #[arg(conflicts_with = "slug", required_unless_present = "slug")]
        id: Option<ItemId>,
        /// Resolve like a public project page (hidden projects are not found)
        #[arg(long)]
        slug: Option<String>,
    },
    /// Create a project; the slug is derived from the title
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Repeat for each tool, in display order
        #[arg(long = "tool")]
        tools: Vec<String>,
        #[arg(long)]
        featured: bool,
        #[arg(long)]
        hidden: bool,
        #[arg(long)]
        seo_title: Option<String>,
        #[arg(long)]
        seo_description: Option<String>,
        #[arg(long)]
        alt_text: Option<String>,
        #[arg(long)]
        title_attribute: Option<String>,
        /// Repeat for each gallery image, in display order
        #[arg(long = "image-gallery")]
        images: Vec<String>,
    },
    /// Change fields of an existing project (the slug never changes)
    ///
    /// Text options given as an empty string clear the field.
    Edit {
        id: ItemId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        image: Option<String>,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Replaces the tool list; repeat for each tool
        #[arg(long = "tool", conflicts_with = "clear_tools")]
        tools: Vec<String>,
        #[arg(long)]
        clear_tools: bool,
        /// Replaces the gallery; repeat for each image
        #[arg(long = "image-gallery", conflicts_with = "clear_gallery")]
        images: Vec<String>,
        #[arg(long)]
        clear_gallery: bool,
        #[arg(long)]
        featured: Option<bool>,
        #[arg(long)]
        hidden: Option<bool>,
        #[arg(long)]
        seo_title: Option<String>,
        #[arg(long)]
        seo_description: Option<String>,
        #[arg(long)]
        alt_text: Option<String>,
        #[arg(long)]
        title_attribute: Option<String>,
    },
    /// Move a project to the position currently held by another
    Move { moved: ItemId, target: ItemId },
    /// Delete one project
    Delete { id: ItemId },
    /// Delete every project
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },
    /// Show or change section settings (each change is saved at once)
    Settings {
        #[arg(long)]
        show_featured: Option<bool>,
        #[arg(long)]
        show_visual: Option<bool>,
        #[arg(long)]
        featured_title: Option<String>,
        #[arg(long)]
        visual_title: Option<String>,
    },
    /// Show or replace hero appearance
    Hero {
        #[arg(long)]
        text_color: Option<String>,
        #[arg(long)]
        background_image: Option<String>,
        /// Remove the background image
        #[arg(long, conflicts_with = "background_image")]
        clear_background: bool,
    },
    /// Store an image file and print its reference
    Upload { file: PathBuf },
    /// Print the public portfolio page as visitors see it
    Gallery {
        #[arg(long, default_value = "All")]
        category: CategoryFilter,
    },
    /// Dashboard counters
    Stats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = &cli.env_file {
        loader = loader.with_env_file(path);
    }
    let config = loader.load().context("failed to load configuration")?;
    init_logging(&config.logging).context("failed to start logging")?;

    let backend = open_backend(&config.backend).context("failed to open storage backend")?;
    run(cli.command, &config, backend.as_ref())
}

fn run(command: Command, config: &FolioConfig, backend: &dyn Backend) -> Result<()> {
    let portfolio = PortfolioRepository::new(backend);

    match command {
        Command::List => {
            for item in portfolio.try_list()? {
                println!(
                    "{:>4}  #{:<14} {:<20} {}{}{}",
                    item.order,
                    item.id,
                    item.category.label(),
                    item.title,
                    if item.is_featured { "  [featured]" } else { "" },
                    if item.is_hidden { "  [hidden]" } else { "" },
                );
            }
        }
        Command::Show { id, slug } => {
            let item = match (id, slug) {
                (_, Some(slug)) => find_public_project(&portfolio, &slug)?,
                (Some(id), None) => portfolio.get(id)?,
                (None, None) => bail!("pass an id or --slug"),
            };
            print_json(&item)?;
        }
        Command::Add {
            title,
            category,
            image,
            video_url,
            description,
            tools,
            featured,
            hidden,
            seo_title,
            seo_description,
            alt_text,
            title_attribute,
            images,
        } => {
            let draft = PortfolioDraft {
                title: Some(title),
                category,
                image,
                description,
                tools,
                video_url,
                is_featured: featured,
                is_hidden: hidden,
                seo_title,
                seo_description,
                alt_text,
                title_attribute,
                images,
            };
            let mut editor = PortfolioEditor::new(portfolio);
            let created = editor.create(draft)?;
            println!("created #{} at position {}", created.id, created.order);
        }
        Command::Edit {
            id,
            title,
            category,
            image,
            video_url,
            description,
            tools,
            clear_tools,
            images,
            clear_gallery,
            featured,
            hidden,
            seo_title,
            seo_description,
            alt_text,
            title_attribute,
        } => {
            let edits = ItemEdits {
                title,
                category,
                image,
                description,
                tools: list_edit(tools, clear_tools),
                images: list_edit(images, clear_gallery),
                video_url,
                is_featured: featured,
                is_hidden: hidden,
                seo_title,
                seo_description,
                alt_text,
                title_attribute,
            };
            if edits.is_empty() {
                bail!("nothing to change; pass at least one field option");
            }
            let mut item = portfolio.get(id)?;
            edits.apply_to(&mut item);

            let mut editor = PortfolioEditor::new(portfolio);
            let saved = editor.save_edit(item)?;
            print_json(&saved)?;
        }
        Command::Move { moved, target } => {
            let mut editor = PortfolioEditor::new(portfolio);
            editor.load();
            if editor.drag(moved, target)? {
                println!("moved #{moved} to the position of #{target}");
            } else {
                println!("nothing to move");
            }
        }
        Command::Delete { id } => {
            portfolio.delete(id)?;
            println!("deleted #{id}");
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("refusing to delete every project without --yes");
            }
            let removed = portfolio.clear_all()?;
            println!("deleted {removed} projects");
        }
        Command::Settings {
            show_featured,
            show_visual,
            featured_title,
            visual_title,
        } => {
            let mut editor = SectionSettingsEditor::load(SettingsRepository::new(backend));
            if let Some(show) = show_featured {
                editor.apply(|settings| settings.show_featured = show)?;
            }
            if let Some(show) = show_visual {
                editor.apply(|settings| settings.show_visual = show)?;
            }
            if let Some(title) = featured_title {
                editor.set_featured_title(title)?;
            }
            if let Some(title) = visual_title {
                editor.set_visual_title(title)?;
            }
            print_json(editor.settings())?;
        }
        Command::Hero {
            text_color,
            background_image,
            clear_background,
        } => {
            let hero = HeroRepository::new(backend);
            let mut settings = hero.get();
            let changed =
                text_color.is_some() || background_image.is_some() || clear_background;
            if let Some(color) = text_color {
                settings.text_color = color;
            }
            if background_image.is_some() {
                settings.background_image = background_image;
            }
            if clear_background {
                settings.background_image = None;
            }
            if changed {
                hero.update(&settings)?;
            }
            print_json(&settings)?;
        }
        Command::Upload { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read `{}`", file.display()))?;
            let file_name = file
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            let reference = uploader(config).upload_image(file_name, &bytes)?;
            info!(
                "event=cli_upload module=cli status=ok bytes={}",
                bytes.len()
            );
            println!("{reference}");
        }
        Command::Gallery { category } => {
            let settings = SettingsRepository::new(backend).get();
            let view = GalleryView::build(&portfolio.list(), &settings, category);
            for section in [&view.featured, &view.grid].into_iter().flatten() {
                println!("== {} ==", section.title);
                for item in &section.items {
                    println!("  /project/{}  {}", item.slug, item.title);
                }
            }
            if view.visible().is_empty() {
                println!("no public projects in `{category}`");
            }
        }
        Command::Stats => {
            let stats = PortfolioStats::from_items(&portfolio.list());
            println!(
                "total={} featured={} hidden={}",
                stats.total, stats.featured, stats.hidden
            );
        }
    }

    Ok(())
}

fn uploader(config: &FolioConfig) -> Box<dyn ImageUploader> {
    let uploads = &config.uploads;
    match &uploads.dir {
        Some(dir) => Box::new(DirectoryUploader::new(
            dir.clone(),
            uploads.public_prefix.clone(),
            uploads.max_bytes,
        )),
        None => Box::new(DataUriUploader::new(uploads.max_bytes)),
    }
}

/// Repeated options replace the whole list; `clear` empties it.
fn list_edit(values: Vec<String>, clear: bool) -> Option<Vec<String>> {
    if clear {
        Some(Vec::new())
    } else if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
