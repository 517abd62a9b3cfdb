use clap::{Parser, Subcommand};
use photo_grid::assets::AssetIndex;
use photo_grid::client::{GridLoader, HttpPageSource};
use photo_grid::config::{self, SiteConfig};
use photo_grid::output;
use photo_grid::server::{self, AppState};
use photo_grid::store::{ImageQuery, ImageStore, SortBy, SortOrder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "photo-grid")]
#[command(about = "Manifest-driven photo gallery with a paginated JSON API")]
#[command(long_about = "\
Manifest-driven photo gallery with a paginated JSON API

A single YAML manifest describes the gallery. Image files live anywhere under
the site's source tree and are matched to manifest entries by path.

Site structure:

  site/
  ├── config.toml                  # Optional, see 'photo-grid gen-config'
  └── src/
      ├── gallery/
      │   ├── gallery.yaml         # The manifest
      │   ├── dawn.jpg             # Referenced as `path: dawn.jpg`
      │   └── travel/tokyo.jpg     # Referenced as `path: travel/tokyo.jpg`
      └── other/rome.jpg           # Referenced as `path: ../other/rome.jpg`

Manifest:

  collections:
    - { id: travel, name: Travel }
  images:
    - path: dawn.jpg
      meta: { title: Dawn, description: First light, collections: [featured] }
      exif: { captureDate: 2021-06-01T05:12:00Z }

Endpoints (photo-grid serve):
  GET /api/images?collection=&page=&limit=   → { images, total }
  GET /api/images.json?collection=&page=&limit= → { images, hasMore }
  GET /api/collections                       → { collections }

Run 'photo-grid gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Site root (directory holding `src/`)
    #[arg(long, default_value = ".", global = true)]
    site_root: PathBuf,

    /// Config file [default: <site-root>/config.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the JSON API and image files
    Serve,
    /// Validate the manifest and report entries with no matching image
    Check {
        /// Fail when any manifest entry has no matching image
        #[arg(long)]
        strict: bool,
    },
    /// Print one page of images as JSON
    Images {
        /// Only images in this collection
        #[arg(long)]
        collection: Option<String>,
        /// 1-based page number
        #[arg(long)]
        page: Option<usize>,
        /// Page size (0 = all)
        #[arg(long)]
        limit: Option<usize>,
        /// Sort key (captureDate)
        #[arg(long)]
        sort_by: Option<SortBy>,
        /// asc or desc
        #[arg(long)]
        order: Option<SortOrder>,
        /// Manifest path relative to the site root
        #[arg(long)]
        gallery: Option<String>,
    },
    /// Page through a running server's image API like the gallery grid does
    Fetch {
        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:4321")]
        url: String,
        /// Page size
        #[arg(long, default_value_t = 30)]
        limit: usize,
        /// Only images in this collection
        #[arg(long)]
        collection: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Command::Serve => {
            let site_config = load_site_config(&cli.site_root, cli.config.as_deref())?;
            let store = build_store(&cli.site_root, &site_config)?;
            let state = AppState::new(store, site_config.pagination.default_limit).with_assets(
                site_config.asset_url_prefix(),
                cli.site_root.join(&site_config.image_dir),
            );
            server::serve(server::create_router(state), site_config.bind_addr()?).await?;
        }
        Command::Check { strict } => {
            let site_config = load_site_config(&cli.site_root, cli.config.as_deref())?;
            let store = build_store(&cli.site_root, &site_config)?;
            println!("==> Checking {}", cli.site_root.display());
            let report = store.check(None)?;
            output::print_check_output(&report);
            let missing = report.missing().count();
            if strict && missing > 0 {
                return Err(format!("{missing} manifest entries have no matching image").into());
            }
            println!("==> Manifest is valid");
        }
        Command::Images {
            collection,
            page,
            limit,
            sort_by,
            order,
            gallery,
        } => {
            let site_config = load_site_config(&cli.site_root, cli.config.as_deref())?;
            let store = build_store(&cli.site_root, &site_config)?;
            let query = ImageQuery {
                gallery_path: gallery,
                collection,
                sort_by,
                order,
                limit,
                page,
            };
            let page = store.get_images(&query)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::Fetch {
            url,
            limit,
            collection,
        } => {
            let source = HttpPageSource::new(&url)?;
            let mut loader = GridLoader::from_first_page(source, limit, collection).await?;
            loader.load_all().await?;
            output::print_fetch_output(loader.images(), loader.total());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so `images` output stays pipeable. `RUST_LOG` overrides.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("photo_grid=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_site_config(
    site_root: &Path,
    config_path: Option<&Path>,
) -> Result<SiteConfig, config::ConfigError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| site_root.join("config.toml"));
    config::load_config(&path)
}

/// Discover assets once and wrap them in a store.
fn build_store(
    site_root: &Path,
    site_config: &SiteConfig,
) -> Result<ImageStore, Box<dyn std::error::Error>> {
    let assets = AssetIndex::discover(
        site_root,
        &site_config.image_dir,
        site_config.asset_url_prefix(),
    )?;
    Ok(ImageStore::new(site_root, Arc::new(assets))
        .with_default_gallery_path(site_config.gallery_path.clone()))
}
