//! Image asset discovery and lookup.
//!
//! Every image file under the site's image directory is discovered once at
//! startup, identified (pixel dimensions read from the file header), and stored
//! in an [`AssetIndex`]: a read-only lookup table that the
//! [store](crate::store) consults to join manifest entries with real files.
//!
//! ## Keys
//!
//! Assets are keyed by their path relative to the site root, with a leading
//! slash and `/` separators regardless of platform:
//!
//! ```text
//! site/
//! └── src/                       # image_dir
//!     └── gallery/
//!         ├── gallery.yaml
//!         └── photos/dawn.jpg    →  key "/src/gallery/photos/dawn.jpg"
//!                                   src "/assets/gallery/photos/dawn.jpg"
//! ```
//!
//! A manifest entry is looked up with [`asset_key`], which joins the
//! manifest's directory with the entry path and normalizes `.`/`..` segments,
//! so both sides agree on one canonical form.
//!
//! ## Discovery
//!
//! Hidden files and directories are skipped. Only `jpg`, `jpeg`, `png`, `gif`
//! and `webp` files (any case) are considered. Header reads run in parallel
//! with rayon; a file whose header cannot be decoded is logged and left out of
//! the index rather than failing startup.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum AssetError {
    #[error("image directory not found: {}", .0.display())]
    MissingRoot(PathBuf),
    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// A discovered image file with its public URL and dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
    /// Public URL the file is served under.
    pub src: String,
    pub width: u32,
    pub height: u32,
    /// Location on disk.
    #[serde(skip)]
    pub source: PathBuf,
}

/// Read-only map from normalized asset key to [`ImageAsset`].
#[derive(Debug, Clone, Default)]
pub struct AssetIndex {
    assets: HashMap<String, ImageAsset>,
}

impl AssetIndex {
    /// Walk `<site_root>/<image_dir>` and identify every image found.
    ///
    /// `url_prefix` is prepended to the image's path relative to `image_dir`
    /// to form its public `src`.
    pub fn discover(
        site_root: &Path,
        image_dir: &str,
        url_prefix: &str,
    ) -> Result<Self, AssetError> {
        let root = site_root.join(image_dir);
        if !root.is_dir() {
            return Err(AssetError::MissingRoot(root));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry?;
            if entry.file_type().is_file() && is_image(entry.path()) {
                files.push(entry.into_path());
            }
        }

        let prefix = url_prefix.trim_end_matches('/');
        let assets: HashMap<String, ImageAsset> = files
            .par_iter()
            .filter_map(|path| {
                let rel = relative_slash_path(path, &root)?;
                match image::image_dimensions(path) {
                    Ok((width, height)) => Some((
                        normalize_key(&format!("{image_dir}/{rel}")),
                        ImageAsset {
                            src: public_src(prefix, &rel),
                            width,
                            height,
                            source: path.clone(),
                        },
                    )),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Skipping unreadable image");
                        None
                    }
                }
            })
            .collect();

        info!(
            root = %root.display(),
            count = assets.len(),
            "Discovered image assets"
        );
        for key in assets.keys() {
            debug!(%key, "Indexed asset");
        }

        Ok(Self { assets })
    }

    /// Build an index from already-identified assets.
    pub fn from_assets(assets: impl IntoIterator<Item = (String, ImageAsset)>) -> Self {
        Self {
            assets: assets
                .into_iter()
                .map(|(key, asset)| (normalize_key(&key), asset))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&ImageAsset> {
        self.assets.get(key)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.assets.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// `path` relative to `root`, joined with `/`.
fn relative_slash_path(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Public URL for a file at `rel` (slash-separated, relative to the image
/// directory). Each segment is percent-encoded so names containing `#`, `?`,
/// `%` or spaces still resolve.
pub fn public_src(prefix: &str, rel: &str) -> String {
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return format!("{prefix}/{rel}");
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.clear().extend(rel.split('/'));
    }
    format!("{prefix}{}", url.path())
}

/// Normalize a slash-separated path into an asset key.
///
/// - Always starts with `/`
/// - Empty and `.` segments are dropped
/// - `..` removes the previous segment (and is dropped at the root)
/// - Backslashes are treated as separators
pub fn normalize_key(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split(['/', '\\']) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Key for a manifest entry: the manifest's directory joined with the
/// entry's relative path.
///
/// ```text
/// asset_key("src/gallery/gallery.yaml", "photos/dawn.jpg") == "/src/gallery/photos/dawn.jpg"
/// asset_key("src/gallery/gallery.yaml", "../shared/a.png") == "/src/shared/a.png"
/// ```
pub fn asset_key(gallery_path: &str, entry_path: &str) -> String {
    let dir = gallery_path
        .rsplit_once(['/', '\\'])
        .map(|(dir, _)| dir)
        .unwrap_or("");
    normalize_key(&format!("{dir}/{entry_path}"))
}
