//! Image store: the read path behind every gallery page and API call.
//!
//! [`ImageStore::get_images`] composes the [manifest loader](crate::manifest)
//! and the [asset index](crate::assets):
//!
//! ```text
//! load manifest → check collection refs → filter → sort → total → page → resolve
//! ```
//!
//! The manifest is re-read on every call; only the asset index is shared.
//!
//! ## Ordering
//!
//! Sorting by capture date is a stable ascending sort with undated images
//! first. `order: desc` reverses whatever sequence the filter/sort step
//! produced, so `desc` without `sort_by` yields the manifest order reversed.
//!
//! ## Missing assets
//!
//! A manifest entry whose file was not discovered is logged at `warn` and
//! dropped from the page. `total` still counts it: it is computed before
//! pagination and resolution, from manifest entries alone.

use crate::assets::{AssetIndex, ImageAsset, asset_key};
use crate::manifest::{self, Collection, GalleryData, GalleryImage, ManifestError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_GALLERY_PATH: &str = "src/gallery/gallery.yaml";

/// Pseudo-collection usable in any manifest without being declared.
pub const FEATURED_COLLECTION_ID: &str = "featured";

pub const BUILT_IN_COLLECTIONS: &[&str] = &[FEATURED_COLLECTION_ID];

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to load gallery data from {gallery_path}: {source}")]
    Manifest {
        gallery_path: String,
        #[source]
        source: ManifestError,
    },
    #[error(
        "Failed to load gallery data from {gallery_path}: Invalid collection(s) [{}] referenced in image: {image_path}",
        .invalid.join(", ")
    )]
    InvalidCollections {
        gallery_path: String,
        image_path: String,
        invalid: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    #[serde(rename = "captureDate")]
    CaptureDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "captureDate" | "capture-date" | "capture_date" => Ok(Self::CaptureDate),
            other => Err(format!("unknown sort key `{other}` (expected captureDate)")),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown order `{other}` (expected asc or desc)")),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("asc"),
            Self::Desc => f.write_str("desc"),
        }
    }
}

/// Options for [`ImageStore::get_images`]. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct ImageQuery {
    /// Manifest path relative to the site root. Falls back to the store default.
    pub gallery_path: Option<String>,
    /// Keep only images tagged with this collection id.
    pub collection: Option<String>,
    pub sort_by: Option<SortBy>,
    pub order: Option<SortOrder>,
    /// Page size. `None` or `0` returns every matching image.
    pub limit: Option<usize>,
    /// 1-indexed page number, default 1.
    pub page: Option<usize>,
}

/// A manifest entry joined with its discovered asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub src: ImageAsset,
    pub title: String,
    pub description: String,
    pub collections: Vec<String>,
}

/// One page of resolved images plus the unpaginated match count.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImagePage {
    pub images: Vec<Image>,
    pub total: usize,
}

/// Result of checking a manifest against the asset index without paginating.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub gallery_path: String,
    pub collections: Vec<CollectionSummary>,
    pub entries: Vec<CheckedEntry>,
    pub asset_count: usize,
}

#[derive(Debug, Clone)]
pub struct CollectionSummary {
    pub id: String,
    pub name: Option<String>,
    pub built_in: bool,
    pub image_count: usize,
}

#[derive(Debug, Clone)]
pub struct CheckedEntry {
    pub path: String,
    pub key: String,
    pub title: String,
    pub asset: Option<ImageAsset>,
}

impl CheckReport {
    pub fn missing(&self) -> impl Iterator<Item = &CheckedEntry> {
        self.entries.iter().filter(|e| e.asset.is_none())
    }
}

/// Manifest-backed image store over an injected [`AssetIndex`].
#[derive(Debug, Clone)]
pub struct ImageStore {
    site_root: PathBuf,
    default_gallery_path: String,
    assets: Arc<AssetIndex>,
}

impl ImageStore {
    pub fn new(site_root: impl Into<PathBuf>, assets: Arc<AssetIndex>) -> Self {
        Self {
            site_root: site_root.into(),
            default_gallery_path: DEFAULT_GALLERY_PATH.to_string(),
            assets,
        }
    }

    /// Manifest used when a query does not name one.
    pub fn with_default_gallery_path(mut self, gallery_path: impl Into<String>) -> Self {
        self.default_gallery_path = gallery_path.into();
        self
    }

    pub fn default_gallery_path(&self) -> &str {
        &self.default_gallery_path
    }

    pub fn assets(&self) -> &AssetIndex {
        &self.assets
    }

    /// Filter, sort, paginate, and resolve manifest images.
    pub fn get_images(&self, query: &ImageQuery) -> Result<ImagePage, StoreError> {
        let gallery_path = query
            .gallery_path
            .as_deref()
            .unwrap_or(&self.default_gallery_path);

        let gallery = self.load_gallery_data(gallery_path)?;
        let mut entries = filter_by_collection(gallery.images, query.collection.as_deref());
        sort_images(&mut entries, query.sort_by, query.order);

        let total = entries.len();
        let page = paginate(entries, query.limit, query.page.unwrap_or(1));
        let images = self.resolve_images(page, gallery_path);

        Ok(ImagePage { images, total })
    }

    /// Declared collections of a manifest (built-ins are not listed).
    pub fn get_collections(&self, gallery_path: Option<&str>) -> Result<Vec<Collection>, StoreError> {
        let gallery_path = gallery_path.unwrap_or(&self.default_gallery_path);
        Ok(self.load_gallery_data(gallery_path)?.collections)
    }

    /// Load a manifest and resolve every entry, reporting missing assets
    /// instead of skipping them.
    pub fn check(&self, gallery_path: Option<&str>) -> Result<CheckReport, StoreError> {
        let gallery_path = gallery_path.unwrap_or(&self.default_gallery_path);
        let gallery = self.load_gallery_data(gallery_path)?;

        let count = |id: &str| gallery.images.iter().filter(|i| i.in_collection(id)).count();
        let mut collections: Vec<CollectionSummary> = gallery
            .collections
            .iter()
            .map(|c| CollectionSummary {
                id: c.id.clone(),
                name: c.name.clone(),
                built_in: false,
                image_count: count(&c.id),
            })
            .collect();
        for id in BUILT_IN_COLLECTIONS {
            if !gallery.collections.iter().any(|c| c.id == *id) {
                collections.push(CollectionSummary {
                    id: id.to_string(),
                    name: None,
                    built_in: true,
                    image_count: count(*id),
                });
            }
        }

        let entries = gallery
            .images
            .iter()
            .map(|entry| {
                let key = asset_key(gallery_path, &entry.path);
                CheckedEntry {
                    path: entry.path.clone(),
                    asset: self.assets.get(&key).cloned(),
                    key,
                    title: entry.meta.title.clone(),
                }
            })
            .collect();

        Ok(CheckReport {
            gallery_path: gallery_path.to_string(),
            collections,
            entries,
            asset_count: self.assets.len(),
        })
    }

    fn load_gallery_data(&self, gallery_path: &str) -> Result<GalleryData, StoreError> {
        let path = self.site_root.join(gallery_path);
        let gallery = manifest::load_gallery(&path).map_err(|source| StoreError::Manifest {
            gallery_path: gallery_path.to_string(),
            source,
        })?;

        if let Some((image_path, invalid)) = find_invalid_collections(&gallery) {
            return Err(StoreError::InvalidCollections {
                gallery_path: gallery_path.to_string(),
                image_path,
                invalid,
            });
        }
        Ok(gallery)
    }

    fn resolve_images(&self, entries: Vec<GalleryImage>, gallery_path: &str) -> Vec<Image> {
        entries
            .into_iter()
            .filter_map(|entry| {
                let key = asset_key(gallery_path, &entry.path);
                match self.assets.get(&key) {
                    Some(asset) => Some(Image {
                        src: asset.clone(),
                        title: entry.meta.title,
                        description: entry.meta.description,
                        collections: entry.meta.collections,
                    }),
                    None => {
                        warn!(image = %key, "Image not found, skipping manifest entry");
                        None
                    }
                }
            })
            .collect()
    }
}

/// First image referencing an undeclared collection, with the offending ids.
pub fn find_invalid_collections(gallery: &GalleryData) -> Option<(String, Vec<String>)> {
    let known: Vec<&str> = gallery
        .collections
        .iter()
        .map(|c| c.id.as_str())
        .chain(BUILT_IN_COLLECTIONS.iter().copied())
        .collect();

    gallery.images.iter().find_map(|image| {
        let invalid: Vec<String> = image
            .meta
            .collections
            .iter()
            .filter(|id| !known.contains(&id.as_str()))
            .cloned()
            .collect();
        (!invalid.is_empty()).then(|| (image.path.clone(), invalid))
    })
}

/// Keep images tagged with `collection`. `None` or `""` keeps everything.
pub fn filter_by_collection(images: Vec<GalleryImage>, collection: Option<&str>) -> Vec<GalleryImage> {
    match collection.filter(|c| !c.is_empty()) {
        Some(id) => images.into_iter().filter(|i| i.in_collection(id)).collect(),
        None => images,
    }
}

/// Stable capture-date sort (undated first), then reverse for `desc`.
pub fn sort_images(images: &mut [GalleryImage], sort_by: Option<SortBy>, order: Option<SortOrder>) {
    if let Some(SortBy::CaptureDate) = sort_by {
        images.sort_by_key(|image| image.capture_date());
    }
    if order == Some(SortOrder::Desc) {
        images.reverse();
    }
}

/// Slice out a 1-indexed page. `limit` of `None` or `0` returns `items`
/// untouched; page `0` is read as page `1`.
pub fn paginate<T>(items: Vec<T>, limit: Option<usize>, page: usize) -> Vec<T> {
    match limit {
        Some(limit) if limit > 0 => {
            let offset = page.max(1).saturating_sub(1).saturating_mul(limit);
            items.into_iter().skip(offset).take(limit).collect()
        }
        _ => items,
    }
}
