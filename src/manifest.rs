//! Gallery manifest loading and schema validation.
//!
//! The manifest is a single YAML document declaring the gallery's collections
//! and every image entry with its display metadata:
//!
//! ```yaml
//! collections:
//!   - id: landscapes
//!     name: Landscapes
//!   - id: travel
//!
//! images:
//!   - path: photos/001-dawn.jpg        # relative to the manifest directory
//!     meta:
//!       title: Dawn
//!       description: First light over the ridge
//!       collections: [landscapes, featured]
//!     exif:
//!       captureDate: 2023-06-12T05:41:00Z
//! ```
//!
//! ## Validation
//!
//! Loading happens in two passes. Serde checks the structural shape (unknown
//! keys are rejected, wrong types fail with a line/column). A second schema pass
//! ([`GalleryData::validate`]) collects every field-level problem before
//! failing, so a broken manifest reports all of its errors at once:
//!
//! ```text
//! invalid manifest: collections[1].id: duplicate id `travel`; images[4].path: must not be empty
//! ```
//!
//! Cross-references between images and collections are checked by the
//! [store](crate::store), which also knows about the built-in collections.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid manifest: {}", .0.join("; "))]
    Schema(Vec<String>),
}

/// Parsed gallery manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryData {
    pub collections: Vec<Collection>,
    pub images: Vec<GalleryImage>,
}

/// A named grouping of images, declared once in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Collection {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A manifest image entry, before it is joined with its asset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryImage {
    /// Image file path, relative to the manifest's directory.
    pub path: String,
    pub meta: ImageMeta,
    #[serde(default)]
    pub exif: Option<Exif>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageMeta {
    pub title: String,
    pub description: String,
    pub collections: Vec<String>,
}

/// Capture metadata. Only the capture date is interpreted; other EXIF keys
/// written by export tools (camera, lens, exposure) are accepted and ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exif {
    #[serde(default, deserialize_with = "deserialize_capture_date")]
    pub capture_date: Option<DateTime<Utc>>,
}

impl GalleryImage {
    pub fn capture_date(&self) -> Option<DateTime<Utc>> {
        self.exif.as_ref().and_then(|e| e.capture_date)
    }

    pub fn in_collection(&self, id: &str) -> bool {
        self.meta.collections.iter().any(|c| c == id)
    }
}

impl GalleryData {
    /// Schema pass over the parsed document.
    ///
    /// Checks:
    /// - `collections[i].id` is non-empty and unique
    /// - `images[i].path` is non-empty and relative
    /// - `images[i].meta.collections[j]` is non-empty
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut problems = Vec::new();

        let mut seen = HashSet::new();
        for (i, collection) in self.collections.iter().enumerate() {
            if collection.id.trim().is_empty() {
                problems.push(format!("collections[{i}].id: must not be empty"));
            } else if !seen.insert(collection.id.as_str()) {
                problems.push(format!(
                    "collections[{i}].id: duplicate id `{}`",
                    collection.id
                ));
            }
        }

        for (i, image) in self.images.iter().enumerate() {
            if let Err(reason) = check_entry_path(&image.path) {
                problems.push(format!("images[{i}].path: {reason}"));
            }
            for (j, id) in image.meta.collections.iter().enumerate() {
                if id.trim().is_empty() {
                    problems.push(format!(
                        "images[{i}].meta.collections[{j}]: must not be empty"
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ManifestError::Schema(problems))
        }
    }
}

fn check_entry_path(path: &str) -> Result<(), &'static str> {
    if path.trim().is_empty() {
        return Err("must not be empty");
    }
    if path.starts_with('/') || path.starts_with('\\') {
        return Err("must be relative to the manifest directory");
    }
    Ok(())
}

/// Parse and schema-check a manifest held in memory.
pub fn parse_gallery(yaml: &str) -> Result<GalleryData, ManifestError> {
    let gallery: GalleryData = serde_yaml::from_str(yaml)?;
    gallery.validate()?;
    Ok(gallery)
}

/// Read, parse, and schema-check the manifest at `path`.
pub fn load_gallery(path: &Path) -> Result<GalleryData, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_gallery(&content)
}

/// Formats accepted for naive (zone-less) capture dates, interpreted as UTC.
/// The last one is the EXIF `DateTimeOriginal` layout.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y:%m:%d %H:%M:%S",
];

/// Parse a capture date.
///
/// - `2023-06-12T05:41:00Z`, `2023-06-12T07:41:00+02:00` (RFC 3339)
/// - `2023-06-12T05:41:00`, `2023-06-12 05:41:00` (UTC)
/// - `2023:06:12 05:41:00` (EXIF layout, UTC)
/// - `2023-06-12` (midnight UTC)
pub fn parse_capture_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_capture_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| {
        parse_capture_date(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid captureDate `{s}`")))
    })
    .transpose()
}
