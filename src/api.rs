//! JSON wire types shared by the HTTP server and the grid client.
//!
//! Two image shapes exist because two endpoints exist:
//!
//! | Endpoint | Image label field | Paging field |
//! |---|---|---|
//! | `GET /api/images` | `title` | `total` |
//! | `GET /api/images.json` | `alt` | `hasMore` |

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::manifest::Collection;
use crate::store::Image;

/// Image as returned by `GET /api/images`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiImage {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub description: String,
}

impl From<&Image> for ApiImage {
    fn from(image: &Image) -> Self {
        Self {
            src: image.src.src.clone(),
            width: image.src.width,
            height: image.src.height,
            title: image.title.clone(),
            description: image.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub images: Vec<ApiImage>,
    pub total: usize,
}

/// Image as returned by `GET /api/images.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyImage {
    pub src: String,
    pub width: u32,
    pub height: u32,
    pub alt: String,
    pub description: String,
}

impl From<&Image> for LegacyImage {
    fn from(image: &Image) -> Self {
        Self {
            src: image.src.src.clone(),
            width: image.src.width,
            height: image.src.height,
            alt: image.title.clone(),
            description: image.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyImagesResponse {
    pub images: Vec<LegacyImage>,
    pub has_more: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionsResponse {
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query string accepted by the image endpoints.
///
/// Values stay strings here; [`page`](Self::page) and [`limit`](Self::limit)
/// parse them with the same leniency as `parseInt`: leading digits are taken,
/// anything else falls back to the default.
#[derive(Debug, Clone, Default)]
pub struct ImagesParams {
    pub collection: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ImagesParams {
    pub const DEFAULT_PAGE: usize = 1;

    /// Read a raw query string. The first occurrence of a repeated key wins;
    /// unknown keys are ignored.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "collection" => &mut params.collection,
                "page" => &mut params.page,
                "limit" => &mut params.limit,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }

    pub fn collection(&self) -> Option<String> {
        self.collection.clone().filter(|c| !c.is_empty())
    }

    pub fn page(&self) -> usize {
        parse_positive(self.page.as_deref()).unwrap_or(Self::DEFAULT_PAGE)
    }

    pub fn limit(&self, default_limit: usize) -> usize {
        parse_positive(self.limit.as_deref()).unwrap_or(default_limit)
    }
}

/// Leading-digit integer parse; `None` for missing, non-numeric, or zero.
///
/// An optional `+` sign is accepted. Digit runs too long for `usize`
/// saturate instead of failing.
fn parse_positive(raw: Option<&str>) -> Option<usize> {
    let raw = raw?.trim_start();
    let raw = raw.strip_prefix('+').unwrap_or(raw);
    let digits = raw
        .find(|c: char| !c.is_ascii_digit())
        .map_or(raw, |end| &raw[..end]);
    if digits.is_empty() {
        return None;
    }
    let n = digits.parse::<usize>().unwrap_or(usize::MAX);
    (n > 0).then_some(n)
}
