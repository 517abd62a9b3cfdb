//! # Photo Grid
//!
//! Serves a photo gallery described by a single YAML manifest. The manifest
//! names images, their titles, descriptions and collections, plus optional
//! EXIF capture dates; the image files themselves live anywhere under the
//! site's source tree and are discovered once at startup.
//!
//! # Architecture
//!
//! ```text
//! src/**/*.{jpg,png,...}  →  AssetIndex     (startup: path → src + dimensions)
//! gallery.yaml            →  GalleryData    (every request: parse + validate)
//! GalleryData + index     →  ImagePage      (filter → sort → paginate → resolve)
//! ImagePage               →  JSON           (/api/images, /api/images.json)
//! JSON                    →  GridLoader     ("load more" client)
//! ```
//!
//! The manifest is re-read on every call, so edits show up without a
//! restart. The asset index is built once and injected into the store; it
//! is never global.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | YAML schema (`GalleryData`), strict parsing, capture-date handling |
//! | [`assets`] | Walks the image directory, reads dimensions, normalizes lookup keys |
//! | [`store`] | `ImageStore`: collection filter, capture-date sort, pagination, asset resolution |
//! | [`api`] | JSON wire types and lenient query-parameter parsing |
//! | [`server`] | axum router, handlers, generic 500 error mapping, asset serving |
//! | [`client`] | `GridLoader` incremental pager over a `PageSource` |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`output`] | CLI output formatting for `check` and `fetch` |
//!
//! # Design Decisions
//!
//! ## Manifest Paths Are Relative To The Manifest
//!
//! An entry `path: dawn.jpg` in `src/gallery/gallery.yaml` resolves to the
//! asset key `/src/gallery/dawn.jpg`. Keys are normalized (`.` and `..`
//! collapsed, separators unified) on both sides, so the same file is found
//! however the manifest spells it.
//!
//! ## Missing Assets Are Skipped, Not Fatal
//!
//! An entry whose file is not in the index is logged and dropped from the
//! page. `total` still counts it, so a page can come back shorter than
//! `limit`. `photo-grid check` lists exactly which entries are affected.
//!
//! ## Fail Closed On Schema Errors
//!
//! Unknown manifest keys, empty ids, duplicate collection ids, and references
//! to undeclared collections are all errors. A typo in the manifest surfaces
//! as a failed request and a log line, never as silently missing photos.

pub mod api;
pub mod assets;
pub mod client;
pub mod config;
pub mod manifest;
pub mod output;
pub mod server;
pub mod store;

#[cfg(test)]
pub(crate) mod test_helpers;
