//! Shared fixtures for integration tests: an on-disk site with real images
//! and a manifest, plus a router built over it.

#![allow(dead_code)]

use axum::Router;
use photo_grid::assets::AssetIndex;
use photo_grid::server::{AppState, create_router};
use photo_grid::store::{DEFAULT_GALLERY_PATH, ImageStore};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const PAGE_SIZE: usize = 30;

pub struct Site {
    pub dir: TempDir,
}

impl Site {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/gallery")).unwrap();
        Self { dir }
    }

    /// `n` images `img-001.png`.. titled `Photo 001`.., in manifest order.
    pub fn numbered(n: usize) -> Self {
        let site = Self::new();
        let mut yaml = String::from("images:\n");
        for i in 1..=n {
            site.image(&format!("src/gallery/img-{i:03}.png"), 2, 2);
            yaml.push_str(&format!(
                "  - path: img-{i:03}.png\n    meta: {{ title: Photo {i:03} }}\n"
            ));
        }
        site.manifest(&yaml);
        site
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn image(&self, rel: &str, width: u32, height: u32) {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbImage::new(width, height).save(path).unwrap();
    }

    pub fn manifest(&self, yaml: &str) {
        std::fs::write(self.root().join(DEFAULT_GALLERY_PATH), yaml).unwrap();
    }

    pub fn store(&self) -> ImageStore {
        let assets = AssetIndex::discover(self.root(), "src", "/assets").unwrap();
        ImageStore::new(self.root(), Arc::new(assets))
    }

    /// Router with assets mounted at `/assets` and the default page size.
    pub fn router(&self) -> Router {
        let state =
            AppState::new(self.store(), PAGE_SIZE).with_assets("/assets", self.root().join("src"));
        create_router(state)
    }
}
