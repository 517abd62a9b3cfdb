//! Shared test utilities for the photo-grid test suite.
//!
//! Provides an on-disk site builder, image writers, page extractors, and log
//! capture for asserting on `tracing` output.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = TestSite::new();
//! site.write_image("src/gallery/dawn.png", 4, 3);
//! site.write_manifest("images:\n  - { path: dawn.png, meta: { title: Dawn } }\n");
//!
//! let page = site.store().get_images(&ImageQuery::default()).unwrap();
//! assert_eq!(titles(&page), vec!["Dawn"]);
//! ```

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::assets::AssetIndex;
use crate::store::{DEFAULT_GALLERY_PATH, ImagePage, ImageStore};

// =========================================================================
// Site builder
// =========================================================================

/// A temporary site root with `src/gallery/` already created.
pub struct TestSite {
    pub dir: TempDir,
}

impl TestSite {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("src/gallery")).unwrap();
        Self { dir }
    }

    /// Site with `n` images `img-001.png`.. titled `Photo 001`.., in no
    /// collection, all sharing one capture date.
    pub fn with_numbered_images(n: usize) -> Self {
        let site = Self::new();
        let mut yaml = String::from("images:\n");
        for i in 1..=n {
            site.write_image(&format!("src/gallery/img-{i:03}.png"), 2, 2);
            yaml.push_str(&format!(
                "  - path: img-{i:03}.png\n    meta: {{ title: Photo {i:03} }}\n    exif: {{ captureDate: \"2020-01-01T00:00:00Z\" }}\n"
            ));
        }
        site.write_manifest(&yaml);
        site
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a real `width`×`height` image at a site-relative path.
    pub fn write_image(&self, rel: &str, width: u32, height: u32) {
        write_image(&self.root().join(rel), width, height);
    }

    pub fn write_file(&self, rel: &str, content: &str) {
        let path = self.root().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// Write the manifest at the default gallery path.
    pub fn write_manifest(&self, yaml: &str) {
        self.write_file(DEFAULT_GALLERY_PATH, yaml);
    }

    /// Discover assets under `src/` and build a store over them.
    pub fn store(&self) -> ImageStore {
        let assets = AssetIndex::discover(self.root(), "src", "/assets").unwrap();
        ImageStore::new(self.root(), Arc::new(assets))
    }
}

/// Write a blank image; format follows the extension. Creates parent dirs.
pub fn write_image(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::new(width, height).save(path).unwrap();
}

// =========================================================================
// Extractors
// =========================================================================

/// Image titles in page order.
pub fn titles(page: &ImagePage) -> Vec<&str> {
    page.images.iter().map(|i| i.title.as_str()).collect()
}

// =========================================================================
// Log capture
// =========================================================================

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a thread-local subscriber and return its result together
/// with everything logged (plain text, no ANSI).
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}
