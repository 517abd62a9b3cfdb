//! CLI output formatting for `check` and `fetch`.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (collection, image) is its semantic identity, a positional
//! index plus title, with manifest paths and asset keys shown as indented
//! context lines. Reading the output top to bottom gives a content inventory
//! of the gallery; the context lines trace each entry back to a file.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Gallery src/gallery/gallery.yaml
//!
//! Collections
//! 001 Travel (2 photos)
//!     Id: travel
//! 002 featured (1 photo, built-in)
//!
//! Images
//! 001 Dawn
//!     Source: dawn.png
//!     Asset: /assets/gallery/dawn.png (4x3)
//! 002 (gone.png)
//!     Missing: /src/gallery/gone.png
//!
//! Assets
//!     12 discovered, 1 missing
//! ```
//!
//! ## Fetch
//!
//! ```text
//! 001 Dawn (4x3)
//! 002 Dusk (3x2)
//!
//! Loaded 2 of 2 images
//! ```
//!
//! Each view has a `format_*` function returning `Vec<String>` and a `print_*`
//! wrapper that writes to stdout.

use crate::api::ApiImage;
use crate::store::{CheckReport, CollectionSummary};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn photo_count(n: usize) -> String {
    if n == 1 {
        "1 photo".to_string()
    } else {
        format!("{n} photos")
    }
}

/// Collection header: display name, photo count, built-in marker.
///
/// ```text
/// 001 Travel (2 photos)
/// 002 featured (1 photo, built-in)
/// ```
fn collection_header(index: usize, collection: &CollectionSummary) -> String {
    let name = collection.name.as_deref().unwrap_or(&collection.id);
    let built_in = if collection.built_in { ", built-in" } else { "" };
    format!(
        "{} {} ({}{})",
        format_index(index),
        name,
        photo_count(collection.image_count),
        built_in
    )
}

/// Image line: titled images show the title, untitled ones the manifest path
/// in parens.
fn image_line(index: usize, title: &str, path: &str) -> String {
    if title.is_empty() {
        format!("{} ({})", format_index(index), path)
    } else {
        format!("{} {}", format_index(index), title)
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of checking a manifest against discovered assets.
pub fn format_check_output(report: &CheckReport) -> Vec<String> {
    let mut lines = vec![format!("Gallery {}", report.gallery_path), String::new()];

    lines.push("Collections".to_string());
    if report.collections.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, collection) in report.collections.iter().enumerate() {
        lines.push(collection_header(i + 1, collection));
        if collection.name.is_some() {
            lines.push(format!("{}Id: {}", indent(1), collection.id));
        }
    }

    lines.push(String::new());
    lines.push("Images".to_string());
    if report.entries.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, entry) in report.entries.iter().enumerate() {
        lines.push(image_line(i + 1, &entry.title, &entry.path));
        match &entry.asset {
            Some(asset) => {
                if !entry.title.is_empty() {
                    lines.push(format!("{}Source: {}", indent(1), entry.path));
                }
                lines.push(format!(
                    "{}Asset: {} ({}x{})",
                    indent(1),
                    asset.src,
                    asset.width,
                    asset.height
                ));
            }
            None => lines.push(format!("{}Missing: {}", indent(1), entry.key)),
        }
    }

    lines.push(String::new());
    lines.push("Assets".to_string());
    lines.push(format!(
        "{}{} discovered, {} missing",
        indent(1),
        report.asset_count,
        report.missing().count()
    ));

    lines
}

/// Print check output to stdout.
pub fn print_check_output(report: &CheckReport) {
    for line in format_check_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Fetch
// ============================================================================

/// Format images pulled through the grid client, plus a summary line.
pub fn format_fetch_output(images: &[ApiImage], total: usize) -> Vec<String> {
    let mut lines: Vec<String> = images
        .iter()
        .enumerate()
        .map(|(i, img)| {
            format!(
                "{} ({}x{})",
                image_line(i + 1, &img.title, &img.src),
                img.width,
                img.height
            )
        })
        .collect();
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format!("Loaded {} of {} images", images.len(), total));
    lines
}

/// Print fetch output to stdout.
pub fn print_fetch_output(images: &[ApiImage], total: usize) {
    for line in format_fetch_output(images, total) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ImageAsset;
    use crate::store::CheckedEntry;
    use std::path::PathBuf;

    fn asset(src: &str, width: u32, height: u32) -> ImageAsset {
        ImageAsset {
            src: src.to_string(),
            width,
            height,
            source: PathBuf::new(),
        }
    }

    fn sample_report() -> CheckReport {
        CheckReport {
            gallery_path: "src/gallery/gallery.yaml".into(),
            collections: vec![
                CollectionSummary {
                    id: "travel".into(),
                    name: Some("Travel".into()),
                    built_in: false,
                    image_count: 2,
                },
                CollectionSummary {
                    id: "featured".into(),
                    name: None,
                    built_in: true,
                    image_count: 1,
                },
            ],
            entries: vec![
                CheckedEntry {
                    path: "dawn.png".into(),
                    key: "/src/gallery/dawn.png".into(),
                    title: "Dawn".into(),
                    asset: Some(asset("/assets/gallery/dawn.png", 4, 3)),
                },
                CheckedEntry {
                    path: "gone.png".into(),
                    key: "/src/gallery/gone.png".into(),
                    title: String::new(),
                    asset: None,
                },
            ],
            asset_count: 12,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn image_line_falls_back_to_path() {
        assert_eq!(image_line(1, "Dawn", "dawn.png"), "001 Dawn");
        assert_eq!(image_line(2, "", "gone.png"), "002 (gone.png)");
    }

    #[test]
    fn check_output_full() {
        let lines = format_check_output(&sample_report());
        assert_eq!(
            lines,
            vec![
                "Gallery src/gallery/gallery.yaml",
                "",
                "Collections",
                "001 Travel (2 photos)",
                "    Id: travel",
                "002 featured (1 photo, built-in)",
                "",
                "Images",
                "001 Dawn",
                "    Source: dawn.png",
                "    Asset: /assets/gallery/dawn.png (4x3)",
                "002 (gone.png)",
                "    Missing: /src/gallery/gone.png",
                "",
                "Assets",
                "    12 discovered, 1 missing",
            ]
        );
    }

    #[test]
    fn check_output_empty_sections() {
        let report = CheckReport {
            gallery_path: "g.yaml".into(),
            collections: vec![],
            entries: vec![],
            asset_count: 0,
        };
        let lines = format_check_output(&report);
        assert!(lines.contains(&"    (none)".to_string()));
        assert_eq!(lines.last().unwrap(), "    0 discovered, 0 missing");
    }

    #[test]
    fn fetch_output_lists_and_summarizes() {
        let images = vec![ApiImage {
            src: "/assets/a.png".into(),
            width: 3,
            height: 2,
            title: "Dusk".into(),
            description: String::new(),
        }];
        assert_eq!(
            format_fetch_output(&images, 4),
            vec!["001 Dusk (3x2)", "", "Loaded 1 of 4 images"]
        );
    }

    #[test]
    fn fetch_output_empty() {
        assert_eq!(format_fetch_output(&[], 0), vec!["Loaded 0 of 0 images"]);
    }
}
