//! Shared test utilities for the pavilion-site test suite.
//!
//! Provides fixture setup, lookup helpers and bulk extractors that work with
//! scan-phase data structures (`Manifest`, `NavItem`, `GalleryImage`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manifest = scan(tmp.path()).unwrap();
//!
//! let lobby = find_gallery_image(&manifest, "Grand Lobby");
//! assert_eq!(lobby.number, Some(10));
//! assert_eq!(nav_ids(&manifest)[0], "hero");
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::scan::Manifest;
use crate::types::GalleryImage;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/content/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write a solid-color PNG of the given size, creating parent directories.
pub fn write_png(path: &Path, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(width, height, image::Rgb([196, 162, 101]))
        .save(path)
        .unwrap();
}

// =========================================================================
// Manifest lookups: panic with a clear message on miss
// =========================================================================

/// Find a gallery picture by caption. Panics if not found.
pub fn find_gallery_image<'a>(manifest: &'a Manifest, label: &str) -> &'a GalleryImage {
    manifest
        .gallery
        .iter()
        .find(|g| g.label == label)
        .unwrap_or_else(|| {
            let labels = gallery_labels(manifest);
            panic!("gallery image '{label}' not found. Available: {labels:?}")
        })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All gallery captions in display order.
pub fn gallery_labels(manifest: &Manifest) -> Vec<&str> {
    manifest.gallery.iter().map(|g| g.label.as_str()).collect()
}

/// Navigation anchor ids in page order.
pub fn nav_ids(manifest: &Manifest) -> Vec<&str> {
    manifest.navigation.iter().map(|n| n.id.as_str()).collect()
}

/// Navigation labels in page order.
pub fn nav_titles(manifest: &Manifest) -> Vec<&str> {
    manifest
        .navigation
        .iter()
        .map(|n| n.title.as_str())
        .collect()
}
