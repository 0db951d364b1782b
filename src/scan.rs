//! Content loading and manifest generation.
//!
//! Stage 1 of the build pipeline. Reads the content directory, checks every
//! reference it makes, and produces a structured manifest that subsequent
//! stages consume.
//!
//! ## Directory Structure
//!
//! ```text
//! content/
//! ├── config.toml                  # Build, theme and timing config (optional)
//! ├── site.toml                    # Section copy and data (required)
//! ├── gallery/                     # Contact-section gallery
//! │   ├── 010-Grand-Lobby.jpg      # Numbered = shown, ordered by number
//! │   ├── 020-Sky-Facilities.jpg
//! │   └── lobby-draft.jpg          # Unnumbered = ignored
//! ├── images/                      # Pictures referenced from site.toml
//! │   └── hero.jpg
//! └── assets/                      # Copied verbatim to the output root
//!     └── pano-viewer.html
//! ```
//!
//! ## Output
//!
//! Produces a [`Manifest`] containing:
//! - Navigation: one anchor per section present, in page order
//! - The parsed `site.toml` content
//! - The gallery: numbered `gallery/` files, then inline `[[contact.gallery]]` entries
//! - Site configuration
//!
//! ## Validation
//!
//! The scanner enforces these rules:
//! - `site.toml` exists and has no unknown keys
//! - Every relative image path points at an existing file with a supported
//!   image extension; decoding is left to the process stage
//! - Every site-absolute path (`/media/…`, `/pano-viewer.html`) is either
//!   routed by a rewrite rule or shipped in the assets directory
//! - No duplicate gallery numbers
//! - The lead form offers at least one unit type, each value once

use crate::config::{self, SiteConfig};
use crate::imaging::supported_input_extensions;
use crate::naming::parse_entry_name;
use crate::proxy;
use crate::types::{
    GalleryImage, NavItem, RefKind, SiteContent, classify_ref, default_nav_label, ref_path,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("site.toml not found in {0}")]
    MissingSiteFile(PathBuf),
    #[error("Invalid site.toml: {0}")]
    SiteToml(#[from] toml::de::Error),
    #[error("Image not found: {0}")]
    MissingImage(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedImage(String),
    #[error("Duplicate gallery number {0} in {1}")]
    DuplicateNumber(u32, PathBuf),
    #[error("'{0}' is not routed by a rewrite rule and not found in {1}/")]
    UnroutedPath(String, String),
    #[error("Invalid content: {0}")]
    InvalidContent(String),
}

/// Manifest output from the scan stage
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub navigation: Vec<NavItem>,
    pub site: SiteContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GalleryImage>,
    pub config: SiteConfig,
}

/// Name of the required content file.
pub const SITE_FILE: &str = "site.toml";
/// Directory holding numbered gallery pictures.
pub const GALLERY_DIR: &str = "gallery";

pub fn scan(root: &Path) -> Result<Manifest, ScanError> {
    // Load site config (uses defaults if config.toml doesn't exist)
    let config = config::load_config(root)?;

    let site = load_site(root)?;
    check_content(&site)?;

    let mut gallery = scan_gallery(root)?;
    if let Some(contact) = &site.contact {
        gallery.extend(contact.gallery.iter().map(|g| GalleryImage {
            number: None,
            label: g.label.clone(),
            image: g.image.clone(),
        }));
    }

    for reference in site.image_refs() {
        check_image_ref(root, &config, reference)?;
    }
    for reference in site.frame_refs() {
        check_site_path(root, &config, reference)?;
    }

    Ok(Manifest {
        navigation: build_navigation(&site),
        site,
        gallery,
        config,
    })
}

fn load_site(root: &Path) -> Result<SiteContent, ScanError> {
    let path = root.join(SITE_FILE);
    if !path.is_file() {
        return Err(ScanError::MissingSiteFile(root.to_path_buf()));
    }
    let content = fs::read_to_string(&path)?;
    Ok(toml::from_str(&content)?)
}

/// One nav anchor per section present, labels defaulting per section.
fn build_navigation(site: &SiteContent) -> Vec<NavItem> {
    site.sections()
        .into_iter()
        .map(|s| NavItem {
            id: s.id.to_string(),
            title: s
                .nav_label
                .map(str::to_string)
                .unwrap_or_else(|| default_nav_label(s.id).to_string()),
        })
        .collect()
}

/// Structural rules serde cannot express.
fn check_content(site: &SiteContent) -> Result<(), ScanError> {
    if let Some(contact) = &site.contact {
        if contact.interests.is_empty() {
            return Err(ScanError::InvalidContent(
                "contact.interests must list at least one unit type".into(),
            ));
        }
        let mut seen = HashSet::new();
        for choice in &contact.interests {
            if !seen.insert(choice.value.as_str()) {
                return Err(ScanError::InvalidContent(format!(
                    "contact.interests lists '{}' twice",
                    choice.value
                )));
            }
        }
    }
    if let Some(facilities) = &site.facilities {
        let mut seen = HashSet::new();
        for level in &facilities.levels {
            if !seen.insert(level.id.as_str()) {
                return Err(ScanError::InvalidContent(format!(
                    "facility level id '{}' is used twice",
                    level.id
                )));
            }
        }
    }
    Ok(())
}

/// Read `gallery/`: numbered pictures only, ordered by number.
fn scan_gallery(root: &Path) -> Result<Vec<GalleryImage>, ScanError> {
    let dir = root.join(GALLERY_DIR);
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut numbered: BTreeMap<u32, GalleryImage> = BTreeMap::new();
    for path in collect_entries(&dir)? {
        if !is_image(&path) {
            continue;
        }
        let filename = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let parsed = parse_entry_name(&stem);
        // Unnumbered pictures are work in progress
        let Some(number) = parsed.number else {
            continue;
        };
        if numbered.contains_key(&number) {
            return Err(ScanError::DuplicateNumber(number, dir));
        }
        numbered.insert(
            number,
            GalleryImage {
                number: Some(number),
                label: parsed.label,
                image: format!("{GALLERY_DIR}/{filename}"),
            },
        );
    }
    Ok(numbered.into_values().collect())
}

fn collect_entries(path: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            // Skip hidden files
            !p.file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
        })
        .collect();

    entries.sort();
    Ok(entries)
}

fn is_image(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    has_image_extension(path)
}

fn has_image_extension(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    supported_input_extensions().contains(&ext.as_str())
}

fn check_image_ref(root: &Path, config: &SiteConfig, reference: &str) -> Result<(), ScanError> {
    match classify_ref(reference) {
        RefKind::Local => {
            let path = root.join(reference);
            if !path.is_file() {
                return Err(ScanError::MissingImage(reference.to_string()));
            }
            if !has_image_extension(&path) {
                return Err(ScanError::UnsupportedImage(reference.to_string()));
            }
            Ok(())
        }
        RefKind::SiteAbsolute => check_site_path(root, config, reference),
        RefKind::External => Ok(()),
    }
}

/// A path the host must serve: routed by a rewrite or present in assets.
fn check_site_path(root: &Path, config: &SiteConfig, reference: &str) -> Result<(), ScanError> {
    if classify_ref(reference) == RefKind::External {
        return Ok(());
    }
    let path = ref_path(reference);
    let absolute = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };
    if proxy::resolve(&config.proxy.rewrites, &absolute).is_some() {
        return Ok(());
    }
    let asset = root
        .join(&config.assets_dir)
        .join(absolute.trim_start_matches('/'));
    if asset.exists() {
        return Ok(());
    }
    Err(ScanError::UnroutedPath(
        reference.to_string(),
        config.assets_dir.clone(),
    ))
}
