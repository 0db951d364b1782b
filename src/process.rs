//! Responsive image generation.
//!
//! Stage 2 of the build pipeline. Takes the manifest from the scan stage and
//! encodes every picture that lives in the content directory into AVIF
//! variants for `srcset`. Pictures referenced by URL (`/media/…`,
//! `https://…`) are left to the host that serves them.
//!
//! ## Output Structure
//!
//! Variants mirror the content layout:
//!
//! ```text
//! processed/
//! ├── manifest.json                    # Scan manifest + generated variants
//! ├── .cache-manifest.json             # Encoding cache (see crate::cache)
//! ├── images/
//! │   ├── hero-640.avif
//! │   ├── hero-1280.avif
//! │   └── hero-1920.avif
//! └── gallery/
//!     └── 010-Grand-Lobby-640.avif
//! ```
//!
//! Widths come from `images.sizes`; widths above the original are skipped,
//! and a picture narrower than every size gets one variant at its own size.
//!
//! ## Parallel Processing
//!
//! Pictures within a section are encoded in parallel with
//! [rayon](https://docs.rs/rayon). Progress is reported as [`ProcessEvent`]s
//! over an optional channel so the CLI can print while workers run.

use crate::cache::{self, CacheManifest, CacheStats, Lookup};
use crate::config::SiteConfig;
use crate::imaging::{
    AvifBackend, BackendError, ImageBackend, Quality, ResponsiveConfig, encode_variant,
    get_dimensions, plan_variants,
};
use crate::scan::Manifest as InputManifest;
use crate::types::{GalleryImage, NavItem, RefKind, SiteContent, classify_ref};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("Source image not found: {0}")]
    SourceNotFound(PathBuf),
}

/// Progress reported while processing.
#[derive(Debug, Clone)]
pub enum ProcessEvent {
    /// A page section's pictures are about to be processed.
    SectionStarted { title: String, image_count: usize },
    /// One picture is done. `index` is 1-based within its section.
    ImageProcessed {
        index: usize,
        title: Option<String>,
        source_path: String,
        variants: Vec<VariantInfo>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantInfo {
    /// Display label, e.g. `640px`.
    pub label: String,
    pub status: VariantStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantStatus {
    /// Reused in place.
    Cached,
    /// Copied from where the same content was encoded before.
    Copied,
    Encoded,
}

/// Encoded variants of one content picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedImage {
    /// Path relative to the content root, as written in `site.toml`.
    pub source_path: String,
    /// Original dimensions (width, height).
    pub dimensions: (u32, u32),
    /// Ascending by width.
    pub variants: Vec<ImageVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageVariant {
    /// Relative to the processed directory and to the output root.
    pub path: String,
    pub width: u32,
    pub height: u32,
}

impl ProcessedImage {
    /// `srcset` attribute value, e.g. `images/hero-640.avif 640w, …`.
    pub fn srcset(&self) -> String {
        self.variants
            .iter()
            .map(|v| format!("{} {}w", v.path, v.width))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Widest variant, used as the plain `src` fallback.
    pub fn largest(&self) -> Option<&ImageVariant> {
        self.variants.last()
    }
}

/// Output manifest (after processing)
#[derive(Debug, Serialize, Deserialize)]
pub struct OutputManifest {
    pub navigation: Vec<NavItem>,
    pub site: SiteContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<GalleryImage>,
    /// Keyed by [`ProcessedImage::source_path`].
    pub images: BTreeMap<String, ProcessedImage>,
    pub config: SiteConfig,
}

pub struct ProcessResult {
    pub manifest: OutputManifest,
    pub cache_stats: CacheStats,
}

pub fn process(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let backend = AvifBackend::new();
    process_with_backend(
        &backend,
        manifest_path,
        source_root,
        output_dir,
        use_cache,
        events,
    )
}

/// Process images using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    use_cache: bool,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessResult, ProcessError> {
    let manifest_content = std::fs::read_to_string(manifest_path)?;
    let input: InputManifest = serde_json::from_str(&manifest_content)?;

    std::fs::create_dir_all(output_dir)?;

    let responsive = ResponsiveConfig {
        sizes: input.config.images.sizes.clone(),
        quality: Quality::new(input.config.images.quality),
    };
    let cache = Mutex::new(if use_cache {
        CacheManifest::load(output_dir)
    } else {
        CacheManifest::empty()
    });
    let stats = Mutex::new(CacheStats::default());
    let ctx = Context {
        backend,
        source_root,
        output_dir,
        responsive: &responsive,
        cache: &cache,
        stats: &stats,
    };

    let mut images = BTreeMap::new();
    for group in image_groups(&input.site, &input.gallery) {
        if let Some(tx) = &events {
            tx.send(ProcessEvent::SectionStarted {
                title: group.title.to_string(),
                image_count: group.images.len(),
            })
            .ok();
        }

        let processed = group
            .images
            .par_iter()
            .enumerate()
            .map(|(i, image)| {
                let (processed, variants) = ctx.process_image(image)?;
                if let Some(tx) = &events {
                    tx.send(ProcessEvent::ImageProcessed {
                        index: i + 1,
                        title: image.caption.clone(),
                        source_path: image.path.clone(),
                        variants,
                    })
                    .ok();
                }
                Ok(processed)
            })
            .collect::<Result<Vec<_>, ProcessError>>()?;

        for image in processed {
            images.insert(image.source_path.clone(), image);
        }
    }

    let produced: HashSet<String> = images
        .values()
        .flat_map(|i| i.variants.iter().map(|v| v.path.clone()))
        .collect();
    let mut cache = cache.into_inner().unwrap_or_else(PoisonError::into_inner);
    cache.retain_outputs(&produced);
    cache.save(output_dir)?;

    Ok(ProcessResult {
        manifest: OutputManifest {
            navigation: input.navigation,
            site: input.site,
            gallery: input.gallery,
            images,
            config: input.config,
        },
        cache_stats: stats.into_inner().unwrap_or_else(PoisonError::into_inner),
    })
}

/// Shared state for one processing run.
struct Context<'a, B> {
    backend: &'a B,
    source_root: &'a Path,
    output_dir: &'a Path,
    responsive: &'a ResponsiveConfig,
    cache: &'a Mutex<CacheManifest>,
    stats: &'a Mutex<CacheStats>,
}

impl<B: ImageBackend> Context<'_, B> {
    fn process_image(
        &self,
        image: &SourceImage,
    ) -> Result<(ProcessedImage, Vec<VariantInfo>), ProcessError> {
        let source = self.source_root.join(&image.path);
        if !source.exists() {
            return Err(ProcessError::SourceNotFound(source));
        }

        let dimensions = get_dimensions(self.backend, &source)?;
        let source_hash = cache::hash_file(&source)?;
        let quality = self.responsive.quality;

        let mut variants = Vec::new();
        let mut infos = Vec::new();
        for planned in plan_variants(&image.path, dimensions, self.responsive) {
            let params_hash =
                cache::hash_variant_params(planned.width, planned.height, quality.value());
            let lookup = self
                .cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .lookup(&source_hash, &params_hash, &planned.path, self.output_dir);

            let status = match lookup {
                Lookup::Hit => VariantStatus::Cached,
                Lookup::Moved(stored) => {
                    let target = self.output_dir.join(&planned.path);
                    if let Some(parent) = target.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::copy(self.output_dir.join(stored), target)?;
                    VariantStatus::Copied
                }
                Lookup::Miss => {
                    encode_variant(self.backend, &source, self.output_dir, &planned, quality)?;
                    VariantStatus::Encoded
                }
            };
            self.record(status);
            self.cache
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(planned.path.clone(), source_hash.clone(), params_hash);

            infos.push(VariantInfo {
                label: format!("{}px", planned.width),
                status,
            });
            variants.push(ImageVariant {
                path: planned.path,
                width: planned.width,
                height: planned.height,
            });
        }

        Ok((
            ProcessedImage {
                source_path: image.path.clone(),
                dimensions,
                variants,
            },
            infos,
        ))
    }

    fn record(&self, status: VariantStatus) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        match status {
            VariantStatus::Cached => stats.hit(),
            VariantStatus::Copied => stats.copy(),
            VariantStatus::Encoded => stats.miss(),
        }
    }
}

/// A content picture and the caption it is listed under.
#[derive(Debug, Clone, PartialEq)]
struct SourceImage {
    caption: Option<String>,
    path: String,
}

#[derive(Debug)]
struct ImageGroup {
    title: &'static str,
    images: Vec<SourceImage>,
}

/// Local pictures grouped by page section, in page order.
///
/// A picture used twice is processed once, under the first section using it.
fn image_groups(site: &SiteContent, gallery: &[GalleryImage]) -> Vec<ImageGroup> {
    let mut seen = HashSet::new();
    let mut groups = Vec::new();
    let mut add = |title: &'static str, refs: Vec<(Option<&str>, &str)>| {
        let images: Vec<SourceImage> = refs
            .into_iter()
            .filter(|(_, path)| classify_ref(path) == RefKind::Local)
            .filter(|(_, path)| seen.insert(path.to_string()))
            .map(|(caption, path)| SourceImage {
                caption: caption.filter(|c| !c.is_empty()).map(str::to_string),
                path: path.to_string(),
            })
            .collect();
        if !images.is_empty() {
            groups.push(ImageGroup { title, images });
        }
    };

    if let Some(hero) = &site.hero {
        add("Hero", vec![(None, hero.image.as_str())]);
    }
    if let Some(location) = &site.location {
        add(
            "Location",
            location
                .slides
                .iter()
                .map(|s| (Some(s.headline.as_str()), s.image.as_str()))
                .collect(),
        );
    }
    if let Some(units) = &site.units {
        add(
            "Units",
            units
                .all()
                .map(|u| (Some(u.code.as_str()), u.image.as_str()))
                .collect(),
        );
    }
    if let Some(facilities) = &site.facilities {
        add(
            "Facilities",
            facilities
                .levels
                .iter()
                .map(|l| (Some(l.headline.as_str()), l.image.as_str()))
                .collect(),
        );
    }
    if let Some(tour) = &site.virtual_tour {
        add(
            "Virtual Tour",
            tour.previews
                .iter()
                .filter_map(|c| Some((Some(c.title.as_str()), c.image.as_deref()?)))
                .collect(),
        );
    }
    if let Some(concierge) = &site.concierge {
        add(
            "Concierge",
            concierge
                .services
                .iter()
                .filter_map(|c| Some((Some(c.title.as_str()), c.image.as_deref()?)))
                .collect(),
        );
    }
    add(
        "Gallery",
        gallery
            .iter()
            .map(|g| (Some(g.label.as_str()), g.image.as_str()))
            .collect(),
    );

    groups
}
