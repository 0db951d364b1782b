//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Planning
//! (which variants a picture needs, and where they go) is separate from
//! encoding so the process stage can consult its cache between the two.

use super::backend::{BackendError, ImageBackend};
use super::calculations::{ResponsiveSize, calculate_responsive_sizes};
use super::params::{Quality, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for responsive image generation.
#[derive(Debug, Clone)]
pub struct ResponsiveConfig {
    pub sizes: Vec<u32>,
    pub quality: Quality,
}

/// One AVIF variant to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedVariant {
    /// Output path relative to the processed directory, `/`-separated.
    pub path: String,
    pub width: u32,
    pub height: u32,
}

/// Variants for a content image at `source_rel` (e.g. `images/hero.jpg`).
///
/// Outputs mirror the source layout: `images/hero.jpg` at 640px becomes
/// `images/hero-640.avif`.
pub fn plan_variants(
    source_rel: &str,
    original_dims: (u32, u32),
    config: &ResponsiveConfig,
) -> Vec<PlannedVariant> {
    let rel = Path::new(source_rel);
    let stem = rel
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dir = rel
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();

    calculate_responsive_sizes(original_dims, &config.sizes)
        .into_iter()
        .map(|ResponsiveSize { width, height }| {
            let name = format!("{}-{}.avif", stem, width);
            PlannedVariant {
                path: if dir.is_empty() {
                    name
                } else {
                    format!("{}/{}", dir, name)
                },
                width,
                height,
            }
        })
        .collect()
}

/// Encode one planned variant into `output_dir`.
pub fn encode_variant(
    backend: &impl ImageBackend,
    source: &Path,
    output_dir: &Path,
    variant: &PlannedVariant,
    quality: Quality,
) -> Result<()> {
    let output = output_dir.join(&variant.path);
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    backend.resize(&ResizeParams {
        source: source.to_path_buf(),
        output,
        width: variant.width,
        height: variant.height,
        quality,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use tempfile::TempDir;

    fn config(sizes: Vec<u32>) -> ResponsiveConfig {
        ResponsiveConfig {
            sizes,
            quality: Quality::default(),
        }
    }

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::with_dimensions(vec![Dimensions {
            width: 1920,
            height: 1080,
        }]);

        let dims = get_dimensions(&backend, Path::new("/hero.jpg")).unwrap();
        assert_eq!(dims, (1920, 1080));
    }

    #[test]
    fn plan_mirrors_source_directory() {
        let plan = plan_variants("images/hero.jpg", (2000, 1000), &config(vec![640, 1280]));
        assert_eq!(
            plan,
            vec![
                PlannedVariant {
                    path: "images/hero-640.avif".into(),
                    width: 640,
                    height: 320
                },
                PlannedVariant {
                    path: "images/hero-1280.avif".into(),
                    width: 1280,
                    height: 640
                },
            ]
        );
    }

    #[test]
    fn plan_for_top_level_file() {
        let plan = plan_variants("lobby.png", (500, 400), &config(vec![640]));
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].path, "lobby-500.avif");
    }

    #[test]
    fn plan_keeps_gallery_number_prefix() {
        let plan = plan_variants("gallery/010-Grand-Lobby.jpg", (1400, 700), &config(vec![640]));
        assert_eq!(plan[0].path, "gallery/010-Grand-Lobby-640.avif");
    }

    #[test]
    fn encode_creates_parent_and_calls_backend() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let variant = PlannedVariant {
            path: "images/hero-640.avif".into(),
            width: 640,
            height: 427,
        };

        encode_variant(
            &backend,
            Path::new("/content/images/hero.jpg"),
            tmp.path(),
            &variant,
            Quality::new(75),
        )
        .unwrap();

        assert!(tmp.path().join("images").is_dir());
        let ops = backend.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Resize { output, width: 640, height: 427, quality: 75, .. }
                if output.ends_with("images/hero-640.avif")
        ));
    }
}
