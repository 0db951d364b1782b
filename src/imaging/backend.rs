//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the build needs:
//! reading a picture's dimensions and encoding one resized AVIF variant.
//! The production implementation is
//! [`AvifBackend`](super::avif_backend::AvifBackend); tests use a recording
//! mock so the process stage can be checked without decoding anything.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so one backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions without decoding pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize and encode one AVIF variant.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
