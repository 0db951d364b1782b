//! Image processing in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Resize → AVIF** | Lanczos3 + rav1e encoder |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`AvifBackend`]
//! - **Operations**: Variant planning and encoding on top of a backend

pub mod avif_backend;
pub mod backend;
mod calculations;
pub mod operations;
mod params;

pub use avif_backend::{AvifBackend, supported_input_extensions};
pub use backend::{BackendError, ImageBackend};
// Re-exported for tests (process.rs, operations.rs tests use this)
#[cfg(test)]
pub use backend::Dimensions;
pub use operations::{
    PlannedVariant, ResponsiveConfig, encode_variant, get_dimensions, plan_variants,
};
pub use params::Quality;
