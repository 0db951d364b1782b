//! Interaction state machines behind the page's scripted behavior.
//!
//! Each widget on the page is a leaf with its own state; none of them talk
//! to each other. The modules here model that state as plain Rust values
//! driven by explicit inputs (a clock reading, a scroll position, a window
//! size, a keystroke), so every rule can be tested without a browser. The
//! page runtime (`static/site.js`) applies the same rules with the
//! parameters serialized by [`crate::runtime`].
//!
//! | Module | Widget |
//! |--------|--------|
//! | [`carousel`] | Auto-advancing sliders with a manual-selection cooldown |
//! | [`viewport`] | Browser zoom detection and base font-size normalization |
//! | [`visibility`] | Root margins, scroll metrics and intersection ratios |
//! | [`reveal`] | One-shot reveals, staggered groups, deferred embeds |
//! | [`navigation`] | Active section, scroll progress, navbar solid state |
//! | [`lead`] | Lead form validation and simulated submit |
//!
//! ## Lifetimes
//!
//! Every timer and watcher belongs to exactly one widget and lives as long
//! as the widget value. Dropping the value is the teardown; there is no
//! global registry that could keep firing into an unmounted widget.

pub mod carousel;
pub mod lead;
pub mod navigation;
pub mod reveal;
pub mod viewport;
pub mod visibility;

pub use carousel::{Carousel, CarouselTiming};
pub use lead::{Field, LeadDraft, LeadForm, LeadOptions, LeadSubmission, validate};
pub use navigation::{ActiveSectionOptions, ActiveSectionTracker, SectionBox, scroll_progress};
pub use reveal::{RevealOptions, RevealTracker, StaggeredReveal};
pub use viewport::{Normalization, NormalizationMode, ViewportProfile, normalize};
pub use visibility::{RootMargin, ScrollMetrics, Span};
