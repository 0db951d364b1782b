//! # Pavilion Site
//!
//! Static site generator for the Pavilion Square KL marketing page: a single
//! scroll-driven page with hero imagery, unit catalogs, facility levels, a
//! 360° virtual tour, concierge services and a lead-capture form.
//!
//! # Architecture: Three-Stage Pipeline
//!
//! Content goes through three independent stages, each producing a JSON
//! manifest that the next stage consumes:
//!
//! ```text
//! 1. Scan      content/  →  manifest.json    (site.toml + gallery/ → structured data)
//! 2. Process   manifest  →  processed/       (responsive AVIF variants)
//! 3. Generate  manifest  →  dist/            (index.html + assets + _redirects)
//! ```
//!
//! Each manifest is human-readable JSON you can inspect, and each stage can be
//! run and tested on its own.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: loads `site.toml` and `gallery/`, checks references, builds navigation |
//! | [`process`] | Stage 2: encodes AVIF variants with a content-addressed cache |
//! | [`generate`] | Stage 3: renders the page with Maud, copies assets, writes `_redirects` |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation, palette CSS |
//! | [`types`] | Site content shared between stages (`SiteContent`, `NavItem`, `GalleryImage`) |
//! | [`naming`] | `NNN-name` filename convention for gallery ordering |
//! | [`imaging`] | Pure-Rust image operations: identify, resize, AVIF encode |
//! | [`cache`] | Encoding cache keyed by source and parameter hashes |
//! | [`interaction`] | Carousel, viewport normalizer, reveal, active section, lead form |
//! | [`runtime`] | Parameters serialized into the page for the browser runtime |
//! | [`proxy`] | Rewrite rules to the external tour and media host |
//! | [`output`] | CLI output formatting for every stage |
//!
//! # Design Decisions
//!
//! ## One Set of Rules for Rust and the Browser
//!
//! The page's behavior (carousel cooldowns, reveal thresholds, the zoom
//! heuristic, lead-form patterns) is modelled in [`interaction`] as plain
//! state machines with explicit clocks and measurements. The generate stage
//! serializes their parameters into the page, and `static/site.js` applies
//! them. Changing a timing in `config.toml` changes both the tests' model and
//! the shipped page.
//!
//! ## AVIF-Only Output
//!
//! Generated images are AVIF at each configured width. Pictures referenced
//! by URL (`/media/…`, `https://…`) are served by their host and left alone.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/): templates are
//! checked at compile time and every interpolation is escaped. Only Markdown
//! output from `site.toml` descriptions is inserted raw.

pub mod cache;
pub mod config;
pub mod generate;
pub mod imaging;
pub mod interaction;
pub mod naming;
pub mod output;
pub mod process;
pub mod proxy;
pub mod runtime;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
