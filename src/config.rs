//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; a `config.toml` in the content root overrides any subset
//! of them. Copy (headlines, unit data, contact details) lives in `site.toml`
//! and is handled by [`crate::scan`]; this file only holds build, theme and
//! behavior settings.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! assets_dir = "assets"      # Copied verbatim to the output root
//!
//! [colors]
//! background = "#0e0c14"
//! gold = "#c4a265"
//! champagne = "#f3e9d2"
//! # ...
//!
//! [images]
//! sizes = [640, 1280, 1920, 2560]
//! quality = 80
//!
//! [carousels.location]
//! interval_ms = 5000         # Auto-advance interval
//! cooldown_ms = 8000         # Pause after a manual selection
//!
//! [navigation.navbar]
//! threshold = 0.2
//! root_margin = "-80px 0px -30% 0px"
//!
//! [[proxy.rewrites]]
//! source = "/media/:path*"
//! destination = "https://pavilionsquarekl.com/ISP/media/:path*"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! # Slow the gallery down
//! [carousels.gallery]
//! interval_ms = 6000
//! ```
//!
//! Unknown keys are rejected to catch typos early. Arrays (`images.sizes`,
//! `proxy.rewrites`) replace the stock value as a whole.

use crate::interaction::{ActiveSectionOptions, CarouselTiming, LeadOptions, RevealOptions};
use crate::proxy::{self, ProxyError, RewriteRule};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Proxy config error: {0}")]
    Proxy(#[from] ProxyError),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults matching the live site. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory under the content root copied verbatim into the output.
    pub assets_dir: String,
    /// Brand palette, emitted as CSS custom properties.
    pub colors: Palette,
    /// Responsive image generation settings (sizes, quality).
    pub images: ImagesConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Auto-advance timing for each slider on the page.
    pub carousels: CarouselsConfig,
    /// One-shot reveal animations.
    pub reveal: RevealOptions,
    /// Active-section tracking and navbar behavior.
    pub navigation: NavigationConfig,
    /// Hero panorama embed.
    pub hero: HeroConfig,
    /// Lead form submit timing.
    pub lead: LeadOptions,
    /// Rewrites to the external tour/media host.
    pub proxy: ProxyConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            assets_dir: "assets".to_string(),
            colors: Palette::default(),
            images: ImagesConfig::default(),
            processing: ProcessingConfig::default(),
            carousels: CarouselsConfig::default(),
            reveal: RevealOptions::default(),
            navigation: NavigationConfig::default(),
            hero: HeroConfig::default(),
            lead: LeadOptions::default(),
            proxy: ProxyConfig::default(),
        }
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!(
            "{name} must be between 0.0 and 1.0"
        )))
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 0-100".into(),
            ));
        }
        if self.images.sizes.is_empty() {
            return Err(ConfigError::Validation(
                "images.sizes must not be empty".into(),
            ));
        }
        if self.images.sizes.contains(&0) {
            return Err(ConfigError::Validation(
                "images.sizes values must be non-zero".into(),
            ));
        }
        if self.assets_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "assets_dir must not be empty".into(),
            ));
        }
        for (name, timing) in self.carousels.iter() {
            if timing.interval_ms == 0 {
                return Err(ConfigError::Validation(format!(
                    "carousels.{name}.interval_ms must be greater than 0"
                )));
            }
        }
        check_fraction("reveal.threshold", self.reveal.threshold)?;
        check_fraction("reveal.stagger_threshold", self.reveal.stagger_threshold)?;
        check_fraction("navigation.navbar.threshold", self.navigation.navbar.threshold)?;
        check_fraction("navigation.rail.threshold", self.navigation.rail.threshold)?;
        check_fraction("hero.panorama_threshold", self.hero.panorama_threshold)?;
        proxy::validate_rules(&self.proxy.rewrites)?;
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Responsive image generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Pixel widths to generate for `srcset`. Full-bleed backdrops use the
    /// largest; cards pick from the smaller ones.
    pub sizes: Vec<u32>,
    /// AVIF encoding quality (0 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            sizes: vec![640, 1280, 1920, 2560],
            quality: 80,
        }
    }
}

/// Timing per slider. Each one is an independent carousel instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselsConfig {
    /// Location backdrops behind the connectivity facts.
    pub location: CarouselTiming,
    /// Unit catalog (residential and corporate tabs share the timer).
    pub units: CarouselTiming,
    /// Facility levels.
    pub facilities: CarouselTiming,
    /// Gallery strip above the contact form.
    pub gallery: CarouselTiming,
}

impl CarouselsConfig {
    /// `(name, timing)` pairs in page order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &CarouselTiming)> {
        [
            ("location", &self.location),
            ("units", &self.units),
            ("facilities", &self.facilities),
            ("gallery", &self.gallery),
        ]
        .into_iter()
    }
}

impl Default for CarouselsConfig {
    fn default() -> Self {
        Self {
            location: CarouselTiming::new(5000, 8000),
            units: CarouselTiming::new(5500, 10_000),
            facilities: CarouselTiming::new(6000, 10_000),
            gallery: CarouselTiming::new(3500, 7000),
        }
    }
}

/// Active-section watchers and the navbar's scroll behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NavigationConfig {
    /// Navbar link highlighting.
    pub navbar: ActiveSectionOptions,
    /// Side rail dots beside the progress bar.
    pub rail: ActiveSectionOptions,
    /// Scroll offset past which the navbar gets its solid background.
    pub solid_offset_px: f64,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            navbar: ActiveSectionOptions::navbar(),
            rail: ActiveSectionOptions::progress_rail(),
            solid_offset_px: 50.0,
        }
    }
}

/// Hero panorama iframe gating.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeroConfig {
    /// Delay after load before the panorama may mount.
    pub panorama_delay_ms: u64,
    /// Fraction of the hero that must be visible for the panorama to stay mounted.
    pub panorama_threshold: f64,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            panorama_delay_ms: 1500,
            panorama_threshold: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyConfig {
    pub rewrites: Vec<RewriteRule>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            rewrites: proxy::default_rules(),
        }
    }
}

/// Brand palette. Values are any CSS color.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    /// Page background.
    pub background: String,
    /// Cards and form controls.
    pub card: String,
    /// Raised panels (tabs, lightbox controls).
    pub elevated: String,
    /// Deepest backdrop, behind the virtual tour.
    pub deep: String,
    /// Accent for headings, rules and active states.
    pub gold: String,
    /// Hover state of gold controls.
    pub gold_bright: String,
    /// Primary text.
    pub champagne: String,
    /// Secondary text: labels, captions, footer.
    pub text_muted: String,
    /// Hairline borders on glass panels.
    pub glass_border: String,
    /// Inline validation messages.
    pub error: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: "#0e0c14".to_string(),
            card: "#141218".to_string(),
            elevated: "#1c1828".to_string(),
            deep: "#060914".to_string(),
            gold: "#c4a265".to_string(),
            gold_bright: "#f0d070".to_string(),
            champagne: "#f3e9d2".to_string(),
            text_muted: "#9a93a6".to_string(),
            glass_border: "rgba(255, 255, 255, 0.08)".to_string(),
            error: "#f87171".to_string(),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// The base layer that user overrides are merged onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the content root.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Pavilion Square KL site configuration
# ======================================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at content/config.toml. Section copy lives in
# content/site.toml; this file only holds build and behavior settings.
# Unknown keys will cause an error.

# Directory under the content root copied verbatim to the output root
# (panorama viewer page, favicon, robots.txt...).
assets_dir = "assets"

# ---------------------------------------------------------------------------
# Brand palette (emitted as CSS custom properties)
# ---------------------------------------------------------------------------
[colors]
background = "#0e0c14"
card = "#141218"
elevated = "#1c1828"
deep = "#060914"                          # Behind the virtual tour
gold = "#c4a265"
gold_bright = "#f0d070"                   # Hover state of gold controls
champagne = "#f3e9d2"                     # Primary text
text_muted = "#9a93a6"                    # Labels, captions, footer
glass_border = "rgba(255, 255, 255, 0.08)"
error = "#f87171"                         # Inline form errors

# ---------------------------------------------------------------------------
# Responsive image generation
# ---------------------------------------------------------------------------
[images]
# Pixel widths to generate for srcset.
sizes = [640, 1280, 1920, 2560]
# AVIF quality (0 = worst, 100 = best).
quality = 80

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# ---------------------------------------------------------------------------
# Carousels: auto-advance interval and the pause after a manual selection
# ---------------------------------------------------------------------------
[carousels.location]
interval_ms = 5000
cooldown_ms = 8000

[carousels.units]
interval_ms = 5500
cooldown_ms = 10000

[carousels.facilities]
interval_ms = 6000
cooldown_ms = 10000

[carousels.gallery]
interval_ms = 3500
cooldown_ms = 7000

# ---------------------------------------------------------------------------
# Reveal animations (fire once, never replay)
# ---------------------------------------------------------------------------
[reveal]
# Fraction of an element that must be visible.
threshold = 0.15
# CSS rootMargin; a negative bottom value fires a little before the
# element is fully on screen.
root_margin = "0px 0px -40px 0px"
# Staggered groups: container threshold and delay between children.
stagger_threshold = 0.1
stagger_ms = 100

# ---------------------------------------------------------------------------
# Active-section tracking
# ---------------------------------------------------------------------------
[navigation]
# Scroll offset (px) past which the navbar turns solid.
solid_offset_px = 50.0

[navigation.navbar]
threshold = 0.2
root_margin = "-80px 0px -30% 0px"
# Within this many px of the page end, the last section is forced active.
bottom_override = true
bottom_tolerance_px = 20.0

[navigation.rail]
threshold = 0.3
root_margin = "-80px 0px -40% 0px"
bottom_override = false
bottom_tolerance_px = 20.0

# ---------------------------------------------------------------------------
# Hero panorama
# ---------------------------------------------------------------------------
[hero]
# Wait this long after load before mounting the panorama iframe.
panorama_delay_ms = 1500
# Unmount it while less than this fraction of the hero is visible.
panorama_threshold = 0.05

# ---------------------------------------------------------------------------
# Lead form
# ---------------------------------------------------------------------------
[lead]
# Simulated network delay before the success message.
submit_delay_ms = 1500
# How long the success message stays up.
success_display_ms = 4000

# ---------------------------------------------------------------------------
# Rewrites to the external tour/media host (rendered to _redirects)
# ---------------------------------------------------------------------------
[[proxy.rewrites]]
source = "/isp-proxy/:path*"
destination = "https://pavilionsquarekl.com/ISP/:path*"

[[proxy.rewrites]]
source = "/media/:path*"
destination = "https://pavilionsquarekl.com/ISP/media/:path*"
"##
}

/// Generate CSS custom properties from the palette.
pub fn generate_color_css(colors: &Palette) -> String {
    format!(
        r#":root {{
    --color-bg: {background};
    --color-card: {card};
    --color-elevated: {elevated};
    --color-deep: {deep};
    --color-gold: {gold};
    --color-gold-bright: {gold_bright};
    --color-champagne: {champagne};
    --color-text-muted: {text_muted};
    --color-glass-border: {glass_border};
    --color-error: {error};
}}"#,
        background = colors.background,
        card = colors.card,
        elevated = colors.elevated,
        deep = colors.deep,
        gold = colors.gold,
        gold_bright = colors.gold_bright,
        champagne = colors.champagne,
        text_muted = colors.text_muted,
        glass_border = colors.glass_border,
        error = colors.error,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_palette() {
        let config = SiteConfig::default();
        assert_eq!(config.colors.background, "#0e0c14");
        assert_eq!(config.colors.gold, "#c4a265");
    }

    #[test]
    fn default_config_has_assets_dir() {
        assert_eq!(SiteConfig::default().assets_dir, "assets");
    }

    #[test]
    fn default_carousel_timings() {
        let c = CarouselsConfig::default();
        assert_eq!(c.location, CarouselTiming::new(5000, 8000));
        assert_eq!(c.units, CarouselTiming::new(5500, 10_000));
        assert_eq!(c.facilities, CarouselTiming::new(6000, 10_000));
        assert_eq!(c.gallery.interval_ms, 3500);
        let names: Vec<_> = c.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["location", "units", "facilities", "gallery"]);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
[colors]
gold = "#c9a84c"
"##;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        // Overridden value
        assert_eq!(config.colors.gold, "#c9a84c");
        // Default values preserved
        assert_eq!(config.colors.background, "#0e0c14");
        assert_eq!(config.images.sizes, vec![640, 1280, 1920, 2560]);
    }

    #[test]
    fn parse_partial_carousel_table() {
        let toml = r#"
[carousels.gallery]
interval_ms = 6000
"#;
        let config: SiteConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.carousels.gallery.interval_ms, 6000);
        assert_eq!(config.carousels.units.cooldown_ms, 10_000);
    }

    #[test]
    fn generate_css_uses_palette() {
        let mut colors = Palette::default();
        colors.gold = "#ffd700".to_string();
        let css = generate_color_css(&colors);
        assert!(css.contains("--color-gold: #ffd700"));
        assert!(css.contains("--color-bg: #0e0c14"));
        assert!(css.contains("--color-glass-border: rgba(255, 255, 255, 0.08)"));
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.colors.background, "#0e0c14");
        assert_eq!(config.proxy.rewrites.len(), 2);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r##"
[colors]
background = "#000000"

[navigation.navbar]
threshold = 0.25
"##,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.colors.background, "#000000");
        assert_eq!(config.navigation.navbar.threshold, 0.25);
        // Unspecified values come from the stock layer, not the struct default
        assert_eq!(
            config.navigation.navbar.root_margin.to_string(),
            "-80px 0px -30% 0px"
        );
        assert_eq!(
            config.navigation.rail.root_margin.to_string(),
            "-80px 0px -40% 0px"
        );
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "this is not valid toml [[[").unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn bad_root_margin_is_parse_error() {
        let toml = r#"
[reveal]
root_margin = "0px 0px -40em 0px"
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml);
        assert!(result.unwrap_err().to_string().contains("root margin"));
    }

    #[test]
    fn rewrites_replace_stock_list() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[[proxy.rewrites]]
source = "/tour/:path*"
destination = "https://tours.example.com/:path*"
"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.proxy.rewrites.len(), 1);
        assert_eq!(config.proxy.rewrites[0].prefix(), "/tour");
    }

    #[test]
    fn invalid_rewrite_is_proxy_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[[proxy.rewrites]]
source = "/tour"
destination = "https://tours.example.com/:path*"
"#,
        )
        .unwrap();
        assert!(matches!(
            load_config(tmp.path()),
            Err(ConfigError::Proxy(ProxyError::BadSource(_)))
        ));
    }

    // =========================================================================
    // Processing config tests
    // =========================================================================

    #[test]
    fn default_processing_config() {
        let config = ProcessingConfig::default();
        assert_eq!(config.max_processes, None);
    }

    #[test]
    fn effective_threads_auto() {
        let config = ProcessingConfig {
            max_processes: None,
        };
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_processes: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"quality = 90"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"quality = 70"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("quality").unwrap().as_integer(), Some(70));
    }

    #[test]
    fn merge_toml_deep_nested() {
        let base: toml::Value = toml::from_str(
            r#"
[carousels.units]
interval_ms = 5500
cooldown_ms = 10000
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[carousels.units]
cooldown_ms = 12000
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let units = merged.get("carousels").unwrap().get("units").unwrap();
        assert_eq!(units.get("cooldown_ms").unwrap().as_integer(), Some(12000));
        assert_eq!(units.get("interval_ms").unwrap().as_integer(), Some(5500));
    }

    #[test]
    fn merge_toml_array_replaces() {
        let base: toml::Value = toml::from_str(r#"sizes = [640, 1280, 1920]"#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"sizes = [800]"#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("sizes").unwrap().as_array().unwrap().len(), 1);
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let toml_str = r#"
[images]
qualty = 90
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn unknown_nested_key_rejected() {
        let toml_str = r#"
[carousels.units]
interval = 5000
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn unknown_carousel_rejected() {
        let toml_str = r#"
[carousels.hero]
interval_ms = 5000
"#;
        let result: Result<SiteConfig, _> = toml::from_str(toml_str);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(SiteConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_quality_too_high() {
        let mut config = SiteConfig::default();
        config.images.quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("quality"));
    }

    #[test]
    fn validate_sizes() {
        let mut config = SiteConfig::default();
        config.images.sizes = vec![];
        assert!(config.validate().is_err());
        config.images.sizes = vec![0, 800];
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_zero_interval() {
        let mut config = SiteConfig::default();
        config.carousels.facilities.interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("carousels.facilities.interval_ms"));
    }

    #[test]
    fn validate_thresholds() {
        let mut config = SiteConfig::default();
        config.reveal.threshold = 1.5;
        assert!(config.validate().unwrap_err().to_string().contains("reveal.threshold"));

        let mut config = SiteConfig::default();
        config.navigation.rail.threshold = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            r#"
[images]
quality = 200
"#,
        )
        .unwrap();
        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        assert!(load_raw_config(tmp.path()).unwrap().is_none());
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        let defaults = SiteConfig::default();
        assert_eq!(config.images.sizes, defaults.images.sizes);
        assert_eq!(config.images.quality, defaults.images.quality);
        assert_eq!(config.colors.glass_border, defaults.colors.glass_border);
        assert_eq!(config.carousels.gallery, defaults.carousels.gallery);
        assert_eq!(config.reveal, defaults.reveal);
        assert_eq!(config.navigation.navbar, defaults.navigation.navbar);
        assert_eq!(config.navigation.rail, defaults.navigation.rail);
        assert_eq!(config.lead, defaults.lead);
        assert_eq!(config.proxy.rewrites, defaults.proxy.rewrites);
    }

    #[test]
    fn stock_config_toml_contains_all_sections() {
        let content = stock_config_toml();
        for section in [
            "[colors]",
            "[images]",
            "[processing]",
            "[carousels.location]",
            "[carousels.units]",
            "[carousels.facilities]",
            "[carousels.gallery]",
            "[reveal]",
            "[navigation]",
            "[navigation.navbar]",
            "[navigation.rail]",
            "[hero]",
            "[lead]",
            "[[proxy.rewrites]]",
        ] {
            assert!(content.contains(section), "missing {section}");
        }
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value();
        assert!(val.is_table());
        for key in ["colors", "images", "carousels", "reveal", "navigation", "lead", "proxy"] {
            assert!(val.get(key).is_some(), "missing {key}");
        }
    }
}
