//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (section, slide, unit, gallery picture) is its semantic
//! identity: positional index and caption. Content paths and URLs are
//! secondary context on indented `Source:` / `URL:` lines, so the output
//! reads as an inventory of the page while still pointing at the files.
//!
//! # Entity Display Contract
//!
//! Every entity follows the same two-level pattern across all stages:
//!
//! 1. **Header line**: positional index + title (+ optional count)
//! 2. **Context lines**: indented `Source:`, `URL:`, `Embed:`, variant status
//!
//! Shared helpers ([`entity_header`], [`image_line`]) keep scan, process and
//! generate output consistent for the same entities.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Sections
//! 001 Home (1 image)
//!     001 (hero.jpg)
//!         Source: images/hero.jpg
//!     Embed: /pano-viewer.html
//! 002 Location (3 slides)
//!     001 Bukit Bintang at your door
//!         Source: images/bukit-bintang.jpg
//!     003 KL by night
//!         URL: /media/renders/kl-night.webp → https://pavilionsquarekl.com/ISP/media/renders/kl-night.webp
//!
//! Gallery (3 photos)
//! 001 Grand Lobby
//!     Source: gallery/010-Grand-Lobby.jpg
//!
//! Config
//!     config.toml
//!     assets/
//!     2 rewrite rules
//! ```
//!
//! ## Process
//!
//! ```text
//! Location (2 images)
//!     001 Bukit Bintang at your door
//!         Source: images/bukit-bintang.jpg
//!         640px: cached
//!         1280px: encoded
//! ```
//!
//! ## Generate
//!
//! ```text
//! index.html
//!     001 Home → #hero
//!     002 Location → #location
//! _redirects (2 rules)
//! Generated 1 page, 7 sections, 21 image variants
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects, except the scan listing which checks whether
//! `config.toml` and the assets directory exist.

use crate::interaction::{Normalization, NormalizationMode, ViewportProfile};
use crate::proxy::{self, RewriteRule};
use crate::types::{RefKind, SiteContent, classify_ref, ref_path};
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 slide`, `3 slides`.
fn counted(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Format an entity header: positional index + title, with optional count.
///
/// ```text
/// 002 Location (3 slides)
/// 007 Gallery
/// ```
fn entity_header(index: usize, title: &str, count: Option<(usize, &str)>) -> String {
    match count {
        Some((n, noun)) => format!("{} {} ({})", format_index(index), title, counted(n, noun)),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Format an image line: captioned images show the caption, others show the
/// filename in parens.
///
/// ```text
/// 001 Sky Deck          // captioned
/// 001 (hero.jpg)        // uncaptioned: filename IS the identity
/// ```
fn image_line(index: usize, title: Option<&str>, filename: &str) -> String {
    match title {
        Some(t) if !t.is_empty() => format!("{} {}", format_index(index), t),
        _ => format!("{} ({})", format_index(index), filename),
    }
}

/// Last path segment of a reference, without query.
fn file_name(reference: &str) -> &str {
    let path = ref_path(reference);
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Context line for a reference: local path, or URL with its rewrite target.
fn reference_context(reference: &str, rules: &[RewriteRule]) -> String {
    match classify_ref(reference) {
        RefKind::Local => format!("Source: {}", reference),
        RefKind::SiteAbsolute => match proxy::resolve(rules, ref_path(reference)) {
            Some(dest) => format!("URL: {} \u{2192} {}", reference, dest),
            None => format!("URL: {}", reference),
        },
        RefKind::External => format!("URL: {}", reference),
    }
}

/// Lines for one picture: header plus indented context.
fn picture_lines(
    depth: usize,
    index: usize,
    caption: Option<&str>,
    reference: &str,
    rules: &[RewriteRule],
) -> Vec<String> {
    vec![
        format!(
            "{}{}",
            indent(depth),
            image_line(index, caption, file_name(reference))
        ),
        format!("{}{}", indent(depth + 1), reference_context(reference, rules)),
    ]
}

/// Captioned pictures of a section, and what to call them.
fn section_pictures<'a>(
    site: &'a SiteContent,
    id: &str,
) -> (&'static str, Vec<(Option<&'a str>, &'a str)>) {
    match id {
        "hero" => (
            "image",
            site.hero
                .iter()
                .map(|h| (None, h.image.as_str()))
                .collect(),
        ),
        "location" => (
            "slide",
            site.location
                .iter()
                .flat_map(|l| &l.slides)
                .map(|s| (Some(s.headline.as_str()), s.image.as_str()))
                .collect(),
        ),
        "units" => (
            "unit",
            site.units
                .iter()
                .flat_map(|u| u.all())
                .map(|u| (Some(u.code.as_str()), u.image.as_str()))
                .collect(),
        ),
        "facilities" => (
            "level",
            site.facilities
                .iter()
                .flat_map(|f| &f.levels)
                .map(|l| (Some(l.headline.as_str()), l.image.as_str()))
                .collect(),
        ),
        "virtual-tour" => (
            "preview",
            site.virtual_tour
                .iter()
                .flat_map(|t| &t.previews)
                .filter_map(|c| Some((Some(c.title.as_str()), c.image.as_deref()?)))
                .collect(),
        ),
        "concierge" => (
            "service",
            site.concierge
                .iter()
                .flat_map(|c| &c.services)
                .filter_map(|c| Some((Some(c.title.as_str()), c.image.as_deref()?)))
                .collect(),
        ),
        _ => ("", Vec::new()),
    }
}

/// Iframe embedded in a section, if any.
fn section_embed<'a>(site: &'a SiteContent, id: &str) -> Option<&'a str> {
    match id {
        "hero" => site.hero.as_ref()?.panorama_url.as_deref(),
        "virtual-tour" => site.virtual_tour.as_ref().map(|t| t.tour_url.as_str()),
        _ => None,
    }
}

// ============================================================================
// Stage 1: Scan output
// ============================================================================

/// Format scan stage output showing the discovered page structure.
///
/// Information-first: each section leads with its positional index and nav
/// label; pictures and embeds are indented beneath it.
pub fn format_scan_output(manifest: &crate::scan::Manifest, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let site = &manifest.site;
    let rules = &manifest.config.proxy.rewrites;

    lines.push("Sections".to_string());
    for (i, item) in manifest.navigation.iter().enumerate() {
        let (noun, pictures) = section_pictures(site, &item.id);
        let count = (!pictures.is_empty()).then_some((pictures.len(), noun));
        lines.push(entity_header(i + 1, &item.title, count));

        for (j, (caption, reference)) in pictures.iter().enumerate() {
            lines.extend(picture_lines(1, j + 1, *caption, reference, rules));
        }
        if let Some(embed) = section_embed(site, &item.id) {
            let context = reference_context(embed, rules).replacen("URL", "Embed", 1);
            lines.push(format!("{}{}", indent(1), context));
        }
        if item.id == "contact"
            && let Some(contact) = &site.contact
        {
            let interests: Vec<&str> = contact.interests.iter().map(|c| c.label.as_str()).collect();
            lines.push(format!("{}Interests: {}", indent(1), interests.join(", ")));
            if let Some(intro) = &contact.intro {
                lines.push(format!("{}{}", indent(1), truncate_desc(intro.trim(), 60)));
            }
        }
    }

    if !manifest.gallery.is_empty() {
        lines.push(String::new());
        lines.push(format!("Gallery ({})", counted(manifest.gallery.len(), "photo")));
        for (i, image) in manifest.gallery.iter().enumerate() {
            lines.extend(picture_lines(
                0,
                i + 1,
                Some(image.label.as_str()),
                &image.image,
                rules,
            ));
        }
    }

    // Config section
    lines.push(String::new());
    lines.push("Config".to_string());
    let config_path = source_root.join("config.toml");
    if config_path.exists() {
        lines.push("    config.toml".to_string());
    }
    let assets_path = source_root.join(&manifest.config.assets_dir);
    if assets_path.is_dir() {
        lines.push(format!("    {}/", manifest.config.assets_dir));
    }
    if !rules.is_empty() {
        lines.push(format!("    {}", counted(rules.len(), "rewrite rule")));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manifest: &crate::scan::Manifest, source_root: &Path) {
    for line in format_scan_output(manifest, source_root) {
        println!("{}", line);
    }
}

// ============================================================================
// Stage 2: Process output
// ============================================================================

/// Format a single process progress event as display lines.
///
/// Information-first: each image leads with its positional index and caption.
/// Source path and per-variant cache status are shown as indented context.
pub fn format_process_event(event: &crate::process::ProcessEvent) -> Vec<String> {
    use crate::process::{ProcessEvent, VariantStatus};
    match event {
        ProcessEvent::SectionStarted { title, image_count } => {
            vec![format!("{} ({})", title, counted(*image_count, "image"))]
        }
        ProcessEvent::ImageProcessed {
            index,
            title,
            source_path,
            variants,
        } => {
            let mut lines = Vec::new();
            lines.push(format!(
                "    {}",
                image_line(*index, title.as_deref(), file_name(source_path))
            ));
            lines.push(format!("        Source: {}", source_path));

            for variant in variants {
                let status_str = match &variant.status {
                    VariantStatus::Cached => "cached",
                    VariantStatus::Copied => "copied",
                    VariantStatus::Encoded => "encoded",
                };
                lines.push(format!("        {}: {}", variant.label, status_str));
            }
            lines
        }
    }
}

// ============================================================================
// Stage 3: Generate output
// ============================================================================

/// Format generate stage output showing the page and its anchors.
///
/// Information-first: each section leads with its positional index and nav
/// label, followed by `→` and its anchor.
pub fn format_generate_output(manifest: &crate::generate::Manifest) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("index.html".to_string());
    for (i, item) in manifest.navigation.iter().enumerate() {
        lines.push(format!(
            "    {} \u{2192} {}",
            entity_header(i + 1, &item.title, None),
            item.href()
        ));
    }

    let rules = &manifest.config.proxy.rewrites;
    if !rules.is_empty() {
        lines.push(format!(
            "{} ({})",
            crate::generate::REDIRECTS_FILE,
            counted(rules.len(), "rule")
        ));
    }

    let variant_count: usize = manifest.images.values().map(|i| i.variants.len()).sum();
    lines.push(format!(
        "Generated 1 page, {}, {}",
        counted(manifest.navigation.len(), "section"),
        counted(variant_count, "image variant")
    ));

    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(manifest: &crate::generate::Manifest) {
    for line in format_generate_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Viewport diagnostics
// ============================================================================

/// Format the normalizer's decision for one window size.
///
/// ```text
/// Viewport 900 inner, 1920 outer, 1920 screen
///     Mode: zoom compensated (ratio 2.1111)
///     Font size: 14px
///     Zoom: 0.4737
/// ```
pub fn format_normalization(profile: &ViewportProfile, result: &Normalization) -> Vec<String> {
    let mode = match result.mode {
        NormalizationMode::Mobile => "mobile".to_string(),
        NormalizationMode::Fluid => "fluid".to_string(),
        NormalizationMode::ZoomCompensated => match profile.zoom_ratio() {
            Some(ratio) => format!("zoom compensated (ratio {:.4})", ratio),
            None => "zoom compensated".to_string(),
        },
    };
    vec![
        format!(
            "Viewport {} inner, {} outer, {} screen",
            profile.inner_width, profile.outer_width, profile.screen_width
        ),
        format!("    Mode: {}", mode),
        format!("    Font size: {}", result.font_size_css()),
        format!(
            "    Zoom: {}",
            result.zoom_css().unwrap_or_else(|| "none".to_string())
        ),
    ]
}

/// Print normalizer output to stdout.
pub fn print_normalization(profile: &ViewportProfile, result: &Normalization) {
    for line in format_normalization(profile, result) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::normalize;
    use crate::scan::scan;
    use crate::test_helpers::*;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn truncate_desc_short() {
        assert_eq!(truncate_desc("Short text", 40), "Short text");
    }

    #[test]
    fn truncate_desc_exact() {
        let text = "a".repeat(40);
        assert_eq!(truncate_desc(&text, 40), text);
    }

    #[test]
    fn truncate_desc_long() {
        let text = "a".repeat(50);
        let expected = format!("{}...", "a".repeat(40));
        assert_eq!(truncate_desc(&text, 40), expected);
    }

    #[test]
    fn truncate_desc_multibyte() {
        assert_eq!(truncate_desc("360° Tour", 4), "360°...");
    }

    #[test]
    fn format_index_padding() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn counted_pluralizes() {
        assert_eq!(counted(1, "slide"), "1 slide");
        assert_eq!(counted(0, "slide"), "0 slides");
        assert_eq!(counted(3, "rewrite rule"), "3 rewrite rules");
    }

    // =========================================================================
    // Entity display helper tests
    // =========================================================================

    #[test]
    fn entity_header_with_count() {
        assert_eq!(
            entity_header(2, "Location", Some((3, "slide"))),
            "002 Location (3 slides)"
        );
    }

    #[test]
    fn entity_header_without_count() {
        assert_eq!(entity_header(7, "Gallery", None), "007 Gallery");
    }

    #[test]
    fn image_line_with_title() {
        assert_eq!(
            image_line(1, Some("Sky Deck"), "level-67.jpg"),
            "001 Sky Deck"
        );
    }

    #[test]
    fn image_line_without_title() {
        assert_eq!(image_line(1, None, "hero.jpg"), "001 (hero.jpg)");
        assert_eq!(image_line(1, Some(""), "hero.jpg"), "001 (hero.jpg)");
    }

    #[test]
    fn file_name_ignores_query() {
        assert_eq!(file_name("/pano-viewer.html?nowheel=1"), "pano-viewer.html");
        assert_eq!(file_name("images/hero.jpg"), "hero.jpg");
    }

    #[test]
    fn reference_context_resolves_rewrites() {
        let rules = proxy::default_rules();
        assert_eq!(
            reference_context("images/a.jpg", &rules),
            "Source: images/a.jpg"
        );
        assert_eq!(
            reference_context("/media/a.webp", &rules),
            "URL: /media/a.webp \u{2192} https://pavilionsquarekl.com/ISP/media/a.webp"
        );
        assert_eq!(
            reference_context("/pano-viewer.html", &rules),
            "URL: /pano-viewer.html"
        );
    }

    // =========================================================================
    // Scan output tests
    // =========================================================================

    #[test]
    fn scan_output_lists_sections_with_pictures() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest, tmp.path());

        assert_eq!(lines[0], "Sections");
        assert_eq!(lines[1], "001 Home (1 image)");
        assert_eq!(lines[2], "    001 (hero.png)");
        assert_eq!(lines[3], "        Source: images/hero.png");
        assert_eq!(lines[4], "    Embed: /pano-viewer.html");
        assert_eq!(lines[5], "002 Location (3 slides)");
        assert!(lines.contains(&"    001 Bukit Bintang at your door".to_string()));
        assert!(lines.iter().any(|l| l.starts_with(
            "        URL: /media/renders/kl-night.webp \u{2192} https://pavilionsquarekl.com/"
        )));
        assert!(lines.contains(&"003 Units (3 units)".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("    Embed: /isp-proxy/vt/")));
        assert!(lines.contains(&"    Interests: Studio, 2 Bedrooms, Corporate Suite".to_string()));
    }

    #[test]
    fn scan_output_lists_gallery_and_config() {
        let tmp = setup_fixtures();
        let manifest = scan(tmp.path()).unwrap();
        let lines = format_scan_output(&manifest, tmp.path());

        let gallery = lines.iter().position(|l| l == "Gallery (3 photos)").unwrap();
        assert_eq!(lines[gallery + 1], "001 Grand Lobby");
        assert_eq!(lines[gallery + 2], "    Source: gallery/010-Grand-Lobby.png");
        assert!(lines.contains(&"003 Residential Drop-off".to_string()));

        let config = lines.iter().position(|l| l == "Config").unwrap();
        assert_eq!(lines[config + 1], "    config.toml");
        assert_eq!(lines[config + 2], "    assets/");
        assert_eq!(lines[config + 3], "    2 rewrite rules");
    }

    // =========================================================================
    // Process event formatting tests
    // =========================================================================

    #[test]
    fn format_process_section_started() {
        use crate::process::ProcessEvent;
        let event = ProcessEvent::SectionStarted {
            title: "Location".to_string(),
            image_count: 2,
        };
        assert_eq!(format_process_event(&event), vec!["Location (2 images)"]);
    }

    #[test]
    fn format_process_image_with_title() {
        use crate::process::{ProcessEvent, VariantInfo, VariantStatus};
        let event = ProcessEvent::ImageProcessed {
            index: 1,
            title: Some("Sky Deck".to_string()),
            source_path: "images/level-67.jpg".to_string(),
            variants: vec![
                VariantInfo {
                    label: "640px".to_string(),
                    status: VariantStatus::Cached,
                },
                VariantInfo {
                    label: "1280px".to_string(),
                    status: VariantStatus::Encoded,
                },
                VariantInfo {
                    label: "1920px".to_string(),
                    status: VariantStatus::Copied,
                },
            ],
        };
        let lines = format_process_event(&event);
        assert_eq!(lines[0], "    001 Sky Deck");
        assert_eq!(lines[1], "        Source: images/level-67.jpg");
        assert_eq!(lines[2], "        640px: cached");
        assert_eq!(lines[3], "        1280px: encoded");
        assert_eq!(lines[4], "        1920px: copied");
    }

    #[test]
    fn format_process_image_without_title() {
        use crate::process::{ProcessEvent, VariantInfo, VariantStatus};
        let event = ProcessEvent::ImageProcessed {
            index: 1,
            title: None,
            source_path: "images/hero.jpg".to_string(),
            variants: vec![VariantInfo {
                label: "640px".to_string(),
                status: VariantStatus::Cached,
            }],
        };
        let lines = format_process_event(&event);
        assert_eq!(lines[0], "    001 (hero.jpg)");
        assert_eq!(lines[1], "        Source: images/hero.jpg");
    }

    // =========================================================================
    // Generate output tests
    // =========================================================================

    #[test]
    fn generate_output_lists_anchors() {
        let tmp = setup_fixtures();
        let scanned = scan(tmp.path()).unwrap();
        let manifest = crate::generate::Manifest {
            navigation: scanned.navigation,
            site: scanned.site,
            gallery: scanned.gallery,
            images: Default::default(),
            config: scanned.config,
        };
        let lines = format_generate_output(&manifest);
        assert_eq!(lines[0], "index.html");
        assert_eq!(lines[1], "    001 Home \u{2192} #hero");
        assert_eq!(lines[5], "    005 360° Tour \u{2192} #virtual-tour");
        assert_eq!(lines[8], "_redirects (2 rules)");
        assert_eq!(
            lines.last().unwrap(),
            "Generated 1 page, 7 sections, 0 image variants"
        );
    }

    // =========================================================================
    // Normalizer output tests
    // =========================================================================

    #[test]
    fn normalization_fluid() {
        let profile = ViewportProfile::new(1200.0, 1200.0, 1920.0);
        let lines = format_normalization(&profile, &normalize(&profile));
        assert_eq!(
            lines,
            vec![
                "Viewport 1200 inner, 1200 outer, 1920 screen",
                "    Mode: fluid",
                "    Font size: 11.75px",
                "    Zoom: none",
            ]
        );
    }

    #[test]
    fn normalization_zoom_compensated() {
        let profile = ViewportProfile::new(900.0, 1920.0, 1920.0);
        let lines = format_normalization(&profile, &normalize(&profile));
        assert_eq!(lines[1], "    Mode: zoom compensated (ratio 2.1111)");
        assert_eq!(lines[2], "    Font size: 14px");
        assert_eq!(lines[3], "    Zoom: 0.4737");
    }

    #[test]
    fn normalization_mobile() {
        let profile = ViewportProfile::new(500.0, 500.0, 500.0);
        let lines = format_normalization(&profile, &normalize(&profile));
        assert_eq!(lines[1], "    Mode: mobile");
        assert_eq!(lines[2], "    Font size: 14px");
    }
}
