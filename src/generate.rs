//! HTML site generation.
//!
//! Stage 3 of the build pipeline. Takes the processed manifest and writes the
//! single-page site.
//!
//! ## Page Layout
//!
//! One `index.html` with, in order:
//!
//! - **Navbar**: brand, anchor links to each present section, the
//!   "Book Viewing" call to action
//! - **Progress rail**: scroll progress bar and one dot per section
//! - **Sections**: hero, location, units, facilities, virtual tour,
//!   concierge, contact (gallery, contact lines, lead form)
//! - **Footer** and the gallery lightbox
//!
//! Section headings are inline Markdown, so `Life *Above* the City` renders
//! the accent word in gold. Descriptions and intros are full Markdown.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── _redirects               # Rewrite rules for the tour/media host
//! ├── images/                  # Processed variants (copied)
//! │   ├── hero-640.avif
//! │   └── ...
//! ├── gallery/
//! │   └── 010-Grand-Lobby-640.avif
//! └── pano-viewer.html         # From assets/, copied verbatim
//! ```
//!
//! ## CSS and JavaScript
//!
//! Embedded at compile time and inlined into the page:
//! - `static/style.css`: base styles (palette injected from config)
//! - `static/site.js`: carousels, reveals, active section, viewport
//!   normalizer, lead form
//!
//! The script reads every timing, threshold and validation rule from the
//! `site-runtime` JSON block built by [`crate::runtime`].
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Text from `site.toml` is escaped; only Markdown output is inserted raw.

use crate::config;
use crate::interaction::Field;
use crate::process::{OutputManifest, ProcessedImage};
use crate::proxy;
use crate::runtime::{PageRuntime, RUNTIME_ELEMENT_ID};
use crate::types::{
    Card, Concierge, Contact, Facilities, FacilityLevel, Footer, GalleryImage, Hero, Location,
    Meta, NavItem, Unit, UnitTab, Units, VirtualTour,
};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Processed manifest from stage 2
pub type Manifest = OutputManifest;

/// Rewrite rules file written next to `index.html`.
pub const REDIRECTS_FILE: &str = "_redirects";

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

type Images = BTreeMap<String, ProcessedImage>;

pub fn generate(
    manifest_path: &Path,
    processed_dir: &Path,
    output_dir: &Path,
    source_root: &Path,
) -> Result<(), GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let manifest: Manifest = serde_json::from_str(&manifest_content)?;

    // Generate CSS with colors from config
    let color_css = config::generate_color_css(&manifest.config.colors);
    let css = format!("{}\n\n{}", color_css, CSS_STATIC);

    fs::create_dir_all(output_dir)?;

    // Processed variants, then assets (which may add pano-viewer.html etc.)
    copy_tree(processed_dir, output_dir)?;
    let assets = source_root.join(&manifest.config.assets_dir);
    if assets.is_dir() {
        copy_tree(&assets, output_dir)?;
    }

    let runtime = PageRuntime::new(&manifest.config, &manifest.site, manifest.gallery.len());
    let page = render_page(&manifest, &css, &runtime.to_embedded_json()?);
    fs::write(output_dir.join("index.html"), page.into_string())?;

    let rules = &manifest.config.proxy.rewrites;
    if !rules.is_empty() {
        fs::write(
            output_dir.join(REDIRECTS_FILE),
            proxy::render_redirects(rules),
        )?;
    }

    Ok(())
}

/// Copy every file under `src` into `dst`, skipping JSON manifests.
fn copy_tree(src: &Path, dst: &Path) -> Result<(), GenerateError> {
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.path().extension().map(|e| e != "json").unwrap_or(true) {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// ============================================================================
// Markdown
// ============================================================================

fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Block Markdown for intros and descriptions.
fn markdown(text: &str) -> Markup {
    PreEscaped(markdown_to_html(text))
}

/// Inline Markdown for headings: no wrapping paragraph.
fn inline_markdown(text: &str) -> Markup {
    let rendered = markdown_to_html(text);
    let trimmed = rendered.trim();
    let inner = trimmed
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .unwrap_or(trimmed);
    PreEscaped(inner.to_string())
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(meta: &Meta, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (meta.title) }
                meta name="description" content=(meta.description);
                meta property="og:title" content=(meta.title);
                meta property="og:description" content=(meta.description);
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Fixed navbar: brand, section anchors and the booking link.
///
/// The hamburger is a checkbox toggle so the menu opens without script.
pub fn render_nav(meta: &Meta, items: &[NavItem]) -> Markup {
    let home = items.first().map(NavItem::href).unwrap_or_else(|| "#".to_string());
    html! {
        header.navbar data-navbar {
            a.brand href=(home) { (meta.brand) }
            input.nav-toggle type="checkbox" id="nav-toggle";
            label.nav-hamburger for="nav-toggle" aria-label="Menu" {
                span.hamburger-line {}
                span.hamburger-line {}
                span.hamburger-line {}
            }
            nav.nav-panel {
                ul {
                    @for (i, item) in items.iter().enumerate() {
                        li {
                            a.nav-link.active[i == 0] href=(item.href()) data-nav=(item.id) {
                                (item.title)
                            }
                        }
                    }
                }
                @if let Some(booking) = &meta.booking {
                    a.btn.btn-gold.nav-cta href=(booking.href) target="_blank" rel="noopener" {
                        (booking.label)
                    }
                }
            }
        }
    }
}

/// Scroll progress bar plus one dot per section.
fn render_progress_rail(items: &[NavItem]) -> Markup {
    html! {
        div.progress-bar aria-hidden="true" {
            div.progress-fill data-progress {}
        }
        nav.progress-rail aria-label="Sections" {
            @for (i, item) in items.iter().enumerate() {
                a.rail-dot.active[i == 0] href=(item.href()) data-rail=(item.id) title=(item.title) {
                    span.rail-label { (item.title) }
                }
            }
        }
    }
}

fn section_header(eyebrow: Option<&str>, heading: &str, intro: Option<&str>) -> Markup {
    html! {
        header.section-header data-reveal {
            @if let Some(eyebrow) = eyebrow {
                p.eyebrow { (eyebrow) }
            }
            h2 { (inline_markdown(heading)) }
            @if let Some(intro) = intro {
                div.section-intro { (markdown(intro)) }
            }
        }
    }
}

/// Responsive `<picture>` for processed images, plain `<img>` for URLs.
fn picture(images: &Images, reference: &str, alt: &str, sizes: &str, lazy: bool) -> Markup {
    let loading = if lazy { "lazy" } else { "eager" };
    match images.get(reference).and_then(|p| Some((p, p.largest()?))) {
        Some((processed, largest)) => html! {
            picture {
                source type="image/avif" srcset=(processed.srcset()) sizes=(sizes);
                img src=(largest.path) alt=(alt)
                    width=(processed.dimensions.0) height=(processed.dimensions.1)
                    loading=(loading) decoding="async";
            }
        },
        None => html! {
            img src=(reference) alt=(alt) loading=(loading) decoding="async";
        },
    }
}

/// Largest available rendition, for the lightbox.
fn full_src(images: &Images, reference: &str) -> String {
    images
        .get(reference)
        .and_then(ProcessedImage::largest)
        .map(|v| v.path.clone())
        .unwrap_or_else(|| reference.to_string())
}

/// Slide track; the first slide starts active.
fn slides(items: Vec<Markup>) -> Markup {
    html! {
        div.carousel-track {
            @for (i, item) in items.into_iter().enumerate() {
                div.slide.active[i == 0] data-slide=(i) {
                    (item)
                }
            }
        }
    }
}

fn dots(labels: &[&str]) -> Markup {
    html! {
        div.carousel-dots {
            @for (i, label) in labels.iter().enumerate() {
                button.dot.active[i == 0] type="button" data-carousel-go=(i) aria-label=(label) {}
            }
        }
    }
}

fn carousel_controls() -> Markup {
    html! {
        button.carousel-prev type="button" data-carousel-prev aria-label="Previous" { "‹" }
        button.carousel-next type="button" data-carousel-next aria-label="Next" { "›" }
    }
}

fn render_card(card: &Card, images: &Images) -> Markup {
    html! {
        article.card data-reveal-item {
            @if let Some(image) = &card.image {
                div.card-image {
                    (picture(images, image, &card.title, "(max-width: 640px) 100vw, 33vw", true))
                }
            }
            div.card-body {
                h3 { (card.title) }
                div.card-text { (markdown(&card.description)) }
            }
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

fn render_hero(hero: &Hero, images: &Images) -> Markup {
    let alt = format!("{} {}", hero.title_lead, hero.title_accent);
    html! {
        section.hero id="hero" data-section {
            div.hero-media {
                (picture(images, &hero.image, &alt, "100vw", false))
                @if let Some(url) = &hero.panorama_url {
                    div.hero-panorama data-panorama-src=(url) {}
                }
                div.hero-overlay {}
            }
            div.hero-content {
                h1.hero-title {
                    span.title-lead { (hero.title_lead) }
                    " "
                    span.title-accent { (hero.title_accent) }
                }
                div.hero-ctas {
                    a.btn.btn-gold href=(hero.primary_cta.href) { (hero.primary_cta.label) }
                    a.btn.btn-outline href=(hero.secondary_cta.href) { (hero.secondary_cta.label) }
                }
                @if !hero.stats.is_empty() {
                    dl.hero-stats data-reveal-group {
                        @for stat in &hero.stats {
                            div.stat data-reveal-item {
                                dt { (stat.value) }
                                dd { (stat.label) }
                            }
                        }
                    }
                }
            }
            @if !hero.marquee.is_empty() {
                div.marquee aria-hidden="true" {
                    div.marquee-track {
                        // Two copies so the loop has no gap
                        @for _ in 0..2 {
                            @for item in &hero.marquee {
                                span.marquee-item { (item) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_location(location: &Location, images: &Images) -> Markup {
    let labels: Vec<&str> = location.slides.iter().map(|s| s.headline.as_str()).collect();
    let items = location
        .slides
        .iter()
        .map(|slide| {
            html! {
                figure.location-slide {
                    (picture(images, &slide.image, &slide.headline, "100vw", true))
                    figcaption {
                        h3 { (slide.headline) }
                        @if let Some(sub) = &slide.sub {
                            p { (sub) }
                        }
                    }
                }
            }
        })
        .collect();

    html! {
        section.location id="location" data-section {
            (section_header(location.eyebrow.as_deref(), &location.heading, location.intro.as_deref()))
            div.carousel.location-slider data-carousel="location" {
                (slides(items))
                @if location.slides.len() > 1 {
                    (carousel_controls())
                    (dots(&labels))
                }
            }
            @if !location.facts.is_empty() {
                div.facts data-reveal-group {
                    @for fact in &location.facts {
                        div.fact data-reveal-item {
                            span.fact-value { (fact.value) }
                            span.fact-label { (fact.label) }
                        }
                    }
                }
            }
            @if !location.connectivity.is_empty() {
                ul.connectivity data-reveal {
                    @for landmark in &location.connectivity {
                        li.landmark.highlight[landmark.highlight] {
                            span.landmark-name { (landmark.name) }
                            span.landmark-detail { (landmark.detail) }
                        }
                    }
                }
            }
        }
    }
}

fn render_unit(unit: &Unit, images: &Images) -> Markup {
    let alt = format!("{} floor plan", unit.code);
    html! {
        article.unit-card.highlight[unit.highlight] {
            div.unit-image {
                (picture(images, &unit.image, &alt, "(max-width: 640px) 100vw, 50vw", true))
            }
            div.unit-body {
                p.unit-code { (unit.code) }
                h3 { (unit.label) }
                dl.unit-specs {
                    div { dt { "Size" } dd { (unit.sqft) " sq ft · " (unit.sqm) " m²" } }
                    div { dt { "Bedrooms" } dd { (unit.beds_label()) } }
                    div { dt { "Bathrooms" } dd { (unit.baths) } }
                    div { dt { "Floors" } dd { (unit.floors) } }
                }
                @if !unit.features.is_empty() {
                    ul.unit-features {
                        @for feature in &unit.features {
                            li { (feature) }
                        }
                    }
                }
                p.unit-price { (unit.price) }
            }
        }
    }
}

fn render_catalog(units: &Units, tab: UnitTab, visible: bool, images: &Images) -> Markup {
    let catalog = units.catalog(tab);
    let labels: Vec<&str> = catalog.iter().map(|u| u.code.as_str()).collect();
    html! {
        div.unit-catalog data-catalog=(tab.key()) hidden[!visible] {
            (slides(catalog.iter().map(|u| render_unit(u, images)).collect()))
            (dots(&labels))
        }
    }
}

/// Unit catalogs share one carousel; switching tabs swaps the slide set.
fn render_units(units: &Units, images: &Images) -> Markup {
    let tabs = units.tabs();
    html! {
        section.units id="units" data-section {
            (section_header(units.eyebrow.as_deref(), &units.heading, units.intro.as_deref()))
            @if tabs.len() > 1 {
                div.unit-tabs role="tablist" {
                    @for (i, tab) in tabs.iter().enumerate() {
                        button.unit-tab.active[i == 0] type="button" role="tab"
                            data-unit-tab=(tab.key()) aria-selected=(if i == 0 { "true" } else { "false" }) {
                            (tab.label())
                        }
                    }
                }
            }
            div.carousel.unit-slider data-carousel="units" {
                @for (i, tab) in tabs.iter().enumerate() {
                    (render_catalog(units, *tab, i == 0, images))
                }
                (carousel_controls())
            }
        }
    }
}

fn render_level(level: &FacilityLevel, images: &Images) -> Markup {
    html! {
        article.facility-level data-level=(level.id) {
            div.facility-image {
                (picture(images, &level.image, &level.headline, "(max-width: 640px) 100vw, 60vw", true))
            }
            div.facility-body {
                p.level-label { (level.level) }
                h3 { (level.headline) }
                p.tagline { (level.tagline) }
                div.facility-description { (markdown(&level.description)) }
                div.facility-stat {
                    span.stat-value { (level.stat.value) }
                    span.stat-label { (level.stat.label) }
                }
                @if !level.features.is_empty() {
                    ul.facility-features {
                        @for feature in &level.features {
                            li { (feature) }
                        }
                    }
                }
            }
        }
    }
}

/// Level buttons double as the carousel's dots.
fn render_facilities(facilities: &Facilities, images: &Images) -> Markup {
    html! {
        section.facilities id="facilities" data-section {
            (section_header(facilities.eyebrow.as_deref(), &facilities.heading, facilities.intro.as_deref()))
            div.carousel.facility-slider data-carousel="facilities" {
                div.level-tabs {
                    @for (i, level) in facilities.levels.iter().enumerate() {
                        button.dot.level-tab.active[i == 0] type="button" data-carousel-go=(i) {
                            (level.level)
                        }
                    }
                }
                (slides(facilities.levels.iter().map(|l| render_level(l, images)).collect()))
                (carousel_controls())
            }
        }
    }
}

fn render_virtual_tour(tour: &VirtualTour, images: &Images) -> Markup {
    html! {
        section.virtual-tour id="virtual-tour" data-section {
            (section_header(tour.eyebrow.as_deref(), &tour.heading, tour.intro.as_deref()))
            div.tour-frame data-reveal {
                iframe src=(tour.tour_url) title="Virtual tour" loading="lazy"
                    allow="fullscreen; xr-spatial-tracking" allowfullscreen {}
            }
            @if !tour.features.is_empty() {
                div.card-grid.tour-features data-reveal-group {
                    @for card in &tour.features {
                        (render_card(card, images))
                    }
                }
            }
            @if !tour.previews.is_empty() {
                div.card-grid.tour-previews data-reveal-group {
                    @for card in &tour.previews {
                        (render_card(card, images))
                    }
                }
            }
        }
    }
}

fn render_concierge(concierge: &Concierge, images: &Images) -> Markup {
    html! {
        section.concierge id="concierge" data-section {
            (section_header(concierge.eyebrow.as_deref(), &concierge.heading, concierge.intro.as_deref()))
            @if !concierge.services.is_empty() {
                div.card-grid.services data-reveal-group {
                    @for card in &concierge.services {
                        (render_card(card, images))
                    }
                }
            }
            @if !concierge.features.is_empty() {
                div.card-grid.concierge-features data-reveal-group {
                    @for card in &concierge.features {
                        (render_card(card, images))
                    }
                }
            }
        }
    }
}

fn render_gallery(gallery: &[GalleryImage], images: &Images) -> Markup {
    let labels: Vec<&str> = gallery.iter().map(|g| g.label.as_str()).collect();
    let items = gallery
        .iter()
        .enumerate()
        .map(|(i, item)| {
            html! {
                button.gallery-item type="button" data-lightbox-open=(i)
                    data-lightbox-src=(full_src(images, &item.image))
                    data-lightbox-label=(item.label) {
                    (picture(images, &item.image, &item.label, "(max-width: 640px) 100vw, 40vw", true))
                    span.gallery-label { (item.label) }
                }
            }
        })
        .collect();

    html! {
        div.carousel.gallery-slider data-carousel="gallery" {
            (slides(items))
            @if gallery.len() > 1 {
                (carousel_controls())
                (dots(&labels))
            }
        }
    }
}

/// Label, control and inline error slot for a validated field.
fn form_field(field: Field, label: &str, control: Markup) -> Markup {
    html! {
        div.form-field data-field=(field.key()) {
            label for={ "lead-" (field.key()) } { (label) " *" }
            (control)
            p.field-error data-error-for=(field.key()) aria-live="polite" {}
        }
    }
}

pub fn render_lead_form(contact: &Contact) -> Markup {
    html! {
        div.lead-panel data-reveal {
            form.lead-form id="lead-form" novalidate {
                (form_field(Field::Name, "Full Name", html! {
                    input type="text" id="lead-name" name=(Field::Name.key()) autocomplete="name";
                }))
                (form_field(Field::Email, "Email", html! {
                    input type="email" id="lead-email" name=(Field::Email.key()) autocomplete="email";
                }))
                (form_field(Field::Phone, "Phone", html! {
                    input type="tel" id="lead-phone" name=(Field::Phone.key())
                        autocomplete="tel" placeholder="+60 12-345 6789";
                }))
                (form_field(Field::UnitType, "Unit Type", html! {
                    select id="lead-unit_type" name=(Field::UnitType.key()) {
                        option value="" { "Select unit type" }
                        @for choice in &contact.interests {
                            option value=(choice.value) { (choice.label) }
                        }
                    }
                }))
                @if !contact.budgets.is_empty() {
                    div.form-field {
                        label for="lead-budget" { "Budget" }
                        select id="lead-budget" name="budget" {
                            option value="" { "Select budget" }
                            @for budget in &contact.budgets {
                                option value=(budget) { (budget) }
                            }
                        }
                    }
                }
                div.form-field {
                    label for="lead-message" { "Message" }
                    textarea id="lead-message" name="message" rows="3" {}
                }
                div.form-field.consent data-field=(Field::Consent.key()) {
                    label.consent-label {
                        input type="checkbox" id="lead-consent" name=(Field::Consent.key());
                        span { (contact.consent_text) }
                    }
                    p.field-error data-error-for=(Field::Consent.key()) aria-live="polite" {}
                }
                button.btn.btn-gold.submit type="submit" data-busy-label="Submitting…" {
                    "Submit Registration"
                }
            }
            div.form-success role="status" hidden {
                h3 { "Thank you" }
                p { "Our sales team will be in touch shortly." }
            }
        }
    }
}

fn render_contact(contact: &Contact, gallery: &[GalleryImage], images: &Images) -> Markup {
    html! {
        section.contact id="contact" data-section {
            (section_header(contact.eyebrow.as_deref(), &contact.heading, contact.intro.as_deref()))
            div.contact-layout {
                div.contact-aside data-reveal {
                    @if !gallery.is_empty() {
                        (render_gallery(gallery, images))
                    }
                    @if !contact.info.is_empty() {
                        ul.contact-info {
                            @for line in &contact.info {
                                li {
                                    span.info-label { (line.label) }
                                    @if let Some(href) = &line.href {
                                        a.info-value href=(href) { (line.value) }
                                    } @else {
                                        span.info-value { (line.value) }
                                    }
                                }
                            }
                        }
                    }
                    @if !contact.socials.is_empty() {
                        ul.socials {
                            @for social in &contact.socials {
                                li {
                                    a href=(social.href) target="_blank" rel="noopener" { (social.label) }
                                }
                            }
                        }
                    }
                }
                (render_lead_form(contact))
            }
        }
    }
}

fn render_footer(meta: &Meta, footer: &Footer) -> Markup {
    html! {
        footer.site-footer {
            p.footer-brand { (meta.brand) }
            @if let Some(text) = &footer.text {
                p { (text) }
            }
            @if let Some(disclaimer) = &footer.disclaimer {
                p.disclaimer { (disclaimer) }
            }
        }
    }
}

fn render_lightbox() -> Markup {
    html! {
        div.lightbox id="lightbox" role="dialog" aria-modal="true" aria-label="Gallery" hidden {
            button.lightbox-close type="button" data-lightbox-close aria-label="Close" { "×" }
            button.lightbox-prev type="button" data-lightbox-prev aria-label="Previous" { "‹" }
            figure {
                img.lightbox-image src="" alt="";
                figcaption.lightbox-caption {}
            }
            button.lightbox-next type="button" data-lightbox-next aria-label="Next" { "›" }
        }
    }
}

// ============================================================================
// Page Renderer
// ============================================================================

/// Renders the whole page. `runtime_json` must already be script-safe.
fn render_page(manifest: &Manifest, css: &str, runtime_json: &str) -> Markup {
    let site = &manifest.site;
    let images = &manifest.images;
    let has_gallery = site.contact.is_some() && !manifest.gallery.is_empty();

    let content = html! {
        (render_nav(&site.meta, &manifest.navigation))
        (render_progress_rail(&manifest.navigation))
        main {
            @if let Some(hero) = &site.hero { (render_hero(hero, images)) }
            @if let Some(location) = &site.location { (render_location(location, images)) }
            @if let Some(units) = &site.units { (render_units(units, images)) }
            @if let Some(facilities) = &site.facilities { (render_facilities(facilities, images)) }
            @if let Some(tour) = &site.virtual_tour { (render_virtual_tour(tour, images)) }
            @if let Some(concierge) = &site.concierge { (render_concierge(concierge, images)) }
            @if let Some(contact) = &site.contact {
                (render_contact(contact, &manifest.gallery, images))
            }
        }
        (render_footer(&site.meta, &site.footer))
        @if has_gallery {
            (render_lightbox())
        }
        script type="application/json" id=(RUNTIME_ELEMENT_ID) { (PreEscaped(runtime_json)) }
        script { (PreEscaped(JS)) }
    };

    base_document(&site.meta, css, content)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::ImageVariant;
    use crate::scan::scan;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    /// Scanned fixtures with the hero marked as processed.
    fn fixture_manifest() -> (TempDir, Manifest) {
        let tmp = setup_fixtures();
        let scanned = scan(tmp.path()).unwrap();
        let mut images = BTreeMap::new();
        images.insert(
            "images/hero.png".to_string(),
            ProcessedImage {
                source_path: "images/hero.png".to_string(),
                dimensions: (96, 64),
                variants: vec![
                    ImageVariant {
                        path: "images/hero-32.avif".to_string(),
                        width: 32,
                        height: 21,
                    },
                    ImageVariant {
                        path: "images/hero-64.avif".to_string(),
                        width: 64,
                        height: 43,
                    },
                ],
            },
        );
        let manifest = Manifest {
            navigation: scanned.navigation,
            site: scanned.site,
            gallery: scanned.gallery,
            images,
            config: scanned.config,
        };
        (tmp, manifest)
    }

    fn render(manifest: &Manifest) -> String {
        let runtime = PageRuntime::new(&manifest.config, &manifest.site, manifest.gallery.len());
        render_page(manifest, "", &runtime.to_embedded_json().unwrap()).into_string()
    }

    /// Text between the runtime block's tags.
    fn runtime_block(html: &str) -> &str {
        let open = format!(r#"<script type="application/json" id="{RUNTIME_ELEMENT_ID}">"#);
        let start = html.find(&open).unwrap() + open.len();
        let len = html[start..].find("</script>").unwrap();
        &html[start..start + len]
    }

    // =========================================================================
    // Markdown
    // =========================================================================

    #[test]
    fn inline_markdown_has_no_paragraph() {
        let html = inline_markdown("Life *Above* the City").into_string();
        assert_eq!(html, "Life <em>Above</em> the City");
    }

    #[test]
    fn block_markdown_renders_emphasis() {
        let html = markdown("A **52 m** pool.").into_string();
        assert!(html.contains("<strong>52 m</strong>"));
        assert!(html.starts_with("<p>"));
    }

    // =========================================================================
    // Page structure
    // =========================================================================

    #[test]
    fn page_has_doctype_and_meta() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render(&manifest);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Pavilion Square KL | Luxury Residences in Bukit Bintang</title>"));
        assert!(html.contains(r#"name="description""#));
    }

    #[test]
    fn sections_render_in_page_order() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render(&manifest);
        let positions: Vec<usize> = nav_ids_of(&manifest)
            .iter()
            .map(|id| html.find(&format!(r#"id="{id}""#)).unwrap())
            .collect();
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    fn nav_ids_of(manifest: &Manifest) -> Vec<String> {
        manifest.navigation.iter().map(|n| n.id.clone()).collect()
    }

    #[test]
    fn absent_section_is_not_rendered() {
        let (_tmp, mut manifest) = fixture_manifest();
        manifest.site.concierge = None;
        manifest.navigation.retain(|n| n.id != "concierge");
        let html = render(&manifest);
        assert!(!html.contains(r#"id="concierge""#));
        assert!(!html.contains(r##"href="#concierge""##));
    }

    #[test]
    fn nav_links_and_booking_cta() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render_nav(&manifest.site.meta, &manifest.navigation).into_string();
        assert!(html.contains(r##"href="#hero""##));
        assert!(html.contains(r##"href="#virtual-tour""##));
        assert!(html.contains("360° Tour"));
        assert!(html.contains("Book Viewing"));
        assert!(html.contains("https://wa.me/60123456789"));
        assert!(html.contains(r#"target="_blank""#));
        // First section starts active
        assert_eq!(html.matches("nav-link active").count(), 1);
    }

    #[test]
    fn progress_rail_has_dot_per_section() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render(&manifest);
        assert_eq!(html.matches("data-rail=").count(), manifest.navigation.len());
        assert!(html.contains("data-progress"));
    }

    #[test]
    fn heading_accent_is_emphasized() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render(&manifest);
        assert!(html.contains("Life <em>Above</em> the City"));
        assert!(html.contains("<strong>MRT</strong>"));
    }

    // =========================================================================
    // Images
    // =========================================================================

    #[test]
    fn processed_image_gets_srcset() {
        let (_tmp, manifest) = fixture_manifest();
        let html = picture(&manifest.images, "images/hero.png", "Hero", "100vw", false)
            .into_string();
        assert!(html.contains("<picture>"));
        assert!(html.contains(r#"type="image/avif""#));
        assert!(html.contains("images/hero-32.avif 32w, images/hero-64.avif 64w"));
        assert!(html.contains(r#"src="images/hero-64.avif""#));
        assert!(html.contains(r#"width="96""#));
        assert!(html.contains(r#"loading="eager""#));
    }

    #[test]
    fn url_reference_renders_as_is() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render(&manifest);
        assert!(html.contains(r#"src="/media/renders/kl-night.webp""#));
        assert!(html.contains(r#"src="https://pavilionsquarekl.com/ISP/media/previews/c1.webp""#));
    }

    #[test]
    fn gallery_items_open_lightbox() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render(&manifest);
        assert!(html.contains(r#"data-lightbox-open="2""#));
        assert!(html.contains(r#"data-lightbox-src="/media/gallery/drop-off.webp""#));
        assert!(html.contains(r#"id="lightbox""#));
    }

    // =========================================================================
    // Widgets
    // =========================================================================

    #[test]
    fn carousels_are_tagged_for_runtime() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render(&manifest);
        for name in ["location", "units", "facilities", "gallery"] {
            assert!(
                html.contains(&format!(r#"data-carousel="{name}""#)),
                "missing carousel {name}"
            );
        }
        assert!(html.contains(r#"data-panorama-src="/pano-viewer.html""#));
        assert!(html.contains(r#"src="/isp-proxy/vt/pavilion-square/index.html""#));
    }

    #[test]
    fn unit_tabs_show_first_catalog() {
        let (_tmp, manifest) = fixture_manifest();
        let units = manifest.site.units.as_ref().unwrap();
        let html = render_units(units, &manifest.images).into_string();
        assert!(html.contains(r#"data-unit-tab="residential""#));
        assert!(html.contains("Corporate Suites"));
        assert!(html.contains(r#"data-catalog="residential">"#));
        assert!(html.contains(r#"data-catalog="corporate" hidden>"#));
        assert!(html.contains("2 Beds"));
    }

    #[test]
    fn lead_form_offers_configured_unit_types() {
        let (_tmp, manifest) = fixture_manifest();
        let contact = manifest.site.contact.as_ref().unwrap();
        let html = render_lead_form(contact).into_string();
        for field in Field::ALL {
            assert!(html.contains(&format!(r#"name="{}""#, field.key())));
            assert!(html.contains(&format!(r#"data-error-for="{}""#, field.key())));
        }
        assert!(html.contains(r#"<option value="2 Bedrooms">"#));
        assert!(html.contains("Below RM 1M"));
        assert!(html.contains("novalidate"));
    }

    #[test]
    fn runtime_block_is_parseable() {
        let (_tmp, manifest) = fixture_manifest();
        let html = render(&manifest);
        let json: serde_json::Value = serde_json::from_str(runtime_block(&html)).unwrap();
        assert_eq!(json["sections"][0], "hero");
        assert_eq!(json["carousels"]["gallery"]["len"], 3);
    }

    #[test]
    fn html_escape_in_maud() {
        let (_tmp, mut manifest) = fixture_manifest();
        manifest.site.meta.brand = "<script>alert('xss')</script>".to_string();
        let html = render_nav(&manifest.site.meta, &manifest.navigation).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    // =========================================================================
    // Output files
    // =========================================================================

    #[test]
    fn generate_writes_page_assets_and_redirects() {
        let (tmp, manifest) = fixture_manifest();
        let processed = tmp.path().join("processed");
        fs::create_dir_all(processed.join("images")).unwrap();
        fs::write(processed.join("images/hero-64.avif"), b"avif").unwrap();
        fs::write(processed.join(".cache-manifest.json"), "{}").unwrap();
        let manifest_path = processed.join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string(&manifest).unwrap()).unwrap();
        let out = tmp.path().join("dist");

        generate(&manifest_path, &processed, &out, tmp.path()).unwrap();

        assert!(out.join("index.html").exists());
        assert!(out.join("images/hero-64.avif").exists());
        assert!(out.join("pano-viewer.html").exists());
        assert!(out.join("robots.txt").exists());
        assert!(!out.join("manifest.json").exists());
        assert!(!out.join(".cache-manifest.json").exists());

        let redirects = fs::read_to_string(out.join(REDIRECTS_FILE)).unwrap();
        assert!(redirects.contains("/isp-proxy/*"));
        assert!(redirects.contains("/media/*"));
    }

    #[test]
    fn generated_page_inlines_palette() {
        let (tmp, mut manifest) = fixture_manifest();
        manifest.config.colors.gold = "#abcdef".to_string();
        let processed = tmp.path().join("processed");
        fs::create_dir_all(&processed).unwrap();
        let manifest_path = processed.join("manifest.json");
        fs::write(&manifest_path, serde_json::to_string(&manifest).unwrap()).unwrap();
        let out = tmp.path().join("dist");

        generate(&manifest_path, &processed, &out, tmp.path()).unwrap();

        let html = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(html.contains("--color-gold: #abcdef;"));
    }
}
