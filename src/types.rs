//! Site content shared across all pipeline stages.
//!
//! `site.toml` deserializes straight into [`SiteContent`]. The same types are
//! serialized into the scan and process manifests and read back by the
//! generate stage, so they must stay identical across all three modules.
//!
//! Every section is optional. A section missing from `site.toml` is left out
//! of the page and of the navigation.
//!
//! ## Image references
//!
//! Image fields hold one of three kinds of reference (see [`classify_ref`]):
//!
//! | Form | Example | Handling |
//! |------|---------|----------|
//! | Relative path | `images/lobby.jpg` | processed into AVIF variants |
//! | Site-absolute | `/media/lobby.webp`, `/pano-viewer.html` | rendered as-is, must be routed or shipped in `assets/` |
//! | External URL | `https://cdn.example/x.webp` | rendered as-is |

use serde::{Deserialize, Serialize};

/// Section ids in page order.
pub const SECTION_ORDER: [&str; 7] = [
    "hero",
    "location",
    "units",
    "facilities",
    "virtual-tour",
    "concierge",
    "contact",
];

/// Navigation label used when a section does not set `nav_label`.
pub fn default_nav_label(id: &str) -> &'static str {
    match id {
        "hero" => "Home",
        "location" => "Location",
        "units" => "Units",
        "facilities" => "Facilities",
        "virtual-tour" => "360° Tour",
        "concierge" => "Concierge",
        "contact" => "Gallery",
        _ => "",
    }
}

/// Navigation entry: an in-page anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavItem {
    /// Section id, also the anchor target (`#id`).
    pub id: String,
    pub title: String,
}

impl NavItem {
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }
}

/// One picture in the contact gallery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Number prefix for images found in `gallery/`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    pub label: String,
    pub image: String,
}

/// Kind of an image or frame reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// Relative to the content root.
    Local,
    /// Starts with `/`: served by the host, from `assets/` or a rewrite rule.
    SiteAbsolute,
    /// Has a scheme or is protocol-relative.
    External,
}

pub fn classify_ref(reference: &str) -> RefKind {
    if reference.starts_with("//") || reference.contains("://") {
        RefKind::External
    } else if reference.starts_with('/') {
        RefKind::SiteAbsolute
    } else {
        RefKind::Local
    }
}

/// The path part of a site-absolute reference, without query or fragment.
pub fn ref_path(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}

// ============================================================================
// site.toml
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteContent {
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero: Option<Hero>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<Units>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Facilities>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_tour: Option<VirtualTour>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concierge: Option<Concierge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub footer: Footer,
}

/// A section present in the content, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRef<'a> {
    pub id: &'static str,
    pub nav_label: Option<&'a str>,
}

impl SiteContent {
    /// Sections that are present, in page order.
    pub fn sections(&self) -> Vec<SectionRef<'_>> {
        let labels: [Option<Option<&str>>; 7] = [
            self.hero.as_ref().map(|s| s.nav_label.as_deref()),
            self.location.as_ref().map(|s| s.nav_label.as_deref()),
            self.units.as_ref().map(|s| s.nav_label.as_deref()),
            self.facilities.as_ref().map(|s| s.nav_label.as_deref()),
            self.virtual_tour.as_ref().map(|s| s.nav_label.as_deref()),
            self.concierge.as_ref().map(|s| s.nav_label.as_deref()),
            self.contact.as_ref().map(|s| s.nav_label.as_deref()),
        ];
        SECTION_ORDER
            .iter()
            .zip(labels)
            .filter_map(|(id, label)| label.map(|nav_label| SectionRef { id: *id, nav_label }))
            .collect()
    }

    /// Every image reference in the content, in page order.
    pub fn image_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        if let Some(hero) = &self.hero {
            refs.push(hero.image.as_str());
        }
        if let Some(location) = &self.location {
            refs.extend(location.slides.iter().map(|s| s.image.as_str()));
        }
        if let Some(units) = &self.units {
            refs.extend(units.all().map(|u| u.image.as_str()));
        }
        if let Some(facilities) = &self.facilities {
            refs.extend(facilities.levels.iter().map(|l| l.image.as_str()));
        }
        if let Some(tour) = &self.virtual_tour {
            refs.extend(tour.previews.iter().filter_map(|c| c.image.as_deref()));
        }
        if let Some(concierge) = &self.concierge {
            refs.extend(concierge.services.iter().filter_map(|c| c.image.as_deref()));
        }
        if let Some(contact) = &self.contact {
            refs.extend(contact.gallery.iter().map(|g| g.image.as_str()));
        }
        refs
    }

    /// Iframe sources: the hero panorama and the virtual tour.
    pub fn frame_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        if let Some(url) = self.hero.as_ref().and_then(|h| h.panorama_url.as_deref()) {
            refs.push(url);
        }
        if let Some(tour) = &self.virtual_tour {
            refs.push(tour.tour_url.as_str());
        }
        refs
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Meta {
    /// Document title.
    pub title: String,
    pub description: String,
    /// Brand shown in the navbar.
    pub brand: String,
    /// "Book Viewing" call to action, usually a WhatsApp link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// A big number with a caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Stat {
    pub value: String,
    pub label: String,
}

/// Titled text block with an optional picture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Card {
    pub title: String,
    /// Markdown.
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hero {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_label: Option<String>,
    /// First word of the headline, e.g. "PAVILION".
    pub title_lead: String,
    /// Gold-accented second word, e.g. "SQUARE".
    pub title_accent: String,
    /// Still image shown until the panorama loads.
    pub image: String,
    /// 360° panorama embedded behind the headline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panorama_url: Option<String>,
    pub primary_cta: Link,
    pub secondary_cta: Link,
    #[serde(default)]
    pub marquee: Vec<String>,
    #[serde(default)]
    pub stats: Vec<Stat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<String>,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default)]
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub facts: Vec<Stat>,
    #[serde(default)]
    pub connectivity: Vec<Landmark>,
}

/// Full-bleed background slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Slide {
    pub image: String,
    pub headline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Landmark {
    pub name: String,
    pub detail: String,
    #[serde(default)]
    pub highlight: bool,
}

/// Unit catalog tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitTab {
    Residential,
    Corporate,
}

impl UnitTab {
    pub const ALL: [UnitTab; 2] = [UnitTab::Residential, UnitTab::Corporate];

    pub fn key(self) -> &'static str {
        match self {
            UnitTab::Residential => "residential",
            UnitTab::Corporate => "corporate",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitTab::Residential => "Residential",
            UnitTab::Corporate => "Corporate Suites",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Units {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<String>,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default)]
    pub residential: Vec<Unit>,
    #[serde(default)]
    pub corporate: Vec<Unit>,
}

impl Units {
    pub fn catalog(&self, tab: UnitTab) -> &[Unit] {
        match tab {
            UnitTab::Residential => &self.residential,
            UnitTab::Corporate => &self.corporate,
        }
    }

    /// Tabs that have at least one unit.
    pub fn tabs(&self) -> Vec<UnitTab> {
        UnitTab::ALL
            .into_iter()
            .filter(|t| !self.catalog(*t).is_empty())
            .collect()
    }

    pub fn all(&self) -> impl Iterator<Item = &Unit> {
        self.residential.iter().chain(&self.corporate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Unit {
    /// Layout code, e.g. "Type B1".
    pub code: String,
    pub label: String,
    pub sqft: u32,
    pub sqm: f64,
    #[serde(default)]
    pub beds: u32,
    #[serde(default)]
    pub baths: u32,
    pub floors: String,
    pub image: String,
    pub price: String,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub highlight: bool,
}

impl Unit {
    /// "Studio", "1 Bed", "3 Beds".
    pub fn beds_label(&self) -> String {
        match self.beds {
            0 => "Studio".to_string(),
            1 => "1 Bed".to_string(),
            n => format!("{n} Beds"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Facilities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<String>,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default)]
    pub levels: Vec<FacilityLevel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacilityLevel {
    /// Short tab id, e.g. "L67".
    pub id: String,
    /// Display name, e.g. "Level 67".
    pub level: String,
    pub headline: String,
    pub tagline: String,
    /// Markdown.
    pub description: String,
    pub image: String,
    pub stat: Stat,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VirtualTour {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<String>,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    pub tour_url: String,
    #[serde(default)]
    pub features: Vec<Card>,
    #[serde(default)]
    pub previews: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Concierge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<String>,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default)]
    pub services: Vec<Card>,
    #[serde(default)]
    pub features: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<String>,
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    /// Unit-type choices for the lead form.
    pub interests: Vec<Choice>,
    #[serde(default)]
    pub budgets: Vec<String>,
    pub consent_text: String,
    #[serde(default)]
    pub info: Vec<ContactLine>,
    #[serde(default)]
    pub socials: Vec<Link>,
    /// Gallery pictures declared inline, shown after those in `gallery/`.
    #[serde(default)]
    pub gallery: Vec<GalleryEntry>,
}

impl Contact {
    /// Accepted values for the unit-type field.
    pub fn unit_types(&self) -> Vec<String> {
        self.interests.iter().map(|c| c.value.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactLine {
    pub label: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryEntry {
    pub image: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Footer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
}
