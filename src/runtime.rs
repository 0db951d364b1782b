//! Parameters handed to the page runtime.
//!
//! The browser side of the site (`static/site.js`) runs the same state
//! machines as [`crate::interaction`]. It does not hard-code any timing,
//! threshold or validation rule: everything it needs is serialized from
//! here into a `<script type="application/json" id="site-runtime">` block
//! by the generate stage.
//!
//! ```json
//! {
//!   "sections": ["hero", "location", "units", ...],
//!   "carousels": { "location": { "interval_ms": 5000, "cooldown_ms": 8000, "len": 3 }, ... },
//!   "unit_tabs": [{ "key": "residential", "label": "Residential", "len": 8 }, ...],
//!   "reveal": { "threshold": 0.15, "root_margin": "0px 0px -40px 0px", ... },
//!   "navbar": { "threshold": 0.2, "root_margin": "-80px 0px -30% 0px", ... },
//!   "rail": { ... },
//!   "solid_offset_px": 50.0,
//!   "viewport": { "mobile_max_width": 640.0, ... },
//!   "hero": { "panorama_delay_ms": 1500, "panorama_threshold": 0.05 },
//!   "lead": { "email_pattern": "...", "messages": { "name": "..." }, ... }
//! }
//! ```

use crate::config::{HeroConfig, SiteConfig};
use crate::interaction::lead::{EMAIL_PATTERN, PHONE_PATTERN, PHONE_SEPARATORS};
use crate::interaction::viewport::ViewportConstants;
use crate::interaction::{ActiveSectionOptions, CarouselTiming, Field, RevealOptions};
use crate::types::SiteContent;
use serde::Serialize;
use std::collections::BTreeMap;

/// Element id of the embedded runtime block.
pub const RUNTIME_ELEMENT_ID: &str = "site-runtime";

#[derive(Debug, Clone, Serialize)]
pub struct PageRuntime {
    /// Section ids registered with the active-section watchers, page order.
    pub sections: Vec<String>,
    /// One entry per slider present on the page.
    pub carousels: BTreeMap<&'static str, CarouselRuntime>,
    /// Unit catalog tabs; switching resets the `units` carousel.
    pub unit_tabs: Vec<UnitTabRuntime>,
    pub reveal: RevealOptions,
    pub navbar: ActiveSectionOptions,
    pub rail: ActiveSectionOptions,
    pub solid_offset_px: f64,
    pub viewport: ViewportConstants,
    pub hero: HeroConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lead: Option<LeadRuntime>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarouselRuntime {
    pub interval_ms: u64,
    pub cooldown_ms: u64,
    /// Slide count at mount.
    pub len: usize,
}

impl CarouselRuntime {
    fn new(timing: &CarouselTiming, len: usize) -> Self {
        Self {
            interval_ms: timing.interval_ms,
            cooldown_ms: timing.cooldown_ms,
            len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitTabRuntime {
    pub key: &'static str,
    pub label: &'static str,
    pub len: usize,
}

/// Validation rules and timing for the lead form.
#[derive(Debug, Clone, Serialize)]
pub struct LeadRuntime {
    pub email_pattern: &'static str,
    pub phone_pattern: &'static str,
    /// Characters stripped from the phone number before matching.
    pub phone_separators: &'static str,
    pub messages: BTreeMap<&'static str, &'static str>,
    /// Accepted unit-type values; the select offers exactly these.
    pub unit_types: Vec<String>,
    pub submit_delay_ms: u64,
    pub success_display_ms: u64,
}

impl PageRuntime {
    /// Assemble the runtime block for a scanned site.
    ///
    /// `gallery_len` is the full gallery length (numbered files plus inline
    /// entries), which only the manifest knows.
    pub fn new(config: &SiteConfig, site: &SiteContent, gallery_len: usize) -> Self {
        let sections = site.sections().iter().map(|s| s.id.to_string()).collect();

        let mut carousels = BTreeMap::new();
        let mut unit_tabs = Vec::new();
        if let Some(location) = &site.location {
            carousels.insert(
                "location",
                CarouselRuntime::new(&config.carousels.location, location.slides.len()),
            );
        }
        if let Some(units) = &site.units {
            unit_tabs = units
                .tabs()
                .into_iter()
                .map(|tab| UnitTabRuntime {
                    key: tab.key(),
                    label: tab.label(),
                    len: units.catalog(tab).len(),
                })
                .collect();
            let first_len = unit_tabs.first().map(|t| t.len).unwrap_or(0);
            carousels.insert(
                "units",
                CarouselRuntime::new(&config.carousels.units, first_len),
            );
        }
        if let Some(facilities) = &site.facilities {
            carousels.insert(
                "facilities",
                CarouselRuntime::new(&config.carousels.facilities, facilities.levels.len()),
            );
        }
        if site.contact.is_some() {
            carousels.insert(
                "gallery",
                CarouselRuntime::new(&config.carousels.gallery, gallery_len),
            );
        }

        let lead = site.contact.as_ref().map(|contact| LeadRuntime {
            email_pattern: EMAIL_PATTERN,
            phone_pattern: PHONE_PATTERN,
            phone_separators: PHONE_SEPARATORS,
            messages: Field::ALL.iter().map(|f| (f.key(), f.message())).collect(),
            unit_types: contact.unit_types(),
            submit_delay_ms: config.lead.submit_delay_ms,
            success_display_ms: config.lead.success_display_ms,
        });

        Self {
            sections,
            carousels,
            unit_tabs,
            reveal: config.reveal.clone(),
            navbar: config.navigation.navbar.clone(),
            rail: config.navigation.rail.clone(),
            solid_offset_px: config.navigation.solid_offset_px,
            viewport: ViewportConstants::default(),
            hero: config.hero.clone(),
            lead,
        }
    }

    /// JSON safe to place inside a `<script>` element.
    ///
    /// `<` is escaped so no string value can close the element early.
    pub fn to_embedded_json(&self) -> Result<String, serde_json::Error> {
        Ok(serde_json::to_string(self)?.replace('<', "\\u003c"))
    }
}
