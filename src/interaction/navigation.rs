//! Active-section tracking, scroll progress and the navbar's solid state.
//!
//! Each registered section has a continuous watch. On every scroll update the
//! sections that newly satisfy the threshold become active; if several cross
//! in the same update the last one in page order wins. After that, a bottom
//! check forces the last section active whenever the window is within the
//! bottom tolerance of the document end, which covers a short final section
//! that can never reach the threshold under the negative root margins. The
//! bottom check only applies to pages that can scroll, and only to watchers
//! with `bottom_override` set (the navbar; the progress rail has none).
//!
//! The two signals are applied in that order on every update, so near the
//! bottom the scroll check always has the final word. Clicking a nav link
//! selects a section directly; the next update may override it.

use super::visibility::{
    MarginValue, RootMargin, ScrollMetrics, Span, intersection_ratio, meets_threshold,
};
use serde::{Deserialize, Serialize};

/// Active-section watcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ActiveSectionOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
    /// Force the last section active at the bottom of the page.
    pub bottom_override: bool,
    /// Distance from the document end that counts as "at the bottom".
    pub bottom_tolerance_px: f64,
}

impl ActiveSectionOptions {
    /// Navbar link highlighting.
    pub fn navbar() -> Self {
        Self {
            threshold: 0.2,
            root_margin: RootMargin::vertical(MarginValue::Px(-80.0), MarginValue::Percent(-30.0)),
            bottom_override: true,
            bottom_tolerance_px: 20.0,
        }
    }

    /// Side rail dots next to the progress bar.
    pub fn progress_rail() -> Self {
        Self {
            threshold: 0.3,
            root_margin: RootMargin::vertical(MarginValue::Px(-80.0), MarginValue::Percent(-40.0)),
            bottom_override: false,
            bottom_tolerance_px: 20.0,
        }
    }
}

impl Default for ActiveSectionOptions {
    fn default() -> Self {
        Self::navbar()
    }
}

/// A page section's id and position.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionBox {
    pub id: String,
    pub span: Span,
}

impl SectionBox {
    pub fn new(id: impl Into<String>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            span: Span::new(top, height),
        }
    }
}

struct Watched {
    id: String,
    span: Span,
    /// Threshold state from the previous update, `None` before the first.
    satisfied: Option<bool>,
}

/// Tracks which section is highlighted in navigation.
///
/// With at least one registered section there is always exactly one active
/// id, starting with the first.
pub struct ActiveSectionTracker {
    options: ActiveSectionOptions,
    sections: Vec<Watched>,
    active: usize,
}

impl ActiveSectionTracker {
    /// Register `ids` against the page `layout`, in the order given.
    ///
    /// Ids with no matching section in the layout are skipped.
    pub fn new<S: AsRef<str>>(
        ids: &[S],
        layout: &[SectionBox],
        options: ActiveSectionOptions,
    ) -> Self {
        let sections = ids
            .iter()
            .filter_map(|id| {
                let id = id.as_ref();
                layout.iter().find(|b| b.id == id).map(|b| Watched {
                    id: b.id.clone(),
                    span: b.span,
                    satisfied: None,
                })
            })
            .collect();
        Self {
            options,
            sections,
            active: 0,
        }
    }

    /// Currently active id, `None` only when no section was found.
    pub fn active(&self) -> Option<&str> {
        self.sections.get(self.active).map(|s| s.id.as_str())
    }

    /// Registered ids in page order.
    pub fn section_ids(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.id.as_str())
    }

    /// Replace section positions after a resize. Unknown ids are ignored.
    pub fn relayout(&mut self, layout: &[SectionBox]) {
        for s in &mut self.sections {
            if let Some(b) = layout.iter().find(|b| b.id == s.id) {
                s.span = b.span;
            }
        }
    }

    /// Feed a scroll position. Returns whether the active id changed.
    pub fn update(&mut self, metrics: &ScrollMetrics) -> bool {
        let before = self.active;
        let margin = self.options.root_margin;
        let threshold = self.options.threshold;

        for (i, s) in self.sections.iter_mut().enumerate() {
            let now = meets_threshold(intersection_ratio(&s.span, metrics, &margin), threshold);
            if now && s.satisfied != Some(true) {
                self.active = i;
            }
            s.satisfied = Some(now);
        }

        if self.options.bottom_override
            && !self.sections.is_empty()
            && metrics.max_scroll() > 0.0
            && metrics.is_at_bottom(self.options.bottom_tolerance_px)
        {
            self.active = self.sections.len() - 1;
        }
        self.active != before
    }

    /// Mark `id` active (nav link clicked). Returns false for unknown ids.
    pub fn select(&mut self, id: &str) -> bool {
        match self.sections.iter().position(|s| s.id == id) {
            Some(i) => {
                self.active = i;
                true
            }
            None => false,
        }
    }
}

/// Normalized scroll position in `[0, 1]`; zero when the page cannot scroll.
pub fn scroll_progress(metrics: &ScrollMetrics) -> f64 {
    let max = metrics.max_scroll();
    if max <= 0.0 {
        return 0.0;
    }
    (metrics.scroll_y / max).clamp(0.0, 1.0)
}

/// Whether the navbar switches to its solid background.
pub fn is_scrolled(scroll_y: f64, solid_offset_px: f64) -> bool {
    scroll_y > solid_offset_px
}
