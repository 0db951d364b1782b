//! One-shot reveal watchers.
//!
//! A reveal flips an element's `visible` flag the first time it crosses the
//! threshold and never flips it back. Revealed elements are dropped from the
//! watch list so later scroll updates cost nothing for them.
//!
//! Also here: staggered group reveals, where one trigger schedules child
//! reveals at `i × base_delay`, and the deferred, visibility-gated mount used
//! for the hero panorama iframe.

use super::visibility::{
    MarginValue, RootMargin, ScrollMetrics, Span, intersection_ratio, meets_threshold,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

/// Reveal watcher settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RevealOptions {
    /// Fraction of the element that must be visible, 0.0 to 1.0.
    pub threshold: f64,
    /// Root margin; a negative bottom value fires before the element is
    /// fully on screen.
    pub root_margin: RootMargin,
    /// Threshold for the container of a staggered group.
    pub stagger_threshold: f64,
    /// Delay between consecutive children of a staggered group.
    pub stagger_ms: u64,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: 0.15,
            root_margin: RootMargin::vertical(MarginValue::Px(0.0), MarginValue::Px(-40.0)),
            stagger_threshold: 0.1,
            stagger_ms: 100,
        }
    }
}

/// Delays for `count` staggered children: `0, base, 2×base, …`.
pub fn stagger_delays(count: usize, base: Duration) -> Vec<Duration> {
    (0..count as u32).map(|i| base * i).collect()
}

struct Watch {
    key: String,
    span: Span,
}

/// Set of one-shot reveal watchers keyed by element id.
pub struct RevealTracker {
    threshold: f64,
    margin: RootMargin,
    pending: Vec<Watch>,
    revealed: BTreeSet<String>,
}

impl RevealTracker {
    pub fn new(threshold: f64, margin: RootMargin) -> Self {
        Self {
            threshold,
            margin,
            pending: Vec::new(),
            revealed: BTreeSet::new(),
        }
    }

    pub fn from_options(options: &RevealOptions) -> Self {
        Self::new(options.threshold, options.root_margin)
    }

    /// Start watching `key`. Already-revealed or already-watched keys are
    /// left as they are.
    pub fn observe(&mut self, key: impl Into<String>, span: Span) {
        let key = key.into();
        if self.revealed.contains(&key) || self.pending.iter().any(|w| w.key == key) {
            return;
        }
        self.pending.push(Watch { key, span });
    }

    /// Update an element's position after a layout change.
    pub fn relayout(&mut self, key: &str, span: Span) {
        if let Some(w) = self.pending.iter_mut().find(|w| w.key == key) {
            w.span = span;
        }
    }

    /// Stop watching without revealing (element unmounted).
    pub fn unobserve(&mut self, key: &str) {
        self.pending.retain(|w| w.key != key);
    }

    /// Evaluate every pending watch. Returns the keys revealed by this
    /// update, in registration order.
    pub fn update(&mut self, metrics: &ScrollMetrics) -> Vec<String> {
        let mut fired = Vec::new();
        self.pending.retain(|w| {
            let ratio = intersection_ratio(&w.span, metrics, &self.margin);
            if meets_threshold(ratio, self.threshold) {
                fired.push(w.key.clone());
                false
            } else {
                true
            }
        });
        self.revealed.extend(fired.iter().cloned());
        fired
    }

    pub fn is_visible(&self, key: &str) -> bool {
        self.revealed.contains(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

/// A group whose children reveal one after another once the container is
/// seen.
#[derive(Debug, Clone)]
pub struct StaggeredReveal {
    count: usize,
    base_delay: Duration,
    triggered_at: Option<Duration>,
}

impl StaggeredReveal {
    pub fn new(count: usize, base_delay: Duration) -> Self {
        Self {
            count,
            base_delay,
            triggered_at: None,
        }
    }

    /// Container crossed its threshold. Only the first call counts.
    pub fn trigger(&mut self, now: Duration) {
        self.triggered_at.get_or_insert(now);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered_at.is_some()
    }

    /// Per-child visibility at `now`.
    pub fn revealed(&self, now: Duration) -> Vec<bool> {
        match self.triggered_at {
            None => vec![false; self.count],
            Some(start) => stagger_delays(self.count, self.base_delay)
                .into_iter()
                .map(|d| now >= start + d)
                .collect(),
        }
    }
}

/// Mount gate for heavy embeds: open once an initial delay has passed and
/// only while the host element is visible.
///
/// Unlike a reveal this is reversible: scrolling the host away unmounts the
/// embed again.
#[derive(Debug, Clone)]
pub struct DeferredMount {
    ready_at: Duration,
    threshold: f64,
    visible: bool,
}

impl DeferredMount {
    pub fn new(delay: Duration, threshold: f64, mounted_at: Duration) -> Self {
        Self {
            ready_at: mounted_at + delay,
            threshold,
            // Hosts start on screen (the hero is the first section)
            visible: true,
        }
    }

    pub fn observe(&mut self, span: &Span, metrics: &ScrollMetrics) {
        let ratio = intersection_ratio(span, metrics, &RootMargin::ZERO);
        self.visible = meets_threshold(ratio, self.threshold);
    }

    pub fn should_mount(&self, now: Duration) -> bool {
        self.visible && now >= self.ready_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn tracker() -> RevealTracker {
        RevealTracker::new(0.15, RootMargin::ZERO)
    }

    #[test]
    fn reveals_once_threshold_is_crossed() {
        let mut t = tracker();
        t.observe("card", Span::new(900.0, 200.0));

        assert!(t.update(&ScrollMetrics::new(0.0, 800.0, 3000.0)).is_empty());
        assert!(!t.is_visible("card"));

        // 40px of 200px = 0.2
        let fired = t.update(&ScrollMetrics::new(140.0, 800.0, 3000.0));
        assert_eq!(fired, vec!["card".to_string()]);
        assert!(t.is_visible("card"));
        assert_eq!(t.pending_count(), 0);
    }

    #[test]
    fn reveal_never_replays() {
        let mut t = tracker();
        t.observe("card", Span::new(100.0, 100.0));
        assert_eq!(t.update(&ScrollMetrics::new(0.0, 800.0, 3000.0)).len(), 1);

        // Scroll away and back
        assert!(t.update(&ScrollMetrics::new(2000.0, 800.0, 3000.0)).is_empty());
        assert!(t.update(&ScrollMetrics::new(0.0, 800.0, 3000.0)).is_empty());
        assert!(t.is_visible("card"));

        // Re-observing a revealed key is a no-op
        t.observe("card", Span::new(100.0, 100.0));
        assert_eq!(t.pending_count(), 0);
    }

    #[test]
    fn negative_bottom_margin_delays_trigger() {
        let margin: RootMargin = "0px 0px -100px 0px".parse().unwrap();
        let mut t = RevealTracker::new(0.15, margin);
        t.observe("card", Span::new(750.0, 100.0));
        // The bottom 100px of the viewport are excluded
        assert!(t.update(&ScrollMetrics::new(0.0, 800.0, 3000.0)).is_empty());
        assert_eq!(t.update(&ScrollMetrics::new(100.0, 800.0, 3000.0)).len(), 1);
    }

    #[test]
    fn unobserve_drops_pending_watch() {
        let mut t = tracker();
        t.observe("a", Span::new(100.0, 100.0));
        t.unobserve("a");
        assert!(t.update(&ScrollMetrics::new(0.0, 800.0, 3000.0)).is_empty());
        assert!(!t.is_visible("a"));
    }

    #[test]
    fn relayout_moves_the_watch() {
        let mut t = tracker();
        t.observe("a", Span::new(2000.0, 100.0));
        t.relayout("a", Span::new(100.0, 100.0));
        assert_eq!(t.update(&ScrollMetrics::new(0.0, 800.0, 3000.0)).len(), 1);
    }

    #[test]
    fn fired_keys_keep_registration_order() {
        let mut t = tracker();
        t.observe("b", Span::new(300.0, 100.0));
        t.observe("a", Span::new(100.0, 100.0));
        assert_eq!(
            t.update(&ScrollMetrics::new(0.0, 800.0, 3000.0)),
            vec!["b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn stagger_delays_are_multiples_of_base() {
        assert_eq!(
            stagger_delays(4, ms(100)),
            vec![ms(0), ms(100), ms(200), ms(300)]
        );
        assert!(stagger_delays(0, ms(100)).is_empty());
    }

    #[test]
    fn staggered_children_reveal_in_sequence() {
        let mut group = StaggeredReveal::new(3, ms(100));
        assert_eq!(group.revealed(ms(5000)), vec![false, false, false]);

        group.trigger(ms(1000));
        assert_eq!(group.revealed(ms(1000)), vec![true, false, false]);
        assert_eq!(group.revealed(ms(1150)), vec![true, true, false]);
        assert_eq!(group.revealed(ms(1200)), vec![true, true, true]);

        // A second trigger does not restart the sequence
        group.trigger(ms(9000));
        assert_eq!(group.revealed(ms(1200)), vec![true, true, true]);
    }

    #[test]
    fn deferred_mount_waits_for_delay_and_visibility() {
        let hero = Span::new(0.0, 900.0);
        let mut gate = DeferredMount::new(ms(1500), 0.05, ms(0));
        assert!(!gate.should_mount(ms(1499)));
        assert!(gate.should_mount(ms(1500)));

        gate.observe(&hero, &ScrollMetrics::new(2000.0, 800.0, 6000.0));
        assert!(!gate.should_mount(ms(3000)));

        gate.observe(&hero, &ScrollMetrics::new(500.0, 800.0, 6000.0));
        assert!(gate.should_mount(ms(3000)));
    }

    #[test]
    fn default_options_match_page_tuning() {
        let o = RevealOptions::default();
        assert_eq!(o.threshold, 0.15);
        assert_eq!(o.stagger_ms, 100);
        assert_eq!(o.root_margin.to_string(), "0px 0px -40px 0px");
    }
}
