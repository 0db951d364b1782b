//! Auto-advancing carousel state machine.
//!
//! Every slider on the page (location backdrops, the unit catalog, facility
//! levels, the gallery) is the same machine: states are slide indices,
//! transitions are a timer tick or a manual selection, and a manual
//! selection arms a cooldown during which the timer is ignored.
//!
//! Time is passed in explicitly as a [`Duration`] measured from mount, so the
//! machine is deterministic and testable without a real clock. The caller
//! drives it by calling [`Carousel::tick`] whenever its event loop wakes up.
//!
//! ## Timing
//!
//! ```text
//! mount ──interval──▶ advance ──interval──▶ advance
//!            go_to(i) ──cooldown──▶ resume ──interval──▶ advance
//! ```
//!
//! There is at most one pending resume deadline. A second manual selection
//! during the cooldown replaces it rather than stacking another one, so the
//! auto-timer never resumes early.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Auto-advance interval and manual-selection cooldown, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CarouselTiming {
    /// Delay between automatic advances.
    pub interval_ms: u64,
    /// How long auto-advance stays paused after a manual selection.
    pub cooldown_ms: u64,
}

impl CarouselTiming {
    pub const fn new(interval_ms: u64, cooldown_ms: u64) -> Self {
        Self {
            interval_ms,
            cooldown_ms,
        }
    }

    /// Interval as a [`Duration`], never shorter than one millisecond.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for CarouselTiming {
    fn default() -> Self {
        Self::new(5000, 8000)
    }
}

/// State of one carousel instance.
///
/// An empty carousel is valid: it has no current index and every operation
/// is a no-op, so callers can render a neutral placeholder.
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    current: usize,
    timing: CarouselTiming,
    /// Next automatic advance, only meaningful while not paused.
    next_advance_at: Duration,
    /// Set while a manual selection's cooldown is running.
    resume_at: Option<Duration>,
}

impl Carousel {
    /// Mount a carousel over `len` slides at time `now`.
    pub fn new(len: usize, timing: CarouselTiming, now: Duration) -> Self {
        Self {
            len,
            current: 0,
            timing,
            next_advance_at: now + timing.interval(),
            resume_at: None,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn timing(&self) -> CarouselTiming {
        self.timing
    }

    /// Index of the visible slide, `None` when the collection is empty.
    pub fn current_index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.current)
    }

    /// Whether a manual-selection cooldown is holding the auto-timer.
    pub fn is_paused(&self) -> bool {
        self.resume_at.is_some()
    }

    /// When auto-advance resumes, if paused.
    pub fn resume_at(&self) -> Option<Duration> {
        self.resume_at
    }

    /// When the next automatic advance is due, if not paused.
    pub fn next_advance_at(&self) -> Option<Duration> {
        if self.is_empty() || self.is_paused() {
            None
        } else {
            Some(self.next_advance_at)
        }
    }

    /// Step forward one slide, wrapping at the end.
    ///
    /// This is the timer's transition; it does nothing while paused or when
    /// the collection is empty. Returns whether the index changed.
    pub fn advance(&mut self) -> bool {
        if self.is_empty() || self.is_paused() {
            return false;
        }
        self.current = (self.current + 1) % self.len;
        true
    }

    /// Show slide `index` and pause auto-advance for the cooldown.
    ///
    /// Out-of-range indices wrap modulo the slide count. Any cooldown already
    /// running is replaced, not extended.
    pub fn go_to(&mut self, index: usize, now: Duration) {
        if self.is_empty() {
            return;
        }
        self.current = index % self.len;
        self.resume_at = Some(now + self.timing.cooldown());
    }

    /// Manual step back one slide (wraps to the last slide).
    pub fn prev(&mut self, now: Duration) {
        if self.is_empty() {
            return;
        }
        let target = (self.current + self.len - 1) % self.len;
        self.go_to(target, now);
    }

    /// Manual step forward one slide (wraps to the first slide).
    pub fn next(&mut self, now: Duration) {
        if self.is_empty() {
            return;
        }
        let target = (self.current + 1) % self.len;
        self.go_to(target, now);
    }

    /// Drive the timers up to `now`. Returns whether the index changed.
    ///
    /// An expired cooldown restarts the interval from the moment it expired,
    /// so the first advance after a manual selection lands one full interval
    /// after the resume.
    pub fn tick(&mut self, now: Duration) -> bool {
        if self.is_empty() {
            return false;
        }
        if let Some(resume) = self.resume_at {
            if now < resume {
                return false;
            }
            self.resume_at = None;
            self.next_advance_at = resume + self.timing.interval();
        }

        let mut changed = false;
        while now >= self.next_advance_at {
            changed |= self.advance();
            self.next_advance_at += self.timing.interval();
        }
        changed
    }

    /// Swap in a collection of `len` slides (e.g. a catalog tab switch).
    ///
    /// The index returns to the first slide and the interval restarts from
    /// `now`. A running cooldown is kept.
    pub fn reset(&mut self, len: usize, now: Duration) {
        self.len = len;
        self.current = 0;
        self.next_advance_at = now + self.timing.interval();
    }
}
