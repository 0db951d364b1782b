//! Viewport geometry shared by the reveal and active-section watchers.
//!
//! Everything is measured in document coordinates (CSS pixels from the top of
//! the page), vertically only; the page never scrolls sideways. A watcher's
//! root is the viewport grown or shrunk by a CSS-style root margin, and an
//! element's visibility is the fraction of its height inside that root.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MarginParseError {
    #[error("root margin needs 1 to 4 values, got {0}")]
    Arity(usize),
    #[error("invalid root margin value '{0}' (expected e.g. -80px or -30%)")]
    Value(String),
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f64),
    /// Percent of the viewport height.
    Percent(f64),
}

impl MarginValue {
    pub fn resolve(&self, viewport_height: f64) -> f64 {
        match *self {
            MarginValue::Px(px) => px,
            MarginValue::Percent(pct) => viewport_height * pct / 100.0,
        }
    }
}

impl FromStr for MarginValue {
    type Err = MarginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || MarginParseError::Value(s.to_string());
        if let Some(num) = s.strip_suffix("px") {
            num.parse().map(MarginValue::Px).map_err(|_| bad())
        } else if let Some(num) = s.strip_suffix('%') {
            num.parse().map(MarginValue::Percent).map_err(|_| bad())
        } else if s == "0" {
            Ok(MarginValue::Px(0.0))
        } else {
            Err(bad())
        }
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Px(v) => write!(f, "{v}px"),
            MarginValue::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// CSS `rootMargin` shorthand: `top right bottom left`, 1 to 4 values.
///
/// Stored in config and shipped to the runtime as the same string the
/// browser accepts, e.g. `"-80px 0px -30% 0px"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: MarginValue::Px(0.0),
        right: MarginValue::Px(0.0),
        bottom: MarginValue::Px(0.0),
        left: MarginValue::Px(0.0),
    };

    pub fn vertical(top: MarginValue, bottom: MarginValue) -> Self {
        Self {
            top,
            bottom,
            ..Self::ZERO
        }
    }
}

impl Default for RootMargin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl FromStr for RootMargin {
    type Err = MarginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(MarginValue::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        let (top, right, bottom, left) = match values[..] {
            [a] => (a, a, a, a),
            [v, h] => (v, h, v, h),
            [t, h, b] => (t, h, b, h),
            [t, r, b, l] => (t, r, b, l),
            _ => return Err(MarginParseError::Arity(values.len())),
        };
        Ok(Self {
            top,
            right,
            bottom,
            left,
        })
    }
}

impl TryFrom<String> for RootMargin {
    type Error = MarginParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<RootMargin> for String {
    fn from(m: RootMargin) -> String {
        m.to_string()
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

/// Scroll state of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_y: f64, viewport_height: f64, document_height: f64) -> Self {
        Self {
            scroll_y,
            viewport_height,
            document_height,
        }
    }

    /// Largest reachable scroll offset, zero for pages shorter than the window.
    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.viewport_height).max(0.0)
    }

    /// Whether the bottom edge of the window is within `tolerance` of the
    /// end of the document.
    pub fn is_at_bottom(&self, tolerance: f64) -> bool {
        self.viewport_height + self.scroll_y >= self.document_height - tolerance
    }

    /// Root bounds `(top, bottom)` for a watcher with `margin`.
    ///
    /// A negative margin shrinks the root inward.
    pub fn root_bounds(&self, margin: &RootMargin) -> (f64, f64) {
        let top = self.scroll_y - margin.top.resolve(self.viewport_height);
        let bottom =
            self.scroll_y + self.viewport_height + margin.bottom.resolve(self.viewport_height);
        (top, bottom)
    }
}

/// Vertical extent of an element in document coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f64,
    pub height: f64,
}

impl Span {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height.max(0.0)
    }
}

/// Fraction of `span` visible inside the margin-adjusted viewport, in `[0, 1]`.
///
/// Zero-height elements count as fully visible while their top edge lies
/// inside the root.
pub fn intersection_ratio(span: &Span, metrics: &ScrollMetrics, margin: &RootMargin) -> f64 {
    let (root_top, root_bottom) = metrics.root_bounds(margin);
    if root_bottom <= root_top {
        return 0.0;
    }
    if span.height <= 0.0 {
        return if span.top >= root_top && span.top <= root_bottom {
            1.0
        } else {
            0.0
        };
    }
    let visible = span.bottom().min(root_bottom) - span.top.max(root_top);
    (visible / span.height).clamp(0.0, 1.0)
}

/// Whether `ratio` satisfies `threshold`. Nothing satisfies without some
/// overlap, even a zero threshold.
pub fn meets_threshold(ratio: f64, threshold: f64) -> bool {
    ratio > 0.0 && ratio >= threshold
}
