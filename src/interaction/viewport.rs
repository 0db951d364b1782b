//! Browser zoom detection and base font-size normalization.
//!
//! Browser zoom scales the whole rendered page after CSS is applied, so a
//! font-size change alone cannot undo it. On a maximized window the OS screen
//! width is known, and the ratio between the width the viewport *should* have
//! and the width it actually has is the zoom level. When that ratio falls in
//! the detectable band, the document root gets an inverse CSS `zoom` and a
//! fixed base font size. Everywhere else a fluid base size is used.
//!
//! The thresholds are empirical and are kept exactly as they are; the page
//! layout was tuned against them.
//!
//! | Case | Result |
//! |---|---|
//! | `inner <= 640` | mobile: no zoom, 14px |
//! | `outer >= screen - 60` and `1.08 < (screen - 20) / inner < 2.5` | zoom `1/ratio`, 14px |
//! | otherwise | no zoom, `clamp(11.5, 8 + 0.003125 × inner, 14)` px |

use serde::Serialize;

/// Viewport widths at or below this are treated as mobile.
pub const MOBILE_MAX_WIDTH: f64 = 640.0;
/// Base font size for mobile and zoom-compensated layouts.
pub const FIXED_FONT_PX: f64 = 14.0;
/// Slack for OS window chrome when deciding "nearly maximized".
pub const MAXIMIZED_TOLERANCE_PX: f64 = 60.0;
/// Slack for scrollbars and window borders in the expected viewport width.
pub const SCROLLBAR_TOLERANCE_PX: f64 = 20.0;
/// Exclusive lower bound of a detectable zoom ratio.
pub const ZOOM_RATIO_MIN: f64 = 1.08;
/// Exclusive upper bound of a detectable zoom ratio.
pub const ZOOM_RATIO_MAX: f64 = 2.5;
/// Fluid font size: `FLUID_BASE_PX + FLUID_SLOPE × inner_width` (14px at 1920).
pub const FLUID_BASE_PX: f64 = 8.0;
pub const FLUID_SLOPE: f64 = 0.003125;
/// Lower clamp of the fluid font size.
pub const FLUID_MIN_PX: f64 = 11.5;

/// Window measurements read on mount and on every resize.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportProfile {
    /// CSS width of the viewport (`window.innerWidth`).
    pub inner_width: f64,
    /// Width of the browser window (`window.outerWidth`).
    pub outer_width: f64,
    /// Available OS screen width (`screen.availWidth`).
    pub screen_width: f64,
}

impl ViewportProfile {
    pub fn new(inner_width: f64, outer_width: f64, screen_width: f64) -> Self {
        Self {
            inner_width,
            outer_width,
            screen_width,
        }
    }

    pub fn is_mobile(&self) -> bool {
        self.inner_width <= MOBILE_MAX_WIDTH
    }

    pub fn is_nearly_maximized(&self) -> bool {
        self.outer_width >= self.screen_width - MAXIMIZED_TOLERANCE_PX
    }

    /// Estimated browser zoom, only meaningful for nearly-maximized windows.
    pub fn zoom_ratio(&self) -> Option<f64> {
        if self.is_mobile() || !self.is_nearly_maximized() {
            return None;
        }
        Some((self.screen_width - SCROLLBAR_TOLERANCE_PX) / self.inner_width)
    }
}

/// Which branch of the normalizer produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationMode {
    Mobile,
    ZoomCompensated,
    Fluid,
}

/// What to apply to the document root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Normalization {
    pub mode: NormalizationMode,
    /// Base font size in CSS pixels.
    pub font_size_px: f64,
    /// Inverse zoom to apply, `None` means remove any applied zoom.
    pub zoom_scale: Option<f64>,
}

impl Normalization {
    /// `zoom` property value, four decimals like the runtime writes it.
    pub fn zoom_css(&self) -> Option<String> {
        self.zoom_scale.map(|z| format!("{z:.4}"))
    }

    pub fn font_size_css(&self) -> String {
        let px = (self.font_size_px * 10_000.0).round() / 10_000.0;
        format!("{px}px")
    }
}

/// Compute the root font size and zoom compensation for a viewport.
pub fn normalize(profile: &ViewportProfile) -> Normalization {
    if profile.is_mobile() {
        return Normalization {
            mode: NormalizationMode::Mobile,
            font_size_px: FIXED_FONT_PX,
            zoom_scale: None,
        };
    }

    if let Some(ratio) = profile.zoom_ratio()
        && ratio > ZOOM_RATIO_MIN
        && ratio < ZOOM_RATIO_MAX
    {
        return Normalization {
            mode: NormalizationMode::ZoomCompensated,
            font_size_px: FIXED_FONT_PX,
            zoom_scale: Some(1.0 / ratio),
        };
    }

    Normalization {
        mode: NormalizationMode::Fluid,
        font_size_px: fluid_font_size(profile.inner_width),
        zoom_scale: None,
    }
}

/// `clamp(11.5, 8 + 0.003125 × width, 14)`.
pub fn fluid_font_size(inner_width: f64) -> f64 {
    (FLUID_BASE_PX + FLUID_SLOPE * inner_width).clamp(FLUID_MIN_PX, FIXED_FONT_PX)
}

/// Constants shipped to the page runtime so it applies the same thresholds.
#[derive(Debug, Clone, Serialize)]
pub struct ViewportConstants {
    pub mobile_max_width: f64,
    pub fixed_font_px: f64,
    pub maximized_tolerance_px: f64,
    pub scrollbar_tolerance_px: f64,
    pub zoom_ratio_min: f64,
    pub zoom_ratio_max: f64,
    pub fluid_base_px: f64,
    pub fluid_slope: f64,
    pub fluid_min_px: f64,
}

impl Default for ViewportConstants {
    fn default() -> Self {
        Self {
            mobile_max_width: MOBILE_MAX_WIDTH,
            fixed_font_px: FIXED_FONT_PX,
            maximized_tolerance_px: MAXIMIZED_TOLERANCE_PX,
            scrollbar_tolerance_px: SCROLLBAR_TOLERANCE_PX,
            zoom_ratio_min: ZOOM_RATIO_MIN,
            zoom_ratio_max: ZOOM_RATIO_MAX,
            fluid_base_px: FLUID_BASE_PX,
            fluid_slope: FLUID_SLOPE,
            fluid_min_px: FLUID_MIN_PX,
        }
    }
}
