//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// A single responsive width to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsiveSize {
    /// Output width, also the `srcset` `w` descriptor.
    pub width: u32,
    /// Output height, aspect ratio preserved.
    pub height: u32,
}

/// Calculate which responsive widths to generate and their heights.
///
/// Widths wider than the original are dropped; the rest come back sorted and
/// deduplicated. If every requested width exceeds the original, the original
/// size is the only entry, so every picture has at least one variant.
///
/// # Arguments
/// * `original` - Original image dimensions (width, height)
/// * `sizes` - Requested breakpoint widths
pub fn calculate_responsive_sizes(original: (u32, u32), sizes: &[u32]) -> Vec<ResponsiveSize> {
    let (orig_w, orig_h) = original;

    let mut widths: Vec<u32> = sizes
        .iter()
        .copied()
        .filter(|&w| w > 0 && w <= orig_w)
        .collect();
    widths.sort_unstable();
    widths.dedup();

    let mut result: Vec<ResponsiveSize> = widths
        .into_iter()
        .map(|width| ResponsiveSize {
            width,
            height: scaled_height(original, width),
        })
        .collect();

    // If original is narrower than all requested sizes, use original
    if result.is_empty() {
        result.push(ResponsiveSize {
            width: orig_w,
            height: orig_h,
        });
    }

    result
}

fn scaled_height((orig_w, orig_h): (u32, u32), width: u32) -> u32 {
    if orig_w == 0 {
        return orig_h;
    }
    let h = (orig_h as f64 * width as f64 / orig_w as f64).round() as u32;
    h.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_wider_sizes() {
        let sizes = calculate_responsive_sizes((1000, 800), &[640, 1280, 1920]);
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].width, 640);
    }

    #[test]
    fn landscape_height_follows_aspect() {
        // 2000x1500, 1000 wide → 750 high
        let sizes = calculate_responsive_sizes((2000, 1500), &[1000]);
        assert_eq!(sizes, vec![ResponsiveSize { width: 1000, height: 750 }]);
    }

    #[test]
    fn portrait_is_sized_by_width() {
        // Portrait cards still use width descriptors
        let sizes = calculate_responsive_sizes((1500, 2000), &[640, 1280]);
        assert_eq!(sizes[0], ResponsiveSize { width: 640, height: 853 });
        assert_eq!(sizes[1], ResponsiveSize { width: 1280, height: 1707 });
    }

    #[test]
    fn falls_back_to_original_when_all_exceed() {
        let sizes = calculate_responsive_sizes((500, 400), &[640, 1280]);
        assert_eq!(sizes, vec![ResponsiveSize { width: 500, height: 400 }]);
    }

    #[test]
    fn exact_width_is_kept() {
        let sizes = calculate_responsive_sizes((640, 480), &[640, 1280]);
        assert_eq!(sizes, vec![ResponsiveSize { width: 640, height: 480 }]);
    }

    #[test]
    fn unsorted_and_duplicate_sizes_are_normalized() {
        let sizes = calculate_responsive_sizes((3000, 2000), &[1920, 640, 1280, 640]);
        let widths: Vec<u32> = sizes.iter().map(|s| s.width).collect();
        assert_eq!(widths, vec![640, 1280, 1920]);
    }

    #[test]
    fn empty_sizes_returns_original() {
        let sizes = calculate_responsive_sizes((1000, 800), &[]);
        assert_eq!(sizes.len(), 1);
        assert_eq!(sizes[0].width, 1000);
    }

    #[test]
    fn thin_strip_keeps_one_pixel_height() {
        let sizes = calculate_responsive_sizes((4000, 2), &[640]);
        assert_eq!(sizes[0].height, 1);
    }
}
