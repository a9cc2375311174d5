//! Responsive width selection.
//!
//! Two sources of candidate widths feed width-descriptor srcsets:
//!
//! - [`parse_image_sizes`] reads a CSS `sizes`-like expression and evaluates
//!   it against a fixed set of reference viewports.
//! - [`generate_responsive_widths`] scales a base width by a multiplier ladder.
//!
//! Both return deduplicated widths in ascending order.

use std::sync::LazyLock;

use regex::Regex;

/// Reference viewport widths used to evaluate `vw` lengths.
pub const REFERENCE_VIEWPORTS: [u32; 5] = [375, 768, 1024, 1280, 1920];

/// Default multiplier ladder applied to a base width.
pub const DEFAULT_MULTIPLIERS: [f64; 7] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

/// Smallest width kept by default.
pub const DEFAULT_MIN_WIDTH: u32 = 200;

/// Largest width kept by default.
pub const DEFAULT_MAX_WIDTH: u32 = 3840;

static LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)(px|vw)\b").expect("valid regex"));

/// Extract candidate pixel widths from a sizes expression.
///
/// Every `<n>px` yields `n`; every `<n>vw` yields `n%` of each reference
/// viewport. Media-condition lengths are included as well. Input with no
/// recognizable lengths yields an empty list, and callers fall back to
/// [`generate_responsive_widths`].
///
/// # Examples
/// ```
/// use pixelway::responsive::parse_image_sizes;
///
/// assert_eq!(parse_image_sizes("400px 400px 800px"), vec![400, 800]);
/// assert!(parse_image_sizes("50vw").contains(&188));
/// assert!(parse_image_sizes("not a size").is_empty());
/// ```
pub fn parse_image_sizes(sizes: &str) -> Vec<u32> {
    let mut widths = Vec::new();

    for caps in LENGTH_RE.captures_iter(sizes) {
        let Ok(value) = caps[1].parse::<f64>() else {
            continue;
        };

        match &caps[2] {
            "px" => widths.push(value.round() as u32),
            _ => widths.extend(
                REFERENCE_VIEWPORTS
                    .iter()
                    .map(|viewport| (*viewport as f64 * value / 100.0).round() as u32),
            ),
        }
    }

    widths.retain(|w| *w > 0);
    widths.sort_unstable();
    widths.dedup();
    widths
}

/// Options for [`generate_responsive_widths`].
#[derive(Debug, Clone, PartialEq)]
pub struct WidthLadderOptions {
    pub multipliers: Vec<f64>,
    pub min_width: u32,
    pub max_width: u32,
}

impl Default for WidthLadderOptions {
    fn default() -> Self {
        Self {
            multipliers: DEFAULT_MULTIPLIERS.to_vec(),
            min_width: DEFAULT_MIN_WIDTH,
            max_width: DEFAULT_MAX_WIDTH,
        }
    }
}

impl WidthLadderOptions {
    pub fn with_multipliers(multipliers: &[f64]) -> Self {
        Self {
            multipliers: multipliers.to_vec(),
            ..Default::default()
        }
    }
}

/// Scale `base_width` by each multiplier and keep the widths inside the
/// configured window.
///
/// # Examples
/// ```
/// use pixelway::responsive::{generate_responsive_widths, WidthLadderOptions};
///
/// let widths = generate_responsive_widths(800, &WidthLadderOptions::default());
/// assert_eq!(widths, vec![200, 400, 600, 800, 1000, 1200, 1600]);
/// ```
pub fn generate_responsive_widths(base_width: u32, options: &WidthLadderOptions) -> Vec<u32> {
    if base_width == 0 || options.multipliers.is_empty() {
        return Vec::new();
    }

    let mut widths: Vec<u32> = options
        .multipliers
        .iter()
        .filter(|m| m.is_finite() && **m > 0.0)
        .map(|m| (base_width as f64 * m).round() as u32)
        .filter(|w| (options.min_width..=options.max_width).contains(w))
        .collect();

    widths.sort_unstable();
    widths.dedup();
    widths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_literals_deduplicated_and_sorted() {
        assert_eq!(parse_image_sizes("400px 400px 800px"), vec![400, 800]);
        assert_eq!(parse_image_sizes("800px, 300px"), vec![300, 800]);
    }

    #[test]
    fn test_viewport_units_use_reference_viewports() {
        let widths = parse_image_sizes("50vw");
        assert_eq!(widths, vec![188, 384, 512, 640, 960]);
    }

    #[test]
    fn test_full_media_query_expression() {
        let widths = parse_image_sizes("(max-width: 768px) 100vw, 33vw");
        assert!(widths.contains(&768));
        assert!(widths.contains(&375));
        assert!(widths.contains(&1920));
        assert!(widths.contains(&124)); // 375 * 0.33
        assert!(widths.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_fractional_lengths() {
        assert_eq!(parse_image_sizes("100.6px"), vec![101]);
    }

    #[test]
    fn test_malformed_input_is_empty() {
        assert!(parse_image_sizes("").is_empty());
        assert!(parse_image_sizes("auto").is_empty());
        assert!(parse_image_sizes("calc(100% - 2rem)").is_empty());
        assert!(parse_image_sizes("0px").is_empty());
    }

    #[test]
    fn test_default_ladder() {
        let widths = generate_responsive_widths(1920, &WidthLadderOptions::default());
        assert_eq!(widths, vec![480, 960, 1440, 1920, 2400, 2880, 3840]);
    }

    #[test]
    fn test_ladder_filters_window() {
        // 0.25 * 400 = 100 falls below the 200px minimum
        let widths = generate_responsive_widths(400, &WidthLadderOptions::default());
        assert_eq!(widths, vec![200, 300, 400, 500, 600, 800]);

        let widths = generate_responsive_widths(3000, &WidthLadderOptions::default());
        assert_eq!(widths.last(), Some(&3750));
    }

    #[test]
    fn test_ladder_rounds_and_dedups() {
        let options = WidthLadderOptions::with_multipliers(&[1.0, 1.0001, 1.5]);
        assert_eq!(generate_responsive_widths(333, &options), vec![333, 500]);
    }

    #[test]
    fn test_empty_inputs() {
        assert!(generate_responsive_widths(0, &WidthLadderOptions::default()).is_empty());
        let options = WidthLadderOptions::with_multipliers(&[]);
        assert!(generate_responsive_widths(800, &options).is_empty());
    }
}
