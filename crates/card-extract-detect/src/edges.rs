//! Edge map construction: median blur, bilateral smoothing, grayscale and
//! Canny with thresholds derived from a brightness level.

use card_extract_core::{bilateral_filter, gray_median, rgb_to_gray};
use image::{GrayImage, RgbImage};
use imageproc::edges::canny;
use imageproc::filter::median_filter;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// How the brightness level feeding the Canny thresholds is measured.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ThresholdStrategy {
    /// Read a single grayscale pixel (clamped into the image). `(0, 0)` is
    /// what the tuned tolerance constants were calibrated with.
    ReferencePixel { x: u32, y: u32 },
    /// True median over the grayscale histogram.
    Median,
    /// Explicit thresholds; `threshold_spread` is ignored.
    Fixed { low: f32, high: f32 },
}

impl Default for ThresholdStrategy {
    fn default() -> Self {
        ThresholdStrategy::ReferencePixel { x: 0, y: 0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeMapParams {
    /// Median kernel size (odd, in pixels). 1 disables the blur.
    pub median_kernel: u32,
    pub bilateral_diameter: u32,
    pub bilateral_sigma_color: f32,
    pub bilateral_sigma_space: f32,
    pub threshold: ThresholdStrategy,
    /// `low = (1 - spread) * level`, `high = (1 + spread) * level`.
    pub threshold_spread: f32,
    /// Upper bound on external contours carried into rectangle fitting.
    pub max_contours: usize,
}

impl Default for EdgeMapParams {
    fn default() -> Self {
        Self {
            median_kernel: 5,
            bilateral_diameter: 5,
            bilateral_sigma_color: 35.0,
            bilateral_sigma_space: 35.0,
            threshold: ThresholdStrategy::default(),
            threshold_spread: 0.33,
            max_contours: 4096,
        }
    }
}

impl EdgeMapParams {
    /// Heavy smoothing with fixed thresholds for close-up shots of a
    /// single card, where the card face itself carries a lot of texture.
    pub fn close_up() -> Self {
        Self {
            median_kernel: 65,
            bilateral_diameter: 10,
            bilateral_sigma_color: 75.0,
            bilateral_sigma_space: 75.0,
            threshold: ThresholdStrategy::Fixed { low: 15.0, high: 35.0 },
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CannyThresholds {
    /// Brightness level the thresholds were derived from.
    pub level: f32,
    pub low: f32,
    pub high: f32,
}

impl CannyThresholds {
    pub fn from_level(level: f32, spread: f32) -> Self {
        Self {
            level,
            low: ((1.0 - spread) * level).max(0.0),
            high: ((1.0 + spread) * level).min(255.0),
        }
    }
}

/// Binary edge map plus the thresholds that produced it.
#[derive(Clone, Debug)]
pub struct EdgeMap {
    pub edges: GrayImage,
    pub thresholds: CannyThresholds,
}

pub fn canny_thresholds(gray: &GrayImage, params: &EdgeMapParams) -> CannyThresholds {
    let level = match params.threshold {
        ThresholdStrategy::ReferencePixel { x, y } => {
            if gray.width() == 0 || gray.height() == 0 {
                0.0
            } else {
                let x = x.min(gray.width() - 1);
                let y = y.min(gray.height() - 1);
                gray.get_pixel(x, y)[0] as f32
            }
        }
        ThresholdStrategy::Median => gray_median(gray) as f32,
        ThresholdStrategy::Fixed { low, high } => {
            return CannyThresholds {
                level: (low + high) * 0.5,
                low,
                high,
            }
        }
    };
    CannyThresholds::from_level(level, params.threshold_spread)
}

/// Denoise `image` and return its binary edge map (0 / 255), same size.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(image, params), fields(width = image.width(), height = image.height()))
)]
pub fn build_edge_map(image: &RgbImage, params: &EdgeMapParams) -> EdgeMap {
    let radius = params.median_kernel / 2;
    let blurred = if radius > 0 {
        median_filter(image, radius, radius)
    } else {
        image.clone()
    };
    let smoothed = bilateral_filter(
        &blurred,
        params.bilateral_diameter,
        params.bilateral_sigma_color,
        params.bilateral_sigma_space,
    );
    drop(blurred);

    let gray = rgb_to_gray(&smoothed);
    let thresholds = canny_thresholds(&gray, params);
    log::debug!(
        "edge map {}x{}: level {:.1} -> canny ({:.1}, {:.1})",
        gray.width(),
        gray.height(),
        thresholds.level,
        thresholds.low,
        thresholds.high
    );
    let edges = canny(&gray, thresholds.low, thresholds.high);

    EdgeMap { edges, thresholds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb};

    #[test]
    fn thresholds_follow_reference_pixel() {
        let mut gray = GrayImage::from_pixel(10, 10, Luma([200]));
        gray.put_pixel(0, 0, Luma([100]));
        let t = canny_thresholds(&gray, &EdgeMapParams::default());
        assert_eq!(t.level, 100.0);
        assert!((t.low - 67.0).abs() < 1e-3);
        assert!((t.high - 133.0).abs() < 1e-3);
    }

    #[test]
    fn colored_felt_level_uses_bt601_luma() {
        let img = RgbImage::from_pixel(16, 16, Rgb([30, 90, 30]));
        let map = build_edge_map(&img, &EdgeMapParams::default());
        assert_eq!(map.thresholds.level, 65.0);
        assert!(map.edges.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn thresholds_are_clamped() {
        let t = CannyThresholds::from_level(250.0, 0.33);
        assert_eq!(t.high, 255.0);
        let t = CannyThresholds::from_level(0.0, 0.33);
        assert_eq!(t.low, 0.0);
    }

    #[test]
    fn median_strategy_ignores_corner_pixel() {
        let mut gray = GrayImage::from_pixel(9, 9, Luma([90]));
        gray.put_pixel(0, 0, Luma([250]));
        let params = EdgeMapParams {
            threshold: ThresholdStrategy::Median,
            ..EdgeMapParams::default()
        };
        assert_eq!(canny_thresholds(&gray, &params).level, 90.0);
    }

    #[test]
    fn fixed_strategy_passes_thresholds_through() {
        let gray = GrayImage::from_pixel(4, 4, Luma([200]));
        let params = EdgeMapParams {
            threshold: ThresholdStrategy::Fixed { low: 15.0, high: 35.0 },
            ..EdgeMapParams::default()
        };
        let t = canny_thresholds(&gray, &params);
        assert_eq!((t.low, t.high), (15.0, 35.0));
    }

    #[test]
    fn reference_pixel_is_clamped_into_image() {
        let gray = GrayImage::from_pixel(4, 4, Luma([42]));
        let params = EdgeMapParams {
            threshold: ThresholdStrategy::ReferencePixel { x: 100, y: 100 },
            ..EdgeMapParams::default()
        };
        assert_eq!(canny_thresholds(&gray, &params).level, 42.0);
    }

    #[test]
    fn edge_map_outlines_bright_block() {
        let mut img = RgbImage::from_pixel(80, 60, Rgb([90, 90, 90]));
        for y in 15..45 {
            for x in 20..60 {
                img.put_pixel(x, y, Rgb([240, 240, 240]));
            }
        }
        let map = build_edge_map(&img, &EdgeMapParams::default());
        assert_eq!(map.edges.dimensions(), (80, 60));
        assert_eq!(map.edges.get_pixel(40, 30)[0], 0);
        assert_eq!(map.edges.get_pixel(5, 5)[0], 0);
        let on_border = (17..23).any(|x| map.edges.get_pixel(x, 30)[0] == 255);
        assert!(on_border, "expected an edge near the left side of the block");
    }
}
