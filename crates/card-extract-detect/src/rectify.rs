use card_extract_core::{homography_from_4pt, warp_perspective_rgb, Homography, OrientedRect};
use image::imageops::{self, FilterType};
use image::RgbImage;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// When a warped region is turned a quarter turn to reach the canonical
/// orientation. Decided once from the pre-warp rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Rotate when `height > width` (portrait canonical).
    #[default]
    WhenTaller,
    /// Rotate when `width > height` (landscape canonical).
    WhenWider,
    Never,
}

impl RotationPolicy {
    pub fn should_rotate(self, rect: &OrientedRect) -> bool {
        match self {
            RotationPolicy::WhenTaller => rect.is_taller(),
            RotationPolicy::WhenWider => rect.is_wider(),
            RotationPolicy::Never => false,
        }
    }
}

/// Reference card unit in pixels; canonical sizes are multiples of it.
pub const CARD_UNIT: (u32, u32) = (57, 87);

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyParams {
    pub width: u32,
    pub height: u32,
    pub rotation: RotationPolicy,
}

impl Default for RectifyParams {
    fn default() -> Self {
        Self::card(4)
    }
}

impl RectifyParams {
    /// Portrait card canvas at `scale` times the 57x87 reference unit.
    pub fn card(scale: u32) -> Self {
        Self {
            width: CARD_UNIT.0 * scale,
            height: CARD_UNIT.1 * scale,
            rotation: RotationPolicy::WhenTaller,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RectifiedRegion {
    /// Canonical `width x height` image.
    pub image: RgbImage,
    /// A quarter turn was applied after the warp.
    pub rotated: bool,
    /// Maps canonical (pre-rotation) coordinates into the source image.
    pub h_img_from_rect: Homography,
}

/// Warp the oriented rectangle `rect` of `src` onto the canonical canvas.
///
/// Returns `None` when the rectangle is degenerate.
pub fn rectify_region(
    src: &RgbImage,
    rect: &OrientedRect,
    params: &RectifyParams,
) -> Option<RectifiedRegion> {
    let (w, h) = (params.width, params.height);
    let canonical = [
        Point2::new(0.0, 0.0),
        Point2::new(w as f32, 0.0),
        Point2::new(w as f32, h as f32),
        Point2::new(0.0, h as f32),
    ];
    let h_img_from_rect = homography_from_4pt(&canonical, &rect.box_points())?;
    let warped = warp_perspective_rgb(src, &h_img_from_rect, w, h);

    let rotated = params.rotation.should_rotate(rect);
    let image = if rotated {
        let swapped = imageops::resize(&warped, h, w, FilterType::Triangle);
        imageops::rotate270(&swapped)
    } else {
        warped
    };

    Some(RectifiedRegion {
        image,
        rotated,
        h_img_from_rect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const PAPER: Rgb<u8> = Rgb([240, 240, 240]);
    const INK: Rgb<u8> = Rgb([20, 20, 200]);
    const FELT: Rgb<u8> = Rgb([30, 90, 30]);

    fn upright_card(x0: u32, y0: u32, w: u32, h: u32) -> RgbImage {
        let mut img = RgbImage::from_pixel(400, 400, FELT);
        for y in y0..y0 + h {
            for x in x0..x0 + w {
                img.put_pixel(x, y, PAPER);
            }
        }
        // marker in the card's top-left corner
        for y in y0 + 4..y0 + 24 {
            for x in x0 + 4..x0 + 16 {
                img.put_pixel(x, y, INK);
            }
        }
        img
    }

    #[test]
    fn upright_card_fills_canvas_without_rotation() {
        let img = upright_card(100, 60, 114, 174);
        let rect = OrientedRect::new(Point2::new(157.0, 147.0), 174.0, 114.0, 90.0);
        let params = RectifyParams::card(4);

        let out = rectify_region(&img, &rect, &params).expect("rectified");
        assert!(!out.rotated);
        assert_eq!(out.image.dimensions(), (228, 348));
        let center = out.image.get_pixel(114, 174);
        assert!(center[0] > 200, "card paper expected at center, got {center:?}");
        let marker = out.image.get_pixel(20, 25);
        assert!(marker[2] > 150 && marker[0] < 80, "marker expected top-left, got {marker:?}");
    }

    #[test]
    fn sideways_card_is_rotated_back_to_portrait() {
        // 174 wide, 114 tall in the image
        let mut img = RgbImage::from_pixel(400, 400, FELT);
        for y in 100..214 {
            for x in 50..224 {
                img.put_pixel(x, y, PAPER);
            }
        }
        let rect = OrientedRect::new(Point2::new(137.0, 157.0), 114.0, 174.0, 90.0);
        assert!(rect.is_taller());

        let out = rectify_region(&img, &rect, &RectifyParams::default()).expect("rectified");
        assert!(out.rotated);
        assert_eq!(out.image.dimensions(), (228, 348));
    }

    #[test]
    fn landscape_policy_rotates_upright_cards() {
        let img = upright_card(100, 60, 114, 174);
        let rect = OrientedRect::new(Point2::new(157.0, 147.0), 174.0, 114.0, 90.0);
        let params = RectifyParams {
            width: 348,
            height: 228,
            rotation: RotationPolicy::WhenWider,
        };
        let out = rectify_region(&img, &rect, &params).expect("rectified");
        assert!(out.rotated);
        assert_eq!(out.image.dimensions(), (348, 228));
    }

    #[test]
    fn degenerate_rect_is_rejected() {
        let img = RgbImage::new(10, 10);
        let rect = OrientedRect::new(Point2::new(5.0, 5.0), 0.0, 0.0, 90.0);
        assert!(rectify_region(&img, &rect, &RectifyParams::default()).is_none());
    }
}
