#![allow(dead_code)]

use card_extract_detect::{ExtractorParams, IconCropParams, LayoutKind, RectifyParams, SelectionRule};
use image::{Rgb, RgbImage};

/// Mid-gray table: the reference pixel lands on it, so Canny thresholds
/// stay well below the table/card contrast.
pub const FELT: Rgb<u8> = Rgb([90, 90, 90]);
pub const PAPER: Rgb<u8> = Rgb([240, 240, 240]);

pub const CARD_W: u32 = 80;
pub const CARD_H: u32 = 120;
pub const TOLERANCE: f32 = 5_000.0;

pub fn table(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, FELT)
}

pub fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, w: u32, h: u32, color: Rgb<u8>) {
    for y in y0..(y0 + h).min(img.height()) {
        for x in x0..(x0 + w).min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Fill a `w x h` rectangle centered at `(cx, cy)` and turned by
/// `angle_deg` (clockwise in image coordinates).
pub fn fill_rotated(img: &mut RgbImage, cx: f32, cy: f32, w: f32, h: f32, angle_deg: f32, color: Rgb<u8>) {
    let (s, c) = angle_deg.to_radians().sin_cos();
    for y in 0..img.height() {
        for x in 0..img.width() {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let u = dx * c + dy * s;
            let v = -dx * s + dy * c;
            if u.abs() <= w * 0.5 && v.abs() <= h * 0.5 {
                img.put_pixel(x, y, color);
            }
        }
    }
}

/// Small-scale parameters: same pipeline, tolerance sized for the
/// synthetic cards.
pub fn params(regions: usize, layout: LayoutKind) -> ExtractorParams {
    ExtractorParams {
        regions,
        area_tolerance: TOLERANCE,
        selection: SelectionRule::LargestArea,
        rectify: RectifyParams::card(4),
        icon: IconCropParams::card_corner(),
        layout,
        ..ExtractorParams::tableau()
    }
}

/// Column x origins for a row of `n` cards with 20 px gaps.
pub fn column_x(n: u32) -> Vec<u32> {
    (0..n).map(|i| 20 + i * (CARD_W + 20)).collect()
}

/// Talon near the top center plus `columns` cards in a row below.
pub fn tableau_scene(columns: u32) -> RgbImage {
    let xs = column_x(columns);
    let width = xs.last().copied().unwrap_or(0) + CARD_W + 20;
    let mut img = table(width.max(CARD_W + 40), 360);
    fill_rect(&mut img, (width - CARD_W) / 2, 20, CARD_W, CARD_H, PAPER);
    for x in xs {
        fill_rect(&mut img, x, 200, CARD_W, CARD_H, PAPER);
    }
    img
}

/// `rows x cols` grid of equal cards.
pub fn grid_scene(rows: u32, cols: u32) -> RgbImage {
    let xs = column_x(cols);
    let width = xs.last().copied().unwrap_or(0) + CARD_W + 20;
    let mut img = table(width, 20 + rows * (CARD_H + 30));
    for r in 0..rows {
        for &x in &xs {
            fill_rect(&mut img, x, 20 + r * (CARD_H + 30), CARD_W, CARD_H, PAPER);
        }
    }
    img
}
