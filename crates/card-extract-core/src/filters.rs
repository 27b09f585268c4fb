//! Smoothing and thresholding filters not covered by `imageproc`.

use image::{GrayImage, Luma, Rgb, RgbImage};

// BT.601 luma weights in Q14 fixed point (0.299, 0.587, 0.114).
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Grayscale conversion with BT.601 weights, rounded the same way as the
/// usual fixed-point `RGB -> GRAY` path. `image::imageops::grayscale` uses
/// Rec.709 weights instead, which shifts levels on saturated colors.
pub fn rgb_to_gray(src: &RgbImage) -> GrayImage {
    let mut out = GrayImage::new(src.width(), src.height());
    for (dst, px) in out.pixels_mut().zip(src.pixels()) {
        *dst = Luma([luma_bt601(px)]);
    }
    out
}

#[inline]
fn luma_bt601(px: &Rgb<u8>) -> u8 {
    let [r, g, b] = px.0;
    let acc = r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B;
    ((acc + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

/// Edge-preserving bilateral smoothing.
///
/// `diameter` is the neighbourhood size in pixels; only taps inside the
/// inscribed disc contribute. The color distance is the L1 distance over
/// the three channels. Borders are replicated.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip(src), fields(width = src.width(), height = src.height()))
)]
pub fn bilateral_filter(
    src: &RgbImage,
    diameter: u32,
    sigma_color: f32,
    sigma_space: f32,
) -> RgbImage {
    let radius = (diameter / 2) as i32;
    if radius == 0 || sigma_color <= 0.0 || sigma_space <= 0.0 {
        return src.clone();
    }

    let space_coeff = -0.5 / (sigma_space as f64 * sigma_space as f64);
    let color_coeff = -0.5 / (sigma_color as f64 * sigma_color as f64);

    let mut taps: Vec<(i32, i32, f64)> = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f64;
            if r2.sqrt() > radius as f64 {
                continue;
            }
            taps.push((dx, dy, (r2 * space_coeff).exp()));
        }
    }
    let color_lut: Vec<f64> = (0..=3 * 255)
        .map(|d| ((d * d) as f64 * color_coeff).exp())
        .collect();

    let (w, h) = (src.width() as i32, src.height() as i32);
    RgbImage::from_fn(src.width(), src.height(), |x, y| {
        let center = src.get_pixel(x, y);
        let mut sum = [0.0_f64; 3];
        let mut wsum = 0.0_f64;
        for &(dx, dy, ws) in &taps {
            let sx = (x as i32 + dx).clamp(0, w - 1) as u32;
            let sy = (y as i32 + dy).clamp(0, h - 1) as u32;
            let p = src.get_pixel(sx, sy);
            let dist = (0..3)
                .map(|c| (p[c] as i32 - center[c] as i32).unsigned_abs() as usize)
                .sum::<usize>();
            let wt = ws * color_lut[dist];
            for c in 0..3 {
                sum[c] += wt * p[c] as f64;
            }
            wsum += wt;
        }
        let mut out = [0u8; 3];
        for c in 0..3 {
            out[c] = (sum[c] / wsum).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(out)
    })
}

/// Local-mean binarization: a pixel becomes 255 when it is brighter than
/// the mean of its `block_size x block_size` window minus `bias`, else 0.
///
/// Windows are clipped at the border and averaged over the pixels they
/// actually cover.
pub fn adaptive_mean_threshold(src: &GrayImage, block_size: u32, bias: f64) -> GrayImage {
    let (w, h) = (src.width() as usize, src.height() as usize);
    if w == 0 || h == 0 {
        return src.clone();
    }
    let r = (block_size.max(1) / 2) as usize;

    // Summed-area table with a zero row/column of padding.
    let stride = w + 1;
    let mut integral = vec![0u64; stride * (h + 1)];
    for y in 0..h {
        let mut row = 0u64;
        for x in 0..w {
            row += src.get_pixel(x as u32, y as u32)[0] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row;
        }
    }

    GrayImage::from_fn(w as u32, h as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let x0 = x.saturating_sub(r);
        let y0 = y.saturating_sub(r);
        let x1 = (x + r + 1).min(w);
        let y1 = (y + r + 1).min(h);
        let total = integral[y1 * stride + x1] + integral[y0 * stride + x0]
            - integral[y0 * stride + x1]
            - integral[y1 * stride + x0];
        let count = ((x1 - x0) * (y1 - y0)) as f64;
        let mean = total as f64 / count;
        let v = src.get_pixel(x as u32, y as u32)[0] as f64;
        Luma([if v > mean - bias { 255 } else { 0 }])
    })
}

/// Lower median of all gray levels.
pub fn gray_median(src: &GrayImage) -> u8 {
    let mut hist = [0u64; 256];
    for p in src.pixels() {
        hist[p[0] as usize] += 1;
    }
    let total: u64 = hist.iter().sum();
    if total == 0 {
        return 0;
    }
    let half = total.div_ceil(2);
    let mut acc = 0u64;
    for (level, &count) in hist.iter().enumerate() {
        acc += count;
        if acc >= half {
            return level as u8;
        }
    }
    255
}
