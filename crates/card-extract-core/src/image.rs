use image::{DynamicImage, GrayImage, Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

/// Channel layout of a [`RasterImage`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelDepth {
    Gray,
    Color,
    ColorAlpha,
}

impl ChannelDepth {
    pub fn channels(self) -> usize {
        match self {
            ChannelDepth::Gray => 1,
            ChannelDepth::Color => 3,
            ChannelDepth::ColorAlpha => 4,
        }
    }
}

/// Owned input raster as supplied by the acquisition side.
///
/// The pipeline normalizes every variant to 3-channel color at entry
/// via [`RasterImage::into_rgb`].
#[derive(Clone, Debug)]
pub enum RasterImage {
    Gray(GrayImage),
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl RasterImage {
    pub fn width(&self) -> u32 {
        match self {
            RasterImage::Gray(img) => img.width(),
            RasterImage::Rgb(img) => img.width(),
            RasterImage::Rgba(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            RasterImage::Gray(img) => img.height(),
            RasterImage::Rgb(img) => img.height(),
            RasterImage::Rgba(img) => img.height(),
        }
    }

    pub fn depth(&self) -> ChannelDepth {
        match self {
            RasterImage::Gray(_) => ChannelDepth::Gray,
            RasterImage::Rgb(_) => ChannelDepth::Color,
            RasterImage::Rgba(_) => ChannelDepth::ColorAlpha,
        }
    }

    /// Drop alpha / replicate gray so every stage sees 3-channel color.
    pub fn into_rgb(self) -> RgbImage {
        match self {
            RasterImage::Rgb(img) => img,
            RasterImage::Rgba(img) => DynamicImage::ImageRgba8(img).to_rgb8(),
            RasterImage::Gray(img) => {
                RgbImage::from_fn(img.width(), img.height(), |x, y| {
                    let v = img.get_pixel(x, y)[0];
                    Rgb([v, v, v])
                })
            }
        }
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(img: DynamicImage) -> Self {
        match img {
            DynamicImage::ImageLuma8(gray) => RasterImage::Gray(gray),
            DynamicImage::ImageRgb8(rgb) => RasterImage::Rgb(rgb),
            DynamicImage::ImageRgba8(rgba) => RasterImage::Rgba(rgba),
            other if other.color().has_alpha() => RasterImage::Rgba(other.to_rgba8()),
            other => RasterImage::Rgb(other.to_rgb8()),
        }
    }
}

impl From<RgbImage> for RasterImage {
    fn from(img: RgbImage) -> Self {
        RasterImage::Rgb(img)
    }
}

impl From<RgbaImage> for RasterImage {
    fn from(img: RgbaImage) -> Self {
        RasterImage::Rgba(img)
    }
}

impl From<GrayImage> for RasterImage {
    fn from(img: GrayImage) -> Self {
        RasterImage::Gray(img)
    }
}

#[inline]
fn get_rgb(src: &RgbImage, x: i32, y: i32) -> [f32; 3] {
    if x < 0 || y < 0 || x >= src.width() as i32 || y >= src.height() as i32 {
        return [0.0; 3];
    }
    let p = src.get_pixel(x as u32, y as u32);
    [p[0] as f32, p[1] as f32, p[2] as f32]
}

/// Bilinear sample of a color image; out-of-bounds taps read as black.
#[inline]
pub fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let x0 = x.floor() as i32;
    let y0 = y.floor() as i32;
    let fx = x - x0 as f32;
    let fy = y - y0 as f32;

    let p00 = get_rgb(src, x0, y0);
    let p10 = get_rgb(src, x0 + 1, y0);
    let p01 = get_rgb(src, x0, y0 + 1);
    let p11 = get_rgb(src, x0 + 1, y0 + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = (a + fy * (b - a)).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    #[test]
    fn rgba_input_drops_alpha() {
        let rgba = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 0]));
        let raster = RasterImage::from(rgba);
        assert_eq!(raster.depth(), ChannelDepth::ColorAlpha);
        let rgb = raster.into_rgb();
        assert_eq!(rgb.dimensions(), (3, 2));
        assert_eq!(*rgb.get_pixel(2, 1), Rgb([10, 20, 30]));
    }

    #[test]
    fn gray_input_is_replicated() {
        let gray = GrayImage::from_pixel(2, 2, Luma([77]));
        let rgb = RasterImage::from(gray).into_rgb();
        assert_eq!(*rgb.get_pixel(1, 1), Rgb([77, 77, 77]));
    }

    #[test]
    fn bilinear_interpolates_between_pixels() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 0]));
        img.put_pixel(1, 0, Rgb([100, 200, 50]));
        assert_eq!(sample_bilinear_rgb(&img, 0.5, 0.0), Rgb([50, 100, 25]));
        assert_eq!(sample_bilinear_rgb(&img, -5.0, 0.0), Rgb([0, 0, 0]));
    }
}
