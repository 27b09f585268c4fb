use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{ChannelDepth, RasterImage};
use crate::pipeline::{CardExtractor, ExtractError, Extraction, ExtractorParams, ParamsError, Slot};
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Params(#[from] ParamsError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Wrap a raw interleaved pixel buffer (`Gray`, `RGB` or `RGBA`, row-major,
/// no padding) into a [`RasterImage`].
pub fn raster_from_slice(
    width: u32,
    height: u32,
    depth: ChannelDepth,
    pixels: &[u8],
) -> Result<RasterImage, DetectError> {
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidDimensions { width, height });
    }
    let w = usize::try_from(width).ok();
    let h = usize::try_from(height).ok();
    let Some(expected) = w
        .zip(h)
        .and_then(|(w, h)| w.checked_mul(h))
        .and_then(|n| n.checked_mul(depth.channels()))
    else {
        return Err(DetectError::InvalidDimensions { width, height });
    };
    if pixels.len() != expected {
        return Err(DetectError::InvalidBuffer {
            expected,
            got: pixels.len(),
        });
    }
    let buf = pixels.to_vec();
    let raster = match depth {
        ChannelDepth::Gray => GrayImage::from_raw(width, height, buf).map(RasterImage::Gray),
        ChannelDepth::Color => RgbImage::from_raw(width, height, buf).map(RasterImage::Rgb),
        ChannelDepth::ColorAlpha => RgbaImage::from_raw(width, height, buf).map(RasterImage::Rgba),
    };
    raster.ok_or(DetectError::InvalidDimensions { width, height })
}

/// Run the extraction pipeline on a decoded image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn extract_image(img: DynamicImage, params: ExtractorParams) -> Result<Extraction, DetectError> {
    crate::core::init();
    let extractor = CardExtractor::new(params)?;
    Ok(extractor.extract(RasterImage::from(img))?)
}

/// Decode `path` and run the extraction pipeline on it.
pub fn extract_from_path(path: impl AsRef<Path>, params: ExtractorParams) -> Result<Extraction, DetectError> {
    let img = image::open(path)?;
    extract_image(img, params)
}

/// Run the extraction pipeline on a raw pixel buffer.
pub fn extract_from_u8(
    width: u32,
    height: u32,
    depth: ChannelDepth,
    pixels: &[u8],
    params: ExtractorParams,
) -> Result<Extraction, DetectError> {
    crate::core::init();
    let raster = raster_from_slice(width, height, depth, pixels)?;
    let extractor = CardExtractor::new(params)?;
    Ok(extractor.extract(raster)?)
}

/// Write every icon as `<slot>.png` into `dir` (created if missing).
/// Returns the written paths in slot order.
pub fn save_icons(extraction: &Extraction, dir: impl AsRef<Path>) -> Result<Vec<(Slot, PathBuf)>, DetectError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(extraction.len());
    for s in &extraction.slots {
        let path = dir.join(format!("{}.png", s.slot));
        s.region.icon.save(&path)?;
        log::debug!("wrote {}", path.display());
        written.push((s.slot, path));
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LayoutKind;
    use image::Rgb;

    fn single_card_scene() -> RgbImage {
        let mut img = RgbImage::from_pixel(200, 200, Rgb([90, 90, 90]));
        for y in 30..150 {
            for x in 50..130 {
                img.put_pixel(x, y, Rgb([240, 240, 240]));
            }
        }
        img
    }

    fn small_single() -> ExtractorParams {
        ExtractorParams {
            regions: 1,
            area_tolerance: 5_000.0,
            layout: LayoutKind::Single,
            ..ExtractorParams::tableau()
        }
    }

    #[test]
    fn buffer_length_is_checked() {
        let err = raster_from_slice(4, 4, ChannelDepth::Color, &[0; 47]).unwrap_err();
        assert!(matches!(err, DetectError::InvalidBuffer { expected: 48, got: 47 }));
    }

    #[test]
    fn empty_dimensions_are_rejected() {
        let err = raster_from_slice(0, 0, ChannelDepth::Color, &[]).unwrap_err();
        assert!(matches!(err, DetectError::InvalidDimensions { width: 0, height: 0 }));
        let err = raster_from_slice(5, 0, ChannelDepth::Gray, &[]).unwrap_err();
        assert!(matches!(err, DetectError::InvalidDimensions { width: 5, height: 0 }));
        assert!(matches!(
            extract_from_u8(0, 0, ChannelDepth::Color, &[], ExtractorParams::tableau()),
            Err(DetectError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn buffer_depth_is_preserved() {
        let raster = raster_from_slice(2, 3, ChannelDepth::ColorAlpha, &[7; 24]).unwrap();
        assert_eq!(raster.depth(), ChannelDepth::ColorAlpha);
        assert_eq!((raster.width(), raster.height()), (2, 3));
    }

    #[test]
    fn raw_buffer_extraction_and_icon_export() {
        let img = single_card_scene();
        let (w, h) = img.dimensions();
        let extraction = extract_from_u8(w, h, ChannelDepth::Color, img.as_raw(), small_single()).unwrap();
        assert_eq!(extraction.len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let written = save_icons(&extraction, dir.path()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].0, Slot::Card);
        assert!(written[0].1.ends_with("card.png"));
        let icon = image::open(&written[0].1).unwrap();
        assert_eq!((icon.width(), icon.height()), (15, 45));
    }

    #[test]
    fn invalid_params_surface_as_params_error() {
        let img = DynamicImage::ImageRgb8(single_card_scene());
        let params = ExtractorParams {
            regions: 0,
            ..small_single()
        };
        assert!(matches!(extract_image(img, params), Err(DetectError::Params(_))));
    }
}
