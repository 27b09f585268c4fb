use card_extract_core::{adaptive_mean_threshold, rgb_to_gray};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use serde::{Deserialize, Serialize};

use crate::ParamsError;

/// Corner of the rectified card the crop offsets are measured from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IconAnchor {
    #[default]
    TopLeft,
    /// Offsets are insets from the bottom-right corner to the crop's
    /// bottom-right corner.
    BottomRight,
}

/// Where the rank/suit icon sits on the rectified card and how it is
/// normalized.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconCropParams {
    pub anchor: IconAnchor,
    pub offset_x: u32,
    pub offset_y: u32,
    pub crop_width: u32,
    pub crop_height: u32,
    /// Adaptive threshold window, odd and >= 3.
    pub block_size: u32,
    /// Subtracted from the local mean before comparing.
    pub bias: f64,
    pub out_width: u32,
    pub out_height: u32,
    /// Turn the icon half a turn when the card was rotated during
    /// rectification.
    pub flip_when_rotated: bool,
}

impl Default for IconCropParams {
    fn default() -> Self {
        Self::card_corner()
    }
}

impl IconCropParams {
    /// Rank and suit column in the top-left corner of a 228x348 card.
    pub fn card_corner() -> Self {
        Self {
            anchor: IconAnchor::TopLeft,
            offset_x: 5,
            offset_y: 5,
            crop_width: 30,
            crop_height: 90,
            block_size: 15,
            bias: 10.0,
            out_width: 15,
            out_height: 45,
            flip_when_rotated: false,
        }
    }

    /// Larger corner crop kept at native size, used for building
    /// training sets.
    pub fn dataset() -> Self {
        Self {
            offset_x: 4,
            offset_y: 4,
            crop_width: 40,
            crop_height: 100,
            out_width: 40,
            out_height: 100,
            ..Self::card_corner()
        }
    }

    /// Upper half of the corner column: rank glyph only.
    pub fn rank_only() -> Self {
        Self {
            crop_height: 50,
            out_width: 13,
            out_height: 25,
            ..Self::card_corner()
        }
    }

    /// Same crop taken from the rotationally symmetric bottom-right corner.
    pub fn mirrored_corner() -> Self {
        Self {
            anchor: IconAnchor::BottomRight,
            flip_when_rotated: true,
            ..Self::card_corner()
        }
    }

    /// Crop rectangle `(x, y, w, h)` on a `canvas_w x canvas_h` canvas.
    pub fn crop_rect(&self, canvas_w: u32, canvas_h: u32) -> Result<(u32, u32, u32, u32), ParamsError> {
        let (x, y) = match self.anchor {
            IconAnchor::TopLeft => (self.offset_x as i64, self.offset_y as i64),
            IconAnchor::BottomRight => (
                canvas_w as i64 - self.offset_x as i64 - self.crop_width as i64,
                canvas_h as i64 - self.offset_y as i64 - self.crop_height as i64,
            ),
        };
        let fits = x >= 0
            && y >= 0
            && x + self.crop_width as i64 <= canvas_w as i64
            && y + self.crop_height as i64 <= canvas_h as i64;
        if !fits || self.crop_width == 0 || self.crop_height == 0 {
            return Err(ParamsError::IconCropOutOfBounds {
                x,
                y,
                width: self.crop_width,
                height: self.crop_height,
                canvas_w,
                canvas_h,
            });
        }
        Ok((x as u32, y as u32, self.crop_width, self.crop_height))
    }

    pub fn validate(&self, canvas_w: u32, canvas_h: u32) -> Result<(), ParamsError> {
        if self.out_width == 0 || self.out_height == 0 {
            return Err(ParamsError::EmptyIcon {
                width: self.out_width,
                height: self.out_height,
            });
        }
        if self.block_size < 3 || self.block_size % 2 == 0 {
            return Err(ParamsError::InvalidBlockSize(self.block_size));
        }
        self.crop_rect(canvas_w, canvas_h).map(|_| ())
    }
}

/// Crop, binarize and resize the icon region of a rectified card.
///
/// The output is a two-level image (0 or 255 before resampling) of
/// `out_width x out_height`.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(card, params)))]
pub fn crop_icon(card: &RgbImage, params: &IconCropParams, rotated: bool) -> Result<GrayImage, ParamsError> {
    let (x, y, w, h) = params.crop_rect(card.width(), card.height())?;
    let crop = imageops::crop_imm(card, x, y, w, h).to_image();
    let gray = rgb_to_gray(&crop);
    let binary = adaptive_mean_threshold(&gray, params.block_size, params.bias);
    let icon = imageops::resize(&binary, params.out_width, params.out_height, FilterType::Triangle);
    Ok(if rotated && params.flip_when_rotated {
        imageops::rotate180(&icon)
    } else {
        icon
    })
}
