use card_extract_core::OrientedRect;
use image::{GrayImage, RgbImage};
use nalgebra::Point2;

use crate::{CannyThresholds, Slot};

/// One validated region after rectification and icon cropping.
#[derive(Clone, Debug)]
pub struct ExtractedRegion {
    /// Binarized icon at the configured output size.
    pub icon: GrayImage,
    /// Canonical-size rectified card.
    pub rectified: RgbImage,
    /// Rectangle center in source image coordinates.
    pub centroid: Point2<f32>,
    pub rect: OrientedRect,
    /// Index of the source contour in discovery order.
    pub contour_index: usize,
    /// A quarter turn was applied during rectification.
    pub rotated: bool,
}

/// Region placed into its layout slot.
#[derive(Clone, Debug)]
pub struct SlottedIcon {
    pub slot: Slot,
    pub region: ExtractedRegion,
}

/// Output of a successful extraction: exactly one entry per slot, in slot
/// order.
#[derive(Clone, Debug)]
pub struct Extraction {
    pub slots: Vec<SlottedIcon>,
    /// Canny thresholds used for the edge map.
    pub thresholds: CannyThresholds,
    /// External contours found (after the contour cap).
    pub contours: usize,
}

impl Extraction {
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Icons in slot order.
    pub fn icons(&self) -> impl Iterator<Item = &GrayImage> {
        self.slots.iter().map(|s| &s.region.icon)
    }

    pub fn get(&self, slot: Slot) -> Option<&ExtractedRegion> {
        self.slots.iter().find(|s| s.slot == slot).map(|s| &s.region)
    }

    pub fn into_icons(self) -> Vec<(Slot, GrayImage)> {
        self.slots.into_iter().map(|s| (s.slot, s.region.icon)).collect()
    }
}
