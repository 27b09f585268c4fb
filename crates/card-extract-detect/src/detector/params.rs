use serde::{Deserialize, Serialize};

use super::ParamsError;
use crate::{EdgeMapParams, IconCropParams, LayoutKind, RectifyParams, SelectionRule};

/// Everything that distinguishes one extraction mode from another.
///
/// The presets cover the layouts the pipeline was tuned on; any field can
/// be overridden (for instance from a JSON config) before building a
/// [`super::CardExtractor`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorParams {
    /// Exact number of regions the layout holds.
    pub regions: usize,
    /// Minimum oriented-rectangle area (px²) a selected region must exceed.
    pub area_tolerance: f32,
    pub edges: EdgeMapParams,
    pub selection: SelectionRule,
    pub rectify: RectifyParams,
    pub icon: IconCropParams,
    pub layout: LayoutKind,
}

impl Default for ExtractorParams {
    fn default() -> Self {
        Self::tableau()
    }
}

impl ExtractorParams {
    /// Solitaire play state: talon plus seven columns.
    pub fn tableau() -> Self {
        Self {
            regions: 8,
            area_tolerance: 100_000.0,
            edges: EdgeMapParams::default(),
            selection: SelectionRule::LargestArea,
            rectify: RectifyParams::card(4),
            icon: IconCropParams::card_corner(),
            layout: LayoutKind::Tableau,
        }
    }

    /// One suit laid out in two rows of seven for dataset creation.
    pub fn dataset_grid() -> Self {
        Self {
            regions: 14,
            area_tolerance: 50_000.0,
            icon: IconCropParams::dataset(),
            layout: LayoutKind::Grid { rows: 2 },
            ..Self::tableau()
        }
    }

    /// A single card filling most of the frame.
    pub fn single_card() -> Self {
        Self {
            regions: 1,
            area_tolerance: 100_000.0,
            edges: EdgeMapParams::close_up(),
            selection: SelectionRule::card_aspect(),
            layout: LayoutKind::Single,
            ..Self::tableau()
        }
    }

    /// Top card of an already rectified tableau column.
    pub fn column_card() -> Self {
        Self {
            regions: 1,
            area_tolerance: 50_000.0,
            selection: SelectionRule::oriented(),
            layout: LayoutKind::Single,
            ..Self::tableau()
        }
    }

    /// Check the parameters for internal consistency.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.regions == 0 {
            return Err(ParamsError::NoRegions);
        }
        if !self.area_tolerance.is_finite() || self.area_tolerance < 0.0 {
            return Err(ParamsError::InvalidTolerance(self.area_tolerance));
        }
        let (w, h) = (self.rectify.width, self.rectify.height);
        if w == 0 || h == 0 {
            return Err(ParamsError::EmptyCanonical {
                width: w,
                height: h,
            });
        }
        self.icon.validate(w, h)?;
        self.layout.validate(self.regions)
    }
}
