use card_extract_core::RasterImage;
use image::RgbImage;

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::{ExtractError, ExtractedRegion, Extraction, ExtractorParams, ParamsError, SlottedIcon};
use crate::candidates::extract_candidates;
use crate::edges::{build_edge_map, CannyThresholds};
use crate::icon::crop_icon;
use crate::layout::{layout_order, SlotMap};
use crate::ranking::{select_regions, validate_area};
use crate::rectify::rectify_region;

/// Regions in selection (area-descending) order plus edge diagnostics.
struct Detected {
    regions: Vec<ExtractedRegion>,
    thresholds: CannyThresholds,
    contours: usize,
}

/// Parameterized extraction pipeline for one layout.
///
/// Holds no mutable state: a single extractor can serve concurrent calls.
#[derive(Clone, Debug)]
pub struct CardExtractor {
    params: ExtractorParams,
    slot_map: SlotMap,
}

impl CardExtractor {
    /// Validate `params` and build the slot map for its layout.
    pub fn new(params: ExtractorParams) -> Result<Self, ParamsError> {
        params.validate()?;
        let slot_map = SlotMap::for_layout(params.layout, params.regions)?;
        Ok(Self { params, slot_map })
    }

    #[inline]
    pub fn params(&self) -> &ExtractorParams {
        &self.params
    }

    #[inline]
    pub fn slot_map(&self) -> &SlotMap {
        &self.slot_map
    }

    /// Normalize `image` to 3-channel color and run the full pipeline.
    pub fn extract(&self, image: RasterImage) -> Result<Extraction, ExtractError> {
        let rgb = image.into_rgb();
        self.extract_rgb(&rgb)
    }

    /// Run the full pipeline and assign every region to its slot.
    ///
    /// Either every slot is filled or the call fails; there is no partial
    /// result.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, image), fields(width = image.width(), height = image.height(), regions = self.params.regions))
    )]
    pub fn extract_rgb(&self, image: &RgbImage) -> Result<Extraction, ExtractError> {
        let Detected {
            regions,
            thresholds,
            contours,
        } = self.detect(image)?;

        let centroids: Vec<_> = regions.iter().map(|r| r.centroid).collect();
        let order = layout_order(self.params.layout, &centroids);

        let mut pool: Vec<Option<ExtractedRegion>> = regions.into_iter().map(Some).collect();
        let slots: Vec<SlottedIcon> = self
            .slot_map
            .slots()
            .iter()
            .zip(order)
            .filter_map(|(&slot, idx)| pool.get_mut(idx)?.take().map(|region| SlottedIcon { slot, region }))
            .collect();
        debug_assert_eq!(slots.len(), self.slot_map.len());

        Ok(Extraction {
            slots,
            thresholds,
            contours,
        })
    }

    /// Run stages up to icon cropping, skipping slot assignment. Regions
    /// come back largest first.
    pub fn extract_regions(&self, image: &RgbImage) -> Result<Vec<ExtractedRegion>, ExtractError> {
        self.detect(image).map(|d| d.regions)
    }

    fn detect(&self, image: &RgbImage) -> Result<Detected, ExtractError> {
        let p = &self.params;
        if image.width() == 0 || image.height() == 0 {
            return Err(ExtractError::InsufficientRegions {
                found: 0,
                required: p.regions,
            });
        }
        let edge_map = build_edge_map(image, &p.edges);
        let set = extract_candidates(&edge_map.edges, p.edges.max_contours);
        drop(edge_map.edges);
        log::debug!("{} external contours, {} regions required", set.len(), p.regions);

        set.require(p.regions)?;
        let image_area = image.width() as f32 * image.height() as f32;
        let selected = select_regions(&set, &p.selection, p.regions, image_area)?;
        validate_area(&set, &selected, p.area_tolerance)?;

        let mut regions = Vec::with_capacity(selected.len());
        for (index, cand) in selected.iter().enumerate() {
            let rect = *set
                .rect(cand.contour_index)
                .ok_or(ExtractError::DegenerateRegion { index })?;
            let rectified =
                rectify_region(image, &rect, &p.rectify).ok_or(ExtractError::DegenerateRegion { index })?;
            let icon = crop_icon(&rectified.image, &p.icon, rectified.rotated)?;
            log::debug!(
                "region {} (contour {}): {:.1}x{:.1} @ {:.1} deg, rotated: {}",
                index,
                cand.contour_index,
                rect.width,
                rect.height,
                rect.angle_deg,
                rectified.rotated
            );
            regions.push(ExtractedRegion {
                icon,
                rectified: rectified.image,
                centroid: cand.center,
                rect,
                contour_index: cand.contour_index,
                rotated: rectified.rotated,
            });
        }

        Ok(Detected {
            regions,
            thresholds: edge_map.thresholds,
            contours: set.len(),
        })
    }
}
