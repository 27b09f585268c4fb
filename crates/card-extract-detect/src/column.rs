//! Card search inside a single, already rectified tableau column.

use image::RgbImage;

use crate::{CardExtractor, ExtractError, ExtractedRegion, ExtractorParams, LayoutKind, SelectionRule};

/// Find the one card in `column` whose edges are near-vertical.
///
/// `params` supplies the edge map, tolerance, canonical and icon settings;
/// the region count and layout are forced to a single card, and a
/// non-oriented selection rule is replaced by [`SelectionRule::oriented`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip(column, params), fields(width = column.width(), height = column.height()))
)]
pub fn extract_card_in_column(column: &RgbImage, params: &ExtractorParams) -> Result<ExtractedRegion, ExtractError> {
    let selection = match params.selection {
        rule @ SelectionRule::Oriented { .. } => rule,
        _ => SelectionRule::oriented(),
    };
    let extractor = CardExtractor::new(ExtractorParams {
        regions: 1,
        selection,
        layout: LayoutKind::Single,
        ..params.clone()
    })?;
    extractor
        .extract_regions(column)?
        .pop()
        .ok_or(ExtractError::InsufficientRegions { found: 0, required: 1 })
}
