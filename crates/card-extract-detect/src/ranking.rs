//! Top-K region selection and area validation.

use serde::{Deserialize, Serialize};

use crate::candidates::{CandidateSet, RegionCandidate};
use crate::ExtractError;

/// Physical card short/long side ratio (2.5in x 3.5in).
pub const CARD_ASPECT_RATIO: f32 = 2.5 / 3.5;

/// Rule used to pick the regions that go on to rectification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionRule {
    /// Largest `K` by area.
    #[default]
    LargestArea,
    /// Card-in-column search: drop regions covering `max_area_frac` of the
    /// image or more, keep those whose angle lies strictly inside
    /// `(angle_min, angle_max)`, then take the largest.
    ///
    /// Angles are in `(0, 90]`, so any `angle_max` above 90 only admits the
    /// upright case. The window is one-sided: a small tilt one way reads
    /// close to 90 and passes, the mirrored tilt reads close to 0 and is
    /// rejected.
    Oriented {
        max_area_frac: f32,
        angle_min: f32,
        angle_max: f32,
    },
    /// Keep regions whose short/long ratio is within `tolerance` of
    /// `ratio`, then take the largest.
    AspectRatio { ratio: f32, tolerance: f32 },
}

impl SelectionRule {
    pub fn oriented() -> Self {
        SelectionRule::Oriented {
            max_area_frac: 0.9,
            angle_min: 80.0,
            angle_max: 110.0,
        }
    }

    pub fn card_aspect() -> Self {
        SelectionRule::AspectRatio {
            ratio: CARD_ASPECT_RATIO,
            tolerance: 0.12,
        }
    }
}

fn by_area_desc(mut v: Vec<RegionCandidate>) -> Vec<RegionCandidate> {
    // Stable: equal areas keep discovery order.
    v.sort_by(|a, b| b.area.total_cmp(&a.area));
    v
}

/// Select `count` candidates from `set` according to `rule`.
///
/// `image_area` is the pixel area of the image the contours came from.
pub fn select_regions(
    set: &CandidateSet,
    rule: &SelectionRule,
    count: usize,
    image_area: f32,
) -> Result<Vec<RegionCandidate>, ExtractError> {
    let candidates = set.candidates();
    let eligible: Vec<RegionCandidate> = match *rule {
        SelectionRule::LargestArea => candidates,
        SelectionRule::Oriented {
            max_area_frac,
            angle_min,
            angle_max,
        } => {
            let ceiling = max_area_frac * image_area;
            let kept: Vec<RegionCandidate> = candidates
                .into_iter()
                .filter(|c| {
                    let angle = set.rects()[c.contour_index].angle_deg;
                    c.area < ceiling && angle > angle_min && angle < angle_max
                })
                .collect();
            if kept.is_empty() {
                return Err(ExtractError::OrientationOutOfRange {
                    contours: set.len(),
                });
            }
            kept
        }
        SelectionRule::AspectRatio { ratio, tolerance } => candidates
            .into_iter()
            .filter(|c| {
                let rect = &set.rects()[c.contour_index];
                let (short, long) = if rect.width < rect.height {
                    (rect.width, rect.height)
                } else {
                    (rect.height, rect.width)
                };
                long > 0.0 && (ratio - short / long).abs() < tolerance
            })
            .collect(),
    };

    if eligible.len() < count {
        return Err(ExtractError::InsufficientRegions {
            found: eligible.len(),
            required: count,
        });
    }
    let mut ranked = by_area_desc(eligible);
    ranked.truncate(count);
    Ok(ranked)
}

/// Every selected region must have an area strictly above `tolerance`.
/// The first one that does not aborts the whole extraction.
pub fn validate_area(
    set: &CandidateSet,
    selected: &[RegionCandidate],
    tolerance: f32,
) -> Result<(), ExtractError> {
    for (index, cand) in selected.iter().enumerate() {
        let Some(rect) = set.rect(cand.contour_index) else {
            return Err(ExtractError::DegenerateRegion { index });
        };
        let area = rect.width * rect.height;
        if !(area > tolerance) {
            log::warn!(
                "region {} below tolerance: {:.1}x{:.1} (contours: {})",
                index,
                rect.width,
                rect.height,
                set.len()
            );
            return Err(ExtractError::RegionBelowAreaTolerance {
                index,
                contour_index: cand.contour_index,
                width: rect.width,
                height: rect.height,
                area,
                tolerance,
            });
        }
    }
    Ok(())
}
