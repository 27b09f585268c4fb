//! External contours of an edge map and their oriented rectangles.

use card_extract_core::OrientedRect;
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::ExtractError;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Closed boundary traced from an edge map.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    points: Vec<Point2<f32>>,
}

impl Contour {
    pub fn new(points: Vec<Point2<f32>>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[Point2<f32>] {
        &self.points
    }

    fn bbox_area(&self) -> f32 {
        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for p in &self.points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if self.points.is_empty() {
            0.0
        } else {
            (max_x - min_x) * (max_y - min_y)
        }
    }
}

/// Lightweight ranking record for one contour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionCandidate {
    pub contour_index: usize,
    pub area: f32,
    pub center: Point2<f32>,
}

/// Contours in discovery order with one oriented rectangle each.
#[derive(Clone, Debug, Default)]
pub struct CandidateSet {
    contours: Vec<Contour>,
    rects: Vec<OrientedRect>,
}

impl CandidateSet {
    /// Fit rectangles to the given contours. Empty contours are dropped.
    pub fn new(contours: Vec<Contour>) -> Self {
        let (contours, rects) = contours
            .into_iter()
            .filter_map(|c| {
                let rect = OrientedRect::enclosing(c.points())?;
                Some((c, rect))
            })
            .unzip();
        Self { contours, rects }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    pub fn rects(&self) -> &[OrientedRect] {
        &self.rects
    }

    pub fn rect(&self, contour_index: usize) -> Option<&OrientedRect> {
        self.rects.get(contour_index)
    }

    /// One ranking record per contour, in discovery order.
    pub fn candidates(&self) -> Vec<RegionCandidate> {
        self.rects
            .iter()
            .enumerate()
            .map(|(contour_index, rect)| RegionCandidate {
                contour_index,
                area: rect.area(),
                center: rect.center,
            })
            .collect()
    }

    /// Fail with `InsufficientRegions` when fewer than `required` contours
    /// were found.
    pub fn require(&self, required: usize) -> Result<(), ExtractError> {
        if self.len() < required {
            return Err(ExtractError::InsufficientRegions {
                found: self.len(),
                required,
            });
        }
        Ok(())
    }
}

/// Trace outermost contours of `edges` (nested contours are ignored) and
/// fit an oriented rectangle to each.
///
/// At most `max_contours` contours are fitted; when more are present, the
/// ones with the largest axis-aligned bounding box are kept, still in
/// discovery order.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(edges), fields(width = edges.width(), height = edges.height()))
)]
pub fn extract_candidates(edges: &GrayImage, max_contours: usize) -> CandidateSet {
    let mut contours: Vec<Contour> = find_contours::<i32>(edges)
        .into_iter()
        .filter(|c| matches!(c.border_type, BorderType::Outer) && c.parent.is_none())
        .map(|c| {
            Contour::new(
                c.points
                    .iter()
                    .map(|p| Point2::new(p.x as f32, p.y as f32))
                    .collect(),
            )
        })
        .collect();

    if contours.len() > max_contours {
        log::warn!(
            "{} external contours exceed the bound of {}; keeping the largest",
            contours.len(),
            max_contours
        );
        let mut order: Vec<(usize, f32)> = contours
            .iter()
            .enumerate()
            .map(|(i, c)| (i, c.bbox_area()))
            .collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));
        let mut keep = vec![false; contours.len()];
        for &(i, _) in order.iter().take(max_contours) {
            keep[i] = true;
        }
        let mut flags = keep.into_iter();
        contours.retain(|_| flags.next().unwrap_or(false));
    }

    let set = CandidateSet::new(contours);
    log::debug!("{} external contours", set.len());
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn outline(img: &mut GrayImage, x0: u32, y0: u32, w: u32, h: u32) {
        for x in x0..x0 + w {
            img.put_pixel(x, y0, Luma([255]));
            img.put_pixel(x, y0 + h - 1, Luma([255]));
        }
        for y in y0..y0 + h {
            img.put_pixel(x0, y, Luma([255]));
            img.put_pixel(x0 + w - 1, y, Luma([255]));
        }
    }

    #[test]
    fn nested_outlines_are_ignored() {
        let mut edges = GrayImage::new(100, 80);
        outline(&mut edges, 10, 10, 60, 50);
        outline(&mut edges, 20, 20, 10, 10);
        outline(&mut edges, 80, 10, 10, 30);

        let set = extract_candidates(&edges, 100);
        assert_eq!(set.len(), 2);
        let mut areas: Vec<f32> = set.candidates().iter().map(|c| c.area).collect();
        areas.sort_by(|a, b| b.total_cmp(a));
        assert!((areas[0] - 59.0 * 49.0).abs() < 1.0);
        assert!((areas[1] - 9.0 * 29.0).abs() < 1.0);
    }

    #[test]
    fn contour_bound_keeps_largest() {
        let mut edges = GrayImage::new(120, 40);
        outline(&mut edges, 2, 2, 8, 8);
        outline(&mut edges, 20, 2, 30, 30);
        outline(&mut edges, 60, 2, 12, 12);

        let set = extract_candidates(&edges, 2);
        assert_eq!(set.len(), 2);
        let centers: Vec<f32> = set.candidates().iter().map(|c| c.center.x).collect();
        assert!(centers.iter().all(|&x| x > 15.0));
    }

    #[test]
    fn require_reports_counts() {
        let set = CandidateSet::default();
        assert_eq!(
            set.require(3),
            Err(ExtractError::InsufficientRegions {
                found: 0,
                required: 3
            })
        );
        assert!(set.require(0).is_ok());
    }
}
