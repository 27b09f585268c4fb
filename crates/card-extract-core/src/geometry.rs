//! Convex hull and minimum-area oriented rectangles.
//!
//! Angle convention for [`OrientedRect`]: the first axis
//! `u = (cos θ, sin θ)` spans `width`, the perpendicular axis
//! `v = (-sin θ, cos θ)` spans `height`, and `θ` is normalized into
//! `(0°, 90°]`. An axis-aligned rectangle therefore reports `θ = 90°`, with
//! `width` equal to its vertical extent and `height` to its horizontal one.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

// atan2 of an exactly vertical edge lands a few ulps off 90.
const ANGLE_EPS_DEG: f32 = 1e-3;

#[inline]
fn cross(o: &Point2<f32>, a: &Point2<f32>, b: &Point2<f32>) -> f32 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Monotone-chain convex hull. Collinear points are dropped.
pub fn convex_hull(points: &[Point2<f32>]) -> Vec<Point2<f32>> {
    let mut pts: Vec<Point2<f32>> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f32>> = Vec::with_capacity(pts.len() + 1);
    for p in pts.iter() {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Minimum-area bounding rectangle at arbitrary rotation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrientedRect {
    pub center: Point2<f32>,
    pub width: f32,
    pub height: f32,
    /// Direction of the `width` axis in degrees, in `(0, 90]`.
    pub angle_deg: f32,
}

impl OrientedRect {
    /// Build a rectangle from extents along an axis at `theta_deg`,
    /// renormalizing the angle into `(0, 90]`.
    pub fn new(center: Point2<f32>, extent_u: f32, extent_v: f32, theta_deg: f32) -> Self {
        let mut theta = theta_deg.rem_euclid(180.0);
        let (mut width, mut height) = (extent_u.max(0.0), extent_v.max(0.0));
        if theta > 90.0 + ANGLE_EPS_DEG {
            theta -= 90.0;
            std::mem::swap(&mut width, &mut height);
        }
        if theta <= ANGLE_EPS_DEG {
            theta = 90.0;
            std::mem::swap(&mut width, &mut height);
        }
        Self {
            center,
            width,
            height,
            angle_deg: theta.min(90.0),
        }
    }

    /// Smallest enclosing rectangle of a point set (rotating calipers over
    /// the convex hull). Returns `None` for an empty set.
    pub fn enclosing(points: &[Point2<f32>]) -> Option<Self> {
        let hull = convex_hull(points);
        match hull.len() {
            0 => None,
            1 | 2 => {
                let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
                let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
                for p in &hull {
                    min_x = min_x.min(p.x);
                    min_y = min_y.min(p.y);
                    max_x = max_x.max(p.x);
                    max_y = max_y.max(p.y);
                }
                let center = Point2::new((min_x + max_x) * 0.5, (min_y + max_y) * 0.5);
                Some(Self::new(center, max_x - min_x, max_y - min_y, 0.0))
            }
            n => {
                let mut best: Option<(f32, Self)> = None;
                for i in 0..n {
                    let origin = hull[i];
                    let edge = hull[(i + 1) % n] - origin;
                    let len = edge.norm();
                    if len < f32::EPSILON {
                        continue;
                    }
                    let u = edge / len;
                    let v = Vector2::new(-u.y, u.x);

                    let (mut min_u, mut max_u) = (f32::MAX, f32::MIN);
                    let (mut min_v, mut max_v) = (f32::MAX, f32::MIN);
                    for p in &hull {
                        let d = *p - origin;
                        let pu = d.dot(&u);
                        let pv = d.dot(&v);
                        min_u = min_u.min(pu);
                        max_u = max_u.max(pu);
                        min_v = min_v.min(pv);
                        max_v = max_v.max(pv);
                    }
                    let (eu, ev) = (max_u - min_u, max_v - min_v);
                    let area = eu * ev;
                    if best.as_ref().map_or(true, |(a, _)| area < *a) {
                        let center = origin
                            + u * ((min_u + max_u) * 0.5)
                            + v * ((min_v + max_v) * 0.5);
                        let theta = u.y.atan2(u.x).to_degrees();
                        best = Some((area, Self::new(center, eu, ev, theta)));
                    }
                }
                best.map(|(_, rect)| rect)
            }
        }
    }

    #[inline]
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Unit axes `(u, v)` spanning `width` and `height`.
    pub fn axes(&self) -> (Vector2<f32>, Vector2<f32>) {
        let (s, c) = self.angle_deg.to_radians().sin_cos();
        (Vector2::new(c, s), Vector2::new(-s, c))
    }

    /// Corners in the order that maps onto a canonical TL, TR, BR, BL
    /// canvas whose vertical side runs along `u`.
    pub fn box_points(&self) -> [Point2<f32>; 4] {
        let (u, v) = self.axes();
        let hu = u * (self.width * 0.5);
        let hv = v * (self.height * 0.5);
        let c = self.center;
        [c - hu + hv, c - hu - hv, c + hu - hv, c + hu + hv]
    }

    /// Height exceeds width: the card was found lying on its side relative
    /// to a portrait canvas.
    #[inline]
    pub fn is_taller(&self) -> bool {
        self.height > self.width
    }

    #[inline]
    pub fn is_wider(&self) -> bool {
        self.width > self.height
    }
}
