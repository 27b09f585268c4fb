use crate::sample_bilinear_rgb;
use image::RgbImage;
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// Planar projective transform, `dst ~ H * src`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }
}

/// Similarity that moves the quad centroid to the origin and scales the
/// mean centroid distance to sqrt(2).
fn conditioning(pts: &[Point2<f32>; 4]) -> ([Point2<f64>; 4], Matrix3<f64>) {
    let (sx, sy) = pts
        .iter()
        .fold((0.0_f64, 0.0_f64), |(sx, sy), p| (sx + p.x as f64, sy + p.y as f64));
    let (cx, cy) = (sx / 4.0, sy / 4.0);

    let mean_dist = pts
        .iter()
        .map(|p| ((p.x as f64 - cx).powi(2) + (p.y as f64 - cy).powi(2)).sqrt())
        .sum::<f64>()
        / 4.0;
    let s = if mean_dist > 1e-12 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    let t = Matrix3::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0);

    let out = pts.map(|p| {
        let v = t * Vector3::new(p.x as f64, p.y as f64, 1.0);
        Point2::new(v[0], v[1])
    });
    (out, t)
}

/// Exact homography from four correspondences, `dst ~ H * src`.
///
/// Corner order must match between `src` and `dst`. Returns `None` for
/// degenerate quads (three collinear corners, zero-size rectangles).
pub fn homography_from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Homography> {
    let (src_n, t_src) = conditioning(src);
    let (dst_n, t_dst) = conditioning(dst);

    // h33 fixed to 1; two rows per correspondence.
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for (k, (s, d)) in src_n.iter().zip(dst_n.iter()).enumerate() {
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        let r = 2 * k;
        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -u * x;
        a[(r, 7)] = -u * y;
        b[r] = u;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -v * x;
        a[(r + 1, 7)] = -v * y;
        b[r + 1] = v;
    }

    let x = a.lu().solve(&b)?;
    if x.iter().any(|c| !c.is_finite()) {
        return None;
    }
    let hn = Matrix3::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let h = t_dst.try_inverse()? * hn * t_src;
    let scale = h[(2, 2)];
    if scale.abs() < 1e-12 {
        return None;
    }
    Some(Homography::new(h / scale))
}

/// Warp into a `out_w x out_h` canvas: every output pixel center is mapped
/// through `h_src_from_dst` and sampled bilinearly from `src`.
#[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(src, h_src_from_dst)))]
pub fn warp_perspective_rgb(
    src: &RgbImage,
    h_src_from_dst: &Homography,
    out_w: u32,
    out_h: u32,
) -> RgbImage {
    RgbImage::from_fn(out_w, out_h, |x, y| {
        let p = h_src_from_dst.apply(Point2::new(x as f32 + 0.5, y as f32 + 0.5));
        sample_bilinear_rgb(src, p.x - 0.5, p.y - 0.5)
    })
}
