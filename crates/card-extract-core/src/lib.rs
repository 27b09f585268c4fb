//! Core types and primitives for playing-card region extraction.
//!
//! This crate is purely raster + geometric. It knows nothing about card
//! layouts or slot assignment; those live in `card-extract-detect`.

mod filters;
mod geometry;
mod homography;
mod image;
mod logger;
mod runtime;

pub use filters::{adaptive_mean_threshold, bilateral_filter, gray_median, rgb_to_gray};
pub use geometry::{convex_hull, OrientedRect};
pub use homography::{homography_from_4pt, warp_perspective_rgb, Homography};
pub use image::{sample_bilinear_rgb, ChannelDepth, RasterImage};
pub use runtime::{init, init_at, RuntimeInfo, LOG_ENV_VAR};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
