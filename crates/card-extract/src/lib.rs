//! High-level facade crate for the `card-extract-*` workspace.
//!
//! This crate provides:
//! - re-exports of the core primitives and the extraction pipeline,
//! - helpers that run the pipeline on an `image::DynamicImage`, a file or a
//!   raw pixel buffer, and write the resulting icons to disk,
//! - the `card-extract` command line tool (feature `cli`).
//!
//! ## Quickstart
//!
//! ```no_run
//! use card_extract::detect;
//! use card_extract::ExtractorParams;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let extraction = detect::extract_from_path("tableau.jpg", ExtractorParams::tableau())?;
//! let written = detect::save_icons(&extraction, "icons")?;
//! println!("wrote {} icons", written.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `card_extract::core`: rasters, oriented rectangles, homographies, filters.
//! - `card_extract::pipeline`: edge map, candidates, selection, rectification,
//!   icon cropping, layout slots, JSON config/report.
//! - `card_extract::detect`: end-to-end helpers from images, files and buffers.

pub use card_extract_core as core;
pub use card_extract_detect as pipeline;

pub use card_extract_core::{ChannelDepth, OrientedRect, RasterImage};
pub use card_extract_detect::{
    CardExtractor, ExtractError, ExtractedRegion, Extraction, ExtractorParams, LayoutKind, ParamsError, Slot,
};

pub mod detect;
