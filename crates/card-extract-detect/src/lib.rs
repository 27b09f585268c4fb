//! Playing-card region detection, rectification and icon extraction.
//!
//! Pipeline, per image:
//! - edge map: median blur, bilateral smoothing, Canny with thresholds
//!   derived from a brightness level ([`ThresholdStrategy`]),
//! - external contours with one minimum-area [`OrientedRect`] each,
//! - top-K selection ([`SelectionRule`]) and a strict area tolerance,
//! - perspective rectification onto a canonical card canvas,
//! - icon crop, adaptive binarization and resize,
//! - slot assignment by centroid ([`LayoutKind`]).
//!
//! Any failing region aborts the whole call: an [`Extraction`] always has
//! exactly one entry per slot.
//!
//! ```no_run
//! use card_extract_detect::{CardExtractor, ExtractorParams};
//!
//! let img = image::open("tableau.png").unwrap().to_rgb8();
//! let extractor = CardExtractor::new(ExtractorParams::tableau()).unwrap();
//! match extractor.extract_rgb(&img) {
//!     Ok(res) => {
//!         for s in &res.slots {
//!             println!("{}: {:?}", s.slot, s.region.centroid);
//!         }
//!     }
//!     Err(e) => eprintln!("extraction failed: {e}"),
//! }
//! ```

mod candidates;
mod column;
mod detector;
mod edges;
mod icon;
mod io;
mod layout;
mod ranking;
mod rectify;

pub use candidates::{extract_candidates, CandidateSet, Contour, RegionCandidate};
pub use column::extract_card_in_column;
pub use detector::{
    CardExtractor, ExtractError, ExtractedRegion, Extraction, ExtractorParams, ParamsError, SlottedIcon,
};
pub use edges::{build_edge_map, canny_thresholds, CannyThresholds, EdgeMap, EdgeMapParams, ThresholdStrategy};
pub use icon::{crop_icon, IconAnchor, IconCropParams};
pub use io::{ExtractConfig, ExtractReport, IoError, LayoutPreset, SlotReport};
pub use layout::{layout_order, LayoutKind, Slot, SlotMap};
pub use ranking::{select_regions, validate_area, SelectionRule, CARD_ASPECT_RATIO};
pub use rectify::{rectify_region, RectifiedRegion, RectifyParams, RotationPolicy, CARD_UNIT};

pub use card_extract_core::{OrientedRect, RasterImage};
