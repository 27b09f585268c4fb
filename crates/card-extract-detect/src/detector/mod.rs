//! Card extraction pipeline.
//!
//! This module wires together the edge map, contour candidates, top-K
//! selection with area validation, perspective rectification, icon
//! cropping and layout slot assignment.

mod error;
mod params;
mod pipeline;
mod result;

pub use error::{ExtractError, ParamsError};
pub use params::ExtractorParams;
pub use pipeline::CardExtractor;
pub use result::{ExtractedRegion, Extraction, SlottedIcon};
