/// Parameter validation errors, reported before any pixel is touched.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("region count must be >= 1")]
    NoRegions,
    #[error("tableau layout needs a talon and at least one column (got {regions} regions)")]
    TableauTooSmall { regions: usize },
    #[error("grid layout with {rows} rows cannot split {regions} regions evenly")]
    UnevenGrid { regions: usize, rows: usize },
    #[error("canonical size must be non-zero (got {width}x{height})")]
    EmptyCanonical { width: u32, height: u32 },
    #[error("icon output size must be non-zero (got {width}x{height})")]
    EmptyIcon { width: u32, height: u32 },
    #[error("icon crop {width}x{height} at ({x},{y}) does not fit the {canvas_w}x{canvas_h} canonical image")]
    IconCropOutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        canvas_w: u32,
        canvas_h: u32,
    },
    #[error("adaptive threshold block size must be odd and >= 3 (got {0})")]
    InvalidBlockSize(u32),
    #[error("area tolerance must be finite and >= 0 (got {0})")]
    InvalidTolerance(f32),
}

/// Errors returned by an extraction call. Every variant aborts the whole
/// call; there is no partial result.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error(transparent)]
    InvalidParams(#[from] ParamsError),
    #[error("found {found} candidate regions, layout requires {required}")]
    InsufficientRegions { found: usize, required: usize },
    #[error(
        "region {index} (contour {contour_index}) is {width:.1}x{height:.1} px, \
         area {area:.0} does not exceed tolerance {tolerance:.0}"
    )]
    RegionBelowAreaTolerance {
        index: usize,
        contour_index: usize,
        width: f32,
        height: f32,
        area: f32,
        tolerance: f32,
    },
    #[error("none of {contours} contours lies inside the orientation window")]
    OrientationOutOfRange { contours: usize },
    #[error("region {index} has a degenerate quadrilateral")]
    DegenerateRegion { index: usize },
}
