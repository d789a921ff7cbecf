// Viewport padding, in degrees.
pub(crate) const SINGLE_CITY_MARGIN: f64 = 8.0;
pub(crate) const MULTI_CITY_MARGIN: f64 = 15.0;

pub(crate) const DEFAULT_CANVAS_WIDTH: u32 = 1200;
pub(crate) const DEFAULT_CANVAS_HEIGHT: u32 = 800;

// Room around the map frame for the title and the axis labels.
pub(crate) const FRAME_MARGIN_TOP: f64 = 56.0;
pub(crate) const FRAME_MARGIN_BOTTOM: f64 = 36.0;
pub(crate) const FRAME_MARGIN_LEFT: f64 = 56.0;
pub(crate) const FRAME_MARGIN_RIGHT: f64 = 20.0;

pub(crate) const MARKER_RADIUS: f64 = 7.0;
pub(crate) const MARKER_STROKE_WIDTH: f64 = 1.5;
pub(crate) const LABEL_FONT_SIZE: f64 = 15.0;
pub(crate) const LABEL_OFFSET: f64 = 10.0;
pub(crate) const TITLE_FONT_SIZE: f64 = 22.0;
pub(crate) const GRID_FONT_SIZE: f64 = 11.0;
pub(crate) const GRID_OPACITY: f64 = 0.5;

pub(crate) const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

// Great circles are sampled so that consecutive points are at most this many degrees apart.
pub(crate) const GREAT_CIRCLE_STEP_DEGREES: f64 = 1.0;

pub(crate) const MAX_CITY_SUGGESTIONS: usize = 15;

pub(crate) const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;
