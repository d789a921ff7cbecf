mod great_circle;
mod map_drawer;
mod projection;

pub(crate) use great_circle::{distance_km, great_circle_runs};
pub(crate) use map_drawer::{BasemapDrawerFactory, MapScene, draw_map};
pub(crate) use projection::Projection;
pub use projection::{CanvasTooSmallError, DrawConfig, Extent};
