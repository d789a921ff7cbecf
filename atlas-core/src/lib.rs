mod algos;
mod basemap;
mod constants;
mod raster;
mod renderer;
mod store;
mod types;

pub use algos::{CanvasTooSmallError, DrawConfig, Extent};
pub use basemap::{Basemap, BasemapError, BasemapLayer};
pub use renderer::{MapRenderer, RenderError};
pub use store::{CityStore, StoreError};
pub use types::{
    AddCityOutcome, Coordinates, MapStyle, MarkerColor, SavedCity, UnknownMapStyleError,
    UnknownMarkerColorError, UserStats,
};

/// Great-circle distance between two points, in kilometers.
pub fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    algos::distance_km(from, to)
}

/// Most names a city search returns.
pub const MAX_CITY_SUGGESTIONS: usize = constants::MAX_CITY_SUGGESTIONS;
