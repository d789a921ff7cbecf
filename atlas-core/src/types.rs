use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Coordinates { lat, lon }
    }
}

impl Display for Coordinates {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lat, self.lon)
    }
}

impl From<Coordinates> for geo::Point<f64> {
    fn from(coords: Coordinates) -> Self {
        geo::Point::new(coords.lon, coords.lat)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(r#"Unknown marker color: "{0}""#)]
pub struct UnknownMarkerColorError(pub String);

/// The fixed palette a user can pick marker colors from.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MarkerColor {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
    Pink,
    Brown,
    Black,
    White,
    Gray,
}

impl MarkerColor {
    pub const ALL: [MarkerColor; 11] = [
        MarkerColor::Red,
        MarkerColor::Blue,
        MarkerColor::Green,
        MarkerColor::Yellow,
        MarkerColor::Orange,
        MarkerColor::Purple,
        MarkerColor::Pink,
        MarkerColor::Brown,
        MarkerColor::Black,
        MarkerColor::White,
        MarkerColor::Gray,
    ];

    pub fn try_from_str(color: &str) -> Result<Self, UnknownMarkerColorError> {
        Ok(match color.trim().to_lowercase().as_str() {
            "red" => MarkerColor::Red,
            "blue" => MarkerColor::Blue,
            "green" => MarkerColor::Green,
            "yellow" => MarkerColor::Yellow,
            "orange" => MarkerColor::Orange,
            "purple" => MarkerColor::Purple,
            "pink" => MarkerColor::Pink,
            "brown" => MarkerColor::Brown,
            "black" => MarkerColor::Black,
            "white" => MarkerColor::White,
            "gray" | "grey" => MarkerColor::Gray,
            _ => return Err(UnknownMarkerColorError(color.to_string())),
        })
    }

    /// The tag stored in the `marker_color` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerColor::Red => "red",
            MarkerColor::Blue => "blue",
            MarkerColor::Green => "green",
            MarkerColor::Yellow => "yellow",
            MarkerColor::Orange => "orange",
            MarkerColor::Purple => "purple",
            MarkerColor::Pink => "pink",
            MarkerColor::Brown => "brown",
            MarkerColor::Black => "black",
            MarkerColor::White => "white",
            MarkerColor::Gray => "gray",
        }
    }

    pub fn hex(&self) -> &'static str {
        match self {
            MarkerColor::Red => "#e41a1c",
            MarkerColor::Blue => "#1f5fd1",
            MarkerColor::Green => "#2ca02c",
            MarkerColor::Yellow => "#ffd92f",
            MarkerColor::Orange => "#ff7f0e",
            MarkerColor::Purple => "#8e44ad",
            MarkerColor::Pink => "#f781bf",
            MarkerColor::Brown => "#8c564b",
            MarkerColor::Black => "#111111",
            MarkerColor::White => "#fafafa",
            MarkerColor::Gray => "#7f7f7f",
        }
    }
}

impl Display for MarkerColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error(r#"Unknown map style: "{0}""#)]
pub struct UnknownMapStyleError(pub String);

/// Basemap flavours a city map can be rendered with.
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MapStyle {
    /// Coastlines and national borders only.
    #[default]
    Simple,
    /// Filled land and ocean, dashed borders, lakes and rivers.
    Detailed,
    /// Relief imagery under coastlines and borders.
    Physical,
}

impl MapStyle {
    pub const ALL: [MapStyle; 3] = [MapStyle::Simple, MapStyle::Detailed, MapStyle::Physical];

    pub fn try_from_str(style: &str) -> Result<Self, UnknownMapStyleError> {
        Ok(match style.trim().to_lowercase().as_str() {
            "simple" => MapStyle::Simple,
            "detailed" => MapStyle::Detailed,
            "physical" => MapStyle::Physical,
            _ => return Err(UnknownMapStyleError(style.to_string())),
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MapStyle::Simple => "simple",
            MapStyle::Detailed => "detailed",
            MapStyle::Physical => "physical",
        }
    }
}

impl Display for MapStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A city a user has saved, as listed back to them.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedCity {
    pub name: String,
    pub color: MarkerColor,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserStats {
    pub total_cities: u64,
    pub unique_colors: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddCityOutcome {
    /// The association exists now. `created` is false when only its color changed.
    Saved {
        canonical_name: String,
        created: bool,
    },
    UnknownCity,
}

impl AddCityOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, AddCityOutcome::Saved { .. })
    }

    pub fn canonical_name(&self) -> Option<&str> {
        match self {
            AddCityOutcome::Saved { canonical_name, .. } => Some(canonical_name),
            AddCityOutcome::UnknownCity => None,
        }
    }
}

/// A city placed on a map, already resolved to coordinates.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CityMarker {
    pub name: String,
    pub coords: Coordinates,
    pub color: MarkerColor,
}
