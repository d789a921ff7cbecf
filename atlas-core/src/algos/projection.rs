use crate::{
    constants::{
        DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, FRAME_MARGIN_BOTTOM, FRAME_MARGIN_LEFT,
        FRAME_MARGIN_RIGHT, FRAME_MARGIN_TOP, MULTI_CITY_MARGIN, SINGLE_CITY_MARGIN,
    },
    types::Coordinates,
};

use geo::{Coord, Rect};
use thiserror::Error;

// Smallest span an extent may collapse to, in degrees, so projection never divides by zero.
const MIN_SPAN: f64 = 0.01;

const MIN_CANVAS_WIDTH: u32 = 240;
const MIN_CANVAS_HEIGHT: u32 = 160;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("canvas must be at least 240x160 pixels, got {0}x{1}")]
pub struct CanvasTooSmallError(pub u32, pub u32);

/// Pixel size of the produced image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawConfig {
    canvas_width: u32,
    canvas_height: u32,
}

impl DrawConfig {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Result<Self, CanvasTooSmallError> {
        if canvas_width < MIN_CANVAS_WIDTH || canvas_height < MIN_CANVAS_HEIGHT {
            return Err(CanvasTooSmallError(canvas_width, canvas_height));
        }

        Ok(Self {
            canvas_width,
            canvas_height,
        })
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
        }
    }
}

/// A longitude/latitude window, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Extent {
    pub const WORLD: Extent = Extent {
        min_lon: -180.0,
        max_lon: 180.0,
        min_lat: -90.0,
        max_lat: 90.0,
    };

    /// `center` padded by `margin` degrees in every direction, clipped to the world.
    pub fn around(center: Coordinates, margin: f64) -> Self {
        Extent {
            min_lon: center.lon - margin,
            max_lon: center.lon + margin,
            min_lat: center.lat - margin,
            max_lat: center.lat + margin,
        }
        .clamped()
    }

    /// Bounding box of `points` padded by `margin` degrees on each side.
    pub fn bounding(points: &[Coordinates], margin: f64) -> Option<Self> {
        let first = points.first()?;

        let mut extent = Extent {
            min_lon: first.lon,
            max_lon: first.lon,
            min_lat: first.lat,
            max_lat: first.lat,
        };

        for point in &points[1..] {
            extent.min_lon = extent.min_lon.min(point.lon);
            extent.max_lon = extent.max_lon.max(point.lon);
            extent.min_lat = extent.min_lat.min(point.lat);
            extent.max_lat = extent.max_lat.max(point.lat);
        }

        extent.min_lon -= margin;
        extent.max_lon += margin;
        extent.min_lat -= margin;
        extent.max_lat += margin;

        Some(extent.clamped())
    }

    /// The viewport used for city maps: a lone city is centered with an 8 degree margin,
    /// several cities get their bounding box padded by 15 degrees.
    pub fn for_cities(points: &[Coordinates]) -> Option<Self> {
        match points {
            [] => None,
            [single] => Some(Self::around(*single, SINGLE_CITY_MARGIN)),
            _ => Self::bounding(points, MULTI_CITY_MARGIN),
        }
    }

    pub fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn contains(&self, coords: Coordinates) -> bool {
        (self.min_lon..=self.max_lon).contains(&coords.lon)
            && (self.min_lat..=self.max_lat).contains(&coords.lat)
    }

    pub(crate) fn overlaps(&self, rect: &Rect<f64>) -> bool {
        rect.min().x <= self.max_lon
            && rect.max().x >= self.min_lon
            && rect.min().y <= self.max_lat
            && rect.max().y >= self.min_lat
    }

    fn clamped(self) -> Self {
        let mut extent = Extent {
            min_lon: self.min_lon.max(Self::WORLD.min_lon),
            max_lon: self.max_lon.min(Self::WORLD.max_lon),
            min_lat: self.min_lat.max(Self::WORLD.min_lat),
            max_lat: self.max_lat.min(Self::WORLD.max_lat),
        };

        if extent.lon_span() < MIN_SPAN {
            extent.max_lon = (extent.min_lon + MIN_SPAN).min(Self::WORLD.max_lon);
            extent.min_lon = extent.max_lon - MIN_SPAN;
        }
        if extent.lat_span() < MIN_SPAN {
            extent.max_lat = (extent.min_lat + MIN_SPAN).min(Self::WORLD.max_lat);
            extent.min_lat = extent.max_lat - MIN_SPAN;
        }

        extent
    }
}

/// The pixel rectangle the map is drawn in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Frame {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Plate carrée projection of an [Extent] onto the canvas. Degrees map to pixels with the same
/// scale on both axes, so the frame shrinks inside the canvas instead of stretching the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Projection {
    extent: Extent,
    frame: Frame,
    scale: f64,
}

impl Projection {
    pub fn fit(extent: Extent, config: &DrawConfig) -> Self {
        let available_width =
            config.canvas_width as f64 - FRAME_MARGIN_LEFT - FRAME_MARGIN_RIGHT;
        let available_height =
            config.canvas_height as f64 - FRAME_MARGIN_TOP - FRAME_MARGIN_BOTTOM;

        let scale =
            (available_width / extent.lon_span()).min(available_height / extent.lat_span());

        let width = extent.lon_span() * scale;
        let height = extent.lat_span() * scale;

        let frame = Frame {
            x: FRAME_MARGIN_LEFT + (available_width - width) / 2.0,
            y: FRAME_MARGIN_TOP + (available_height - height) / 2.0,
            width,
            height,
        };

        Projection {
            extent,
            frame,
            scale,
        }
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn project(&self, lon: f64, lat: f64) -> (f32, f32) {
        let x = self.frame.x + (lon - self.extent.min_lon) * self.scale;
        let y = self.frame.y + (self.extent.max_lat - lat) * self.scale;

        (x as f32, y as f32)
    }

    pub fn project_coords(&self, coords: Coordinates) -> (f32, f32) {
        self.project(coords.lon, coords.lat)
    }

    pub fn project_coord(&self, coord: Coord<f64>) -> (f32, f32) {
        self.project(coord.x, coord.y)
    }
}
