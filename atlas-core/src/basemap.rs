/*!
   Module `basemap` loads the world layers drawn beneath the plotted cities.

   Layers come from Natural Earth GeoJSON files in a single directory. Every layer is optional:
   a missing or unreadable file is logged and leaves that layer empty, so a map can always be
   drawn, if only with the grid and the markers.
*/

use std::{
    fs,
    path::{Path, PathBuf},
};

use geo::{Geometry, LineString, Polygon};
use geojson::GeoJson;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum BasemapError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BasemapLayer {
    Land,
    Ocean,
    Lakes,
    Coastlines,
    Borders,
    Rivers,
}

impl BasemapLayer {
    pub const ALL: [BasemapLayer; 6] = [
        BasemapLayer::Land,
        BasemapLayer::Ocean,
        BasemapLayer::Lakes,
        BasemapLayer::Coastlines,
        BasemapLayer::Borders,
        BasemapLayer::Rivers,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            BasemapLayer::Land => "ne_110m_land.json",
            BasemapLayer::Ocean => "ne_110m_ocean.json",
            BasemapLayer::Lakes => "ne_110m_lakes.json",
            BasemapLayer::Coastlines => "ne_110m_coastline.json",
            BasemapLayer::Borders => "ne_110m_admin_0_boundary_lines_land.json",
            BasemapLayer::Rivers => "ne_110m_rivers_lake_centerlines.json",
        }
    }

    fn is_areal(&self) -> bool {
        matches!(
            self,
            BasemapLayer::Land | BasemapLayer::Ocean | BasemapLayer::Lakes
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Basemap {
    pub(crate) land: Vec<Polygon<f64>>,
    pub(crate) ocean: Vec<Polygon<f64>>,
    pub(crate) lakes: Vec<Polygon<f64>>,
    pub(crate) coastlines: Vec<LineString<f64>>,
    pub(crate) borders: Vec<LineString<f64>>,
    pub(crate) rivers: Vec<LineString<f64>>,
    /// Whole-world equirectangular relief image used by the physical style.
    pub(crate) relief: Option<PathBuf>,
}

impl Basemap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads every layer found in `dir`.
    pub fn load(dir: &Path) -> Self {
        let mut basemap = Self::empty();

        for layer in BasemapLayer::ALL {
            let path = dir.join(layer.file_name());
            if !path.exists() {
                warn!("Basemap layer {:?} not found at {}", layer, path.display());
                continue;
            }

            if let Err(err) = basemap.load_layer(layer, &path) {
                warn!("Failed to load basemap layer {:?}: {}", layer, err);
            }
        }

        basemap
    }

    pub fn with_relief(mut self, image: impl Into<PathBuf>) -> Self {
        let image = image.into();

        if image.exists() {
            self.relief = Some(image);
        } else {
            warn!("Relief image {} not found, using shaded fallback", image.display());
        }

        self
    }

    pub fn load_layer(&mut self, layer: BasemapLayer, path: &Path) -> Result<(), BasemapError> {
        let content = fs::read_to_string(path).map_err(|source| BasemapError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let geojson: GeoJson = content.parse()?;

        self.add_layer(layer, geojson)
    }

    /// Merges the geometries of `geojson` into `layer`. Areal layers keep polygons, the others
    /// keep lines (polygon rings included).
    pub fn add_layer(&mut self, layer: BasemapLayer, geojson: GeoJson) -> Result<(), BasemapError> {
        let mut geometries = Vec::new();
        collect_geometries(geojson, &mut geometries)?;

        let mut polygons = Vec::new();
        let mut lines = Vec::new();
        for geometry in geometries {
            split_geometry(geometry, &mut polygons, &mut lines);
        }

        if layer.is_areal() {
            debug!("Loaded {} polygons into {:?}", polygons.len(), layer);
        } else {
            lines.extend(polygons.into_iter().flat_map(|polygon| {
                let (exterior, interiors) = polygon.into_inner();
                std::iter::once(exterior).chain(interiors)
            }));
            polygons = Vec::new();
            debug!("Loaded {} lines into {:?}", lines.len(), layer);
        }

        match layer {
            BasemapLayer::Land => self.land.extend(polygons),
            BasemapLayer::Ocean => self.ocean.extend(polygons),
            BasemapLayer::Lakes => self.lakes.extend(polygons),
            BasemapLayer::Coastlines => self.coastlines.extend(lines),
            BasemapLayer::Borders => self.borders.extend(lines),
            BasemapLayer::Rivers => self.rivers.extend(lines),
        }

        Ok(())
    }

    pub fn relief(&self) -> Option<&Path> {
        self.relief.as_deref()
    }
}

fn collect_geometries(geojson: GeoJson, out: &mut Vec<Geometry<f64>>) -> Result<(), BasemapError> {
    match geojson {
        GeoJson::FeatureCollection(collection) => {
            for feature in collection.features {
                if let Some(geometry) = feature.geometry {
                    out.push(geometry.value.try_into()?);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geometry) = feature.geometry {
                out.push(geometry.value.try_into()?);
            }
        }
        GeoJson::Geometry(geometry) => out.push(geometry.value.try_into()?),
    }

    Ok(())
}

fn split_geometry(
    geometry: Geometry<f64>,
    polygons: &mut Vec<Polygon<f64>>,
    lines: &mut Vec<LineString<f64>>,
) {
    match geometry {
        Geometry::Polygon(polygon) => polygons.push(polygon),
        Geometry::MultiPolygon(multi) => polygons.extend(multi.0),
        Geometry::LineString(line) => lines.push(line),
        Geometry::MultiLineString(multi) => lines.extend(multi.0),
        Geometry::GeometryCollection(collection) => {
            for geometry in collection.0 {
                split_geometry(geometry, polygons, lines);
            }
        }
        _ => {}
    }
}
