/*!
   Module `renderer` turns stored cities into map images.

   A [MapRenderer] resolves names through its [CityStore], frames the resolved points, composes
   an SVG document with the basemap drawer of the requested style and rasterizes it to PNG. The
   image is written beside the requested path and moved into place only once it is complete.
*/

use crate::{
    algos::{
        BasemapDrawerFactory, DrawConfig, Extent, MapScene, Projection, distance_km, draw_map,
        great_circle_runs,
    },
    basemap::Basemap,
    constants::MULTI_CITY_MARGIN,
    raster::{Rasterizer, write_atomically},
    store::{CityStore, StoreError},
    types::{CityMarker, Coordinates, MapStyle, MarkerColor},
};

use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use svg::Document;
use thiserror::Error;
use tracing::{Level, debug, event, span};

const CITY_MAP_TITLE: &str = "Your cities";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("None of the requested cities could be found")]
    NoResolvableCities,
    #[error("Unknown city: {0}")]
    UnknownCity(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Could not parse the composed map: {0}")]
    Svg(#[from] usvg::Error),
    #[error("Could not allocate a {width}x{height} canvas")]
    Canvas { width: u32, height: u32 },
    #[error("Could not encode the map: {0}")]
    Encode(String),
    #[error("Could not write the map: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone)]
pub struct MapRenderer {
    store: CityStore,
    basemap: Arc<Basemap>,
    config: DrawConfig,
    rasterizer: Rasterizer,
}

impl MapRenderer {
    pub fn new(store: CityStore, basemap: Arc<Basemap>, config: DrawConfig) -> Self {
        Self {
            store,
            basemap,
            config,
            rasterizer: Rasterizer::with_system_fonts(),
        }
    }

    /// Plots every resolvable city in its own color. Names the store doesn't know are skipped;
    /// if none is left the call fails and `output` is left untouched.
    pub fn render_cities<S: AsRef<str>>(
        &self,
        output: &Path,
        cities: &[(S, MarkerColor)],
        style: MapStyle,
    ) -> Result<PathBuf, RenderError> {
        let span = span!(Level::DEBUG, "render_cities", requested = cities.len(), %style);
        let _guard = span.enter();

        let document = self.render_cities_document(cities, style)?;
        self.write_png(&document, output)
    }

    /// Draws the great-circle route between two cities over the physical basemap. Both names
    /// must match a stored city exactly.
    pub fn render_distance(
        &self,
        output: &Path,
        from: &str,
        to: &str,
    ) -> Result<PathBuf, RenderError> {
        let span = span!(Level::DEBUG, "render_distance", from, to);
        let _guard = span.enter();

        let document = self.render_distance_document(from, to)?;
        self.write_png(&document, output)
    }

    pub fn render_cities_document<S: AsRef<str>>(
        &self,
        cities: &[(S, MarkerColor)],
        style: MapStyle,
    ) -> Result<Document, RenderError> {
        let names = cities
            .iter()
            .map(|(name, _)| name.as_ref())
            .collect::<Vec<&str>>();
        let resolved = self.store.resolve_all(names.as_slice())?;

        let markers = names
            .iter()
            .zip(cities.iter().map(|(_, color)| *color))
            .zip(resolved)
            .filter_map(|((name, color), coords)| match coords {
                Some(coords) => Some(CityMarker {
                    name: name.to_string(),
                    coords,
                    color,
                }),
                None => {
                    event!(Level::DEBUG, city = *name, "Dropping unknown city");
                    None
                }
            })
            .collect::<Vec<_>>();

        let points = markers.iter().map(|m| m.coords).collect::<Vec<_>>();
        let extent = Extent::for_cities(&points).ok_or(RenderError::NoResolvableCities)?;

        Ok(self.compose(
            style,
            extent,
            &MapScene {
                title: CITY_MAP_TITLE,
                markers: &markers,
                routes: &[],
            },
        ))
    }

    pub fn render_distance_document(&self, from: &str, to: &str) -> Result<Document, RenderError> {
        let resolved = self.store.resolve_all(&[from, to])?;

        let (Some(start), Some(end)) = (resolved[0], resolved[1]) else {
            let unknown = if resolved[0].is_none() { from } else { to };
            return Err(RenderError::UnknownCity(unknown.to_string()));
        };

        let km = distance_km(start, end);
        let routes = great_circle_runs(start, end);

        let title = format!("{from} to {to}: {km:.0} km");
        let markers = [
            CityMarker {
                name: from.to_string(),
                coords: start,
                color: MarkerColor::Red,
            },
            CityMarker {
                name: to.to_string(),
                coords: end,
                color: MarkerColor::Blue,
            },
        ];

        Ok(self.compose(
            MapStyle::Physical,
            Self::route_extent(&routes),
            &MapScene {
                title: &title,
                markers: &markers,
                routes: &routes,
            },
        ))
    }

    /// Routes split at the antimeridian span the whole longitude range.
    fn route_extent(routes: &[Vec<Coordinates>]) -> Extent {
        let points = routes.iter().flatten().copied().collect::<Vec<_>>();

        let Some(mut extent) = Extent::bounding(&points, MULTI_CITY_MARGIN) else {
            return Extent::WORLD;
        };

        if routes.len() > 1 {
            extent.min_lon = Extent::WORLD.min_lon;
            extent.max_lon = Extent::WORLD.max_lon;
        }

        extent
    }

    fn compose(&self, style: MapStyle, extent: Extent, scene: &MapScene) -> Document {
        let started = Instant::now();

        let projection = Projection::fit(extent, &self.config);
        let drawer = BasemapDrawerFactory::create_drawer(style);
        let document = draw_map(
            drawer.as_ref(),
            &self.basemap,
            &projection,
            &self.config,
            scene,
        );

        event!(
            Level::DEBUG,
            "Composed {style} map of {} markers in {}ms",
            scene.markers.len(),
            started.elapsed().as_millis()
        );

        document
    }

    fn write_png(&self, document: &Document, output: &Path) -> Result<PathBuf, RenderError> {
        let started = Instant::now();

        let png = self.rasterizer.to_png(document)?;
        write_atomically(output, &png)?;

        debug!(
            "Wrote {} ({} bytes) in {}ms",
            output.display(),
            png.len(),
            started.elapsed().as_millis()
        );

        Ok(output.to_path_buf())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        basemap::test::sample_basemap,
        store::test::{LONDON, seeded_store},
    };

    use tempfile::TempDir;
    use tiny_skia::Pixmap;

    fn renderer() -> (TempDir, MapRenderer) {
        let (dir, store) = seeded_store();
        let renderer = MapRenderer::new(store, Arc::new(sample_basemap()), DrawConfig::default());
        (dir, renderer)
    }

    #[test]
    fn test_render_cities_writes_a_png() {
        let (dir, renderer) = renderer();

        for style in MapStyle::ALL {
            let output = dir.path().join(format!("{style}.png"));
            let written = renderer
                .render_cities(
                    &output,
                    &[("London", MarkerColor::Red), ("Paris", MarkerColor::Blue)],
                    style,
                )
                .unwrap();

            assert_eq!(written, output);

            let pixmap = Pixmap::load_png(&output).unwrap();
            assert_eq!((pixmap.width(), pixmap.height()), (1200, 800));
        }
    }

    #[test]
    fn test_render_cities_without_known_cities_fails() {
        let (dir, renderer) = renderer();
        let output = dir.path().join("nothing.png");

        let result = renderer.render_cities(
            &output,
            &[("Atlantis", MarkerColor::Red), ("El Dorado", MarkerColor::Blue)],
            MapStyle::Simple,
        );

        assert!(matches!(result, Err(RenderError::NoResolvableCities)));
        assert!(!output.exists(), "A failed render must not leave a file");

        let empty: [(&str, MarkerColor); 0] = [];
        assert!(matches!(
            renderer.render_cities(&output, &empty, MapStyle::Simple),
            Err(RenderError::NoResolvableCities)
        ));
    }

    #[test]
    fn test_unknown_cities_are_dropped() {
        let (_dir, renderer) = renderer();

        let svg = renderer
            .render_cities_document(
                &[("Atlantis", MarkerColor::Green), ("London", MarkerColor::Red)],
                MapStyle::Detailed,
            )
            .unwrap()
            .to_string();

        assert_eq!(svg.matches("<circle").count(), 1);
        assert!(svg.contains("London"));
        assert!(!svg.contains("Atlantis"));
    }

    #[test]
    fn test_resolution_is_exact() {
        let (_dir, renderer) = renderer();

        assert!(matches!(
            renderer.render_cities_document(&[("london", MarkerColor::Red)], MapStyle::Simple),
            Err(RenderError::NoResolvableCities)
        ));
    }

    #[test]
    fn test_render_distance() {
        let (dir, renderer) = renderer();
        let output = dir.path().join("distance.png");

        renderer.render_distance(&output, "London", "Paris").unwrap();
        assert!(output.exists());

        let svg = renderer
            .render_distance_document("London", "Paris")
            .unwrap()
            .to_string();

        assert!(svg.contains("London to Paris: 3"), "Title names both cities and the distance");
        assert!(svg.contains(MarkerColor::Red.hex()));
        assert!(svg.contains(MarkerColor::Blue.hex()));
        assert_eq!(svg.matches("<circle").count(), 2);
    }

    #[test]
    fn test_render_distance_with_unknown_city_fails() {
        let (dir, renderer) = renderer();
        let output = dir.path().join("distance.png");

        let result = renderer.render_distance(&output, "London", "Atlantis");
        assert!(matches!(result, Err(RenderError::UnknownCity(name)) if name == "Atlantis"));
        assert!(!output.exists());

        let result = renderer.render_distance(&output, "Atlantis", "London");
        assert!(matches!(result, Err(RenderError::UnknownCity(name)) if name == "Atlantis"));
    }

    #[test]
    fn test_route_extent_covers_the_route() {
        let routes = great_circle_runs(LONDON, Coordinates::new(40.7128, -74.0060));
        let extent = MapRenderer::route_extent(&routes);

        for point in routes.iter().flatten() {
            assert!(extent.contains(*point));
        }

        let split = great_circle_runs(
            Coordinates::new(35.6762, 139.6503),
            Coordinates::new(37.7749, -122.4194),
        );
        let extent = MapRenderer::route_extent(&split);
        assert_eq!((extent.min_lon, extent.max_lon), (-180.0, 180.0));
    }

    #[test]
    fn test_physical_style_uses_the_relief_image() {
        let (dir, store) = seeded_store();

        let relief = dir.path().join("relief.png");
        let mut pixmap = Pixmap::new(8, 4).unwrap();
        pixmap.fill(tiny_skia::Color::from_rgba8(90, 120, 60, 255));
        pixmap.save_png(&relief).unwrap();

        let basemap = Arc::new(sample_basemap().with_relief(&relief));
        let renderer = MapRenderer::new(store, basemap, DrawConfig::default());

        let svg = renderer
            .render_cities_document(&[("London", MarkerColor::Red)], MapStyle::Physical)
            .unwrap()
            .to_string();
        assert!(svg.contains("<image"));

        let output = dir.path().join("physical.png");
        renderer
            .render_cities(&output, &[("London", MarkerColor::Red)], MapStyle::Physical)
            .unwrap();
        assert!(output.exists());
    }

    #[test]
    fn test_render_into_missing_directory_fails_cleanly() {
        let (dir, renderer) = renderer();
        let output = dir.path().join("missing").join("map.png");

        assert!(matches!(
            renderer.render_cities(&output, &[("London", MarkerColor::Red)], MapStyle::Simple),
            Err(RenderError::Io(_))
        ));
    }
}
