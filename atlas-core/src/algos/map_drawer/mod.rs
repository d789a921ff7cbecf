use crate::{
    algos::{DrawConfig, Projection},
    basemap::Basemap,
    types::{CityMarker, Coordinates, MapStyle},
};

use svg::{Document, node::element::Group};

mod detailed;
mod overlay;
mod paths;
mod physical;
mod simple;

/// Draws the world beneath the markers. Each [MapStyle] has its own drawer; the grid, markers
/// and title are shared and drawn on top by [draw_map].
pub(crate) trait BasemapDrawer {
    fn draw(&self, basemap: &Basemap, projection: &Projection) -> Group;
}

pub(crate) struct BasemapDrawerFactory;

impl BasemapDrawerFactory {
    pub(crate) fn create_drawer(style: MapStyle) -> Box<dyn BasemapDrawer> {
        match style {
            MapStyle::Simple => Box::new(simple::SimpleBasemapDrawer),
            MapStyle::Detailed => Box::new(detailed::DetailedBasemapDrawer),
            MapStyle::Physical => Box::new(physical::PhysicalBasemapDrawer),
        }
    }
}

/// What goes on top of the basemap.
pub(crate) struct MapScene<'a> {
    pub title: &'a str,
    pub markers: &'a [CityMarker],
    pub routes: &'a [Vec<Coordinates>],
}

pub(crate) fn draw_map(
    drawer: &dyn BasemapDrawer,
    basemap: &Basemap,
    projection: &Projection,
    config: &DrawConfig,
    scene: &MapScene,
) -> Document {
    let width = config.canvas_width();
    let height = config.canvas_height();

    let base = drawer
        .draw(basemap, projection)
        .set("clip-path", format!("url(#{})", overlay::FRAME_CLIP_ID));

    let mut document = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", format!("0 0 {width} {height}"))
        .add(overlay::background(config))
        .add(overlay::frame_clip(projection))
        .add(base)
        .add(overlay::grid(projection));

    if !scene.routes.is_empty() {
        document = document.add(overlay::route(projection, scene.routes));
    }

    document
        .add(overlay::markers(projection, scene.markers))
        .add(overlay::frame_border(projection))
        .add(overlay::title(config, scene.title))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        algos::Extent,
        basemap::test::sample_basemap,
        types::{Coordinates, MarkerColor},
    };

    fn scene_markers() -> Vec<CityMarker> {
        vec![
            CityMarker {
                name: "London".to_string(),
                coords: Coordinates::new(51.5074, -0.1278),
                color: MarkerColor::Red,
            },
            CityMarker {
                name: "Paris".to_string(),
                coords: Coordinates::new(48.8566, 2.3522),
                color: MarkerColor::Blue,
            },
        ]
    }

    fn draw(style: MapStyle) -> String {
        let markers = scene_markers();
        let coords = markers.iter().map(|m| m.coords).collect::<Vec<_>>();
        let config = DrawConfig::default();
        let projection = Projection::fit(Extent::for_cities(&coords).unwrap(), &config);

        let drawer = BasemapDrawerFactory::create_drawer(style);
        draw_map(
            drawer.as_ref(),
            &sample_basemap(),
            &projection,
            &config,
            &MapScene {
                title: "City map",
                markers: &markers,
                routes: &[],
            },
        )
        .to_string()
    }

    #[test]
    fn test_every_style_draws_markers_and_labels() {
        for style in MapStyle::ALL {
            let svg = draw(style);

            assert_eq!(svg.matches("<circle").count(), 2, "{style} markers");
            assert!(svg.contains(MarkerColor::Red.hex()));
            assert!(svg.contains(MarkerColor::Blue.hex()));
            assert!(svg.contains("London") && svg.contains("Paris"));
            assert!(svg.contains("City map"));
            assert!(svg.contains("url(#map-frame)"));
        }
    }

    #[test]
    fn test_styles_differ() {
        let simple = draw(MapStyle::Simple);
        let detailed = draw(MapStyle::Detailed);
        let physical = draw(MapStyle::Physical);

        assert!(detailed.contains("stroke-dasharray=\"4 3\""), "Detailed borders are dashed");
        assert!(!simple.contains("stroke-dasharray=\"4 3\""));
        assert!(physical.contains("<linearGradient"), "Physical falls back to shading");
        assert_ne!(simple, detailed);
    }
}
