use super::{
    BasemapDrawer,
    paths::{lines_path, polygons_path},
};
use crate::{algos::Projection, basemap::Basemap};

use svg::node::element::{Group, Rectangle};

const OCEAN_COLOR: &str = "#a9cfe8";
const LAND_COLOR: &str = "#f1ede3";
const WATER_EDGE_COLOR: &str = "#5d8fb8";
const COASTLINE_COLOR: &str = "#2f2f2f";
const BORDER_COLOR: &str = "#5a5a5a";

/// Filled land and ocean, lakes and rivers, coastlines and dashed borders.
pub(super) struct DetailedBasemapDrawer;

impl BasemapDrawer for DetailedBasemapDrawer {
    fn draw(&self, basemap: &Basemap, projection: &Projection) -> Group {
        let frame = projection.frame();

        // The ocean layer alone leaves gaps at the poles, so the frame starts out as water.
        let mut group = Group::new().add(
            Rectangle::new()
                .set("x", frame.x as f32)
                .set("y", frame.y as f32)
                .set("width", frame.width as f32)
                .set("height", frame.height as f32)
                .set("fill", OCEAN_COLOR),
        );

        if let Some(ocean) = polygons_path(&basemap.ocean, projection) {
            group = group.add(ocean.set("fill", OCEAN_COLOR));
        }

        if let Some(land) = polygons_path(&basemap.land, projection) {
            group = group.add(land.set("fill", LAND_COLOR));
        }

        if let Some(lakes) = polygons_path(&basemap.lakes, projection) {
            group = group.add(
                lakes
                    .set("fill", OCEAN_COLOR)
                    .set("stroke", WATER_EDGE_COLOR)
                    .set("stroke-width", 0.5),
            );
        }

        if let Some(rivers) = lines_path(&basemap.rivers, projection) {
            group = group.add(
                rivers
                    .set("stroke", WATER_EDGE_COLOR)
                    .set("stroke-width", 0.7),
            );
        }

        if let Some(borders) = lines_path(&basemap.borders, projection) {
            group = group.add(
                borders
                    .set("stroke", BORDER_COLOR)
                    .set("stroke-width", 0.8)
                    .set("stroke-dasharray", "4 3"),
            );
        }

        if let Some(coastlines) = lines_path(&basemap.coastlines, projection) {
            group = group.add(
                coastlines
                    .set("stroke", COASTLINE_COLOR)
                    .set("stroke-width", 1.0),
            );
        }

        group
    }
}
