use super::{BasemapDrawer, paths::lines_path};
use crate::{algos::Projection, basemap::Basemap};

use svg::node::element::Group;

const COASTLINE_COLOR: &str = "#333333";
const BORDER_COLOR: &str = "#8a8a8a";

/// Coastlines and national borders over a blank background.
pub(super) struct SimpleBasemapDrawer;

impl BasemapDrawer for SimpleBasemapDrawer {
    fn draw(&self, basemap: &Basemap, projection: &Projection) -> Group {
        let mut group = Group::new();

        if let Some(borders) = lines_path(&basemap.borders, projection) {
            group = group.add(
                borders
                    .set("stroke", BORDER_COLOR)
                    .set("stroke-width", 0.6),
            );
        }

        if let Some(coastlines) = lines_path(&basemap.coastlines, projection) {
            group = group.add(
                coastlines
                    .set("stroke", COASTLINE_COLOR)
                    .set("stroke-width", 0.9),
            );
        }

        group
    }
}
