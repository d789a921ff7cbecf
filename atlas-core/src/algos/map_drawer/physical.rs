use super::{
    BasemapDrawer,
    paths::{lines_path, polygons_path},
};
use crate::{
    algos::{Extent, Projection},
    basemap::Basemap,
};

use svg::node::element::{Definitions, Group, Image, LinearGradient, Rectangle, Stop};

const OCEAN_GRADIENT_ID: &str = "relief-ocean";
const LAND_GRADIENT_ID: &str = "relief-land";

const COASTLINE_COLOR: &str = "#1e1e1e";
const BORDER_COLOR: &str = "#f5f5f5";

/// Relief imagery under coastlines and borders. Without a relief image the ocean and land are
/// shaded with latitude gradients instead.
pub(super) struct PhysicalBasemapDrawer;

impl BasemapDrawer for PhysicalBasemapDrawer {
    fn draw(&self, basemap: &Basemap, projection: &Projection) -> Group {
        let mut group = match basemap.relief() {
            Some(image) => {
                Group::new().add(Self::relief_image(&image.to_string_lossy(), projection))
            }
            None => Self::shaded_relief(basemap, projection),
        };

        if let Some(borders) = lines_path(&basemap.borders, projection) {
            group = group.add(
                borders
                    .set("stroke", BORDER_COLOR)
                    .set("stroke-opacity", 0.7)
                    .set("stroke-width", 0.8),
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

impl PhysicalBasemapDrawer {
    /// The whole-world image, stretched so that its corners land on (-180, 90) and (180, -90).
    /// The frame clip keeps only the visible window.
    fn relief_image(href: &str, projection: &Projection) -> Image {
        let (x0, y0) = projection.project(Extent::WORLD.min_lon, Extent::WORLD.max_lat);
        let (x1, y1) = projection.project(Extent::WORLD.max_lon, Extent::WORLD.min_lat);

        Image::new()
            .set("href", href)
            .set("x", x0)
            .set("y", y0)
            .set("width", x1 - x0)
            .set("height", y1 - y0)
            .set("preserveAspectRatio", "none")
    }

    fn shaded_relief(basemap: &Basemap, projection: &Projection) -> Group {
        let frame = projection.frame();

        let defs = Definitions::new()
            .add(Self::latitude_gradient(
                OCEAN_GRADIENT_ID,
                projection,
                &[("#0b2e59", 0.0), ("#1d5f99", 0.5), ("#0b2e59", 1.0)],
            ))
            .add(Self::latitude_gradient(
                LAND_GRADIENT_ID,
                projection,
                &[
                    ("#e8eef2", 0.0),
                    ("#7d8f5a", 0.2),
                    ("#4f7a3a", 0.38),
                    ("#c7a76b", 0.5),
                    ("#4f7a3a", 0.62),
                    ("#7d8f5a", 0.8),
                    ("#e8eef2", 1.0),
                ],
            ));

        let mut group = Group::new().add(defs).add(
            Rectangle::new()
                .set("x", frame.x as f32)
                .set("y", frame.y as f32)
                .set("width", frame.width as f32)
                .set("height", frame.height as f32)
                .set("fill", format!("url(#{OCEAN_GRADIENT_ID})")),
        );

        if let Some(land) = polygons_path(&basemap.land, projection) {
            group = group.add(
                land.set("fill", format!("url(#{LAND_GRADIENT_ID})"))
                    .set("stroke", "#3b4d2a")
                    .set("stroke-width", 0.4),
            );
        }

        if let Some(lakes) = polygons_path(&basemap.lakes, projection) {
            group = group.add(lakes.set("fill", "#1d5f99"));
        }

        group
    }

    /// A vertical gradient pinned to world latitudes (90N at offset 0, 90S at offset 1), so the
    /// shading stays put whatever the viewport is.
    fn latitude_gradient(
        id: &str,
        projection: &Projection,
        stops: &[(&str, f32)],
    ) -> LinearGradient {
        let (_, north) = projection.project(0.0, Extent::WORLD.max_lat);
        let (_, south) = projection.project(0.0, Extent::WORLD.min_lat);

        let mut gradient = LinearGradient::new()
            .set("id", id)
            .set("gradientUnits", "userSpaceOnUse")
            .set("x1", 0)
            .set("y1", north)
            .set("x2", 0)
            .set("y2", south);

        for (color, offset) in stops {
            gradient = gradient.add(Stop::new().set("offset", *offset).set("stop-color", *color));
        }

        gradient
    }
}
