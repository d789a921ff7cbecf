use super::paths::coordinates_path;
use crate::{
    algos::{DrawConfig, Projection},
    constants::{
        FONT_FAMILY, GRID_FONT_SIZE, GRID_OPACITY, LABEL_FONT_SIZE, LABEL_OFFSET, MARKER_RADIUS,
        MARKER_STROKE_WIDTH, TITLE_FONT_SIZE,
    },
    types::{CityMarker, Coordinates},
};

use svg::{
    Node,
    node::{
        Text as TextContent,
        element::{Circle, ClipPath, Definitions, Element, Group, Line, Rectangle},
    },
};

pub(super) const FRAME_CLIP_ID: &str = "map-frame";

const GRID_COLOR: &str = "#808080";
const LABEL_COLOR: &str = "#1a1a1a";
const HALO_COLOR: &str = "#ffffff";
const ROUTE_COLOR: &str = "#ffcc00";

const GRID_STEPS: [f64; 8] = [1.0, 2.0, 5.0, 10.0, 15.0, 20.0, 30.0, 60.0];
const MAX_GRID_LINES: f64 = 8.0;

pub(super) fn background(config: &DrawConfig) -> Rectangle {
    Rectangle::new()
        .set("x", 0)
        .set("y", 0)
        .set("width", config.canvas_width())
        .set("height", config.canvas_height())
        .set("fill", HALO_COLOR)
}

/// Clip path matching the map frame, referenced by the basemap layers.
pub(super) fn frame_clip(projection: &Projection) -> Definitions {
    Definitions::new().add(
        ClipPath::new()
            .set("id", FRAME_CLIP_ID)
            .add(frame_rectangle(projection)),
    )
}

pub(super) fn frame_border(projection: &Projection) -> Rectangle {
    frame_rectangle(projection)
        .set("fill", "none")
        .set("stroke", "#000000")
        .set("stroke-width", 1)
}

fn frame_rectangle(projection: &Projection) -> Rectangle {
    let frame = projection.frame();

    Rectangle::new()
        .set("x", frame.x as f32)
        .set("y", frame.y as f32)
        .set("width", frame.width as f32)
        .set("height", frame.height as f32)
}

/// Spacing between grid lines, in degrees, so that a span shows at most a handful of lines.
pub(crate) fn grid_step(span: f64) -> f64 {
    GRID_STEPS
        .iter()
        .copied()
        .find(|step| span / step <= MAX_GRID_LINES)
        .unwrap_or(90.0)
}

pub(crate) fn grid_ticks(min: f64, max: f64) -> Vec<f64> {
    let step = grid_step(max - min);
    let mut tick = (min / step).ceil() * step;

    let mut ticks = Vec::new();
    while tick <= max + 1e-9 {
        ticks.push(tick);
        tick += step;
    }

    ticks
}

pub(crate) fn format_degrees(value: f64, positive: char, negative: char) -> String {
    let magnitude = value.abs();
    let number = if magnitude.fract().abs() < 1e-9 {
        format!("{magnitude:.0}")
    } else {
        format!("{magnitude:.1}")
    };

    if magnitude < 1e-9 {
        format!("{number}°")
    } else if value > 0.0 {
        format!("{number}°{positive}")
    } else {
        format!("{number}°{negative}")
    }
}

/// Translucent meridians and parallels. Labels go on the bottom and left edges only.
pub(super) fn grid(projection: &Projection) -> Group {
    let extent = projection.extent();
    let frame = projection.frame();

    let mut lines = Group::new()
        .set("stroke", GRID_COLOR)
        .set("stroke-opacity", GRID_OPACITY)
        .set("stroke-width", 0.8)
        .set("stroke-dasharray", "2 3");
    let mut labels = Group::new()
        .set("font-family", FONT_FAMILY)
        .set("font-size", GRID_FONT_SIZE)
        .set("fill", LABEL_COLOR)
        .set("fill-opacity", 0.8);

    let bottom = (frame.y + frame.height) as f32;
    let left = frame.x as f32;

    for lon in grid_ticks(extent.min_lon, extent.max_lon) {
        let (x, top) = projection.project(lon, extent.max_lat);
        lines = lines.add(
            Line::new()
                .set("x1", x)
                .set("y1", top)
                .set("x2", x)
                .set("y2", bottom),
        );
        labels = labels.add(text(
            &format_degrees(lon, 'E', 'W'),
            x,
            bottom + GRID_FONT_SIZE as f32 + 4.0,
            "middle",
        ));
    }

    for lat in grid_ticks(extent.min_lat, extent.max_lat) {
        let (right, y) = projection.project(extent.max_lon, lat);
        lines = lines.add(
            Line::new()
                .set("x1", left)
                .set("y1", y)
                .set("x2", right)
                .set("y2", y),
        );
        labels = labels.add(text(
            &format_degrees(lat, 'N', 'S'),
            left - 6.0,
            y + GRID_FONT_SIZE as f32 / 3.0,
            "end",
        ));
    }

    Group::new().add(lines).add(labels)
}

/// Filled circles with a black outline, each labeled with the city name.
pub(super) fn markers(projection: &Projection, markers: &[CityMarker]) -> Group {
    let mut circles = Group::new()
        .set("stroke", "#000000")
        .set("stroke-width", MARKER_STROKE_WIDTH);
    let mut labels = Group::new()
        .set("font-family", FONT_FAMILY)
        .set("font-size", LABEL_FONT_SIZE)
        .set("font-weight", "bold")
        .set("fill", LABEL_COLOR)
        .set("stroke", HALO_COLOR)
        .set("stroke-width", 3)
        .set("stroke-linejoin", "round")
        .set("paint-order", "stroke");

    for marker in markers {
        let (x, y) = projection.project_coords(marker.coords);

        circles = circles.add(
            Circle::new()
                .set("cx", x)
                .set("cy", y)
                .set("r", MARKER_RADIUS)
                .set("fill", marker.color.hex()),
        );
        labels = labels.add(text(
            &marker.name,
            x + LABEL_OFFSET as f32,
            y - LABEL_OFFSET as f32 / 2.0,
            "start",
        ));
    }

    Group::new().add(circles).add(labels)
}

/// A great-circle route, drawn as polylines with a dark casing.
pub(super) fn route(projection: &Projection, runs: &[Vec<Coordinates>]) -> Group {
    let mut casing = Group::new()
        .set("stroke", "#000000")
        .set("stroke-opacity", 0.6)
        .set("stroke-width", 5);
    let mut line = Group::new().set("stroke", ROUTE_COLOR).set("stroke-width", 2.5);

    for run in runs {
        if let Some(path) = coordinates_path(run, projection) {
            casing = casing.add(path.clone());
            line = line.add(path);
        }
    }

    Group::new().add(casing).add(line)
}

pub(super) fn title(config: &DrawConfig, title: &str) -> Element {
    let mut element = text(
        title,
        config.canvas_width() as f32 / 2.0,
        TITLE_FONT_SIZE as f32 + 12.0,
        "middle",
    );
    element.assign("font-family", FONT_FAMILY);
    element.assign("font-size", TITLE_FONT_SIZE);
    element.assign("font-weight", "bold");
    element.assign("fill", LABEL_COLOR);

    element
}

fn text(content: &str, x: f32, y: f32, anchor: &str) -> Element {
    let mut element = Element::new("text");
    element.assign("x", x);
    element.assign("y", y);
    element.assign("text-anchor", anchor);
    element.append(TextContent::new(content));

    element
}
