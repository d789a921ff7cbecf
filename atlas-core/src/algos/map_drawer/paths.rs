use crate::{algos::Projection, types::Coordinates};

use geo::{BoundingRect, LineString, Polygon};
use rayon::prelude::*;
use svg::node::element::{Path, path::Data};

/// Projects the polygons overlapping the viewport into a single even-odd filled path.
pub(crate) fn polygons_path(polygons: &[Polygon<f64>], projection: &Projection) -> Option<Path> {
    let extent = projection.extent();

    let rings = polygons
        .par_iter()
        .filter(|polygon| {
            polygon
                .bounding_rect()
                .is_some_and(|rect| extent.overlaps(&rect))
        })
        .flat_map_iter(|polygon| std::iter::once(polygon.exterior()).chain(polygon.interiors()))
        .filter_map(|ring| ring_data(ring, projection, true))
        .collect::<Vec<_>>();

    merge(rings).map(|data| Path::new().set("fill-rule", "evenodd").set("d", data))
}

/// Projects the lines overlapping the viewport into a single stroked path.
pub(crate) fn lines_path(lines: &[LineString<f64>], projection: &Projection) -> Option<Path> {
    let extent = projection.extent();

    let runs = lines
        .par_iter()
        .filter(|line| line.bounding_rect().is_some_and(|rect| extent.overlaps(&rect)))
        .filter_map(|line| ring_data(line, projection, false))
        .collect::<Vec<_>>();

    merge(runs).map(|data| {
        Path::new()
            .set("fill", "none")
            .set("stroke-linejoin", "round")
            .set("stroke-linecap", "round")
            .set("d", data)
    })
}

/// A polyline through already-resolved coordinates.
pub(crate) fn coordinates_path(run: &[Coordinates], projection: &Projection) -> Option<Path> {
    let (first, rest) = run.split_first()?;

    let mut data = Data::new().move_to(projection.project_coords(*first));
    for coords in rest {
        data = data.line_to(projection.project_coords(*coords));
    }

    Some(
        Path::new()
            .set("fill", "none")
            .set("stroke-linejoin", "round")
            .set("stroke-linecap", "round")
            .set("d", data),
    )
}

fn ring_data(line: &LineString<f64>, projection: &Projection, close: bool) -> Option<Vec<String>> {
    let mut coords = line.coords();
    let first = coords.next()?;

    let mut commands = Vec::with_capacity(line.0.len());
    let (x, y) = projection.project_coord(*first);
    commands.push(format!("M{x:.1},{y:.1}"));

    for coord in coords {
        let (x, y) = projection.project_coord(*coord);
        commands.push(format!("L{x:.1},{y:.1}"));
    }

    if close {
        commands.push("Z".to_string());
    }

    Some(commands)
}

fn merge(parts: Vec<Vec<String>>) -> Option<String> {
    if parts.is_empty() {
        return None;
    }

    Some(parts.into_iter().flatten().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::algos::{DrawConfig, Extent};

    use geo::{LineString, polygon};

    fn europe() -> Projection {
        Projection::fit(
            Extent {
                min_lon: -20.0,
                max_lon: 40.0,
                min_lat: 30.0,
                max_lat: 70.0,
            },
            &DrawConfig::default(),
        )
    }

    #[test]
    fn test_polygons_outside_the_viewport_are_culled() {
        let inside = polygon![(x: 0.0, y: 40.0), (x: 10.0, y: 40.0), (x: 10.0, y: 50.0)];
        let outside = polygon![(x: 100.0, y: 0.0), (x: 110.0, y: 0.0), (x: 110.0, y: 10.0)];

        let path = polygons_path(&[inside, outside.clone()], &europe()).unwrap();
        let rendered = path.to_string();
        assert_eq!(rendered.matches('M').count(), 1);
        assert!(rendered.contains('Z'));

        assert!(polygons_path(&[outside], &europe()).is_none());
    }

    #[test]
    fn test_lines_are_left_open() {
        let line = LineString::from(vec![(0.0, 40.0), (10.0, 45.0), (20.0, 50.0)]);

        let rendered = lines_path(&[line], &europe()).unwrap().to_string();
        assert_eq!(rendered.matches('L').count(), 2);
        assert!(!rendered.contains('Z'));
    }

    #[test]
    fn test_coordinates_path_needs_a_point() {
        assert!(coordinates_path(&[], &europe()).is_none());

        let run = [Coordinates::new(45.0, 0.0), Coordinates::new(50.0, 10.0)];
        assert!(coordinates_path(&run, &europe()).is_some());
    }
}
