use crate::{constants::GREAT_CIRCLE_STEP_DEGREES, types::Coordinates};

use geo::{Distance, Haversine, InterpolatePoint, Point};

const MEAN_EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// Haversine distance in kilometers.
pub(crate) fn distance_km(from: Coordinates, to: Coordinates) -> f64 {
    Haversine.distance(Point::from(from), Point::from(to)) / 1000.0
}

/// Samples the shortest path on the sphere between `from` and `to`. The path is split into
/// several runs wherever it crosses the antimeridian, so each run can be drawn as a polyline.
pub(crate) fn great_circle_runs(from: Coordinates, to: Coordinates) -> Vec<Vec<Coordinates>> {
    let start = Point::from(from);
    let end = Point::from(to);

    let arc_degrees = (Haversine.distance(start, end) / MEAN_EARTH_RADIUS_METERS).to_degrees();
    let steps = ((arc_degrees / GREAT_CIRCLE_STEP_DEGREES).ceil() as usize).max(1);

    let mut runs: Vec<Vec<Coordinates>> = vec![Vec::with_capacity(steps + 1)];

    for step in 0..=steps {
        let point = match step {
            0 => start,
            s if s == steps => end,
            s => Haversine.point_at_ratio_between(start, end, s as f64 / steps as f64),
        };
        let coords = Coordinates::new(point.y(), point.x());

        if let Some(run) = runs.last_mut() {
            if let Some(previous) = run.last() {
                if (coords.lon - previous.lon).abs() > 180.0 {
                    runs.push(vec![coords]);
                    continue;
                }
            }
            run.push(coords);
        }
    }

    runs
}
