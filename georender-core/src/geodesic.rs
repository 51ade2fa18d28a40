//! Spherical geodesy: destination points, great-circle distances and
//! circular buffers around a point.

use crate::Point;

/// Mean earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Point reached by travelling `distance_m` from `origin` along `bearing_deg`
/// (degrees clockwise from north).
pub fn destination(origin: Point, distance_m: f64, bearing_deg: f64) -> Point {
    let lon1 = origin.x().to_radians();
    let lat1 = origin.y().to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    Point::new(lon2.to_degrees(), lat2.to_degrees())
}

/// Haversine distance in meters.
pub fn distance(from: Point, to: Point) -> f64 {
    let d_lat = (to.y() - from.y()).to_radians();
    let d_lon = (to.x() - from.x()).to_radians();
    let lat1 = from.y().to_radians();
    let lat2 = to.y().to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    2.0 * a.sqrt().atan2((1.0 - a).sqrt()) * EARTH_RADIUS_M
}

/// Closed ring approximating a circle of `radius_m` around `center`.
///
/// Returns `steps + 1` vertices, the last repeating the first. Bearings start
/// due north and step counter-clockwise. Fewer than 3 steps are raised to 3.
pub fn circle(center: Point, radius_m: f64, steps: u32) -> Vec<Point> {
    let steps = steps.max(3);
    let mut ring = Vec::with_capacity(steps as usize + 1);

    for i in 0..steps {
        let bearing = i as f64 * -360.0 / steps as f64;
        ring.push(destination(center, radius_m, bearing));
    }
    ring.push(ring[0]);

    ring
}
