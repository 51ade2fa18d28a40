//! Spherical Web Mercator (EPSG:3857).

use crate::Point;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Semi-major axis of WGS84, used as the sphere radius by Web Mercator.
pub const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude at which the projected square world ends.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Project (lon, lat) degrees to Web Mercator meters.
///
/// Latitude is clamped to [`MAX_LATITUDE`] so poles stay finite.
pub fn lon_lat_to_web_mercator(point: Point) -> Point {
    let lat = point.y().clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Point::new(
        WEB_MERCATOR_RADIUS * point.x().to_radians(),
        WEB_MERCATOR_RADIUS * (FRAC_PI_4 + lat / 2.0).tan().ln(),
    )
}

pub fn web_mercator_to_lon_lat(point: Point) -> Point {
    Point::new(
        (point.x() / WEB_MERCATOR_RADIUS).to_degrees(),
        (2.0 * (point.y() / WEB_MERCATOR_RADIUS).exp().atan() - FRAC_PI_2).to_degrees(),
    )
}
