//! Spherical Web Mercator point math.
//!
//! The projection maps the world onto a square of side `2 * R` meters where
//! `R` is half the projected-system world circumference. The inverse mapping
//! recovers longitude linearly and latitude through the Gudermannian
//! function.

use std::f64::consts::PI;

/// Half the Web Mercator world circumference in meters (the extent of the
/// projected square along each axis).
pub const WEB_MERCATOR_EXTENT_M: f64 = 20_037_508.34;

/// Convert a projected Web Mercator coordinate to WGS84 degrees.
///
/// Outputs are clamped to [-180, 180] longitude and [-90, 90] latitude, so
/// out-of-range projected input still yields a valid geographic pair.
pub fn web_mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lng = (x / WEB_MERCATOR_EXTENT_M) * 180.0;
    let lng = lng.clamp(-180.0, 180.0);

    let lat = (y / WEB_MERCATOR_EXTENT_M) * 180.0;
    let lat = (180.0 / PI) * (2.0 * (lat * PI / 180.0).exp().atan() - PI / 2.0);
    let lat = lat.clamp(-90.0, 90.0);

    (lng, lat)
}

/// Convert a WGS84 coordinate in degrees to projected Web Mercator meters.
///
/// Latitude is clamped just inside the poles first; the Mercator latitude
/// term diverges at ±90°.
pub fn wgs84_to_web_mercator(lng: f64, lat: f64) -> (f64, f64) {
    let x = lng / 180.0 * WEB_MERCATOR_EXTENT_M;

    let lat = lat.clamp(-89.9999, 89.9999);
    let y = (PI / 4.0 + lat * PI / 360.0).tan().ln() / PI * 180.0;
    let y = y / 180.0 * WEB_MERCATOR_EXTENT_M;

    (x, y)
}
