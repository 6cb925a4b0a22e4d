//! Conversions between geodetic coordinates on the WGS-84 ellipsoid and geocentric spherical
//! coordinates. Angles in radians, lengths in metres.
use crate::utils::constants::{WGS84_ECCENTRICITY_SQUARED, WGS84_SEMI_MAJOR_AXIS};

const INVERSE_ITERATIONS: usize = 10;

/// Prime vertical radius of curvature at a geodetic latitude
pub fn prime_vertical_radius(geodetic_lat: f64) -> f64 {
    WGS84_SEMI_MAJOR_AXIS / (1.0 - WGS84_ECCENTRICITY_SQUARED * geodetic_lat.sin().powi(2)).sqrt()
}

/// Position in the meridian plane, (distance from the rotation axis, distance from the
/// equatorial plane), of a point at geodetic latitude and height above the ellipsoid.
fn meridian_position(geodetic_lat: f64, height: f64) -> (f64, f64) {
    let n = prime_vertical_radius(geodetic_lat);
    let (sin_lat, cos_lat) = geodetic_lat.sin_cos();
    (
        (n + height) * cos_lat,
        ((1.0 - WGS84_ECCENTRICITY_SQUARED) * n + height) * sin_lat,
    )
}

/// Converts a geodetic latitude and height above the ellipsoid into a geocentric radius and
/// geocentric latitude. Closed form, defined for every latitude in [-pi/2, pi/2].
pub fn geodetic_to_geocentric(geodetic_lat: f64, height: f64) -> (f64, f64) {
    let (p, z) = meridian_position(geodetic_lat, height);
    (p.hypot(z), z.atan2(p))
}

/// Converts a geocentric radius and latitude into a geodetic latitude and height above the
/// ellipsoid by fixed-point iteration on the latitude. Converges to well below a micrometre
/// in a handful of steps for any terrestrial or near-space point.
pub fn geocentric_to_geodetic(radius: f64, geocentric_lat: f64) -> (f64, f64) {
    let p = radius * geocentric_lat.cos();
    let z = radius * geocentric_lat.sin();

    let mut geodetic_lat = geocentric_lat;
    let mut height = 0.0;
    for _ in 0..INVERSE_ITERATIONS {
        let n = prime_vertical_radius(geodetic_lat);
        let (sin_lat, cos_lat) = geodetic_lat.sin_cos();
        // Stable at the poles, unlike p / cos(lat) - n
        height = p * cos_lat + z * sin_lat
            - WGS84_SEMI_MAJOR_AXIS
                * (1.0 - WGS84_ECCENTRICITY_SQUARED * sin_lat * sin_lat).sqrt();
        geodetic_lat = z.atan2(p * (1.0 - WGS84_ECCENTRICITY_SQUARED * n / (n + height)));
    }
    (geodetic_lat, height)
}
