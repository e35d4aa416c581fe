//! Coordinate and distance module
//!
//! Provides geodesic distance on the WGS84 ellipsoid and great-circle
//! destination projection. Zone radii are in meters, so every distance in
//! the crate goes through [`geodesic_distance`] rather than comparing raw
//! degrees.

mod types;

pub use types::{ensure_finite, CoordError, GeoPoint, MAX_LAT, MAX_LON, MIN_LAT, MIN_LON};

use geo::{GeodesicDistance, HaversineDestination, Point};

/// Geodesic surface distance between two points, in meters.
///
/// Uses Karney's algorithm on the WGS84 ellipsoid.
#[inline]
pub fn geodesic_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let a: Point<f64> = a.into();
    let b: Point<f64> = b.into();
    a.geodesic_distance(&b)
}

/// Project a point along a great circle.
///
/// # Arguments
///
/// * `from` - Starting point
/// * `bearing_deg` - Initial bearing in degrees (0 = north, 90 = east)
/// * `distance_m` - Distance to travel in meters
#[inline]
pub fn destination(from: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let start: Point<f64> = from.into();
    start.haversine_destination(bearing_deg, distance_m).into()
}
