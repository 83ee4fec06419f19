//! # Geographic Utilities
//!
//! Distance and bounding-box helpers shared by the shelter search and the
//! route overlay.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a decoded route in meters |
//! | [`compute_bounds`] | Bounding box of a set of points |
//! | [`pad_bounds`] | Grow a bounding box by a margin in meters |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |
//!
//! ## Example
//!
//! ```rust
//! use shelter_router::{GpsPoint, geo_utils};
//!
//! let user = GpsPoint::new(32.0853, 34.7818); // Tel Aviv
//! let shelter = GpsPoint::new(32.0868, 34.7898);
//!
//! let dist = geo_utils::haversine_distance(&user, &shelter);
//! println!("Shelter is {:.0}m away", dist);
//! ```
//!
//! All functions expect WGS84 coordinates in degrees. Distances use the
//! haversine formula on a sphere of radius 6,371 km, which is within 0.5% of
//! the ellipsoidal distance and more than enough to rank shelters.

use geo::{Point, Haversine, Distance};
use crate::{GpsPoint, Bounds};

// =============================================================================
// Distance Functions
// =============================================================================

/// Great-circle distance in meters between two GPS points.
///
/// ```rust
/// use shelter_router::{GpsPoint, geo_utils};
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of a polyline in meters.
///
/// Sums the haversine distance between consecutive points. Empty or
/// single-point input returns 0.0.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Convert meters to approximate degrees at a given latitude.
///
/// Uses the longitude scale (the smaller of the two), so the result is a
/// conservative value for square margins. At the equator 1 degree is about
/// 111,320 meters.
#[inline]
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = 111_320.0 * lat_rad.cos().max(0.1);
    meters / meters_per_degree
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a set of points.
///
/// For empty input the result has inverted MIN/MAX extents; use
/// [`Bounds::from_points`] when an `Option` is preferable.
///
/// ```rust
/// use shelter_router::{GpsPoint, geo_utils};
///
/// let points = vec![
///     GpsPoint::new(32.0800, 34.7800),
///     GpsPoint::new(32.0900, 34.7900),
///     GpsPoint::new(32.0850, 34.7850),
/// ];
///
/// let bounds = geo_utils::compute_bounds(&points);
/// assert_eq!(bounds.min_lat, 32.0800);
/// assert_eq!(bounds.max_lng, 34.7900);
/// ```
pub fn compute_bounds(points: &[GpsPoint]) -> Bounds {
    let mut min_lat = f64::MAX;
    let mut max_lat = f64::MIN;
    let mut min_lng = f64::MAX;
    let mut max_lng = f64::MIN;

    for p in points {
        min_lat = min_lat.min(p.latitude);
        max_lat = max_lat.max(p.latitude);
        min_lng = min_lng.min(p.longitude);
        max_lng = max_lng.max(p.longitude);
    }

    Bounds { min_lat, max_lat, min_lng, max_lng }
}

/// Grow a bounding box by `margin_meters` on every side.
///
/// Latitudes are clamped to [-90, 90]. Used to keep route endpoints off the
/// very edge of the viewport.
pub fn pad_bounds(bounds: &Bounds, margin_meters: f64) -> Bounds {
    let reference_lat = (bounds.min_lat + bounds.max_lat) / 2.0;
    let margin_deg = meters_to_degrees(margin_meters.max(0.0), reference_lat);

    Bounds {
        min_lat: (bounds.min_lat - margin_deg).max(-90.0),
        max_lat: (bounds.max_lat + margin_deg).min(90.0),
        min_lng: bounds.min_lng - margin_deg,
        max_lng: bounds.max_lng + margin_deg,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
