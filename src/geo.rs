//! Geographic helpers.
//!
//! Coordinates are `[lat, lng]` pairs in decimal degrees. The default
//! metric treats them as planar coordinates, which is accurate enough at
//! city or district scale; haversine is available when a caller needs
//! true great-circle distances.

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Distance metric over `[lat, lng]` pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Euclidean distance in degree space.
    #[default]
    Planar,
    /// Great-circle distance in kilometers.
    Haversine,
}

impl DistanceMetric {
    /// Distance between two coordinates.
    #[inline]
    pub fn distance(self, a: [f64; 2], b: [f64; 2]) -> f64 {
        match self {
            DistanceMetric::Planar => planar_distance(a, b),
            DistanceMetric::Haversine => haversine_distance(a, b),
        }
    }
}

/// Euclidean distance in degree space.
#[inline]
pub fn planar_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    squared_distance(a, b).sqrt()
}

/// Squared Euclidean distance in degree space.
#[inline]
pub fn squared_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

/// Haversine distance in kilometers.
pub fn haversine_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let d_lat = (b[0] - a[0]).to_radians();
    let d_lng = (b[1] - a[1]).to_radians();
    let lat1 = a[0].to_radians();
    let lat2 = b[0].to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Arithmetic mean of the coordinates. `None` for an empty slice.
pub fn centroid(coords: &[[f64; 2]]) -> Option<[f64; 2]> {
    if coords.is_empty() {
        return None;
    }
    let n = coords.len() as f64;
    let (sum_lat, sum_lng) = coords
        .iter()
        .fold((0.0, 0.0), |acc, c| (acc.0 + c[0], acc.1 + c[1]));
    Some([sum_lat / n, sum_lng / n])
}

/// Centroid of the coordinates selected by `indices`.
pub fn centroid_of(coords: &[[f64; 2]], indices: &[usize]) -> Option<[f64; 2]> {
    if indices.is_empty() {
        return None;
    }
    let n = indices.len() as f64;
    let (sum_lat, sum_lng) = indices
        .iter()
        .fold((0.0, 0.0), |acc, &i| (acc.0 + coords[i][0], acc.1 + coords[i][1]));
    Some([sum_lat / n, sum_lng / n])
}

/// Polar angle of `p` around `center`, in radians within `(-π, π]`.
///
/// Longitude is the x axis and latitude the y axis, so 0 points east and
/// π/2 points north.
#[inline]
pub fn polar_angle(center: [f64; 2], p: [f64; 2]) -> f64 {
    (p[0] - center[0]).atan2(p[1] - center[1])
}

/// Mean distance of the coordinates to their centroid.
///
/// Used to normalize spatial penalties; returns 1.0 when the points are
/// all coincident (or absent) so callers can divide safely.
pub fn mean_spread(coords: &[[f64; 2]], metric: DistanceMetric) -> f64 {
    let Some(center) = centroid(coords) else {
        return 1.0;
    };
    let spread =
        coords.iter().map(|&c| metric.distance(c, center)).sum::<f64>() / coords.len() as f64;
    if spread > f64::EPSILON {
        spread
    } else {
        1.0
    }
}
