//! Selection regions for manual overrides.
//!
//! A [`Region`] is a simple polygon (outer ring only) in `[lng, lat]`
//! order, the axis order of GeoJSON and of map drawing tools. Holes and
//! additional polygons of a multipolygon are ignored.
//!
//! Construction validates the ring: at least three distinct vertices,
//! finite coordinates, non-zero area and no self-intersecting edges.
//! Containment uses the nonzero winding rule; points lying on an edge are
//! resolved by [`BoundaryPolicy`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Relative tolerance for on-edge and zero-area tests.
const EPS: f64 = 1e-12;

/// Region construction errors.
#[derive(Debug, Error)]
pub enum RegionError {
    /// The input is not valid JSON.
    #[error("region is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is not a usable GeoJSON geometry.
    #[error("invalid GeoJSON region: {0}")]
    InvalidGeoJson(String),

    /// Geometry type other than Polygon or MultiPolygon.
    #[error("unsupported geometry type '{0}' (expected Polygon or MultiPolygon)")]
    UnsupportedGeometry(String),

    /// Fewer than three distinct vertices.
    #[error("region needs at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    /// A vertex coordinate is NaN or infinite.
    #[error("region vertex {0} has a non-finite coordinate")]
    NonFiniteCoordinate(usize),

    /// All vertices are collinear.
    #[error("region has zero area")]
    ZeroArea,

    /// Two non-adjacent edges touch or cross.
    #[error("region edges {0} and {1} intersect")]
    SelfIntersecting(usize, usize),
}

/// How points exactly on the region boundary are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryPolicy {
    /// Boundary points are selected.
    #[default]
    Inclusive,
    /// Boundary points are not selected.
    Exclusive,
}

/// A validated simple polygon in `[lng, lat]` order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    ring: Vec<[f64; 2]>,
}

impl Region {
    /// Builds a region from `[lng, lat]` vertices.
    ///
    /// A closing vertex equal to the first one is optional. Consecutive
    /// duplicates are collapsed.
    pub fn from_lng_lat(vertices: Vec<[f64; 2]>) -> Result<Self, RegionError> {
        for (i, v) in vertices.iter().enumerate() {
            if !v[0].is_finite() || !v[1].is_finite() {
                return Err(RegionError::NonFiniteCoordinate(i));
            }
        }

        let mut ring: Vec<[f64; 2]> = Vec::with_capacity(vertices.len());
        for v in vertices {
            if ring.last() != Some(&v) {
                ring.push(v);
            }
        }
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() < 3 {
            return Err(RegionError::TooFewVertices(ring.len()));
        }

        // A symmetric bow tie has zero signed area, so crossings come first.
        let region = Self { ring };
        if let Some((a, b)) = region.first_self_intersection() {
            return Err(RegionError::SelfIntersecting(a, b));
        }
        if region.area() <= EPS * region.scale().powi(2) {
            return Err(RegionError::ZeroArea);
        }
        Ok(region)
    }

    /// Builds a region from `[lat, lng]` vertices.
    pub fn from_lat_lng(vertices: Vec<[f64; 2]>) -> Result<Self, RegionError> {
        Self::from_lng_lat(vertices.into_iter().map(|[lat, lng]| [lng, lat]).collect())
    }

    /// Parses a GeoJSON geometry, Feature or drawing-tool payload.
    ///
    /// `Polygon` uses its first ring; `MultiPolygon` uses the first ring of
    /// its first polygon. A Feature contributes its `geometry`.
    pub fn from_geojson(value: &Value) -> Result<Self, RegionError> {
        let geometry = match value.get("type").and_then(Value::as_str) {
            Some("Feature") => value
                .get("geometry")
                .ok_or_else(|| RegionError::InvalidGeoJson("Feature without geometry".into()))?,
            Some(_) => value,
            None => return Err(RegionError::InvalidGeoJson("missing 'type'".into())),
        };

        let kind = geometry
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| RegionError::InvalidGeoJson("geometry without 'type'".into()))?;
        let coords = geometry
            .get("coordinates")
            .ok_or_else(|| RegionError::InvalidGeoJson("geometry without 'coordinates'".into()))?;

        let ring = match kind {
            "Polygon" => coords.get(0),
            "MultiPolygon" => coords.get(0).and_then(|p| p.get(0)),
            other => return Err(RegionError::UnsupportedGeometry(other.to_string())),
        }
        .ok_or_else(|| RegionError::InvalidGeoJson(format!("{kind} has no outer ring")))?;

        let vertices: Vec<[f64; 2]> = serde_json::from_value::<Vec<Vec<f64>>>(ring.clone())?
            .into_iter()
            .enumerate()
            .map(|(i, pos)| match pos.as_slice() {
                [lng, lat, ..] => Ok([*lng, *lat]),
                _ => Err(RegionError::InvalidGeoJson(format!(
                    "position {i} has fewer than two coordinates"
                ))),
            })
            .collect::<Result<_, _>>()?;
        Self::from_lng_lat(vertices)
    }

    /// Parses GeoJSON text.
    pub fn from_geojson_str(text: &str) -> Result<Self, RegionError> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_geojson(&value)
    }

    /// Vertices in `[lng, lat]` order, without the closing vertex.
    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.ring
    }

    /// Absolute shoelace area in squared degrees.
    pub fn area(&self) -> f64 {
        let n = self.ring.len();
        let twice: f64 = (0..n)
            .map(|i| {
                let a = self.ring[i];
                let b = self.ring[(i + 1) % n];
                a[0] * b[1] - b[0] * a[1]
            })
            .sum();
        twice.abs() / 2.0
    }

    /// Whether the point at `lat`/`lng` is selected.
    pub fn contains(&self, lat: f64, lng: f64, policy: BoundaryPolicy) -> bool {
        let p = [lng, lat];
        if self.on_boundary(p) {
            return policy == BoundaryPolicy::Inclusive;
        }
        self.winding_number(p) != 0
    }

    fn scale(&self) -> f64 {
        self.ring
            .iter()
            .flat_map(|v| [v[0].abs(), v[1].abs()])
            .fold(1.0, f64::max)
    }

    fn edges(&self) -> impl Iterator<Item = ([f64; 2], [f64; 2])> + '_ {
        let n = self.ring.len();
        (0..n).map(move |i| (self.ring[i], self.ring[(i + 1) % n]))
    }

    fn on_boundary(&self, p: [f64; 2]) -> bool {
        let tol = EPS * self.scale();
        self.edges().any(|(a, b)| on_segment(a, b, p, tol))
    }

    fn winding_number(&self, p: [f64; 2]) -> i32 {
        let mut winding = 0;
        for (a, b) in self.edges() {
            if a[1] <= p[1] {
                if b[1] > p[1] && cross(a, b, p) > 0.0 {
                    winding += 1;
                }
            } else if b[1] <= p[1] && cross(a, b, p) < 0.0 {
                winding -= 1;
            }
        }
        winding
    }

    fn first_self_intersection(&self) -> Option<(usize, usize)> {
        let n = self.ring.len();
        let tol = EPS * self.scale();
        for i in 0..n {
            let (a1, a2) = (self.ring[i], self.ring[(i + 1) % n]);
            for j in (i + 2)..n {
                // Edges i and j share a vertex when they wrap around.
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (b1, b2) = (self.ring[j], self.ring[(j + 1) % n]);
                if segments_touch(a1, a2, b1, b2, tol) {
                    return Some((i, j));
                }
            }
        }
        None
    }
}

/// Orientation of `c` relative to the directed line `a → b`.
fn cross(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2], tol: f64) -> bool {
    let len = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2)).sqrt();
    if cross(a, b, p).abs() > tol * len.max(1.0) {
        return false;
    }
    p[0] >= a[0].min(b[0]) - tol
        && p[0] <= a[0].max(b[0]) + tol
        && p[1] >= a[1].min(b[1]) - tol
        && p[1] <= a[1].max(b[1]) + tol
}

/// Whether two segments cross or touch (endpoints and collinear overlap count).
fn segments_touch(a1: [f64; 2], a2: [f64; 2], b1: [f64; 2], b2: [f64; 2], tol: f64) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    on_segment(b1, b2, a1, tol)
        || on_segment(b1, b2, a2, tol)
        || on_segment(a1, a2, b1, tol)
        || on_segment(a1, a2, b2, tol)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Region {
        Region::from_lng_lat(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]])
            .unwrap()
    }

    #[test]
    fn test_closing_vertex_optional() {
        let open =
            Region::from_lng_lat(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]).unwrap();
        assert_eq!(open, unit_square());
        assert_eq!(open.vertices().len(), 4);
        assert!((open.area() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_contains() {
        let sq = unit_square();
        // contains(lat, lng)
        assert!(sq.contains(0.5, 0.5, BoundaryPolicy::Inclusive));
        assert!(!sq.contains(0.5, 1.5, BoundaryPolicy::Inclusive));
        assert!(!sq.contains(-0.1, 0.5, BoundaryPolicy::Exclusive));
    }

    #[test]
    fn test_boundary_policy() {
        let sq = unit_square();
        assert!(sq.contains(0.0, 0.5, BoundaryPolicy::Inclusive));
        assert!(!sq.contains(0.0, 0.5, BoundaryPolicy::Exclusive));
        assert!(sq.contains(1.0, 1.0, BoundaryPolicy::Inclusive));
        assert!(!sq.contains(1.0, 1.0, BoundaryPolicy::Exclusive));
    }

    #[test]
    fn test_concave_region() {
        // U shape opening north.
        let u = Region::from_lng_lat(vec![
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 3.0],
            [2.0, 3.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 3.0],
            [0.0, 3.0],
        ])
        .unwrap();
        assert!(u.contains(2.0, 0.5, BoundaryPolicy::Inclusive));
        assert!(!u.contains(2.0, 1.5, BoundaryPolicy::Inclusive));
        assert!(u.contains(0.5, 1.5, BoundaryPolicy::Inclusive));
    }

    #[test]
    fn test_rejects_too_few_vertices() {
        let err = Region::from_lng_lat(vec![[0.0, 0.0], [1.0, 1.0], [0.0, 0.0]]).unwrap_err();
        assert!(matches!(err, RegionError::TooFewVertices(2)));
    }

    #[test]
    fn test_rejects_zero_area() {
        let err = Region::from_lng_lat(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 2.0]]).unwrap_err();
        assert!(matches!(err, RegionError::ZeroArea));
    }

    #[test]
    fn test_rejects_non_finite() {
        let err =
            Region::from_lng_lat(vec![[0.0, 0.0], [f64::NAN, 1.0], [1.0, 0.0]]).unwrap_err();
        assert!(matches!(err, RegionError::NonFiniteCoordinate(1)));
    }

    #[test]
    fn test_rejects_bow_tie() {
        let err = Region::from_lng_lat(vec![[0.0, 0.0], [1.0, 1.0], [1.0, 0.0], [0.0, 1.0]])
            .unwrap_err();
        assert!(matches!(err, RegionError::SelfIntersecting(0, 2)));

        let lopsided = Region::from_lng_lat(vec![[0.0, 0.0], [2.0, 2.0], [2.0, 0.0], [0.0, 1.0]])
            .unwrap_err();
        assert!(matches!(lopsided, RegionError::SelfIntersecting(_, _)));
    }

    #[test]
    fn test_geojson_polygon_axis_order() {
        let region = Region::from_geojson_str(
            r#"{"type":"Polygon","coordinates":[[[-79.1,-8.2],[-79.0,-8.2],[-79.0,-8.1],[-79.1,-8.1],[-79.1,-8.2]]]}"#,
        )
        .unwrap();
        // Trujillo-area point: lat -8.15, lng -79.05.
        assert!(region.contains(-8.15, -79.05, BoundaryPolicy::Inclusive));
        assert!(!region.contains(-79.05, -8.15, BoundaryPolicy::Inclusive));
    }

    #[test]
    fn test_geojson_feature_and_multipolygon() {
        let feature = r#"{"type":"Feature","properties":{},"geometry":{"type":"MultiPolygon","coordinates":[[[[0,0],[2,0],[2,2],[0,2],[0,0]]],[[[5,5],[6,5],[6,6],[5,5]]]]}}"#;
        let region = Region::from_geojson_str(feature).unwrap();
        assert!(region.contains(1.0, 1.0, BoundaryPolicy::Inclusive));
        assert!(!region.contains(5.5, 5.2, BoundaryPolicy::Inclusive));
    }

    #[test]
    fn test_geojson_errors() {
        assert!(matches!(
            Region::from_geojson_str(r#"{"type":"Point","coordinates":[0,0]}"#),
            Err(RegionError::UnsupportedGeometry(t)) if t == "Point"
        ));
        assert!(matches!(
            Region::from_geojson_str("{not json"),
            Err(RegionError::Json(_))
        ));
        assert!(matches!(
            Region::from_geojson_str(r#"{"coordinates":[]}"#),
            Err(RegionError::InvalidGeoJson(_))
        ));
    }
}
