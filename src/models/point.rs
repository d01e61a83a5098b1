//! Field-visit point model.
//!
//! A point is one site the crew must visit. The engine only reads its
//! coordinates; attributes are carried through untouched for display and
//! export.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::DayLabel;

/// A geo-located field-visit point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Unique point identifier.
    pub id: String,
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
    /// Label found in the input table, if any.
    pub label: Option<DayLabel>,
    /// Opaque columns carried through to export (e.g. a contract reference).
    pub attributes: BTreeMap<String, String>,
}

impl Point {
    /// Creates a point at the given coordinates.
    pub fn new(id: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: id.into(),
            lat,
            lng,
            label: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Sets the pre-existing day label.
    pub fn with_label(mut self, label: impl Into<DayLabel>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Coordinates as `[lat, lng]`.
    #[inline]
    pub fn coords(&self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

/// The immutable input set of points.
///
/// Point order is significant: it is the tie-break order of the
/// deterministic strategies and the index space of [`super::Assignment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PointSet {
    points: Vec<Point>,
    /// Name of the attribute shown next to a point (the "contract" column).
    display_attribute: Option<String>,
}

impl PointSet {
    /// Creates a point set.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points,
            display_attribute: None,
        }
    }

    /// Sets the display attribute name.
    pub fn with_display_attribute(mut self, name: impl Into<String>) -> Self {
        self.display_attribute = Some(name.into());
        self
    }

    /// All points in input order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the set is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`.
    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    /// Index of the point with the given id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.points.iter().position(|p| p.id == id)
    }

    /// Coordinates of every point as `[lat, lng]`.
    pub fn coords(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(Point::coords).collect()
    }

    /// Attribute name used for display, if the table had one.
    pub fn display_attribute(&self) -> Option<&str> {
        self.display_attribute.as_deref()
    }

    /// Display text for a point (`"Sin dato"` when missing).
    pub fn display_value(&self, index: usize) -> &str {
        self.display_attribute
            .as_deref()
            .and_then(|attr| self.points.get(index)?.attributes.get(attr))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("Sin dato")
    }

    /// Union of attribute keys across all points, sorted.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .points
            .iter()
            .flat_map(|p| p.attributes.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
