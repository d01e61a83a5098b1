//! Assignment (solution) model.
//!
//! An assignment maps every point of a [`PointSet`] to exactly one day
//! label or to the unassigned sentinel. It is stored parallel to the point
//! set order, so a point can never appear in two buckets.
//!
//! Only the partition strategies create assignments; afterwards the manual
//! override and the relabeling component are the only code paths that
//! mutate one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{DayLabel, PointSet};

/// A total point-id → day-label mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    point_ids: Vec<String>,
    labels: Vec<DayLabel>,
}

impl Assignment {
    /// Builds an assignment from the labels already present in the input
    /// table. Points without a label are unassigned.
    pub fn from_points(points: &PointSet) -> Self {
        Self {
            point_ids: points.points().iter().map(|p| p.id.clone()).collect(),
            labels: points
                .points()
                .iter()
                .map(|p| p.label.clone().unwrap_or(DayLabel::UNASSIGNED))
                .collect(),
        }
    }

    /// Builds an assignment from 0-based bucket indices (`None` = unassigned).
    ///
    /// Bucket `b` becomes label `b + 1`.
    pub(crate) fn from_buckets(points: &PointSet, buckets: &[Option<usize>]) -> Self {
        debug_assert_eq!(points.len(), buckets.len());
        Self {
            point_ids: points.points().iter().map(|p| p.id.clone()).collect(),
            labels: buckets
                .iter()
                .map(|b| match b {
                    Some(b) => DayLabel::day(b + 1),
                    None => DayLabel::UNASSIGNED,
                })
                .collect(),
        }
    }

    /// Number of points covered (assigned or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether the assignment covers no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in point order.
    #[inline]
    pub fn labels(&self) -> &[DayLabel] {
        &self.labels
    }

    /// Point ids in point order.
    #[inline]
    pub fn point_ids(&self) -> &[String] {
        &self.point_ids
    }

    /// Label of the point at `index`.
    pub fn label_at(&self, index: usize) -> Option<&DayLabel> {
        self.labels.get(index)
    }

    /// Label of the point with the given id.
    pub fn label_of(&self, point_id: &str) -> Option<&DayLabel> {
        self.point_ids
            .iter()
            .position(|id| id == point_id)
            .map(|idx| &self.labels[idx])
    }

    /// Indices of the points carrying `label`.
    pub fn members(&self, label: &DayLabel) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, l)| *l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of points carrying the unassigned sentinel.
    pub fn unassigned_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_unassigned()).count()
    }

    /// Member count per assigned label (sentinel excluded), ordered by label.
    pub fn counts(&self) -> BTreeMap<DayLabel, usize> {
        let mut counts = BTreeMap::new();
        for label in self.labels.iter().filter(|l| !l.is_unassigned()) {
            *counts.entry(label.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct assigned labels, ordered.
    pub fn distinct_labels(&self) -> Vec<DayLabel> {
        self.counts().into_keys().collect()
    }

    /// Whether this assignment was built over `points` (same ids, same order).
    pub fn matches(&self, points: &PointSet) -> bool {
        self.point_ids.len() == points.len()
            && self
                .point_ids
                .iter()
                .zip(points.points())
                .all(|(id, p)| *id == p.id)
    }

    /// Rewrites the label of one point.
    pub(crate) fn set_label(&mut self, index: usize, label: DayLabel) {
        self.labels[index] = label;
    }

    pub(crate) fn labels_mut(&mut self) -> &mut [DayLabel] {
        &mut self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn sample_points() -> PointSet {
        PointSet::new(vec![
            Point::new("A", 0.0, 0.0),
            Point::new("B", 0.0, 1.0).with_label("Lunes"),
            Point::new("C", 1.0, 0.0),
            Point::new("D", 1.0, 1.0),
        ])
    }

    #[test]
    fn test_from_buckets() {
        let points = sample_points();
        let a = Assignment::from_buckets(&points, &[Some(0), Some(1), None, Some(0)]);
        assert_eq!(a.len(), 4);
        assert_eq!(a.label_of("A"), Some(&DayLabel::Index(1)));
        assert_eq!(a.label_of("C"), Some(&DayLabel::UNASSIGNED));
        assert_eq!(a.unassigned_count(), 1);
        assert_eq!(a.members(&DayLabel::Index(1)), vec![0, 3]);
    }

    #[test]
    fn test_from_points_keeps_table_labels() {
        let points = sample_points();
        let a = Assignment::from_points(&points);
        assert_eq!(a.label_at(1), Some(&DayLabel::Name("Lunes".into())));
        assert_eq!(a.unassigned_count(), 3);
    }

    #[test]
    fn test_counts_exclude_sentinel() {
        let points = sample_points();
        let a = Assignment::from_buckets(&points, &[Some(1), Some(1), None, Some(0)]);
        let counts = a.counts();
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[&DayLabel::Index(1)], 1);
        assert_eq!(counts[&DayLabel::Index(2)], 2);
        assert_eq!(a.distinct_labels(), vec![DayLabel::Index(1), DayLabel::Index(2)]);
    }

    #[test]
    fn test_matches() {
        let points = sample_points();
        let a = Assignment::from_points(&points);
        assert!(a.matches(&points));
        let other = PointSet::new(vec![Point::new("X", 0.0, 0.0)]);
        assert!(!a.matches(&other));
    }
}
