//! Assignment summaries and quality metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Bucket count | Points carrying a label |
//! | Unassigned | Points carrying the sentinel |
//! | Deviation | count − target, per numbered bucket |
//! | On-Target Rate | Fraction of buckets whose count equals the target |
//! | Avg Radius | Mean distance from a point to its bucket centroid |
//!
//! The count-consistency check compares the sum of bucket counts against
//! the number of points: a shortfall is a warning, an excess is an error.
//! Neither is fatal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{error, warn};

use crate::geo::{centroid_of, DistanceMetric};
use crate::models::{Assignment, DayLabel, PointSet};

/// One row of the bucket summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    /// Bucket label.
    pub label: DayLabel,
    /// Target count, when the label is a numbered day within the targets.
    pub target: Option<usize>,
    /// Current member count.
    pub count: usize,
}

impl DayBucket {
    /// `count − target`, when the target is known.
    pub fn deviation(&self) -> Option<i64> {
        self.target.map(|t| self.count as i64 - t as i64)
    }
}

/// Per-bucket counts of an assignment, ordered by label.
///
/// Numbered days `1..=targets.len()` always appear, even when empty.
/// The unassigned sentinel is not a bucket.
pub fn bucket_summary(assignment: &Assignment, targets: &[usize]) -> Vec<DayBucket> {
    let mut counts = assignment.counts();
    for day in 1..=targets.len() {
        counts.entry(DayLabel::day(day)).or_insert(0);
    }
    counts
        .into_iter()
        .map(|(label, count)| {
            let target = match &label {
                DayLabel::Index(n) if *n >= 1 => targets.get(*n as usize - 1).copied(),
                _ => None,
            };
            DayBucket {
                label,
                target,
                count,
            }
        })
        .collect()
}

/// Count-consistency verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountCheck {
    /// Bucket counts sum to the number of points.
    Consistent,
    /// This many points are in no bucket.
    Unassigned(usize),
    /// Bucket counts exceed the number of points by this much.
    DoubleCounted(usize),
}

impl CountCheck {
    /// Compares the summed bucket counts against the point total.
    pub fn evaluate<'a>(counts: impl IntoIterator<Item = &'a usize>, total_points: usize) -> Self {
        let sum: usize = counts.into_iter().sum();
        match sum.cmp(&total_points) {
            std::cmp::Ordering::Equal => CountCheck::Consistent,
            std::cmp::Ordering::Less => CountCheck::Unassigned(total_points - sum),
            std::cmp::Ordering::Greater => CountCheck::DoubleCounted(sum - total_points),
        }
    }

    /// Checks an assignment's bucket counts.
    pub fn of(assignment: &Assignment) -> Self {
        Self::evaluate(assignment.counts().values(), assignment.len())
    }

    /// Whether the counts are consistent.
    pub fn is_consistent(&self) -> bool {
        matches!(self, CountCheck::Consistent)
    }

    /// User-facing message, `None` when consistent.
    pub fn message(&self) -> Option<String> {
        match self {
            CountCheck::Consistent => None,
            CountCheck::Unassigned(n) => Some(format!("{n} points remain unassigned")),
            CountCheck::DoubleCounted(n) => Some(format!(
                "bucket counts exceed the number of points by {n}"
            )),
        }
    }

    /// Emits the verdict through `tracing` (warn or error).
    pub fn log(&self) {
        match self {
            CountCheck::Consistent => {}
            CountCheck::Unassigned(n) => warn!(unassigned = n, "points remain unassigned"),
            CountCheck::DoubleCounted(n) => {
                error!(excess = n, "bucket counts exceed the number of points")
            }
        }
    }
}

/// Assignment quality indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanKpi {
    /// Number of non-empty buckets.
    pub bucket_count: usize,
    /// Points carrying the sentinel.
    pub unassigned: usize,
    /// Σ |count − target| over numbered buckets.
    pub total_deviation: usize,
    /// Largest |count − target|.
    pub max_deviation: usize,
    /// Fraction of numbered buckets exactly on target (1.0 with no targets).
    pub on_target_rate: f64,
    /// Mean distance from a point to its bucket centroid.
    pub avg_radius: f64,
    /// Mean distance to the bucket centroid, per label.
    pub radius_by_bucket: BTreeMap<DayLabel, f64>,
}

impl PlanKpi {
    /// Computes the indicators.
    pub fn calculate(
        points: &PointSet,
        assignment: &Assignment,
        targets: &[usize],
        metric: DistanceMetric,
    ) -> Self {
        let summary = bucket_summary(assignment, targets);
        let mut total_deviation = 0;
        let mut max_deviation = 0;
        let mut on_target = 0;
        let mut with_target = 0;
        for bucket in &summary {
            if let Some(dev) = bucket.deviation() {
                let dev = dev.unsigned_abs() as usize;
                total_deviation += dev;
                max_deviation = max_deviation.max(dev);
                with_target += 1;
                if dev == 0 {
                    on_target += 1;
                }
            }
        }

        let coords = points.coords();
        let mut radius_by_bucket = BTreeMap::new();
        let mut radius_sum = 0.0;
        let mut radius_n = 0usize;
        for label in assignment.distinct_labels() {
            let members = assignment.members(&label);
            let Some(center) = centroid_of(&coords, &members) else {
                continue;
            };
            let sum: f64 = members.iter().map(|&i| metric.distance(coords[i], center)).sum();
            radius_sum += sum;
            radius_n += members.len();
            radius_by_bucket.insert(label, sum / members.len() as f64);
        }

        Self {
            bucket_count: summary.iter().filter(|b| b.count > 0).count(),
            unassigned: assignment.unassigned_count(),
            total_deviation,
            max_deviation,
            on_target_rate: if with_target == 0 {
                1.0
            } else {
                on_target as f64 / with_target as f64
            },
            avg_radius: if radius_n == 0 {
                0.0
            } else {
                radius_sum / radius_n as f64
            },
            radius_by_bucket,
        }
    }

    /// Whether the plan meets the given thresholds.
    pub fn meets_thresholds(&self, max_deviation: usize, max_unassigned: usize) -> bool {
        self.max_deviation <= max_deviation && self.unassigned <= max_unassigned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn points(n: usize) -> PointSet {
        PointSet::new(
            (0..n)
                .map(|i| Point::new(format!("p{i}"), 0.0, i as f64))
                .collect(),
        )
    }

    #[test]
    fn test_bucket_summary_lists_empty_days() {
        let ps = points(4);
        let a = Assignment::from_buckets(&ps, &[Some(0), Some(0), Some(2), None]);
        let summary = bucket_summary(&a, &[2, 1, 1]);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary[1].label, DayLabel::day(2));
        assert_eq!(summary[1].count, 0);
        assert_eq!(summary[1].deviation(), Some(-1));
        assert_eq!(summary[2].deviation(), Some(0));
    }

    #[test]
    fn test_renamed_bucket_has_no_target() {
        let ps = points(2);
        let a = Assignment::from_points(&PointSet::new(vec![
            ps.points()[0].clone().with_label("Monday"),
            ps.points()[1].clone().with_label(1),
        ]));
        let summary = bucket_summary(&a, &[2]);
        let monday = summary.iter().find(|b| b.label == DayLabel::from("Monday")).unwrap();
        assert_eq!(monday.target, None);
        assert_eq!(monday.count, 1);
    }

    #[test]
    fn test_count_check() {
        assert_eq!(CountCheck::evaluate(&[5, 5], 10), CountCheck::Consistent);
        assert_eq!(CountCheck::evaluate(&[5, 3], 10), CountCheck::Unassigned(2));
        assert_eq!(CountCheck::evaluate(&[6, 6], 10), CountCheck::DoubleCounted(2));
        assert!(CountCheck::Unassigned(2).message().unwrap().contains("2 points"));
        assert!(CountCheck::Consistent.message().is_none());
    }

    #[test]
    fn test_count_check_of_assignment() {
        let ps = points(3);
        let a = Assignment::from_buckets(&ps, &[Some(0), None, Some(1)]);
        assert_eq!(CountCheck::of(&a), CountCheck::Unassigned(1));
    }

    #[test]
    fn test_kpi() {
        let ps = points(4);
        let a = Assignment::from_buckets(&ps, &[Some(0), Some(0), Some(0), Some(1)]);
        let kpi = PlanKpi::calculate(&ps, &a, &[2, 2], DistanceMetric::Planar);
        assert_eq!(kpi.bucket_count, 2);
        assert_eq!(kpi.total_deviation, 2);
        assert_eq!(kpi.max_deviation, 1);
        assert_eq!(kpi.on_target_rate, 0.0);
        // Bucket 1 = lng 0,1,2 around 1 → radii 1,0,1; bucket 2 single point.
        assert!((kpi.avg_radius - 0.5).abs() < 1e-12);
        assert!(kpi.meets_thresholds(1, 0));
        assert!(!kpi.meets_thresholds(0, 0));
    }
}
