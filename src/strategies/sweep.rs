//! Sweep partitioning.
//!
//! # Algorithm
//!
//! Sorts points by polar angle around the centroid of all points, then
//! fills day 1 up to its target, then day 2, and so on. Nearby points tend
//! to share an angle, so each day becomes a wedge of the campaign area.
//!
//! Ties on angle are broken by distance to the centroid, then by point ID.
//!
//! # Complexity
//! O(n log n), dominated by the angle sort.
//!
//! # Reference
//! Gillett & Miller (1974), "A Heuristic Algorithm for the Vehicle-Dispatch
//! Problem", *Operations Research* 22(2), 340-349.

use super::{Partition, PartitionStrategy};
use crate::geo::{centroid, planar_distance, polar_angle};
use crate::models::PointSet;

/// Sweep strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepStrategy;

impl PartitionStrategy for SweepStrategy {
    fn name(&self) -> &'static str {
        "sweep"
    }

    fn partition(&self, points: &PointSet, targets: &[usize]) -> Partition {
        let coords = points.coords();
        let Some(center) = centroid(&coords) else {
            return Partition::new(Vec::new());
        };

        let mut order: Vec<(usize, f64, f64)> = coords
            .iter()
            .enumerate()
            .map(|(i, &c)| (i, polar_angle(center, c), planar_distance(center, c)))
            .collect();
        let pts = points.points();
        order.sort_by(|a, b| {
            a.1.total_cmp(&b.1)
                .then(a.2.total_cmp(&b.2))
                .then_with(|| pts[a.0].id.cmp(&pts[b.0].id))
        });

        let mut buckets = vec![None; coords.len()];
        let mut day = 0;
        let mut filled = 0;
        for (i, _, _) in order {
            while day < targets.len() && filled >= targets[day] {
                day += 1;
                filled = 0;
            }
            if day == targets.len() {
                break;
            }
            buckets[i] = Some(day);
            filled += 1;
        }
        Partition::new(buckets)
    }

    fn description(&self) -> &'static str {
        "Angular sweep around the centroid, filling days in order"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn compass() -> PointSet {
        // Centroid is the origin.
        PointSet::new(vec![
            Point::new("N", 1.0, 0.0),
            Point::new("E", 0.0, 1.0),
            Point::new("S", -1.0, 0.0),
            Point::new("W", 0.0, -1.0),
        ])
    }

    #[test]
    fn test_angular_ordering() {
        let points = compass();
        let p = SweepStrategy.partition(&points, &[1, 1, 1, 1]);
        // Angles: S = -π/2, E = 0, N = π/2, W = π.
        assert_eq!(p.buckets, vec![Some(2), Some(1), Some(0), Some(3)]);
    }

    #[test]
    fn test_fills_targets_in_order() {
        let points = compass();
        let p = SweepStrategy.partition(&points, &[3, 1]);
        assert_eq!(p.buckets, vec![Some(0), Some(0), Some(0), Some(1)]);
    }

    #[test]
    fn test_skips_zero_targets() {
        let points = compass();
        let p = SweepStrategy.partition(&points, &[0, 2, 0, 2]);
        assert_eq!(p.buckets, vec![Some(3), Some(1), Some(1), Some(3)]);
    }

    #[test]
    fn test_tie_break_by_distance_then_id() {
        let points = PointSet::new(vec![
            Point::new("far", 0.0, 2.0),
            Point::new("b", 0.0, 1.0),
            Point::new("a", 0.0, 1.0),
            Point::new("west", 0.0, -4.0),
        ]);
        // Centroid is (0, 0); the three eastern points share angle 0.
        let p = SweepStrategy.partition(&points, &[1, 1, 1, 1]);
        assert_eq!(p.buckets[2], Some(0)); // "a"
        assert_eq!(p.buckets[1], Some(1)); // "b"
        assert_eq!(p.buckets[0], Some(2)); // "far"
        assert_eq!(p.buckets[3], Some(3));
    }
}
