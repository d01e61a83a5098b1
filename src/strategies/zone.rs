//! Zone-based partitioning.
//!
//! Groups points into exactly `D` spatially contiguous zones with k-means,
//! then numbers the zones west to east (south to north on ties) so that
//! day 1 is the westernmost zone. Target counts are not enforced; zone
//! sizes follow the geography.

use super::kmeans::{kmeans, DEFAULT_MAX_ITERS};
use super::{Partition, PartitionStrategy};
use crate::models::PointSet;

/// Zone-based strategy ("Por zona").
#[derive(Debug, Clone, Copy)]
pub struct ZoneStrategy {
    /// Lloyd iteration cap.
    pub max_iters: usize,
}

impl Default for ZoneStrategy {
    fn default() -> Self {
        Self {
            max_iters: DEFAULT_MAX_ITERS,
        }
    }
}

impl PartitionStrategy for ZoneStrategy {
    fn name(&self) -> &'static str {
        "zone"
    }

    fn partition(&self, points: &PointSet, targets: &[usize]) -> Partition {
        let coords = points.coords();
        let clustering = kmeans(&coords, targets.len(), self.max_iters);

        let mut order: Vec<usize> = (0..clustering.centers.len()).collect();
        order.sort_by(|&a, &b| {
            let ca = clustering.centers[a];
            let cb = clustering.centers[b];
            ca[1].total_cmp(&cb[1]).then(ca[0].total_cmp(&cb[0])).then(a.cmp(&b))
        });
        let mut rank = vec![0; order.len()];
        for (day, &cluster) in order.iter().enumerate() {
            rank[cluster] = day;
        }

        Partition::new(clustering.labels.iter().map(|&c| Some(rank[c])).collect())
    }

    fn description(&self) -> &'static str {
        "Spatial zones by k-means, numbered west to east"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    fn three_towns() -> PointSet {
        let mut pts = Vec::new();
        for (town, lng) in [("E", 2.0), ("W", 0.0), ("M", 1.0)] {
            for i in 0..4 {
                pts.push(Point::new(format!("{town}{i}"), i as f64 * 0.01, lng + i as f64 * 0.01));
            }
        }
        PointSet::new(pts)
    }

    #[test]
    fn test_zones_numbered_west_to_east() {
        let points = three_towns();
        let p = ZoneStrategy::default().partition(&points, &[4, 4, 4]);
        let bucket_of = |id: &str| p.buckets[points.index_of(id).unwrap()];
        assert_eq!(bucket_of("W0"), Some(0));
        assert_eq!(bucket_of("M2"), Some(1));
        assert_eq!(bucket_of("E3"), Some(2));
    }

    #[test]
    fn test_every_point_labeled() {
        let points = three_towns();
        let p = ZoneStrategy::default().partition(&points, &[6, 6]);
        assert!(p.buckets.iter().all(|b| matches!(b, Some(d) if *d < 2)));
    }
}
