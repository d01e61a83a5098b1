//! Capacitated partitioning.
//!
//! Produces buckets whose sizes equal the target vector exactly.
//!
//! # Algorithm
//!
//! 1. Seed `D` centers with k-means.
//! 2. Rank every (point, bucket) pair by distance to the bucket center;
//!    ties keep point order, then bucket order.
//! 3. Walk the ranking: a pair is taken when its point is still free and
//!    its bucket is still under target. Full buckets are skipped.
//!
//! Because the targets sum to the number of points and every point has a
//! pair with every bucket, the walk always places every point.
//!
//! # Complexity
//! O(n · D · log(n · D)).

use super::kmeans::{kmeans, DEFAULT_MAX_ITERS};
use super::{Partition, PartitionStrategy};
use crate::geo::squared_distance;
use crate::models::PointSet;

/// Capacitated strategy ("Capacitado").
#[derive(Debug, Clone, Copy)]
pub struct CapacitatedStrategy {
    /// Lloyd iteration cap for center seeding.
    pub max_iters: usize,
}

impl Default for CapacitatedStrategy {
    fn default() -> Self {
        Self {
            max_iters: DEFAULT_MAX_ITERS,
        }
    }
}

impl PartitionStrategy for CapacitatedStrategy {
    fn name(&self) -> &'static str {
        "capacitated"
    }

    fn partition(&self, points: &PointSet, targets: &[usize]) -> Partition {
        let coords = points.coords();
        let centers = kmeans(&coords, targets.len(), self.max_iters).centers;
        Partition::new(fill_to_targets(&coords, &centers, targets))
    }

    fn description(&self) -> &'static str {
        "Nearest-center greedy fill to exact target counts"
    }
}

/// Greedy nearest-center fill honoring per-bucket targets.
///
/// Points left over when the targets sum to less than the point count
/// stay `None`.
fn fill_to_targets(
    coords: &[[f64; 2]],
    centers: &[[f64; 2]],
    targets: &[usize],
) -> Vec<Option<usize>> {
    let mut pairs: Vec<(f64, usize, usize)> = Vec::with_capacity(coords.len() * centers.len());
    for (i, &c) in coords.iter().enumerate() {
        for (b, &ctr) in centers.iter().enumerate() {
            pairs.push((squared_distance(c, ctr), i, b));
        }
    }
    pairs.sort_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)).then(x.2.cmp(&y.2)));

    let mut buckets = vec![None; coords.len()];
    let mut fill = vec![0usize; targets.len()];
    let mut placed = 0;
    for (_, i, b) in pairs {
        if placed == coords.len() {
            break;
        }
        if buckets[i].is_some() || fill[b] >= targets[b] {
            continue;
        }
        buckets[i] = Some(b);
        fill[b] += 1;
        placed += 1;
    }
    buckets
}
