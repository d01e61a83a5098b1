//! Deterministic k-means clustering.
//!
//! Shared seeding step of the Zone-Based, Capacitated and Hybrid
//! strategies.
//!
//! # Algorithm
//!
//! 1. Farthest-first seeding: the first center is the first point; every
//!    next center is the point farthest from all chosen centers.
//! 2. Lloyd iterations: assign each point to its nearest center (ties go to
//!    the lower cluster index), then move each center to its members' mean.
//! 3. A cluster left empty is reseeded with the point farthest from its
//!    own center, taken from a cluster that can spare one.
//!
//! No randomness is involved: equal input order gives equal output.
//!
//! # Complexity
//! O(n · k · iterations).
//!
//! # Reference
//! Lloyd (1982), "Least squares quantization in PCM";
//! Gonzalez (1985), "Clustering to minimize the maximum intercluster distance"

use crate::geo::squared_distance;

/// Result of a k-means run.
#[derive(Debug, Clone)]
pub struct Clustering {
    /// Cluster index (0-based) per point.
    pub labels: Vec<usize>,
    /// Cluster centers as `[lat, lng]`.
    pub centers: Vec<[f64; 2]>,
    /// Lloyd iterations performed.
    pub iterations: usize,
}

impl Clustering {
    /// Member count per cluster.
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centers.len()];
        for &l in &self.labels {
            sizes[l] += 1;
        }
        sizes
    }
}

/// Default iteration cap.
pub const DEFAULT_MAX_ITERS: usize = 100;

/// Clusters `coords` into `k` groups.
///
/// Always returns `k` centers. When there are fewer points than clusters,
/// each point forms its own cluster and the extra centers are copies of the
/// last point (their clusters stay empty).
pub fn kmeans(coords: &[[f64; 2]], k: usize, max_iters: usize) -> Clustering {
    if coords.is_empty() || k == 0 {
        return Clustering {
            labels: vec![0; coords.len()],
            centers: Vec::new(),
            iterations: 0,
        };
    }
    if k >= coords.len() {
        let mut centers = coords.to_vec();
        let last = coords[coords.len() - 1];
        centers.resize(k, last);
        return Clustering {
            labels: (0..coords.len()).collect(),
            centers,
            iterations: 0,
        };
    }

    let mut centers = farthest_first(coords, k);
    let mut labels = vec![usize::MAX; coords.len()];
    let mut iterations = 0;

    for _ in 0..max_iters {
        iterations += 1;
        let mut changed = false;
        for (i, &c) in coords.iter().enumerate() {
            let best = nearest_center(c, &centers);
            if labels[i] != best {
                labels[i] = best;
                changed = true;
            }
        }

        reseed_empty(coords, &mut labels, &centers, &mut changed);

        let mut sums = vec![[0.0, 0.0]; k];
        let mut counts = vec![0usize; k];
        for (i, c) in coords.iter().enumerate() {
            let cluster = labels[i];
            sums[cluster][0] += c[0];
            sums[cluster][1] += c[1];
            counts[cluster] += 1;
        }
        for j in 0..k {
            if counts[j] > 0 {
                centers[j] = [sums[j][0] / counts[j] as f64, sums[j][1] / counts[j] as f64];
            }
        }

        if !changed {
            break;
        }
    }

    Clustering {
        labels,
        centers,
        iterations,
    }
}

/// Index of the center nearest to `c` (lowest index on ties).
pub fn nearest_center(c: [f64; 2], centers: &[[f64; 2]]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (j, &ctr) in centers.iter().enumerate() {
        let d = squared_distance(c, ctr);
        if d < best_dist {
            best_dist = d;
            best = j;
        }
    }
    best
}

fn farthest_first(coords: &[[f64; 2]], k: usize) -> Vec<[f64; 2]> {
    let mut centers = Vec::with_capacity(k);
    centers.push(coords[0]);
    let mut min_dist: Vec<f64> = coords.iter().map(|&c| squared_distance(c, coords[0])).collect();

    while centers.len() < k {
        let mut best_idx = 0;
        let mut best_dist = -1.0;
        for (i, &d) in min_dist.iter().enumerate() {
            if d > best_dist {
                best_dist = d;
                best_idx = i;
            }
        }
        let next = coords[best_idx];
        centers.push(next);
        for (i, &c) in coords.iter().enumerate() {
            min_dist[i] = min_dist[i].min(squared_distance(c, next));
        }
    }
    centers
}

fn reseed_empty(
    coords: &[[f64; 2]],
    labels: &mut [usize],
    centers: &[[f64; 2]],
    changed: &mut bool,
) {
    let k = centers.len();
    let mut sizes = vec![0usize; k];
    for &l in labels.iter() {
        sizes[l] += 1;
    }

    for empty in 0..k {
        if sizes[empty] > 0 {
            continue;
        }
        let donor = (0..coords.len())
            .filter(|&i| sizes[labels[i]] > 1)
            .max_by(|&a, &b| {
                let da = squared_distance(coords[a], centers[labels[a]]);
                let db = squared_distance(coords[b], centers[labels[b]]);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal).then(b.cmp(&a))
            });
        if let Some(i) = donor {
            sizes[labels[i]] -= 1;
            labels[i] = empty;
            sizes[empty] = 1;
            *changed = true;
        }
    }
}
