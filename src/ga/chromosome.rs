//! Day-assignment chromosome.
//!
//! # Encoding
//!
//! One gene per point, in point-set order. A gene is the 0-based day
//! bucket of its point, or `None` for an unassigned point. Every individual
//! in a run descends from the same k-means seed, so bucket indices mean the
//! same region across the population and position-wise crossover is
//! meaningful.

use rand::Rng;
use u_metaheur::ga::Individual;

use crate::geo::squared_distance;

/// Bucket-per-point chromosome.
///
/// Lower fitness = better assignment (minimization convention).
#[derive(Debug, Clone, PartialEq)]
pub struct DayChromosome {
    /// Bucket per point.
    pub genes: Vec<Option<usize>>,
    /// Fitness value (lower = better).
    pub fitness: f64,
}

impl Individual for DayChromosome {
    type Fitness = f64;

    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl DayChromosome {
    /// Creates an unevaluated chromosome.
    pub fn new(genes: Vec<Option<usize>>) -> Self {
        Self {
            genes,
            fitness: f64::INFINITY,
        }
    }

    /// Creates a chromosome with every point in a uniformly random bucket.
    pub fn random<R: Rng>(n_points: usize, n_buckets: usize, rng: &mut R) -> Self {
        let genes = (0..n_points)
            .map(|_| (n_buckets > 0).then(|| rng.random_range(0..n_buckets)))
            .collect();
        Self::new(genes)
    }

    /// Member count per bucket.
    pub fn bucket_sizes(&self, n_buckets: usize) -> Vec<usize> {
        let mut sizes = vec![0; n_buckets];
        for b in self.genes.iter().flatten() {
            if *b < n_buckets {
                sizes[*b] += 1;
            }
        }
        sizes
    }

    /// Number of unassigned genes.
    pub fn unassigned(&self) -> usize {
        self.genes.iter().filter(|g| g.is_none()).count()
    }

    /// Centroid of each bucket; `None` for empty buckets.
    pub fn centroids(&self, coords: &[[f64; 2]], n_buckets: usize) -> Vec<Option<[f64; 2]>> {
        let mut sums = vec![[0.0, 0.0]; n_buckets];
        let mut counts = vec![0usize; n_buckets];
        for (i, gene) in self.genes.iter().enumerate() {
            if let Some(b) = *gene {
                if b < n_buckets {
                    sums[b][0] += coords[i][0];
                    sums[b][1] += coords[i][1];
                    counts[b] += 1;
                }
            }
        }
        sums.into_iter()
            .zip(counts)
            .map(|(s, c)| (c > 0).then(|| [s[0] / c as f64, s[1] / c as f64]))
            .collect()
    }

    /// Whether every gene is unassigned or a bucket below `n_buckets`.
    pub fn is_valid(&self, n_points: usize, n_buckets: usize) -> bool {
        self.genes.len() == n_points
            && self.genes.iter().flatten().all(|&b| b < n_buckets)
    }
}

// ======================== Crossover operators ========================

/// Uniform crossover: each gene comes from either parent with equal
/// probability; the second child takes the complementary genes.
pub fn uniform_crossover<R: Rng>(
    p1: &DayChromosome,
    p2: &DayChromosome,
    rng: &mut R,
) -> (DayChromosome, DayChromosome) {
    let mut c1 = Vec::with_capacity(p1.genes.len());
    let mut c2 = Vec::with_capacity(p1.genes.len());
    for (a, b) in p1.genes.iter().zip(&p2.genes) {
        if rng.random_bool(0.5) {
            c1.push(*a);
            c2.push(*b);
        } else {
            c1.push(*b);
            c2.push(*a);
        }
    }
    (DayChromosome::new(c1), DayChromosome::new(c2))
}

/// One-point crossover: genes before a random cut come from one parent,
/// the rest from the other.
pub fn one_point_crossover<R: Rng>(
    p1: &DayChromosome,
    p2: &DayChromosome,
    rng: &mut R,
) -> (DayChromosome, DayChromosome) {
    let len = p1.genes.len().min(p2.genes.len());
    let cut = rng.random_range(0..=len);
    let mut c1 = p1.genes[..cut].to_vec();
    c1.extend_from_slice(&p2.genes[cut..len]);
    let mut c2 = p2.genes[..cut].to_vec();
    c2.extend_from_slice(&p1.genes[cut..len]);
    (DayChromosome::new(c1), DayChromosome::new(c2))
}

// ======================== Mutation operators ========================

/// Probability that a capacity-aware move targets an under-target bucket.
const UNDER_TARGET_BIAS: f64 = 0.8;

/// Random reassignment: moves `moves` random points to a different bucket.
pub fn random_mutation<R: Rng>(
    chromosome: &mut DayChromosome,
    n_buckets: usize,
    moves: usize,
    rng: &mut R,
) {
    let len = chromosome.genes.len();
    if len == 0 || n_buckets < 2 {
        return;
    }
    for _ in 0..moves {
        let i = rng.random_range(0..len);
        chromosome.genes[i] = Some(other_bucket(chromosome.genes[i], n_buckets, rng));
    }
}

/// Capacity-aware reassignment.
///
/// Moves `moves` random points. Each move prefers (with probability 0.8)
/// the under-target bucket whose centroid is nearest the point; otherwise,
/// or when no other bucket is under target, any other bucket is drawn.
pub fn capacity_mutation<R: Rng>(
    chromosome: &mut DayChromosome,
    coords: &[[f64; 2]],
    targets: &[usize],
    moves: usize,
    rng: &mut R,
) {
    let len = chromosome.genes.len();
    let n_buckets = targets.len();
    if len == 0 || n_buckets < 2 {
        return;
    }
    let centroids = chromosome.centroids(coords, n_buckets);
    let mut sizes = chromosome.bucket_sizes(n_buckets);

    for _ in 0..moves {
        let i = rng.random_range(0..len);
        let current = chromosome.genes[i];

        let preferred = if rng.random_bool(UNDER_TARGET_BIAS) {
            (0..n_buckets)
                .filter(|&b| Some(b) != current && sizes[b] < targets[b])
                .min_by(|&a, &b| {
                    let da = centroids[a].map_or(f64::INFINITY, |c| squared_distance(coords[i], c));
                    let db = centroids[b].map_or(f64::INFINITY, |c| squared_distance(coords[i], c));
                    da.total_cmp(&db).then(a.cmp(&b))
                })
        } else {
            None
        };
        let dest = preferred.unwrap_or_else(|| other_bucket(current, n_buckets, rng));

        if let Some(c) = current {
            sizes[c] -= 1;
        }
        sizes[dest] += 1;
        chromosome.genes[i] = Some(dest);
    }
}

fn other_bucket<R: Rng>(current: Option<usize>, n_buckets: usize, rng: &mut R) -> usize {
    match current {
        Some(c) if c < n_buckets => {
            let pick = rng.random_range(0..n_buckets - 1);
            if pick >= c {
                pick + 1
            } else {
                pick
            }
        }
        _ => rng.random_range(0..n_buckets),
    }
}
