//! Day-assignment GA problem definition.
//!
//! Implements `u_metaheur::ga::GaProblem` for the bucket-per-point encoding
//! and defines the cost function the evolutionary loop minimizes.
//!
//! # Cost
//!
//! ```text
//! cost = alpha * compactness + beta * capacity + gamma * fragmentation
//! ```
//!
//! | Term | Definition |
//! |------|-----------|
//! | compactness | Σ distance(point, centroid of its bucket) / spread |
//! | capacity | Σ (size_b − target_b)² + unassigned points |
//! | fragmentation | Σ longest edge of the bucket's minimum spanning tree / spread |
//!
//! `spread` is the mean distance of all points to their global centroid,
//! so the two spatial terms do not depend on the size of the campaign area
//! or on the distance unit. The longest spanning-tree edge is the gap
//! between the two farthest-apart islands of a bucket; a bucket that forms
//! one tight group scores close to zero, and buckets with fewer than two
//! members score zero.
//!
//! # Population
//!
//! The first individual a problem creates is the seed itself; every later
//! one is a perturbed copy of it.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;
use u_metaheur::ga::GaProblem;

use super::chromosome::{random_mutation, DayChromosome};
use super::operators::GeneticOperators;
use crate::geo::{centroid_of, mean_spread, DistanceMetric};

/// Weights of the three cost terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// Spatial compactness weight.
    pub alpha: f64,
    /// Capacity deviation weight.
    pub beta: f64,
    /// Fragmentation weight.
    pub gamma: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            beta: 3.0,
            gamma: 2.0,
        }
    }
}

/// Per-term cost of one assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    /// Unweighted compactness penalty.
    pub compactness: f64,
    /// Unweighted capacity penalty.
    pub capacity: f64,
    /// Unweighted fragmentation penalty.
    pub fragmentation: f64,
    /// Weighted total.
    pub total: f64,
}

/// GA problem: refine a seed assignment toward the target counts while
/// keeping buckets compact.
///
/// # Example
/// ```
/// use u_dayplan::ga::DayAssignmentProblem;
/// use u_metaheur::ga::{GaConfig, GaRunner};
///
/// let coords = vec![[0.0, 0.0], [0.0, 0.1], [5.0, 5.0], [5.0, 5.1]];
/// let seed = vec![Some(0), Some(0), Some(0), Some(1)];
/// let problem = DayAssignmentProblem::new(coords, vec![2, 2], seed);
/// let config = GaConfig::default()
///     .with_population_size(10)
///     .with_max_generations(20)
///     .with_seed(42);
/// let result = GaRunner::run(&problem, &config);
/// assert!(result.best_fitness <= problem.cost(problem.seed()).total);
/// ```
#[derive(Debug)]
pub struct DayAssignmentProblem {
    coords: Vec<[f64; 2]>,
    targets: Vec<usize>,
    seed: Vec<Option<usize>>,
    seed_issued: AtomicBool,
    weights: CostWeights,
    metric: DistanceMetric,
    spread: f64,
    moves_per_mutation: usize,
    operators: GeneticOperators,
}

impl DayAssignmentProblem {
    /// Creates a problem.
    ///
    /// `seed` is the starting assignment (one bucket per coordinate).
    pub fn new(coords: Vec<[f64; 2]>, targets: Vec<usize>, seed: Vec<Option<usize>>) -> Self {
        let metric = DistanceMetric::default();
        let spread = mean_spread(&coords, metric);
        let moves_per_mutation = moves_for_rate(coords.len(), 0.05);
        Self {
            coords,
            targets,
            seed,
            seed_issued: AtomicBool::new(false),
            weights: CostWeights::default(),
            metric,
            spread,
            moves_per_mutation,
            operators: GeneticOperators::default(),
        }
    }

    /// Sets the cost weights.
    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the distance metric.
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self.spread = mean_spread(&self.coords, metric);
        self
    }

    /// Sets the fraction of points moved by one mutation (at least one point).
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.moves_per_mutation = moves_for_rate(self.coords.len(), rate);
        self
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    /// Number of buckets.
    #[inline]
    pub fn n_buckets(&self) -> usize {
        self.targets.len()
    }

    /// Target counts.
    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// The seed assignment.
    pub fn seed(&self) -> &[Option<usize>] {
        &self.seed
    }

    /// Full cost breakdown of an assignment.
    pub fn cost(&self, genes: &[Option<usize>]) -> CostBreakdown {
        let k = self.n_buckets();
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); k];
        let mut unassigned = 0usize;
        for (i, gene) in genes.iter().enumerate() {
            match gene {
                Some(b) if *b < k => members[*b].push(i),
                _ => unassigned += 1,
            }
        }

        let mut compactness = 0.0;
        let mut fragmentation = 0.0;
        let mut capacity = unassigned as f64;

        for (b, idx) in members.iter().enumerate() {
            let deviation = idx.len() as f64 - self.targets[b] as f64;
            capacity += deviation * deviation;

            if let Some(center) = centroid_of(&self.coords, idx) {
                compactness += idx
                    .iter()
                    .map(|&i| self.metric.distance(self.coords[i], center))
                    .sum::<f64>();
            }

            fragmentation += self.longest_spanning_edge(idx);
        }

        compactness /= self.spread;
        fragmentation /= self.spread;
        let total = self.weights.alpha * compactness
            + self.weights.beta * capacity
            + self.weights.gamma * fragmentation;

        CostBreakdown {
            compactness,
            capacity,
            fragmentation,
            total,
        }
    }
}

impl DayAssignmentProblem {
    /// Longest edge of the minimum spanning tree over `members` (Prim).
    fn longest_spanning_edge(&self, members: &[usize]) -> f64 {
        let n = members.len();
        if n < 2 {
            return 0.0;
        }
        let mut in_tree = vec![false; n];
        let mut link = vec![f64::INFINITY; n];
        link[0] = 0.0;
        let mut longest = 0.0_f64;

        for _ in 0..n {
            let next = (0..n)
                .filter(|&j| !in_tree[j])
                .min_by(|&a, &b| link[a].total_cmp(&link[b]));
            let Some(u) = next else { break };
            in_tree[u] = true;
            longest = longest.max(link[u]);

            let from = self.coords[members[u]];
            for v in 0..n {
                if !in_tree[v] {
                    let d = self.metric.distance(from, self.coords[members[v]]);
                    if d < link[v] {
                        link[v] = d;
                    }
                }
            }
        }
        longest
    }
}

fn moves_for_rate(n_points: usize, rate: f64) -> usize {
    let rate = if rate.is_finite() { rate.clamp(0.0, 1.0) } else { 0.0 };
    ((n_points as f64 * rate).round() as usize).max(1)
}

impl GaProblem for DayAssignmentProblem {
    type Individual = DayChromosome;

    fn create_individual<R: Rng>(&self, rng: &mut R) -> DayChromosome {
        let mut ch = DayChromosome::new(self.seed.clone());
        if self.seed_issued.swap(true, Ordering::Relaxed) {
            random_mutation(&mut ch, self.n_buckets(), self.moves_per_mutation, rng);
        }
        ch
    }

    fn evaluate(&self, individual: &DayChromosome) -> f64 {
        self.cost(&individual.genes).total
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &DayChromosome,
        parent2: &DayChromosome,
        rng: &mut R,
    ) -> Vec<DayChromosome> {
        let (c1, c2) = self.operators.crossover(parent1, parent2, rng);
        vec![c1, c2]
    }

    fn mutate<R: Rng>(&self, individual: &mut DayChromosome, rng: &mut R) {
        self.operators.mutate(
            individual,
            &self.coords,
            &self.targets,
            self.moves_per_mutation,
            rng,
        );
    }

    fn on_generation(&self, generation: usize, best_fitness: f64) {
        trace!(generation, best_fitness, "ga generation evaluated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use u_metaheur::ga::{GaConfig, GaRunner};

    /// Two tight groups of four points, far apart.
    fn two_groups() -> Vec<[f64; 2]> {
        vec![
            [0.0, 0.0],
            [0.0, 0.1],
            [0.1, 0.0],
            [0.1, 0.1],
            [5.0, 5.0],
            [5.0, 5.1],
            [5.1, 5.0],
            [5.1, 5.1],
        ]
    }

    fn split_genes() -> Vec<Option<usize>> {
        vec![Some(0), Some(0), Some(0), Some(0), Some(1), Some(1), Some(1), Some(1)]
    }

    #[test]
    fn test_capacity_term() {
        let problem = DayAssignmentProblem::new(two_groups(), vec![4, 4], split_genes());
        let balanced = problem.cost(&split_genes());
        assert_eq!(balanced.capacity, 0.0);

        let mut skewed = split_genes();
        skewed[4] = Some(0);
        let cost = problem.cost(&skewed);
        // Sizes 5 and 3 against 4 and 4.
        assert_eq!(cost.capacity, 2.0);
    }

    #[test]
    fn test_unassigned_counts_against_capacity() {
        let problem = DayAssignmentProblem::new(two_groups(), vec![4, 4], split_genes());
        let mut genes = split_genes();
        genes[0] = None;
        // Bucket 0 short by one (1) plus one unassigned point (1).
        assert_eq!(problem.cost(&genes).capacity, 2.0);
    }

    #[test]
    fn test_spatial_terms_prefer_coherent_buckets() {
        let problem = DayAssignmentProblem::new(two_groups(), vec![4, 4], split_genes());
        let coherent = problem.cost(&split_genes());
        let mixed = problem.cost(&[
            Some(0),
            Some(1),
            Some(0),
            Some(1),
            Some(0),
            Some(1),
            Some(0),
            Some(1),
        ]);
        assert!(coherent.compactness < mixed.compactness);
        assert!(coherent.fragmentation < mixed.fragmentation);
        assert!(coherent.total < mixed.total);
    }

    #[test]
    fn test_scale_free_spatial_terms() {
        let small = DayAssignmentProblem::new(two_groups(), vec![4, 4], split_genes());
        let scaled: Vec<[f64; 2]> = two_groups().iter().map(|c| [c[0] * 100.0, c[1] * 100.0]).collect();
        let large = DayAssignmentProblem::new(scaled, vec![4, 4], split_genes());
        let a = small.cost(&split_genes());
        let b = large.cost(&split_genes());
        assert!((a.compactness - b.compactness).abs() < 1e-9);
        assert!((a.fragmentation - b.fragmentation).abs() < 1e-9);
    }

    #[test]
    fn test_weights_apply() {
        let problem = DayAssignmentProblem::new(two_groups(), vec![4, 4], split_genes())
            .with_weights(CostWeights {
                alpha: 0.0,
                beta: 1.0,
                gamma: 0.0,
            });
        let mut skewed = split_genes();
        skewed[4] = Some(0);
        assert_eq!(problem.evaluate(&DayChromosome::new(skewed)), 2.0);
    }

    #[test]
    fn test_fragmentation_sees_distant_islands() {
        let problem = DayAssignmentProblem::new(two_groups(), vec![4, 4], split_genes());
        // Each bucket holds two pairs, one in each group: every point still
        // has a close same-bucket neighbour.
        let islands = problem.cost(&[
            Some(0),
            Some(0),
            Some(1),
            Some(1),
            Some(0),
            Some(0),
            Some(1),
            Some(1),
        ]);
        let coherent = problem.cost(&split_genes());
        assert!(islands.fragmentation > 10.0 * coherent.fragmentation);
    }

    #[test]
    fn test_singleton_buckets_not_fragmented() {
        let coords = vec![[0.0, 0.0], [3.0, 4.0]];
        let problem = DayAssignmentProblem::new(coords, vec![1, 1], vec![Some(0), Some(1)]);
        assert_eq!(problem.cost(&[Some(0), Some(1)]).fragmentation, 0.0);
    }

    #[test]
    fn test_first_individual_is_seed() {
        let problem = DayAssignmentProblem::new(two_groups(), vec![4, 4], split_genes());
        let mut rng = SmallRng::seed_from_u64(42);
        let first = problem.create_individual(&mut rng);
        assert_eq!(first.genes, split_genes());
        for _ in 0..4 {
            assert_ne!(problem.create_individual(&mut rng).genes, split_genes());
        }
    }

    #[test]
    fn test_ga_repairs_unbalanced_seed() {
        // Seed puts six points in bucket 0; targets ask for 4/4.
        let mut seed = split_genes();
        seed[4] = Some(0);
        seed[5] = Some(0);
        let problem = DayAssignmentProblem::new(two_groups(), vec![4, 4], seed.clone());
        let seed_cost = problem.cost(&seed).total;

        let config = GaConfig::default()
            .with_population_size(20)
            .with_max_generations(40)
            .with_mutation_rate(1.0)
            .with_stagnation_limit(0)
            .with_seed(42)
            .with_parallel(false);
        let result = GaRunner::run(&problem, &config);

        assert!(result.best_fitness <= seed_cost);
        assert!(result.fitness_history[0] <= seed_cost);
        assert!(result.fitness_history.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(problem.cost(&result.best.genes).capacity, 0.0);
    }
}
