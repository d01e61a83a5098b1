//! Hybrid k-means + genetic algorithm strategy ("kms-evolutivo").
//!
//! # Algorithm
//!
//! 1. K-means into `D` clusters gives the seed assignment.
//! 2. A GA population of perturbed seed copies is evolved for
//!    `n_generations` against
//!    `alpha * compactness + beta * capacity + gamma * fragmentation`
//!    (see [`crate::ga::DayAssignmentProblem`]).
//! 3. Optionally, capacity is enforced on the best individual: overfull
//!    buckets shed their farthest members to the nearest under-target
//!    bucket within reach. Points with no reachable bucket stay
//!    unassigned and are reported.
//!
//! Without enforcement the target counts are a soft objective only.
//!
//! # Reference
//! Krishna & Murty (1999), "Genetic K-means algorithm"

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use u_metaheur::ga::{GaConfig, GaRunner, Selection};

use super::kmeans::{kmeans, DEFAULT_MAX_ITERS};
use super::{Partition, PartitionStrategy};
use crate::ga::operators::GeneticOperators;
use crate::ga::{CostBreakdown, CostWeights, DayAssignmentProblem, DayChromosome};
use crate::geo::DistanceMetric;
use crate::models::PointSet;

/// Hybrid strategy parameters.
///
/// Deserializes with defaults for every missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HybridParams {
    /// Generations to run; the cost history has exactly this length.
    pub n_generations: usize,
    /// Individuals per generation (at least 2).
    pub population_size: usize,
    /// Compactness weight.
    pub alpha: f64,
    /// Capacity weight.
    pub beta: f64,
    /// Fragmentation weight.
    pub gamma: f64,
    /// Fraction of points moved by one mutation.
    pub mutation_rate: f64,
    /// Probability that selected parents are recombined.
    pub crossover_rate: f64,
    /// Tournament size for parent selection.
    pub tournament_size: usize,
    /// Individuals carried over unchanged each generation (at least 1).
    pub elite_count: usize,
    /// RNG seed.
    pub seed: u64,
    /// Evaluate fitness on the rayon pool.
    pub parallel: bool,
    /// Repair the best individual so bucket sizes never exceed targets.
    pub enforce_capacity: bool,
    /// Maximum distance from a point to the centroid of a bucket it may be
    /// moved to during repair. `None` means unlimited.
    pub reach_radius: Option<f64>,
    /// Distance metric for cost and repair.
    pub distance: DistanceMetric,
    /// Crossover and mutation operators.
    pub operators: GeneticOperators,
}

impl Default for HybridParams {
    fn default() -> Self {
        Self {
            n_generations: 50,
            population_size: 20,
            alpha: 1.0,
            beta: 3.0,
            gamma: 2.0,
            mutation_rate: 0.05,
            crossover_rate: 0.9,
            tournament_size: 3,
            elite_count: 1,
            seed: 42,
            parallel: true,
            enforce_capacity: false,
            reach_radius: None,
            distance: DistanceMetric::Planar,
            operators: GeneticOperators::default(),
        }
    }
}

impl HybridParams {
    /// Sets the generation budget.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.n_generations = n;
        self
    }

    /// Sets the population size (at least 2).
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    /// Sets the cost weights.
    pub fn with_weights(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self
    }

    /// Sets the fraction of points moved per mutation.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the crossover probability.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Enables capacity repair with an optional reach radius.
    pub fn with_capacity_enforcement(mut self, reach_radius: Option<f64>) -> Self {
        self.enforce_capacity = true;
        self.reach_radius = reach_radius;
        self
    }

    /// Sets the distance metric.
    pub fn with_distance(mut self, distance: DistanceMetric) -> Self {
        self.distance = distance;
        self
    }

    /// Sets the genetic operators.
    pub fn with_operators(mut self, operators: GeneticOperators) -> Self {
        self.operators = operators;
        self
    }

    fn weights(&self) -> CostWeights {
        CostWeights {
            alpha: self.alpha,
            beta: self.beta,
            gamma: self.gamma,
        }
    }

    /// Runner configuration for a fixed budget of `n_generations`.
    ///
    /// Every offspring is mutated; `mutation_rate` sizes the move instead.
    /// The elite ratio is centred between two counts so that it floors to
    /// exactly `elite_count` elites.
    fn ga_config(&self) -> GaConfig {
        let population = self.population_size.max(2);
        let elites = self.elite_count.clamp(1, population - 1);
        GaConfig::default()
            .with_population_size(population)
            .with_max_generations(self.n_generations)
            .with_selection(Selection::Tournament(self.tournament_size.max(1)))
            .with_elite_ratio((elites as f64 + 0.5) / population as f64)
            .with_crossover_rate(self.crossover_rate.clamp(0.0, 1.0))
            .with_mutation_rate(1.0)
            .with_stagnation_limit(0)
            .with_seed(self.seed)
            .with_parallel(self.parallel)
    }
}

/// Evolutionary run diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridDiagnostics {
    /// Best cost found by the GA, before any capacity repair.
    /// `breakdown.total` is the cost of the returned assignment.
    pub best_cost: f64,
    /// Best-so-far cost after each generation (non-increasing).
    pub cost_history: Vec<f64>,
    /// Points left without a bucket in the returned assignment.
    pub unassigned: usize,
    /// Cost terms of the returned assignment (after any repair).
    pub breakdown: CostBreakdown,
    /// Generations run.
    pub generations: usize,
}

/// Hybrid strategy.
#[derive(Debug, Clone, Default)]
pub struct HybridStrategy {
    params: HybridParams,
}

impl HybridStrategy {
    /// Creates the strategy.
    pub fn new(params: HybridParams) -> Self {
        Self { params }
    }

    /// Parameters.
    pub fn params(&self) -> &HybridParams {
        &self.params
    }
}

impl PartitionStrategy for HybridStrategy {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn partition(&self, points: &PointSet, targets: &[usize]) -> Partition {
        let coords = points.coords();
        let k = targets.len();
        if coords.is_empty() || k == 0 {
            return Partition::new(vec![None; coords.len()]);
        }

        let clustering = kmeans(&coords, k, DEFAULT_MAX_ITERS);
        let seed: Vec<Option<usize>> = clustering.labels.iter().map(|&c| Some(c)).collect();
        debug!(
            points = coords.len(),
            buckets = k,
            kmeans_iterations = clustering.iterations,
            "hybrid seed ready"
        );

        let problem = DayAssignmentProblem::new(coords.clone(), targets.to_vec(), seed)
            .with_weights(self.params.weights())
            .with_metric(self.params.distance)
            .with_mutation_rate(self.params.mutation_rate)
            .with_operators(self.params.operators.clone());
        let (mut genes, best_cost, cost_history, generations) = if self.params.n_generations == 0 {
            let seed = problem.seed().to_vec();
            let cost = problem.cost(&seed).total;
            (seed, cost, Vec::new(), 0)
        } else {
            let result = GaRunner::run(&problem, &self.params.ga_config());
            // The runner's first entry scores the initial population.
            let history: Vec<f64> = result.fitness_history.into_iter().skip(1).collect();
            (result.best.genes, result.best_fitness, history, result.generations)
        };

        if self.params.enforce_capacity {
            enforce_capacity(
                &mut genes,
                &coords,
                targets,
                &clustering.centers,
                self.params.distance,
                self.params.reach_radius,
            );
        }

        let unassigned = genes.iter().filter(|g| g.is_none()).count();
        if unassigned > 0 {
            warn!(unassigned, "hybrid left points unassigned");
        }
        let breakdown = problem.cost(&genes);
        info!(
            generations,
            best_cost,
            repaired_cost = breakdown.total,
            unassigned,
            "hybrid assignment finished"
        );

        Partition {
            buckets: genes,
            diagnostics: Some(HybridDiagnostics {
                best_cost,
                cost_history,
                unassigned,
                breakdown,
                generations,
            }),
        }
    }

    fn description(&self) -> &'static str {
        "K-means seed refined by a genetic algorithm"
    }
}

/// Brings every bucket down to at most its target.
///
/// Overfull buckets shed their farthest members (from the bucket
/// centroid). Each shed point moves to the under-target bucket whose
/// centroid is nearest, provided it lies within `reach`; otherwise it
/// becomes unassigned. Empty buckets use their k-means center.
fn enforce_capacity(
    genes: &mut [Option<usize>],
    coords: &[[f64; 2]],
    targets: &[usize],
    fallback_centers: &[[f64; 2]],
    metric: DistanceMetric,
    reach: Option<f64>,
) {
    let k = targets.len();
    let chromosome = DayChromosome::new(genes.to_vec());
    let mut sizes = chromosome.bucket_sizes(k);
    let centers: Vec<[f64; 2]> = chromosome
        .centroids(coords, k)
        .into_iter()
        .enumerate()
        .map(|(b, c)| c.unwrap_or_else(|| fallback_centers.get(b).copied().unwrap_or([0.0, 0.0])))
        .collect();

    let mut shed = Vec::new();
    for b in 0..k {
        let excess = sizes[b].saturating_sub(targets[b]);
        if excess == 0 {
            continue;
        }
        let mut members: Vec<usize> = (0..genes.len()).filter(|&i| genes[i] == Some(b)).collect();
        members.sort_by(|&x, &y| {
            metric
                .distance(coords[y], centers[b])
                .total_cmp(&metric.distance(coords[x], centers[b]))
                .then(x.cmp(&y))
        });
        for &i in members.iter().take(excess) {
            genes[i] = None;
            shed.push(i);
        }
        sizes[b] -= excess;
    }
    shed.sort_unstable();

    let mut dropped = 0;
    for i in shed {
        let dest = (0..k)
            .filter(|&b| sizes[b] < targets[b])
            .map(|b| (metric.distance(coords[i], centers[b]), b))
            .filter(|&(d, _)| reach.map_or(true, |r| d <= r))
            .min_by(|x, y| x.0.total_cmp(&y.0).then(x.1.cmp(&y.1)));
        match dest {
            Some((_, b)) => {
                genes[i] = Some(b);
                sizes[b] += 1;
            }
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, "capacity repair left points out of reach");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Point;

    /// Four tight groups of five points on a 1-degree grid.
    fn four_groups() -> PointSet {
        let mut pts = Vec::new();
        for (g, (lat, lng)) in [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)].iter().enumerate() {
            for i in 0..5 {
                let off = i as f64 * 0.01;
                pts.push(Point::new(format!("g{g}p{i}"), lat + off, lng - off));
            }
        }
        PointSet::new(pts)
    }

    fn quick() -> HybridParams {
        HybridParams::default().with_generations(15).with_parallel(false)
    }

    #[test]
    fn test_defaults() {
        let p = HybridParams::default();
        assert_eq!(p.n_generations, 50);
        assert_eq!(p.population_size, 20);
        assert_eq!((p.alpha, p.beta, p.gamma), (1.0, 3.0, 2.0));
        assert!(!p.enforce_capacity);
    }

    #[test]
    fn test_history_shape() {
        let points = four_groups();
        let partition = HybridStrategy::new(quick()).partition(&points, &[5, 5, 5, 5]);
        let diag = partition.diagnostics.unwrap();

        assert_eq!(diag.cost_history.len(), 15);
        assert!(diag.cost_history.windows(2).all(|w| w[1] <= w[0]));
        assert!(diag.best_cost <= diag.cost_history[0]);
        assert_eq!(diag.best_cost, *diag.cost_history.last().unwrap());
        assert_eq!(diag.generations, 15);
    }

    #[test]
    fn test_every_point_bucketed() {
        let points = four_groups();
        let partition = HybridStrategy::new(quick()).partition(&points, &[5, 5, 5, 5]);
        assert_eq!(partition.buckets.len(), 20);
        assert!(partition.buckets.iter().all(|b| matches!(b, Some(x) if *x < 4)));
        assert_eq!(partition.diagnostics.unwrap().unassigned, 0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let points = four_groups();
        let a = HybridStrategy::new(quick()).partition(&points, &[5, 5, 5, 5]);
        let b = HybridStrategy::new(quick().with_parallel(true)).partition(&points, &[5, 5, 5, 5]);
        assert_eq!(a.buckets, b.buckets);
        assert_eq!(
            a.diagnostics.unwrap().cost_history,
            b.diagnostics.unwrap().cost_history
        );
    }

    #[test]
    fn test_enforced_capacity_meets_targets() {
        let points = four_groups();
        let targets = [8, 4, 4, 4];
        let params = quick().with_capacity_enforcement(None);
        let partition = HybridStrategy::new(params).partition(&points, &targets);

        let mut sizes = [0usize; 4];
        for b in partition.buckets.iter().flatten() {
            sizes[*b] += 1;
        }
        assert!(sizes.iter().zip(&targets).all(|(s, t)| s <= t));
        assert_eq!(sizes.iter().sum::<usize>(), 20);
    }

    #[test]
    fn test_repaired_cost_reported_separately() {
        let points = four_groups();
        let targets = [8, 4, 4, 4];
        let params = quick().with_capacity_enforcement(None);
        let weights = params.weights();
        let partition = HybridStrategy::new(params).partition(&points, &targets);
        let diag = partition.diagnostics.unwrap();

        assert_eq!(diag.best_cost, *diag.cost_history.last().unwrap());
        let returned = DayAssignmentProblem::new(points.coords(), targets.to_vec(), partition.buckets.clone())
            .with_weights(weights)
            .cost(&partition.buckets);
        assert!((diag.breakdown.total - returned.total).abs() < 1e-9);
    }

    #[test]
    fn test_zero_generations_returns_seed() {
        let points = four_groups();
        let params = quick().with_generations(0);
        let partition = HybridStrategy::new(params).partition(&points, &[5, 5, 5, 5]);
        let diag = partition.diagnostics.unwrap();
        assert!(diag.cost_history.is_empty());
        assert_eq!(diag.generations, 0);
        assert_eq!(diag.best_cost, diag.breakdown.total);
        assert!(partition.buckets.iter().all(|b| b.is_some()));
    }

    #[test]
    fn test_ga_config_keeps_one_elite() {
        let config = HybridParams::default()
            .with_population_size(7)
            .ga_config();
        assert_eq!((config.population_size as f64 * config.elite_ratio) as usize, 1);
        assert_eq!(config.stagnation_limit, 0);
        assert!(config.validate().is_ok());

        let mut tiny = HybridParams::default();
        tiny.population_size = 1;
        tiny.elite_count = 0;
        let config = tiny.ga_config();
        assert_eq!(config.population_size, 2);
        assert_eq!((config.population_size as f64 * config.elite_ratio) as usize, 1);
    }

    #[test]
    fn test_repair_moves_farthest_member() {
        let coords = vec![[0.0, 0.0], [0.0, 0.1], [0.0, 0.9], [0.0, 1.0]];
        let mut genes = vec![Some(0), Some(0), Some(0), Some(1)];
        enforce_capacity(
            &mut genes,
            &coords,
            &[2, 2],
            &[[0.0, 0.0], [0.0, 1.0]],
            DistanceMetric::Planar,
            None,
        );
        assert_eq!(genes, vec![Some(0), Some(0), Some(1), Some(1)]);
    }

    #[test]
    fn test_repair_respects_reach() {
        let coords = vec![[0.0, 0.0], [0.0, 0.1], [0.0, 0.2], [0.0, 5.0]];
        let mut genes = vec![Some(0), Some(0), Some(0), Some(1)];
        enforce_capacity(
            &mut genes,
            &coords,
            &[2, 2],
            &[[0.0, 0.0], [0.0, 5.0]],
            DistanceMetric::Planar,
            Some(1.0),
        );
        assert_eq!(genes[3], Some(1));
        assert_eq!(genes.iter().filter(|g| g.is_none()).count(), 1);
        assert_eq!(genes.iter().filter(|g| **g == Some(0)).count(), 2);
    }

    #[test]
    fn test_params_deserialize_partial() {
        let p: HybridParams =
            serde_json::from_str(r#"{"n_generations":7,"enforce_capacity":true,"reach_radius":0.5}"#)
                .unwrap();
        assert_eq!(p.n_generations, 7);
        assert!(p.enforce_capacity);
        assert_eq!(p.reach_radius, Some(0.5));
        assert_eq!(p.population_size, 20);
    }
}
