//! Configurable genetic operators for day assignment.
//!
//! Provides runtime-selectable crossover and mutation strategies
//! via [`GeneticOperators`].
//!
//! # Usage
//!
//! ```
//! use u_dayplan::ga::operators::{GeneticOperators, CrossoverType, MutationType};
//!
//! let ops = GeneticOperators::default();
//! assert_eq!(ops.crossover_type, CrossoverType::Uniform);
//! assert_eq!(ops.mutation_type, MutationType::CapacityAware);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::{
    capacity_mutation, one_point_crossover, random_mutation, uniform_crossover, DayChromosome,
};

/// Crossover strategy for day chromosomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverType {
    /// Gene-wise coin flip between parents.
    #[default]
    Uniform,
    /// Single cut point.
    OnePoint,
}

/// Mutation strategy for day chromosomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationType {
    /// Prefer buckets still under their target count.
    #[default]
    CapacityAware,
    /// Any other bucket, uniformly.
    Random,
}

/// Runtime-selectable genetic operators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneticOperators {
    /// Crossover strategy.
    pub crossover_type: CrossoverType,
    /// Mutation strategy.
    pub mutation_type: MutationType,
}

impl GeneticOperators {
    /// Performs crossover using the configured strategy.
    pub fn crossover<R: Rng>(
        &self,
        p1: &DayChromosome,
        p2: &DayChromosome,
        rng: &mut R,
    ) -> (DayChromosome, DayChromosome) {
        match self.crossover_type {
            CrossoverType::Uniform => uniform_crossover(p1, p2, rng),
            CrossoverType::OnePoint => one_point_crossover(p1, p2, rng),
        }
    }

    /// Moves `moves` points using the configured strategy.
    pub fn mutate<R: Rng>(
        &self,
        chromosome: &mut DayChromosome,
        coords: &[[f64; 2]],
        targets: &[usize],
        moves: usize,
        rng: &mut R,
    ) {
        match self.mutation_type {
            MutationType::CapacityAware => capacity_mutation(chromosome, coords, targets, moves, rng),
            MutationType::Random => random_mutation(chromosome, targets.len(), moves, rng),
        }
    }
}
