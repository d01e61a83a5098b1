//! GA-based day-assignment optimization.
//!
//! Implements the day-assignment encoding, operators and cost problem on
//! top of `u-metaheur`'s generic GA framework.
//!
//! # Encoding
//!
//! One gene per point holding its 0-based bucket (`None` = unassigned).
//! All individuals descend from one k-means seed, so gene positions and
//! bucket indices stay comparable across the population.
//!
//! # Submodules
//!
//! - [`operators`]: Runtime-selectable crossover and mutation strategies
//!
//! # Reference
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"
//! - Syswerda (1989), "Uniform Crossover in Genetic Algorithms"

mod chromosome;
pub mod operators;
mod problem;

pub use chromosome::{
    capacity_mutation, one_point_crossover, random_mutation, uniform_crossover, DayChromosome,
};
pub use problem::{CostBreakdown, CostWeights, DayAssignmentProblem};
