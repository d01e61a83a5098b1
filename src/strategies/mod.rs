//! Partition strategies.
//!
//! Each strategy maps a point set and a target-count vector to one day
//! bucket per point.
//!
//! | Strategy | Counts | Randomness |
//! |----------|--------|------------|
//! | [`ZoneStrategy`] | approximate | none |
//! | [`CapacitatedStrategy`] | exact | none |
//! | [`SweepStrategy`] | exact | none |
//! | [`HybridStrategy`] | soft objective | seeded |
//!
//! Strategies are selected through the [`Strategy`] enum, which is what the
//! dispatcher and the session store.
//!
//! # Usage
//!
//! ```
//! use u_dayplan::strategies::{Strategy, StrategyKind};
//!
//! let kind: StrategyKind = "Capacitado".parse().unwrap();
//! assert_eq!(kind, StrategyKind::Capacitated);
//! assert_eq!(Strategy::from_kind(kind).name(), "capacitated");
//! ```

mod capacitated;
mod hybrid;
pub mod kmeans;
mod sweep;
mod zone;

pub use capacitated::CapacitatedStrategy;
pub use hybrid::{HybridDiagnostics, HybridParams, HybridStrategy};
pub use sweep::SweepStrategy;
pub use zone::ZoneStrategy;

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::str::FromStr;
use thiserror::Error;

use crate::models::PointSet;

/// Raw strategy output: a 0-based bucket index per point.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Bucket per point; `None` marks an unassigned point.
    pub buckets: Vec<Option<usize>>,
    /// Evolutionary diagnostics (Hybrid only).
    pub diagnostics: Option<HybridDiagnostics>,
}

impl Partition {
    /// Creates a partition without diagnostics.
    pub fn new(buckets: Vec<Option<usize>>) -> Self {
        Self {
            buckets,
            diagnostics: None,
        }
    }
}

/// A day-partitioning algorithm.
///
/// Implementations may assume the dispatcher already validated the input:
/// the point set is non-empty and `targets` sums to its length.
pub trait PartitionStrategy: Send + Sync + Debug {
    /// Canonical strategy name (e.g., "zone", "sweep").
    fn name(&self) -> &'static str;

    /// Assigns every point to a bucket in `0..targets.len()`.
    fn partition(&self, points: &PointSet, targets: &[usize]) -> Partition;

    /// Strategy description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Strategy names, without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Spatial zones.
    Zone,
    /// Exact target counts.
    Capacitated,
    /// Angular sweep.
    Sweep,
    /// K-means seed refined by a genetic algorithm.
    Hybrid,
}

/// Unknown strategy name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy '{0}' (expected zone, capacitated, sweep or hybrid)")]
pub struct UnknownStrategy(pub String);

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    /// Accepts canonical names and the Spanish planning-UI labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zone" | "por zona" => Ok(StrategyKind::Zone),
            "capacitated" | "capacitado" => Ok(StrategyKind::Capacitated),
            "sweep" => Ok(StrategyKind::Sweep),
            "hybrid" | "kms-evolutivo" => Ok(StrategyKind::Hybrid),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// A strategy together with its parameters.
///
/// Equality covers the parameters, so two `Strategy` values compare equal
/// exactly when running them would produce the same result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// See [`ZoneStrategy`].
    Zone,
    /// See [`CapacitatedStrategy`].
    Capacitated,
    /// See [`SweepStrategy`].
    Sweep,
    /// See [`HybridStrategy`].
    Hybrid(HybridParams),
}

impl Default for Strategy {
    fn default() -> Self {
        Strategy::Capacitated
    }
}

impl Strategy {
    /// Strategy with default parameters.
    pub fn from_kind(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Zone => Strategy::Zone,
            StrategyKind::Capacitated => Strategy::Capacitated,
            StrategyKind::Sweep => Strategy::Sweep,
            StrategyKind::Hybrid => Strategy::Hybrid(HybridParams::default()),
        }
    }

    /// Strategy kind.
    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::Zone => StrategyKind::Zone,
            Strategy::Capacitated => StrategyKind::Capacitated,
            Strategy::Sweep => StrategyKind::Sweep,
            Strategy::Hybrid(_) => StrategyKind::Hybrid,
        }
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        self.with_impl(|s| s.name())
    }

    /// Runs the strategy.
    pub fn partition(&self, points: &PointSet, targets: &[usize]) -> Partition {
        self.with_impl(|s| s.partition(points, targets))
    }

    fn with_impl<T>(&self, f: impl FnOnce(&dyn PartitionStrategy) -> T) -> T {
        match self {
            Strategy::Zone => f(&ZoneStrategy::default()),
            Strategy::Capacitated => f(&CapacitatedStrategy::default()),
            Strategy::Sweep => f(&SweepStrategy),
            Strategy::Hybrid(params) => f(&HybridStrategy::new(params.clone())),
        }
    }
}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<StrategyKind>().map(Strategy::from_kind)
    }
}
