//! Day-bucket planning for geo-located field visits.
//!
//! Splits a set of points (latitude, longitude, attributes) into `D` day
//! buckets: a balanced target count per day, a choice of partitioning
//! strategies, polygon-based manual overrides and bucket renaming.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Point`, `PointSet`, `DayLabel`, `Assignment`
//! - **`planning`**: Balanced target-count vector for `N` points over `D` days
//! - **`geo`**: Planar and haversine distances, centroids, polar angles
//! - **`strategies`**: Zone (k-means), Capacitated, Sweep and Hybrid (k-means + GA)
//! - **`ga`**: Day-assignment GA encoding and cost, run on `u-metaheur`
//! - **`dispatcher`**: Validates input and runs the selected strategy
//! - **`polygon`** / **`manual`**: Selection regions and region overrides
//! - **`relabel`**: Simultaneous label substitution
//! - **`summary`**: Per-bucket counts, count check, quality indicators
//! - **`session`**: Interactive state with the recompute gate
//! - **`table`**: CSV import/export of the point table
//! - **`validation`**: Input integrity checks (duplicate IDs, coordinates, targets)
//!
//! # Quick start
//!
//! ```
//! use u_dayplan::models::{Point, PointSet};
//! use u_dayplan::session::{PlanningSession, RecomputeStatus};
//! use u_dayplan::strategies::Strategy;
//!
//! let points = PointSet::new(
//!     (0..8).map(|i| Point::new(format!("p{i}"), -8.1, -79.0 + i as f64 * 0.01)).collect(),
//! );
//! let mut session = PlanningSession::new(points);
//! session.set_day_count(2);
//! session.select_strategy(Strategy::Sweep);
//! assert_eq!(session.recompute().unwrap(), RecomputeStatus::Recomputed);
//! assert_eq!(session.recompute().unwrap(), RecomputeStatus::Reused);
//! assert!(session.summary().unwrap().iter().all(|b| b.count == 4));
//! ```
//!
//! # Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.
//!
//! # References
//!
//! - Gillett & Miller (1974), "A Heuristic Algorithm for the Vehicle-Dispatch Problem"
//! - Lloyd (1982), "Least squares quantization in PCM"
//! - Krishna & Murty (1999), "Genetic K-means algorithm"

pub mod dispatcher;
pub mod ga;
pub mod geo;
pub mod manual;
pub mod models;
pub mod planning;
pub mod polygon;
pub mod relabel;
pub mod session;
pub mod strategies;
pub mod summary;
pub mod table;
pub mod validation;
