//! Strategy dispatcher.
//!
//! Validates a point set and target vector, runs the selected strategy and
//! packages the result with its summary and count check. Validation
//! failures are configuration errors: nothing runs and no state changes.
//!
//! # Usage
//!
//! ```
//! use u_dayplan::dispatcher::assign;
//! use u_dayplan::models::{Point, PointSet};
//! use u_dayplan::planning::plan_day_counts;
//! use u_dayplan::strategies::Strategy;
//!
//! let points = PointSet::new(
//!     (0..12).map(|i| Point::new(format!("p{i}"), 0.0, i as f64 * 0.01)).collect(),
//! );
//! let plan = plan_day_counts(points.len(), 3).unwrap();
//! let outcome = assign(&points, &plan.targets, &Strategy::Capacitated).unwrap();
//! assert!(outcome.summary.iter().all(|b| b.count == 4));
//! ```

use thiserror::Error;
use tracing::{debug, info};

use crate::models::{Assignment, PointSet};
use crate::strategies::{HybridDiagnostics, Strategy};
use crate::summary::{bucket_summary, CountCheck, DayBucket};
use crate::validation::{validate_points, validate_targets, ValidationError};

/// Dispatcher errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DispatchError {
    /// There are no points to assign.
    #[error("the point set is empty")]
    EmptyPointSet,

    /// Point set or target vector failed validation.
    #[error("invalid input: {}", join(.0))]
    Invalid(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of one strategy run.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    /// Strategy that produced the assignment.
    pub strategy: Strategy,
    /// Target counts used.
    pub targets: Vec<usize>,
    /// Point → day mapping.
    pub assignment: Assignment,
    /// Per-bucket counts.
    pub summary: Vec<DayBucket>,
    /// Count-consistency verdict.
    pub count_check: CountCheck,
    /// Hybrid run diagnostics.
    pub diagnostics: Option<HybridDiagnostics>,
}

/// Validates the input and runs `strategy`.
///
/// # Errors
/// - [`DispatchError::EmptyPointSet`] when there are no points.
/// - [`DispatchError::Invalid`] when points or targets fail validation
///   (including targets that do not sum to the number of points).
pub fn assign(
    points: &PointSet,
    targets: &[usize],
    strategy: &Strategy,
) -> Result<AssignmentOutcome, DispatchError> {
    if points.is_empty() {
        return Err(DispatchError::EmptyPointSet);
    }
    let mut errors = Vec::new();
    if let Err(e) = validate_points(points) {
        errors.extend(e);
    }
    if let Err(e) = validate_targets(targets, points.len()) {
        errors.extend(e);
    }
    if !errors.is_empty() {
        debug!(errors = errors.len(), "assignment input rejected");
        return Err(DispatchError::Invalid(errors));
    }

    debug!(
        strategy = strategy.name(),
        points = points.len(),
        days = targets.len(),
        "running strategy"
    );
    let partition = strategy.partition(points, targets);
    let assignment = Assignment::from_buckets(points, &partition.buckets);
    let summary = bucket_summary(&assignment, targets);
    let count_check = CountCheck::of(&assignment);
    count_check.log();

    info!(
        strategy = strategy.name(),
        points = points.len(),
        days = targets.len(),
        unassigned = assignment.unassigned_count(),
        "assignment computed"
    );

    Ok(AssignmentOutcome {
        strategy: strategy.clone(),
        targets: targets.to_vec(),
        assignment,
        summary,
        count_check,
        diagnostics: partition.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayLabel, Point};
    use crate::planning::plan_day_counts;
    use crate::strategies::HybridParams;
    use crate::validation::ValidationErrorKind;
    use std::collections::HashSet;

    /// 100 points on a jittered 10×10 grid.
    fn hundred_points() -> PointSet {
        let mut pts = Vec::new();
        for r in 0..10 {
            for c in 0..10 {
                let jitter = ((r * 7 + c * 3) % 5) as f64 * 0.001;
                pts.push(Point::new(
                    format!("P{:03}", r * 10 + c),
                    -8.10 + r as f64 * 0.01 + jitter,
                    -79.03 + c as f64 * 0.01 - jitter,
                ));
            }
        }
        PointSet::new(pts)
    }

    fn all_strategies() -> Vec<Strategy> {
        vec![
            Strategy::Zone,
            Strategy::Capacitated,
            Strategy::Sweep,
            Strategy::Hybrid(HybridParams::default().with_generations(10).with_parallel(false)),
        ]
    }

    #[test]
    fn test_capacitated_hundred_points_four_days() {
        let points = hundred_points();
        let plan = plan_day_counts(points.len(), 4).unwrap();
        let outcome = assign(&points, &plan.targets, &Strategy::Capacitated).unwrap();

        assert_eq!(outcome.summary.len(), 4);
        for (day, bucket) in outcome.summary.iter().enumerate() {
            assert_eq!(bucket.label, DayLabel::day(day + 1));
            assert_eq!(bucket.count, 25);
        }
        assert_eq!(outcome.count_check, CountCheck::Consistent);
        assert!(outcome.diagnostics.is_none());
    }

    #[test]
    fn test_every_strategy_covers_each_point_once() {
        let points = hundred_points();
        let plan = plan_day_counts(points.len(), 4).unwrap();
        for strategy in all_strategies() {
            let outcome = assign(&points, &plan.targets, &strategy).unwrap();
            let a = &outcome.assignment;
            assert_eq!(a.len(), 100, "{}", strategy.name());

            let ids: HashSet<&String> = a.point_ids().iter().collect();
            assert_eq!(ids.len(), 100);

            let labelled: usize = outcome.summary.iter().map(|b| b.count).sum();
            assert_eq!(labelled + a.unassigned_count(), 100);
            assert!(a
                .labels()
                .iter()
                .all(|l| l.is_unassigned() || matches!(l, DayLabel::Index(1..=4))));
        }
    }

    #[test]
    fn test_exact_strategies_meet_uneven_targets() {
        let points = hundred_points();
        let targets = [40, 10, 0, 50];
        for strategy in [Strategy::Capacitated, Strategy::Sweep] {
            let outcome = assign(&points, &targets, &strategy).unwrap();
            let counts: Vec<usize> = outcome.summary.iter().map(|b| b.count).collect();
            assert_eq!(counts, targets, "{}", strategy.name());
        }
    }

    #[test]
    fn test_hybrid_reports_diagnostics() {
        let points = hundred_points();
        let plan = plan_day_counts(points.len(), 4).unwrap();
        let strategy =
            Strategy::Hybrid(HybridParams::default().with_generations(12).with_parallel(false));
        let outcome = assign(&points, &plan.targets, &strategy).unwrap();
        let diag = outcome.diagnostics.unwrap();
        assert_eq!(diag.cost_history.len(), 12);
        assert!(diag.cost_history.windows(2).all(|w| w[1] <= w[0]));
        assert!(*diag.cost_history.last().unwrap() <= diag.cost_history[0]);
        assert_eq!(diag.unassigned, outcome.assignment.unassigned_count());
    }

    #[test]
    fn test_rejects_bad_target_sum() {
        let points = hundred_points();
        let err = assign(&points, &[25, 25, 25], &Strategy::Sweep).unwrap_err();
        match err {
            DispatchError::Invalid(errors) => {
                assert!(errors
                    .iter()
                    .any(|e| e.kind == ValidationErrorKind::TargetSumMismatch));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_rejects_empty_and_invalid_points() {
        assert_eq!(
            assign(&PointSet::default(), &[1], &Strategy::Zone).unwrap_err(),
            DispatchError::EmptyPointSet
        );

        let points = PointSet::new(vec![
            Point::new("a", 0.0, 0.0),
            Point::new("a", f64::NAN, 0.0),
        ]);
        let err = assign(&points, &[2], &Strategy::Zone).unwrap_err();
        assert!(err.to_string().starts_with("invalid input"));
    }

    #[test]
    fn test_more_days_than_points() {
        let points = PointSet::new(vec![Point::new("a", 0.0, 0.0), Point::new("b", 0.0, 1.0)]);
        let plan = plan_day_counts(points.len(), 4).unwrap();
        assert_eq!(plan.targets, vec![0, 0, 0, 2]);
        for strategy in all_strategies() {
            let outcome = assign(&points, &plan.targets, &strategy).unwrap();
            assert_eq!(outcome.assignment.len(), 2);
        }
    }
}
