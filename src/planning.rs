//! Day-count planner.
//!
//! Proposes the default number of points per day: an even split with the
//! remainder added to the last day.
//!
//! # Example
//! ```
//! use u_dayplan::planning::plan_day_counts;
//!
//! let plan = plan_day_counts(101, 4).unwrap();
//! assert_eq!(plan.targets, vec![25, 25, 25, 26]);
//! assert_eq!(plan.suggested_per_day, 25);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Planner errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanError {
    /// The day count must be at least 1.
    #[error("invalid day count {0}: at least one day is required")]
    InvalidDayCount(i64),
}

/// Balanced target-count proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    /// Total number of points.
    pub total_points: usize,
    /// `floor(total / days)`.
    pub suggested_per_day: usize,
    /// Target count per day; sums to `total_points`.
    pub targets: Vec<usize>,
}

/// Computes the balanced target-count vector.
///
/// Every day gets `floor(total / days)`; the remainder goes entirely to
/// the last day.
///
/// # Errors
/// [`PlanError::InvalidDayCount`] when `days <= 0`.
pub fn plan_day_counts(total_points: usize, days: i64) -> Result<DayPlan, PlanError> {
    if days <= 0 {
        return Err(PlanError::InvalidDayCount(days));
    }
    let days = days as usize;
    let base = total_points / days;
    let mut targets = vec![base; days];
    if let Some(last) = targets.last_mut() {
        *last += total_points - base * days;
    }
    Ok(DayPlan {
        total_points,
        suggested_per_day: base,
        targets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_101_over_4() {
        let plan = plan_day_counts(101, 4).unwrap();
        assert_eq!(plan.targets, vec![25, 25, 25, 26]);
    }

    #[test]
    fn test_shape_for_many_inputs() {
        for n in 1..60usize {
            for d in 1..12i64 {
                let plan = plan_day_counts(n, d).unwrap();
                let t = &plan.targets;
                assert_eq!(t.len(), d as usize);
                assert_eq!(t.iter().sum::<usize>(), n);
                let last = *t.last().unwrap();
                assert!(t[..t.len() - 1].iter().all(|&x| x == plan.suggested_per_day));
                assert!(last >= plan.suggested_per_day);
            }
        }
    }

    #[test]
    fn test_more_days_than_points() {
        let plan = plan_day_counts(3, 5).unwrap();
        assert_eq!(plan.targets, vec![0, 0, 0, 0, 3]);
    }

    #[test]
    fn test_invalid_day_count() {
        assert_eq!(plan_day_counts(10, 0), Err(PlanError::InvalidDayCount(0)));
        assert_eq!(plan_day_counts(10, -2), Err(PlanError::InvalidDayCount(-2)));
    }
}
