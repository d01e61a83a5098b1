//! Interactive planning session.
//!
//! Holds the state a planner edits between interactions: the point set,
//! the day count, the selected strategy, optional hand-edited target
//! counts and the current assignment.
//!
//! # Recompute gate
//!
//! A strategy run is keyed by `(day count, strategy with parameters,
//! targets)`. [`PlanningSession::recompute`] reuses the cached assignment
//! while the key is unchanged, so manual overrides and renames survive
//! repeated refreshes. Changing any key component makes the next
//! `recompute` run the strategy again, replacing the assignment.
//! Overrides and renames apply immediately and are never gated.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::dispatcher::{assign, AssignmentOutcome, DispatchError};
use crate::geo::DistanceMetric;
use crate::manual::{ManualOverride, OverrideError, Selection};
use crate::models::{Assignment, PointSet};
use crate::planning::{plan_day_counts, PlanError};
use crate::relabel::{relabel, LabelMapping};
use crate::strategies::Strategy;
use crate::summary::{bucket_summary, CountCheck, DayBucket, PlanKpi};

/// Session errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// The day count cannot produce a target vector.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// The dispatcher rejected the input.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The override does not fit the current assignment.
    #[error(transparent)]
    Override(#[from] OverrideError),

    /// Hand-edited targets do not have one entry per day.
    #[error("{targets} target counts given for {days} days")]
    TargetCountMismatch {
        /// Current day count.
        days: i64,
        /// Length of the target vector.
        targets: usize,
    },

    /// No assignment has been computed yet.
    #[error("no assignment yet: run recompute first")]
    NoAssignment,
}

/// Outcome of [`PlanningSession::recompute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeStatus {
    /// The strategy ran and replaced the assignment.
    Recomputed,
    /// The key was unchanged; the cached assignment was kept.
    Reused,
}

/// Serializable session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of days.
    pub day_count: i64,
    /// Selected strategy with its parameters.
    pub strategy: Strategy,
    /// Hand-edited target counts; `None` uses the balanced plan.
    pub targets: Option<Vec<usize>>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            day_count: 1,
            strategy: Strategy::default(),
            targets: None,
        }
    }
}

impl SessionConfig {
    /// Parses a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
struct RunKey {
    day_count: i64,
    strategy: Strategy,
    targets: Vec<usize>,
}

/// A planning session over one point set.
#[derive(Debug, Clone)]
pub struct PlanningSession {
    points: PointSet,
    config: SessionConfig,
    outcome: Option<AssignmentOutcome>,
    last_run: Option<RunKey>,
}

impl PlanningSession {
    /// Creates a session with default settings.
    pub fn new(points: PointSet) -> Self {
        Self::with_config(points, SessionConfig::default())
    }

    /// Creates a session with the given settings.
    pub fn with_config(points: PointSet, config: SessionConfig) -> Self {
        Self {
            points,
            config,
            outcome: None,
            last_run: None,
        }
    }

    /// The point set.
    pub fn points(&self) -> &PointSet {
        &self.points
    }

    /// Current settings.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current day count.
    pub fn day_count(&self) -> i64 {
        self.config.day_count
    }

    /// Selected strategy.
    pub fn strategy(&self) -> &Strategy {
        &self.config.strategy
    }

    /// Sets the day count and drops hand-edited targets.
    pub fn set_day_count(&mut self, days: i64) {
        if days != self.config.day_count {
            self.config.targets = None;
        }
        self.config.day_count = days;
    }

    /// Selects a strategy.
    pub fn select_strategy(&mut self, strategy: Strategy) {
        self.config.strategy = strategy;
    }

    /// Sets hand-edited target counts, one per day.
    ///
    /// The sum is checked against the point count on the next recompute.
    ///
    /// # Errors
    /// - [`SessionError::Plan`] when the day count is not positive.
    /// - [`SessionError::TargetCountMismatch`] when the vector length is
    ///   not the day count. The previous targets are kept.
    pub fn set_targets(&mut self, targets: Vec<usize>) -> Result<(), SessionError> {
        self.check_target_len(&targets)?;
        self.config.targets = Some(targets);
        Ok(())
    }

    /// Target counts the next run will use.
    pub fn targets(&self) -> Result<Vec<usize>, SessionError> {
        match &self.config.targets {
            Some(t) => {
                self.check_target_len(t)?;
                Ok(t.clone())
            }
            None => Ok(plan_day_counts(self.points.len(), self.config.day_count)?.targets),
        }
    }

    fn check_target_len(&self, targets: &[usize]) -> Result<(), SessionError> {
        let days = self.config.day_count;
        if days <= 0 {
            return Err(PlanError::InvalidDayCount(days).into());
        }
        if targets.len() as i64 != days {
            return Err(SessionError::TargetCountMismatch {
                days,
                targets: targets.len(),
            });
        }
        Ok(())
    }

    /// Runs the strategy unless the cached assignment matches the settings.
    pub fn recompute(&mut self) -> Result<RecomputeStatus, SessionError> {
        let key = self.run_key()?;
        if self.outcome.is_some() && self.last_run.as_ref() == Some(&key) {
            debug!(strategy = key.strategy.name(), "assignment reused");
            return Ok(RecomputeStatus::Reused);
        }
        self.run(key)?;
        Ok(RecomputeStatus::Recomputed)
    }

    /// Runs the strategy regardless of the cache.
    pub fn force_recompute(&mut self) -> Result<(), SessionError> {
        let key = self.run_key()?;
        self.run(key)
    }

    fn run_key(&self) -> Result<RunKey, SessionError> {
        Ok(RunKey {
            day_count: self.config.day_count,
            strategy: self.config.strategy.clone(),
            targets: self.targets()?,
        })
    }

    fn run(&mut self, key: RunKey) -> Result<(), SessionError> {
        let outcome = assign(&self.points, &key.targets, &key.strategy)?;
        info!(
            strategy = key.strategy.name(),
            days = key.day_count,
            "session assignment recomputed"
        );
        self.outcome = Some(outcome);
        self.last_run = Some(key);
        Ok(())
    }

    /// Last strategy outcome. Its assignment reflects later overrides and
    /// renames; its summary does not (use [`Self::summary`]).
    pub fn outcome(&self) -> Option<&AssignmentOutcome> {
        self.outcome.as_ref()
    }

    /// Current assignment.
    pub fn assignment(&self) -> Option<&Assignment> {
        self.outcome.as_ref().map(|o| &o.assignment)
    }

    fn outcome_mut(&mut self) -> Result<&mut AssignmentOutcome, SessionError> {
        self.outcome.as_mut().ok_or(SessionError::NoAssignment)
    }

    /// Points an override would move.
    pub fn preview_override(&self, ov: &ManualOverride) -> Result<Selection, SessionError> {
        if self.outcome.is_none() {
            return Err(SessionError::NoAssignment);
        }
        Ok(ov.preview(&self.points))
    }

    /// Applies an override; returns the number of selected points.
    pub fn apply_override(&mut self, ov: &ManualOverride) -> Result<usize, SessionError> {
        let points = &self.points;
        let outcome = self.outcome.as_mut().ok_or(SessionError::NoAssignment)?;
        let selected = ov.apply(&mut outcome.assignment, points)?;
        CountCheck::of(&outcome.assignment).log();
        Ok(selected)
    }

    /// Renames labels; returns the number of points whose label changed.
    pub fn rename(&mut self, mapping: &LabelMapping) -> Result<usize, SessionError> {
        let outcome = self.outcome_mut()?;
        Ok(relabel(&mut outcome.assignment, mapping))
    }

    /// Per-bucket counts of the current assignment.
    pub fn summary(&self) -> Result<Vec<DayBucket>, SessionError> {
        let outcome = self.outcome.as_ref().ok_or(SessionError::NoAssignment)?;
        Ok(bucket_summary(&outcome.assignment, &outcome.targets))
    }

    /// Count-consistency verdict of the current assignment (also logged).
    pub fn count_check(&self) -> Result<CountCheck, SessionError> {
        let assignment = self.assignment().ok_or(SessionError::NoAssignment)?;
        let check = CountCheck::of(assignment);
        check.log();
        Ok(check)
    }

    /// Quality indicators of the current assignment.
    pub fn kpi(&self, metric: DistanceMetric) -> Result<PlanKpi, SessionError> {
        let outcome = self.outcome.as_ref().ok_or(SessionError::NoAssignment)?;
        Ok(PlanKpi::calculate(
            &self.points,
            &outcome.assignment,
            &outcome.targets,
            metric,
        ))
    }
}
