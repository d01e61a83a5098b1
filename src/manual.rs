//! Manual polygon overrides.
//!
//! A planner draws a region on the map and moves every point inside it
//! to one day. The change happens in two steps: [`ManualOverride::preview`]
//! lists the selected points for confirmation, then
//! [`ManualOverride::apply`] rewrites their labels. Points outside the
//! region are never touched, and applying the same override twice gives
//! the same assignment as applying it once.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{Assignment, DayLabel, PointSet};
use crate::polygon::{BoundaryPolicy, Region};

/// Override errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverrideError {
    /// The assignment was not built over this point set.
    #[error("assignment covers {assignment} points in a different order than the {points}-point set")]
    PointSetMismatch {
        /// Points in the assignment.
        assignment: usize,
        /// Points in the point set.
        points: usize,
    },
}

/// One selected point, as shown for confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedPoint {
    /// Point index.
    pub index: usize,
    /// Point id.
    pub id: String,
    /// Display attribute value ("Sin dato" when missing).
    pub display: String,
    /// Label before the override.
    pub current: DayLabel,
}

/// Points selected by a region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Selected point indices, ascending.
    pub indices: Vec<usize>,
}

impl Selection {
    /// Number of selected points.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing was selected.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Confirmation rows for the selected points.
    pub fn rows(&self, points: &PointSet, assignment: &Assignment) -> Vec<SelectedPoint> {
        self.indices
            .iter()
            .filter_map(|&i| {
                let point = points.get(i)?;
                Some(SelectedPoint {
                    index: i,
                    id: point.id.clone(),
                    display: points.display_value(i).to_string(),
                    current: assignment
                        .label_at(i)
                        .cloned()
                        .unwrap_or(DayLabel::UNASSIGNED),
                })
            })
            .collect()
    }
}

/// A region-to-label override.
#[derive(Debug, Clone, PartialEq)]
pub struct ManualOverride {
    region: Region,
    target: DayLabel,
    policy: BoundaryPolicy,
}

impl ManualOverride {
    /// Creates an override moving points inside `region` to `target`.
    pub fn new(region: Region, target: impl Into<DayLabel>) -> Self {
        Self {
            region,
            target: target.into(),
            policy: BoundaryPolicy::default(),
        }
    }

    /// Sets the boundary policy.
    pub fn with_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Target label.
    pub fn target(&self) -> &DayLabel {
        &self.target
    }

    /// Region.
    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Selects the points inside the region.
    pub fn preview(&self, points: &PointSet) -> Selection {
        Selection {
            indices: points
                .points()
                .iter()
                .enumerate()
                .filter(|(_, p)| self.region.contains(p.lat, p.lng, self.policy))
                .map(|(i, _)| i)
                .collect(),
        }
    }

    /// Relabels the selected points and returns how many were selected.
    pub fn apply(
        &self,
        assignment: &mut Assignment,
        points: &PointSet,
    ) -> Result<usize, OverrideError> {
        if !assignment.matches(points) {
            return Err(OverrideError::PointSetMismatch {
                assignment: assignment.len(),
                points: points.len(),
            });
        }
        let selection = self.preview(points);
        let changed = selection
            .indices
            .iter()
            .filter(|&&i| assignment.label_at(i) != Some(&self.target))
            .count();
        for &i in &selection.indices {
            assignment.set_label(i, self.target.clone());
        }
        info!(
            selected = selection.len(),
            changed,
            label = %self.target,
            "manual override applied"
        );
        Ok(selection.len())
    }
}
