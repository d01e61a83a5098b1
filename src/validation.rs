//! Input validation for day-planning problems.
//!
//! Checks structural integrity of the point set and target vector before
//! any strategy runs. Detects:
//! - Duplicate or blank point IDs
//! - Non-finite or out-of-range coordinates
//! - Target vectors that are empty or do not sum to the point count

use crate::models::PointSet;
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two points share the same ID.
    DuplicateId,
    /// A point has an empty ID.
    BlankId,
    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate,
    /// Latitude outside [-90, 90] or longitude outside [-180, 180].
    CoordinateOutOfRange,
    /// The target vector has no entries.
    EmptyTargets,
    /// The target vector does not sum to the number of points.
    TargetSumMismatch,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates the point set.
///
/// Checks:
/// 1. No blank point IDs
/// 2. No duplicate point IDs
/// 3. All coordinates finite
/// 4. Latitude in [-90, 90], longitude in [-180, 180]
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_points(points: &PointSet) -> ValidationResult {
    let mut errors = Vec::new();
    let mut ids = HashSet::new();

    for (row, p) in points.points().iter().enumerate() {
        if p.id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BlankId,
                format!("Point at position {row} has an empty ID"),
            ));
        } else if !ids.insert(p.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate point ID: {}", p.id),
            ));
        }

        if !p.lat.is_finite() || !p.lng.is_finite() {
            errors.push(ValidationError::new(
                ValidationErrorKind::NonFiniteCoordinate,
                format!("Point '{}' has non-finite coordinates ({}, {})", p.id, p.lat, p.lng),
            ));
        } else if !(-90.0..=90.0).contains(&p.lat) || !(-180.0..=180.0).contains(&p.lng) {
            errors.push(ValidationError::new(
                ValidationErrorKind::CoordinateOutOfRange,
                format!("Point '{}' is out of range ({}, {})", p.id, p.lat, p.lng),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates a target-count vector against the number of points.
pub fn validate_targets(targets: &[usize], total_points: usize) -> ValidationResult {
    if targets.is_empty() {
        return Err(vec![ValidationError::new(
            ValidationErrorKind::EmptyTargets,
            "Target-count vector is empty",
        )]);
    }
    let sum: usize = targets.iter().sum();
    if sum != total_points {
        return Err(vec![ValidationError::new(
            ValidationErrorKind::TargetSumMismatch,
            format!("Target counts sum to {sum} but there are {total_points} points"),
        )]);
    }
    Ok(())
}
