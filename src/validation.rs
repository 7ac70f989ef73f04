//! Input validation for triage instances.
//!
//! Checks value ranges that the wire format cannot express before any
//! planning happens. Detects:
//! - Survival curves whose length doesn't match the horizon
//! - Probabilities outside [0, 100] or non-finite
//! - Zero-duration resources
//! - Negative or non-finite boosts
//!
//! Resources whose duration exceeds the horizon are *not* rejected: they
//! are simply never usable.

use std::fmt;

use crate::models::{TriageInstance, MAX_PROBABILITY};

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
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A survival curve does not have `total_time + 1` samples.
    ShapeMismatch,
    /// A probability is outside [0, 100] or not a number.
    ProbabilityOutOfRange,
    /// A resource has zero duration.
    InvalidDuration,
    /// A resource boost is negative or not a number.
    InvalidBoost,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates a triage instance.
///
/// Checks:
/// 1. Every curve has exactly `total_time + 1` samples
/// 2. Every probability is finite and within [0, 100]
/// 3. Every resource duration is positive
/// 4. Every boost is finite and non-negative
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_instance(instance: &TriageInstance) -> ValidationResult {
    let mut errors = Vec::new();
    let expected_len = instance.total_time as usize + 1;

    for (i, patient) in instance.patients.iter().enumerate() {
        if patient.sample_count() != expected_len {
            errors.push(ValidationError::new(
                ValidationErrorKind::ShapeMismatch,
                format!(
                    "Patient {i} has {} samples, expected {expected_len}",
                    patient.sample_count()
                ),
            ));
        }

        // One report per patient is enough
        if let Some((t, p)) = patient
            .curve
            .iter()
            .enumerate()
            .find(|(_, p)| !(0.0..=MAX_PROBABILITY).contains(*p))
        {
            errors.push(ValidationError::new(
                ValidationErrorKind::ProbabilityOutOfRange,
                format!("Patient {i} has probability {p} at t={t}"),
            ));
        }
    }

    for (i, resource) in instance.resources.iter() {
        if resource.duration == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDuration,
                format!("Resource {i} has zero duration"),
            ));
        }
        if !resource.boost.is_finite() || resource.boost < 0.0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidBoost,
                format!("Resource {i} has boost {}", resource.boost),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Patient, Resource};

    fn sample_instance() -> TriageInstance {
        TriageInstance::new(2, 2)
            .with_patient(Patient::new(vec![80.0, 60.0, 40.0]))
            .with_patient(Patient::constant(30.0, 2))
            .with_resource(Resource::new(1, 20.0))
            .with_resource(Resource::new(5, 50.0)) // Longer than the horizon: allowed
    }

    #[test]
    fn test_valid_instance() {
        assert!(validate_instance(&sample_instance()).is_ok());
    }

    #[test]
    fn test_degenerate_instance_is_valid() {
        assert!(validate_instance(&TriageInstance::new(0, 0)).is_ok());
    }

    #[test]
    fn test_shape_mismatch() {
        let inst = sample_instance().with_patient(Patient::new(vec![50.0, 50.0]));
        let errors = validate_instance(&inst).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::ShapeMismatch);
        assert!(errors[0].message.contains("Patient 2"));
    }

    #[test]
    fn test_probability_out_of_range() {
        let inst = sample_instance()
            .with_patient(Patient::new(vec![50.0, 120.0, 50.0]))
            .with_patient(Patient::new(vec![-1.0, 50.0, 50.0]))
            .with_patient(Patient::new(vec![50.0, f64::NAN, 50.0]));
        let errors = validate_instance(&inst).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .all(|e| e.kind == ValidationErrorKind::ProbabilityOutOfRange));
    }

    #[test]
    fn test_invalid_resources() {
        let inst = sample_instance()
            .with_resource(Resource::new(0, 10.0))
            .with_resource(Resource::new(1, -5.0))
            .with_resource(Resource::new(1, f64::INFINITY));
        let errors = validate_instance(&inst).unwrap_err();
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidDuration)
                .count(),
            1
        );
        assert_eq!(
            errors
                .iter()
                .filter(|e| e.kind == ValidationErrorKind::InvalidBoost)
                .count(),
            2
        );
    }

    #[test]
    fn test_multiple_errors() {
        let inst = TriageInstance::new(1, 1)
            .with_patient(Patient::new(vec![50.0]))
            .with_resource(Resource::new(0, -1.0));
        let errors = validate_instance(&inst).unwrap_err();
        assert!(errors.len() >= 3);
        assert!(errors[0].to_string().starts_with("ShapeMismatch"));
    }
}
