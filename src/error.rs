//! Crate error type.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced by a planning run.
///
/// Degenerate instances (no responders, no patients, ...) are not errors;
/// they yield an empty plan.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The wire record could not be read or written.
    #[error("malformed triage record: {0}")]
    Json(#[from] serde_json::Error),

    /// The instance parsed but failed validation.
    #[error("invalid triage instance: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),

    /// A DP table access fell outside the arena.
    #[error("DP table index out of range: t={time}, r={commitments}")]
    TableIndex { time: u32, commitments: usize },

    /// A path node id does not exist in the arena.
    #[error("unknown path node {0}")]
    UnknownNode(usize),

    /// The reconstructed plan does not reproduce the recorded optimum.
    #[error("reconstructed gain {recomputed} differs from recorded optimum {recorded}")]
    Reconstruction { recorded: f64, recomputed: f64 },
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationErrorKind;

    #[test]
    fn test_invalid_message_lists_all_errors() {
        let err = AllocationError::Invalid(vec![
            ValidationError::new(ValidationErrorKind::InvalidDuration, "Resource 0 has zero duration"),
            ValidationError::new(ValidationErrorKind::InvalidBoost, "Resource 1 has negative boost"),
        ]);
        assert_eq!(
            err.to_string(),
            "invalid triage instance: Resource 0 has zero duration; Resource 1 has negative boost"
        );
    }

    #[test]
    fn test_json_error_conversion() {
        let parse_err = serde_json::from_str::<u32>("x").unwrap_err();
        let err: AllocationError = parse_err.into();
        assert!(err.to_string().starts_with("malformed triage record"));
    }
}
