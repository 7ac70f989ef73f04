//! Problem instance: the complete, fixed input of one planning run.

use serde::{Deserialize, Serialize};

use super::{Patient, Resource, ResourceCatalog};
use crate::error::AllocationError;

/// A triage problem instance.
///
/// Field names match the wire record (`patients`, `resources`,
/// `responders`, `total_time`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageInstance {
    /// Patients, indexed by position.
    pub patients: Vec<Patient>,
    /// Treatment kinds, indexed by position.
    pub resources: ResourceCatalog,
    /// Maximum number of concurrently running treatments.
    pub responders: u32,
    /// Planning horizon; curves are sampled at `0..=total_time`.
    pub total_time: u32,
}

impl TriageInstance {
    /// Creates an instance with no patients and no resources.
    pub fn new(responders: u32, total_time: u32) -> Self {
        Self {
            patients: Vec::new(),
            resources: ResourceCatalog::new(),
            responders,
            total_time,
        }
    }

    /// Adds a patient.
    pub fn with_patient(mut self, patient: Patient) -> Self {
        self.patients.push(patient);
        self
    }

    /// Adds a resource kind.
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources = self.resources.with_resource(resource);
        self
    }

    /// Replaces the responder count.
    pub fn with_responders(mut self, responders: u32) -> Self {
        self.responders = responders;
        self
    }

    /// Parses an instance from its JSON wire record.
    ///
    /// Only the shape is checked here; value ranges are checked by
    /// [`crate::validation::validate_instance`].
    pub fn from_json(input: &str) -> Result<Self, AllocationError> {
        Ok(serde_json::from_str(input)?)
    }

    /// Whether no assignment can possibly be made.
    ///
    /// True for zero responders, a zero horizon, or no patients or resources.
    pub fn is_degenerate(&self) -> bool {
        self.responders == 0
            || self.total_time == 0
            || self.patients.is_empty()
            || self.resources.is_empty()
    }

    /// Sum of every patient's untreated outcome.
    pub fn baseline_total(&self) -> f64 {
        self.patients.iter().map(Patient::untreated_outcome).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_builder() {
        let inst = TriageInstance::new(2, 3)
            .with_patient(Patient::constant(40.0, 3))
            .with_patient(Patient::new(vec![90.0, 70.0, 50.0, 30.0]))
            .with_resource(Resource::new(1, 20.0));

        assert_eq!(inst.patients.len(), 2);
        assert_eq!(inst.resources.len(), 1);
        assert_eq!(inst.responders, 2);
        assert!(!inst.is_degenerate());
        assert!((inst.baseline_total() - 70.0).abs() < 1e-10);
    }

    #[test]
    fn test_degenerate_instances() {
        let base = TriageInstance::new(1, 2)
            .with_patient(Patient::constant(40.0, 2))
            .with_resource(Resource::new(1, 20.0));
        assert!(!base.is_degenerate());
        assert!(base.clone().with_responders(0).is_degenerate());
        assert!(TriageInstance::new(1, 0).is_degenerate());
        assert!(TriageInstance::new(1, 2)
            .with_resource(Resource::new(1, 20.0))
            .is_degenerate());
        assert!(TriageInstance::new(1, 2)
            .with_patient(Patient::constant(40.0, 2))
            .is_degenerate());
    }

    #[test]
    fn test_from_json() {
        let inst = TriageInstance::from_json(
            r#"{
                "patients": [[30, 30, 30]],
                "resources": [{"time": 1, "boost": 40}],
                "responders": 1,
                "total_time": 2
            }"#,
        )
        .unwrap();
        assert_eq!(inst.patients[0].curve, vec![30.0, 30.0, 30.0]);
        assert_eq!(inst.resources.get(0), Some(&Resource::new(1, 40.0)));
        assert_eq!(inst.responders, 1);
        assert_eq!(inst.total_time, 2);
    }

    #[test]
    fn test_from_json_malformed() {
        // Missing field
        let err = TriageInstance::from_json(r#"{"patients": [], "resources": [], "responders": 1}"#)
            .unwrap_err();
        assert!(matches!(err, AllocationError::Json(_)));

        // Non-numeric probability
        let err = TriageInstance::from_json(
            r#"{"patients": [["a"]], "resources": [], "responders": 1, "total_time": 0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AllocationError::Json(_)));

        // Negative responders
        let err = TriageInstance::from_json(
            r#"{"patients": [], "resources": [], "responders": -1, "total_time": 0}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AllocationError::Json(_)));
    }
}
