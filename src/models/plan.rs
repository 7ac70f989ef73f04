//! Plan (solution) model.
//!
//! A plan is a set of (patient, resource, start time) assignments. The
//! allocation result adds the derived outcome metrics that are reported
//! to the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::TriageInstance;
use crate::error::AllocationError;
use crate::scheduler::CapacityTracker;

/// A patient-resource-time assignment.
///
/// The patient receives the resource's treatment starting at `start`,
/// which keeps one responder busy during `[start, start + duration)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Assignment {
    /// Patient index.
    pub patient: usize,
    /// Resource index.
    pub resource: usize,
    /// Start time of the treatment.
    #[serde(rename = "time")]
    pub start: u32,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(patient: usize, resource: usize, start: u32) -> Self {
        Self {
            patient,
            resource,
            start,
        }
    }
}

/// A set of assignments, ordered by start time, then completion, patient
/// and resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Chosen assignments.
    pub assignments: Vec<Assignment>,
}

/// A plan defect found by [`Plan::verify`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Offending assignment position within the plan, or the time unit for
    /// capacity violations.
    pub index: usize,
    /// Human-readable description.
    pub message: String,
}

/// Classification of plan defects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// Assignment names a patient that doesn't exist.
    UnknownPatient,
    /// Assignment names a resource that doesn't exist.
    UnknownResource,
    /// Treatment ends after the horizon.
    HorizonExceeded,
    /// More treatments in progress than responders available.
    CapacityExceeded,
    /// Patient receives more than one treatment.
    DuplicateTreatment,
}

impl Violation {
    fn new(violation_type: ViolationType, index: usize, message: impl Into<String>) -> Self {
        Self {
            violation_type,
            index,
            message: message.into(),
        }
    }
}

impl Plan {
    /// Creates an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a plan from assignments.
    pub fn from_assignments(assignments: Vec<Assignment>) -> Self {
        Self { assignments }
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the plan has no assignments.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Responder occupancy over the horizon implied by this plan.
    ///
    /// Assignments with unknown resources are ignored; intervals are
    /// clipped at the horizon. Capacity is *not* enforced here, so an
    /// infeasible plan shows up as instants above capacity.
    pub fn occupancy(&self, instance: &TriageInstance) -> CapacityTracker {
        let mut tracker = CapacityTracker::new(instance.responders, instance.total_time);
        for a in &self.assignments {
            if let Some(resource) = instance.resources.get(a.resource) {
                tracker.record(a.start, resource.duration);
            }
        }
        tracker
    }

    /// Checks the plan against the instance.
    ///
    /// Checks:
    /// 1. Patient and resource indices exist
    /// 2. Every treatment ends within the horizon
    /// 3. No patient is treated twice
    /// 4. Concurrent treatments never exceed the responder count
    ///
    /// # Returns
    /// All violations found; empty when the plan is feasible.
    pub fn verify(&self, instance: &TriageInstance) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut treated = HashSet::new();

        for (i, a) in self.assignments.iter().enumerate() {
            if a.patient >= instance.patients.len() {
                violations.push(Violation::new(
                    ViolationType::UnknownPatient,
                    i,
                    format!("Assignment {i} references unknown patient {}", a.patient),
                ));
            } else if !treated.insert(a.patient) {
                violations.push(Violation::new(
                    ViolationType::DuplicateTreatment,
                    i,
                    format!("Patient {} is treated more than once", a.patient),
                ));
            }

            match instance.resources.get(a.resource) {
                None => violations.push(Violation::new(
                    ViolationType::UnknownResource,
                    i,
                    format!("Assignment {i} references unknown resource {}", a.resource),
                )),
                Some(resource) if !resource.fits_within(a.start, instance.total_time) => {
                    violations.push(Violation::new(
                        ViolationType::HorizonExceeded,
                        i,
                        format!(
                            "Assignment {i} ends at {} after horizon {}",
                            resource.end_time(a.start),
                            instance.total_time
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        let tracker = self.occupancy(instance);
        for (time, count) in tracker.overloaded() {
            violations.push(Violation::new(
                ViolationType::CapacityExceeded,
                time as usize,
                format!(
                    "{count} treatments in progress at t={time} with {} responders",
                    instance.responders
                ),
            ));
        }

        violations
    }

    /// Whether [`Plan::verify`] finds nothing.
    pub fn is_feasible(&self, instance: &TriageInstance) -> bool {
        self.verify(instance).is_empty()
    }
}

/// The externally visible result of a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationResult {
    /// Chosen assignments; `time` is the start time.
    pub assignments: Vec<Assignment>,
    /// Patients whose final probability is above 50.
    pub survivors: usize,
    /// Sum of final probabilities.
    pub total_survival_probability: f64,
    /// Final probability per patient (not part of the wire record).
    #[serde(skip)]
    pub final_probabilities: Vec<f64>,
}

impl AllocationResult {
    /// The assignments as a [`Plan`].
    pub fn plan(&self) -> Plan {
        Plan::from_assignments(self.assignments.clone())
    }

    /// Serializes the wire record.
    pub fn to_json(&self) -> Result<String, AllocationError> {
        Ok(serde_json::to_string(self)?)
    }
}
