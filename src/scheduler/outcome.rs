//! Outcome aggregation.
//!
//! Turns a plan into final per-patient probabilities and the reported
//! metrics.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Final probability | max(untreated outcome, boosted value of any assignment) |
//! | Survivors | Patients with final probability > 50 |
//! | Total survival probability | Sum of final probabilities |
//!
//! The untreated outcome is the curve value at the horizon. A boosted
//! value is the curve value at the treatment start plus the boost,
//! capped at 100.

use crate::models::{
    is_survivor, AllocationResult, Assignment, Patient, Plan, Resource, TriageInstance,
};

/// Effect of one treatment on one patient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreatmentEffect {
    /// Resulting final probability (never below the untreated outcome).
    pub final_probability: f64,
    /// `final_probability - untreated outcome`, always >= 0.
    pub gain: f64,
    /// Change in survivor count versus leaving the patient untreated.
    pub survivor_delta: i64,
}

/// Computes outcomes from plans.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeAggregator;

impl OutcomeAggregator {
    /// Effect of treating `patient` with `resource` starting at `start`.
    ///
    /// Returns `None` if the curve is not sampled at `start`.
    pub fn treatment_effect(
        patient: &Patient,
        resource: &Resource,
        start: u32,
    ) -> Option<TreatmentEffect> {
        let boosted = patient.boosted_at(start, resource.boost)?;
        let untreated = patient.untreated_outcome();
        let final_probability = boosted.max(untreated);
        Some(TreatmentEffect {
            final_probability,
            gain: final_probability - untreated,
            survivor_delta: i64::from(is_survivor(final_probability))
                - i64::from(is_survivor(untreated)),
        })
    }

    /// Final probability of every patient under the given assignments.
    ///
    /// Assignments with unknown indices are ignored.
    pub fn final_probabilities(instance: &TriageInstance, assignments: &[Assignment]) -> Vec<f64> {
        let mut finals: Vec<f64> = instance
            .patients
            .iter()
            .map(Patient::untreated_outcome)
            .collect();

        for a in assignments {
            let (Some(patient), Some(resource)) =
                (instance.patients.get(a.patient), instance.resources.get(a.resource))
            else {
                continue;
            };
            if let Some(effect) = Self::treatment_effect(patient, resource, a.start) {
                finals[a.patient] = finals[a.patient].max(effect.final_probability);
            }
        }

        finals
    }

    /// Sum of final probabilities minus the untreated baseline.
    pub fn total_gain(instance: &TriageInstance, assignments: &[Assignment]) -> f64 {
        Self::final_probabilities(instance, assignments)
            .iter()
            .zip(&instance.patients)
            .map(|(f, p)| f - p.untreated_outcome())
            .sum()
    }

    /// Computes the reported result of a plan.
    pub fn aggregate(instance: &TriageInstance, plan: &Plan) -> AllocationResult {
        let final_probabilities = Self::final_probabilities(instance, &plan.assignments);
        let survivors = final_probabilities
            .iter()
            .filter(|&&p| is_survivor(p))
            .count();
        let total_survival_probability = final_probabilities.iter().sum();

        AllocationResult {
            assignments: plan.assignments.clone(),
            survivors,
            total_survival_probability,
            final_probabilities,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_instance() -> TriageInstance {
        TriageInstance::new(2, 2)
            .with_patient(Patient::new(vec![30.0, 30.0, 30.0]))
            .with_patient(Patient::new(vec![90.0, 70.0, 55.0]))
            .with_patient(Patient::new(vec![20.0, 40.0, 60.0]))
            .with_resource(Resource::new(1, 40.0))
            .with_resource(Resource::new(2, 5.0))
    }

    #[test]
    fn test_treatment_effect() {
        let inst = sample_instance();
        let e = OutcomeAggregator::treatment_effect(&inst.patients[0], &Resource::new(1, 40.0), 0)
            .unwrap();
        assert!((e.final_probability - 70.0).abs() < 1e-10);
        assert!((e.gain - 40.0).abs() < 1e-10);
        assert_eq!(e.survivor_delta, 1);

        // Capped at 100
        let e = OutcomeAggregator::treatment_effect(&inst.patients[1], &Resource::new(1, 40.0), 0)
            .unwrap();
        assert!((e.final_probability - 100.0).abs() < 1e-10);
        assert!((e.gain - 45.0).abs() < 1e-10);
        assert_eq!(e.survivor_delta, 0);

        assert!(
            OutcomeAggregator::treatment_effect(&inst.patients[0], &Resource::new(1, 40.0), 3)
                .is_none()
        );
    }

    #[test]
    fn test_boost_below_untreated_outcome_has_no_effect() {
        // Improving curve: treating early yields 25 < 60 at the horizon
        let inst = sample_instance();
        let e = OutcomeAggregator::treatment_effect(&inst.patients[2], &Resource::new(2, 5.0), 0)
            .unwrap();
        assert!((e.final_probability - 60.0).abs() < 1e-10);
        assert!(e.gain.abs() < 1e-10);
        assert_eq!(e.survivor_delta, 0);
    }

    #[test]
    fn test_aggregate_untreated() {
        let inst = sample_instance();
        let result = OutcomeAggregator::aggregate(&inst, &Plan::new());
        assert_eq!(result.final_probabilities, vec![30.0, 55.0, 60.0]);
        assert_eq!(result.survivors, 2);
        assert!((result.total_survival_probability - 145.0).abs() < 1e-10);
        assert!(result.assignments.is_empty());
    }

    #[test]
    fn test_aggregate_with_assignments() {
        let inst = sample_instance();
        let plan = Plan::from_assignments(vec![Assignment::new(0, 0, 1), Assignment::new(1, 1, 0)]);
        let result = OutcomeAggregator::aggregate(&inst, &plan);
        // p0: 30+40=70, p1: 90+5=95, p2 untreated 60
        assert_eq!(result.final_probabilities, vec![70.0, 95.0, 60.0]);
        assert_eq!(result.survivors, 3);
        assert!((result.total_survival_probability - 225.0).abs() < 1e-10);
        assert!((OutcomeAggregator::total_gain(&inst, &plan.assignments) - 80.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregate_ignores_unknown_indices() {
        let inst = sample_instance();
        let plan = Plan::from_assignments(vec![Assignment::new(9, 0, 0), Assignment::new(0, 9, 0)]);
        let result = OutcomeAggregator::aggregate(&inst, &plan);
        assert_eq!(result.final_probabilities, vec![30.0, 55.0, 60.0]);
    }
}
