//! Patient model (survival profile store).
//!
//! A patient is identified by its position in the instance and carries a
//! sampled survival-probability curve, one value per discrete time unit
//! from 0 to the horizon inclusive.
//!
//! # Time Representation
//! Time is measured in abstract, integral units relative to the moment the
//! triage plan starts (t=0). The consumer defines what one unit means.

use serde::{Deserialize, Serialize};

/// Upper bound of any survival probability (percentage points).
pub const MAX_PROBABILITY: f64 = 100.0;

/// A patient counts as a survivor iff its final probability is strictly above this.
pub const SURVIVAL_THRESHOLD: f64 = 50.0;

/// A patient awaiting treatment.
///
/// The curve is immutable input: boosting a patient produces a derived
/// value and never rewrites the curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patient {
    /// Survival probability (0..=100) at each time unit `0..=horizon`.
    pub curve: Vec<f64>,
}

impl Patient {
    /// Creates a patient from its survival curve.
    pub fn new(curve: impl Into<Vec<f64>>) -> Self {
        Self {
            curve: curve.into(),
        }
    }

    /// Creates a patient whose probability stays at `probability` for the whole horizon.
    pub fn constant(probability: f64, horizon: u32) -> Self {
        Self::new(vec![probability; horizon as usize + 1])
    }

    /// Survival probability at time `t`, if the curve is sampled there.
    #[inline]
    pub fn probability_at(&self, t: u32) -> Option<f64> {
        self.curve.get(t as usize).copied()
    }

    /// The natural outcome if the patient is never treated: the last sample.
    ///
    /// Returns 0.0 for an empty curve (rejected by validation).
    #[inline]
    pub fn untreated_outcome(&self) -> f64 {
        self.curve.last().copied().unwrap_or(0.0)
    }

    /// Probability at `t` after adding `boost`, capped at [`MAX_PROBABILITY`].
    pub fn boosted_at(&self, t: u32, boost: f64) -> Option<f64> {
        self.probability_at(t)
            .map(|p| (p + boost).min(MAX_PROBABILITY))
    }

    /// Number of sampled time units (horizon + 1 for a valid patient).
    pub fn sample_count(&self) -> usize {
        self.curve.len()
    }
}

/// Whether a final probability counts as a survivor.
#[inline]
pub fn is_survivor(probability: f64) -> bool {
    probability > SURVIVAL_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_lookup() {
        let p = Patient::new(vec![80.0, 60.0, 40.0]);
        assert_eq!(p.probability_at(0), Some(80.0));
        assert_eq!(p.probability_at(2), Some(40.0));
        assert_eq!(p.probability_at(3), None);
        assert_eq!(p.sample_count(), 3);
    }

    #[test]
    fn test_untreated_outcome_is_last_sample() {
        let p = Patient::new(vec![80.0, 60.0, 40.0]);
        assert!((p.untreated_outcome() - 40.0).abs() < 1e-10);
        assert!((Patient::new(Vec::new()).untreated_outcome() - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_boost_is_capped() {
        let p = Patient::new(vec![90.0, 30.0]);
        assert_eq!(p.boosted_at(0, 25.0), Some(MAX_PROBABILITY));
        assert_eq!(p.boosted_at(1, 25.0), Some(55.0));
        assert_eq!(p.boosted_at(2, 25.0), None);
        // The curve itself is untouched
        assert_eq!(p.curve, vec![90.0, 30.0]);
    }

    #[test]
    fn test_constant_patient() {
        let p = Patient::constant(30.0, 2);
        assert_eq!(p.curve, vec![30.0, 30.0, 30.0]);
    }

    #[test]
    fn test_survivor_threshold_is_strict() {
        assert!(!is_survivor(50.0));
        assert!(is_survivor(50.5));
        assert!(!is_survivor(30.0));
    }

    #[test]
    fn test_serde_is_plain_curve() {
        let p: Patient = serde_json::from_str("[10, 20.5, 30]").unwrap();
        assert_eq!(p.curve, vec![10.0, 20.5, 30.0]);
        assert_eq!(serde_json::to_string(&p).unwrap(), "[10.0,20.5,30.0]");
    }
}
