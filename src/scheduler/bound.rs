//! Optimistic bound on the gain a partial plan can still add.
//!
//! From frontier time `t` on, a partial plan adds at most one treatment
//! per untreated patient, and at most `idle / min_duration` treatments in
//! total, where `idle` is the free responder-time left from `t` on. The
//! sum of the largest per-patient gains over starts at or after `t`,
//! limited to that many patients, bounds every completion.

use super::capacity::CapacityTracker;

/// Per-time ranking of patients by their best gain from that time on.
#[derive(Debug, Clone, Default)]
pub struct GainBound {
    /// `ranked[t]` holds `(gain, patient)` for every patient that can still
    /// gain from `t` on, best first. Row `horizon` is always empty.
    ranked: Vec<Vec<(f64, usize)>>,
    min_duration: u32,
}

impl GainBound {
    /// Builds the ranking from the beneficial starts at each time unit.
    ///
    /// `starts[t]` lists `(patient, gain)` for every beneficial treatment
    /// starting at `t`; `starts.len()` is the horizon. `min_duration` is
    /// the shortest resource duration.
    pub fn new(patients: usize, min_duration: u32, starts: &[Vec<(usize, f64)>]) -> Self {
        let mut best = vec![0.0_f64; patients];
        let mut ranked = vec![Vec::new(); starts.len() + 1];

        for (t, at_t) in starts.iter().enumerate().rev() {
            for &(patient, gain) in at_t {
                if let Some(b) = best.get_mut(patient) {
                    *b = b.max(gain);
                }
            }
            let mut row: Vec<(f64, usize)> = best
                .iter()
                .enumerate()
                .filter(|&(_, &g)| g > 0.0)
                .map(|(p, &g)| (g, p))
                .collect();
            row.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
            ranked[t] = row;
        }

        Self {
            ranked,
            min_duration,
        }
    }

    /// Upper bound on the gain still addable from `time` on.
    ///
    /// Returns `None` when no further treatment can start at all: the plan
    /// is then final as it stands.
    pub fn remaining(&self, treated: &[bool], tracker: &CapacityTracker, time: u32) -> Option<f64> {
        let ranked = self.ranked.get(time as usize)?;
        if self.min_duration == 0 {
            return None;
        }
        let slots = tracker.idle_units_from(time) / u64::from(self.min_duration);
        let slots = usize::try_from(slots).unwrap_or(usize::MAX);

        let mut taken = 0;
        let mut sum = 0.0;
        for &(gain, patient) in ranked {
            if taken == slots {
                break;
            }
            if treated.get(patient).copied().unwrap_or(true) {
                continue;
            }
            sum += gain;
            taken += 1;
        }

        (taken > 0).then_some(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bound(min_duration: u32) -> GainBound {
        GainBound::new(
            3,
            min_duration,
            &[vec![(0, 50.0), (1, 30.0)], vec![(1, 30.0), (2, 10.0)]],
        )
    }

    #[test]
    fn test_sums_best_untreated_gains() {
        let bound = sample_bound(1);
        let tracker = CapacityTracker::new(1, 2);

        // Two free slots: p0 (50) + p1 (30)
        assert_eq!(bound.remaining(&[false; 3], &tracker, 0), Some(80.0));
        // p0 already treated: p1 (30) + p2 (10)
        assert_eq!(bound.remaining(&[true, false, false], &tracker, 0), Some(40.0));
        // From t=1 only one slot is left and p0 has nothing to gain
        assert_eq!(bound.remaining(&[false; 3], &tracker, 1), Some(30.0));
    }

    #[test]
    fn test_nothing_left_is_none() {
        let bound = sample_bound(1);
        let mut tracker = CapacityTracker::new(1, 2);
        assert_eq!(bound.remaining(&[false; 3], &tracker, 2), None);
        assert_eq!(bound.remaining(&[true; 3], &tracker, 0), None);

        assert!(tracker.reserve(0, 2));
        assert_eq!(bound.remaining(&[false; 3], &tracker, 0), None);
    }

    #[test]
    fn test_long_resources_limit_slots() {
        // Three idle units but every treatment needs two
        let bound = sample_bound(2);
        let mut tracker = CapacityTracker::new(2, 2);
        assert!(tracker.reserve(0, 1));
        assert_eq!(bound.remaining(&[false; 3], &tracker, 0), Some(50.0));
    }
}
