//! Deterministic ordering of candidate plans.
//!
//! Candidates are compared sequentially, moving to the next criterion
//! only on a tie:
//!
//! 1. Higher aggregate gain, quantized to multiples of `epsilon`
//! 2. Higher survivor count
//! 3. Assignment sequence, lexicographically, each assignment keyed by
//!    (earlier start, earlier completion, lower patient, lower resource)
//!
//! Criterion 3 makes the order total, so neither the planner nor the
//! reconstructor ever depends on iteration order.

use std::cmp::Ordering;

use crate::models::Assignment;

/// Sort key of one assignment; field order is the comparison order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssignmentKey {
    /// Start time.
    pub start: u32,
    /// Completion time (exclusive).
    pub end: u32,
    /// Patient index.
    pub patient: usize,
    /// Resource index.
    pub resource: usize,
}

impl AssignmentKey {
    /// Keys an assignment whose resource takes `duration` units.
    pub fn new(assignment: &Assignment, duration: u32) -> Self {
        Self {
            start: assignment.start,
            end: assignment.start.saturating_add(duration),
            patient: assignment.patient,
            resource: assignment.resource,
        }
    }

    /// The assignment this key describes.
    pub fn assignment(&self) -> Assignment {
        Assignment::new(self.patient, self.resource, self.start)
    }
}

/// A (possibly partial) plan as seen by the tie-breaker.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Sum of gains over the untreated baseline.
    pub gain: f64,
    /// Survivor count relative to the untreated baseline.
    pub survivors: i64,
    /// Assignment keys, sorted ascending.
    pub keys: &'a [AssignmentKey],
}

/// Compares candidates; `Ordering::Less` means the first is preferred.
#[derive(Debug, Clone, Copy)]
pub struct TieBreaker {
    epsilon: f64,
}

impl TieBreaker {
    /// Creates a tie-breaker with the given score tolerance.
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Score tolerance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Total order over candidates, best first.
    pub fn compare(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> Ordering {
        self.compare_gain(b.gain, a.gain)
            .then_with(|| b.survivors.cmp(&a.survivors))
            .then_with(|| a.keys.cmp(b.keys))
    }

    /// Ascending order of gains, equal when they fall in the same
    /// `epsilon` bucket.
    ///
    /// Bucketing keeps the relation transitive, which a plain
    /// `|a - b| <= epsilon` test is not.
    pub fn compare_gain(&self, a: f64, b: f64) -> Ordering {
        if self.epsilon > 0.0 {
            let (qa, qb) = ((a / self.epsilon).round(), (b / self.epsilon).round());
            if qa.is_finite() && qb.is_finite() {
                return qa.total_cmp(&qb);
            }
        }
        a.total_cmp(&b)
    }

    /// Whether `a` is strictly preferred over `b`.
    pub fn prefers(&self, a: &Candidate<'_>, b: &Candidate<'_>) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(start: u32, end: u32, patient: usize, resource: usize) -> AssignmentKey {
        AssignmentKey {
            start,
            end,
            patient,
            resource,
        }
    }

    fn cand(gain: f64, survivors: i64, keys: &[AssignmentKey]) -> Candidate<'_> {
        Candidate {
            gain,
            survivors,
            keys,
        }
    }

    #[test]
    fn test_gain_first() {
        let tb = TieBreaker::new(1e-9);
        let k = [key(0, 1, 0, 0)];
        assert!(tb.prefers(&cand(10.0, 0, &k), &cand(5.0, 3, &k)));
        assert!(!tb.prefers(&cand(5.0, 3, &k), &cand(10.0, 0, &k)));
    }

    #[test]
    fn test_epsilon_ties_fall_through_to_survivors() {
        let tb = TieBreaker::new(1e-6);
        let k = [key(0, 1, 0, 0)];
        assert!(tb.prefers(&cand(10.0, 1, &k), &cand(10.0 + 1e-9, 0, &k)));
    }

    #[test]
    fn test_earlier_start_then_completion() {
        let tb = TieBreaker::new(1e-9);
        let early = [key(0, 2, 1, 1)];
        let late = [key(1, 2, 0, 0)];
        assert!(tb.prefers(&cand(5.0, 0, &early), &cand(5.0, 0, &late)));

        let short = [key(0, 1, 0, 1)];
        let long = [key(0, 2, 0, 0)];
        assert!(tb.prefers(&cand(5.0, 0, &short), &cand(5.0, 0, &long)));
    }

    #[test]
    fn test_patient_then_resource() {
        let tb = TieBreaker::new(1e-9);
        let p0 = [key(0, 1, 0, 1)];
        let p1 = [key(0, 1, 1, 0)];
        assert!(tb.prefers(&cand(5.0, 0, &p0), &cand(5.0, 0, &p1)));

        let r0 = [key(0, 1, 0, 0)];
        assert!(tb.prefers(&cand(5.0, 0, &r0), &cand(5.0, 0, &p0)));
    }

    #[test]
    fn test_gain_order_is_transitive_near_epsilon() {
        // Within tolerance pairwise, but a and c are almost 2 * eps apart
        let tb = TieBreaker::new(1e-3);
        let (a, b, c) = (1.0, 1.0009, 1.0018);
        assert_eq!(tb.compare_gain(a, b), Ordering::Less);
        assert_eq!(tb.compare_gain(b, c), Ordering::Less);
        assert_eq!(tb.compare_gain(a, c), Ordering::Less);
    }

    #[test]
    fn test_sorting_many_close_gains_is_consistent() {
        let tb = TieBreaker::new(1e-6);
        let keys = [key(0, 1, 0, 0)];
        let gains: Vec<f64> = (0..500).map(|i| 10.0 + (i % 37) as f64 * 4e-7).collect();
        let mut cands: Vec<Candidate<'_>> = gains.iter().map(|&g| cand(g, 0, &keys)).collect();
        cands.sort_by(|x, y| tb.compare(x, y));
        for pair in cands.windows(2) {
            assert_ne!(tb.compare(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_zero_epsilon_uses_exact_order() {
        let tb = TieBreaker::new(0.0);
        assert_eq!(tb.compare_gain(1.0, 1.0 + 1e-15), Ordering::Less);
        assert_eq!(tb.compare_gain(2.0, 2.0), Ordering::Equal);
    }

    #[test]
    fn test_identical_candidates_are_equal() {
        let tb = TieBreaker::new(1e-9);
        let k = [key(0, 1, 0, 0)];
        assert_eq!(tb.compare(&cand(5.0, 1, &k), &cand(5.0, 1, &k)), Ordering::Equal);
        assert!(!tb.prefers(&cand(5.0, 1, &k), &cand(5.0, 1, &k)));
    }

    #[test]
    fn test_key_round_trip_to_assignment() {
        let a = Assignment::new(3, 1, 4);
        let k = AssignmentKey::new(&a, 2);
        assert_eq!(k.end, 6);
        assert_eq!(k.assignment(), a);
    }
}
