//! Plan reconstruction.
//!
//! Recovers the concrete assignments of the optimal plan from the DP
//! table and the path arena: pick the best cell of the last time row
//! (not all responders need to be used, so every commitment column is a
//! candidate), then follow parent links back to the first treatment.
//!
//! The recovered plan is re-scored with the outcome rule; a plan that
//! does not reproduce the recorded value is reported as an error rather
//! than returned.

use super::outcome::OutcomeAggregator;
use super::table::{CellValue, DpTable, NodeId, PathArena};
use super::tie_break::{AssignmentKey, Candidate, TieBreaker};
use crate::error::AllocationError;
use crate::models::{Plan, TriageInstance};

/// A plan recovered from the DP state.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// The recovered assignments, in tie-break order.
    pub plan: Plan,
    /// Recorded gain over the untreated baseline.
    pub gain: f64,
    /// Recorded survivor delta over the untreated baseline.
    pub survivors: i64,
    /// Commitment column the plan was read from.
    pub commitments: usize,
}

/// Walks the DP state backward.
#[derive(Debug, Clone, Copy)]
pub struct PlanReconstructor<'a> {
    table: &'a DpTable,
    arena: &'a PathArena,
    tie_breaker: TieBreaker,
}

impl<'a> PlanReconstructor<'a> {
    /// Creates a reconstructor over a filled table.
    pub fn new(table: &'a DpTable, arena: &'a PathArena, tie_breaker: TieBreaker) -> Self {
        Self {
            table,
            arena,
            tie_breaker,
        }
    }

    /// Keys of every treatment on the chain ending at `node`, sorted.
    pub fn path_keys(&self, node: Option<NodeId>) -> Result<Vec<AssignmentKey>, AllocationError> {
        let mut keys = Vec::new();
        let mut cursor = node;
        while let Some(id) = cursor {
            let step = self.arena.get(id)?;
            keys.push(step.key);
            cursor = step.parent;
        }
        keys.sort_unstable();
        Ok(keys)
    }

    /// Best cell of the horizon row as `(commitments, value, keys)`.
    ///
    /// Falls back to the empty plan when the row is unreached.
    pub fn best_terminal(&self) -> Result<(usize, CellValue, Vec<AssignmentKey>), AllocationError> {
        let mut best: Option<(usize, CellValue, Vec<AssignmentKey>)> = None;

        for (r, value) in self.table.row(self.table.horizon())? {
            let keys = self.path_keys(value.node)?;
            let better = match &best {
                None => true,
                Some((_, best_value, best_keys)) => self.tie_breaker.prefers(
                    &Candidate {
                        gain: value.gain,
                        survivors: value.survivors,
                        keys: &keys,
                    },
                    &Candidate {
                        gain: best_value.gain,
                        survivors: best_value.survivors,
                        keys: best_keys,
                    },
                ),
            };
            if better {
                best = Some((r, value, keys));
            }
        }

        Ok(best.unwrap_or_else(|| (0, CellValue::empty(), Vec::new())))
    }

    /// Recovers the optimal plan and checks it against the recorded value.
    pub fn reconstruct(&self, instance: &TriageInstance) -> Result<Reconstruction, AllocationError> {
        let (commitments, value, keys) = self.best_terminal()?;
        let assignments: Vec<_> = keys.iter().map(AssignmentKey::assignment).collect();

        let recomputed = OutcomeAggregator::total_gain(instance, &assignments);
        // Sums are accumulated in a different order here than along the path
        let tolerance = self.tie_breaker.epsilon() * (assignments.len() as f64 + 1.0);
        if (recomputed - value.gain).abs() > tolerance {
            return Err(AllocationError::Reconstruction {
                recorded: value.gain,
                recomputed,
            });
        }

        Ok(Reconstruction {
            plan: Plan::from_assignments(assignments),
            gain: value.gain,
            survivors: value.survivors,
            commitments,
        })
    }
}
