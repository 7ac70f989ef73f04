//! Time-indexed dynamic-programming allocation planner.
//!
//! # Algorithm
//!
//! State `(t, r)`: frontier time `t ∈ [0, horizon]` and `r` treatments
//! committed so far, every one of them starting at or before `t`.
//! A cell holds *labels*: non-dominated partial plans, each carrying its
//! gain, survivor delta, treated-patient set and responder occupancy
//! ([`CapacityTracker`]).
//!
//! Transitions out of a label in `(t, r)`:
//!
//! 1. **Treat**: start resource `k` on untreated patient `p` at `t` if
//!    `t + duration(k) ≤ horizon` and the tracker has a free responder for
//!    the whole interval → `(t, r + 1)`. Several treatments may start at
//!    the same `t` (one per free responder); they are generated in
//!    increasing patient order so each set is built once.
//! 2. **Advance**: move the frontier to `(t + 1, r)` unchanged.
//!
//! The recurrence accumulates *gain* (the final probability of the
//! treated patient minus its untreated outcome), so every patient's
//! baseline is counted exactly once, by the outcome aggregator.
//!
//! # Pruning
//!
//! Every label is itself a complete plan (advance it to the horizon), so
//! the best label seen so far is an incumbent. A new label is dropped when
//!
//! - its gain plus the [`GainBound`] on what it can still add ranks below
//!   the incumbent's gain, or
//! - it can start nothing more and the incumbent beats it in tie-break
//!   order, or
//! - another label in the same cell is at least as good by the tie-break
//!   order, has treated a subset of its patients, is nowhere busier from
//!   `t` on, and is no more restricted in which patients may still start
//!   at `t`.
//!
//! None of these can discard the optimum, so the search is exact. An
//! optional per-cell cap turns it into a heuristic for very large
//! instances; the incumbent is re-inserted into the horizon row so a
//! capped search never returns less than the best plan it has seen.
//!
//! `V[t][r]` records the best label of each cell; the plan is recovered
//! from the best cell of row `horizon` by [`PlanReconstructor`].
//!
//! # Complexity
//! O(H · R · L · P · K) label extensions, where H = horizon, R = commitment
//! bound, L = labels per cell, P = patients, K = resources.

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use super::bound::GainBound;
use super::capacity::CapacityTracker;
use super::config::PlannerConfig;
use super::outcome::OutcomeAggregator;
use super::reconstruct::PlanReconstructor;
use super::table::{CellValue, DpTable, NodeId, PathArena};
use super::tie_break::{AssignmentKey, Candidate, TieBreaker};
use crate::error::AllocationError;
use crate::models::{AllocationResult, Plan, TriageInstance};
use crate::validation::validate_instance;

/// Counters collected during one planning run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanStats {
    /// Labels created by treat transitions.
    pub labels_generated: usize,
    /// Labels discarded as dominated.
    pub labels_pruned: usize,
    /// Labels discarded because they cannot beat the incumbent.
    pub labels_bounded: usize,
    /// Cells that hit the label cap.
    pub truncated_cells: usize,
    /// Nodes in the path arena.
    pub path_nodes: usize,
}

/// The planner's answer before outcome aggregation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedAllocation {
    /// The optimal plan.
    pub plan: Plan,
    /// Gain over the untreated baseline.
    pub gain: f64,
    /// Sum of every patient's untreated outcome.
    pub baseline: f64,
    /// Survivor count change over the untreated baseline.
    pub survivors_delta: i64,
    /// Whether the search was exhaustive (no cell hit the label cap).
    pub exact: bool,
    /// Search counters.
    pub stats: PlanStats,
}

impl PlannedAllocation {
    /// Total survival probability of the plan.
    pub fn score(&self) -> f64 {
        self.baseline + self.gain
    }

    fn untreated(instance: &TriageInstance) -> Self {
        Self {
            plan: Plan::new(),
            gain: 0.0,
            baseline: instance.baseline_total(),
            survivors_delta: 0,
            exact: true,
            stats: PlanStats::default(),
        }
    }
}

/// One feasible, beneficial (patient, resource) start at a given time.
#[derive(Debug, Clone, Copy)]
struct TreatmentOption {
    patient: usize,
    resource: usize,
    duration: u32,
    gain: f64,
    survivor_delta: i64,
}

/// A partial plan stored in a DP cell.
#[derive(Debug, Clone)]
struct Label {
    gain: f64,
    survivors: i64,
    treated: Vec<bool>,
    tracker: CapacityTracker,
    keys: Vec<AssignmentKey>,
    node: Option<NodeId>,
    /// Highest patient started at the current frontier time.
    last_started: Option<usize>,
}

impl Label {
    fn root(patients: usize, capacity: u32, horizon: u32) -> Self {
        Self {
            gain: 0.0,
            survivors: 0,
            treated: vec![false; patients],
            tracker: CapacityTracker::new(capacity, horizon),
            keys: Vec::new(),
            node: None,
            last_started: None,
        }
    }

    fn candidate(&self) -> Candidate<'_> {
        Candidate {
            gain: self.gain,
            survivors: self.survivors,
            keys: &self.keys,
        }
    }

    fn cell_value(&self) -> CellValue {
        CellValue {
            gain: self.gain,
            survivors: self.survivors,
            node: self.node,
        }
    }

    fn may_start(&self, option: &TreatmentOption) -> bool {
        !self.treated[option.patient] && self.last_started.map_or(true, |p| option.patient > p)
    }

    fn dominates(&self, other: &Label, time: u32, tie_breaker: &TieBreaker) -> bool {
        self.last_started <= other.last_started
            && tie_breaker.compare(&self.candidate(), &other.candidate()) != Ordering::Greater
            && self
                .treated
                .iter()
                .zip(&other.treated)
                .all(|(&mine, &theirs)| !mine || theirs)
            && self.tracker.is_no_busier_from(&other.tracker, time)
    }

    /// Starts `option` at `time`.
    ///
    /// The returned label still points at this label's path node; the
    /// returned key is committed to the arena only if the label is kept.
    fn extend(&self, option: &TreatmentOption, time: u32) -> Option<(Label, AssignmentKey)> {
        let mut tracker = self.tracker.clone();
        if !tracker.reserve(time, option.duration) {
            return None;
        }

        let key = AssignmentKey {
            start: time,
            end: time + option.duration,
            patient: option.patient,
            resource: option.resource,
        };

        let mut treated = self.treated.clone();
        treated[option.patient] = true;
        let mut keys = self.keys.clone();
        let pos = keys.partition_point(|k| k < &key);
        keys.insert(pos, key);

        let label = Label {
            gain: self.gain + option.gain,
            survivors: self.survivors + option.survivor_delta,
            treated,
            tracker,
            keys,
            node: self.node,
            last_started: Some(option.patient),
        };
        Some((label, key))
    }

    fn advance(mut self) -> Label {
        self.last_started = None;
        self
    }
}

/// Mutable state of one search run.
struct Search {
    tie_breaker: TieBreaker,
    bound: GainBound,
    arena: PathArena,
    stats: PlanStats,
    /// Best plan seen so far and the commitment column it belongs to.
    incumbent: Option<(usize, Label)>,
}

impl Search {
    /// Inserts `label` into `cell` unless it is bounded out or dominated.
    ///
    /// `step` is the treatment that produced the label, if any; its path
    /// node is created only when the label is kept.
    fn offer(
        &mut self,
        cell: &mut Vec<Label>,
        mut label: Label,
        step: Option<AssignmentKey>,
        time: u32,
        commitments: usize,
    ) {
        if self.cannot_improve(&label, time) {
            self.stats.labels_bounded += 1;
            return;
        }
        if cell
            .iter()
            .any(|existing| existing.dominates(&label, time, &self.tie_breaker))
        {
            self.stats.labels_pruned += 1;
            return;
        }

        if let Some(key) = step {
            label.node = Some(self.arena.push(label.node, key));
        }
        let before = cell.len();
        cell.retain(|existing| !label.dominates(existing, time, &self.tie_breaker));
        self.stats.labels_pruned += before - cell.len();

        self.record(&label, commitments);
        cell.push(label);
    }

    fn cannot_improve(&self, label: &Label, time: u32) -> bool {
        let Some((_, best)) = &self.incumbent else {
            return false;
        };
        match self.bound.remaining(&label.treated, &label.tracker, time) {
            // Nothing more can start: the label is its own final plan
            None => self
                .tie_breaker
                .prefers(&best.candidate(), &label.candidate()),
            Some(extra) => {
                self.tie_breaker.compare_gain(label.gain + extra, best.gain) == Ordering::Less
            }
        }
    }

    fn record(&mut self, label: &Label, commitments: usize) {
        let better = self.incumbent.as_ref().map_or(true, |(_, best)| {
            self.tie_breaker
                .prefers(&label.candidate(), &best.candidate())
        });
        if better {
            self.incumbent = Some((commitments, label.clone()));
        }
    }
}

/// Optimal triage allocation planner.
///
/// # Example
///
/// ```
/// use u_triage::models::{Patient, Resource, TriageInstance};
/// use u_triage::scheduler::AllocationPlanner;
///
/// let instance = TriageInstance::new(1, 2)
///     .with_patient(Patient::new(vec![30.0, 30.0, 30.0]))
///     .with_resource(Resource::new(1, 40.0));
///
/// let result = AllocationPlanner::new().allocate(&instance).unwrap();
/// assert_eq!(result.survivors, 1);
/// assert_eq!(result.assignments.len(), 1);
/// assert_eq!(result.assignments[0].start, 0);
/// assert!((result.total_survival_probability - 70.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AllocationPlanner {
    config: PlannerConfig,
}

impl AllocationPlanner {
    /// Creates a planner with the default (exact) configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans and aggregates the outcome.
    pub fn allocate(&self, instance: &TriageInstance) -> Result<AllocationResult, AllocationError> {
        let planned = self.plan(instance)?;
        let result = OutcomeAggregator::aggregate(instance, &planned.plan);
        info!(
            assignments = result.assignments.len(),
            survivors = result.survivors,
            total = result.total_survival_probability,
            exact = planned.exact,
            "triage allocation complete"
        );
        Ok(result)
    }

    /// Computes an optimal plan.
    ///
    /// # Errors
    /// [`AllocationError::Invalid`] if the instance fails validation. Any
    /// other error indicates an internal inconsistency.
    pub fn plan(&self, instance: &TriageInstance) -> Result<PlannedAllocation, AllocationError> {
        validate_instance(instance).map_err(AllocationError::Invalid)?;

        let horizon = instance.total_time;
        let patients = instance.patients.len();

        // Nothing is sized by the horizon before this point
        if instance.is_degenerate() {
            debug!(
                patients,
                resources = instance.resources.len(),
                responders = instance.responders,
                horizon,
                "degenerate instance, no assignment possible"
            );
            return Ok(PlannedAllocation::untreated(instance));
        }

        let max_commitments =
            patients.min((instance.responders as usize).saturating_mul(horizon as usize));
        let options = self.treatment_options(instance);
        let min_duration = instance
            .resources
            .iter()
            .map(|(_, r)| r.duration)
            .min()
            .unwrap_or(0);
        let gains: Vec<Vec<(usize, f64)>> = options
            .iter()
            .map(|at_t| at_t.iter().map(|o| (o.patient, o.gain)).collect())
            .collect();

        let mut table = DpTable::new(horizon, max_commitments);
        let mut search = Search {
            tie_breaker: TieBreaker::new(self.config.epsilon),
            bound: GainBound::new(patients, min_duration, &gains),
            arena: PathArena::new(),
            stats: PlanStats::default(),
            incumbent: None,
        };

        let mut frontier: Vec<Vec<Label>> = vec![Vec::new(); max_commitments + 1];
        search.offer(
            &mut frontier[0],
            Label::root(patients, instance.responders, horizon),
            None,
            0,
            0,
        );

        for t in 0..=horizon {
            if t == horizon {
                if let Some((r, best)) = search.incumbent.clone() {
                    search.offer(&mut frontier[r], best.advance(), None, t, r);
                }
            }

            let starts = options.get(t as usize).map(Vec::as_slice).unwrap_or(&[]);
            let mut next: Vec<Vec<Label>> = vec![Vec::new(); max_commitments + 1];
            let mut alive = 0;

            for r in 0..=max_commitments {
                let mut cell = std::mem::take(&mut frontier[r]);
                if cell.is_empty() {
                    continue;
                }
                self.enforce_cap(&mut cell, &search.tie_breaker, t, r, &mut search.stats);
                alive += cell.len();

                if let Some(best) = cell
                    .iter()
                    .min_by(|a, b| search.tie_breaker.compare(&a.candidate(), &b.candidate()))
                {
                    table.set(t, r, best.cell_value())?;
                }

                if t == horizon {
                    continue;
                }

                if r < max_commitments {
                    for label in &cell {
                        for option in starts.iter().filter(|o| label.may_start(o)) {
                            if let Some((extended, key)) = label.extend(option, t) {
                                search.stats.labels_generated += 1;
                                search.offer(&mut frontier[r + 1], extended, Some(key), t, r + 1);
                            }
                        }
                    }
                }

                for label in cell {
                    search.offer(&mut next[r], label.advance(), None, t + 1, r);
                }
            }

            debug!(time = t, labels = alive, "frontier stage complete");
            frontier = next;
        }

        let Search {
            tie_breaker,
            arena,
            mut stats,
            ..
        } = search;
        stats.path_nodes = arena.len();
        let reconstruction =
            PlanReconstructor::new(&table, &arena, tie_breaker).reconstruct(instance)?;
        debug_assert!(reconstruction.plan.is_feasible(instance));

        debug!(
            generated = stats.labels_generated,
            pruned = stats.labels_pruned,
            bounded = stats.labels_bounded,
            truncated = stats.truncated_cells,
            path_nodes = stats.path_nodes,
            commitments = reconstruction.commitments,
            "planning search complete"
        );

        Ok(PlannedAllocation {
            plan: reconstruction.plan,
            gain: reconstruction.gain,
            baseline: instance.baseline_total(),
            survivors_delta: reconstruction.survivors,
            exact: stats.truncated_cells == 0,
            stats,
        })
    }

    /// Beneficial treatment starts per time unit, ordered by patient then
    /// resource.
    fn treatment_options(&self, instance: &TriageInstance) -> Vec<Vec<TreatmentOption>> {
        let horizon = instance.total_time;

        (0..horizon)
            .map(|t| {
                let mut at_t = Vec::new();
                for (p, patient) in instance.patients.iter().enumerate() {
                    for (k, resource) in instance.resources.usable_at(t, horizon) {
                        let Some(effect) = OutcomeAggregator::treatment_effect(patient, resource, t)
                        else {
                            continue;
                        };
                        if effect.gain > self.config.epsilon {
                            at_t.push(TreatmentOption {
                                patient: p,
                                resource: k,
                                duration: resource.duration,
                                gain: effect.gain,
                                survivor_delta: effect.survivor_delta,
                            });
                        }
                    }
                }
                at_t
            })
            .collect()
    }

    fn enforce_cap(
        &self,
        cell: &mut Vec<Label>,
        tie_breaker: &TieBreaker,
        time: u32,
        commitments: usize,
        stats: &mut PlanStats,
    ) {
        let Some(max) = self.config.max_labels_per_cell else {
            return;
        };
        if cell.len() <= max {
            return;
        }

        cell.sort_by(|a, b| tie_breaker.compare(&a.candidate(), &b.candidate()));
        cell.truncate(max);
        stats.truncated_cells += 1;
        if stats.truncated_cells == 1 {
            warn!(
                time,
                commitments,
                max_labels = max,
                "label cap reached, plan may be suboptimal"
            );
        }
    }
}
