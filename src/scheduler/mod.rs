//! Triage allocation engine.
//!
//! Components, leaf-first:
//!
//! - [`CapacityTracker`]: per-instant responder occupancy
//! - [`DpTable`] / [`PathArena`]: flat arenas for values and backtracking
//! - [`TieBreaker`]: the total order that makes every choice deterministic
//! - [`GainBound`]: optimistic remaining gain, for pruning against the
//!   best plan seen so far
//! - [`AllocationPlanner`]: the time-indexed DP over (time, commitments)
//! - [`PlanReconstructor`]: recovers assignments from the DP state
//! - [`OutcomeAggregator`]: final probabilities, survivors, total
//!
//! Data flows planner → reconstructor → aggregator. Responder capacity is
//! a simulated constraint checked on data; the engine runs as a single
//! sequential pass.
//!
//! # References
//!
//! - Bellman (1957), "Dynamic Programming"
//! - Irnich & Desaulniers (2005), "Shortest Path Problems with Resource
//!   Constraints" (label dominance)

mod bound;
mod capacity;
mod config;
mod outcome;
mod planner;
mod reconstruct;
mod table;
mod tie_break;

pub use bound::GainBound;
pub use capacity::CapacityTracker;
pub use config::{PlannerConfig, DEFAULT_EPSILON, DEFAULT_MAX_LABELS_PER_CELL};
pub use outcome::{OutcomeAggregator, TreatmentEffect};
pub use planner::{AllocationPlanner, PlanStats, PlannedAllocation};
pub use reconstruct::{PlanReconstructor, Reconstruction};
pub use table::{CellValue, DpTable, NodeId, PathArena, PathNode};
pub use tie_break::{AssignmentKey, Candidate, TieBreaker};
