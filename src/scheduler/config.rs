//! Planner configuration.

use serde::{Deserialize, Serialize};

/// Per-cell cap used by [`PlannerConfig::capped`].
pub const DEFAULT_MAX_LABELS_PER_CELL: usize = 256;

/// Default tolerance for comparing probability sums.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Tuning knobs for [`AllocationPlanner`](super::AllocationPlanner).
///
/// The default search is exact. Setting `max_labels_per_cell` turns it
/// into a heuristic: once a cell holds more non-dominated partial plans
/// than the cap, the weakest ones (by the tie-break order) are dropped
/// and a warning is logged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Cap on partial plans per DP cell; `None` = unbounded (exact).
    pub max_labels_per_cell: Option<usize>,
    /// Scores closer than this are considered tied.
    pub epsilon: f64,
}

impl PlannerConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// An unbounded, exact configuration (same as the default).
    pub fn exact() -> Self {
        Self::default().with_max_labels_per_cell(None)
    }

    /// A heuristic configuration capped at [`DEFAULT_MAX_LABELS_PER_CELL`].
    pub fn capped() -> Self {
        Self::default().with_max_labels_per_cell(Some(DEFAULT_MAX_LABELS_PER_CELL))
    }

    /// Sets the per-cell label cap.
    pub fn with_max_labels_per_cell(mut self, max: Option<usize>) -> Self {
        // A zero cap would discard even the empty plan
        self.max_labels_per_cell = max.map(|m| m.max(1));
        self
    }

    /// Sets the score comparison tolerance.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon.abs();
        self
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_labels_per_cell: None,
            epsilon: DEFAULT_EPSILON,
        }
    }
}
