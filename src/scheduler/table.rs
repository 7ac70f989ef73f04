//! Flat arenas backing the dynamic program.
//!
//! - [`DpTable`]: the value table `V[t][r]`, stored row-major as
//!   `t * stride + r` with bounds-checked accessors.
//! - [`PathArena`]: the backtracking store. Every committed treatment is
//!   a node pointing at the node of the partial plan it extended, so a
//!   plan is a parent chain and sharing prefixes costs nothing.

use super::tie_break::AssignmentKey;
use crate::error::AllocationError;

/// Index of a node in a [`PathArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena position.
    pub fn index(self) -> usize {
        self.0
    }
}

/// One committed treatment and the partial plan it extends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathNode {
    /// Previous treatment in the chain; `None` for the first one.
    pub parent: Option<NodeId>,
    /// The treatment committed at this step.
    pub key: AssignmentKey,
}

/// Append-only store of path nodes.
#[derive(Debug, Clone, Default)]
pub struct PathArena {
    nodes: Vec<PathNode>,
}

impl PathArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    pub fn push(&mut self, parent: Option<NodeId>, key: AssignmentKey) -> NodeId {
        self.nodes.push(PathNode { parent, key });
        NodeId(self.nodes.len() - 1)
    }

    /// Looks up a node.
    pub fn get(&self, id: NodeId) -> Result<&PathNode, AllocationError> {
        self.nodes
            .get(id.0)
            .ok_or(AllocationError::UnknownNode(id.0))
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Best value recorded for one DP cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellValue {
    /// Aggregate gain over the untreated baseline.
    pub gain: f64,
    /// Survivor count relative to the untreated baseline.
    pub survivors: i64,
    /// Last treatment of the partial plan; `None` for the empty plan.
    pub node: Option<NodeId>,
}

impl CellValue {
    /// The empty plan.
    pub fn empty() -> Self {
        Self {
            gain: 0.0,
            survivors: 0,
            node: None,
        }
    }
}

/// Value table `V[t][r]` for `t ∈ [0, horizon]`, `r ∈ [0, max_commitments]`.
///
/// `r` counts treatments committed so far. Unreached cells hold `None`.
#[derive(Debug, Clone)]
pub struct DpTable {
    horizon: u32,
    stride: usize,
    cells: Vec<Option<CellValue>>,
}

impl DpTable {
    /// Allocates an empty table.
    pub fn new(horizon: u32, max_commitments: usize) -> Self {
        let stride = max_commitments + 1;
        Self {
            horizon,
            stride,
            cells: vec![None; (horizon as usize + 1) * stride],
        }
    }

    /// Last time row.
    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Largest commitment column.
    pub fn max_commitments(&self) -> usize {
        self.stride - 1
    }

    fn index(&self, time: u32, commitments: usize) -> Result<usize, AllocationError> {
        if time > self.horizon || commitments >= self.stride {
            return Err(AllocationError::TableIndex { time, commitments });
        }
        Ok(time as usize * self.stride + commitments)
    }

    /// Reads `V[time][commitments]`.
    pub fn get(&self, time: u32, commitments: usize) -> Result<Option<CellValue>, AllocationError> {
        let i = self.index(time, commitments)?;
        Ok(self.cells[i])
    }

    /// Writes `V[time][commitments]`.
    pub fn set(
        &mut self,
        time: u32,
        commitments: usize,
        value: CellValue,
    ) -> Result<(), AllocationError> {
        let i = self.index(time, commitments)?;
        self.cells[i] = Some(value);
        Ok(())
    }

    /// Reached cells of row `time` as `(commitments, value)`.
    pub fn row(
        &self,
        time: u32,
    ) -> Result<impl Iterator<Item = (usize, CellValue)> + '_, AllocationError> {
        let start = self.index(time, 0)?;
        Ok(self.cells[start..start + self.stride]
            .iter()
            .enumerate()
            .filter_map(|(r, cell)| cell.map(|v| (r, v))))
    }
}
