//! Merged node in the deduction graph.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{CellId, Height, ResultKind};

/// Node identifier: the smallest member cell of the merge group.
///
/// Every cell belongs to exactly one group, so the smallest member is unique
/// across the graph and stable across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn representative(&self) -> CellId {
        CellId(self.0)
    }
}

impl From<CellId> for NodeId {
    fn from(cell: CellId) -> Self {
        NodeId(cell.0)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g_{}", self.0)
    }
}

/// One or more cells sharing `(height, parents, result)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedNode {
    pub id: NodeId,
    /// Ascending, never empty.
    pub members: SmallVec<[CellId; 4]>,
    pub result: ResultKind,
    pub height: Height,
    pub rule_level: u8,
}

impl MergedNode {
    pub fn is_merged(&self) -> bool {
        self.members.len() > 1
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.members.binary_search(&cell).is_ok()
    }

    /// Comma-joined member cells, e.g. `"20,21"`.
    pub fn member_label(&self) -> String {
        self.members
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}
