//! Dependency edges, before and after merging.

use serde::{Deserialize, Serialize};

use super::{CellId, NodeId};

/// A parent reference as written in the trace: `parent` justified `child`
/// through a rule of `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RawEdge {
    pub parent: CellId,
    pub child: CellId,
    pub level: u8,
}

/// Edge between merged nodes. Never a self loop; unique per
/// `(from, to, level)`. Field order gives the canonical sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub from: NodeId,
    pub to: NodeId,
    pub level: u8,
}

impl DependencyEdge {
    /// `Lv3`-style label used by reports and the DOT exporter.
    pub fn level_label(&self) -> String {
        format!("Lv{}", self.level)
    }
}
