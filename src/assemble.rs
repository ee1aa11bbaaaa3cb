//! Dependency graph assembler.
//!
//! Rewrites cell-level parent references as edges between merged nodes.

use std::collections::BTreeSet;

use hashbrown::HashMap;

use crate::model::{CellId, DeductionFact, DependencyEdge, NodeId, RawEdge};

/// One raw edge per distinct parent of every edge-contributing fact.
pub fn raw_edges(facts: &[DeductionFact]) -> Vec<RawEdge> {
    facts
        .iter()
        .filter(|f| f.contributes_edges())
        .flat_map(|f| {
            f.parents.iter().map(move |&parent| RawEdge {
                parent,
                child: f.cell,
                level: f.rule_level,
            })
        })
        .collect()
}

/// Output of [`assemble`].
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    /// Deduplicated, sorted by `(from, to, level)`.
    pub edges: BTreeSet<DependencyEdge>,
    /// Raw edges with an endpoint that maps to no node.
    pub dangling: usize,
    /// Raw edges whose endpoints merged into the same node.
    pub self_loops: usize,
}

/// Map raw edges through `cell_to_node`, dropping dangling references and
/// merge-induced self loops.
pub fn assemble(raw: &[RawEdge], cell_to_node: &HashMap<CellId, NodeId>) -> Assembly {
    let mut out = Assembly::default();

    for edge in raw {
        let (Some(&from), Some(&to)) = (cell_to_node.get(&edge.parent), cell_to_node.get(&edge.child)) else {
            tracing::debug!(parent = %edge.parent, child = %edge.child, "dropping dangling reference");
            out.dangling += 1;
            continue;
        };
        if from == to {
            out.self_loops += 1;
            continue;
        }
        out.edges.insert(DependencyEdge { from, to, level: edge.level });
    }

    out
}
