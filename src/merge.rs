//! Sibling merge engine.
//!
//! Cells that share the same justification (same height, same parent set,
//! same result) are drawn as one node. Height-0 cells are initial hints and
//! always stay alone.

use std::collections::{BTreeMap, BTreeSet};

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::model::{CellId, Height, HeightedFact, MergedNode, NodeId, ResultKind};

/// Grouping key. Two cells merge iff their keys are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MergeKey {
    Sibling {
        height: Height,
        parents: BTreeSet<CellId>,
        result: ResultKind,
    },
    Singleton(CellId),
}

impl MergeKey {
    fn of(fact: &HeightedFact, enabled: bool) -> Self {
        if !enabled || fact.height.is_zero() {
            return MergeKey::Singleton(fact.cell());
        }
        MergeKey::Sibling {
            height: fact.height,
            parents: fact.fact.parents.clone(),
            result: fact.fact.result,
        }
    }
}

/// Output of [`merge_siblings`].
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    /// Keyed and ordered by node id.
    pub nodes: BTreeMap<NodeId, MergedNode>,
    pub cell_to_node: HashMap<CellId, NodeId>,
    /// Groups whose members disagreed on rule level.
    pub level_conflicts: usize,
}

/// Partition `facts` into merged nodes. With `enabled` off every cell
/// becomes its own node.
///
/// Node ids and membership depend only on the input set, never on input
/// order or hash iteration order.
pub fn merge_siblings(facts: &[HeightedFact], enabled: bool) -> MergeOutcome {
    let mut groups: HashMap<MergeKey, SmallVec<[&HeightedFact; 4]>> = HashMap::new();
    for fact in facts {
        groups.entry(MergeKey::of(fact, enabled)).or_default().push(fact);
    }

    let mut out = MergeOutcome {
        cell_to_node: HashMap::with_capacity(facts.len()),
        ..Default::default()
    };

    for mut members in groups.into_values() {
        members.sort_by_key(|f| f.cell());
        let first = members[0];
        let id = NodeId::from(first.cell());

        if members.iter().any(|m| m.fact.rule_level != first.fact.rule_level) {
            let levels: Vec<u8> = members.iter().map(|m| m.fact.rule_level).collect();
            tracing::warn!(node = %id, ?levels, "merged cells disagree on rule level");
            out.level_conflicts += 1;
        }

        let cells: SmallVec<[CellId; 4]> = members.iter().map(|m| m.cell()).collect();
        for &cell in &cells {
            out.cell_to_node.insert(cell, id);
        }

        out.nodes.insert(
            id,
            MergedNode {
                id,
                members: cells,
                result: first.fact.result,
                height: first.height,
                rule_level: first.fact.rule_level,
            },
        );
    }

    out
}
