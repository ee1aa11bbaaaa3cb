//! Deduction facts: one resolved cell and what justified it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{CellId, Height, ResultKind};

/// A typed trace row.
///
/// `parents` is the union of `source_hints` and `trigger_cells`, computed once
/// by [`DeductionFact::new`]. The two source lists stay available because
/// height propagation reads triggers only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionFact {
    pub cell: CellId,
    pub result: ResultKind,
    /// Solver step at which the cell was resolved. 0 = initial.
    pub generation_depth: u32,
    /// Rule difficulty tier 1–6; 0 = initial / ungenerated.
    pub rule_level: u8,
    pub source_hints: BTreeSet<CellId>,
    pub trigger_cells: BTreeSet<CellId>,
    pub parents: BTreeSet<CellId>,
}

impl DeductionFact {
    pub fn new(
        cell: CellId,
        result: ResultKind,
        generation_depth: u32,
        rule_level: u8,
        source_hints: BTreeSet<CellId>,
        trigger_cells: BTreeSet<CellId>,
    ) -> Self {
        let parents = source_hints.union(&trigger_cells).copied().collect();
        Self {
            cell,
            result,
            generation_depth,
            rule_level,
            source_hints,
            trigger_cells,
            parents,
        }
    }

    /// An initial hint that was referenced but never written as its own row.
    pub fn implicit_hint(cell: CellId) -> Self {
        Self::new(cell, ResultKind::Hint, 0, 0, BTreeSet::new(), BTreeSet::new())
    }

    /// Depth-0 facts always sit at height 0.
    pub fn is_initial(&self) -> bool {
        self.generation_depth == 0
    }

    /// Level-0 facts never emit dependency edges, whatever parents they list.
    pub fn contributes_edges(&self) -> bool {
        self.rule_level > 0
    }
}

/// A fact with its computed height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightedFact {
    pub fact: DeductionFact,
    pub height: Height,
}

impl HeightedFact {
    pub fn new(fact: DeductionFact, height: Height) -> Self {
        Self { fact, height }
    }

    pub fn cell(&self) -> CellId {
        self.fact.cell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(ids: &[u32]) -> BTreeSet<CellId> {
        ids.iter().copied().map(CellId).collect()
    }

    #[test]
    fn test_parents_are_union() {
        let fact = DeductionFact::new(CellId(9), ResultKind::Safe, 2, 2, cells(&[1, 2]), cells(&[2, 3]));
        assert_eq!(fact.parents, cells(&[1, 2, 3]));
        assert!(fact.contributes_edges());
        assert!(!fact.is_initial());
    }

    #[test]
    fn test_implicit_hint() {
        let fact = DeductionFact::implicit_hint(CellId(4));
        assert_eq!(fact.result, ResultKind::Hint);
        assert!(fact.is_initial());
        assert!(!fact.contributes_edges());
        assert!(fact.parents.is_empty());
    }
}
