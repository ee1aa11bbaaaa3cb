//! Height propagator.
//!
//! A cell's height is its tallest trigger's height plus the increment of the
//! rule that resolved it. Facts are visited in ascending generation depth,
//! which the solver guarantees never decreases along a real dependency, so
//! every parent is settled before its children.
//!
//! Parents are looked up among trigger cells only. Source hints take part in
//! merging and in edges, not in height.

pub mod config;

pub use config::HeightConfig;

use hashbrown::HashMap;

use crate::model::{CellId, DeductionFact, Height};

/// Computed height per cell.
pub type HeightMap = HashMap<CellId, Height>;

/// Compute the height of every fact.
///
/// A trigger with no entry (an initial hint never written as a row, or a
/// reference that breaks depth order) counts as height 0. Out-of-order input
/// yields a wrong height for that cell, never a panic.
pub fn propagate(facts: &[DeductionFact], config: &HeightConfig) -> HeightMap {
    let mut order: Vec<&DeductionFact> = facts.iter().collect();
    order.sort_by_key(|f| f.generation_depth);

    let mut heights = HeightMap::with_capacity(facts.len());
    for fact in order {
        let height = height_of(fact, &heights, config);
        heights.insert(fact.cell, height);
    }
    heights
}

/// Height of one fact given the heights settled so far.
pub fn height_of(fact: &DeductionFact, settled: &HeightMap, config: &HeightConfig) -> Height {
    if fact.is_initial() {
        return Height::ZERO;
    }

    let floor = fact
        .trigger_cells
        .iter()
        .filter_map(|c| settled.get(c))
        .max()
        .copied()
        .unwrap_or(Height::ZERO);

    floor + config.increment(fact.rule_level, fact.generation_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResultKind;
    use rust_decimal_macros::dec;
    use std::collections::BTreeSet;

    fn fact(cell: u32, depth: u32, level: u8, sources: &[u32], triggers: &[u32]) -> DeductionFact {
        let set = |ids: &[u32]| ids.iter().copied().map(CellId).collect::<BTreeSet<_>>();
        DeductionFact::new(CellId(cell), ResultKind::Safe, depth, level, set(sources), set(triggers))
    }

    #[test]
    fn test_initial_is_zero_regardless_of_parents() {
        let facts = vec![fact(1, 2, 4, &[], &[]), fact(2, 0, 6, &[], &[1])];
        let h = propagate(&facts, &HeightConfig::default());
        assert_eq!(h[&CellId(2)], Height::ZERO);
    }

    #[test]
    fn test_absent_parent_counts_as_zero() {
        let facts = vec![fact(10, 1, 1, &[], &[5])];
        let h = propagate(&facts, &HeightConfig::default());
        assert_eq!(h[&CellId(10)], Height::from(1));
        assert!(!h.contains_key(&CellId(5)));
    }

    #[test]
    fn test_max_of_parents_plus_increment() {
        let facts = vec![
            fact(1, 1, 1, &[], &[]),         // 1
            fact(2, 2, 4, &[], &[1]),        // 1 + 6 = 7
            fact(3, 2, 2, &[], &[1]),        // 1 + 1 = 2
            fact(4, 3, 5, &[], &[2, 3]),     // 7 + 6.6
        ];
        let h = propagate(&facts, &HeightConfig::default());
        assert_eq!(h[&CellId(4)], Height::new(dec!(13.6)));
    }

    #[test]
    fn test_depth_order_not_row_order() {
        // Child row precedes its parent in the file.
        let facts = vec![fact(2, 2, 2, &[], &[1]), fact(1, 1, 3, &[], &[])];
        let h = propagate(&facts, &HeightConfig::default());
        assert_eq!(h[&CellId(1)], Height::from(2));
        assert_eq!(h[&CellId(2)], Height::from(3));
    }

    #[test]
    fn test_source_hints_do_not_raise_height() {
        let facts = vec![fact(1, 1, 4, &[], &[]), fact(2, 2, 2, &[1], &[])];
        let h = propagate(&facts, &HeightConfig::default());
        assert_eq!(h[&CellId(1)], Height::from(6));
        assert_eq!(h[&CellId(2)], Height::from(1));
    }

    #[test]
    fn test_forward_reference_does_not_panic() {
        // Parent sits deeper than its child: looked up before it exists.
        let facts = vec![fact(1, 3, 3, &[], &[]), fact(2, 2, 2, &[], &[1])];
        let h = propagate(&facts, &HeightConfig::default());
        assert_eq!(h[&CellId(2)], Height::from(1));
    }

    #[test]
    fn test_level_one_depth_split() {
        let facts = vec![fact(1, 1, 1, &[], &[]), fact(2, 2, 1, &[], &[1])];
        let h = propagate(&facts, &HeightConfig::default());
        assert_eq!(h[&CellId(1)], Height::from(1));
        assert_eq!(h[&CellId(2)], Height::from(1));
    }
}
