//! The assembled deduction graph and the pipeline that builds it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::Read;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::assemble::{assemble, raw_edges};
use crate::height::{propagate, HeightConfig, HeightMap};
use crate::ingest::{normalize, Normalized};
use crate::merge::merge_siblings;
use crate::model::*;
use crate::table::{read_table, RawRecord};
use crate::Result;

// ============================================================================
// Options
// ============================================================================

/// Pipeline switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Collapse structurally identical siblings into one node.
    pub merge_siblings: bool,
    /// Give referenced-but-unlisted parents their own height-0 `HINT` node.
    /// When off, edges from such parents are dangling and dropped.
    pub materialize_hints: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { merge_siblings: true, materialize_hints: true }
    }
}

// ============================================================================
// Summary
// ============================================================================

/// Counts the caller can use to judge data quality.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub duplicate_cells: usize,
    /// Distinct cells ingested as facts.
    pub cells: usize,
    /// Initial hints materialized from parent references.
    pub implicit_hints: usize,
    pub nodes: usize,
    /// Nodes with more than one member.
    pub merged_nodes: usize,
    /// Cells absorbed into another cell's node.
    pub merged_cells: usize,
    pub edges: usize,
    pub dangling_references: usize,
    pub level_conflicts: usize,
    pub min_height: Option<Height>,
    pub max_height: Option<Height>,
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cells: {} (+{} implicit hints), Nodes: {} (merged: {}), Edges: {}",
            self.cells, self.implicit_hints, self.nodes, self.merged_nodes, self.edges,
        )?;
        if let (Some(lo), Some(hi)) = (self.min_height, self.max_height) {
            write!(f, ", Height range: {lo}-{hi}")?;
        }
        if self.rows_skipped > 0 || self.dangling_references > 0 {
            write!(
                f,
                " [skipped rows: {}, dangling refs: {}]",
                self.rows_skipped, self.dangling_references,
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// DeductionGraph
// ============================================================================

/// Merged nodes and deduplicated edges for one trace.
///
/// Built once, immutable afterwards. Iteration order of nodes, edges and
/// layers is sorted, so identical input always yields identical output.
#[derive(Debug, Clone)]
pub struct DeductionGraph {
    nodes: BTreeMap<NodeId, MergedNode>,
    edges: BTreeSet<DependencyEdge>,
    cell_to_node: HashMap<CellId, NodeId>,
    heights: HeightMap,
    summary: GraphSummary,
}

impl DeductionGraph {
    /// Read a trace table and build its graph.
    pub fn from_reader<R: Read>(reader: R, config: &HeightConfig, options: &BuildOptions) -> Result<Self> {
        let table = read_table(reader)?;
        Ok(Self::build(&table.records, config, options))
    }

    /// Build from raw rows. Never fails; bad rows are skipped and counted.
    pub fn build(rows: &[RawRecord], config: &HeightConfig, options: &BuildOptions) -> Self {
        let normalized = normalize(rows);
        let mut graph = Self::from_normalized(&normalized, config, options);
        graph.summary.rows_read = rows.len();
        graph.summary.rows_skipped = normalized.skipped;
        graph.summary.duplicate_cells = normalized.duplicates;
        graph
    }

    /// Build from already-typed facts (cell ids assumed unique).
    pub fn from_facts(facts: Vec<DeductionFact>, config: &HeightConfig, options: &BuildOptions) -> Self {
        let rows_read = facts.len();
        let normalized = Normalized { facts, ..Default::default() };
        let mut graph = Self::from_normalized(&normalized, config, options);
        graph.summary.rows_read = rows_read;
        graph
    }

    fn from_normalized(normalized: &Normalized, config: &HeightConfig, options: &BuildOptions) -> Self {
        let facts = &normalized.facts;
        let mut heights = propagate(facts, config);

        let hints = if options.materialize_hints { implicit_hints(facts) } else { Vec::new() };

        let mut heighted: Vec<HeightedFact> = facts
            .iter()
            .map(|f| {
                let height = heights.get(&f.cell).copied().unwrap_or(Height::ZERO);
                HeightedFact::new(f.clone(), height)
            })
            .collect();
        for hint in &hints {
            heights.insert(hint.cell, Height::ZERO);
            heighted.push(HeightedFact::new(hint.clone(), Height::ZERO));
        }

        let merged = merge_siblings(&heighted, options.merge_siblings);
        let assembly = assemble(&raw_edges(facts), &merged.cell_to_node);

        let summary = GraphSummary {
            rows_read: facts.len(),
            cells: facts.len(),
            implicit_hints: hints.len(),
            nodes: merged.nodes.len(),
            merged_nodes: merged.nodes.values().filter(|n| n.is_merged()).count(),
            merged_cells: heighted.len() - merged.nodes.len(),
            edges: assembly.edges.len(),
            dangling_references: assembly.dangling,
            level_conflicts: merged.level_conflicts,
            min_height: merged.nodes.values().map(|n| n.height).min(),
            max_height: merged.nodes.values().map(|n| n.height).max(),
            ..Default::default()
        };
        tracing::info!(%summary, "deduction graph built");

        Self {
            nodes: merged.nodes,
            edges: assembly.edges,
            cell_to_node: merged.cell_to_node,
            heights,
            summary,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn nodes(&self) -> impl Iterator<Item = &MergedNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter()
    }

    pub fn node(&self, id: NodeId) -> Option<&MergedNode> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Node a cell ended up in.
    pub fn node_of(&self, cell: CellId) -> Option<NodeId> {
        self.cell_to_node.get(&cell).copied()
    }

    /// Computed height of a cell (implicit hints included).
    pub fn height_of(&self, cell: CellId) -> Option<Height> {
        self.heights.get(&cell).copied()
    }

    /// Node ids grouped by height, both ascending.
    pub fn layers(&self) -> BTreeMap<Height, Vec<NodeId>> {
        let mut layers: BTreeMap<Height, Vec<NodeId>> = BTreeMap::new();
        for node in self.nodes.values() {
            layers.entry(node.height).or_default().push(node.id);
        }
        layers
    }

    /// Edges leaving `id`.
    pub fn outgoing(&self, id: NodeId) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Edges entering `id`.
    pub fn incoming(&self, id: NodeId) -> impl Iterator<Item = &DependencyEdge> {
        self.edges.iter().filter(move |e| e.to == id)
    }

    pub fn summary(&self) -> &GraphSummary {
        &self.summary
    }
}

/// Parents of edge-contributing facts that are not facts themselves.
fn implicit_hints(facts: &[DeductionFact]) -> Vec<DeductionFact> {
    let known: BTreeSet<CellId> = facts.iter().map(|f| f.cell).collect();
    let referenced: BTreeSet<CellId> = facts
        .iter()
        .filter(|f| f.contributes_edges())
        .flat_map(|f| f.parents.iter().copied())
        .collect();

    referenced
        .difference(&known)
        .map(|&cell| DeductionFact::implicit_hint(cell))
        .collect()
}
