//! End-to-end tests for the graph pipeline.
//!
//! Each test exercises: table text -> normalize -> heights -> merge -> assemble.

use deduction_graph::table::parse_table;
use deduction_graph::{
    BuildOptions, CellId, DeductionGraph, DependencyEdge, Height, HeightConfig, NodeId, ResultKind,
};
use pretty_assertions::assert_eq;

const HEADER: &str = "CellIndex,Result,GenerationDepth,DifficultyLevel,SourceHints,TriggerCells";

fn build(rows: &[&str]) -> DeductionGraph {
    build_with(rows, &HeightConfig::default(), &BuildOptions::default())
}

fn build_with(rows: &[&str], config: &HeightConfig, options: &BuildOptions) -> DeductionGraph {
    let text = format!("{}\n{}\n", HEADER, rows.join("\n"));
    let table = parse_table(&text).unwrap();
    DeductionGraph::build(&table.records, config, options)
}

fn edges(graph: &DeductionGraph) -> Vec<(u32, u32, u8)> {
    graph.edges().map(|e| (e.from.0, e.to.0, e.level)).collect()
}

// ============================================================================
// 1. A lone initial cell
// ============================================================================

#[test]
fn test_single_initial_cell() {
    let graph = build(&["5,HINT(2),0,0,,"]);

    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.edge_count(), 0);
    let node = graph.node(NodeId(5)).unwrap();
    assert_eq!(node.height, Height::ZERO);
    assert_eq!(node.result, ResultKind::Hint);
}

// ============================================================================
// 2. Parent that is a pure hint, absent from the table
// ============================================================================

#[test]
fn test_pure_hint_parent() {
    let graph = build(&["10,SAFE,1,1,,5"]);

    assert_eq!(graph.height_of(CellId(10)), Some(Height::from(1)));
    assert_eq!(graph.height_of(CellId(5)), Some(Height::ZERO));
    let from = graph.node_of(CellId(5)).unwrap();
    let to = graph.node_of(CellId(10)).unwrap();
    assert_eq!(
        graph.edges().copied().collect::<Vec<_>>(),
        vec![DependencyEdge { from, to, level: 1 }]
    );
    assert_eq!(graph.summary().implicit_hints, 1);
}

// ============================================================================
// 3. Identical siblings merge and their edges collapse
// ============================================================================

#[test]
fn test_sibling_merge_dedups_edges() {
    let graph = build(&[
        "5,HINT,0,0,,",
        "10,SAFE,1,1,,5",
        "20,SAFE,2,2,,10",
        "21,SAFE,2,2,,10",
    ]);

    let node = graph.node(graph.node_of(CellId(20)).unwrap()).unwrap();
    assert_eq!(node.members.as_slice(), &[CellId(20), CellId(21)]);
    assert_eq!(graph.node_of(CellId(21)), Some(node.id));

    let from_ten = graph.outgoing(graph.node_of(CellId(10)).unwrap()).count();
    assert_eq!(from_ten, 1);
    assert_eq!(edges(&graph), vec![(5, 10, 1), (10, 20, 2)]);
    assert_eq!(graph.summary().merged_nodes, 1);
}

#[test]
fn test_no_merge_keeps_siblings_apart() {
    let options = BuildOptions { merge_siblings: false, ..Default::default() };
    let graph = build_with(
        &["10,SAFE,1,1,,5", "20,SAFE,2,2,,10", "21,SAFE,2,2,,10"],
        &HeightConfig::default(),
        &options,
    );
    assert_eq!(graph.node_count(), 4);
    assert_eq!(edges(&graph), vec![(5, 10, 1), (10, 20, 2), (10, 21, 2)]);
}

// ============================================================================
// 4. Duplicated header rows and junk rows are skipped
// ============================================================================

#[test]
fn test_repeated_header_row_skipped() {
    let graph = build(&[
        "5,HINT,0,0,,",
        HEADER,
        ",SAFE,1,1,,5",
        "x,SAFE,1,1,,5",
        "10,SAFE,1,1,,5",
    ]);

    assert_eq!(graph.summary().rows_read, 5);
    assert_eq!(graph.summary().rows_skipped, 3);
    assert_eq!(graph.node_count(), 2);
    assert!(graph.nodes().all(|n| n.members.iter().all(|c| c.0 == 5 || c.0 == 10)));
}

#[test]
fn test_annotated_hint_token_adds_no_parent() {
    let graph = build(&["1,HINT,0,0,,", "10,SAFE,1,2,\"Hints:1,2\","]);

    assert_eq!(edges(&graph), vec![(2, 10, 2)]);
    assert_eq!(graph.summary().implicit_hints, 1);
    assert_eq!(graph.outgoing(graph.node_of(CellId(1)).unwrap()).count(), 0);
}

// ============================================================================
// 5. Height weighting
// ============================================================================

#[test]
fn test_weighted_chain() {
    let graph = build(&[
        "1,HINT,0,0,,",
        "2,SAFE,1,1,1,",       // source hints only: no trigger, height 0 + 1
        "3,MINE,2,4,,2",       // 1 + 6
        "4,SAFE,3,6,,3",       // 7 + 7.2
        "5,SAFE,4,1,,4",       // level 1 past depth 1 adds 0
    ]);

    assert_eq!(graph.height_of(CellId(2)), Some(Height::from(1)));
    assert_eq!(graph.height_of(CellId(3)), Some(Height::from(7)));
    assert_eq!(graph.height_of(CellId(4)).unwrap().to_string(), "14.2");
    assert_eq!(graph.height_of(CellId(5)).unwrap().to_string(), "14.2");
    assert_eq!(graph.summary().max_height.unwrap().to_string(), "14.2");
}

#[test]
fn test_custom_config() {
    let config = HeightConfig::from_json(r#"{"lv4": 2.5}"#).unwrap();
    let graph = build_with(&["2,SAFE,1,1,,", "3,MINE,2,4,,2"], &config, &BuildOptions::default());
    assert_eq!(graph.height_of(CellId(3)).unwrap().to_string(), "3.5");
}

#[test]
fn test_rows_out_of_depth_order() {
    let graph = build(&["3,MINE,2,4,,2", "2,SAFE,1,1,,"]);
    assert_eq!(graph.height_of(CellId(3)), Some(Height::from(7)));
}

#[test]
fn test_initial_cell_with_parents_stays_at_zero() {
    let graph = build(&["7,SAFE,0,3,,1"]);
    assert_eq!(graph.height_of(CellId(7)), Some(Height::ZERO));
    // level > 0 still emits its edge
    assert_eq!(edges(&graph), vec![(1, 7, 3)]);
}

// ============================================================================
// 6. Level-0 facts contribute no edges
// ============================================================================

#[test]
fn test_level_zero_has_no_edges() {
    let graph = build(&["5,HINT,0,0,,", "9,SAFE,1,0,5,5"]);
    assert_eq!(graph.edge_count(), 0);
}

// ============================================================================
// 7. Merge-induced self loops vanish
// ============================================================================

#[test]
fn test_sibling_cross_reference_no_self_loop() {
    // Both list {10, 20}: once merged, 20 -> 21 and 20 -> 20 point at one node.
    let graph = build(&[
        "10,SAFE,1,1,,",
        "20,SAFE,2,2,\"10,20\",10",
        "21,SAFE,2,2,\"10,20\",10",
    ]);

    let node = graph.node_of(CellId(20)).unwrap();
    assert_eq!(graph.node_of(CellId(21)), Some(node));
    assert!(graph.edges().all(|e| e.from != e.to));
    assert_eq!(edges(&graph), vec![(10, 20, 2)]);
}

// ============================================================================
// 8. Idempotence
// ============================================================================

#[test]
fn test_rebuild_is_identical() {
    let rows = [
        "5,HINT,0,0,,",
        "10,SAFE,1,1,,5",
        "11,MINE,1,1,,5",
        "20,SAFE,2,2,\"5, 10\",10",
        "21,SAFE,2,2,\"10,5\",10",
        "30,MINE,3,5,,\"20,21\"",
    ];
    let a = build(&rows);
    let b = build(&rows);

    assert_eq!(a.nodes().cloned().collect::<Vec<_>>(), b.nodes().cloned().collect::<Vec<_>>());
    assert_eq!(a.edges().copied().collect::<Vec<_>>(), b.edges().copied().collect::<Vec<_>>());
    assert_eq!(a.summary(), b.summary());
}
