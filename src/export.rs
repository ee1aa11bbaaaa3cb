//! Graphviz and JSON export.
//!
//! The graph core carries no display metadata. Colors and level labels live
//! in a [`Palette`] owned here, and layout is left to Graphviz:
//!
//! ```text
//! DeductionGraph → to_dot() → digraph text → render() → `dot -Tpng -o out.png`
//! ```

use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde::Serialize;

use crate::graph::{DeductionGraph, GraphSummary};
use crate::model::*;
use crate::{Error, Result};

// ============================================================================
// Palette
// ============================================================================

/// Node fill colors per result kind and edge colors per rule level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub hint: &'static str,
    pub safe: &'static str,
    pub mine: &'static str,
    pub unknown: &'static str,
    /// Index 0 is level 1.
    pub levels: [&'static str; 6],
    pub unknown_level: &'static str,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            hint: "#CCCCCC",
            safe: "#90EE90",
            mine: "#FF6B6B",
            unknown: "#FFFFFF",
            levels: [
                "#4169E1", // royal blue
                "#228B22", // forest green
                "#FF8C00", // dark orange
                "#DC143C", // crimson
                "#8B008B", // dark magenta
                "#8B4513", // saddle brown
            ],
            unknown_level: "#000000",
        }
    }
}

impl Palette {
    pub fn node_color(&self, result: ResultKind) -> &'static str {
        match result {
            ResultKind::Hint => self.hint,
            ResultKind::Safe => self.safe,
            ResultKind::Mine => self.mine,
            ResultKind::Unknown => self.unknown,
        }
    }

    pub fn level_color(&self, level: u8) -> &'static str {
        match level {
            1..=6 => self.levels[usize::from(level) - 1],
            _ => self.unknown_level,
        }
    }
}

// ============================================================================
// DOT
// ============================================================================

/// Tallest graph that still gets a row for every whole height.
pub const MAX_WHOLE_TICKS: u32 = 1000;

/// Height values that get their own ranked row: every whole number from 0
/// up to the tallest node, plus each fractional height actually present.
/// Above [`MAX_WHOLE_TICKS`] only the heights present get a row.
pub fn height_ticks(graph: &DeductionGraph) -> Vec<Height> {
    let mut ticks: BTreeSet<Height> = graph.nodes().map(|n| n.height).collect();
    let top = ticks.last().copied().unwrap_or(Height::ZERO).floor();
    if top > Height::from(MAX_WHOLE_TICKS) {
        tracing::warn!(%top, "graph too tall for whole-height rows, using present heights only");
        return ticks.into_iter().collect();
    }
    let mut h = Height::ZERO;
    while h <= top {
        ticks.insert(h);
        h = h + rust_decimal::Decimal::ONE;
    }
    ticks.into_iter().collect()
}

/// Render `graph` as a Graphviz digraph. Output is fully sorted, so equal
/// graphs produce byte-identical text.
pub fn to_dot(graph: &DeductionGraph, title: &str, palette: &Palette) -> String {
    let ticks = height_ticks(graph);
    let layers = graph.layers();
    let mut out = String::new();

    out.push_str("digraph InferenceGraph {\n");
    let _ = writeln!(out, "    label=\"{}\";", escape_dot(title));
    out.push_str("    labelloc=t;\n");
    out.push_str("    fontsize=20;\n");
    out.push_str("    rankdir=TB;\n");
    out.push_str("    node [style=filled, fontname=\"Helvetica\"];\n");
    out.push_str("    edge [fontname=\"Helvetica\", fontsize=10];\n");
    out.push_str("    newrank=true;\n");
    out.push_str("    splines=true;\n\n");

    out.push_str("    // Height labels\n");
    for (i, h) in ticks.iter().enumerate() {
        let _ = writeln!(
            out,
            "    height_label_{i} [label=\"{h}\", shape=plaintext, fontsize=24, fontcolor=\"#333333\"];"
        );
    }
    out.push('\n');

    out.push_str("    // Right anchors\n");
    for i in 0..ticks.len() {
        let _ = writeln!(out, "    height_right_{i} [label=\"\", shape=none, width=0, height=0];");
    }
    out.push('\n');

    out.push_str("    // Nodes\n");
    for node in graph.nodes() {
        let label = match node.result {
            ResultKind::Hint => node.member_label(),
            other => format!("{}\\n({})", node.member_label(), other),
        };
        let _ = writeln!(
            out,
            "    {} [label=\"{}\", fillcolor=\"{}\"];",
            node.id,
            label,
            palette.node_color(node.result),
        );
    }
    out.push('\n');

    for (i, h) in ticks.iter().enumerate() {
        let _ = writeln!(out, "    // Height {h}");
        out.push_str("    {\n        rank=same;\n");
        let _ = writeln!(out, "        height_label_{i};");
        for id in layers.get(h).into_iter().flatten() {
            let _ = writeln!(out, "        {id};");
        }
        let _ = writeln!(out, "        height_right_{i};");
        out.push_str("    }\n\n");
    }

    if ticks.len() > 1 {
        out.push_str("    // Vertical ordering\n");
        for i in 0..ticks.len() - 1 {
            let _ = writeln!(out, "    height_label_{} -> height_label_{} [style=invis];", i, i + 1);
        }
        out.push('\n');
    }

    out.push_str("    // Edges\n");
    for edge in graph.edges() {
        let color = palette.level_color(edge.level);
        let _ = writeln!(
            out,
            "    {} -> {} [label=\"{}\", color=\"{}\", constraint={}];",
            edge.from,
            edge.to,
            edge.level_label(),
            color,
            ranks_edge(graph, edge),
        );
    }

    out.push_str("}\n");
    out
}

/// A level-1 edge inside one height row must not pull its ends apart.
fn ranks_edge(graph: &DeductionGraph, edge: &DependencyEdge) -> bool {
    if edge.level != 1 {
        return true;
    }
    match (graph.node(edge.from), graph.node(edge.to)) {
        (Some(a), Some(b)) => a.height != b.height,
        _ => true,
    }
}

fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct GraphExport<'a> {
    title: &'a str,
    nodes: Vec<&'a MergedNode>,
    edges: Vec<&'a DependencyEdge>,
    layers: Vec<LayerExport>,
    summary: &'a GraphSummary,
}

#[derive(Serialize)]
struct LayerExport {
    height: Height,
    nodes: Vec<NodeId>,
}

/// Nodes, edges, height layers and summary as pretty-printed JSON.
pub fn to_json(graph: &DeductionGraph, title: &str) -> Result<String> {
    let export = GraphExport {
        title,
        nodes: graph.nodes().collect(),
        edges: graph.edges().collect(),
        layers: graph
            .layers()
            .into_iter()
            .map(|(height, nodes)| LayerExport { height, nodes })
            .collect(),
        summary: graph.summary(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

// ============================================================================
// Rendering through Graphviz
// ============================================================================

/// Graphviz output format for a path, from its extension.
pub fn format_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("svg") => "svg",
        Some("pdf") => "pdf",
        Some("jpg") | Some("jpeg") => "jpg",
        _ => "png",
    }
}

/// Pipe `dot_source` through the `dot` executable into `output`.
pub fn render(dot_source: &str, output: &Path) -> Result<()> {
    render_with("dot", dot_source, output)
}

/// [`render`] with an explicit Graphviz executable.
pub fn render_with(program: &str, dot_source: &str, output: &Path) -> Result<()> {
    let format = format_for(output);
    tracing::debug!(program, format, output = %output.display(), "invoking graphviz");

    let mut child = Command::new(program)
        .arg(format!("-T{format}"))
        .arg("-o")
        .arg(output)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::RendererNotFound(program.to_string()),
            _ => Error::Io(e),
        })?;

    // A failed exit status takes precedence over a write error on stdin.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(dot_source.as_bytes()),
        None => Ok(()),
    };

    let result = child.wait_with_output()?;
    if !result.status.success() {
        return Err(Error::RendererFailed {
            status: result.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }
    written?;
    Ok(())
}
