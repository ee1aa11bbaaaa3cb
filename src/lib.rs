//! # deduction-graph: Deduction DAGs from Solver Traces
//!
//! Rebuilds the dependency structure of a constraint-puzzle solve from the
//! flat trace table the solver writes out, one row per resolved cell.
//!
//! ## Pipeline
//!
//! ```text
//! rows ─► ingest::normalize ─► height::propagate ─► merge::merge_siblings ─► assemble::assemble
//!         (DeductionFact)      (cell → Height)      (MergedNode, cell → node) (DependencyEdge set)
//! ```
//!
//! 1. **Typed at the boundary**: raw string rows become `DeductionFact`s once;
//!    nothing downstream touches string maps.
//! 2. **Depth-ordered heights**: heights are computed in ascending
//!    generation depth, weighted by rule level through `HeightConfig`.
//! 3. **Exact merge keys**: heights are `Decimal`, so sibling merging compares
//!    `(height, parents, result)` without tolerance.
//! 4. **Degrade, never abort**: malformed rows and dangling references are
//!    dropped and counted in the `GraphSummary`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deduction_graph::{BuildOptions, DeductionGraph, HeightConfig};
//!
//! # fn example() -> deduction_graph::Result<()> {
//! let file = std::fs::File::open("trace.csv")?;
//! let graph = DeductionGraph::from_reader(file, &HeightConfig::default(), &BuildOptions::default())?;
//!
//! for (height, nodes) in graph.layers() {
//!     println!("{height}: {nodes:?}");
//! }
//! println!("{}", graph.summary());
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod table;
pub mod ingest;
pub mod height;
pub mod merge;
pub mod assemble;
pub mod graph;
pub mod annotate;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{
    CellId, ResultKind, Height,
    DeductionFact, HeightedFact,
    MergedNode, NodeId,
    DependencyEdge, RawEdge,
};

// ============================================================================
// Re-exports: Pipeline
// ============================================================================

pub use table::{RawRecord, Table};
pub use height::HeightConfig;
pub use graph::{BuildOptions, DeductionGraph, GraphSummary};
pub use export::Palette;

// ============================================================================
// Error Types
// ============================================================================

/// Failures outside the graph core: unreadable input, bad configuration,
/// or the external renderer. Row-level data defects are never errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Table error at line {line}: {message}")]
    Table { line: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Renderer not found: {0} (install Graphviz)")]
    RendererNotFound(String),

    #[error("Renderer failed with status {status}: {stderr}")]
    RendererFailed { status: i32, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
