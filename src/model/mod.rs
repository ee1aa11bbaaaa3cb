//! # Deduction Graph Model
//!
//! Value types that flow through the pipeline: facts in, merged nodes and
//! dependency edges out.
//!
//! Design rule: no I/O, no string maps, no display metadata here.
//! Colors and labels belong to the exporter.

pub mod cell;
pub mod height;
pub mod fact;
pub mod node;
pub mod edge;

pub use cell::{CellId, ResultKind};
pub use height::Height;
pub use fact::{DeductionFact, HeightedFact};
pub use node::{MergedNode, NodeId};
pub use edge::{DependencyEdge, RawEdge};
