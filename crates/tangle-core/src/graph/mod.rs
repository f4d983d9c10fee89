//! Component dependency graph.
//!
//! # Overview
//!
//! The graph is declared once, validated, and then frozen. Every analysis in
//! the crate reads it through [`ComponentGraph`]; none of them mutate it.
//!
//! ## Pipeline
//!
//! ```text
//! Vec<ComponentSpec>
//!        ↓  build::ComponentGraph::from_specs()   (two-phase, fails fast)
//! ComponentGraph (DiGraph, edge = "enables", may contain cycles)
//!        ↓  cycles::find_cycles()
//! Vec<Vec<String>>  each cycle closes back on its first id
//! ```

pub mod build;
pub mod cycles;

// Re-export primary types at module level for convenience.
pub use build::{Component, ComponentGraph};
pub use cycles::{find_cycle_nodes, find_cycles};
