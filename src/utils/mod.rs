//! Shared utilities used across the analysis passes.
//!
//! - [`graph`] - Strongly typed node handles, graph traits and the generic
//!   dominance algorithms the region passes are built on
//! - [`ScopedTable`] - Nested symbol table used while renaming registers
//! - [`escape_dot`] / [`DotWriter`] - Helpers for emitting Graphviz output

mod dot;
mod scoped;

pub mod graph;

pub use dot::{escape_dot, DotWriter};
pub use scoped::ScopedTable;
