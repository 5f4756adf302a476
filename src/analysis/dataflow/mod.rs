//! Data flow analyses over register regions.
//!
//! - [`reaching`] - Downward-exposed and reaching definitions, consumed by
//!   phi-function placement
//!
//! The analyses are passes of [`ControlFlowGraph`](crate::analysis::ControlFlowGraph)
//! and store their results in the region annotations.

pub mod reaching;
