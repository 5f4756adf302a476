//! Register IR and its conversion to SSA form.
//!
//! This module holds everything that operates on the control flow graph of a
//! single method. It builds upon the generic graph infrastructure in
//! [`crate::utils::graph`] and adds the register-level passes.
//!
//! # Architecture
//!
//! - [`cfg`] - Region and instruction arena, decoder records, graph assembly
//! - `dominance` - Reverse postorder numbering, dominator tree, dominance frontiers
//! - [`dataflow`] - Downward-exposed and reaching definitions
//! - [`ssa`] - Phi-function placement, renaming and verification
//! - [`IrVisitor`] - Traversal protocol for passes living outside the core
//! - [`DotDumper`] - Graphviz serialization built on the traversal protocol
//!
//! # Pass Order
//!
//! The passes are methods of [`ControlFlowGraph`] and must run in this order;
//! each one asserts that its predecessor has run:
//!
//! ```text
//! from_method_body -> compute_rpo -> compute_idominators -> compute_dominance_frontier
//!   -> compute_down_exposed_defs -> compute_reaching_defs -> place_phis -> rename_as_ssa
//! ```
//!
//! [`ControlFlowGraph::convert_to_ssa`] runs the whole sequence.

pub mod cfg;
pub mod dataflow;
pub mod ssa;

mod dominance;
mod dump;
mod visitor;

pub use cfg::{
    BlockRecord, ControlFlowGraph, EdgeKind, InstrId, InstructionKind, InstructionNode,
    InstructionRecord, MethodBody, MethodRef, Region, Register, Stage, SuccessorRecord,
};
pub use dump::{DotDumper, DumpOptions};
pub use ssa::SsaVerifier;
pub use visitor::{walk_graph, walk_region, IrVisitor};
