//! # regssa Prelude
//!
//! This module re-exports the types needed to hand a method to the compiler and
//! inspect the converted graph. Import it with `use regssa::prelude::*;`.

// ================================================================================================
// Core Error Handling
// ================================================================================================

/// The main error type for all regssa operations
pub use crate::Error;

/// Convenience result type alias
pub use crate::Result;

// ================================================================================================
// Decoder Input
// ================================================================================================

/// Records describing a decoded method
pub use crate::analysis::{
    BlockRecord, EdgeKind, InstructionRecord, MethodBody, MethodRef, SuccessorRecord,
};

// ================================================================================================
// Compilation
// ================================================================================================

/// Per-method driver and its options
pub use crate::{SsaCompiler, SsaOptions};

// ================================================================================================
// Register IR
// ================================================================================================

/// The converted graph and its building blocks
pub use crate::analysis::{
    ControlFlowGraph, InstrId, InstructionKind, InstructionNode, Region, Register, Stage,
};

/// Traversal protocol and the passes built on it
pub use crate::analysis::{DotDumper, DumpOptions, IrVisitor, SsaVerifier};

// ================================================================================================
// Graph Primitives
// ================================================================================================

/// Region handles and graph capabilities
pub use crate::utils::graph::{GraphBase, NodeId, Predecessors, RootedGraph, Successors};
