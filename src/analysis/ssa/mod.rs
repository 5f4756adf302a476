//! Static Single Assignment (SSA) construction.
//!
//! Conversion happens in two passes over a [`ControlFlowGraph`] whose dominance
//! and reaching-definition annotations are already in place:
//!
//! 1. [`place_phis`](crate::analysis::ControlFlowGraph::place_phis) inserts phi-functions on the
//!    iterated dominance frontiers of every register with more than one reaching
//!    definition (semi-pruned SSA)
//! 2. [`rename_as_ssa`](crate::analysis::ControlFlowGraph::rename_as_ssa) resolves every use to its
//!    unique definition and fills the phi slots
//!
//! The [`SsaVerifier`] independently re-checks the result.
//!
//! # Example
//!
//! ```rust
//! use regssa::{BlockRecord, ControlFlowGraph, InstructionRecord, MethodBody, MethodRef};
//!
//! // v0 = cond ? 1 : 2; return v0
//! let body = MethodBody::new(MethodRef::new(0, 0), 0)
//!     .with_parameter(1)
//!     .with_block(
//!         BlockRecord::new(0)
//!             .with_instruction(InstructionRecord::new("if-eqz").uses([1]))
//!             .branches_to(4)
//!             .falls_through_to(2),
//!     )
//!     .with_block(
//!         BlockRecord::new(2)
//!             .with_instruction(InstructionRecord::new("const/4").defs([0]))
//!             .branches_to(6),
//!     )
//!     .with_block(
//!         BlockRecord::new(4)
//!             .with_instruction(InstructionRecord::new("const/4").defs([0]))
//!             .falls_through_to(6),
//!     )
//!     .with_block(BlockRecord::new(6).with_instruction(InstructionRecord::new("return").uses([0])));
//!
//! let mut cfg = ControlFlowGraph::from_method_body(body)?;
//! cfg.convert_to_ssa()?;
//!
//! let merge = cfg.region(cfg.region_at(6).unwrap());
//! assert_eq!(merge.phis().len(), 1);
//! # Ok::<(), regssa::Error>(())
//! ```
//!
//! [`ControlFlowGraph`]: crate::analysis::ControlFlowGraph

mod phis;
mod rename;
mod verify;

pub use verify::SsaVerifier;
