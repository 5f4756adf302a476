// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # regssa
//!
//! Conversion of register-based method bodies into semi-pruned static single
//! assignment (SSA) form.
//!
//! A decoder hands over a method as blocks of register instructions with explicit
//! branch targets. `regssa` assembles them into a control flow graph of regions,
//! computes the dominator tree, dominance frontiers and reaching definitions,
//! places phi-functions where definitions merge, and renames every register use
//! to the single definition that reaches it. The finished graph is handed to back
//! ends through a visitor-based traversal protocol.
//!
//! ## Features
//!
//! - **Classical algorithms** - Cooper-Harvey-Kennedy dominators, Cooper-Torczon
//!   dominance frontiers, iterated-frontier phi placement, dominator-tree renaming
//! - **Semi-pruned SSA** - Phi-functions only for registers that actually merge
//!   more than one definition
//! - **Def-use chains** - Every definition knows its users
//! - **Verification** - Independent re-check of the SSA properties
//! - **Diagnostics** - Graphviz DOT dumps of regions, dominators, frontiers and SSA edges
//! - **Batch compilation** - Independent methods convert in parallel
//!
//! ## Quick Start
//!
//! ```rust
//! use regssa::prelude::*;
//!
//! // int max(int v1, int v2) { v0 = v1; if (v1 < v2) v0 = v2; return v0; }
//! let body = MethodBody::new(MethodRef::new(0, 1), 0)
//!     .with_parameter(1)
//!     .with_parameter(2)
//!     .with_block(
//!         BlockRecord::new(0)
//!             .with_instruction(InstructionRecord::new("move").defs([0]).uses([1]))
//!             .with_instruction(InstructionRecord::new("if-ge").uses([1, 2]))
//!             .branches_to(6)
//!             .falls_through_to(4),
//!     )
//!     .with_block(
//!         BlockRecord::new(4)
//!             .with_instruction(InstructionRecord::new("move").defs([0]).uses([2]))
//!             .falls_through_to(6),
//!     )
//!     .with_block(BlockRecord::new(6).with_instruction(InstructionRecord::new("return").uses([0])));
//!
//! let cfg = SsaCompiler::new(SsaOptions::strict()).compile(body)?;
//!
//! let exit = cfg.region(cfg.region_at(6).unwrap());
//! let phi = cfg.instruction(exit.phis()[0]);
//! assert_eq!(phi.result_register(), Some(Register::new(0)));
//! assert!(phi.phi_operands().unwrap().iter().all(Option::is_some));
//! # Ok::<(), regssa::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`analysis`] - Control flow graph, SSA passes, verifier, traversal protocol, DOT dumps
//! - [`utils`] - Generic graph algorithms, scoped symbol table, DOT writer
//! - [`SsaCompiler`] - Per-method driver with [`SsaOptions`]
//! - [`Error`] and [`Result`] - Error handling
//!
//! ### Error Handling
//!
//! Malformed input is reported as an [`Error`] and rejects the method. Violated
//! internal invariants, such as running passes out of order, panic.
//!
//! ### Logging
//!
//! The crate logs through the [`log`] facade: per-pass progress at `debug`,
//! fixed-point iteration counts and DOT dumps at `trace`, rejected methods at
//! `warn`. Install any `log` backend to see them.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use regssa::prelude::*;
///
/// let body = MethodBody::new(MethodRef::new(0, 0), 0).with_block(BlockRecord::new(0));
/// let cfg = SsaCompiler::default().compile(body)?;
/// assert_eq!(cfg.region_count(), 1);
/// # Ok::<(), regssa::Error>(())
/// ```
pub mod prelude;

/// Register IR, control flow graph and the SSA passes.
pub mod analysis;

/// Generic graph algorithms and small data structures used by the passes.
pub mod utils;

mod compiler;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `regssa` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

pub use analysis::{
    BlockRecord, ControlFlowGraph, EdgeKind, InstructionRecord, MethodBody, MethodRef,
};
pub use compiler::{SsaCompiler, SsaOptions};
