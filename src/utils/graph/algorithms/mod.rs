//! Graph algorithms for SSA construction.
//!
//! This module provides the classic dominance algorithms, written against the
//! graph traits so they work with any rooted graph.
//!
//! # Available Algorithms
//!
//! ## Traversal
//!
//! - [`postorder`] - Depth-first postorder with cycle-safe visiting markers
//! - [`reverse_postorder`] - Reverse postorder numbering ([`RpoNumbering`])
//!
//! ## Dominator Analysis
//!
//! - [`compute_dominators`] - Iterative dominator tree (Cooper, Harvey & Kennedy)
//! - [`compute_dominance_frontiers`] - Dominance frontiers (Cooper & Torczon)
//! - [`DominatorTree`] - Result of dominator computation
//!
//! # Algorithm Selection
//!
//! | Algorithm | Time Complexity | Use Case |
//! |-----------|-----------------|----------|
//! | Postorder / RPO | O(V + E) | Iteration order for forward dataflow |
//! | Dominators | O(V²) worst case, near linear in practice | SSA construction |
//! | Frontiers | O(V + E + Σ\|DF\|) | Phi placement |
//!
//! # Examples
//!
//! ```rust
//! use regssa::utils::graph::algorithms::{
//!     compute_dominance_frontiers, compute_dominators, reverse_postorder,
//! };
//! use regssa::{BlockRecord, ControlFlowGraph, MethodBody, MethodRef};
//!
//! // 0 -> {4, 2} -> 6
//! let body = MethodBody::new(MethodRef::new(0, 0), 0)
//!     .with_block(BlockRecord::new(0).branches_to(4).falls_through_to(2))
//!     .with_block(BlockRecord::new(2).branches_to(6))
//!     .with_block(BlockRecord::new(4).falls_through_to(6))
//!     .with_block(BlockRecord::new(6));
//! let cfg = ControlFlowGraph::from_method_body(body)?;
//!
//! let rpo = reverse_postorder(&cfg, cfg.entry_region());
//! let dom_tree = compute_dominators(&cfg, &rpo);
//! let frontiers = compute_dominance_frontiers(&cfg, &dom_tree);
//!
//! let merge = cfg.region_at(6).unwrap();
//! assert_eq!(dom_tree.immediate_dominator(merge), Some(cfg.entry_region()));
//! assert!(frontiers[cfg.region_at(2).unwrap().index()].contains(&merge));
//! # Ok::<(), regssa::Error>(())
//! ```

mod dominators;
mod traversal;

pub use dominators::{
    compute_dominance_frontiers, compute_dominators, DominatorIterator, DominatorTree,
};
pub use traversal::{postorder, reverse_postorder, RpoNumber, RpoNumbering};
