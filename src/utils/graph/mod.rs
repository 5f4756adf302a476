//! Generic directed graph infrastructure for program analysis.
//!
//! This module contains the graph vocabulary the SSA passes are written against.
//! The control flow graph of a method implements the traits defined here, and the
//! algorithms in [`algorithms`] only ever talk to those traits. This keeps the
//! classic dominance algorithms testable on tiny hand-written graphs while the
//! region passes apply them to real methods.
//!
//! # Key Components
//!
//! - [`NodeId`] - Strongly-typed, arena-stable node handle
//! - [`GraphBase`], [`Successors`], [`Predecessors`], [`RootedGraph`] - Graph capabilities
//! - [`algorithms`] - Reverse postorder numbering, dominator tree, dominance frontiers
//!
//! # Design Principles
//!
//! ## Strongly-Typed Identifiers
//!
//! Node identifiers use a newtype wrapper to prevent accidental mixing of
//! indices and provide type safety at compile time.
//!
//! ## Immutable After Construction
//!
//! Graph topology is built once and then only read. All algorithms take shared
//! references and return their results as plain values; storing the results back
//! into per-node annotations is the caller's business.

mod node;
mod traits;

pub mod algorithms;

pub use node::NodeId;
pub use traits::{GraphBase, Predecessors, RootedGraph, Successors};

/// Adjacency-list graph used by the algorithm unit tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::{GraphBase, NodeId, Predecessors, RootedGraph, Successors};

    pub(crate) struct TestGraph {
        succs: Vec<Vec<NodeId>>,
        preds: Vec<Vec<NodeId>>,
        entry: NodeId,
    }

    impl TestGraph {
        /// Builds a graph with `count` nodes, entry `n0`, and the given edges in order.
        pub(crate) fn new(count: usize, edges: &[(usize, usize)]) -> Self {
            let mut succs = vec![Vec::new(); count];
            let mut preds = vec![Vec::new(); count];
            for &(from, to) in edges {
                succs[from].push(NodeId::new(to));
                preds[to].push(NodeId::new(from));
            }
            TestGraph {
                succs,
                preds,
                entry: NodeId::new(0),
            }
        }
    }

    impl GraphBase for TestGraph {
        fn node_count(&self) -> usize {
            self.succs.len()
        }

        fn node_ids(&self) -> impl Iterator<Item = NodeId> {
            (0..self.succs.len()).map(NodeId::new)
        }
    }

    impl Successors for TestGraph {
        fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.succs[node.index()].iter().copied()
        }
    }

    impl Predecessors for TestGraph {
        fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
            self.preds[node.index()].iter().copied()
        }
    }

    impl RootedGraph for TestGraph {
        fn entry(&self) -> NodeId {
            self.entry
        }
    }
}
