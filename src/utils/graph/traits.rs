//! Trait definitions for graph abstractions.
//!
//! This module defines the core traits that enable graph algorithms to work with
//! different graph implementations. By programming against these traits, the
//! dominance algorithms run unchanged on a method's
//! [`ControlFlowGraph`](crate::analysis::ControlFlowGraph) and on the small
//! adjacency-list graphs used in unit tests.
//!
//! # Architecture
//!
//! The trait hierarchy is designed to be minimal and composable:
//!
//! - [`GraphBase`] - Core properties: node count and node iteration
//! - [`Successors`] - Forward edge traversal (outgoing edges)
//! - [`Predecessors`] - Backward edge traversal (incoming edges)
//! - [`RootedGraph`] - Graphs with a designated entry node (for dominator computation)
//!
//! Adjacency queries return iterators rather than collections, so simple
//! traversals do not allocate. Parallel edges are reported once per edge:
//! a switch with two cases jumping to the same block yields that block twice.

use crate::utils::graph::NodeId;

/// Base trait providing core graph properties.
///
/// This trait defines the fundamental properties that all graphs must have:
/// the number of nodes and the ability to iterate over all node identifiers.
pub trait GraphBase {
    /// Returns the number of nodes in the graph.
    ///
    /// This count includes all nodes, including those unreachable from any entry.
    fn node_count(&self) -> usize;

    /// Returns an iterator over all node identifiers in the graph, by ascending index.
    fn node_ids(&self) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs that support forward edge traversal.
///
/// # Examples
///
/// ```rust
/// use regssa::utils::graph::Successors;
/// use regssa::{BlockRecord, ControlFlowGraph, MethodBody, MethodRef};
///
/// let body = MethodBody::new(MethodRef::new(0, 0), 0)
///     .with_block(BlockRecord::new(0).branches_to(4).falls_through_to(2))
///     .with_block(BlockRecord::new(2))
///     .with_block(BlockRecord::new(4));
/// let cfg = ControlFlowGraph::from_method_body(body)?;
///
/// assert_eq!(cfg.successors(cfg.entry_region()).count(), 2);
/// # Ok::<(), regssa::Error>(())
/// ```
pub trait Successors: GraphBase {
    /// Returns an iterator over the successor nodes of the given node.
    ///
    /// For a directed edge `(u, v)`, node `v` is a successor of `u`.
    ///
    /// # Panics
    ///
    /// May panic if `node` is not a valid node in the graph.
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs that support backward edge traversal.
///
/// The iteration order of predecessors is significant for control flow graphs:
/// position `i` of a region's predecessor list is the slot index phi-functions
/// of that region use for values flowing in along that edge.
pub trait Predecessors: GraphBase {
    /// Returns an iterator over the predecessor nodes of the given node.
    ///
    /// For a directed edge `(u, v)`, node `u` is a predecessor of `v`.
    ///
    /// # Panics
    ///
    /// May panic if `node` is not a valid node in the graph.
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId>;
}

/// Trait for graphs with a designated entry (root) node.
///
/// This is essential for algorithms like reverse postorder numbering and
/// dominator computation that require a well-defined starting point. In a
/// control flow graph the entry is the region holding the method's first
/// instruction and its signature placeholders.
pub trait RootedGraph: Successors + Predecessors {
    /// Returns the entry (root) node of the graph.
    fn entry(&self) -> NodeId;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::graph::testing::TestGraph;

    #[test]
    fn test_graph_base() {
        let graph = TestGraph::new(5, &[]);
        assert_eq!(graph.node_count(), 5);

        let ids: Vec<NodeId> = graph.node_ids().collect();
        assert_eq!(ids.len(), 5);
        assert_eq!(ids[0], NodeId::new(0));
        assert_eq!(ids[4], NodeId::new(4));
    }

    #[test]
    fn test_successors_and_predecessors() {
        let graph = TestGraph::new(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);

        let succ: Vec<NodeId> = graph.successors(NodeId::new(0)).collect();
        assert_eq!(succ, vec![NodeId::new(1), NodeId::new(2)]);

        let pred: Vec<NodeId> = graph.predecessors(NodeId::new(3)).collect();
        assert_eq!(pred, vec![NodeId::new(1), NodeId::new(2)]);

        assert!(graph.predecessors(NodeId::new(0)).next().is_none());
        assert!(graph.successors(NodeId::new(3)).next().is_none());
    }

    #[test]
    fn test_parallel_edges_are_reported_per_edge() {
        let graph = TestGraph::new(2, &[(0, 1), (0, 1)]);
        assert_eq!(graph.successors(NodeId::new(0)).count(), 2);
        assert_eq!(graph.predecessors(NodeId::new(1)).count(), 2);
    }

    #[test]
    fn test_rooted_graph() {
        let graph = TestGraph::new(3, &[]);
        assert_eq!(graph.entry(), NodeId::new(0));
    }
}
