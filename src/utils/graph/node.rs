//! Node identifier implementation for directed graphs.
//!
//! This module provides the [`NodeId`] type, a strongly-typed identifier for nodes
//! within a directed graph. In a [`ControlFlowGraph`](crate::analysis::ControlFlowGraph)
//! every region is addressed by the `NodeId` it received during assembly; the id
//! doubles as the region's index into the graph's region arena.

use std::fmt;

/// A strongly-typed identifier for nodes within a directed graph.
///
/// `NodeId` wraps a `usize` index, providing type safety to prevent
/// accidental mixing of node indices with other integer values such as
/// register numbers or bytecode offsets. Node IDs are assigned sequentially
/// starting from 0 when regions are created.
///
/// Because edges, dominator links and frontier sets are all stored as `NodeId`
/// lists, the cyclic structure of a control flow graph never turns into an
/// ownership cycle: the graph owns every region, and regions only hold handles.
///
/// # Examples
///
/// ```rust
/// use regssa::utils::graph::NodeId;
/// use std::collections::BTreeSet;
///
/// let a = NodeId::new(0);
/// let b = NodeId::new(1);
/// assert_ne!(a, b);
///
/// // NodeIds order by index, so they can key ordered collections
/// let frontier: BTreeSet<NodeId> = [b, a].into_iter().collect();
/// assert_eq!(frontier.first(), Some(&a));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Creates a new `NodeId` from a raw index value.
    ///
    /// This constructor is primarily intended for internal use and testing.
    /// Normal usage obtains `NodeId` values from the graph that owns the node.
    #[must_use]
    #[inline]
    pub const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Returns the raw index value of this node identifier.
    ///
    /// The index is a 0-based position that can be used to index into vectors
    /// that store per-node data.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

impl fmt::Display for NodeId {
    /// Formats the node ID for user display, e.g. `n3`.
    ///
    /// The same spelling is used as the node identifier in DOT dumps.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

impl From<NodeId> for usize {
    #[inline]
    fn from(node: NodeId) -> Self {
        node.0
    }
}
