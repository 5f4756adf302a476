//! Depth-first traversal and reverse postorder numbering.
//!
//! Reverse postorder (RPO) is the iteration order of choice for forward dataflow
//! problems: in an acyclic region every node is visited after all of its
//! predecessors, so information propagates in a single sweep and loops only cost
//! a few extra passes. The dominator and reaching-definition fixed points both
//! iterate in this order.
//!
//! # Visiting Markers
//!
//! The walk is iterative with an explicit stack, so deep graphs cannot overflow
//! the native stack. While a node is on the stack it carries the
//! [`RpoNumber::Visiting`] marker: a back edge reaching it is ignored instead of
//! restarting the node, which keeps the numbering well-defined on cyclic graphs.
//! Nodes the walk never reaches keep [`RpoNumber::NotVisited`].

use std::fmt;

use crate::utils::graph::{NodeId, Successors};

/// Reverse postorder state of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpoNumber {
    /// The node has not been reached from the entry (unreachable after numbering).
    NotVisited,
    /// The node is currently on the depth-first stack.
    Visiting,
    /// The node's final reverse postorder index; the entry receives 0.
    Index(usize),
}

impl RpoNumber {
    /// Returns the numeric index, if the node has been numbered.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            RpoNumber::Index(index) => Some(index),
            RpoNumber::NotVisited | RpoNumber::Visiting => None,
        }
    }
}

impl fmt::Display for RpoNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpoNumber::NotVisited => write!(f, "not-visited"),
            RpoNumber::Visiting => write!(f, "visiting"),
            RpoNumber::Index(index) => write!(f, "{index}"),
        }
    }
}

/// Reverse postorder numbering of the nodes reachable from a start node.
///
/// Holds both directions of the mapping: the number of every node of the graph
/// and the reachable nodes listed in ascending RPO.
///
/// # Examples
///
/// ```rust
/// use regssa::utils::graph::algorithms::{reverse_postorder, RpoNumber};
/// use regssa::{BlockRecord, ControlFlowGraph, MethodBody, MethodRef};
///
/// // 0 -> 2 -> 4 -> 2 (loop), 8 is never reached
/// let body = MethodBody::new(MethodRef::new(0, 0), 0)
///     .with_block(BlockRecord::new(0).falls_through_to(2))
///     .with_block(BlockRecord::new(2).falls_through_to(4))
///     .with_block(BlockRecord::new(4).branches_to(2))
///     .with_block(BlockRecord::new(8));
/// let cfg = ControlFlowGraph::from_method_body(body)?;
///
/// let rpo = reverse_postorder(&cfg, cfg.entry_region());
/// assert_eq!(rpo.len(), 3);
/// assert_eq!(rpo.number(cfg.entry_region()), RpoNumber::Index(0));
/// assert_eq!(rpo.number(cfg.region_at(8).unwrap()), RpoNumber::NotVisited);
/// # Ok::<(), regssa::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpoNumbering {
    /// Number of each node, indexed by node id
    numbers: Vec<RpoNumber>,
    /// Reachable nodes in ascending reverse postorder
    order: Vec<NodeId>,
}

impl RpoNumbering {
    /// Returns the state of `node`; nodes outside the graph report `NotVisited`.
    #[must_use]
    pub fn number(&self, node: NodeId) -> RpoNumber {
        self.numbers
            .get(node.index())
            .copied()
            .unwrap_or(RpoNumber::NotVisited)
    }

    /// Returns the reverse postorder index of `node`, or `None` if it is unreachable.
    #[must_use]
    pub fn index(&self, node: NodeId) -> Option<usize> {
        self.number(node).index()
    }

    /// Returns `true` if `node` was reached from the start node.
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        self.index(node).is_some()
    }

    /// Returns the reachable nodes in ascending reverse postorder.
    #[must_use]
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Returns the start node of the walk, or `None` for an empty graph.
    #[must_use]
    pub fn entry(&self) -> Option<NodeId> {
        self.order.first().copied()
    }

    /// Returns the number of reachable nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no node was reached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the index of `node`, aborting if the node was never numbered.
    ///
    /// Used by algorithms whose correctness depends on a complete numbering of
    /// their inputs; asking for the number of an unreachable node there is a bug
    /// in the caller, not a property of the analysed method.
    pub(crate) fn expect_index(&self, node: NodeId, context: &str) -> usize {
        match self.number(node) {
            RpoNumber::Index(index) => index,
            other => panic!("{context}: node {node} has no reverse postorder number ({other})"),
        }
    }
}

/// One frame of the explicit depth-first stack.
struct Frame {
    node: NodeId,
    successors: Vec<NodeId>,
    next: usize,
}

/// Walks the graph depth-first from `start`, returning the postorder and leaving
/// every reached node marked with its postorder position.
fn depth_first<G: Successors>(graph: &G, start: NodeId) -> (Vec<NodeId>, Vec<RpoNumber>) {
    let node_count = graph.node_count();
    let mut numbers = vec![RpoNumber::NotVisited; node_count];

    if start.index() >= node_count {
        return (Vec::new(), numbers);
    }

    let mut post = Vec::with_capacity(node_count);
    numbers[start.index()] = RpoNumber::Visiting;
    let mut stack = vec![Frame {
        node: start,
        successors: graph.successors(start).collect(),
        next: 0,
    }];

    while let Some(frame) = stack.last_mut() {
        match frame.successors.get(frame.next).copied() {
            Some(succ) => {
                frame.next += 1;
                if numbers[succ.index()] == RpoNumber::NotVisited {
                    numbers[succ.index()] = RpoNumber::Visiting;
                    stack.push(Frame {
                        node: succ,
                        successors: graph.successors(succ).collect(),
                        next: 0,
                    });
                }
            }
            None => {
                let node = frame.node;
                numbers[node.index()] = RpoNumber::Index(post.len());
                post.push(node);
                stack.pop();
            }
        }
    }

    (post, numbers)
}

/// Computes the depth-first postorder of all nodes reachable from `start`.
///
/// Successors are explored in their adjacency order. A node is emitted after all
/// of its depth-first children; back edges to nodes still on the stack are skipped.
///
/// # Complexity
///
/// - Time: O(V + E)
/// - Space: O(V)
#[must_use]
pub fn postorder<G: Successors>(graph: &G, start: NodeId) -> Vec<NodeId> {
    depth_first(graph, start).0
}

/// Computes the reverse postorder numbering of all nodes reachable from `start`.
///
/// The start node receives index 0; the last node to finish in the depth-first
/// walk receives the highest index. Unreachable nodes stay
/// [`RpoNumber::NotVisited`].
///
/// # Complexity
///
/// - Time: O(V + E)
/// - Space: O(V)
#[must_use]
pub fn reverse_postorder<G: Successors>(graph: &G, start: NodeId) -> RpoNumbering {
    let (post, mut numbers) = depth_first(graph, start);
    let count = post.len();

    for (position, node) in post.iter().enumerate() {
        numbers[node.index()] = RpoNumber::Index(count - 1 - position);
    }

    let mut order = post;
    order.reverse();

    RpoNumbering { numbers, order }
}
