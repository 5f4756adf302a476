//! Dominator tree and dominance frontier computation.
//!
//! The dominator tree is the backbone of SSA construction: phi-functions are
//! placed on dominance frontiers, and renaming walks the tree so that every use
//! sees the definitions of the regions that dominate it.
//!
//! # Theory
//!
//! A node `d` **dominates** a node `n` if every path from the entry node to `n`
//! must pass through `d`. The **immediate dominator** of `n` (idom(n)) is the
//! unique node that strictly dominates `n` but does not strictly dominate any
//! other dominator of `n`.
//!
//! The dominator tree is formed by making each node's immediate dominator its
//! parent. The entry node is the root (it has no dominator).
//!
//! # Algorithm
//!
//! This implementation uses the iterative algorithm of Cooper, Harvey and Kennedy
//! ("A Simple, Fast Dominance Algorithm"). Nodes are processed in reverse
//! postorder; each node's dominator is the intersection of the dominators of its
//! already-processed predecessors, where the intersection of two nodes walks both
//! up the partial tree, always advancing the one with the larger RPO number, until
//! they meet. Full passes repeat until nothing changes. On reducible graphs this
//! converges after two passes; irreducible graphs need a few more.
//!
//! Dominance frontiers use the companion algorithm of Cooper and Torczon: for
//! every join node, walk up from each predecessor until reaching the join's
//! immediate dominator, adding the join to every frontier on the way.

use std::collections::BTreeSet;

use crate::utils::graph::{
    algorithms::traversal::RpoNumbering, GraphBase, NodeId, Predecessors,
};

/// Result of dominator tree computation.
///
/// The dominator tree represents the dominance relationships in a control flow
/// graph. Each reachable node except the entry has exactly one immediate
/// dominator; unreachable nodes are not part of the tree at all.
///
/// # Examples
///
/// ```rust
/// use regssa::utils::graph::algorithms::{compute_dominators, reverse_postorder};
/// use regssa::{BlockRecord, ControlFlowGraph, MethodBody, MethodRef};
///
/// // Diamond: 0 -> {2, 4} -> 6
/// let body = MethodBody::new(MethodRef::new(0, 0), 0)
///     .with_block(BlockRecord::new(0).branches_to(4).falls_through_to(2))
///     .with_block(BlockRecord::new(2).branches_to(6))
///     .with_block(BlockRecord::new(4).falls_through_to(6))
///     .with_block(BlockRecord::new(6));
/// let cfg = ControlFlowGraph::from_method_body(body)?;
///
/// let rpo = reverse_postorder(&cfg, cfg.entry_region());
/// let dom_tree = compute_dominators(&cfg, &rpo);
///
/// let merge = cfg.region_at(6).unwrap();
/// assert_eq!(dom_tree.immediate_dominator(merge), Some(cfg.entry_region()));
/// assert!(!dom_tree.strictly_dominates(cfg.region_at(2).unwrap(), merge));
/// # Ok::<(), regssa::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DominatorTree {
    /// The entry (root) node of the dominator tree
    entry: NodeId,
    /// Immediate dominator for each node (indexed by node ID)
    /// The entry maps to itself, unreachable nodes to `None`
    idom: Vec<Option<NodeId>>,
    /// Dominator tree children of each node, in reverse postorder
    children: Vec<Vec<NodeId>>,
    /// Number of full passes the fixed point needed
    passes: usize,
}

impl DominatorTree {
    /// Returns the entry (root) node of the dominator tree.
    #[inline]
    #[must_use]
    pub fn entry(&self) -> NodeId {
        self.entry
    }

    /// Returns the immediate dominator of a node.
    ///
    /// Returns `None` for the entry node and for nodes unreachable from it.
    #[must_use]
    pub fn immediate_dominator(&self, node: NodeId) -> Option<NodeId> {
        if node == self.entry {
            None
        } else {
            self.idom.get(node.index()).copied().flatten()
        }
    }

    /// Returns `true` if `node` is part of the tree, i.e. reachable from the entry.
    #[inline]
    #[must_use]
    pub fn is_reachable(&self, node: NodeId) -> bool {
        matches!(self.idom.get(node.index()), Some(Some(_)))
    }

    /// Checks if node `a` dominates node `b`.
    ///
    /// A node dominates itself. The entry node dominates all reachable nodes.
    /// Unreachable nodes neither dominate nor are dominated by anything.
    ///
    /// # Complexity
    ///
    /// O(depth) where depth is the depth of `b` in the dominator tree.
    #[must_use]
    pub fn dominates(&self, a: NodeId, b: NodeId) -> bool {
        if !self.is_reachable(a) || !self.is_reachable(b) {
            return false;
        }
        self.dominators(b).any(|dominator| dominator == a)
    }

    /// Checks if node `a` strictly dominates node `b`.
    ///
    /// Strict dominance excludes self-dominance: a strictly dominates b iff
    /// a dominates b and a ≠ b.
    #[inline]
    #[must_use]
    pub fn strictly_dominates(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Returns an iterator over all dominators of a node, from the node itself
    /// up to (and including) the entry node.
    ///
    /// The iterator is empty for unreachable nodes.
    pub fn dominators(&self, node: NodeId) -> DominatorIterator<'_> {
        DominatorIterator {
            tree: self,
            current: self.is_reachable(node).then_some(node),
        }
    }

    /// Returns the depth of a node in the dominator tree.
    ///
    /// The entry node has depth 0. Unreachable nodes also report 0.
    #[must_use]
    pub fn depth(&self, node: NodeId) -> usize {
        self.dominators(node).count().saturating_sub(1)
    }

    /// Returns the children of a node in the dominator tree, in reverse postorder.
    ///
    /// Children are nodes whose immediate dominator is the given node.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        match self.children.get(node.index()) {
            Some(children) => children,
            None => &[],
        }
    }

    /// Returns the number of nodes of the underlying graph.
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.idom.len()
    }

    /// Returns the number of full passes the iterative computation needed.
    #[inline]
    #[must_use]
    pub fn passes(&self) -> usize {
        self.passes
    }
}

/// Iterator over dominators of a node, from the node up to the entry.
pub struct DominatorIterator<'a> {
    tree: &'a DominatorTree,
    current: Option<NodeId>,
}

impl Iterator for DominatorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.tree.immediate_dominator(current);
        Some(current)
    }
}

/// Returns the partial dominator of a node that the fixed point already assigned.
fn assigned_dominator(idom: &[Option<NodeId>], node: NodeId) -> NodeId {
    match idom[node.index()] {
        Some(dominator) => dominator,
        None => panic!("intersect reached {node}, which has no dominator yet"),
    }
}

/// Finds the nearest common ancestor of `a` and `b` in the partial dominator tree.
///
/// # Panics
///
/// Panics if either finger reaches a node without an RPO number or without an
/// assigned dominator; both indicate that the caller skipped numbering.
fn intersect(idom: &[Option<NodeId>], rpo: &RpoNumbering, a: NodeId, b: NodeId) -> NodeId {
    let mut finger1 = a;
    let mut finger2 = b;

    while finger1 != finger2 {
        while rpo.expect_index(finger1, "intersect") > rpo.expect_index(finger2, "intersect") {
            finger1 = assigned_dominator(idom, finger1);
        }
        while rpo.expect_index(finger2, "intersect") > rpo.expect_index(finger1, "intersect") {
            finger2 = assigned_dominator(idom, finger2);
        }
    }

    finger1
}

/// Computes the dominator tree of the nodes numbered by `rpo`.
///
/// The entry is the first node of the numbering. Only numbered (reachable)
/// predecessors contribute; unreachable nodes get no dominator.
///
/// # Arguments
///
/// * `graph` - The graph to analyze
/// * `rpo` - Reverse postorder numbering of `graph` from its entry
///
/// # Complexity
///
/// - Time: O(passes × E × depth), with two passes on reducible graphs
/// - Space: O(V)
///
/// # Panics
///
/// Panics if `rpo` was computed for a different graph, which surfaces as an
/// intersection reaching an unnumbered node.
#[must_use]
pub fn compute_dominators<G>(graph: &G, rpo: &RpoNumbering) -> DominatorTree
where
    G: Predecessors,
{
    let node_count = graph.node_count();
    let mut idom: Vec<Option<NodeId>> = vec![None; node_count];
    let mut children: Vec<Vec<NodeId>> = vec![Vec::new(); node_count];

    let Some(entry) = rpo.entry() else {
        return DominatorTree {
            entry: NodeId::new(0),
            idom,
            children,
            passes: 0,
        };
    };

    idom[entry.index()] = Some(entry);

    let mut passes = 0;
    let mut changed = true;
    while changed {
        changed = false;
        passes += 1;

        for &node in rpo.order().iter().skip(1) {
            let mut new_idom: Option<NodeId> = None;

            for pred in graph.predecessors(node) {
                // Unreachable predecessors and those not yet processed in this pass
                if idom[pred.index()].is_none() {
                    continue;
                }
                new_idom = Some(match new_idom {
                    None => pred,
                    Some(current) => intersect(&idom, rpo, pred, current),
                });
            }

            if new_idom.is_some() && idom[node.index()] != new_idom {
                idom[node.index()] = new_idom;
                changed = true;
            }
        }
    }

    for &node in rpo.order().iter().skip(1) {
        if let Some(parent) = idom[node.index()] {
            children[parent.index()].push(node);
        }
    }

    DominatorTree {
        entry,
        idom,
        children,
        passes,
    }
}

/// Computes dominance frontiers for all nodes in a graph.
///
/// The dominance frontier of a node `n` is the set of all nodes `m` such that:
/// - `n` dominates a predecessor of `m`, but
/// - `n` does not strictly dominate `m`
///
/// Only nodes with at least two reachable predecessors are join points, and
/// unreachable nodes get empty frontiers. For a join point without immediate
/// dominator (the entry) the walk runs up to and including the entry.
///
/// # Arguments
///
/// * `graph` - The control flow graph
/// * `dom_tree` - The precomputed dominator tree
///
/// # Returns
///
/// A vector where `result[i]` contains the dominance frontier of node `i`.
///
/// # Complexity
///
/// - Time: O(V + E) walks, each bounded by the dominator tree depth
/// - Space: O(V²) worst case for the frontiers
#[must_use]
pub fn compute_dominance_frontiers<G>(graph: &G, dom_tree: &DominatorTree) -> Vec<BTreeSet<NodeId>>
where
    G: Predecessors,
{
    let mut frontiers: Vec<BTreeSet<NodeId>> = vec![BTreeSet::new(); graph.node_count()];

    for node in graph.node_ids() {
        if !dom_tree.is_reachable(node) {
            continue;
        }

        let preds: Vec<NodeId> = graph
            .predecessors(node)
            .filter(|pred| dom_tree.is_reachable(*pred))
            .collect();

        if preds.len() < 2 {
            continue;
        }

        let stop = dom_tree.immediate_dominator(node);
        for pred in preds {
            let mut runner = Some(pred);
            while let Some(current) = runner {
                if Some(current) == stop {
                    break;
                }
                frontiers[current.index()].insert(node);
                runner = dom_tree.immediate_dominator(current);
            }
        }
    }

    frontiers
}
