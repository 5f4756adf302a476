//! Control Flow Graph implementation.
//!
//! This module provides the [`ControlFlowGraph`] arena that owns every region and
//! instruction of one method, and sequences the passes converting it to SSA form.

use std::collections::BTreeMap;

use strum::Display;

use crate::{
    analysis::cfg::{InstrId, InstructionNode, MethodRef, Region},
    utils::graph::{
        algorithms::{DominatorTree, RpoNumbering},
        GraphBase, NodeId, Predecessors, RootedGraph, Successors,
    },
    Result,
};

/// Progress of a graph through the SSA pipeline.
///
/// Every pass checks the stage it requires and advances it when done, so a pass
/// run out of order fails loudly instead of reading annotations that do not
/// exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Stage {
    /// Topology built, no annotations
    Assembled,
    /// Reverse postorder numbers assigned
    Numbered,
    /// Immediate dominators and dominator tree children known
    Dominators,
    /// Dominance frontiers known
    Frontiers,
    /// Downward-exposed definitions known
    ExposedDefs,
    /// Reaching definitions at region entry known
    ReachingDefs,
    /// Phi-functions placed
    PhisPlaced,
    /// Every use resolved to its SSA definition
    Renamed,
}

/// The register IR of one method: an arena of regions and instructions.
///
/// The graph is the sole owner of its regions and instructions; everything else
/// refers to them through [`NodeId`] and [`InstrId`] handles. It is created by
/// [`from_method_body`](Self::from_method_body) and then annotated in place by the
/// SSA passes:
///
/// 1. [`compute_rpo`](Self::compute_rpo)
/// 2. [`compute_idominators`](Self::compute_idominators)
/// 3. [`compute_dominance_frontier`](Self::compute_dominance_frontier)
/// 4. [`compute_down_exposed_defs`](Self::compute_down_exposed_defs)
/// 5. [`compute_reaching_defs`](Self::compute_reaching_defs)
/// 6. [`place_phis`](Self::place_phis)
/// 7. [`rename_as_ssa`](Self::rename_as_ssa)
///
/// [`convert_to_ssa`](Self::convert_to_ssa) runs all of them in order. Regions
/// unreachable from the entry are numbered `NotVisited` by the first pass and
/// skipped by all later ones.
///
/// # Examples
///
/// ```rust
/// use regssa::{BlockRecord, ControlFlowGraph, InstructionRecord, MethodBody, MethodRef};
///
/// let body = MethodBody::new(MethodRef::new(0, 0), 0)
///     .with_parameter(0)
///     .with_block(
///         BlockRecord::new(0)
///             .with_instruction(InstructionRecord::new("add-int/lit8").defs([1]).uses([0]))
///             .with_instruction(InstructionRecord::new("return").uses([1])),
///     );
///
/// let mut cfg = ControlFlowGraph::from_method_body(body)?;
/// cfg.convert_to_ssa()?;
///
/// let entry = cfg.region(cfg.entry_region());
/// let ret = cfg.instruction(entry.instructions()[2]);
/// assert_eq!(ret.ssa_uses(), &[Some(entry.instructions()[1])]);
/// # Ok::<(), regssa::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    pub(crate) method: MethodRef,
    pub(crate) regions: Vec<Region>,
    pub(crate) instructions: Vec<InstructionNode>,
    /// Signature placeholders in parameter order
    pub(crate) signature: Vec<InstrId>,
    pub(crate) entry: NodeId,
    /// Region holding the signature placeholders when the entry block is also a
    /// branch target
    pub(crate) prologue: Option<NodeId>,
    /// Block offset to region
    pub(crate) labels: BTreeMap<u32, NodeId>,
    pub(crate) rpo: Option<RpoNumbering>,
    pub(crate) dominators: Option<DominatorTree>,
    pub(crate) stage: Stage,
}

impl ControlFlowGraph {
    /// Returns the method this graph was assembled for.
    #[must_use]
    pub fn method(&self) -> MethodRef {
        self.method
    }

    /// Returns the pipeline stage reached so far.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns the region where execution of the method starts.
    #[must_use]
    pub fn entry_region(&self) -> NodeId {
        self.entry
    }

    /// Returns the prologue region, if the entry block is also a branch target.
    ///
    /// The prologue holds only the signature placeholders and shares the entry
    /// block's label, but [`region_at`](Self::region_at) never returns it.
    #[must_use]
    pub fn prologue_region(&self) -> Option<NodeId> {
        self.prologue
    }

    /// Returns the region created for the block starting at `offset`.
    #[must_use]
    pub fn region_at(&self, offset: u32) -> Option<NodeId> {
        self.labels.get(&offset).copied()
    }

    /// Returns a region by handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    #[must_use]
    pub fn region(&self, id: NodeId) -> &Region {
        &self.regions[id.index()]
    }

    /// Returns all regions, including unreachable ones, by ascending id.
    pub fn regions(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    /// Returns the number of regions.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Returns an instruction by handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this graph.
    #[must_use]
    pub fn instruction(&self, id: InstrId) -> &InstructionNode {
        &self.instructions[id.index()]
    }

    /// Returns all instructions in arena order: signature placeholders, decoded
    /// instructions, then phi-functions.
    #[must_use]
    pub fn instructions(&self) -> &[InstructionNode] {
        &self.instructions
    }

    /// Returns the signature placeholders in parameter order.
    #[must_use]
    pub fn parameters(&self) -> &[InstrId] {
        &self.signature
    }

    /// Returns the reachable regions in reverse postorder.
    ///
    /// Empty until [`compute_rpo`](Self::compute_rpo) has run.
    #[must_use]
    pub fn rpo_order(&self) -> &[NodeId] {
        match &self.rpo {
            Some(rpo) => rpo.order(),
            None => &[],
        }
    }

    /// Returns `true` if `region` has been numbered as reachable from the entry.
    #[must_use]
    pub fn is_reachable(&self, region: NodeId) -> bool {
        self.rpo.as_ref().is_some_and(|rpo| rpo.is_reachable(region))
    }

    /// Returns the regions in canonical traversal order: the reachable regions in
    /// reverse postorder once numbered, every region by id before that.
    #[must_use]
    pub fn regions_in_order(&self) -> Vec<NodeId> {
        match &self.rpo {
            Some(rpo) => rpo.order().to_vec(),
            None => self.node_ids().collect(),
        }
    }

    /// Runs every SSA pass in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedRegister`](crate::Error::UndefinedRegister) or
    /// [`Error::MissingPhiOperand`](crate::Error::MissingPhiOperand) if renaming
    /// finds a register without reaching definition.
    ///
    /// # Panics
    ///
    /// Panics if any pass has already run on this graph.
    pub fn convert_to_ssa(&mut self) -> Result<()> {
        self.compute_rpo();
        self.compute_idominators();
        self.compute_dominance_frontier();
        self.compute_down_exposed_defs();
        self.compute_reaching_defs();
        self.place_phis();
        self.rename_as_ssa()
    }

    /// Checks that the graph is at `required` and moves it to `next`.
    pub(crate) fn advance(&mut self, pass: &str, required: Stage, next: Stage) {
        assert!(
            self.stage == required,
            "{pass} requires stage {required}, but {} is at stage {}",
            self.method,
            self.stage
        );
        self.stage = next;
    }

    pub(crate) fn numbering(&self) -> &RpoNumbering {
        match &self.rpo {
            Some(rpo) => rpo,
            None => panic!("{} has not been numbered", self.method),
        }
    }

    pub(crate) fn dominator_tree(&self) -> &DominatorTree {
        match &self.dominators {
            Some(tree) => tree,
            None => panic!("{} has no dominator tree", self.method),
        }
    }
}

impl GraphBase for ControlFlowGraph {
    fn node_count(&self) -> usize {
        self.regions.len()
    }

    fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.regions.len()).map(NodeId::new)
    }
}

impl Successors for ControlFlowGraph {
    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.regions[node.index()].successors.iter().copied()
    }
}

impl Predecessors for ControlFlowGraph {
    fn predecessors(&self, node: NodeId) -> impl Iterator<Item = NodeId> {
        self.regions[node.index()].predecessors.iter().copied()
    }
}

impl RootedGraph for ControlFlowGraph {
    fn entry(&self) -> NodeId {
        self.entry
    }
}
