//! Regions (basic blocks) of the control flow graph.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    analysis::cfg::{EdgeKind, InstrId, Register},
    utils::graph::{algorithms::RpoNumber, NodeId},
};

/// A basic block of the register IR together with its dataflow annotations.
///
/// Topology (instructions, successors, predecessors) is fixed when the graph is
/// assembled. The remaining fields start out empty and are filled in place by the
/// SSA passes, in pass order; none of them is ever rolled back. Regions that are
/// unreachable from the method entry keep their initial annotations.
///
/// All links to other regions are [`NodeId`] handles into the owning
/// [`ControlFlowGraph`](crate::analysis::ControlFlowGraph).
#[derive(Debug, Clone)]
pub struct Region {
    pub(crate) id: NodeId,
    /// Decoder offset of the block's first instruction
    pub(crate) label: u32,
    /// Signature placeholders (entry only) followed by decoded instructions
    pub(crate) instructions: Vec<InstrId>,
    pub(crate) successors: Vec<NodeId>,
    /// Edge kind of each entry of `successors`
    pub(crate) successor_kinds: Vec<EdgeKind>,
    pub(crate) predecessors: Vec<NodeId>,
    pub(crate) rpo: RpoNumber,
    pub(crate) idom: Option<NodeId>,
    /// Dominator tree children, in reverse postorder
    pub(crate) idominated: Vec<NodeId>,
    pub(crate) frontier: BTreeSet<NodeId>,
    /// Last definition of each register in this region
    pub(crate) de_defs: BTreeMap<Register, InstrId>,
    /// Definitions of each register that may reach the region entry
    pub(crate) reaching_defs: BTreeMap<Register, BTreeSet<InstrId>>,
    /// Total number of definitions in `reaching_defs`
    pub(crate) reaching_defs_size: usize,
    /// Registers that already carry a phi-function in this region
    pub(crate) phi_set: BTreeSet<Register>,
    pub(crate) phis: Vec<InstrId>,
}

impl Region {
    pub(crate) fn new(id: NodeId, label: u32) -> Self {
        Region {
            id,
            label,
            instructions: Vec::new(),
            successors: Vec::new(),
            successor_kinds: Vec::new(),
            predecessors: Vec::new(),
            rpo: RpoNumber::NotVisited,
            idom: None,
            idominated: Vec::new(),
            frontier: BTreeSet::new(),
            de_defs: BTreeMap::new(),
            reaching_defs: BTreeMap::new(),
            reaching_defs_size: 0,
            phi_set: BTreeSet::new(),
            phis: Vec::new(),
        }
    }

    /// Returns the handle of this region.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the decoder offset this region was created for.
    #[must_use]
    pub fn label(&self) -> u32 {
        self.label
    }

    /// Returns the region's instructions in program order.
    ///
    /// Phi-functions are not part of this list; see [`phis`](Self::phis).
    #[must_use]
    pub fn instructions(&self) -> &[InstrId] {
        &self.instructions
    }

    /// Returns the last instruction in program order, if the region has any.
    #[must_use]
    pub fn last_instruction(&self) -> Option<InstrId> {
        self.instructions.last().copied()
    }

    /// Returns the phi-functions of this region in insertion order.
    #[must_use]
    pub fn phis(&self) -> &[InstrId] {
        &self.phis
    }

    /// Returns the successor regions, one entry per outgoing edge.
    #[must_use]
    pub fn successors(&self) -> &[NodeId] {
        &self.successors
    }

    /// Returns the successor regions paired with the kind of each edge.
    pub fn successor_edges(&self) -> impl Iterator<Item = (NodeId, EdgeKind)> + '_ {
        self.successors
            .iter()
            .copied()
            .zip(self.successor_kinds.iter().copied())
    }

    /// Returns the predecessor regions, one entry per incoming edge.
    ///
    /// The position of a predecessor in this list is the phi slot index for
    /// values flowing in along that edge.
    #[must_use]
    pub fn predecessors(&self) -> &[NodeId] {
        &self.predecessors
    }

    /// Returns the reverse postorder state of this region.
    #[must_use]
    pub fn rpo(&self) -> RpoNumber {
        self.rpo
    }

    /// Returns `true` once numbering has reached this region from the entry.
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.rpo.index().is_some()
    }

    /// Returns the immediate dominator; `None` for the entry and unreachable regions.
    #[must_use]
    pub fn immediate_dominator(&self) -> Option<NodeId> {
        self.idom
    }

    /// Returns the regions this region immediately dominates.
    #[must_use]
    pub fn idominated(&self) -> &[NodeId] {
        &self.idominated
    }

    /// Returns the dominance frontier of this region.
    #[must_use]
    pub fn frontier(&self) -> &BTreeSet<NodeId> {
        &self.frontier
    }

    /// Returns the downward-exposed definition of each register defined here.
    #[must_use]
    pub fn downward_exposed_defs(&self) -> &BTreeMap<Register, InstrId> {
        &self.de_defs
    }

    /// Returns the definitions of each register that may reach the region entry.
    #[must_use]
    pub fn reaching_defs(&self) -> &BTreeMap<Register, BTreeSet<InstrId>> {
        &self.reaching_defs
    }

    /// Returns the total number of reaching definitions over all registers.
    #[must_use]
    pub fn reaching_defs_size(&self) -> usize {
        self.reaching_defs_size
    }

    /// Returns `true` if a phi-function for `register` has been placed here.
    #[must_use]
    pub fn has_phi_for(&self, register: Register) -> bool {
        self.phi_set.contains(&register)
    }
}
