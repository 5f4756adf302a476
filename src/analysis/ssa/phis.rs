//! Phi-function placement.
//!
//! Places phi-functions in semi-pruned style: only registers that have more than
//! one reaching definition at the entry of some region are considered, since a
//! register with a single definition everywhere never needs merging. For each
//! such register the iterated dominance frontier of its defining regions receives
//! a phi-function. A placed phi is itself a definition, so the region receiving
//! it joins the worklist and its own frontier is processed in turn.

use std::collections::BTreeSet;

use log::debug;

use crate::{
    analysis::{ControlFlowGraph, InstrId, InstructionNode, Register, Stage},
    utils::graph::NodeId,
};

impl ControlFlowGraph {
    /// Places phi-functions for every register that merges definitions.
    ///
    /// New phi-functions get one empty operand slot per predecessor edge of their
    /// region. Placement is idempotent: a region never receives a second
    /// phi-function for the same register, so running this pass again after it
    /// converged changes nothing.
    ///
    /// # Panics
    ///
    /// Panics unless [`compute_reaching_defs`](Self::compute_reaching_defs) or a
    /// previous placement ran last.
    pub fn place_phis(&mut self) {
        assert!(
            matches!(self.stage, Stage::ReachingDefs | Stage::PhisPlaced),
            "place_phis requires stage {} or {}, but {} is at stage {}",
            Stage::ReachingDefs,
            Stage::PhisPlaced,
            self.method,
            self.stage
        );

        let order = self.regions_in_order();
        let candidates: BTreeSet<Register> = order
            .iter()
            .flat_map(|node| {
                self.regions[node.index()]
                    .reaching_defs
                    .iter()
                    .filter(|(_, definitions)| definitions.len() > 1)
                    .map(|(register, _)| *register)
            })
            .collect();

        let mut placed = 0;
        for &register in &candidates {
            let mut worklist: Vec<NodeId> = order
                .iter()
                .copied()
                .filter(|node| {
                    let region = &self.regions[node.index()];
                    region.de_defs.contains_key(&register) || region.phi_set.contains(&register)
                })
                .collect();
            let mut queued: BTreeSet<NodeId> = worklist.iter().copied().collect();

            while let Some(node) = worklist.pop() {
                let frontier: Vec<NodeId> =
                    self.regions[node.index()].frontier.iter().copied().collect();
                for target in frontier {
                    if self.insert_phi_for(target, register) {
                        placed += 1;
                        if queued.insert(target) {
                            worklist.push(target);
                        }
                    }
                }
            }
        }

        debug!(
            "{}: placed {} phi-functions for {} merged registers",
            self.method,
            placed,
            candidates.len()
        );
        self.stage = Stage::PhisPlaced;
    }

    /// Adds a phi-function for `register` to `region` unless it already has one.
    ///
    /// Returns `true` if a phi-function was created.
    fn insert_phi_for(&mut self, region: NodeId, register: Register) -> bool {
        let target = &mut self.regions[region.index()];
        if !target.phi_set.insert(register) {
            return false;
        }

        let id = InstrId::new(self.instructions.len());
        let slots = target.predecessors.len();
        target.phis.push(id);
        self.instructions
            .push(InstructionNode::phi(id, region, register, slots));
        true
    }
}
