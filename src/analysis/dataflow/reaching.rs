//! Reaching definitions analysis over register regions.
//!
//! Reaching definitions computes, for each region, which register definitions
//! may reach the region entry without being overwritten by an intervening
//! definition of the same register. Phi-function placement uses the result to
//! decide which registers ever merge more than one definition.
//!
//! # Algorithm
//!
//! For each region B:
//! - `DE[B](r)` = the last instruction of B defining `r` (downward-exposed)
//! - `RD[B](r)` = ∪ { DE[P](r) if P defines r, else RD[P](r) | P is a reachable predecessor of B }
//!
//! A region that defines `r` kills every definition of `r` flowing into it, so
//! only its own last definition leaves the region. The equations are solved by
//! sweeping the reachable regions in reverse postorder until no set grows. Sets
//! are only ever unioned into, which makes the iteration monotonic; growth is
//! detected by comparing the total number of definitions per region.
//!
//! # Termination
//!
//! Every sweep that reports a change adds at least one definition to some region.
//! The sweep count is bounded by `regions × registers + 1`; exceeding the bound
//! means the monotonicity invariant is broken and aborts the conversion.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, trace};

use crate::{
    analysis::{ControlFlowGraph, InstrId, Register, Stage},
    utils::graph::NodeId,
};

impl ControlFlowGraph {
    /// Records, for every reachable region, the last definition of each register.
    ///
    /// Signature placeholders count as definitions of the entry region.
    ///
    /// # Panics
    ///
    /// Panics unless
    /// [`compute_dominance_frontier`](Self::compute_dominance_frontier) ran last.
    pub fn compute_down_exposed_defs(&mut self) {
        self.advance(
            "compute_down_exposed_defs",
            Stage::Frontiers,
            Stage::ExposedDefs,
        );

        for node in self.regions_in_order() {
            let mut exposed: BTreeMap<Register, InstrId> = BTreeMap::new();
            for &id in &self.regions[node.index()].instructions {
                for &register in &self.instructions[id.index()].defs {
                    exposed.insert(register, id);
                }
            }
            self.regions[node.index()].de_defs = exposed;
        }
    }

    /// Solves the reaching definitions equations to a fixed point.
    ///
    /// # Panics
    ///
    /// Panics unless
    /// [`compute_down_exposed_defs`](Self::compute_down_exposed_defs) ran last, or
    /// if the iteration fails to converge within its bound.
    pub fn compute_reaching_defs(&mut self) {
        self.advance(
            "compute_reaching_defs",
            Stage::ExposedDefs,
            Stage::ReachingDefs,
        );

        let iterations = self.solve_reaching_defs();
        debug!(
            "{}: {} definitions reach region entries after {} sweeps",
            self.method,
            self.regions
                .iter()
                .map(|region| region.reaching_defs_size)
                .sum::<usize>(),
            iterations
        );
    }

    /// Sweeps the reachable regions in reverse postorder until no set grows.
    ///
    /// Returns the number of sweeps, including the final one that changed
    /// nothing.
    fn solve_reaching_defs(&mut self) -> usize {
        let order = self.regions_in_order();
        let registers: BTreeSet<Register> = order
            .iter()
            .flat_map(|node| self.regions[node.index()].de_defs.keys().copied())
            .collect();
        let bound = order.len() * registers.len().max(1) + 1;

        let mut iterations = 0;
        loop {
            iterations += 1;
            assert!(
                iterations <= bound,
                "reaching definitions of {} did not converge within {} iterations",
                self.method,
                bound
            );

            let mut changed = false;
            for &node in &order {
                let incoming = self.incoming_definitions(node);

                let region = &mut self.regions[node.index()];
                for (register, definitions) in incoming {
                    region
                        .reaching_defs
                        .entry(register)
                        .or_default()
                        .extend(definitions);
                }

                let size: usize = region.reaching_defs.values().map(BTreeSet::len).sum();
                debug_assert!(
                    size >= region.reaching_defs_size,
                    "reaching definitions of {} shrank",
                    region.id
                );
                if size != region.reaching_defs_size {
                    region.reaching_defs_size = size;
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        trace!(
            "{}: reaching definitions converged after {} iterations (bound {})",
            self.method,
            iterations,
            bound
        );
        iterations
    }

    /// Definitions flowing into `node` along its reachable predecessor edges.
    fn incoming_definitions(&self, node: NodeId) -> BTreeMap<Register, BTreeSet<InstrId>> {
        let mut incoming: BTreeMap<Register, BTreeSet<InstrId>> = BTreeMap::new();

        for &pred in &self.regions[node.index()].predecessors {
            let pred = &self.regions[pred.index()];
            if !pred.is_reachable() {
                continue;
            }

            for (&register, &definition) in &pred.de_defs {
                incoming.entry(register).or_default().insert(definition);
            }
            for (register, definitions) in &pred.reaching_defs {
                if !pred.de_defs.contains_key(register) {
                    incoming
                        .entry(*register)
                        .or_default()
                        .extend(definitions.iter().copied());
                }
            }
        }

        incoming
    }
}
