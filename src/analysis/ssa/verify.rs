//! Consistency checks for converted graphs.
//!
//! The [`SsaVerifier`] re-checks the properties SSA renaming is supposed to
//! establish, independently of how they were established:
//!
//! - every use of a reachable instruction resolved to a definition of the used
//!   register, and that definition dominates the use
//! - every phi-function has exactly one slot per predecessor edge, and every slot
//!   of a reachable edge holds a definition of the phi's register that dominates
//!   the predecessor
//! - def-use chains are symmetric: each resolved use appears among the consumers
//!   of its definition
//! - regions unreachable from the entry carry no dominator, frontier, phi or
//!   renaming results

use std::collections::HashMap;

use log::debug;

use crate::{
    analysis::{ControlFlowGraph, InstrId, InstructionNode, Register, Stage},
    utils::graph::NodeId,
    Error, Result,
};

/// Verifies the SSA properties of a renamed [`ControlFlowGraph`].
///
/// # Examples
///
/// ```rust
/// use regssa::analysis::SsaVerifier;
/// use regssa::{BlockRecord, ControlFlowGraph, InstructionRecord, MethodBody, MethodRef};
///
/// let body = MethodBody::new(MethodRef::new(0, 0), 0)
///     .with_parameter(0)
///     .with_block(BlockRecord::new(0).with_instruction(InstructionRecord::new("return").uses([0])));
/// let mut cfg = ControlFlowGraph::from_method_body(body)?;
/// cfg.convert_to_ssa()?;
///
/// SsaVerifier::new(&cfg).verify()?;
/// # Ok::<(), regssa::Error>(())
/// ```
pub struct SsaVerifier<'a> {
    graph: &'a ControlFlowGraph,
    /// Position of each non-phi instruction within its region
    positions: HashMap<InstrId, usize>,
}

impl<'a> SsaVerifier<'a> {
    /// Creates a verifier for `graph`.
    #[must_use]
    pub fn new(graph: &'a ControlFlowGraph) -> Self {
        let positions = graph
            .regions()
            .flat_map(|region| {
                region
                    .instructions()
                    .iter()
                    .enumerate()
                    .map(|(position, id)| (*id, position))
            })
            .collect();
        SsaVerifier { graph, positions }
    }

    /// Runs all checks.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SsaError`] describing the first violated property.
    ///
    /// # Panics
    ///
    /// Panics if a phi slot of a reachable edge is empty. Renaming rejects such
    /// graphs, so an empty slot here means the graph was modified afterwards.
    pub fn verify(&self) -> Result<()> {
        if self.graph.stage() != Stage::Renamed {
            return Err(Error::SsaError(format!(
                "{} is at stage {}, not renamed",
                self.graph.method(),
                self.graph.stage()
            )));
        }

        for region in self.graph.regions() {
            if region.is_reachable() {
                for &phi in region.phis() {
                    self.verify_phi(self.graph.instruction(phi))?;
                }
                for &id in region.instructions() {
                    self.verify_uses(self.graph.instruction(id))?;
                }
            } else {
                self.verify_untouched(region.id())?;
            }
        }

        debug!("{}: SSA form verified", self.graph.method());
        Ok(())
    }

    /// Checks that `definition` defines `register` and is visible at position
    /// `position` of region `at` (`None` meaning the end of the region).
    fn check_definition(
        &self,
        definition: InstrId,
        register: Register,
        at: NodeId,
        position: Option<usize>,
        user: InstrId,
    ) -> Result<()> {
        let def_node = self.graph.instruction(definition);
        if !def_node.definitions().contains(&register) {
            return Err(Error::SsaError(format!(
                "{user} reads {register} from {definition}, which does not define it"
            )));
        }

        let visible = if def_node.region() == at {
            match (def_node.is_phi(), position) {
                (true, _) | (false, None) => true,
                (false, Some(use_position)) => self
                    .positions
                    .get(&definition)
                    .is_some_and(|def_position| *def_position < use_position),
            }
        } else {
            self.graph.dominates(def_node.region(), at)
        };

        if !visible {
            return Err(Error::SsaError(format!(
                "definition {definition} of {register} does not dominate its use in {user}"
            )));
        }

        if !def_node.consumers().contains(&user) {
            return Err(Error::SsaError(format!(
                "{user} is missing from the consumers of {definition}"
            )));
        }
        Ok(())
    }

    fn verify_uses(&self, node: &InstructionNode) -> Result<()> {
        if node.ssa_uses().len() != node.uses().len() {
            return Err(Error::SsaError(format!(
                "{} resolved {} of {} uses",
                node.id(),
                node.ssa_uses().len(),
                node.uses().len()
            )));
        }

        let position = self.positions.get(&node.id()).copied();
        for (register, resolved) in node.uses().iter().zip(node.ssa_uses()) {
            let Some(definition) = resolved else {
                return Err(Error::SsaError(format!(
                    "use of {register} in {} is unresolved",
                    node.id()
                )));
            };
            self.check_definition(*definition, *register, node.region(), position, node.id())?;
        }
        Ok(())
    }

    fn verify_phi(&self, phi: &InstructionNode) -> Result<()> {
        let region = self.graph.region(phi.region());
        let (Some(register), Some(operands)) = (phi.result_register(), phi.phi_operands()) else {
            return Err(Error::SsaError(format!(
                "{} is listed as a phi-function but is not one",
                phi.id()
            )));
        };

        if operands.len() != region.predecessors().len() {
            return Err(Error::SsaError(format!(
                "phi {} has {} slots for {} predecessors",
                phi.id(),
                operands.len(),
                region.predecessors().len()
            )));
        }

        for (slot, (operand, &pred)) in operands.iter().zip(region.predecessors()).enumerate() {
            if !self.graph.is_reachable(pred) {
                continue;
            }
            let Some(definition) = operand else {
                panic!(
                    "phi {} has no operand for the reachable edge {} -> {} (slot {})",
                    phi.id(),
                    pred,
                    region.id(),
                    slot
                );
            };
            self.check_definition(*definition, register, pred, None, phi.id())?;
        }
        Ok(())
    }

    fn verify_untouched(&self, region: NodeId) -> Result<()> {
        let region = self.graph.region(region);
        let touched = region.immediate_dominator().is_some()
            || !region.idominated().is_empty()
            || !region.frontier().is_empty()
            || !region.phis().is_empty()
            || region
                .instructions()
                .iter()
                .any(|id| !self.graph.instruction(*id).ssa_uses().is_empty());

        if touched {
            return Err(Error::SsaError(format!(
                "unreachable region {} carries analysis results",
                region.id()
            )));
        }
        Ok(())
    }
}

impl ControlFlowGraph {
    /// Verifies the SSA properties of this graph with an [`SsaVerifier`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::SsaError`] describing the first violated property.
    pub fn verify_ssa(&self) -> Result<()> {
        SsaVerifier::new(self).verify()
    }
}
