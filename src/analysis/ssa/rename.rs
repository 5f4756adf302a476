//! SSA renaming.
//!
//! Renaming walks the dominator tree depth-first from the entry with a
//! [`ScopedTable`] mapping each register to its current definition. A region
//! opens a scope on entry and closes it after all of its dominator tree children
//! have been processed, so a definition is visible exactly in the regions it
//! dominates. Within a region:
//!
//! 1. each phi-function binds its register,
//! 2. each instruction resolves its uses against the table, then binds the
//!    registers it defines,
//! 3. each phi-function of every CFG successor receives the current binding of its
//!    register in every slot whose predecessor edge comes from this region.
//!
//! The walk is iterative so deep dominator trees cannot exhaust the native stack.

use std::collections::BTreeSet;

use log::debug;

use crate::{
    analysis::{ControlFlowGraph, InstrId, InstructionKind, Register, Stage},
    utils::{graph::NodeId, ScopedTable},
    Error, Result,
};

/// Step of the iterative dominator tree walk.
enum Walk {
    Enter(NodeId),
    Exit,
}

impl ControlFlowGraph {
    /// Resolves every register use to its unique reaching definition.
    ///
    /// Afterwards every instruction of a reachable region has one resolved
    /// definition per use ([`InstructionNode::ssa_uses`]), every definition lists
    /// its users ([`InstructionNode::consumers`]), and every phi slot belonging to
    /// a reachable predecessor holds the definition flowing in along that edge.
    ///
    /// # Errors
    ///
    /// - [`Error::UndefinedRegister`] if a use has no definition in scope, or a
    ///   register merged at the entry block has none on method entry
    /// - [`Error::MissingPhiOperand`] if a phi-function's register has no
    ///   definition at the end of one of its reachable predecessors
    ///
    /// On error the partial results are discarded and the graph stays at
    /// [`Stage::PhisPlaced`].
    ///
    /// # Panics
    ///
    /// Panics unless [`place_phis`](Self::place_phis) ran last.
    ///
    /// [`InstructionNode::ssa_uses`]: crate::analysis::InstructionNode::ssa_uses
    /// [`InstructionNode::consumers`]: crate::analysis::InstructionNode::consumers
    pub fn rename_as_ssa(&mut self) -> Result<()> {
        self.advance("rename_as_ssa", Stage::PhisPlaced, Stage::Renamed);

        match self.rename_dominator_tree() {
            Ok(visited) => {
                debug!("{}: renamed {} regions", self.method, visited);
                Ok(())
            }
            Err(error) => {
                self.discard_renaming();
                self.stage = Stage::PhisPlaced;
                Err(error)
            }
        }
    }

    /// Walks the dominator tree from the entry, returning the number of regions renamed.
    fn rename_dominator_tree(&mut self) -> Result<usize> {
        let mut table: ScopedTable<Register, InstrId> = ScopedTable::new();
        let mut stack = vec![Walk::Enter(self.entry)];
        let mut visited = 0;

        while let Some(step) = stack.pop() {
            match step {
                Walk::Enter(node) => {
                    table.open_scope();
                    self.rename_region(node, &mut table)?;
                    visited += 1;

                    stack.push(Walk::Exit);
                    for &child in self.regions[node.index()].idominated.iter().rev() {
                        stack.push(Walk::Enter(child));
                    }
                }
                Walk::Exit => table.close_scope(),
            }
        }

        debug_assert_eq!(table.depth(), 0);
        Ok(visited)
    }

    /// Drops every resolved use, def-use chain and phi operand.
    fn discard_renaming(&mut self) {
        for node in &mut self.instructions {
            node.ssa_uses.clear();
            node.consumers.clear();
            if let InstructionKind::Phi { operands, .. } = &mut node.kind {
                operands.fill(None);
            }
        }
    }

    fn rename_region(
        &mut self,
        node: NodeId,
        table: &mut ScopedTable<Register, InstrId>,
    ) -> Result<()> {
        for &phi in &self.regions[node.index()].phis {
            if let Some(register) = self.instructions[phi.index()].merged_register() {
                table.add(register, phi);
            }
        }

        for position in 0..self.regions[node.index()].instructions.len() {
            let id = self.regions[node.index()].instructions[position];

            let mut resolved = Vec::with_capacity(self.instructions[id.index()].uses.len());
            for use_index in 0..self.instructions[id.index()].uses.len() {
                let register = self.instructions[id.index()].uses[use_index];
                let Some(&definition) = table.lookup(&register) else {
                    return Err(Error::UndefinedRegister {
                        register,
                        instruction: id,
                        region: node,
                    });
                };
                self.instructions[definition.index()].consumers.push(id);
                resolved.push(Some(definition));
            }
            self.instructions[id.index()].ssa_uses = resolved;

            for &register in &self.instructions[id.index()].defs {
                table.add(register, id);
            }
        }

        let mut filled = BTreeSet::new();
        for position in 0..self.regions[node.index()].successors.len() {
            let successor = self.regions[node.index()].successors[position];
            if filled.insert(successor) {
                self.fill_phi_slots(node, successor, table)?;
            }
        }

        Ok(())
    }

    /// Fills the slots of `successor`'s phi-functions that belong to edges from `node`.
    fn fill_phi_slots(
        &mut self,
        node: NodeId,
        successor: NodeId,
        table: &ScopedTable<Register, InstrId>,
    ) -> Result<()> {
        let target = &self.regions[successor.index()];
        let slots: Vec<usize> = target
            .predecessors
            .iter()
            .enumerate()
            .filter(|(_, pred)| **pred == node)
            .map(|(slot, _)| slot)
            .collect();

        for phi_index in 0..target.phis.len() {
            let phi = self.regions[successor.index()].phis[phi_index];
            let Some(register) = self.instructions[phi.index()].merged_register() else {
                continue;
            };
            let Some(&definition) = table.lookup(&register) else {
                if self.prologue == Some(node) {
                    return Err(Error::UndefinedRegister {
                        register,
                        instruction: phi,
                        region: successor,
                    });
                }
                return Err(Error::MissingPhiOperand {
                    register,
                    region: successor,
                    predecessor: node,
                });
            };

            for &slot in &slots {
                self.instructions[phi.index()].set_phi_operand(slot, definition);
                self.instructions[definition.index()].consumers.push(phi);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        analysis::{
            BlockRecord, ControlFlowGraph, InstrId, InstructionRecord, MethodBody, MethodRef,
            Register, Stage,
        },
        Error,
    };

    fn converted(body: MethodBody) -> ControlFlowGraph {
        let mut cfg = ControlFlowGraph::from_method_body(body).unwrap();
        cfg.convert_to_ssa().unwrap();
        cfg
    }

    fn at(cfg: &ControlFlowGraph, offset: u32, position: usize) -> InstrId {
        cfg.region(cfg.region_at(offset).unwrap()).instructions()[position]
    }

    #[test]
    fn test_straight_line_uses_latest_definition() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_parameter(1)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("move").defs([0]).uses([1]))
                    .with_instruction(InstructionRecord::new("add-int").defs([0]).uses([0, 1]))
                    .with_instruction(InstructionRecord::new("return").uses([0])),
            );
        let cfg = converted(body);
        let param = cfg.parameters()[0];
        let (mov, add, ret) = (at(&cfg, 0, 1), at(&cfg, 0, 2), at(&cfg, 0, 3));

        assert_eq!(cfg.instruction(mov).ssa_uses(), &[Some(param)]);
        assert_eq!(cfg.instruction(add).ssa_uses(), &[Some(mov), Some(param)]);
        assert_eq!(cfg.instruction(ret).ssa_uses(), &[Some(add)]);

        assert_eq!(cfg.instruction(param).consumers(), &[mov, add]);
        assert_eq!(cfg.instruction(add).consumers(), &[ret]);
    }

    #[test]
    fn test_instruction_reading_and_writing_same_register() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_parameter(0)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("neg-int").defs([0]).uses([0])),
            );
        let cfg = converted(body);
        let neg = at(&cfg, 0, 1);
        assert_eq!(cfg.instruction(neg).ssa_uses(), &[Some(cfg.parameters()[0])]);
    }

    #[test]
    fn test_diamond_phi_operands() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(BlockRecord::new(0).branches_to(4).falls_through_to(2))
            .with_block(
                BlockRecord::new(2)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .branches_to(6),
            )
            .with_block(
                BlockRecord::new(4)
                    .with_instruction(InstructionRecord::new("const/16").defs([0]))
                    .falls_through_to(6),
            )
            .with_block(
                BlockRecord::new(6).with_instruction(InstructionRecord::new("return").uses([0])),
            );
        let cfg = converted(body);
        let merge = cfg.region(cfg.region_at(6).unwrap());
        let phi = merge.phis()[0];

        // Predecessor order of the merge is [2, 4]
        assert_eq!(
            cfg.instruction(phi).phi_operands(),
            Some(&[Some(at(&cfg, 2, 0)), Some(at(&cfg, 4, 0))][..])
        );
        assert_eq!(cfg.instruction(at(&cfg, 6, 0)).ssa_uses(), &[Some(phi)]);
        assert_eq!(cfg.instruction(at(&cfg, 2, 0)).consumers(), &[phi]);
    }

    #[test]
    fn test_loop_phi_takes_back_edge_value() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .falls_through_to(2),
            )
            .with_block(
                BlockRecord::new(2)
                    .with_instruction(InstructionRecord::new("if-eqz").uses([0]))
                    .branches_to(8)
                    .falls_through_to(4),
            )
            .with_block(
                BlockRecord::new(4)
                    .with_instruction(InstructionRecord::new("add-int/lit8").defs([0]).uses([0]))
                    .branches_to(2),
            )
            .with_block(
                BlockRecord::new(8).with_instruction(InstructionRecord::new("return").uses([0])),
            );
        let cfg = converted(body);
        let header = cfg.region(cfg.region_at(2).unwrap());
        let phi = header.phis()[0];
        let (init, step) = (at(&cfg, 0, 0), at(&cfg, 4, 0));

        assert_eq!(
            cfg.instruction(phi).phi_operands(),
            Some(&[Some(init), Some(step)][..])
        );
        assert_eq!(cfg.instruction(at(&cfg, 2, 0)).ssa_uses(), &[Some(phi)]);
        assert_eq!(cfg.instruction(step).ssa_uses(), &[Some(phi)]);
        assert_eq!(cfg.instruction(at(&cfg, 8, 0)).ssa_uses(), &[Some(phi)]);
    }

    #[test]
    fn test_parallel_edges_fill_every_slot() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .switch_to([2, 4, 4]),
            )
            .with_block(
                BlockRecord::new(2)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .falls_through_to(4),
            )
            .with_block(BlockRecord::new(4));
        let cfg = converted(body);
        let merge = cfg.region(cfg.region_at(4).unwrap());
        let (entry_def, branch_def) = (at(&cfg, 0, 0), at(&cfg, 2, 0));

        // Predecessors of 4 are [0, 0, 2]
        assert_eq!(
            cfg.instruction(merge.phis()[0]).phi_operands(),
            Some(&[Some(entry_def), Some(entry_def), Some(branch_def)][..])
        );
    }

    #[test]
    fn test_unreachable_region_is_not_renamed() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(BlockRecord::new(0))
            .with_block(
                BlockRecord::new(2).with_instruction(InstructionRecord::new("return").uses([7])),
            );
        let cfg = converted(body);
        assert!(cfg.instruction(at(&cfg, 2, 0)).ssa_uses().is_empty());
    }

    #[test]
    fn test_undefined_register_is_rejected() {
        let body = MethodBody::new(MethodRef::new(0, 9), 0).with_block(
            BlockRecord::new(0).with_instruction(InstructionRecord::new("return").uses([3])),
        );
        let mut cfg = ControlFlowGraph::from_method_body(body).unwrap();

        match cfg.convert_to_ssa() {
            Err(Error::UndefinedRegister {
                register,
                instruction,
                region,
            }) => {
                assert_eq!(register, Register::new(3));
                assert_eq!(instruction, InstrId::new(0));
                assert_eq!(region, cfg.entry_region());
            }
            other => panic!("expected UndefinedRegister, got {other:?}"),
        }
    }

    #[test]
    fn test_definition_on_one_path_only_is_rejected() {
        // v0 is defined on the 2-branch and in the loop at 6, but not along 0 -> 4
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(BlockRecord::new(0).branches_to(4).falls_through_to(2))
            .with_block(
                BlockRecord::new(2)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .falls_through_to(4),
            )
            .with_block(BlockRecord::new(4).falls_through_to(6))
            .with_block(
                BlockRecord::new(6)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .branches_to(4),
            );
        let mut cfg = ControlFlowGraph::from_method_body(body).unwrap();

        assert!(matches!(
            cfg.convert_to_ssa(),
            Err(Error::MissingPhiOperand { register, .. }) if register == Register::new(0)
        ));
    }

    #[test]
    fn test_failed_renaming_leaves_no_partial_results() {
        // the parameter use in 0 resolves before the missing v0 along 0 -> 4 is found
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_parameter(1)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("if-eqz").uses([1]))
                    .branches_to(4)
                    .falls_through_to(2),
            )
            .with_block(
                BlockRecord::new(2)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .falls_through_to(4),
            )
            .with_block(BlockRecord::new(4).falls_through_to(6))
            .with_block(
                BlockRecord::new(6)
                    .with_instruction(InstructionRecord::new("add-int").defs([0]).uses([0, 1]))
                    .branches_to(4),
            );
        let mut cfg = ControlFlowGraph::from_method_body(body).unwrap();

        assert!(matches!(
            cfg.convert_to_ssa(),
            Err(Error::MissingPhiOperand { .. })
        ));
        assert_eq!(cfg.stage(), Stage::PhisPlaced);
        for node in cfg.instructions() {
            assert!(node.ssa_uses().is_empty(), "{node}");
            assert!(node.consumers().is_empty(), "{node}");
            if let Some(operands) = node.phi_operands() {
                assert!(operands.iter().all(Option::is_none), "{node}");
            }
        }
        assert!(matches!(cfg.verify_ssa(), Err(Error::SsaError(_))));
    }

    #[test]
    fn test_register_undefined_on_method_entry_is_rejected() {
        // 0 -> {2, 4} -> 6 -> 0, v0 only defined inside the loop but read at 0
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("if-eqz").uses([0]))
                    .branches_to(4)
                    .falls_through_to(2),
            )
            .with_block(
                BlockRecord::new(2)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .branches_to(6),
            )
            .with_block(
                BlockRecord::new(4)
                    .with_instruction(InstructionRecord::new("const/4").defs([0]))
                    .falls_through_to(6),
            )
            .with_block(BlockRecord::new(6).branches_to(0));
        let mut cfg = ControlFlowGraph::from_method_body(body).unwrap();

        match cfg.convert_to_ssa() {
            Err(Error::UndefinedRegister {
                register, region, ..
            }) => {
                assert_eq!(register, Register::new(0));
                assert_eq!(Some(region), cfg.region_at(0));
            }
            other => panic!("expected UndefinedRegister, got {other:?}"),
        }
    }

    #[test]
    fn test_loop_back_to_entry_merges_parameter() {
        // 0 -> 2 -> 0, the parameter v1 is redefined in 2
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_parameter(1)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("if-eqz").uses([1]))
                    .falls_through_to(2),
            )
            .with_block(
                BlockRecord::new(2)
                    .with_instruction(InstructionRecord::new("add-int/lit8").defs([1]).uses([1]))
                    .branches_to(0),
            );
        let cfg = converted(body);
        let head = cfg.region(cfg.region_at(0).unwrap());
        let phi = head.phis()[0];
        let step = at(&cfg, 2, 0);

        // slot 0 is the method-entry edge from the prologue
        assert_eq!(
            cfg.instruction(phi).phi_operands(),
            Some(&[Some(cfg.parameters()[0]), Some(step)][..])
        );
        assert_eq!(cfg.instruction(at(&cfg, 0, 0)).ssa_uses(), &[Some(phi)]);
        assert_eq!(cfg.instruction(step).ssa_uses(), &[Some(phi)]);
        cfg.verify_ssa().unwrap();
    }
}
