//! Decoder records and control flow graph assembly.
//!
//! An upstream decoder describes a method as a [`MethodBody`]: blocks keyed by
//! the bytecode offset of their first instruction, each with its decoded
//! instructions and explicit successor records. [`ControlFlowGraph::from_method_body`]
//! turns that description into the region arena. It is the only code that ever
//! creates regions or edges; once it returns, the topology is frozen.

use std::{collections::BTreeMap, fmt};

use log::debug;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::{
    analysis::cfg::{
        graph::Stage, ControlFlowGraph, InstrId, InstructionNode, Region, Register,
    },
    utils::graph::NodeId,
    Error, Result,
};

/// Identifies the compiled method: class definition index and method index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodRef {
    /// Index of the declaring class definition
    pub class_def_idx: u32,
    /// Index of the method within its dex file
    pub method_idx: u32,
}

impl MethodRef {
    /// Creates a method reference.
    #[must_use]
    pub const fn new(class_def_idx: u32, method_idx: u32) -> Self {
        MethodRef {
            class_def_idx,
            method_idx,
        }
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "method {}@class {}", self.method_idx, self.class_def_idx)
    }
}

/// Kind of a control flow edge, as reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum EdgeKind {
    /// Sequential flow into the next block
    FallThrough,
    /// Conditional or unconditional branch target
    Branch,
    /// One case of a packed or sparse switch
    Switch,
    /// Flow into an exception handler
    Exception,
}

/// A decoded instruction: mnemonic plus the registers it writes and reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionRecord {
    /// Decoder mnemonic
    pub mnemonic: String,
    /// Registers written by the instruction
    pub defs: Vec<Register>,
    /// Registers read by the instruction
    pub uses: Vec<Register>,
}

impl InstructionRecord {
    /// Creates a record without register operands.
    pub fn new(mnemonic: impl Into<String>) -> Self {
        InstructionRecord {
            mnemonic: mnemonic.into(),
            defs: Vec::new(),
            uses: Vec::new(),
        }
    }

    /// Sets the registers written by the instruction.
    #[must_use]
    pub fn defs(mut self, registers: impl IntoIterator<Item = u32>) -> Self {
        self.defs = registers.into_iter().map(Register::new).collect();
        self
    }

    /// Sets the registers read by the instruction.
    #[must_use]
    pub fn uses(mut self, registers: impl IntoIterator<Item = u32>) -> Self {
        self.uses = registers.into_iter().map(Register::new).collect();
        self
    }
}

/// An outgoing edge of a block, naming its target by offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuccessorRecord {
    /// Offset of the target block
    pub target: u32,
    /// How control reaches the target
    pub kind: EdgeKind,
}

/// A decoded basic block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRecord {
    /// Offset of the first instruction; identifies the block
    pub offset: u32,
    /// Instructions in program order
    pub instructions: Vec<InstructionRecord>,
    /// Outgoing edges in decoder order
    pub successors: Vec<SuccessorRecord>,
}

impl BlockRecord {
    /// Creates an empty block starting at `offset`.
    #[must_use]
    pub fn new(offset: u32) -> Self {
        BlockRecord {
            offset,
            instructions: Vec::new(),
            successors: Vec::new(),
        }
    }

    /// Appends an instruction.
    #[must_use]
    pub fn with_instruction(mut self, instruction: InstructionRecord) -> Self {
        self.instructions.push(instruction);
        self
    }

    /// Appends an outgoing edge of the given kind.
    #[must_use]
    pub fn with_successor(mut self, target: u32, kind: EdgeKind) -> Self {
        self.successors.push(SuccessorRecord { target, kind });
        self
    }

    /// Appends a fall-through edge.
    #[must_use]
    pub fn falls_through_to(self, target: u32) -> Self {
        self.with_successor(target, EdgeKind::FallThrough)
    }

    /// Appends a branch edge.
    #[must_use]
    pub fn branches_to(self, target: u32) -> Self {
        self.with_successor(target, EdgeKind::Branch)
    }

    /// Appends one switch edge per target, in order.
    #[must_use]
    pub fn switch_to(mut self, targets: impl IntoIterator<Item = u32>) -> Self {
        for target in targets {
            self = self.with_successor(target, EdgeKind::Switch);
        }
        self
    }

    /// Appends an exception edge to a handler block.
    #[must_use]
    pub fn handled_by(self, handler: u32) -> Self {
        self.with_successor(handler, EdgeKind::Exception)
    }
}

/// Decoded method body handed over by the decoder.
///
/// # Examples
///
/// ```rust
/// use regssa::{BlockRecord, InstructionRecord, MethodBody, MethodRef};
///
/// // int abs(int v1) { if (v1 < 0) v1 = -v1; return v1; }
/// let body = MethodBody::new(MethodRef::new(3, 17), 0)
///     .with_parameter(1)
///     .with_block(
///         BlockRecord::new(0)
///             .with_instruction(InstructionRecord::new("if-gez").uses([1]))
///             .branches_to(4)
///             .falls_through_to(2),
///     )
///     .with_block(
///         BlockRecord::new(2)
///             .with_instruction(InstructionRecord::new("neg-int").defs([1]).uses([1]))
///             .falls_through_to(4),
///     )
///     .with_block(
///         BlockRecord::new(4).with_instruction(InstructionRecord::new("return").uses([1])),
///     );
/// assert_eq!(body.blocks.len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodBody {
    /// The method being compiled
    pub method: MethodRef,
    /// Offset of the entry block
    pub entry: u32,
    /// Formal parameter registers, defined on entry
    pub parameters: Vec<Register>,
    /// Decoded blocks in any order
    pub blocks: Vec<BlockRecord>,
}

impl MethodBody {
    /// Creates a body without parameters or blocks.
    #[must_use]
    pub fn new(method: MethodRef, entry: u32) -> Self {
        MethodBody {
            method,
            entry,
            parameters: Vec::new(),
            blocks: Vec::new(),
        }
    }

    /// Declares a formal parameter register.
    #[must_use]
    pub fn with_parameter(mut self, register: u32) -> Self {
        self.parameters.push(Register::new(register));
        self
    }

    /// Appends a block.
    #[must_use]
    pub fn with_block(mut self, block: BlockRecord) -> Self {
        self.blocks.push(block);
        self
    }
}

impl ControlFlowGraph {
    /// Assembles the region graph of a decoded method.
    ///
    /// Creates one region per block (in block order), one signature placeholder
    /// per formal parameter at the head of the entry region, and a successor and
    /// predecessor entry for every successor record. Parallel edges are kept: each
    /// one occupies its own predecessor slot.
    ///
    /// If some successor record targets the entry block, the signature
    /// placeholders go into an extra prologue region appended after the blocks.
    /// The prologue becomes the entry region and falls through to the entry
    /// block, which is then an ordinary join point whose first predecessor slot
    /// is the method-entry edge.
    ///
    /// # Errors
    ///
    /// - [`Error::Empty`] if the body has no blocks
    /// - [`Error::DuplicateBlock`] if two blocks start at the same offset
    /// - [`Error::UnknownBlock`] if a successor record targets no block
    /// - [`Error::Malformed`] if the entry offset starts no block or a parameter
    ///   register is declared twice
    pub fn from_method_body(body: MethodBody) -> Result<Self> {
        if body.blocks.is_empty() {
            return Err(Error::Empty);
        }

        let mut labels: BTreeMap<u32, NodeId> = BTreeMap::new();
        for (index, block) in body.blocks.iter().enumerate() {
            if labels.insert(block.offset, NodeId::new(index)).is_some() {
                return Err(Error::DuplicateBlock(block.offset));
            }
        }

        let Some(&entry) = labels.get(&body.entry) else {
            return Err(malformed_error!(
                "Entry offset {:#06x} of {} does not start a block",
                body.entry,
                body.method
            ));
        };

        let mut regions: Vec<Region> = body
            .blocks
            .iter()
            .enumerate()
            .map(|(index, block)| Region::new(NodeId::new(index), block.offset))
            .collect();

        // An entry block that is also a branch target gets a separate method-entry region
        let entry_is_target = body
            .blocks
            .iter()
            .flat_map(|block| &block.successors)
            .any(|successor| successor.target == body.entry);
        let prologue = if entry_is_target {
            let id = NodeId::new(regions.len());
            let mut region = Region::new(id, body.entry);
            region.successors.push(entry);
            region.successor_kinds.push(EdgeKind::FallThrough);
            regions.push(region);
            regions[entry.index()].predecessors.push(id);
            Some(id)
        } else {
            None
        };
        let start = prologue.unwrap_or(entry);

        let mut instructions: Vec<InstructionNode> = Vec::new();
        let mut signature: Vec<InstrId> = Vec::with_capacity(body.parameters.len());

        for (position, &register) in body.parameters.iter().enumerate() {
            if body.parameters[..position].contains(&register) {
                return Err(malformed_error!(
                    "Parameter register {} of {} is declared twice",
                    register,
                    body.method
                ));
            }
            let id = InstrId::new(instructions.len());
            instructions.push(InstructionNode::signature(id, start, register));
            regions[start.index()].instructions.push(id);
            signature.push(id);
        }

        for (index, block) in body.blocks.iter().enumerate() {
            let region = NodeId::new(index);
            for record in &block.instructions {
                let id = InstrId::new(instructions.len());
                instructions.push(InstructionNode::ordinary(
                    id,
                    region,
                    record.mnemonic.clone(),
                    record.defs.clone(),
                    record.uses.clone(),
                ));
                regions[index].instructions.push(id);
            }
        }

        let mut edge_count = 0;
        for (index, block) in body.blocks.iter().enumerate() {
            let source = NodeId::new(index);
            for successor in &block.successors {
                let Some(&target) = labels.get(&successor.target) else {
                    return Err(Error::UnknownBlock(successor.target));
                };
                regions[index].successors.push(target);
                regions[index].successor_kinds.push(successor.kind);
                regions[target.index()].predecessors.push(source);
                edge_count += 1;
            }
        }

        debug!(
            "assembled {}: {} regions, {} edges, {} instructions",
            body.method,
            regions.len(),
            edge_count,
            instructions.len()
        );

        Ok(ControlFlowGraph {
            method: body.method,
            regions,
            instructions,
            signature,
            entry: start,
            prologue,
            labels,
            rpo: None,
            dominators: None,
            stage: Stage::Assembled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::graph::{Predecessors, Successors};

    fn abs_body() -> MethodBody {
        MethodBody::new(MethodRef::new(3, 17), 0)
            .with_parameter(1)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("if-gez").uses([1]))
                    .branches_to(4)
                    .falls_through_to(2),
            )
            .with_block(
                BlockRecord::new(2)
                    .with_instruction(InstructionRecord::new("neg-int").defs([1]).uses([1]))
                    .falls_through_to(4),
            )
            .with_block(
                BlockRecord::new(4).with_instruction(InstructionRecord::new("return").uses([1])),
            )
    }

    #[test]
    fn test_assembles_regions_and_edges() {
        let cfg = ControlFlowGraph::from_method_body(abs_body()).unwrap();

        assert_eq!(cfg.region_count(), 3);
        assert_eq!(cfg.entry_region(), NodeId::new(0));
        assert_eq!(cfg.region_at(4), Some(NodeId::new(2)));
        assert_eq!(cfg.region_at(6), None);

        let entry = cfg.region(cfg.entry_region());
        assert_eq!(entry.successors(), &[NodeId::new(2), NodeId::new(1)]);
        let kinds: Vec<EdgeKind> = entry.successor_edges().map(|(_, kind)| kind).collect();
        assert_eq!(kinds, vec![EdgeKind::Branch, EdgeKind::FallThrough]);

        let merge: Vec<NodeId> = cfg.predecessors(NodeId::new(2)).collect();
        assert_eq!(merge, vec![NodeId::new(0), NodeId::new(1)]);
        assert_eq!(cfg.successors(NodeId::new(2)).count(), 0);
    }

    #[test]
    fn test_signature_placed_at_entry_head() {
        let cfg = ControlFlowGraph::from_method_body(abs_body()).unwrap();

        assert_eq!(cfg.parameters().len(), 1);
        let param = cfg.instruction(cfg.parameters()[0]);
        assert!(param.is_signature());
        assert_eq!(param.definitions(), &[Register::new(1)]);
        assert_eq!(param.region(), cfg.entry_region());

        let entry = cfg.region(cfg.entry_region());
        assert_eq!(entry.instructions()[0], param.id());
        assert_eq!(entry.instructions().len(), 2);
    }

    #[test]
    fn test_entry_targeted_by_branch_gets_prologue() {
        // 0 -> 2 -> 0
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_parameter(4)
            .with_block(
                BlockRecord::new(0)
                    .with_instruction(InstructionRecord::new("if-eqz").uses([4]))
                    .falls_through_to(2),
            )
            .with_block(BlockRecord::new(2).branches_to(0));
        let cfg = ControlFlowGraph::from_method_body(body).unwrap();

        let prologue = NodeId::new(2);
        assert_eq!(cfg.region_count(), 3);
        assert_eq!(cfg.prologue_region(), Some(prologue));
        assert_eq!(cfg.entry_region(), prologue);
        assert_eq!(cfg.region_at(0), Some(NodeId::new(0)));

        let head = cfg.region(prologue);
        assert_eq!(head.instructions(), cfg.parameters());
        assert_eq!(head.successors(), &[NodeId::new(0)]);
        assert!(head.predecessors().is_empty());

        // the method-entry edge takes the first slot of the entry block
        let block = cfg.region(NodeId::new(0));
        assert_eq!(block.predecessors(), &[prologue, NodeId::new(1)]);
        assert_eq!(block.instructions().len(), 1);
    }

    #[test]
    fn test_no_prologue_without_branch_to_entry() {
        let cfg = ControlFlowGraph::from_method_body(abs_body()).unwrap();
        assert_eq!(cfg.prologue_region(), None);
    }

    #[test]
    fn test_entry_need_not_be_first_block() {
        let body = MethodBody::new(MethodRef::default(), 8)
            .with_block(BlockRecord::new(0))
            .with_block(BlockRecord::new(8).branches_to(0));
        let cfg = ControlFlowGraph::from_method_body(body).unwrap();
        assert_eq!(cfg.entry_region(), NodeId::new(1));
    }

    #[test]
    fn test_parallel_edges_keep_separate_slots() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(BlockRecord::new(0).switch_to([2, 2, 4]))
            .with_block(BlockRecord::new(2))
            .with_block(BlockRecord::new(4));
        let cfg = ControlFlowGraph::from_method_body(body).unwrap();

        assert_eq!(cfg.region(NodeId::new(1)).predecessors(), &[NodeId::new(0); 2]);
    }

    #[test]
    fn test_empty_body() {
        let body = MethodBody::new(MethodRef::default(), 0);
        assert!(matches!(
            ControlFlowGraph::from_method_body(body),
            Err(Error::Empty)
        ));
    }

    #[test]
    fn test_duplicate_block() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(BlockRecord::new(0))
            .with_block(BlockRecord::new(0));
        assert!(matches!(
            ControlFlowGraph::from_method_body(body),
            Err(Error::DuplicateBlock(0))
        ));
    }

    #[test]
    fn test_unknown_branch_target() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_block(BlockRecord::new(0).branches_to(0x20));
        assert!(matches!(
            ControlFlowGraph::from_method_body(body),
            Err(Error::UnknownBlock(0x20))
        ));
    }

    #[test]
    fn test_unknown_entry() {
        let body = MethodBody::new(MethodRef::default(), 2).with_block(BlockRecord::new(0));
        assert!(matches!(
            ControlFlowGraph::from_method_body(body),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_duplicate_parameter() {
        let body = MethodBody::new(MethodRef::default(), 0)
            .with_parameter(1)
            .with_parameter(1)
            .with_block(BlockRecord::new(0));
        assert!(matches!(
            ControlFlowGraph::from_method_body(body),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_edge_kind_names() {
        use strum::IntoEnumIterator;

        let names: Vec<String> = EdgeKind::iter().map(|kind| kind.to_string()).collect();
        assert_eq!(names, ["fall_through", "branch", "switch", "exception"]);
    }
}
