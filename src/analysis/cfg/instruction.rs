//! Instruction nodes of the register IR.
//!
//! Every instruction of a method, including the phi-functions inserted during SSA
//! construction and the placeholders standing for formal parameters, is an
//! [`InstructionNode`] stored in the arena of its [`ControlFlowGraph`]. The closed
//! [`InstructionKind`] enum distinguishes the three kinds; passes dispatch on it
//! with `match`, external code through [`IrVisitor`].
//!
//! [`ControlFlowGraph`]: crate::analysis::ControlFlowGraph
//! [`IrVisitor`]: crate::analysis::IrVisitor

use std::fmt;

use strum::IntoStaticStr;

use crate::utils::graph::NodeId;

/// A virtual register of the decoded method.
///
/// Registers are numbered by the decoder; the same register is typically assigned
/// many times, which is exactly what SSA renaming resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Register(u32);

impl Register {
    /// Creates a register handle for register number `number`.
    #[must_use]
    pub const fn new(number: u32) -> Self {
        Register(number)
    }

    /// Returns the register number.
    #[must_use]
    pub const fn number(self) -> u32 {
        self.0
    }
}

impl From<u32> for Register {
    fn from(number: u32) -> Self {
        Register(number)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Arena handle of an instruction node.
///
/// After SSA renaming an `InstrId` doubles as the name of the value the
/// instruction defines: every use refers to its definition by this id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstrId(pub(crate) usize);

impl InstrId {
    /// Creates an instruction handle from a raw arena index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        InstrId(index)
    }

    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "i{}", self.0)
    }
}

/// The kind of an instruction node.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum InstructionKind {
    /// A decoded instruction of the method.
    Ordinary {
        /// Decoder mnemonic, kept for diagnostics
        mnemonic: String,
    },
    /// A phi-function merging the definitions of `register` at a join point.
    Phi {
        /// The register this phi-function defines
        register: Register,
        /// One slot per predecessor edge of the owning region, in predecessor order
        operands: Vec<Option<InstrId>>,
    },
    /// Implicit definition of a formal parameter at method entry.
    Signature {
        /// The parameter register
        register: Register,
    },
}

/// A single instruction of the register IR.
///
/// Besides the registers it defines and uses, a node carries the results of SSA
/// renaming: the definition each use resolved to ([`ssa_uses`](Self::ssa_uses))
/// and the instructions that in turn use this node ([`consumers`](Self::consumers)).
#[derive(Debug, Clone)]
pub struct InstructionNode {
    pub(crate) id: InstrId,
    pub(crate) region: NodeId,
    pub(crate) kind: InstructionKind,
    pub(crate) defs: Vec<Register>,
    pub(crate) uses: Vec<Register>,
    /// Resolved definition for each entry of `uses`, filled by renaming
    pub(crate) ssa_uses: Vec<Option<InstrId>>,
    /// Instructions reading this definition, one entry per use or phi slot
    pub(crate) consumers: Vec<InstrId>,
}

impl InstructionNode {
    pub(crate) fn ordinary(
        id: InstrId,
        region: NodeId,
        mnemonic: String,
        defs: Vec<Register>,
        uses: Vec<Register>,
    ) -> Self {
        InstructionNode {
            id,
            region,
            kind: InstructionKind::Ordinary { mnemonic },
            defs,
            uses,
            ssa_uses: Vec::new(),
            consumers: Vec::new(),
        }
    }

    pub(crate) fn signature(id: InstrId, region: NodeId, register: Register) -> Self {
        InstructionNode {
            id,
            region,
            kind: InstructionKind::Signature { register },
            defs: vec![register],
            uses: Vec::new(),
            ssa_uses: Vec::new(),
            consumers: Vec::new(),
        }
    }

    pub(crate) fn phi(id: InstrId, region: NodeId, register: Register, slots: usize) -> Self {
        InstructionNode {
            id,
            region,
            kind: InstructionKind::Phi {
                register,
                operands: vec![None; slots],
            },
            defs: vec![register],
            uses: Vec::new(),
            ssa_uses: Vec::new(),
            consumers: Vec::new(),
        }
    }

    /// Returns the arena handle of this node.
    #[must_use]
    pub fn id(&self) -> InstrId {
        self.id
    }

    /// Returns the region holding this node.
    #[must_use]
    pub fn region(&self) -> NodeId {
        self.region
    }

    /// Returns the kind of this node.
    #[must_use]
    pub fn kind(&self) -> &InstructionKind {
        &self.kind
    }

    /// Returns the registers this node defines.
    #[must_use]
    pub fn definitions(&self) -> &[Register] {
        &self.defs
    }

    /// Returns the registers this node reads.
    ///
    /// Phi-functions and signature placeholders read no registers; the values
    /// merged by a phi are its [`phi_operands`](Self::phi_operands).
    #[must_use]
    pub fn uses(&self) -> &[Register] {
        &self.uses
    }

    /// Returns the single result register of this node.
    ///
    /// Ordinary instructions report their first defined register, phi-functions
    /// their merged register. Signature placeholders have no result register.
    #[must_use]
    pub fn result_register(&self) -> Option<Register> {
        match &self.kind {
            InstructionKind::Ordinary { .. } => self.defs.first().copied(),
            InstructionKind::Phi { register, .. } => Some(*register),
            InstructionKind::Signature { .. } => None,
        }
    }

    /// Returns the per-predecessor operand slots if this node is a phi-function.
    #[must_use]
    pub fn phi_operands(&self) -> Option<&[Option<InstrId>]> {
        match &self.kind {
            InstructionKind::Phi { operands, .. } => Some(operands),
            _ => None,
        }
    }

    /// Returns the definition each use resolved to, parallel to [`uses`](Self::uses).
    ///
    /// Empty until renaming has processed this node's region.
    #[must_use]
    pub fn ssa_uses(&self) -> &[Option<InstrId>] {
        &self.ssa_uses
    }

    /// Returns the instructions using the value defined by this node.
    #[must_use]
    pub fn consumers(&self) -> &[InstrId] {
        &self.consumers
    }

    /// Returns `true` if this node is a phi-function.
    #[must_use]
    pub fn is_phi(&self) -> bool {
        matches!(self.kind, InstructionKind::Phi { .. })
    }

    /// Returns `true` if this node is a signature placeholder.
    #[must_use]
    pub fn is_signature(&self) -> bool {
        matches!(self.kind, InstructionKind::Signature { .. })
    }

    /// Returns the register a phi-function or signature placeholder stands for.
    pub(crate) fn merged_register(&self) -> Option<Register> {
        match &self.kind {
            InstructionKind::Phi { register, .. } | InstructionKind::Signature { register } => {
                Some(*register)
            }
            InstructionKind::Ordinary { .. } => None,
        }
    }

    pub(crate) fn set_phi_operand(&mut self, slot: usize, definition: InstrId) {
        if let InstructionKind::Phi { operands, .. } = &mut self.kind {
            operands[slot] = Some(definition);
        }
    }
}

fn join_registers(registers: &[Register]) -> String {
    registers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for InstructionNode {
    /// Formats the node as a one-line listing, e.g. `i4: v0 = add-int v1, v2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.id)?;
        match &self.kind {
            InstructionKind::Signature { register } => write!(f, "{register} = param"),
            InstructionKind::Phi { register, operands } => {
                let slots: Vec<String> = operands
                    .iter()
                    .map(|slot| slot.map_or_else(|| "-".to_string(), |def| def.to_string()))
                    .collect();
                write!(f, "{register} = phi({})", slots.join(", "))
            }
            InstructionKind::Ordinary { mnemonic } => {
                if !self.defs.is_empty() {
                    write!(f, "{} = ", join_registers(&self.defs))?;
                }
                write!(f, "{mnemonic}")?;
                if !self.uses.is_empty() {
                    write!(f, " {}", join_registers(&self.uses))?;
                }
                Ok(())
            }
        }
    }
}
