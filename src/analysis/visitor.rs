//! Traversal protocol for passes outside the core.
//!
//! Back ends and diagnostics walk a converted graph through the [`IrVisitor`]
//! trait instead of being compiled into the graph itself. Each node kind has a
//! pre-order `visit_*` callback; the `traverse_*` callbacks decide whether and
//! how to continue into a node's children. Their default implementations call
//! the `walk_*` functions of this module, which fix the canonical order:
//!
//! 1. the graph,
//! 2. its regions in reverse postorder (every region by id if the graph has not
//!    been numbered; unreachable regions are skipped once it has),
//! 3. within each region, its phi-functions, then its instructions in program order.
//!
//! A visitor overrides only the callbacks it cares about.
//!
//! # Examples
//!
//! ```rust
//! use regssa::analysis::{IrVisitor, InstructionNode};
//! use regssa::{BlockRecord, ControlFlowGraph, InstructionRecord, MethodBody, MethodRef};
//!
//! #[derive(Default)]
//! struct Mnemonics(Vec<String>);
//!
//! impl IrVisitor for Mnemonics {
//!     fn visit_instruction(&mut self, _graph: &ControlFlowGraph, node: &InstructionNode) {
//!         self.0.push(node.to_string());
//!     }
//! }
//!
//! let body = MethodBody::new(MethodRef::new(0, 0), 0)
//!     .with_block(BlockRecord::new(0).with_instruction(InstructionRecord::new("return-void")));
//! let cfg = ControlFlowGraph::from_method_body(body)?;
//!
//! let mut visitor = Mnemonics::default();
//! cfg.accept(&mut visitor);
//! assert_eq!(visitor.0, vec!["i0: return-void"]);
//! # Ok::<(), regssa::Error>(())
//! ```

use crate::analysis::{ControlFlowGraph, InstructionKind, InstructionNode, Region};

/// Callbacks invoked while walking a [`ControlFlowGraph`].
pub trait IrVisitor {
    /// Called once before the walk starts.
    fn initialize(&mut self, _graph: &ControlFlowGraph) {}

    /// Called for the graph before its regions.
    fn visit_graph(&mut self, _graph: &ControlFlowGraph) {}

    /// Called for each region before its phi-functions and instructions.
    fn visit_region(&mut self, _graph: &ControlFlowGraph, _region: &Region) {}

    /// Called for each ordinary instruction.
    fn visit_instruction(&mut self, _graph: &ControlFlowGraph, _node: &InstructionNode) {}

    /// Called for each phi-function.
    fn visit_phi(&mut self, _graph: &ControlFlowGraph, _node: &InstructionNode) {}

    /// Called for each signature placeholder.
    fn visit_signature(&mut self, _graph: &ControlFlowGraph, _node: &InstructionNode) {}

    /// Continues into the regions of the graph.
    fn traverse_graph(&mut self, graph: &ControlFlowGraph) {
        walk_graph(self, graph);
    }

    /// Continues into the phi-functions and instructions of a region.
    fn traverse_region(&mut self, graph: &ControlFlowGraph, region: &Region) {
        walk_region(self, graph, region);
    }

    /// Continues into an instruction. Instructions have no children, so the
    /// default does nothing.
    fn traverse_instruction(&mut self, _graph: &ControlFlowGraph, _node: &InstructionNode) {}
}

/// Visits and traverses every region of `graph` in canonical order.
pub fn walk_graph<V: IrVisitor + ?Sized>(visitor: &mut V, graph: &ControlFlowGraph) {
    for id in graph.regions_in_order() {
        let region = graph.region(id);
        visitor.visit_region(graph, region);
        visitor.traverse_region(graph, region);
    }
}

/// Visits and traverses the phi-functions, then the instructions, of `region`.
pub fn walk_region<V: IrVisitor + ?Sized>(
    visitor: &mut V,
    graph: &ControlFlowGraph,
    region: &Region,
) {
    for &phi in region.phis() {
        let node = graph.instruction(phi);
        visitor.visit_phi(graph, node);
        visitor.traverse_instruction(graph, node);
    }

    for &id in region.instructions() {
        let node = graph.instruction(id);
        match node.kind() {
            InstructionKind::Signature { .. } => visitor.visit_signature(graph, node),
            InstructionKind::Phi { .. } => visitor.visit_phi(graph, node),
            InstructionKind::Ordinary { .. } => visitor.visit_instruction(graph, node),
        }
        visitor.traverse_instruction(graph, node);
    }
}

impl ControlFlowGraph {
    /// Walks this graph with `visitor`.
    ///
    /// Calls [`IrVisitor::initialize`] and [`IrVisitor::visit_graph`], then hands
    /// control to [`IrVisitor::traverse_graph`].
    pub fn accept<V: IrVisitor + ?Sized>(&self, visitor: &mut V) {
        visitor.initialize(self);
        visitor.visit_graph(self);
        visitor.traverse_graph(self);
    }
}
