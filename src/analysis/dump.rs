//! DOT serialization of the register IR.
//!
//! [`DotDumper`] is an ordinary [`IrVisitor`]: it reads the graph through the
//! traversal protocol and never changes it. Each region becomes a cluster holding
//! one node per phi-function and instruction; region headers carry the RPO number
//! and, optionally, the reaching definitions. Edges of different meaning are told
//! apart by style:
//!
//! | Edge                    | Style               |
//! |-------------------------|---------------------|
//! | control flow            | solid, labelled with the edge kind |
//! | immediate dominator     | dashed blue         |
//! | dominance frontier      | dotted red          |
//! | SSA definition to use   | dotted green        |

use std::fmt::Write;

use crate::{
    analysis::{ControlFlowGraph, IrVisitor, InstructionNode, Region},
    utils::DotWriter,
};

/// Which parts of the analysis results a [`DotDumper`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpOptions {
    /// Draw edges from each region's immediate dominator
    pub dominator_edges: bool,
    /// Draw edges from each region to its dominance frontier
    pub frontier_edges: bool,
    /// List reaching definitions in region headers
    pub reaching_defs: bool,
    /// Draw edges from each definition to its uses
    pub ssa_edges: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self::all()
    }
}

impl DumpOptions {
    /// Everything the graph knows.
    #[must_use]
    pub fn all() -> Self {
        DumpOptions {
            dominator_edges: true,
            frontier_edges: true,
            reaching_defs: true,
            ssa_edges: true,
        }
    }

    /// Control flow only.
    #[must_use]
    pub fn cfg_only() -> Self {
        DumpOptions {
            dominator_edges: false,
            frontier_edges: false,
            reaching_defs: false,
            ssa_edges: false,
        }
    }
}

/// Writes a [`ControlFlowGraph`] as a Graphviz DOT document.
///
/// # Examples
///
/// ```rust
/// use regssa::analysis::{DotDumper, DumpOptions};
/// use regssa::{BlockRecord, ControlFlowGraph, InstructionRecord, MethodBody, MethodRef};
///
/// let body = MethodBody::new(MethodRef::new(0, 0), 0)
///     .with_block(BlockRecord::new(0).with_instruction(InstructionRecord::new("return-void")));
/// let cfg = ControlFlowGraph::from_method_body(body)?;
///
/// let mut dumper = DotDumper::new(DumpOptions::cfg_only());
/// cfg.accept(&mut dumper);
/// let dot = dumper.finish();
/// assert!(dot.contains("i0 [label=\"i0: return-void\""));
/// # Ok::<(), regssa::Error>(())
/// ```
pub struct DotDumper {
    options: DumpOptions,
    writer: Option<DotWriter>,
    /// Edges are collected while walking and written after all clusters
    edges: Vec<(String, String, Vec<(&'static str, String)>)>,
}

impl DotDumper {
    /// Creates a dumper writing the parts selected by `options`.
    #[must_use]
    pub fn new(options: DumpOptions) -> Self {
        DotDumper {
            options,
            writer: None,
            edges: Vec::new(),
        }
    }

    /// Returns the DOT document; empty if the dumper never visited a graph.
    #[must_use]
    pub fn finish(self) -> String {
        let Some(mut writer) = self.writer else {
            return String::new();
        };
        for (from, to, attrs) in &self.edges {
            let attrs: Vec<(&str, &str)> = attrs
                .iter()
                .map(|(key, value)| (*key, value.as_str()))
                .collect();
            writer.edge(from, to, &attrs);
        }
        writer.finish()
    }

    fn edge(&mut self, from: String, to: String, attrs: &[(&'static str, &str)]) {
        let attrs = attrs
            .iter()
            .map(|(key, value)| (*key, (*value).to_string()))
            .collect();
        self.edges.push((from, to, attrs));
    }

    fn write_node(&mut self, graph: &ControlFlowGraph, node: &InstructionNode) {
        if let Some(writer) = self.writer.as_mut() {
            let id = node.id().to_string();
            let kind: &'static str = node.kind().into();
            writer.node(
                &id,
                &node.to_string(),
                &[("shape", "plaintext"), ("tooltip", kind)],
            );
        }

        if self.options.ssa_edges {
            let definitions: Vec<_> = node.ssa_uses().iter().flatten().copied().collect();
            for definition in definitions {
                self.edge(
                    definition.to_string(),
                    node.id().to_string(),
                    &[("style", "dotted"), ("color", "green")],
                );
            }
            if let Some(operands) = node.phi_operands() {
                let region = graph.region(node.region());
                for (operand, pred) in operands.iter().zip(region.predecessors()) {
                    if let Some(definition) = operand {
                        self.edge(
                            definition.to_string(),
                            node.id().to_string(),
                            &[
                                ("style", "dotted"),
                                ("color", "green"),
                                ("label", &pred.to_string()),
                            ],
                        );
                    }
                }
            }
        }
    }
}

fn region_header(region: &Region, with_reaching_defs: bool) -> String {
    let mut label = format!("{} @{:#06x} rpo={}", region.id(), region.label(), region.rpo());
    if with_reaching_defs {
        for (register, definitions) in region.reaching_defs() {
            let defs: Vec<String> = definitions.iter().map(ToString::to_string).collect();
            let _ = write!(label, "\n{register}: {}", defs.join(", "));
        }
    }
    label
}

impl IrVisitor for DotDumper {
    fn initialize(&mut self, graph: &ControlFlowGraph) {
        let method = graph.method();
        self.writer = Some(DotWriter::new(&format!(
            "m{}_{}",
            method.class_def_idx, method.method_idx
        )));
        self.edges.clear();
    }

    fn visit_graph(&mut self, graph: &ControlFlowGraph) {
        if let Some(writer) = self.writer.as_mut() {
            writer.comment(&format!("{} at stage {}", graph.method(), graph.stage()));
        }
    }

    fn visit_region(&mut self, _graph: &ControlFlowGraph, region: &Region) {
        let id = region.id().to_string();
        if let Some(writer) = self.writer.as_mut() {
            writer.open_cluster(&id, &format!("{id} @{:#06x}", region.label()));
            writer.node(
                &id,
                &region_header(region, self.options.reaching_defs),
                &[("shape", "box")],
            );
        }

        for (succ, kind) in region.successor_edges() {
            self.edge(id.clone(), succ.to_string(), &[("label", kind.into())]);
        }
        if self.options.dominator_edges {
            if let Some(idom) = region.immediate_dominator() {
                self.edge(
                    idom.to_string(),
                    id.clone(),
                    &[("style", "dashed"), ("color", "blue"), ("constraint", "false")],
                );
            }
        }
        if self.options.frontier_edges {
            for target in region.frontier() {
                self.edge(
                    id.clone(),
                    target.to_string(),
                    &[("style", "dotted"), ("color", "red"), ("constraint", "false")],
                );
            }
        }
    }

    fn visit_instruction(&mut self, graph: &ControlFlowGraph, node: &InstructionNode) {
        self.write_node(graph, node);
    }

    fn visit_phi(&mut self, graph: &ControlFlowGraph, node: &InstructionNode) {
        self.write_node(graph, node);
    }

    fn visit_signature(&mut self, graph: &ControlFlowGraph, node: &InstructionNode) {
        self.write_node(graph, node);
    }

    fn traverse_region(&mut self, graph: &ControlFlowGraph, region: &Region) {
        crate::analysis::walk_region(self, graph, region);
        if let Some(writer) = self.writer.as_mut() {
            writer.close_cluster();
        }
    }
}

impl ControlFlowGraph {
    /// Renders this graph with every analysis result as a DOT document.
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dumper = DotDumper::new(DumpOptions::all());
        self.accept(&mut dumper);
        dumper.finish()
    }
}
