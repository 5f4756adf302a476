//! DOT format utilities for graph visualization.
//!
//! This module provides utilities for generating DOT format output,
//! which can be rendered using Graphviz tools.

use std::fmt::Write;

/// Escapes a string for safe use in DOT format labels and identifiers.
///
/// This function handles all characters that have special meaning in DOT format,
/// including quotes, backslashes, newlines, and angle brackets.
///
/// # Arguments
///
/// * `s` - The string to escape
///
/// # Returns
///
/// A new string with all special characters properly escaped.
///
/// # Examples
///
/// ```rust
/// use regssa::utils::escape_dot;
///
/// let escaped = escape_dot("invoke-static {v0}, Foo->bar<T>");
/// assert_eq!(escaped, "invoke-static {v0}, Foo-\\>bar\\<T\\>");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

/// Incremental writer for a single `digraph` document.
///
/// The writer only knows about DOT syntax: nodes, edges, comments and the
/// surrounding `digraph { ... }` block. What gets written is decided by the
/// caller, which keeps the IR-specific dumping logic out of this module.
///
/// # Examples
///
/// ```rust
/// use regssa::utils::DotWriter;
///
/// let mut dot = DotWriter::new("method");
/// dot.node("n0", "region n0", &[("shape", "box")]);
/// dot.edge("n0", "n1", &[]);
/// let text = dot.finish();
/// assert!(text.starts_with("digraph method {"));
/// assert!(text.contains("n0 -> n1;"));
/// ```
#[derive(Debug)]
pub struct DotWriter {
    out: String,
}

impl DotWriter {
    /// Starts a new directed graph document named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut out = String::new();
        let _ = writeln!(out, "digraph {} {{", escape_dot(name));
        let _ = writeln!(out, "  compound=true;");
        DotWriter { out }
    }

    /// Writes a `// text` comment line.
    pub fn comment(&mut self, text: &str) {
        let _ = writeln!(self.out, "  // {text}");
    }

    /// Writes a node statement with an escaped label and additional attributes.
    pub fn node(&mut self, id: &str, label: &str, attrs: &[(&str, &str)]) {
        let _ = write!(self.out, "  {id} [label=\"{}\"", escape_dot(label));
        for (key, value) in attrs {
            let _ = write!(self.out, ", {key}={value}");
        }
        let _ = writeln!(self.out, "];");
    }

    /// Writes an edge statement; attributes are omitted when `attrs` is empty.
    pub fn edge(&mut self, from: &str, to: &str, attrs: &[(&str, &str)]) {
        let _ = write!(self.out, "  {from} -> {to}");
        if !attrs.is_empty() {
            let rendered: Vec<String> = attrs.iter().map(|(k, v)| format!("{k}={v}")).collect();
            let _ = write!(self.out, " [{}]", rendered.join(", "));
        }
        let _ = writeln!(self.out, ";");
    }

    /// Opens a `subgraph cluster_{id}` block drawn as a labelled frame.
    ///
    /// Every call must be matched by [`close_cluster`](Self::close_cluster).
    pub fn open_cluster(&mut self, id: &str, label: &str) {
        let _ = writeln!(self.out, "  subgraph cluster_{id} {{");
        let _ = writeln!(self.out, "  label=\"{}\";", escape_dot(label));
    }

    /// Closes the innermost cluster opened with [`open_cluster`](Self::open_cluster).
    pub fn close_cluster(&mut self) {
        let _ = writeln!(self.out, "  }}");
    }

    /// Closes the graph block and returns the document.
    #[must_use]
    pub fn finish(mut self) -> String {
        self.out.push_str("}\n");
        self.out
    }
}
