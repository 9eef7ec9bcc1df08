//! The ordered collection of closed blocks produced for one stack frame.

use std::{fmt::Write, io};

use crate::{
    graph::Node,
    utils::{escape_dot, quote_id},
};

/// Font used for every node and the graph itself. Instruction listings only
/// line up in a monospace face.
const FONT: &str = "Lucida Console";

/// Fill applied to the block holding the current instruction pointer.
const HIGHLIGHT_STYLE: &str = "style=filled, fillcolor=gray";

/// A control flow graph built from one frame of a `uf` listing.
///
/// Nodes are kept in the order their blocks were closed, which is also the
/// order they appear in the listing. Nothing relies on that order except
/// output stability: serializing the same listing twice gives the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    nodes: Vec<Node>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a closed node. No check against duplicate names is made.
    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no block was closed into this graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The first node called `name`, if any.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    pub(crate) fn last_mut(&mut self) -> Option<&mut Node> {
        self.nodes.last_mut()
    }

    /// Every `(source, target)` pair, grouped by source in node order.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.nodes.iter().flat_map(|node| {
            node.successors()
                .iter()
                .map(move |target| (node.name(), target.as_str()))
        })
    }

    /// Total number of edges, duplicates included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|n| n.successors().len()).sum()
    }

    /// The highlighted nodes.
    pub fn highlighted(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes.iter().filter(|n| n.is_highlighted())
    }

    /// Generates the DOT representation of this graph.
    ///
    /// The document declares monospace, box shaped nodes with left justified
    /// labels, then one statement per node, then one statement per edge. Every
    /// label line is terminated with `\l` so Graphviz left-aligns it. The
    /// highlighted block is filled gray. Node names are quoted, so any name a
    /// listing can produce is a valid identifier.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ufgraph::graph::{Graph, Node};
    ///
    /// let mut a = Node::new("a")?;
    /// a.add_label_line("00401000 ret");
    /// let mut graph = Graph::new();
    /// graph.push(a);
    ///
    /// let dot = graph.to_dot();
    /// assert!(dot.starts_with("digraph {"));
    /// assert!(dot.contains("\"a\" [label=\"00401000 ret\\l\"];"));
    /// # Ok::<(), ufgraph::Error>(())
    /// ```
    #[must_use]
    pub fn to_dot(&self) -> String {
        let mut dot = String::new();

        dot.push_str("digraph {\n");
        let _ = writeln!(
            dot,
            "    graph [fontname=\"{FONT}\", fontsize=10, labeljust=l, nojustify=true, splines=polyline];"
        );
        let _ = writeln!(dot, "    node [shape=box, fontname=\"{FONT}\", fontsize=10];");
        let _ = writeln!(dot, "    edge [fontname=\"{FONT}\"];\n");

        for node in &self.nodes {
            let mut label = String::new();
            for line in node.label_lines() {
                label.push_str(&escape_dot(line));
                label.push_str("\\l");
            }

            let style = if node.is_highlighted() {
                format!("{HIGHLIGHT_STYLE}, ")
            } else {
                String::new()
            };

            let _ = writeln!(
                dot,
                "    {} [{style}label=\"{label}\"];",
                quote_id(node.name())
            );
        }

        dot.push('\n');

        for (source, target) in self.edges() {
            let _ = writeln!(dot, "    {} -> {};", quote_id(source), quote_id(target));
        }

        dot.push_str("}\n");
        dot
    }

    /// Writes [`Graph::to_dot`] to `writer`.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `writer`.
    pub fn write_dot<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(self.to_dot().as_bytes())
    }
}
