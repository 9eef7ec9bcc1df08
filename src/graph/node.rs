//! Basic block nodes of the control flow graph.

use crate::{Error, Result};

/// Characters the debugger uses to decorate symbols (`module!function+offset`)
/// that are not allowed in graph node names.
const DECORATIONS: [char; 2] = ['!', '+'];

/// Turns a debugger symbol such as `ntdll!RtlUserThreadStart+0x21` into a node
/// name by removing the decoration characters.
///
/// # Examples
///
/// ```rust
/// use ufgraph::graph::node_name;
///
/// assert_eq!(node_name("foo!bar+10"), "foobar10");
/// ```
#[must_use]
pub fn node_name(symbol: &str) -> String {
    symbol.chars().filter(|c| !DECORATIONS.contains(c)).collect()
}

/// One basic block: a run of instructions that ends at a jump, a return, or
/// the label of another block.
///
/// The name is fixed at construction. Label lines and successors are only ever
/// appended, in the order the listing presents them. Successors are kept by
/// name and are not checked against the other nodes of the graph, so an edge
/// may point at a block that is never defined. Duplicate successors are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    label_lines: Vec<String>,
    highlighted: bool,
    successors: Vec<String>,
}

impl Node {
    /// Creates an empty node.
    ///
    /// # Arguments
    ///
    /// * `name` - The node name, decorations already removed (see [`node_name`])
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyName`] for an empty name, and [`Error::InvalidName`]
    /// when the name still carries whitespace or decoration characters.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::EmptyName);
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || DECORATIONS.contains(&c))
        {
            return Err(Error::InvalidName(name));
        }

        Ok(Node {
            name,
            label_lines: Vec::new(),
            highlighted: false,
            successors: Vec::new(),
        })
    }

    /// The name this node was created with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The display lines of the block, one per instruction.
    #[must_use]
    pub fn label_lines(&self) -> &[String] {
        &self.label_lines
    }

    /// Names of the blocks control may continue to, in the order they were found.
    #[must_use]
    pub fn successors(&self) -> &[String] {
        &self.successors
    }

    /// Whether the block holds the current instruction pointer.
    #[must_use]
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Appends a display line. No escaping happens here.
    pub fn add_label_line(&mut self, text: impl Into<String>) {
        self.label_lines.push(text.into());
    }

    /// Appends an edge to the block called `target`.
    pub fn add_edge(&mut self, target: impl Into<String>) {
        self.successors.push(target.into());
    }

    /// Marks the block as containing the current instruction pointer.
    pub fn mark_highlighted(&mut self) {
        self.highlighted = true;
    }
}
