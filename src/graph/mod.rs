//! Minimal directed graph of basic blocks and its DOT serialization.
//!
//! A [`Node`] is one basic block: a name, its display lines, a highlight flag and
//! the names of its successors. A [`Graph`] is the ordered list of closed nodes of
//! one stack frame. Edges reference their targets by name only and are resolved
//! by Graphviz at render time, so a target that never shows up as a block simply
//! becomes an implicitly declared node.
//!
//! # Examples
//!
//! ```rust
//! use ufgraph::graph::{node_name, Graph, Node};
//!
//! let mut entry = Node::new(node_name("app!main"))?;
//! entry.add_label_line("00401000 jmp app!main+0x10");
//! entry.add_edge(node_name("app!main+0x10"));
//!
//! let mut graph = Graph::new();
//! graph.push(entry);
//! assert!(graph.to_dot().contains("\"appmain\" -> \"appmain0x10\";"));
//! # Ok::<(), ufgraph::Error>(())
//! ```

#[allow(clippy::module_inception)]
mod graph;
mod node;

pub use graph::Graph;
pub use node::{node_name, Node};
