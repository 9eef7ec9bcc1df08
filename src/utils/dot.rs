//! DOT format utilities for graph visualization.
//!
//! This module provides utilities for generating DOT format output,
//! which can be rendered using Graphviz tools.

/// Escapes a string for safe use inside a double-quoted DOT string.
///
/// Backslashes and quotes are escaped, newlines become `\n` and carriage
/// returns are dropped. Angle brackets are left alone since they carry no
/// meaning inside a quoted string of a `box` shaped node.
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
/// use ufgraph::utils::escape_dot;
///
/// let escaped = escape_dot("mov rcx,qword ptr [\"x\"]");
/// assert_eq!(escaped, "mov rcx,qword ptr [\\\"x\\\"]");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}

/// Formats `s` as a quoted DOT identifier.
///
/// Block names taken from a listing may contain characters such as `.`, `:`,
/// `` ` `` or `@` which are not valid in a bare DOT identifier, so every node
/// name is emitted quoted.
#[must_use]
pub fn quote_id(s: &str) -> String {
    format!("\"{}\"", escape_dot(s))
}
