// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]

//! # ufgraph
//!
//! Turns the output of WinDbg's `uf` (unassemble function) command into a control
//! flow graph and hands it to Graphviz for layout.
//!
//! The listing is re-parsed as text: block labels become nodes, `ret`, `jmp` and
//! conditional `j*` mnemonics decide the edges, and the block holding the current
//! instruction pointer is highlighted. A stack walk, where the listing of every
//! frame is separated by `_ _ _ _`, produces one graph per frame.
//!
//! ## Features
//!
//! - **Streaming parser** - one pass, one line at a time, frames yielded as soon as they end
//! - **No global state** - every parse is independent and returns all it found
//! - **Graphviz output** - DOT documents that render without post-processing
//!
//! ## Quick Start
//!
//! ```rust
//! use ufgraph::prelude::*;
//!
//! let listing = "\
//! $ip=00007ff6`12340000
//! app!main:
//! 00007ff6`12340000 90              nop
//! 00007ff6`12340001 c3              ret
//! ";
//!
//! let output = parse_str(listing, ParseOptions::default())?;
//! let graph = &output.frames[0].graph;
//!
//! assert!(graph.node("appmain").unwrap().is_highlighted());
//! std::fs::write(std::env::temp_dir().join("appmain.dot"), graph.to_dot())?;
//! # Ok::<(), ufgraph::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). A line that does not have
//! the shape its position requires aborts the parse with [`Error::Parse`], which
//! names the line number and content.
//!
//! ## Development and Testing
//!
//! ```bash
//! cargo test
//! cargo bench
//! ```
#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use ufgraph::prelude::*;
///
/// let output = parse_str("a:\n00401000 c3 ret\n", ParseOptions::default())?;
/// assert_eq!(output.frames.len(), 1);
/// # Ok::<(), ufgraph::Error>(())
/// ```
pub mod prelude;

/// Basic block graph model and DOT serialization.
pub mod graph;

/// Parser turning `uf` listings into graphs, one per stack frame.
pub mod parser;

/// Renderer capability and the Graphviz backend.
pub mod render;

/// DOT escaping helpers.
pub mod utils;

/// `ufgraph` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
///
/// ```rust
/// use ufgraph::{parser::{parse_str, ParseOptions, ParseOutput}, Result};
///
/// fn parse_listing(text: &str) -> Result<ParseOutput> {
///     parse_str(text, ParseOptions::default())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `ufgraph` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use ufgraph::{parser::{parse_str, ParseOptions}, Error};
///
/// match parse_str("a:\n00401000 90\n", ParseOptions::default()) {
///     Ok(output) => println!("{} frames", output.frames.len()),
///     Err(Error::Parse { line, reason, .. }) => println!("line {line}: {reason}"),
///     Err(e) => println!("Error: {e}"),
/// }
/// ```
pub use error::{Error, ParseErrorKind};
