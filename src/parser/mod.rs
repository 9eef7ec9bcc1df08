//! Line-oriented parser for WinDbg `uf` listings.
//!
//! The parser makes one pass over the input, one line at a time, and turns the
//! disassembly into basic blocks and control flow edges. It does not decode
//! instructions; everything is decided from the text:
//!
//! - A line ending in `:` opens a block named after the symbol in front of it.
//! - A blank line closes the open block.
//! - Inside a block every other line is an instruction. Its mnemonic decides the
//!   control flow: `ret*` ends the function, `jmp*` always branches, any other
//!   `j*` may branch. Unless the last instruction was a `ret` or `jmp`, the next
//!   block gets a fall-through edge from the previous one.
//! - `$ip=` / `$scopeip=` set the address whose block is highlighted.
//! - `_ _ _ _` separates the listings of consecutive stack frames.
//!
//! # Key Types
//! - [`FrameReader`] - Streaming iterator yielding one [`Frame`] at a time
//! - [`ParseOutput`] - All frames plus the title of a stack walk
//! - [`Instruction`] / [`FlowType`] - A single split instruction line
//!
//! # Example
//! ```rust
//! use ufgraph::parser::{parse_str, ParseOptions};
//!
//! let listing = "\
//! app!main:
//! 00401000 85c0            test    eax,eax
//! 00401002 7402            je      app!main+0x6 (00401006)
//!
//! app!main+0x4:
//! 00401004 33c0            xor     eax,eax
//!
//! app!main+0x6:
//! 00401006 c3              ret
//! ";
//!
//! let output = parse_str(listing, ParseOptions::default())?;
//! let graph = &output.frames[0].graph;
//! assert_eq!(graph.len(), 3);
//! assert_eq!(graph.node("appmain").unwrap().successors(), ["appmain0x6", "appmain0x4"]);
//! # Ok::<(), ufgraph::Error>(())
//! ```

mod blocks;
mod frames;
mod line;

pub use frames::{parse, parse_str, Frame, FrameReader, ParseOutput};
pub use line::{block_name, FlowType, Instruction, LineKind, FRAME_SEPARATOR};

/// Parser configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// The input holds one `uf` output per stack frame, separated by `_ _ _ _`.
    /// Frame labels and the title are only captured in this mode.
    pub stackwalk: bool,
}
