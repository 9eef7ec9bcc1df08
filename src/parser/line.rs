//! Classification of single listing lines.
//!
//! Nothing in here keeps state; the block parser decides what a line means
//! depending on whether a block is currently open.

use strum::Display;

use crate::{error::ParseErrorKind, graph::node_name};

/// Marker printed between the `uf` outputs of consecutive stack frames.
pub const FRAME_SEPARATOR: &str = "_ _ _ _";

/// Pseudo-register assignments that announce the current instruction pointer.
const IP_DIRECTIVES: [&str; 2] = ["$ip", "$scopeip"];

/// Separator the debugger places between the high and low halves of 64-bit addresses.
const ADDRESS_SEPARATOR: char = '`';

/// Private symbol lines carry a source line number in front of the address.
/// Anything this long is an address, not a line number.
const MAX_LINE_NUMBER_DIGITS: usize = 7;

/// The shape of one listing line, trailing whitespace already removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `_ _ _ _` - end of the current stack frame
    FrameSeparator,
    /// `module!symbol+offset:` - opens a block; carries the text before the final `:`
    BlockHeader(&'a str),
    /// Empty line - closes the open block
    Blank,
    /// `$ip=...` / `$scopeip=...` - carries the address after the first `=`
    IpDirective(&'a str),
    /// Anything else: an instruction inside a block, noise outside of one
    Text(&'a str),
}

impl<'a> LineKind<'a> {
    /// Classifies `line`. The checks run in a fixed order, so an instruction line
    /// that happens to end in `:` is read as a block header.
    #[must_use]
    pub fn classify(line: &'a str) -> Self {
        if line.starts_with(FRAME_SEPARATOR) {
            LineKind::FrameSeparator
        } else if let Some(symbol) = line.strip_suffix(':') {
            LineKind::BlockHeader(symbol)
        } else if line.trim().is_empty() {
            LineKind::Blank
        } else if let Some(address) = ip_directive(line) {
            LineKind::IpDirective(address)
        } else {
            LineKind::Text(line)
        }
    }
}

fn ip_directive(line: &str) -> Option<&str> {
    if !IP_DIRECTIVES.iter().any(|d| line.starts_with(d)) {
        return None;
    }
    line.split_once('=').map(|(_, address)| address.trim())
}

/// Derives a block name from the text in front of a header's final `:`.
///
/// # Errors
///
/// Returns [`ParseErrorKind::EmptyBlockName`] if nothing usable is left.
pub fn block_name(symbol: &str) -> Result<String, ParseErrorKind> {
    let name = symbol
        .split_whitespace()
        .next()
        .map(node_name)
        .unwrap_or_default();
    if name.is_empty() {
        return Err(ParseErrorKind::EmptyBlockName);
    }
    Ok(name)
}

/// Normalizes an address for comparison: backticks removed, surrounding
/// whitespace dropped.
fn normalize_address(address: &str) -> String {
    address
        .trim()
        .chars()
        .filter(|c| *c != ADDRESS_SEPARATOR)
        .collect()
}

/// How an instruction affects control flow, decided by mnemonic prefix only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowType {
    /// Execution continues with the next instruction
    Sequential,
    /// `ret*` - leaves the function, no fall-through
    Return,
    /// `jmp*` - always transfers to its target, no fall-through
    UnconditionalBranch,
    /// Any other `j*` - transfers to its target or falls through
    ConditionalBranch,
}

impl FlowType {
    /// Classifies a mnemonic. Every `j` mnemonic other than `jmp` counts as a
    /// conditional branch.
    #[must_use]
    pub fn from_mnemonic(mnemonic: &str) -> Self {
        if mnemonic.starts_with("ret") {
            FlowType::Return
        } else if mnemonic.starts_with("jmp") {
            FlowType::UnconditionalBranch
        } else if mnemonic.starts_with('j') {
            FlowType::ConditionalBranch
        } else {
            FlowType::Sequential
        }
    }

    /// Whether control may reach the next block after this instruction.
    #[must_use]
    pub fn falls_through(self) -> bool {
        matches!(self, FlowType::Sequential | FlowType::ConditionalBranch)
    }

    /// Whether the instruction names a branch target.
    #[must_use]
    pub fn has_target(self) -> bool {
        matches!(
            self,
            FlowType::UnconditionalBranch | FlowType::ConditionalBranch
        )
    }
}

/// One disassembled instruction split into its fields.
///
/// ```text
///  public:   00007ff6`12340000 4883ec28        sub     rsp,28h
///  private:    12 00401000 55              push    ebp
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Address, as printed (may contain a backtick)
    pub address: &'a str,
    /// Raw opcode bytes
    pub opcodes: &'a str,
    /// Mnemonic
    pub mnemonic: &'a str,
    /// Everything after the mnemonic, internal spacing preserved; may be empty
    pub operands: &'a str,
}

impl<'a> Instruction<'a> {
    /// Splits an instruction line.
    ///
    /// Lines starting with a space may carry a decimal source line number in
    /// front of the address; it is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseErrorKind::TooFewFields`] when address, opcode bytes or
    /// mnemonic is missing.
    pub fn parse(line: &'a str) -> Result<Self, ParseErrorKind> {
        let mut rest = line;
        if line.starts_with(' ') {
            if let Some((first, tail)) = next_field(line) {
                if is_line_number(first) && tail.split_whitespace().count() >= 3 {
                    rest = tail;
                }
            }
        }

        let (address, rest) = next_field(rest).ok_or(ParseErrorKind::TooFewFields { found: 0 })?;
        let (opcodes, rest) = next_field(rest).ok_or(ParseErrorKind::TooFewFields { found: 1 })?;
        let (mnemonic, rest) =
            next_field(rest).ok_or(ParseErrorKind::TooFewFields { found: 2 })?;

        Ok(Instruction {
            address,
            opcodes,
            mnemonic,
            operands: rest.trim(),
        })
    }

    /// Control flow classification of the mnemonic.
    #[must_use]
    pub fn flow_type(&self) -> FlowType {
        FlowType::from_mnemonic(self.mnemonic)
    }

    /// Name of the block a jump or branch goes to: the first operand token with
    /// decorations removed. `None` when there are no operands.
    #[must_use]
    pub fn branch_target(&self) -> Option<String> {
        self.operands.split_whitespace().next().map(node_name)
    }

    /// Display text for the block label: address, mnemonic and operands.
    /// Opcode bytes are left out.
    #[must_use]
    pub fn label(&self) -> String {
        if self.operands.is_empty() {
            format!("{} {}", self.address, self.mnemonic)
        } else {
            format!("{} {} {}", self.address, self.mnemonic, self.operands)
        }
    }

    /// Whether this instruction sits at `ip`. Backticks are ignored on both
    /// sides and hex digits compare case-insensitively.
    #[must_use]
    pub fn is_at(&self, ip: &str) -> bool {
        let ip = normalize_address(ip);
        !ip.is_empty() && normalize_address(self.address).eq_ignore_ascii_case(&ip)
    }
}

fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    Some(s.split_at(end))
}

fn is_line_number(field: &str) -> bool {
    field.len() <= MAX_LINE_NUMBER_DIGITS && field.bytes().all(|b| b.is_ascii_digit())
}
