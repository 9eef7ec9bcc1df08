use std::process::ExitStatus;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// Describes why a single input line could not be parsed.
///
/// Carried by [`Error::Parse`] together with the offending line and its position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// An instruction line had fewer than the three fields (address, opcode bytes,
    /// mnemonic) every instruction must carry.
    TooFewFields {
        /// Number of fields that were actually found
        found: usize,
    },
    /// A block header had nothing in front of its trailing `:`, or only decoration
    /// characters.
    EmptyBlockName,
    /// A jump or branch mnemonic without an operand to take the target from.
    MissingBranchTarget,
}

impl std::fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseErrorKind::TooFewFields { found } => write!(
                f,
                "expected address, opcode bytes and mnemonic but found {found} field(s)"
            ),
            ParseErrorKind::EmptyBlockName => write!(f, "block header has an empty name"),
            ParseErrorKind::MissingBranchTarget => write!(f, "branch has no target operand"),
        }
    }
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Input Errors
/// - [`Error::Parse`] - A line of the disassembly listing did not have the expected shape
/// - [`Error::EmptyName`] - A node was created without a usable name
/// - [`Error::InvalidName`] - A node name still carries decorations
/// - [`Error::FileError`] - Reading the input stream failed
///
/// ## Rendering Errors
/// - [`Error::RendererUnavailable`] - The layout program could not be started
/// - [`Error::RendererFailed`] - The layout program ran but reported failure
/// - [`Error::UnsupportedFormat`] - Unknown output format name
///
/// # Examples
///
/// ```rust
/// use ufgraph::{parser::{parse_str, ParseOptions}, Error};
///
/// match parse_str("foo!bar:\n 00401000\n", ParseOptions::default()) {
///     Err(Error::Parse { line, content, reason }) => {
///         eprintln!("line {line}: {reason}: '{content}'");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
///     Ok(_) => {}
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An internal invariant was violated.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// A line of the input listing could not be parsed.
    ///
    /// The whole parse is aborted; no partial block recovery is attempted.
    #[error("Line {line}: {reason} - '{content}'")]
    Parse {
        /// 1-based line number within the input stream
        line: usize,
        /// The offending line, trailing whitespace removed
        content: String,
        /// What was wrong with it
        reason: ParseErrorKind,
    },

    /// A graph node was created with a name that is empty after removing decorations.
    #[error("Node name is empty")]
    EmptyName,

    /// A graph node name still contains whitespace or symbol decorations (`!`, `+`).
    #[error("Invalid node name '{0}'")]
    InvalidName(String),

    /// File I/O error.
    ///
    /// Wraps standard I/O errors raised while reading the listing or writing
    /// graph documents.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// The external layout program could not be spawned.
    #[error("Could not start renderer '{0}' - is Graphviz installed?")]
    RendererUnavailable(String),

    /// The external layout program exited unsuccessfully.
    #[error("Renderer '{program}' failed ({status}): {stderr}")]
    RendererFailed {
        /// Program that was invoked
        program: String,
        /// Its exit status
        status: ExitStatus,
        /// Whatever it wrote to stderr
        stderr: String,
    },

    /// The requested output format is not one of the supported ones.
    #[error("Unsupported output format '{0}'")]
    UnsupportedFormat(String),
}
