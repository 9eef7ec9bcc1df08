use std::path::PathBuf;

use clap::Parser;
use ufgraph::render::DEFAULT_DOT_PROGRAM;

/// ufgraph - draw the control flow graph of WinDbg `uf` output
///
/// Reads the listing from FILE or standard input, renders one graph per stack
/// frame with Graphviz and opens the result.
#[derive(Debug, Parser)]
#[command(name = "ufgraph", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    /// The `uf` listing; standard input when omitted.
    #[arg(value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output format: png, svg, gif, pdf or dot. Defaults to png, or svg with --stackwalk.
    #[arg(short, long, value_name = "FORMAT")]
    pub output: Option<String>,

    /// The input holds one `uf` listing per stack frame, separated by `_ _ _ _`.
    #[arg(short, long)]
    pub stackwalk: bool,

    /// Directory for the rendered files. Defaults to a new directory under the system temp dir.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Do not open the result in a viewer.
    #[arg(short, long)]
    pub quiet: bool,

    /// Graphviz layout program to run.
    #[arg(long, value_name = "PROGRAM", env = "UFGRAPH_DOT", default_value = DEFAULT_DOT_PROGRAM)]
    pub dot_program: String,
}

/// Options shared across all output modes.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit a summary as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}
