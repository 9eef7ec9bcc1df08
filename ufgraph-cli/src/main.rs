mod app;
mod draw;
mod index;
mod output;
mod viewer;

use clap::Parser;

use crate::app::{Cli, GlobalOptions};

fn main() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        eprintln!("\nInterrupted, partial output may remain.");
        std::process::exit(130);
    })
    .expect("failed to set Ctrl+C handler");

    let cli = Cli::parse();
    if !cli.global.json {
        init_logging(&cli.global);
    }

    draw::run(&cli)
}

/// Library logs go to stderr, info and up (debug with `--verbose`).
/// `RUST_LOG` takes precedence.
fn init_logging(opts: &GlobalOptions) {
    let level = if opts.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_module("ufgraph", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}
