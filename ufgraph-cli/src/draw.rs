use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::Context;
use log::{info, warn};
use serde::Serialize;
use ufgraph::{
    parser::{FrameReader, ParseOptions},
    render::{renderer_for, OutputFormat},
};
use uuid::Uuid;

use crate::{
    app::Cli,
    index::{write_index, IndexEntry},
    output::{print_output, FrameTable},
    viewer,
};

#[derive(Debug, Serialize)]
struct FrameOutput {
    index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    blocks: usize,
    edges: usize,
    highlighted: Vec<String>,
    /// `None` for frames without blocks, which are not rendered
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DrawOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    format: String,
    output_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<PathBuf>,
    frames: Vec<FrameOutput>,
}

/// Picks the output format: explicit choice, else svg for stack walks, else png.
fn output_format(cli: &Cli) -> anyhow::Result<OutputFormat> {
    match &cli.output {
        Some(name) => Ok(OutputFormat::from_name(name)?),
        None if cli.stackwalk => Ok(OutputFormat::Svg),
        None => Ok(OutputFormat::default()),
    }
}

fn output_dir(cli: &Cli) -> PathBuf {
    cli.output_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(format!("ufgraph-{}", Uuid::new_v4())))
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open listing: {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

pub fn run(cli: &Cli) -> anyhow::Result<()> {
    let format = output_format(cli)?;
    let dir = output_dir(cli);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let renderer = renderer_for(format, &cli.dot_program);
    let options = ParseOptions {
        stackwalk: cli.stackwalk,
    };

    let mut frames = FrameReader::new(open_input(cli.input.as_deref())?, options);
    let mut summaries = Vec::new();
    let mut entries = Vec::new();

    for frame in frames.by_ref() {
        let frame = frame.context("failed to parse listing")?;
        let graph = &frame.graph;

        let output = if graph.is_empty() {
            warn!("frame {} has no blocks, skipping", frame.index);
            None
        } else {
            let path = renderer
                .render(graph, &dir.join(format!("frame{}", frame.index)))
                .with_context(|| format!("failed to render frame {}", frame.index))?;
            info!(
                "frame {}: {} blocks, {} edges -> {}",
                frame.index,
                graph.len(),
                graph.edge_count(),
                path.display()
            );
            entries.push(IndexEntry {
                label: frame
                    .label
                    .clone()
                    .unwrap_or_else(|| format!("frame {}", frame.index)),
                image: path.clone(),
            });
            Some(path)
        };

        summaries.push(FrameOutput {
            index: frame.index,
            label: frame.label.clone(),
            blocks: graph.len(),
            edges: graph.edge_count(),
            highlighted: graph.highlighted().map(|n| n.name().to_string()).collect(),
            output,
        });
    }

    let title = frames.title().map(str::to_string);

    let index = if cli.stackwalk && !entries.is_empty() {
        Some(write_index(&dir, title.as_deref(), &entries, format)?)
    } else {
        None
    };

    let result = DrawOutput {
        title,
        format: format.to_string(),
        output_dir: dir,
        index,
        frames: summaries,
    };

    print_output(&result, &cli.global, |result| {
        let mut table = FrameTable::new();
        for f in &result.frames {
            let output = f.output.as_ref().map(|p| p.display().to_string());
            table.row(f.index, f.label.as_deref(), f.blocks, f.edges, output.as_deref());
        }
        let mut text = table.render();
        if let Some(index) = &result.index {
            text.push_str(&format!("\nIndex: {}\n", index.display()));
        }
        text
    })?;

    if !cli.quiet {
        let target = result
            .index
            .as_ref()
            .or_else(|| result.frames.iter().find_map(|f| f.output.as_ref()));
        match target {
            Some(path) => viewer::open(path)?,
            None => warn!("nothing was rendered"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn format_defaults_follow_mode() {
        let cli = Cli::parse_from(["ufgraph"]);
        assert_eq!(output_format(&cli).unwrap(), OutputFormat::Png);

        let cli = Cli::parse_from(["ufgraph", "--stackwalk"]);
        assert_eq!(output_format(&cli).unwrap(), OutputFormat::Svg);

        let cli = Cli::parse_from(["ufgraph", "--stackwalk", "-o", "gif"]);
        assert_eq!(output_format(&cli).unwrap(), OutputFormat::Gif);

        let cli = Cli::parse_from(["ufgraph", "-o", "bmp"]);
        assert!(output_format(&cli).is_err());
    }

    #[test]
    fn renders_dot_files_without_graphviz() {
        let dir = tempfile::tempdir().unwrap();
        let listing = dir.path().join("listing.txt");
        fs::write(
            &listing,
            "_ _ _ _\n00 app!main+0x4\napp!main:\n00401000 c3 ret\n_ _ _ _\n01 app!start+0x9\napp!start:\n00402000 c3 ret\n",
        )
        .unwrap();
        let out = dir.path().join("out");

        let cli = Cli::parse_from([
            "ufgraph",
            "-s",
            "-q",
            "-o",
            "dot",
            "-d",
            out.to_str().unwrap(),
            listing.to_str().unwrap(),
        ]);
        run(&cli).unwrap();

        assert!(out.join("frame0.dot").exists());
        assert!(out.join("frame1.dot").exists());
        let html = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(html.contains("app!main+0x4"));
        assert!(html.contains("app!start+0x9"));
    }
}
