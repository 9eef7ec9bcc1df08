use std::io::{self, Write};

use comfy_table::{presets, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

use crate::app::GlobalOptions;

/// Prints `data` to stdout, as JSON with `--json`, otherwise as the text
/// `render` builds from it.
pub fn print_output<T: Serialize>(
    data: &T,
    opts: &GlobalOptions,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    write_output(&mut io::stdout().lock(), data, opts.json, render)
}

fn write_output<W: Write, T: Serialize>(
    out: &mut W,
    data: &T,
    json: bool,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, data)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", render(data))?;
    }
    Ok(())
}

/// Per-frame summary table: frame number, label, block and edge counts, and
/// the file written. Borderless, numeric columns right-aligned.
pub struct FrameTable {
    table: Table,
}

impl FrameTable {
    const COLUMNS: [(&'static str, CellAlignment); 5] = [
        ("Frame", CellAlignment::Right),
        ("Label", CellAlignment::Left),
        ("Blocks", CellAlignment::Right),
        ("Edges", CellAlignment::Right),
        ("Output", CellAlignment::Left),
    ];

    pub fn new() -> Self {
        let mut table = Table::new();
        table
            .load_preset(presets::NOTHING)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(Self::COLUMNS.iter().map(|(name, _)| *name).collect::<Vec<_>>());

        let last = Self::COLUMNS.len() - 1;
        for (i, (_, align)) in Self::COLUMNS.iter().enumerate() {
            if let Some(col) = table.column_mut(i) {
                col.set_cell_alignment(*align);
                col.set_padding((u16::from(i != 0), u16::from(i != last)));
            }
        }

        FrameTable { table }
    }

    /// Adds one frame. `output` is `None` for frames that were not rendered.
    pub fn row(
        &mut self,
        index: usize,
        label: Option<&str>,
        blocks: usize,
        edges: usize,
        output: Option<&str>,
    ) {
        self.table.add_row(vec![
            index.to_string(),
            label.unwrap_or_default().to_string(),
            blocks.to_string(),
            edges.to_string(),
            output.unwrap_or("-").to_string(),
        ]);
    }

    /// The table text, one line per row, trailing padding removed.
    pub fn render(&self) -> String {
        let mut text = String::new();
        for line in self.table.to_string().lines() {
            text.push_str(line.trim_end());
            text.push('\n');
        }
        text
    }
}
