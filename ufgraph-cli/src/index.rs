//! The HTML page tying the frames of a stack walk together.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use ufgraph::render::OutputFormat;

/// Name of the index page inside the output directory.
pub const INDEX_FILE: &str = "index.html";

/// One rendered frame as listed on the index page.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub label: String,
    pub image: PathBuf,
}

/// Builds the index page. Images are referenced by file name, so the page
/// has to sit in the same directory.
pub fn render_index(title: Option<&str>, entries: &[IndexEntry], format: OutputFormat) -> String {
    let title = escape_html(title.unwrap_or("Stack walk"));

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str("<style>body { font-family: monospace; } h2 { margin-top: 2em; }</style>\n");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{title}</h1>");

    html.push_str("<ol start=\"0\">\n");
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            html,
            "<li><a href=\"#frame{i}\">{}</a></li>",
            escape_html(&entry.label)
        );
    }
    html.push_str("</ol>\n");

    for (i, entry) in entries.iter().enumerate() {
        let file = entry
            .image
            .file_name()
            .map(|f| escape_html(&f.to_string_lossy()))
            .unwrap_or_default();
        let label = escape_html(&entry.label);

        let _ = writeln!(html, "<h2 id=\"frame{i}\">{i}: {label}</h2>");
        match format {
            OutputFormat::Png | OutputFormat::Svg | OutputFormat::Gif => {
                let _ = writeln!(html, "<img src=\"{file}\" alt=\"{label}\">");
            }
            OutputFormat::Pdf | OutputFormat::Dot => {
                let _ = writeln!(html, "<a href=\"{file}\">{file}</a>");
            }
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

/// Writes the index page into `dir` and returns its path.
pub fn write_index(
    dir: &Path,
    title: Option<&str>,
    entries: &[IndexEntry],
    format: OutputFormat,
) -> anyhow::Result<PathBuf> {
    let path = dir.join(INDEX_FILE);
    fs::write(&path, render_index(title, entries, format))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> Vec<IndexEntry> {
        vec![
            IndexEntry {
                label: "app!main+0x14".to_string(),
                image: PathBuf::from("/tmp/out/frame0.svg"),
            },
            IndexEntry {
                label: "kernel32!BaseThreadInitThunk+0x14".to_string(),
                image: PathBuf::from("/tmp/out/frame1.svg"),
            },
        ]
    }

    #[test]
    fn lists_frames_in_order() {
        let html = render_index(Some("00 app!main+0x14"), &entries(), OutputFormat::Svg);

        assert!(html.contains("<title>00 app!main+0x14</title>"));
        let first = html.find("<img src=\"frame0.svg\"").unwrap();
        let second = html.find("<img src=\"frame1.svg\"").unwrap();
        assert!(first < second);
        assert!(html.contains("<h2 id=\"frame1\">1: kernel32!BaseThreadInitThunk+0x14</h2>"));
    }

    #[test]
    fn links_non_image_formats() {
        let html = render_index(None, &entries(), OutputFormat::Pdf);
        assert!(html.contains("<title>Stack walk</title>"));
        assert!(html.contains("<a href=\"frame0.svg\">frame0.svg</a>"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn escapes_labels() {
        let entry = IndexEntry {
            label: "std::vector<int>::push_back".to_string(),
            image: PathBuf::from("frame0.png"),
        };
        let html = render_index(Some("a & b"), &[entry], OutputFormat::Png);
        assert!(html.contains("std::vector&lt;int&gt;::push_back"));
        assert!(html.contains("<h1>a &amp; b</h1>"));
    }

    #[test]
    fn writes_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_index(dir.path(), None, &entries(), OutputFormat::Svg).unwrap();

        assert_eq!(path, dir.path().join(INDEX_FILE));
        let html = fs::read_to_string(path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
    }
}
