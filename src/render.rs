//! Rendering graphs through an external layout program.
//!
//! Layout is not done in this crate. A [`Renderer`] takes a [`Graph`] and an
//! output location and produces a file; [`GraphvizRenderer`] runs the Graphviz
//! `dot` program, [`DotWriter`] only writes the DOT document itself.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ufgraph::{graph::Graph, render::{renderer_for, OutputFormat}};
//!
//! let renderer = renderer_for(OutputFormat::Svg, "dot");
//! let image = renderer.render(&Graph::new(), Path::new("/tmp/frame0"))?;
//! println!("wrote {}", image.display());
//! # Ok::<(), ufgraph::Error>(())
//! ```

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::Command,
    str::FromStr,
};

use log::debug;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{graph::Graph, Error, Result};

/// Default Graphviz layout program.
pub const DEFAULT_DOT_PROGRAM: &str = "dot";

/// File formats a graph can be rendered to.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    /// Portable Network Graphics
    #[default]
    Png,
    /// Scalable Vector Graphics
    Svg,
    /// Graphics Interchange Format
    Gif,
    /// Portable Document Format
    Pdf,
    /// The DOT document itself, no layout
    Dot,
}

impl OutputFormat {
    /// Parses a format name such as `svg`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for unknown names.
    pub fn from_name(name: &str) -> Result<Self> {
        OutputFormat::from_str(&name.to_ascii_lowercase())
            .map_err(|_| Error::UnsupportedFormat(name.to_string()))
    }

    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        self.into()
    }

    /// Whether the format needs the layout program.
    #[must_use]
    pub fn is_image(self) -> bool {
        self != OutputFormat::Dot
    }
}

/// Something that turns a graph into a file.
pub trait Renderer {
    /// Renders `graph` next to `output`, which is given without extension, and
    /// returns the path of the file written.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the layout program
    /// is missing or fails.
    fn render(&self, graph: &Graph, output: &Path) -> Result<PathBuf>;
}

/// Writes the DOT document without laying it out.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotWriter;

impl Renderer for DotWriter {
    fn render(&self, graph: &Graph, output: &Path) -> Result<PathBuf> {
        let path = output.with_extension(OutputFormat::Dot.extension());
        fs::write(&path, graph.to_dot())?;
        debug!("wrote {}", path.display());
        Ok(path)
    }
}

/// Lays a graph out with a Graphviz program (`dot -T<format> -o <image> <input>`).
///
/// The DOT document is written to a temporary `.dot` file beside the image and
/// removed once the program has run, whether it succeeded or not.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    program: String,
    format: OutputFormat,
}

impl GraphvizRenderer {
    /// Creates a renderer invoking `program` to produce `format`.
    pub fn new(program: impl Into<String>, format: OutputFormat) -> Self {
        GraphvizRenderer {
            program: program.into(),
            format,
        }
    }

    /// The program that gets invoked.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// The image format produced.
    #[must_use]
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl Renderer for GraphvizRenderer {
    fn render(&self, graph: &Graph, output: &Path) -> Result<PathBuf> {
        let source = DotWriter.render(graph, output)?;
        let image = output.with_extension(self.format.extension());
        if source == image {
            return Ok(image);
        }

        debug!(
            "running {} -T{} -o {} {}",
            self.program,
            self.format,
            image.display(),
            source.display()
        );
        let result = Command::new(&self.program)
            .arg(format!("-T{}", self.format))
            .arg("-o")
            .arg(&image)
            .arg(&source)
            .output();
        let _ = fs::remove_file(&source);

        let result = match result {
            Ok(result) => result,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::RendererUnavailable(self.program.clone()))
            }
            Err(e) => return Err(e.into()),
        };

        if !result.status.success() {
            return Err(Error::RendererFailed {
                program: self.program.clone(),
                status: result.status,
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        Ok(image)
    }
}

/// Picks the renderer for `format`: [`DotWriter`] for [`OutputFormat::Dot`],
/// otherwise a [`GraphvizRenderer`] running `program`.
#[must_use]
pub fn renderer_for(format: OutputFormat, program: &str) -> Box<dyn Renderer> {
    if format.is_image() {
        Box::new(GraphvizRenderer::new(program, format))
    } else {
        Box::new(DotWriter)
    }
}
