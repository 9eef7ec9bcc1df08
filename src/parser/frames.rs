//! Splitting a listing into stack frames and driving the block parser over each.

use std::io::BufRead;

use log::{debug, warn};

use crate::{
    graph::Graph,
    parser::{
        blocks::{BlockParser, Step},
        ParseOptions,
    },
    Result,
};

/// The graph of one stack frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0-based position of the frame in the input
    pub index: usize,
    /// Last token of the frame's first non-block line (stack-walk mode only),
    /// e.g. `app!main+0x14` for a `kn`-style frame line
    pub label: Option<String>,
    /// The blocks of this frame; may be empty
    pub graph: Graph,
}

/// Everything a whole parse produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    /// First non-block line of the first frame as read, trailing whitespace
    /// removed (stack-walk mode only)
    pub title: Option<String>,
    /// One entry per frame in input order; exactly one outside stack-walk mode
    pub frames: Vec<Frame>,
}

impl ParseOutput {
    /// The frame labels in frame order, one per frame, so they line up with
    /// [`ParseOutput::graphs`].
    pub fn labels(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        self.frames.iter().map(|f| f.label.as_deref())
    }

    /// The graphs in frame order.
    pub fn graphs(&self) -> impl Iterator<Item = &Graph> + '_ {
        self.frames.iter().map(|f| &f.graph)
    }
}

/// Streaming frame iterator over a `uf` listing.
///
/// Each [`Frame`] is yielded as soon as its separator (or the end of input) has
/// been read, so a caller can render frames while the listing is still being
/// produced. Outside stack-walk mode iteration stops after the first frame.
/// After an error the iterator is exhausted.
///
/// Lines are decoded as UTF-8; bytes that are not valid UTF-8 (ANSI debugger
/// logs, source paths in another code page) are replaced with U+FFFD.
///
/// # Examples
///
/// ```rust
/// use ufgraph::parser::{FrameReader, ParseOptions};
///
/// let listing = "a:\n00401000 c3 ret\n_ _ _ _\nb:\n00402000 c3 ret\n";
/// let reader = FrameReader::new(listing.as_bytes(), ParseOptions { stackwalk: true });
///
/// let frames = reader.collect::<ufgraph::Result<Vec<_>>>()?;
/// assert_eq!(frames.len(), 2);
/// # Ok::<(), ufgraph::Error>(())
/// ```
pub struct FrameReader<R> {
    reader: R,
    buffer: Vec<u8>,
    options: ParseOptions,
    line_no: usize,
    index: usize,
    title: Option<String>,
    done: bool,
}

impl<R: BufRead> FrameReader<R> {
    /// Wraps `reader`.
    pub fn new(reader: R, options: ParseOptions) -> Self {
        FrameReader {
            reader,
            buffer: Vec::new(),
            options,
            line_no: 0,
            index: 0,
            title: None,
            done: false,
        }
    }

    /// The verbatim first non-block line of the first frame, once that frame
    /// has been yielded.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Reads the next line into the buffer, without its line terminator.
    /// Returns `false` at end of input.
    fn read_line(&mut self) -> Result<bool> {
        self.buffer.clear();
        if self.reader.read_until(b'\n', &mut self.buffer)? == 0 {
            return Ok(false);
        }
        if self.buffer.last() == Some(&b'\n') {
            self.buffer.pop();
            if self.buffer.last() == Some(&b'\r') {
                self.buffer.pop();
            }
        }
        Ok(true)
    }

    fn read_frame(&mut self) -> Result<Option<Frame>> {
        let mut parser = BlockParser::new(self.options);

        loop {
            if !self.read_line()? {
                self.done = true;
                // Trailing separators and blank lines do not make a frame of their own.
                if !parser.has_content() && self.index > 0 {
                    return Ok(None);
                }
                return Ok(Some(self.complete(parser)));
            }

            self.line_no += 1;
            let line = String::from_utf8_lossy(&self.buffer).into_owned();
            if parser.feed(self.line_no, &line)? == Step::EndOfFrame {
                if !self.options.stackwalk {
                    self.done = true;
                }
                return Ok(Some(self.complete(parser)));
            }
        }
    }

    fn complete(&mut self, parser: BlockParser) -> Frame {
        let (graph, first_text) = parser.finish();

        if self.index == 0 {
            self.title.clone_from(&first_text);
        }
        let label = first_text
            .as_deref()
            .and_then(|text| text.split_whitespace().last())
            .map(str::to_string);

        if graph.is_empty() {
            warn!("frame {} produced no blocks", self.index);
        } else {
            debug!(
                "frame {} complete: {} blocks, {} edges",
                self.index,
                graph.len(),
                graph.edge_count()
            );
        }

        let frame = Frame {
            index: self.index,
            label,
            graph,
        };
        self.index += 1;
        frame
    }
}

impl<R: BufRead> Iterator for FrameReader<R> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_frame() {
            Ok(frame) => frame.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Parses a whole listing.
///
/// # Arguments
///
/// * `reader`  - The listing, consumed line by line
/// * `options` - Whether the input holds one `uf` output per stack frame
///
/// # Errors
///
/// Returns [`crate::Error::Parse`] for the first malformed line and
/// [`crate::Error::FileError`] if reading fails.
pub fn parse<R: BufRead>(reader: R, options: ParseOptions) -> Result<ParseOutput> {
    let mut frames = FrameReader::new(reader, options);
    let collected = frames.by_ref().collect::<Result<Vec<_>>>()?;

    Ok(ParseOutput {
        title: frames.title,
        frames: collected,
    })
}

/// Parses a listing held in memory. See [`parse`].
///
/// # Errors
///
/// Returns [`crate::Error::Parse`] for the first malformed line.
pub fn parse_str(input: &str, options: ParseOptions) -> Result<ParseOutput> {
    parse(input.as_bytes(), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STACKWALK: ParseOptions = ParseOptions { stackwalk: true };

    #[test]
    fn empty_input_yields_one_empty_frame() {
        let output = parse_str("", ParseOptions::default()).unwrap();
        assert_eq!(output.frames.len(), 1);
        assert!(output.frames[0].graph.is_empty());
        assert_eq!(output.title, None);
    }

    #[test]
    fn single_mode_stops_at_first_separator() {
        let input = "a:\n00401000 c3 ret\n_ _ _ _\nb:\n00402000 c3 ret\n";
        let output = parse_str(input, ParseOptions::default()).unwrap();
        assert_eq!(output.frames.len(), 1);
        assert!(output.frames[0].graph.node("a").is_some());
        assert!(output.frames[0].graph.node("b").is_none());
    }

    #[test]
    fn stackwalk_labels_and_title() {
        let input = "_ _ _ _
00 0012ff80 00401234 app!main+0x14
$scopeip=00401234
app!main:
00401230 e8cbffffff call app!helper (00401200)
00401234 c3 ret
_ _ _ _
01 0012ffc0 7c817077 kernel32!BaseProcessStart+0x23
kernel32!BaseProcessStart:
7c817070 ffd0 call eax
7c817077 c3 ret
";
        let output = parse_str(input, STACKWALK).unwrap();

        assert_eq!(output.frames.len(), 2);
        assert_eq!(
            output.title.as_deref(),
            Some("00 0012ff80 00401234 app!main+0x14")
        );
        let labels: Vec<_> = output.labels().collect();
        assert_eq!(
            labels,
            vec![Some("app!main+0x14"), Some("kernel32!BaseProcessStart+0x23")]
        );
        assert_eq!(output.frames[0].index, 0);
        assert_eq!(output.frames[1].index, 1);

        let first = &output.frames[0].graph;
        assert!(first.node("appmain").unwrap().is_highlighted());
        let second = &output.frames[1].graph;
        assert!(!second.node("kernel32BaseProcessStart").unwrap().is_highlighted());
    }

    #[test]
    fn ip_does_not_leak_into_next_frame() {
        let input = "$ip=00401000
a:
00401000 90 nop
_ _ _ _
b:
00401000 90 nop
";
        let output = parse_str(input, STACKWALK).unwrap();
        assert!(output.frames[0].graph.node("a").unwrap().is_highlighted());
        assert!(!output.frames[1].graph.node("b").unwrap().is_highlighted());
    }

    #[test]
    fn no_fall_through_across_frames() {
        let input = "a:\n00401000 90 nop\n_ _ _ _\nb:\n00402000 90 nop\n";
        let output = parse_str(input, STACKWALK).unwrap();
        assert!(output.frames[0].graph.node("a").unwrap().successors().is_empty());
    }

    #[test]
    fn trailing_separator_adds_no_frame() {
        let input = "a:\n00401000 c3 ret\n_ _ _ _\n\n";
        let output = parse_str(input, STACKWALK).unwrap();
        assert_eq!(output.frames.len(), 1);
    }

    #[test]
    fn frames_are_yielded_lazily() {
        let input = "a:\n00401000 c3 ret\n_ _ _ _\nb:\n00402000\n";
        let mut reader = FrameReader::new(input.as_bytes(), STACKWALK);

        let first = reader.next().unwrap().unwrap();
        assert!(first.graph.node("a").is_some());
        assert!(reader.next().unwrap().is_err());
        assert!(reader.next().is_none());
    }

    #[test]
    fn frame_without_code_keeps_its_own_label() {
        let input = "_ _ _ _
00 0012ff80 00401234 app!a+0x1
No code found, aborting
_ _ _ _
01 0012ffc0 00402000 app!b+0x2
app!b:
00402000 c3 ret
";
        let output = parse_str(input, STACKWALK).unwrap();

        assert_eq!(output.frames.len(), 2);
        assert_eq!(
            output.labels().collect::<Vec<_>>(),
            vec![Some("app!a+0x1"), Some("app!b+0x2")]
        );
        assert!(output.frames[0].graph.is_empty());
        assert!(output.frames[1].graph.node("appb").is_some());
    }

    #[test]
    fn headers_only_frame_does_not_fall_into_next() {
        let input = "a:\n\n_ _ _ _\nb:\n00402000 c3 ret\n";
        let output = parse_str(input, STACKWALK).unwrap();

        assert_eq!(output.frames.len(), 2);
        let first = &output.frames[0].graph;
        assert!(first.node("a").unwrap().successors().is_empty());
        assert!(first.node("b").is_none());
        assert!(output.frames[1].graph.node("b").is_some());
    }

    #[test]
    fn labels_line_up_with_graphs() {
        let input = "a:\n00401000 c3 ret\n_ _ _ _\n01 0012ffc0 00402000 app!b+0x2\nb:\n00402000 c3 ret\n";
        let output = parse_str(input, STACKWALK).unwrap();

        assert_eq!(
            output.labels().collect::<Vec<_>>(),
            vec![None, Some("app!b+0x2")]
        );
        assert_eq!(output.graphs().count(), 2);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let input: &[u8] = b"test!main [c:\\src\\caf\xE9\\main.c @ 10]:\r\n   10 00401000 c3 ret\r\n";
        let output = parse(input, ParseOptions::default()).unwrap();
        let graph = &output.frames[0].graph;

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.node("testmain").unwrap().label_lines(), ["00401000 ret"]);
    }

    #[test]
    fn invalid_utf8_in_malformed_line_reports_position() {
        let input: &[u8] = b"a:\n00401000 90 nop\n0040100\xE9\n";
        match parse(input, ParseOptions::default()) {
            Err(crate::Error::Parse { line, content, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(content, "0040100\u{FFFD}");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }
}
