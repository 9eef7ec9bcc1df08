//! The per-frame block state machine.
//!
//! A [`BlockParser`] is fed one line at a time and builds the [`Graph`] of a
//! single stack frame. It is either outside of a block, where only directives,
//! headers and the frame label are of interest, or inside one, where every
//! non-blank line is an instruction.

use log::{debug, trace};

use crate::{
    error::ParseErrorKind,
    graph::{Graph, Node},
    parser::{
        line::{block_name, FlowType, Instruction, LineKind},
        ParseOptions,
    },
    Error, Result,
};

/// What the caller should do after a line was consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Keep feeding lines
    Continue,
    /// The line was a frame separator that ended this frame
    EndOfFrame,
}

/// State of one frame being parsed.
pub(crate) struct BlockParser {
    options: ParseOptions,
    graph: Graph,
    /// The open block, if any
    current: Option<Node>,
    /// The last instruction was a return or unconditional jump, so the next
    /// block is not reached by falling through
    diverted: bool,
    /// Current instruction pointer from `$ip` / `$scopeip`
    ip: Option<String>,
    /// First line outside of any block that was not a header or directive
    first_text: Option<String>,
    seen_content: bool,
}

impl BlockParser {
    pub fn new(options: ParseOptions) -> Self {
        BlockParser {
            options,
            graph: Graph::new(),
            current: None,
            diverted: false,
            ip: None,
            first_text: None,
            seen_content: false,
        }
    }

    /// Whether anything besides blank lines and leading separators was seen.
    pub fn has_content(&self) -> bool {
        self.seen_content
    }

    /// Consumes one line.
    ///
    /// ## Arguments
    /// * `line_no` - 1-based position of the line in the whole input, for errors
    /// * `line`    - The raw line; trailing whitespace is ignored
    pub fn feed(&mut self, line_no: usize, line: &str) -> Result<Step> {
        let line = line.trim_end();
        let kind = LineKind::classify(line);
        trace!("line {line_no}: {kind:?}");

        match kind {
            LineKind::FrameSeparator => {
                // Separators ahead of a frame's first line only introduce it.
                if self.seen_content {
                    self.close_block();
                    return Ok(Step::EndOfFrame);
                }
            }
            LineKind::BlockHeader(symbol) => {
                self.seen_content = true;
                let name = block_name(symbol).map_err(|reason| parse_error(line_no, line, reason))?;
                self.open_block(name)?;
            }
            LineKind::Blank => self.close_block(),
            LineKind::IpDirective(address) => {
                self.seen_content = true;
                debug!("instruction pointer at {address}");
                self.ip = Some(address.to_string());
            }
            LineKind::Text(text) => {
                self.seen_content = true;
                if self.current.is_some() {
                    self.instruction(line_no, text)?;
                } else if self.first_text.is_none() {
                    self.first_text = Some(line.to_string());
                }
            }
        }

        Ok(Step::Continue)
    }

    fn open_block(&mut self, name: String) -> Result<()> {
        // Listings separate blocks with blank lines; a header that runs into
        // an open block closes it first.
        self.close_block();

        if !self.diverted {
            if let Some(previous) = self.graph.last_mut() {
                trace!("fall-through {} -> {name}", previous.name());
                previous.add_edge(name.clone());
            }
        }

        debug!("open block {name}");
        self.current = Some(Node::new(name)?);
        Ok(())
    }

    fn close_block(&mut self) {
        if let Some(node) = self.current.take() {
            debug!(
                "close block {} ({} instructions)",
                node.name(),
                node.label_lines().len()
            );
            self.graph.push(node);
        }
    }

    fn instruction(&mut self, line_no: usize, line: &str) -> Result<()> {
        let instr = Instruction::parse(line).map_err(|reason| parse_error(line_no, line, reason))?;
        let flow = instr.flow_type();

        let target = if flow.has_target() {
            Some(
                instr
                    .branch_target()
                    .ok_or_else(|| parse_error(line_no, line, ParseErrorKind::MissingBranchTarget))?,
            )
        } else {
            None
        };

        let at_ip = self.ip.as_deref().is_some_and(|ip| instr.is_at(ip));

        let Some(node) = self.current.as_mut() else {
            return Err(malformed_error!(
                "instruction on line {} outside of a block",
                line_no
            ));
        };

        node.add_label_line(instr.label());
        if at_ip {
            debug!("block {} holds the instruction pointer", node.name());
            node.mark_highlighted();
        }
        if let Some(target) = target {
            trace!("{flow} {} -> {target}", node.name());
            node.add_edge(target);
        }

        self.diverted = !flow.falls_through();
        Ok(())
    }

    /// Closes any open block and hands back the frame's graph and label line.
    pub fn finish(mut self) -> (Graph, Option<String>) {
        self.close_block();
        let first_text = if self.options.stackwalk {
            self.first_text
        } else {
            None
        };
        (self.graph, first_text)
    }
}

fn parse_error(line_no: usize, line: &str, reason: ParseErrorKind) -> Error {
    Error::Parse {
        line: line_no,
        content: line.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(input: &str) -> Result<(Graph, Vec<Step>)> {
        let mut parser = BlockParser::new(ParseOptions::default());
        let mut steps = Vec::new();
        for (i, line) in input.lines().enumerate() {
            steps.push(parser.feed(i + 1, line)?);
        }
        Ok((parser.finish().0, steps))
    }

    #[test]
    fn headers_only_fall_through() {
        let (graph, _) = run("a:\n\nb:\n\nc:\n").unwrap();

        let names: Vec<_> = graph.nodes().iter().map(Node::name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(graph.nodes().iter().all(|n| n.label_lines().is_empty()));
        assert_eq!(graph.node("a").unwrap().successors(), ["b"]);
        assert_eq!(graph.node("b").unwrap().successors(), ["c"]);
        assert!(graph.node("c").unwrap().successors().is_empty());
    }

    #[test]
    fn return_suppresses_fall_through() {
        let input = "a:\n00401000 c3 ret\n\nb:\n00401001 90 nop\n";
        let (graph, _) = run(input).unwrap();
        assert!(graph.node("a").unwrap().successors().is_empty());
    }

    #[test]
    fn jump_adds_edge_and_suppresses_fall_through() {
        let input = "a:\n00401000 eb05 jmp foo!bar+0x5 (00401005)\n\nb:\n00401002 90 nop\n";
        let (graph, _) = run(input).unwrap();
        assert_eq!(graph.node("a").unwrap().successors(), ["foobar0x5"]);
    }

    #[test]
    fn branch_adds_edge_and_falls_through() {
        let input = "a:\n00401000 7405 je target\n\nb:\n00401002 c3 ret\n";
        let (graph, _) = run(input).unwrap();
        assert_eq!(graph.node("a").unwrap().successors(), ["target", "b"]);
    }

    #[test]
    fn only_last_instruction_decides_fall_through() {
        let input = "a:\n00401000 c3 ret\n00401001 90 nop\n\nb:\n";
        let (graph, _) = run(input).unwrap();
        assert_eq!(graph.node("a").unwrap().successors(), ["b"]);
    }

    #[test]
    fn header_closes_open_block() {
        let input = "a:\n00401000 90 nop\nb:\n00401001 c3 ret\n";
        let (graph, _) = run(input).unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.node("a").unwrap().successors(), ["b"]);
        assert_eq!(graph.node("b").unwrap().label_lines(), ["00401001 ret"]);
    }

    #[test]
    fn lines_outside_blocks_are_ignored() {
        let input = "some banner\nmore noise\na:\n00401000 c3 ret\n\ntrailing noise\n";
        let (graph, _) = run(input).unwrap();
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.nodes()[0].label_lines(), ["00401000 ret"]);
    }

    #[test]
    fn highlight_follows_directive() {
        let input = "$ip=00401001\na:\n00401000 90 nop\n\nb:\n00401001 90 nop\n";
        let (graph, _) = run(input).unwrap();
        assert!(!graph.node("a").unwrap().is_highlighted());
        assert!(graph.node("b").unwrap().is_highlighted());
    }

    #[test]
    fn leading_separators_are_ignored() {
        let (_, steps) = run("_ _ _ _\n_ _ _ _\na:\n00401000 c3 ret\n_ _ _ _\n").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Continue,
                Step::Continue,
                Step::Continue,
                Step::Continue,
                Step::EndOfFrame
            ]
        );
    }

    #[test]
    fn separator_ends_frame_without_instructions() {
        let (_, steps) = run("00 0012ff80 00401234 app!main+0x14\n_ _ _ _\n").unwrap();
        assert_eq!(steps, vec![Step::Continue, Step::EndOfFrame]);

        let (graph, steps) = run("a:\n\n_ _ _ _\n").unwrap();
        assert_eq!(steps, vec![Step::Continue, Step::Continue, Step::EndOfFrame]);
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn frame_label_line_is_kept_as_read() {
        let mut parser = BlockParser::new(ParseOptions { stackwalk: true });
        parser.feed(1, "  00 0012ff80 00401234 app!main+0x14  ").unwrap();
        assert_eq!(
            parser.finish().1.as_deref(),
            Some("  00 0012ff80 00401234 app!main+0x14")
        );
    }

    #[test]
    fn separator_closes_open_block() {
        let mut parser = BlockParser::new(ParseOptions::default());
        parser.feed(1, "a:").unwrap();
        parser.feed(2, "00401000 c3 ret").unwrap();
        assert_eq!(parser.feed(3, "_ _ _ _").unwrap(), Step::EndOfFrame);
        let (graph, _) = parser.finish();
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn malformed_instruction_reports_position() {
        let err = run("a:\n00401000 90 nop\n00401001\n").unwrap_err();
        match err {
            Error::Parse {
                line,
                content,
                reason,
            } => {
                assert_eq!(line, 3);
                assert_eq!(content, "00401001");
                assert_eq!(reason, ParseErrorKind::TooFewFields { found: 1 });
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_header_is_an_error() {
        let err = run(":\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                line: 1,
                reason: ParseErrorKind::EmptyBlockName,
                ..
            }
        ));
    }

    #[test]
    fn branch_without_target_is_an_error() {
        let err = run("a:\n00401000 ff jmp\n").unwrap_err();
        assert!(matches!(
            err,
            Error::Parse {
                line: 2,
                reason: ParseErrorKind::MissingBranchTarget,
                ..
            }
        ));
    }

    #[test]
    fn first_text_only_in_stackwalk_mode() {
        let mut parser = BlockParser::new(ParseOptions { stackwalk: true });
        parser.feed(1, "00 0012ff80 00401234 app!main+0x14").unwrap();
        parser.feed(2, "second line").unwrap();
        assert_eq!(
            parser.finish().1.as_deref(),
            Some("00 0012ff80 00401234 app!main+0x14")
        );

        let mut parser = BlockParser::new(ParseOptions::default());
        parser.feed(1, "00 0012ff80 00401234 app!main+0x14").unwrap();
        assert_eq!(parser.finish().1, None);
    }
}
