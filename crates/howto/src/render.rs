//! Markdown to ANSI terminal rendering.
//!
//! Conversion walks the markdown event stream and emits styled text at the
//! requested color depth with wrapping disabled, because converter-side
//! wrapping conflicts with the leading indentation it produces. A second
//! manual pass word-wraps each line's content to `width - indent` and
//! re-prefixes continuations with the original indentation.
//!
//! The renderer first converts at 256 colors and retries once at 16 on
//! failure; if that also fails the error is returned and the guide falls
//! back to the raw body.

use std::fmt::Write as _;

use crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use thiserror::Error;

/// Failure modes of the markdown conversion.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Writing styled output failed.
    #[error("could not emit styled output: {0}")]
    Emit(#[from] std::fmt::Error),

    /// The markdown event stream closed a construct that was never opened.
    #[error("unbalanced markdown event stream")]
    Unbalanced,
}

/// Supported ANSI color depths, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorDepth {
    Ansi256,
    Ansi16,
}

impl ColorDepth {
    fn heading(self) -> Color {
        match self {
            Self::Ansi256 => Color::AnsiValue(81),
            Self::Ansi16 => Color::Cyan,
        }
    }

    fn code(self) -> Color {
        match self {
            Self::Ansi256 => Color::AnsiValue(186),
            Self::Ansi16 => Color::Yellow,
        }
    }

    fn link(self) -> Color {
        match self {
            Self::Ansi256 => Color::AnsiValue(68),
            Self::Ansi16 => Color::Blue,
        }
    }

    fn rule(self) -> Color {
        match self {
            Self::Ansi256 => Color::AnsiValue(244),
            Self::Ansi16 => Color::DarkGrey,
        }
    }
}

/// Converts guide bodies into wrapped, color-capable terminal text.
#[derive(Debug)]
pub struct Renderer {
    width: u16,
}

impl Renderer {
    /// Build a renderer for `width` columns; `None` detects the terminal
    /// width, floored at 80 columns.
    #[must_use]
    pub fn new(width: Option<u16>) -> Self {
        let width = width.unwrap_or_else(|| {
            crossterm::terminal::size()
                .map(|(cols, _rows)| cols)
                .unwrap_or(80)
                .max(80)
        });
        Self { width }
    }

    /// Convert markdown into ANSI-styled, word-wrapped terminal text.
    ///
    /// # Errors
    ///
    /// Returns the conversion failure after both color depths failed; the
    /// caller decides how to degrade.
    pub fn render(&self, markdown: &str) -> Result<String, RenderError> {
        let styled = match convert(markdown, ColorDepth::Ansi256) {
            Ok(styled) => styled,
            Err(err) => {
                log::debug!("256-color conversion failed ({err}), retrying with 16 colors");
                convert(markdown, ColorDepth::Ansi16)?
            }
        };
        Ok(self.wrap(&styled))
    }

    /// Wrap every line's content to `width - indent`, re-prefixing wrapped
    /// continuations with the line's original leading whitespace. The
    /// indentation run itself is never split. Style escapes emitted before
    /// the indentation are carried through and excluded from measuring.
    fn wrap(&self, text: &str) -> String {
        let width = usize::from(self.width);
        let mut out = String::with_capacity(text.len());
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                out.push('\n');
            }
            let (head, indent) = leading_run(line);
            let content = &line[head..];
            let avail = width.saturating_sub(indent).max(1);
            if visible_len(content) <= avail {
                out.push_str(line);
                continue;
            }

            // Escapes plus indentation verbatim on the first line; the
            // active style carries over, so continuations need spaces only.
            out.push_str(&line[..head]);
            let pad = " ".repeat(indent);
            let mut col = 0;
            for word in content.split_whitespace() {
                let word_len = visible_len(word);
                if col > 0 && col + 1 + word_len > avail {
                    out.push('\n');
                    out.push_str(&pad);
                    col = 0;
                }
                if col > 0 {
                    out.push(' ');
                    col += 1;
                }
                out.push_str(word);
                col += word_len;
            }
        }
        out
    }
}

/// Byte length and visible width of a line's leading run of spaces and
/// ANSI escape sequences, in any interleaving.
fn leading_run(line: &str) -> (usize, usize) {
    let bytes = line.as_bytes();
    let mut pos = 0;
    let mut indent = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b' ' => {
                indent += 1;
                pos += 1;
            }
            0x1b => match bytes[pos..].iter().position(|&b| b == b'm') {
                Some(end) => pos += end + 1,
                None => break,
            },
            _ => break,
        }
    }
    (pos, indent)
}

/// Character count excluding ANSI escape sequences.
fn visible_len(text: &str) -> usize {
    let mut len = 0;
    let mut in_escape = false;
    for ch in text.chars() {
        if in_escape {
            if ch == 'm' {
                in_escape = false;
            }
        } else if ch == '\u{1b}' {
            in_escape = true;
        } else {
            len += 1;
        }
    }
    len
}

fn convert(markdown: &str, depth: ColorDepth) -> Result<String, RenderError> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut emitter = Emitter::new(depth);
    for event in Parser::new_ext(markdown, options) {
        emitter.handle(event)?;
    }
    emitter.finish()
}

/// Inline styles active at a point in the output, kept on a stack so
/// nested constructs restore the enclosing style when they close.
#[derive(Debug, Clone, Copy)]
enum Span {
    Fg(Color),
    Attr(Attribute),
}

struct Emitter {
    depth: ColorDepth,
    out: String,
    // Style escapes held back until the next visible character, so block
    // separation never sees lines that are escapes only.
    pending: String,
    spans: Vec<Span>,
    indent: usize,
    at_line_start: bool,
    // Ordered list counters; `None` entries are bullet lists.
    lists: Vec<Option<u64>>,
    links: Vec<String>,
}

impl Emitter {
    fn new(depth: ColorDepth) -> Self {
        Self {
            depth,
            out: String::new(),
            pending: String::new(),
            spans: Vec::new(),
            indent: 0,
            at_line_start: true,
            lists: Vec::new(),
            links: Vec::new(),
        }
    }

    fn handle(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::Start(tag) => self.start(tag)?,
            Event::End(tag) => self.end(tag)?,
            Event::Text(text) => self.text(&text)?,
            Event::Code(code) => {
                self.push_span(Span::Fg(self.depth.code()))?;
                self.text(&code)?;
                self.pop_span()?;
            }
            Event::SoftBreak => self.text(" ")?,
            Event::HardBreak => self.newline(),
            Event::Rule => {
                self.blank_line();
                self.push_span(Span::Fg(self.depth.rule()))?;
                self.text(&"\u{2500}".repeat(40))?;
                self.pop_span()?;
                self.newline();
            }
            Event::TaskListMarker(checked) => {
                self.text(if checked { "[x] " } else { "[ ] " })?;
            }
            Event::Html(html) | Event::InlineHtml(html) => self.text(&html)?,
            Event::FootnoteReference(name) => self.text(&format!("[^{name}]"))?,
            // Constructs behind disabled options cannot occur.
            _ => {}
        }
        Ok(())
    }

    fn start(&mut self, tag: Tag<'_>) -> Result<(), RenderError> {
        match tag {
            Tag::Heading { level, .. } => {
                self.blank_line();
                self.indent += heading_indent(level);
                self.push_span(Span::Fg(self.depth.heading()))?;
                self.push_span(Span::Attr(Attribute::Bold))?;
            }
            Tag::Paragraph => self.blank_line(),
            Tag::BlockQuote(_) => {
                self.blank_line();
                self.indent += 2;
                self.push_span(Span::Attr(Attribute::Italic))?;
            }
            Tag::CodeBlock(_) => {
                self.blank_line();
                self.indent += 4;
                self.push_span(Span::Fg(self.depth.code()))?;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.blank_line();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.newline();
                let marker = match self.lists.last_mut() {
                    Some(Some(counter)) => {
                        let marker = format!("{counter}. ");
                        *counter += 1;
                        marker
                    }
                    Some(None) => "\u{2022} ".to_owned(),
                    None => return Err(RenderError::Unbalanced),
                };
                self.indent += 2 * (self.lists.len() - 1);
                self.text(&marker)?;
                self.indent -= 2 * (self.lists.len() - 1);
            }
            Tag::Emphasis => self.push_span(Span::Attr(Attribute::Italic))?,
            Tag::Strong => self.push_span(Span::Attr(Attribute::Bold))?,
            Tag::Strikethrough => self.push_span(Span::Attr(Attribute::CrossedOut))?,
            Tag::Link { dest_url, .. } => {
                self.links.push(dest_url.into_string());
                self.push_span(Span::Fg(self.depth.link()))?;
            }
            Tag::Image { dest_url, .. } => {
                self.links.push(dest_url.into_string());
                self.push_span(Span::Fg(self.depth.link()))?;
            }
            // Tables and footnote definitions render as their plain text.
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, tag: TagEnd) -> Result<(), RenderError> {
        match tag {
            TagEnd::Heading(level) => {
                self.pop_span()?;
                self.pop_span()?;
                self.indent = self.indent.saturating_sub(heading_indent(level));
                self.newline();
            }
            TagEnd::Paragraph => self.newline(),
            TagEnd::BlockQuote(_) => {
                self.pop_span()?;
                self.indent = self.indent.saturating_sub(2);
                self.newline();
            }
            TagEnd::CodeBlock => {
                self.pop_span()?;
                self.indent = self.indent.saturating_sub(4);
            }
            TagEnd::List(_) => {
                if self.lists.pop().is_none() {
                    return Err(RenderError::Unbalanced);
                }
                if self.lists.is_empty() {
                    self.newline();
                }
            }
            TagEnd::Item => self.newline(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_span()?,
            TagEnd::Link | TagEnd::Image => {
                let dest = self.links.pop().ok_or(RenderError::Unbalanced)?;
                if !dest.is_empty() && dest != "#" {
                    self.text(&format!(" ({dest})"))?;
                }
                self.pop_span()?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Write text, inserting the current indentation at line starts and
    /// flushing held-back style escapes before the first visible character.
    fn text(&mut self, text: &str) -> Result<(), RenderError> {
        for ch in text.chars() {
            if ch == '\n' {
                self.newline();
            } else {
                if self.at_line_start {
                    for _ in 0..self.indent {
                        self.out.push(' ');
                    }
                    self.at_line_start = false;
                }
                if !self.pending.is_empty() {
                    self.out.push_str(&self.pending);
                    self.pending.clear();
                }
                self.out.push(ch);
            }
        }
        Ok(())
    }

    fn newline(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.at_line_start = true;
    }

    /// Separate blocks by exactly one blank line.
    fn blank_line(&mut self) {
        if self.out.is_empty() {
            return;
        }
        while !self.out.ends_with("\n\n") {
            self.out.push('\n');
        }
        self.at_line_start = true;
    }

    fn push_span(&mut self, span: Span) -> Result<(), RenderError> {
        self.spans.push(span);
        self.apply(span)
    }

    /// Close the innermost span and re-establish the enclosing ones.
    fn pop_span(&mut self) -> Result<(), RenderError> {
        if self.spans.pop().is_none() {
            return Err(RenderError::Unbalanced);
        }
        write!(
            self.pending,
            "{}{}",
            SetAttribute(Attribute::Reset),
            ResetColor
        )?;
        for span in self.spans.clone() {
            self.apply(span)?;
        }
        Ok(())
    }

    fn apply(&mut self, span: Span) -> Result<(), RenderError> {
        match span {
            Span::Fg(color) => write!(self.pending, "{}", SetForegroundColor(color))?,
            Span::Attr(attr) => write!(self.pending, "{}", SetAttribute(attr))?,
        }
        Ok(())
    }

    fn finish(mut self) -> Result<String, RenderError> {
        if !self.spans.is_empty() {
            return Err(RenderError::Unbalanced);
        }
        // Flush trailing resets so no style leaks past the output.
        self.out.push_str(&self.pending);
        self.newline();
        Ok(self.out)
    }
}

fn heading_indent(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 0,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 4,
        HeadingLevel::H4 | HeadingLevel::H5 | HeadingLevel::H6 => 6,
    }
}
