//! Block splitter: partitions the document into block-level units.
//!
//! Line-oriented scan with one line of lookahead, borrowing directly
//! from the input. When a line could start several block kinds, a
//! fixed priority order decides:
//!
//! preformatted fence > horizontal rule > heading > raw HTML > table
//! row > list item > paragraph
//!
//! The splitter is total: malformed structure (an unclosed fence, a
//! too-deep list jump) degrades deterministically and is recorded as a
//! diagnostic, never an error.

use std::borrow::Cow;

use crate::ast::{
    Block, Document, Heading, List, ListItem, Paragraph, Preformatted, RawHtml, Table, TableCell,
    TableRow,
};
use crate::dialect::Dialect;
use crate::error::{Diagnostic, Diagnostics};
use crate::inline::parse_inlines;
use crate::lexer::{Lexer, Line};
use crate::span::Span;

/// A parsed document together with the degradations recorded while
/// parsing it.
#[derive(Debug)]
pub struct ParseOutcome<'a> {
    /// The document tree (always well-formed).
    pub document: Document<'a>,
    /// Degradation notes; empty for clean markup.
    pub diagnostics: Diagnostics,
}

impl<'a> ParseOutcome<'a> {
    /// Check if parsing finished without any degradations.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Block kinds in dispatch priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Preformatted,
    HorizontalRule,
    Heading,
    RawHtml,
    TableRow,
    ListItem,
    Paragraph,
}

/// An in-progress list item accumulator.
struct PendingItem {
    depth: u8,
    ordered: bool,
    content_start: u32,
    content_end: u32,
    span: Span,
}

/// Creole block parser over one dialect configuration.
///
/// The parser itself never fails; entry points validate the dialect
/// before constructing one.
pub struct Parser<'d> {
    dialect: &'d Dialect,
    diagnostics: Diagnostics,
}

impl<'d> Parser<'d> {
    /// Create a parser for the given dialect.
    #[inline]
    pub fn new(dialect: &'d Dialect) -> Self {
        Self {
            dialect,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Parse the input into a document tree.
    #[inline]
    pub fn parse<'a>(&mut self, input: &'a str) -> Document<'a> {
        self.diagnostics = Diagnostics::new();
        self.parse_internal(input)
    }

    /// Parse and hand back the degradation ledger with the tree.
    #[inline]
    pub fn parse_with_diagnostics<'a>(&mut self, input: &'a str) -> ParseOutcome<'a> {
        self.diagnostics = Diagnostics::new();
        let document = self.parse_internal(input);
        ParseOutcome {
            document,
            diagnostics: std::mem::take(&mut self.diagnostics),
        }
    }

    fn parse_internal<'a>(&mut self, input: &'a str) -> Document<'a> {
        let mut lexer = Lexer::new(input);
        let blocks = self.parse_blocks(&mut lexer, input);
        Document {
            blocks,
            span: Span::new(0, input.len() as u32),
        }
    }

    fn parse_blocks<'a>(&mut self, lexer: &mut Lexer<'a>, input: &'a str) -> Vec<Block<'a>> {
        let mut blocks = Vec::with_capacity(16);

        while !lexer.is_eof() {
            lexer.skip_blank_lines();
            if lexer.is_eof() {
                break;
            }
            if let Some(block) = self.parse_block(lexer, input) {
                blocks.push(block);
            }
        }

        blocks
    }

    fn parse_block<'a>(&mut self, lexer: &mut Lexer<'a>, input: &'a str) -> Option<Block<'a>> {
        let kind = {
            let line = lexer.peek_line()?;
            self.classify(line)
        };

        match kind {
            BlockKind::Preformatted => self.parse_preformatted(lexer, input),
            BlockKind::HorizontalRule => {
                let line = lexer.next_line()?;
                Some(Block::HorizontalRule(line.span))
            }
            BlockKind::Heading => self.parse_heading(lexer),
            BlockKind::RawHtml => self.parse_raw_html(lexer, input),
            BlockKind::TableRow => self.parse_table(lexer),
            BlockKind::ListItem => self.parse_list(lexer, input),
            BlockKind::Paragraph => self.parse_paragraph(lexer, input),
        }
    }

    /// Decide what block kind a line starts. Fixed priority order;
    /// first match wins. Disabled constructs fall through to lower
    /// priorities, never to an error.
    fn classify(&self, line: &Line<'_>) -> BlockKind {
        if is_fence_open(line) {
            return BlockKind::Preformatted;
        }
        let trimmed = line.trimmed();
        if trimmed == "----" {
            return BlockKind::HorizontalRule;
        }
        let bytes = trimmed.as_bytes();
        match bytes.first() {
            Some(b'=') => {
                let run = bytes.iter().take_while(|&&b| b == b'=').count();
                // Seven or more markers never make a heading.
                if run <= 6 {
                    return BlockKind::Heading;
                }
            }
            Some(b'<') if self.dialect.raw_html_passthrough => return BlockKind::RawHtml,
            Some(b'|') if self.dialect.tables => return BlockKind::TableRow,
            Some(b'*') | Some(b'#') => {
                // A list only opens on a single-marker item; a doubled
                // marker at line start is inline markup (`**bold**`).
                if bytes.len() < 2 || bytes[1] != bytes[0] {
                    return BlockKind::ListItem;
                }
            }
            _ => {}
        }
        BlockKind::Paragraph
    }

    fn parse_heading<'a>(&mut self, lexer: &mut Lexer<'a>) -> Option<Block<'a>> {
        let line = lexer.next_line()?;
        let trimmed = line.trimmed_start();
        let level = trimmed.bytes().take_while(|&b| b == b'=').count();
        let rest = &trimmed[level..];

        // Trailing closing markers are decorative: `== Title ==`.
        let content_text = rest.trim().trim_end_matches('=').trim_end();
        let indent = line.text.len() - trimmed.len();
        let lead = rest.len() - rest.trim_start().len();
        let content_off = line.span.start + (indent + level + lead) as u32;

        let content = parse_inlines(content_text, content_off, self.dialect, &mut self.diagnostics);
        Some(Block::Heading(Heading {
            level: level as u8,
            content,
            span: line.span,
        }))
    }

    fn parse_preformatted<'a>(&mut self, lexer: &mut Lexer<'a>, input: &'a str) -> Option<Block<'a>> {
        let open = lexer.next_line()?;
        let content_start = (open.span.end as usize + 1).min(input.len());

        let mut lines: Vec<&'a str> = Vec::new();
        let mut is_escaped = false;
        let mut end_span = open.span;
        let mut content_last_end = content_start;

        loop {
            let line = match lexer.peek_line() {
                Some(line) => *line,
                None => {
                    // No closing fence: the rest of the document is
                    // preformatted.
                    self.diagnostics.push(Diagnostic::unclosed_fence(open.span));
                    break;
                }
            };

            if is_fence_close(&line) {
                end_span = line.span;
                lexer.next_line();
                break;
            }

            if let Some(unescaped) = escaped_fence_line(&line) {
                lines.push(unescaped);
                is_escaped = true;
            } else {
                lines.push(line.text);
            }
            end_span = line.span;
            content_last_end = line.span.end as usize;
            lexer.next_line();
        }

        let text: Cow<'a, str> = if lines.is_empty() {
            Cow::Borrowed("")
        } else if !is_escaped
            && content_last_end < input.len()
            && input.as_bytes()[content_last_end] == b'\n'
        {
            // Contiguous region including each line's newline.
            Cow::Borrowed(&input[content_start..content_last_end + 1])
        } else {
            let mut built = String::with_capacity(content_last_end - content_start + 1);
            for line in &lines {
                built.push_str(line);
                built.push('\n');
            }
            Cow::Owned(built)
        };

        Some(Block::Preformatted(Preformatted {
            text,
            is_escaped,
            span: Span::new(open.span.start, end_span.end),
        }))
    }

    fn parse_raw_html<'a>(&mut self, lexer: &mut Lexer<'a>, input: &'a str) -> Option<Block<'a>> {
        let first = lexer.next_line()?;
        let start = first.span.start;
        let mut end = first.span.end;

        while let Some(line) = lexer.peek_line() {
            if line.is_blank() {
                break;
            }
            end = line.span.end;
            lexer.next_line();
        }

        Some(Block::RawHtml(RawHtml {
            content: Cow::Borrowed(&input[start as usize..end as usize]),
            span: Span::new(start, end),
        }))
    }

    fn parse_table<'a>(&mut self, lexer: &mut Lexer<'a>) -> Option<Block<'a>> {
        let mut rows: Vec<TableRow<'a>> = Vec::with_capacity(8);
        let mut table_span: Option<Span> = None;

        while let Some(line) = lexer.peek_line() {
            let line = *line;
            if line.is_blank() || !line.trimmed_start().starts_with('|') {
                break;
            }
            let row = self.parse_table_row(&line);
            table_span = Some(match table_span {
                Some(span) => span.merge(line.span),
                None => line.span,
            });
            rows.push(row);
            lexer.next_line();
        }

        Some(Block::Table(Table {
            rows,
            span: table_span.unwrap_or_default(),
        }))
    }

    /// Split one row into cells. `~|` never splits, and neither does a
    /// `|` inside a bracketed inline unit, so links, images, no-wiki
    /// spans, and placeholders survive cell splitting intact.
    fn parse_table_row<'a>(&mut self, line: &Line<'a>) -> TableRow<'a> {
        let after_indent = line.trimmed_start();
        let row_off = line.span.start as usize + (line.text.len() - after_indent.len());
        let row: &'a str = after_indent.trim_end();
        let bytes = row.as_bytes();

        let mut boundaries: Vec<(usize, usize)> = Vec::with_capacity(8);
        let mut cell_start = 1; // past the leading '|'
        let mut i = 1;
        while i < bytes.len() {
            match bytes[i] {
                b'~' => i += 2,
                b'{' if bytes[i..].starts_with(b"{{{") => {
                    i = match memchr::memmem::find(&bytes[i + 3..], b"}}}") {
                        Some(off) => {
                            let mut end = i + 3 + off + 3;
                            while end < bytes.len() && bytes[end] == b'}' {
                                end += 1;
                            }
                            end
                        }
                        None => i + 3,
                    };
                }
                b'{' if bytes[i..].starts_with(b"{{") => {
                    i = skip_bracketed(bytes, i, b"}}");
                }
                b'[' if bytes[i..].starts_with(b"[[") => {
                    i = skip_bracketed(bytes, i, b"]]");
                }
                b'<' if bytes[i..].starts_with(b"<<") => {
                    i = skip_bracketed(bytes, i, b">>");
                }
                b'|' => {
                    boundaries.push((cell_start, i));
                    i += 1;
                    cell_start = i;
                }
                _ => i += 1,
            }
        }
        boundaries.push((cell_start, bytes.len()));
        // A trailing `|` leaves one empty final segment; drop it.
        if let Some(&(start, end)) = boundaries.last() {
            if start >= end {
                boundaries.pop();
            }
        }

        let mut cells: Vec<TableCell<'a>> = Vec::with_capacity(boundaries.len());
        for (start, end) in boundaries {
            let raw = &row[start..end];
            let (header, inner, inner_off) = match raw.strip_prefix('=') {
                Some(rest) => (true, rest, start + 1),
                None => (false, raw, start),
            };
            let content_text = inner.trim();
            let lead = inner.len() - inner.trim_start().len();
            let content_off = (row_off + inner_off + lead) as u32;
            let content =
                parse_inlines(content_text, content_off, self.dialect, &mut self.diagnostics);
            cells.push(TableCell {
                header,
                content,
                span: Span::new((row_off + start) as u32, (row_off + end) as u32),
            });
        }

        TableRow {
            cells,
            span: line.span,
        }
    }

    fn parse_list<'a>(&mut self, lexer: &mut Lexer<'a>, input: &'a str) -> Option<Block<'a>> {
        let mut items: Vec<ListItem<'a>> = Vec::with_capacity(8);
        let mut list_span: Option<Span> = None;
        let mut list_marker: u8 = 0;
        let mut prev_depth: u8 = 0;
        let mut pending: Option<PendingItem> = None;

        loop {
            let line = match lexer.peek_line() {
                Some(line) => *line,
                None => break,
            };
            if line.is_blank() {
                break;
            }

            let trimmed = line.trimmed_start();
            let bytes = trimmed.as_bytes();
            let run = bytes
                .iter()
                .take_while(|&&b| b == b'*' || b == b'#')
                .count();

            if run > 0 {
                if list_marker == 0 {
                    list_marker = bytes[0];
                } else if run == 1 && bytes[0] != list_marker {
                    // A top-level marker of the other kind starts an
                    // adjacent list, not a deeper item.
                    break;
                }

                if let Some(item) = pending.take() {
                    items.push(self.finish_item(item, input));
                }

                let ceiling = prev_depth.saturating_add(1);
                let depth = if run > ceiling as usize {
                    self.diagnostics
                        .push(Diagnostic::depth_clamped(run, ceiling, line.span));
                    ceiling
                } else {
                    run as u8
                };
                prev_depth = depth;

                let ordered = bytes[run - 1] == b'#';
                let marker_off = (line.text.len() - trimmed.len()) + run;
                let after = &line.text[marker_off..];
                let lead = after.len() - after.trim_start().len();
                pending = Some(PendingItem {
                    depth,
                    ordered,
                    content_start: line.span.start + (marker_off + lead) as u32,
                    content_end: line.span.end,
                    span: line.span,
                });
            } else {
                // A plain line lazily continues the current item; any
                // higher-priority block construct ends the list.
                if self.classify(&line) != BlockKind::Paragraph {
                    break;
                }
                match pending.as_mut() {
                    Some(item) => {
                        item.content_end = line.span.end;
                        item.span = item.span.merge(line.span);
                    }
                    None => break,
                }
            }

            list_span = Some(match list_span {
                Some(span) => span.merge(line.span),
                None => line.span,
            });
            lexer.next_line();
        }

        if let Some(item) = pending.take() {
            items.push(self.finish_item(item, input));
        }

        Some(Block::List(List {
            items,
            span: list_span.unwrap_or_default(),
        }))
    }

    fn finish_item<'a>(&mut self, item: PendingItem, input: &'a str) -> ListItem<'a> {
        let text = &input[item.content_start as usize..item.content_end as usize];
        let content = parse_inlines(
            text,
            item.content_start,
            self.dialect,
            &mut self.diagnostics,
        );
        ListItem {
            depth: item.depth,
            ordered: item.ordered,
            content,
            span: item.span,
        }
    }

    fn parse_paragraph<'a>(&mut self, lexer: &mut Lexer<'a>, input: &'a str) -> Option<Block<'a>> {
        let mut start_span: Option<Span> = None;
        let mut end_span = Span::default();

        loop {
            let should_break = match lexer.peek_line() {
                Some(line) => {
                    line.is_blank()
                        || (start_span.is_some() && self.classify(line) != BlockKind::Paragraph)
                }
                None => true,
            };
            if should_break {
                break;
            }

            let line = lexer.next_line()?;
            if start_span.is_none() {
                start_span = Some(line.span);
            }
            end_span = line.span;
        }

        let start = start_span?;
        let text = &input[start.start as usize..end_span.end as usize];
        let content = parse_inlines(text, start.start, self.dialect, &mut self.diagnostics);

        Some(Block::Paragraph(Paragraph {
            content,
            span: Span::new(start.start, end_span.end),
        }))
    }
}

/// Skip past a two-character-delimited unit, or just past the opener
/// when it never closes.
#[inline]
fn skip_bracketed(bytes: &[u8], at: usize, closer: &[u8; 2]) -> usize {
    match memchr::memmem::find(&bytes[at + 2..], closer) {
        Some(off) => at + 2 + off + 2,
        None => at + 2,
    }
}

/// An opening fence is `{{{` alone on a line at column 0.
#[inline]
fn is_fence_open(line: &Line<'_>) -> bool {
    line.starts_with("{{{") && line.text.trim_end() == "{{{"
}

/// A closing fence is `}}}` alone on a line at column 0.
#[inline]
fn is_fence_close(line: &Line<'_>) -> bool {
    line.starts_with("}}}") && line.text.trim_end() == "}}}"
}

/// A content line of the form ` }}}`: the single leading space escapes
/// the fence, and is stripped from the preformatted text.
#[inline]
fn escaped_fence_line<'a>(line: &Line<'a>) -> Option<&'a str> {
    let rest = line.strip_prefix(" ")?;
    if rest.trim() == "}}}" {
        Some(rest)
    } else {
        None
    }
}
