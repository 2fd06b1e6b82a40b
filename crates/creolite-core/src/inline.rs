//! Inline engine: resolves one block's text span into inline nodes.
//!
//! Single left-to-right scan, SIMD-accelerated via `memchr`, borrowing
//! directly from the input. Toggled constructs (strong, emphasis, the
//! additions set) are tracked on an explicit stack of open frames so
//! the nesting ceiling can be enforced and unterminated spans can
//! degrade to literal text at the block boundary. Bracketed constructs
//! (`{{{ }}}`, `{{ }}`, `[[ ]]`, `<< >>`) are scanned as one unit and
//! degrade to literal text when the closer is missing.
//!
//! Marker priority at any position, first match wins:
//! escape > inline no-wiki > image > link > placeholder > line break >
//! bare URL > strong > emphasis > additions > literal character.

use std::borrow::Cow;

use memchr::{memchr3, memmem};

use crate::ast::{
    Image, Inline, Link, LinkTarget, Placeholder, RawEscape, StyleKind, Styled, Text,
};
use crate::dialect::{is_placeholder_name, Dialect};
use crate::error::{Diagnostic, Diagnostics};
use crate::span::Span;

/// Parse inline elements from one block's text span.
///
/// Total over any input: malformed markup becomes literal text and is
/// noted in `diagnostics`, never an error.
#[inline]
pub fn parse_inlines<'a>(
    text: &'a str,
    base_offset: u32,
    dialect: &Dialect,
    diagnostics: &mut Diagnostics,
) -> Vec<Inline<'a>> {
    if text.is_empty() {
        return Vec::new();
    }
    InlineParser {
        text,
        bytes: text.as_bytes(),
        pos: 0,
        base: base_offset,
        dialect,
        diagnostics,
        depth: 0,
        allow_links: true,
        stack: Vec::new(),
        root: Vec::with_capacity(8),
        text_start: 0,
    }
    .parse()
}

/// An open toggled span awaiting its closing marker.
struct Frame<'a> {
    kind: StyleKind,
    /// Byte position of the opening marker.
    start: usize,
    children: Vec<Inline<'a>>,
}

struct InlineParser<'a, 'd, 'e> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    base: u32,
    dialect: &'d Dialect,
    diagnostics: &'e mut Diagnostics,
    /// Bracket recursion depth (link labels), counted against the
    /// nesting ceiling together with the toggle stack.
    depth: usize,
    /// False inside link labels: no nested links or bare URLs.
    allow_links: bool,
    stack: Vec<Frame<'a>>,
    root: Vec<Inline<'a>>,
    text_start: usize,
}

impl<'a, 'd, 'e> InlineParser<'a, 'd, 'e> {
    fn parse(mut self) -> Vec<Inline<'a>> {
        while self.pos < self.bytes.len() {
            let next_special = self.find_next_special();
            if next_special >= self.bytes.len() {
                break;
            }
            self.pos = next_special;

            let handled = match self.bytes[self.pos] {
                b'~' => self.try_escape(),
                b'{' => self.try_brace(),
                b'[' => self.try_link(),
                b'<' => self.try_placeholder(),
                b'\\' => self.try_line_break(),
                b'h' => self.try_bare_url(),
                b'*' => self.try_toggle(StyleKind::Strong),
                b'/' => self.try_toggle(StyleKind::Emphasis),
                b'^' => self.try_toggle(StyleKind::Superscript),
                b',' => self.try_toggle(StyleKind::Subscript),
                b'_' => self.try_toggle(StyleKind::Underline),
                b'#' => self.try_toggle(StyleKind::Monospace),
                _ => false,
            };

            if !handled {
                self.pos += 1;
            }
        }

        self.pos = self.bytes.len();
        self.flush_text();

        // Unterminated frames never leak: their markers become literal
        // text at the block boundary.
        while let Some(frame) = self.stack.pop() {
            self.degrade_frame(frame);
        }

        self.root
    }

    #[inline(always)]
    fn find_next_special(&self) -> usize {
        let remaining = &self.bytes[self.pos..];
        let mut best = remaining.len();
        // memchr3 is SIMD-accelerated, so four calls still beat a
        // byte-by-byte loop on typical prose.
        if let Some(i) = memchr3(b'*', b'/', b'[', remaining) {
            best = best.min(i);
        }
        if let Some(i) = memchr3(b'{', b'\\', b'~', remaining) {
            best = best.min(i);
        }
        if let Some(i) = memchr3(b'<', b'h', b'_', remaining) {
            best = best.min(i);
        }
        if let Some(i) = memchr3(b'^', b',', b'#', remaining) {
            best = best.min(i);
        }
        self.pos + best
    }

    #[inline(always)]
    fn span_at(&self, pos: usize, len: usize) -> Span {
        Span::new(self.base + pos as u32, self.base + (pos + len) as u32)
    }

    /// The vec receiving the next node: the innermost open frame, or
    /// the root sequence.
    #[inline(always)]
    fn sink(&mut self) -> &mut Vec<Inline<'a>> {
        match self.stack.last_mut() {
            Some(frame) => &mut frame.children,
            None => &mut self.root,
        }
    }

    #[inline(always)]
    fn make_text(&self, start: usize, end: usize) -> Inline<'a> {
        Inline::Text(Text {
            content: Cow::Borrowed(&self.text[start..end]),
            span: self.span_at(start, end - start),
        })
    }

    #[inline(always)]
    fn flush_text(&mut self) {
        if self.text_start < self.pos {
            let node = self.make_text(self.text_start, self.pos);
            self.sink().push(node);
        }
        self.text_start = self.pos;
    }

    /// Turn an unterminated frame into its literal opening marker
    /// followed by whatever was parsed after it.
    fn degrade_frame(&mut self, frame: Frame<'a>) {
        let span = self.span_at(frame.start, 2);
        self.diagnostics
            .push(Diagnostic::unterminated(style_name(frame.kind), span));
        let marker = Inline::Text(Text {
            content: Cow::Borrowed(frame.kind.marker()),
            span,
        });
        let sink = self.sink();
        sink.push(marker);
        sink.extend(frame.children);
    }

    fn try_toggle(&mut self, kind: StyleKind) -> bool {
        let marker = kind.marker().as_bytes();
        if self.pos + 1 >= self.bytes.len() || self.bytes[self.pos + 1] != marker[1] {
            return false;
        }
        if kind.is_addition() && !self.dialect.additions {
            return false;
        }
        // `//` right after `:` is a URL scheme remnant, not emphasis.
        if kind == StyleKind::Emphasis && self.pos > 0 && self.bytes[self.pos - 1] == b':' {
            return false;
        }

        if let Some(idx) = self.stack.iter().rposition(|f| f.kind == kind) {
            self.flush_text();
            // Frames opened above the one being closed never found
            // their own closer; degrade them in place.
            while self.stack.len() > idx + 1 {
                if let Some(frame) = self.stack.pop() {
                    self.degrade_frame(frame);
                }
            }
            let Some(frame) = self.stack.pop() else {
                return false;
            };
            let node = Inline::Styled(Styled {
                kind,
                content: frame.children,
                span: Span::new(
                    self.base + frame.start as u32,
                    self.base + (self.pos + 2) as u32,
                ),
            });
            self.pos += 2;
            self.text_start = self.pos;
            self.sink().push(node);
        } else {
            if self.stack.len() + self.depth >= self.dialect.max_nesting_depth {
                let span = self.span_at(self.pos, 2);
                self.diagnostics.push(Diagnostic::nesting_ceiling(span));
                return false;
            }
            self.flush_text();
            self.stack.push(Frame {
                kind,
                start: self.pos,
                children: Vec::new(),
            });
            self.pos += 2;
            self.text_start = self.pos;
        }
        true
    }

    fn try_escape(&mut self) -> bool {
        let next = self.pos + 1;
        if next >= self.bytes.len() {
            return false;
        }
        // A tilde before whitespace stays a literal tilde.
        if matches!(self.bytes[next], b' ' | b'\t' | b'\n' | b'\r') {
            return false;
        }
        self.flush_text();
        let len = self.escaped_len(next);
        let end = next + len;
        let node = Inline::Text(Text {
            content: Cow::Borrowed(&self.text[next..end]),
            span: Span::new(self.base + self.pos as u32, self.base + end as u32),
        });
        self.sink().push(node);
        self.pos = end;
        self.text_start = end;
        true
    }

    /// How much input the escape consumes: one construct — a marker, a
    /// bare URL, or a single character.
    fn escaped_len(&self, at: usize) -> usize {
        let rest = &self.bytes[at..];
        if rest.starts_with(b"{{{") {
            return 3;
        }
        const MARKERS: [&[u8]; 13] = [
            b"**", b"//", b"\\\\", b"{{", b"[[", b"<<", b"^^", b",,", b"__", b"##", b"}}", b"]]",
            b">>",
        ];
        for marker in MARKERS {
            if rest.starts_with(marker) {
                return 2;
            }
        }
        if let Some(len) = self.url_len_at(at) {
            return len;
        }
        match self.text[at..].chars().next() {
            Some(c) => c.len_utf8(),
            None => 1,
        }
    }

    /// Length of a bare URL starting at `at`, if one starts there.
    fn url_len_at(&self, at: usize) -> Option<usize> {
        let rest = &self.bytes[at..];
        let scheme_len = if rest.starts_with(b"http://") {
            7
        } else if rest.starts_with(b"https://") {
            8
        } else {
            return None;
        };
        let mut end = at + scheme_len;
        while end < self.bytes.len() && !self.bytes[end].is_ascii_whitespace() {
            end += 1;
        }
        if end == at + scheme_len {
            return None;
        }
        // One trailing punctuation character, or a trailing style
        // marker, belongs to the prose rather than the URL.
        let run = &self.bytes[at..end];
        let mut len = run.len();
        if run.ends_with(b"**") || run.ends_with(b"//") {
            len -= 2;
        } else if matches!(
            run[len - 1],
            b',' | b'.' | b'?' | b'!' | b':' | b';' | b'"' | b'\''
        ) {
            len -= 1;
        }
        if len <= scheme_len {
            return None;
        }
        Some(len)
    }

    fn try_bare_url(&mut self) -> bool {
        if !self.allow_links {
            return false;
        }
        if self.pos > 0 && self.bytes[self.pos - 1].is_ascii_alphanumeric() {
            return false;
        }
        let Some(len) = self.url_len_at(self.pos) else {
            return false;
        };
        self.flush_text();
        let url = &self.text[self.pos..self.pos + len];
        let span = self.span_at(self.pos, len);
        let node = Inline::Link(Link {
            target: LinkTarget::Url(Cow::Borrowed(url)),
            text: Cow::Borrowed(url),
            label: None,
            span,
        });
        self.sink().push(node);
        self.pos += len;
        self.text_start = self.pos;
        true
    }

    fn try_brace(&mut self) -> bool {
        if self.bytes[self.pos..].starts_with(b"{{{") {
            self.try_raw_escape()
        } else if self.bytes[self.pos..].starts_with(b"{{") {
            self.try_image()
        } else {
            false
        }
    }

    fn try_raw_escape(&mut self) -> bool {
        let content_start = self.pos + 3;
        let Some(off) = memmem::find(&self.bytes[content_start..], b"}}}") else {
            return false;
        };
        // In a run of closing braces the last three close the span, so
        // the content may itself end in braces.
        let mut run_end = content_start + off + 3;
        while run_end < self.bytes.len() && self.bytes[run_end] == b'}' {
            run_end += 1;
        }
        let content_end = run_end - 3;
        self.flush_text();
        let node = Inline::RawEscape(RawEscape {
            text: Cow::Borrowed(&self.text[content_start..content_end]),
            span: Span::new(self.base + self.pos as u32, self.base + run_end as u32),
        });
        self.sink().push(node);
        self.pos = run_end;
        self.text_start = self.pos;
        true
    }

    fn try_image(&mut self) -> bool {
        let content_start = self.pos + 2;
        let Some(off) = memmem::find(&self.bytes[content_start..], b"}}") else {
            return false;
        };
        let close = content_start + off;
        let body: &'a str = &self.text[content_start..close];
        let (src_part, alt_part) = match body.find('|') {
            Some(p) => (&body[..p], Some(&body[p + 1..])),
            None => (body, None),
        };
        let src = src_part.trim();
        let unit_len = close + 2 - self.pos;
        // The source must be a single token.
        if src.is_empty() || src.contains(char::is_whitespace) {
            let span = self.span_at(self.pos, unit_len);
            self.diagnostics
                .push(Diagnostic::bad_link_target(body.trim(), span));
            return false;
        }
        let alt = match alt_part {
            Some(a) => a.trim(),
            None => src,
        };
        self.flush_text();
        let node = Inline::Image(Image {
            src: Cow::Borrowed(src),
            alt: Cow::Borrowed(alt),
            span: self.span_at(self.pos, unit_len),
        });
        self.sink().push(node);
        self.pos = close + 2;
        self.text_start = self.pos;
        true
    }

    fn try_link(&mut self) -> bool {
        if !self.allow_links || !self.bytes[self.pos..].starts_with(b"[[") {
            return false;
        }
        let content_start = self.pos + 2;
        let Some(off) = memmem::find(&self.bytes[content_start..], b"]]") else {
            return false;
        };
        let close = content_start + off;
        let body: &'a str = &self.text[content_start..close];
        let (target_part, label_part) = match body.find('|') {
            Some(p) => (&body[..p], Some(&body[p + 1..])),
            None => (body, None),
        };
        let target_text = target_part.trim();
        let span = self.span_at(self.pos, close + 2 - self.pos);
        let Some(target) = self.resolve_target(target_text) else {
            self.diagnostics
                .push(Diagnostic::bad_link_target(target_text, span));
            return false;
        };
        let label = match label_part {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    let lead = raw.len() - raw.trim_start().len();
                    let label_off = content_start + target_part.len() + 1 + lead;
                    Some(self.parse_nested(trimmed, label_off))
                }
            }
            None => None,
        };
        self.flush_text();
        let node = Inline::Link(Link {
            target,
            text: Cow::Borrowed(target_text),
            label,
            span,
        });
        self.sink().push(node);
        self.pos = close + 2;
        self.text_start = self.pos;
        true
    }

    /// Parse a link label with its own engine instance: labels allow
    /// styled spans and images but never nested links.
    fn parse_nested(&mut self, text: &'a str, at: usize) -> Vec<Inline<'a>> {
        if self.depth + self.stack.len() + 1 >= self.dialect.max_nesting_depth {
            let span = self.span_at(at, text.len());
            self.diagnostics.push(Diagnostic::nesting_ceiling(span));
            return vec![Inline::Text(Text {
                content: Cow::Borrowed(text),
                span,
            })];
        }
        InlineParser {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            base: self.base + at as u32,
            dialect: self.dialect,
            diagnostics: &mut *self.diagnostics,
            depth: self.depth + self.stack.len() + 1,
            allow_links: false,
            stack: Vec::new(),
            root: Vec::with_capacity(4),
            text_start: 0,
        }
        .parse()
    }

    fn resolve_target(&self, target: &'a str) -> Option<LinkTarget<'a>> {
        if target.is_empty() {
            return None;
        }
        if target.contains("://") || target.starts_with("mailto:") {
            return Some(LinkTarget::Url(Cow::Borrowed(target)));
        }
        let space = self.dialect.wiki_space_char;
        if let Some((prefix, page)) = target.split_once(':') {
            if let Some(base) = self.dialect.interwiki.get(prefix) {
                let page = page.trim();
                if !valid_page_name(page) {
                    return None;
                }
                let mut href = base.clone();
                href.push_str(&page.replace(' ', space.encode_utf8(&mut [0u8; 4])));
                return Some(LinkTarget::Interwiki {
                    prefix: Cow::Borrowed(prefix),
                    page: Cow::Borrowed(page),
                    href,
                });
            }
        }
        if !valid_page_name(target) {
            return None;
        }
        let mut href = self.dialect.wiki_base_url.clone();
        href.push_str(&target.replace(' ', space.encode_utf8(&mut [0u8; 4])));
        Some(LinkTarget::Wiki {
            page: Cow::Borrowed(target),
            href,
        })
    }

    fn try_placeholder(&mut self) -> bool {
        if !self.bytes[self.pos..].starts_with(b"<<") {
            return false;
        }
        let content_start = self.pos + 2;
        let Some(off) = memmem::find(&self.bytes[content_start..], b">>") else {
            return false;
        };
        let close = content_start + off;
        let body: &'a str = &self.text[content_start..close];
        let name = match body.find(char::is_whitespace) {
            Some(p) => &body[..p],
            None => body,
        };
        if !is_placeholder_name(name) {
            return false;
        }
        let span = self.span_at(self.pos, close + 2 - self.pos);
        if !self.dialect.placeholder_names.contains(name) {
            self.diagnostics
                .push(Diagnostic::unknown_placeholder(name, span));
            return false;
        }
        let args = body[name.len()..].trim();
        self.flush_text();
        let node = Inline::Placeholder(Placeholder {
            name: Cow::Borrowed(name),
            args: Cow::Borrowed(args),
            span,
        });
        self.sink().push(node);
        self.pos = close + 2;
        self.text_start = self.pos;
        true
    }

    fn try_line_break(&mut self) -> bool {
        if self.pos + 1 >= self.bytes.len() || self.bytes[self.pos + 1] != b'\\' {
            return false;
        }
        self.flush_text();
        let span = self.span_at(self.pos, 2);
        self.sink().push(Inline::LineBreak(span));
        self.pos += 2;
        self.text_start = self.pos;
        true
    }
}

/// A wiki page name: non-whitespace words separated by single spaces.
fn valid_page_name(name: &str) -> bool {
    if name.is_empty() || name.contains("  ") {
        return false;
    }
    !name.chars().any(|c| c.is_whitespace() && c != ' ')
}

fn style_name(kind: StyleKind) -> &'static str {
    match kind {
        StyleKind::Strong => "strong markup",
        StyleKind::Emphasis => "emphasis markup",
        StyleKind::Superscript => "superscript markup",
        StyleKind::Subscript => "subscript markup",
        StyleKind::Underline => "underline markup",
        StyleKind::Monospace => "monospace markup",
    }
}
