//! Line-oriented scanner with SIMD-accelerated newline detection.
//!
//! The block splitter works one line at a time with one line of
//! lookahead; this module provides that cursor. It uses `memchr` for
//! newline scanning (SIMD on supported platforms) and borrows every
//! line directly from the input.

use crate::span::Span;
use memchr::memchr;

/// A single line from the input with its source span.
///
/// The text excludes the trailing `\n` (and a preceding `\r`, so CRLF
/// input behaves like LF input).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// The line text (without line terminator).
    pub text: &'a str,
    /// Byte span in the original input, excluding the terminator.
    pub span: Span,
}

impl<'a> Line<'a> {
    /// Check if this line contains only spaces and tabs.
    #[inline(always)]
    pub fn is_blank(&self) -> bool {
        self.text.bytes().all(|b| b == b' ' || b == b'\t')
    }

    /// Number of leading space/tab bytes.
    #[inline(always)]
    pub fn indent(&self) -> usize {
        self.text
            .bytes()
            .take_while(|&b| b == b' ' || b == b'\t')
            .count()
    }

    /// The line text with surrounding whitespace removed.
    #[inline(always)]
    pub fn trimmed(&self) -> &'a str {
        self.text.trim()
    }

    /// The line text with leading whitespace removed.
    ///
    /// Block-kind dispatch looks at the first marker character, which
    /// may be indented.
    #[inline(always)]
    pub fn trimmed_start(&self) -> &'a str {
        self.text.trim_start()
    }

    /// Check if the raw line starts with the given prefix (column 0,
    /// indentation not skipped).
    #[inline(always)]
    pub fn starts_with(&self, prefix: &str) -> bool {
        self.text.as_bytes().starts_with(prefix.as_bytes())
    }

    /// Strip a prefix from the raw line, returning the remainder.
    #[inline(always)]
    pub fn strip_prefix(&self, prefix: &str) -> Option<&'a str> {
        self.text.strip_prefix(prefix)
    }
}

/// Peek/consume line cursor over the whole document.
pub struct Lexer<'a> {
    /// The complete input text.
    input: &'a str,
    /// Input as bytes for scanning.
    bytes: &'a [u8],
    /// Current byte offset.
    offset: usize,
    /// Peeked line (one-line lookahead).
    peeked: Option<Line<'a>>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer over the given input.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            offset: 0,
            peeked: None,
        }
    }

    /// Current byte offset into the input.
    #[inline(always)]
    pub fn offset(&self) -> u32 {
        self.offset as u32
    }

    /// Check if all input has been consumed.
    #[inline(always)]
    pub fn is_eof(&self) -> bool {
        self.peeked.is_none() && self.offset >= self.bytes.len()
    }

    /// Peek at the next line without consuming it.
    #[inline]
    pub fn peek_line(&mut self) -> Option<&Line<'a>> {
        if self.peeked.is_none() {
            self.peeked = self.read_line();
        }
        self.peeked.as_ref()
    }

    /// Consume and return the next line.
    #[inline]
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        if let Some(line) = self.peeked.take() {
            return Some(line);
        }
        self.read_line()
    }

    /// Skip a run of blank lines, returning how many were skipped.
    ///
    /// Consecutive blank lines collapse into a single block separator,
    /// so callers never need to count them.
    #[inline]
    pub fn skip_blank_lines(&mut self) -> usize {
        let mut count = 0;
        while let Some(line) = self.peek_line() {
            if !line.is_blank() {
                break;
            }
            self.next_line();
            count += 1;
        }
        count
    }

    #[inline(always)]
    fn read_line(&mut self) -> Option<Line<'a>> {
        if self.offset >= self.bytes.len() {
            return None;
        }

        let start = self.offset;

        let end = match memchr(b'\n', &self.bytes[start..]) {
            Some(pos) => start + pos,
            None => self.bytes.len(),
        };

        // CRLF: exclude the CR from the line text.
        let text_end = if end > start && self.bytes[end - 1] == b'\r' {
            end - 1
        } else {
            end
        };

        // Advance past the newline itself.
        self.offset = if end < self.bytes.len() { end + 1 } else { end };

        Some(Line {
            // SAFETY: Input is valid UTF-8 (guaranteed by &str). `start` is a
            // previous offset (always a boundary) and `text_end` sits either at
            // a single-byte ASCII newline/CR or at the end of input, both of
            // which are valid UTF-8 char boundaries.
            text: unsafe { self.input.get_unchecked(start..text_end) },
            span: Span::new(start as u32, text_end as u32),
        })
    }

    /// Get a slice of the input by span.
    ///
    /// The span must have been produced by this lexer (or be otherwise
    /// known to lie on char boundaries within the input).
    #[inline(always)]
    pub fn slice(&self, span: Span) -> &'a str {
        // SAFETY: spans handed out by this lexer start and end at line
        // boundaries, which are always UTF-8 char boundaries.
        unsafe {
            self.input
                .get_unchecked(span.start as usize..span.end as usize)
        }
    }

    /// The remaining unconsumed input.
    #[inline(always)]
    pub fn remaining(&self) -> &'a str {
        // SAFETY: `self.offset` is 0 or a position just past a newline,
        // both valid boundaries.
        unsafe { self.input.get_unchecked(self.offset..) }
    }
}
