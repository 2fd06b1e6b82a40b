use crate::span::Span;
use std::fmt;

/// Kinds of configuration errors reported before parsing begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// `max_nesting_depth` of zero
    InvalidNestingDepth,
    /// whitespace `wiki_space_char` would re-introduce spaces into hrefs
    InvalidSpaceChar,
    /// placeholder name violates the name grammar
    InvalidPlaceholderName,
    /// interwiki prefix is not a bare word
    InvalidInterwikiPrefix,
}

/// A caller-contract violation detected at the conversion boundary.
///
/// This is the only failure the crate reports: malformed markup never
/// errors, it degrades to literal text and shows up as a [`Diagnostic`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Human-readable error message
    pub message: String,
    /// Error categorization
    pub kind: ConfigErrorKind,
}

impl ConfigError {
    /// Error for a zero nesting ceiling.
    pub fn nesting_depth() -> Self {
        Self {
            message: "max_nesting_depth must be at least 1".to_string(),
            kind: ConfigErrorKind::InvalidNestingDepth,
        }
    }

    /// Error for a whitespace space-replacement character.
    pub fn space_char(c: char) -> Self {
        Self {
            message: format!("wiki_space_char must not be whitespace: {:?}", c),
            kind: ConfigErrorKind::InvalidSpaceChar,
        }
    }

    /// Error for a malformed placeholder name.
    pub fn placeholder_name(name: &str) -> Self {
        Self {
            message: format!("invalid placeholder name: {:?}", name),
            kind: ConfigErrorKind::InvalidPlaceholderName,
        }
    }

    /// Error for a malformed interwiki prefix.
    pub fn interwiki_prefix(prefix: &str) -> Self {
        Self {
            message: format!("invalid interwiki prefix: {:?}", prefix),
            kind: ConfigErrorKind::InvalidInterwikiPrefix,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Kinds of recorded degradations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Inline span never closed before the block boundary
    UnterminatedSpan,
    /// Preformatted fence never closed before end of document
    UnclosedFence,
    /// List item depth jumped by more than one and was clamped
    DepthClamped,
    /// Link target was not a URL, interwiki reference, or page name
    BadLinkTarget,
    /// Well-formed placeholder with a name the dialect does not list
    UnknownPlaceholder,
    /// Marker ignored because the nesting ceiling was reached
    NestingCeiling,
}

/// A single degradation note.
///
/// The parser guarantees balanced output for any input by turning
/// unmatched or ambiguous markup into literal text; each such decision
/// is recorded here so callers can surface it without the conversion
/// failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable description
    pub message: String,
    /// Source location, when one is known
    pub span: Option<Span>,
    /// Categorization
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Note an inline span that degraded to literal marker text.
    pub fn unterminated(construct: &str, span: Span) -> Self {
        Self {
            message: format!("unterminated {} degraded to literal text", construct),
            span: Some(span),
            kind: DiagnosticKind::UnterminatedSpan,
        }
    }

    /// Note a preformatted fence left open to end of document.
    pub fn unclosed_fence(span: Span) -> Self {
        Self {
            message: "unclosed preformatted fence extends to end of document".to_string(),
            span: Some(span),
            kind: DiagnosticKind::UnclosedFence,
        }
    }

    /// Note a clamped list depth jump.
    pub fn depth_clamped(found: usize, clamped: u8, span: Span) -> Self {
        Self {
            message: format!("list depth {} clamped to {}", found, clamped),
            span: Some(span),
            kind: DiagnosticKind::DepthClamped,
        }
    }

    /// Note a link whose target could not be resolved.
    pub fn bad_link_target(target: &str, span: Span) -> Self {
        Self {
            message: format!("unresolvable link target: {:?}", target),
            span: Some(span),
            kind: DiagnosticKind::BadLinkTarget,
        }
    }

    /// Note a placeholder with an unrecognized name.
    pub fn unknown_placeholder(name: &str, span: Span) -> Self {
        Self {
            message: format!("unknown placeholder: {:?}", name),
            span: Some(span),
            kind: DiagnosticKind::UnknownPlaceholder,
        }
    }

    /// Note a marker ignored at the nesting ceiling.
    pub fn nesting_ceiling(span: Span) -> Self {
        Self {
            message: "nesting ceiling reached; marker kept as literal text".to_string(),
            span: Some(span),
            kind: DiagnosticKind::NestingCeiling,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(span) = self.span {
            write!(f, " at bytes {}..{}", span.start, span.end)?;
        }
        Ok(())
    }
}

/// Degradation notes collected during one parse.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Check if anything was recorded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over the diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
