//! Document tree types for parsed Creole markup.
//!
//! The tree is the intermediate representation between the parser and
//! the renderer. It is designed to be:
//!
//! - **Zero-copy**: text payloads are `Cow<'a, str>` borrowing from the
//!   input wherever the source bytes can be reused verbatim
//! - **Span-tracked**: every node records its source location
//! - **Always well-formed**: unterminated or ambiguous markup degrades
//!   to literal [`Text`] during parsing, so no node ever represents a
//!   dangling open marker
//!
//! The tree is built once per conversion, is immutable afterwards, and
//! borrows nothing from the input beyond the text spans it carries.

use crate::span::Span;

/// Borrowed or owned string type for zero-copy parsing.
pub type CowStr<'a> = std::borrow::Cow<'a, str>;

/// A parsed Creole document: an ordered sequence of blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Document<'a> {
    /// Content blocks in source order.
    pub blocks: Vec<Block<'a>>,
    /// Span covering the entire input.
    pub span: Span,
}

/// Block-level nodes, decided by start-of-line context.
#[derive(Debug, Clone, PartialEq)]
pub enum Block<'a> {
    /// Section heading (`=` to `======`).
    Heading(Heading<'a>),
    /// Text paragraph with inline formatting.
    Paragraph(Paragraph<'a>),
    /// Bullet (`*`) or numbered (`#`) list.
    List(List<'a>),
    /// Table built from `|`-delimited rows.
    Table(Table<'a>),
    /// Fenced preformatted region (`{{{` ... `}}}`).
    Preformatted(Preformatted<'a>),
    /// Horizontal rule (`----`).
    HorizontalRule(Span),
    /// Verbatim HTML lines (only when passthrough is enabled).
    RawHtml(RawHtml<'a>),
}

/// Section heading with level and inline content.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading<'a> {
    /// Heading level (1-6). Seven or more markers never produce a
    /// heading; the parser degrades such lines to paragraphs.
    pub level: u8,
    /// Inline content, trailing `=` markers already stripped.
    pub content: Vec<Inline<'a>>,
    /// Source span.
    pub span: Span,
}

/// Text paragraph containing inline elements.
///
/// Paragraph text may span multiple source lines; the embedded
/// newlines survive as part of the inline text nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph<'a> {
    /// Inline content with formatting.
    pub content: Vec<Inline<'a>>,
    /// Source span.
    pub span: Span,
}

/// A list block.
///
/// Items are kept flat, each carrying its own depth; the renderer
/// reconstructs the nesting. Depth can only grow by one step between
/// consecutive items (the parser clamps deeper jumps).
#[derive(Debug, Clone, PartialEq)]
pub struct List<'a> {
    /// Items in source order.
    pub items: Vec<ListItem<'a>>,
    /// Source span.
    pub span: Span,
}

/// A single list item.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem<'a> {
    /// Nesting depth, counted from 1 at the outermost level.
    pub depth: u8,
    /// Whether this item belongs to a numbered list (`#` marker).
    pub ordered: bool,
    /// Inline content, including any lazy continuation lines.
    pub content: Vec<Inline<'a>>,
    /// Source span.
    pub span: Span,
}

/// A table block. Rows may be ragged; no cell padding is implied.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    /// All table rows.
    pub rows: Vec<TableRow<'a>>,
    /// Source span.
    pub span: Span,
}

/// A single table row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow<'a> {
    /// Cells in this row.
    pub cells: Vec<TableCell<'a>>,
    /// Source span.
    pub span: Span,
}

/// A single table cell.
#[derive(Debug, Clone, PartialEq)]
pub struct TableCell<'a> {
    /// Whether this is a header cell (`|=` marker).
    pub header: bool,
    /// Cell content (inline elements, whitespace-trimmed).
    pub content: Vec<Inline<'a>>,
    /// Source span.
    pub span: Span,
}

/// A fenced preformatted block.
#[derive(Debug, Clone, PartialEq)]
pub struct Preformatted<'a> {
    /// Raw content, one trailing newline per source line. Never
    /// re-scanned for markup; tilde escapes inside are preserved.
    pub text: CowStr<'a>,
    /// True when at least one interior ` }}}` line had its escape
    /// space stripped, which forces an owned copy of the content.
    pub is_escaped: bool,
    /// Source span.
    pub span: Span,
}

/// Raw HTML block content, emitted verbatim by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHtml<'a> {
    /// The HTML lines as written.
    pub content: CowStr<'a>,
    /// Source span.
    pub span: Span,
}

/// Inline-level nodes (within paragraphs, headings, list items, cells).
#[derive(Debug, Clone, PartialEq)]
pub enum Inline<'a> {
    /// Plain text.
    Text(Text<'a>),
    /// A styled span: strong, emphasis, or one of the additions.
    Styled(Styled<'a>),
    /// Forced line break (`\\`).
    LineBreak(Span),
    /// Hyperlink (`[[target|label]]` or a bare URL).
    Link(Link<'a>),
    /// Image (`{{src|alt}}`).
    Image(Image<'a>),
    /// Recognized placeholder (`<<name args>>`).
    Placeholder(Placeholder<'a>),
    /// Inline no-wiki span (`{{{...}}}`): rendered verbatim-escaped,
    /// never re-scanned for markup.
    RawEscape(RawEscape<'a>),
}

/// The kind of a styled inline span.
///
/// `Strong` and `Emphasis` are core Creole; the remaining kinds are
/// the dialect's additions set and only parse when
/// [`Dialect::additions`](crate::dialect::Dialect) is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleKind {
    /// `**bold**`
    Strong,
    /// `//italic//`
    Emphasis,
    /// `^^superscript^^`
    Superscript,
    /// `,,subscript,,`
    Subscript,
    /// `__underline__`
    Underline,
    /// `##monospace##`
    Monospace,
}

impl StyleKind {
    /// The two-character toggle marker for this kind.
    pub const fn marker(self) -> &'static str {
        match self {
            StyleKind::Strong => "**",
            StyleKind::Emphasis => "//",
            StyleKind::Superscript => "^^",
            StyleKind::Subscript => ",,",
            StyleKind::Underline => "__",
            StyleKind::Monospace => "##",
        }
    }

    /// Whether this kind belongs to the additions set.
    pub const fn is_addition(self) -> bool {
        !matches!(self, StyleKind::Strong | StyleKind::Emphasis)
    }
}

/// Plain text content.
#[derive(Debug, Clone, PartialEq)]
pub struct Text<'a> {
    /// The text content, exactly as written (escaping happens at
    /// render time only).
    pub content: CowStr<'a>,
    /// Source span.
    pub span: Span,
}

/// A styled (toggle-delimited) span with nested inline content.
#[derive(Debug, Clone, PartialEq)]
pub struct Styled<'a> {
    /// Which marker pair delimited the span.
    pub kind: StyleKind,
    /// Nested inline content.
    pub content: Vec<Inline<'a>>,
    /// Source span including both markers.
    pub span: Span,
}

/// Where a link points, resolved against the dialect at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget<'a> {
    /// A scheme URL (`http://`, `https://`, `mailto:`), used verbatim.
    Url(CowStr<'a>),
    /// A wiki page name, joined to the dialect's base URL with spaces
    /// replaced by the configured character.
    Wiki {
        /// The page name as written.
        page: CowStr<'a>,
        /// The resolved href.
        href: String,
    },
    /// An interwiki reference (`prefix:Page`) with a known prefix.
    Interwiki {
        /// The interwiki prefix.
        prefix: CowStr<'a>,
        /// The page name after the prefix.
        page: CowStr<'a>,
        /// The resolved href.
        href: String,
    },
}

impl<'a> LinkTarget<'a> {
    /// The href this target resolves to.
    pub fn href(&self) -> &str {
        match self {
            LinkTarget::Url(url) => url,
            LinkTarget::Wiki { href, .. } => href,
            LinkTarget::Interwiki { href, .. } => href,
        }
    }
}

/// Hyperlink with resolved target and optional label.
#[derive(Debug, Clone, PartialEq)]
pub struct Link<'a> {
    /// Where the link points.
    pub target: LinkTarget<'a>,
    /// The target text as written (used as the display text when no
    /// label is given).
    pub text: CowStr<'a>,
    /// Optional label content; `None` renders the target text itself.
    pub label: Option<Vec<Inline<'a>>>,
    /// Source span.
    pub span: Span,
}

/// Inline image.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<'a> {
    /// Image source URL or path.
    pub src: CowStr<'a>,
    /// Alt text; defaults to the source when not given.
    pub alt: CowStr<'a>,
    /// Source span.
    pub span: Span,
}

/// A recognized placeholder occurrence.
///
/// Only names listed in the dialect's `placeholder_names` produce this
/// node; anything else stays literal text.
#[derive(Debug, Clone, PartialEq)]
pub struct Placeholder<'a> {
    /// The placeholder name.
    pub name: CowStr<'a>,
    /// The argument string after the name, whitespace-trimmed.
    pub args: CowStr<'a>,
    /// Source span.
    pub span: Span,
}

/// Inline no-wiki content.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEscape<'a> {
    /// Verbatim content between the braces, escapes preserved.
    pub text: CowStr<'a>,
    /// Source span.
    pub span: Span,
}
