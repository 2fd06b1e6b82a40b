//! HTML renderer.
//!
//! Walks the document tree and emits HTML through a dispatch table
//! mapping each node kind to a tag rule. The table is overridable per
//! call, so callers can change tag names and fixed attributes without
//! touching the parser. Text is entity-escaped exactly once, here and
//! nowhere earlier, so tree inspection always sees the original text.
//!
//! Tags close in the exact reverse order of opening (an explicit
//! open-tag stack), which keeps the output balanced for any
//! well-formed tree — and the parser only produces well-formed trees.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::ast::{Block, Document, Inline, List, StyleKind, Table};
use crate::dialect::Dialect;

/// Identifies a node kind for dispatch-table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Paragraph,
    /// Heading at a specific level (1-6).
    Heading(u8),
    HorizontalRule,
    Preformatted,
    UnorderedList,
    OrderedList,
    ListItem,
    Table,
    TableRow,
    TableHeaderCell,
    TableCell,
    /// A styled inline span of the given kind.
    Styled(StyleKind),
    LineBreak,
    Link,
    Image,
    Placeholder,
    RawEscape,
    RawHtml,
}

/// How one node kind becomes HTML: a tag name, fixed attributes, and
/// whether the tag is self-closing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpec {
    /// Tag name, e.g. `strong`.
    pub name: Cow<'static, str>,
    /// Fixed attributes emitted on every opening tag of this kind.
    pub attrs: Vec<(Cow<'static, str>, Cow<'static, str>)>,
    /// Emit in XHTML self-closing form (`<br />`).
    pub self_closing: bool,
}

impl TagSpec {
    /// A plain open/close tag pair.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            self_closing: false,
        }
    }

    /// A self-closing tag.
    pub fn void(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            self_closing: true,
        }
    }

    /// Add a fixed attribute.
    pub fn with_attr(
        mut self,
        name: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }
}

/// Node-kind to tag-rule mapping, overridable per call.
///
/// # Example
///
/// ```rust
/// use creolite_core::{convert_with, Dialect, DispatchTable, NodeKind, StyleKind, TagSpec};
///
/// let dialect = Dialect::new();
/// let table = DispatchTable::for_dialect(&dialect)
///     .with_tag(NodeKind::Styled(StyleKind::Strong), TagSpec::new("b"));
/// let html = convert_with("**hi**", &dialect, &table).unwrap();
/// assert_eq!(html, "<p><b>hi</b></p>\n");
/// ```
#[derive(Debug, Clone)]
pub struct DispatchTable {
    specs: HashMap<NodeKind, TagSpec>,
    fallback: TagSpec,
}

impl DispatchTable {
    /// The standard Creole-to-HTML mapping.
    pub fn standard() -> Self {
        let mut specs = HashMap::with_capacity(24);
        specs.insert(NodeKind::Paragraph, TagSpec::new("p"));
        for level in 1..=6u8 {
            specs.insert(NodeKind::Heading(level), TagSpec::new(format!("h{}", level)));
        }
        specs.insert(NodeKind::HorizontalRule, TagSpec::void("hr"));
        specs.insert(NodeKind::Preformatted, TagSpec::new("pre"));
        specs.insert(NodeKind::UnorderedList, TagSpec::new("ul"));
        specs.insert(NodeKind::OrderedList, TagSpec::new("ol"));
        specs.insert(NodeKind::ListItem, TagSpec::new("li"));
        specs.insert(NodeKind::Table, TagSpec::new("table"));
        specs.insert(NodeKind::TableRow, TagSpec::new("tr"));
        specs.insert(NodeKind::TableHeaderCell, TagSpec::new("th"));
        specs.insert(NodeKind::TableCell, TagSpec::new("td"));
        specs.insert(NodeKind::Styled(StyleKind::Strong), TagSpec::new("strong"));
        specs.insert(NodeKind::Styled(StyleKind::Emphasis), TagSpec::new("em"));
        specs.insert(NodeKind::Styled(StyleKind::Superscript), TagSpec::new("sup"));
        specs.insert(NodeKind::Styled(StyleKind::Subscript), TagSpec::new("sub"));
        specs.insert(NodeKind::Styled(StyleKind::Underline), TagSpec::new("u"));
        specs.insert(NodeKind::Styled(StyleKind::Monospace), TagSpec::new("tt"));
        specs.insert(NodeKind::LineBreak, TagSpec::void("br"));
        specs.insert(NodeKind::Link, TagSpec::new("a"));
        specs.insert(NodeKind::Image, TagSpec::void("img"));
        specs.insert(NodeKind::Placeholder, TagSpec::new("span"));
        specs.insert(NodeKind::RawEscape, TagSpec::new("tt"));
        Self {
            specs,
            fallback: TagSpec::new("span"),
        }
    }

    /// The standard mapping adjusted for a dialect: inline no-wiki
    /// renders as `<span>` when `no_wiki_monospace` is off.
    pub fn for_dialect(dialect: &Dialect) -> Self {
        let mut table = Self::standard();
        if !dialect.no_wiki_monospace {
            table.set(NodeKind::RawEscape, TagSpec::new("span"));
        }
        table
    }

    /// Replace the rule for one node kind.
    pub fn set(&mut self, kind: NodeKind, spec: TagSpec) {
        self.specs.insert(kind, spec);
    }

    /// Builder form of [`set`](Self::set).
    pub fn with_tag(mut self, kind: NodeKind, spec: TagSpec) -> Self {
        self.set(kind, spec);
        self
    }

    #[inline]
    fn spec(&self, kind: NodeKind) -> &TagSpec {
        self.specs.get(&kind).unwrap_or(&self.fallback)
    }
}

impl Default for DispatchTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Render a document tree to an HTML string. Total: never fails for
/// any tree the parser produces.
pub fn render(document: &Document<'_>, table: &DispatchTable) -> String {
    let mut writer = HtmlWriter {
        out: String::with_capacity(document.span.len() as usize + 64),
        table,
        open: Vec::with_capacity(8),
    };
    for block in &document.blocks {
        writer.render_block(block);
    }
    writer.out
}

/// Entity-escape text content (`&`, `<`, `>`) into `out`.
pub fn escape_text(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut last = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let replacement = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(replacement);
        last = i + 1;
    }
    out.push_str(&text[last..]);
}

/// Entity-escape an attribute value: text escapes plus `"`.
pub fn escape_attr(out: &mut String, text: &str) {
    let bytes = text.as_bytes();
    let mut last = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let replacement = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            _ => continue,
        };
        out.push_str(&text[last..i]);
        out.push_str(replacement);
        last = i + 1;
    }
    out.push_str(&text[last..]);
}

struct HtmlWriter<'t> {
    out: String,
    table: &'t DispatchTable,
    /// Currently open tags; closed strictly in reverse order.
    open: Vec<NodeKind>,
}

impl<'t> HtmlWriter<'t> {
    fn open_tag(&mut self, kind: NodeKind) {
        self.open_tag_with(kind, &[]);
    }

    fn open_tag_with(&mut self, kind: NodeKind, dynamic_attrs: &[(&str, &str)]) {
        let spec = self.table.spec(kind);
        self.out.push('<');
        self.out.push_str(&spec.name);
        self.write_attrs(kind, dynamic_attrs);
        self.out.push('>');
        self.open.push(kind);
    }

    fn close_tag(&mut self) {
        if let Some(kind) = self.open.pop() {
            let spec = self.table.spec(kind);
            self.out.push_str("</");
            self.out.push_str(&spec.name);
            self.out.push('>');
        }
    }

    fn void_tag(&mut self, kind: NodeKind, dynamic_attrs: &[(&str, &str)]) {
        let spec = self.table.spec(kind);
        self.out.push('<');
        self.out.push_str(&spec.name);
        self.write_attrs(kind, dynamic_attrs);
        self.out.push_str(" />");
    }

    fn write_attrs(&mut self, kind: NodeKind, dynamic_attrs: &[(&str, &str)]) {
        let spec = self.table.spec(kind);
        for (name, value) in &spec.attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            escape_attr(&mut self.out, value);
            self.out.push('"');
        }
        for (name, value) in dynamic_attrs {
            self.out.push(' ');
            self.out.push_str(name);
            self.out.push_str("=\"");
            escape_attr(&mut self.out, value);
            self.out.push('"');
        }
    }

    fn render_block(&mut self, block: &Block<'_>) {
        match block {
            Block::Heading(heading) => {
                self.open_tag(NodeKind::Heading(heading.level));
                self.render_inlines(&heading.content);
                self.close_tag();
                self.out.push('\n');
            }
            Block::Paragraph(paragraph) => {
                self.open_tag(NodeKind::Paragraph);
                self.render_inlines(&paragraph.content);
                self.close_tag();
                self.out.push('\n');
            }
            Block::List(list) => self.render_list(list),
            Block::Table(table) => self.render_table(table),
            Block::Preformatted(pre) => {
                self.open_tag(NodeKind::Preformatted);
                escape_text(&mut self.out, &pre.text);
                self.close_tag();
                self.out.push('\n');
            }
            Block::HorizontalRule(_) => {
                self.void_tag(NodeKind::HorizontalRule, &[]);
                self.out.push('\n');
            }
            Block::RawHtml(raw) => {
                self.out.push_str(&raw.content);
                self.out.push('\n');
            }
        }
    }

    /// Rebuild list nesting from flat depth-tagged items. The parser
    /// clamps depth jumps to one step, so each deeper item opens
    /// exactly one sublist inside the current item.
    fn render_list(&mut self, list: &List<'_>) {
        let mut depth: u8 = 0;

        for item in &list.items {
            let list_kind = if item.ordered {
                NodeKind::OrderedList
            } else {
                NodeKind::UnorderedList
            };

            if depth == 0 {
                self.open_tag(list_kind);
                depth = 1;
            } else if item.depth > depth {
                self.open_tag(list_kind);
                depth += 1;
            } else {
                self.close_tag(); // </li> of the previous item
                while depth > item.depth {
                    self.close_tag(); // sublist
                    self.close_tag(); // enclosing </li>
                    depth -= 1;
                }
                self.out.push('\n');
            }

            self.open_tag(NodeKind::ListItem);
            self.render_inlines(&item.content);
        }

        if depth > 0 {
            self.close_tag(); // final </li>
            while depth > 1 {
                self.close_tag();
                self.close_tag();
                depth -= 1;
            }
            self.close_tag(); // outermost list
        }
        self.out.push('\n');
    }

    fn render_table(&mut self, table: &Table<'_>) {
        self.open_tag(NodeKind::Table);
        for row in &table.rows {
            self.open_tag(NodeKind::TableRow);
            for cell in &row.cells {
                let kind = if cell.header {
                    NodeKind::TableHeaderCell
                } else {
                    NodeKind::TableCell
                };
                self.open_tag(kind);
                self.render_inlines(&cell.content);
                self.close_tag();
            }
            self.close_tag();
            self.out.push('\n');
        }
        self.close_tag();
        self.out.push('\n');
    }

    fn render_inlines(&mut self, inlines: &[Inline<'_>]) {
        for inline in inlines {
            match inline {
                Inline::Text(text) => escape_text(&mut self.out, &text.content),
                Inline::Styled(styled) => {
                    self.open_tag(NodeKind::Styled(styled.kind));
                    self.render_inlines(&styled.content);
                    self.close_tag();
                }
                Inline::LineBreak(_) => self.void_tag(NodeKind::LineBreak, &[]),
                Inline::Link(link) => {
                    self.open_tag_with(NodeKind::Link, &[("href", link.target.href())]);
                    match &link.label {
                        Some(children) => self.render_inlines(children),
                        None => escape_text(&mut self.out, &link.text),
                    }
                    self.close_tag();
                }
                Inline::Image(image) => {
                    self.void_tag(
                        NodeKind::Image,
                        &[("src", image.src.as_ref()), ("alt", image.alt.as_ref())],
                    );
                }
                Inline::Placeholder(placeholder) => {
                    self.open_tag_with(
                        NodeKind::Placeholder,
                        &[("data-placeholder", placeholder.name.as_ref())],
                    );
                    escape_text(&mut self.out, &placeholder.args);
                    self.close_tag();
                }
                Inline::RawEscape(raw) => {
                    self.open_tag(NodeKind::RawEscape);
                    escape_text(&mut self.out, &raw.text);
                    self.close_tag();
                }
            }
        }
    }
}
