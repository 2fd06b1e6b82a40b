//! Creolite CLI - Convert Creole wiki markup to HTML
//!
//! Usage:
//!   creolite [OPTIONS] <FILE>
//!
//! Commands:
//!   convert   Convert to HTML and print it (default)
//!   tree      Parse and display the document tree
//!   stats     Show document statistics

use std::env;
use std::fs;
use std::process;

use creolite_core::ast::{Block, Document, Inline, StyleKind};
use creolite_core::{parse_with_diagnostics, render, Dialect, DispatchTable};
use serde::Serialize;

fn main() {
    let args: Vec<String> = env::args().collect();

    match run(&args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let config = parse_args(args)?;

    let input = fs::read_to_string(&config.file)
        .map_err(|e| format!("failed to read '{}': {}", config.file, e))?;

    let dialect = config.dialect.clone();
    dialect.validate().map_err(|e| e.to_string())?;

    match config.command {
        Command::Convert => cmd_convert(&dialect, &input, &config),
        Command::Tree => cmd_tree(&dialect, &input, &config),
        Command::Stats => cmd_stats(&dialect, &input),
    }
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    format: OutputFormat,
    verbose: bool,
    dialect: Dialect,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Convert,
    Tree,
    Stats,
}

#[derive(Debug, Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let mut command = Command::Convert;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut file = None;
    let mut dialect = Dialect::new();

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("creolite {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "--no-tables" => dialect = dialect.with_tables(false),
            "--additions" => dialect = dialect.with_additions(true),
            "--raw-html" => dialect = dialect.with_raw_html_passthrough(true),
            "--base-url" => {
                i += 1;
                let url = args
                    .get(i)
                    .ok_or_else(|| "--base-url requires a value".to_string())?;
                dialect = dialect.with_wiki_base_url(url.clone());
            }
            "--placeholder" => {
                i += 1;
                let name = args
                    .get(i)
                    .ok_or_else(|| "--placeholder requires a value".to_string())?;
                dialect = dialect.with_placeholder(name.clone());
            }
            "convert" => command = Command::Convert,
            "tree" => command = Command::Tree,
            "stats" => command = Command::Stats,
            _ if arg.starts_with('-') => {
                return Err(format!("unknown option: {}", arg));
            }
            _ => {
                if file.is_some() {
                    return Err("multiple files specified".to_string());
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.ok_or_else(|| "no input file specified".to_string())?;

    Ok(Config {
        command,
        file,
        format,
        verbose,
        dialect,
    })
}

fn print_help() {
    eprintln!(
        r#"creolite - Creole wiki markup to HTML converter

USAGE:
    creolite [OPTIONS] [COMMAND] <FILE>

COMMANDS:
    convert     Convert to HTML and print it (default)
    tree        Parse and display the document tree
    stats       Show document statistics

OPTIONS:
    -v, --verbose        Show degradation diagnostics on stderr
    -j, --json           Output the tree in JSON format (tree command)
    --no-tables          Disable table rows
    --additions          Enable the additions inline set (^^ ,, __ ##)
    --raw-html           Enable raw HTML block passthrough
    --base-url <URL>     Base URL for wiki page links
    --placeholder <NAME> Recognize a placeholder name (repeatable)
    -h, --help           Print help information
    -V, --version        Print version information

EXAMPLES:
    creolite page.creole            Convert a Creole file to HTML
    creolite -v page.creole         Convert, reporting degradations
    creolite tree -j page.creole    Dump the document tree as JSON
    creolite stats page.creole      Show document statistics
"#
    );
}

// =============================================================================
// Convert Command
// =============================================================================

fn cmd_convert(dialect: &Dialect, input: &str, config: &Config) -> Result<(), String> {
    let outcome = parse_with_diagnostics(input, dialect).map_err(|e| e.to_string())?;

    if config.verbose {
        for diagnostic in outcome.diagnostics.iter() {
            eprintln!("note: {}", diagnostic);
        }
    }

    let table = DispatchTable::for_dialect(dialect);
    print!("{}", render(&outcome.document, &table));
    Ok(())
}

// =============================================================================
// Tree Command
// =============================================================================

fn cmd_tree(dialect: &Dialect, input: &str, config: &Config) -> Result<(), String> {
    let outcome = parse_with_diagnostics(input, dialect).map_err(|e| e.to_string())?;

    for diagnostic in outcome.diagnostics.iter() {
        eprintln!("note: {}", diagnostic);
    }

    match config.format {
        OutputFormat::Json => print_json(&outcome.document),
        OutputFormat::Text => print_tree(&outcome.document),
    }

    Ok(())
}

fn print_tree(doc: &Document) {
    println!("Document ({} blocks)", doc.blocks.len());
    for block in &doc.blocks {
        match block {
            Block::Heading(h) => println!("  Heading level={} ({} inlines)", h.level, h.content.len()),
            Block::Paragraph(p) => println!("  Paragraph ({} inlines)", p.content.len()),
            Block::List(l) => {
                println!("  List ({} items)", l.items.len());
                for item in &l.items {
                    let marker = if item.ordered { '#' } else { '*' };
                    println!("    Item depth={} marker={}", item.depth, marker);
                }
            }
            Block::Table(t) => println!("  Table ({} rows)", t.rows.len()),
            Block::Preformatted(p) => {
                println!("  Preformatted ({} bytes)", p.text.len());
            }
            Block::HorizontalRule(_) => println!("  HorizontalRule"),
            Block::RawHtml(r) => println!("  RawHtml ({} bytes)", r.content.len()),
        }
    }
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(dialect: &Dialect, input: &str) -> Result<(), String> {
    let outcome = parse_with_diagnostics(input, dialect).map_err(|e| e.to_string())?;
    let doc = &outcome.document;

    let stats = DocumentStats::from_document(doc, input);

    println!("Document Statistics");
    println!("-------------------");
    println!("Content:");
    println!("  Total blocks:   {}", stats.total_blocks);
    println!("  Headings:       {}", stats.headings);
    println!("  Paragraphs:     {}", stats.paragraphs);
    println!("  Lists:          {}", stats.lists);
    println!("  List items:     {}", stats.list_items);
    println!("  Tables:         {}", stats.tables);
    println!("  Preformatted:   {}", stats.preformatted);
    println!("  Links:          {}", stats.links);
    println!("  Images:         {}", stats.images);
    println!();
    println!("Size:");
    println!("  Characters:     {}", stats.chars);
    println!("  Words (est.):   {}", stats.words);
    println!("  Lines:          {}", stats.lines);
    println!();
    println!("Degradations:   {}", outcome.diagnostics.len());

    Ok(())
}

struct DocumentStats {
    total_blocks: usize,
    headings: usize,
    paragraphs: usize,
    lists: usize,
    list_items: usize,
    tables: usize,
    preformatted: usize,
    links: usize,
    images: usize,
    chars: usize,
    words: usize,
    lines: usize,
}

impl DocumentStats {
    fn from_document(doc: &Document, input: &str) -> Self {
        let mut stats = Self {
            total_blocks: 0,
            headings: 0,
            paragraphs: 0,
            lists: 0,
            list_items: 0,
            tables: 0,
            preformatted: 0,
            links: 0,
            images: 0,
            chars: input.len(),
            words: input.split_whitespace().count(),
            lines: input.lines().count(),
        };

        for block in &doc.blocks {
            stats.total_blocks += 1;
            match block {
                Block::Heading(h) => {
                    stats.headings += 1;
                    stats.count_inlines(&h.content);
                }
                Block::Paragraph(p) => {
                    stats.paragraphs += 1;
                    stats.count_inlines(&p.content);
                }
                Block::List(l) => {
                    stats.lists += 1;
                    stats.list_items += l.items.len();
                    for item in &l.items {
                        stats.count_inlines(&item.content);
                    }
                }
                Block::Table(t) => {
                    stats.tables += 1;
                    for row in &t.rows {
                        for cell in &row.cells {
                            stats.count_inlines(&cell.content);
                        }
                    }
                }
                Block::Preformatted(_) => stats.preformatted += 1,
                _ => {}
            }
        }
        stats
    }

    fn count_inlines(&mut self, inlines: &[Inline]) {
        for inline in inlines {
            match inline {
                Inline::Link(link) => {
                    self.links += 1;
                    if let Some(label) = &link.label {
                        self.count_inlines(label);
                    }
                }
                Inline::Image(_) => self.images += 1,
                Inline::Styled(styled) => self.count_inlines(&styled.content),
                _ => {}
            }
        }
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    blocks: Vec<JsonBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonBlock<'a> {
    Heading {
        level: u8,
        content: Vec<JsonInline<'a>>,
    },
    Paragraph {
        content: Vec<JsonInline<'a>>,
    },
    List {
        items: Vec<JsonListItem<'a>>,
    },
    Table {
        rows: Vec<JsonTableRow<'a>>,
    },
    Preformatted {
        text: &'a str,
        is_escaped: bool,
    },
    HorizontalRule,
    RawHtml {
        content: &'a str,
    },
}

#[derive(Serialize)]
struct JsonListItem<'a> {
    depth: u8,
    ordered: bool,
    content: Vec<JsonInline<'a>>,
}

#[derive(Serialize)]
struct JsonTableRow<'a> {
    cells: Vec<JsonTableCell<'a>>,
}

#[derive(Serialize)]
struct JsonTableCell<'a> {
    header: bool,
    content: Vec<JsonInline<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum JsonInline<'a> {
    Text {
        content: &'a str,
    },
    Styled {
        kind: &'static str,
        content: Vec<JsonInline<'a>>,
    },
    LineBreak,
    Link {
        href: &'a str,
        text: &'a str,
        label: Option<Vec<JsonInline<'a>>>,
    },
    Image {
        src: &'a str,
        alt: &'a str,
    },
    Placeholder {
        name: &'a str,
        args: &'a str,
    },
    RawEscape {
        text: &'a str,
    },
}

fn print_json(doc: &Document) {
    let json_doc = JsonDocument {
        blocks: doc.blocks.iter().map(convert_block).collect(),
    };
    match serde_json::to_string_pretty(&json_doc) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("error: failed to serialize tree: {}", e),
    }
}

fn convert_block<'a>(block: &'a Block) -> JsonBlock<'a> {
    match block {
        Block::Heading(h) => JsonBlock::Heading {
            level: h.level,
            content: convert_inlines(&h.content),
        },
        Block::Paragraph(p) => JsonBlock::Paragraph {
            content: convert_inlines(&p.content),
        },
        Block::List(l) => JsonBlock::List {
            items: l
                .items
                .iter()
                .map(|item| JsonListItem {
                    depth: item.depth,
                    ordered: item.ordered,
                    content: convert_inlines(&item.content),
                })
                .collect(),
        },
        Block::Table(t) => JsonBlock::Table {
            rows: t
                .rows
                .iter()
                .map(|row| JsonTableRow {
                    cells: row
                        .cells
                        .iter()
                        .map(|cell| JsonTableCell {
                            header: cell.header,
                            content: convert_inlines(&cell.content),
                        })
                        .collect(),
                })
                .collect(),
        },
        Block::Preformatted(p) => JsonBlock::Preformatted {
            text: p.text.as_ref(),
            is_escaped: p.is_escaped,
        },
        Block::HorizontalRule(_) => JsonBlock::HorizontalRule,
        Block::RawHtml(r) => JsonBlock::RawHtml {
            content: r.content.as_ref(),
        },
    }
}

fn convert_inlines<'a>(inlines: &'a [Inline]) -> Vec<JsonInline<'a>> {
    inlines
        .iter()
        .map(|inline| match inline {
            Inline::Text(t) => JsonInline::Text {
                content: t.content.as_ref(),
            },
            Inline::Styled(s) => JsonInline::Styled {
                kind: style_label(s.kind),
                content: convert_inlines(&s.content),
            },
            Inline::LineBreak(_) => JsonInline::LineBreak,
            Inline::Link(link) => JsonInline::Link {
                href: link.target.href(),
                text: link.text.as_ref(),
                label: link.label.as_deref().map(convert_inlines),
            },
            Inline::Image(img) => JsonInline::Image {
                src: img.src.as_ref(),
                alt: img.alt.as_ref(),
            },
            Inline::Placeholder(p) => JsonInline::Placeholder {
                name: p.name.as_ref(),
                args: p.args.as_ref(),
            },
            Inline::RawEscape(raw) => JsonInline::RawEscape {
                text: raw.text.as_ref(),
            },
        })
        .collect()
}

fn style_label(kind: StyleKind) -> &'static str {
    match kind {
        StyleKind::Strong => "strong",
        StyleKind::Emphasis => "emphasis",
        StyleKind::Superscript => "superscript",
        StyleKind::Subscript => "subscript",
        StyleKind::Underline => "underline",
        StyleKind::Monospace => "monospace",
    }
}
