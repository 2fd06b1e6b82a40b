//! # Creolite Core
//!
//! A deterministic Creole wiki markup to HTML conversion engine.
//!
//! Creolite turns wiki markup into balanced HTML with a hard totality
//! guarantee: malformed or adversarial markup never fails, it degrades
//! to literal text, so the renderer always receives a well-formed tree
//! and always emits properly nested tags.
//!
//! ## Quick Start
//!
//! ```rust
//! use creolite_core::{convert, Dialect};
//!
//! let dialect = Dialect::new();
//! let html = convert("Hello **world**!", &dialect).unwrap();
//! assert_eq!(html, "<p>Hello <strong>world</strong>!</p>\n");
//! ```
//!
//! ## Inspecting the tree
//!
//! ```rust
//! use creolite_core::{parse, Dialect};
//!
//! let dialect = Dialect::new();
//! let doc = parse("= Title\n\nBody text.", &dialect).unwrap();
//! assert_eq!(doc.blocks.len(), 2);
//! ```
//!
//! ## Degradation reporting
//!
//! Unterminated markup is kept as literal text; each such decision is
//! recorded:
//!
//! ```rust
//! use creolite_core::{parse_with_diagnostics, Dialect};
//!
//! let dialect = Dialect::new();
//! let outcome = parse_with_diagnostics("**never closed", &dialect).unwrap();
//! assert_eq!(outcome.diagnostics.len(), 1);
//! ```
//!
//! The only reportable failures are caller-contract violations
//! ([`ConfigError`]), rejected before any parsing work starts.

pub mod ast;
pub mod dialect;
pub mod error;
pub mod inline;
pub mod lexer;
pub mod parser;
pub mod render;
pub mod span;

pub use ast::{Block, Document, Inline, LinkTarget, StyleKind};
pub use dialect::Dialect;
pub use error::{ConfigError, ConfigErrorKind, Diagnostic, DiagnosticKind, Diagnostics};
pub use parser::{ParseOutcome, Parser};
pub use render::{render, DispatchTable, NodeKind, TagSpec};

/// Convert markup to HTML with the dialect's standard tag mapping.
///
/// Fails only on invalid configuration; any markup converts.
pub fn convert(text: &str, dialect: &Dialect) -> Result<String, ConfigError> {
    dialect.validate()?;
    let table = DispatchTable::for_dialect(dialect);
    let mut parser = Parser::new(dialect);
    let document = parser.parse(text);
    Ok(render::render(&document, &table))
}

/// Convert markup to HTML through a caller-supplied dispatch table.
pub fn convert_with(
    text: &str,
    dialect: &Dialect,
    table: &DispatchTable,
) -> Result<String, ConfigError> {
    dialect.validate()?;
    let mut parser = Parser::new(dialect);
    let document = parser.parse(text);
    Ok(render::render(&document, table))
}

/// Parse markup into a document tree for inspection or re-rendering.
pub fn parse<'a>(text: &'a str, dialect: &Dialect) -> Result<Document<'a>, ConfigError> {
    dialect.validate()?;
    let mut parser = Parser::new(dialect);
    Ok(parser.parse(text))
}

/// Parse markup and collect the degradation ledger alongside the tree.
pub fn parse_with_diagnostics<'a>(
    text: &'a str,
    dialect: &Dialect,
) -> Result<ParseOutcome<'a>, ConfigError> {
    dialect.validate()?;
    let mut parser = Parser::new(dialect);
    Ok(parser.parse_with_diagnostics(text))
}
