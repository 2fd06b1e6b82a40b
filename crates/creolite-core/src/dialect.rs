//! Dialect configuration.
//!
//! A [`Dialect`] is an immutable set of feature flags and limits
//! threaded by reference through the block splitter, the inline engine,
//! and the renderer. Disabling a construct makes its marker characters
//! fall through to literal text at every dispatch site; it never causes
//! an error. The struct is plain data and `Send + Sync`, so one
//! instance can drive any number of concurrent conversions.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ConfigError;

/// Enabled-feature set and limits for one conversion.
///
/// # Example
///
/// ```rust
/// use creolite_core::Dialect;
///
/// let dialect = Dialect::new()
///     .with_wiki_base_url("https://wiki.example.org/")
///     .with_placeholder("toc")
///     .with_additions(true);
/// assert!(dialect.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Recognize `|` table rows. Default: true.
    pub tables: bool,
    /// Pass block-level HTML lines through verbatim. Default: false.
    pub raw_html_passthrough: bool,
    /// Enable the additions inline set (`^^`, `,,`, `__`, `##`).
    /// Default: false.
    pub additions: bool,
    /// Render inline no-wiki as `<tt>` instead of `<span>`.
    /// Default: true.
    pub no_wiki_monospace: bool,
    /// Ceiling on open inline spans (toggle stack plus bracket
    /// recursion). Must be at least 1. Default: 16.
    pub max_nesting_depth: usize,
    /// Placeholder names the engine recognizes; `<<name args>>` with
    /// any other name stays literal text.
    pub placeholder_names: BTreeSet<String>,
    /// Base URL prepended to wiki page links.
    pub wiki_base_url: String,
    /// Replacement for spaces in wiki page hrefs. Default: `'_'`.
    pub wiki_space_char: char,
    /// Interwiki prefix to base-URL map for `prefix:Page` links.
    pub interwiki: BTreeMap<String, String>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            tables: true,
            raw_html_passthrough: false,
            additions: false,
            no_wiki_monospace: true,
            max_nesting_depth: 16,
            placeholder_names: BTreeSet::new(),
            wiki_base_url: String::new(),
            wiki_space_char: '_',
            interwiki: BTreeMap::new(),
        }
    }
}

impl Dialect {
    /// Create the default dialect (core Creole, tables on).
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable table rows.
    pub fn with_tables(mut self, enabled: bool) -> Self {
        self.tables = enabled;
        self
    }

    /// Enable or disable raw HTML block passthrough.
    pub fn with_raw_html_passthrough(mut self, enabled: bool) -> Self {
        self.raw_html_passthrough = enabled;
        self
    }

    /// Enable or disable the additions inline set.
    pub fn with_additions(mut self, enabled: bool) -> Self {
        self.additions = enabled;
        self
    }

    /// Choose `<tt>` (true) or `<span>` (false) for inline no-wiki.
    pub fn with_no_wiki_monospace(mut self, monospace: bool) -> Self {
        self.no_wiki_monospace = monospace;
        self
    }

    /// Set the inline nesting ceiling.
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    /// Add a recognized placeholder name.
    pub fn with_placeholder(mut self, name: impl Into<String>) -> Self {
        self.placeholder_names.insert(name.into());
        self
    }

    /// Set the wiki link base URL.
    pub fn with_wiki_base_url(mut self, url: impl Into<String>) -> Self {
        self.wiki_base_url = url.into();
        self
    }

    /// Set the space replacement character for wiki page hrefs.
    pub fn with_wiki_space_char(mut self, c: char) -> Self {
        self.wiki_space_char = c;
        self
    }

    /// Register an interwiki prefix and its base URL.
    pub fn with_interwiki(
        mut self,
        prefix: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        self.interwiki.insert(prefix.into(), base_url.into());
        self
    }

    /// Validate caller-contract preconditions.
    ///
    /// Conversion entry points call this before any parsing work; the
    /// parser itself is total and never fails on markup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nesting_depth == 0 {
            return Err(ConfigError::nesting_depth());
        }
        if self.wiki_space_char.is_whitespace() {
            return Err(ConfigError::space_char(self.wiki_space_char));
        }
        for name in &self.placeholder_names {
            if !is_placeholder_name(name) {
                return Err(ConfigError::placeholder_name(name));
            }
        }
        for prefix in self.interwiki.keys() {
            if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
            {
                return Err(ConfigError::interwiki_prefix(prefix));
            }
        }
        Ok(())
    }
}

/// Check the placeholder name grammar: a letter followed by letters,
/// digits, `.`, `-`, or `_`.
#[inline]
pub(crate) fn is_placeholder_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes[1..]
        .iter()
        .all(|&b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-' || b == b'_')
}
