//! Integration tests for HTML rendering: exact output, dispatch-table
//! overrides, and the output-level guarantees (balance, idempotence).

use pretty_assertions::assert_eq;

use creolite_core::{
    convert, convert_with, parse, render, Dialect, DispatchTable, NodeKind, StyleKind, TagSpec,
};

fn html(input: &str) -> String {
    convert(input, &Dialect::new()).unwrap()
}

/// Tag-stack simulation: every opening tag in `html` must be closed in
/// reverse order. Self-closing tags and entities are skipped.
fn assert_balanced(html: &str) {
    let bytes = html.as_bytes();
    let mut stack: Vec<String> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let close = html[i..].find('>').map(|p| i + p).unwrap_or_else(|| {
            panic!("unclosed tag bracket at byte {} in {:?}", i, html);
        });
        let tag = &html[i + 1..close];
        if let Some(name) = tag.strip_prefix('/') {
            match stack.pop() {
                Some(open) => assert_eq!(open, name, "mismatched close in {:?}", html),
                None => panic!("close without open in {:?}", html),
            }
        } else if !tag.ends_with('/') {
            let name: String = tag
                .split_whitespace()
                .next()
                .unwrap_or("")
                .to_string();
            stack.push(name);
        }
        i = close + 1;
    }
    assert!(stack.is_empty(), "unclosed tags {:?} in {:?}", stack, html);
}

// ============================================================================
// Paragraphs and Inline Styling
// ============================================================================

#[test]
fn test_render_bold() {
    assert_eq!(
        html("the **bold** is bolded"),
        "<p>the <strong>bold</strong> is bolded</p>\n"
    );
}

#[test]
fn test_render_italics() {
    assert_eq!(
        html("the //italic// is italiced"),
        "<p>the <em>italic</em> is italiced</p>\n"
    );
}

#[test]
fn test_render_nested_styles() {
    assert_eq!(
        html("**this is bold //this is bold and italic//**"),
        "<p><strong>this is bold <em>this is bold and italic</em></strong></p>\n"
    );
    assert_eq!(
        html("//this is italic **this is italic and bold**//"),
        "<p><em>this is italic <strong>this is italic and bold</strong></em></p>\n"
    );
}

#[test]
fn test_render_line_break() {
    assert_eq!(html(r"break\\this"), "<p>break<br />this</p>\n");
}

#[test]
fn test_render_additions() {
    let dialect = Dialect::new().with_additions(true);
    assert_eq!(
        convert(
            "//^^superscript^^,,subscript,,**__underline__**//",
            &dialect
        )
        .unwrap(),
        "<p><em><sup>superscript</sup><sub>subscript</sub><strong><u>underline</u></strong></em></p>\n"
    );
    assert_eq!(
        convert("##text **should** be monospace##", &dialect).unwrap(),
        "<p><tt>text <strong>should</strong> be monospace</tt></p>\n"
    );
}

// ============================================================================
// Toggle and Degradation Semantics
// ============================================================================

#[test]
fn test_unterminated_strong_renders_literally() {
    let out = html("**bold*");
    assert_eq!(out, "<p>**bold*</p>\n");
    assert!(!out.contains("<strong>"));
}

#[test]
fn test_unterminated_emphasis_renders_literally() {
    assert_eq!(
        html("// not italic because unterminated"),
        "<p>// not italic because unterminated</p>\n"
    );
}

#[test]
fn test_escape_consumes_one_marker() {
    assert_eq!(html("~**not bold**"), "<p>**not bold**</p>\n");
    assert_eq!(
        html("preventing markup for ~**bold~** and ~//italics~//"),
        "<p>preventing markup for **bold** and //italics//</p>\n"
    );
    assert_eq!(
        html("preventing markup for ~= headings"),
        "<p>preventing markup for = headings</p>\n"
    );
}

// ============================================================================
// Headings and Rules
// ============================================================================

#[test]
fn test_render_headings() {
    assert_eq!(html("= Level 1 (largest)"), "<h1>Level 1 (largest)</h1>\n");
    assert_eq!(html("== Level 2"), "<h2>Level 2</h2>\n");
    assert_eq!(html("=== Also Level 3 =="), "<h3>Also Level 3</h3>\n");
    assert_eq!(
        html("=== This **is** //parsed// ==="),
        "<h3>This <strong>is</strong> <em>parsed</em></h3>\n"
    );
}

#[test]
fn test_render_horizontal_rule() {
    assert_eq!(html("----"), "<hr />\n");
}

// ============================================================================
// Links and Images
// ============================================================================

#[test]
fn test_render_url_link() {
    assert_eq!(
        html("[[http://www.google.com]]"),
        "<p><a href=\"http://www.google.com\">http://www.google.com</a></p>\n"
    );
}

#[test]
fn test_render_wiki_link() {
    let dialect = Dialect::new().with_wiki_base_url("http://www.wikicreole.org/wiki/");
    assert_eq!(
        convert("[[New Page|this]]", &dialect).unwrap(),
        "<p><a href=\"http://www.wikicreole.org/wiki/New_Page\">this</a></p>\n"
    );
    assert_eq!(
        convert("[[foo bar]]", &dialect).unwrap(),
        "<p><a href=\"http://www.wikicreole.org/wiki/foo_bar\">foo bar</a></p>\n"
    );
}

#[test]
fn test_render_bare_url() {
    assert_eq!(
        html("http://www.google.com"),
        "<p><a href=\"http://www.google.com\">http://www.google.com</a></p>\n"
    );
    assert_eq!(html("~http://www.google.com"), "<p>http://www.google.com</p>\n");
}

#[test]
fn test_render_link_in_heading() {
    assert_eq!(
        html("= [[http://www.google.com|Google]]"),
        "<h1><a href=\"http://www.google.com\">Google</a></h1>\n"
    );
    assert_eq!(
        html("== http://www.google.com"),
        "<h2><a href=\"http://www.google.com\">http://www.google.com</a></h2>\n"
    );
    assert_eq!(html("== ~http://www.google.com"), "<h2>http://www.google.com</h2>\n");
}

#[test]
fn test_render_link_in_bold() {
    assert_eq!(
        html("**[[http://www.google.com|Google]]**"),
        "<p><strong><a href=\"http://www.google.com\">Google</a></strong></p>\n"
    );
}

#[test]
fn test_render_image() {
    assert_eq!(
        html("{{campfire.jpg}}"),
        "<p><img src=\"campfire.jpg\" alt=\"campfire.jpg\" /></p>\n"
    );
    assert_eq!(
        html("{{ campfire.jpg | Nice Pic }}"),
        "<p><img src=\"campfire.jpg\" alt=\"Nice Pic\" /></p>\n"
    );
}

#[test]
fn test_render_image_in_link() {
    assert_eq!(
        html("[[http://google.com | {{ campfire.jpg | Nice Pic }}]]"),
        "<p><a href=\"http://google.com\"><img src=\"campfire.jpg\" alt=\"Nice Pic\" /></a></p>\n"
    );
}

// ============================================================================
// No-Wiki Spans
// ============================================================================

#[test]
fn test_render_inline_no_wiki() {
    assert_eq!(
        html("**this is bold** {{{not **this**}}}"),
        "<p><strong>this is bold</strong> <tt>not **this**</tt></p>\n"
    );
}

#[test]
fn test_render_no_wiki_as_span() {
    let dialect = Dialect::new().with_no_wiki_monospace(false);
    assert_eq!(
        convert("//this is italic// {{{//not this//}}}", &dialect).unwrap(),
        "<p><em>this is italic</em> <span>//not this//</span></p>\n"
    );
}

// ============================================================================
// Tables
// ============================================================================

#[test]
fn test_render_table() {
    let input = "|= Item|= Size|= Price|\n| fish | **big**  |cheap|\n| crab | small|expesive|";
    assert_eq!(
        html(input),
        "<table><tr><th>Item</th><th>Size</th><th>Price</th></tr>\n\
         <tr><td>fish</td><td><strong>big</strong></td><td>cheap</td></tr>\n\
         <tr><td>crab</td><td>small</td><td>expesive</td></tr>\n\
         </table>\n"
    );
}

#[test]
fn test_render_table_without_trailing_pipes() {
    let input = "|= Item|= Size\n| fish | big";
    assert_eq!(
        html(input),
        "<table><tr><th>Item</th><th>Size</th></tr>\n<tr><td>fish</td><td>big</td></tr>\n</table>\n"
    );
}

#[test]
fn test_render_line_break_in_cell() {
    assert_eq!(
        html(r"| crab | **very\\expesive** |"),
        "<table><tr><td>crab</td><td><strong>very<br />expesive</strong></td></tr>\n</table>\n"
    );
}

#[test]
fn test_render_escaped_pipe_in_cell() {
    assert_eq!(
        html("|preventing markup|for a pipe ~| in a table|"),
        "<table><tr><td>preventing markup</td><td>for a pipe | in a table</td></tr>\n</table>\n"
    );
}

#[test]
fn test_render_link_in_table() {
    assert_eq!(
        html("|http://www.google.com|Google|"),
        "<table><tr><td><a href=\"http://www.google.com\">http://www.google.com</a></td><td>Google</td></tr>\n</table>\n"
    );
}

// ============================================================================
// Lists
// ============================================================================

#[test]
fn test_render_flat_list() {
    assert_eq!(
        html("* one\n* two"),
        "<ul><li>one</li>\n<li>two</li></ul>\n"
    );
    assert_eq!(html("# one\n# two"), "<ol><li>one</li>\n<li>two</li></ol>\n");
}

#[test]
fn test_render_nested_list() {
    assert_eq!(
        html("* a\n** b\n* c"),
        "<ul><li>a<ul><li>b</li></ul></li>\n<li>c</li></ul>\n"
    );
}

#[test]
fn test_render_list_with_markup() {
    assert_eq!(
        html("* this is list **item one**\n** //subitem 1//\n** //subitem 2//\n* **item two**"),
        "<ul><li>this is list <strong>item one</strong><ul><li><em>subitem 1</em></li>\n\
         <li><em>subitem 2</em></li></ul></li>\n<li><strong>item two</strong></li></ul>\n"
    );
}

#[test]
fn test_render_ordered_sublist_in_unordered_list() {
    assert_eq!(
        html("* a\n*# b\n*# c"),
        "<ul><li>a<ol><li>b</li>\n<li>c</li></ol></li></ul>\n"
    );
}

// ============================================================================
// Preformatted Blocks and Raw HTML
// ============================================================================

#[test]
fn test_render_preformatted() {
    assert_eq!(
        html("{{{\n** some ** {{{ stuff\n}}}"),
        "<pre>** some ** {{{ stuff\n</pre>\n"
    );
}

#[test]
fn test_render_preformatted_escapes_html() {
    assert_eq!(
        html("{{{\n<script>alert(1)</script>\n}}}"),
        "<pre>&lt;script&gt;alert(1)&lt;/script&gt;\n</pre>\n"
    );
}

#[test]
fn test_render_raw_html_passthrough() {
    let dialect = Dialect::new().with_raw_html_passthrough(true);
    assert_eq!(
        convert("<div class=\"x\">hi</div>", &dialect).unwrap(),
        "<div class=\"x\">hi</div>\n"
    );
    // disabled by default: the markup is escaped like any text
    assert_eq!(
        html("<div>hi</div>"),
        "<p>&lt;div&gt;hi&lt;/div&gt;</p>\n"
    );
}

// ============================================================================
// Placeholders
// ============================================================================

#[test]
fn test_render_placeholder() {
    let dialect = Dialect::new().with_placeholder("toc");
    assert_eq!(
        convert("<<toc depth=2>>", &dialect).unwrap(),
        "<p><span data-placeholder=\"toc\">depth=2</span></p>\n"
    );
}

#[test]
fn test_render_unknown_placeholder_escaped() {
    assert_eq!(
        html("This is the <<sue sue macro!>>"),
        "<p>This is the &lt;&lt;sue sue macro!&gt;&gt;</p>\n"
    );
}

// ============================================================================
// Escaping
// ============================================================================

#[test]
fn test_text_is_entity_escaped() {
    assert_eq!(html("a < b & c > d"), "<p>a &lt; b &amp; c &gt; d</p>\n");
}

#[test]
fn test_attribute_values_are_escaped() {
    assert_eq!(
        html("{{x.png|say \"hi\"}}"),
        "<p><img src=\"x.png\" alt=\"say &quot;hi&quot;\" /></p>\n"
    );
}

// ============================================================================
// Dispatch Table Overrides
// ============================================================================

#[test]
fn test_override_tag_name() {
    let dialect = Dialect::new();
    let table = DispatchTable::for_dialect(&dialect)
        .with_tag(NodeKind::Styled(StyleKind::Strong), TagSpec::new("b"))
        .with_tag(NodeKind::Styled(StyleKind::Emphasis), TagSpec::new("i"));
    assert_eq!(
        convert_with("**a** //b//", &dialect, &table).unwrap(),
        "<p><b>a</b> <i>b</i></p>\n"
    );
}

#[test]
fn test_override_adds_fixed_attributes() {
    let dialect = Dialect::new();
    let table = DispatchTable::for_dialect(&dialect)
        .with_tag(NodeKind::Link, TagSpec::new("a").with_attr("class", "wiki"));
    assert_eq!(
        convert_with("[[Page]]", &dialect, &table).unwrap(),
        "<p><a class=\"wiki\" href=\"Page\">Page</a></p>\n"
    );
}

// ============================================================================
// Output-Level Guarantees
// ============================================================================

#[test]
fn test_render_is_idempotent_over_the_tree() {
    let dialect = Dialect::new();
    let input = "= T\n\npara **x** {{{raw}}}\n\n* a\n** b\n\n|p|q|";
    let doc = parse(input, &dialect).unwrap();
    let table = DispatchTable::for_dialect(&dialect);
    let first = render(&doc, &table);
    let second = render(&doc, &table);
    assert_eq!(first, second);
}

#[test]
fn test_output_tags_are_balanced() {
    let inputs = [
        "**bold**",
        "**bold*",
        "// unterminated",
        "* a\n** b\n*** c\n* d",
        "|a|**b|c**|",
        "= h **x\n\npara //y",
        "{{{\nfence\n}}}",
        "[[bad  target]] and {{bad src here}}",
        "**//^^,,__##mixed",
        "~",
    ];
    for input in inputs {
        let out = html(input);
        assert_balanced(&out);
    }
}

#[test]
fn test_deep_nesting_stays_balanced() {
    let mut input = String::new();
    for _ in 0..64 {
        input.push_str("**//");
    }
    input.push_str("deep");
    let out = html(&input);
    assert_balanced(&out);
}
