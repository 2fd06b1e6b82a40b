//! Robustness tests: adversarial and malformed inputs must always
//! convert, never panic, and always produce balanced HTML.

use creolite_core::{convert, parse, Dialect};

/// Tag-stack simulation over the rendered output.
fn assert_balanced(html: &str) {
    let bytes = html.as_bytes();
    let mut stack: Vec<String> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        let close = match html[i..].find('>') {
            Some(p) => i + p,
            None => panic!("unclosed tag bracket in {:?}", html),
        };
        let tag = &html[i + 1..close];
        if let Some(name) = tag.strip_prefix('/') {
            match stack.pop() {
                Some(open) => assert_eq!(open, name, "mismatched close in {:?}", html),
                None => panic!("close without open in {:?}", html),
            }
        } else if !tag.ends_with('/') {
            stack.push(tag.split_whitespace().next().unwrap_or("").to_string());
        }
        i = close + 1;
    }
    assert!(stack.is_empty(), "unclosed tags {:?} in {:?}", stack, html);
}

const ADVERSARIAL: &[&str] = &[
    "",
    "\n\n\n",
    "~",
    "~~~~~~~~",
    "**",
    "*** ** * {{{ [[ ~ | = #",
    "{{{{{{{{{",
    "}}}}}}",
    "[[[[[[",
    "]]]]",
    "||||||",
    "|~||~|",
    "<<<<>>>>",
    "\\\\\\\\\\",
    "==========================",
    "* \n** \n*** \n# ",
    "{{{\nnever closed",
    "{{|}}[[|]]",
    "= **// mixed = and | markers",
    "a\0b",
    "**héllo wörld//é~é**",
    "|{{{a|b}}}|c|",
    "http:// https:// http://x",
];

#[test]
fn test_adversarial_inputs_convert_and_balance() {
    let dialect = Dialect::new();
    for input in ADVERSARIAL {
        let html = convert(input, &dialect).unwrap();
        assert_balanced(&html);
    }
}

#[test]
fn test_adversarial_inputs_with_all_features_on() {
    let dialect = Dialect::new()
        .with_additions(true)
        .with_raw_html_passthrough(true)
        .with_placeholder("x")
        .with_wiki_base_url("http://w/")
        .with_interwiki("W", "http://i/");
    for input in ADVERSARIAL {
        let html = convert(input, &dialect).unwrap();
        // raw HTML passthrough is exempt from the balance check by
        // design; everything else must still balance
        if !input.starts_with('<') {
            assert_balanced(&html);
        }
    }
}

#[test]
fn test_empty_and_blank_documents() {
    let dialect = Dialect::new();
    assert_eq!(convert("", &dialect).unwrap(), "");
    assert_eq!(convert("\n\n\n", &dialect).unwrap(), "");
    assert_eq!(convert("   \n\t\n", &dialect).unwrap(), "");
}

#[test]
fn test_crlf_input() {
    let dialect = Dialect::new();
    assert_eq!(
        convert("= Title\r\n\r\npara\r\n", &dialect).unwrap(),
        "<h1>Title</h1>\n<p>para</p>\n"
    );
}

#[test]
fn test_nul_byte_is_ordinary_text() {
    let dialect = Dialect::new();
    let html = convert("a\0b", &dialect).unwrap();
    assert_eq!(html, "<p>a\0b</p>\n");
}

#[test]
fn test_multibyte_text_survives_markup() {
    let dialect = Dialect::new();
    assert_eq!(
        convert("**héllo wörld**", &dialect).unwrap(),
        "<p><strong>héllo wörld</strong></p>\n"
    );
    // escaping a multibyte character consumes exactly that character
    assert_eq!(convert("~é and more", &dialect).unwrap(), "<p>é and more</p>\n");
}

#[test]
fn test_pathological_nesting_is_bounded() {
    let dialect = Dialect::new().with_max_nesting_depth(8);
    let mut input = String::new();
    for _ in 0..10_000 {
        input.push_str("**//");
    }
    let html = convert(&input, &dialect).unwrap();
    assert_balanced(&html);
}

#[test]
fn test_long_single_line_document() {
    let dialect = Dialect::new();
    let input = "word ".repeat(50_000);
    let html = convert(&input, &dialect).unwrap();
    assert_balanced(&html);
}

#[test]
fn test_every_line_a_different_block_kind() {
    let dialect = Dialect::new();
    let input = "= h\n----\n|t|\n* l\n\npara\n{{{\npre\n}}}\n";
    let html = convert(input, &dialect).unwrap();
    assert_balanced(&html);
    let doc = parse(input, &dialect).unwrap();
    assert_eq!(doc.blocks.len(), 6);
}
