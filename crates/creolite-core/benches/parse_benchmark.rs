//! Benchmarks comparing Creole conversion vs pulldown-cmark (Markdown)
//!
//! Run with: cargo bench -p creolite-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use creolite_core::{convert, parse, Dialect};
use pulldown_cmark::{html, Options, Parser as MdParser};

/// Sample Creole content exercising every block kind.
const CREOLE_SAMPLE: &str = r#"= Introduction

This is a paragraph with //emphasis//, **strong text**, and an inline
{{{no-wiki span}}}. It links to [[Another Page|another page]] and to
http://example.org directly.

== Lists

* First item with some content
* Second item with **more** content
** A nested subitem
** Another one, with a break\\and a second line
* Third item concluding the list

== Data

|= Name |= Speed |= Memory |
| creole | fast | low |
| markdown | fast | low |

----

== Code Example

{{{
fn fibonacci(n: u64) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}
}}}

Final paragraph with an image {{diagram.png|architecture}} inline.
"#;

/// The same document written in Markdown, for the baseline comparison.
const MARKDOWN_SAMPLE: &str = r#"# Introduction

This is a paragraph with *emphasis*, **strong text**, and an inline
`no-wiki span`. It links to [another page](another-page) and to
<http://example.org> directly.

## Lists

- First item with some content
- Second item with **more** content
  - A nested subitem
  - Another one, with a break
    and a second line
- Third item concluding the list

## Data

| Name | Speed | Memory |
| ---- | ----- | ------ |
| creole | fast | low |
| markdown | fast | low |

---

## Code Example

```rust
fn fibonacci(n: u64) -> u64 {
    match n {
        0 => 0,
        1 => 1,
        _ => fibonacci(n - 1) + fibonacci(n - 2),
    }
}
```

Final paragraph with an image ![architecture](diagram.png) inline.
"#;

fn bench_convert(c: &mut Criterion) {
    let dialect = Dialect::new();
    let mut group = c.benchmark_group("convert");
    group.throughput(Throughput::Bytes(CREOLE_SAMPLE.len() as u64));

    group.bench_function("creole_to_html", |b| {
        b.iter(|| convert(black_box(CREOLE_SAMPLE), &dialect).unwrap())
    });

    group.bench_function("markdown_to_html_pulldown", |b| {
        b.iter(|| {
            let mut out = String::with_capacity(MARKDOWN_SAMPLE.len());
            let parser = MdParser::new_ext(black_box(MARKDOWN_SAMPLE), Options::all());
            html::push_html(&mut out, parser);
            out
        })
    });

    group.finish();
}

fn bench_parse_only(c: &mut Criterion) {
    let dialect = Dialect::new();
    c.bench_function("parse_tree_only", |b| {
        b.iter(|| parse(black_box(CREOLE_SAMPLE), &dialect).unwrap())
    });
}

fn bench_scaling(c: &mut Criterion) {
    let dialect = Dialect::new();
    let mut group = c.benchmark_group("scaling");

    for copies in [1usize, 4, 16, 64] {
        let input = CREOLE_SAMPLE.repeat(copies);
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(copies), &input, |b, input| {
            b.iter(|| convert(black_box(input), &dialect).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_convert, bench_parse_only, bench_scaling);
criterion_main!(benches);
