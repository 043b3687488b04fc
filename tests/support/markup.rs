#![allow(dead_code)]

//! Markup harness for span-precise lint assertions.
//!
//! Test fixtures mark expected diagnostic locations with `[|...|]`.
//! `parse_markup` strips the markers and records the 1-based positions of
//! each marked region in the cleaned source. Columns count bytes, matching
//! the spans the engine reports.

use unity_clippy::diagnostics::{Diagnostic, Position, Span};

pub struct Markup {
    pub source: String,
    pub spans: Vec<Span>,
}

pub fn parse_markup(marked: &str) -> Markup {
    let mut source = String::new();
    let mut spans = Vec::new();
    let mut open: Vec<Position> = Vec::new();
    let mut row = 1usize;
    let mut column = 1usize;

    let mut i = 0usize;
    while i < marked.len() {
        let rest = &marked[i..];
        if rest.starts_with("[|") {
            open.push(Position { row, column });
            i += 2;
        } else if rest.starts_with("|]") {
            let start = open.pop().expect("unbalanced [| |] markup");
            spans.push(Span {
                start,
                end: Position { row, column },
            });
            i += 2;
        } else {
            let ch = rest.chars().next().expect("char at valid boundary");
            source.push(ch);
            if ch == '\n' {
                row += 1;
                column = 1;
            } else {
                column += ch.len_utf8();
            }
            i += ch.len_utf8();
        }
    }

    assert!(open.is_empty(), "unbalanced [| |] markup");
    Markup { source, spans }
}

pub fn diagnostics_named<'d>(diags: &'d [Diagnostic], lint: &str) -> Vec<&'d Diagnostic> {
    diags.iter().filter(|d| d.lint.name == lint).collect()
}

/// Assert that `lint` fired exactly once, at the single marked span.
pub fn assert_diagnostic_at_markup(diags: &[Diagnostic], lint: &str, markup: &Markup) {
    assert_eq!(markup.spans.len(), 1, "fixture must mark exactly one span");
    let matching = diagnostics_named(diags, lint);
    assert_eq!(
        matching.len(),
        1,
        "expected exactly one '{lint}' diagnostic, got: {matching:#?}"
    );
    assert_eq!(
        matching[0].span, markup.spans[0],
        "diagnostic span does not match marked span"
    );
}

pub fn assert_no_diagnostic(diags: &[Diagnostic], lint: &str) {
    let matching = diagnostics_named(diags, lint);
    assert!(
        matching.is_empty(),
        "expected no '{lint}' diagnostics, got: {matching:#?}"
    );
}
