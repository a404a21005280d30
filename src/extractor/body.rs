// src/extractor/body.rs
use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use super::lexer::SourceView;
use super::model::push_unique;

lazy_static! {
    static ref CALL_REGEX: Regex = Regex::new(r"([A-Za-z_$][\w$]*)\s*\(").unwrap();
}

/// Control-flow keywords that look like calls.
const NON_CALL_KEYWORDS: [&str; 4] = ["if", "for", "while", "switch"];

/// Byte range of a method body, exclusive of its braces.
/// An unbalanced body runs to end-of-file.
pub fn body_range(view: &SourceView<'_>, open: usize) -> (usize, usize) {
    let start = (open + 1).min(view.masked.len());
    let end = view
        .braces
        .matching_close(open)
        .unwrap_or(view.masked.len());
    (start, end.max(start))
}

/// Deduplicated call targets in first-seen order.
pub fn extract_calls(body: &str) -> Vec<String> {
    let mut calls = Vec::new();
    let mut seen = HashSet::new();
    for caps in CALL_REGEX.captures_iter(body) {
        let name = &caps[1];
        if NON_CALL_KEYWORDS.contains(&name) {
            continue;
        }
        push_unique(&mut calls, &mut seen, name);
    }
    calls
}

/// Call targets inside the body opened at `open`.
pub fn scan_method_body(view: &SourceView<'_>, open: usize) -> Vec<String> {
    let (start, end) = body_range(view, open);
    extract_calls(&view.masked[start..end])
}
