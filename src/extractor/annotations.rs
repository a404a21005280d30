// src/extractor/annotations.rs
//! Associates `@Annotation` tokens with the declaration that follows them.
//!
//! Association works on lines rather than character windows. Starting from the
//! declaration, annotations written inline on the same line are taken first, then
//! the walk moves up one line at a time. Blank lines and comment lines are skipped,
//! lines made only of annotations are collected, and the first line of real code
//! ends the walk. Annotation arguments that wrap onto a line not starting with `@`
//! end the walk as well.

use std::collections::BTreeMap;

use super::signature::split_top_level;

/// Annotations attached to the declaration starting at `decl_offset`, in source order.
pub fn associate_annotations(source: &str, decl_offset: usize) -> Vec<String> {
    let decl_offset = floor_char_boundary(source, decl_offset.min(source.len()));
    let line_start = source[..decl_offset].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..decl_offset];

    let run = annotation_run(after_statement_boundary(prefix));
    let mut collected = run.annotations;
    let walk_up = run.pure && !has_statement_boundary(prefix);
    if !walk_up || line_start == 0 {
        return collected;
    }

    for line in source[..line_start - 1].lines().rev() {
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with("//")
            || trimmed.starts_with("/*")
            || trimmed.starts_with('*')
        {
            continue;
        }
        if !trimmed.starts_with('@') {
            break;
        }
        let line_run = annotation_run(trimmed);
        if !line_run.pure {
            break;
        }
        let mut merged = line_run.annotations;
        merged.extend(collected);
        collected = merged;
    }
    collected
}

/// Simple name of an annotation: `@org.acme.Audit(x)` -> `Audit`.
pub fn annotation_name(raw: &str) -> &str {
    let body = raw.trim().trim_start_matches('@');
    let end = body
        .find(|c: char| c == '(' || c.is_whitespace())
        .unwrap_or(body.len());
    let qualified = &body[..end];
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Raw text between the outer parentheses, if the annotation has an argument list.
pub fn annotation_arguments(raw: &str) -> Option<&str> {
    let open = raw.find('(')?;
    let close = raw.rfind(')')?;
    (close > open).then(|| raw[open + 1..close].trim())
}

/// Parses `(value = "/x", method = RequestMethod.GET)` style arguments.
/// A bare argument is stored under `value`.
pub fn parse_annotation_arguments(raw: &str) -> BTreeMap<String, String> {
    let mut params = BTreeMap::new();
    let Some(args) = annotation_arguments(raw) else {
        return params;
    };
    if args.is_empty() {
        return params;
    }

    for part in split_top_level(args, ',') {
        match split_named_argument(&part) {
            Some((key, value)) => {
                params.insert(key.to_string(), unquote(value));
            }
            None => {
                params.insert("value".to_string(), unquote(&part));
            }
        }
    }
    params
}

/// Strips string quotes, and the braces of a single-level array initializer.
pub fn unquote(value: &str) -> String {
    let value = value.trim();
    if let Some(inner) = value.strip_prefix('{').and_then(|v| v.strip_suffix('}')) {
        return split_top_level(inner, ',')
            .iter()
            .map(|item| unquote(item))
            .collect::<Vec<_>>()
            .join(",");
    }
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn split_named_argument(part: &str) -> Option<(&str, &str)> {
    let mut in_string = false;
    for (i, ch) in part.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '=' if !in_string => {
                let key = part[..i].trim();
                let is_ident = !key.is_empty()
                    && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$');
                return is_ident.then(|| (key, part[i + 1..].trim()));
            }
            _ => {}
        }
    }
    None
}

struct AnnotationRun {
    annotations: Vec<String>,
    /// Nothing but annotations, whitespace and comments was seen.
    pure: bool,
}

/// Collects the trailing run of annotations in `text`. Any other token resets the run.
fn annotation_run(text: &str) -> AnnotationRun {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut annotations = Vec::new();
    let mut pure = true;
    let mut i = 0;

    while i < chars.len() {
        let (pos, ch) = chars[i];
        if ch.is_whitespace() {
            i += 1;
            continue;
        }
        if text[pos..].starts_with("//") {
            break;
        }
        if text[pos..].starts_with("/*") {
            match text[pos + 2..].find("*/") {
                Some(end) => {
                    let resume = pos + 2 + end + 2;
                    while i < chars.len() && chars[i].0 < resume {
                        i += 1;
                    }
                    continue;
                }
                None => break,
            }
        }
        if ch == '@' {
            let (annotation, next) = read_annotation(text, &chars, i);
            if let Some(annotation) = annotation {
                annotations.push(annotation);
                i = next;
                continue;
            }
        }
        pure = false;
        annotations.clear();
        i += 1;
        // Skip the rest of this token so identifiers do not restart a run mid-word.
        while i < chars.len() && !chars[i].1.is_whitespace() && chars[i].1 != '@' {
            i += 1;
        }
    }

    AnnotationRun { annotations, pure }
}

/// Reads `@Name` plus an optional balanced argument list starting at `chars[start]`.
fn read_annotation(text: &str, chars: &[(usize, char)], start: usize) -> (Option<String>, usize) {
    let mut i = start + 1;
    while i < chars.len() && (chars[i].1.is_alphanumeric() || matches!(chars[i].1, '_' | '$' | '.'))
    {
        i += 1;
    }
    if i == start + 1 {
        return (None, start + 1);
    }
    let name_end = byte_at(text, chars, i);
    let begin = chars[start].0;

    // Optional whitespace, then an argument list.
    let mut j = i;
    while j < chars.len() && chars[j].1.is_whitespace() {
        j += 1;
    }
    if j < chars.len() && chars[j].1 == '(' {
        let mut depth = 0;
        let mut in_string = false;
        let mut escape = false;
        let mut k = j;
        while k < chars.len() {
            let c = chars[k].1;
            if in_string {
                if escape {
                    escape = false;
                } else if c == '\\' {
                    escape = true;
                } else if c == '"' {
                    in_string = false;
                }
            } else if c == '"' {
                in_string = true;
            } else if c == '(' {
                depth += 1;
            } else if c == ')' {
                depth -= 1;
                if depth == 0 {
                    let end = byte_at(text, chars, k + 1);
                    let name = &text[begin..name_end];
                    let args = &text[chars[j].0..end];
                    return (Some(format!("{}{}", name, args)), k + 1);
                }
            }
            k += 1;
        }
        // Unbalanced: the arguments continue on a later line.
        return (Some(text[begin..].trim_end().to_string()), chars.len());
    }

    (Some(text[begin..name_end].to_string()), i)
}

fn byte_at(text: &str, chars: &[(usize, char)], index: usize) -> usize {
    chars.get(index).map_or(text.len(), |(pos, _)| *pos)
}

fn has_statement_boundary(prefix: &str) -> bool {
    statement_boundary(prefix).is_some()
}

fn after_statement_boundary(prefix: &str) -> &str {
    match statement_boundary(prefix) {
        Some(i) => &prefix[i + 1..],
        None => prefix,
    }
}

/// Last `{`, `}` or `;` outside parentheses and string literals.
fn statement_boundary(prefix: &str) -> Option<usize> {
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;
    let mut last = None;
    for (i, ch) in prefix.char_indices() {
        if in_string {
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => depth = (depth - 1).max(0),
            '{' | '}' | ';' if depth == 0 => last = Some(i),
            _ => {}
        }
    }
    last
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
