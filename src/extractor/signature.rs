// src/extractor/signature.rs
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PACKAGE_REGEX: Regex = Regex::new(r"(?m)^\s*package\s+([\w.]+)\s*;").unwrap();
    static ref IMPORT_REGEX: Regex =
        Regex::new(r"(?m)^\s*import\s+((?:static\s+)?[\w$.]+(?:\.\*)?)\s*;").unwrap();
    static ref CLASS_HEADER_REGEX: Regex = Regex::new(
        r"\b(?:(?:public|protected|private|abstract|final|static|strictfp)\s+)*class\s+([A-Za-z_$][\w$]*)(?:\s*<[^{]*?>)?(?:\s+extends\s+([\w$.]+(?:\s*<[^{]*?>)?))?(?:\s+implements\s+([^{]+?))?\s*\{"
    )
    .unwrap();
}

/// The first class declaration found in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub name: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    /// Byte offset where the declaration (modifiers included) starts.
    pub start: usize,
    /// Byte offset of the opening `{` of the class body.
    pub body_open: usize,
}

/// Returns the declared package, or an empty string in the default package.
pub fn extract_package(source: &str) -> String {
    PACKAGE_REGEX
        .captures(source)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// All import paths in source order, verbatim. Static imports keep their `static ` prefix.
pub fn extract_imports(source: &str) -> Vec<String> {
    IMPORT_REGEX
        .captures_iter(source)
        .filter_map(|c| c.get(1))
        .map(|m| collapse_whitespace(m.as_str()))
        .collect()
}

/// Finds the first class header. Later top-level classes in the same file are ignored.
pub fn extract_class_header(source: &str) -> Option<ClassHeader> {
    let caps = CLASS_HEADER_REGEX.captures(source)?;
    let whole = caps.get(0)?;
    let name = caps.get(1)?.as_str().to_string();
    let super_class = caps
        .get(2)
        .map(|m| strip_generics(m.as_str()))
        .filter(|s| !s.is_empty());
    let interfaces = caps
        .get(3)
        .map(|m| {
            split_top_level(m.as_str(), ',')
                .iter()
                .map(|part| strip_generics(part))
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Some(ClassHeader {
        name,
        super_class,
        interfaces,
        start: whole.start(),
        body_open: whole.end() - 1,
    })
}

/// `List<Foo>` -> `List`, `Foo[]` -> `Foo`, surrounding whitespace trimmed.
pub fn strip_generics(type_name: &str) -> String {
    let bare = type_name.split('<').next().unwrap_or(type_name);
    bare.trim().trim_end_matches("[]").trim().to_string()
}

/// Splits on `separator` outside of `<>`, `()`, `{}` and string literals.
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth: i32 = 0;
    let mut in_string = false;
    let mut escape = false;

    for ch in text.chars() {
        if in_string {
            current.push(ch);
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
            '"' => {
                in_string = true;
                current.push(ch);
            }
            '<' | '(' | '{' | '[' => {
                depth += 1;
                current.push(ch);
            }
            '>' | ')' | '}' | ']' => {
                depth = (depth - 1).max(0);
                current.push(ch);
            }
            c if c == separator && depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_and_imports() {
        let src = "package com.example.shop;\n\nimport java.util.List;\nimport static org.junit.Assert.assertEquals;\nimport com.example.model.*;\n\npublic class Cart {}\n";
        assert_eq!(extract_package(src), "com.example.shop");
        assert_eq!(
            extract_imports(src),
            vec![
                "java.util.List".to_string(),
                "static org.junit.Assert.assertEquals".to_string(),
                "com.example.model.*".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_package_is_empty() {
        assert_eq!(extract_package("public class Foo {}"), "");
    }

    #[test]
    fn test_class_header_with_extends_and_implements() {
        let src = "public abstract class OrderService extends BaseService<Order> implements Auditable, Comparable<OrderService> {\n}";
        let header = extract_class_header(src).expect("header");
        assert_eq!(header.name, "OrderService");
        assert_eq!(header.super_class.as_deref(), Some("BaseService"));
        assert_eq!(header.interfaces, vec!["Auditable", "Comparable"]);
        assert_eq!(header.start, 0);
        assert_eq!(&src[header.body_open..header.body_open + 1], "{");
    }

    #[test]
    fn test_generic_class_header() {
        let src = "class Box<T extends Comparable<T>> extends Container {}";
        let header = extract_class_header(src).expect("header");
        assert_eq!(header.name, "Box");
        assert_eq!(header.super_class.as_deref(), Some("Container"));
    }

    #[test]
    fn test_only_first_class_is_used() {
        let src = "class First {}\nclass Second extends First {}";
        let header = extract_class_header(src).expect("header");
        assert_eq!(header.name, "First");
        assert!(header.super_class.is_none());
    }

    #[test]
    fn test_interface_has_no_class_header() {
        assert!(extract_class_header("public interface Repo { void save(); }").is_none());
    }

    #[test]
    fn test_split_top_level_respects_generics() {
        let parts = split_top_level("Map<String, Integer> a, List<Foo> b", ',');
        assert_eq!(parts, vec!["Map<String, Integer> a", "List<Foo> b"]);
    }
}
