// src/extractor/members.rs
use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::annotations::associate_annotations;
use super::body::scan_method_body;
use super::lexer::{SourceView, matching_paren};
use super::model::{FieldRecord, MethodParam, MethodRecord};
use super::signature::split_top_level;

lazy_static! {
    static ref FIELD_REGEX: Regex = Regex::new(
        r"\b(?:(public|private|protected)\s+)?((?:(?:static|final|transient|volatile)\s+)*)([A-Za-z_$][\w$.]*(?:\s*<[^;=(){}]*>)?(?:\s*\[\])*)\s+([A-Za-z_$][\w$]*)\s*(?:=[^;]*)?;"
    )
    .unwrap();
    /// Method header up to and including the `(` of its parameter list.
    static ref METHOD_REGEX: Regex = Regex::new(
        r"\b(?:(public|private|protected)\s+)?((?:(?:static|final|abstract|synchronized|native|default|strictfp)\s+)*)(?:<(?:[^<>]|<[^<>]*>)*>\s+)?([A-Za-z_$][\w$.]*(?:\s*<[^;=(){}]*>)?(?:\s*\[\])*)\s+([A-Za-z_$][\w$]*)\s*\("
    )
    .unwrap();
    /// What may sit between the closing `)` and the body's `{`.
    static ref BODY_OPEN_REGEX: Regex =
        Regex::new(r"^\s*(?:throws\s+[\w$.,<>\s]+?)?\s*\{").unwrap();
}

/// Words that can never be a declared type or member name.
const RESERVED: &[&str] = &[
    "abstract", "assert", "break", "case", "catch", "class", "continue", "default", "do", "else",
    "enum", "extends", "final", "finally", "goto", "implements", "import", "instanceof",
    "interface", "native", "new", "package", "private", "protected", "public", "return",
    "static", "strictfp", "super", "synchronized", "this", "throw", "throws", "transient", "try",
    "volatile", "yield",
];

pub const DEFAULT_VISIBILITY: &str = "package";

/// Where class members may appear: the brace depth of the class body and its byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberScope {
    pub depth: i32,
    pub start: usize,
    pub end: usize,
}

impl MemberScope {
    /// Scope of the body opened by the `{` at `body_open`. An unclosed body runs to end-of-file.
    pub fn for_body(view: &SourceView<'_>, body_open: usize) -> Self {
        Self {
            depth: view.braces.depth_at(body_open + 1),
            start: body_open + 1,
            end: view
                .braces
                .matching_close(body_open)
                .unwrap_or(view.masked.len()),
        }
    }

    fn admits(&self, view: &SourceView<'_>, offset: usize) -> bool {
        offset >= self.start && offset < self.end && view.braces.depth_at(offset) == self.depth
    }
}

/// A method signature with the offset of its body's opening brace.
#[derive(Debug, Clone)]
pub struct MethodMatch {
    pub record: MethodRecord,
    pub body_open: usize,
}

fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

/// True when the leading identifier of a type is a keyword, e.g. a modifier that
/// slipped into the type position.
pub(crate) fn starts_with_reserved(type_name: &str) -> bool {
    let end = type_name
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(type_name.len());
    is_reserved(&type_name[..end])
}

/// Parameter list text and body `{` offset for a header whose `(` is at `paren_open`.
/// `None` for declarations without a body.
pub(crate) fn parameters_and_body(masked: &str, paren_open: usize) -> Option<(&str, usize)> {
    let paren_close = matching_paren(masked, paren_open)?;
    let params = &masked[paren_open + 1..paren_close];
    let tail = BODY_OPEN_REGEX.find(&masked[paren_close + 1..])?;
    Some((params, paren_close + tail.end()))
}

fn visibility_of(caps: &Captures<'_>) -> String {
    caps.get(1)
        .map_or(DEFAULT_VISIBILITY, |m| m.as_str())
        .to_string()
}

fn has_modifier(caps: &Captures<'_>, modifier: &str) -> bool {
    caps.get(2)
        .is_some_and(|m| m.as_str().split_whitespace().any(|w| w == modifier))
}

/// Field declarations directly inside `scope`.
pub fn extract_fields(view: &SourceView<'_>, scope: &MemberScope) -> Vec<FieldRecord> {
    let mut fields = Vec::new();
    for caps in FIELD_REGEX.captures_iter(&view.masked) {
        let Some(whole) = caps.get(0) else { continue };
        if !scope.admits(view, whole.start()) {
            continue;
        }
        let field_type = normalize_type(&caps[3]);
        let name = caps[4].to_string();
        if is_reserved(&field_type) || is_reserved(&name) {
            continue;
        }
        fields.push(FieldRecord {
            name,
            field_type,
            visibility: visibility_of(&caps),
            is_static: has_modifier(&caps, "static"),
            annotations: associate_annotations(view.text, whole.start()),
        });
    }
    fields
}

/// Methods with a body directly inside `scope`, calls included.
/// Constructors and bodiless declarations are not matched.
pub fn extract_methods(view: &SourceView<'_>, scope: &MemberScope) -> Vec<MethodMatch> {
    let mut methods = Vec::new();
    for caps in METHOD_REGEX.captures_iter(&view.masked) {
        let Some(whole) = caps.get(0) else { continue };
        if !scope.admits(view, whole.start()) {
            continue;
        }
        let return_type = normalize_type(&caps[3]);
        let name = caps[4].to_string();
        if starts_with_reserved(&return_type) || is_reserved(&name) {
            continue;
        }
        let Some((params, body_open)) = parameters_and_body(&view.masked, whole.end() - 1) else {
            continue;
        };
        methods.push(MethodMatch {
            record: MethodRecord {
                name,
                return_type,
                parameters: parse_parameters(params),
                annotations: associate_annotations(view.text, whole.start()),
                visibility: visibility_of(&caps),
                is_static: has_modifier(&caps, "static"),
                calls: scan_method_body(view, body_open),
                endpoint: None,
            },
            body_open,
        });
    }
    methods
}

/// Splits a parameter list on top-level commas. Each parameter's last two tokens are
/// `(type, name)`; a lone token is a name of type `Object`.
pub fn parse_parameters(params: &str) -> Vec<MethodParam> {
    if params.trim().is_empty() {
        return Vec::new();
    }
    split_top_level(params, ',')
        .iter()
        .filter_map(|param| {
            let compact = normalize_type(param);
            let tokens: Vec<&str> = compact.split_whitespace().collect();
            match tokens.as_slice() {
                [] => None,
                [name] => Some(MethodParam {
                    name: name.to_string(),
                    param_type: "Object".to_string(),
                }),
                [.., param_type, name] => Some(MethodParam {
                    name: name.to_string(),
                    param_type: param_type.to_string(),
                }),
            }
        })
        .collect()
}

/// Collapses whitespace around generic brackets: `Map<String, Integer>` -> `Map<String,Integer>`.
fn normalize_type(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_space = false;
    for ch in raw.trim().chars() {
        if ch.is_whitespace() {
            pending_space = true;
            continue;
        }
        let joins = matches!(ch, '<' | '>' | ',' | '[' | ']')
            || out.ends_with(|c: char| c == '<' || c == ',');
        if pending_space && !joins && !out.is_empty() {
            out.push(' ');
        }
        pending_space = false;
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"package com.acme;

public class OrderService {
    private static final Logger log = LoggerFactory.getLogger(OrderService.class);

    @Autowired
    private OrderRepository repository;

    protected Map<String, List<Order>> cache = new HashMap<>();
    int counter;

    public OrderService() {
        init();
    }

    @Transactional
    public Order place(Order order, int qty) throws ValidationException {
        validate(order);
        String note = "skip(this)";
        if (qty > 0) {
            repository.save(order);
        }
        return order;
    }

    private static <T> List<T> wrap(T item) {
        return Collections.singletonList(item);
    }

    public abstract void hook();
}
"#;

    fn class_scope(view: &SourceView<'_>) -> MemberScope {
        let open = view.masked.find("{\n").unwrap();
        MemberScope::for_body(view, open)
    }

    #[test]
    fn test_field_pass() {
        let view = SourceView::new(SOURCE);
        let fields = extract_fields(&view, &class_scope(&view));
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["log", "repository", "cache", "counter"]);

        assert!(fields[0].is_static);
        assert_eq!(fields[0].visibility, "private");
        assert_eq!(fields[1].field_type, "OrderRepository");
        assert_eq!(fields[1].annotations, vec!["@Autowired"]);
        assert_eq!(fields[2].field_type, "Map<String,List<Order>>");
        assert_eq!(fields[3].visibility, DEFAULT_VISIBILITY);
    }

    #[test]
    fn test_method_pass() {
        let view = SourceView::new(SOURCE);
        let methods = extract_methods(&view, &class_scope(&view));
        let names: Vec<&str> = methods.iter().map(|m| m.record.name.as_str()).collect();
        // Constructor and the bodiless abstract method are not recognized.
        assert_eq!(names, vec!["place", "wrap"]);

        let place = &methods[0].record;
        assert_eq!(place.return_type, "Order");
        assert_eq!(place.annotations, vec!["@Transactional"]);
        assert_eq!(place.visibility, "public");
        assert_eq!(place.calls, vec!["validate", "save"]);
        assert_eq!(
            place.parameters,
            vec![
                MethodParam { name: "order".into(), param_type: "Order".into() },
                MethodParam { name: "qty".into(), param_type: "int".into() },
            ]
        );

        let wrap = &methods[1].record;
        assert!(wrap.is_static);
        assert_eq!(wrap.return_type, "List<T>");
        assert_eq!(wrap.calls, vec!["singletonList"]);
    }

    #[test]
    fn test_annotated_parameters_keep_the_method() {
        let src = r#"public class UserController {
    @GetMapping("/{id}")
    public User get(@PathVariable("id") Long id, @RequestParam(required = false, defaultValue = "a)b") String q) {
        return service.find(id);
    }

    @GetMapping("/all")
    public List<User> all() {
        return service.findAll();
    }
}
"#;
        let view = SourceView::new(src);
        let methods = extract_methods(&view, &class_scope(&view));
        let names: Vec<&str> = methods.iter().map(|m| m.record.name.as_str()).collect();
        assert_eq!(names, vec!["get", "all"]);

        let get = &methods[0].record;
        assert_eq!(
            get.parameters,
            vec![
                MethodParam { name: "id".into(), param_type: "Long".into() },
                MethodParam { name: "q".into(), param_type: "String".into() },
            ]
        );
        assert_eq!(get.calls, vec!["find"]);
        assert_eq!(get.annotations, vec![r#"@GetMapping("/{id}")"#]);
        assert_eq!(methods[1].record.calls, vec!["findAll"]);
    }

    #[test]
    fn test_bounded_type_parameters() {
        let src = r#"public class Sorting {
    private static <T extends Comparable<T>> List<T> sorted(List<T> xs) throws IllegalStateException {
        return xs;
    }

    public <K, V extends List<K>> V pick(K key) {
        return lookup(key);
    }
}
"#;
        let view = SourceView::new(src);
        let methods = extract_methods(&view, &class_scope(&view));
        let names: Vec<&str> = methods.iter().map(|m| m.record.name.as_str()).collect();
        assert_eq!(names, vec!["sorted", "pick"]);

        let sorted = &methods[0].record;
        assert_eq!(sorted.return_type, "List<T>");
        assert!(sorted.is_static);
        assert_eq!(sorted.visibility, "private");
        assert_eq!(sorted.parameters[0].param_type, "List<T>");

        let pick = &methods[1].record;
        assert_eq!(pick.return_type, "V");
        assert_eq!(pick.visibility, "public");
        assert!(!pick.is_static);
    }

    #[test]
    fn test_modifier_is_never_a_return_type() {
        assert!(starts_with_reserved("static"));
        assert!(starts_with_reserved("final<T>"));
        assert!(!starts_with_reserved("List<T>"));
        assert!(!starts_with_reserved("staticHelper"));
    }

    #[test]
    fn test_parameter_heuristics() {
        let params = parse_parameters("Map<String, Integer> counts, final String label, x");
        assert_eq!(params[0].param_type, "Map<String,Integer>");
        assert_eq!(params[0].name, "counts");
        assert_eq!(params[1].param_type, "String");
        assert_eq!(params[2].param_type, "Object");
        assert_eq!(params[2].name, "x");
        assert!(parse_parameters("  ").is_empty());
    }
}
