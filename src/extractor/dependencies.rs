// src/extractor/dependencies.rs
use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use super::lexer::matching_paren;
use super::members::{parse_parameters, starts_with_reserved};
use super::model::push_unique;
use super::signature::strip_generics;

/// Annotation names whose mere presence is recorded as a dependency.
pub const DI_ANNOTATIONS: &[&str] = &[
    "Autowired",
    "Inject",
    "Resource",
    "Component",
    "Service",
    "Repository",
    "Controller",
    "RestController",
    "Configuration",
    "Bean",
    "Qualifier",
    "Value",
];

/// Primitive, wrapper and ubiquitous JDK types that never count as dependencies.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "boolean", "byte", "char", "short", "int", "long", "float", "double", "void", "Boolean",
    "Byte", "Character", "Short", "Integer", "Long", "Float", "Double", "Void", "String",
    "Object",
];

lazy_static! {
    static ref ANNOTATION_PRESENCE_REGEX: Regex = Regex::new(r"@([A-Za-z_$][\w$]*)\b").unwrap();
    static ref INJECTED_TYPE_REGEX: Regex = Regex::new(
        r"@(?:Autowired|Inject)\s+(?:(?:private|protected|public)\s+)?(?:final\s+)?([A-Za-z_$][\w$.]*)"
    )
    .unwrap();
    static ref FIELD_TYPE_REGEX: Regex = Regex::new(
        r"\b(?:private|protected|public)\s+(?:static\s+)?(?:final\s+)?([A-Za-z_$][\w$.]*(?:<[^;=(){}]*>)?(?:\[\])*)\s+[A-Za-z_$][\w$]*\s*[;=]"
    )
    .unwrap();
    static ref SIGNATURE_REGEX: Regex = Regex::new(
        r"\b(?:(?:public|private|protected|static|final|abstract|synchronized|default)\s+)+(?:<(?:[^<>]|<[^<>]*>)*>\s+)?([A-Za-z_$][\w$.]*(?:<[^;=(){}]*>)?(?:\[\])*)\s+[A-Za-z_$][\w$]*\s*\("
    )
    .unwrap();
}

pub fn is_primitive(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name)
}

fn add_type(deps: &mut Vec<String>, seen: &mut HashSet<String>, raw: &str) {
    let bare = strip_generics(raw);
    if !bare.is_empty() && !is_primitive(&bare) {
        push_unique(deps, seen, &bare);
    }
}

/// Candidate dependency names for one file, deduplicated in first-seen order.
///
/// The result favours recall: anything a class merely references ends up here,
/// including both the simple and the dotted form of every plain import.
pub fn infer_dependencies(masked_source: &str, imports: &[String]) -> Vec<String> {
    let mut deps = Vec::new();
    let mut seen = HashSet::new();

    // 1. DI and stereotype annotations by presence.
    let present: HashSet<&str> = ANNOTATION_PRESENCE_REGEX
        .captures_iter(masked_source)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect();
    for name in DI_ANNOTATIONS {
        if present.contains(name) {
            push_unique(&mut deps, &mut seen, name);
        }
    }

    // 2. Type following a field-injection annotation.
    for caps in INJECTED_TYPE_REGEX.captures_iter(masked_source) {
        add_type(&mut deps, &mut seen, &caps[1]);
    }

    // 3. Field types.
    for caps in FIELD_TYPE_REGEX.captures_iter(masked_source) {
        add_type(&mut deps, &mut seen, &caps[1]);
    }

    // 4 + 5. Parameter and return types of every signature.
    let mut return_types = Vec::new();
    for caps in SIGNATURE_REGEX.captures_iter(masked_source) {
        let Some(whole) = caps.get(0) else { continue };
        if starts_with_reserved(&caps[1]) {
            continue;
        }
        let paren_open = whole.end() - 1;
        let Some(paren_close) = matching_paren(masked_source, paren_open) else {
            continue;
        };
        for param in parse_parameters(&masked_source[paren_open + 1..paren_close]) {
            add_type(&mut deps, &mut seen, &param.param_type);
        }
        return_types.push(caps[1].to_string());
    }
    for return_type in &return_types {
        add_type(&mut deps, &mut seen, return_type);
    }

    // 6. Plain imports, simple and dotted.
    for import in imports {
        if import.starts_with("static ") || import.ends_with(".*") {
            continue;
        }
        if let Some(simple) = import.rsplit('.').next() {
            push_unique(&mut deps, &mut seen, simple);
        }
        push_unique(&mut deps, &mut seen, import);
    }

    deps
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"
@Service
public class InvoiceService {
    @Autowired
    private CustomerRepository customers;
    private final List<Invoice> drafts = new ArrayList<>();
    private int retries;

    public Optional<Invoice> find(Long id, InvoiceQuery query) {
        return Optional.empty();
    }

    public void send(Invoice invoice) {
    }
}
"#;

    fn imports() -> Vec<String> {
        vec![
            "com.acme.repo.CustomerRepository".to_string(),
            "java.util.*".to_string(),
            "static java.util.Objects.requireNonNull".to_string(),
            "com.acme.mail.Mailer".to_string(),
        ]
    }

    #[test]
    fn test_all_sources_are_merged() {
        let deps = infer_dependencies(SOURCE, &imports());
        for expected in [
            "Service",
            "Autowired",
            "CustomerRepository",
            "List",
            "InvoiceQuery",
            "Invoice",
            "Optional",
            "Mailer",
            "com.acme.mail.Mailer",
            "com.acme.repo.CustomerRepository",
        ] {
            assert!(deps.contains(&expected.to_string()), "missing {expected}: {deps:?}");
        }
        assert_eq!(deps[0], "Autowired");
        assert_eq!(deps[1], "Service");
    }

    #[test]
    fn test_primitives_and_wildcards_are_filtered() {
        let deps = infer_dependencies(SOURCE, &imports());
        for rejected in ["int", "Long", "void", "java.util.*", "*", "requireNonNull"] {
            assert!(!deps.contains(&rejected.to_string()), "unexpected {rejected}");
        }
    }

    #[test]
    fn test_annotated_and_generic_signatures() {
        let source = r#"
public class Lookup {
    public static <T extends Comparable<T>> List<T> sorted(List<T> xs) { return xs; }
    public Customer byId(@PathVariable("  ") CustomerId id, @RequestParam(required = false) Region region) { return null; }
}
"#;
        let deps = infer_dependencies(source, &[]);
        for expected in ["List", "Customer", "CustomerId", "Region"] {
            assert!(deps.contains(&expected.to_string()), "missing {expected}: {deps:?}");
        }
        for rejected in ["static", "public"] {
            assert!(!deps.contains(&rejected.to_string()), "unexpected {rejected}: {deps:?}");
        }
    }

    #[test]
    fn test_no_duplicates() {
        let deps = infer_dependencies(SOURCE, &imports());
        let unique: HashSet<&String> = deps.iter().collect();
        assert_eq!(unique.len(), deps.len());
    }
}
