// src/extractor/spring.rs
use lazy_static::lazy_static;
use regex::Regex;

use super::annotations::{annotation_arguments, annotation_name, parse_annotation_arguments};
use super::model::{
    ArchitecturalPattern, EndpointRecord, HttpMethod, Layer, MethodRecord, PatternType,
    RecognizedAnnotation,
};

/// Annotation names recorded as recognized annotations.
pub const RECOGNIZED_ANNOTATIONS: &[&str] = &[
    "Controller",
    "RestController",
    "Service",
    "Repository",
    "Configuration",
    "Component",
    "Autowired",
    "Inject",
    "Resource",
    "Qualifier",
    "Value",
    "Bean",
    "Transactional",
    "RequestMapping",
    "GetMapping",
    "PostMapping",
    "PutMapping",
    "DeleteMapping",
    "PatchMapping",
];

/// Request-mapping annotations in lookup order.
const MAPPING_ANNOTATIONS: &[&str] = &[
    "RequestMapping",
    "GetMapping",
    "PostMapping",
    "PutMapping",
    "DeleteMapping",
    "PatchMapping",
];

lazy_static! {
    /// Path argument forms, tried in order; the first match wins.
    static ref PATH_PATTERNS: Vec<Regex> = vec![
        Regex::new(r#"\bvalue\s*=\s*"([^"]*)""#).unwrap(),
        Regex::new(r#"\bpath\s*=\s*"([^"]*)""#).unwrap(),
        Regex::new(r#"\bvalue\s*=\s*\{\s*"([^"]*)""#).unwrap(),
        Regex::new(r#"\bpath\s*=\s*\{\s*"([^"]*)""#).unwrap(),
        Regex::new(r#"^\s*\{?\s*"([^"]*)""#).unwrap(),
    ];
    static ref REQUEST_METHOD_REGEX: Regex =
        Regex::new(r"\bmethod\s*=\s*\{?\s*RequestMethod\.([A-Za-z]+)").unwrap();
    static ref PRODUCES_REGEX: Regex =
        Regex::new(r#"\bproduces\s*=\s*\{?\s*(?:"([^"]*)"|([\w$.]+))"#).unwrap();
    static ref CONSUMES_REGEX: Regex =
        Regex::new(r#"\bconsumes\s*=\s*\{?\s*(?:"([^"]*)"|([\w$.]+))"#).unwrap();
}

/// Stereotype lookup: annotation name -> (pattern, description, layer).
fn stereotype(name: &str) -> Option<(PatternType, &'static str, Layer)> {
    match name {
        "@Controller" => Some((
            PatternType::Controller,
            "MVC controller handling web requests",
            Layer::Presentation,
        )),
        "@RestController" => Some((
            PatternType::RestController,
            "REST controller exposing HTTP endpoints",
            Layer::Presentation,
        )),
        "@Service" => Some((
            PatternType::Service,
            "Service holding business logic",
            Layer::Business,
        )),
        "@Repository" => Some((
            PatternType::Repository,
            "Repository encapsulating data access",
            Layer::Data,
        )),
        "@Configuration" => Some((
            PatternType::Configuration,
            "Configuration class declaring beans",
            Layer::Configuration,
        )),
        "@Component" => Some((
            PatternType::Component,
            "Generic managed component",
            Layer::Component,
        )),
        _ => None,
    }
}

/// Keeps the annotations whose simple name is in the recognized vocabulary.
pub fn recognize_annotations<'a, I>(annotations: I) -> Vec<RecognizedAnnotation>
where
    I: IntoIterator<Item = &'a String>,
{
    annotations
        .into_iter()
        .filter_map(|raw| {
            let name = annotation_name(raw);
            RECOGNIZED_ANNOTATIONS
                .contains(&name)
                .then(|| RecognizedAnnotation {
                    name: format!("@{}", name),
                    parameters: parse_annotation_arguments(raw),
                })
        })
        .collect()
}

/// One pattern per stereotype annotation, in annotation order.
pub fn detect_patterns(recognized: &[RecognizedAnnotation]) -> Vec<ArchitecturalPattern> {
    recognized
        .iter()
        .filter_map(|ann| stereotype(&ann.name))
        .map(|(pattern_type, description, layer)| ArchitecturalPattern {
            pattern_type,
            description: description.to_string(),
            layer,
        })
        .collect()
}

/// True when the class annotations carry `@Controller` or `@RestController`.
pub fn is_request_handler(class_annotations: &[String]) -> bool {
    class_annotations
        .iter()
        .any(|a| matches!(annotation_name(a), "Controller" | "RestController"))
}

/// Class-level base path from `@RequestMapping`, if any.
pub fn base_path(class_annotations: &[String]) -> Option<String> {
    class_annotations
        .iter()
        .find(|a| annotation_name(a) == "RequestMapping")
        .and_then(|a| mapping_path(a))
}

/// Joins a base path and a method path with exactly one `/`.
/// Empty operands count as absent; two absent operands give `/`.
pub fn combine_path(base: Option<&str>, method: Option<&str>) -> String {
    let base = base.filter(|b| !b.is_empty());
    let method = method.filter(|m| !m.is_empty());
    match (base, method) {
        (None, None) => "/".to_string(),
        (Some(b), None) => b.to_string(),
        (None, Some(m)) => m.to_string(),
        (Some(b), Some(m)) => format!(
            "{}/{}",
            b.trim_end_matches('/'),
            m.trim_start_matches('/')
        ),
    }
}

/// Endpoint for a method of a request-handling class, from its first mapping annotation.
pub fn detect_endpoint(method: &MethodRecord, base: Option<&str>) -> Option<EndpointRecord> {
    let (mapping, verb_name) = method.annotations.iter().find_map(|a| {
        let name = annotation_name(a);
        MAPPING_ANNOTATIONS
            .contains(&name)
            .then_some((a.as_str(), name))
    })?;

    let http_method = match verb_name {
        "GetMapping" => HttpMethod::Get,
        "PostMapping" => HttpMethod::Post,
        "PutMapping" => HttpMethod::Put,
        "DeleteMapping" => HttpMethod::Delete,
        "PatchMapping" => HttpMethod::Patch,
        _ => REQUEST_METHOD_REGEX
            .captures(mapping)
            .and_then(|c| HttpMethod::from_request_method(&c[1]))
            .unwrap_or(HttpMethod::Get),
    };

    let method_path = mapping_path(mapping);
    Some(EndpointRecord {
        method: http_method,
        path: combine_path(base, method_path.as_deref()),
        produces: media_type(&PRODUCES_REGEX, mapping),
        consumes: media_type(&CONSUMES_REGEX, mapping),
    })
}

/// Path argument of a mapping annotation, first matching form wins.
fn mapping_path(raw: &str) -> Option<String> {
    let args = annotation_arguments(raw)?;
    PATH_PATTERNS
        .iter()
        .find_map(|re| re.captures(args))
        .map(|c| c[1].to_string())
}

fn media_type(re: &Regex, raw: &str) -> Option<String> {
    let caps = re.captures(raw)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str().to_string())
}
