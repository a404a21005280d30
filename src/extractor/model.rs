// src/extractor/model.rs
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

// Kinds of edges between classes in the project graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationType {
    Extends,
    Implements,
    Calls,
    Injects,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Extends => "extends",
            RelationType::Implements => "implements",
            RelationType::Calls => "calls",
            RelationType::Injects => "injects",
        }
    }
}

/// A directed, typed edge between two simple class names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub from: String,
    pub to: String,
    pub kind: RelationType,
    /// Calling method name, only set for `calls` edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub via: Option<String>,
}

// Parameter in a method signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Parses a `RequestMethod.X` constant name. Case-insensitive.
    pub fn from_request_method(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Some(HttpMethod::Get),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            _ => None,
        }
    }
}

/// An HTTP route derived from request-mapping annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produces: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumes: Option<String>,
}

// Method definition recovered from a signature and its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRecord {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<MethodParam>,
    pub annotations: Vec<String>,
    pub visibility: String,
    pub is_static: bool,
    pub calls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<EndpointRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub visibility: String,
    pub is_static: bool,
    pub annotations: Vec<String>,
}

impl FieldRecord {
    /// True when one of the field's annotations has the given simple name.
    pub fn has_annotation(&self, simple_name: &str) -> bool {
        self.annotations
            .iter()
            .any(|a| super::annotations::annotation_name(a) == simple_name)
    }
}

/// An annotation from the recognized vocabulary with its parsed arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedAnnotation {
    /// Canonical name including the `@`, e.g. `@Service`.
    pub name: String,
    pub parameters: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatternType {
    Controller,
    RestController,
    Service,
    Repository,
    Component,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Layer {
    Presentation,
    Business,
    Data,
    Configuration,
    Component,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Presentation => "Presentation",
            Layer::Business => "Business",
            Layer::Data => "Data",
            Layer::Configuration => "Configuration",
            Layer::Component => "Component",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchitecturalPattern {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub description: String,
    pub layer: Layer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectedDependency {
    pub field_name: String,
    pub field_type: String,
    pub injection_type: String,
    pub annotation: String,
}

// Structural model of one source class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub name: String,
    pub file_path: String,
    pub package: String,
    pub imports: Vec<String>,
    pub methods: Vec<MethodRecord>,
    pub fields: Vec<FieldRecord>,
    pub annotations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub dependencies: Vec<String>,
    pub is_controller: bool,
    pub endpoints: Vec<EndpointRecord>,
    pub spring_annotations: Vec<RecognizedAnnotation>,
    pub architectural_patterns: Vec<ArchitecturalPattern>,
    pub injected_dependencies: Vec<InjectedDependency>,
}

impl ClassRecord {
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Package-qualified name, or the simple name in the default package.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.package, self.name)
        }
    }
}

/// The engine's output: every assembled class plus the derived edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectStructure {
    pub classes: Vec<ClassRecord>,
    pub relationships: Vec<RelationshipEdge>,
}

impl ProjectStructure {
    pub fn to_json(&self, pretty: bool) -> Result<String, serde_json::Error> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// First class with the given simple name.
    pub fn class_by_name(&self, name: &str) -> Option<&ClassRecord> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn edges_of_kind(&self, kind: RelationType) -> impl Iterator<Item = &RelationshipEdge> {
        self.relationships
            .iter()
            .filter(move |e| e.kind == kind)
    }

    pub fn edge_counts(&self) -> HashMap<RelationType, usize> {
        let mut counts = HashMap::new();
        for edge in &self.relationships {
            *counts.entry(edge.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Appends `item` unless already present. Keeps first-seen order.
pub(crate) fn push_unique(list: &mut Vec<String>, seen: &mut HashSet<String>, item: &str) {
    if seen.insert(item.to_string()) {
        list.push(item.to_string());
    }
}
