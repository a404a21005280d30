// src/extractor/mod.rs
//! Heuristic structural extraction for Java sources.
//!
//! Each file is reduced to one [`ClassRecord`] by lexical scanning; the
//! relationship graph is derived afterwards over the complete class list.
pub mod annotations;
pub mod assembler;
pub mod body;
pub mod dependencies;
pub mod graph;
pub mod lexer;
pub mod members;
pub mod model;
pub mod signature;
pub mod spring;

pub use self::assembler::assemble_class;
pub use self::graph::{build_project, build_relationships};
pub use self::model::{
    ArchitecturalPattern, ClassRecord, EndpointRecord, FieldRecord, HttpMethod,
    InjectedDependency, Layer, MethodParam, MethodRecord, PatternType, ProjectStructure,
    RecognizedAnnotation, RelationType, RelationshipEdge,
};
pub use self::spring::combine_path;

/// One input file: its path (used verbatim as `filePath`) and UTF-8 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }
}

/// Extracts every class and derives the relationship graph.
///
/// Files without a class header are left out. Class order follows input order.
pub fn analyze_sources(files: &[SourceFile]) -> ProjectStructure {
    let classes = files
        .iter()
        .filter_map(|file| assemble_class(&file.path, &file.text))
        .collect();
    build_project(classes)
}
