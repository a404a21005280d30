// src/extractor/graph.rs
use std::collections::HashMap;

use tracing::debug;

use super::model::{ClassRecord, ProjectStructure, RelationType, RelationshipEdge};

/// Field annotations that produce `injects` edges.
const INJECTING_ANNOTATIONS: &[&str] = &["Autowired", "Inject"];

/// Read-only lookup over the assembled classes, addressed by arena index.
pub struct ClassIndex<'a> {
    classes: &'a [ClassRecord],
    /// Method name -> index of the first class (in list order) declaring it.
    first_declaring: HashMap<&'a str, usize>,
}

impl<'a> ClassIndex<'a> {
    pub fn new(classes: &'a [ClassRecord]) -> Self {
        let mut first_declaring = HashMap::new();
        for (idx, class) in classes.iter().enumerate() {
            for method in &class.methods {
                first_declaring.entry(method.name.as_str()).or_insert(idx);
            }
        }
        Self {
            classes,
            first_declaring,
        }
    }

    /// The class a call to `method_name` resolves to.
    ///
    /// Equivalent to a linear search over the class list: when several classes declare a
    /// method with this name, the earliest one wins.
    pub fn resolve_call(&self, method_name: &str) -> Option<&'a ClassRecord> {
        self.first_declaring
            .get(method_name)
            .map(|&idx| &self.classes[idx])
    }
}

/// Derives every relationship edge. Must run after all classes have been assembled,
/// since call resolution searches the complete class list.
pub fn build_relationships(classes: &[ClassRecord]) -> Vec<RelationshipEdge> {
    let index = ClassIndex::new(classes);
    let mut edges = Vec::new();

    for class in classes {
        if let Some(super_class) = &class.super_class {
            edges.push(edge(class, super_class, RelationType::Extends, None));
        }

        for interface in &class.interfaces {
            edges.push(edge(class, interface, RelationType::Implements, None));
        }

        for method in &class.methods {
            for call in &method.calls {
                let Some(target) = index.resolve_call(call) else {
                    continue;
                };
                if target.name != class.name {
                    edges.push(edge(
                        class,
                        &target.name,
                        RelationType::Calls,
                        Some(&method.name),
                    ));
                }
            }
        }

        for field in &class.fields {
            if INJECTING_ANNOTATIONS.iter().any(|a| field.has_annotation(a)) {
                edges.push(edge(class, &field.field_type, RelationType::Injects, None));
            }
        }
    }

    debug!(
        "Built {} relationship edges across {} classes",
        edges.len(),
        classes.len()
    );
    edges
}

/// Assembles the final project structure from a complete class list.
pub fn build_project(classes: Vec<ClassRecord>) -> ProjectStructure {
    let relationships = build_relationships(&classes);
    ProjectStructure {
        classes,
        relationships,
    }
}

fn edge(
    from: &ClassRecord,
    to: &str,
    kind: RelationType,
    via: Option<&str>,
) -> RelationshipEdge {
    RelationshipEdge {
        from: from.name.clone(),
        to: to.to_string(),
        kind,
        via: via.map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::assembler::assemble_class;

    fn classes(sources: &[(&str, &str)]) -> Vec<ClassRecord> {
        sources
            .iter()
            .filter_map(|(path, src)| assemble_class(path, src))
            .collect()
    }

    #[test]
    fn test_extends_edge_is_one_directional() {
        let project = build_project(classes(&[
            ("A.java", "class A extends B {}"),
            ("B.java", "class B {}"),
        ]));
        let extends: Vec<_> = project.edges_of_kind(RelationType::Extends).collect();
        assert_eq!(extends.len(), 1);
        assert_eq!(extends[0].from, "A");
        assert_eq!(extends[0].to, "B");
        assert!(!project
            .relationships
            .iter()
            .any(|e| e.from == "B" && e.to == "A"));
    }

    #[test]
    fn test_dangling_edges_are_kept() {
        let project = build_project(classes(&[(
            "Job.java",
            "public class Job extends Thread implements Runnable, Closeable {}",
        )]));
        let kinds: Vec<(RelationType, &str)> = project
            .relationships
            .iter()
            .map(|e| (e.kind, e.to.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (RelationType::Extends, "Thread"),
                (RelationType::Implements, "Runnable"),
                (RelationType::Implements, "Closeable"),
            ]
        );
    }

    #[test]
    fn test_call_edges_use_first_declaring_class() {
        let project = build_project(classes(&[
            (
                "Caller.java",
                "public class Caller { public void run() { persist(); helper(); unknown(); } private void helper() {} }",
            ),
            ("StoreA.java", "public class StoreA { public void persist() {} }"),
            ("StoreB.java", "public class StoreB { public void persist() {} }"),
        ]));
        let calls: Vec<_> = project.edges_of_kind(RelationType::Calls).collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].from, "Caller");
        assert_eq!(calls[0].to, "StoreA");
        assert_eq!(calls[0].via.as_deref(), Some("run"));
    }

    #[test]
    fn test_self_resolution_emits_nothing() {
        // `helper` resolves to Caller itself first, even though Other declares it too.
        let project = build_project(classes(&[
            (
                "Caller.java",
                "public class Caller { public void run() { helper(); } void helper() {} }",
            ),
            ("Other.java", "public class Other { void helper() {} }"),
        ]));
        assert_eq!(project.edges_of_kind(RelationType::Calls).count(), 0);
    }

    #[test]
    fn test_injects_edges() {
        let project = build_project(classes(&[(
            "Foo.java",
            "public class Foo { @Autowired private BarService barService; @Inject Clock clock; @Resource Mailer mailer; private Cache cache; }",
        )]));
        let injects: Vec<&str> = project
            .edges_of_kind(RelationType::Injects)
            .map(|e| e.to.as_str())
            .collect();
        assert_eq!(injects, vec!["BarService", "Clock"]);
    }
}
