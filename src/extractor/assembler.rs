// src/extractor/assembler.rs
use tracing::debug;

use super::annotations::{annotation_name, associate_annotations};
use super::dependencies::infer_dependencies;
use super::lexer::SourceView;
use super::members::{MemberScope, extract_fields, extract_methods};
use super::model::{ClassRecord, FieldRecord, InjectedDependency};
use super::signature::{extract_class_header, extract_imports, extract_package};
use super::spring::{
    base_path, detect_endpoint, detect_patterns, is_request_handler, recognize_annotations,
};

/// Field annotations that mark a field as injected.
const FIELD_INJECTION_ANNOTATIONS: &[&str] = &["Autowired", "Inject", "Resource"];

/// Builds the structural record for one file.
///
/// Returns `None` when the text holds no class header, e.g. a file that only
/// declares an interface or an enum. That is a normal outcome, not an error.
/// Only the first class in the file is modelled.
pub fn assemble_class(file_path: &str, source: &str) -> Option<ClassRecord> {
    let view = SourceView::new(source);
    let header = extract_class_header(&view.masked)?;

    let package = extract_package(&view.masked);
    let imports = extract_imports(&view.masked);
    let annotations = associate_annotations(view.text, header.start);

    let scope = MemberScope::for_body(&view, header.body_open);
    let fields = extract_fields(&view, &scope);
    let mut methods: Vec<_> = extract_methods(&view, &scope)
        .into_iter()
        .map(|m| m.record)
        .collect();

    let dependencies = infer_dependencies(&view.masked, &imports);

    let spring_annotations = recognize_annotations(
        annotations
            .iter()
            .chain(fields.iter().flat_map(|f| f.annotations.iter()))
            .chain(methods.iter().flat_map(|m| m.annotations.iter())),
    );
    let architectural_patterns = detect_patterns(&spring_annotations);

    let is_controller = is_request_handler(&annotations);
    let mut endpoints = Vec::new();
    if is_controller {
        let base = base_path(&annotations);
        for method in methods.iter_mut() {
            method.endpoint = detect_endpoint(method, base.as_deref());
            if let Some(endpoint) = &method.endpoint {
                endpoints.push(endpoint.clone());
            }
        }
    }

    let injected_dependencies = field_injections(&fields);

    debug!(
        "Assembled class {} from {}: {} methods, {} fields, {} endpoints",
        header.name,
        file_path,
        methods.len(),
        fields.len(),
        endpoints.len()
    );

    Some(ClassRecord {
        name: header.name,
        file_path: file_path.to_string(),
        package,
        imports,
        methods,
        fields,
        annotations,
        super_class: header.super_class,
        interfaces: header.interfaces,
        dependencies,
        is_controller,
        endpoints,
        spring_annotations,
        architectural_patterns,
        injected_dependencies,
    })
}

fn field_injections(fields: &[FieldRecord]) -> Vec<InjectedDependency> {
    fields
        .iter()
        .filter_map(|field| {
            let marker = field
                .annotations
                .iter()
                .map(|a| annotation_name(a))
                .find(|name| FIELD_INJECTION_ANNOTATIONS.contains(name))?;
            Some(InjectedDependency {
                field_name: field.name.clone(),
                field_type: field.field_type.clone(),
                injection_type: "field".to_string(),
                annotation: format!("@{}", marker),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::model::{HttpMethod, Layer, PatternType};

    #[test]
    fn test_rest_controller_single_line() {
        let src = r#"@RestController @RequestMapping("/api") public class Foo { @GetMapping("/bar") public String baz(){ return null; } }"#;
        let class = assemble_class("Foo.java", src).expect("class");
        assert_eq!(class.name, "Foo");
        assert!(class.is_controller);
        assert_eq!(class.architectural_patterns.len(), 1);
        assert_eq!(
            class.architectural_patterns[0].pattern_type,
            PatternType::RestController
        );
        assert_eq!(class.architectural_patterns[0].layer, Layer::Presentation);
        assert_eq!(class.endpoints.len(), 1);
        assert_eq!(class.endpoints[0].method, HttpMethod::Get);
        assert_eq!(class.endpoints[0].path, "/api/bar");
        assert_eq!(class.methods[0].endpoint.as_ref(), Some(&class.endpoints[0]));
    }

    #[test]
    fn test_field_injection() {
        let src = "public class Foo { @Autowired private BarService barService; }";
        let class = assemble_class("Foo.java", src).expect("class");
        assert_eq!(class.injected_dependencies.len(), 1);
        let injected = &class.injected_dependencies[0];
        assert_eq!(injected.field_name, "barService");
        assert_eq!(injected.field_type, "BarService");
        assert_eq!(injected.injection_type, "field");
        assert_eq!(injected.annotation, "@Autowired");
        assert!(class.dependencies.contains(&"BarService".to_string()));
    }

    #[test]
    fn test_interface_only_file_is_absent() {
        let src = "package a;\npublic interface Greeter { String greet(String who); }";
        assert!(assemble_class("Greeter.java", src).is_none());
    }

    #[test]
    fn test_class_keyword_in_comment_is_ignored() {
        let src = "// this class is generated\npublic enum Color { RED, GREEN }";
        assert!(assemble_class("Color.java", src).is_none());
    }

    #[test]
    fn test_full_class() {
        let src = r#"package com.acme.web;

import com.acme.service.OrderService;
import java.util.List;

/**
 * Order endpoints.
 */
@Controller
@RequestMapping(path = "/orders/")
public class OrderController extends BaseController implements Auditable {

    @Autowired
    private OrderService orderService;

    @Inject
    protected AuditLog auditLog;

    @PostMapping(value = "/{id}/cancel")
    public String cancel(Long id) {
        orderService.cancel(id);
        auditLog.record("cancel");
        return "redirect:/orders";
    }

    @RequestMapping(value = "/search", method = RequestMethod.PUT)
    public List<Order> search(String query) {
        return orderService.find(query);
    }

    private void helper() {
        for (int i = 0; i < 3; i++) {
            tick();
        }
    }
}

class Secondary {
    public void ignored() {}
}
"#;
        let class = assemble_class("src/OrderController.java", src).expect("class");
        assert_eq!(class.file_path, "src/OrderController.java");
        assert_eq!(class.package, "com.acme.web");
        assert_eq!(class.imports.len(), 2);
        assert_eq!(class.annotations, vec!["@Controller", "@RequestMapping(path = \"/orders/\")"]);
        assert_eq!(class.super_class.as_deref(), Some("BaseController"));
        assert_eq!(class.interfaces, vec!["Auditable"]);

        let method_names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(method_names, vec!["cancel", "search", "helper"]);
        assert_eq!(class.methods[0].calls, vec!["cancel", "record"]);
        assert_eq!(class.methods[2].calls, vec!["tick"]);
        assert_eq!(class.methods[2].visibility, "private");

        let paths: Vec<(HttpMethod, &str)> = class
            .endpoints
            .iter()
            .map(|e| (e.method, e.path.as_str()))
            .collect();
        assert_eq!(
            paths,
            vec![
                (HttpMethod::Post, "/orders/{id}/cancel"),
                (HttpMethod::Put, "/orders/search"),
            ]
        );
        assert!(class.methods[2].endpoint.is_none());

        let injected: Vec<&str> = class
            .injected_dependencies
            .iter()
            .map(|d| d.annotation.as_str())
            .collect();
        assert_eq!(injected, vec!["@Autowired", "@Inject"]);

        let names: Vec<&str> = class.spring_annotations.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["@Controller", "@RequestMapping", "@Autowired", "@Inject", "@PostMapping", "@RequestMapping"]
        );
        assert_eq!(class.architectural_patterns.len(), 1);
        assert_eq!(class.architectural_patterns[0].pattern_type, PatternType::Controller);
    }

    #[test]
    fn test_plain_class_has_no_patterns_or_endpoints() {
        let src = "public class Util { public static int twice(int x) { return x * 2; } }";
        let class = assemble_class("Util.java", src).expect("class");
        assert!(class.architectural_patterns.is_empty());
        assert!(class.endpoints.is_empty());
        assert!(!class.is_controller);
        assert!(class.methods[0].is_static);
    }
}
