//! Integration tests for the JVM-family parser

use strata_core::parser::{java::JavaParser, FileContext, ParseOutcome, SourceParser};
use strata_core::{EdgeKind, Layer, NodeKind};

fn parse(source: &str) -> ParseOutcome {
    let parser = JavaParser::new();
    parser.parse(source, &FileContext::new("src/Test.java"))
}

#[test]
fn test_module_node_per_file() {
    let outcome = parse("package com.example;\n\npublic class Test {}\n");

    let module = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Module)
        .expect("module node");
    assert_eq!(module.id, "src/Test.java:module:Test");
    assert_eq!(module.label, "Test");
    assert_eq!(
        module.attrs.description.as_deref(),
        Some("package com.example")
    );
}

#[test]
fn test_class_with_methods_and_fields() {
    let source = r#"
package com.example;

public class Calculator {
    private int precision;

    public int add(int a, int b) {
        return a + b;
    }

    public static Calculator create() {
        return new Calculator();
    }
}
"#;
    let outcome = parse(source);

    let class = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Class)
        .expect("class node");
    assert_eq!(class.id, "src/Test.java:class:Calculator");
    assert_eq!(class.attrs.visibility.as_deref(), Some("public"));
    assert!(class.parent.is_none());

    let methods: Vec<_> = outcome
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Method)
        .collect();
    assert_eq!(methods.len(), 2);

    let add = methods.iter().find(|n| n.label == "add").unwrap();
    assert_eq!(add.parent.as_deref(), Some(class.id.as_str()));
    assert!(add.id.starts_with("src/Test.java:class:Calculator:method:add"));
    assert_eq!(add.attrs.parameters.len(), 2);
    assert_eq!(add.attrs.parameters[0].name, "a");
    assert_eq!(add.attrs.parameters[0].param_type.as_deref(), Some("int"));
    assert_eq!(add.attrs.return_type.as_deref(), Some("int"));

    let create = methods.iter().find(|n| n.label == "create").unwrap();
    assert!(create.attrs.is_static);

    let field = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Field)
        .expect("field node");
    assert_eq!(field.label, "precision");
    assert_eq!(field.parent.as_deref(), Some(class.id.as_str()));
    assert_eq!(field.attrs.visibility.as_deref(), Some("private"));

    // parser edges stay within the file and match parent links
    for edge in &outcome.edges {
        if edge.kind == EdgeKind::Contains {
            let child = outcome.nodes.iter().find(|n| n.id == edge.to);
            assert_eq!(
                child.and_then(|n| n.parent.as_deref()),
                Some(edge.from.as_str())
            );
        }
    }
}

#[test]
fn test_spring_annotations_tag_layers() {
    let controller = parse(
        "@RestController\npublic class UserController {\n    @GetMapping\n    public String list() { return \"\"; }\n}\n",
    );
    let class = controller
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Class)
        .unwrap();
    assert_eq!(class.layer, Some(Layer::Controller));
    assert!(class
        .attrs
        .decorators
        .contains(&"RestController".to_string()));

    let service = parse("@Service\npublic class UserService {}\n");
    assert_eq!(
        service
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Class)
            .unwrap()
            .layer,
        Some(Layer::Service)
    );

    let repository = parse("@Repository\npublic class UserRepository {}\n");
    assert_eq!(
        repository
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Class)
            .unwrap()
            .layer,
        Some(Layer::Repository)
    );

    let entity = parse("@Entity\npublic class User {}\n");
    assert_eq!(
        entity
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::Class)
            .unwrap()
            .layer,
        Some(Layer::Entity)
    );
}

#[test]
fn test_application_annotation_marks_entry() {
    let outcome = parse(
        "@SpringBootApplication\npublic class App {\n    public static void main(String[] args) {}\n}\n",
    );

    let class = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Class)
        .unwrap();
    assert_eq!(class.layer, Some(Layer::Application));

    let module = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Module)
        .unwrap();
    assert!(module.is_entry);
}

#[test]
fn test_imports_and_wildcards() {
    let source = "package a;\n\nimport java.util.List;\nimport com.example.util.*;\nimport com.example.UserService;\n\npublic class A {}\n";
    let outcome = parse(source);

    assert_eq!(
        outcome.import_literals,
        vec![
            "java.util.List".to_string(),
            "com.example.util.*".to_string(),
            "com.example.UserService".to_string(),
        ]
    );

    let imports: Vec<_> = outcome
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Import)
        .collect();
    assert_eq!(imports.len(), 3);
    // import nodes hang off the module node
    assert!(imports
        .iter()
        .all(|n| n.parent.as_deref() == Some("src/Test.java:module:Test")));
}

#[test]
fn test_interface_and_implements() {
    let source = r#"
public interface UserApi {
    String findUser(String id);
}
"#;
    let outcome = parse(source);

    let iface = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Interface)
        .expect("interface node");
    assert_eq!(iface.id, "src/Test.java:interface:UserApi");

    let method = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Method)
        .expect("interface method");
    assert_eq!(method.label, "findUser");
    assert_eq!(method.parent.as_deref(), Some(iface.id.as_str()));
}

#[test]
fn test_extends_and_same_file_uses_edge() {
    let source = r#"
public class Base {}

public class Derived extends Base {}
"#;
    let outcome = parse(source);

    let derived = outcome
        .nodes
        .iter()
        .find(|n| n.label == "Derived")
        .unwrap();
    assert_eq!(derived.attrs.base_classes, vec!["Base".to_string()]);

    assert!(outcome.edges.iter().any(|e| {
        e.kind == EdgeKind::Uses
            && e.from == "src/Test.java:class:Derived"
            && e.to == "src/Test.java:class:Base"
    }));
}

#[test]
fn test_nested_class_ids_encode_ownership() {
    let source = r#"
public class Outer {
    public class Inner {
        public void run() {}
    }
}
"#;
    let outcome = parse(source);

    let inner = outcome
        .nodes
        .iter()
        .find(|n| n.label == "Inner")
        .expect("nested class");
    assert_eq!(inner.id, "src/Test.java:class:Outer:class:Inner");
    assert_eq!(inner.parent.as_deref(), Some("src/Test.java:class:Outer"));

    let run = outcome.nodes.iter().find(|n| n.label == "run").unwrap();
    assert!(run.id.starts_with("src/Test.java:class:Outer:class:Inner:method:run"));
}

#[test]
fn test_overloads_get_distinct_ids() {
    let source = r#"
public class Person {
    public Person(String name) {}
    public Person(String name, int age) {}
}
"#;
    let outcome = parse(source);
    let ctor_ids: Vec<_> = outcome
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Method)
        .map(|n| n.id.as_str())
        .collect();
    assert_eq!(ctor_ids.len(), 2);
    assert_ne!(ctor_ids[0], ctor_ids[1]);
}

#[test]
fn test_unparseable_source_yields_empty_not_panic() {
    // tree-sitter is error-tolerant; garbage must never panic and the
    // module node is still emitted for the file
    let outcome = parse("%%% not java at all {{{");
    assert!(outcome.nodes.iter().any(|n| n.kind == NodeKind::Module));
}

#[test]
fn test_identical_source_produces_identical_ids() {
    let source = "@Service\npublic class Stable { public void go() {} }\n";
    let first: Vec<String> = parse(source).nodes.iter().map(|n| n.id.clone()).collect();
    let second: Vec<String> = parse(source).nodes.iter().map(|n| n.id.clone()).collect();
    assert_eq!(first, second);
}
