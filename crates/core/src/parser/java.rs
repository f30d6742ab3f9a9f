//! JVM-family parser using Tree-sitter
//!
//! Produces one module node per file plus class/interface nodes and their
//! method/field children. Spring-style annotations tag architectural layers;
//! a secondary regex scan catches the application annotation when the AST
//! pass misses it.

use super::{FileContext, ParseOutcome, SourceParser};
use crate::graph::{
    member_id, node_id, Edge, EdgeKind, Language, Layer, Node, NodeAttrs, NodeKind, Param,
};
use regex::Regex;
use tree_sitter::Parser;

/// Mutable state threaded through extraction
struct ExtractCtx<'a> {
    source: &'a str,
    rel: String,
    out: ParseOutcome,
    has_main: bool,
}

pub struct JavaParser {
    language: tree_sitter::Language,
    application_fallback: Regex,
}

impl Default for JavaParser {
    fn default() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
            application_fallback: Regex::new(r"@SpringBootApplication\b").unwrap(),
        }
    }
}

impl JavaParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn extract_class(
        &self,
        node: &tree_sitter::Node,
        ctx: &mut ExtractCtx,
        outer_id: Option<&str>,
    ) {
        let Some(name) = node_field_text(node, "name", ctx.source) else {
            return;
        };

        let class_id = match outer_id {
            Some(outer) => member_id(outer, NodeKind::Class, &name, None),
            None => node_id(&ctx.rel, NodeKind::Class, &name, None),
        };

        let mut attrs = NodeAttrs::default();

        // extends
        if let Some(superclass) = node.child_by_field_name("superclass") {
            let mut cursor = superclass.walk();
            for child in superclass.children(&mut cursor) {
                if matches!(
                    child.kind(),
                    "type_identifier" | "generic_type" | "scoped_type_identifier"
                ) {
                    if let Ok(text) = child.utf8_text(ctx.source.as_bytes()) {
                        attrs.base_classes.push(text.to_string());
                    }
                }
            }
        }

        // implements
        if let Some(interfaces) = node.child_by_field_name("interfaces") {
            collect_type_list(&interfaces, ctx.source, &mut attrs.base_classes);
        }

        let (annotations, visibility) = modifiers_of(node, ctx.source);
        let layer = spring_layer(&annotations);
        attrs.decorators = annotations;
        attrs.visibility = visibility;

        let mut class_node = Node::new(
            class_id.clone(),
            name,
            NodeKind::Class,
            Language::Java,
            ctx.rel.clone(),
            node.start_position().row + 1,
        )
        .with_end_line(node.end_position().row + 1)
        .with_attrs(attrs);
        if let Some(layer) = layer {
            class_node.layer = Some(layer);
        }
        if let Some(outer) = outer_id {
            class_node.parent = Some(outer.to_string());
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.extract_body_members(&body, ctx, &class_id);
        }

        if let Some(outer) = outer_id {
            ctx.out
                .edges
                .push(Edge::new(outer, class_id.clone(), EdgeKind::Contains));
        }
        ctx.out.nodes.push(class_node);
    }

    fn extract_interface(
        &self,
        node: &tree_sitter::Node,
        ctx: &mut ExtractCtx,
        outer_id: Option<&str>,
    ) {
        let Some(name) = node_field_text(node, "name", ctx.source) else {
            return;
        };

        let iface_id = match outer_id {
            Some(outer) => member_id(outer, NodeKind::Interface, &name, None),
            None => node_id(&ctx.rel, NodeKind::Interface, &name, None),
        };

        let mut attrs = NodeAttrs::default();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "extends_interfaces" {
                collect_type_list(&child, ctx.source, &mut attrs.base_classes);
            }
        }
        let (annotations, visibility) = modifiers_of(node, ctx.source);
        attrs.decorators = annotations;
        attrs.visibility = visibility;

        let mut iface_node = Node::new(
            iface_id.clone(),
            name,
            NodeKind::Interface,
            Language::Java,
            ctx.rel.clone(),
            node.start_position().row + 1,
        )
        .with_end_line(node.end_position().row + 1)
        .with_attrs(attrs);
        if let Some(outer) = outer_id {
            iface_node.parent = Some(outer.to_string());
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.extract_body_members(&body, ctx, &iface_id);
        }

        if let Some(outer) = outer_id {
            ctx.out
                .edges
                .push(Edge::new(outer, iface_id.clone(), EdgeKind::Contains));
        }
        ctx.out.nodes.push(iface_node);
    }

    fn extract_body_members(
        &self,
        body: &tree_sitter::Node,
        ctx: &mut ExtractCtx,
        owner_id: &str,
    ) {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            match child.kind() {
                "method_declaration" | "constructor_declaration" => {
                    self.extract_method(&child, ctx, owner_id);
                }
                "field_declaration" => {
                    self.extract_field(&child, ctx, owner_id);
                }
                "class_declaration" => {
                    self.extract_class(&child, ctx, Some(owner_id));
                }
                "interface_declaration" => {
                    self.extract_interface(&child, ctx, Some(owner_id));
                }
                _ => {}
            }
        }
    }

    fn extract_method(&self, node: &tree_sitter::Node, ctx: &mut ExtractCtx, owner_id: &str) {
        let Some(name) = node_field_text(node, "name", ctx.source) else {
            return;
        };
        let line = node.start_position().row + 1;
        let method_id = member_id(owner_id, NodeKind::Method, &name, Some(line));

        let (annotations, visibility) = modifiers_of(node, ctx.source);
        let is_static = has_modifier(node, ctx.source, "static");

        if name == "main" && is_static {
            ctx.has_main = true;
        }

        let attrs = NodeAttrs {
            parameters: extract_parameters(node, ctx.source),
            return_type: node_field_text(node, "type", ctx.source),
            is_static,
            visibility,
            decorators: annotations,
            ..Default::default()
        };

        let method_node = Node::new(
            method_id.clone(),
            name,
            NodeKind::Method,
            Language::Java,
            ctx.rel.clone(),
            line,
        )
        .with_end_line(node.end_position().row + 1)
        .with_parent(owner_id)
        .with_attrs(attrs);

        ctx.out
            .edges
            .push(Edge::new(owner_id, method_id, EdgeKind::Contains));
        ctx.out.nodes.push(method_node);
    }

    fn extract_field(&self, node: &tree_sitter::Node, ctx: &mut ExtractCtx, owner_id: &str) {
        let field_type = node_field_text(node, "type", ctx.source);
        let (annotations, visibility) = modifiers_of(node, ctx.source);

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = node_field_text(&child, "name", ctx.source) else {
                continue;
            };
            let field_id = member_id(owner_id, NodeKind::Field, &name, None);
            let attrs = NodeAttrs {
                return_type: field_type.clone(),
                is_static: has_modifier(node, ctx.source, "static"),
                visibility: visibility.clone(),
                decorators: annotations.clone(),
                ..Default::default()
            };
            let field_node = Node::new(
                field_id.clone(),
                name,
                NodeKind::Field,
                Language::Java,
                ctx.rel.clone(),
                node.start_position().row + 1,
            )
            .with_parent(owner_id)
            .with_attrs(attrs);

            ctx.out
                .edges
                .push(Edge::new(owner_id, field_id, EdgeKind::Contains));
            ctx.out.nodes.push(field_node);
        }
    }

    fn extract_import(&self, node: &tree_sitter::Node, ctx: &mut ExtractCtx, module_id: &str) {
        let mut literal = String::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            match child.kind() {
                "scoped_identifier" | "identifier" => {
                    if let Ok(text) = child.utf8_text(ctx.source.as_bytes()) {
                        literal = text.to_string();
                    }
                }
                "asterisk" => literal.push_str(".*"),
                _ => {}
            }
        }
        if literal.is_empty() {
            return;
        }

        let import_id = node_id(&ctx.rel, NodeKind::Import, &literal, None);
        let import_node = Node::new(
            import_id.clone(),
            literal.clone(),
            NodeKind::Import,
            Language::Java,
            ctx.rel.clone(),
            node.start_position().row + 1,
        )
        .with_parent(module_id);

        ctx.out
            .edges
            .push(Edge::new(module_id, import_id, EdgeKind::Contains));
        ctx.out.nodes.push(import_node);
        ctx.out.import_literals.push(literal);
    }
}

impl SourceParser for JavaParser {
    fn language(&self) -> Language {
        Language::Java
    }

    fn extensions(&self) -> &[&str] {
        &[".java"]
    }

    fn parse(&self, source: &str, file: &FileContext) -> ParseOutcome {
        let mut parser = Parser::new();
        if parser.set_language(&self.language).is_err() {
            return ParseOutcome::failed(&file.rel_path, "tree-sitter language mismatch");
        }
        let Some(tree) = parser.parse(source, None) else {
            return ParseOutcome::failed(&file.rel_path, "tree-sitter returned no tree");
        };

        let rel = file.rel_str();
        let module_id = super::module_id_for(&file.rel_path);
        let mut ctx = ExtractCtx {
            source,
            rel,
            out: ParseOutcome::default(),
            has_main: false,
        };

        let root = tree.root_node();
        let mut package = None;
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            match child.kind() {
                "package_declaration" => {
                    let mut pkg_cursor = child.walk();
                    for pkg_child in child.children(&mut pkg_cursor) {
                        if matches!(pkg_child.kind(), "scoped_identifier" | "identifier") {
                            if let Ok(text) = pkg_child.utf8_text(source.as_bytes()) {
                                package = Some(text.to_string());
                            }
                        }
                    }
                }
                "import_declaration" => self.extract_import(&child, &mut ctx, &module_id),
                "class_declaration" => self.extract_class(&child, &mut ctx, None),
                "interface_declaration" => self.extract_interface(&child, &mut ctx, None),
                _ => {}
            }
        }

        // Regex fallback: tag the application annotation even when the AST
        // pass produced no layered class (e.g. unparseable modifiers).
        let has_application = ctx
            .out
            .nodes
            .iter()
            .any(|n| n.layer == Some(Layer::Application));
        if !has_application && self.application_fallback.is_match(source) {
            if let Some(first_class) = ctx
                .out
                .nodes
                .iter_mut()
                .find(|n| n.kind == NodeKind::Class && n.parent.is_none())
            {
                first_class.layer = Some(Layer::Application);
            }
        }

        // Uses edges to base classes declared in the same file
        let declared: Vec<(String, String)> = ctx
            .out
            .nodes
            .iter()
            .filter(|n| matches!(n.kind, NodeKind::Class | NodeKind::Interface))
            .map(|n| (n.label.clone(), n.id.clone()))
            .collect();
        let mut uses = Vec::new();
        for node in ctx.out.nodes.iter().filter(|n| n.kind == NodeKind::Class) {
            for base in &node.attrs.base_classes {
                if let Some((_, base_id)) = declared.iter().find(|(label, id)| {
                    label == base && *id != node.id
                }) {
                    uses.push(Edge::new(node.id.clone(), base_id.clone(), EdgeKind::Uses));
                }
            }
        }
        ctx.out.edges.extend(uses);

        let is_application = self.application_fallback.is_match(source)
            || ctx
                .out
                .nodes
                .iter()
                .any(|n| n.layer == Some(Layer::Application));

        let mut module = Node::new(
            module_id,
            file.stem(),
            NodeKind::Module,
            Language::Java,
            ctx.rel.clone(),
            1,
        )
        .with_end_line(source.lines().count().max(1));
        if let Some(pkg) = package {
            module.attrs.description = Some(format!("package {}", pkg));
        }
        module.is_entry = ctx.has_main || is_application || file.is_entry_hint;
        ctx.out.nodes.push(module);

        ctx.out
    }
}

// ── Shared extraction helpers ────────────────────────────────────────────

fn node_field_text(node: &tree_sitter::Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(|s| s.to_string())
}

/// Annotations (without `@`) and visibility from a declaration's modifiers
fn modifiers_of(node: &tree_sitter::Node, source: &str) -> (Vec<String>, Option<String>) {
    let mut annotations = Vec::new();
    let mut visibility = None;

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "modifiers" {
            continue;
        }
        let mut mod_cursor = child.walk();
        for modifier in child.children(&mut mod_cursor) {
            match modifier.kind() {
                "annotation" | "marker_annotation" => {
                    if let Some(name) = node_field_text(&modifier, "name", source) {
                        annotations.push(name);
                    }
                }
                "public" | "private" | "protected" => {
                    if let Ok(text) = modifier.utf8_text(source.as_bytes()) {
                        visibility = Some(text.to_string());
                    }
                }
                _ => {}
            }
        }
    }

    (annotations, visibility)
}

fn has_modifier(node: &tree_sitter::Node, source: &str, keyword: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "modifiers" {
            if let Ok(text) = child.utf8_text(source.as_bytes()) {
                return text.split_whitespace().any(|tok| tok == keyword);
            }
        }
    }
    false
}

fn collect_type_list(node: &tree_sitter::Node, source: &str, into: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == "type_list" {
            let mut list_cursor = child.walk();
            for ty in child.children(&mut list_cursor) {
                if matches!(
                    ty.kind(),
                    "type_identifier" | "generic_type" | "scoped_type_identifier"
                ) {
                    if let Ok(text) = ty.utf8_text(source.as_bytes()) {
                        into.push(text.to_string());
                    }
                }
            }
        }
    }
}

fn extract_parameters(node: &tree_sitter::Node, source: &str) -> Vec<Param> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        if !matches!(child.kind(), "formal_parameter" | "spread_parameter") {
            continue;
        }
        let name = node_field_text(&child, "name", source);
        let param_type = node_field_text(&child, "type", source);
        if let Some(name) = name {
            out.push(Param {
                name,
                param_type,
                optional: false,
                default: None,
            });
        }
    }
    out
}

/// Map Spring-style annotations to an architectural layer
fn spring_layer(annotations: &[String]) -> Option<Layer> {
    for annotation in annotations {
        let name = annotation.rsplit('.').next().unwrap_or(annotation);
        let layer = match name {
            "SpringBootApplication" => Some(Layer::Application),
            "RestController" | "Controller" => Some(Layer::Controller),
            "Service" => Some(Layer::Service),
            "Repository" => Some(Layer::Repository),
            "Entity" => Some(Layer::Entity),
            "Component" => Some(Layer::Component),
            _ => None,
        };
        if layer.is_some() {
            return layer;
        }
    }
    None
}
