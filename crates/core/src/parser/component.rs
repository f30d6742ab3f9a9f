//! Browser-family parser using Tree-sitter
//!
//! Handles the component-oriented dialect and the plain scripting dialect
//! over the same JSX- and type-annotation-aware grammar, covering
//! `.ts/.tsx/.js/.jsx`. Detects function, arrow, and class components, and
//! switches to a framework-annotated strategy when the file carries
//! `@Component`/`@NgModule`-style decorators.

use super::{FileContext, ParseOutcome, SourceParser};
use crate::graph::{
    member_id, node_id, Edge, EdgeKind, Language, Layer, Node, NodeAttrs, NodeKind, Param,
};
use regex::Regex;
use std::path::Path;
use tree_sitter::Parser;

const GUARD_INTERFACES: &[&str] = &[
    "CanActivate",
    "CanActivateChild",
    "CanDeactivate",
    "CanLoad",
    "CanMatch",
    "Resolve",
];

struct ExtractCtx<'a> {
    source: &'a str,
    rel: String,
    language: Language,
    module_id: String,
    annotated: bool,
    out: ParseOutcome,
}

pub struct ComponentParser {
    language: tree_sitter::Language,
    annotated_sniff: Regex,
    bootstrap_sniff: Regex,
}

impl Default for ComponentParser {
    fn default() -> Self {
        Self {
            // The TSX grammar parses all four extensions; plain TS/JS files
            // simply contain no JSX nodes.
            language: tree_sitter_typescript::LANGUAGE_TSX.into(),
            annotated_sniff: Regex::new(r"@(Component|NgModule|Injectable|Directive|Pipe)\s*\(")
                .unwrap(),
            bootstrap_sniff: Regex::new(
                r"(ReactDOM\.render|createRoot|hydrateRoot|bootstrapModule|bootstrapApplication)\s*\(",
            )
            .unwrap(),
        }
    }
}

impl ComponentParser {
    pub fn new() -> Self {
        Self::default()
    }

    fn extract_top_level(&self, child: &tree_sitter::Node, ctx: &mut ExtractCtx) {
        match child.kind() {
            "import_statement" => self.extract_import(child, ctx),
            "export_statement" => self.extract_export(child, ctx),
            "function_declaration" => {
                self.extract_function(child, ctx, &[]);
            }
            "lexical_declaration" | "variable_declaration" => {
                self.extract_variable_declaration(child, ctx);
            }
            "class_declaration" | "abstract_class_declaration" => {
                let decorators = decorators_of(child, ctx.source);
                self.extract_class(child, ctx, &decorators);
            }
            "interface_declaration" => self.extract_interface(child, ctx),
            _ => {}
        }
    }

    /// Unwrap `export …` and recurse into the inner declaration;
    /// bare re-export clauses become Export nodes.
    fn extract_export(&self, node: &tree_sitter::Node, ctx: &mut ExtractCtx) {
        if let Some(declaration) = node.child_by_field_name("declaration") {
            match declaration.kind() {
                "function_declaration" => {
                    self.extract_function(&declaration, ctx, &[]);
                }
                "lexical_declaration" | "variable_declaration" => {
                    self.extract_variable_declaration(&declaration, ctx);
                }
                "class_declaration" | "abstract_class_declaration" => {
                    // Decorators of an exported class hang off the export
                    let mut decorators = decorators_of(node, ctx.source);
                    decorators.extend(decorators_of(&declaration, ctx.source));
                    self.extract_class(&declaration, ctx, &decorators);
                }
                "interface_declaration" => self.extract_interface(&declaration, ctx),
                _ => {}
            }
            return;
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() != "export_clause" {
                continue;
            }
            let mut clause_cursor = child.walk();
            for spec in child.children(&mut clause_cursor) {
                if spec.kind() != "export_specifier" {
                    continue;
                }
                let Some(name) = field_text(&spec, "name", ctx.source) else {
                    continue;
                };
                let export_id = node_id(&ctx.rel, NodeKind::Export, &name, None);
                if ctx.out.nodes.iter().any(|n| n.id == export_id) {
                    continue;
                }
                let export_node = Node::new(
                    export_id.clone(),
                    name,
                    NodeKind::Export,
                    ctx.language,
                    ctx.rel.clone(),
                    spec.start_position().row + 1,
                )
                .with_parent(&ctx.module_id);
                ctx.out.edges.push(Edge::new(
                    ctx.module_id.clone(),
                    export_id,
                    EdgeKind::Contains,
                ));
                ctx.out.nodes.push(export_node);
            }
        }
    }

    fn extract_import(&self, node: &tree_sitter::Node, ctx: &mut ExtractCtx) {
        let Some(source_node) = node.child_by_field_name("source") else {
            return;
        };
        let Ok(raw) = source_node.utf8_text(ctx.source.as_bytes()) else {
            return;
        };
        let literal = raw.trim_matches(|c| c == '"' || c == '\'' || c == '`').to_string();
        if literal.is_empty() {
            return;
        }

        let import_id = node_id(&ctx.rel, NodeKind::Import, &literal, None);
        if !ctx.out.nodes.iter().any(|n| n.id == import_id) {
            let import_node = Node::new(
                import_id.clone(),
                literal.clone(),
                NodeKind::Import,
                ctx.language,
                ctx.rel.clone(),
                node.start_position().row + 1,
            )
            .with_parent(&ctx.module_id);
            ctx.out.edges.push(Edge::new(
                ctx.module_id.clone(),
                import_id,
                EdgeKind::Contains,
            ));
            ctx.out.nodes.push(import_node);
        }
        ctx.out.import_literals.push(literal);
    }

    /// Extract a top-level function; becomes a component when any return
    /// statement transitively yields a JSX element.
    fn extract_function(
        &self,
        node: &tree_sitter::Node,
        ctx: &mut ExtractCtx,
        decorators: &[String],
    ) -> Option<String> {
        let name = field_text(node, "name", ctx.source)?;
        let line = node.start_position().row + 1;

        let is_component = node
            .child_by_field_name("body")
            .map(|body| returns_jsx(&body))
            .unwrap_or(false);
        let kind = if is_component {
            NodeKind::Component
        } else {
            NodeKind::Function
        };
        let id = match kind {
            NodeKind::Component => node_id(&ctx.rel, kind, &name, None),
            _ => node_id(&ctx.rel, kind, &name, Some(line)),
        };

        let attrs = NodeAttrs {
            parameters: extract_parameters(node, ctx.source),
            return_type: annotation_text(node, "return_type", ctx.source),
            is_async: has_keyword(node, "async"),
            decorators: decorators.to_vec(),
            ..Default::default()
        };

        let mut fn_node = Node::new(
            id.clone(),
            name,
            kind,
            ctx.language,
            ctx.rel.clone(),
            line,
        )
        .with_end_line(node.end_position().row + 1)
        .with_attrs(attrs);
        if is_component {
            fn_node.layer = Some(Layer::Component);
        }
        ctx.out.nodes.push(fn_node);
        Some(id)
    }

    /// `const X = () => <jsx/>` and friends
    fn extract_variable_declaration(&self, node: &tree_sitter::Node, ctx: &mut ExtractCtx) {
        let mut cursor = node.walk();
        for declarator in node.children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name) = field_text(&declarator, "name", ctx.source) else {
                continue;
            };
            let line = declarator.start_position().row + 1;

            let value = declarator.child_by_field_name("value");
            let (kind, is_component, attrs) = match value {
                Some(v) if matches!(v.kind(), "arrow_function" | "function_expression") => {
                    let is_component = arrow_yields_jsx(&v);
                    let attrs = NodeAttrs {
                        parameters: extract_parameters(&v, ctx.source),
                        return_type: annotation_text(&v, "return_type", ctx.source),
                        is_async: has_keyword(&v, "async"),
                        ..Default::default()
                    };
                    let kind = if is_component {
                        NodeKind::Component
                    } else {
                        NodeKind::Function
                    };
                    (kind, is_component, attrs)
                }
                _ => (
                    NodeKind::Field,
                    false,
                    NodeAttrs {
                        return_type: annotation_text(&declarator, "type", ctx.source),
                        ..Default::default()
                    },
                ),
            };

            let id = match kind {
                NodeKind::Function => node_id(&ctx.rel, kind, &name, Some(line)),
                _ => node_id(&ctx.rel, kind, &name, None),
            };
            let mut var_node = Node::new(
                id,
                name,
                kind,
                ctx.language,
                ctx.rel.clone(),
                line,
            )
            .with_end_line(declarator.end_position().row + 1)
            .with_attrs(attrs);
            if is_component {
                var_node.layer = Some(Layer::Component);
            }
            ctx.out.nodes.push(var_node);
        }
    }

    fn extract_class(
        &self,
        node: &tree_sitter::Node,
        ctx: &mut ExtractCtx,
        decorators: &[String],
    ) {
        let Some(name) = field_text(node, "name", ctx.source) else {
            return;
        };

        let bases = heritage_of(node, ctx.source);
        let implements = implements_of(node, ctx.source);

        let class_component = bases.iter().any(|b| b.ends_with("Component"));
        let annotated_layer = if ctx.annotated {
            framework_layer(decorators, &implements)
        } else {
            None
        };

        let kind = if class_component || annotated_layer == Some(Layer::Component) {
            NodeKind::Component
        } else {
            NodeKind::Class
        };
        let id = node_id(&ctx.rel, kind, &name, None);

        let mut attrs = NodeAttrs {
            decorators: decorators.to_vec(),
            base_classes: bases,
            ..Default::default()
        };
        attrs.base_classes.extend(implements);

        let mut class_node = Node::new(
            id.clone(),
            name,
            kind,
            ctx.language,
            ctx.rel.clone(),
            node.start_position().row + 1,
        )
        .with_end_line(node.end_position().row + 1)
        .with_attrs(attrs);
        class_node.layer = annotated_layer.or(if class_component {
            Some(Layer::Component)
        } else {
            None
        });

        if let Some(body) = node.child_by_field_name("body") {
            self.extract_class_members(&body, ctx, &id);
        }

        ctx.out.nodes.push(class_node);
    }

    fn extract_class_members(&self, body: &tree_sitter::Node, ctx: &mut ExtractCtx, owner: &str) {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            match child.kind() {
                "method_definition" => {
                    let Some(name) = field_text(&child, "name", ctx.source) else {
                        continue;
                    };
                    let line = child.start_position().row + 1;
                    let method_id = member_id(owner, NodeKind::Method, &name, Some(line));
                    let attrs = NodeAttrs {
                        parameters: extract_parameters(&child, ctx.source),
                        return_type: annotation_text(&child, "return_type", ctx.source),
                        is_async: has_keyword(&child, "async"),
                        is_static: has_keyword(&child, "static"),
                        decorators: decorators_of(&child, ctx.source),
                        ..Default::default()
                    };
                    let method_node = Node::new(
                        method_id.clone(),
                        name,
                        NodeKind::Method,
                        ctx.language,
                        ctx.rel.clone(),
                        line,
                    )
                    .with_end_line(child.end_position().row + 1)
                    .with_parent(owner)
                    .with_attrs(attrs);
                    ctx.out
                        .edges
                        .push(Edge::new(owner, method_id.clone(), EdgeKind::Contains));
                    ctx.out.nodes.push(method_node);

                    // Nested function declarations become children of the class
                    if let Some(method_body) = child.child_by_field_name("body") {
                        self.extract_nested_functions(&method_body, ctx, owner);
                    }
                }
                "public_field_definition" | "field_definition" => {
                    let Some(name) = field_text(&child, "name", ctx.source) else {
                        continue;
                    };
                    let field_id = member_id(owner, NodeKind::Field, &name, None);
                    let attrs = NodeAttrs {
                        return_type: annotation_text(&child, "type", ctx.source),
                        decorators: decorators_of(&child, ctx.source),
                        ..Default::default()
                    };
                    let field_node = Node::new(
                        field_id.clone(),
                        name,
                        NodeKind::Field,
                        ctx.language,
                        ctx.rel.clone(),
                        child.start_position().row + 1,
                    )
                    .with_parent(owner)
                    .with_attrs(attrs);
                    ctx.out
                        .edges
                        .push(Edge::new(owner, field_id, EdgeKind::Contains));
                    ctx.out.nodes.push(field_node);
                }
                _ => {}
            }
        }
    }

    fn extract_nested_functions(
        &self,
        body: &tree_sitter::Node,
        ctx: &mut ExtractCtx,
        owner: &str,
    ) {
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            if child.kind() == "function_declaration" {
                if let Some(name) = field_text(&child, "name", ctx.source) {
                    let line = child.start_position().row + 1;
                    let fn_id = member_id(owner, NodeKind::Function, &name, Some(line));
                    let fn_node = Node::new(
                        fn_id.clone(),
                        name,
                        NodeKind::Function,
                        ctx.language,
                        ctx.rel.clone(),
                        line,
                    )
                    .with_end_line(child.end_position().row + 1)
                    .with_parent(owner);
                    ctx.out
                        .edges
                        .push(Edge::new(owner, fn_id, EdgeKind::Contains));
                    ctx.out.nodes.push(fn_node);
                }
            } else if child.child_count() > 0 {
                self.extract_nested_functions(&child, ctx, owner);
            }
        }
    }

    fn extract_interface(&self, node: &tree_sitter::Node, ctx: &mut ExtractCtx) {
        let Some(name) = field_text(node, "name", ctx.source) else {
            return;
        };
        let id = node_id(&ctx.rel, NodeKind::Interface, &name, None);
        let iface = Node::new(
            id,
            name,
            NodeKind::Interface,
            ctx.language,
            ctx.rel.clone(),
            node.start_position().row + 1,
        )
        .with_end_line(node.end_position().row + 1);
        ctx.out.nodes.push(iface);
    }
}

impl SourceParser for ComponentParser {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extensions(&self) -> &[&str] {
        &[".ts", ".tsx", ".js", ".jsx"]
    }

    fn parse(&self, source: &str, file: &FileContext) -> ParseOutcome {
        let mut parser = Parser::new();
        if parser.set_language(&self.language).is_err() {
            return ParseOutcome::failed(&file.rel_path, "tree-sitter language mismatch");
        }
        let Some(tree) = parser.parse(source, None) else {
            return ParseOutcome::failed(&file.rel_path, "tree-sitter returned no tree");
        };

        let language = language_for(&file.rel_path);
        let mut ctx = ExtractCtx {
            source,
            rel: file.rel_str(),
            language,
            module_id: super::module_id_for(&file.rel_path),
            annotated: self.annotated_sniff.is_match(source),
            out: ParseOutcome::default(),
        };

        let root = tree.root_node();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            self.extract_top_level(&child, &mut ctx);
        }

        let has_bootstrap = self.bootstrap_sniff.is_match(source);
        let mut module = Node::new(
            ctx.module_id.clone(),
            file.stem(),
            NodeKind::Module,
            language,
            ctx.rel.clone(),
            1,
        )
        .with_end_line(source.lines().count().max(1));
        module.is_entry = has_bootstrap;
        ctx.out.nodes.push(module);

        ctx.out
    }
}

// ── Grammar helpers ──────────────────────────────────────────────────────

fn language_for(rel_path: &Path) -> Language {
    match rel_path.extension().and_then(|e| e.to_str()) {
        Some("js") | Some("jsx") => Language::JavaScript,
        _ => Language::TypeScript,
    }
}

fn field_text(node: &tree_sitter::Node, field: &str, source: &str) -> Option<String> {
    node.child_by_field_name(field)
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .map(|s| s.to_string())
}

/// Text of a type annotation field with the leading `:` stripped
fn annotation_text(node: &tree_sitter::Node, field: &str, source: &str) -> Option<String> {
    field_text(node, field, source)
        .map(|t| t.trim_start_matches(':').trim().to_string())
        .filter(|t| !t.is_empty())
}

fn has_keyword(node: &tree_sitter::Node, keyword: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == keyword);
    found
}

/// Decorator names (without `@` or arguments) attached to a node
fn decorators_of(node: &tree_sitter::Node, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "decorator" {
            continue;
        }
        let mut dec_cursor = child.walk();
        for inner in child.children(&mut dec_cursor) {
            match inner.kind() {
                "call_expression" => {
                    if let Some(name) = field_text(&inner, "function", source) {
                        out.push(name);
                    }
                }
                "identifier" | "member_expression" => {
                    if let Ok(text) = inner.utf8_text(source.as_bytes()) {
                        out.push(text.to_string());
                    }
                }
                _ => {}
            }
        }
    }
    out
}

fn extract_parameters(node: &tree_sitter::Node, source: &str) -> Vec<Param> {
    let Some(params) = node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for child in params.children(&mut cursor) {
        if !matches!(child.kind(), "required_parameter" | "optional_parameter") {
            continue;
        }
        let Some(name) = field_text(&child, "pattern", source) else {
            continue;
        };
        let param_type = annotation_text(&child, "type", source);
        let default = field_text(&child, "value", source);
        let optional = child.kind() == "optional_parameter" || default.is_some();
        out.push(Param {
            name,
            param_type,
            optional,
            default,
        });
    }
    out
}

/// Names in the extends clause
fn heritage_of(node: &tree_sitter::Node, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "class_heritage" {
            continue;
        }
        let mut heritage_cursor = child.walk();
        for clause in child.children(&mut heritage_cursor) {
            if clause.kind() != "extends_clause" {
                continue;
            }
            let mut clause_cursor = clause.walk();
            for expr in clause.children(&mut clause_cursor) {
                if matches!(
                    expr.kind(),
                    "identifier" | "member_expression" | "generic_type"
                ) {
                    if let Ok(text) = expr.utf8_text(source.as_bytes()) {
                        out.push(text.to_string());
                    }
                }
            }
        }
    }
    out
}

/// Type names in the implements clause
fn implements_of(node: &tree_sitter::Node, source: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() != "class_heritage" {
            continue;
        }
        let mut heritage_cursor = child.walk();
        for clause in child.children(&mut heritage_cursor) {
            if clause.kind() != "implements_clause" {
                continue;
            }
            let mut clause_cursor = clause.walk();
            for ty in clause.children(&mut clause_cursor) {
                if matches!(ty.kind(), "type_identifier" | "generic_type") {
                    if let Ok(text) = ty.utf8_text(source.as_bytes()) {
                        out.push(text.to_string());
                    }
                }
            }
        }
    }
    out
}

/// Does any return statement in this body yield JSX (searching through
/// nested expressions but not nested function bodies)?
fn returns_jsx(body: &tree_sitter::Node) -> bool {
    let mut cursor = body.walk();
    for child in body.children(&mut cursor) {
        match child.kind() {
            "return_statement" => {
                if subtree_has_jsx(&child) {
                    return true;
                }
            }
            "arrow_function" | "function_expression" | "function_declaration" => {}
            _ => {
                if returns_jsx(&child) {
                    return true;
                }
            }
        }
    }
    false
}

fn arrow_yields_jsx(arrow: &tree_sitter::Node) -> bool {
    match arrow.child_by_field_name("body") {
        Some(body) if body.kind() == "statement_block" => returns_jsx(&body),
        Some(expr) => subtree_has_jsx(&expr),
        None => false,
    }
}

fn subtree_has_jsx(node: &tree_sitter::Node) -> bool {
    if matches!(
        node.kind(),
        "jsx_element" | "jsx_self_closing_element" | "jsx_fragment"
    ) {
        return true;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if subtree_has_jsx(&child) {
            return true;
        }
    }
    false
}

/// Layer from framework decorators, with guard interfaces taking priority
fn framework_layer(decorators: &[String], implements: &[String]) -> Option<Layer> {
    let implements_guard = implements.iter().any(|i| {
        let base = i.split('<').next().unwrap_or(i);
        GUARD_INTERFACES.contains(&base)
    });
    if implements_guard {
        return Some(Layer::Guard);
    }

    for decorator in decorators {
        let name = decorator.rsplit('.').next().unwrap_or(decorator);
        let layer = match name {
            "Component" => Some(Layer::Component),
            "NgModule" => Some(Layer::Module),
            "Injectable" => Some(Layer::Service),
            "Directive" => Some(Layer::Directive),
            "Pipe" => Some(Layer::Pipe),
            _ => None,
        };
        if layer.is_some() {
            return layer;
        }
    }
    None
}
