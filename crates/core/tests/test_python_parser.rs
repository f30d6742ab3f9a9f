//! Integration tests for the scripting-family parser (indentation state
//! machine, no AST)

use strata_core::parser::{python::PythonParser, FileContext, ParseOutcome, SourceParser};
use strata_core::{EdgeKind, Layer, NodeKind};

fn parse_at(source: &str, rel: &str) -> ParseOutcome {
    let parser = PythonParser::new();
    parser.parse(source, &FileContext::new(rel))
}

fn parse(source: &str) -> ParseOutcome {
    parse_at(source, "pkg/service.py")
}

#[test]
fn test_class_with_methods_and_docstrings() {
    let source = r#"
class UserStore:
    """Keeps users in memory."""

    def add(self, user_id: str, name: str = "anon") -> bool:
        """Insert one user."""
        return True

    def remove(self, user_id):
        return False


def top_level(count: int):
    pass
"#;
    let outcome = parse(source);

    let class = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Class)
        .expect("class node");
    assert_eq!(class.label, "UserStore");
    assert_eq!(class.id, "pkg/service.py:class:UserStore");
    assert_eq!(
        class.attrs.docstring.as_deref(),
        Some("Keeps users in memory.")
    );
    assert!(class.parent.is_none());

    let add = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Method && n.label == "add")
        .expect("method node");
    assert_eq!(add.parent.as_deref(), Some(class.id.as_str()));
    assert_eq!(add.attrs.docstring.as_deref(), Some("Insert one user."));
    assert_eq!(add.attrs.return_type.as_deref(), Some("bool"));

    // self is skipped; name has a type and a default
    assert_eq!(add.attrs.parameters.len(), 2);
    assert_eq!(add.attrs.parameters[0].name, "user_id");
    assert_eq!(add.attrs.parameters[0].param_type.as_deref(), Some("str"));
    assert!(!add.attrs.parameters[0].optional);
    assert_eq!(add.attrs.parameters[1].name, "name");
    assert_eq!(add.attrs.parameters[1].default.as_deref(), Some("\"anon\""));
    assert!(add.attrs.parameters[1].optional);

    // dedent closes the class frame: top_level is a function, not a method
    let top = outcome
        .nodes
        .iter()
        .find(|n| n.label == "top_level")
        .unwrap();
    assert_eq!(top.kind, NodeKind::Function);
    assert!(top.parent.is_none());
}

#[test]
fn test_multi_line_signature() {
    let source = r#"
def create_user(
    name: str,
    email: str,
    active: bool = True,
) -> dict:
    return {}
"#;
    let outcome = parse(source);

    let func = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Function)
        .expect("function parsed across lines");
    assert_eq!(func.label, "create_user");
    assert_eq!(func.attrs.return_type.as_deref(), Some("dict"));
    assert_eq!(func.attrs.parameters.len(), 3);
    assert_eq!(func.attrs.parameters[2].name, "active");
    assert_eq!(func.attrs.parameters[2].default.as_deref(), Some("True"));
}

#[test]
fn test_args_kwargs_and_cls_skipped() {
    let outcome = parse("def call(cls, *args, **kwargs):\n    pass\n");
    let func = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Function)
        .unwrap();
    assert!(func.attrs.parameters.is_empty());
}

#[test]
fn test_nested_function_parents_to_enclosing() {
    let source = r#"
def outer():
    def inner():
        pass
    return inner
"#;
    let outcome = parse(source);

    let outer = outcome.nodes.iter().find(|n| n.label == "outer").unwrap();
    let inner = outcome.nodes.iter().find(|n| n.label == "inner").unwrap();
    assert_eq!(inner.parent.as_deref(), Some(outer.id.as_str()));
    assert!(inner.id.starts_with(&outer.id));
}

#[test]
fn test_fastapi_app_and_entry_flags() {
    let source = r#"
from fastapi import FastAPI

app = FastAPI()
"#;
    let outcome = parse_at(source, "main.py");

    let app = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Field && n.label == "app")
        .expect("module-scope app variable");
    assert_eq!(app.layer, Some(Layer::App));

    let module = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Module)
        .unwrap();
    assert!(module.is_entry);
    assert_eq!(module.layer, Some(Layer::App));
}

#[test]
fn test_fastapi_router_and_endpoint() {
    let source = r#"
from fastapi import APIRouter

router = APIRouter()


@router.get("/")
async def list_users():
    return []
"#;
    let outcome = parse_at(source, "routers/users.py");

    let router = outcome
        .nodes
        .iter()
        .find(|n| n.label == "router")
        .expect("router variable");
    assert_eq!(router.layer, Some(Layer::Router));

    let endpoint = outcome
        .nodes
        .iter()
        .find(|n| n.label == "list_users")
        .expect("endpoint function");
    assert_eq!(endpoint.layer, Some(Layer::Endpoint));
    assert!(endpoint.attrs.is_async);
    assert!(endpoint
        .attrs
        .decorators
        .contains(&"router.get".to_string()));

    // the decorated endpoint uses the router object it hangs off
    assert!(outcome
        .edges
        .iter()
        .any(|e| e.kind == EdgeKind::Uses && e.from == endpoint.id && e.to == router.id));
}

#[test]
fn test_pydantic_schema_layer() {
    let source = r#"
from fastapi import FastAPI
from pydantic import BaseModel


class UserOut(BaseModel):
    name: str
"#;
    let outcome = parse(source);
    let schema = outcome.nodes.iter().find(|n| n.label == "UserOut").unwrap();
    assert_eq!(schema.layer, Some(Layer::Schema));
    assert_eq!(schema.attrs.base_classes, vec!["BaseModel".to_string()]);
}

#[test]
fn test_django_layers_by_base_class() {
    let source = r#"
from django.db import models
from django.views import View
from rest_framework import serializers


class Profile(models.Model):
    pass


class ProfileView(View):
    pass


class ProfileSerializer(serializers.ModelSerializer):
    pass
"#;
    let outcome = parse(source);

    let layer_of = |label: &str| {
        outcome
            .nodes
            .iter()
            .find(|n| n.label == label)
            .and_then(|n| n.layer)
    };
    assert_eq!(layer_of("Profile"), Some(Layer::Model));
    assert_eq!(layer_of("ProfileView"), Some(Layer::View));
    assert_eq!(layer_of("ProfileSerializer"), Some(Layer::Serializer));
}

#[test]
fn test_flask_route_and_app() {
    let source = r#"
from flask import Flask

app = Flask(__name__)


@app.route("/health")
def health():
    return "ok"
"#;
    let outcome = parse_at(source, "app.py");

    let app = outcome.nodes.iter().find(|n| n.label == "app").unwrap();
    assert_eq!(app.layer, Some(Layer::App));

    let health = outcome.nodes.iter().find(|n| n.label == "health").unwrap();
    assert_eq!(health.layer, Some(Layer::Route));
}

#[test]
fn test_generic_heuristics_without_framework() {
    let source = r#"
class OrderService:
    pass


class OrderRepository:
    pass


def test_totals():
    pass
"#;
    let outcome = parse(source);

    let layer_of = |label: &str| {
        outcome
            .nodes
            .iter()
            .find(|n| n.label == label)
            .and_then(|n| n.layer)
    };
    assert_eq!(layer_of("OrderService"), Some(Layer::Service));
    assert_eq!(layer_of("OrderRepository"), Some(Layer::Repository));
    assert_eq!(layer_of("test_totals"), Some(Layer::Test));
}

#[test]
fn test_main_guard_marks_primary_hint() {
    let source = r#"
def run():
    pass


if __name__ == "__main__":
    run()
"#;
    let outcome = parse_at(source, "tool.py");
    let module = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Module)
        .unwrap();
    assert!(module.is_entry);
    assert!(module.is_primary_entry);
}

#[test]
fn test_entry_stem_without_markers() {
    let outcome = parse_at("x = 1\n", "manage.py");
    let module = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Module)
        .unwrap();
    assert!(module.is_entry);
    assert!(!module.is_primary_entry);
}

#[test]
fn test_imports_and_relative_literals() {
    let source = r#"
import os
import pkg.models, pkg.views
from .sibling import helper
from ..common import base
"#;
    let outcome = parse(source);
    assert_eq!(
        outcome.import_literals,
        vec![
            "os".to_string(),
            "pkg.models".to_string(),
            "pkg.views".to_string(),
            ".sibling".to_string(),
            "..common".to_string(),
        ]
    );
}

#[test]
fn test_decorator_with_multiline_arguments() {
    let source = r#"
from fastapi import APIRouter

router = APIRouter()


@router.get(
    "/users",
    response_model=list,
)
async def list_users():
    return []
"#;
    let outcome = parse_at(source, "routers/users.py");
    let endpoint = outcome
        .nodes
        .iter()
        .find(|n| n.label == "list_users")
        .expect("function after multi-line decorator");
    assert_eq!(endpoint.layer, Some(Layer::Endpoint));
}

#[test]
fn test_module_docstring() {
    let source = "\"\"\"Billing helpers.\"\"\"\n\ndef bill():\n    pass\n";
    let outcome = parse(source);
    let module = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Module)
        .unwrap();
    assert_eq!(module.attrs.docstring.as_deref(), Some("Billing helpers."));
}

#[test]
fn test_comments_and_blanks_do_not_close_blocks() {
    let source = r#"
class Holder:

    # a comment at odd indent

    def kept(self):
        pass
"#;
    let outcome = parse(source);
    let kept = outcome.nodes.iter().find(|n| n.label == "kept").unwrap();
    assert_eq!(kept.kind, NodeKind::Method);
    assert_eq!(kept.parent.as_deref(), Some("pkg/service.py:class:Holder"));
}
