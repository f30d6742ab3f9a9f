//! Integration tests for the browser-family parser

use strata_core::parser::{component::ComponentParser, FileContext, ParseOutcome, SourceParser};
use strata_core::{Layer, NodeKind};

fn parse_at(source: &str, rel: &str) -> ParseOutcome {
    let parser = ComponentParser::new();
    parser.parse(source, &FileContext::new(rel))
}

fn parse(source: &str) -> ParseOutcome {
    parse_at(source, "src/App.tsx")
}

#[test]
fn test_function_component_returns_jsx() {
    let outcome = parse(
        r#"
export default function App() {
    return <div className="app">hello</div>;
}
"#,
    );

    let component = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Component)
        .expect("component node");
    assert_eq!(component.label, "App");
    assert_eq!(component.id, "src/App.tsx:component:App");
    assert_eq!(component.layer, Some(Layer::Component));
}

#[test]
fn test_jsx_found_through_conditional_returns() {
    let outcome = parse(
        r#"
function Banner({ show }: { show: boolean }) {
    if (!show) {
        return null;
    }
    return (
        <header>
            <h1>banner</h1>
        </header>
    );
}
"#,
    );

    let component = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Component)
        .expect("component detected through nested return");
    assert_eq!(component.label, "Banner");
}

#[test]
fn test_arrow_function_component() {
    let outcome = parse("const Header = () => <h1>title</h1>;\n");

    let component = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Component)
        .expect("arrow component");
    assert_eq!(component.label, "Header");
}

#[test]
fn test_arrow_with_block_body_and_plain_function() {
    let outcome = parse(
        r#"
const Layout = () => {
    return <main />;
};

function formatName(first: string, last: string): string {
    return first + " " + last;
}
"#,
    );

    assert!(outcome
        .nodes
        .iter()
        .any(|n| n.kind == NodeKind::Component && n.label == "Layout"));

    let plain = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Function)
        .expect("plain function stays a function");
    assert_eq!(plain.label, "formatName");
    assert_eq!(plain.attrs.parameters.len(), 2);
    assert_eq!(plain.attrs.return_type.as_deref(), Some("string"));
}

#[test]
fn test_class_component_by_superclass() {
    let outcome = parse(
        r#"
class Widget extends React.Component {
    render() {
        return <div />;
    }
}
"#,
    );

    let widget = outcome
        .nodes
        .iter()
        .find(|n| n.label == "Widget")
        .expect("class node");
    assert_eq!(widget.kind, NodeKind::Component);
    assert!(widget
        .attrs
        .base_classes
        .iter()
        .any(|b| b.ends_with("Component")));

    let render = outcome.nodes.iter().find(|n| n.label == "render").unwrap();
    assert_eq!(render.kind, NodeKind::Method);
    assert_eq!(render.parent.as_deref(), Some(widget.id.as_str()));
}

#[test]
fn test_imports_collect_literals() {
    let outcome = parse(
        r#"
import React from 'react';
import App from './App';
import { helper } from '../lib/util';
"#,
    );

    assert_eq!(
        outcome.import_literals,
        vec![
            "react".to_string(),
            "./App".to_string(),
            "../lib/util".to_string()
        ]
    );
    let imports: Vec<_> = outcome
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Import)
        .collect();
    assert_eq!(imports.len(), 3);
}

#[test]
fn test_bootstrap_file_emits_entry_module() {
    let outcome = parse_at(
        r#"
import ReactDOM from 'react-dom';
import App from './App';

ReactDOM.render(<App />, document.getElementById('root'));
"#,
        "src/index.tsx",
    );

    let module = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Module)
        .expect("module node always emitted");
    assert_eq!(module.label, "index");
    assert!(module.is_entry);
}

#[test]
fn test_angular_component_strategy() {
    let outcome = parse_at(
        r#"
import { Component, Input, Output, EventEmitter } from '@angular/core';

@Component({
    selector: 'app-user-list',
    templateUrl: './user-list.component.html',
})
export class UserListComponent {
    @Input() users: string[];
    @Output() selected = new EventEmitter<string>();

    select(user: string): void {
        this.selected.emit(user);
    }
}
"#,
        "src/app/user-list.component.ts",
    );

    let component = outcome
        .nodes
        .iter()
        .find(|n| n.label == "UserListComponent")
        .expect("angular component");
    assert_eq!(component.kind, NodeKind::Component);
    assert_eq!(component.layer, Some(Layer::Component));

    let users = outcome.nodes.iter().find(|n| n.label == "users").unwrap();
    assert_eq!(users.kind, NodeKind::Field);
    assert!(users.attrs.decorators.contains(&"Input".to_string()));
    assert_eq!(users.parent.as_deref(), Some(component.id.as_str()));

    let select = outcome.nodes.iter().find(|n| n.label == "select").unwrap();
    assert_eq!(select.kind, NodeKind::Method);
    assert_eq!(select.attrs.return_type.as_deref(), Some("void"));
}

#[test]
fn test_angular_module_service_and_guard_layers() {
    let module_file = parse_at(
        r#"
import { NgModule } from '@angular/core';

@NgModule({ declarations: [] })
export class AppModule {}
"#,
        "src/app/app.module.ts",
    );
    assert_eq!(
        module_file
            .nodes
            .iter()
            .find(|n| n.label == "AppModule")
            .unwrap()
            .layer,
        Some(Layer::Module)
    );

    let service_file = parse_at(
        r#"
import { Injectable } from '@angular/core';

@Injectable({ providedIn: 'root' })
export class AuthService {
    login(): void {}
}
"#,
        "src/app/auth.service.ts",
    );
    assert_eq!(
        service_file
            .nodes
            .iter()
            .find(|n| n.label == "AuthService")
            .unwrap()
            .layer,
        Some(Layer::Service)
    );

    let guard_file = parse_at(
        r#"
import { Injectable } from '@angular/core';
import { CanActivate } from '@angular/router';

@Injectable()
export class AuthGuard implements CanActivate {
    canActivate(): boolean {
        return true;
    }
}
"#,
        "src/app/auth.guard.ts",
    );
    assert_eq!(
        guard_file
            .nodes
            .iter()
            .find(|n| n.label == "AuthGuard")
            .unwrap()
            .layer,
        Some(Layer::Guard)
    );
}

#[test]
fn test_export_clause_nodes() {
    let outcome = parse(
        r#"
const version = "1.0";
export { version };
"#,
    );

    let export = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Export)
        .expect("export node");
    assert_eq!(export.label, "version");

    let field = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Field)
        .expect("const becomes a field node");
    assert_eq!(field.label, "version");
}

#[test]
fn test_interface_extraction() {
    let outcome = parse("export interface User { id: string; name: string; }\n");
    let iface = outcome
        .nodes
        .iter()
        .find(|n| n.kind == NodeKind::Interface)
        .expect("interface node");
    assert_eq!(iface.label, "User");
}

#[test]
fn test_plain_js_keeps_javascript_language() {
    let outcome = parse_at(
        "export function sum(a, b) { return a + b; }\n",
        "src/util.js",
    );
    let sum = outcome.nodes.iter().find(|n| n.label == "sum").unwrap();
    assert_eq!(sum.language, strata_core::Language::JavaScript);
}
