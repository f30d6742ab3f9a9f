//! Node types for the code graph

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A node in the code graph representing a code entity.
///
/// Identifiers are stable strings derived from the owning file, the entity
/// kind, the name, and (for functions) the start line, so re-parsing an
/// unchanged file reproduces the same ids.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Stable identifier, e.g. `src/App.java:class:App`
    pub id: String,

    /// Display label (usually the unqualified name)
    pub label: String,

    /// The kind of code entity this node represents
    pub kind: NodeKind,

    /// Source language of the owning file
    pub language: Language,

    /// Workspace-relative path of the file that produced this node.
    /// Empty for virtual nodes synthesized during layer assembly.
    pub file: PathBuf,

    /// 1-based line where the entity starts (0 for whole-file modules)
    pub line: usize,

    /// 1-based line where the entity ends
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,

    /// Id of the containing node, when one has been assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Structured attributes extracted from source
    #[serde(default, skip_serializing_if = "NodeAttrs::is_empty")]
    pub attrs: NodeAttrs,

    /// Architectural layer tag, orthogonal to `kind`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,

    /// True when this node belongs to a detected entry file
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_entry: bool,

    /// True for the single node preferred as the display root
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_primary_entry: bool,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        kind: NodeKind,
        language: Language,
        file: impl Into<PathBuf>,
        line: usize,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind,
            language,
            file: file.into(),
            line,
            end_line: None,
            parent: None,
            attrs: NodeAttrs::default(),
            layer: None,
            is_entry: false,
            is_primary_entry: false,
        }
    }

    pub fn with_end_line(mut self, end_line: usize) -> Self {
        self.end_line = Some(end_line);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = Some(layer);
        self
    }

    pub fn with_attrs(mut self, attrs: NodeAttrs) -> Self {
        self.attrs = attrs;
        self
    }

    /// Is this a virtual node synthesized during assembly (no owning file)?
    pub fn is_virtual(&self) -> bool {
        self.file.as_os_str().is_empty()
    }
}

/// Builds the stable id for a top-level entity.
///
/// `<file>:<kind>:<name>` with a `:<line>` suffix for functions, where line
/// numbers disambiguate same-named overloads.
pub fn node_id(file: &str, kind: NodeKind, name: &str, line: Option<usize>) -> String {
    match line {
        Some(line) => format!("{}:{}:{}:{}", file, kind.id_segment(), name, line),
        None => format!("{}:{}:{}", file, kind.id_segment(), name),
    }
}

/// Builds the stable id for a member nested under `parent_id`.
pub fn member_id(parent_id: &str, kind: NodeKind, name: &str, line: Option<usize>) -> String {
    match line {
        Some(line) => format!("{}:{}:{}:{}", parent_id, kind.id_segment(), name, line),
        None => format!("{}:{}:{}", parent_id, kind.id_segment(), name),
    }
}

/// The kind of code entity a node represents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A source file or package module
    Module,
    /// A class
    Class,
    /// An interface
    Interface,
    /// A UI component (function, arrow, or class form)
    Component,
    /// A free function
    Function,
    /// A method owned by a class/interface/component
    Method,
    /// A field or module-scope variable
    Field,
    /// An import statement
    Import,
    /// An export statement
    Export,
}

impl NodeKind {
    /// Segment used inside node ids (stable, lowercase).
    pub fn id_segment(&self) -> &'static str {
        match self {
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Component => "component",
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::Field => "field",
            NodeKind::Import => "import",
            NodeKind::Export => "export",
        }
    }
}

/// Source languages the indexer parses
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    TypeScript,
    JavaScript,
    Python,
}

impl Language {
    /// Detect language from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "java" => Some(Language::Java),
            "ts" | "tsx" => Some(Language::TypeScript),
            "js" | "jsx" => Some(Language::JavaScript),
            "py" => Some(Language::Python),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
        }
    }
}

/// Architectural layer tag drawn from per-framework vocabularies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    // Spring-style JVM
    Application,
    Controller,
    Service,
    Repository,
    Entity,
    Component,
    // Async-web scripting
    App,
    Router,
    Endpoint,
    Dependency,
    Schema,
    Model,
    // MVC-style scripting
    View,
    Viewset,
    Serializer,
    Form,
    Admin,
    Middleware,
    Command,
    Test,
    // Lightweight-web scripting
    Blueprint,
    Route,
    // Framework-annotated browser
    Module,
    Directive,
    Pipe,
    Guard,
    Resolver,
}

impl Layer {
    /// Lowercase name, matching the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Application => "application",
            Layer::Controller => "controller",
            Layer::Service => "service",
            Layer::Repository => "repository",
            Layer::Entity => "entity",
            Layer::Component => "component",
            Layer::App => "app",
            Layer::Router => "router",
            Layer::Endpoint => "endpoint",
            Layer::Dependency => "dependency",
            Layer::Schema => "schema",
            Layer::Model => "model",
            Layer::View => "view",
            Layer::Viewset => "viewset",
            Layer::Serializer => "serializer",
            Layer::Form => "form",
            Layer::Admin => "admin",
            Layer::Middleware => "middleware",
            Layer::Command => "command",
            Layer::Test => "test",
            Layer::Blueprint => "blueprint",
            Layer::Route => "route",
            Layer::Module => "module",
            Layer::Directive => "directive",
            Layer::Pipe => "pipe",
            Layer::Guard => "guard",
            Layer::Resolver => "resolver",
        }
    }
}

/// Structured attributes extracted from source for a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NodeAttrs {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Param>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,

    /// Decorators / annotations, without arguments (`Component`, `router.get`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub base_classes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,

    /// Short synthesized summary shown by downstream readers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl NodeAttrs {
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
            && self.return_type.is_none()
            && !self.is_async
            && !self.is_static
            && self.visibility.is_none()
            && self.decorators.is_empty()
            && self.base_classes.is_empty()
            && self.docstring.is_none()
            && self.description.is_none()
    }
}

/// Function/method parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Param {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: None,
            optional: false,
            default: None,
        }
    }

    pub fn typed(name: impl Into<String>, param_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: Some(param_type.into()),
            optional: false,
            default: None,
        }
    }
}
