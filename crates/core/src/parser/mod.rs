//! Language parsers for building the code graph from source files

pub mod component;
pub mod java;
pub mod python;

use crate::discovery::relative_to_root;
use crate::graph::{Edge, Language, Node};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error types for parsing operations
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseFailed(String),

    #[error("Unsupported extension: {0}")]
    UnsupportedExtension(String),

    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),
}

/// A per-file problem recorded during a cycle. Parsing never aborts the
/// cycle; a file that cannot be parsed contributes a diagnostic instead of
/// nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub file: PathBuf,
    pub message: String,
}

impl Diagnostic {
    pub fn new(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            message: message.into(),
        }
    }
}

/// Context handed to a parser for a single file
#[derive(Debug, Clone)]
pub struct FileContext {
    /// Workspace-relative, `/`-separated path of the file
    pub rel_path: PathBuf,

    /// True when the entry-point detector flagged this file
    pub is_entry_hint: bool,
}

impl FileContext {
    pub fn new(rel_path: impl Into<PathBuf>) -> Self {
        Self {
            rel_path: rel_path.into(),
            is_entry_hint: false,
        }
    }

    pub fn with_entry_hint(mut self, hint: bool) -> Self {
        self.is_entry_hint = hint;
        self
    }

    /// Relative path as the `/`-separated string used inside node ids
    pub fn rel_str(&self) -> String {
        self.rel_path.to_string_lossy().replace('\\', "/")
    }

    /// File stem used as the module label
    pub fn stem(&self) -> String {
        self.rel_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.rel_str())
    }
}

/// Everything a parser produces for one file.
#[derive(Debug, Default, Clone)]
pub struct ParseOutcome {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,

    /// Raw import literals as they appear in source, for cross-file
    /// resolution by the assembler
    pub import_literals: Vec<String>,

    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// An empty outcome carrying a single parse-failure diagnostic.
    pub fn failed(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            diagnostics: vec![Diagnostic::new(file, message)],
            ..Default::default()
        }
    }
}

/// The stable id of the module node every parser emits for a file.
///
/// Knowing this id without parsing lets the import pass create module-level
/// edges before the parse pass runs.
pub fn module_id_for(rel_path: &Path) -> String {
    let rel = rel_path.to_string_lossy().replace('\\', "/");
    let stem = rel_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| rel.clone());
    format!("{}:module:{}", rel, stem)
}

/// Trait for language-family parsers.
///
/// A parser is a pure function over file contents: it never touches the
/// filesystem and never fails across files. Internal AST machinery is an
/// implementation detail of each family.
pub trait SourceParser: Send + Sync {
    /// Language this parser reports on emitted nodes
    fn language(&self) -> Language;

    /// File extensions this parser handles (with dot)
    fn extensions(&self) -> &[&str];

    /// Parse one file into nodes and intra-file edges.
    fn parse(&self, source: &str, ctx: &FileContext) -> ParseOutcome;
}

/// Dispatcher that routes files to the appropriate family parser
pub struct ParserDispatcher {
    parsers: Vec<Box<dyn SourceParser>>,
}

impl ParserDispatcher {
    /// Create a dispatcher with the three built-in family parsers
    pub fn new() -> Self {
        Self {
            parsers: vec![
                Box::new(java::JavaParser::new()),
                Box::new(component::ComponentParser::new()),
                Box::new(python::PythonParser::new()),
            ],
        }
    }

    /// Create a dispatcher with custom parsers
    pub fn with_parsers(parsers: Vec<Box<dyn SourceParser>>) -> Self {
        Self { parsers }
    }

    /// Find a parser for the given file path based on extension
    pub fn find_parser(&self, file_path: &Path) -> Option<&dyn SourceParser> {
        let extension = file_path.extension()?.to_str()?;
        let with_dot = format!(".{}", extension);

        self.parsers
            .iter()
            .find(|parser| parser.extensions().contains(&with_dot.as_str()))
            .map(|boxed| &**boxed)
    }

    /// Parse a single file from disk. Unknown extensions and read failures
    /// yield an empty outcome (with a diagnostic for the latter).
    pub fn parse_path(&self, abs_path: &Path, root: &Path, is_entry_hint: bool) -> ParseOutcome {
        let Some(parser) = self.find_parser(abs_path) else {
            return ParseOutcome::default();
        };
        let rel = relative_to_root(abs_path, root);
        let ctx = FileContext::new(rel).with_entry_hint(is_entry_hint);
        match std::fs::read_to_string(abs_path) {
            Ok(source) => parser.parse(&source, &ctx),
            Err(e) => ParseOutcome::failed(ctx.rel_path, format!("read failed: {}", e)),
        }
    }

    /// Parse many files in parallel. Each file is parsed in isolation; the
    /// results come back in input order so downstream merging stays
    /// deterministic.
    pub fn parse_files_parallel(
        &self,
        files: &[PathBuf],
        root: &Path,
        is_entry: impl Fn(&Path) -> bool + Sync,
    ) -> Vec<(PathBuf, ParseOutcome)> {
        files
            .par_iter()
            .map(|abs| {
                let rel = relative_to_root(abs, root);
                let outcome = self.parse_path(abs, root, is_entry(abs));
                (rel, outcome)
            })
            .collect()
    }

    /// Get all supported file extensions
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.parsers
            .iter()
            .flat_map(|parser| parser.extensions().iter().copied())
            .collect()
    }
}

impl Default for ParserDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
