//! Strata Core - Code Graph Indexing Engine
//!
//! This crate provides the indexing infrastructure for Strata:
//! - Language-family parsers (JVM, browser-component, scripting)
//! - Typed code graph with framework-aware layer synthesis
//! - Content-hash change detection and in-place incremental updates
//! - Per-branch graph snapshots driven by source-control events

pub mod analyzer;
pub mod artifacts;
pub mod branch;
pub mod config;
pub mod discovery;
pub mod entry;
pub mod events;
pub mod graph;
pub mod hash_store;
pub mod layering;
pub mod parser;
pub mod resolve;
pub mod updater;
pub mod watcher;

pub use analyzer::{AnalysisResult, WorkspaceAnalyzer};
pub use artifacts::{sanitize_filename, ProjectMetadata, SearchEntry};
pub use branch::{BranchManager, BranchState, SwitchOutcome};
pub use config::StrataConfig;
pub use discovery::discover_files;
pub use entry::{EntryDetector, EntryPoint};
pub use events::{select_strategy, ChangeEvent, EventBus, Subscription, UpdateStrategy};
pub use graph::{
    CodeGraph, Edge, EdgeKind, GraphSnapshot, Language, Layer, Node, NodeKind, Param,
};
pub use hash_store::{ChangeSet, FileHashEntry, FileHashStore};
pub use parser::{Diagnostic, ParseError, ParserDispatcher, SourceParser};
pub use resolve::ImportResolver;
pub use updater::{GraphUpdater, UpdateReport};
pub use watcher::{FileWatcher, ScmWatcher};

/// Strata version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
