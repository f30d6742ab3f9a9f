//! Entry-point detection over the enumerated workspace
//!
//! A file is an entry when its name or marker content identifies it as a
//! starting point of control: a bootstrap render call, a main guard, a
//! framework app construction, a JVM main method, or the framework
//! application annotation. At most one entry is primary.

use regex::Regex;
use std::path::{Path, PathBuf};

/// Python stems recognized as entries by name alone
const ENTRY_STEMS: &[&str] = &[
    "main",
    "app",
    "application",
    "run",
    "server",
    "manage",
    "wsgi",
    "asgi",
    "__main__",
    "cli",
];

/// Stems preferred when choosing the primary among several entries
const CANONICAL_PRIMARY_STEMS: &[&str] = &["main", "index", "app", "application"];

/// Why a file was detected as an entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryEvidence {
    /// Framework application annotation (strongest)
    ApplicationAnnotation,
    /// Bootstrap render / app construction marker
    Bootstrap,
    /// `if __name__ == "__main__"` guard
    MainGuard,
    /// JVM `public static void main`
    MainMethod,
    /// Entry-like file name
    Name,
}

#[derive(Debug, Clone)]
pub struct EntryPoint {
    /// Absolute path of the entry file
    pub file: PathBuf,
    pub evidence: EntryEvidence,
    pub is_primary: bool,
}

pub struct EntryDetector {
    application_annotation: Regex,
    jvm_main: Regex,
    bootstrap: Regex,
    main_guard: Regex,
    app_construction: Regex,
}

impl Default for EntryDetector {
    fn default() -> Self {
        Self {
            application_annotation: Regex::new(r"@SpringBootApplication\b").unwrap(),
            jvm_main: Regex::new(r"public\s+static\s+void\s+main\s*\(").unwrap(),
            bootstrap: Regex::new(
                r"(ReactDOM\.render|createRoot|hydrateRoot|bootstrapModule|bootstrapApplication)\s*\(",
            )
            .unwrap(),
            main_guard: Regex::new(r#"if\s+__name__\s*==\s*["']__main__["']"#).unwrap(),
            app_construction: Regex::new(r"\b\w+\s*=\s*(FastAPI|Flask)\s*\(").unwrap(),
        }
    }
}

impl EntryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the enumerated files and return detected entries, ordered by
    /// path, with at most one flagged primary.
    pub fn detect(&self, files: &[PathBuf]) -> Vec<EntryPoint> {
        let mut entries: Vec<EntryPoint> = Vec::new();

        for file in files {
            let Some(evidence) = self.classify(file) else {
                continue;
            };
            entries.push(EntryPoint {
                file: file.clone(),
                evidence,
                is_primary: false,
            });
        }

        entries.sort_by(|a, b| a.file.cmp(&b.file));

        // Primary preference: application annotation, then canonical name,
        // then the lexicographically first entry.
        let primary = entries
            .iter()
            .position(|e| e.evidence == EntryEvidence::ApplicationAnnotation)
            .or_else(|| {
                entries.iter().position(|e| {
                    stem_of(&e.file)
                        .is_some_and(|s| CANONICAL_PRIMARY_STEMS.contains(&s.as_str()))
                })
            })
            .or(if entries.is_empty() { None } else { Some(0) });

        if let Some(idx) = primary {
            entries[idx].is_primary = true;
        }

        entries
    }

    fn classify(&self, file: &Path) -> Option<EntryEvidence> {
        let ext = file.extension().and_then(|e| e.to_str())?;
        match ext {
            "java" => {
                let source = std::fs::read_to_string(file).ok()?;
                if self.application_annotation.is_match(&source) {
                    Some(EntryEvidence::ApplicationAnnotation)
                } else if self.jvm_main.is_match(&source) {
                    Some(EntryEvidence::MainMethod)
                } else {
                    None
                }
            }
            "ts" | "tsx" | "js" | "jsx" => {
                let source = std::fs::read_to_string(file).ok()?;
                self.bootstrap
                    .is_match(&source)
                    .then_some(EntryEvidence::Bootstrap)
            }
            "py" => {
                let source = std::fs::read_to_string(file).ok()?;
                if self.main_guard.is_match(&source) {
                    Some(EntryEvidence::MainGuard)
                } else if self.app_construction.is_match(&source) {
                    Some(EntryEvidence::Bootstrap)
                } else if stem_of(file).is_some_and(|s| ENTRY_STEMS.contains(&s.as_str())) {
                    Some(EntryEvidence::Name)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

fn stem_of(file: &Path) -> Option<String> {
    file.file_stem().map(|s| s.to_string_lossy().to_string())
}
