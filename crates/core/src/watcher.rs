//! Debounced file-system and source-control watchers
//!
//! Watcher callbacks never parse: they classify the path and enqueue a
//! typed event on the bus. The host decides when to run an update cycle.

use crate::config::StrataConfig;
use crate::events::{ChangeEvent, EventBus};
use anyhow::Result;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEventKind, Debouncer};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Watches the workspace for source-file changes and emits
/// `FileCreated`/`FileChanged`/`FileDeleted` events after debouncing.
pub struct FileWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FileWatcher {
    pub fn start(root: &Path, config: &StrataConfig, bus: EventBus<ChangeEvent>) -> Result<Self> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut debouncer = new_debouncer(
            Duration::from_millis(config.file_watch_debounce_ms),
            tx,
        )?;
        debouncer.watcher().watch(root, RecursiveMode::Recursive)?;

        let extensions: Vec<String> = config.include_extensions.clone();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                match rx.recv_timeout(Duration::from_millis(200)) {
                    Ok(Ok(events)) => {
                        for event in events {
                            if event.kind != DebouncedEventKind::Any {
                                continue;
                            }
                            if !is_watchable(&event.path, &extensions) {
                                continue;
                            }
                            let change = if event.path.exists() {
                                ChangeEvent::FileChanged(event.path.clone())
                            } else {
                                ChangeEvent::FileDeleted(event.path.clone())
                            };
                            bus.emit(&change);
                        }
                    }
                    Ok(Err(error)) => {
                        tracing::warn!("file watcher error: {:?}", error);
                    }
                    Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                    Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(Self {
            _debouncer: debouncer,
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Watches the repository's head-pointer and ref files; each debounced
/// change invokes the classifier, which reads the repository state and
/// returns the events to publish.
pub struct ScmWatcher {
    _debouncer: Debouncer<notify::RecommendedWatcher>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ScmWatcher {
    pub fn start(
        git_dir: &Path,
        config: &StrataConfig,
        bus: EventBus<ChangeEvent>,
        classify: impl Fn() -> Vec<ChangeEvent> + Send + 'static,
    ) -> Result<Self> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut debouncer =
            new_debouncer(Duration::from_millis(config.scm_debounce_ms), tx)?;

        let head = git_dir.join("HEAD");
        if head.exists() {
            debouncer
                .watcher()
                .watch(&head, RecursiveMode::NonRecursive)?;
        }
        let refs = git_dir.join("refs");
        if refs.exists() {
            debouncer.watcher().watch(&refs, RecursiveMode::Recursive)?;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = std::thread::spawn(move || {
            while !stop_flag.load(Ordering::SeqCst) {
                match rx.recv_timeout(Duration::from_millis(200)) {
                    Ok(Ok(_events)) => {
                        for event in classify() {
                            bus.emit(&event);
                        }
                    }
                    Ok(Err(error)) => {
                        tracing::warn!("scm watcher error: {:?}", error);
                    }
                    Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {}
                    Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        Ok(Self {
            _debouncer: debouncer,
            stop,
            handle: Some(handle),
        })
    }

    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ScmWatcher {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Watchable: a configured source extension outside `.git`/`.strata`
fn is_watchable(path: &Path, extensions: &[String]) -> bool {
    if path_contains_segment(path, ".git") || path_contains_segment(path, ".strata") {
        return false;
    }
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let with_dot = format!(".{}", ext);
    extensions.iter().any(|e| e == &with_dot)
}

fn path_contains_segment(path: &Path, segment: &str) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy() == segment,
        _ => false,
    })
}

/// Location of the repository's private directory, if the workspace is one
pub fn git_dir_of(root: &Path) -> Option<PathBuf> {
    let dir = root.join(".git");
    dir.is_dir().then_some(dir)
}
