//! Typed change events and the subscriber channel
//!
//! Watchers enqueue events here; hosts subscribe with a handle and
//! unsubscribe by dropping it back into the bus. Callbacks must stay
//! cheap: parsing work belongs to the analysis cycle, never to a
//! subscriber.

use crate::config::StrataConfig;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A change observed by the file-system or source-control watchers
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// The head pointer moved to another ref
    BranchSwitch {
        from: Option<String>,
        to: String,
        has_snapshot: bool,
    },
    /// Head advanced on the same ref
    Commit { branch: String, commit: String },
    FileCreated(PathBuf),
    FileChanged(PathBuf),
    FileDeleted(PathBuf),
    Merge,
    Rebase,
    CherryPick,
    StashApply,
    /// Explicit demand for a full re-analysis (e.g. switch to an uncached
    /// branch)
    FullRefreshRequired { reason: String },
}

/// How the host should react to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateStrategy {
    Incremental,
    FullRefresh,
    BranchCache,
    NoUpdate,
}

/// Map an event (plus the number of affected files) to an update strategy.
pub fn select_strategy(
    event: &ChangeEvent,
    affected_files: usize,
    config: &StrataConfig,
) -> UpdateStrategy {
    match event {
        ChangeEvent::BranchSwitch { has_snapshot, .. } => {
            if *has_snapshot {
                UpdateStrategy::BranchCache
            } else {
                UpdateStrategy::FullRefresh
            }
        }
        ChangeEvent::Merge | ChangeEvent::Rebase | ChangeEvent::CherryPick => {
            UpdateStrategy::FullRefresh
        }
        ChangeEvent::Commit { .. }
        | ChangeEvent::FileCreated(_)
        | ChangeEvent::FileChanged(_)
        | ChangeEvent::FileDeleted(_) => {
            if affected_files <= config.full_refresh_file_threshold {
                UpdateStrategy::Incremental
            } else {
                UpdateStrategy::FullRefresh
            }
        }
        ChangeEvent::StashApply => {
            if affected_files <= config.stash_refresh_threshold {
                UpdateStrategy::Incremental
            } else {
                UpdateStrategy::FullRefresh
            }
        }
        ChangeEvent::FullRefreshRequired { .. } => UpdateStrategy::FullRefresh,
    }
}

type Callback<T> = Box<dyn Fn(&T) + Send>;

/// A multi-subscriber event channel. Cloning shares the subscriber list.
pub struct EventBus<T> {
    subscribers: Arc<Mutex<Vec<(u64, Callback<T>)>>>,
    next_id: Arc<AtomicU64>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventBus<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Register a callback; the returned handle unsubscribes it.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Box::new(callback)));
        Subscription { id }
    }

    /// Remove a subscriber; unknown handles are a no-op.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(id, _)| *id != subscription.id);
    }

    /// Deliver an event to every subscriber, in subscription order.
    pub fn emit(&self, event: &T) {
        let subscribers = self.subscribers.lock().unwrap_or_else(|e| e.into_inner());
        for (_, callback) in subscribers.iter() {
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

/// Handle returned by [`EventBus::subscribe`]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
}
