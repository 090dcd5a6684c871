//! Shared per-source notification state.
//!
//! The [`Registry`] is the single point of truth for the notification counts
//! web applications have reported. The ingress listener upserts into it, the
//! publisher evicts stale entries and snapshots it for rendering. A single
//! coarse mutex guards the whole key space; every operation is an in-memory
//! map operation over at most tens of sources.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};

// ── Notification ──────────────────────────────────────────────────────────────

/// The most recent report from a single source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Caller-supplied count or status text, stored verbatim.
    pub label: String,
    /// When the source last reported, bumped on every upsert.
    pub updated_at: DateTime<Utc>,
}

// ── Registry ──────────────────────────────────────────────────────────────────

/// Mapping from source identifier to its current [`Notification`].
///
/// Entries are created on first upsert, replaced wholesale on later upserts
/// (last write wins) and removed only by [`Registry::evict_stale`]. Labels are
/// not validated here: the empty string and `"0"` are legitimate values whose
/// suppression is the renderer's concern.
pub struct Registry {
    entries: Mutex<HashMap<String, Notification>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Insert or replace the record for `source` with `label` and the current
    /// time.
    pub fn upsert(&self, source: &str, label: &str) {
        self.lock().insert(
            source.to_string(),
            Notification {
                label: label.to_string(),
                updated_at: Utc::now(),
            },
        );
    }

    /// An owned copy of all current records.
    ///
    /// The live lock is released before the copy is returned, so callers may
    /// render or inspect it without blocking writers.
    pub fn snapshot(&self) -> HashMap<String, Notification> {
        self.lock().clone()
    }

    /// Remove every entry whose last update is older than `max_age` as seen
    /// from `now`, returning the number removed.
    ///
    /// An entry aged exactly `max_age` is retained. `now` is supplied by the
    /// caller so eviction is deterministic under test.
    pub fn evict_stale(&self, max_age: Duration, now: DateTime<Utc>) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, n| now - n.updated_at <= max_age);
        before - entries.len()
    }

    /// Acquire the entry map. Critical sections are panic-free map operations,
    /// so a poisoned lock still holds a consistent map and is recovered.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Notification>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
