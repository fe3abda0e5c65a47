//! Result cache: memoizes pipeline output per lookback window.
//!
//! The cache is the only process-wide shared state in the pipeline. It holds
//! at most one entry per distinct window size; entries expire by TTL and no
//! other eviction is needed since the key space is externally bounded.
//! Entries are never partially updated: an entry is replaced atomically on
//! repopulation and dropped wholesale on explicit invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

use crate::api::Dataset;

struct CacheEntry {
    dataset: Arc<Dataset>,
    stored_at: DateTime<Utc>,
}

/// TTL-bounded dataset cache keyed by lookback window in days.
pub struct DatasetCache {
    ttl: Duration,
    entries: RwLock<HashMap<u32, CacheEntry>>,
}

impl DatasetCache {
    /// Create a cache whose entries stay valid for `ttl_hours`.
    pub fn new(ttl_hours: u32) -> Self {
        Self {
            ttl: Duration::hours(ttl_hours as i64),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Fetch the cached dataset for a window if it is still within TTL.
    pub fn get(&self, window_days: u32, now: DateTime<Utc>) -> Option<Arc<Dataset>> {
        let entries = self.entries.read();
        entries.get(&window_days).and_then(|entry| {
            if now - entry.stored_at < self.ttl {
                Some(entry.dataset.clone())
            } else {
                None
            }
        })
    }

    /// Store (or replace) the dataset for a window.
    pub fn insert(&self, window_days: u32, dataset: Arc<Dataset>, now: DateTime<Utc>) {
        self.entries.write().insert(
            window_days,
            CacheEntry {
                dataset,
                stored_at: now,
            },
        );
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }

    /// Number of entries currently held, expired or not.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
