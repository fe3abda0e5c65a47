//! In-memory store implementation for unit testing and local development.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::error::{ErrorContext, StoreError, StoreResult};
use super::repository::{MeasurementRow, MeasurementStore};
use crate::api::SignalKind;

/// In-memory [`MeasurementStore`] backed by a per-kind row map.
///
/// Rows are kept sorted by timestamp on insertion, matching the ascending
/// order contract of the production store. Individual kinds can be marked as
/// failing to exercise the Loader's per-kind degradation path.
#[derive(Clone, Default)]
pub struct LocalStore {
    rows: Arc<RwLock<HashMap<SignalKind, Vec<MeasurementRow>>>>,
    failing: Arc<RwLock<HashSet<SignalKind>>>,
}

impl LocalStore {
    /// Create an empty local store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert rows for a signal kind, keeping the kind's rows time-sorted.
    pub fn insert_rows(&self, kind: SignalKind, mut new_rows: Vec<MeasurementRow>) {
        let mut rows = self.rows.write();
        let entry = rows.entry(kind).or_default();
        entry.append(&mut new_rows);
        entry.sort_by_key(|r| r.timestamp);
    }

    /// Make all subsequent queries for `kind` fail with a query error.
    pub fn fail_kind(&self, kind: SignalKind) {
        self.failing.write().insert(kind);
    }

    /// Clear a previously injected failure.
    pub fn restore_kind(&self, kind: SignalKind) {
        self.failing.write().remove(&kind);
    }

    /// Number of stored rows for a kind.
    pub fn row_count(&self, kind: SignalKind) -> usize {
        self.rows.read().get(&kind).map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl MeasurementStore for LocalStore {
    async fn query_range(
        &self,
        kind: SignalKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRow>> {
        if self.failing.read().contains(&kind) {
            return Err(StoreError::query_with_context(
                "injected failure",
                ErrorContext::new("query_range").with_kind(kind),
            ));
        }

        let rows = self.rows.read();
        Ok(rows
            .get(&kind)
            .map(|kind_rows| {
                kind_rows
                    .iter()
                    .filter(|r| r.timestamp >= start && r.timestamp <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn health_check(&self) -> StoreResult<bool> {
        Ok(true)
    }
}
