//! Query interface for the external time-series store.
//!
//! The preparation pipeline never talks to the storage engine directly; it
//! depends only on this trait. The store is assumed to return rows in
//! ascending time order at hourly aggregation granularity, but ordering is
//! not re-checked here — callers depending on order should verify.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::StoreResult;
use crate::api::{PriceLevel, SignalKind};

/// One row returned by a store query, before Loader normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRow {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    /// Categorical tariff level; only populated on price rows and may be
    /// absent even there.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<PriceLevel>,
}

impl MeasurementRow {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            level: None,
        }
    }

    pub fn with_level(mut self, level: PriceLevel) -> Self {
        self.level = Some(level);
        self
    }
}

/// Repository trait for time-series store access.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust; the Loader
/// issues the four per-kind queries concurrently.
#[async_trait]
pub trait MeasurementStore: Send + Sync {
    /// Query one signal kind over an inclusive time range.
    ///
    /// # Arguments
    /// * `kind` - The signal kind to filter on
    /// * `start` - Inclusive range start
    /// * `end` - Inclusive range end
    ///
    /// # Returns
    /// * `Ok(Vec<MeasurementRow>)` - Matching rows, ascending time order
    /// * `Err(StoreError)` - If the query fails; the Loader degrades that
    ///   kind to an empty sequence rather than aborting the whole load
    async fn query_range(
        &self,
        kind: SignalKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<MeasurementRow>>;

    /// Check whether the store is reachable.
    ///
    /// # Returns
    /// * `Ok(true)` - Store answered
    /// * `Err(StoreError)` - Store unreachable
    async fn health_check(&self) -> StoreResult<bool>;
}
