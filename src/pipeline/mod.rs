//! Historical data preparation pipeline.
//!
//! Turns the four raw, independently-sampled sensor streams into a single
//! time-aligned, gap-free, feature-enriched [`Dataset`] with quality metrics.
//! Stages run in dependency order, each a pure transformation of the previous
//! stage's output:
//!
//! 1. [`loader`] - per-kind store queries with partial-failure tolerance
//! 2. [`aligner`] - uniform hourly timeline, nearest-match assignment
//! 3. [`gapfill`] - interpolation / fill repair of missing values
//! 4. [`outliers`] - 3-sigma outlier neutralization
//! 5. [`smooth`] - centered moving average on the power fields
//! 6. [`features`] - calendar and cyclical feature extraction
//! 7. [`statistics`] - descriptive stats, correlations, quality score
//! 8. [`cache`] - TTL-bounded memoization per lookback window

pub mod aligner;
pub mod cache;
pub mod config;
pub mod features;
pub mod gapfill;
pub mod loader;
pub mod outliers;
pub mod smooth;
pub mod statistics;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::api::{Dataset, DatasetStatistics, FieldStatistics, QualityReport, TimeRange};
use crate::store::MeasurementStore;
use cache::DatasetCache;
use config::PipelineConfig;

/// Entry point for dataset preparation.
///
/// Owns the result cache and the store handle. One logical thread of control
/// per request: the only suspending operations are the store queries issued
/// by the loader; every in-memory stage is synchronous and works on data
/// private to the request.
pub struct HistoricalDataService {
    store: Arc<dyn MeasurementStore>,
    cache: DatasetCache,
    config: PipelineConfig,
    /// Serializes recomputation so concurrent misses for the same window do
    /// not each reissue the four store queries.
    recompute: Mutex<()>,
}

impl HistoricalDataService {
    pub fn new(store: Arc<dyn MeasurementStore>, config: PipelineConfig) -> Self {
        let cache = DatasetCache::new(config.cache_ttl_hours);
        Self {
            store,
            cache,
            config,
            recompute: Mutex::new(()),
        }
    }

    /// Prepare (or serve from cache) the dataset for the configured default
    /// lookback window.
    pub async fn load_default_window(&self) -> Arc<Dataset> {
        self.load_historical_data(self.config.lookback_days).await
    }

    /// Prepare the historical dataset for a lookback window in days.
    ///
    /// Never fails: per-kind load failures degrade to empty sequences inside
    /// the loader, and an entirely empty load yields a well-formed empty
    /// dataset with a "No data available" quality issue.
    pub async fn load_historical_data(&self, window_days: u32) -> Arc<Dataset> {
        if let Some(dataset) = self.cache.get(window_days, Utc::now()) {
            log::debug!("serving {window_days}-day dataset from cache");
            return dataset;
        }

        let _guard = self.recompute.lock().await;
        // Another request may have populated the entry while we waited.
        if let Some(dataset) = self.cache.get(window_days, Utc::now()) {
            return dataset;
        }

        let now = Utc::now();
        let dataset = Arc::new(self.compute_dataset(window_days, now).await);
        self.cache.insert(window_days, dataset.clone(), Utc::now());
        log::info!(
            "prepared {window_days}-day dataset: {} aligned slots, quality {:.0}",
            dataset.aligned.len(),
            dataset.statistics.quality.score
        );
        dataset
    }

    /// Drop all cached datasets; the next request recomputes.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Run the full stage sequence for one window.
    async fn compute_dataset(&self, window_days: u32, now: DateTime<Utc>) -> Dataset {
        let streams = loader::load_signals(self.store.as_ref(), window_days, now).await;

        let Some((aligned, time_range)) = aligner::align(&streams) else {
            log::warn!("no samples in any stream over the last {window_days} days");
            return empty_dataset(now);
        };
        log::debug!("aligned {} hourly slots", aligned.len());

        let completeness = aligner::completeness(&aligned);
        let repaired = gapfill::fill_gaps(&aligned);
        let filtered = outliers::filter_outliers(&repaired);
        let smoothed = smooth::smooth_power_fields(&filtered);
        let enriched = features::with_features(&smoothed);
        let stats = statistics::compute_statistics(&enriched, &completeness, now);

        Dataset {
            solar: streams.solar,
            load: streams.load,
            prices: streams.prices,
            battery: streams.battery,
            aligned: enriched,
            statistics: stats,
            time_range,
        }
    }
}

/// Well-formed degraded dataset: zeroed statistics and an explicit issue.
fn empty_dataset(now: DateTime<Utc>) -> Dataset {
    Dataset {
        solar: vec![],
        load: vec![],
        prices: vec![],
        battery: vec![],
        aligned: vec![],
        statistics: DatasetStatistics {
            solar: FieldStatistics::default(),
            load: FieldStatistics::default(),
            price: FieldStatistics::default(),
            battery_soc: FieldStatistics::default(),
            correlations: vec![],
            quality: QualityReport {
                score: 0.0,
                issues: vec!["No data available".to_string()],
                total_points: 0,
                time_span: "0.0 days".to_string(),
            },
        },
        time_range: TimeRange {
            start: now,
            end: now,
            hours: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SignalKind;
    use crate::store::{LocalStore, MeasurementRow};
    use chrono::{Duration, TimeZone};

    fn service_with(store: LocalStore) -> HistoricalDataService {
        HistoricalDataService::new(Arc::new(store), PipelineConfig::default())
    }

    #[tokio::test]
    async fn test_empty_store_yields_degraded_dataset() {
        let service = service_with(LocalStore::new());
        let dataset = service.load_historical_data(30).await;

        assert!(dataset.aligned.is_empty());
        assert_eq!(dataset.time_range.hours, 0);
        assert_eq!(dataset.statistics.quality.score, 0.0);
        assert_eq!(
            dataset.statistics.quality.issues,
            vec!["No data available".to_string()]
        );
    }

    #[tokio::test]
    async fn test_second_request_served_from_cache() {
        let store = LocalStore::new();
        let now = Utc::now();
        store.insert_rows(
            SignalKind::Solar,
            vec![
                MeasurementRow::new(now - Duration::hours(3), 100.0),
                MeasurementRow::new(now - Duration::hours(1), 200.0),
            ],
        );

        let service = service_with(store);
        let first = service.load_historical_data(30).await;
        let second = service.load_historical_data(30).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.statistics, second.statistics);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_recompute() {
        let store = LocalStore::new();
        let now = Utc::now();
        store.insert_rows(
            SignalKind::Load,
            vec![MeasurementRow::new(now - Duration::hours(1), 500.0)],
        );

        let service = service_with(store);
        let first = service.load_historical_data(30).await;
        service.clear_cache();
        let second = service.load_historical_data(30).await;

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_distinct_windows_cached_separately() {
        let store = LocalStore::new();
        let now = Utc::now();
        store.insert_rows(
            SignalKind::Battery,
            vec![MeasurementRow::new(now - Duration::hours(2), 75.0)],
        );

        let service = service_with(store);
        let short = service.load_historical_data(7).await;
        let long = service.load_historical_data(365).await;
        assert!(!Arc::ptr_eq(&short, &long));
    }

    #[tokio::test]
    async fn test_concurrent_requests_share_one_computation() {
        let store = LocalStore::new();
        let now = Utc::now();
        store.insert_rows(
            SignalKind::Solar,
            vec![MeasurementRow::new(now - Duration::hours(1), 50.0)],
        );

        let service = Arc::new(service_with(store));
        let a = {
            let service = service.clone();
            tokio::spawn(async move { service.load_historical_data(30).await })
        };
        let b = {
            let service = service.clone();
            tokio::spawn(async move { service.load_historical_data(30).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn test_all_kinds_failing_degrades_not_panics() {
        let store = LocalStore::new();
        for kind in SignalKind::ALL {
            store.fail_kind(kind);
        }

        let service = service_with(store);
        let dataset = service.load_historical_data(30).await;
        assert!(dataset.aligned.is_empty());
        assert_eq!(dataset.statistics.quality.score, 0.0);
    }

    #[test]
    fn test_empty_dataset_shape() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let dataset = empty_dataset(now);
        assert_eq!(dataset.time_range.start, now);
        assert_eq!(dataset.time_range.end, now);
        assert_eq!(dataset.statistics.quality.total_points, 0);
    }
}
