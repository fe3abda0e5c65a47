//! Loader stage: query the store for each signal kind and normalize values.
//!
//! The four per-kind queries run concurrently; they are read-only and touch
//! disjoint data, so no ordering between them is required. A failed query
//! degrades that kind to an empty sequence instead of aborting the load —
//! partial data is preferable to none.

use chrono::{DateTime, Duration, Utc};

use crate::api::{RawSample, SignalKind};
use crate::store::{MeasurementRow, MeasurementStore};

/// Multiplier converting store price units to cents.
pub const PRICE_SCALE: f64 = 100.0;

/// The four raw sequences produced by one load, in store order.
#[derive(Debug, Clone, Default)]
pub struct RawStreams {
    pub solar: Vec<RawSample>,
    pub load: Vec<RawSample>,
    pub prices: Vec<RawSample>,
    pub battery: Vec<RawSample>,
}

impl RawStreams {
    pub fn is_empty(&self) -> bool {
        self.solar.is_empty()
            && self.load.is_empty()
            && self.prices.is_empty()
            && self.battery.is_empty()
    }

    /// Iterate over all samples across the four streams.
    pub fn iter_all(&self) -> impl Iterator<Item = &RawSample> {
        self.solar
            .iter()
            .chain(self.load.iter())
            .chain(self.prices.iter())
            .chain(self.battery.iter())
    }
}

/// Load all four signal kinds over `[now - window_days, now]`.
///
/// Store order is preserved; the store is assumed to return ascending time
/// order but this is not re-verified here.
pub async fn load_signals(
    store: &dyn MeasurementStore,
    window_days: u32,
    now: DateTime<Utc>,
) -> RawStreams {
    let start = now - Duration::days(window_days as i64);

    let (solar, load, prices, battery) = tokio::join!(
        query_kind(store, SignalKind::Solar, start, now),
        query_kind(store, SignalKind::Load, start, now),
        query_kind(store, SignalKind::Price, start, now),
        query_kind(store, SignalKind::Battery, start, now),
    );

    RawStreams {
        solar,
        load,
        prices,
        battery,
    }
}

/// Query one kind, degrading to an empty sequence on failure.
async fn query_kind(
    store: &dyn MeasurementStore,
    kind: SignalKind,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<RawSample> {
    match store.query_range(kind, start, end).await {
        Ok(rows) => rows.into_iter().map(|row| normalize(kind, row)).collect(),
        Err(err) => {
            log::warn!("query for {kind} failed, degrading to empty sequence: {err}");
            Vec::new()
        }
    }
}

/// Normalize one store row into a [`RawSample`].
///
/// Power fields are floored at 0 W, battery state of charge is clamped to
/// [0, 100] and prices are rescaled to cents. A missing price level defaults
/// to `Normal`; non-price kinds never carry a level.
fn normalize(kind: SignalKind, row: MeasurementRow) -> RawSample {
    let value = match kind {
        SignalKind::Solar | SignalKind::Load => row.value.max(0.0),
        SignalKind::Price => row.value * PRICE_SCALE,
        SignalKind::Battery => row.value.clamp(0.0, 100.0),
    };
    let level = match kind {
        SignalKind::Price => Some(row.level.unwrap_or_default()),
        _ => None,
    };

    RawSample {
        timestamp: row.timestamp,
        value,
        kind,
        level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::PriceLevel;
    use crate::store::LocalStore;
    use chrono::TimeZone;

    fn ts(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_normalize_floors_power_at_zero() {
        let sample = normalize(SignalKind::Solar, MeasurementRow::new(ts(0), -12.0));
        assert_eq!(sample.value, 0.0);
        assert_eq!(sample.level, None);

        let sample = normalize(SignalKind::Load, MeasurementRow::new(ts(0), 230.0));
        assert_eq!(sample.value, 230.0);
    }

    #[test]
    fn test_normalize_clamps_battery_soc() {
        assert_eq!(
            normalize(SignalKind::Battery, MeasurementRow::new(ts(0), 150.0)).value,
            100.0
        );
        assert_eq!(
            normalize(SignalKind::Battery, MeasurementRow::new(ts(0), -5.0)).value,
            0.0
        );
        assert_eq!(
            normalize(SignalKind::Battery, MeasurementRow::new(ts(0), 73.5)).value,
            73.5
        );
    }

    #[test]
    fn test_normalize_rescales_price_and_defaults_level() {
        let sample = normalize(SignalKind::Price, MeasurementRow::new(ts(0), 0.25));
        assert_eq!(sample.value, 25.0);
        assert_eq!(sample.level, Some(PriceLevel::Normal));

        let sample = normalize(
            SignalKind::Price,
            MeasurementRow::new(ts(0), 0.8).with_level(PriceLevel::Expensive),
        );
        assert_eq!(sample.value, 80.0);
        assert_eq!(sample.level, Some(PriceLevel::Expensive));
    }

    #[tokio::test]
    async fn test_load_signals_degrades_failed_kind_only() {
        let store = LocalStore::new();
        store.insert_rows(SignalKind::Solar, vec![MeasurementRow::new(ts(1), 100.0)]);
        store.insert_rows(SignalKind::Price, vec![MeasurementRow::new(ts(1), 0.1)]);
        store.fail_kind(SignalKind::Price);

        let streams = load_signals(&store, 1, ts(23)).await;
        assert_eq!(streams.solar.len(), 1);
        assert!(streams.prices.is_empty());
        assert!(streams.load.is_empty());
    }

    #[tokio::test]
    async fn test_load_signals_window_excludes_older_rows() {
        let store = LocalStore::new();
        let old = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        store.insert_rows(
            SignalKind::Load,
            vec![
                MeasurementRow::new(old, 400.0),
                MeasurementRow::new(ts(1), 600.0),
            ],
        );

        let streams = load_signals(&store, 30, ts(23)).await;
        assert_eq!(streams.load.len(), 1);
        assert_eq!(streams.load[0].value, 600.0);
    }

    #[tokio::test]
    async fn test_load_signals_all_empty() {
        let store = LocalStore::new();
        let streams = load_signals(&store, 365, ts(0)).await;
        assert!(streams.is_empty());
    }
}
