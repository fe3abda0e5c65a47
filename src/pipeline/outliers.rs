//! Outlier filter stage: neutralize extreme values per field.
//!
//! Any value deviating from its field's population mean by more than three
//! standard deviations is replaced with that mean. The slot itself is kept so
//! the timeline stays uniform. Each field is treated independently; no
//! cross-field context is considered.

use crate::api::{AlignedRecord, ScalarField};

/// Deviation threshold in population standard deviations.
pub const OUTLIER_SIGMA: f64 = 3.0;

/// Replace per-field outliers with the field mean.
///
/// Pure transformation: the input is left untouched and a filtered copy is
/// returned. Fields with zero variance (or fewer than two values) are passed
/// through unchanged.
pub fn filter_outliers(aligned: &[AlignedRecord]) -> Vec<AlignedRecord> {
    let mut filtered = aligned.to_vec();

    for field in ScalarField::ALL {
        let values: Vec<f64> = filtered.iter().filter_map(|r| r.get(field)).collect();
        if values.len() < 2 {
            continue;
        }

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let variance =
            values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / values.len() as f64;
        let std = variance.sqrt();
        if std == 0.0 {
            continue;
        }

        for record in filtered.iter_mut() {
            if let Some(value) = record.get(field) {
                if (value - mean).abs() > OUTLIER_SIGMA * std {
                    record.set(field, Some(mean));
                }
            }
        }
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn ts(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn records_with_load(values: &[f64]) -> Vec<AlignedRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut record = AlignedRecord::empty(ts(i as i64));
                record.load = Some(*v);
                record
            })
            .collect()
    }

    #[test]
    fn test_extreme_value_replaced_with_mean() {
        // Stable series with one spike far beyond 3 sigma.
        let mut values = vec![500.0; 50];
        values[25] = 100_000.0;
        let records = records_with_load(&values);

        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let filtered = filter_outliers(&records);

        assert_eq!(filtered[25].load, Some(mean));
        // Timeline length preserved.
        assert_eq!(filtered.len(), records.len());
    }

    #[test]
    fn test_values_within_threshold_unchanged() {
        let values = vec![480.0, 500.0, 520.0, 495.0, 505.0];
        let records = records_with_load(&values);
        let filtered = filter_outliers(&records);

        for (record, original) in filtered.iter().zip(values.iter()) {
            assert_eq!(record.load, Some(*original));
        }
    }

    #[test]
    fn test_constant_series_passes_through() {
        let records = records_with_load(&[500.0; 10]);
        let filtered = filter_outliers(&records);
        assert!(filtered.iter().all(|r| r.load == Some(500.0)));
    }

    #[test]
    fn test_fields_are_independent() {
        let mut records = records_with_load(&[500.0; 50]);
        records[10].load = Some(100_000.0);
        for record in records.iter_mut() {
            record.solar = Some(0.0);
        }

        let filtered = filter_outliers(&records);
        // Solar untouched (zero variance), load spike neutralized.
        assert!(filtered.iter().all(|r| r.solar == Some(0.0)));
        assert_ne!(filtered[10].load, Some(100_000.0));
    }

    #[test]
    fn test_short_series_unchanged() {
        let records = records_with_load(&[1.0]);
        let filtered = filter_outliers(&records);
        assert_eq!(filtered[0].load, Some(1.0));
    }
}
