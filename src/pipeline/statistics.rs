//! Statistics and quality engine.
//!
//! Computes per-field descriptive statistics, pairwise Pearson correlations
//! and a 0-100 data-quality score with itemized issues. Field statistics run
//! on the fully repaired records; completeness for the quality score is
//! measured on the pre-repair alignment, since after gap filling every field
//! is non-null by construction.

use chrono::{DateTime, Utc};

use crate::api::{
    AlignedRecord, CorrelationEntry, DatasetStatistics, FieldStatistics, QualityReport,
    ScalarField,
};

/// Completeness ratio below which a field is flagged as an issue.
pub const COMPLETENESS_THRESHOLD: f64 = 0.8;
/// Minimum slot count before the volume penalty applies (one week hourly).
pub const MIN_VOLUME_SLOTS: usize = 168;
/// Days of staleness tolerated before the recency penalty applies.
pub const MAX_STALENESS_DAYS: i64 = 7;

/// Compute the full statistics block for a prepared dataset.
///
/// # Arguments
/// * `records` - Fully repaired, filtered, smoothed aligned records
/// * `completeness` - Per-field pre-repair completeness ratios
/// * `evaluated_at` - Reference instant for the staleness check
pub fn compute_statistics(
    records: &[AlignedRecord],
    completeness: &[(ScalarField, f64)],
    evaluated_at: DateTime<Utc>,
) -> DatasetStatistics {
    DatasetStatistics {
        solar: field_statistics(records, ScalarField::Solar),
        load: field_statistics(records, ScalarField::Load),
        price: field_statistics(records, ScalarField::Price),
        battery_soc: field_statistics(records, ScalarField::BatterySoc),
        correlations: compute_correlations(records),
        quality: quality_report(records, completeness, evaluated_at),
    }
}

/// Descriptive statistics over one field's non-null, finite values.
pub fn field_statistics(records: &[AlignedRecord], field: ScalarField) -> FieldStatistics {
    let values: Vec<f64> = records
        .iter()
        .filter_map(|r| r.get(field))
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() {
        return FieldStatistics::default();
    }

    let count = values.len();
    let mean = values.iter().sum::<f64>() / count as f64;
    let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;

    let mut sorted = values;
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    FieldStatistics {
        count,
        mean,
        min: sorted[0],
        max: sorted[count - 1],
        std: variance.sqrt(),
        median,
        percentile25: percentile(&sorted, 0.25),
        percentile75: percentile(&sorted, 0.75),
    }
}

/// Percentile via linear interpolation between order statistics.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    }
}

/// Pearson correlation coefficient.
///
/// Returns 0 when fewer than two paired points exist or when either series
/// has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut numerator = 0.0;
    let mut sum_sq_x = 0.0;
    let mut sum_sq_y = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        numerator += dx * dy;
        sum_sq_x += dx * dx;
        sum_sq_y += dy * dy;
    }

    let denominator = (sum_sq_x * sum_sq_y).sqrt();
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// All six pairwise correlations among the four scalar fields.
///
/// Each pair is computed over the slots where both fields are non-null.
pub fn compute_correlations(records: &[AlignedRecord]) -> Vec<CorrelationEntry> {
    let mut correlations = Vec::new();

    for i in 0..ScalarField::ALL.len() {
        for j in (i + 1)..ScalarField::ALL.len() {
            let field1 = ScalarField::ALL[i];
            let field2 = ScalarField::ALL[j];

            let mut x = Vec::new();
            let mut y = Vec::new();
            for record in records {
                if let (Some(a), Some(b)) = (record.get(field1), record.get(field2)) {
                    x.push(a);
                    y.push(b);
                }
            }

            correlations.push(CorrelationEntry {
                field1: field1.as_str().to_string(),
                field2: field2.as_str().to_string(),
                correlation: pearson(&x, &y),
            });
        }
    }

    correlations
}

/// Score the dataset's completeness, volume and recency.
///
/// Starts at 100 and subtracts per-field incompleteness penalties, a flat
/// volume penalty below one week of hourly data, and a capped staleness
/// penalty. Floored at 0.
pub fn quality_report(
    records: &[AlignedRecord],
    completeness: &[(ScalarField, f64)],
    evaluated_at: DateTime<Utc>,
) -> QualityReport {
    let total_points = records.len();
    let mut score = 100.0;
    let mut issues = Vec::new();

    if total_points == 0 {
        return QualityReport {
            score: 0.0,
            issues: vec!["No data available".to_string()],
            total_points: 0,
            time_span: "0.0 days".to_string(),
        };
    }

    for (field, ratio) in completeness {
        if *ratio < COMPLETENESS_THRESHOLD {
            score -= (1.0 - ratio) * 20.0;
            issues.push(format!(
                "Field {} only {:.1}% complete",
                field,
                ratio * 100.0
            ));
        }
    }

    if total_points < MIN_VOLUME_SLOTS {
        score -= 30.0;
        issues.push(format!(
            "Insufficient data volume: {} points, need at least {}",
            total_points, MIN_VOLUME_SLOTS
        ));
    }

    if let Some(latest) = records.iter().map(|r| r.timestamp).max() {
        let days_stale = (evaluated_at - latest).num_days();
        if days_stale > MAX_STALENESS_DAYS {
            score -= (days_stale as f64).min(20.0);
            issues.push(format!("Data is stale: latest point is {days_stale} days old"));
        }
    }

    QualityReport {
        score: score.max(0.0),
        issues,
        total_points,
        time_span: format!("{:.1} days", total_points as f64 / 24.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(hour: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::hours(hour)
    }

    fn full_records(n: usize) -> Vec<AlignedRecord> {
        (0..n)
            .map(|i| {
                let mut record = AlignedRecord::empty(ts(i as i64));
                record.solar = Some((i % 24) as f64 * 10.0);
                record.load = Some(500.0 + (i % 7) as f64);
                record.price = Some(10.0 + (i % 5) as f64);
                record.battery_soc = Some(50.0 + (i % 3) as f64);
                record
            })
            .collect()
    }

    fn full_completeness() -> Vec<(ScalarField, f64)> {
        ScalarField::ALL.iter().map(|&f| (f, 1.0)).collect()
    }

    #[test]
    fn test_field_statistics_basic() {
        let mut records = Vec::new();
        for (i, v) in [1.0, 2.0, 3.0, 4.0, 5.0].iter().enumerate() {
            let mut record = AlignedRecord::empty(ts(i as i64));
            record.solar = Some(*v);
            records.push(record);
        }

        let stats = field_statistics(&records, ScalarField::Solar);
        assert_eq!(stats.count, 5);
        assert_eq!(stats.mean, 3.0);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.percentile25, 2.0);
        assert_eq!(stats.percentile75, 4.0);
        assert!((stats.std - 2.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_field_statistics_even_count_median() {
        let mut records = Vec::new();
        for (i, v) in [1.0, 2.0, 3.0, 4.0].iter().enumerate() {
            let mut record = AlignedRecord::empty(ts(i as i64));
            record.load = Some(*v);
            records.push(record);
        }

        let stats = field_statistics(&records, ScalarField::Load);
        assert_eq!(stats.median, 2.5);
        // p25 interpolates between the first and second order statistics.
        assert_eq!(stats.percentile25, 1.75);
        assert_eq!(stats.percentile75, 3.25);
    }

    #[test]
    fn test_field_statistics_empty() {
        let stats = field_statistics(&[], ScalarField::Price);
        assert_eq!(stats, FieldStatistics::default());
    }

    #[test]
    fn test_pearson_self_correlation_is_one() {
        let x = vec![1.0, 4.0, 2.0, 8.0, 5.0];
        assert!((pearson(&x, &x) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pearson_constant_series_is_zero() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![5.0, 5.0, 5.0];
        assert_eq!(pearson(&x, &y), 0.0);
    }

    #[test]
    fn test_pearson_too_few_points() {
        assert_eq!(pearson(&[1.0], &[2.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
    }

    #[test]
    fn test_pearson_perfect_negative() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![3.0, 2.0, 1.0];
        assert!((pearson(&x, &y) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_correlations_cover_all_six_pairs() {
        let records = full_records(48);
        let correlations = compute_correlations(&records);
        assert_eq!(correlations.len(), 6);
        assert!(correlations
            .iter()
            .all(|c| (-1.0..=1.0).contains(&c.correlation)));
    }

    #[test]
    fn test_correlations_skip_unpaired_slots() {
        let mut records = full_records(10);
        for record in records.iter_mut().take(8) {
            record.load = None;
        }

        let correlations = compute_correlations(&records);
        let solar_load = correlations
            .iter()
            .find(|c| c.field1 == "solar" && c.field2 == "load")
            .unwrap();
        // Only two paired points remain; still a defined result.
        assert!((-1.0..=1.0).contains(&solar_load.correlation));
    }

    #[test]
    fn test_quality_perfect_dataset_scores_100() {
        let records = full_records(200);
        let latest = records.last().unwrap().timestamp;
        let report = quality_report(&records, &full_completeness(), latest + Duration::hours(1));

        assert_eq!(report.score, 100.0);
        assert!(report.issues.is_empty());
        assert_eq!(report.total_points, 200);
    }

    #[test]
    fn test_quality_incompleteness_penalty() {
        let records = full_records(200);
        let latest = records.last().unwrap().timestamp;
        let completeness = vec![
            (ScalarField::Solar, 0.5),
            (ScalarField::Load, 1.0),
            (ScalarField::Price, 1.0),
            (ScalarField::BatterySoc, 1.0),
        ];
        let report = quality_report(&records, &completeness, latest);

        assert_eq!(report.score, 90.0); // (1 - 0.5) * 20 = 10
        assert_eq!(report.issues.len(), 1);
        assert!(report.issues[0].contains("solar"));
        assert!(report.issues[0].contains("50.0%"));
    }

    #[test]
    fn test_quality_volume_penalty() {
        let records = full_records(100);
        let latest = records.last().unwrap().timestamp;
        let report = quality_report(&records, &full_completeness(), latest);

        assert_eq!(report.score, 70.0);
        assert!(report.issues[0].contains("Insufficient data volume"));
    }

    #[test]
    fn test_quality_staleness_penalty_capped() {
        let records = full_records(200);
        let latest = records.last().unwrap().timestamp;

        let report = quality_report(
            &records,
            &full_completeness(),
            latest + Duration::days(10),
        );
        assert_eq!(report.score, 90.0);
        assert!(report.issues[0].contains("stale"));

        let report = quality_report(
            &records,
            &full_completeness(),
            latest + Duration::days(400),
        );
        assert_eq!(report.score, 80.0); // capped at 20
    }

    #[test]
    fn test_quality_score_floored_at_zero() {
        let records = full_records(10);
        let completeness: Vec<_> = ScalarField::ALL.iter().map(|&f| (f, 0.0)).collect();
        let latest = records.last().unwrap().timestamp;
        let report = quality_report(&records, &completeness, latest + Duration::days(100));

        // 4 * 20 + 30 + 20 = 130 penalty.
        assert_eq!(report.score, 0.0);
    }

    #[test]
    fn test_quality_empty_records() {
        let report = quality_report(&[], &full_completeness(), ts(0));
        assert_eq!(report.score, 0.0);
        assert_eq!(report.issues, vec!["No data available".to_string()]);
        assert_eq!(report.time_span, "0.0 days");
    }

    #[test]
    fn test_time_span_rendering() {
        let records = full_records(36);
        let latest = records.last().unwrap().timestamp;
        let report = quality_report(&records, &full_completeness(), latest);
        assert_eq!(report.time_span, "1.5 days");
    }

    #[test]
    fn test_compute_statistics_assembles_all_blocks() {
        let records = full_records(200);
        let latest = records.last().unwrap().timestamp;
        let stats = compute_statistics(&records, &full_completeness(), latest);

        assert_eq!(stats.solar.count, 200);
        assert_eq!(stats.correlations.len(), 6);
        assert_eq!(stats.quality.score, 100.0);
        for field in ScalarField::ALL {
            assert!(stats.field(field).count > 0);
        }
    }
}
