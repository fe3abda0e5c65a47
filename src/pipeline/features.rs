//! Feature extraction stage: calendar and cyclical features per slot.
//!
//! Features are attached as a nested structure on each record and never
//! overwrite the raw scalar fields. Hour-of-day and day-of-year also get
//! sinusoidal encodings so models can learn their cyclical nature.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::api::{AlignedRecord, Season, TimeFeatures};

/// Attach derived time features to every record.
pub fn with_features(aligned: &[AlignedRecord]) -> Vec<AlignedRecord> {
    aligned
        .iter()
        .map(|record| {
            let mut enriched = record.clone();
            enriched.features = Some(features_for(record.timestamp));
            enriched
        })
        .collect()
}

/// Derive the feature set for one timestamp.
pub fn features_for(timestamp: DateTime<Utc>) -> TimeFeatures {
    let hour = timestamp.hour();
    let day_of_week = timestamp.weekday().num_days_from_monday();
    let day_of_year = timestamp.ordinal();
    let month = timestamp.month();

    TimeFeatures {
        hour,
        day_of_week,
        day_of_month: timestamp.day(),
        month,
        day_of_year,
        is_weekend: matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun),
        season: season_for_month(month),
        hour_sin: (2.0 * PI * hour as f64 / 24.0).sin(),
        hour_cos: (2.0 * PI * hour as f64 / 24.0).cos(),
        day_of_year_sin: (2.0 * PI * day_of_year as f64 / 365.0).sin(),
        day_of_year_cos: (2.0 * PI * day_of_year as f64 / 365.0).cos(),
    }
}

/// Four-way season by month range: Mar-May spring, Jun-Aug summer,
/// Sep-Nov autumn, Dec-Feb winter.
pub fn season_for_month(month: u32) -> Season {
    match month {
        3..=5 => Season::Spring,
        6..=8 => Season::Summer,
        9..=11 => Season::Autumn,
        _ => Season::Winter,
    }
}
