//! Aligner stage: map raw streams onto a uniform hourly timeline.
//!
//! The timeline spans `[min, max]` of all observed timestamps and advances by
//! calendar-naive one-hour UTC increments. Each slot is filled per field by a
//! nearest-timestamp search over the raw sequence, accepted only within a
//! two-hour radius; unmatched fields stay `None` for the gap filler.

use chrono::{DateTime, Duration, Utc};

use super::loader::RawStreams;
use crate::api::{AlignedRecord, RawSample, ScalarField, TimeRange};

/// Acceptance radius for nearest-match assignment, in milliseconds.
pub const MATCH_RADIUS_MS: i64 = 2 * 60 * 60 * 1000;

/// Align the raw streams onto the hourly timeline.
///
/// Returns `None` when no samples exist across all kinds. Otherwise the
/// aligned sequence is strictly ordered by timestamp with exactly one record
/// per whole hour between the earliest and latest observed timestamp,
/// inclusive, and `aligned.len() == time_range.hours`.
///
/// The per-slot nearest search scans each sequence linearly, O(n·m) overall.
/// Acceptable at current volumes; switch to a sorted binary search if input
/// sizes grow.
pub fn align(streams: &RawStreams) -> Option<(Vec<AlignedRecord>, TimeRange)> {
    let start = streams.iter_all().map(|s| s.timestamp).min()?;
    let end = streams.iter_all().map(|s| s.timestamp).max()?;

    let hours = ((end - start).num_hours() + 1) as usize;
    let mut aligned = Vec::with_capacity(hours);

    for i in 0..hours {
        let slot = start + Duration::hours(i as i64);
        let mut record = AlignedRecord::empty(slot);

        record.solar = nearest(&streams.solar, slot).map(|s| s.value);
        record.load = nearest(&streams.load, slot).map(|s| s.value);
        record.battery_soc = nearest(&streams.battery, slot).map(|s| s.value);
        if let Some(price) = nearest(&streams.prices, slot) {
            record.price = Some(price.value);
            record.price_level = price.level;
        }

        aligned.push(record);
    }

    let time_range = TimeRange { start, end, hours };
    Some((aligned, time_range))
}

/// Find the sample closest in time to `slot`, within the acceptance radius.
fn nearest(samples: &[RawSample], slot: DateTime<Utc>) -> Option<&RawSample> {
    samples
        .iter()
        .min_by_key(|s| (s.timestamp - slot).num_milliseconds().abs())
        .filter(|s| (s.timestamp - slot).num_milliseconds().abs() <= MATCH_RADIUS_MS)
}

/// Per-field completeness ratios of an aligned (pre-repair) sequence.
///
/// Used by the quality engine; after gap filling every field is non-null by
/// construction, so completeness has to be measured here.
pub fn completeness(aligned: &[AlignedRecord]) -> Vec<(ScalarField, f64)> {
    ScalarField::ALL
        .iter()
        .map(|&field| {
            let ratio = if aligned.is_empty() {
                0.0
            } else {
                let present = aligned.iter().filter(|r| r.get(field).is_some()).count();
                present as f64 / aligned.len() as f64
            };
            (field, ratio)
        })
        .collect()
}
