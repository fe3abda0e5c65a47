//! Smoother stage: centered moving average over the power fields.
//!
//! Applies a 7-sample centered window (half-window 3) to `solar` and `load`
//! only. The first and last three slots are left unmodified; there is no
//! wraparound and no edge-shrinking window. Window values are drawn from the
//! already-repaired, already-outlier-filtered series.

use crate::api::{AlignedRecord, ScalarField};

/// Half-window of the centered moving average.
pub const HALF_WINDOW: usize = 3;

const SMOOTHED_FIELDS: [ScalarField; 2] = [ScalarField::Solar, ScalarField::Load];

/// Smooth the solar and load fields with a centered moving average.
///
/// Pure transformation: window values are always read from the input slice,
/// never from already-smoothed output.
pub fn smooth_power_fields(aligned: &[AlignedRecord]) -> Vec<AlignedRecord> {
    let mut smoothed = aligned.to_vec();
    if aligned.len() <= 2 * HALF_WINDOW {
        return smoothed;
    }

    for field in SMOOTHED_FIELDS {
        for i in HALF_WINDOW..aligned.len() - HALF_WINDOW {
            let window: Vec<f64> = aligned[i - HALF_WINDOW..=i + HALF_WINDOW]
                .iter()
                .filter_map(|r| r.get(field))
                .collect();

            // Gap filling guarantees a full window; skip rather than shrink
            // if a value is somehow absent.
            if window.len() == 2 * HALF_WINDOW + 1 {
                let mean = window.iter().sum::<f64>() / window.len() as f64;
                smoothed[i].set(field, Some(mean));
            }
        }
    }

    smoothed
}
