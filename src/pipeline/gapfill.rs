//! Gap filler stage: repair missing aligned values without removing slots.
//!
//! For each scalar field, every gap is repaired from its nearest non-null
//! neighbors, in priority order: linear interpolation between both neighbors,
//! forward fill from a preceding neighbor, backward fill from a following
//! neighbor, and finally the per-field fixed default when the field has no
//! observed value at all. After this stage no scalar field is `None`.

use crate::api::{AlignedRecord, ScalarField};

/// Repair all scalar gaps in the aligned sequence.
///
/// Pure transformation: the input is left untouched and a repaired copy is
/// returned.
pub fn fill_gaps(aligned: &[AlignedRecord]) -> Vec<AlignedRecord> {
    let mut repaired = aligned.to_vec();

    for field in ScalarField::ALL {
        let values: Vec<Option<f64>> = repaired.iter().map(|r| r.get(field)).collect();

        for i in 0..repaired.len() {
            if values[i].is_some() {
                continue;
            }

            let prev = values[..i]
                .iter()
                .enumerate()
                .rev()
                .find_map(|(j, v)| v.map(|value| (j, value)));
            let next = values[i + 1..]
                .iter()
                .enumerate()
                .find_map(|(j, v)| v.map(|value| (i + 1 + j, value)));

            let filled = match (prev, next) {
                (Some((j, a)), Some((k, b))) => {
                    // Weight by the gap's relative position between neighbors.
                    let t = (i - j) as f64 / (k - j) as f64;
                    a + (b - a) * t
                }
                (Some((_, a)), None) => a,
                (None, Some((_, b))) => b,
                (None, None) => field.fill_default(),
            };
            repaired[i].set(field, Some(filled));
        }
    }

    repaired
}
