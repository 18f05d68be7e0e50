//! Weekday/weekend and monthly decompositions of dwell time.
//!
//! Both views filter noise out *before* aggregating, then hand each
//! partition to [`compute_dwell`] independently. Each partition's deltas
//! come only from its own consecutive pairs, so the interval spanning a
//! weekday/weekend boundary is discounted rather than split — a known,
//! accepted undercount inherited from the partition-then-difference design.

use crate::dwell::compute_dwell;
use crate::{ClusterDwell, LabeledSample, MonthKey};
use chrono::{Datelike, Weekday};
use std::collections::BTreeMap;

/// Whether a sample falls on a Saturday or Sunday (UTC).
fn is_weekend(sample: &LabeledSample) -> bool {
    matches!(sample.timestamp.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Split dwell hours into weekday and weekend views.
///
/// Noise-labeled samples contribute to neither partition. Every non-noise
/// sample lands in exactly one of the two; time order is preserved within
/// each. Returns `(weekday_dwell, weekend_dwell)`.
pub fn weekday_weekend(samples: &[LabeledSample]) -> (Vec<ClusterDwell>, Vec<ClusterDwell>) {
    let mut week: Vec<LabeledSample> = Vec::new();
    let mut weekend: Vec<LabeledSample> = Vec::new();

    for sample in samples {
        if sample.is_noise() {
            continue;
        }
        if is_weekend(sample) {
            weekend.push(*sample);
        } else {
            week.push(*sample);
        }
    }

    (compute_dwell(&week), compute_dwell(&weekend))
}

/// Top `n` clusters by dwell hours for each calendar month.
///
/// Months are the same UTC buckets the clusterer uses. Noise is excluded
/// before aggregation; a month whose samples are all noise still gets a key
/// with an empty table. Rows per month follow [`compute_dwell`] order
/// (hours descending, ties by ascending cluster id), truncated to `n`.
pub fn monthly_top(samples: &[LabeledSample], n: usize) -> BTreeMap<MonthKey, Vec<ClusterDwell>> {
    let mut by_month: BTreeMap<MonthKey, Vec<LabeledSample>> = BTreeMap::new();
    for sample in samples {
        by_month.entry(sample.month()).or_default().push(*sample);
    }

    by_month
        .into_iter()
        .map(|(month, group)| {
            let non_noise: Vec<LabeledSample> =
                group.into_iter().filter(|s| !s.is_noise()).collect();
            let mut dwell = compute_dwell(&non_noise);
            dwell.truncate(n);
            (month, dwell)
        })
        .collect()
}
