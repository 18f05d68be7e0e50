//! Dwell-time aggregation: hours spent per cluster.
//!
//! Time is attributed via consecutive-sample deltas: the gap between a
//! sample and its predecessor counts toward the cluster of the *current*
//! sample (time "spent arriving at / dwelling in" that place). The first
//! sample has no predecessor and contributes zero hours.
//!
//! Noise rows are kept in the output; callers that want them gone filter at
//! the call site (the temporal decompositions do exactly that).

use crate::{ClusterDwell, LabeledSample};
use std::collections::HashMap;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Compute total hours per cluster from a time-ordered labeled sequence.
///
/// Sorting by timestamp is idempotent if the input is already ordered; ties
/// keep their input order (stable sort). Output rows are sorted by hours
/// descending, ties broken by ascending cluster id.
///
/// Empty input yields an empty table; a single sample yields one zero-hour
/// row.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use place_miner::{compute_dwell, LabeledSample};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
/// let samples: Vec<LabeledSample> = [(0, 0), (1, 0), (3, 1), (4, 0)]
///     .iter()
///     .map(|&(h, cluster)| LabeledSample {
///         timestamp: t0 + chrono::Duration::hours(h),
///         latitude: 46.5,
///         longitude: 6.6,
///         accuracy: 10.0,
///         cluster,
///     })
///     .collect();
///
/// let dwell = compute_dwell(&samples);
/// assert_eq!(dwell[0].cluster, 0); // 2.0h, tie broken by ascending id
/// assert_eq!(dwell[1].cluster, 1); // 2.0h
/// ```
pub fn compute_dwell(samples: &[LabeledSample]) -> Vec<ClusterDwell> {
    if samples.is_empty() {
        return vec![];
    }

    let mut ordered: Vec<&LabeledSample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);

    let mut hours_by_cluster: HashMap<i64, f64> = HashMap::new();

    // First sample: zero delta, but the cluster still gets a row
    hours_by_cluster.entry(ordered[0].cluster).or_insert(0.0);

    for pair in ordered.windows(2) {
        let delta_ms = (pair[1].timestamp - pair[0].timestamp).num_milliseconds();
        let hours = delta_ms as f64 / MILLIS_PER_HOUR;
        *hours_by_cluster.entry(pair[1].cluster).or_insert(0.0) += hours;
    }

    let mut dwell: Vec<ClusterDwell> = hours_by_cluster
        .into_iter()
        .map(|(cluster, hours)| ClusterDwell { cluster, hours })
        .collect();

    dwell.sort_by(|a, b| {
        b.hours
            .partial_cmp(&a.hours)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cluster.cmp(&b.cluster))
    });

    dwell
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NOISE;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
    }

    fn labeled(hours_offset: i64, cluster: i64) -> LabeledSample {
        LabeledSample {
            timestamp: base() + Duration::hours(hours_offset),
            latitude: 46.5197,
            longitude: 6.6323,
            accuracy: 10.0,
            cluster,
        }
    }

    #[test]
    fn test_attribution_to_current_sample() {
        // t=0h A, t=1h A, t=3h B, t=4h A
        // deltas: 1h -> A, 2h -> B, 1h -> A; A = 2.0, B = 2.0
        let samples = vec![labeled(0, 0), labeled(1, 0), labeled(3, 1), labeled(4, 0)];
        let dwell = compute_dwell(&samples);

        assert_eq!(dwell.len(), 2);
        assert_eq!(dwell[0].cluster, 0); // tie at 2.0h, ascending id wins
        assert!((dwell[0].hours - 2.0).abs() < 1e-9);
        assert_eq!(dwell[1].cluster, 1);
        assert!((dwell[1].hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_sorting_is_idempotent_on_unsorted_input() {
        let sorted = vec![labeled(0, 0), labeled(1, 0), labeled(3, 1), labeled(4, 0)];
        let shuffled = vec![labeled(3, 1), labeled(0, 0), labeled(4, 0), labeled(1, 0)];
        assert_eq!(compute_dwell(&sorted), compute_dwell(&shuffled));
    }

    #[test]
    fn test_dwell_conservation() {
        // No noise, no partitioning: totals equal the elapsed span
        let samples = vec![labeled(0, 0), labeled(2, 1), labeled(5, 0), labeled(9, 2)];
        let dwell = compute_dwell(&samples);
        let total: f64 = dwell.iter().map(|d| d.hours).sum();
        assert!((total - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_noise_rows_are_kept() {
        let samples = vec![labeled(0, 0), labeled(1, NOISE), labeled(2, 0)];
        let dwell = compute_dwell(&samples);
        assert!(dwell.iter().any(|d| d.cluster == NOISE));
    }

    #[test]
    fn test_empty_input() {
        assert!(compute_dwell(&[]).is_empty());
    }

    #[test]
    fn test_single_sample() {
        let dwell = compute_dwell(&[labeled(0, 7)]);
        assert_eq!(dwell.len(), 1);
        assert_eq!(dwell[0].cluster, 7);
        assert_eq!(dwell[0].hours, 0.0);
    }

    #[test]
    fn test_descending_hours_order() {
        let samples = vec![labeled(0, 2), labeled(1, 1), labeled(4, 2), labeled(5, 1)];
        // deltas: 1h -> 1, 3h -> 2, 1h -> 1; cluster 2 = 3.0, cluster 1 = 2.0
        let dwell = compute_dwell(&samples);
        assert_eq!(dwell[0].cluster, 2);
        assert_eq!(dwell[1].cluster, 1);
        assert!(dwell[0].hours > dwell[1].hours);
    }
}
