//! Place-to-place movement transitions.
//!
//! Counts consecutive cluster pairs in time order. Pairs touching noise on
//! either end are dropped entirely, not merely hidden from output.
//! Self-transitions are counted: two dense readings of the same place in a
//! row are "stayed put" signal, not duplicates.

use crate::{LabeledSample, Transition};
use std::collections::HashMap;

/// Count movement transitions between clusters.
///
/// Sorts by timestamp (stable), then counts each consecutive
/// `(prev, curr)` pair where both clusters are non-noise. Output is sorted
/// by count descending, ties broken by `(from_cluster, to_cluster)`
/// ascending. Empty or all-noise input yields an empty table.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use place_miner::{transitions, LabeledSample};
///
/// let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
/// let samples: Vec<LabeledSample> = [0, 0, 1]
///     .iter()
///     .enumerate()
///     .map(|(i, &cluster)| LabeledSample {
///         timestamp: t0 + chrono::Duration::hours(i as i64),
///         latitude: 46.5,
///         longitude: 6.6,
///         accuracy: 10.0,
///         cluster,
///     })
///     .collect();
///
/// let table = transitions(&samples);
/// assert_eq!(table.len(), 2); // (0,0) and (0,1), one observation each
/// ```
pub fn transitions(samples: &[LabeledSample]) -> Vec<Transition> {
    if samples.len() < 2 {
        return vec![];
    }

    let mut ordered: Vec<&LabeledSample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);

    let mut counts: HashMap<(i64, i64), u64> = HashMap::new();
    for pair in ordered.windows(2) {
        let (prev, curr) = (pair[0], pair[1]);
        if prev.is_noise() || curr.is_noise() {
            continue;
        }
        *counts.entry((prev.cluster, curr.cluster)).or_insert(0) += 1;
    }

    let mut table: Vec<Transition> = counts
        .into_iter()
        .map(|((from_cluster, to_cluster), count)| Transition {
            from_cluster,
            to_cluster,
            count,
        })
        .collect();

    table.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then(a.from_cluster.cmp(&b.from_cluster))
            .then(a.to_cluster.cmp(&b.to_cluster))
    });

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NOISE;
    use chrono::{Duration, TimeZone, Utc};

    fn labeled(hours_offset: i64, cluster: i64) -> LabeledSample {
        LabeledSample {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
                + Duration::hours(hours_offset),
            latitude: 46.5197,
            longitude: 6.6323,
            accuracy: 10.0,
            cluster,
        }
    }

    fn from_clusters(clusters: &[i64]) -> Vec<LabeledSample> {
        clusters
            .iter()
            .enumerate()
            .map(|(i, &c)| labeled(i as i64, c))
            .collect()
    }

    #[test]
    fn test_self_transitions_are_counted() {
        // [A, A, B] -> {(A,A): 1, (A,B): 1}
        let table = transitions(&from_clusters(&[0, 0, 1]));
        assert_eq!(table.len(), 2);
        assert!(table.contains(&Transition { from_cluster: 0, to_cluster: 0, count: 1 }));
        assert!(table.contains(&Transition { from_cluster: 0, to_cluster: 1, count: 1 }));
    }

    #[test]
    fn test_noise_pairs_dropped_entirely() {
        // A -> noise -> B produces no transitions at all; the noise sample
        // does not bridge A to B either.
        let table = transitions(&from_clusters(&[0, NOISE, 1]));
        assert!(table.is_empty());
    }

    #[test]
    fn test_noise_exclusion_invariant() {
        let table = transitions(&from_clusters(&[0, NOISE, 1, 1, NOISE, 2, 0]));
        assert!(!table.is_empty());
        for t in &table {
            assert_ne!(t.from_cluster, NOISE);
            assert_ne!(t.to_cluster, NOISE);
        }
    }

    #[test]
    fn test_tie_break_ordering() {
        // A->A, A->B, B->A each observed once
        let table = transitions(&from_clusters(&[0, 0, 1, 0]));
        let pairs: Vec<(i64, i64)> = table.iter().map(|t| (t.from_cluster, t.to_cluster)).collect();
        assert_eq!(pairs, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_count_descending() {
        let table = transitions(&from_clusters(&[0, 1, 0, 1, 0, 2]));
        // (0,1): 2, (1,0): 2, (0,2): 1
        assert_eq!(table[0], Transition { from_cluster: 0, to_cluster: 1, count: 2 });
        assert_eq!(table[1], Transition { from_cluster: 1, to_cluster: 0, count: 2 });
        assert_eq!(table[2], Transition { from_cluster: 0, to_cluster: 2, count: 1 });
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let mut samples = from_clusters(&[0, 0, 1]);
        samples.reverse();
        let table = transitions(&samples);
        assert!(table.contains(&Transition { from_cluster: 0, to_cluster: 0, count: 1 }));
        assert!(table.contains(&Transition { from_cluster: 0, to_cluster: 1, count: 1 }));
    }

    #[test]
    fn test_empty_and_all_noise() {
        assert!(transitions(&[]).is_empty());
        assert!(transitions(&from_clusters(&[NOISE, NOISE, NOISE])).is_empty());
        assert!(transitions(&from_clusters(&[3])).is_empty());
    }
}
