//! Per-user summary statistics for reporting.

use crate::dwell::compute_dwell;
use crate::{LabeledSample, UserSummary};
use std::collections::HashSet;

/// Summarize a user's labeled samples: point counts, distinct non-noise
/// cluster count, and the top `top_n` cluster ids by overall dwell hours
/// (noise excluded, ties by ascending id).
///
/// "No clusters" is valid output: a sparse user yields zero counts and an
/// empty top list, never an error.
pub fn summarize_user(samples: &[LabeledSample], top_n: usize) -> UserSummary {
    let total_points = samples.len() as u64;
    let noise_points = samples.iter().filter(|s| s.is_noise()).count() as u64;

    let distinct: HashSet<i64> = samples
        .iter()
        .filter(|s| !s.is_noise())
        .map(|s| s.cluster)
        .collect();

    let non_noise: Vec<LabeledSample> = samples
        .iter()
        .filter(|s| !s.is_noise())
        .copied()
        .collect();
    let top_overall_clusters: Vec<i64> = compute_dwell(&non_noise)
        .into_iter()
        .take(top_n)
        .map(|d| d.cluster)
        .collect();

    UserSummary {
        total_points,
        non_noise_points: total_points - noise_points,
        noise_points,
        distinct_cluster_count: distinct.len() as u64,
        top_overall_clusters,
    }
}
