//! End-to-end per-user pipeline: clean, cluster, aggregate.
//!
//! Per-user processing is stateless and embarrassingly parallel: no shared
//! mutable state crosses users, so the batch entry point is a plain
//! parallel map when the `parallel` feature is on. The three analysis views
//! (monthly top, weekday/weekend, transitions) are independent read-only
//! passes over the clusterer's output.

use crate::cleaning::{clean_samples, CleanConfig};
use crate::clustering::{cluster_samples, ClusterConfig, MonthFailure};
use crate::dwell::compute_dwell;
use crate::error::Result;
use crate::summary::summarize_user;
use crate::temporal::{monthly_top, weekday_weekend};
use crate::transitions::transitions;
use crate::{ClusterDwell, LabeledSample, MonthKey, Sample, Transition, UserSummary};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Configuration for the full per-user pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub clean: CleanConfig,
    pub cluster: ClusterConfig,
    /// Rows kept in each top-clusters table
    pub top_n: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            clean: CleanConfig::default(),
            cluster: ClusterConfig::default(),
            top_n: 5,
        }
    }
}

/// Everything derived for one user, ready for reporting and mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReport {
    pub user_id: String,
    /// Labeled samples for map rendering (latitude, longitude, timestamp,
    /// cluster), month order with within-month time order preserved
    pub labeled: Vec<LabeledSample>,
    /// Months whose clustering unit failed; their samples are absent
    pub month_failures: Vec<MonthFailure>,
    /// Top clusters by dwell hours per month, noise excluded
    pub monthly_top: BTreeMap<MonthKey, Vec<ClusterDwell>>,
    /// Ordered top cluster ids per month, for map consumers
    pub monthly_top_clusters: BTreeMap<MonthKey, Vec<i64>>,
    /// Weekday dwell, noise excluded, truncated to `top_n`
    pub week_dwell: Vec<ClusterDwell>,
    /// Weekend dwell, noise excluded, truncated to `top_n`
    pub weekend_dwell: Vec<ClusterDwell>,
    /// Movement transitions, noise pairs dropped
    pub transitions: Vec<Transition>,
    pub summary: UserSummary,
}

/// Run the full pipeline for one user's raw samples.
///
/// An unusable cluster configuration is the only hard error; a month unit
/// failing inside clustering is carried on the report instead of aborting
/// the user.
pub fn analyze_user(user_id: &str, raw: Vec<Sample>, config: &PipelineConfig) -> Result<UserReport> {
    let cleaned = clean_samples(raw, &config.clean);
    let outcome = cluster_samples(&cleaned, &config.cluster)?;

    let monthly = monthly_top(&outcome.labeled, config.top_n);
    let monthly_top_clusters: BTreeMap<MonthKey, Vec<i64>> = monthly
        .iter()
        .map(|(month, dwell)| (*month, dwell.iter().map(|d| d.cluster).collect()))
        .collect();

    let (mut week_dwell, mut weekend_dwell) = weekday_weekend(&outcome.labeled);
    week_dwell.truncate(config.top_n);
    weekend_dwell.truncate(config.top_n);

    let transition_table = transitions(&outcome.labeled);
    let summary = summarize_user(&outcome.labeled, config.top_n);

    info!(
        "[Pipeline] {}: {} clusters, {}/{} points non-noise, {} transitions",
        user_id,
        summary.distinct_cluster_count,
        summary.non_noise_points,
        summary.total_points,
        transition_table.len()
    );

    Ok(UserReport {
        user_id: user_id.to_string(),
        labeled: outcome.labeled,
        month_failures: outcome.failures,
        monthly_top: monthly,
        monthly_top_clusters,
        week_dwell,
        weekend_dwell,
        transitions: transition_table,
        summary,
    })
}

/// Run the pipeline for a batch of users.
///
/// Output order matches input order. With the `parallel` feature users are
/// processed on the rayon pool; results are identical either way.
pub fn analyze_users(
    users: Vec<(String, Vec<Sample>)>,
    config: &PipelineConfig,
) -> Vec<Result<UserReport>> {
    #[cfg(feature = "parallel")]
    {
        users
            .into_par_iter()
            .map(|(user_id, raw)| analyze_user(&user_id, raw, config))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        users
            .into_iter()
            .map(|(user_id, raw)| analyze_user(&user_id, raw, config))
            .collect()
    }
}

/// Derive the overall dwell table from an existing report's labeled samples,
/// noise excluded. Identical whether the samples came fresh from the
/// clusterer or round-tripped through the CSV cache.
pub fn overall_dwell(labeled: &[LabeledSample]) -> Vec<ClusterDwell> {
    let non_noise: Vec<LabeledSample> = labeled.iter().filter(|s| !s.is_noise()).copied().collect();
    compute_dwell(&non_noise)
}
