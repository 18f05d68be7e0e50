//! Per-month DBSCAN place clustering over the haversine metric.
//!
//! Samples are partitioned by calendar month (UTC) and each month group is
//! clustered independently with fixed-radius DBSCAN. Cluster ids are scoped
//! to their month: the same physical place visited in different months
//! receives independent ids. Points outside every dense region are labeled
//! [`NOISE`](crate::NOISE).
//!
//! ## Algorithm
//! 1. Group samples by month, preserving within-month input order
//! 2. Build an R-tree over each group's (lat, lng) coordinates
//! 3. Run DBSCAN: neighborhoods are all points within `eps_meters` surface
//!    distance (inclusive), the point itself counting toward `min_samples`
//! 4. Concatenate the labeled groups back, in month order
//!
//! Neighbor queries use a degree-envelope pre-filter on the R-tree followed
//! by an exact haversine post-filter, so `eps_meters` is a true
//! surface-distance radius. Dividing it by the Earth mean radius
//! (6,371,000 m) gives the equivalent great-circle angle.
//!
//! Clustering is deterministic for a fixed input order and parameters:
//! points are scanned in input order, neighbor lists are sorted by index,
//! and cluster ids are assigned in discovery order. The `parallel` feature
//! only spreads month groups across threads and does not change labels.

use crate::error::{PlaceMinerError, Result};
use crate::geo_utils::{haversine_distance, meters_to_degrees_lat, meters_to_degrees_lng};
use crate::{LabeledSample, MonthKey, Sample, NOISE};
use log::{info, warn};
use rstar::{PointDistance, RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Configuration for place clustering.
///
/// This crate uses the fixed-radius DBSCAN family: `eps_meters` is a hard
/// neighborhood radius in surface meters and `min_samples` is the inclusive
/// density threshold (a point plus its neighbors). The two values are not
/// interchangeable with hierarchical-density variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Neighborhood radius in meters
    pub eps_meters: f64,
    /// Minimum points (including the point itself) to form a dense region
    pub min_samples: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            eps_meters: 50.0, // GPS accuracy filter is 50 units too
            min_samples: 5,
        }
    }
}

impl ClusterConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.eps_meters.is_finite() || self.eps_meters <= 0.0 {
            return Err(PlaceMinerError::ConfigError {
                message: format!("eps_meters must be finite and > 0, got {}", self.eps_meters),
            });
        }
        if self.min_samples == 0 {
            return Err(PlaceMinerError::ConfigError {
                message: "min_samples must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// A failed (user, month) clustering unit, surfaced without aborting the rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthFailure {
    pub month: MonthKey,
    pub message: String,
}

/// Result of clustering one user's samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterOutcome {
    /// Labeled samples from all months that clustered successfully
    pub labeled: Vec<LabeledSample>,
    /// Months whose unit failed (their samples are omitted from `labeled`)
    pub failures: Vec<MonthFailure>,
}

// ============================================================================
// R-tree neighbor search
// ============================================================================

/// A coordinate with its index for R-tree queries.
#[derive(Debug, Clone, Copy)]
struct IndexedPoint {
    idx: usize,
    lat: f64,
    lng: f64,
}

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.lat, self.lng])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlat = self.lat - point[0];
        let dlng = self.lng - point[1];
        dlat * dlat + dlng * dlng
    }
}

fn build_rtree(points: &[(f64, f64)]) -> RTree<IndexedPoint> {
    let indexed: Vec<IndexedPoint> = points
        .iter()
        .enumerate()
        .map(|(i, &(lat, lng))| IndexedPoint { idx: i, lat, lng })
        .collect();
    RTree::bulk_load(indexed)
}

/// All point indices within `eps_meters` of `points[center]`, self included,
/// sorted ascending for deterministic expansion order.
fn region_query(
    tree: &RTree<IndexedPoint>,
    points: &[(f64, f64)],
    center: usize,
    eps_meters: f64,
) -> Vec<usize> {
    let (lat, lng) = points[center];
    // The box must contain every point of the haversine disc. Latitude
    // degrees convert exactly on the sphere; the longitude pad is taken at
    // the band edge nearest the pole, where degrees are shortest, and both
    // pads carry a hair of slack for rounding.
    let pad = eps_meters * (1.0 + 1e-6);
    let lat_pad = meters_to_degrees_lat(pad);
    let lng_pad = meters_to_degrees_lng(pad, (lat.abs() + lat_pad).min(90.0));
    let envelope = AABB::from_corners([lat - lat_pad, lng - lng_pad], [lat + lat_pad, lng + lng_pad]);

    let mut neighbors: Vec<usize> = tree
        .locate_in_envelope(&envelope)
        .filter(|p| haversine_distance(lat, lng, p.lat, p.lng) <= eps_meters)
        .map(|p| p.idx)
        .collect();
    neighbors.sort_unstable();
    neighbors
}

// ============================================================================
// DBSCAN
// ============================================================================

/// Label `(latitude, longitude)` points with fixed-radius DBSCAN under the
/// haversine metric.
///
/// Returns one label per input point, in input order. Dense regions receive
/// consecutive ids starting at 0; everything else is [`NOISE`](crate::NOISE).
///
/// # Example
/// ```
/// use place_miner::clustering::dbscan;
///
/// let points = vec![
///     (46.5197, 6.6323),
///     (46.51971, 6.63231),
///     (46.51972, 6.63229),
///     (47.0, 7.0), // isolated
/// ];
/// let labels = dbscan(&points, 50.0, 3);
/// assert_eq!(labels, vec![0, 0, 0, -1]);
/// ```
pub fn dbscan(points: &[(f64, f64)], eps_meters: f64, min_samples: usize) -> Vec<i64> {
    let n = points.len();
    let mut labels: Vec<i64> = vec![NOISE; n];
    if n == 0 {
        return labels;
    }

    let tree = build_rtree(points);
    let mut visited = vec![false; n];
    let mut next_cluster: i64 = 0;

    for i in 0..n {
        if visited[i] {
            continue;
        }
        visited[i] = true;

        let neighbors = region_query(&tree, points, i, eps_meters);
        if neighbors.len() < min_samples {
            // Not a core point; stays noise unless a later cluster claims it
            continue;
        }

        labels[i] = next_cluster;
        let mut queue: VecDeque<usize> = neighbors.into_iter().collect();

        while let Some(j) = queue.pop_front() {
            if labels[j] == NOISE {
                // Border point reached from a core point
                labels[j] = next_cluster;
            }
            if visited[j] {
                continue;
            }
            visited[j] = true;
            labels[j] = next_cluster;

            let expansion = region_query(&tree, points, j, eps_meters);
            if expansion.len() >= min_samples {
                queue.extend(expansion);
            }
        }

        next_cluster += 1;
    }

    labels
}

// ============================================================================
// Per-month clustering
// ============================================================================

/// Cluster a user's time-ordered samples into places, one DBSCAN run per
/// calendar month.
///
/// Month groups with no samples are skipped. A failure inside one month's
/// unit (e.g. a non-finite coordinate that slipped past cleaning) is
/// isolated into [`ClusterOutcome::failures`] and does not abort the other
/// months. Returns an error only for an invalid configuration.
pub fn cluster_samples(samples: &[Sample], config: &ClusterConfig) -> Result<ClusterOutcome> {
    config.validate()?;

    // BTreeMap keeps months ordered; pushing preserves within-month order
    let mut by_month: BTreeMap<MonthKey, Vec<Sample>> = BTreeMap::new();
    for sample in samples {
        by_month.entry(sample.month()).or_default().push(*sample);
    }

    let groups: Vec<(MonthKey, Vec<Sample>)> = by_month.into_iter().collect();

    #[cfg(feature = "parallel")]
    let results: Vec<(MonthKey, Result<Vec<LabeledSample>>)> = groups
        .par_iter()
        .map(|(month, group)| (*month, cluster_month(*month, group, config)))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(MonthKey, Result<Vec<LabeledSample>>)> = groups
        .iter()
        .map(|(month, group)| (*month, cluster_month(*month, group, config)))
        .collect();

    let mut outcome = ClusterOutcome {
        labeled: Vec::with_capacity(samples.len()),
        failures: Vec::new(),
    };

    for (month, result) in results {
        match result {
            Ok(labeled) => outcome.labeled.extend(labeled),
            Err(err) => {
                warn!("[Cluster] {}: {}", month, err);
                outcome.failures.push(MonthFailure {
                    month,
                    message: err.to_string(),
                });
            }
        }
    }

    Ok(outcome)
}

/// Cluster a single month group.
fn cluster_month(
    month: MonthKey,
    group: &[Sample],
    config: &ClusterConfig,
) -> Result<Vec<LabeledSample>> {
    // Cleaned input is a precondition; violation fails this unit, loudly
    if let Some(bad) = group.iter().position(|s| !s.is_valid()) {
        return Err(PlaceMinerError::ClusterUnitFailed {
            month,
            message: format!(
                "sample {} has invalid coordinates ({}, {})",
                bad, group[bad].latitude, group[bad].longitude
            ),
        });
    }

    let coords: Vec<(f64, f64)> = group.iter().map(|s| (s.latitude, s.longitude)).collect();
    let labels = dbscan(&coords, config.eps_meters, config.min_samples);

    let labeled: Vec<LabeledSample> = group
        .iter()
        .zip(labels.iter())
        .map(|(sample, &cluster)| LabeledSample::from_sample(sample, cluster))
        .collect();

    let noise = labeled.iter().filter(|s| s.is_noise()).count();
    let clusters = labels.iter().copied().filter(|&c| c != NOISE).max().map_or(0, |m| m + 1);
    info!(
        "[Cluster] {}: {} clusters detected (total points={}, non-noise={}, noise={})",
        month,
        clusters,
        labeled.len(),
        labeled.len() - noise,
        noise
    );

    Ok(labeled)
}
