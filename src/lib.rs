//! # Place Miner
//!
//! Spatial-temporal clustering and dwell-time analysis for GPS location history.
//!
//! This library provides:
//! - Per-month DBSCAN clustering of GPS samples into visited "places"
//! - Dwell-time aggregation (hours spent per place)
//! - Weekday/weekend and monthly decompositions of dwell time
//! - Place-to-place movement transition counts
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel processing with rayon
//! - **`persistence`** - Enable CSV caching of labeled samples
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use place_miner::{cluster_samples, compute_dwell, ClusterConfig, Sample};
//!
//! // A tight knot of readings around one spot
//! let samples: Vec<Sample> = (0..6)
//!     .map(|i| {
//!         Sample::new(
//!             Utc.with_ymd_and_hms(2024, 3, 1, 8, i, 0).unwrap(),
//!             46.5197 + i as f64 * 1e-6,
//!             6.6323,
//!             10.0,
//!         )
//!     })
//!     .collect();
//!
//! let outcome = cluster_samples(&samples, &ClusterConfig::default()).unwrap();
//! let dwell = compute_dwell(&outcome.labeled);
//! assert_eq!(dwell.len(), 1);
//! ```

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// Unified error handling
pub mod error;
pub use error::{OptionExt, PlaceMinerError, Result};

// Geographic utilities (haversine distance, meter/degree conversions)
pub mod geo_utils;
pub use geo_utils::{haversine_distance, MEAN_EARTH_RADIUS_M};

// Sample cleaning (accuracy filter, validity checks, time ordering)
pub mod cleaning;
pub use cleaning::{clean_samples, CleanConfig};

// Per-month DBSCAN place clustering
pub mod clustering;
pub use clustering::{cluster_samples, dbscan, ClusterConfig, ClusterOutcome, MonthFailure};

// Dwell-time aggregation
pub mod dwell;
pub use dwell::compute_dwell;

// Weekday/weekend and monthly decompositions
pub mod temporal;
pub use temporal::{monthly_top, weekday_weekend};

// Place-to-place movement transitions
pub mod transitions;
pub use transitions::transitions;

// Per-user summary statistics
pub mod summary;
pub use summary::summarize_user;

// End-to-end per-user pipeline
pub mod pipeline;
pub use pipeline::{analyze_user, analyze_users, PipelineConfig, UserReport};

// Text report rendering
pub mod report;
pub use report::render_user_report;

// CSV cache for labeled samples
#[cfg(feature = "persistence")]
pub mod persistence;
#[cfg(feature = "persistence")]
pub use persistence::{read_labeled_csv, write_labeled_csv};

// ============================================================================
// Core Types
// ============================================================================

/// Reserved cluster label for samples that belong to no dense region.
pub const NOISE: i64 = -1;

/// One cleaned GPS reading.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use place_miner::Sample;
/// let s = Sample::new(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap(), 51.5074, -0.1278, 12.0);
/// assert!(s.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// UTC timestamp of the reading
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Reported positional accuracy (same unit as the source export)
    pub accuracy: f64,
}

impl Sample {
    /// Create a new sample.
    pub fn new(timestamp: DateTime<Utc>, latitude: f64, longitude: f64, accuracy: f64) -> Self {
        Self {
            timestamp,
            latitude,
            longitude,
            accuracy,
        }
    }

    /// Check if the sample has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Calendar month (UTC) this sample falls in.
    pub fn month(&self) -> MonthKey {
        MonthKey::from_timestamp(&self.timestamp)
    }
}

/// A sample with its assigned cluster label.
///
/// Produced by the clusterer, never mutated afterwards. The label is scoped
/// to the month the sample was clustered within: cluster `k` in January and
/// cluster `k` in February denote unrelated physical places.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabeledSample {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    /// Cluster id, or [`NOISE`] (-1)
    pub cluster: i64,
}

impl LabeledSample {
    /// Attach a cluster label to a sample.
    pub fn from_sample(sample: &Sample, cluster: i64) -> Self {
        Self {
            timestamp: sample.timestamp,
            latitude: sample.latitude,
            longitude: sample.longitude,
            accuracy: sample.accuracy,
            cluster,
        }
    }

    /// Whether this sample carries the noise label.
    pub fn is_noise(&self) -> bool {
        self.cluster == NOISE
    }

    /// Calendar month (UTC) this sample falls in. Derived, not stored.
    pub fn month(&self) -> MonthKey {
        MonthKey::from_timestamp(&self.timestamp)
    }
}

/// A calendar-month bucket, e.g. `2024-03`.
///
/// Used both for re-clustering (places are re-discovered per month) and for
/// trend aggregation. Serializes as its `YYYY-MM` label so month-keyed maps
/// survive a JSON round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl MonthKey {
    /// Month bucket for a UTC timestamp.
    pub fn from_timestamp(timestamp: &DateTime<Utc>) -> Self {
        Self {
            year: timestamp.year(),
            month: timestamp.month(),
        }
    }

    /// First instant of this month, handy for fixtures.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(self.year, self.month, 1, 0, 0, 0)
            .single()
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = PlaceMinerError;

    fn from_str(s: &str) -> Result<Self> {
        let (year, month) = s
            .split_once('-')
            .ok_or_internal(&format!("malformed month label '{}'", s))?;
        let year: i32 = year.parse().map_err(|_| PlaceMinerError::Internal {
            message: format!("malformed month label '{}'", s),
        })?;
        let month: u32 = month.parse().map_err(|_| PlaceMinerError::Internal {
            message: format!("malformed month label '{}'", s),
        })?;
        if !(1..=12).contains(&month) {
            return Err(PlaceMinerError::Internal {
                message: format!("month out of range in '{}'", s),
            });
        }
        Ok(Self { year, month })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Hours attributed to one cluster over an input sample set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterDwell {
    /// Cluster id, or [`NOISE`] if the caller kept noise in
    pub cluster: i64,
    /// Total hours, always >= 0
    pub hours: f64,
}

/// Observed movement count between two clusters.
///
/// Both endpoints are always non-noise; noise-involved pairs are dropped
/// entirely during counting. Self-transitions are counted, they represent
/// continued dwell at the same place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from_cluster: i64,
    pub to_cluster: i64,
    pub count: u64,
}

/// Per-user summary statistics for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    /// Total labeled samples
    pub total_points: u64,
    /// Samples assigned to a cluster
    pub non_noise_points: u64,
    /// Samples labeled as noise
    pub noise_points: u64,
    /// Distinct non-noise cluster ids
    pub distinct_cluster_count: u64,
    /// Cluster ids ordered by overall dwell hours, noise excluded
    pub top_overall_clusters: Vec<i64>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn test_sample_validation() {
        assert!(Sample::new(ts(8, 0), 51.5074, -0.1278, 10.0).is_valid());
        assert!(!Sample::new(ts(8, 0), 91.0, 0.0, 10.0).is_valid());
        assert!(!Sample::new(ts(8, 0), 0.0, 181.0, 10.0).is_valid());
        assert!(!Sample::new(ts(8, 0), f64::NAN, 0.0, 10.0).is_valid());
    }

    #[test]
    fn test_month_key() {
        let key = MonthKey::from_timestamp(&ts(8, 0));
        assert_eq!(key, MonthKey { year: 2024, month: 3 });
        assert_eq!(key.to_string(), "2024-03");
        assert!(key < MonthKey { year: 2024, month: 4 });
        assert!(key > MonthKey { year: 2023, month: 12 });
    }

    #[test]
    fn test_month_key_label_round_trip() {
        let key = MonthKey { year: 2024, month: 3 };
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"2024-03\"");
        let back: MonthKey = serde_json::from_str(&json).unwrap();
        assert_eq!(back, key);
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("march".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_labeled_sample_month_is_derived() {
        let s = Sample::new(ts(8, 0), 51.5074, -0.1278, 10.0);
        let labeled = LabeledSample::from_sample(&s, 3);
        assert_eq!(labeled.month(), s.month());
        assert!(!labeled.is_noise());
        assert!(LabeledSample::from_sample(&s, NOISE).is_noise());
    }
}
