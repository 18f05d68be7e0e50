//! Sample cleaning: validity checks, accuracy filtering and time ordering.
//!
//! Produces the cleaned per-user sequence the clusterer consumes. Everything
//! downstream assumes this has run: finite in-range coordinates, accuracy
//! within threshold, samples sorted by time.

use crate::Sample;
use log::info;
use serde::{Deserialize, Serialize};

/// Configuration for sample cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanConfig {
    /// Maximum reported positional accuracy to keep (unit matches the
    /// source accuracy field; larger means worse)
    pub max_accuracy: f64,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self { max_accuracy: 50.0 }
    }
}

/// Clean a raw per-user sample sequence.
///
/// Drops samples with invalid coordinates or non-finite accuracy, drops
/// samples whose accuracy is worse than the threshold, then stable-sorts by
/// timestamp so ties keep their input order.
pub fn clean_samples(raw: Vec<Sample>, config: &CleanConfig) -> Vec<Sample> {
    let total = raw.len();

    let valid: Vec<Sample> = raw.into_iter().filter(|s| s.is_valid()).collect();
    let after_valid = valid.len();

    let mut cleaned: Vec<Sample> = valid
        .into_iter()
        .filter(|s| s.accuracy.is_finite() && s.accuracy <= config.max_accuracy)
        .collect();
    let after_accuracy = cleaned.len();

    cleaned.sort_by_key(|s| s.timestamp);

    info!(
        "[Clean] {} -> {} (valid coordinates) -> {} (accuracy <= {})",
        total, after_valid, after_accuracy, config.max_accuracy
    );

    cleaned
}
