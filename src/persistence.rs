//! CSV cache for labeled samples.
//!
//! Clustering is the expensive stage, so its output can be cached between
//! runs and re-analyzed without re-clustering. The cache must be lossless:
//! timestamps are written in RFC 3339 with full precision and cluster ids
//! verbatim, so every downstream aggregate is identical whether its input
//! came fresh from the clusterer or through this file.

use crate::error::{PlaceMinerError, Result};
use crate::LabeledSample;
use log::info;
use std::path::Path;

fn persistence_err(context: &str, err: impl std::fmt::Display) -> PlaceMinerError {
    PlaceMinerError::PersistenceError {
        message: format!("{}: {}", context, err),
    }
}

/// Write labeled samples to a CSV file, one row per sample.
pub fn write_labeled_csv(path: &Path, labeled: &[LabeledSample]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| persistence_err(&format!("open {} for write", path.display()), e))?;

    for sample in labeled {
        writer
            .serialize(sample)
            .map_err(|e| persistence_err("serialize labeled sample", e))?;
    }
    writer
        .flush()
        .map_err(|e| persistence_err("flush labeled sample cache", e))?;

    info!("[Cache] wrote {} labeled samples to {}", labeled.len(), path.display());
    Ok(())
}

/// Read labeled samples back from a CSV file written by
/// [`write_labeled_csv`].
pub fn read_labeled_csv(path: &Path) -> Result<Vec<LabeledSample>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| persistence_err(&format!("open {} for read", path.display()), e))?;

    let mut labeled = Vec::new();
    for row in reader.deserialize() {
        let sample: LabeledSample =
            row.map_err(|e| persistence_err("parse labeled sample row", e))?;
        labeled.push(sample);
    }

    info!("[Cache] read {} labeled samples from {}", labeled.len(), path.display());
    Ok(labeled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwell::compute_dwell;
    use crate::transitions::transitions;
    use crate::NOISE;
    use chrono::{Duration, TimeZone, Utc};
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("place_miner_{}_{}.csv", name, std::process::id()))
    }

    fn fixture() -> Vec<LabeledSample> {
        // Sub-second precision on purpose: the cache must not truncate it
        let t0 = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap()
            + Duration::milliseconds(123);
        [0, 0, NOISE, 1]
            .iter()
            .enumerate()
            .map(|(i, &cluster)| LabeledSample {
                timestamp: t0 + Duration::minutes(17 * i as i64),
                latitude: 46.5197 + i as f64 * 1e-5,
                longitude: 6.6323,
                accuracy: 12.5,
                cluster,
            })
            .collect()
    }

    #[test]
    fn test_round_trip_is_lossless() {
        let path = scratch_path("round_trip");
        let original = fixture();

        write_labeled_csv(&path, &original).unwrap();
        let restored = read_labeled_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(restored, original);
    }

    #[test]
    fn test_aggregates_identical_after_round_trip() {
        let path = scratch_path("aggregates");
        let original = fixture();

        write_labeled_csv(&path, &original).unwrap();
        let restored = read_labeled_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(compute_dwell(&restored), compute_dwell(&original));
        assert_eq!(transitions(&restored), transitions(&original));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = scratch_path("does_not_exist");
        std::fs::remove_file(&path).ok();
        assert!(matches!(
            read_labeled_csv(&path),
            Err(PlaceMinerError::PersistenceError { .. })
        ));
    }

    #[test]
    fn test_empty_table_round_trips() {
        let path = scratch_path("empty");
        write_labeled_csv(&path, &[]).unwrap();
        let restored = read_labeled_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(restored.is_empty());
    }
}
