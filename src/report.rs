//! Plain-text report rendering for a user's derived tables.
//!
//! Presentation only: consumes the pipeline's output and produces the
//! per-user text report. Format is free-form and not safety-critical.

use crate::pipeline::{overall_dwell, UserReport};
use crate::ClusterDwell;
use std::fmt::Write;

fn write_dwell_lines(out: &mut String, dwell: &[ClusterDwell], indent: &str) {
    for row in dwell {
        let _ = writeln!(out, "{}cluster {} ({:.2}h)", indent, row.cluster, row.hours);
    }
}

/// Render a user's report as plain text.
///
/// Sections: summary line, top clusters per month, weekday vs weekend
/// hours, and the busiest transitions. Sparse users render with explicit
/// "none" lines rather than being skipped.
pub fn render_user_report(report: &UserReport) -> String {
    let mut out = String::new();
    let s = &report.summary;

    let _ = writeln!(
        out,
        "{}: {} clusters, {}/{} points non-noise",
        report.user_id, s.distinct_cluster_count, s.non_noise_points, s.total_points
    );
    let _ = writeln!(out, "Top overall clusters -> {:?}", s.top_overall_clusters);

    for failure in &report.month_failures {
        let _ = writeln!(out, "!! {} skipped: {}", failure.month, failure.message);
    }

    let _ = writeln!(out, "\nTop locations per month:");
    if report.monthly_top.is_empty() {
        let _ = writeln!(out, "  (no data)");
    }
    for (month, dwell) in &report.monthly_top {
        let _ = writeln!(out, "  {}:", month);
        if dwell.is_empty() {
            let _ = writeln!(out, "    (no clusters)");
        } else {
            write_dwell_lines(&mut out, dwell, "    ");
        }
    }

    let _ = writeln!(out, "\nWeekdays (hours in top clusters):");
    if report.week_dwell.is_empty() {
        let _ = writeln!(out, "  No weekday clusters found.");
    } else {
        write_dwell_lines(&mut out, &report.week_dwell, "  ");
    }
    let _ = writeln!(out, "Weekends (hours in top clusters):");
    if report.weekend_dwell.is_empty() {
        let _ = writeln!(out, "  No weekend clusters found.");
    } else {
        write_dwell_lines(&mut out, &report.weekend_dwell, "  ");
    }

    let _ = writeln!(out, "\n{} transitions detected", report.transitions.len());
    for t in report.transitions.iter().take(5) {
        let _ = writeln!(out, "  {} -> {}: {}", t.from_cluster, t.to_cluster, t.count);
    }

    let overall = overall_dwell(&report.labeled);
    let total_hours: f64 = overall.iter().map(|d| d.hours).sum();
    let _ = writeln!(out, "\nTotal clustered hours: {:.2}", total_hours);

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{analyze_user, PipelineConfig};
    use crate::Sample;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_render_sparse_user() {
        let report = analyze_user("bob", vec![], &PipelineConfig::default()).unwrap();
        let text = render_user_report(&report);
        assert!(text.contains("bob: 0 clusters"));
        assert!(text.contains("No weekday clusters found."));
        assert!(text.contains("No weekend clusters found."));
    }

    #[test]
    fn test_render_clustered_user() {
        let raw: Vec<Sample> = (0..6)
            .map(|i| {
                Sample::new(
                    Utc.with_ymd_and_hms(2024, 3, 4, 8, i, 0).unwrap(),
                    46.5197 + i as f64 * 1e-6,
                    6.6323,
                    10.0,
                )
            })
            .collect();
        let report = analyze_user("alice", raw, &PipelineConfig::default()).unwrap();
        let text = render_user_report(&report);
        assert!(text.contains("alice: 1 clusters"));
        assert!(text.contains("2024-03"));
        assert!(text.contains("transitions detected"));
    }
}
