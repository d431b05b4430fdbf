//! Plain-text rendering of the engine's output tables.
//!
//! The dashboard-facing JSON shape is just the output structs serialized
//! as-is; this module only owns the terminal presentation.

use crate::analytics::{
    BucketSummary, Metric, RestBucket, RestTable, SegmentSummary, SensitivityScore,
};

/// The one user-visible failure message. Thin selections surface this,
/// never a raw error.
pub const INSUFFICIENT_DATA: &str = "insufficient data for this selection";

/// Percentages print as points, differentials keep their sign.
fn format_value(metric: Metric, value: f64) -> String {
    match metric {
        Metric::WinPct | Metric::XgShare | Metric::SavePct | Metric::HighDangerSavePct => {
            format!("{:.1}", value * 100.0)
        }
        Metric::GoalDiff => format!("{:+.3}", value),
        Metric::Gsax => format!("{:+.2}", value),
    }
}

fn format_mean(metric: Metric, mean: Option<f64>) -> String {
    match mean {
        Some(v) => format_value(metric, v),
        None => "-".to_string(),
    }
}

/// Rest-bucket table, one line per canonical bucket.
pub fn render_bucket_table(title: &str, summary: &[BucketSummary], metric: Metric) -> String {
    let mut out = String::new();
    out.push_str(&format!("{title}\n"));
    out.push_str(&format!(
        "{:<16} {:>6} {:>12}\n",
        "Rest Bucket",
        "Games",
        metric.label()
    ));
    for row in summary {
        out.push_str(&format!(
            "{:<16} {:>6} {:>12}\n",
            row.bucket.label(),
            row.sample_count,
            format_mean(metric, row.metric_mean)
        ));
    }
    out
}

/// Low-vs-high pooled contrast for a league table, in one line. `None`
/// when either side has no observations.
pub fn render_takeaway(
    summary: &[BucketSummary],
    metric: Metric,
    low: &[RestBucket],
    high: &[RestBucket],
) -> Option<String> {
    let pooled = |buckets: &[RestBucket]| {
        let mut count = 0usize;
        let mut sum = 0.0f64;
        for row in summary.iter().filter(|r| buckets.contains(&r.bucket)) {
            count += row.metric_count;
            sum += row.metric_sum.unwrap_or(0.0);
        }
        (count > 0).then(|| sum / count as f64)
    };

    let low_mean = pooled(low)?;
    let high_mean = pooled(high)?;
    Some(format!(
        "League {} is {} on high rest vs {} on low rest (delta {})",
        metric.label(),
        format_value(metric, high_mean),
        format_value(metric, low_mean),
        format_value(metric, high_mean - low_mean),
    ))
}

/// Sensitivity ranking, best-rested-gain first, cut to `top` rows.
pub fn render_ranking(ranking: &[SensitivityScore], metric: Metric, top: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<22} {:>14} {:>14} {:>8} {:>11}\n",
        "Team",
        format!("Tired {}", metric.label()),
        format!("Rested {}", metric.label()),
        "Delta",
        "Games L/H"
    ));
    for score in ranking.iter().take(top) {
        out.push_str(&format!(
            "{:<22} {:>14} {:>14} {:>8} {:>11}\n",
            score.entity_id,
            format_value(metric, score.low_rest_mean),
            format_value(metric, score.high_rest_mean),
            format_value(metric, score.sensitivity),
            format!("{}/{}", score.low_rest_games, score.high_rest_games),
        ));
    }
    out
}

/// Season-segment table for one goalie.
pub fn render_segments(goalie: &str, summary: &[SegmentSummary], metric: Metric) -> String {
    let mut out = String::new();
    out.push_str(&format!("{goalie} — {} by season segment\n", metric.label()));
    out.push_str(&format!(
        "{:<14} {:>6} {:>12}\n",
        "Segment",
        "Games",
        metric.label()
    ));
    for row in summary {
        out.push_str(&format!(
            "{:<14} {:>6} {:>12}\n",
            row.segment.label(),
            row.sample_count,
            format_mean(metric, row.metric_mean)
        ));
    }
    out
}

/// Skip-count footer, or `None` when nothing was skipped.
pub fn render_skip_footer(table: &RestTable) -> Option<String> {
    let undated: usize = table.undated.values().sum();
    if undated == 0 && table.incomplete == 0 {
        return None;
    }
    Some(format!(
        "note: skipped {} record(s) without a usable date (across {} entities) and {} with missing required stats",
        undated,
        table.undated.len(),
        table.incomplete,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::RestBucket;

    fn summary_row(bucket: RestBucket, count: usize, mean: Option<f64>) -> BucketSummary {
        BucketSummary {
            bucket,
            sample_count: count,
            metric_count: count,
            metric_mean: mean,
            metric_sum: mean.map(|m| m * count as f64),
        }
    }

    #[test]
    fn empty_buckets_render_a_dash() {
        let summary = vec![
            summary_row(RestBucket::BackToBack, 0, None),
            summary_row(RestBucket::Short, 3, Some(0.5)),
        ];
        let text = render_bucket_table("curve", &summary, Metric::WinPct);
        assert!(text.contains("0-1 days (B2B)"));
        assert!(text.contains('-'));
        assert!(text.contains("50.0"));
    }

    #[test]
    fn takeaway_requires_both_sides() {
        let summary = vec![
            summary_row(RestBucket::BackToBack, 0, None),
            summary_row(RestBucket::Short, 0, None),
            summary_row(RestBucket::Normal, 2, Some(0.5)),
            summary_row(RestBucket::Extended, 0, None),
        ];
        let takeaway = render_takeaway(
            &summary,
            Metric::WinPct,
            &[RestBucket::BackToBack],
            &[RestBucket::Normal, RestBucket::Extended],
        );
        assert!(takeaway.is_none());
    }
}
