//! Season-workload segmentation.
//!
//! The same bucketing idea as rest intervals, applied to cumulative games
//! played instead of calendar rest: a goalie's season is partitioned into
//! equal-frequency segments so early-season and late-season form can be
//! compared. Sample-size cutovers are explicit constants, not whatever a
//! quantile helper happens to do with small inputs.

use serde::Serialize;

use super::metrics::Metric;
use super::record::ScoredGame;

/// Records needed before a season is split into quartiles.
pub const QUARTER_MIN_GAMES: usize = 12;
/// Records needed before a season is split into halves.
pub const HALF_MIN_GAMES: usize = 6;

/// Ordinal fatigue segment within a season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkloadSegment {
    FirstQuarter,
    SecondQuarter,
    ThirdQuarter,
    FourthQuarter,
    EarlySeason,
    LateSeason,
    FullSeason,
}

impl WorkloadSegment {
    pub fn label(&self) -> &'static str {
        match self {
            WorkloadSegment::FirstQuarter => "Q1",
            WorkloadSegment::SecondQuarter => "Q2",
            WorkloadSegment::ThirdQuarter => "Q3",
            WorkloadSegment::FourthQuarter => "Q4",
            WorkloadSegment::EarlySeason => "Early Season",
            WorkloadSegment::LateSeason => "Late Season",
            WorkloadSegment::FullSeason => "All Games",
        }
    }
}

/// Segment labels for an n-record season, in record order.
///
/// Equal-frequency partition: with quartiles or halves, group sizes
/// differ by at most one. Below [`HALF_MIN_GAMES`] — including the
/// degenerate 0- and 1-record seasons — everything lands in a single
/// full-season segment rather than erroring out.
pub fn assign_segments(n: usize) -> Vec<WorkloadSegment> {
    if n >= QUARTER_MIN_GAMES {
        (0..n)
            .map(|i| match i * 4 / n {
                0 => WorkloadSegment::FirstQuarter,
                1 => WorkloadSegment::SecondQuarter,
                2 => WorkloadSegment::ThirdQuarter,
                _ => WorkloadSegment::FourthQuarter,
            })
            .collect()
    } else if n >= HALF_MIN_GAMES {
        (0..n)
            .map(|i| {
                if i * 2 / n == 0 {
                    WorkloadSegment::EarlySeason
                } else {
                    WorkloadSegment::LateSeason
                }
            })
            .collect()
    } else {
        vec![WorkloadSegment::FullSeason; n]
    }
}

/// A season row tagged with its fatigue segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentedGame {
    pub row: ScoredGame,
    pub segment: WorkloadSegment,
}

/// Tag one entity's season rows with workload segments.
///
/// Rows are ordered by the cumulative games-played counter (stable, so
/// rows without a counter keep their input position). The input is not
/// modified; the tagged rows are a new table.
pub fn segment_season(rows: &[ScoredGame]) -> Vec<SegmentedGame> {
    let mut ordered: Vec<&ScoredGame> = rows.iter().collect();
    ordered.sort_by_key(|row| row.games_played.unwrap_or(0));

    let segments = assign_segments(ordered.len());
    ordered
        .into_iter()
        .zip(segments)
        .map(|(row, segment)| SegmentedGame {
            row: row.clone(),
            segment,
        })
        .collect()
}

/// Mean of one metric per segment, segments in season order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub segment: WorkloadSegment,
    pub sample_count: usize,
    pub metric_count: usize,
    pub metric_mean: Option<f64>,
}

pub fn summarize_segments(segmented: &[SegmentedGame], metric: Metric) -> Vec<SegmentSummary> {
    // Segments come out of the partition in season order already; group
    // consecutive runs rather than re-deriving an ordering.
    let mut summaries: Vec<(WorkloadSegment, usize, usize, f64)> = Vec::new();
    for game in segmented {
        if summaries.last().map(|s| s.0) != Some(game.segment) {
            summaries.push((game.segment, 0, 0, 0.0));
        }
        if let Some(entry) = summaries.last_mut() {
            entry.1 += 1;
            if let Some(value) = metric.extract(&game.row.metrics) {
                entry.2 += 1;
                entry.3 += value;
            }
        }
    }

    summaries
        .into_iter()
        .map(|(segment, samples, count, sum)| SegmentSummary {
            segment,
            sample_count: samples,
            metric_count: count,
            metric_mean: (count > 0).then(|| sum / count as f64),
        })
        .collect()
}
