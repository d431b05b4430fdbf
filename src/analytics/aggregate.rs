//! Bucket aggregation.
//!
//! Summaries always carry one row per canonical bucket, in canonical
//! order, including buckets with zero observations — a missing row would
//! be indistinguishable from a bucket the entity never played in.

use std::collections::BTreeMap;

use serde::Serialize;

use super::bucket::RestBucket;
use super::metrics::Metric;
use super::record::ScoredGame;

const BUCKET_COUNT: usize = RestBucket::ALL.len();

/// One row per rest bucket for a chosen metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub bucket: RestBucket,
    /// Games landing in this bucket.
    pub sample_count: usize,
    /// Games where the tracked metric was computable.
    pub metric_count: usize,
    pub metric_mean: Option<f64>,
    pub metric_sum: Option<f64>,
}

/// Bucket table for a single entity, shaped identically to the league
/// table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityBuckets {
    pub entity_id: String,
    pub buckets: Vec<BucketSummary>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Accumulator {
    samples: usize,
    count: usize,
    sum: f64,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        self.samples += 1;
        if let Some(v) = value {
            self.count += 1;
            self.sum += v;
        }
    }

    fn summary(self, bucket: RestBucket) -> BucketSummary {
        BucketSummary {
            bucket,
            sample_count: self.samples,
            metric_count: self.count,
            metric_mean: (self.count > 0).then(|| self.sum / self.count as f64),
            metric_sum: (self.count > 0).then_some(self.sum),
        }
    }
}

fn finish(acc: [Accumulator; BUCKET_COUNT]) -> Vec<BucketSummary> {
    RestBucket::ALL
        .iter()
        .map(|b| acc[b.index()].summary(*b))
        .collect()
}

/// League-wide (or any pooled) summary of one metric by rest bucket.
/// Rows without a bucket — first games of a group — stay out.
pub fn summarize(rows: &[ScoredGame], metric: Metric) -> Vec<BucketSummary> {
    let mut acc = [Accumulator::default(); BUCKET_COUNT];
    for row in rows {
        let Some(bucket) = row.rest_bucket else { continue };
        acc[bucket.index()].push(metric.extract(&row.metrics));
    }
    finish(acc)
}

/// Same summary, one table per entity, entities in ascending id order.
pub fn summarize_per_entity(rows: &[ScoredGame], metric: Metric) -> Vec<EntityBuckets> {
    let mut by_entity: BTreeMap<&str, [Accumulator; BUCKET_COUNT]> = BTreeMap::new();
    for row in rows {
        let Some(bucket) = row.rest_bucket else { continue };
        by_entity
            .entry(row.entity_id.as_str())
            .or_insert_with(|| [Accumulator::default(); BUCKET_COUNT])[bucket.index()]
            .push(metric.extract(&row.metrics));
    }
    by_entity
        .into_iter()
        .map(|(entity_id, acc)| EntityBuckets {
            entity_id: entity_id.to_string(),
            buckets: finish(acc),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::metrics::DerivedMetrics;
    use approx::assert_relative_eq;

    fn row(entity: &str, bucket: Option<RestBucket>, win: Option<bool>) -> ScoredGame {
        ScoredGame {
            entity_id: entity.to_string(),
            game_date: None,
            season: None,
            games_played: None,
            days_rest: None,
            rest_bucket: bucket,
            metrics: DerivedMetrics {
                win,
                ..DerivedMetrics::default()
            },
        }
    }

    #[test]
    fn every_bucket_emitted_even_when_empty() {
        let rows = vec![
            row("A", Some(RestBucket::Normal), Some(true)),
            row("A", Some(RestBucket::Normal), Some(false)),
        ];
        let summary = summarize(&rows, Metric::WinPct);

        assert_eq!(summary.len(), 4);
        let buckets: Vec<RestBucket> = summary.iter().map(|s| s.bucket).collect();
        assert_eq!(buckets, RestBucket::ALL.to_vec());

        let counts: Vec<usize> = summary.iter().map(|s| s.sample_count).collect();
        assert_eq!(counts, vec![0, 0, 2, 0]);
        assert_eq!(summary[0].metric_mean, None);
        assert_eq!(summary[0].metric_sum, None);
    }

    #[test]
    fn test_mean_and_sum() {
        let rows = vec![
            row("A", Some(RestBucket::BackToBack), Some(true)),
            row("A", Some(RestBucket::BackToBack), Some(true)),
            row("A", Some(RestBucket::BackToBack), Some(false)),
            row("A", Some(RestBucket::BackToBack), Some(false)),
        ];
        let summary = summarize(&rows, Metric::WinPct);
        let b2b = &summary[0];
        assert_eq!(b2b.sample_count, 4);
        assert_eq!(b2b.metric_count, 4);
        assert_relative_eq!(b2b.metric_mean.unwrap(), 0.5, epsilon = 1e-12);
        // For wins the sum is simply the number of wins.
        assert_relative_eq!(b2b.metric_sum.unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn null_metric_values_stay_out_of_the_mean() {
        let mut with_xg = row("A", Some(RestBucket::Short), Some(true));
        with_xg.metrics.xg_share = Some(0.6);
        let without_xg = row("A", Some(RestBucket::Short), Some(false));

        let summary = summarize(&[with_xg, without_xg], Metric::XgShare);
        let short = &summary[1];
        assert_eq!(short.sample_count, 2);
        assert_eq!(short.metric_count, 1);
        assert_relative_eq!(short.metric_mean.unwrap(), 0.6, epsilon = 1e-12);
    }

    #[test]
    fn unbucketed_rows_are_excluded() {
        let rows = vec![
            row("A", None, Some(true)),
            row("A", Some(RestBucket::Extended), Some(true)),
        ];
        let summary = summarize(&rows, Metric::WinPct);
        let total: usize = summary.iter().map(|s| s.sample_count).sum();
        assert_eq!(total, 1);
    }

    #[test]
    fn per_entity_tables_sorted_by_entity_id() {
        let rows = vec![
            row("TOR", Some(RestBucket::Normal), Some(true)),
            row("BOS", Some(RestBucket::Normal), Some(false)),
            row("MTL", Some(RestBucket::Short), Some(true)),
        ];
        let tables = summarize_per_entity(&rows, Metric::WinPct);
        let ids: Vec<&str> = tables.iter().map(|t| t.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["BOS", "MTL", "TOR"]);
        for table in &tables {
            assert_eq!(table.buckets.len(), 4);
        }
    }
}
