//! Rest-sensitivity ranking.
//!
//! Contrasts each entity's pooled performance on low rest against high
//! rest. Pooling the underlying games (rather than averaging per-bucket
//! means) weights each side by its observations, so one lucky game in a
//! thin bucket cannot swing the score.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use super::bucket::RestBucket;
use super::metrics::Metric;
use super::record::ScoredGame;

/// Which buckets count as "tired" and which as "rested". The default
/// pits back-to-back games (0-1 days) against 3+ days of rest.
#[derive(Debug, Clone, PartialEq)]
pub struct RestSplit {
    pub low: Vec<RestBucket>,
    pub high: Vec<RestBucket>,
}

impl Default for RestSplit {
    fn default() -> Self {
        RestSplit {
            low: vec![RestBucket::BackToBack],
            high: vec![RestBucket::Normal, RestBucket::Extended],
        }
    }
}

/// One entity's low-vs-high rest contrast.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityScore {
    pub entity_id: String,
    pub low_rest_mean: f64,
    pub high_rest_mean: f64,
    /// `high_rest_mean - low_rest_mean`; positive means the entity
    /// performs better with more rest.
    pub sensitivity: f64,
    pub low_rest_games: usize,
    pub high_rest_games: usize,
}

#[derive(Debug, Default)]
struct SideTotals {
    count: usize,
    sum: f64,
}

impl SideTotals {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
    }

    fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Rank entities by rest sensitivity, most rest-dependent first.
///
/// An entity with zero observations on either side of the split is
/// omitted entirely — zero-filling it would make it look insensitive
/// rather than unmeasured. Equal scores fall back to ascending
/// `entity_id` so the ordering is reproducible.
pub fn rank(rows: &[ScoredGame], metric: Metric, split: &RestSplit) -> Vec<SensitivityScore> {
    let mut totals: BTreeMap<&str, (SideTotals, SideTotals)> = BTreeMap::new();

    for row in rows {
        let Some(bucket) = row.rest_bucket else { continue };
        let Some(value) = metric.extract(&row.metrics) else { continue };

        let entry = totals.entry(row.entity_id.as_str()).or_default();
        if split.low.contains(&bucket) {
            entry.0.push(value);
        } else if split.high.contains(&bucket) {
            entry.1.push(value);
        }
    }

    let mut scores: Vec<SensitivityScore> = totals
        .into_iter()
        .filter_map(|(entity_id, (low, high))| {
            if low.count == 0 || high.count == 0 {
                return None;
            }
            let low_mean = low.mean();
            let high_mean = high.mean();
            Some(SensitivityScore {
                entity_id: entity_id.to_string(),
                low_rest_mean: low_mean,
                high_rest_mean: high_mean,
                sensitivity: high_mean - low_mean,
                low_rest_games: low.count,
                high_rest_games: high.count,
            })
        })
        .collect();

    scores.sort_by(|a, b| {
        b.sensitivity
            .partial_cmp(&a.sensitivity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.entity_id.cmp(&b.entity_id))
    });
    scores
}
