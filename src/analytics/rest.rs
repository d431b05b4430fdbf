//! Rest-interval derivation.
//!
//! For each entity the game log is put in chronological order and every
//! game is tagged with the whole-day gap to the entity's previous game.
//! The first game of a group has no prior game and keeps `days_rest =
//! None` — defaulting it to 0 (or to "fully rested") would fabricate a
//! rest signal that was never observed.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use tracing::warn;

use super::bucket::RestBucket;
use super::metrics::{derive_metrics, DerivedMetrics};
use super::record::{EntityKind, GameRecord, ScoredGame};

/// Rest-annotated view of a game log, with skip accounting. The input
/// records are untouched; this is a freshly derived table.
#[derive(Debug, Clone, PartialEq)]
pub struct RestTable {
    /// Grouped by entity in first-appearance order, chronological within
    /// each entity.
    pub rows: Vec<ScoredGame>,
    /// Per-entity count of records left out of the ordering because their
    /// date was missing or unparsable.
    pub undated: BTreeMap<String, usize>,
    /// Records dropped because a required raw stat was absent.
    pub incomplete: usize,
}

impl RestTable {
    pub fn skipped_total(&self) -> usize {
        self.undated.values().sum::<usize>() + self.incomplete
    }
}

/// Derive metrics and rest intervals for a whole game log.
///
/// Per-record problems are recovered locally: a record with no usable
/// date is counted in [`RestTable::undated`] for its entity, a record
/// missing a required stat is counted in [`RestTable::incomplete`], and
/// everything else proceeds. Ties on `game_date` keep their input order —
/// some sources carry several same-day entries that are not truly
/// simultaneous, and a stable order keeps reruns byte-identical.
pub fn build_rest_table(records: &[GameRecord], kind: EntityKind) -> RestTable {
    // Group row indices by entity, preserving first-appearance order.
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    let mut group_of: HashMap<&str, usize> = HashMap::new();
    for (i, record) in records.iter().enumerate() {
        match group_of.get(record.entity_id.as_str()) {
            Some(&g) => groups[g].1.push(i),
            None => {
                group_of.insert(record.entity_id.as_str(), groups.len());
                groups.push((record.entity_id.clone(), vec![i]));
            }
        }
    }

    let mut rows = Vec::with_capacity(records.len());
    let mut undated: BTreeMap<String, usize> = BTreeMap::new();
    let mut incomplete = 0usize;

    for (entity_id, indices) in groups {
        let mut dated: Vec<(NaiveDate, usize, DerivedMetrics)> = Vec::new();

        for i in indices {
            let record = &records[i];
            let metrics = match derive_metrics(record, kind) {
                Ok(m) => m,
                Err(err) => {
                    warn!("skipping record: {err}");
                    incomplete += 1;
                    continue;
                }
            };
            match record.game_date {
                Some(date) => dated.push((date, i, metrics)),
                None => *undated.entry(entity_id.clone()).or_insert(0) += 1,
            }
        }

        // Vec::sort_by_key is stable: equal dates keep input order.
        dated.sort_by_key(|entry| entry.0);

        let mut prev: Option<NaiveDate> = None;
        for (date, i, metrics) in dated {
            let record = &records[i];
            let days_rest = prev.map(|p| (date - p).num_days());
            rows.push(ScoredGame {
                entity_id: entity_id.clone(),
                game_date: Some(date),
                season: record.season.clone(),
                games_played: record.stats.games_played,
                days_rest,
                rest_bucket: days_rest.map(RestBucket::classify),
                metrics,
            });
            prev = Some(date);
        }
    }

    RestTable {
        rows,
        undated,
        incomplete,
    }
}
